//! Sheet-backed knowledge store
//!
//! The knowledge base lives in two CSV sheets: the curated main sheet and
//! the input sheet that receives records from the entry form. Both carry the
//! `질문`, `답변`, `Image URL` columns; the input sheet has extra metadata.

use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::ScrubMateError;
use crate::models::KnowledgeEntry;
use crate::models::KnowledgeRecord;

pub const QUESTION_COLUMN: &str = "질문";
pub const ANSWER_COLUMN: &str = "답변";
pub const IMAGE_COLUMN: &str = "Image URL";

/// Column layout of the input sheet, in append order
pub const INPUT_HEADERS: [&str; 9] = [
    QUESTION_COLUMN,
    ANSWER_COLUMN,
    IMAGE_COLUMN,
    "입력시각",
    "집도의",
    "수술방",
    "수술명",
    "수술 장비",
    "수술 도구",
];

/// Backing store of knowledge entries
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// All entries, main sheet first, in row order
    async fn load(&self) -> Result<Vec<KnowledgeEntry>>;

    /// Append one record to the input sheet
    async fn append(&self, record: &KnowledgeRecord) -> Result<()>;

    /// Every record of the input sheet, with metadata
    async fn input_records(&self) -> Result<Vec<KnowledgeRecord>>;
}

/// Knowledge store over two local CSV files
#[derive(Debug, Clone)]
pub struct CsvKnowledgeStore {
    main_sheet: PathBuf,
    input_sheet: PathBuf,
}

impl CsvKnowledgeStore {
    pub fn new(main_sheet: impl Into<PathBuf>, input_sheet: impl Into<PathBuf>) -> Self {
        Self {
            main_sheet: main_sheet.into(),
            input_sheet: input_sheet.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.main_sheet_path(), config.input_sheet_path())
    }

    /// Read the three knowledge columns of a sheet.
    ///
    /// A missing file or a sheet without the required columns contributes
    /// no rows.
    fn read_sheet(path: &Path) -> Result<Vec<KnowledgeEntry>> {
        if !path.exists() {
            warn!("Sheet not found, skipping: {}", path.display());
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let (Some(q_col), Some(a_col), Some(i_col)) = (
            column(QUESTION_COLUMN),
            column(ANSWER_COLUMN),
            column(IMAGE_COLUMN),
        ) else {
            warn!(
                "Sheet {} lacks one of the columns '{}', '{}', '{}'; ignoring it",
                path.display(),
                QUESTION_COLUMN,
                ANSWER_COLUMN,
                IMAGE_COLUMN
            );
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for row in reader.records() {
            let row = row?;
            let cell = |i: usize| row.get(i).unwrap_or("");
            if let Some(entry) = KnowledgeEntry::from_cells(cell(q_col), cell(a_col), cell(i_col)) {
                entries.push(entry);
            }
        }

        debug!("Read {} entries from {}", entries.len(), path.display());
        Ok(entries)
    }

    fn record_to_row(record: &KnowledgeRecord) -> [&str; 9] {
        [
            record.question.as_str(),
            record.answer.as_str(),
            record.image_filename.as_deref().unwrap_or(""),
            record.timestamp.as_str(),
            record.surgeon.as_str(),
            record.room.as_str(),
            record.surgery_name.as_str(),
            record.surgery_devices.as_str(),
            record.surgery_tools.as_str(),
        ]
    }

    fn load_blocking(&self) -> Result<Vec<KnowledgeEntry>> {
        let mut entries = Self::read_sheet(&self.main_sheet)?;
        entries.extend(Self::read_sheet(&self.input_sheet)?);
        info!("Loaded {} knowledge entries", entries.len());
        Ok(entries)
    }

    fn append_blocking(&self, record: &KnowledgeRecord) -> Result<()> {
        record.validate()?;

        let mut record = record.clone();
        if record.timestamp.trim().is_empty() {
            record.timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        }

        if let Some(parent) = self.input_sheet.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let is_new = !self.input_sheet.exists()
            || std::fs::metadata(&self.input_sheet)?.len() == 0;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.input_sheet)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            writer.write_record(INPUT_HEADERS)?;
        }
        writer.write_record(Self::record_to_row(&record))?;
        writer.flush()?;

        info!(
            "Appended knowledge record to {}: {}",
            self.input_sheet.display(),
            record.question
        );
        Ok(())
    }

    fn input_records_blocking(&self) -> Result<Vec<KnowledgeRecord>> {
        if !self.input_sheet.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.input_sheet)?;
        let headers = reader.headers()?.clone();
        let positions: Vec<Option<usize>> = INPUT_HEADERS
            .iter()
            .map(|name| headers.iter().position(|h| h.trim() == *name))
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let field = |i: usize| {
                positions[i]
                    .and_then(|p| row.get(p))
                    .unwrap_or("")
                    .to_string()
            };
            let image = field(2);
            records.push(KnowledgeRecord {
                question: field(0),
                answer: field(1),
                image_filename: (!image.trim().is_empty()).then_some(image),
                timestamp: field(3),
                surgeon: field(4),
                room: field(5),
                surgery_name: field(6),
                surgery_devices: field(7),
                surgery_tools: field(8),
            });
        }
        Ok(records)
    }

    /// Run a file operation on the blocking pool
    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Self) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| ScrubMateError::KnowledgeBase(format!("Sheet task failed: {e}")))?
    }
}

#[async_trait]
impl KnowledgeStore for CsvKnowledgeStore {
    async fn load(&self) -> Result<Vec<KnowledgeEntry>> {
        self.run_blocking(Self::load_blocking).await
    }

    async fn append(&self, record: &KnowledgeRecord) -> Result<()> {
        let record = record.clone();
        self.run_blocking(move |store| store.append_blocking(&record)).await
    }

    async fn input_records(&self) -> Result<Vec<KnowledgeRecord>> {
        self.run_blocking(Self::input_records_blocking).await
    }
}
