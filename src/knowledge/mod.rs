//! Knowledge base: store access, cached query index, and image lookup

pub mod store;

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;
use tracing::warn;

pub use store::CsvKnowledgeStore;
pub use store::KnowledgeStore;

use crate::errors::Result;
use crate::models::KnowledgeRecord;
use crate::models::QueryIndex;

/// Cached view of a [`KnowledgeStore`].
///
/// The index is loaded on first use and kept until [`Self::invalidate`] is
/// called. Appending through this type invalidates automatically so the next
/// read sees the new record.
pub struct KnowledgeBase {
    store: Arc<dyn KnowledgeStore>,
    cache: RwLock<Option<Arc<QueryIndex>>>,
}

impl KnowledgeBase {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(None),
        }
    }

    /// Current index, loading it from the store on a cache miss
    pub async fn index(&self) -> Result<Arc<QueryIndex>> {
        if let Some(index) = self.cache.read().await.as_ref() {
            debug!("Knowledge cache hit ({} questions)", index.len());
            return Ok(Arc::clone(index));
        }

        let mut cache = self.cache.write().await;
        // another task may have filled it while we waited for the lock
        if let Some(index) = cache.as_ref() {
            return Ok(Arc::clone(index));
        }

        let entries = self.store.load().await?;
        let index = Arc::new(QueryIndex::from_entries(&entries));
        if index.is_empty() {
            warn!("Knowledge base has no questions; add question/answer rows to the sheets");
        } else {
            info!(
                "Knowledge index built: {} entries, {} questions",
                entries.len(),
                index.len()
            );
        }
        *cache = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Drop the cached index
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
        debug!("Knowledge cache invalidated");
    }

    /// Append a record and invalidate the cache
    pub async fn append(&self, record: &KnowledgeRecord) -> Result<()> {
        self.store.append(record).await?;
        self.invalidate().await;
        Ok(())
    }

    /// Input sheet records with their metadata, read past the cache
    pub async fn input_records(&self) -> Result<Vec<KnowledgeRecord>> {
        self.store.input_records().await
    }
}

/// Resolve a bare image filename against the images directory.
///
/// Returns `None`, with a warning, when the file is missing or the reference
/// is not a plain filename.
pub fn resolve_image_path(images_dir: &Path, image_ref: &str) -> Option<PathBuf> {
    let name = image_ref.trim();
    let is_bare = !name.is_empty()
        && Path::new(name).file_name().and_then(|f| f.to_str()) == Some(name)
        && name != ".."
        && name != ".";
    if !is_bare {
        warn!("Ignoring image reference that is not a bare filename: {}", image_ref);
        return None;
    }

    let path = images_dir.join(name);
    if path.is_file() {
        Some(path)
    } else {
        warn!("Image file not found: {}", path.display());
        None
    }
}
