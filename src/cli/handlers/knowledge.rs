//! Knowledge base handlers (list, add)

use super::open_knowledge;
use crate::cli::output::*;
use crate::models::KnowledgeRecord;
use crate::AppConfig;
use crate::Result;

/// List indexed questions, or the raw input sheet records
pub async fn handle_list_command(config: &AppConfig, limit: usize, input: bool) -> Result<()> {
    let knowledge = open_knowledge(config);

    if input {
        let records = knowledge.input_records().await?;
        print_list_header(
            &format!("Input sheet {}", config.input_sheet_path().display()),
            records.len().min(limit),
            records.len(),
        );
        print_record_list(&records, limit);
        return Ok(());
    }

    let index = knowledge.index().await?;
    if index.is_empty() {
        print_warning("Knowledge base is empty");
        return Ok(());
    }
    print_list_header("Questions", index.len().min(limit), index.len());
    print_question_list(&index, limit);
    Ok(())
}

/// Append a record to the input sheet
pub async fn handle_add_command(config: &AppConfig, record: KnowledgeRecord) -> Result<()> {
    if let Some(image) = &record.image_filename {
        if crate::knowledge::resolve_image_path(config.images_dir(), image).is_none() {
            print_warning(&format!(
                "Image '{}' is not in {}; the record will reference it anyway",
                image,
                config.images_dir().display()
            ));
        }
    }

    let knowledge = open_knowledge(config);
    knowledge.append(&record).await?;
    print_success(&format!(
        "Saved \"{}\" to {}",
        record.question,
        config.input_sheet_path().display()
    ));
    Ok(())
}
