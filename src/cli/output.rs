//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `ScrubMate` CLI

use crate::matching::Selection;
use crate::models::KnowledgeRecord;
use crate::models::QueryIndex;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// # Arguments
/// * `s` - The string to truncate
/// * `max_chars` - Maximum number of characters (not bytes)
///
/// # Returns
/// Truncated string with "..." suffix if truncated, otherwise the original string
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Single-line preview of multi-line text
#[must_use]
pub fn preview(s: &str, max_chars: usize) -> String {
    truncate_str(&s.split_whitespace().collect::<Vec<_>>().join(" "), max_chars)
}

/// Print a list header
pub fn print_list_header(what: &str, shown: usize, total: usize) {
    println!("📋 {what} (showing {shown} of {total})");
}

/// Print indexed questions
pub fn print_question_list(index: &QueryIndex, limit: usize) {
    for (i, row) in index.rows().iter().take(limit).enumerate() {
        println!(
            "  {:>4}. {} | {}{}",
            i,
            row.question,
            preview(&row.answer, 40),
            row.image_ref
                .as_deref()
                .map(|img| format!(" | 🖼️  {img}"))
                .unwrap_or_default()
        );
    }
}

/// Print input sheet records
pub fn print_record_list(records: &[KnowledgeRecord], limit: usize) {
    for record in records.iter().take(limit) {
        println!(
            "  - [{}] {} | {}",
            if record.timestamp.is_empty() { "-" } else { record.timestamp.as_str() },
            record.question,
            preview(&record.answer, 40)
        );
        let details: Vec<String> = [
            ("집도의", &record.surgeon),
            ("수술방", &record.room),
            ("수술명", &record.surgery_name),
            ("수술 장비", &record.surgery_devices),
            ("수술 도구", &record.surgery_tools),
        ]
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}: {v}"))
        .collect();
        if !details.is_empty() {
            println!("      {}", details.join(", "));
        }
    }
}

/// Print the outcome of a match
pub fn print_selection(selection: &Selection, index: &QueryIndex, threshold: f64) {
    let result = &selection.result;
    println!("🔎 Variants tried: {}", selection.variants_tried);
    if let Some(variant) = &selection.variant {
        println!("   Best variant: {variant}");
    }
    println!("   Score: {:.1} (threshold {:.0})", result.score, threshold);

    match result.index {
        Some(i) => {
            println!(
                "   Matched #{}: {}",
                i,
                result.matched_question.as_deref().unwrap_or_default()
            );
            if let Some(row) = index.get(i) {
                println!("   Answer: {}", preview(&row.answer, 80));
                if let Some(img) = &row.image_ref {
                    println!("   Image: {img}");
                }
            }
        }
        None => {
            print_warning("No question met the threshold");
            if let Some(row) = result.closest_index.and_then(|i| index.get(i)) {
                println!("   Closest: {}", row.question);
            }
        }
    }
}

/// Print configuration
pub fn print_config(config: &AppConfig) {
    println!("📋 ScrubMate Configuration:");
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!();

    println!("📚 Knowledge:");
    println!("  Main sheet: {}", config.main_sheet_path().display());
    println!("  Input sheet: {}", config.input_sheet_path().display());
    println!("  Images: {}", config.images_dir().display());
    println!();

    println!("🎯 Matching:");
    println!("  Threshold: {}", config.match_threshold());
    let synonyms = config.synonym_table();
    println!(
        "  Synonym table: {} terms ({})",
        synonyms.len(),
        if config.synonyms.is_empty() { "built-in" } else { "configured" }
    );
    println!();

    println!("🌐 Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.cors);
    println!("  Session timeout: {}s", config.session.timeout);
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Model: {}", config.llm_model());
    println!("  Key: {}", mask_key(config.llm_key()));
}

/// Mask an API key for display (keep the last four characters)
fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count == 0 {
        "(not set)".to_string()
    } else if count <= 4 {
        "****".to_string()
    } else {
        let tail: String = key.chars().skip(count - 4).collect();
        format!("****{tail}")
    }
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("수술 준비", 2), "수술...");
        assert_eq!(truncate_str("TUC", 10), "TUC");
    }

    #[test]
    fn test_preview_flattens_lines() {
        assert_eq!(preview("1. Foley\n2. Resectoscope", 100), "1. Foley 2. Resectoscope");
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "(not set)");
        assert_eq!(mask_key("abc"), "****");
        assert_eq!(mask_key("pplx-123456"), "****3456");
    }
}
