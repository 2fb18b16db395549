//! Question handlers: ask, match diagnostics, and query expansion

use std::io::Write;

use futures::StreamExt;

use super::open_knowledge;
use crate::assistant::Assistant;
use crate::assistant::ReplyOutcome;
use crate::assistant::EMPTY_KNOWLEDGE_MESSAGE;
use crate::assistant::NOT_FOUND_MESSAGE;
use crate::cli::output::*;
use crate::matching::expand;
use crate::matching::resolve;
use crate::matching::select;
use crate::AppConfig;
use crate::Result;

/// Answer a question, streaming the summary to stdout
pub async fn handle_ask_command(config: &AppConfig, question: &str, raw: bool) -> Result<()> {
    if raw {
        return print_raw_answer(config, question).await;
    }

    let assistant = Assistant::from_config(config)?;
    let reply = assistant.answer(question).await?;

    match reply.outcome {
        ReplyOutcome::Answered => {
            if let Some(matched) = &reply.match_result.matched_question {
                print_info(&format!(
                    "Matched \"{}\" (score {:.1})",
                    matched, reply.match_result.score
                ));
            }
            println!();
        }
        ReplyOutcome::NotFound | ReplyOutcome::EmptyKnowledge => {}
    }

    let image_ref = reply.image_ref.clone();
    let mut stream = reply.stream.into_stream();
    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        write!(stdout, "{}", chunk?)?;
        stdout.flush()?;
    }
    println!();

    if let Some(image_ref) = image_ref {
        println!();
        print_info(&format!(
            "Image: {}",
            config.images_dir().join(image_ref).display()
        ));
    }

    Ok(())
}

/// Print the stored answer of the best match, without summarization
async fn print_raw_answer(config: &AppConfig, question: &str) -> Result<()> {
    let knowledge = open_knowledge(config);
    let index = knowledge.index().await?;
    if index.is_empty() {
        print_warning(EMPTY_KNOWLEDGE_MESSAGE);
        return Ok(());
    }

    let selection = select(question, &index, &config.synonym_table(), config.match_threshold());
    let Some(match_index) = selection.result.index else {
        println!("{NOT_FOUND_MESSAGE}");
        return Ok(());
    };

    let resolved = resolve(&index, match_index)?;
    println!("{}", resolved.answer_text);
    if let Some(image_ref) = resolved.image_ref {
        println!();
        print_info(&format!("Image: {image_ref}"));
    }
    Ok(())
}

/// Show how a question scores against the knowledge base
pub async fn handle_match_command(
    config: &AppConfig,
    question: &str,
    threshold: Option<f64>,
) -> Result<()> {
    let threshold = threshold.unwrap_or_else(|| config.match_threshold());
    if !(0.0..=100.0).contains(&threshold) {
        return Err(crate::ScrubMateError::InvalidInput(format!(
            "threshold must be within 0..=100, got {threshold}"
        )));
    }

    let knowledge = open_knowledge(config);
    let index = knowledge.index().await?;
    if index.is_empty() {
        print_warning(EMPTY_KNOWLEDGE_MESSAGE);
        return Ok(());
    }

    let selection = select(question, &index, &config.synonym_table(), threshold);
    print_selection(&selection, &index, threshold);
    Ok(())
}

/// Print the synonym variants of a query, raw query first
pub async fn handle_expand_command(config: &AppConfig, query: &str) -> Result<()> {
    let variants = expand(query, &config.synonym_table());
    println!("🔁 {} variant(s) for \"{}\":", variants.len(), query);
    for (i, variant) in variants.iter().enumerate() {
        println!("  {:>3}. {}", i, variant);
    }
    Ok(())
}
