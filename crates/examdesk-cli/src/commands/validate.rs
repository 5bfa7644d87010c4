//! The `examdesk validate` command.

use std::path::PathBuf;

use anyhow::Result;

use examdesk_core::draft::{load_exam_draft, validate_exam_draft};

pub fn execute(draft_path: PathBuf) -> Result<()> {
    let draft = load_exam_draft(&draft_path)?;
    println!(
        "Exam draft: {} ({} questions, {} min)",
        draft.title,
        draft.questions.len(),
        draft.time
    );

    let warnings = validate_exam_draft(&draft);
    for w in &warnings {
        let prefix = w
            .question
            .map(|n| format!("  [question {n}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Draft valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
