//! The `examdesk parse` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examdesk_core::parser::{ExamText, ExamTextParser, LabelGrammar};

pub fn execute(
    multiple_choice: Option<PathBuf>,
    true_false: Option<PathBuf>,
    short_answer: Option<PathBuf>,
    label: Option<String>,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let label = match label {
        Some(label) => label,
        None => super::load_config(config_path)?.question_label,
    };
    let grammar = LabelGrammar::new(&label)
        .with_context(|| format!("invalid question label {label:?}"))?;
    let parser = ExamTextParser::new(grammar);

    let text = ExamText {
        multiple_choice: read_text(multiple_choice)?,
        true_false: read_text(true_false)?,
        short_answer: read_text(short_answer)?,
    };
    let questions = parser.parse_exam_text(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&questions)?);
        return Ok(());
    }

    if questions.is_empty() {
        println!("No questions found (label: {label:?}).");
        return Ok(());
    }
    for (i, question) in questions.iter().enumerate() {
        super::print_question(i + 1, question);
    }
    println!("\n{} question(s) parsed.", questions.len());

    Ok(())
}

fn read_text(path: Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => Ok(String::new()),
    }
}
