//! Exam commands: `create-exam`, `exams`, `exam`.

use std::path::PathBuf;

use anyhow::{bail, Result};
use comfy_table::Cell;

use examdesk_core::draft::{load_exam_draft, validate_exam_draft};

use super::{connect, format_timestamp, print_question, table};

pub async fn create(
    draft_path: PathBuf,
    class: Option<String>,
    force: bool,
    dry_run: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut draft = load_exam_draft(&draft_path)?;
    if class.is_some() {
        draft.class_id = class;
    }

    let warnings = validate_exam_draft(&draft);
    for w in &warnings {
        match w.question {
            Some(n) => eprintln!("  [question {n}] WARNING: {}", w.message),
            None => eprintln!("  WARNING: {}", w.message),
        }
    }
    if !warnings.is_empty() && !force {
        bail!(
            "draft has {} warning(s); fix them or pass --force",
            warnings.len()
        );
    }

    if dry_run {
        let exam = draft.into_new_exam("");
        println!("{}", serde_json::to_string_pretty(&exam)?);
        return Ok(());
    }

    let client = connect(config_path)?;
    let user = client.current_user().await?;
    let exam = draft.into_new_exam(user.id);
    let question_count = exam.questions.len();
    let created = client.create_exam(&exam).await?;

    if created.message.is_empty() {
        println!("Uploaded \"{}\" ({question_count} questions).", exam.title);
    } else {
        println!(
            "Uploaded \"{}\" ({question_count} questions): {}",
            exam.title, created.message
        );
    }
    Ok(())
}

pub async fn list(class_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let client = connect(config_path)?;
    let exams = client.class_exams(&class_id).await?;

    if exams.is_empty() {
        println!("No exams in this class yet.");
        return Ok(());
    }

    let mut table = table(vec!["Exam ID", "Title", "Time", "Questions", "Sections", "Created"]);
    for exam in &exams {
        table.add_row(vec![
            Cell::new(&exam.id),
            Cell::new(&exam.title),
            Cell::new(format!("{} min", exam.time)),
            Cell::new(exam.questions.len()),
            Cell::new(exam.sections().join(", ")),
            Cell::new(format_timestamp(exam.created_at)),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show(exam_id: String, json: bool, config_path: Option<PathBuf>) -> Result<()> {
    let client = connect(config_path)?;
    let exam = client.exam(&exam_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&exam)?);
        return Ok(());
    }

    println!("{} ({} min)", exam.title, exam.time);
    println!("Sections: {}", exam.sections().join(", "));
    println!();
    for (i, entry) in exam.questions.iter().enumerate() {
        print_question(i + 1, &entry.question);
    }
    Ok(())
}
