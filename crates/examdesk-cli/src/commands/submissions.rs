//! Submission commands: `submissions`, `submission`.

use std::path::PathBuf;

use anyhow::{bail, Result};
use comfy_table::Cell;

use examdesk_core::statistics::{format_duration, SubmissionReview};

use super::{connect, format_timestamp, table};

pub async fn list(
    exam: Option<String>,
    class: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let client = connect(config_path)?;
    let submissions = match (exam, class) {
        (Some(exam_id), _) => client.exam_submissions(&exam_id).await?,
        (None, Some(class_id)) => client.class_submissions(&class_id).await?,
        (None, None) => bail!("pass --exam or --class"),
    };

    if submissions.is_empty() {
        println!("No submissions.");
        return Ok(());
    }

    let mut table = table(vec![
        "Submission ID",
        "Exam",
        "User",
        "Score",
        "Duration",
        "Status",
        "Submitted",
    ]);
    for s in &submissions {
        table.add_row(vec![
            Cell::new(&s.id),
            Cell::new(&s.exam_id),
            Cell::new(&s.user_id),
            Cell::new(format!("{:.2}", s.score)),
            Cell::new(format_duration(s.duration)),
            Cell::new(if s.completed { "completed" } else { "pending" }),
            Cell::new(format_timestamp(s.created_at)),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn review(submission_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let client = connect(config_path)?;
    let review = client.review_submission(&submission_id).await?;
    print_review(&review);
    Ok(())
}

fn print_review(review: &SubmissionReview) {
    println!("{} (submission {})", review.exam_title, review.submission_id);
    println!(
        "Score: {:.2}   Time: {}",
        review.score,
        format_duration(review.duration)
    );

    for question in &review.questions {
        println!("\n{}. [{}] {}", question.number, question.kind, question.prompt);
        for line in &question.lines {
            let mark = if line.correct { "ok" } else { "x " };
            let yours = line.your_answer.as_deref().unwrap_or("-");
            let expected = line.correct_answer.as_deref().unwrap_or("?");
            if line.label.is_empty() {
                println!("   [{mark}] your answer: {yours}, correct: {expected}");
            } else {
                println!("   [{mark}] {}: {yours} (correct: {expected})", line.label);
            }
        }
    }

    let (right, total) = review.tally();
    println!("\n{right}/{total} correct");
}
