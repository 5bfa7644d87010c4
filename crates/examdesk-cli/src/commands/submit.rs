//! The `examdesk submit` command.
//!
//! Answers come from a TOML sheet keyed by 1-based question position:
//!
//! ```toml
//! [[answers]]
//! question = 1
//! choice = "B"
//!
//! [[answers]]
//! question = 2
//! statements = [true, false, true, false]
//!
//! [[answers]]
//! question = 3
//! text = "42"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Deserialize;

use examdesk_core::answer_key::AnswerPatch;
use examdesk_core::attempt::ExamAttempt;
use examdesk_core::model::Question;

use super::connect;

#[derive(Debug, Deserialize)]
struct AnswerSheet {
    #[serde(default)]
    answers: Vec<SheetAnswer>,
}

#[derive(Debug, Deserialize)]
struct SheetAnswer {
    question: usize,
    #[serde(default)]
    choice: Option<String>,
    #[serde(default)]
    statements: Option<Vec<bool>>,
    #[serde(default)]
    text: Option<String>,
}

fn load_sheet(path: &Path) -> Result<AnswerSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse TOML: {}", path.display()))
}

/// Record every sheet entry on the attempt.
fn fill(attempt: &mut ExamAttempt, sheet: &AnswerSheet) -> Result<()> {
    for entry in &sheet.answers {
        let position = entry.question;
        let Some(question) = position
            .checked_sub(1)
            .and_then(|i| attempt.exam().questions.get(i))
            .cloned()
        else {
            bail!(
                "answer for question {position}: the exam has {} questions",
                attempt.exam().questions.len()
            );
        };
        let id = question.id.as_str();

        match (&entry.choice, &entry.statements, &entry.text) {
            (Some(choice), None, None) => {
                let AnswerPatch::Choice(index) = choice.parse::<AnswerPatch>()? else {
                    bail!("answer for question {position}: invalid choice {choice:?}");
                };
                attempt.choose(id, index)?;
            }
            (None, Some(verdicts), None) => {
                let Question::TrueFalse { truefalse } = &question.question else {
                    bail!("answer for question {position}: not a true/false question");
                };
                if verdicts.len() > truefalse.items.len() {
                    bail!(
                        "answer for question {position}: {} statements given, the question has {}",
                        verdicts.len(),
                        truefalse.items.len()
                    );
                }
                for (item, value) in truefalse.items.iter().zip(verdicts) {
                    let item_id = item.id.as_deref().with_context(|| {
                        format!("question {position}: statement has no id")
                    })?;
                    attempt.mark(id, item_id, *value)?;
                }
            }
            (None, None, Some(text)) => attempt.write(id, text.trim())?,
            _ => bail!(
                "answer for question {position} must set exactly one of choice, statements, text"
            ),
        }
    }
    Ok(())
}

pub async fn execute(
    exam_id: String,
    answers_path: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let sheet = load_sheet(&answers_path)?;

    let client = connect(config_path)?;
    let user = client.current_user().await?;
    let exam = client.exam(&exam_id).await?;
    let title = exam.title.clone();

    let mut attempt = ExamAttempt::start(exam, user.id);
    println!(
        "Started \"{title}\", time left {}",
        attempt.clock_at(Utc::now())
    );
    fill(&mut attempt, &sheet)
        .with_context(|| format!("invalid answers in {}", answers_path.display()))?;

    let unanswered = attempt.unanswered().len();
    if unanswered > 0 {
        eprintln!("  WARNING: {unanswered} question(s) left unanswered");
    }
    if attempt.is_expired_at(Utc::now()) {
        eprintln!("  WARNING: time limit reached, submitting anyway");
    }

    let request = attempt.into_request();
    let result = client.submit_exam(&request).await?;
    println!("Submitted {} answer(s). Score: {:.2}", request.answers.len(), result.score);
    Ok(())
}
