//! TOML exam drafts.
//!
//! A draft holds the exam header, the three pasted text blobs and an answer
//! key. Loading runs the text parser and applies the key, producing a
//! [`NewExam`] ready for upload.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::answer_key::{AnswerPatch, QuestionSet};
use crate::model::{NewExam, Question, QuestionKind, SectionScores};
use crate::parser::{ExamText, ExamTextParser, LabelGrammar, DEFAULT_QUESTION_LABEL};

/// Intermediate TOML structure for exam draft files.
#[derive(Debug, Deserialize)]
struct TomlDraftFile {
    title: String,
    #[serde(default = "default_time")]
    time: u32,
    #[serde(default)]
    class_id: Option<String>,
    #[serde(default)]
    question_label: Option<String>,
    #[serde(default)]
    score: SectionScores,
    #[serde(default)]
    text: TomlDraftText,
    #[serde(default)]
    answers: Vec<TomlAnswer>,
}

fn default_time() -> u32 {
    45
}

#[derive(Debug, Default, Deserialize)]
struct TomlDraftText {
    #[serde(default)]
    multiple_choice: String,
    #[serde(default)]
    true_false: String,
    #[serde(default)]
    short_answer: String,
}

#[derive(Debug, Deserialize)]
struct TomlAnswer {
    /// 1-based position across all parsed questions.
    question: usize,
    #[serde(default)]
    choice: Option<String>,
    #[serde(default)]
    statements: Option<Vec<bool>>,
    #[serde(default)]
    text: Option<String>,
}

impl TomlAnswer {
    fn to_patch(&self) -> Result<AnswerPatch> {
        match (&self.choice, &self.statements, &self.text) {
            (Some(choice), None, None) => Ok(choice.parse::<AnswerPatch>()?),
            (None, Some(values), None) => Ok(AnswerPatch::Statements(values.clone())),
            (None, None, Some(text)) => Ok(AnswerPatch::Text(text.clone())),
            _ => anyhow::bail!(
                "answer for question {} must set exactly one of choice, statements, text",
                self.question
            ),
        }
    }
}

/// A parsed exam draft with its answer key applied.
#[derive(Debug, Clone)]
pub struct ExamDraft {
    pub title: String,
    /// Time limit in minutes.
    pub time: u32,
    pub class_id: Option<String>,
    pub score: SectionScores,
    pub questions: QuestionSet,
}

impl ExamDraft {
    /// Build the upload payload, owned by `upload_by`.
    pub fn into_new_exam(self, upload_by: impl Into<String>) -> NewExam {
        NewExam {
            title: self.title,
            upload_by: upload_by.into(),
            time: self.time,
            class_id: self.class_id,
            score: self.score,
            questions: self.questions.into_inner(),
        }
    }
}

/// Load an exam draft from a TOML file.
pub fn load_exam_draft(path: &Path) -> Result<ExamDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam draft: {}", path.display()))?;
    parse_exam_draft_str(&content, path)
}

/// Parse an exam draft from a TOML string.
pub fn parse_exam_draft_str(content: &str, source_path: &Path) -> Result<ExamDraft> {
    let parsed: TomlDraftFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let label = parsed
        .question_label
        .as_deref()
        .unwrap_or(DEFAULT_QUESTION_LABEL);
    let grammar = LabelGrammar::new(label)
        .with_context(|| format!("invalid question label: {label}"))?;
    let parser = ExamTextParser::new(grammar);

    let text = ExamText {
        multiple_choice: parsed.text.multiple_choice,
        true_false: parsed.text.true_false,
        short_answer: parsed.text.short_answer,
    };
    let mut questions = QuestionSet::new(parser.parse_exam_text(&text));
    tracing::debug!(
        path = %source_path.display(),
        questions = questions.len(),
        "parsed exam draft"
    );

    for answer in &parsed.answers {
        if answer.question == 0 {
            anyhow::bail!("answer key positions start at 1");
        }
        let patch = answer.to_patch()?;
        questions = questions
            .apply(answer.question - 1, &patch)
            .with_context(|| format!("answer key entry for question {}", answer.question))?;
    }

    Ok(ExamDraft {
        title: parsed.title,
        time: parsed.time,
        class_id: parsed.class_id,
        score: parsed.score,
        questions,
    })
}

/// A warning from exam draft validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question position (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate an exam draft for common issues.
pub fn validate_exam_draft(draft: &ExamDraft) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if draft.title.trim().is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "title is empty".into(),
        });
    }

    if draft.time == 0 {
        warnings.push(ValidationWarning {
            question: None,
            message: "time limit must be greater than zero".into(),
        });
    }

    let scores = [
        (QuestionKind::MultipleChoice, draft.score.multichoices),
        (QuestionKind::TrueFalse, draft.score.truefalse),
        (QuestionKind::ShortAnswer, draft.score.shortanswer),
    ];
    for (kind, score) in scores {
        if score < 0.0 {
            warnings.push(ValidationWarning {
                question: None,
                message: format!("{} score is negative", kind.section_name()),
            });
        }
    }

    if draft.questions.is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "no questions found, check the question markers".into(),
        });
    }

    for (i, question) in draft.questions.questions().iter().enumerate() {
        if question.content().is_empty() {
            warnings.push(ValidationWarning {
                question: Some(i + 1),
                message: "prompt is empty".into(),
            });
        }
        match question {
            Question::MultipleChoice { multichoices }
                if multichoices.options.is_empty() =>
            {
                warnings.push(ValidationWarning {
                    question: Some(i + 1),
                    message: "no options found (expected A. B. C. D.)".into(),
                });
            }
            Question::TrueFalse { truefalse } if truefalse.items.is_empty() => {
                warnings.push(ValidationWarning {
                    question: Some(i + 1),
                    message: "no statements found (expected a) b) c) d))".into(),
                });
            }
            _ => {}
        }
    }

    for i in draft.questions.missing_answers() {
        warnings.push(ValidationWarning {
            question: Some(i + 1),
            message: "no correct answer set".into(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_DRAFT: &str = r#"
title = "Midterm"
time = 30
class_id = "class-1"

[score]
multichoices = 6.0
truefalse = 2.0
shortanswer = 2.0

[text]
multiple_choice = """
Question 1: What is 2+2? A. 3 B. 4 C. 5 D. 6
Question 2: Largest planet? A. Mars B. Earth C. Jupiter D. Venus
"""
true_false = "Question 1: Water a) boils at 100C b) is dry"
short_answer = "Question 1: 3 x 4 = ?"

[[answers]]
question = 1
choice = "B"

[[answers]]
question = 2
choice = "c"

[[answers]]
question = 3
statements = [true, false]

[[answers]]
question = 4
text = "12"
"#;

    #[test]
    fn parse_valid_draft() {
        let draft = parse_exam_draft_str(VALID_DRAFT, &PathBuf::from("draft.toml")).unwrap();
        assert_eq!(draft.title, "Midterm");
        assert_eq!(draft.questions.len(), 4);
        assert!(draft.questions.missing_answers().is_empty());
        assert!(validate_exam_draft(&draft).is_empty());

        let exam = draft.into_new_exam("user-1");
        assert_eq!(exam.upload_by, "user-1");
        assert_eq!(exam.class_id.as_deref(), Some("class-1"));
        match &exam.questions[0] {
            Question::MultipleChoice { multichoices } => {
                assert_eq!(multichoices.correct_option(), Some(1))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn custom_label() {
        let toml = r#"
title = "Kiểm tra"
question_label = "Câu"

[text]
multiple_choice = "Câu 1: 1+1? A. 2 B. 3"
"#;
        let draft = parse_exam_draft_str(toml, &PathBuf::from("draft.toml")).unwrap();
        assert_eq!(draft.questions.len(), 1);
        assert_eq!(draft.time, 45);
    }

    #[test]
    fn answer_key_errors_are_reported() {
        let toml = r#"
title = "Bad"

[text]
short_answer = "Question 1: Name?"

[[answers]]
question = 1
choice = "A"
"#;
        let err = parse_exam_draft_str(toml, &PathBuf::from("draft.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("question 1"));
    }

    #[test]
    fn ambiguous_answer_entry() {
        let toml = r#"
title = "Bad"

[text]
short_answer = "Question 1: Name?"

[[answers]]
question = 1
choice = "A"
text = "x"
"#;
        assert!(parse_exam_draft_str(toml, &PathBuf::from("draft.toml")).is_err());
    }

    #[test]
    fn validate_reports_problems() {
        let toml = r#"
title = " "
time = 0

[score]
multichoices = -1.0

[text]
multiple_choice = "Question 1: no options here"
"#;
        let draft = parse_exam_draft_str(toml, &PathBuf::from("draft.toml")).unwrap();
        let warnings = validate_exam_draft(&draft);
        assert!(warnings.iter().any(|w| w.message.contains("title")));
        assert!(warnings.iter().any(|w| w.message.contains("time limit")));
        assert!(warnings.iter().any(|w| w.message.contains("negative")));
        assert!(warnings
            .iter()
            .any(|w| w.question == Some(1) && w.message.contains("no options")));
    }

    #[test]
    fn empty_draft_warns() {
        let draft = parse_exam_draft_str("title = \"Empty\"", &PathBuf::from("draft.toml")).unwrap();
        let warnings = validate_exam_draft(&draft);
        assert!(warnings.iter().any(|w| w.message.contains("no questions")));
    }

    #[test]
    fn parse_malformed_toml() {
        let result = parse_exam_draft_str("not [valid toml }{", &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exam.toml");
        std::fs::write(&path, VALID_DRAFT).unwrap();
        let draft = load_exam_draft(&path).unwrap();
        assert_eq!(draft.questions.len(), 4);
    }
}
