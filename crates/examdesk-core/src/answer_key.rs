//! Answer-key entry for parsed questions.
//!
//! Patches never mutate a shared record: [`Question::with_answer`] and
//! [`QuestionSet::apply`] return updated copies.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnswerKeyError;
use crate::model::{Question, QuestionKind, CHOICE_LABELS};

/// An author-supplied answer for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerPatch {
    /// Correct option index of a multiple-choice question.
    Choice(usize),
    /// Verdict for one statement of a true/false question.
    Statement { index: usize, value: bool },
    /// Verdicts for every statement of a true/false question, in order.
    Statements(Vec<bool>),
    /// Expected text of a short-answer question.
    Text(String),
}

impl AnswerPatch {
    fn kind(&self) -> QuestionKind {
        match self {
            AnswerPatch::Choice(_) => QuestionKind::MultipleChoice,
            AnswerPatch::Statement { .. } | AnswerPatch::Statements(_) => QuestionKind::TrueFalse,
            AnswerPatch::Text(_) => QuestionKind::ShortAnswer,
        }
    }

    /// Build a choice patch from a label such as `B` or `b`.
    pub fn choice_label(label: &str) -> Result<Self, AnswerKeyError> {
        label.parse()
    }
}

impl FromStr for AnswerPatch {
    type Err = AnswerKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => CHOICE_LABELS
                .iter()
                .position(|l| *l == c.to_ascii_uppercase())
                .map(AnswerPatch::Choice)
                .ok_or_else(|| AnswerKeyError::InvalidChoice(s.to_string())),
            _ => Err(AnswerKeyError::InvalidChoice(s.to_string())),
        }
    }
}

fn kind_name(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::MultipleChoice => "multiple-choice",
        QuestionKind::TrueFalse => "true/false",
        QuestionKind::ShortAnswer => "short-answer",
    }
}

impl Question {
    /// Return a copy of this question with the patch applied.
    pub fn with_answer(&self, patch: &AnswerPatch) -> Result<Question, AnswerKeyError> {
        let mismatch = || AnswerKeyError::KindMismatch {
            patch: kind_name(patch.kind()),
            question: kind_name(self.kind()),
        };

        let mut updated = self.clone();
        match (&mut updated, patch) {
            (Question::MultipleChoice { multichoices }, AnswerPatch::Choice(index)) => {
                let len = multichoices.options.len();
                if *index >= len {
                    return Err(AnswerKeyError::AnswerOutOfRange { index: *index, len });
                }
                multichoices.correct_answer = *index as i32;
            }
            (Question::TrueFalse { truefalse }, AnswerPatch::Statement { index, value }) => {
                let len = truefalse.items.len();
                let item = truefalse
                    .items
                    .get_mut(*index)
                    .ok_or(AnswerKeyError::AnswerOutOfRange { index: *index, len })?;
                item.correct_answer = *value;
            }
            (Question::TrueFalse { truefalse }, AnswerPatch::Statements(values)) => {
                let len = truefalse.items.len();
                if values.len() > len {
                    return Err(AnswerKeyError::AnswerOutOfRange {
                        index: values.len() - 1,
                        len,
                    });
                }
                for (item, value) in truefalse.items.iter_mut().zip(values) {
                    item.correct_answer = *value;
                }
            }
            (Question::ShortAnswer { shortanswer }, AnswerPatch::Text(text)) => {
                shortanswer.correct_answer = text.trim().to_string();
            }
            _ => return Err(mismatch()),
        }
        Ok(updated)
    }
}

/// An ordered, immutable list of questions being authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Return a new set with question `index` (zero-based) patched.
    pub fn apply(&self, index: usize, patch: &AnswerPatch) -> Result<QuestionSet, AnswerKeyError> {
        let current = self
            .questions
            .get(index)
            .ok_or(AnswerKeyError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            })?;
        let updated = current.with_answer(patch)?;

        let mut questions = self.questions.clone();
        questions[index] = updated;
        Ok(QuestionSet { questions })
    }

    /// Zero-based positions of multiple-choice questions with no answer set,
    /// and short-answer questions with an empty expected answer.
    pub fn missing_answers(&self) -> Vec<usize> {
        self.questions
            .iter()
            .enumerate()
            .filter(|(_, q)| match q {
                Question::MultipleChoice { multichoices } => {
                    multichoices.correct_option().is_none()
                }
                Question::ShortAnswer { shortanswer } => shortanswer.correct_answer.is_empty(),
                // every statement has a verdict, false by default
                Question::TrueFalse { .. } => false,
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn into_inner(self) -> Vec<Question> {
        self.questions
    }
}

impl From<Vec<Question>> for QuestionSet {
    fn from(questions: Vec<Question>) -> Self {
        Self::new(questions)
    }
}
