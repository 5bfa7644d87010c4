//! A student's in-progress exam attempt.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};

use crate::error::AttemptError;
use crate::model::{Exam, Question, StatementAnswer, SubmissionRequest, SubmittedAnswer};

/// An answer recorded for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptAnswer {
    Choice(usize),
    /// Verdicts keyed by statement id.
    Statements(BTreeMap<String, bool>),
    Text(String),
}

/// Answers collected while taking an exam, plus the countdown.
#[derive(Debug, Clone)]
pub struct ExamAttempt {
    exam: Exam,
    user_id: String,
    started_at: DateTime<Utc>,
    answers: HashMap<String, AttemptAnswer>,
}

impl ExamAttempt {
    pub fn new(exam: Exam, user_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            exam,
            user_id: user_id.into(),
            started_at,
            answers: HashMap::new(),
        }
    }

    /// Start an attempt now.
    pub fn start(exam: Exam, user_id: impl Into<String>) -> Self {
        Self::new(exam, user_id, Utc::now())
    }

    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + Duration::minutes(i64::from(self.exam.time))
    }

    /// Time left at `now`, never negative.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.deadline() - now).max(Duration::zero())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }

    /// Countdown at `now` as `MM:SS`.
    pub fn clock_at(&self, now: DateTime<Utc>) -> String {
        format_clock(self.remaining_at(now).num_seconds())
    }

    /// Record the chosen option of a multiple-choice question.
    pub fn choose(&mut self, question_id: &str, index: usize) -> Result<(), AttemptError> {
        match self.question(question_id)? {
            Question::MultipleChoice { multichoices } => {
                let len = multichoices.options.len();
                if index >= len {
                    return Err(AttemptError::OptionOutOfRange { index, len });
                }
            }
            _ => return Err(wrong_kind(question_id, "multiple-choice")),
        }
        self.answers
            .insert(question_id.to_string(), AttemptAnswer::Choice(index));
        Ok(())
    }

    /// Record a verdict for one statement of a true/false question.
    pub fn mark(
        &mut self,
        question_id: &str,
        item_id: &str,
        value: bool,
    ) -> Result<(), AttemptError> {
        match self.question(question_id)? {
            Question::TrueFalse { truefalse } => {
                if !truefalse
                    .items
                    .iter()
                    .any(|item| item.id.as_deref() == Some(item_id))
                {
                    return Err(AttemptError::UnknownStatement(item_id.to_string()));
                }
            }
            _ => return Err(wrong_kind(question_id, "true/false")),
        }

        let entry = self
            .answers
            .entry(question_id.to_string())
            .or_insert_with(|| AttemptAnswer::Statements(BTreeMap::new()));
        if let AttemptAnswer::Statements(verdicts) = entry {
            verdicts.insert(item_id.to_string(), value);
        }
        Ok(())
    }

    /// Record the text answer of a short-answer question.
    pub fn write(&mut self, question_id: &str, text: impl Into<String>) -> Result<(), AttemptError> {
        if !matches!(self.question(question_id)?, Question::ShortAnswer { .. }) {
            return Err(wrong_kind(question_id, "short-answer"));
        }
        self.answers
            .insert(question_id.to_string(), AttemptAnswer::Text(text.into()));
        Ok(())
    }

    pub fn answer(&self, question_id: &str) -> Option<&AttemptAnswer> {
        self.answers.get(question_id)
    }

    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    /// Ids of questions with no answer yet, in exam order.
    pub fn unanswered(&self) -> Vec<&str> {
        self.exam
            .questions
            .iter()
            .filter(|q| !self.answers.contains_key(&q.id))
            .map(|q| q.id.as_str())
            .collect()
    }

    /// Build the submission payload. Only answered questions are sent.
    pub fn into_request(mut self) -> SubmissionRequest {
        let mut answers = Vec::with_capacity(self.answers.len());
        for q in &self.exam.questions {
            let Some(answer) = self.answers.remove(&q.id) else {
                continue;
            };
            let question_id = q.id.clone();
            answers.push(match answer {
                AttemptAnswer::Choice(multichoices) => SubmittedAnswer::MultipleChoice {
                    question_id,
                    multichoices,
                },
                AttemptAnswer::Statements(verdicts) => SubmittedAnswer::TrueFalse {
                    question_id,
                    truefalse: verdicts
                        .into_iter()
                        .map(|(item_id, answer)| StatementAnswer { item_id, answer })
                        .collect(),
                },
                AttemptAnswer::Text(shortanswer) => SubmittedAnswer::ShortAnswer {
                    question_id,
                    shortanswer,
                },
            });
        }

        SubmissionRequest {
            exam_id: self.exam.id,
            user_id: self.user_id,
            class_id: self.exam.class_id,
            started_at: self.started_at,
            answers,
        }
    }

    fn question(&self, question_id: &str) -> Result<&Question, AttemptError> {
        self.exam
            .question(question_id)
            .map(|q| &q.question)
            .ok_or_else(|| AttemptError::UnknownQuestion(question_id.to_string()))
    }
}

fn wrong_kind(question_id: &str, expected: &'static str) -> AttemptError {
    AttemptError::WrongKind {
        question_id: question_id.to_string(),
        expected,
    }
}

/// Format whole seconds as `MM:SS`. Negative input shows `00:00`.
pub fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
