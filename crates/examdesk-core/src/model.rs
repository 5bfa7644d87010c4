//! Core data model types for examdesk.
//!
//! Field names follow the backend's JSON so the types can be sent and
//! received as-is.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for a multiple-choice question whose answer is not yet chosen.
pub const UNSET_ANSWER: i32 = -1;

/// Option labels, in order.
pub const CHOICE_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

// ---------------------------------------------------------------------------
// Users and classes
// ---------------------------------------------------------------------------

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub birth: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub create_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name as shown on the exam header: last name first.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.last_name, self.first_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// One entry of the signed-in user's class list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMembership {
    pub info: MembershipInfo,
    pub class: ClassSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipInfo {
    pub user_id: String,
    pub class_id: String,
    pub role: String,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub name: String,
    #[serde(default)]
    pub max_mem: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Role a member holds within a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Leader,
    Member,
    #[serde(other)]
    Unknown,
}

/// A member as listed in class details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: String,
    pub role: MemberRole,
    #[serde(default)]
    pub joined_at: Option<String>,
}

/// Full class details from `getclassinfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_mem: Option<u32>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub create_at: Option<DateTime<Utc>>,
}

impl ClassInfo {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    /// Whether the user leads this class (and may author exams for it).
    pub fn is_leader(&self, user_id: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.user_id == user_id && m.role == MemberRole::Leader)
    }
}

/// Display info for another user, from `getUserInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub joined_at: Option<String>,
}

/// Payload for POST /class/createclass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub name: String,
    pub description: String,
    /// `None` is sent as `null`, meaning no limit.
    pub max_mem: Option<u32>,
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Kind of question, as tagged on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "multichoices")]
    MultipleChoice,
    #[serde(rename = "true-false")]
    TrueFalse,
    #[serde(rename = "short-answer")]
    ShortAnswer,
}

impl QuestionKind {
    /// Section name used in exam summaries.
    pub fn section_name(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "Multiple choice",
            QuestionKind::TrueFalse => "True/False",
            QuestionKind::ShortAnswer => "Short answer",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "multichoices"),
            QuestionKind::TrueFalse => write!(f, "true-false"),
            QuestionKind::ShortAnswer => write!(f, "short-answer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoice {
    pub content: String,
    pub options: Vec<String>,
    /// Index into `options`, or [`UNSET_ANSWER`].
    #[serde(default = "unset_answer")]
    pub correct_answer: i32,
}

fn unset_answer() -> i32 {
    UNSET_ANSWER
}

impl MultipleChoice {
    pub fn new(content: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            content: content.into(),
            options,
            correct_answer: UNSET_ANSWER,
        }
    }

    /// The chosen option index, if one has been set.
    pub fn correct_option(&self) -> Option<usize> {
        usize::try_from(self.correct_answer)
            .ok()
            .filter(|&i| i < self.options.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub statement: String,
    #[serde(default)]
    pub correct_answer: bool,
}

impl TrueFalseItem {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            id: None,
            statement: statement.into(),
            correct_answer: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueFalse {
    pub content: String,
    pub items: Vec<TrueFalseItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortAnswer {
    pub content: String,
    #[serde(default)]
    pub correct_answer: String,
}

/// A single exam question. Exactly one payload exists, matching the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Question {
    #[serde(rename = "multichoices")]
    MultipleChoice { multichoices: MultipleChoice },
    #[serde(rename = "true-false")]
    TrueFalse { truefalse: TrueFalse },
    #[serde(rename = "short-answer")]
    ShortAnswer { shortanswer: ShortAnswer },
}

impl Question {
    pub fn multiple_choice(content: impl Into<String>, options: Vec<String>) -> Self {
        Question::MultipleChoice {
            multichoices: MultipleChoice::new(content, options),
        }
    }

    pub fn true_false(content: impl Into<String>, statements: Vec<String>) -> Self {
        Question::TrueFalse {
            truefalse: TrueFalse {
                content: content.into(),
                items: statements.into_iter().map(TrueFalseItem::new).collect(),
            },
        }
    }

    pub fn short_answer(content: impl Into<String>) -> Self {
        Question::ShortAnswer {
            shortanswer: ShortAnswer {
                content: content.into(),
                correct_answer: String::new(),
            },
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            Question::TrueFalse { .. } => QuestionKind::TrueFalse,
            Question::ShortAnswer { .. } => QuestionKind::ShortAnswer,
        }
    }

    /// The prompt text.
    pub fn content(&self) -> &str {
        match self {
            Question::MultipleChoice { multichoices } => &multichoices.content,
            Question::TrueFalse { truefalse } => &truefalse.content,
            Question::ShortAnswer { shortanswer } => &shortanswer.content,
        }
    }
}

// ---------------------------------------------------------------------------
// Exams
// ---------------------------------------------------------------------------

/// Per-section scoring weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionScores {
    pub multichoices: f64,
    pub truefalse: f64,
    pub shortanswer: f64,
}

/// Payload for POST /exam/createexam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExam {
    pub title: String,
    /// Owner (author) user id.
    pub upload_by: String,
    /// Time limit in minutes.
    pub time: u32,
    pub class_id: Option<String>,
    pub score: SectionScores,
    pub questions: Vec<Question>,
}

/// A stored question with its backend id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamQuestion {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub question: Question,
}

/// An exam as returned by GET /exam/info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub upload_by: String,
    pub time: u32,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub score: SectionScores,
    #[serde(default)]
    pub questions: Vec<ExamQuestion>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Exam {
    pub fn question(&self, id: &str) -> Option<&ExamQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Distinct section names in first-appearance order.
    pub fn sections(&self) -> Vec<&'static str> {
        let mut sections = Vec::new();
        for q in &self.questions {
            let name = q.question.kind().section_name();
            if !sections.contains(&name) {
                sections.push(name);
            }
        }
        sections
    }
}

/// Response to POST /exam/createexam.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatedExam {
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// One statement verdict in a true/false answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementAnswer {
    pub item_id: String,
    pub answer: bool,
}

/// A submitted answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SubmittedAnswer {
    #[serde(rename = "multichoices", rename_all = "camelCase")]
    MultipleChoice {
        question_id: String,
        multichoices: usize,
    },
    #[serde(rename = "true-false", rename_all = "camelCase")]
    TrueFalse {
        question_id: String,
        truefalse: Vec<StatementAnswer>,
    },
    #[serde(rename = "short-answer", rename_all = "camelCase")]
    ShortAnswer {
        question_id: String,
        shortanswer: String,
    },
}

/// Payload for POST /exam/submitexam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub exam_id: String,
    pub user_id: String,
    pub class_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub answers: Vec<SubmittedAnswer>,
}

/// Response to POST /exam/submitexam.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceReview {
    #[serde(default)]
    pub selected: Option<usize>,
    #[serde(default)]
    pub correct_answer: Option<i32>,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementReview {
    pub item_id: String,
    pub answer: bool,
    pub correct_answer: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextReview {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

/// A graded answer as stored in a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerItem {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub multichoices: Option<ChoiceReview>,
    #[serde(default)]
    pub truefalse: Option<Vec<StatementReview>>,
    #[serde(default)]
    pub shortanswer: Option<TextReview>,
}

/// A stored exam submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(rename = "_id")]
    pub id: String,
    pub exam_id: String,
    pub user_id: String,
    #[serde(default)]
    pub answers: Vec<AnswerItem>,
    #[serde(default)]
    pub score: f64,
    /// Seconds spent.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_wire_shape() {
        let q = Question::multiple_choice("What is 2+2?", vec!["3".into(), "4".into()]);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "multichoices");
        assert_eq!(json["multichoices"]["content"], "What is 2+2?");
        assert_eq!(json["multichoices"]["correctAnswer"], -1);

        let tf = Question::true_false("Check", vec!["x".into()]);
        let json = serde_json::to_value(&tf).unwrap();
        assert_eq!(json["type"], "true-false");
        assert_eq!(json["truefalse"]["items"][0]["correctAnswer"], false);
        assert!(json["truefalse"]["items"][0].get("_id").is_none());
    }

    #[test]
    fn exam_question_with_id() {
        let raw = serde_json::json!({
            "_id": "q1",
            "type": "short-answer",
            "shortanswer": {"content": "Capital of France?"}
        });
        let q: ExamQuestion = serde_json::from_value(raw).unwrap();
        assert_eq!(q.id, "q1");
        assert_eq!(q.question.kind(), QuestionKind::ShortAnswer);
        assert_eq!(q.question.content(), "Capital of France?");
    }

    #[test]
    fn correct_option_respects_sentinel() {
        let mut mc = MultipleChoice::new("q", vec!["a".into(), "b".into()]);
        assert_eq!(mc.correct_option(), None);
        mc.correct_answer = 1;
        assert_eq!(mc.correct_option(), Some(1));
        mc.correct_answer = 5;
        assert_eq!(mc.correct_option(), None);
    }

    #[test]
    fn submitted_answer_wire_shape() {
        let a = SubmittedAnswer::TrueFalse {
            question_id: "q2".into(),
            truefalse: vec![StatementAnswer {
                item_id: "i1".into(),
                answer: true,
            }],
        };
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["type"], "true-false");
        assert_eq!(json["questionId"], "q2");
        assert_eq!(json["truefalse"][0]["itemId"], "i1");
    }

    #[test]
    fn class_roles() {
        let info: ClassInfo = serde_json::from_value(serde_json::json!({
            "_id": "c1",
            "name": "Math 10",
            "members": [
                {"userId": "u1", "role": "leader"},
                {"userId": "u2", "role": "member"},
                {"userId": "u3", "role": "guest"}
            ]
        }))
        .unwrap();
        assert!(info.is_leader("u1"));
        assert!(!info.is_leader("u2"));
        assert!(info.is_member("u3"));
        assert_eq!(info.members[2].role, MemberRole::Unknown);
    }

    #[test]
    fn user_display_name_falls_back_to_username() {
        let user: User = serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "username": "student01",
            "email": "s@example.com"
        }))
        .unwrap();
        assert_eq!(user.display_name(), "student01");
    }
}
