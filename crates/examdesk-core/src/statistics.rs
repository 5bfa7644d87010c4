//! Class statistics and per-question submission review.

use serde::{Deserialize, Serialize};

use crate::model::{AnswerItem, Exam, Question, QuestionKind, Submission, CHOICE_LABELS};

/// Aggregate figures over a class's submissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Mean score over all submissions; `None` when there are none.
    pub average_score: Option<f64>,
}

impl ClassStats {
    pub fn from_submissions(submissions: &[Submission]) -> Self {
        let total = submissions.len();
        let completed = submissions.iter().filter(|s| s.completed).count();
        let average_score = if total == 0 {
            None
        } else {
            Some(submissions.iter().map(|s| s.score).sum::<f64>() / total as f64)
        };
        Self {
            total,
            completed,
            pending: total - completed,
            average_score,
        }
    }
}

/// One checked line of a reviewed question. True/false questions produce
/// one line per statement, other kinds a single line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLine {
    /// Statement text for true/false lines, empty otherwise.
    pub label: String,
    pub your_answer: Option<String>,
    pub correct_answer: Option<String>,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionReview {
    /// 1-based position in the exam.
    pub number: usize,
    pub kind: QuestionKind,
    pub prompt: String,
    pub lines: Vec<ReviewLine>,
}

/// A submission checked question by question against its exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReview {
    pub submission_id: String,
    pub exam_title: String,
    pub score: f64,
    /// Seconds spent.
    pub duration: u64,
    pub questions: Vec<QuestionReview>,
}

impl SubmissionReview {
    /// Pair exam questions with submitted answers by position. Questions
    /// without a stored answer are skipped.
    pub fn build(exam: &Exam, submission: &Submission) -> Self {
        let questions = exam
            .questions
            .iter()
            .zip(&submission.answers)
            .enumerate()
            .map(|(i, (q, answer))| QuestionReview {
                number: i + 1,
                kind: q.question.kind(),
                prompt: q.question.content().to_string(),
                lines: review_lines(&q.question, answer),
            })
            .collect();

        Self {
            submission_id: submission.id.clone(),
            exam_title: exam.title.clone(),
            score: submission.score,
            duration: submission.duration,
            questions,
        }
    }

    /// Number of lines answered correctly, and total lines.
    pub fn tally(&self) -> (usize, usize) {
        let lines = self.questions.iter().flat_map(|q| &q.lines);
        lines.fold((0, 0), |(ok, all), line| {
            (ok + usize::from(line.correct), all + 1)
        })
    }
}

fn choice_label(index: usize) -> String {
    CHOICE_LABELS
        .get(index)
        .map_or_else(|| index.to_string(), char::to_string)
}

fn review_lines(question: &Question, answer: &AnswerItem) -> Vec<ReviewLine> {
    match question {
        Question::MultipleChoice { multichoices } => {
            let review = answer.multichoices.clone().unwrap_or_default();
            let correct = multichoices
                .correct_option()
                .or_else(|| review.correct_answer.and_then(|c| usize::try_from(c).ok()));
            vec![ReviewLine {
                label: String::new(),
                your_answer: review.selected.map(choice_label),
                correct_answer: correct.map(choice_label),
                correct: review.selected.is_some() && review.selected == correct,
            }]
        }
        Question::TrueFalse { truefalse } => {
            let verdicts = answer.truefalse.as_deref().unwrap_or_default();
            truefalse
                .items
                .iter()
                .map(|item| {
                    let given = verdicts
                        .iter()
                        .find(|v| item.id.as_deref() == Some(v.item_id.as_str()));
                    ReviewLine {
                        label: item.statement.clone(),
                        your_answer: given.map(|v| v.answer.to_string()),
                        correct_answer: given.map(|v| v.correct_answer.to_string()),
                        correct: given.is_some_and(|v| v.answer == v.correct_answer),
                    }
                })
                .collect()
        }
        Question::ShortAnswer { shortanswer } => {
            let review = answer.shortanswer.clone().unwrap_or_default();
            let expected = if shortanswer.correct_answer.is_empty() {
                review.correct_answer
            } else {
                Some(shortanswer.correct_answer.clone())
            };
            let given = review.answer.filter(|a| !a.is_empty());
            vec![ReviewLine {
                label: String::new(),
                correct: given.is_some() && given == expected,
                your_answer: given,
                correct_answer: expected,
            }]
        }
    }
}

/// Render seconds as `N min S s`.
pub fn format_duration(seconds: u64) -> String {
    format!("{} min {} s", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(score: f64, completed: bool) -> Submission {
        serde_json::from_value(serde_json::json!({
            "_id": "s",
            "examId": "e",
            "userId": "u",
            "score": score,
            "completed": completed
        }))
        .unwrap()
    }

    #[test]
    fn class_stats() {
        let subs = vec![
            submission(8.0, true),
            submission(6.0, true),
            submission(1.0, false),
        ];
        let stats = ClassStats::from_submissions(&subs);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending, 1);
        assert!((stats.average_score.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn class_stats_empty() {
        let stats = ClassStats::from_submissions(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_score, None);
    }

    #[test]
    fn review_pairs_questions_with_answers() {
        let exam: Exam = serde_json::from_value(serde_json::json!({
            "_id": "e1",
            "title": "Quiz",
            "time": 10,
            "questions": [
                {"_id": "q1", "type": "multichoices",
                 "multichoices": {"content": "2+2?", "options": ["3", "4"], "correctAnswer": 1}},
                {"_id": "q2", "type": "true-false",
                 "truefalse": {"content": "Water", "items": [
                     {"_id": "i1", "statement": "is wet", "correctAnswer": true},
                     {"_id": "i2", "statement": "is dry"}
                 ]}},
                {"_id": "q3", "type": "short-answer",
                 "shortanswer": {"content": "3x4?", "correctAnswer": "12"}}
            ]
        }))
        .unwrap();
        let sub: Submission = serde_json::from_value(serde_json::json!({
            "_id": "s1",
            "examId": "e1",
            "userId": "u1",
            "score": 7.5,
            "duration": 125,
            "completed": true,
            "answers": [
                {"type": "multichoices", "multichoices": {"selected": 1}},
                {"type": "true-false", "truefalse": [
                    {"itemId": "i1", "answer": true, "correctAnswer": true},
                    {"itemId": "i2", "answer": true, "correctAnswer": false}
                ]},
                {"type": "short-answer", "shortanswer": {"answer": "12"}}
            ]
        }))
        .unwrap();

        let review = SubmissionReview::build(&exam, &sub);
        assert_eq!(review.questions.len(), 3);
        assert_eq!(review.questions[0].lines[0].your_answer.as_deref(), Some("B"));
        assert!(review.questions[0].lines[0].correct);
        assert!(review.questions[1].lines[0].correct);
        assert!(!review.questions[1].lines[1].correct);
        assert!(review.questions[2].lines[0].correct);
        assert_eq!(review.tally(), (3, 4));
        assert_eq!(format_duration(review.duration), "2 min 5 s");
    }

    #[test]
    fn unanswered_short_answer_is_wrong() {
        let exam: Exam = serde_json::from_value(serde_json::json!({
            "_id": "e1", "title": "Quiz", "time": 5,
            "questions": [{"_id": "q1", "type": "short-answer",
                           "shortanswer": {"content": "Name?"}}]
        }))
        .unwrap();
        let sub: Submission = serde_json::from_value(serde_json::json!({
            "_id": "s1", "examId": "e1", "userId": "u1",
            "answers": [{"type": "short-answer", "shortanswer": {"answer": ""}}]
        }))
        .unwrap();
        let review = SubmissionReview::build(&exam, &sub);
        let line = &review.questions[0].lines[0];
        assert_eq!(line.your_answer, None);
        assert!(!line.correct);
    }
}
