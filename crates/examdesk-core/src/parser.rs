//! Exam text parser.
//!
//! Turns pasted question blocks into typed [`Question`] records. A block
//! starts at a question marker such as `Question 12:` and runs until the next
//! marker or the end of the text. Within a block, multiple-choice options are
//! introduced by `A.`..`D.` and true/false statements by `a)`..`d)`.
//!
//! The boundary grammar sits behind [`MarkerGrammar`] so the label words can
//! be swapped without touching the splitting logic. Parsing never fails:
//! text without markers yields an empty list.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::Question;

/// Default label word introducing a question block.
pub const DEFAULT_QUESTION_LABEL: &str = "Question";

/// Upper bound on options or statements kept per block.
pub const MAX_CHOICES: usize = 4;

/// Patterns that delimit questions, options and statements.
///
/// Option and statement patterns are matched against a single block; the
/// text between consecutive matches becomes one option or statement.
pub trait MarkerGrammar: Send + Sync {
    /// Marks the start of a question block.
    fn question_marker(&self) -> &Regex;

    /// Marks a multiple-choice option (`A.`..`D.`).
    fn option_marker(&self) -> &Regex;

    /// Marks a true/false statement (`a)`..`d)`).
    fn statement_marker(&self) -> &Regex;
}

/// The stock grammar: `<label> <n>:`, `A.`..`D.`, `a)`..`d)`.
///
/// Option and statement labels count only at a token boundary, meaning the
/// start of the block or right after whitespace.
#[derive(Debug, Clone)]
pub struct LabelGrammar {
    label: String,
    question: Regex,
    option: Regex,
    statement: Regex,
}

impl LabelGrammar {
    /// Build a grammar whose question marker uses `label` verbatim.
    pub fn new(label: &str) -> Result<Self, regex::Error> {
        let question = Regex::new(&format!(r"\b{}\s*\d+\s*:", regex::escape(label)))?;
        let option = Regex::new(r"(?:^|\s)[ABCD]\.")?;
        let statement = Regex::new(r"(?:^|\s)[abcd]\)")?;
        Ok(Self {
            label: label.to_string(),
            question,
            option,
            statement,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for LabelGrammar {
    fn default() -> Self {
        DEFAULT_GRAMMAR.clone()
    }
}

impl MarkerGrammar for LabelGrammar {
    fn question_marker(&self) -> &Regex {
        &self.question
    }

    fn option_marker(&self) -> &Regex {
        &self.option
    }

    fn statement_marker(&self) -> &Regex {
        &self.statement
    }
}

static DEFAULT_GRAMMAR: LazyLock<LabelGrammar> = LazyLock::new(|| {
    LabelGrammar::new(DEFAULT_QUESTION_LABEL).expect("default grammar patterns are valid")
});

/// The three raw text blobs an author pastes in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamText {
    #[serde(default)]
    pub multiple_choice: String,
    #[serde(default)]
    pub true_false: String,
    #[serde(default)]
    pub short_answer: String,
}

/// Parser bound to a marker grammar.
#[derive(Debug, Clone, Default)]
pub struct ExamTextParser<G = LabelGrammar> {
    grammar: G,
}

impl<G: MarkerGrammar> ExamTextParser<G> {
    pub fn new(grammar: G) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &G {
        &self.grammar
    }

    /// Split text into question blocks, marker stripped and trimmed.
    pub fn blocks<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let markers: Vec<_> = self.grammar.question_marker().find_iter(text).collect();
        markers
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
                text[m.end()..end].trim()
            })
            .collect()
    }

    /// Parse multiple-choice blocks. Answers start unset.
    pub fn parse_multiple_choice(&self, text: &str) -> Vec<Question> {
        self.blocks(text)
            .into_iter()
            .map(|block| {
                let (prompt, options) = split_labelled(block, self.grammar.option_marker());
                Question::multiple_choice(prompt, options)
            })
            .collect()
    }

    /// Parse true/false blocks. Every statement starts `false`.
    pub fn parse_true_false(&self, text: &str) -> Vec<Question> {
        self.blocks(text)
            .into_iter()
            .map(|block| {
                let (prompt, statements) =
                    split_labelled(block, self.grammar.statement_marker());
                Question::true_false(prompt, statements)
            })
            .collect()
    }

    /// Parse short-answer blocks; the whole block is the prompt.
    pub fn parse_short_answer(&self, text: &str) -> Vec<Question> {
        self.blocks(text)
            .into_iter()
            .map(Question::short_answer)
            .collect()
    }

    /// Parse all three blobs, in multiple-choice, true/false, short-answer order.
    pub fn parse_exam_text(&self, text: &ExamText) -> Vec<Question> {
        let mut questions = self.parse_multiple_choice(&text.multiple_choice);
        questions.extend(self.parse_true_false(&text.true_false));
        questions.extend(self.parse_short_answer(&text.short_answer));
        questions
    }
}

/// Split a block into the prompt before the first marker and the labelled
/// fragments after it.
fn split_labelled(block: &str, marker: &Regex) -> (String, Vec<String>) {
    let markers: Vec<_> = marker.find_iter(block).collect();
    let Some(first) = markers.first() else {
        return (block.trim().to_string(), Vec::new());
    };

    let prompt = block[..first.start()].trim().to_string();
    let mut fragments: Vec<String> = markers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = markers.get(i + 1).map_or(block.len(), |next| next.start());
            block[m.end()..end].trim().to_string()
        })
        .collect();

    while fragments.last().is_some_and(|f| f.is_empty()) {
        fragments.pop();
    }
    if fragments.len() > MAX_CHOICES {
        tracing::debug!(
            found = fragments.len(),
            "more than {MAX_CHOICES} labelled fragments, extra ones dropped"
        );
        fragments.truncate(MAX_CHOICES);
    }

    (prompt, fragments)
}

/// Parse multiple-choice text with the default grammar.
pub fn parse_multiple_choice(text: &str) -> Vec<Question> {
    ExamTextParser::<LabelGrammar>::default().parse_multiple_choice(text)
}

/// Parse true/false text with the default grammar.
pub fn parse_true_false(text: &str) -> Vec<Question> {
    ExamTextParser::<LabelGrammar>::default().parse_true_false(text)
}

/// Parse short-answer text with the default grammar.
pub fn parse_short_answer(text: &str) -> Vec<Question> {
    ExamTextParser::<LabelGrammar>::default().parse_short_answer(text)
}
