pub mod account;
pub mod classes;
pub mod exams;
pub mod init;
pub mod parse;
pub mod submissions;
pub mod submit;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::Table;

use examdesk_client::{load_config_from, ApiClient, ClientConfig};
use examdesk_core::error::{ClientError, ErrorCategory};
use examdesk_core::model::{Question, CHOICE_LABELS};

pub fn load_config(config_path: Option<PathBuf>) -> Result<ClientConfig> {
    load_config_from(config_path.as_deref())
}

/// Build an API client from the configuration.
pub fn connect(config_path: Option<PathBuf>) -> Result<ApiClient> {
    let config = load_config(config_path)?;
    tracing::debug!(base_url = %config.base_url, "connecting");
    ApiClient::from_config(&config).context("failed to set up the API client")
}

/// Follow-up advice for a failed command, picked by error category.
pub fn hint(err: &anyhow::Error) -> Option<&'static str> {
    let client_err = err.chain().find_map(|e| e.downcast_ref::<ClientError>())?;
    match client_err.category() {
        ErrorCategory::Authentication => Some("run `examdesk signin` to sign in again"),
        ErrorCategory::Transient if !client_err.is_permanent() => {
            Some("check the server address and network, then try again")
        }
        _ => None,
    }
}

pub fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_header(header);
    table
}

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Print a question with its options or statements, numbered from 1.
pub fn print_question(number: usize, question: &Question) {
    println!("{number}. [{}] {}", question.kind(), question.content());
    match question {
        Question::MultipleChoice { multichoices } => {
            for (label, option) in CHOICE_LABELS.iter().zip(&multichoices.options) {
                println!("   {label}. {option}");
            }
        }
        Question::TrueFalse { truefalse } => {
            for (label, item) in ('a'..='z').zip(&truefalse.items) {
                println!("   {label}) {}", item.statement);
            }
        }
        Question::ShortAnswer { .. } => {}
    }
}
