//! examdesk-core: data model, exam text parser, and client-side exam logic.
//!
//! This crate defines the types exchanged with the exam backend, the parser
//! that turns pasted question text into questions, and the traits the
//! session manager in `examdesk-client` is built on.

pub mod answer_key;
pub mod attempt;
pub mod draft;
pub mod error;
pub mod invite;
pub mod model;
pub mod parser;
pub mod statistics;
pub mod traits;
pub mod validation;
