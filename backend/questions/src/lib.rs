//! # Questions
//!
//! Shared survey model used by the backend and the clients.
//!
//! ## Contents
//! - [`catalog`]: the fixed 11-step questionnaire, one [`catalog::StepDef`] per screen
//! - [`answers`]: the loosely-typed [`answers::AnswerRecord`] built up while the user navigates
//! - [`submission`]: the typed [`submission::SurveySubmission`] validated at the server boundary
//!   and the persisted [`submission::StoredResponse`]
//!
//! Field names are fixed. Anything that is not in the catalog is rejected when a
//! submission is validated.

pub mod answers;
pub mod catalog;
pub mod submission;

pub use answers::{AnswerRecord, AnswerValue};
pub use catalog::{FieldDef, FieldKind, STEP_COUNT, Step, StepDef};
pub use submission::{StoredResponse, SurveySubmission, ValidationError};
