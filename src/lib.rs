//! # Survey
//!
//! Client side of the Nanotronics survey.
//!
//! ## Flow
//!
//! - A welcome screen, dismissed once, then 11 steps shown one at a time
//! - Moving between steps reads the visible controls into the answer record first
//! - Tag pickers are read once, on submit
//! - Submit posts the whole record to `/api/submit`
//! - If that fails in any way, the record is appended to a local JSON list and
//!   the user still lands on the thank-you screen
//!
//! ## Inputs
//!
//! | Input | Effect |
//! |-------|--------|
//! | `ArrowRight` | next |
//! | `ArrowLeft` | previous |
//! | `Enter` | next, submit on the last step |
//! | swipe left, 50px or more | next |
//! | swipe right, 50px or more | previous |
//!
//! The same state machine backs the browser script served by the backend and
//! the terminal kiosk.

pub mod collector;
pub mod controller;
pub mod form;
pub mod submit;
pub mod view;

pub use controller::{Input, NavigationError, Phase, SurveyController, SurveyState, Transition};
pub use form::{Control, Form, MemoryForm};
pub use submit::{LocalCache, Outcome, SubmissionClient};
pub use view::ViewModel;
