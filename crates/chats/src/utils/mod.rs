//! Internal utilities for the conversation core.

pub mod text;
pub mod validation;

pub use text::{contains_case_insensitive, escape_like};
pub use validation::Validator;
