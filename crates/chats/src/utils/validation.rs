//! Validation utilities.
//!
//! Everything here runs before any storage access, so rejected input never
//! reaches a repository.

use crate::types::ChatError;

/// Shortest accepted search query, counted in characters after trimming.
pub const MIN_QUERY_CHARS: usize = 2;

/// Validation utilities
pub struct Validator;

impl Validator {
    /// Validate and trim a search query
    pub fn search_query(query: &str) -> Result<&str, ChatError> {
        let trimmed = query.trim();
        let length = trimmed.chars().count();

        if length < MIN_QUERY_CHARS {
            return Err(ChatError::invalid_argument(format!(
                "search query must be at least {MIN_QUERY_CHARS} characters"
            )));
        }

        Ok(trimmed)
    }

    /// Conversation ids are opaque; only a blank id is malformed.
    pub fn conversation_id(id: &str) -> Result<(), ChatError> {
        if id.trim().is_empty() {
            return Err(ChatError::invalid_argument("conversation id cannot be empty"));
        }
        Ok(())
    }

    /// Validate a message sequence reference
    pub fn sequence(sequence: i64) -> Result<(), ChatError> {
        if sequence <= 0 {
            return Err(ChatError::invalid_argument(
                "message id must be a positive integer",
            ));
        }
        Ok(())
    }

    /// Resolve a requested page size against a default and a ceiling.
    ///
    /// Zero is rejected; values above `max` are clamped.
    pub fn limit(requested: Option<u32>, default: u32, max: u32) -> Result<usize, ChatError> {
        match requested {
            Some(0) => Err(ChatError::invalid_argument("limit must be positive")),
            Some(limit) => Ok(limit.min(max) as usize),
            None => Ok(default.min(max) as usize),
        }
    }
}
