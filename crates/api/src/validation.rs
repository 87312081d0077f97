//! Boundary validation.
//!
//! Every request payload is validated by an explicit function on its
//! request type, returning a structured list of field errors, before any
//! component logic runs. Per-field checks live in the `clementine-core`
//! newtypes; this module only provides the error-collection shape.

use serde::Serialize;
use thiserror::Error;

/// A single failed field check.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// The offending input field.
    pub field: &'static str,
    /// Human-readable description of the failure.
    pub message: String,
}

/// Validation failures for one request payload.
///
/// Collects every failed field instead of stopping at the first, so the
/// client sees the full list in one 400 response.
#[derive(Debug, Default, Error)]
#[error("validation failed")]
pub struct ValidationErrors {
    /// The collected field errors.
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Start an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record a failed check for `field`.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Run a fallible parse, recording the error under `field`.
    pub fn check<T, E: std::fmt::Display>(
        &mut self,
        field: &'static str,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(field, e.to_string());
                None
            }
        }
    }

    /// Whether any check failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Succeed with `value` only if no check failed.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field error was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clementine_core::{Quantity, Username};

    #[test]
    fn finish_passes_when_clean() {
        let errors = ValidationErrors::new();
        assert_eq!(errors.finish(42).unwrap(), 42);
    }

    #[test]
    fn check_collects_every_failure() {
        let mut errors = ValidationErrors::new();
        assert!(errors.check("username", Username::parse("x")).is_none());
        assert!(errors.check("quantity", Quantity::new(0)).is_none());
        let err = errors.finish(()).unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors.first().unwrap().field, "username");
    }

    #[test]
    fn check_passes_values_through() {
        let mut errors = ValidationErrors::new();
        let qty = errors.check("quantity", Quantity::new(2)).unwrap();
        assert_eq!(qty.as_i32(), 2);
        assert!(errors.is_empty());
    }
}
