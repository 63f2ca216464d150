//! Aggregate error type for per-case failure reporting.

use std::error::Error;
use std::fmt;

/// An error joining multiple underlying causes under a labeled prefix.
///
/// Assertion and callback failures for one case accumulate here instead of
/// aborting on the first miss; every individual message is preserved and can
/// be inspected through [`PrefixedError::causes`].
#[derive(Debug, Clone)]
pub struct PrefixedError {
    prefix: String,
    causes: Vec<String>,
}

impl PrefixedError {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            causes: Vec::new(),
        }
    }

    /// Record one underlying cause.
    pub fn push(&mut self, cause: impl Into<String>) {
        self.causes.push(cause.into());
    }

    /// Fold another aggregate into this one, keeping its prefix on each of
    /// its causes.
    pub fn append(&mut self, other: PrefixedError) {
        let PrefixedError { prefix, causes } = other;
        for cause in causes {
            self.causes.push(format!("{prefix}: {cause}"));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The individual underlying messages, in the order they were recorded.
    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// `Ok(())` when no cause was recorded, otherwise the aggregate itself.
    pub fn into_result(self) -> Result<(), PrefixedError> {
        if self.causes.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for PrefixedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} error(s) occurred:",
            self.prefix,
            self.causes.len()
        )?;
        for cause in &self.causes {
            write!(f, "\n\t* {cause}")?;
        }
        Ok(())
    }
}

impl Error for PrefixedError {}
