/// Convenience result type used across the animator.
pub type PaticResult<T> = Result<T, PaticError>;

/// Top-level error taxonomy used by every fallible operation.
#[derive(thiserror::Error, Debug)]
pub enum PaticError {
    /// Wrong arity, dimensionality or shape of an input (fields, coordinates, degree `p`).
    #[error("shape error: {0}")]
    Shape(String),

    /// An enumerated option received a value outside its allowed set.
    #[error("domain error: {option} must be one of {allowed}, got '{value}'")]
    Domain {
        /// Name of the option being set.
        option: &'static str,
        /// The rejected value, as given.
        value: String,
        /// Human-readable list of accepted values.
        allowed: String,
    },

    /// A numeric value outside the range the option can represent.
    #[error("range error: {0}")]
    Range(String),

    /// An operation was requested before the animator had what it needs.
    #[error("precondition error: {0}")]
    Precondition(String),

    /// Rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// A frame sink failed to accept or finalize frames.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PaticError {
    /// Build a [`PaticError::Shape`] value.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Build a [`PaticError::Domain`] value, quoting every allowed entry.
    pub fn domain(option: &'static str, value: impl Into<String>, allowed: &[&str]) -> Self {
        let allowed = allowed
            .iter()
            .map(|a| format!("'{a}'"))
            .collect::<Vec<_>>()
            .join(", ");
        Self::Domain {
            option,
            value: value.into(),
            allowed,
        }
    }

    /// Build a [`PaticError::Range`] value.
    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    /// Build a [`PaticError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`PaticError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PaticError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
