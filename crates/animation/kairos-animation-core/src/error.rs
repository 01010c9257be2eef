//! Error types for curve construction, type registration and parameter binding.
//!
//! Every variant is a caller contract violation raised synchronously at the
//! offending call; none of them is produced while `Updater::update` runs.

/// Errors raised by the animation core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimationError {
    /// A curve, keyframe value or child cannot provide the requested type.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Binding against an id the block never declared.
    #[error("Unsupported parameter: {id}")]
    UnsupportedParameter { id: String },

    /// A parameter accepting several types was declared without a resolver.
    #[error("Parameter {id} lists several types but has no type resolver")]
    MissingTypeResolver { id: String },

    /// `register` with a name already in the registry.
    #[error("Type already registered: {name}")]
    DuplicateType { name: String },

    /// `find` with a name missing from the registry.
    #[error("Type not registered: {name}")]
    UnknownType { name: String },

    /// Keyframe list too short or not strictly increasing in time.
    #[error("Invalid key frames: {reason}")]
    InvalidKeyFrames { reason: String },

    /// Composite child index outside the vector dimension.
    #[error("Child index {index} out of range for {len} children")]
    InvalidChildIndex { index: usize, len: usize },

    /// A mutation that the curve variant does not offer.
    #[error("{operation} is not supported by {curve} curves")]
    UnsupportedOperation {
        operation: &'static str,
        curve: &'static str,
    },
}

impl AnimationError {
    pub(crate) fn type_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub(crate) fn invalid_key_frames(reason: impl Into<String>) -> Self {
        Self::InvalidKeyFrames {
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "type",
            Self::UnsupportedParameter { .. } | Self::MissingTypeResolver { .. } => "binding",
            Self::DuplicateType { .. } | Self::UnknownType { .. } => "registry",
            Self::InvalidKeyFrames { .. }
            | Self::InvalidChildIndex { .. }
            | Self::UnsupportedOperation { .. } => "curve",
        }
    }
}

/// Result alias for animation operations.
pub type Result<T> = std::result::Result<T, AnimationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_and_categories() {
        let err = AnimationError::type_mismatch("vector3", "boolean");
        assert_eq!(err.to_string(), "Type mismatch: expected vector3, got boolean");
        assert_eq!(err.category(), "type");

        let err = AnimationError::UnsupportedParameter { id: "pos".into() };
        assert_eq!(err.to_string(), "Unsupported parameter: pos");
        assert_eq!(err.category(), "binding");

        assert_eq!(
            AnimationError::DuplicateType { name: "x".into() }.category(),
            "registry"
        );
    }
}
