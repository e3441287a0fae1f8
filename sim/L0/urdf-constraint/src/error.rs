//! Error types for constraint parsing and export.

use thiserror::Error;

/// Errors that can occur while decoding or encoding a constraint element.
///
/// Every variant raised while parsing a single element names the constraint
/// (when the name was already known) and the field that failed, so callers can
/// log and decide whether to skip the element or abort the document.
#[derive(Debug, Error)]
pub enum ConstraintError {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// XML writing error.
    #[error("XML write error: {0}")]
    XmlWrite(String),

    /// The constraint element has no `name` attribute (or an empty one).
    #[error("unnamed constraint found in <{element}>")]
    MissingName {
        /// Tag of the unnamed element.
        element: String,
    },

    /// A required endpoint child element is absent.
    #[error("constraint '{constraint}' is missing its <{element}> element")]
    MissingEndpointElement {
        /// The constraint being parsed.
        constraint: String,
        /// The missing endpoint tag.
        element: &'static str,
    },

    /// An origin element is present but could not be parsed as a pose.
    #[error("malformed <{element}> in constraint '{constraint}': {message}")]
    MalformedOrigin {
        /// The constraint being parsed.
        constraint: String,
        /// Tag that held (or was) the origin.
        element: String,
        /// Description of the pose failure.
        message: String,
    },

    /// The loop constraint has no `type` attribute.
    #[error("constraint '{constraint}' has no type")]
    MissingType {
        /// The constraint being parsed.
        constraint: String,
    },

    /// The `type` attribute is not one of the recognized literals.
    #[error("constraint '{constraint}' has unknown type '{value}'")]
    UnknownType {
        /// The constraint being parsed.
        constraint: String,
        /// The unrecognized literal.
        value: String,
    },

    /// An axis element carries an `xyz` attribute that is not a 3-vector.
    #[error("malformed {axis} in constraint '{constraint}': {message}")]
    MalformedAxis {
        /// The constraint being parsed.
        constraint: String,
        /// Which axis failed (`axis`, `pos_axis` or `rot_axis`).
        axis: &'static str,
        /// Description of the vector failure.
        message: String,
    },

    /// The `ratio` element has no `value` attribute.
    #[error("ratio element of constraint '{constraint}' has no value")]
    MissingRatioValue {
        /// The constraint being parsed.
        constraint: String,
    },

    /// The ratio `value` attribute is not a number.
    #[error("invalid ratio value '{value}' in constraint '{constraint}'")]
    InvalidRatioValue {
        /// The constraint being parsed.
        constraint: String,
        /// The offending text.
        value: String,
    },

    /// The `gear_ratio` attribute is absent.
    #[error("constraint '{constraint}' has no gear_ratio")]
    MissingGearRatio {
        /// The constraint being parsed.
        constraint: String,
    },

    /// The `gear_ratio` attribute is not a number.
    #[error("invalid gear_ratio '{value}' in constraint '{constraint}'")]
    InvalidGearRatio {
        /// The constraint being parsed.
        constraint: String,
        /// The offending text.
        value: String,
    },

    /// The element tag or `class` attribute does not select a constraint class.
    #[error("unknown constraint class: {0}")]
    UnknownClass(String),

    /// Two constraints in one document share a name.
    #[error("duplicate constraint name: {0}")]
    DuplicateConstraint(String),

    /// A record handed to the exporter violates the data model.
    #[error("invalid constraint record '{constraint}': {message}")]
    InvalidRecord {
        /// Name of the record (may be empty).
        constraint: String,
        /// What is wrong with it.
        message: String,
    },
}

impl ConstraintError {
    /// Create a missing name error.
    pub fn missing_name(element: impl Into<String>) -> Self {
        Self::MissingName {
            element: element.into(),
        }
    }

    /// Create a missing endpoint element error.
    pub fn missing_endpoint(constraint: impl Into<String>, element: &'static str) -> Self {
        Self::MissingEndpointElement {
            constraint: constraint.into(),
            element,
        }
    }

    /// Create a malformed origin error.
    pub fn malformed_origin(
        constraint: impl Into<String>,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedOrigin {
            constraint: constraint.into(),
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create a malformed axis error.
    pub fn malformed_axis(
        constraint: impl Into<String>,
        axis: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedAxis {
            constraint: constraint.into(),
            axis,
            message: message.into(),
        }
    }

    /// Create an invalid record error.
    pub fn invalid_record(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    /// Name of the constraint the error refers to, when known.
    pub fn constraint_name(&self) -> Option<&str> {
        match self {
            Self::MissingEndpointElement { constraint, .. }
            | Self::MalformedOrigin { constraint, .. }
            | Self::MissingType { constraint }
            | Self::UnknownType { constraint, .. }
            | Self::MalformedAxis { constraint, .. }
            | Self::MissingRatioValue { constraint }
            | Self::InvalidRatioValue { constraint, .. }
            | Self::MissingGearRatio { constraint }
            | Self::InvalidGearRatio { constraint, .. }
            | Self::InvalidRecord { constraint, .. } => Some(constraint),
            Self::DuplicateConstraint(name) => Some(name),
            Self::XmlParse(_)
            | Self::XmlWrite(_)
            | Self::MissingName { .. }
            | Self::UnknownClass(_) => None,
        }
    }
}

/// Result type for constraint operations.
pub type Result<T> = std::result::Result<T, ConstraintError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_endpoint_display() {
        let err = ConstraintError::missing_endpoint("loop1", "successor");
        assert!(err.to_string().contains("loop1"));
        assert!(err.to_string().contains("<successor>"));
    }

    #[test]
    fn test_malformed_axis_names_axis() {
        let err = ConstraintError::malformed_axis("c", "rot_axis", "expected 3 values");
        let msg = err.to_string();
        assert!(msg.contains("rot_axis"));
        assert!(msg.contains("expected 3 values"));
    }

    #[test]
    fn test_constraint_name() {
        let err = ConstraintError::MissingType {
            constraint: "loop1".into(),
        };
        assert_eq!(err.constraint_name(), Some("loop1"));
        assert_eq!(ConstraintError::missing_name("constraint").constraint_name(), None);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_error_is_send_sync() {
        assert_send_sync::<ConstraintError>();
    }
}
