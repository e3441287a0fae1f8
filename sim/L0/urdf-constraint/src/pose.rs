//! Scalar, vector and pose parsing.
//!
//! These are the leaf grammars the constraint parsers delegate to. Each one
//! returns a structured error carrying the offending text; the constraint
//! parsers wrap it into a field-specific [`ConstraintError`](crate::ConstraintError).

use nalgebra::Vector3;
use thiserror::Error;

use crate::element::XmlElement;
use crate::types::Transform;

/// A string that is not a floating-point number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a valid number")]
pub struct ScalarParseError {
    /// The rejected text.
    pub input: String,
}

/// A string that is not three whitespace-separated numbers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid vector3 '{input}': {message}")]
pub struct VectorParseError {
    /// The rejected text.
    pub input: String,
    /// What was wrong with it.
    pub message: String,
}

/// Parse a finite floating-point scalar. Surrounding whitespace is ignored.
///
/// `inf`, `infinity` and `NaN` are not numbers in a model file.
///
/// # Errors
///
/// Returns [`ScalarParseError`] on empty, non-numeric or non-finite input.
pub fn parse_f64(s: &str) -> Result<f64, ScalarParseError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ScalarParseError {
            input: s.to_string(),
        })
}

/// Parse a space-separated vector3 string.
///
/// # Errors
///
/// Returns [`VectorParseError`] if a component is not a number or the
/// component count is not three.
pub fn parse_vector3(s: &str) -> Result<Vector3<f64>, VectorParseError> {
    let parts: Vec<f64> = s
        .split_whitespace()
        .map(parse_f64)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| VectorParseError {
            input: s.to_string(),
            message: e.to_string(),
        })?;

    if parts.len() != 3 {
        return Err(VectorParseError {
            input: s.to_string(),
            message: format!("expected 3 values, got {}", parts.len()),
        });
    }

    Ok(Vector3::new(parts[0], parts[1], parts[2]))
}

/// Format a vector the way [`parse_vector3`] reads it.
#[must_use]
pub fn format_vector3(v: &Vector3<f64>) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}

/// Parse origin element attributes into a transform.
///
/// Missing `xyz`/`rpy` attributes default to zero.
///
/// # Errors
///
/// Returns [`VectorParseError`] if either attribute is present but malformed.
pub fn parse_pose(origin: &XmlElement) -> Result<Transform, VectorParseError> {
    let translation = origin
        .attribute("xyz")
        .map(parse_vector3)
        .transpose()?
        .unwrap_or_else(Vector3::zeros);

    let rpy = origin
        .attribute("rpy")
        .map(parse_vector3)
        .transpose()?
        .unwrap_or_else(Vector3::zeros);

    Ok(Transform::new(translation, rpy))
}

/// Build an origin element for a transform under the given tag.
#[must_use]
pub fn pose_element(tag: &str, transform: &Transform) -> XmlElement {
    XmlElement::new(tag)
        .with_attribute("xyz", format_vector3(&transform.translation))
        .with_attribute("rpy", format_vector3(&transform.rpy))
}
