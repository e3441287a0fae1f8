//! Parser and exporter configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::element::XmlElement;

/// Which pair of tags names the two endpoints.
///
/// Older schemas use `parent`/`child`, newer ones `predecessor`/`successor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EndpointSchema {
    /// Use `predecessor`/`successor` if either tag is present, else `parent`/`child`.
    /// Export writes `predecessor`/`successor`.
    #[default]
    Auto,
    /// `<predecessor>` and `<successor>`.
    PredecessorSuccessor,
    /// `<parent>` and `<child>`.
    ParentChild,
}

impl EndpointSchema {
    /// Resolve `Auto` against an element. Explicit schemas resolve to themselves.
    ///
    /// Endpoint tags decide first; per-endpoint origin tags break the tie when
    /// neither endpoint element is present.
    #[must_use]
    pub fn resolve(self, element: &XmlElement) -> Self {
        let has_any = |tags: [&str; 2]| tags.iter().any(|t| element.child(t).is_some());
        match self {
            Self::Auto => {
                if has_any(["predecessor", "successor"]) {
                    Self::PredecessorSuccessor
                } else if has_any(["parent", "child"])
                    || has_any(["parent_origin", "child_origin"])
                {
                    Self::ParentChild
                } else {
                    Self::PredecessorSuccessor
                }
            }
            other => other,
        }
    }

    /// Resolve `Auto` for export.
    #[must_use]
    pub fn for_export(self) -> Self {
        match self {
            Self::Auto => Self::PredecessorSuccessor,
            other => other,
        }
    }

    /// Endpoint tags `(predecessor, successor)`. `Auto` yields the export tags.
    #[must_use]
    pub fn endpoint_tags(self) -> (&'static str, &'static str) {
        match self.for_export() {
            Self::ParentChild => ("parent", "child"),
            _ => ("predecessor", "successor"),
        }
    }

    /// Per-endpoint origin tags used by joint constraints.
    #[must_use]
    pub fn origin_tags(self) -> (&'static str, &'static str) {
        match self.for_export() {
            Self::ParentChild => ("parent_origin", "child_origin"),
            _ => ("predecessor_origin", "successor_origin"),
        }
    }
}

/// What the document parser does with a constraint element that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InvalidElementPolicy {
    /// Return the first error.
    #[default]
    Abort,
    /// Log the error and drop the element.
    Skip,
}

/// Constraint parser and exporter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstraintConfig {
    /// Endpoint tag schema (default: auto-detect).
    pub endpoint_schema: EndpointSchema,
    /// Handling of failed elements in a document (default: abort).
    pub on_invalid: InvalidElementPolicy,
    /// Spaces per level when writing XML text; `None` writes one line (default: 2).
    pub export_indent: Option<usize>,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            endpoint_schema: EndpointSchema::Auto,
            on_invalid: InvalidElementPolicy::Abort,
            export_indent: Some(2),
        }
    }
}

impl ConstraintConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint schema.
    #[must_use]
    pub fn with_endpoint_schema(mut self, schema: EndpointSchema) -> Self {
        self.endpoint_schema = schema;
        self
    }

    /// Set the invalid element policy.
    #[must_use]
    pub fn with_on_invalid(mut self, policy: InvalidElementPolicy) -> Self {
        self.on_invalid = policy;
        self
    }

    /// Set the export indentation.
    #[must_use]
    pub fn with_export_indent(mut self, indent: Option<usize>) -> Self {
        self.export_indent = indent;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_resolution() {
        let pc = XmlElement::new("constraint").with_child(XmlElement::new("child"));
        assert_eq!(EndpointSchema::Auto.resolve(&pc), EndpointSchema::ParentChild);

        let ps = XmlElement::new("constraint")
            .with_child(XmlElement::new("parent"))
            .with_child(XmlElement::new("successor"));
        assert_eq!(
            EndpointSchema::Auto.resolve(&ps),
            EndpointSchema::PredecessorSuccessor
        );

        let bare = XmlElement::new("constraint");
        assert_eq!(
            EndpointSchema::Auto.resolve(&bare),
            EndpointSchema::PredecessorSuccessor
        );
        assert_eq!(
            EndpointSchema::ParentChild.resolve(&ps),
            EndpointSchema::ParentChild
        );
    }

    #[test]
    fn test_tags() {
        assert_eq!(EndpointSchema::Auto.endpoint_tags(), ("predecessor", "successor"));
        assert_eq!(EndpointSchema::ParentChild.endpoint_tags(), ("parent", "child"));
        assert_eq!(
            EndpointSchema::ParentChild.origin_tags(),
            ("parent_origin", "child_origin")
        );
    }

    #[test]
    fn test_builder() {
        let config = ConstraintConfig::new()
            .with_endpoint_schema(EndpointSchema::ParentChild)
            .with_on_invalid(InvalidElementPolicy::Skip)
            .with_export_indent(None);
        assert_eq!(config.endpoint_schema, EndpointSchema::ParentChild);
        assert_eq!(config.on_invalid, InvalidElementPolicy::Skip);
        assert_eq!(config.export_indent, None);
        assert_eq!(ConstraintConfig::default().export_indent, Some(2));
    }
}
