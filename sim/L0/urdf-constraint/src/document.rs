//! Document-level constraint handling.
//!
//! Collects every constraint element that is a direct child of `<robot>`.
//! Links, joints and other model content are left to the model assembler;
//! only name uniqueness among constraints is checked here.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::{ConstraintConfig, InvalidElementPolicy};
use crate::element::XmlElement;
use crate::error::{ConstraintError, Result};
use crate::exporter::export_constraint;
use crate::notice::Parsed;
use crate::parser::{is_constraint_tag, parse_constraint};
use crate::types::{Constraint, ConstraintClass};

/// Constraints of one robot document, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    /// Robot name.
    pub robot_name: String,
    constraints: Vec<Constraint>,
    index: HashMap<String, usize>,
}

impl ConstraintSet {
    /// Create an empty set.
    #[must_use]
    pub fn new(robot_name: impl Into<String>) -> Self {
        Self {
            robot_name: robot_name.into(),
            constraints: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::DuplicateConstraint`] if the name is taken.
    pub fn insert(&mut self, constraint: Constraint) -> Result<()> {
        if self.index.contains_key(constraint.name()) {
            return Err(ConstraintError::DuplicateConstraint(constraint.name().to_string()));
        }
        self.index
            .insert(constraint.name().to_string(), self.constraints.len());
        self.constraints.push(constraint);
        Ok(())
    }

    /// Look up a constraint by name.
    pub fn get(&self, name: &str) -> Option<&Constraint> {
        self.index.get(name).map(|&i| &self.constraints[i])
    }

    /// All constraints in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Constraints of one class.
    pub fn of_class(&self, class: ConstraintClass) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.class() == class)
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// Parse every constraint element of a robot document.
///
/// Under [`InvalidElementPolicy::Skip`] a constraint that fails to parse is
/// logged and dropped; under [`InvalidElementPolicy::Abort`] its error is returned.
/// Duplicate names are always an error.
///
/// Notices of accepted constraints are returned in document order, not logged;
/// call [`Parsed::emit`] to forward them to `tracing`.
///
/// # Errors
///
/// Returns an error if the XML is malformed, the root is not `<robot>`, a
/// constraint fails under the abort policy, or two constraints share a name.
pub fn parse_robot_constraints(
    xml: &str,
    config: &ConstraintConfig,
) -> Result<Parsed<ConstraintSet>> {
    let root = XmlElement::parse_str(xml)?;
    if root.name() != "robot" {
        return Err(ConstraintError::XmlParse(format!(
            "expected <robot> root element, found <{}>",
            root.name()
        )));
    }

    let mut set = ConstraintSet::new(root.attribute("name").unwrap_or_default());
    let mut notices = Vec::new();

    for element in root.children().iter().filter(|e| is_constraint_tag(e.name())) {
        match parse_constraint(element, config) {
            Ok(parsed) => {
                notices.extend(parsed.notices);
                set.insert(parsed.value)?;
            }
            Err(e) if config.on_invalid == InvalidElementPolicy::Skip => {
                warn!(element = element.name(), error = %e, "skipping invalid constraint");
            }
            Err(e) => return Err(e),
        }
    }

    debug!(
        robot = %set.robot_name,
        constraints = set.len(),
        "parsed robot constraints"
    );

    Ok(Parsed {
        value: set,
        notices,
    })
}

/// Write constraints as children of a `<robot>` element.
///
/// # Errors
///
/// Returns an error if any record is invalid or writing fails.
pub fn export_robot_constraints<'a>(
    robot_name: &str,
    constraints: impl IntoIterator<Item = &'a Constraint>,
    config: &ConstraintConfig,
) -> Result<String> {
    let mut robot = XmlElement::new("robot").with_attribute("name", robot_name);
    for constraint in constraints {
        export_constraint(constraint, &mut robot, config)?;
    }
    robot.to_xml_string(config.export_indent)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;

    const ROBOT: &str = r#"
        <robot name="walker">
            <link name="a"/>
            <link name="b"/>
            <joint name="j0" type="revolute">
                <parent link="a"/>
                <child link="b"/>
            </joint>
            <loop_joint name="l1" type="revolute">
                <predecessor link="a"/>
                <successor link="b"/>
            </loop_joint>
            <coupling name="c1">
                <predecessor link="a"/>
                <successor link="b"/>
                <ratio value="oops"/>
            </coupling>
            <constraint name="g1" gear_ratio="2">
                <parent link="a"/>
                <child link="b"/>
            </constraint>
        </robot>
    "#;

    #[test]
    fn test_abort_on_invalid() {
        let result = parse_robot_constraints(ROBOT, &ConstraintConfig::default());
        assert!(matches!(result, Err(ConstraintError::InvalidRatioValue { .. })));
    }

    #[test]
    fn test_skip_invalid() {
        let config = ConstraintConfig::new().with_on_invalid(InvalidElementPolicy::Skip);
        let parsed = parse_robot_constraints(ROBOT, &config).expect("should parse");
        let set = &parsed.value;
        assert_eq!(set.robot_name, "walker");
        assert_eq!(set.len(), 2);
        assert!(set.get("l1").is_some());
        assert!(set.get("c1").is_none());
        assert_eq!(set.of_class(ConstraintClass::Joint).count(), 1);
        assert!(parsed.has_notice(NoticeKind::DefaultAxis));
    }

    #[test]
    fn test_notices_are_returned_in_document_order() {
        let xml = r#"
            <robot name="r">
                <coupling name="first"><predecessor/></coupling>
                <loop_joint name="second" type="fixed">
                    <predecessor link="a"/>
                    <successor link="b"/>
                </loop_joint>
            </robot>
        "#;
        let parsed = parse_robot_constraints(xml, &ConstraintConfig::default()).expect("parses");
        let owners: Vec<_> = parsed.notices.iter().map(|n| n.constraint.as_str()).collect();
        assert_eq!(owners, ["first", "second", "second"]);
        assert_eq!(parsed.notices[0].kind, NoticeKind::MissingEndpointLink);

        let set = parsed.emit();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_duplicate_names() {
        let xml = r#"
            <robot name="r">
                <coupling name="c"/>
                <coupling name="c"/>
            </robot>
        "#;
        assert!(matches!(
            parse_robot_constraints(xml, &ConstraintConfig::default()),
            Err(ConstraintError::DuplicateConstraint(name)) if name == "c"
        ));
    }

    #[test]
    fn test_wrong_root() {
        assert!(matches!(
            parse_robot_constraints("<mujoco/>", &ConstraintConfig::default()),
            Err(ConstraintError::XmlParse(_))
        ));
    }

    #[test]
    fn test_export_and_reparse() {
        let config = ConstraintConfig::new().with_on_invalid(InvalidElementPolicy::Skip);
        let set = parse_robot_constraints(ROBOT, &config).expect("should parse").value;

        let xml = export_robot_constraints(&set.robot_name, set.iter(), &config)
            .expect("should export");
        let again = parse_robot_constraints(&xml, &config).expect("should reparse").value;
        assert_eq!(again.robot_name, "walker");
        assert_eq!(again.len(), set.len());
        for c in set.iter() {
            assert_eq!(again.get(c.name()), Some(c));
        }
    }
}
