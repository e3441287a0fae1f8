//! Constraint element parser.
//!
//! Parsing is single pass: the shared header (name and endpoints) is read
//! first, then the body parser selected by the element's class. A body parser
//! either returns a complete payload or an error; nothing is written into a
//! record until every field has been read, so a failed parse never leaves a
//! partially populated constraint behind.

use nalgebra::Vector3;

use crate::config::{ConstraintConfig, EndpointSchema};
use crate::element::XmlElement;
use crate::error::{ConstraintError, Result};
use crate::notice::{Notice, NoticeKind, Parsed};
use crate::pose::{parse_f64, parse_pose, parse_vector3};
use crate::types::{
    Constraint, ConstraintClass, ConstraintHeader, ConstraintKind, CouplingConstraint,
    JointConstraint, LoopConstraint, LoopJointType, Transform, default_joint_axis,
    default_loop_axis,
};

/// Tags that hold a constraint element.
pub const CONSTRAINT_TAGS: [&str; 5] = [
    "constraint",
    "loop_joint",
    "loop",
    "coupling",
    "transmission",
];

/// Per-endpoint origin tags of joint constraints, under either schema.
const JOINT_ORIGIN_TAGS: [&str; 4] = [
    "predecessor_origin",
    "successor_origin",
    "parent_origin",
    "child_origin",
];

/// Parse a standalone constraint element from XML text.
///
/// # Errors
///
/// Returns an error if the XML is malformed or the constraint is invalid.
pub fn parse_constraint_str(xml: &str, config: &ConstraintConfig) -> Result<Parsed<Constraint>> {
    let element = XmlElement::parse_str(xml)?;
    parse_constraint(&element, config)
}

/// Parse a constraint element, selecting the body parser from its class.
///
/// # Errors
///
/// Returns an error if the class cannot be determined or the element is invalid.
pub fn parse_constraint(
    element: &XmlElement,
    config: &ConstraintConfig,
) -> Result<Parsed<Constraint>> {
    match constraint_class(element)? {
        ConstraintClass::Loop => parse_loop_constraint(element, config),
        ConstraintClass::Coupling => parse_coupling_constraint(element, config),
        ConstraintClass::Joint => parse_joint_constraint(element, config),
    }
}

/// Whether a tag names a constraint element.
pub fn is_constraint_tag(tag: &str) -> bool {
    CONSTRAINT_TAGS.contains(&tag)
}

/// Determine the class of a constraint element.
///
/// `loop_joint`/`loop` are loop constraints, `coupling`/`transmission` are
/// couplings. A generic `constraint` tag picks its class from the optional
/// `class` attribute and is a joint constraint without one.
///
/// # Errors
///
/// Returns [`ConstraintError::UnknownClass`] for any other tag or class value.
pub fn constraint_class(element: &XmlElement) -> Result<ConstraintClass> {
    match element.name() {
        "loop_joint" | "loop" => Ok(ConstraintClass::Loop),
        "coupling" | "transmission" => Ok(ConstraintClass::Coupling),
        "constraint" => match element.attribute("class") {
            None | Some("joint") => Ok(ConstraintClass::Joint),
            Some("loop") => Ok(ConstraintClass::Loop),
            Some("coupling") => Ok(ConstraintClass::Coupling),
            Some(other) => Err(ConstraintError::UnknownClass(format!(
                "class '{other}' on <constraint>"
            ))),
        },
        other => Err(ConstraintError::UnknownClass(format!("<{other}>"))),
    }
}

/// Parse a loop constraint.
///
/// # Errors
///
/// Returns an error if the header or loop body is invalid.
pub fn parse_loop_constraint(
    element: &XmlElement,
    config: &ConstraintConfig,
) -> Result<Parsed<Constraint>> {
    let schema = config.endpoint_schema.resolve(element);
    let mut notices = Vec::new();
    let header = read_header(element, schema, &mut notices)?;
    let body = read_loop_body(element, &header, schema, &mut notices)?;
    Ok(Parsed {
        value: Constraint::new(header, ConstraintKind::Loop(body)),
        notices,
    })
}

/// Parse a coupling constraint.
///
/// # Errors
///
/// Returns an error if the header or ratio is invalid.
pub fn parse_coupling_constraint(
    element: &XmlElement,
    config: &ConstraintConfig,
) -> Result<Parsed<Constraint>> {
    let schema = config.endpoint_schema.resolve(element);
    let mut notices = Vec::new();
    let header = read_header(element, schema, &mut notices)?;
    let body = read_coupling_body(element, &header)?;
    Ok(Parsed {
        value: Constraint::new(header, ConstraintKind::Coupling(body)),
        notices,
    })
}

/// Parse a plain joint constraint.
///
/// # Errors
///
/// Returns an error if the header, gear ratio, axes or origins are invalid.
pub fn parse_joint_constraint(
    element: &XmlElement,
    config: &ConstraintConfig,
) -> Result<Parsed<Constraint>> {
    let schema = config.endpoint_schema.resolve(element);
    let mut notices = Vec::new();
    let header = read_header(element, schema, &mut notices)?;
    let body = read_joint_body(element, &header, schema, &mut notices)?;
    Ok(Parsed {
        value: Constraint::new(header, ConstraintKind::Joint(body)),
        notices,
    })
}

/// Parse only the shared header: name and both endpoint link names.
///
/// A missing endpoint element leaves that endpoint unset. An endpoint element
/// without a `link` attribute also leaves it unset and raises an info notice.
///
/// # Errors
///
/// Returns [`ConstraintError::MissingName`] if the `name` attribute is absent
/// or empty.
pub fn parse_header(
    element: &XmlElement,
    config: &ConstraintConfig,
) -> Result<Parsed<ConstraintHeader>> {
    let schema = config.endpoint_schema.resolve(element);
    let mut notices = Vec::new();
    let header = read_header(element, schema, &mut notices)?;
    Ok(Parsed {
        value: header,
        notices,
    })
}

// ============================================================================
// Header
// ============================================================================

fn read_header(
    element: &XmlElement,
    schema: EndpointSchema,
    notices: &mut Vec<Notice>,
) -> Result<ConstraintHeader> {
    let name = match element.attribute("name") {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ConstraintError::missing_name(element.name())),
    };

    let (predecessor_tag, successor_tag) = schema.endpoint_tags();
    let predecessor_link_name = read_endpoint(element, predecessor_tag, &name, notices);
    let successor_link_name = read_endpoint(element, successor_tag, &name, notices);

    Ok(ConstraintHeader {
        name,
        predecessor_link_name,
        successor_link_name,
    })
}

fn read_endpoint(
    element: &XmlElement,
    tag: &'static str,
    constraint: &str,
    notices: &mut Vec<Notice>,
) -> Option<String> {
    let endpoint = element.child(tag)?;
    match endpoint.attribute("link") {
        Some(link) => Some(link.to_string()),
        None => {
            let hint = if tag == "predecessor" || tag == "parent" {
                " this might be the root?"
            } else {
                ""
            };
            notices.push(Notice::info(
                NoticeKind::MissingEndpointLink,
                constraint,
                format!("no {tag} link name specified for constraint [{constraint}].{hint}"),
            ));
            None
        }
    }
}

// ============================================================================
// Bodies
// ============================================================================

fn read_loop_body(
    element: &XmlElement,
    header: &ConstraintHeader,
    schema: EndpointSchema,
    notices: &mut Vec<Notice>,
) -> Result<LoopConstraint> {
    let name = header.name.as_str();
    let (predecessor_tag, successor_tag) = schema.endpoint_tags();

    let predecessor = element
        .child(predecessor_tag)
        .ok_or_else(|| ConstraintError::missing_endpoint(name, predecessor_tag))?;
    let successor = element
        .child(successor_tag)
        .ok_or_else(|| ConstraintError::missing_endpoint(name, successor_tag))?;

    let predecessor_transform =
        read_origin(predecessor.child("origin"), predecessor_tag, name, notices)?;
    let successor_transform =
        read_origin(successor.child("origin"), successor_tag, name, notices)?;

    let type_str = element.attribute("type").ok_or_else(|| ConstraintError::MissingType {
        constraint: name.to_string(),
    })?;
    let joint_type =
        LoopJointType::from_str(type_str).ok_or_else(|| ConstraintError::UnknownType {
            constraint: name.to_string(),
            value: type_str.to_string(),
        })?;

    let axis = if joint_type.uses_axis() {
        read_axis(element, "axis", default_loop_axis(), name, notices)?
    } else {
        if element.child("axis").is_some() {
            notices.push(Notice::debug(
                NoticeKind::AxisIgnoredForFixed,
                name,
                format!("axis of fixed constraint [{name}] is not read"),
            ));
        }
        default_loop_axis()
    };

    Ok(LoopConstraint {
        predecessor_to_constraint_origin_transform: predecessor_transform,
        successor_to_constraint_origin_transform: successor_transform,
        joint_type,
        axis,
    })
}

fn read_coupling_body(
    element: &XmlElement,
    header: &ConstraintHeader,
) -> Result<CouplingConstraint> {
    let Some(ratio_xml) = element.child("ratio") else {
        return Ok(CouplingConstraint::default());
    };

    let value = ratio_xml
        .attribute("value")
        .ok_or_else(|| ConstraintError::MissingRatioValue {
            constraint: header.name.clone(),
        })?;
    let ratio = parse_f64(value).map_err(|e| ConstraintError::InvalidRatioValue {
        constraint: header.name.clone(),
        value: e.input,
    })?;

    Ok(CouplingConstraint { ratio: Some(ratio) })
}

fn read_joint_body(
    element: &XmlElement,
    header: &ConstraintHeader,
    schema: EndpointSchema,
    notices: &mut Vec<Notice>,
) -> Result<JointConstraint> {
    let name = header.name.as_str();

    let gear_ratio_str = element
        .attribute("gear_ratio")
        .ok_or_else(|| ConstraintError::MissingGearRatio {
            constraint: name.to_string(),
        })?;
    let gear_ratio = parse_f64(gear_ratio_str).map_err(|e| ConstraintError::InvalidGearRatio {
        constraint: name.to_string(),
        value: e.input,
    })?;

    // Each axis is checked against its own element.
    let position_axis = read_axis(element, "pos_axis", default_joint_axis(), name, notices)?;
    let rotation_axis = read_axis(element, "rot_axis", default_joint_axis(), name, notices)?;

    let (predecessor_origin_tag, successor_origin_tag) = schema.origin_tags();
    let predecessor_transform = read_origin(
        element.child(predecessor_origin_tag),
        predecessor_origin_tag,
        name,
        notices,
    )?;
    let successor_transform = read_origin(
        element.child(successor_origin_tag),
        successor_origin_tag,
        name,
        notices,
    )?;

    for tag in JOINT_ORIGIN_TAGS
        .into_iter()
        .filter(|t| *t != predecessor_origin_tag && *t != successor_origin_tag)
    {
        if element.child(tag).is_some() {
            notices.push(Notice::info(
                NoticeKind::OriginIgnoredForSchema,
                name,
                format!(
                    "{tag} of constraint [{name}] does not match its \
                     {predecessor_origin_tag}/{successor_origin_tag} endpoints and is not read"
                ),
            ));
        }
    }

    Ok(JointConstraint {
        gear_ratio,
        position_axis,
        rotation_axis,
        predecessor_to_constraint_origin_transform: predecessor_transform,
        successor_to_constraint_origin_transform: successor_transform,
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Read an origin element; absence is the identity.
fn read_origin(
    origin: Option<&XmlElement>,
    context: &str,
    constraint: &str,
    notices: &mut Vec<Notice>,
) -> Result<Transform> {
    let Some(origin) = origin else {
        notices.push(Notice::debug(
            NoticeKind::DefaultOrigin,
            constraint,
            format!(
                "no origin for {context} of constraint [{constraint}], using identity transform"
            ),
        ));
        return Ok(Transform::identity());
    };

    parse_pose(origin)
        .map_err(|e| ConstraintError::malformed_origin(constraint, context, e.to_string()))
}

/// Read an axis child element's `xyz` attribute.
///
/// An absent element or an element without `xyz` keeps `default`.
fn read_axis(
    element: &XmlElement,
    tag: &'static str,
    default: Vector3<f64>,
    constraint: &str,
    notices: &mut Vec<Notice>,
) -> Result<Vector3<f64>> {
    let Some(axis_xml) = element.child(tag) else {
        notices.push(Notice::debug(
            NoticeKind::DefaultAxis,
            constraint,
            format!(
                "no {tag} specified for constraint [{constraint}], using default [{} {} {}]",
                default.x, default.y, default.z
            ),
        ));
        return Ok(default);
    };

    match axis_xml.attribute("xyz") {
        Some(xyz) => parse_vector3(xyz)
            .map_err(|e| ConstraintError::malformed_axis(constraint, tag, e.to_string())),
        None => {
            notices.push(Notice::debug(
                NoticeKind::AxisWithoutXyz,
                constraint,
                format!("{tag} of constraint [{constraint}] has no xyz, keeping default"),
            ));
            Ok(default)
        }
    }
}
