//! Constraint record to XML export.
//!
//! The exporter is the inverse of the parser: each variant is written with the
//! same tags and attributes the parser reads, so exporting a record and parsing
//! the result yields an equal record.
//!
//! | Class | Element | Body |
//! |-------|---------|------|
//! | Loop | `<loop_joint name type>` | `origin` under each endpoint, `<axis xyz>` unless fixed |
//! | Coupling | `<coupling name>` | `<ratio value>` when set |
//! | Joint | `<constraint name gear_ratio>` | `<pos_axis>`, `<rot_axis>`, per-endpoint `*_origin` |

use crate::config::{ConstraintConfig, EndpointSchema};
use crate::element::XmlElement;
use crate::error::{ConstraintError, Result};
use crate::pose::{format_vector3, pose_element};
use crate::types::{
    Constraint, ConstraintHeader, ConstraintKind, CouplingConstraint, JointConstraint,
    LoopConstraint,
};

/// Export a constraint as a new child of `parent`.
///
/// # Errors
///
/// Returns [`ConstraintError::InvalidRecord`] if the record has an empty name
/// or a non-finite scalar.
pub fn export_constraint(
    constraint: &Constraint,
    parent: &mut XmlElement,
    config: &ConstraintConfig,
) -> Result<()> {
    let element = constraint_to_element(constraint, config)?;
    parent.push_child(element);
    Ok(())
}

/// Build the element for a constraint without attaching it anywhere.
///
/// # Errors
///
/// Returns [`ConstraintError::InvalidRecord`] if the record has an empty name
/// or a non-finite scalar.
pub fn constraint_to_element(
    constraint: &Constraint,
    config: &ConstraintConfig,
) -> Result<XmlElement> {
    check_record(constraint)?;
    let schema = config.endpoint_schema.for_export();

    let mut element =
        XmlElement::new(constraint.class().tag()).with_attribute("name", constraint.name());

    match &constraint.kind {
        ConstraintKind::Loop(body) => write_loop(&mut element, &constraint.header, body, schema),
        ConstraintKind::Coupling(body) => {
            write_coupling(&mut element, &constraint.header, body, schema);
        }
        ConstraintKind::Joint(body) => write_joint(&mut element, &constraint.header, body, schema),
    }

    Ok(element)
}

/// Serialize a single constraint to XML text.
///
/// # Errors
///
/// Returns an error if the record is invalid or writing fails.
pub fn constraint_to_xml_string(
    constraint: &Constraint,
    config: &ConstraintConfig,
) -> Result<String> {
    constraint_to_element(constraint, config)?.to_xml_string(config.export_indent)
}

fn check_record(constraint: &Constraint) -> Result<()> {
    let name = constraint.name();
    if name.is_empty() {
        return Err(ConstraintError::invalid_record(name, "empty name"));
    }

    let scalar = match &constraint.kind {
        ConstraintKind::Coupling(c) => c.ratio.map(|r| ("ratio", r)),
        ConstraintKind::Joint(j) => Some(("gear_ratio", j.gear_ratio)),
        ConstraintKind::Loop(_) => None,
    };
    if let Some((field, value)) = scalar {
        if !value.is_finite() {
            return Err(ConstraintError::invalid_record(
                name,
                format!("{field} is not finite: {value}"),
            ));
        }
    }

    Ok(())
}

fn endpoint_element(tag: &str, link: Option<&str>) -> XmlElement {
    let element = XmlElement::new(tag);
    match link {
        Some(link) => element.with_attribute("link", link),
        None => element,
    }
}

fn write_loop(
    element: &mut XmlElement,
    header: &ConstraintHeader,
    body: &LoopConstraint,
    schema: EndpointSchema,
) {
    let (predecessor_tag, successor_tag) = schema.endpoint_tags();
    element.set_attribute("type", body.joint_type.as_str());

    element.push_child(
        endpoint_element(predecessor_tag, header.predecessor_link_name.as_deref())
            .with_child(pose_element("origin", &body.predecessor_to_constraint_origin_transform)),
    );
    element.push_child(
        endpoint_element(successor_tag, header.successor_link_name.as_deref())
            .with_child(pose_element("origin", &body.successor_to_constraint_origin_transform)),
    );

    if let Some(axis) = body.authoritative_axis() {
        element.push_child(XmlElement::new("axis").with_attribute("xyz", format_vector3(&axis)));
    }
}

fn write_coupling(
    element: &mut XmlElement,
    header: &ConstraintHeader,
    body: &CouplingConstraint,
    schema: EndpointSchema,
) {
    write_endpoints(element, header, schema);
    if let Some(ratio) = body.ratio {
        element.push_child(XmlElement::new("ratio").with_attribute("value", ratio.to_string()));
    }
}

fn write_joint(
    element: &mut XmlElement,
    header: &ConstraintHeader,
    body: &JointConstraint,
    schema: EndpointSchema,
) {
    element.set_attribute("gear_ratio", body.gear_ratio.to_string());
    write_endpoints(element, header, schema);

    element.push_child(
        XmlElement::new("pos_axis").with_attribute("xyz", format_vector3(&body.position_axis)),
    );
    element.push_child(
        XmlElement::new("rot_axis").with_attribute("xyz", format_vector3(&body.rotation_axis)),
    );

    let (predecessor_origin_tag, successor_origin_tag) = schema.origin_tags();
    element.push_child(pose_element(
        predecessor_origin_tag,
        &body.predecessor_to_constraint_origin_transform,
    ));
    element.push_child(pose_element(
        successor_origin_tag,
        &body.successor_to_constraint_origin_transform,
    ));
}

fn write_endpoints(element: &mut XmlElement, header: &ConstraintHeader, schema: EndpointSchema) {
    let (predecessor_tag, successor_tag) = schema.endpoint_tags();
    element.push_child(endpoint_element(
        predecessor_tag,
        header.predecessor_link_name.as_deref(),
    ));
    element.push_child(endpoint_element(
        successor_tag,
        header.successor_link_name.as_deref(),
    ));
}
