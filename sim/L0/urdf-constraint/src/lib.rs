//! URDF constraint element parser and exporter.
//!
//! This crate decodes the XML elements that describe a constraint between two
//! links of a robot model into typed records, and writes those records back to
//! XML. Three constraint classes share a common header (name and the two
//! endpoint links) and differ in their body:
//!
//! - **Loop** (`<loop_joint>`): kinematic loop closure with a joint type, an
//!   axis and a transform from each endpoint link to the constraint frame
//! - **Coupling** (`<coupling>`): transmission coupling with an optional ratio
//! - **Joint** (`<constraint>`): joint-like constraint with a gear ratio, a
//!   position axis, a rotation axis and per-endpoint origins
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It validates one
//! element at a time; checking the constraint graph of a whole model is left
//! to the model assembler.
//!
//! # Example
//!
//! ```
//! use sim_urdf_constraint::{ConstraintConfig, LoopJointType, parse_constraint_str};
//!
//! let xml = r#"
//!     <loop_joint name="closure" type="revolute">
//!         <predecessor link="crank">
//!             <origin xyz="0 0 0.1"/>
//!         </predecessor>
//!         <successor link="rocker"/>
//!         <axis xyz="0 1 0"/>
//!     </loop_joint>
//! "#;
//!
//! let parsed = parse_constraint_str(xml, &ConstraintConfig::default()).expect("should parse");
//! let constraint = parsed.value;
//! assert_eq!(constraint.name(), "closure");
//!
//! let body = constraint.as_loop().expect("loop constraint");
//! assert_eq!(body.joint_type, LoopJointType::Revolute);
//! assert!(body.successor_to_constraint_origin_transform.is_identity());
//! ```
//!
//! # Defaults and failures
//!
//! Absent input resolves to a documented default and is reported as a
//! [`Notice`] in the returned [`Parsed`] value:
//!
//! - Missing endpoint element: endpoint left unset (silent)
//! - Endpoint element without `link`: endpoint left unset (info)
//! - Missing `origin`: identity transform (debug)
//! - Missing loop `axis`: `1 0 0`; missing `pos_axis`/`rot_axis`: `1 1 1` (debug)
//!
//! Present but malformed input is an error ([`ConstraintError`]), and a failed
//! parse produces no record at all.
//!
//! | Failure | Error |
//! |---------|-------|
//! | no `name` | [`ConstraintError::MissingName`] |
//! | loop without both endpoint elements | [`ConstraintError::MissingEndpointElement`] |
//! | malformed `origin` | [`ConstraintError::MalformedOrigin`] |
//! | loop without `type` | [`ConstraintError::MissingType`] |
//! | unknown loop `type` | [`ConstraintError::UnknownType`] |
//! | malformed axis `xyz` | [`ConstraintError::MalformedAxis`] |
//! | `ratio` without `value` | [`ConstraintError::MissingRatioValue`] |
//! | non-numeric `ratio` | [`ConstraintError::InvalidRatioValue`] |
//! | no `gear_ratio` | [`ConstraintError::MissingGearRatio`] |
//! | non-numeric `gear_ratio` | [`ConstraintError::InvalidGearRatio`] |
//!
//! `inf`, `infinity` and `NaN` count as non-numeric wherever a number is read.
//!
//! Fixed loop constraints never read their axis, so a malformed `<axis>` on a
//! fixed constraint is not an error.

#![doc(html_root_url = "https://docs.rs/sim-urdf-constraint/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::should_implement_trait,
    clippy::option_if_let_else
)]

mod config;
mod document;
mod element;
mod error;
mod exporter;
mod notice;
mod parser;
mod pose;
mod types;

pub use config::{ConstraintConfig, EndpointSchema, InvalidElementPolicy};
pub use document::{ConstraintSet, export_robot_constraints, parse_robot_constraints};
pub use element::XmlElement;
pub use error::{ConstraintError, Result};
pub use exporter::{constraint_to_element, constraint_to_xml_string, export_constraint};
pub use notice::{Notice, NoticeKind, NoticeLevel, Parsed};
pub use parser::{
    CONSTRAINT_TAGS, constraint_class, is_constraint_tag, parse_constraint, parse_constraint_str,
    parse_coupling_constraint, parse_header, parse_joint_constraint, parse_loop_constraint,
};
pub use pose::{
    ScalarParseError, VectorParseError, format_vector3, parse_f64, parse_pose, parse_vector3,
};
pub use types::{
    Constraint, ConstraintClass, ConstraintHeader, ConstraintKind, CouplingConstraint,
    JointConstraint, LoopConstraint, LoopJointType, Transform, default_joint_axis,
    default_loop_axis,
};
