//! Constraint records.
//!
//! A constraint joins two link endpoints. All variants share a
//! [`ConstraintHeader`]; the variant payload lives in [`ConstraintKind`], so a
//! record can only ever carry the fields that belong to its class.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis used by a non-fixed loop constraint without an `<axis>` element.
#[must_use]
pub fn default_loop_axis() -> Vector3<f64> {
    Vector3::x()
}

/// Axis used by a joint constraint without a `<pos_axis>`/`<rot_axis>` element.
#[must_use]
pub fn default_joint_axis() -> Vector3<f64> {
    Vector3::new(1.0, 1.0, 1.0)
}

// ============================================================================
// Transform
// ============================================================================

/// Rigid transform read from an `<origin>` element.
///
/// Stored as position plus roll-pitch-yaw so that a record written back to
/// XML reproduces the exact numbers it was read from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform {
    /// Translation (xyz) in meters.
    pub translation: Vector3<f64>,
    /// Rotation as roll-pitch-yaw (rpy) in radians.
    pub rpy: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rpy: Vector3::zeros(),
        }
    }

    /// Create from translation and rpy.
    #[must_use]
    pub fn new(translation: Vector3<f64>, rpy: Vector3<f64>) -> Self {
        Self { translation, rpy }
    }

    /// Create a pure translation.
    #[must_use]
    pub fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            translation: Vector3::new(x, y, z),
            rpy: Vector3::zeros(),
        }
    }

    /// Whether this is exactly the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.translation == Vector3::zeros() && self.rpy == Vector3::zeros()
    }

    /// Rotation as a quaternion.
    ///
    /// URDF uses fixed-axis XYZ (roll about X, then pitch about Y, then yaw about Z).
    #[must_use]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(self.rpy.x, self.rpy.y, self.rpy.z)
    }

    /// Convert to an isometry.
    #[must_use]
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation())
    }
}

// ============================================================================
// Discriminators
// ============================================================================

/// Which variant a constraint record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConstraintClass {
    /// Kinematic loop closure.
    Loop,
    /// Transmission coupling with an optional ratio.
    Coupling,
    /// Plain joint-like constraint with gear ratio and two axes.
    Joint,
}

impl ConstraintClass {
    /// Canonical element tag written on export.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Loop => "loop_joint",
            Self::Coupling => "coupling",
            Self::Joint => "constraint",
        }
    }
}

/// Joint type of a loop constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LoopJointType {
    /// Planar (2D translation + rotation) joint.
    Planar,
    /// Revolute joint with limits.
    Revolute,
    /// Continuous (unlimited revolute) joint.
    Continuous,
    /// Prismatic (sliding) joint.
    Prismatic,
    /// Fixed (welded) joint.
    Fixed,
}

impl LoopJointType {
    /// Parse joint type from its XML literal. Matching is case-sensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planar" => Some(Self::Planar),
            "revolute" => Some(Self::Revolute),
            "continuous" => Some(Self::Continuous),
            "prismatic" => Some(Self::Prismatic),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }

    /// XML literal for this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planar => "planar",
            Self::Revolute => "revolute",
            Self::Continuous => "continuous",
            Self::Prismatic => "prismatic",
            Self::Fixed => "fixed",
        }
    }

    /// Whether the axis is meaningful for this type.
    #[must_use]
    pub fn uses_axis(&self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

impl std::fmt::Display for LoopJointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Fields shared by every constraint variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstraintHeader {
    /// Constraint name (required, non-empty, unique within a model).
    pub name: String,
    /// Predecessor (parent) link. `None` when the endpoint is the kinematic root.
    pub predecessor_link_name: Option<String>,
    /// Successor (child) link.
    pub successor_link_name: Option<String>,
}

impl ConstraintHeader {
    /// Create a header with no endpoints.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predecessor_link_name: None,
            successor_link_name: None,
        }
    }

    /// Set both endpoint link names.
    #[must_use]
    pub fn with_links(
        mut self,
        predecessor: impl Into<String>,
        successor: impl Into<String>,
    ) -> Self {
        self.predecessor_link_name = Some(predecessor.into());
        self.successor_link_name = Some(successor.into());
        self
    }
}

/// Loop closure between two links.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoopConstraint {
    /// Constraint frame relative to the predecessor link.
    pub predecessor_to_constraint_origin_transform: Transform,
    /// Constraint frame relative to the successor link.
    pub successor_to_constraint_origin_transform: Transform,
    /// Joint type.
    pub joint_type: LoopJointType,
    /// Motion axis. Not authoritative when `joint_type` is fixed.
    pub axis: Vector3<f64>,
}

impl LoopConstraint {
    /// Create a loop constraint with identity transforms and the default axis.
    #[must_use]
    pub fn new(joint_type: LoopJointType) -> Self {
        Self {
            predecessor_to_constraint_origin_transform: Transform::identity(),
            successor_to_constraint_origin_transform: Transform::identity(),
            joint_type,
            axis: default_loop_axis(),
        }
    }

    /// Set the axis.
    #[must_use]
    pub fn with_axis(mut self, axis: Vector3<f64>) -> Self {
        self.axis = axis;
        self
    }

    /// Set both endpoint transforms.
    #[must_use]
    pub fn with_transforms(mut self, predecessor: Transform, successor: Transform) -> Self {
        self.predecessor_to_constraint_origin_transform = predecessor;
        self.successor_to_constraint_origin_transform = successor;
        self
    }

    /// The axis, or `None` for fixed constraints where it carries no meaning.
    #[must_use]
    pub fn authoritative_axis(&self) -> Option<Vector3<f64>> {
        self.joint_type.uses_axis().then_some(self.axis)
    }
}

/// Transmission coupling between two links.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CouplingConstraint {
    /// Coupling ratio. Left unset when the element has no `<ratio>`.
    pub ratio: Option<f64>,
}

impl CouplingConstraint {
    /// Create a coupling with the given ratio.
    #[must_use]
    pub fn with_ratio(ratio: f64) -> Self {
        Self { ratio: Some(ratio) }
    }
}

/// Plain joint-like constraint with a gear ratio and two axes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointConstraint {
    /// Gear ratio between the constrained degrees of freedom.
    pub gear_ratio: f64,
    /// Position axis.
    pub position_axis: Vector3<f64>,
    /// Rotation axis.
    pub rotation_axis: Vector3<f64>,
    /// Constraint frame relative to the predecessor link.
    pub predecessor_to_constraint_origin_transform: Transform,
    /// Constraint frame relative to the successor link.
    pub successor_to_constraint_origin_transform: Transform,
}

impl JointConstraint {
    /// Create a joint constraint with default axes and identity transforms.
    #[must_use]
    pub fn new(gear_ratio: f64) -> Self {
        Self {
            gear_ratio,
            position_axis: default_joint_axis(),
            rotation_axis: default_joint_axis(),
            predecessor_to_constraint_origin_transform: Transform::identity(),
            successor_to_constraint_origin_transform: Transform::identity(),
        }
    }

    /// Set both axes.
    #[must_use]
    pub fn with_axes(mut self, position_axis: Vector3<f64>, rotation_axis: Vector3<f64>) -> Self {
        self.position_axis = position_axis;
        self.rotation_axis = rotation_axis;
        self
    }

    /// Set both endpoint transforms.
    #[must_use]
    pub fn with_transforms(mut self, predecessor: Transform, successor: Transform) -> Self {
        self.predecessor_to_constraint_origin_transform = predecessor;
        self.successor_to_constraint_origin_transform = successor;
        self
    }
}

/// Variant payload of a constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConstraintKind {
    /// Loop closure.
    Loop(LoopConstraint),
    /// Transmission coupling.
    Coupling(CouplingConstraint),
    /// Plain joint constraint.
    Joint(JointConstraint),
}

impl ConstraintKind {
    /// Class of this payload.
    #[must_use]
    pub fn class(&self) -> ConstraintClass {
        match self {
            Self::Loop(_) => ConstraintClass::Loop,
            Self::Coupling(_) => ConstraintClass::Coupling,
            Self::Joint(_) => ConstraintClass::Joint,
        }
    }
}

/// A fully parsed constraint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constraint {
    /// Shared header.
    pub header: ConstraintHeader,
    /// Variant payload.
    pub kind: ConstraintKind,
}

impl Constraint {
    /// Assemble a record from a header and payload.
    #[must_use]
    pub fn new(header: ConstraintHeader, kind: ConstraintKind) -> Self {
        Self { header, kind }
    }

    /// Constraint name.
    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Class discriminator.
    #[must_use]
    pub fn class(&self) -> ConstraintClass {
        self.kind.class()
    }

    /// Loop payload, if this is a loop constraint.
    pub fn as_loop(&self) -> Option<&LoopConstraint> {
        match &self.kind {
            ConstraintKind::Loop(l) => Some(l),
            _ => None,
        }
    }

    /// Coupling payload, if this is a coupling constraint.
    pub fn as_coupling(&self) -> Option<&CouplingConstraint> {
        match &self.kind {
            ConstraintKind::Coupling(c) => Some(c),
            _ => None,
        }
    }

    /// Joint payload, if this is a joint constraint.
    pub fn as_joint(&self) -> Option<&JointConstraint> {
        match &self.kind {
            ConstraintKind::Joint(j) => Some(j),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_loop_joint_type_literals() {
        for t in [
            LoopJointType::Planar,
            LoopJointType::Revolute,
            LoopJointType::Continuous,
            LoopJointType::Prismatic,
            LoopJointType::Fixed,
        ] {
            assert_eq!(LoopJointType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(LoopJointType::from_str("Revolute"), None);
        assert_eq!(LoopJointType::from_str("floating"), None);
    }

    #[test]
    fn test_fixed_axis_not_authoritative() {
        let fixed = LoopConstraint::new(LoopJointType::Fixed).with_axis(Vector3::z());
        assert_eq!(fixed.authoritative_axis(), None);

        let rev = LoopConstraint::new(LoopJointType::Revolute);
        assert_eq!(rev.authoritative_axis(), Some(Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_transform_isometry() {
        let t = Transform::new(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2),
        );
        let iso = t.to_isometry();
        assert_relative_eq!(iso.translation.vector.y, 2.0, epsilon = 1e-12);

        let rotated = iso.rotation * Vector3::x();
        assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-12);
        assert!(!t.is_identity());
        assert!(Transform::default().is_identity());
    }

    #[test]
    fn test_class_from_kind() {
        let c = Constraint::new(
            ConstraintHeader::new("c").with_links("a", "b"),
            ConstraintKind::Coupling(CouplingConstraint::with_ratio(2.0)),
        );
        assert_eq!(c.class(), ConstraintClass::Coupling);
        assert!(c.as_loop().is_none());
        assert_eq!(c.as_coupling().and_then(|c| c.ratio), Some(2.0));
        assert_eq!(ConstraintClass::Loop.tag(), "loop_joint");
    }

    #[test]
    fn test_joint_defaults() {
        let j = JointConstraint::new(0.5);
        assert_eq!(j.position_axis, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(j.rotation_axis, Vector3::new(1.0, 1.0, 1.0));
        assert!(j.predecessor_to_constraint_origin_transform.is_identity());
    }
}
