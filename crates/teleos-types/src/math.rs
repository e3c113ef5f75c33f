//! Minimal 3-D rigid-body math: translation vectors and unit quaternions.
//!
//! Everything the pose-fusion core needs and nothing more: Hamilton products,
//! conjugation, the quaternion sandwich for rotating vectors between frames,
//! and the rotation-vector (axis-angle) exponential used by the spatial-input
//! and gamepad paths.
//!
//! All scalars are `f64`; orientation norms are maintained to 1e-9 by
//! renormalising after every composition.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D translation vector (metres in the robot base frame).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    /// Uniform scaling.
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Componentwise product, used to apply independent per-axis gains.
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// Euclidean norm.
    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A rotation quaternion in (w, x, y, z) convention.
///
/// Constructors other than [`Quaternion::new`] produce unit quaternions;
/// composition paths must call [`Quaternion::normalized`] after every
/// multiply so numerical drift never accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// Create a quaternion from raw components.  The caller is responsible
    /// for the norm.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Build the unit quaternion for a rotation vector (axis × angle).
    ///
    /// The zero vector maps to the identity rotation.
    pub fn from_rotation_vector(v: Vec3) -> Self {
        let angle = v.norm();
        if angle < 1e-12 {
            return Self::identity();
        }
        let half = 0.5 * angle;
        let k = half.sin() / angle;
        Self::new(half.cos(), v.x * k, v.y * k, v.z * k)
    }

    /// Hamilton product: `self * rhs` composes `rhs` followed by `self`.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Quaternion norm.
    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Rescale to unit norm.  Degenerate (near-zero) quaternions collapse to
    /// the identity rather than dividing by zero.
    pub fn normalized(self) -> Self {
        let n = self.norm();
        if n < 1e-12 {
            return Self::identity();
        }
        Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
    }

    /// Rotate a vector by this quaternion: p' = q · p · q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose & frames
// ────────────────────────────────────────────────────────────────────────────

/// A Cartesian pose: position plus unit orientation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quaternion,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Origin position, identity orientation.
    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }
}

/// Which frame an incremental rotation or displacement is authored in.
///
/// `World` deltas compose directly; `Local` (end-effector) deltas must be
/// sandwiched by the current orientation before composing, because the
/// operator reasons about "forward" relative to the gripper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationFrame {
    World,
    Local,
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
