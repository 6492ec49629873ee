//! Quaternion and rigid pose algebra
//!
//! Everything is `f64` and by value. Rotation quaternions are expected to be
//! unit length already; nothing here renormalises, and the conjugate doubles
//! as the inverse only under that assumption.

use glam::{DMat4, DQuat, DVec3};
use std::f64::consts::PI;
use std::ops::{Add, Mul, Neg, Sub};

/// Quaternion stored as (w, x, y, z). With `w == 0` it doubles as a 3D point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion::new(1.0, 0.0, 0.0, 0.0);
    pub const ZERO: Quaternion = Quaternion::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Quaternion { w, x, y, z }
    }

    /// Pure quaternion carrying a point or vector.
    pub const fn point(p: [f64; 3]) -> Self {
        Quaternion::new(0.0, p[0], p[1], p[2])
    }

    pub fn vector(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn conjugate(&self) -> Self {
        Quaternion::new(self.w, -self.x, -self.y, -self.z)
    }

    pub fn negated(&self) -> Self {
        Quaternion::new(-self.w, -self.x, -self.y, -self.z)
    }

    pub fn scaled(&self, k: f64) -> Self {
        Quaternion::new(k * self.w, k * self.x, k * self.y, k * self.z)
    }

    /// Hamilton product `self * q`.
    pub fn hamilton(&self, q: &Quaternion) -> Self {
        Quaternion::new(
            self.w * q.w - self.x * q.x - self.y * q.y - self.z * q.z,
            self.w * q.x + self.x * q.w + self.y * q.z - self.z * q.y,
            self.w * q.y - self.x * q.z + self.y * q.w + self.z * q.x,
            self.w * q.z + self.x * q.y - self.y * q.x + self.z * q.w,
        )
    }

    /// `q * p * ~q`
    pub fn rotate(&self, p: &Quaternion) -> Self {
        self.hamilton(p).hamilton(&self.conjugate())
    }

    /// Same rotation with `w >= 0`, so `q` and `-q` always pack identically.
    pub fn canonical(&self) -> Self {
        if self.w < 0.0 {
            self.negated()
        } else {
            *self
        }
    }

    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Rotation from Euler angles in degrees, composed as `Z * Y * X`.
    pub fn from_euler_degrees(euler: [f64; 3]) -> Self {
        let half = |deg: f64| deg * PI / 360.0;
        let (ax, ay, az) = (half(euler[0]), half(euler[1]), half(euler[2]));
        let rx = Quaternion::new(ax.cos(), ax.sin(), 0.0, 0.0);
        let ry = Quaternion::new(ay.cos(), 0.0, ay.sin(), 0.0);
        let rz = Quaternion::new(az.cos(), 0.0, 0.0, az.sin());
        rz.hamilton(&ry).hamilton(&rx)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::IDENTITY
    }
}

impl Neg for Quaternion {
    type Output = Quaternion;

    fn neg(self) -> Quaternion {
        self.negated()
    }
}

impl Add for Quaternion {
    type Output = Quaternion;

    fn add(self, q: Quaternion) -> Quaternion {
        Quaternion::new(self.w + q.w, self.x + q.x, self.y + q.y, self.z + q.z)
    }
}

impl Sub for Quaternion {
    type Output = Quaternion;

    fn sub(self, q: Quaternion) -> Quaternion {
        Quaternion::new(self.w - q.w, self.x - q.x, self.y - q.y, self.z - q.z)
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, q: Quaternion) -> Quaternion {
        self.hamilton(&q)
    }
}

impl Mul<f64> for Quaternion {
    type Output = Quaternion;

    fn mul(self, k: f64) -> Quaternion {
        self.scaled(k)
    }
}

impl From<Quaternion> for DQuat {
    fn from(q: Quaternion) -> Self {
        DQuat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

impl From<DQuat> for Quaternion {
    fn from(q: DQuat) -> Self {
        Quaternion::new(q.w, q.x, q.y, q.z)
    }
}

/// Rigid transform: rotate, then translate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseTransform {
    pub rotation: Quaternion,
    /// Pure quaternion (w = 0).
    pub translation: Quaternion,
}

impl Default for PoseTransform {
    fn default() -> Self {
        PoseTransform::IDENTITY
    }
}

impl PoseTransform {
    pub const IDENTITY: PoseTransform = PoseTransform {
        rotation: Quaternion::IDENTITY,
        translation: Quaternion::ZERO,
    };

    pub fn new(rotation: Quaternion, translation: Quaternion) -> Self {
        PoseTransform {
            rotation,
            translation,
        }
    }

    pub fn from_euler(euler: [f64; 3]) -> Self {
        PoseTransform::new(Quaternion::from_euler_degrees(euler), Quaternion::ZERO)
    }

    /// Rotation about `pivot`: the pivot itself stays where it is.
    pub fn from_euler_pivot(euler: [f64; 3], pivot: [f64; 3]) -> Self {
        let rotation = Quaternion::from_euler_degrees(euler);
        let pivot = Quaternion::point(pivot);
        PoseTransform::new(rotation, pivot - rotation.rotate(&pivot))
    }

    /// Euler rotation followed by a translation to `position`.
    pub fn placement(euler: [f64; 3], position: [f64; 3]) -> Self {
        PoseTransform::new(
            Quaternion::from_euler_degrees(euler),
            Quaternion::point(position),
        )
    }

    /// `self * other`: `other` is applied first, expressed in `self`'s frame.
    pub fn compose(&self, other: &PoseTransform) -> Self {
        PoseTransform::new(
            self.rotation.hamilton(&other.rotation),
            self.apply(&other.translation),
        )
    }

    /// `R * p * ~R + t`
    pub fn apply(&self, point: &Quaternion) -> Quaternion {
        self.rotation.rotate(point) + self.translation
    }

    pub fn to_mat4(&self) -> DMat4 {
        let t = self.translation;
        DMat4::from_rotation_translation(self.rotation.into(), DVec3::new(t.x, t.y, t.z))
    }
}

impl Mul for PoseTransform {
    type Output = PoseTransform;

    fn mul(self, other: PoseTransform) -> PoseTransform {
        self.compose(&other)
    }
}

impl Mul<Quaternion> for PoseTransform {
    type Output = Quaternion;

    fn mul(self, point: Quaternion) -> Quaternion {
        self.apply(&point)
    }
}
