//! Barycentric coordinates and uniform sampling over a triangle.
use std::ops::{Add, Mul};

use rand::Rng;

use crate::sampling::rand01;

/// Weights `(u, v, w)` of a point relative to a triangle's vertices `(v0, v1, v2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

impl Barycentric {
    pub const CENTROID: Self = Self {
        u: 1.0 / 3.0,
        v: 1.0 / 3.0,
        w: 1.0 / 3.0,
    };

    pub const fn new(u: f32, v: f32, w: f32) -> Self {
        Self { u, v, w }
    }

    /// Maps two unit-square samples onto the triangle with the parallelogram fold.
    ///
    /// Pairs with `r1 + r2 > 1` lie in the mirrored half of the parallelogram and are
    /// reflected back, which keeps the distribution uniform over the triangle.
    pub fn from_unit_square(r1: f32, r2: f32) -> Self {
        let (r1, r2) = if r1 + r2 > 1.0 {
            (1.0 - r1, 1.0 - r2)
        } else {
            (r1, r2)
        };
        Self {
            u: 1.0 - r1 - r2,
            v: r1,
            w: r2,
        }
    }

    /// Draws a point uniformly distributed over the triangle.
    pub fn sample_uniform(rng: &mut dyn Rng) -> Self {
        let r1 = rand01(rng);
        let r2 = rand01(rng);
        Self::from_unit_square(r1, r2)
    }

    /// Weighted combination `a * u + b * v + c * w`.
    #[inline]
    pub fn interpolate<T>(self, a: T, b: T, c: T) -> T
    where
        T: Mul<f32, Output = T> + Add<Output = T>,
    {
        a * self.u + b * self.v + c * self.w
    }

    pub fn sum(self) -> f32 {
        self.u + self.v + self.w
    }

    /// True if the weights sum to one within `eps` and each lies in `[0, 1]`.
    pub fn is_normalized(self, eps: f32) -> bool {
        let in_range = |x: f32| (-eps..=1.0 + eps).contains(&x);
        (self.sum() - 1.0).abs() <= eps && in_range(self.u) && in_range(self.v) && in_range(self.w)
    }
}
