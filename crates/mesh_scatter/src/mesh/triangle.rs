//! Triangle views and per-triangle attribute queries.
use glam::{Vec3, Vec4};

use crate::sampling::Barycentric;

/// Three vertices copied out of a [`crate::mesh::Mesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub positions: [Vec3; 3],
    pub normals: [Vec3; 3],
    pub colors: [Vec4; 3],
}

impl Triangle {
    /// Mesh-space area.
    pub fn area(&self) -> f32 {
        let [v0, v1, v2] = self.positions;
        (v1 - v0).cross(v2 - v0).length() * 0.5
    }

    /// Area after scaling both edges componentwise by `scale`.
    ///
    /// Used for world-space density so that a stretched owner receives proportionally more
    /// instances than its mesh-space size suggests.
    pub fn area_scaled(&self, scale: Vec3) -> f32 {
        let [v0, v1, v2] = self.positions;
        let edge_a = (v1 - v0) * scale;
        let edge_b = (v2 - v0) * scale;
        edge_a.cross(edge_b).length() * 0.5
    }

    /// Mean red channel of the three vertices.
    pub fn vertex_color_density(&self) -> f32 {
        (self.colors[0].x + self.colors[1].x + self.colors[2].x) / 3.0
    }

    /// Largest red channel of the three vertices.
    pub fn max_vertex_density(&self) -> f32 {
        self.colors[0].x.max(self.colors[1].x).max(self.colors[2].x)
    }

    /// Red channel interpolated at `bary`.
    pub fn density_at(&self, bary: Barycentric) -> f32 {
        bary.interpolate(self.colors[0].x, self.colors[1].x, self.colors[2].x)
    }

    pub fn position_at(&self, bary: Barycentric) -> Vec3 {
        let [a, b, c] = self.positions;
        bary.interpolate(a, b, c)
    }

    /// Interpolated, unnormalized normal.
    pub fn normal_at(&self, bary: Barycentric) -> Vec3 {
        let [a, b, c] = self.normals;
        bary.interpolate(a, b, c)
    }

    pub fn color_at(&self, bary: Barycentric) -> Vec4 {
        let [a, b, c] = self.colors;
        bary.interpolate(a, b, c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(colors: [Vec4; 3]) -> Triangle {
        Triangle {
            positions: [Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: [Vec3::Z, Vec3::Z, Vec3::X],
            colors,
        }
    }

    #[test]
    fn area_of_unit_right_triangle() {
        let t = tri([Vec4::ONE; 3]);
        assert!((t.area() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn scaled_area_follows_edge_scaling() {
        let t = tri([Vec4::ONE; 3]);
        assert!((t.area_scaled(Vec3::ONE) - t.area()).abs() < 1e-6);
        assert!((t.area_scaled(Vec3::splat(2.0)) - 2.0).abs() < 1e-6);
        // Stretching along Z does not change a triangle lying in the XY plane.
        assert!((t.area_scaled(Vec3::new(1.0, 1.0, 5.0)) - 0.5).abs() < 1e-6);
        assert!((t.area_scaled(Vec3::new(3.0, 1.0, 1.0)) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_triangle_has_zero_area() {
        let t = Triangle {
            positions: [Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
            normals: [Vec3::Z; 3],
            colors: [Vec4::ONE; 3],
        };
        assert_eq!(t.area(), 0.0);
    }

    #[test]
    fn vertex_density_uses_red_channel() {
        let t = tri([
            Vec4::new(0.0, 1.0, 1.0, 1.0),
            Vec4::new(0.3, 0.0, 0.0, 1.0),
            Vec4::new(0.9, 0.0, 0.0, 1.0),
        ]);
        assert!((t.vertex_color_density() - 0.4).abs() < 1e-6);
        assert_eq!(t.max_vertex_density(), 0.9);
    }

    #[test]
    fn attributes_interpolate_at_corners() {
        let colors = [
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
        ];
        let t = tri(colors);
        let at_v1 = Barycentric::new(0.0, 1.0, 0.0);
        assert_eq!(t.position_at(at_v1), Vec3::X);
        assert_eq!(t.color_at(at_v1), colors[1]);
        assert_eq!(t.density_at(at_v1), 0.0);

        let centroid = Barycentric::CENTROID;
        let p = t.position_at(centroid);
        assert!((p - Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)).length() < 1e-6);
        let n = t.normal_at(Barycentric::new(0.5, 0.0, 0.5));
        assert!((n - Vec3::new(0.5, 0.0, 0.5)).length() < 1e-6);
    }
}
