//! Density-weighted instance placement inside a single triangle.
//!
//! The number of instances is derived from the triangle's area, the global density, and
//! the mean vertex red channel. Each instance position is then drawn by rejection sampling:
//! a uniform barycentric candidate is kept with probability
//! `interpolated_red / density`, so instances cluster where vertices are painted redder.
use glam::{Quat, Vec3};
use rand::Rng;

use crate::mesh::Triangle;
use crate::sampling::{rand01, Barycentric};
use crate::scatter::record::{Instance, RecordBuffer};

/// Rejections allowed per candidate before it is dropped.
pub const DEFAULT_MAX_REJECTIONS: u32 = 1024;

/// Instances a single triangle may request before its count is clamped.
pub const DEFAULT_MAX_INSTANCES_PER_TRIANGLE: usize = 1 << 20;

/// Target instance count: `floor(density * area * vertex_color_density)`.
///
/// Non-finite or non-positive products yield zero. Products beyond `usize::MAX` saturate;
/// [`TriangleSampler`] clamps the result further to its per-triangle limit.
pub fn target_count(density: f32, area: f32, vertex_color_density: f32) -> usize {
    let product = density * area * vertex_color_density;
    if !product.is_finite() || product <= 0.0 {
        return 0;
    }
    product.floor() as usize
}

/// Outcome of sampling one triangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TriangleSample {
    /// Area used for the count (world-scaled when configured).
    pub area: f32,
    /// Instances requested before rejection sampling.
    pub target: usize,
    /// Instances emitted.
    pub placed: usize,
    /// Candidates dropped after exhausting the rejection budget.
    pub dropped: usize,
    /// The requested count exceeded the per-triangle limit and was clamped to it.
    pub clamped: bool,
}

/// Places instances inside triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleSampler {
    /// Target instances per unit area at full red.
    pub density: f32,
    /// Owner world scale applied to edges before measuring area.
    pub world_scale: Option<Vec3>,
    /// Rejections allowed per candidate.
    pub max_rejections: u32,
    /// Upper bound on the target count of one triangle.
    pub max_instances: usize,
}

impl TriangleSampler {
    pub fn new(density: f32) -> Self {
        Self {
            density,
            world_scale: None,
            max_rejections: DEFAULT_MAX_REJECTIONS,
            max_instances: DEFAULT_MAX_INSTANCES_PER_TRIANGLE,
        }
    }

    pub fn with_world_scale(mut self, world_scale: Vec3) -> Self {
        self.world_scale = Some(world_scale);
        self
    }

    pub fn with_max_rejections(mut self, max_rejections: u32) -> Self {
        self.max_rejections = max_rejections;
        self
    }

    pub fn with_max_instances(mut self, max_instances: usize) -> Self {
        self.max_instances = max_instances;
        self
    }

    pub fn area(&self, triangle: &Triangle) -> f32 {
        match self.world_scale {
            Some(scale) => triangle.area_scaled(scale),
            None => triangle.area(),
        }
    }

    /// Target count of `triangle`, clamped to `max_instances`.
    pub fn target_count(&self, triangle: &Triangle) -> usize {
        self.clamped_target(self.area(triangle), triangle).0
    }

    fn clamped_target(&self, area: f32, triangle: &Triangle) -> (usize, bool) {
        let requested = target_count(self.density, area, triangle.vertex_color_density());
        (requested.min(self.max_instances), requested > self.max_instances)
    }

    /// True if some vertex is denser than the global density, which saturates the
    /// acceptance ratio and skews placement toward those vertices.
    pub fn saturates(&self, triangle: &Triangle) -> bool {
        triangle.max_vertex_density() > self.density
    }

    /// Draws barycentric candidates until one passes the density test.
    ///
    /// Returns `None` once `max_rejections` candidates have been rejected.
    pub fn accept_candidate(
        &self,
        triangle: &Triangle,
        rng: &mut dyn Rng,
    ) -> Option<Barycentric> {
        let mut rejections = 0;
        loop {
            let bary = Barycentric::sample_uniform(rng);
            if rand01(rng) < triangle.density_at(bary) / self.density {
                return Some(bary);
            }
            rejections += 1;
            if rejections >= self.max_rejections {
                return None;
            }
        }
    }

    /// Builds the instance at an accepted coordinate.
    ///
    /// Scale comes from the interpolated green channel. The instance is rolled by a uniform
    /// random angle around its normal.
    pub fn instance_at(
        &self,
        triangle: &Triangle,
        bary: Barycentric,
        rng: &mut dyn Rng,
    ) -> Instance {
        let position = triangle.position_at(bary);
        let normal = triangle.normal_at(bary);
        let color = triangle.color_at(bary);
        let roll = (rand01(rng) * 360.0).to_radians();
        let axis = normal.try_normalize().unwrap_or(Vec3::Y);

        Instance {
            position,
            orientation: Quat::from_axis_angle(axis, roll),
            scale: Vec3::splat(color.y),
            normal,
            color,
        }
    }

    /// Samples one triangle, handing each instance to `emit`.
    pub fn sample_with(
        &self,
        triangle: &Triangle,
        rng: &mut dyn Rng,
        mut emit: impl FnMut(Instance),
    ) -> TriangleSample {
        let area = self.area(triangle);
        let (target, clamped) = self.clamped_target(area, triangle);

        let mut placed = 0;
        let mut dropped = 0;
        for _ in 0..target {
            match self.accept_candidate(triangle, rng) {
                Some(bary) => {
                    emit(self.instance_at(triangle, bary, rng));
                    placed += 1;
                }
                None => dropped += 1,
            }
        }

        TriangleSample {
            area,
            target,
            placed,
            dropped,
            clamped,
        }
    }

    /// Samples one triangle and appends its records to `out`.
    pub fn sample_into(
        &self,
        triangle: &Triangle,
        rng: &mut dyn Rng,
        out: &mut RecordBuffer,
    ) -> TriangleSample {
        out.reserve(self.target_count(triangle));
        self.sample_with(triangle, rng, |instance| out.push(&instance))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    struct FixedRng {
        value: u32,
    }

    impl rand::TryRng for FixedRng {
        type Error = core::convert::Infallible;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Ok(self.value)
        }

        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Ok(self.value as u64)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Self::Error> {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
            Ok(())
        }
    }

    fn unit_triangle(red: [f32; 3], green: f32) -> Triangle {
        Triangle {
            positions: [Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: [Vec3::Z; 3],
            colors: red.map(|r| Vec4::new(r, green, 0.0, 1.0)),
        }
    }

    #[test]
    fn target_count_floors_the_product() {
        assert_eq!(target_count(20.0, 0.5, 1.0), 10);
        assert_eq!(target_count(3.0, 0.5, 1.0), 1);
        assert_eq!(target_count(7.0, 1.0, 0.99), 6);
        assert_eq!(target_count(10.0, 2.5, 0.5), 12);
        assert_eq!(target_count(10.0, 0.0, 1.0), 0);
        assert_eq!(target_count(10.0, 1.0, 0.0), 0);
        assert_eq!(target_count(10.0, 1.0, -1.0), 0);
        assert_eq!(target_count(f32::NAN, 1.0, 1.0), 0);
    }

    #[test]
    fn unit_triangle_with_full_red_places_exactly_target() {
        let sampler = TriangleSampler::new(20.0);
        let tri = unit_triangle([1.0; 3], 1.0);
        assert_eq!(sampler.target_count(&tri), 10);

        // Acceptance ratio is 1/20 everywhere; the cap is far beyond what is needed.
        let mut rng = StdRng::seed_from_u64(5);
        let mut out = RecordBuffer::new();
        let sample = sampler
            .with_max_rejections(100_000)
            .sample_into(&tri, &mut rng, &mut out);
        assert_eq!(sample.target, 10);
        assert_eq!(sample.placed, 10);
        assert_eq!(sample.dropped, 0);
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn target_is_clamped_to_the_instance_limit() {
        let tri = unit_triangle([1.0; 3], 1.0);
        let sampler = TriangleSampler::new(1.0e20)
            .with_max_instances(4)
            .with_max_rejections(1);
        assert_eq!(target_count(1.0e20, 0.5, 1.0), usize::MAX);
        assert_eq!(sampler.target_count(&tri), 4);

        let mut rng = StdRng::seed_from_u64(8);
        let mut out = RecordBuffer::new();
        let sample = sampler.sample_into(&tri, &mut rng, &mut out);
        assert_eq!(sample.target, 4);
        assert!(sample.clamped);
        assert_eq!(sample.placed + sample.dropped, 4);
        assert_eq!(out.len(), sample.placed);
    }

    #[test]
    fn world_scale_changes_area_and_count() {
        let tri = unit_triangle([1.0; 3], 1.0);
        let sampler = TriangleSampler::new(1.0).with_world_scale(Vec3::splat(4.0));
        assert!((sampler.area(&tri) - 8.0).abs() < 1e-5);
        assert_eq!(sampler.target_count(&tri), 8);
    }

    #[test]
    fn zero_density_vertices_produce_nothing() {
        let sampler = TriangleSampler::new(10.0);
        let tri = unit_triangle([0.0; 3], 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut out = RecordBuffer::new();
        let sample = sampler.sample_into(&tri, &mut rng, &mut out);
        assert_eq!(sample.target, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn accepted_points_lie_inside_the_triangle() {
        let sampler = TriangleSampler::new(1.0);
        let tri = unit_triangle([1.0, 0.2, 0.6], 1.0);
        let mut rng = StdRng::seed_from_u64(77);
        for _ in 0..2_000 {
            let bary = sampler
                .accept_candidate(&tri, &mut rng)
                .expect("acceptance is never zero here");
            assert!(bary.is_normalized(1e-5));
            let p = tri.position_at(bary);
            assert!(p.x >= -1e-6 && p.y >= -1e-6 && p.x + p.y <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn placement_follows_vertex_density() {
        // Only v0 is painted; accepted points must lean toward it.
        let sampler = TriangleSampler::new(1.0);
        let tri = unit_triangle([1.0, 0.0, 0.0], 1.0);
        let mut rng = StdRng::seed_from_u64(3);
        let n = 4_000;
        let mean_u: f32 = (0..n)
            .map(|_| sampler.accept_candidate(&tri, &mut rng).expect("accepted").u)
            .sum::<f32>()
            / n as f32;
        // Uniform sampling would give 1/3; density weighting by u gives 1/2.
        assert!((mean_u - 0.5).abs() < 0.03, "mean u {mean_u}");
    }

    #[test]
    fn exhausted_candidates_are_dropped() {
        // A draw of zero never beats an acceptance ratio of zero.
        let sampler = TriangleSampler::new(1.0).with_max_rejections(8);
        let tri = unit_triangle([0.0; 3], 1.0);
        let mut rng = FixedRng { value: 0 };
        assert!(sampler.accept_candidate(&tri, &mut rng).is_none());
    }

    #[test]
    fn instance_takes_scale_from_green_and_rolls_about_normal() {
        let sampler = TriangleSampler::new(1.0);
        let tri = unit_triangle([1.0; 3], 0.75);
        let mut rng = StdRng::seed_from_u64(11);
        let inst = sampler.instance_at(&tri, Barycentric::CENTROID, &mut rng);

        assert!((inst.scale - Vec3::splat(0.75)).length() < 1e-6);
        assert!((inst.color - Vec4::new(1.0, 0.75, 0.0, 1.0)).length() < 1e-6);
        assert!(inst.orientation.is_normalized());
        // Rotating about the normal leaves the normal in place.
        let rotated = inst.orientation * Vec3::Z;
        assert!((rotated - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn zero_normal_falls_back_to_up_axis() {
        let sampler = TriangleSampler::new(1.0);
        let mut tri = unit_triangle([1.0; 3], 1.0);
        tri.normals = [Vec3::ZERO; 3];
        let mut rng = StdRng::seed_from_u64(2);
        let inst = sampler.instance_at(&tri, Barycentric::CENTROID, &mut rng);
        assert!(inst.orientation.is_finite());
        assert!(((inst.orientation * Vec3::Y) - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn saturation_is_detected() {
        let tri = unit_triangle([0.5, 2.0, 0.5], 1.0);
        assert!(TriangleSampler::new(1.0).saturates(&tri));
        assert!(!TriangleSampler::new(2.0).saturates(&tri));
    }
}
