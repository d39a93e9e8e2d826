//! High-level runner for scattering instances over a mesh and publishing render arrays.
//!
//! A pass runs in three stages:
//! 1. [`scatter_mesh`] samples every triangle into a [`RecordBuffer`],
//! 2. [`pack_records`] sorts the records by chunk and decodes them into [`RenderArrays`],
//! 3. [`ScatterRunner::regenerate`] publishes the arrays, keeping the previous ones if any
//!    stage fails.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::sampling::{
    TriangleSampler, DEFAULT_MAX_INSTANCES_PER_TRIANGLE, DEFAULT_MAX_REJECTIONS,
};
use crate::scatter::chunk::{seed_for_triangle, DEFAULT_CHUNK_SIZE};
use crate::scatter::decode::{decode_records, ColorSource, DecodeOptions};
use crate::scatter::events::{EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::owner::OwnerTransform;
use crate::scatter::record::RecordBuffer;
use crate::scatter::render::RenderArrays;

/// Default distance hosts use to decide which chunks to draw.
pub const DEFAULT_RENDER_DISTANCE: f32 = 32.0;

/// Configuration for a scatter pass.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScatterConfig {
    /// Target instances per unit area where the vertex red channel is 1.
    ///
    /// Should be at least the largest red value of the mesh; otherwise the acceptance test
    /// saturates and placement skews toward the reddest vertices.
    pub density: f32,
    /// Measure triangle area in world space and compensate instance scale for the owner's
    /// world scale.
    pub world_space_scale: bool,
    /// Edge length of the chunk grid in world units.
    pub chunk_size: f32,
    /// Draw distance for hosts; not used during generation.
    pub render_distance: f32,
    /// Rejections allowed per candidate before it is dropped.
    pub max_rejections: u32,
    /// Upper bound on the instances one triangle may request.
    pub max_instances_per_triangle: usize,
    /// Base seed for per-triangle RNGs. `None` draws from the caller's RNG.
    pub seed: Option<u64>,
    /// Source of the shader color array.
    pub color_source: ColorSource,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            world_space_scale: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            render_distance: DEFAULT_RENDER_DISTANCE,
            max_rejections: DEFAULT_MAX_REJECTIONS,
            max_instances_per_triangle: DEFAULT_MAX_INSTANCES_PER_TRIANGLE,
            seed: None,
            color_source: ColorSource::default(),
        }
    }
}

impl ScatterConfig {
    /// Creates a new [`ScatterConfig`] with the specified density.
    pub fn new(density: f32) -> Self {
        Self {
            density,
            ..Default::default()
        }
    }

    pub fn with_world_space_scale(mut self, world_space_scale: bool) -> Self {
        self.world_space_scale = world_space_scale;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: f32) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_render_distance(mut self, render_distance: f32) -> Self {
        self.render_distance = render_distance;
        self
    }

    pub fn with_max_rejections(mut self, max_rejections: u32) -> Self {
        self.max_rejections = max_rejections;
        self
    }

    pub fn with_max_instances_per_triangle(mut self, max_instances: usize) -> Self {
        self.max_instances_per_triangle = max_instances;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_color_source(mut self, color_source: ColorSource) -> Self {
        self.color_source = color_source;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(Error::InvalidConfig("density must be finite and > 0".into()));
        }
        if !self.chunk_size.is_finite() || self.chunk_size <= 0.0 {
            return Err(Error::InvalidConfig(
                "chunk_size must be finite and > 0".into(),
            ));
        }
        if self.render_distance.is_nan() || self.render_distance < 0.0 {
            return Err(Error::InvalidConfig("render_distance must be >= 0".into()));
        }
        if self.max_rejections == 0 {
            return Err(Error::InvalidConfig("max_rejections must be > 0".into()));
        }
        if self.max_instances_per_triangle == 0 {
            return Err(Error::InvalidConfig(
                "max_instances_per_triangle must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Triangle sampler for this configuration under `owner`.
    pub fn sampler(&self, owner: &OwnerTransform) -> TriangleSampler {
        let sampler = TriangleSampler::new(self.density)
            .with_max_rejections(self.max_rejections)
            .with_max_instances(self.max_instances_per_triangle);
        if self.world_space_scale {
            sampler.with_world_scale(owner.world_scale)
        } else {
            sampler
        }
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::default()
            .with_world_space_scale(self.world_space_scale)
            .with_color_source(self.color_source)
    }
}

/// Aggregated statistics of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScatterStats {
    /// Triangles visited.
    pub triangles: usize,
    /// Triangles with a non-zero target count.
    pub triangles_sampled: usize,
    /// Instances requested over all triangles.
    pub target: usize,
    /// Instances encoded.
    pub placed: usize,
    /// Candidates dropped after exhausting the rejection budget.
    pub dropped: usize,
    /// Triangles with a vertex denser than the configured density.
    pub saturated_triangles: usize,
    /// Triangles skipped because their area is not finite.
    pub skipped_triangles: usize,
    /// Triangles whose requested count was clamped to the per-triangle limit.
    pub clamped_triangles: usize,
}

/// Records and statistics produced by [`scatter_mesh`].
#[derive(Debug, Clone, Default)]
pub struct ScatterOutput {
    pub records: RecordBuffer,
    pub stats: ScatterStats,
}

/// Samples every triangle of `mesh` into a fresh record buffer.
pub fn scatter_mesh<R: Rng>(
    mesh: &Mesh,
    config: &ScatterConfig,
    owner: &OwnerTransform,
    rng: &mut R,
    sink: Option<&mut dyn EventSink>,
) -> Result<ScatterOutput> {
    if let Some(s) = sink {
        scatter_mesh_with_events(mesh, config, owner, rng, s)
    } else {
        scatter_mesh_with_events(mesh, config, owner, rng, &mut ())
    }
}

pub fn scatter_mesh_with_events<R: Rng>(
    mesh: &Mesh,
    config: &ScatterConfig,
    owner: &OwnerTransform,
    rng: &mut R,
    sink: &mut dyn EventSink,
) -> Result<ScatterOutput> {
    config.validate()?;
    mesh.validate()?;
    if config.world_space_scale {
        owner.validate_world_scale()?;
    }

    let triangle_count = mesh.triangle_count();
    if sink.wants(ScatterEventKind::RunStarted) {
        sink.send(ScatterEvent::RunStarted {
            config: config.clone(),
            triangle_count,
        });
    }
    info!(
        "Scattering over {} triangles | density: {}.",
        triangle_count, config.density
    );

    let sampler = config.sampler(owner);
    let mut records = RecordBuffer::new();
    let mut stats = ScatterStats::default();

    for (index, triangle) in mesh.triangles().enumerate() {
        stats.triangles += 1;

        let mut seeded;
        let tri_rng: &mut dyn Rng = match config.seed {
            Some(base) => {
                seeded = StdRng::seed_from_u64(seed_for_triangle(base, index));
                &mut seeded
            }
            None => &mut *rng,
        };

        let sample = sampler.sample_into(&triangle, tri_rng, &mut records);
        if !sample.area.is_finite() {
            stats.skipped_triangles += 1;
            continue;
        }
        if sample.target == 0 {
            continue;
        }

        stats.triangles_sampled += 1;
        stats.target += sample.target;
        stats.placed += sample.placed;
        stats.dropped += sample.dropped;
        if sampler.saturates(&triangle) {
            stats.saturated_triangles += 1;
        }
        if sample.clamped {
            stats.clamped_triangles += 1;
        }

        if sink.wants(ScatterEventKind::TriangleSampled) {
            sink.send(ScatterEvent::TriangleSampled { index, sample });
        }
        if sample.dropped > 0 && sink.wants(ScatterEventKind::CandidatesDropped) {
            sink.send(ScatterEvent::CandidatesDropped {
                triangle: index,
                count: sample.dropped,
            });
        }
    }

    if stats.dropped > 0 {
        let message = format!(
            "{} of {} candidates exceeded {} rejections and were dropped",
            stats.dropped, stats.target, config.max_rejections
        );
        warn!("{}.", message);
        if sink.wants(ScatterEventKind::Warning) {
            sink.send(ScatterEvent::Warning {
                context: "sampling".into(),
                message,
            });
        }
    }
    if stats.clamped_triangles > 0 {
        let message = format!(
            "{} triangles requested more than {} instances and were clamped",
            stats.clamped_triangles, config.max_instances_per_triangle
        );
        warn!("{}.", message);
        if sink.wants(ScatterEventKind::Warning) {
            sink.send(ScatterEvent::Warning {
                context: "density".into(),
                message,
            });
        }
    }
    if stats.skipped_triangles > 0 {
        let message = format!(
            "{} triangles with non-finite area were skipped",
            stats.skipped_triangles
        );
        warn!("{}.", message);
        if sink.wants(ScatterEventKind::Warning) {
            sink.send(ScatterEvent::Warning {
                context: "geometry".into(),
                message,
            });
        }
    }
    if stats.saturated_triangles > 0 {
        let message = format!(
            "{} triangles have vertex density above {}; placement is skewed toward them",
            stats.saturated_triangles, config.density
        );
        warn!("{}.", message);
        if sink.wants(ScatterEventKind::Warning) {
            sink.send(ScatterEvent::Warning {
                context: "density".into(),
                message,
            });
        }
    }

    Ok(ScatterOutput { records, stats })
}

/// Sorts records by chunk and decodes them into render arrays.
pub fn pack_records(
    mut records: RecordBuffer,
    config: &ScatterConfig,
    owner: &OwnerTransform,
) -> Result<RenderArrays> {
    if records.is_empty() {
        return Err(Error::EmptyBuffer);
    }
    let chunks = records.sort_by_chunk(config.chunk_size, owner);
    let arrays = decode_records(&records, owner, &config.decode_options())?;
    Ok(arrays.with_chunks(chunks))
}

/// Runs a full pass: scatter, chunk sort, and decode.
pub fn regenerate_with_events<R: Rng>(
    mesh: &Mesh,
    config: &ScatterConfig,
    owner: &OwnerTransform,
    rng: &mut R,
    sink: &mut dyn EventSink,
) -> Result<(RenderArrays, ScatterStats)> {
    let result = scatter_mesh_with_events(mesh, config, owner, rng, sink)
        .and_then(|output| Ok((pack_records(output.records, config, owner)?, output.stats)));

    match result {
        Ok((arrays, stats)) => {
            info!(
                "Scattered {} instances across {} chunks.",
                arrays.len(),
                arrays.chunks.len()
            );
            if sink.wants(ScatterEventKind::RunFinished) {
                sink.send(ScatterEvent::RunFinished { stats });
            }
            Ok((arrays, stats))
        }
        Err(e) => {
            error!("Scatter pass aborted: {}.", e);
            if sink.wants(ScatterEventKind::RunAborted) {
                sink.send(ScatterEvent::RunAborted {
                    reason: e.to_string(),
                });
            }
            Err(e)
        }
    }
}

/// Owns the published render arrays of a mesh and regenerates them on demand.
pub struct ScatterRunner<'a> {
    /// Configuration applied to every pass.
    pub config: ScatterConfig,
    /// Host-owned source mesh.
    pub mesh: &'a Mesh,
    /// World transform of the mesh owner.
    pub owner: OwnerTransform,
    current: Option<RenderArrays>,
    last_stats: Option<ScatterStats>,
}

impl<'a> ScatterRunner<'a> {
    pub fn try_new(config: ScatterConfig, mesh: &'a Mesh) -> Result<Self> {
        config.validate()?;
        mesh.validate()?;
        Ok(Self::new(config, mesh))
    }

    pub fn new(config: ScatterConfig, mesh: &'a Mesh) -> Self {
        debug_assert!(config.density > 0.0, "density must be > 0");
        debug_assert!(config.chunk_size > 0.0, "chunk_size must be > 0");

        Self {
            config,
            mesh,
            owner: OwnerTransform::IDENTITY,
            current: None,
            last_stats: None,
        }
    }

    /// Sets the owner transform used by subsequent passes.
    pub fn with_owner(mut self, owner: OwnerTransform) -> Self {
        self.owner = owner;
        self
    }

    /// Runs a full pass and publishes its arrays.
    ///
    /// On failure the error is logged and returned, and the previously published arrays
    /// stay in place.
    pub fn regenerate(&mut self, rng: &mut impl Rng) -> Result<&RenderArrays> {
        self.regenerate_with_events(rng, &mut ())
    }

    pub fn regenerate_with_events(
        &mut self,
        rng: &mut impl Rng,
        sink: &mut dyn EventSink,
    ) -> Result<&RenderArrays> {
        let (arrays, stats) =
            regenerate_with_events(self.mesh, &self.config, &self.owner, rng, sink)?;
        self.last_stats = Some(stats);
        Ok(&*self.current.insert(arrays))
    }

    /// Arrays of the last successful pass.
    pub fn current(&self) -> Option<&RenderArrays> {
        self.current.as_ref()
    }

    /// Statistics of the last successful pass.
    pub fn last_stats(&self) -> Option<ScatterStats> {
        self.last_stats
    }

    /// Removes and returns the published arrays.
    pub fn take(&mut self) -> Option<RenderArrays> {
        self.current.take()
    }
}
