//! Event types and sinks for observing scatter runs.
//!
//! This module defines [`ScatterEvent`] and a set of sinks to emit, collect, or forward
//! events while regenerating through [`crate::scatter::runner::ScatterRunner`] or
//! [`crate::scatter::runner::scatter_mesh_with_events`].
use crate::sampling::TriangleSample;
use crate::scatter::runner::{ScatterConfig, ScatterStats};

/// Describes events emitted by scatter operations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum ScatterEvent {
    /// Emitted when a pass starts.
    RunStarted {
        /// The configuration used.
        config: ScatterConfig,
        /// Number of triangles in the source mesh.
        triangle_count: usize,
    },

    /// Emitted after a triangle with a non-zero target count was sampled.
    TriangleSampled {
        /// Triangle index in the mesh.
        index: usize,
        /// Per-triangle outcome.
        sample: TriangleSample,
    },

    /// Emitted when candidates of a triangle exhausted the rejection budget.
    CandidatesDropped {
        /// Triangle index in the mesh.
        triangle: usize,
        /// Number of dropped candidates.
        count: usize,
    },

    /// Non-fatal warning generated during scatter.
    Warning {
        /// Context string (e.g. triangle index).
        context: String,
        /// Human-readable message.
        message: String,
    },

    /// Emitted when a pass is aborted and nothing is published.
    RunAborted {
        /// Human-readable reason.
        reason: String,
    },

    /// Emitted when a pass completes.
    RunFinished {
        /// Aggregated statistics of the pass.
        stats: ScatterStats,
    },
}

impl ScatterEvent {
    pub fn kind(&self) -> ScatterEventKind {
        match self {
            ScatterEvent::RunStarted { .. } => ScatterEventKind::RunStarted,
            ScatterEvent::TriangleSampled { .. } => ScatterEventKind::TriangleSampled,
            ScatterEvent::CandidatesDropped { .. } => ScatterEventKind::CandidatesDropped,
            ScatterEvent::Warning { .. } => ScatterEventKind::Warning,
            ScatterEvent::RunAborted { .. } => ScatterEventKind::RunAborted,
            ScatterEvent::RunFinished { .. } => ScatterEventKind::RunFinished,
        }
    }
}

/// Discriminant of [`ScatterEvent`], used to skip building unwanted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScatterEventKind {
    RunStarted,
    TriangleSampled,
    CandidatesDropped,
    Warning,
    RunAborted,
    RunFinished,
}

/// A generic event sink that accepts [`ScatterEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: ScatterEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = ScatterEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: ScatterEvent) {}

    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<ScatterEvent>,
    only: Option<Vec<ScatterEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            only: None,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Restricts collection to the given kinds.
    pub fn only(mut self, kinds: impl IntoIterator<Item = ScatterEventKind>) -> Self {
        self.only = Some(kinds.into_iter().collect());
        self
    }

    pub fn into_inner(self) -> Vec<ScatterEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[ScatterEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: ScatterEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: ScatterEvent) {
        let kind = event.kind();
        let Some(last_idx) = self.sinks.iter().rposition(|s| s.wants(kind)) else {
            return;
        };
        for i in 0..last_idx {
            if self.sinks[i].wants(kind) {
                self.sinks[i].send(event.clone());
            }
        }
        self.sinks[last_idx].send(event);
    }

    fn wants(&self, kind: ScatterEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
