//! Frame graph infrastructure.
//!
//! Passes are declared once per frame, each with the set of passes it reads
//! from and the set whose targets it overwrites. [`FrameGraph::build`]
//! compiles them into an [`ExecutionPlan`]: a topological order split into
//! dependency levels, per-queue execution lists, and a minimal set of
//! cross-queue waits.
//!
//! # Lifecycle
//!
//! ```text
//! Empty --declare_pass--> Declaring --build--> Built --mark_executed--> Executed
//!   ^                                                                      |
//!   +------------------------------- reset --------------------------------+
//! ```
//!
//! [`PassHandle`]s carry the graph's frame tag as their generation, so a
//! handle from an earlier frame is rejected after `reset`.
//!
//! # Example
//!
//! ```
//! use lattice_graphics::graph::{FrameGraph, PassRecord};
//!
//! let mut graph = FrameGraph::new(16, 2);
//! let shadow = graph.declare_pass(PassRecord::render("shadow"));
//! let main = graph.declare_pass(PassRecord::render("main").reads(shadow));
//! let cull = graph.declare_pass(PassRecord::compute("cull").with_queue(1));
//! graph.add_dependency(main, cull);
//!
//! let plan = graph.build().unwrap();
//! assert_eq!(plan.levels().len(), 2);
//! assert_eq!(plan.sync_with(main.index()).iter().collect::<Vec<_>>(), vec![cull.index()]);
//! ```

mod build;
mod pass;
mod sync;

pub use build::{DependencyLevel, ExecutionPlan, GraphNode};
pub use pass::{ASYNC_COMPUTE_QUEUE, GRAPHICS_QUEUE, PassAttachments, PassKind, PassRecord};

use lattice_core::handle::next_generation;
use lattice_core::{Handle, SlotId};

use crate::handles::PassHandle;

/// Errors that can occur during graph compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The graph contains a cyclic dependency.
    ///
    /// Frame graphs must be directed acyclic graphs; a cycle means passes
    /// depend on each other in a way that makes execution impossible.
    #[error("frame graph contains a cyclic dependency through pass {pass}")]
    CyclicDependency {
        /// A pass on the cycle.
        pass: usize,
    },

    /// A pass depends on a pass index that was never declared.
    #[error("pass {pass} depends on undeclared pass {dependency}")]
    UnknownDependency {
        /// Dependent pass.
        pass: usize,
        /// Missing pass index.
        dependency: usize,
    },
}

/// Where the graph is in its per-frame lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameGraphState {
    /// No pass declared yet.
    Empty,
    /// Passes are being declared.
    Declaring,
    /// The plan has been built.
    Built,
    /// The plan has been submitted.
    Executed,
}

/// Per-frame pass graph.
#[derive(Debug)]
pub struct FrameGraph {
    max_passes: usize,
    queue_count: usize,
    frame_tag: u16,
    state: FrameGraphState,
    passes: Vec<PassRecord>,
    plan: ExecutionPlan,
    /// Build target, swapped into `plan` when compilation succeeds.
    scratch: ExecutionPlan,
}

impl FrameGraph {
    /// Create a graph accepting up to `max_passes` passes per frame spread
    /// over `queue_count` queues.
    pub fn new(max_passes: usize, queue_count: usize) -> Self {
        assert!(
            max_passes <= SlotId::MAX_SLOTS,
            "pass budget {max_passes} exceeds the 16-bit index range"
        );
        assert!(queue_count > 0, "a frame graph needs at least one queue");
        Self {
            max_passes,
            queue_count,
            frame_tag: 1,
            state: FrameGraphState::Empty,
            passes: Vec::with_capacity(max_passes),
            plan: ExecutionPlan::default(),
            scratch: ExecutionPlan::default(),
        }
    }

    /// Add a pass and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if the graph was already built, the pass budget is exhausted
    /// or the record names a queue the graph does not have.
    pub fn declare_pass(&mut self, record: PassRecord) -> PassHandle {
        assert!(
            matches!(
                self.state,
                FrameGraphState::Empty | FrameGraphState::Declaring
            ),
            "cannot declare a pass while the frame graph is {:?}",
            self.state
        );
        assert!(
            self.passes.len() < self.max_passes,
            "frame graph pass budget of {} exceeded",
            self.max_passes
        );
        assert!(
            record.queue() < self.queue_count,
            "pass {:?} targets queue {} but only {} queues exist",
            record.label(),
            record.queue(),
            self.queue_count
        );

        let handle = self.handle_of(self.passes.len());
        self.passes.push(record);
        self.state = FrameGraphState::Declaring;
        handle
    }

    /// Make `dependent` run after `dependency`.
    pub fn add_dependency(&mut self, dependent: PassHandle, dependency: PassHandle) {
        let dependency = self.resolve(dependency);
        self.pass_mut(dependent).read_deps_mut().insert(dependency);
    }

    /// Compile the declared passes.
    ///
    /// On error the graph stays in the declaring state and the frame cannot
    /// be executed. The previously built plan is left untouched.
    pub fn build(&mut self) -> Result<&ExecutionPlan, GraphError> {
        assert!(
            matches!(
                self.state,
                FrameGraphState::Empty | FrameGraphState::Declaring
            ),
            "frame graph already built this frame"
        );
        build::build_into(&self.passes, self.queue_count, &mut self.scratch)?;
        std::mem::swap(&mut self.plan, &mut self.scratch);
        self.state = FrameGraphState::Built;
        log::debug!(
            "frame graph built: {} passes, {} levels, {} cross-queue waits",
            self.plan.pass_count(),
            self.plan.levels().len(),
            self.plan.sync_count()
        );
        Ok(&self.plan)
    }

    /// Record that the built plan was submitted.
    pub fn mark_executed(&mut self) {
        assert_eq!(
            self.state,
            FrameGraphState::Built,
            "only a built frame graph can be executed"
        );
        self.state = FrameGraphState::Executed;
    }

    /// Drop every pass and advance the frame tag.
    ///
    /// The last plan stays readable through [`plan`](Self::plan) until the
    /// next build.
    pub fn reset(&mut self) {
        self.passes.clear();
        self.state = FrameGraphState::Empty;
        self.frame_tag = next_generation(self.frame_tag);
    }

    /// Borrow a pass of the current frame.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or null.
    pub fn pass(&self, handle: PassHandle) -> &PassRecord {
        &self.passes[self.resolve(handle)]
    }

    pub(crate) fn pass_mut(&mut self, handle: PassHandle) -> &mut PassRecord {
        assert_eq!(
            self.state,
            FrameGraphState::Declaring,
            "passes can only be modified while declaring"
        );
        let index = self.resolve(handle);
        &mut self.passes[index]
    }

    /// Handle of the pass at `index` in the current frame.
    pub fn handle_of(&self, index: usize) -> PassHandle {
        PassHandle::from_slot(SlotId::new(index as u16, self.frame_tag))
    }

    /// Returns true if `handle` addresses a pass of the current frame.
    pub fn contains(&self, handle: PassHandle) -> bool {
        handle.is_valid()
            && handle.generation() == self.frame_tag
            && handle.index() < self.passes.len()
    }

    /// Passes of the current frame, by pass index.
    pub fn passes(&self) -> &[PassRecord] {
        &self.passes
    }

    /// Number of passes declared this frame.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Plan of the most recent successful build.
    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    /// Lifecycle state.
    pub fn state(&self) -> FrameGraphState {
        self.state
    }

    /// Per-frame pass budget.
    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Number of queues.
    pub fn queue_count(&self) -> usize {
        self.queue_count
    }

    fn resolve(&self, handle: PassHandle) -> usize {
        assert!(self.contains(handle), "stale pass handle {handle:?}");
        handle.index()
    }
}
