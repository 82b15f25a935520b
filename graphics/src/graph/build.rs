//! Frame graph compilation.
//!
//! Turns the passes declared for a frame into an [`ExecutionPlan`] in five
//! stages:
//!
//! 1. **Adjacency** - invert each pass's dependency sets into dependant sets
//!    and note which edges cross queues
//! 2. **Topological sort** - depth-first search with an explicit stack,
//!    failing on a back edge
//! 3. **Longest distances** - each pass's dependency level is the length of
//!    the longest dependency chain leading to it
//! 4. **Levels and queues** - bucket passes by level, then by queue, and hand
//!    out global, level-local and queue-local execution indices
//! 5. **Sync culling** - see [`sync`](super::sync)
//!
//! Passes inside one level never depend on each other, so a backend may run
//! the per-queue lists of a level concurrently.

use lattice_core::PassSet;

use super::GraphError;
use super::pass::PassRecord;
use super::sync;

/// Scheduling information of a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GraphNode {
    /// Pass index.
    pub pass: usize,
    /// Queue the pass runs on.
    pub queue: usize,
    /// Length of the longest dependency chain ending at this pass.
    pub dependency_level: usize,
    /// Position in the frame's global execution order.
    pub global_execution_index: usize,
    /// Position inside the pass's dependency level.
    pub level_execution_index: usize,
    /// Position in its queue's execution order.
    pub queue_execution_index: usize,
}

/// Passes sharing a dependency level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyLevel {
    nodes: Vec<usize>,
    nodes_per_queue: Vec<Vec<usize>>,
}

impl DependencyLevel {
    fn new(queue_count: usize) -> Self {
        Self {
            nodes: Vec::new(),
            nodes_per_queue: vec![Vec::new(); queue_count],
        }
    }

    /// Passes of the level, by ascending pass index.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Passes of the level running on `queue`.
    pub fn queue_nodes(&self, queue: usize) -> &[usize] {
        &self.nodes_per_queue[queue]
    }

    /// Per-queue pass lists, indexed by queue.
    pub fn nodes_per_queue(&self) -> &[Vec<usize>] {
        &self.nodes_per_queue
    }
}

/// A compiled frame graph.
///
/// All per-pass tables are indexed by pass index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub(super) queue_count: usize,
    pub(super) dependencies: Vec<PassSet>,
    pub(super) dependants: Vec<PassSet>,
    pub(super) nodes_to_sync_with: Vec<PassSet>,
    pub(super) sync_with: Vec<PassSet>,
    pub(super) signal_required: Vec<bool>,
    pub(super) sorted: Vec<usize>,
    pub(super) levels: Vec<DependencyLevel>,
    pub(super) nodes: Vec<GraphNode>,
    pub(super) execution_order: Vec<usize>,
    pub(super) queues: Vec<Vec<usize>>,
    pub(super) queue_predecessor: Vec<Option<usize>>,
    pub(super) ssis: Vec<Vec<Option<usize>>>,
}

impl ExecutionPlan {
    /// Number of passes in the plan.
    pub fn pass_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the plan holds no pass.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of queues passes were spread over.
    pub fn queue_count(&self) -> usize {
        self.queue_count
    }

    /// Topological order produced by the depth-first search.
    pub fn sorted(&self) -> &[usize] {
        &self.sorted
    }

    /// Dependency levels, level 0 first.
    pub fn levels(&self) -> &[DependencyLevel] {
        &self.levels
    }

    /// Scheduling information of `pass`.
    pub fn node(&self, pass: usize) -> &GraphNode {
        &self.nodes[pass]
    }

    /// Scheduling information of every pass.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Passes in global execution order.
    pub fn execution_order(&self) -> &[usize] {
        &self.execution_order
    }

    /// Passes of `queue` in execution order.
    pub fn queue_order(&self, queue: usize) -> &[usize] {
        &self.queues[queue]
    }

    /// Direct dependencies of `pass`.
    pub fn dependencies(&self, pass: usize) -> &PassSet {
        &self.dependencies[pass]
    }

    /// Passes that directly depend on `pass`.
    pub fn dependants(&self, pass: usize) -> &PassSet {
        &self.dependants[pass]
    }

    /// Direct dependencies of `pass` on other queues, before culling.
    pub fn cross_queue_dependencies(&self, pass: usize) -> &PassSet {
        &self.nodes_to_sync_with[pass]
    }

    /// Passes `pass` must wait on before it starts, after culling.
    pub fn sync_with(&self, pass: usize) -> &PassSet {
        &self.sync_with[pass]
    }

    /// Returns true if some pass waits on `pass`.
    pub fn signal_required(&self, pass: usize) -> bool {
        self.signal_required[pass]
    }

    /// Previous pass on the same queue.
    pub fn same_queue_predecessor(&self, pass: usize) -> Option<usize> {
        self.queue_predecessor[pass]
    }

    /// Sufficient synchronization index set of `pass`: for every queue, the
    /// highest queue-local execution index known to have completed once
    /// `pass` starts, or `None` if nothing on that queue is guaranteed.
    pub fn ssis(&self, pass: usize) -> &[Option<usize>] {
        &self.ssis[pass]
    }

    /// Total number of cross-queue waits after culling.
    pub fn sync_count(&self) -> usize {
        self.sync_with.iter().map(PassSet::count).sum()
    }

    fn reset(&mut self, pass_count: usize, queue_count: usize) {
        self.queue_count = queue_count;
        reset_sets(&mut self.dependencies, pass_count);
        reset_sets(&mut self.dependants, pass_count);
        reset_sets(&mut self.nodes_to_sync_with, pass_count);
        reset_sets(&mut self.sync_with, pass_count);
        self.signal_required.clear();
        self.signal_required.resize(pass_count, false);
        self.sorted.clear();
        self.levels.clear();
        self.nodes.clear();
        self.nodes.resize(pass_count, GraphNode::default());
        self.execution_order.clear();
        self.queues.clear();
        self.queues.resize(queue_count, Vec::new());
        self.queue_predecessor.clear();
        self.queue_predecessor.resize(pass_count, None);
        self.ssis.clear();
    }
}

fn reset_sets(sets: &mut Vec<PassSet>, len: usize) {
    sets.truncate(len);
    sets.iter_mut().for_each(PassSet::clear);
    sets.resize_with(len, PassSet::new);
}

/// Compile `passes` into `plan`, reusing its allocations.
pub(crate) fn build_into(
    passes: &[PassRecord],
    queue_count: usize,
    plan: &mut ExecutionPlan,
) -> Result<(), GraphError> {
    plan.reset(passes.len(), queue_count);
    if passes.is_empty() {
        return Ok(());
    }

    build_adjacency(passes, plan)?;
    topological_sort(plan)?;
    let longest = longest_distances(plan);
    assign_levels(passes, &longest, plan);
    sync::cull_synchronizations(plan);
    Ok(())
}

fn build_adjacency(passes: &[PassRecord], plan: &mut ExecutionPlan) -> Result<(), GraphError> {
    for (pass, record) in passes.iter().enumerate() {
        for dependency in record.read_deps().iter().chain(record.write_deps().iter()) {
            if dependency == pass {
                continue;
            }
            let Some(producer) = passes.get(dependency) else {
                return Err(GraphError::UnknownDependency { pass, dependency });
            };
            plan.dependencies[pass].insert(dependency);
            plan.dependants[dependency].insert(pass);
            if producer.queue() != record.queue() {
                plan.nodes_to_sync_with[pass].insert(dependency);
            }
        }
    }
    Ok(())
}

/// Depth-first search over dependant edges. Each stack frame holds a pass and
/// the next dependant index to look at; finished passes are written to the
/// output back to front, which yields a topological order.
fn topological_sort(plan: &mut ExecutionPlan) -> Result<(), GraphError> {
    let n = plan.dependants.len();
    let mut visited = vec![false; n];
    let mut on_stack = vec![false; n];
    let mut order = vec![0; n];
    let mut write = n;
    let mut stack: Vec<(usize, usize)> = Vec::with_capacity(n);

    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        on_stack[root] = true;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            match plan.dependants[node].first_from(cursor) {
                Some(next) => {
                    frame.1 = next + 1;
                    if on_stack[next] {
                        return Err(GraphError::CyclicDependency { pass: next });
                    }
                    if !visited[next] {
                        visited[next] = true;
                        on_stack[next] = true;
                        stack.push((next, 0));
                    }
                }
                None => {
                    stack.pop();
                    on_stack[node] = false;
                    write -= 1;
                    order[write] = node;
                }
            }
        }
    }

    debug_assert_eq!(write, 0);
    plan.sorted = order;
    Ok(())
}

fn longest_distances(plan: &ExecutionPlan) -> Vec<usize> {
    let mut longest = vec![0; plan.sorted.len()];
    for &pass in &plan.sorted {
        for dependant in plan.dependants[pass].iter() {
            longest[dependant] = longest[dependant].max(longest[pass] + 1);
        }
    }
    longest
}

fn assign_levels(passes: &[PassRecord], longest: &[usize], plan: &mut ExecutionPlan) {
    let queue_count = plan.queue_count;
    let level_count = longest.iter().max().map_or(0, |&deepest| deepest + 1);
    plan.levels
        .resize_with(level_count, || DependencyLevel::new(queue_count));

    // Iterating by pass index keeps every level sorted, which makes the plan
    // independent of the search order.
    for (pass, &level) in longest.iter().enumerate() {
        let level = &mut plan.levels[level];
        level.nodes.push(pass);
        level.nodes_per_queue[passes[pass].queue()].push(pass);
    }

    let mut global_index = 0;
    let mut queue_counters = vec![0; queue_count];
    let mut previous: Vec<Option<usize>> = vec![None; queue_count];

    for (level_index, level) in plan.levels.iter().enumerate() {
        let mut level_local = 0;
        for (queue, queue_nodes) in level.nodes_per_queue.iter().enumerate() {
            for &pass in queue_nodes {
                plan.nodes[pass] = GraphNode {
                    pass,
                    queue,
                    dependency_level: level_index,
                    global_execution_index: global_index,
                    level_execution_index: level_local,
                    queue_execution_index: queue_counters[queue],
                };
                global_index += 1;
                level_local += 1;
                queue_counters[queue] += 1;

                plan.queue_predecessor[pass] = previous[queue];
                previous[queue] = Some(pass);

                plan.execution_order.push(pass);
                plan.queues[queue].push(pass);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::pass::{ASYNC_COMPUTE_QUEUE, GRAPHICS_QUEUE};

    /// Build a pass list from `(queue, dependencies)` pairs.
    fn passes(shape: &[(usize, &[usize])]) -> Vec<PassRecord> {
        shape.iter()
            .enumerate()
            .map(|(index, &(queue, deps))| {
                let mut record = PassRecord::render(format!("pass{index}")).with_queue(queue);
                record.read_deps_mut().extend(deps.iter().copied());
                record
            })
            .collect()
    }

    fn build(shape: &[(usize, &[usize])], queue_count: usize) -> Result<ExecutionPlan, GraphError> {
        let mut plan = ExecutionPlan::default();
        build_into(&passes(shape), queue_count, &mut plan)?;
        Ok(plan)
    }

    #[test]
    fn test_empty_graph() {
        let plan = build(&[], 2).unwrap();
        assert!(plan.is_empty());
        assert!(plan.levels().is_empty());
        assert_eq!(plan.queue_count(), 2);
    }

    #[test]
    fn test_linear_chain() {
        let plan = build(&[(0, &[]), (0, &[0]), (0, &[1])], 1).unwrap();
        assert_eq!(plan.sorted(), &[0, 1, 2]);
        assert_eq!(plan.execution_order(), &[0, 1, 2]);
        assert_eq!(plan.levels().len(), 3);
        for pass in 0..3 {
            assert_eq!(plan.node(pass).dependency_level, pass);
            assert_eq!(plan.node(pass).global_execution_index, pass);
        }
        assert_eq!(plan.same_queue_predecessor(2), Some(1));
        assert_eq!(plan.same_queue_predecessor(0), None);
    }

    #[test]
    fn test_diamond_levels() {
        // 0 -> {1, 2} -> 3
        let plan = build(&[(0, &[]), (0, &[0]), (0, &[0]), (0, &[1, 2])], 1).unwrap();
        assert_eq!(plan.levels().len(), 3);
        assert_eq!(plan.levels()[1].nodes(), &[1, 2]);
        assert_eq!(plan.node(3).dependency_level, 2);
        assert_eq!(plan.node(2).level_execution_index, 1);
    }

    #[test]
    fn test_longest_path_wins() {
        // 3 depends on 0 directly and on 2 through 1
        let plan = build(&[(0, &[]), (0, &[0]), (0, &[1]), (0, &[0, 2])], 1).unwrap();
        assert_eq!(plan.node(3).dependency_level, 3);
    }

    #[test]
    fn test_sorted_is_topological() {
        let plan = build(&[(0, &[3]), (0, &[]), (0, &[0, 1]), (0, &[1])], 1).unwrap();
        let position = |pass: usize| plan.sorted().iter().position(|&p| p == pass).unwrap();
        for pass in 0..4 {
            for dep in plan.dependencies(pass).iter() {
                assert!(position(dep) < position(pass));
            }
        }
    }

    #[test]
    fn test_queue_grouping_within_level() {
        let plan = build(
            &[
                (ASYNC_COMPUTE_QUEUE, &[]),
                (GRAPHICS_QUEUE, &[]),
                (ASYNC_COMPUTE_QUEUE, &[]),
            ],
            2,
        )
        .unwrap();
        let level = &plan.levels()[0];
        assert_eq!(level.queue_nodes(GRAPHICS_QUEUE), &[1]);
        assert_eq!(level.queue_nodes(ASYNC_COMPUTE_QUEUE), &[0, 2]);
        assert_eq!(plan.execution_order(), &[1, 0, 2]);
        assert_eq!(plan.node(2).queue_execution_index, 1);
        assert_eq!(plan.queue_order(ASYNC_COMPUTE_QUEUE), &[0, 2]);
    }

    #[test]
    fn test_cross_queue_edges_recorded() {
        let plan = build(&[(0, &[]), (1, &[0]), (0, &[0, 1])], 2).unwrap();
        assert!(plan.cross_queue_dependencies(1).contains(0));
        assert!(!plan.cross_queue_dependencies(2).contains(0));
        assert!(plan.cross_queue_dependencies(2).contains(1));
        assert_eq!(plan.dependants(0).iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_self_dependency_is_ignored() {
        let plan = build(&[(0, &[0])], 1).unwrap();
        assert!(plan.dependencies(0).is_empty());
    }

    #[test]
    fn test_cycle_detected() {
        let err = build(&[(0, &[1]), (0, &[0])], 1).unwrap_err();
        assert!(matches!(err, GraphError::CyclicDependency { .. }));
    }

    #[test]
    fn test_long_cycle_detected() {
        let err = build(&[(0, &[]), (0, &[0, 3]), (0, &[1]), (0, &[2])], 1).unwrap_err();
        assert!(matches!(err, GraphError::CyclicDependency { .. }));
    }

    #[test]
    fn test_unknown_dependency() {
        let err = build(&[(0, &[]), (0, &[7])], 1).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownDependency {
                pass: 1,
                dependency: 7
            }
        );
    }

    #[test]
    fn test_plan_reuse_clears_previous_frame() {
        let mut plan = ExecutionPlan::default();
        build_into(&passes(&[(0, &[]), (1, &[0]), (0, &[1])]), 2, &mut plan).unwrap();
        build_into(&passes(&[(0, &[])]), 2, &mut plan).unwrap();
        assert_eq!(plan.pass_count(), 1);
        assert_eq!(plan.levels().len(), 1);
        assert!(plan.sync_with(0).is_empty());
        assert_eq!(plan.queue_order(1), &[] as &[usize]);
    }
}
