//! Cross-queue synchronization culling.
//!
//! Every edge between passes on different queues needs a wait, but most of
//! them are implied by others. For each pass the plan keeps a *sufficient
//! synchronization index set* (SSIS): per queue, the highest queue-local
//! execution index guaranteed to have finished when the pass starts.
//!
//! A pass's SSIS starts from its same-queue predecessor (work on a queue
//! completes in order), then absorbs the SSIS of every pass it waits on. A
//! cross-queue dependency whose queue-local index is already covered needs no
//! wait of its own. Among the remaining ones, the dependency whose SSIS covers
//! the most outstanding queues is picked first, until nothing is left.

use std::cmp::Reverse;

use super::build::{ExecutionPlan, GraphNode};

pub(crate) fn cull_synchronizations(plan: &mut ExecutionPlan) {
    let queue_count = plan.queue_count;
    let pass_count = plan.nodes.len();
    plan.ssis.resize(pass_count, Vec::new());

    for order_index in 0..plan.execution_order.len() {
        let pass = plan.execution_order[order_index];
        let node = plan.nodes[pass];

        let mut covered = match plan.queue_predecessor[pass] {
            Some(previous) => plan.ssis[previous].clone(),
            None => vec![None; queue_count],
        };
        covered[node.queue] = Some(node.queue_execution_index);

        // latest dependency per queue
        let mut required: Vec<Option<usize>> = vec![None; queue_count];
        for dependency in plan.nodes_to_sync_with[pass].iter() {
            let candidate = &plan.nodes[dependency];
            let slot = &mut required[candidate.queue];
            let is_later = slot.is_none_or(|current| {
                plan.nodes[current].queue_execution_index < candidate.queue_execution_index
            });
            if is_later {
                *slot = Some(dependency);
            }
        }
        drop_covered(&mut required, &covered, &plan.nodes);

        while required.iter().any(Option::is_some) {
            let best = required
                .iter()
                .flatten()
                .copied()
                .max_by_key(|&candidate| {
                    let coverage = required
                        .iter()
                        .flatten()
                        .filter(|&&target| covers(&plan.ssis[candidate], &plan.nodes[target]))
                        .count();
                    (coverage, Reverse(plan.nodes[candidate].global_execution_index))
                })
                .unwrap_or_else(|| unreachable!("loop runs while a requirement remains"));

            plan.sync_with[pass].insert(best);
            merge(&mut covered, &plan.ssis[best]);
            drop_covered(&mut required, &covered, &plan.nodes);
        }

        for dependency in plan.dependencies[pass].iter() {
            merge(&mut covered, &plan.ssis[dependency]);
        }
        plan.ssis[pass] = covered;
    }

    for pass in 0..pass_count {
        for dependency in plan.sync_with[pass].iter() {
            plan.signal_required[dependency] = true;
        }
    }
}

/// Returns true if `ssis` proves `target` finished.
fn covers(ssis: &[Option<usize>], target: &GraphNode) -> bool {
    ssis[target.queue].is_some_and(|index| index >= target.queue_execution_index)
}

fn drop_covered(required: &mut [Option<usize>], covered: &[Option<usize>], nodes: &[GraphNode]) {
    for slot in required.iter_mut() {
        if slot.is_some_and(|pass| covers(covered, &nodes[pass])) {
            *slot = None;
        }
    }
}

fn merge(into: &mut [Option<usize>], other: &[Option<usize>]) {
    for (target, &source) in into.iter_mut().zip(other) {
        *target = (*target).max(source);
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::GraphError;
    use crate::graph::build::{ExecutionPlan, build_into};
    use crate::graph::pass::PassRecord;

    fn build(shape: &[(usize, &[usize])], queue_count: usize) -> Result<ExecutionPlan, GraphError> {
        let passes: Vec<_> = shape
            .iter()
            .map(|&(queue, deps)| {
                let mut record = PassRecord::compute("").with_queue(queue);
                record.read_deps_mut().extend(deps.iter().copied());
                record
            })
            .collect();
        let mut plan = ExecutionPlan::default();
        build_into(&passes, queue_count, &mut plan)?;
        Ok(plan)
    }

    fn waits(plan: &ExecutionPlan, pass: usize) -> Vec<usize> {
        plan.sync_with(pass).iter().collect()
    }

    #[test]
    fn test_same_queue_needs_no_wait() {
        let plan = build(&[(0, &[]), (0, &[0])], 1).unwrap();
        assert!(waits(&plan, 1).is_empty());
        assert!(!plan.signal_required(0));
        assert_eq!(plan.ssis(1), &[Some(1)]);
    }

    #[test]
    fn test_single_cross_queue_edge() {
        let plan = build(&[(0, &[]), (1, &[0])], 2).unwrap();
        assert_eq!(waits(&plan, 1), vec![0]);
        assert!(plan.signal_required(0));
        assert!(!plan.signal_required(1));
        assert_eq!(plan.ssis(1), &[Some(0), Some(0)]);
    }

    #[test]
    fn test_independent_producers_both_waited_on() {
        // A on queue 0, B on queue 1, C on queue 2 reads both
        let plan = build(&[(0, &[]), (1, &[]), (2, &[0, 1])], 3).unwrap();
        assert_eq!(waits(&plan, 2), vec![0, 1]);
        assert!(plan.signal_required(0));
        assert!(plan.signal_required(1));
        assert_eq!(plan.ssis(2), &[Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn test_transitive_wait_is_culled() {
        // 1 waits on 0; 2 reads 0 and 1, waiting on 1 alone already proves 0
        let plan = build(&[(0, &[]), (1, &[0]), (2, &[0, 1])], 3).unwrap();
        assert_eq!(plan.cross_queue_dependencies(2).count(), 2);
        assert_eq!(waits(&plan, 2), vec![1]);
        assert_eq!(plan.sync_count(), 2);
    }

    #[test]
    fn test_predecessor_wait_is_inherited() {
        // 2 follows 1 on queue 1 and 1 already waited on 0
        let plan = build(&[(0, &[]), (1, &[0]), (1, &[0, 1])], 2).unwrap();
        assert_eq!(waits(&plan, 1), vec![0]);
        assert!(waits(&plan, 2).is_empty());
    }

    #[test]
    fn test_only_latest_pass_per_queue_is_waited_on() {
        // 0 and 1 run in order on queue 0; 2 on queue 1 reads both
        let plan = build(&[(0, &[]), (0, &[0]), (1, &[0, 1])], 2).unwrap();
        assert_eq!(waits(&plan, 2), vec![1]);
        assert!(!plan.signal_required(0));
        assert!(plan.signal_required(1));
    }

    #[test]
    fn test_culled_waits_stay_sufficient() {
        let plan = build(
            &[
                (0, &[]),
                (1, &[]),
                (2, &[0]),
                (0, &[1, 2]),
                (1, &[2, 3]),
                (2, &[3, 4]),
            ],
            3,
        )
        .unwrap();

        // Every cross-queue dependency must be proven finished by the
        // same-queue predecessor or by a pass that is waited on.
        for pass in 0..plan.pass_count() {
            let mut proven = plan
                .same_queue_predecessor(pass)
                .map(|previous| plan.ssis(previous).to_vec())
                .unwrap_or_else(|| vec![None; plan.queue_count()]);
            for wait in plan.sync_with(pass).iter() {
                for (slot, &index) in proven.iter_mut().zip(plan.ssis(wait)) {
                    *slot = (*slot).max(index);
                }
            }
            for dependency in plan.cross_queue_dependencies(pass).iter() {
                let node = plan.node(dependency);
                assert!(
                    proven[node.queue].is_some_and(|index| index >= node.queue_execution_index),
                    "pass {pass} is not synchronized with {dependency}"
                );
            }
            assert!(plan.sync_with(pass).is_subset(plan.cross_queue_dependencies(pass)));
        }
    }
}
