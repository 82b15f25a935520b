//! End-to-end frame graph tests.
//!
//! Passes are declared through [`GraphicsContext`], committed against the
//! dummy backend, and the recorded submissions are checked for ordering,
//! dependency levels and cross-queue waits.
//!
//! ```bash
//! cargo test -p lattice-graphics --test frame_graph_tests
//! ```

mod common;

use rstest::rstest;

use common::{color_target, context, dummy, sampling_group, storage_texture};
use lattice_core::PassSet;
use lattice_graphics::backend::SubmittedPass;
use lattice_graphics::graph::{ASYNC_COMPUTE_QUEUE, GRAPHICS_QUEUE, PassRecord};
use lattice_graphics::types::{ComputePassDescriptor, Rect, RenderPassDescriptor};
use lattice_graphics::{DrawArea, DrawListBuilder, FrameGraph, GraphicsContext, PassKind};

// ============================================================================
// Dependency discovery
// ============================================================================

/// A pass sampling a texture runs after the pass that rendered it.
#[test]
fn test_sampled_texture_orders_passes() {
    let mut ctx = context(1);
    let shadow_map = color_target(&mut ctx);
    let color = color_target(&mut ctx);
    let group = sampling_group(&mut ctx, &[shadow_map]);

    let shadow =
        ctx.begin_render_pass(&RenderPassDescriptor::new("shadow").with_color_target(shadow_map));
    let main = ctx.begin_render_pass(&RenderPassDescriptor::new("main").with_color_target(color));
    let mut draws = DrawListBuilder::new();
    draws.set_res_group(1, group).draw_vertices(0, 3);
    ctx.set_draw_list(
        main,
        &[DrawArea::new(Rect::from_size(64, 64), 1)],
        draws.finish(),
    );

    let stats = ctx.commit();
    assert_eq!(stats.level_count, 2);
    assert_eq!(stats.draw_count, 1);
    assert_eq!(stats.sync_count, 0);

    let submitted = dummy(&ctx).submissions();
    assert_eq!(submitted[0].pass, shadow);
    assert_eq!(submitted[1].pass, main);
    assert!(submitted[0].dependency_level < submitted[1].dependency_level);
    assert!(submitted[1].waits.is_empty());
}

/// Independent producers on two queues feeding a pass on a third queue are
/// both waited on.
#[test]
fn test_consumer_waits_on_each_producer_queue() {
    let mut ctx = context(3);
    let albedo = color_target(&mut ctx);
    let noise = storage_texture(&mut ctx);
    let group = sampling_group(&mut ctx, &[albedo, noise]);

    let raster =
        ctx.begin_render_pass(&RenderPassDescriptor::new("raster").with_color_target(albedo));
    let generate = ctx.begin_compute_pass(
        &ComputePassDescriptor::new("noise", [8, 8, 1]).with_storage_texture(noise),
    );
    let combine = ctx.begin_compute_pass(
        &ComputePassDescriptor::new("combine", [8, 8, 1])
            .with_res_group(group)
            .on_queue(2),
    );

    ctx.commit();
    let plan = ctx.plan();
    assert_eq!(plan.node(raster.index()).queue, GRAPHICS_QUEUE);
    assert_eq!(plan.node(generate.index()).queue, ASYNC_COMPUTE_QUEUE);
    assert_eq!(
        plan.sync_with(combine.index()).iter().collect::<Vec<_>>(),
        vec![raster.index(), generate.index()]
    );

    let submitted = dummy(&ctx).submissions();
    let last = submitted.last().unwrap();
    assert_eq!(last.pass, combine);
    assert_eq!(last.queue, 2);
    assert_eq!(last.waits.len(), 2);
    assert!(submitted[..2].iter().all(|s| s.signal));
}

/// A wait already implied by another wait is culled.
#[test]
fn test_transitive_wait_is_culled() {
    let mut ctx = context(3);
    let base = color_target(&mut ctx);
    let blurred = storage_texture(&mut ctx);
    let base_group = sampling_group(&mut ctx, &[base]);
    let both_group = sampling_group(&mut ctx, &[base, blurred]);

    let raster =
        ctx.begin_render_pass(&RenderPassDescriptor::new("raster").with_color_target(base));
    let blur = ctx.begin_compute_pass(
        &ComputePassDescriptor::new("blur", [8, 8, 1])
            .with_storage_texture(blurred)
            .with_res_group(base_group),
    );
    let composite = ctx.begin_compute_pass(
        &ComputePassDescriptor::new("composite", [8, 8, 1])
            .with_res_group(both_group)
            .on_queue(2),
    );

    let stats = ctx.commit();
    let plan = ctx.plan();
    assert!(plan.dependencies(composite.index()).contains(raster.index()));
    assert_eq!(
        plan.sync_with(composite.index()).iter().collect::<Vec<_>>(),
        vec![blur.index()]
    );
    assert_eq!(
        plan.sync_with(blur.index()).iter().collect::<Vec<_>>(),
        vec![raster.index()]
    );
    assert_eq!(stats.sync_count, 2);
    assert_eq!(stats.level_count, 3);
}

// ============================================================================
// Frame lifecycle
// ============================================================================

fn declare_frame(ctx: &mut GraphicsContext) {
    let gbuffer = color_target(ctx);
    let ssao = storage_texture(ctx);
    let output = color_target(ctx);
    let lighting_inputs = sampling_group(ctx, &[gbuffer, ssao]);

    ctx.begin_render_pass(&RenderPassDescriptor::new("gbuffer").with_color_target(gbuffer));
    ctx.begin_compute_pass(
        &ComputePassDescriptor::new("ssao", [16, 16, 1]).with_storage_texture(ssao),
    );
    let lighting =
        ctx.begin_render_pass(&RenderPassDescriptor::new("lighting").with_color_target(output));
    let mut draws = DrawListBuilder::new();
    draws.set_res_group(1, lighting_inputs).draw_vertices(0, 3);
    ctx.set_draw_list(
        lighting,
        &[DrawArea::new(Rect::from_size(64, 64), 1)],
        draws.finish(),
    );
    ctx.begin_render_pass(&RenderPassDescriptor::new("overlay").with_color_target(output));
}

type Projection = (Option<String>, usize, usize, usize, Vec<usize>, bool);

fn project(submitted: &[SubmittedPass]) -> Vec<Projection> {
    submitted
        .iter()
        .map(|s| {
            (
                s.label.clone(),
                s.queue,
                s.global_execution_index,
                s.dependency_level,
                s.waits.iter().map(|w| w.pass.index()).collect(),
                s.signal,
            )
        })
        .collect()
}

/// The same declarations produce the same schedule every frame.
#[rstest]
#[case::single_queue(1)]
#[case::async_compute(2)]
#[case::three_queues(3)]
fn test_schedule_is_deterministic(#[case] queues: usize) {
    let mut ctx = context(queues);
    declare_frame(&mut ctx);
    ctx.commit();
    let first = project(dummy(&ctx).submissions());

    declare_frame(&mut ctx);
    ctx.commit();
    let submitted = dummy(&ctx).submissions();
    let second = project(submitted);

    assert_eq!(first, second);
    assert_eq!(dummy(&ctx).frames_completed(), 2);
    assert!(submitted.iter().all(|s| s.frame_index == 1));
}

/// Long-running contexts keep only the latest frame's submissions.
#[test]
fn test_submission_log_holds_one_frame() {
    let mut ctx = context(2);
    let color = color_target(&mut ctx);
    let scratch = storage_texture(&mut ctx);
    for _ in 0..500 {
        ctx.begin_compute_pass(
            &ComputePassDescriptor::new("scatter", [4, 4, 1]).with_storage_texture(scratch),
        );
        ctx.begin_render_pass(&RenderPassDescriptor::new("main").with_color_target(color));
        ctx.commit();
    }
    let submitted = dummy(&ctx).submissions();
    assert_eq!(submitted.len(), 2);
    assert!(submitted.iter().all(|s| s.frame_index == 499));
    assert_eq!(dummy(&ctx).frames_completed(), 500);
}

/// Overlay writes the lighting output again and must come after it.
#[test]
fn test_write_after_write_chain() {
    let mut ctx = context(2);
    declare_frame(&mut ctx);
    ctx.commit();

    let labels: Vec<_> = dummy(&ctx)
        .submissions()
        .iter()
        .map(|s| s.label.clone().unwrap_or_default())
        .collect();
    let position = |name: &str| labels.iter().position(|l| l == name).unwrap();
    assert!(position("gbuffer") < position("lighting"));
    assert!(position("ssao") < position("lighting"));
    assert!(position("lighting") < position("overlay"));

    let lighting = &dummy(&ctx).submissions()[position("lighting")];
    assert_eq!(lighting.kind, PassKind::Render);
    assert_eq!(lighting.waits.len(), 1);
    assert_eq!(lighting.waits[0].queue, ASYNC_COMPUTE_QUEUE);
}

#[test]
#[should_panic(expected = "cyclic dependency")]
fn test_cycle_panics_at_commit() {
    let mut ctx = context(1);
    let a = color_target(&mut ctx);
    let b = color_target(&mut ctx);
    let first = ctx.begin_render_pass(&RenderPassDescriptor::new("a").with_color_target(a));
    let second = ctx.begin_render_pass(&RenderPassDescriptor::new("b").with_color_target(b));
    ctx.add_pass_dependency(first, second);
    ctx.add_pass_dependency(second, first);
    ctx.commit();
}

#[test]
#[should_panic(expected = "stale pass handle")]
fn test_pass_handle_expires_with_its_frame() {
    let mut ctx = context(1);
    let target = color_target(&mut ctx);
    let old = ctx.begin_render_pass(&RenderPassDescriptor::new("a").with_color_target(target));
    ctx.commit();
    let new = ctx.begin_render_pass(&RenderPassDescriptor::new("a").with_color_target(target));
    assert_eq!(new.index(), old.index());
    ctx.add_pass_dependency(new, old);
}

// ============================================================================
// Generated graphs
// ============================================================================

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

fn generated_graph(seed: u64, passes: usize, queues: usize) -> FrameGraph {
    let mut rng = Lcg(seed);
    let mut graph = FrameGraph::new(passes, queues);
    let mut handles = Vec::with_capacity(passes);
    for index in 0..passes {
        let queue = rng.next(queues);
        let mut record = PassRecord::compute(format!("pass_{index}")).with_queue(queue);
        for _ in 0..rng.next(4) {
            if index > 0 {
                record = record.reads(handles[rng.next(index)]);
            }
        }
        handles.push(graph.declare_pass(record));
    }
    graph
}

/// Dependencies always sit on an earlier level and run earlier globally.
#[rstest]
#[case(1, 24, 1)]
#[case(7, 40, 2)]
#[case(42, 64, 3)]
#[case(1234, 64, 4)]
fn test_levels_respect_dependencies(
    #[case] seed: u64,
    #[case] passes: usize,
    #[case] queues: usize,
) {
    let mut graph = generated_graph(seed, passes, queues);
    let plan = graph.build().unwrap();

    assert_eq!(plan.execution_order().len(), passes);
    for pass in 0..passes {
        let node = plan.node(pass);
        for dependency in plan.dependencies(pass).iter() {
            let dep = plan.node(dependency);
            assert!(dep.dependency_level < node.dependency_level);
            assert!(dep.global_execution_index < node.global_execution_index);
        }
    }
}

/// Queue order plus the culled waits still guarantee every dependency has
/// finished before its dependant starts.
#[rstest]
#[case(3, 32, 2)]
#[case(99, 48, 3)]
#[case(2024, 64, 4)]
fn test_culled_waits_are_sufficient(
    #[case] seed: u64,
    #[case] passes: usize,
    #[case] queues: usize,
) {
    let mut graph = generated_graph(seed, passes, queues);
    let plan = graph.build().unwrap();

    let mut finished_before = vec![PassSet::new(); passes];
    for &pass in plan.execution_order() {
        let mut known = PassSet::new();
        let waited = plan
            .same_queue_predecessor(pass)
            .into_iter()
            .chain(plan.sync_with(pass).iter());
        for earlier in waited {
            known.union_with(&finished_before[earlier]);
            known.insert(earlier);
        }
        assert!(
            plan.dependencies(pass).is_subset(&known),
            "pass {pass} may start before one of {:?}",
            plan.dependencies(pass)
        );
        for signaller in plan.sync_with(pass).iter() {
            assert!(plan.signal_required(signaller));
            assert_ne!(plan.node(signaller).queue, plan.node(pass).queue);
        }
        finished_before[pass] = known;
    }
}
