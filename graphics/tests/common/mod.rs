//! Shared setup for the frame graph integration tests.

use lattice_graphics::types::{
    ResGroupDescriptor, ResGroupLayoutDescriptor, ResGroupUsage, TextureDescriptor,
    TextureFormat, TextureUsage,
};
use lattice_graphics::{
    DummyBackend, GraphicsContext, ResGroupHandle, SetupDescriptor, TextureHandle,
};

/// Side length of every test target.
pub const TARGET_SIZE: u32 = 64;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Context over a dummy backend with `queues` queues.
pub fn context(queues: usize) -> GraphicsContext {
    init_logging();
    let desc = SetupDescriptor::default()
        .with_max_queues(queues)
        .with_uniform_sizes(16 << 10, 16 << 10);
    GraphicsContext::with_backend(desc, Box::new(DummyBackend::new()))
        .expect("dummy backend setup cannot fail")
}

/// The dummy backend behind `ctx`.
pub fn dummy(ctx: &GraphicsContext) -> &DummyBackend {
    ctx.backend()
        .as_any()
        .downcast_ref::<DummyBackend>()
        .expect("test contexts use the dummy backend")
}

/// A sampleable color target.
pub fn color_target(ctx: &mut GraphicsContext) -> TextureHandle {
    ctx.make_texture(&TextureDescriptor::render_target(
        TARGET_SIZE,
        TARGET_SIZE,
        TextureFormat::Rgba8Unorm,
    ))
}

/// A sampleable storage texture.
pub fn storage_texture(ctx: &mut GraphicsContext) -> TextureHandle {
    ctx.make_texture(&TextureDescriptor::new_2d(
        TARGET_SIZE,
        TARGET_SIZE,
        TextureFormat::Rgba16Float,
        TextureUsage::STORAGE_BINDING | TextureUsage::TEXTURE_BINDING,
    ))
}

/// A uniform-less resource group sampling `textures`.
pub fn sampling_group(ctx: &mut GraphicsContext, textures: &[TextureHandle]) -> ResGroupHandle {
    let layout = ctx.make_res_group_layout(&ResGroupLayoutDescriptor::new(
        0,
        textures.len() as u8,
        0,
    ));
    let desc = textures.iter().fold(
        ResGroupDescriptor::new(layout, ResGroupUsage::Dynamic),
        |desc, &texture| desc.with_texture(texture),
    );
    ctx.make_res_group(&desc)
}
