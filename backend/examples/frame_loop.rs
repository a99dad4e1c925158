//! Record and drain a few frames against the no-op driver.
//!
//! Run with tracing to watch the stream work:
//!
//! ```bash
//! RUST_LOG=debug cargo run --example frame_loop
//! RUST_LOG=trace cargo run --example frame_loop --features command_trace
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use ember_backend::{
    BufferDescriptor, BufferUsage, ClearFlags, Color, CommandArena, CommandStream, NoopDriver,
    RenderPassParams, TextureFormat, Viewport,
};

fn main() {
    env_logger::init();

    let mut driver = NoopDriver::default();
    let mut arena = CommandArena::with_capacity(64 * 1024);
    let mut stream = CommandStream::new(&mut driver, &mut arena);

    // Object creation is synchronous: handles come back immediately.
    let vertices = stream.create_buffer(48 * 1024, BufferUsage::Vertex);
    let indices = stream.create_buffer(12 * 1024, BufferUsage::Index);
    let color = stream.create_texture(1920, 1080, TextureFormat::Rgba8);
    let target = stream.create_render_target(color, None);

    for frame in 0..3u64 {
        let start = stream.begin();

        stream.begin_frame(frame, now_nanos());
        stream.update_buffer(
            vertices,
            BufferDescriptor::with_callback(vec![0u8; 1024], move |bytes| {
                log::info!("frame {frame}: staging buffer of {} bytes released", bytes.len());
            }),
            0,
        );
        stream.begin_render_pass(
            target,
            RenderPassParams {
                viewport: Viewport::new(0, 0, 1920, 1080),
                clear: ClearFlags::COLOR | ClearFlags::DEPTH,
                clear_color: Color::rgba(0.05, 0.05, 0.08, 1.0),
                ..RenderPassParams::default()
            },
        );
        stream.draw(vertices, indices, 36);
        stream.end_render_pass();
        stream.present(target);
        stream.end_frame(frame);
        stream.queue_command(move || log::info!("frame {frame} retired"));

        // A real embedding hands the sealed arena to the driver thread here;
        // draining in place keeps the example single threaded.
        stream.finish();
        stream.execute(start);
    }

    // Teardown is recorded and drained like any other generation.
    let start = stream.begin();
    stream.destroy_buffer(vertices);
    stream.destroy_buffer(indices);
    stream.destroy_texture(color);
    stream.finish();
    stream.execute(start);
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
