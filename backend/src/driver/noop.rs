//! A driver that does nothing, for tests, benches and headless runs.

use super::api::Driver;
use super::types::{
    BufferDescriptor, BufferHandle, BufferUsage, ClearFlags, Color, PipelineHandle,
    RenderPassParams, RenderTargetHandle, TextureFormat, TextureHandle, Viewport,
};

/// Accepts every operation, hands out sequential object ids, renders
/// nothing.
#[derive(Debug, Default)]
pub struct NoopDriver {
    next_id: u32,
}

impl NoopDriver {
    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Driver for NoopDriver {
    fn begin_frame(&mut self, _frame_id: u64, _timestamp_nanos: u64) {}

    fn end_frame(&mut self, _frame_id: u64) {}

    fn begin_render_pass(&mut self, _target: RenderTargetHandle, _params: RenderPassParams) {}

    fn end_render_pass(&mut self) {}

    fn set_viewport(&mut self, _viewport: Viewport) {}

    fn set_scissor(&mut self, _scissor: Viewport) {}

    fn bind_pipeline(&mut self, _pipeline: PipelineHandle) {}

    fn clear(&mut self, _flags: ClearFlags, _color: Color, _depth: f32, _stencil: u8) {}

    fn draw(&mut self, _vertices: BufferHandle, _indices: BufferHandle, _index_count: u32) {}

    fn update_buffer(&mut self, _handle: BufferHandle, _data: BufferDescriptor, _byte_offset: u32) {}

    fn update_texture(&mut self, _handle: TextureHandle, _mip_level: u32, _data: BufferDescriptor) {}

    fn destroy_buffer(&mut self, _handle: BufferHandle) {}

    fn destroy_texture(&mut self, _handle: TextureHandle) {}

    fn present(&mut self, _target: RenderTargetHandle) {}

    fn create_buffer(&mut self, _size_bytes: u32, _usage: BufferUsage) -> BufferHandle {
        BufferHandle::new(self.next_id())
    }

    fn create_texture(&mut self, _width: u32, _height: u32, _format: TextureFormat) -> TextureHandle {
        TextureHandle::new(self.next_id())
    }

    fn create_render_target(
        &mut self,
        _color: TextureHandle,
        _depth: Option<TextureHandle>,
    ) -> RenderTargetHandle {
        RenderTargetHandle::new(self.next_id())
    }

    fn format_supported(&mut self, _format: TextureFormat) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_sequential() {
        let mut driver = NoopDriver::default();
        let first = driver.create_buffer(64, BufferUsage::Vertex);
        let second = driver.create_texture(4, 4, TextureFormat::Rgba8);
        assert_eq!(first.id(), 0);
        assert_eq!(second.id(), 1);
        assert!(driver.format_supported(TextureFormat::Depth32F));
    }
}
