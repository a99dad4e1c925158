//! Drivers used as replay targets in benchmarks.

use ember_backend::{
    BufferDescriptor, BufferHandle, BufferUsage, ClearFlags, Color, Dispatcher, Driver,
    PipelineHandle, RenderPassParams, RenderTargetHandle, TextureFormat, TextureHandle, Viewport,
};

/// Counts every call it receives so replay work cannot be optimized away.
///
/// The per-operation cost is a single increment, keeping measurements
/// focused on the stream machinery rather than driver work.
#[derive(Debug, Default)]
pub struct CountingDriver {
    /// Deferred operations replayed.
    pub calls: u64,
    /// Payload bytes received through buffer and texture uploads.
    pub upload_bytes: u64,
    next_id: u32,
    dispatcher: Dispatcher,
}

impl CountingDriver {
    /// A counting driver whose dispatcher flags every operation synchronous,
    /// for measuring direct dispatch against recording.
    pub fn fully_synchronous() -> Self {
        Self {
            dispatcher: Dispatcher::synchronous(),
            ..Default::default()
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Driver for CountingDriver {
    fn begin_frame(&mut self, _frame_id: u64, _timestamp_nanos: u64) {
        self.calls += 1;
    }

    fn end_frame(&mut self, _frame_id: u64) {
        self.calls += 1;
    }

    fn begin_render_pass(&mut self, _target: RenderTargetHandle, _params: RenderPassParams) {
        self.calls += 1;
    }

    fn end_render_pass(&mut self) {
        self.calls += 1;
    }

    fn set_viewport(&mut self, _viewport: Viewport) {
        self.calls += 1;
    }

    fn set_scissor(&mut self, _scissor: Viewport) {
        self.calls += 1;
    }

    fn bind_pipeline(&mut self, _pipeline: PipelineHandle) {
        self.calls += 1;
    }

    fn clear(&mut self, _flags: ClearFlags, _color: Color, _depth: f32, _stencil: u8) {
        self.calls += 1;
    }

    fn draw(&mut self, _vertices: BufferHandle, _indices: BufferHandle, _index_count: u32) {
        self.calls += 1;
    }

    fn update_buffer(&mut self, _handle: BufferHandle, data: BufferDescriptor, _byte_offset: u32) {
        self.calls += 1;
        self.upload_bytes += data.len() as u64;
    }

    fn update_texture(&mut self, _handle: TextureHandle, _mip_level: u32, data: BufferDescriptor) {
        self.calls += 1;
        self.upload_bytes += data.len() as u64;
    }

    fn destroy_buffer(&mut self, _handle: BufferHandle) {
        self.calls += 1;
    }

    fn destroy_texture(&mut self, _handle: TextureHandle) {
        self.calls += 1;
    }

    fn present(&mut self, _target: RenderTargetHandle) {
        self.calls += 1;
    }

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

    fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_backend::{CommandArena, CommandStream};

    #[test]
    fn counts_replayed_calls() {
        let mut driver = CountingDriver::default();
        let mut arena = CommandArena::with_capacity(4096);
        let mut stream = CommandStream::new(&mut driver, &mut arena);

        let start = stream.begin();
        stream.set_viewport(Viewport::new(0, 0, 64, 64));
        stream.update_buffer(BufferHandle::new(0), BufferDescriptor::new(vec![0u8; 128]), 0);
        stream.finish();
        stream.execute(start);

        assert_eq!(driver.calls, 2);
        assert_eq!(driver.upload_bytes, 128);
    }
}
