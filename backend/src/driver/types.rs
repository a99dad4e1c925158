//! Argument and handle types of the driver API.
//!
//! Everything here is passed by value into command records, so the types are
//! small, `Send`, and `Debug` (the command trace feature prints them).

use std::fmt;

use bitflags::bitflags;

/// Define an opaque, copyable handle to a driver-owned object.
macro_rules! handle_types {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(u32);

            impl $name {
                /// Wrap a raw driver object id.
                #[inline]
                pub const fn new(id: u32) -> Self {
                    Self(id)
                }

                /// The raw driver object id.
                #[inline]
                pub const fn id(self) -> u32 {
                    self.0
                }
            }
        )*
    };
}

handle_types! {
    /// Handle to a driver-owned vertex/index/uniform buffer.
    BufferHandle;
    /// Handle to a driver-owned texture.
    TextureHandle;
    /// Handle to a driver-owned render target.
    RenderTargetHandle;
    /// Handle to a compiled pipeline state object.
    PipelineHandle;
}

/// A rectangle in framebuffer coordinates, origin at the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub left: i32,
    pub bottom: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(left: i32, bottom: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }
}

/// Linear-space RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

bitflags! {
    /// Which attachments a clear touches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u8 {
        const COLOR = 1;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Parameters of a render pass over one render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPassParams {
    pub viewport: Viewport,
    pub clear: ClearFlags,
    pub clear_color: Color,
    pub clear_depth: f32,
    pub clear_stencil: u8,
}

impl Default for RenderPassParams {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            clear: ClearFlags::empty(),
            clear_color: Color::BLACK,
            clear_depth: 1.0,
            clear_stencil: 0,
        }
    }
}

/// What a buffer will be bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
    Uniform,
    Staging,
}

/// Texel formats the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8,
    Bgra8,
    Rgba16F,
    Depth32F,
    Depth24Stencil8,
}

/// An owned blob of bytes handed to the driver, with an optional release
/// callback.
///
/// The descriptor is moved into the command record at enqueue time; the
/// caller must not touch the data afterward. When the executed driver call
/// is done with the descriptor and drops it, the release callback (if any)
/// receives the bytes back, exactly once. Engines use this to recycle
/// staging allocations or to signal an asset system that an upload landed.
pub struct BufferDescriptor {
    data: Option<Box<[u8]>>,
    callback: Option<Box<dyn FnOnce(Box<[u8]>) + Send>>,
}

impl BufferDescriptor {
    /// Wrap a byte payload with no release callback.
    pub fn new(data: impl Into<Box<[u8]>>) -> Self {
        Self {
            data: Some(data.into()),
            callback: None,
        }
    }

    /// Wrap a byte payload; `callback` receives the bytes back once the
    /// driver has consumed the descriptor.
    pub fn with_callback(
        data: impl Into<Box<[u8]>>,
        callback: impl FnOnce(Box<[u8]>) + Send + 'static,
    ) -> Self {
        Self {
            data: Some(data.into()),
            callback: Some(Box::new(callback)),
        }
    }

    /// The payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for BufferDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferDescriptor")
            .field("len", &self.len())
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

impl Drop for BufferDescriptor {
    fn drop(&mut self) {
        if let (Some(data), Some(callback)) = (self.data.take(), self.callback.take()) {
            callback(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn handles_expose_their_raw_id() {
        let handle = BufferHandle::new(7);
        assert_eq!(handle.id(), 7);
        assert_eq!(handle, BufferHandle::new(7));
        assert_ne!(handle, BufferHandle::new(8));
    }

    #[test]
    fn descriptor_without_callback_just_drops() {
        // Given
        let descriptor = BufferDescriptor::new(vec![1u8, 2, 3]);

        // Then
        assert_eq!(descriptor.as_bytes(), &[1, 2, 3]);
        assert_eq!(descriptor.len(), 3);
        drop(descriptor);
    }

    #[test]
    fn release_callback_fires_once_with_the_payload() {
        // Given
        let fired = Arc::new(AtomicUsize::new(0));
        let observer = fired.clone();
        let descriptor = BufferDescriptor::with_callback(vec![9u8; 16], move |bytes| {
            assert_eq!(&bytes[..], &[9u8; 16]);
            observer.fetch_add(1, Ordering::SeqCst);
        });

        // When
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        drop(descriptor);

        // Then
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clear_flags_combine() {
        let flags = ClearFlags::COLOR | ClearFlags::DEPTH;
        assert!(flags.contains(ClearFlags::COLOR));
        assert!(!flags.contains(ClearFlags::STENCIL));
    }

    #[test]
    fn render_pass_params_default_to_no_clear() {
        let params = RenderPassParams::default();
        assert_eq!(params.clear, ClearFlags::empty());
        assert_eq!(params.clear_depth, 1.0);
    }
}
