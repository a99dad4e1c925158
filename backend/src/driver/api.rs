//! The driver operation table.
//!
//! A single [`driver_api!`] invocation declares every backend operation once
//! and generates the three artifacts that must stay in lockstep:
//!
//! - the [`Driver`] trait, one method per operation, implemented by each
//!   concrete backend;
//! - the [`DriverOp`] enum over the deferred operations, with a constant
//!   name table for diagnostics;
//! - the typed enqueue methods on [`CommandStream`], which snapshot the
//!   call's arguments into an arena record (or dispatch directly when the
//!   driver's [`Dispatcher`] flags the operation synchronous).
//!
//! Operations in the `deferred` block return nothing: a recorded call cannot
//! hand a result back to the producer thread. Operations in the
//! `synchronous` block may return values and always run on the calling
//! thread, bypassing the arena entirely.

use crate::stream::CommandStream;

use super::dispatcher::Dispatcher;
use super::types::{
    BufferDescriptor, BufferHandle, BufferUsage, ClearFlags, Color, PipelineHandle,
    RenderPassParams, RenderTargetHandle, TextureFormat, TextureHandle, Viewport,
};

/// Declare the backend operation set.
///
/// Each `deferred` entry is `Variant => fn name(args...);`: the variant
/// names the operation in [`DriverOp`], the signature is shared verbatim by
/// the [`Driver`] trait and the [`CommandStream`] enqueue method. Each
/// `synchronous` entry is a plain `fn name(args...) -> Ret;`.
macro_rules! driver_api {
    (
        deferred {
            $(
                $(#[$dmeta:meta])*
                $dvariant:ident => fn $dname:ident ( $( $darg:ident : $dty:ty ),* $(,)? );
            )*
        }
        synchronous {
            $(
                $(#[$smeta:meta])*
                fn $sname:ident ( $( $sarg:ident : $sty:ty ),* $(,)? ) -> $sret:ty;
            )*
        }
    ) => {
        /// A concrete graphics backend.
        ///
        /// One callable per supported operation, with a fixed signature.
        /// Implementations execute on whichever thread drains the command
        /// stream, so drivers must be `Send`. Errors inside an operation are
        /// the driver's own business; the command stream replays the next
        /// record regardless of what a call did.
        pub trait Driver: Send {
            $(
                $(#[$dmeta])*
                fn $dname(&mut self $(, $darg: $dty)*);
            )*

            $(
                $(#[$smeta])*
                fn $sname(&mut self $(, $sarg: $sty)*) -> $sret;
            )*

            /// The routing table consulted when operations are submitted
            /// through a [`CommandStream`]: operations flagged synchronous
            /// are invoked directly on the submitting thread instead of
            /// recorded. Fixed per driver instance; the default records
            /// everything.
            fn dispatcher(&self) -> Dispatcher {
                Dispatcher::deferred()
            }
        }

        /// Identifies one deferred (recordable) driver operation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum DriverOp {
            $( $dvariant, )*
        }

        impl DriverOp {
            /// Number of deferred operations in the API.
            pub const COUNT: usize = [$( DriverOp::$dvariant ),*].len();

            /// The operation's method name, for diagnostics.
            pub const fn name(self) -> &'static str {
                match self {
                    $( DriverOp::$dvariant => stringify!($dname), )*
                }
            }
        }

        impl<'a> CommandStream<'a> {
            $(
                $(#[$dmeta])*
                pub fn $dname(&mut self $(, $darg: $dty)*) {
                    if self.dispatcher().is_synchronous(DriverOp::$dvariant) {
                        self.driver_mut().$dname($( $darg ),*);
                        return;
                    }
                    #[cfg(feature = "command_trace")]
                    log::trace!(
                        target: "ember_backend::stream",
                        "record {}{:?}",
                        DriverOp::$dvariant.name(),
                        ( $( &$darg, )* )
                    );
                    self.record(move |driver: &mut dyn Driver| driver.$dname($( $darg ),*));
                }
            )*

            $(
                $(#[$smeta])*
                pub fn $sname(&mut self $(, $sarg: $sty)*) -> $sret {
                    self.driver_mut().$sname($( $sarg ),*)
                }
            )*
        }
    };
}

driver_api! {
    deferred {
        /// Mark the beginning of a frame.
        BeginFrame => fn begin_frame(frame_id: u64, timestamp_nanos: u64);
        /// Mark the end of a frame.
        EndFrame => fn end_frame(frame_id: u64);
        /// Start a render pass over `target`.
        BeginRenderPass => fn begin_render_pass(target: RenderTargetHandle, params: RenderPassParams);
        /// Finish the current render pass.
        EndRenderPass => fn end_render_pass();
        /// Set the active viewport rectangle.
        SetViewport => fn set_viewport(viewport: Viewport);
        /// Set the active scissor rectangle.
        SetScissor => fn set_scissor(scissor: Viewport);
        /// Bind a pipeline state object for subsequent draws.
        BindPipeline => fn bind_pipeline(pipeline: PipelineHandle);
        /// Clear the selected attachments of the current render target.
        Clear => fn clear(flags: ClearFlags, color: Color, depth: f32, stencil: u8);
        /// Issue an indexed draw from the bound pipeline.
        Draw => fn draw(vertices: BufferHandle, indices: BufferHandle, index_count: u32);
        /// Upload `data` into a buffer at `byte_offset`. The descriptor is
        /// moved into the record; its release callback fires once the driver
        /// is done with it.
        UpdateBuffer => fn update_buffer(handle: BufferHandle, data: BufferDescriptor, byte_offset: u32);
        /// Upload `data` into one mip level of a texture.
        UpdateTexture => fn update_texture(handle: TextureHandle, mip_level: u32, data: BufferDescriptor);
        /// Release a buffer object.
        DestroyBuffer => fn destroy_buffer(handle: BufferHandle);
        /// Release a texture object.
        DestroyTexture => fn destroy_texture(handle: TextureHandle);
        /// Present the render target to its surface.
        Present => fn present(target: RenderTargetHandle);
    }
    synchronous {
        /// Create a buffer object of `size_bytes`.
        fn create_buffer(size_bytes: u32, usage: BufferUsage) -> BufferHandle;
        /// Create an uninitialized 2D texture.
        fn create_texture(width: u32, height: u32, format: TextureFormat) -> TextureHandle;
        /// Create a render target from existing attachments.
        fn create_render_target(color: TextureHandle, depth: Option<TextureHandle>) -> RenderTargetHandle;
        /// Whether the backend can sample and render to `format`.
        fn format_supported(format: TextureFormat) -> bool;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_count_matches_the_table() {
        assert_eq!(DriverOp::COUNT, 14);
    }

    #[test]
    fn op_names_come_from_the_method_table() {
        assert_eq!(DriverOp::SetViewport.name(), "set_viewport");
        assert_eq!(DriverOp::UpdateBuffer.name(), "update_buffer");
        assert_eq!(DriverOp::Present.name(), "present");
    }
}
