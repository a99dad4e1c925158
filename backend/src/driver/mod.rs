//! The driver capability consumed by the command stream.
//!
//! [`Driver`] is the contract a concrete backend implements: one method per
//! operation, declared once in the [`api`] operation table. The stream
//! routes each submitted operation either straight to the driver or into the
//! arena, according to the driver's [`Dispatcher`].

pub mod api;
pub mod dispatcher;
pub mod noop;
pub mod types;

pub use api::{Driver, DriverOp};
pub use dispatcher::Dispatcher;
pub use noop::NoopDriver;
pub use types::{
    BufferDescriptor, BufferHandle, BufferUsage, ClearFlags, Color, PipelineHandle,
    RenderPassParams, RenderTargetHandle, TextureFormat, TextureHandle, Viewport,
};
