//! Backend command recording and dispatch for the ember renderer.
//!
//! This crate decouples the engine's main-thread rendering API from the
//! execution of driver operations. Calls against a [`CommandStream`] are
//! either dispatched straight to the [`Driver`] (when the driver's
//! [`Dispatcher`] flags them synchronous) or recorded, arguments and all,
//! into a pre-allocated circular [`CommandArena`], to be replayed later with
//! a single linear walk on whichever thread owns the driver.
//!
//! # Overview
//!
//! ```text
//! main thread                              driver thread
//! ───────────                              ─────────────
//! stream.set_viewport(vp) ──record──┐
//! stream.clear(..)        ──record──┼──► CommandArena ──execute──► Driver
//! stream.queue_command(f) ──record──┘         ▲
//! stream.create_buffer()  ──direct────────────┼────────────────► Driver
//!                                    (one generation at a time)
//! ```
//!
//! Recording is a bounded-time argument copy plus a cursor bump: no locks,
//! no heap allocation, no blocking. Replay is one indirect call per record.
//!
//! # Modules
//!
//! - [`stream`]: the arena, the record encoding and the producer/consumer
//!   facade.
//! - [`driver`]: the driver capability trait, its argument types, the
//!   dispatch table and a no-op backend for tests and demos.

pub mod driver;
pub mod stream;

pub use driver::{
    BufferDescriptor, BufferHandle, BufferUsage, ClearFlags, Color, Dispatcher, Driver, DriverOp,
    NoopDriver, PipelineHandle, RenderPassParams, RenderTargetHandle, TextureFormat, TextureHandle,
    Viewport,
};
pub use stream::{CommandArena, CommandStream};
