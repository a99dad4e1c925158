//! The producer/consumer command stream.
//!
//! [`CommandStream`] is the facade application code talks to. Typed methods
//! (one per driver operation, generated from the
//! [operation table](crate::driver::api)) snapshot their arguments into the
//! [`CommandArena`] and return immediately; [`queue_command`] records an
//! arbitrary deferred action; [`execute`] replays a sealed generation
//! against the driver with one linear walk.
//!
//! # Lifecycle
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        one generation                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │ producer:  begin() ─► set_viewport() ─► queue_command() ─► … │
//! │                                            finish() ──┐      │
//! │ consumer:                                  execute(start)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exactly one producer fills a generation and exactly one consumer drains
//! it, never concurrently; on a single stream the exclusive borrows make
//! the overlap unrepresentable. For the threaded embedding, fill the arena
//! on the producer thread, drop the stream, move arena and driver to the
//! consumer thread and construct a stream there to drain; both types are
//! `Send`. Double buffering across frames (fill generation N while draining
//! N-1 from a second arena) is the surrounding scheduler's business.
//!
//! # Record Lifetime
//!
//! A record moves through exactly three states: allocated, constructed
//! (arguments stored), executed-and-destructed. Every constructed record is
//! executed exactly once during the next drain. There is no cancellation,
//! and captured resources (buffers, callbacks) are released by execution,
//! not by the arena.
//!
//! [`queue_command`]: CommandStream::queue_command
//! [`execute`]: CommandStream::execute

use std::time::Instant;

use log::debug;

use crate::driver::{Dispatcher, Driver};

pub mod arena;
pub(crate) mod record;

pub use arena::CommandArena;
pub use record::RECORD_ALIGN;

/// The recording and replay facade over one driver and one arena.
///
/// Both collaborators are borrowed: they are owned by the surrounding engine
/// context and outlive the stream. The driver's [`Dispatcher`] is snapshotted
/// at construction and fixed for the stream's lifetime.
pub struct CommandStream<'a> {
    driver: &'a mut dyn Driver,
    dispatcher: Dispatcher,
    arena: &'a mut CommandArena,
}

impl<'a> CommandStream<'a> {
    /// Create a stream recording into `arena` and replaying against
    /// `driver`.
    pub fn new(driver: &'a mut dyn Driver, arena: &'a mut CommandArena) -> Self {
        let dispatcher = driver.dispatcher();
        Self {
            driver,
            dispatcher,
            arena,
        }
    }

    /// Start a new generation and return its start offset, the value to
    /// hand to [`execute`](Self::execute) once the generation is sealed.
    pub fn begin(&mut self) -> usize {
        self.arena.begin()
    }

    /// Seal the current generation with an end-of-stream marker. No further
    /// enqueues are accepted until the generation is drained.
    pub fn finish(&mut self) {
        self.arena.seal();
    }

    /// Record an arbitrary deferred action.
    ///
    /// The escape hatch for work that is not shaped like a driver call:
    /// deferred cleanup, fence signaling, frame markers. The closure runs
    /// exactly once during the drain, in FIFO order with every other record.
    pub fn queue_command<F>(&mut self, command: F)
    where
        F: FnOnce() + Send,
    {
        self.record(move |_driver: &mut dyn Driver| command());
    }

    /// Replay the sealed generation starting at `start`, in FIFO order.
    ///
    /// Walks the arena record by record, invoking and destructing each, until
    /// the end-of-stream marker. Runs to completion on the calling thread.
    /// Driver-call failures are the driver's own concern: the walk locates
    /// the next record through the stored record size, never through a
    /// call's outcome.
    ///
    /// # Panics
    ///
    /// Panics if the generation is not sealed, was already drained, or if
    /// `start` is not the offset [`begin`](Self::begin) handed out;
    /// draining from anywhere else would misread arena bytes.
    pub fn execute(&mut self, start: usize) {
        assert!(
            self.arena.is_sealed(),
            "execute on an unsealed or already drained generation"
        );
        assert_eq!(
            start,
            self.arena.generation_start(),
            "execute from an offset that is not the generation start"
        );

        let started = Instant::now();
        let base = self.arena.base_ptr();
        let mut walked = 0usize;
        let mut next = Some(start);
        while let Some(offset) = next {
            debug_assert!(
                offset + record::MARKER_SIZE <= self.arena.capacity(),
                "record offset {offset} out of bounds"
            );
            // SAFETY: `offset` was produced by this generation's record
            // chain, which the sealed-generation state machine guarantees is
            // constructed and not yet executed.
            next = unsafe { record::execute_at(base, offset, &mut *self.driver) };
            walked += 1;
        }
        self.arena.mark_drained();

        debug!(
            target: "ember_backend::stream",
            "drained generation: {walked} records walked in {:?}",
            started.elapsed()
        );
    }

    /// The arena this stream records into.
    pub fn arena(&self) -> &CommandArena {
        self.arena
    }

    /// Construct one record holding `action` in the arena.
    pub(crate) fn record<F>(&mut self, action: F)
    where
        F: FnOnce(&mut dyn Driver) + Send,
    {
        let size = record::aligned_size_of::<F>();
        let offset = self.arena.allocate(size);
        // SAFETY: `allocate` reserved an aligned span of exactly `size`
        // bytes for this record.
        unsafe { record::write_record(self.arena.base_ptr(), offset, action) };
    }

    /// The dispatch table snapshotted from the driver.
    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Direct access to the driver, for synchronous dispatch.
    pub(crate) fn driver_mut(&mut self) -> &mut dyn Driver {
        &mut *self.driver
    }
}
