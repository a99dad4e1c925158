//! The circular command arena.
//!
//! [`CommandArena`] owns one contiguous, pre-allocated block of raw memory
//! and hands out bump-allocated spans for command records. It tracks a write
//! cursor that advances monotonically and wraps to the start of the block
//! when the remaining tail cannot hold a request, marking the skipped tail
//! so the consumer's linear walk follows the wrap instead of misreading dead
//! bytes.
//!
//! The arena does not track record types or initialization: the record layer
//! constructs payloads into the spans it hands out, and the stream's drain
//! destroys them. What the arena does enforce is the layout and budget
//! discipline that makes the walk sound:
//!
//! - every span starts on a [`RECORD_ALIGN`](super::record::RECORD_ALIGN)
//!   boundary;
//! - one marker slot is reserved out of capacity at all times, so sealing a
//!   generation always has room for the end-of-stream record;
//! - a generation can never consume more than the arena holds; overflow is
//!   a fatal sizing error, surfaced by a panic before any not-yet-executed
//!   record could be overwritten.
//!
//! # Generations
//!
//! One producer fills a generation, one consumer drains it, never
//! concurrently:
//!
//! ```text
//! begin() ──► allocate()* ──► seal() ──► execute(start) ──► begin() ...
//! ```
//!
//! [`begin`](CommandArena::begin) resets the generation budget and reports
//! the start offset; [`seal`](CommandArena::seal) writes the end-of-stream
//! marker. The next generation continues from the current cursor, reusing
//! the bytes the previous drain retired. Memory is never zeroed.
//!
//! # Thread Safety
//!
//! The arena is `Send` (a filled generation may be moved to a consumer
//! thread) but not `Sync`. Record constructors require `Send` payloads,
//! which is what makes the transfer sound.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use super::record::{self, MARKER_SIZE, RECORD_ALIGN};

/// A fixed-capacity circular byte buffer holding pending command records.
pub struct CommandArena {
    /// The owned allocation, aligned to `RECORD_ALIGN`.
    ptr: NonNull<u8>,
    /// Total capacity in bytes.
    capacity: usize,
    /// Write cursor: byte offset of the next record.
    head: usize,
    /// Bytes consumed by the current generation, skipped tail included.
    used: usize,
    /// Start offset of the current generation, as handed out by `begin`.
    start: usize,
    /// Whether the current generation has its end-of-stream marker written.
    sealed: bool,
}

impl CommandArena {
    /// Allocate an arena of (at least) `capacity` bytes.
    ///
    /// The capacity is rounded up to the record alignment. Choose it from
    /// the worst-case frame's command volume; running out at enqueue time is
    /// a fatal sizing error, not a recoverable condition.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is too small to hold even a single marker
    /// record.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = record::align_up(capacity, RECORD_ALIGN);
        assert!(
            capacity > MARKER_SIZE,
            "command arena of {capacity} bytes cannot hold a single record"
        );
        let layout = Layout::from_size_align(capacity, RECORD_ALIGN).expect("layout overflow");
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            alloc::handle_alloc_error(layout);
        }
        Self {
            ptr: NonNull::new(ptr).expect("allocation returned null"),
            capacity,
            head: 0,
            used: 0,
            start: 0,
            sealed: false,
        }
    }

    /// Total capacity in bytes.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current write cursor, the offset where the next record will land.
    #[inline]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Bytes consumed by the current generation, skipped tail included.
    #[inline]
    pub const fn used(&self) -> usize {
        self.used
    }

    /// Start a new generation and return its start offset.
    ///
    /// Resets the generation byte budget; the cursor stays where the
    /// previous generation left it, reusing retired bytes circularly.
    pub fn begin(&mut self) -> usize {
        self.used = 0;
        self.sealed = false;
        self.start = self.head;
        self.head
    }

    /// Logically clear the arena: cursor back to offset 0, budget reset.
    ///
    /// Pending records are NOT destructed: only call this when the previous
    /// generation has been fully drained (or never filled). Memory is not
    /// zeroed.
    pub fn clear(&mut self) {
        self.head = 0;
        self.used = 0;
        self.start = 0;
        self.sealed = false;
    }

    /// Seal the current generation by writing the end-of-stream marker at
    /// the cursor. The cursor does not advance; the marker slot is reused by
    /// the next generation once this one has drained.
    pub fn seal(&mut self) {
        debug_assert!(!self.sealed, "generation sealed twice");
        // SAFETY: `head` is aligned and the marker slot is reserved out of
        // every allocation (see `allocate`).
        unsafe { record::write_end_marker(self.ptr.as_ptr(), self.head) };
        self.sealed = true;
    }

    /// Whether the current generation is sealed and ready to drain.
    #[inline]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Mark the sealed generation as drained. Called by the stream after a
    /// completed walk so stale start offsets cannot be drained twice.
    pub(crate) fn mark_drained(&mut self) {
        self.sealed = false;
    }

    /// Start offset of the current generation.
    #[inline]
    pub(crate) const fn generation_start(&self) -> usize {
        self.start
    }

    /// Bump-allocate an aligned span of `size` bytes, wrapping to the start
    /// of the block when the tail is too short. Returns the span's offset.
    ///
    /// `size` must already be a multiple of the record alignment.
    ///
    /// # Panics
    ///
    /// Panics when `size` can never fit the arena, or when the current
    /// generation's cumulative consumption would overflow it. Both are
    /// sizing errors in the embedding; silently wrapping into unexecuted
    /// records is never an option.
    pub(crate) fn allocate(&mut self, size: usize) -> usize {
        debug_assert!(size % RECORD_ALIGN == 0, "unaligned allocation request");
        assert!(!self.sealed, "allocation in a sealed generation");

        // One marker slot stays reserved so `seal` (and a wrap marker)
        // always has room.
        let budget = self.capacity - MARKER_SIZE;
        assert!(
            size <= budget,
            "command record of {size} bytes can never fit a {} byte arena",
            self.capacity
        );

        let wraps = self.head + size > budget;
        let cost = if wraps {
            (self.capacity - self.head) + size
        } else {
            size
        };
        assert!(
            self.used + cost <= budget,
            "command arena exhausted: generation needs {} of {} usable bytes",
            self.used + cost,
            budget
        );

        if wraps {
            // SAFETY: `head <= budget`, so the marker fits the tail.
            unsafe { record::write_skip_marker(self.ptr.as_ptr(), self.head) };
            self.head = 0;
        }

        let offset = self.head;
        self.head += size;
        self.used += cost;
        offset
    }

    /// Base pointer of the allocation, for record construction and replay.
    #[inline]
    pub(crate) fn base_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }
}

impl Drop for CommandArena {
    fn drop(&mut self) {
        // Records still pending at this point leak their captured state; the
        // embedding is expected to drain every sealed generation before
        // teardown.
        let layout =
            Layout::from_size_align(self.capacity, RECORD_ALIGN).expect("layout overflow");
        unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
    }
}

// SAFETY: the arena owns its allocation outright, and every record payload
// written into it is constrained to be Send at construction. Not Sync: there
// is no interior synchronization.
unsafe impl Send for CommandArena {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rounds_up_to_alignment() {
        let arena = CommandArena::with_capacity(100);
        assert_eq!(arena.capacity() % RECORD_ALIGN, 0);
        assert!(arena.capacity() >= 100);
    }

    #[test]
    fn allocations_advance_the_cursor_contiguously() {
        // Given
        let mut arena = CommandArena::with_capacity(256);
        arena.begin();

        // When
        let first = arena.allocate(32);
        let second = arena.allocate(64);
        let third = arena.allocate(16);

        // Then
        assert_eq!(first, 0);
        assert_eq!(second, 32);
        assert_eq!(third, 96);
        assert_eq!(arena.head(), 112);
        assert_eq!(arena.used(), 112);
    }

    #[test]
    fn allocations_stay_aligned() {
        let mut arena = CommandArena::with_capacity(1024);
        arena.begin();
        for _ in 0..10 {
            let offset = arena.allocate(48);
            assert_eq!(offset % RECORD_ALIGN, 0);
        }
    }

    #[test]
    fn tail_overflow_wraps_to_start() {
        // Given a generation that starts past the middle of the arena
        let mut arena = CommandArena::with_capacity(256);
        arena.begin();
        arena.allocate(160);
        arena.seal();
        let base = arena.begin();
        assert_eq!(base, 160);

        // When a request no longer fits the tail (budget is 240)
        let offset = arena.allocate(96);

        // Then it wrapped to the start and billed the skipped tail
        assert_eq!(offset, 0);
        assert_eq!(arena.head(), 96);
        assert_eq!(arena.used(), (256 - 160) + 96);
    }

    #[test]
    #[should_panic(expected = "can never fit")]
    fn oversized_single_request_panics() {
        let mut arena = CommandArena::with_capacity(128);
        arena.begin();
        arena.allocate(256);
    }

    #[test]
    #[should_panic(expected = "arena exhausted")]
    fn generation_overflow_panics() {
        let mut arena = CommandArena::with_capacity(128);
        arena.begin();
        arena.allocate(64);
        arena.allocate(48);
        // 112 of 112 usable bytes consumed; one more record overflows.
        arena.allocate(16);
    }

    #[test]
    #[should_panic(expected = "arena exhausted")]
    fn wrap_into_own_generation_panics() {
        // A generation starting at 0 cannot wrap over itself.
        let mut arena = CommandArena::with_capacity(256);
        arena.begin();
        arena.allocate(224);
        arena.allocate(64);
    }

    #[test]
    fn begin_resets_the_budget_but_not_the_cursor() {
        let mut arena = CommandArena::with_capacity(256);
        arena.begin();
        arena.allocate(64);
        arena.seal();

        let start = arena.begin();
        assert_eq!(start, 64);
        assert_eq!(arena.used(), 0);
        assert!(!arena.is_sealed());
    }

    #[test]
    fn clear_rewinds_to_offset_zero() {
        let mut arena = CommandArena::with_capacity(256);
        arena.begin();
        arena.allocate(64);
        arena.clear();
        assert_eq!(arena.head(), 0);
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn seal_marks_the_generation_drainable() {
        let mut arena = CommandArena::with_capacity(256);
        arena.begin();
        arena.allocate(32);
        assert!(!arena.is_sealed());
        arena.seal();
        assert!(arena.is_sealed());
    }
}
