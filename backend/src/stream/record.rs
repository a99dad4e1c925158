//! Type-erased command records.
//!
//! A record is one deferred driver call (or custom action) serialized into
//! arena memory. Every record starts with a one-word [`Header`] holding an
//! executor function pointer; the payload that follows is an `FnOnce` closure
//! that captures the call's arguments by value. The executor is monomorphized
//! per closure type, so it statically knows the payload layout and the
//! record's aligned size; replaying a record is a single indirect call.
//!
//! Two degenerate records consist of a bare header and carry no payload: the
//! skip-to-start marker written when an allocation wraps past the arena tail,
//! and the end-of-stream marker written when a generation is sealed.
//!
//! # Safety Contract
//!
//! Construction and execution work on raw arena bytes and require:
//! - the base pointer is aligned to [`RECORD_ALIGN`] and `offset` is a
//!   multiple of it (the arena's allocator guarantees both);
//! - a record is executed exactly once after being constructed; execution
//!   moves the closure out of the arena, so a second execution would read
//!   moved-from bytes;
//! - payloads are `Send`, since a filled arena may be drained on another
//!   thread.
//!
//! The [`CommandStream`](super::CommandStream) walk upholds the
//! execute-exactly-once rule; the arena upholds the layout rules.

use std::mem;
use std::ptr;

use crate::driver::Driver;

/// Alignment of every record placed in the arena, in bytes. Matches the
/// platform's maximum fundamental alignment so any argument payload can be
/// stored inline.
pub const RECORD_ALIGN: usize = 16;

/// Byte size of a bare-header marker record, rounded up to [`RECORD_ALIGN`].
pub(crate) const MARKER_SIZE: usize = align_up(mem::size_of::<Header>(), RECORD_ALIGN);

/// Executor signature stored in every record header.
///
/// Receives the arena base pointer, the record's own byte offset and the
/// driver to replay against. Returns the offset of the next record, or
/// `None` when the walk is complete.
pub(crate) type ExecuteFn =
    unsafe fn(base: *mut u8, offset: usize, driver: &mut dyn Driver) -> Option<usize>;

/// One-word prefix of every record.
#[repr(C)]
pub(crate) struct Header {
    execute: ExecuteFn,
}

/// A header followed by the closure payload it knows how to run.
#[repr(C)]
struct Record<F> {
    header: Header,
    action: F,
}

/// Round `size` up to the next multiple of `align`. `align` must be a power
/// of two.
pub(crate) const fn align_up(size: usize, align: usize) -> usize {
    (size + align - 1) & !(align - 1)
}

/// The arena footprint of a record whose payload is `F`, a multiple of
/// [`RECORD_ALIGN`].
pub(crate) const fn aligned_size_of<F>() -> usize {
    align_up(mem::size_of::<Record<F>>(), RECORD_ALIGN)
}

/// Monomorphized executor for records whose payload is `F`.
///
/// Moves the closure out of the arena, runs it, and reports where the next
/// record starts. The move means the captured arguments are destructed
/// exactly once, when the call returns, even for payloads with non-trivial
/// teardown such as buffers carrying release callbacks.
///
/// # Safety
///
/// `base + offset` must point at a live `Record<F>` constructed by
/// [`write_record`] that has not been executed before.
unsafe fn execute_record<F: FnOnce(&mut dyn Driver)>(
    base: *mut u8,
    offset: usize,
    driver: &mut dyn Driver,
) -> Option<usize> {
    // SAFETY: caller guarantees a live, correctly typed record at this
    // offset. Reading the action out transfers ownership of the captured
    // arguments to this frame.
    let action = unsafe {
        let record = base.add(offset) as *mut Record<F>;
        ptr::read(&raw const (*record).action)
    };
    action(driver);
    Some(offset + aligned_size_of::<F>())
}

/// Executor of the skip-to-start marker: resume the walk at offset 0.
unsafe fn skip_to_start(_base: *mut u8, _offset: usize, _driver: &mut dyn Driver) -> Option<usize> {
    Some(0)
}

/// Executor of the end-of-stream marker: the generation is fully drained.
unsafe fn end_of_stream(_base: *mut u8, _offset: usize, _driver: &mut dyn Driver) -> Option<usize> {
    None
}

/// Construct a record for `action` in place at `base + offset`.
///
/// # Safety
///
/// The span `[offset, offset + aligned_size_of::<F>())` must lie inside the
/// arena allocation, be reserved for this record, and `offset` must be a
/// multiple of [`RECORD_ALIGN`].
pub(crate) unsafe fn write_record<F>(base: *mut u8, offset: usize, action: F)
where
    F: FnOnce(&mut dyn Driver) + Send,
{
    const {
        assert!(
            mem::align_of::<Record<F>>() <= RECORD_ALIGN,
            "record payload is over-aligned for the arena"
        )
    }
    debug_assert!(offset % RECORD_ALIGN == 0, "misaligned record offset");
    // SAFETY: caller reserved the span; alignment checked above.
    unsafe {
        let record = base.add(offset) as *mut Record<F>;
        record.write(Record {
            header: Header {
                execute: execute_record::<F>,
            },
            action,
        });
    }
}

/// Write a skip-to-start marker at `base + offset`.
///
/// # Safety
///
/// `[offset, offset + MARKER_SIZE)` must lie inside the arena allocation and
/// `offset` must be a multiple of [`RECORD_ALIGN`].
pub(crate) unsafe fn write_skip_marker(base: *mut u8, offset: usize) {
    debug_assert!(offset % RECORD_ALIGN == 0, "misaligned marker offset");
    // SAFETY: per the caller's span guarantee.
    unsafe {
        (base.add(offset) as *mut Header).write(Header {
            execute: skip_to_start,
        });
    }
}

/// Write an end-of-stream marker at `base + offset`.
///
/// # Safety
///
/// Same span and alignment requirements as [`write_skip_marker`].
pub(crate) unsafe fn write_end_marker(base: *mut u8, offset: usize) {
    debug_assert!(offset % RECORD_ALIGN == 0, "misaligned marker offset");
    // SAFETY: per the caller's span guarantee.
    unsafe {
        (base.add(offset) as *mut Header).write(Header {
            execute: end_of_stream,
        });
    }
}

/// Execute the record at `base + offset` and return the next offset.
///
/// # Safety
///
/// A live, not-yet-executed record or marker must exist at this offset.
pub(crate) unsafe fn execute_at(
    base: *mut u8,
    offset: usize,
    driver: &mut dyn Driver,
) -> Option<usize> {
    // SAFETY: the header is the first field of every record.
    unsafe {
        let header = &*(base.add(offset) as *const Header);
        (header.execute)(base, offset, driver)
    }
}
