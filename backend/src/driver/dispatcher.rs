//! Per-driver routing of operations to immediate or recorded dispatch.
//!
//! Some backends want a subset of operations executed on the submitting
//! thread (a single-threaded driver wants all of them) while everything
//! else flows through the command arena. The mapping is a property of the
//! driver implementation, fixed for the lifetime of a stream, and only
//! covers the deferred-capable operations: value-returning operations are
//! synchronous by construction and never appear here.

use fixedbitset::FixedBitSet;

use super::api::DriverOp;

/// A fixed operation → immediate/recorded routing table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    synchronous: FixedBitSet,
}

impl Dispatcher {
    /// Record every operation. This is the default for drivers running on
    /// their own thread.
    pub fn deferred() -> Self {
        Self {
            synchronous: FixedBitSet::with_capacity(DriverOp::COUNT),
        }
    }

    /// Dispatch every operation immediately, bypassing the arena. Suits
    /// single-threaded embeddings and diagnostic drivers.
    pub fn synchronous() -> Self {
        let mut synchronous = FixedBitSet::with_capacity(DriverOp::COUNT);
        synchronous.insert_range(..);
        Self { synchronous }
    }

    /// Record everything except the listed operations.
    pub fn with_synchronous(ops: &[DriverOp]) -> Self {
        let mut dispatcher = Self::deferred();
        for &op in ops {
            dispatcher.set_synchronous(op, true);
        }
        dispatcher
    }

    /// Flag one operation as immediate (`true`) or recorded (`false`).
    pub fn set_synchronous(&mut self, op: DriverOp, synchronous: bool) {
        self.synchronous.set(op as usize, synchronous);
    }

    /// Whether `op` dispatches on the submitting thread.
    #[inline]
    pub fn is_synchronous(&self, op: DriverOp) -> bool {
        self.synchronous.contains(op as usize)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::deferred()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deferred_records_everything() {
        let dispatcher = Dispatcher::deferred();
        assert!(!dispatcher.is_synchronous(DriverOp::SetViewport));
        assert!(!dispatcher.is_synchronous(DriverOp::Present));
    }

    #[test]
    fn synchronous_dispatches_everything() {
        let dispatcher = Dispatcher::synchronous();
        assert!(dispatcher.is_synchronous(DriverOp::BeginFrame));
        assert!(dispatcher.is_synchronous(DriverOp::DestroyTexture));
    }

    #[test]
    fn per_op_flags_are_independent() {
        // Given
        let mut dispatcher = Dispatcher::with_synchronous(&[DriverOp::Clear]);

        // Then
        assert!(dispatcher.is_synchronous(DriverOp::Clear));
        assert!(!dispatcher.is_synchronous(DriverOp::Draw));

        // When flipped back
        dispatcher.set_synchronous(DriverOp::Clear, false);
        assert!(!dispatcher.is_synchronous(DriverOp::Clear));
    }
}
