//! Memory profiling utilities using dhat.
//!
//! The command stream's whole point is that recording a call costs a bounded
//! memory copy and nothing else: no heap traffic on the hot path. This
//! module provides the utilities used to verify that claim under dhat.
//!
//! # Usage
//!
//! Memory profiling adds overhead and should only be enabled when needed:
//!
//! ```bash
//! cargo bench -p ember_bench --features memory_profiling
//! ```
//!
//! # Viewing Results
//!
//! After running with memory profiling, view results at:
//! <https://nnethercote.github.io/dh_view/dh_view.html>
//!
//! Load the generated `dhat-heap.json` file.

/// Memory statistics captured during a benchmark run.
#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    /// Total bytes allocated during the measurement.
    pub bytes_allocated: u64,
    /// Total number of allocations.
    pub allocation_count: u64,
    /// Peak heap usage in bytes.
    pub peak_bytes: u64,
}

impl MemoryStats {
    /// Calculate bytes per recorded command for a given command count.
    ///
    /// Anything above zero outside arena construction means the hot path
    /// regressed into allocating.
    pub fn bytes_per_command(&self, command_count: usize) -> f64 {
        if command_count == 0 {
            0.0
        } else {
            self.bytes_allocated as f64 / command_count as f64
        }
    }

    /// Calculate allocations per recorded command for a given command count.
    pub fn allocations_per_command(&self, command_count: usize) -> f64 {
        if command_count == 0 {
            0.0
        } else {
            self.allocation_count as f64 / command_count as f64
        }
    }
}

impl std::fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "allocated: {} bytes ({} allocs), peak: {} bytes",
            self.bytes_allocated, self.allocation_count, self.peak_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_command_ratios_handle_zero_counts() {
        let stats = MemoryStats::default();
        assert_eq!(stats.bytes_per_command(0), 0.0);
        assert_eq!(stats.allocations_per_command(0), 0.0);
    }

    #[test]
    fn per_command_ratios_divide_by_count() {
        let stats = MemoryStats {
            bytes_allocated: 1024,
            allocation_count: 4,
            peak_bytes: 1024,
        };
        assert_eq!(stats.bytes_per_command(256), 4.0);
        assert_eq!(stats.allocations_per_command(2), 2.0);
    }
}
