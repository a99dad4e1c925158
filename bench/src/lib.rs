//! Benchmark utilities for the ember backend.
//!
//! This crate provides the benchmarking infrastructure for the command
//! stream, including:
//!
//! - **Microbenchmarks**: individual stream operations (enqueue, drain,
//!   custom commands, synchronous dispatch)
//! - **Scenario benchmarks**: realistic frame-shaped command mixes
//! - **Memory tracking**: heap allocation profiling via dhat, to verify the
//!   record hot path stays allocation free
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p ember_bench
//!
//! # Run specific benchmark group
//! cargo bench -p ember_bench -- enqueue
//!
//! # Run with memory profiling (slower)
//! cargo bench -p ember_bench --features memory_profiling
//! ```
//!
//! # Benchmark Results
//!
//! Results are written to `target/criterion/` with HTML reports for
//! visualization. Memory profiling results are written to `dhat-heap.json`
//! for viewing with DHAT's viewer.

pub mod drivers;
pub mod memory;
