//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers and
//! configuration constants used throughout the DMA engine.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Channel table**: channel counts and limits
//! - **Descriptor limits**: iteration counters, priorities, request slots
//! - **Timing**: polling budgets and intervals
//!
//! # Note
//!
//! Hardware register bit definitions remain in their respective modules
//! (`register/edma.rs`, `register/dmamux.rs`, `tcd/bits.rs`) as they are
//! specific to those hardware blocks.

// =============================================================================
// Channel Table
// =============================================================================

/// Default number of channels on the engine (typical eDMA instance)
pub const DEFAULT_CHANNELS: usize = 16;

/// Largest channel count the register map can address (5-bit channel field)
pub const MAX_CHANNELS: usize = 32;

// =============================================================================
// Descriptor Limits
// =============================================================================

/// Highest channel priority (4-bit CHPRI field, 15 wins arbitration)
pub const MAX_PRIORITY: u8 = 15;

/// Largest major-loop iteration count (15-bit CITER/BITER field)
pub const MAX_MAJOR_ITERATIONS: u16 = 0x7FFF;

/// Number of request router slots (6-bit SOURCE field)
pub const REQUEST_SLOTS: u8 = 64;

/// First always-on request slot
pub const FIRST_ALWAYS_ON_SLOT: u8 = 58;

// =============================================================================
// Timing Constants
// =============================================================================

/// Maximum status polls in the blocking memory copy before giving up
pub const MEMCOPY_POLL_BUDGET: u32 = 100_000;

/// Element size used by the blocking memory copy, in bytes
pub const MEMCOPY_ELEMENT_BYTES: usize = 4;

/// Poll interval for time-bounded waits in microseconds
pub const DONE_POLL_INTERVAL_US: u32 = 1;

/// Default time budget for time-bounded waits in microseconds
pub const DEFAULT_DONE_TIMEOUT_US: u32 = 10_000;
