//! Hardware Abstraction Layer
//!
//! This module provides the seams between the engine and the SoC:
//!
//! - [`mmio`]: Register access trait and the memory-mapped backend
//! - [`clock`]: Clock gating hook and controller
//! - [`router`]: Request sources and the request router driver
//!
//! # Delay Integration
//!
//! Time-bounded waits use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod clock;
pub mod mmio;
pub mod router;

// Re-export commonly used types
pub use clock::{ClockController, ClockGate, ClockState, ExternalClocks};
pub use mmio::{DmaHardware, Mmio, RegisterBlock};
pub use router::{RequestRouter, RequestSource};
