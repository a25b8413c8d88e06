//! Synchronization and Concurrency Support
//!
//! This module provides synchronization primitives and concurrency-safe
//! wrappers for the eDMA engine. It includes:
//!
//! - **Primitives** (`primitives`): Low-level synchronization types
//!   - [`CriticalSectionCell`] - ISR-safe interior mutability
//!   - `AtomicWaker` - Async waker storage for interrupts (feature `async`)
//!
//! - **Shared Wrapper** (`shared`): [`SharedDma`], a critical-section
//!   protected engine usable from thread and interrupt context
//!
//! - **Async Support** (`asynch`): per-channel wakers, an interrupt handler
//!   that dispatches and wakes, `SharedDma::wait_done` and
//!   `SharedDma::mem_copy_async`
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables `primitives` and `shared` modules
//! - `async`: Enables `asynch` module (also requires `critical-section`)
//!
//! # Example
//!
//! ```ignore
//! use ph_edma::sync::SharedDma;
//!
//! static DMA: SharedDma<Mmio, ExternalClocks> =
//!     SharedDma::new(unsafe { Mmio::new(0x4000_8000, 0x4002_1000) }, ExternalClocks);
//!
//! fn main() {
//!     DMA.with(|dma| dma.init(DmaConfig::default())).unwrap();
//! }
//!
//! #[interrupt]
//! fn DMA0() {
//!     DMA.on_interrupt();
//! }
//! ```

mod primitives;

#[cfg(any(feature = "async", test))]
pub use primitives::AtomicWaker;
pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedDma;

#[cfg(any(feature = "async", test))]
pub mod asynch;

#[cfg(any(feature = "async", test))]
pub use asynch::{
    CHANNEL_WAKERS, async_interrupt_handler, reset_async_state, reset_channels, wake_channels,
};
