//! eDMA Transfer Engine
//!
//! A `no_std`, `no_alloc` Rust driver for an eDMA-style multi-channel DMA
//! controller with a request router (channel multiplexer).
//!
//! The engine moves bytes between memory and peripherals, or memory and
//! memory, without CPU involvement. Each channel owns one transfer control
//! descriptor (TCD) that the hardware mutates while the transfer runs;
//! completion is observed by polling or through an interrupt that
//! dispatches to per-channel callbacks.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Driver Layer** ([`driver`]): [`DmaEngine`] with channel lifecycle,
//!    transfer configuration, arbitration, completion and error status
//! 2. **HAL Layer** ([`hal`]): register access backends, clock gating and
//!    request routing
//! 3. **Sync Layer** (`sync`): ISR-safe and async wrappers (feature-gated)
//!
//! ## Transfer Model
//!
//! - A **minor loop** moves a fixed number of bytes per service request
//! - A **major loop** repeats the minor loop a configured number of times
//! - Addresses advance by a signed offset per element and are adjusted
//!   once more when the major loop completes
//! - The arbiter picks among armed channels by fixed priority or
//!   round-robin
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for public types and info/debug logs
//! - `log`: Enable `log` warnings (implicit stops, timeouts, hardware errors)
//! - `critical-section`: Enable ISR-safe `SharedDma` wrapper
//! - `async`: Enable async/await completion with per-channel wakers
//!
//! # Example
//!
//! ```ignore
//! use ph_edma::{DmaConfig, DmaEngine, ElementSize, TransferConfig};
//! use ph_edma::hal::{ExternalClocks, Mmio};
//!
//! let hw = unsafe { Mmio::new(0x4000_8000, 0x4002_1000) };
//! let mut dma: DmaEngine<_, _> = DmaEngine::new(hw, ExternalClocks);
//! dma.init(DmaConfig::default())?;
//!
//! // One-shot memory copy on channel 0
//! let config = TransferConfig::memory_to_memory(0, src, dst, 64, ElementSize::Word)
//!     .with_priority(4);
//! dma.configure(&config)?;
//! unsafe { dma.start(0)? };
//!
//! while !dma.is_done(0) {}
//! dma.clear_done(0)?;
//! ```
//!
//! # Concurrency
//!
//! A channel is owned by one logical user at a time. The engine performs
//! no locking of its own; wrap it in `SharedDma` to share it with an
//! interrupt handler.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(any(feature = "critical-section", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{Arbitration, DmaConfig, ElementSize, TransferConfig, TransferType};
pub use driver::engine::{CompletionCallback, DmaEngine};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, ErrorKind, IoError, IoResult, Result,
};
pub use driver::status::{ChannelState, ErrorStatus};
pub use hal::router::RequestSource;
pub use internal::tcd::TransferDescriptor;

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the safe driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Use only if you fully
/// understand the controller and accept responsibility for correct
/// sequencing and synchronization.
pub mod unsafe_registers {
    pub use crate::internal::register::dmamux::MuxRegs;
    pub use crate::internal::register::edma::EdmaRegs;
}

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::SharedDma;

// Re-export async types when async feature is enabled
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub use sync::asynch::async_interrupt_handler;

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types.
pub mod constants {
    pub use crate::internal::constants::{
        // Channel table
        DEFAULT_CHANNELS,
        // Timing
        DEFAULT_DONE_TIMEOUT_US,
        DONE_POLL_INTERVAL_US,
        // Descriptor limits
        FIRST_ALWAYS_ON_SLOT,
        MAX_CHANNELS,
        MAX_MAJOR_ITERATIONS,
        MAX_PRIORITY,
        MEMCOPY_ELEMENT_BYTES,
        MEMCOPY_POLL_BUDGET,
        REQUEST_SLOTS,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe engine over memory-mapped registers.
///
/// This macro expands to a `SharedDma<Mmio, ExternalClocks, N>` static,
/// reducing boilerplate for bring-up on targets whose clocks are enabled
/// by the HAL.
///
/// # Safety
///
/// The base addresses must be those of the target's eDMA controller and
/// request router. They are used for volatile access without further
/// checks.
///
/// # Examples
///
/// ```ignore
/// ph_edma::dma_static_sync!(DMA, 0x4000_8000, 0x4002_1000);
///
/// DMA.with(|dma| dma.init(DmaConfig::default())).unwrap();
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! dma_static_sync {
    ($name:ident, $controller:expr, $router:expr) => {
        $crate::dma_static_sync!($name, $controller, $router, 16);
    };
    ($name:ident, $controller:expr, $router:expr, $channels:expr) => {
        static $name: $crate::sync::SharedDma<
            $crate::hal::Mmio,
            $crate::hal::ExternalClocks,
            $channels,
        > = $crate::sync::SharedDma::new(
            // SAFETY: the invoker supplies the controller and router base addresses
            unsafe { $crate::hal::Mmio::new($controller, $router) },
            $crate::hal::ExternalClocks,
        );
    };
}
