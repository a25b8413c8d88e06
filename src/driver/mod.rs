//! Core driver components for the eDMA engine.
//!
//! This module contains the essential building blocks for configuring and
//! operating the DMA controller:
//!
//! - [`config`] - Engine and transfer configuration with builder patterns
//! - [`error`] - Error types and result aliases
//! - [`engine`] - The main engine implementation
//! - [`status`] - Channel state and global error status
//! - [`memcpy`] - Blocking memory-to-memory copy
//!
//! # Example
//!
//! ```ignore
//! use ph_edma::driver::{ElementSize, TransferConfig};
//!
//! let config = TransferConfig::memory_to_memory(0, src, dst, 64, ElementSize::Word)
//!     .with_priority(8);
//! ```

// Submodules
pub mod config;
pub mod engine;
pub mod error;
pub mod memcpy;
pub mod status;

// Re-exports for convenience
pub use config::{Arbitration, DmaConfig, ElementSize, TransferConfig, TransferType};
pub use engine::{CompletionCallback, DmaEngine};
pub use error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, ErrorKind, IoError, IoResult, Result,
};
pub use status::{ChannelState, ErrorStatus};
