//! Channel state and global error status for the eDMA engine.
//!
//! This module provides [`ChannelState`], the per-channel lifecycle view,
//! and [`ErrorStatus`], parsed from the controller's global error status
//! register.

use crate::driver::error::{DmaError, DmaResult};
use crate::internal::register::edma::{
    ES_CPE, ES_DAE, ES_DBE, ES_DOE, ES_ECX, ES_ERRCHN_MASK, ES_ERRCHN_SHIFT, ES_NCE, ES_SAE,
    ES_SBE, ES_SGE, ES_SOE, ES_VLD,
};

// =============================================================================
// Channel State
// =============================================================================

/// Lifecycle state of one channel
///
/// ```text
/// Idle --configure--> Configured --start--> Armed --request--> Active
///                         ^                                      |
///                         +------ clear_done / start <-- Done <--+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// No transfer configured
    #[default]
    Idle,
    /// Descriptor written, request line disabled
    Configured,
    /// Request line enabled, waiting for the arbiter
    Armed,
    /// Hardware is executing the major loop
    Active,
    /// Major loop complete, DONE not yet cleared
    Done,
}

// =============================================================================
// Error Status
// =============================================================================

/// Error flags parsed from the global error status register.
///
/// The register latches the most recent error only. The channel number is
/// that of the channel that caused it; the engine does not route errors to
/// completion callbacks.
///
/// # Example
///
/// ```ignore
/// let status = dma.error_status()?;
/// if status.valid {
///     dma.stop(status.channel as usize)?;
///     dma.clear_error(status.channel as usize)?;
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorStatus {
    /// Bus error on a destination write
    pub destination_bus: bool,
    /// Bus error on a source read
    pub source_bus: bool,
    /// Scatter-gather address not on a descriptor boundary
    pub scatter_gather: bool,
    /// Minor loop bytes or iteration counts inconsistent
    pub nbytes_citer: bool,
    /// Destination offset not a multiple of the destination size
    pub destination_offset: bool,
    /// Destination address not aligned to the destination size
    pub destination_address: bool,
    /// Source offset not a multiple of the source size
    pub source_offset: bool,
    /// Source address not aligned to the source size
    pub source_address: bool,
    /// Channel priorities not unique in fixed-priority mode
    pub priority: bool,
    /// Transfer canceled by the error cancel control
    pub canceled: bool,
    /// Channel number of the last recorded error
    pub channel: u8,
    /// At least one channel has an error latched
    pub valid: bool,
}

impl ErrorStatus {
    /// Create from raw error status register value
    #[inline]
    pub fn from_raw(status: u32) -> Self {
        Self {
            destination_bus: (status & ES_DBE) != 0,
            source_bus: (status & ES_SBE) != 0,
            scatter_gather: (status & ES_SGE) != 0,
            nbytes_citer: (status & ES_NCE) != 0,
            destination_offset: (status & ES_DOE) != 0,
            destination_address: (status & ES_DAE) != 0,
            source_offset: (status & ES_SOE) != 0,
            source_address: (status & ES_SAE) != 0,
            priority: (status & ES_CPE) != 0,
            canceled: (status & ES_ECX) != 0,
            channel: ((status & ES_ERRCHN_MASK) >> ES_ERRCHN_SHIFT) as u8,
            valid: (status & ES_VLD) != 0,
        }
    }

    /// Check if a bus error was recorded
    #[inline]
    pub fn has_bus_error(&self) -> bool {
        self.source_bus || self.destination_bus
    }

    /// Check if a descriptor configuration error was recorded
    #[inline]
    pub fn has_descriptor_error(&self) -> bool {
        self.scatter_gather
            || self.nbytes_citer
            || self.destination_offset
            || self.destination_address
            || self.source_offset
            || self.source_address
    }

    /// Map to a domain error
    ///
    /// Returns `Ok(())` when no error is latched. Bus errors take precedence
    /// over descriptor errors, which take precedence over priority errors.
    pub fn to_result(&self) -> DmaResult<()> {
        if !self.valid {
            return Ok(());
        }
        if self.has_bus_error() {
            Err(DmaError::BusError)
        } else if self.has_descriptor_error() {
            Err(DmaError::DescriptorError)
        } else if self.priority {
            Err(DmaError::PriorityError)
        } else {
            Err(DmaError::TransferCanceled)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
