//! Configuration types for the eDMA engine

use crate::driver::error::{ConfigError, ConfigResult};
use crate::hal::router::RequestSource;
use crate::internal::constants::{MAX_MAJOR_ITERATIONS, MAX_PRIORITY};
use crate::internal::tcd::TransferDescriptor;
use crate::internal::tcd::bits::{attr, csr};

/// Size of one element moved per read/write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ElementSize {
    /// 8-bit
    Byte = 1,
    /// 16-bit
    HalfWord = 2,
    /// 32-bit (default)
    #[default]
    Word = 4,
    /// 16-byte burst
    Burst16 = 16,
    /// 32-byte burst
    Burst32 = 32,
}

impl ElementSize {
    /// Size in bytes
    #[must_use]
    pub const fn bytes(self) -> u32 {
        self as u32
    }

    /// Encoding for the SSIZE/DSIZE attribute fields
    #[must_use]
    pub const fn attr_code(self) -> u8 {
        match self {
            ElementSize::Byte => attr::SIZE_8BIT,
            ElementSize::HalfWord => attr::SIZE_16BIT,
            ElementSize::Word => attr::SIZE_32BIT,
            ElementSize::Burst16 => attr::SIZE_16BYTE,
            ElementSize::Burst32 => attr::SIZE_32BYTE,
        }
    }

    /// Decode an SSIZE/DSIZE attribute field
    #[must_use]
    pub const fn from_attr_code(code: u8) -> Option<Self> {
        match code {
            attr::SIZE_8BIT => Some(ElementSize::Byte),
            attr::SIZE_16BIT => Some(ElementSize::HalfWord),
            attr::SIZE_32BIT => Some(ElementSize::Word),
            attr::SIZE_16BYTE => Some(ElementSize::Burst16),
            attr::SIZE_32BYTE => Some(ElementSize::Burst32),
            _ => None,
        }
    }

    /// Element size with the given width in bytes
    #[must_use]
    pub const fn from_bytes(bytes: u32) -> Option<Self> {
        match bytes {
            1 => Some(ElementSize::Byte),
            2 => Some(ElementSize::HalfWord),
            4 => Some(ElementSize::Word),
            16 => Some(ElementSize::Burst16),
            32 => Some(ElementSize::Burst32),
            _ => None,
        }
    }
}

/// Direction category of a transfer
///
/// Memory sides advance by one element per access, peripheral sides stay
/// on the peripheral's data register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferType {
    /// Memory to memory
    #[default]
    MemoryToMemory,
    /// Memory to peripheral data register
    MemoryToPeripheral,
    /// Peripheral data register to memory
    PeripheralToMemory,
    /// Peripheral data register to peripheral data register
    PeripheralToPeripheral,
}

impl TransferType {
    /// Whether the source address advances after each element
    #[must_use]
    pub const fn source_increments(self) -> bool {
        matches!(
            self,
            TransferType::MemoryToMemory | TransferType::MemoryToPeripheral
        )
    }

    /// Whether the destination address advances after each element
    #[must_use]
    pub const fn destination_increments(self) -> bool {
        matches!(
            self,
            TransferType::MemoryToMemory | TransferType::PeripheralToMemory
        )
    }
}

/// Channel arbitration policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Arbitration {
    /// Highest channel priority wins
    #[default]
    FixedPriority,
    /// Channels are serviced in turn regardless of priority
    RoundRobin,
}

/// Engine-wide configuration applied by `init`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaConfig {
    /// Channel arbitration policy
    pub arbitration: Arbitration,
    /// Halt the engine when any error is latched
    pub halt_on_error: bool,
    /// Stall new channel starts while the CPU is in debug mode
    pub debug_halt: bool,
}

impl Default for DmaConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DmaConfig {
    /// Create a new configuration with defaults
    ///
    /// Fixed-priority arbitration, no halt on error, no debug halt.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arbitration: Arbitration::FixedPriority,
            halt_on_error: false,
            debug_halt: false,
        }
    }

    /// Set the arbitration policy
    #[must_use]
    pub const fn with_arbitration(mut self, arbitration: Arbitration) -> Self {
        self.arbitration = arbitration;
        self
    }

    /// Halt the engine when an error is latched
    #[must_use]
    pub const fn with_halt_on_error(mut self, enabled: bool) -> Self {
        self.halt_on_error = enabled;
        self
    }

    /// Stall new channel starts in debug mode
    #[must_use]
    pub const fn with_debug_halt(mut self, enabled: bool) -> Self {
        self.debug_halt = enabled;
        self
    }
}

/// Configuration for one channel transfer
///
/// Fields map one-to-one onto the channel's transfer control descriptor.
/// Build with [`TransferConfig::new`] and the `with_*` methods, or derive
/// a complete configuration with [`TransferConfig::prepare`] or
/// [`TransferConfig::memory_to_memory`].
///
/// # Example
///
/// ```ignore
/// // Stream a 64-byte buffer into UART0's data register, one byte per request
/// let config = TransferConfig::prepare(
///     2,
///     RequestSource::UART0_TX,
///     TransferType::MemoryToPeripheral,
///     ElementSize::Byte,
///     buffer.as_ptr() as u32,
///     UART0_D,
///     64,
/// )
/// .with_priority(4)
/// .with_interrupt(true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferConfig {
    /// Channel number
    pub channel: usize,
    /// Request source routed to the channel
    pub source: RequestSource,
    /// Transfer direction category
    pub transfer_type: TransferType,
    /// Element size for reads and writes
    pub element_size: ElementSize,
    /// Arbitration priority (0-15, 15 highest)
    ///
    /// `None` keeps the channel's current priority. In fixed-priority mode
    /// every channel needs a distinct priority, which `init` establishes.
    pub priority: Option<u8>,
    /// Source address
    pub source_address: u32,
    /// Signed source stride applied after each element
    pub source_offset: i16,
    /// Signed source adjustment applied after the major loop
    pub source_last_adjust: i32,
    /// Destination address
    pub destination_address: u32,
    /// Signed destination stride applied after each element
    pub destination_offset: i16,
    /// Signed destination adjustment applied after the major loop
    ///
    /// Holds the next descriptor's address when scatter-gather is enabled.
    pub destination_last_adjust: i32,
    /// Bytes moved per minor loop
    pub minor_loop_bytes: u32,
    /// Major loop iteration count
    pub major_loop_count: u16,
    /// Raise an interrupt on major loop completion
    pub interrupt_enable: bool,
    /// Disable the request line on major loop completion
    pub disable_request_after_done: bool,
    /// Load the next descriptor from `destination_last_adjust` on completion
    pub scatter_gather: bool,
    /// Start this channel on major loop completion
    pub major_link: Option<u8>,
}

impl TransferConfig {
    /// Create a configuration for `channel` with every other field neutral
    ///
    /// The result moves one 32-bit word once and does not increment either
    /// address; set the fields you need with the `with_*` methods.
    #[must_use]
    pub const fn new(channel: usize) -> Self {
        Self {
            channel,
            source: RequestSource::DISABLED,
            transfer_type: TransferType::MemoryToMemory,
            element_size: ElementSize::Word,
            priority: None,
            source_address: 0,
            source_offset: 0,
            source_last_adjust: 0,
            destination_address: 0,
            destination_offset: 0,
            destination_last_adjust: 0,
            minor_loop_bytes: 4,
            major_loop_count: 1,
            interrupt_enable: false,
            disable_request_after_done: true,
            scatter_gather: false,
            major_link: None,
        }
    }

    /// Derive a complete configuration for moving `length` bytes
    ///
    /// Each request moves one element. Memory sides advance by the element
    /// size and are rewound after the major loop so the channel can be
    /// restarted on the same buffers; peripheral sides stay fixed.
    ///
    /// A `length` that is not a whole number of elements, or that needs
    /// more than 0x7FFF elements, yields a configuration that fails
    /// validation in `configure`.
    #[must_use]
    pub const fn prepare(
        channel: usize,
        source: RequestSource,
        transfer_type: TransferType,
        element_size: ElementSize,
        source_address: u32,
        destination_address: u32,
        length: u32,
    ) -> Self {
        let bytes = element_size.bytes();
        let count = length / bytes;
        let major_loop_count = if length % bytes == 0 && count <= MAX_MAJOR_ITERATIONS as u32 {
            count as u16
        } else {
            0
        };

        let (source_offset, source_last_adjust) = if transfer_type.source_increments() {
            (bytes as i16, (length as i32).wrapping_neg())
        } else {
            (0, 0)
        };
        let (destination_offset, destination_last_adjust) =
            if transfer_type.destination_increments() {
                (bytes as i16, (length as i32).wrapping_neg())
            } else {
                (0, 0)
            };

        Self {
            channel,
            source,
            transfer_type,
            element_size,
            priority: None,
            source_address,
            source_offset,
            source_last_adjust,
            destination_address,
            destination_offset,
            destination_last_adjust,
            minor_loop_bytes: bytes,
            major_loop_count,
            interrupt_enable: false,
            disable_request_after_done: true,
            scatter_gather: false,
            major_link: None,
        }
    }

    /// Derive a software-triggered memory-to-memory copy of `length` bytes
    ///
    /// Uses the first always-on request slot.
    #[must_use]
    pub const fn memory_to_memory(
        channel: usize,
        source_address: u32,
        destination_address: u32,
        length: u32,
        element_size: ElementSize,
    ) -> Self {
        Self::prepare(
            channel,
            RequestSource::ALWAYS_ON_0,
            TransferType::MemoryToMemory,
            element_size,
            source_address,
            destination_address,
            length,
        )
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the request source
    #[must_use]
    pub const fn with_source(mut self, source: RequestSource) -> Self {
        self.source = source;
        self
    }

    /// Set the transfer category
    #[must_use]
    pub const fn with_transfer_type(mut self, transfer_type: TransferType) -> Self {
        self.transfer_type = transfer_type;
        self
    }

    /// Set the element size
    #[must_use]
    pub const fn with_element_size(mut self, element_size: ElementSize) -> Self {
        self.element_size = element_size;
        self
    }

    /// Set the arbitration priority (0-15)
    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the source address, stride and end adjustment
    #[must_use]
    pub const fn with_source_address(mut self, address: u32, offset: i16, last_adjust: i32) -> Self {
        self.source_address = address;
        self.source_offset = offset;
        self.source_last_adjust = last_adjust;
        self
    }

    /// Set the destination address, stride and end adjustment
    #[must_use]
    pub const fn with_destination_address(
        mut self,
        address: u32,
        offset: i16,
        last_adjust: i32,
    ) -> Self {
        self.destination_address = address;
        self.destination_offset = offset;
        self.destination_last_adjust = last_adjust;
        self
    }

    /// Set the minor loop byte count and major loop iteration count
    #[must_use]
    pub const fn with_loops(mut self, minor_loop_bytes: u32, major_loop_count: u16) -> Self {
        self.minor_loop_bytes = minor_loop_bytes;
        self.major_loop_count = major_loop_count;
        self
    }

    /// Enable or disable the major loop completion interrupt
    #[must_use]
    pub const fn with_interrupt(mut self, enabled: bool) -> Self {
        self.interrupt_enable = enabled;
        self
    }

    /// Enable or disable clearing the request line on completion
    #[must_use]
    pub const fn with_disable_request_after_done(mut self, enabled: bool) -> Self {
        self.disable_request_after_done = enabled;
        self
    }

    /// Enable scatter-gather, loading the descriptor at `next_descriptor`
    /// on completion
    #[must_use]
    pub const fn with_scatter_gather(mut self, next_descriptor: u32) -> Self {
        self.scatter_gather = true;
        self.destination_last_adjust = next_descriptor as i32;
        self
    }

    /// Start `channel` when this transfer's major loop completes
    #[must_use]
    pub const fn with_major_link(mut self, channel: u8) -> Self {
        self.major_link = Some(channel);
        self
    }

    // =========================================================================
    // Validation and Encoding
    // =========================================================================

    /// Check the configuration against an engine with `channels` channels
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidChannel`] for a channel or link target out of range
    /// - [`ConfigError::InvalidPriority`] for a priority above 15
    /// - [`ConfigError::InvalidMinorLoop`] for a zero or partial-element minor loop
    /// - [`ConfigError::InvalidIterationCount`] for a zero or oversized major count
    /// - [`ConfigError::MisalignedAddress`] for addresses not aligned to the element
    /// - [`ConfigError::MisalignedOffset`] for strides or adjustments that would
    ///   misalign a later access
    pub fn validate(&self, channels: usize) -> ConfigResult<()> {
        if self.channel >= channels {
            return Err(ConfigError::InvalidChannel);
        }
        if let Some(link) = self.major_link
            && link as usize >= channels
        {
            return Err(ConfigError::InvalidChannel);
        }
        if let Some(priority) = self.priority
            && priority > MAX_PRIORITY
        {
            return Err(ConfigError::InvalidPriority);
        }

        let bytes = self.element_size.bytes();
        if self.minor_loop_bytes == 0 || self.minor_loop_bytes % bytes != 0 {
            return Err(ConfigError::InvalidMinorLoop);
        }
        if self.major_loop_count == 0 || self.major_loop_count > MAX_MAJOR_ITERATIONS {
            return Err(ConfigError::InvalidIterationCount);
        }

        if self.source_address % bytes != 0 || self.destination_address % bytes != 0 {
            return Err(ConfigError::MisalignedAddress);
        }

        let stride = bytes as i32;
        if self.source_offset as i32 % stride != 0
            || self.destination_offset as i32 % stride != 0
            || self.source_last_adjust % stride != 0
        {
            return Err(ConfigError::MisalignedOffset);
        }
        if self.scatter_gather {
            // Next descriptor must sit on a TCD boundary
            if self.destination_last_adjust as u32 % 32 != 0 {
                return Err(ConfigError::MisalignedAddress);
            }
        } else if self.destination_last_adjust % stride != 0 {
            return Err(ConfigError::MisalignedOffset);
        }

        Ok(())
    }

    /// Control/status bits requested by this configuration
    #[must_use]
    pub const fn control_bits(&self) -> u16 {
        let mut control = 0;
        if self.interrupt_enable {
            control |= csr::INTMAJOR;
        }
        if self.disable_request_after_done {
            control |= csr::DREQ;
        }
        if self.scatter_gather {
            control |= csr::ESG;
        }
        if let Some(link) = self.major_link {
            control |= csr::MAJORELINK
                | (((link as u16) << csr::MAJORLINKCH_SHIFT) & csr::MAJORLINKCH_MASK);
        }
        control
    }

    /// Descriptor image for this configuration
    ///
    /// The current iteration count starts equal to the initial count.
    #[must_use]
    pub const fn descriptor(&self) -> TransferDescriptor {
        TransferDescriptor {
            source: self.source_address,
            source_offset: self.source_offset,
            source_last_adjust: self.source_last_adjust,
            destination: self.destination_address,
            destination_offset: self.destination_offset,
            destination_last_adjust: self.destination_last_adjust,
            element_size: self.element_size,
            minor_loop_bytes: self.minor_loop_bytes,
            current_iterations: self.major_loop_count,
            initial_iterations: self.major_loop_count,
            control: self.control_bits(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
