//! Transfer Control Descriptor
//!
//! A [`TransferDescriptor`] is the software image of the eight-word TCD the
//! controller executes for one channel. The engine builds it from a
//! [`TransferConfig`](crate::driver::config::TransferConfig), encodes it into
//! the channel's TCD slot, and decodes it back when reporting state. The
//! hardware mutates the current iteration count and the ACTIVE/DONE bits
//! while the channel runs.

pub mod bits;

use self::bits::{attr, csr, iter};
use crate::driver::config::ElementSize;
use crate::internal::register::edma::TCD_WORDS;

/// Software image of one channel's transfer control descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferDescriptor {
    /// Source address
    pub source: u32,
    /// Signed source stride, applied after every element read
    pub source_offset: i16,
    /// Signed adjustment applied to the source address after the major loop
    pub source_last_adjust: i32,
    /// Destination address
    pub destination: u32,
    /// Signed destination stride, applied after every element write
    pub destination_offset: i16,
    /// Signed adjustment applied to the destination address after the
    /// major loop (scatter-gather address when ESG is set)
    pub destination_last_adjust: i32,
    /// Element size for both source reads and destination writes
    pub element_size: ElementSize,
    /// Bytes moved per minor loop
    pub minor_loop_bytes: u32,
    /// Current major iteration count (counted down by hardware)
    pub current_iterations: u16,
    /// Beginning major iteration count (reloaded on completion)
    pub initial_iterations: u16,
    /// Control and status flags ([`bits::csr`])
    pub control: u16,
}

impl Default for TransferDescriptor {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl TransferDescriptor {
    /// An all-zero descriptor, as left by reset
    pub const EMPTY: Self = Self {
        source: 0,
        source_offset: 0,
        source_last_adjust: 0,
        destination: 0,
        destination_offset: 0,
        destination_last_adjust: 0,
        element_size: ElementSize::Byte,
        minor_loop_bytes: 0,
        current_iterations: 0,
        initial_iterations: 0,
        control: 0,
    };

    /// Encode into the eight TCD words in register order
    #[must_use]
    pub fn encode(&self) -> [u32; TCD_WORDS] {
        let code = self.element_size.attr_code() as u16;
        let attributes = (code << attr::SSIZE_SHIFT) | (code << attr::DSIZE_SHIFT);
        [
            self.source,
            (self.source_offset as u16 as u32) | ((attributes as u32) << 16),
            self.minor_loop_bytes,
            self.source_last_adjust as u32,
            self.destination,
            (self.destination_offset as u16 as u32)
                | (((self.current_iterations & iter::COUNT_MASK) as u32) << 16),
            self.destination_last_adjust as u32,
            (self.control as u32) | (((self.initial_iterations & iter::COUNT_MASK) as u32) << 16),
        ]
    }

    /// Decode from the eight TCD words
    ///
    /// Returns `None` when the source size field holds a reserved code.
    #[must_use]
    pub fn decode(words: &[u32; TCD_WORDS]) -> Option<Self> {
        let attributes = (words[1] >> 16) as u16;
        let code = ((attributes & attr::SSIZE_MASK) >> attr::SSIZE_SHIFT) as u8;
        let element_size = ElementSize::from_attr_code(code)?;

        Some(Self {
            source: words[0],
            source_offset: words[1] as u16 as i16,
            source_last_adjust: words[3] as i32,
            destination: words[4],
            destination_offset: words[5] as u16 as i16,
            destination_last_adjust: words[6] as i32,
            element_size,
            minor_loop_bytes: words[2],
            current_iterations: (words[5] >> 16) as u16 & iter::COUNT_MASK,
            initial_iterations: (words[7] >> 16) as u16 & iter::COUNT_MASK,
            control: words[7] as u16,
        })
    }

    /// Whether an interrupt is raised on major loop completion
    #[inline(always)]
    pub const fn interrupt_on_major(&self) -> bool {
        self.control & csr::INTMAJOR != 0
    }

    /// Whether the request line is disabled on major loop completion
    #[inline(always)]
    pub const fn disable_request_on_done(&self) -> bool {
        self.control & csr::DREQ != 0
    }

    /// Whether scatter-gather processing is enabled
    #[inline(always)]
    pub const fn scatter_gather(&self) -> bool {
        self.control & csr::ESG != 0
    }

    /// Channel started on major loop completion, if linking is enabled
    #[inline(always)]
    pub const fn major_link(&self) -> Option<u8> {
        if self.control & csr::MAJORELINK != 0 {
            Some(((self.control & csr::MAJORLINKCH_MASK) >> csr::MAJORLINKCH_SHIFT) as u8)
        } else {
            None
        }
    }

    /// Whether the hardware reports the channel as executing
    #[inline(always)]
    pub const fn is_active(&self) -> bool {
        self.control & csr::ACTIVE != 0
    }

    /// Whether the hardware reports the major loop as complete
    #[inline(always)]
    pub const fn is_done(&self) -> bool {
        self.control & csr::DONE != 0
    }

    /// Total bytes moved by one full major loop
    #[inline(always)]
    pub const fn total_bytes(&self) -> u64 {
        self.minor_loop_bytes as u64 * self.initial_iterations as u64
    }
}
