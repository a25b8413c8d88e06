//! Request Router (DMAMUX) Register Definitions
//!
//! One 32-bit channel configuration register per DMA channel selects which
//! request source drives that channel.

#![allow(dead_code)]

use crate::hal::mmio::{DmaHardware, RegisterBlock};

// =============================================================================
// Channel Configuration Register (CHCFG) Bits
// =============================================================================

/// DMA Channel Enable
pub const CHCFG_ENBL: u32 = 1 << 31;
/// DMA Channel Trigger Enable (periodic trigger mode)
pub const CHCFG_TRIG: u32 = 1 << 30;
/// DMA Channel Source (slot) number mask
pub const CHCFG_SOURCE_MASK: u32 = 0x3F;

/// Byte offset of a channel's configuration register
#[inline(always)]
pub const fn chcfg_offset(channel: usize) -> usize {
    channel * 4
}

// =============================================================================
// Register View
// =============================================================================

/// Typed view over the request router register block
pub struct MuxRegs<'a, H: DmaHardware + ?Sized> {
    hw: &'a H,
}

impl<'a, H: DmaHardware + ?Sized> MuxRegs<'a, H> {
    const BLOCK: RegisterBlock = RegisterBlock::Router;

    /// Create a view over `hw`
    #[inline(always)]
    pub fn new(hw: &'a H) -> Self {
        Self { hw }
    }

    /// Read a channel's configuration register
    #[inline(always)]
    pub fn chcfg(&self, channel: usize) -> u32 {
        self.hw.read(Self::BLOCK, chcfg_offset(channel))
    }

    /// Write a channel's configuration register
    #[inline(always)]
    pub fn set_chcfg(&self, channel: usize, value: u32) {
        self.hw.write(Self::BLOCK, chcfg_offset(channel), value);
    }

    /// Source slot currently selected for a channel
    #[inline(always)]
    pub fn source(&self, channel: usize) -> u8 {
        (self.chcfg(channel) & CHCFG_SOURCE_MASK) as u8
    }

    /// Whether a channel's routing is enabled
    #[inline(always)]
    pub fn is_enabled(&self, channel: usize) -> bool {
        self.chcfg(channel) & CHCFG_ENBL != 0
    }
}
