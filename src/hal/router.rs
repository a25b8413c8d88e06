//! Request Router HAL
//!
//! The request router (DMAMUX) connects one of 64 request slots to each DMA
//! channel. Slot 0 is "disabled"; the top slots are always-on pseudo-sources
//! that request continuously and are used for software-triggered transfers.
//!
//! Slot numbers are SoC-specific. The named constants on [`RequestSource`]
//! follow the common Kinetis K6x slot map; other parts can use
//! [`RequestSource::new`] with the number from their reference manual.

use crate::hal::mmio::DmaHardware;
use crate::internal::constants::{FIRST_ALWAYS_ON_SLOT, REQUEST_SLOTS};
use crate::internal::register::dmamux::{CHCFG_ENBL, CHCFG_SOURCE_MASK, CHCFG_TRIG, MuxRegs};

/// Request router slot feeding a DMA channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RequestSource(u8);

impl RequestSource {
    /// Channel disabled (no source)
    pub const DISABLED: Self = Self(0);
    /// UART0 receive
    pub const UART0_RX: Self = Self(2);
    /// UART0 transmit
    pub const UART0_TX: Self = Self(3);
    /// UART1 receive
    pub const UART1_RX: Self = Self(4);
    /// UART1 transmit
    pub const UART1_TX: Self = Self(5);
    /// UART2 receive
    pub const UART2_RX: Self = Self(6);
    /// UART2 transmit
    pub const UART2_TX: Self = Self(7);
    /// I2S0 receive
    pub const I2S0_RX: Self = Self(12);
    /// I2S0 transmit
    pub const I2S0_TX: Self = Self(13);
    /// SPI0 receive
    pub const SPI0_RX: Self = Self(14);
    /// SPI0 transmit
    pub const SPI0_TX: Self = Self(15);
    /// SPI1 receive/transmit
    pub const SPI1: Self = Self(16);
    /// I2C0
    pub const I2C0: Self = Self(18);
    /// I2C1
    pub const I2C1: Self = Self(19);
    /// FlexTimer 0 channel 0
    pub const FTM0_CH0: Self = Self(20);
    /// FlexTimer 0 channel 1
    pub const FTM0_CH1: Self = Self(21);
    /// ADC0 conversion complete
    pub const ADC0: Self = Self(40);
    /// ADC1 conversion complete
    pub const ADC1: Self = Self(41);
    /// Comparator 0
    pub const CMP0: Self = Self(42);
    /// DAC0
    pub const DAC0: Self = Self(45);
    /// Programmable delay block
    pub const PDB: Self = Self(48);
    /// Port A pin event
    pub const PORT_A: Self = Self(49);
    /// Always-on slot 0
    pub const ALWAYS_ON_0: Self = Self(58);
    /// Always-on slot 1
    pub const ALWAYS_ON_1: Self = Self(59);
    /// Always-on slot 2
    pub const ALWAYS_ON_2: Self = Self(60);
    /// Always-on slot 3
    pub const ALWAYS_ON_3: Self = Self(61);
    /// Always-on slot 4
    pub const ALWAYS_ON_4: Self = Self(62);
    /// Always-on slot 5
    pub const ALWAYS_ON_5: Self = Self(63);

    /// Create a source from a raw slot number
    ///
    /// Returns `None` if the slot does not fit the 6-bit source field.
    #[must_use]
    pub const fn new(slot: u8) -> Option<Self> {
        if slot < REQUEST_SLOTS {
            Some(Self(slot))
        } else {
            None
        }
    }

    /// Raw slot number
    #[inline(always)]
    pub const fn slot(self) -> u8 {
        self.0
    }

    /// Whether this is the "disabled" slot
    #[inline(always)]
    pub const fn is_disabled(self) -> bool {
        self.0 == 0
    }

    /// Whether this slot requests continuously (software-triggered transfers)
    #[inline(always)]
    pub const fn is_always_on(self) -> bool {
        self.0 >= FIRST_ALWAYS_ON_SLOT
    }
}

/// Request router driver
///
/// Binds request sources to channels through the channel configuration
/// registers.
pub struct RequestRouter<'a, H: DmaHardware + ?Sized> {
    regs: MuxRegs<'a, H>,
}

impl<'a, H: DmaHardware + ?Sized> RequestRouter<'a, H> {
    /// Create a router driver over `hw`
    pub fn new(hw: &'a H) -> Self {
        Self {
            regs: MuxRegs::new(hw),
        }
    }

    /// Route `source` to `channel`
    ///
    /// The channel is disabled before the new slot is selected so the old
    /// and new sources are never both connected. Binding
    /// [`RequestSource::DISABLED`] leaves the channel disabled.
    pub fn bind(&self, channel: usize, source: RequestSource) {
        self.regs.set_chcfg(channel, 0);
        if source.is_disabled() {
            return;
        }
        let slot = source.slot() as u32 & CHCFG_SOURCE_MASK;
        self.regs.set_chcfg(channel, slot);
        self.regs.set_chcfg(channel, slot | CHCFG_ENBL);
    }

    /// Route `source` to `channel` in periodic trigger mode
    ///
    /// Only meaningful on channels wired to a periodic interrupt timer.
    pub fn bind_triggered(&self, channel: usize, source: RequestSource) {
        self.bind(channel, source);
        if !source.is_disabled() {
            self.regs.set_chcfg(channel, self.regs.chcfg(channel) | CHCFG_TRIG);
        }
    }

    /// Disconnect `channel` from any source
    pub fn unbind(&self, channel: usize) {
        self.regs.set_chcfg(channel, 0);
    }

    /// Source currently routed to `channel`, if routing is enabled
    pub fn binding(&self, channel: usize) -> Option<RequestSource> {
        if self.regs.is_enabled(channel) {
            Some(RequestSource(self.regs.source(channel)))
        } else {
            None
        }
    }
}
