//! Register definitions for the DMA controller and request router
//!
//! This module provides typed views over the two register blocks the engine
//! drives. All access goes through a [`DmaHardware`] backend so the same
//! sequences run against memory-mapped silicon or the host simulator.
//!
//! [`DmaHardware`]: crate::hal::mmio::DmaHardware

pub mod dmamux;
pub mod edma;

// =============================================================================
// Register Access Macros
// =============================================================================

/// Generate read/write accessor methods for a register.
///
/// # Example
/// ```ignore
/// impl<H: DmaHardware> EdmaRegs<'_, H> {
///     reg_rw!(cr, set_cr, CR_OFFSET, "Control register");
/// }
/// ```
macro_rules! reg_rw {
    ($read_fn:ident, $write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.hw.read(Self::BLOCK, $offset)
        }

        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(&self, value: u32) {
            self.hw.write(Self::BLOCK, $offset, value);
        }
    };
}

/// Generate a read-only accessor method for a register.
macro_rules! reg_ro {
    ($read_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.hw.read(Self::BLOCK, $offset)
        }
    };
}

/// Generate single-channel and all-channel writers for a command register.
///
/// Command registers are byte-wide. They take the channel number in bits
/// 4:0 and act on every channel when bit 6 is set.
///
/// # Example
/// ```ignore
/// impl<H: DmaHardware> EdmaRegs<'_, H> {
///     reg_cmd!(clear_request, clear_all_requests, CERQ_OFFSET,
///              "Clear the request enable");
/// }
/// ```
macro_rules! reg_cmd {
    ($one_fn:ident, $all_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!($doc, " of one channel")]
        #[inline(always)]
        pub fn $one_fn(&self, channel: usize) {
            self.hw.write8(
                Self::BLOCK,
                $offset,
                (channel as u8) & $crate::internal::register::edma::CMD_CHANNEL_MASK,
            );
        }

        #[doc = concat!($doc, " of every channel")]
        #[inline(always)]
        pub fn $all_fn(&self) {
            self.hw.write8(
                Self::BLOCK,
                $offset,
                $crate::internal::register::edma::CMD_ALL,
            );
        }
    };
}

// Export macros for use in submodules
pub(crate) use reg_cmd;
pub(crate) use reg_ro;
pub(crate) use reg_rw;
