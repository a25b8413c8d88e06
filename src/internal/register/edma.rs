//! DMA Controller Register Definitions
//!
//! The controller block holds the global control and error status
//! registers, the per-channel request/interrupt/error bitmaps, the write-only
//! command registers, the channel priority registers and one transfer
//! control descriptor (TCD) per channel.
//!
//! The status and bitmap registers are 32-bit words. The command registers
//! and the channel priority registers are single bytes and must be accessed
//! with byte-wide bus cycles.

#![allow(dead_code)]

use super::{reg_cmd, reg_ro, reg_rw};
use crate::hal::mmio::{DmaHardware, RegisterBlock};

// =============================================================================
// Register Offsets
// =============================================================================

/// Control Register offset
pub const CR_OFFSET: usize = 0x000;
/// Error Status Register offset (read-only)
pub const ES_OFFSET: usize = 0x004;
/// Enable Request Register offset
pub const ERQ_OFFSET: usize = 0x00C;
/// Enable Error Interrupt Register offset
pub const EEI_OFFSET: usize = 0x014;
/// Clear Enable Error Interrupt command offset (byte, write-only)
pub const CEEI_OFFSET: usize = 0x018;
/// Set Enable Error Interrupt command offset (byte, write-only)
pub const SEEI_OFFSET: usize = 0x019;
/// Clear Enable Request command offset (byte, write-only)
pub const CERQ_OFFSET: usize = 0x01A;
/// Set Enable Request command offset (byte, write-only)
pub const SERQ_OFFSET: usize = 0x01B;
/// Clear DONE Status command offset (byte, write-only)
pub const CDNE_OFFSET: usize = 0x01C;
/// Set START Bit command offset (byte, write-only)
pub const SSRT_OFFSET: usize = 0x01D;
/// Clear Error command offset (byte, write-only)
pub const CERR_OFFSET: usize = 0x01E;
/// Clear Interrupt Request command offset (byte, write-only)
pub const CINT_OFFSET: usize = 0x01F;
/// Interrupt Request Register offset (write 1 to clear)
pub const INT_OFFSET: usize = 0x024;
/// Error Register offset (write 1 to clear)
pub const ERR_OFFSET: usize = 0x02C;
/// Hardware Request Status Register offset (read-only)
pub const HRS_OFFSET: usize = 0x034;
/// Enable Asynchronous Request in Stop Register offset
pub const EARS_OFFSET: usize = 0x044;
/// Channel Priority Register array offset (one byte per channel)
pub const DCHPRI_OFFSET: usize = 0x100;
/// Transfer Control Descriptor array offset
pub const TCD_OFFSET: usize = 0x1000;
/// Size of one Transfer Control Descriptor in bytes
pub const TCD_STRIDE: usize = 0x20;
/// Number of 32-bit words in one Transfer Control Descriptor
pub const TCD_WORDS: usize = 8;

// =============================================================================
// TCD Word Offsets (relative to the channel's TCD)
// =============================================================================

/// Source address
pub const TCD_SADDR: usize = 0x00;
/// Source offset (15:0) and transfer attributes (31:16)
pub const TCD_SOFF_ATTR: usize = 0x04;
/// Minor loop byte count
pub const TCD_NBYTES: usize = 0x08;
/// Last source address adjustment
pub const TCD_SLAST: usize = 0x0C;
/// Destination address
pub const TCD_DADDR: usize = 0x10;
/// Destination offset (15:0) and current major iteration count (31:16)
pub const TCD_DOFF_CITER: usize = 0x14;
/// Last destination address adjustment / scatter-gather address
pub const TCD_DLAST_SGA: usize = 0x18;
/// Control and status (15:0) and beginning major iteration count (31:16)
pub const TCD_CSR_BITER: usize = 0x1C;

// =============================================================================
// Control Register (CR) Bits
// =============================================================================

/// Enable Debug: stall new channel starts while the CPU is halted
pub const CR_EDBG: u32 = 1 << 1;
/// Enable Round Robin Channel Arbitration (0 = fixed priority)
pub const CR_ERCA: u32 = 1 << 2;
/// Halt On Error: any error sets HALT
pub const CR_HOE: u32 = 1 << 4;
/// Halt DMA Operations: no new channels are started
pub const CR_HALT: u32 = 1 << 5;
/// Continuous Link Mode
pub const CR_CLM: u32 = 1 << 6;
/// Enable Minor Loop Mapping
pub const CR_EMLM: u32 = 1 << 7;
/// Error Cancel Transfer: cancel the active channel and report an error
pub const CR_ECX: u32 = 1 << 16;
/// Cancel Transfer: cancel the active channel without error
pub const CR_CX: u32 = 1 << 17;

// =============================================================================
// Error Status Register (ES) Bits
// =============================================================================

/// Destination Bus Error
pub const ES_DBE: u32 = 1 << 0;
/// Source Bus Error
pub const ES_SBE: u32 = 1 << 1;
/// Scatter/Gather Configuration Error
pub const ES_SGE: u32 = 1 << 2;
/// NBYTES/CITER Configuration Error
pub const ES_NCE: u32 = 1 << 3;
/// Destination Offset Error
pub const ES_DOE: u32 = 1 << 4;
/// Destination Address Error
pub const ES_DAE: u32 = 1 << 5;
/// Source Offset Error
pub const ES_SOE: u32 = 1 << 6;
/// Source Address Error
pub const ES_SAE: u32 = 1 << 7;
/// Error Channel Number shift
pub const ES_ERRCHN_SHIFT: u32 = 8;
/// Error Channel Number mask
pub const ES_ERRCHN_MASK: u32 = 0x1F << 8;
/// Channel Priority Error
pub const ES_CPE: u32 = 1 << 14;
/// Transfer Canceled
pub const ES_ECX: u32 = 1 << 16;
/// Logical OR of all ERR status bits
pub const ES_VLD: u32 = 1 << 31;

/// All error cause bits (excluding channel number and VLD)
pub const ES_ALL_CAUSES: u32 = ES_DBE
    | ES_SBE
    | ES_SGE
    | ES_NCE
    | ES_DOE
    | ES_DAE
    | ES_SOE
    | ES_SAE
    | ES_CPE
    | ES_ECX;

// =============================================================================
// Command Register Encoding (CEEI, SEEI, CERQ, SERQ, CDNE, SSRT, CERR, CINT)
// =============================================================================

/// Channel number field of a command write
pub const CMD_CHANNEL_MASK: u8 = 0x1F;
/// Apply the command to every channel
pub const CMD_ALL: u8 = 1 << 6;
/// No operation: the write is ignored
pub const CMD_NOP: u8 = 1 << 7;

// =============================================================================
// Channel Priority Register (DCHPRI) Bits
// =============================================================================

/// Channel Arbitration Priority mask
pub const DCHPRI_CHPRI_MASK: u8 = 0x0F;
/// Disable Preempt Ability: channel cannot suspend a lower priority channel
pub const DCHPRI_DPA: u8 = 1 << 6;
/// Enable Channel Preemption: channel can be suspended by a higher priority one
pub const DCHPRI_ECP: u8 = 1 << 7;

/// Byte offset of a channel's priority register
///
/// The registers are byte-reversed within each 32-bit word: channel 0 is
/// at `DCHPRI_OFFSET + 3`, channel 3 at `DCHPRI_OFFSET`.
#[inline(always)]
pub const fn dchpri_offset(channel: usize) -> usize {
    DCHPRI_OFFSET + 4 * (channel / 4) + (3 - channel % 4)
}

/// Byte offset of a word inside a channel's TCD
#[inline(always)]
pub const fn tcd_offset(channel: usize, word: usize) -> usize {
    TCD_OFFSET + channel * TCD_STRIDE + word
}

// =============================================================================
// Register View
// =============================================================================

/// Typed view over the controller register block
///
/// Borrowing the backend keeps the view cheap to create; the engine builds
/// one per operation.
pub struct EdmaRegs<'a, H: DmaHardware + ?Sized> {
    hw: &'a H,
}

impl<'a, H: DmaHardware + ?Sized> EdmaRegs<'a, H> {
    const BLOCK: RegisterBlock = RegisterBlock::Controller;

    /// Create a view over `hw`
    #[inline(always)]
    pub fn new(hw: &'a H) -> Self {
        Self { hw }
    }

    reg_rw!(cr, set_cr, CR_OFFSET, "Control register");
    reg_ro!(es, ES_OFFSET, "Error Status register");
    reg_rw!(erq, set_erq, ERQ_OFFSET, "Enable Request register");
    reg_rw!(eei, set_eei, EEI_OFFSET, "Enable Error Interrupt register");
    reg_rw!(int, set_int, INT_OFFSET, "Interrupt Request register");
    reg_rw!(err, set_err, ERR_OFFSET, "Error register");
    reg_ro!(hrs, HRS_OFFSET, "Hardware Request Status register");

    reg_cmd!(
        clear_request,
        clear_all_requests,
        CERQ_OFFSET,
        "Clear the request enable"
    );
    reg_cmd!(
        set_request,
        set_all_requests,
        SERQ_OFFSET,
        "Set the request enable"
    );
    reg_cmd!(clear_done, clear_all_done, CDNE_OFFSET, "Clear the DONE flag");
    reg_cmd!(start, start_all, SSRT_OFFSET, "Set the START bit");
    reg_cmd!(
        clear_error,
        clear_all_errors,
        CERR_OFFSET,
        "Clear the error flag"
    );
    reg_cmd!(
        clear_interrupt,
        clear_all_interrupts,
        CINT_OFFSET,
        "Clear the interrupt request"
    );
    reg_cmd!(
        disable_error_interrupt,
        disable_all_error_interrupts,
        CEEI_OFFSET,
        "Clear the error interrupt enable"
    );
    reg_cmd!(
        enable_error_interrupt,
        enable_all_error_interrupts,
        SEEI_OFFSET,
        "Set the error interrupt enable"
    );

    /// Set or clear control register bits
    #[inline(always)]
    pub fn modify_cr(&self, set: u32, clear: u32) {
        let value = self.cr();
        self.set_cr((value & !clear) | set);
    }

    /// Read a channel's priority register
    #[inline(always)]
    pub fn dchpri(&self, channel: usize) -> u8 {
        self.hw.read8(Self::BLOCK, dchpri_offset(channel))
    }

    /// Write a channel's priority register
    #[inline(always)]
    pub fn set_dchpri(&self, channel: usize, value: u8) {
        self.hw.write8(Self::BLOCK, dchpri_offset(channel), value);
    }

    /// Read one word of a channel's TCD
    #[inline(always)]
    pub fn tcd_word(&self, channel: usize, word: usize) -> u32 {
        self.hw.read(Self::BLOCK, tcd_offset(channel, word))
    }

    /// Write one word of a channel's TCD
    #[inline(always)]
    pub fn set_tcd_word(&self, channel: usize, word: usize, value: u32) {
        self.hw.write(Self::BLOCK, tcd_offset(channel, word), value);
    }

    /// Read a channel's complete TCD
    pub fn read_tcd(&self, channel: usize) -> [u32; TCD_WORDS] {
        let mut words = [0u32; TCD_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.tcd_word(channel, i * 4);
        }
        words
    }

    /// Write a channel's complete TCD
    ///
    /// The control/status word is written last so the descriptor is
    /// consistent before any START or link bit becomes visible.
    pub fn write_tcd(&self, channel: usize, words: &[u32; TCD_WORDS]) {
        for (i, word) in words.iter().enumerate() {
            self.set_tcd_word(channel, i * 4, *word);
        }
    }

    /// Zero a channel's TCD
    pub fn clear_tcd(&self, channel: usize) {
        self.write_tcd(channel, &[0u32; TCD_WORDS]);
    }

    /// Read the 16-bit control/status half of a channel's TCD
    #[inline(always)]
    pub fn tcd_csr(&self, channel: usize) -> u16 {
        (self.tcd_word(channel, TCD_CSR_BITER) & 0xFFFF) as u16
    }

    /// Read-modify-write the control/status half, preserving BITER
    pub fn modify_tcd_csr<F>(&self, channel: usize, f: F)
    where
        F: FnOnce(u16) -> u16,
    {
        let word = self.tcd_word(channel, TCD_CSR_BITER);
        let csr = f((word & 0xFFFF) as u16);
        self.set_tcd_word(channel, TCD_CSR_BITER, (word & 0xFFFF_0000) | csr as u32);
    }

    /// Read the current major iteration count field (upper half of DOFF/CITER)
    #[inline(always)]
    pub fn tcd_citer(&self, channel: usize) -> u16 {
        (self.tcd_word(channel, TCD_DOFF_CITER) >> 16) as u16
    }
}
