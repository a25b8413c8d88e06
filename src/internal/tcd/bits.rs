//! Transfer Control Descriptor bit field constants.

#![allow(dead_code)]

// =============================================================================
// CSR (TCD Word 7, bits 15:0) - Control and Status
// =============================================================================

/// TCD control/status half-word bit field constants
pub mod csr {
    /// Channel Start - request service in software; cleared when service begins
    pub const START: u16 = 1 << 0;
    /// Enable an interrupt when the major iteration count completes
    pub const INTMAJOR: u16 = 1 << 1;
    /// Enable an interrupt when the major counter is half complete
    pub const INTHALF: u16 = 1 << 2;
    /// Disable Request - clear ERQ when the major iteration count completes
    pub const DREQ: u16 = 1 << 3;
    /// Enable Scatter/Gather processing
    pub const ESG: u16 = 1 << 4;
    /// Enable channel-to-channel linking on major loop complete
    pub const MAJORELINK: u16 = 1 << 5;
    /// Channel Active - set by hardware while the channel is executing
    pub const ACTIVE: u16 = 1 << 6;
    /// Channel Done - set by hardware when the major loop completes
    pub const DONE: u16 = 1 << 7;
    /// Major Loop Link Channel Number shift
    pub const MAJORLINKCH_SHIFT: u16 = 8;
    /// Major Loop Link Channel Number mask
    pub const MAJORLINKCH_MASK: u16 = 0x1F << 8;

    /// Bits owned by hardware status rather than software control
    pub const STATUS: u16 = ACTIVE | DONE;
}

// =============================================================================
// ATTR (TCD Word 1, bits 31:16) - Transfer Attributes
// =============================================================================

/// TCD transfer attribute bit field constants
pub mod attr {
    /// Destination data transfer size shift
    pub const DSIZE_SHIFT: u16 = 0;
    /// Destination data transfer size mask
    pub const DSIZE_MASK: u16 = 0x7;
    /// Source data transfer size shift
    pub const SSIZE_SHIFT: u16 = 8;
    /// Source data transfer size mask
    pub const SSIZE_MASK: u16 = 0x7 << 8;

    /// 8-bit transfer size code
    pub const SIZE_8BIT: u8 = 0;
    /// 16-bit transfer size code
    pub const SIZE_16BIT: u8 = 1;
    /// 32-bit transfer size code
    pub const SIZE_32BIT: u8 = 2;
    /// 16-byte burst transfer size code
    pub const SIZE_16BYTE: u8 = 4;
    /// 32-byte burst transfer size code
    pub const SIZE_32BYTE: u8 = 5;
}

// =============================================================================
// CITER / BITER (TCD Words 5 and 7, bits 31:16)
// =============================================================================

/// Major iteration count field constants
pub mod iter {
    /// Iteration count mask (bit 15 is the minor-loop link enable)
    pub const COUNT_MASK: u16 = 0x7FFF;
    /// Enable channel-to-channel linking on minor loop complete
    pub const ELINK: u16 = 1 << 15;
}
