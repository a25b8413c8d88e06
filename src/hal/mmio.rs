//! Register access backends
//!
//! The engine never dereferences a register address itself. Every access
//! goes through a [`DmaHardware`] implementation, addressed by register
//! block and byte offset. [`Mmio`] is the backend for real silicon; host
//! tests substitute a simulator.

/// Register blocks driven by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterBlock {
    /// Arbiter, status registers, priorities and transfer control descriptors
    Controller,
    /// Request router (channel multiplexer)
    Router,
}

/// Trait for register access to the DMA controller and request router
///
/// This trait can be implemented by different backends, allowing the
/// engine to run against memory-mapped hardware or a simulation.
///
/// Implementations must treat every call as a single bus access of the
/// stated width: reads and writes are not cached, merged, widened or
/// reordered. The byte-wide command and priority registers rely on this.
pub trait DmaHardware {
    /// Read the 32-bit register at `offset` bytes into `block`
    fn read(&self, block: RegisterBlock, offset: usize) -> u32;

    /// Write `value` to the 32-bit register at `offset` bytes into `block`
    fn write(&self, block: RegisterBlock, offset: usize, value: u32);

    /// Read the 8-bit register at `offset` bytes into `block`
    fn read8(&self, block: RegisterBlock, offset: usize) -> u8;

    /// Write `value` to the 8-bit register at `offset` bytes into `block`
    fn write8(&self, block: RegisterBlock, offset: usize, value: u8);

    /// Modify a register using a read-modify-write operation
    #[inline(always)]
    fn modify<F>(&self, block: RegisterBlock, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
        Self: Sized,
    {
        let value = self.read(block, offset);
        self.write(block, offset, f(value));
    }

    /// Set bits in a register (read-modify-write)
    #[inline(always)]
    fn set_bits(&self, block: RegisterBlock, offset: usize, bits: u32) {
        let value = self.read(block, offset);
        self.write(block, offset, value | bits);
    }

    /// Clear bits in a register (read-modify-write)
    #[inline(always)]
    fn clear_bits(&self, block: RegisterBlock, offset: usize, bits: u32) {
        let value = self.read(block, offset);
        self.write(block, offset, value & !bits);
    }
}

impl<T: DmaHardware + ?Sized> DmaHardware for &T {
    #[inline(always)]
    fn read(&self, block: RegisterBlock, offset: usize) -> u32 {
        (**self).read(block, offset)
    }

    #[inline(always)]
    fn write(&self, block: RegisterBlock, offset: usize, value: u32) {
        (**self).write(block, offset, value);
    }

    #[inline(always)]
    fn read8(&self, block: RegisterBlock, offset: usize) -> u8 {
        (**self).read8(block, offset)
    }

    #[inline(always)]
    fn write8(&self, block: RegisterBlock, offset: usize, value: u8) {
        (**self).write8(block, offset, value);
    }
}

/// Memory-mapped register backend
///
/// Holds the base addresses of the controller and router register blocks.
/// All accesses are volatile.
///
/// # Example
///
/// ```ignore
/// // Addresses come from the target's reference manual
/// let hw = unsafe { Mmio::new(0x4000_8000, 0x4002_1000) };
/// let mut dma: DmaEngine<Mmio, ExternalClocks> = DmaEngine::new(hw, ExternalClocks);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mmio {
    controller_base: usize,
    router_base: usize,
}

impl Mmio {
    /// Create a backend for the register blocks at the given base addresses
    ///
    /// # Safety
    ///
    /// Both addresses must point at the start of the respective register
    /// block, be 4-byte aligned, and stay mapped for the lifetime of the
    /// backend. Only one engine may drive a given controller.
    #[must_use]
    pub const unsafe fn new(controller_base: usize, router_base: usize) -> Self {
        Self {
            controller_base,
            router_base,
        }
    }

    /// Base address of the controller register block
    #[inline(always)]
    pub const fn controller_base(&self) -> usize {
        self.controller_base
    }

    /// Base address of the router register block
    #[inline(always)]
    pub const fn router_base(&self) -> usize {
        self.router_base
    }

    #[inline(always)]
    const fn address(&self, block: RegisterBlock, offset: usize) -> usize {
        match block {
            RegisterBlock::Controller => self.controller_base + offset,
            RegisterBlock::Router => self.router_base + offset,
        }
    }
}

impl DmaHardware for Mmio {
    #[inline(always)]
    fn read(&self, block: RegisterBlock, offset: usize) -> u32 {
        // SAFETY: `Mmio::new` requires valid, aligned, mapped base addresses
        unsafe { core::ptr::read_volatile(self.address(block, offset) as *const u32) }
    }

    #[inline(always)]
    fn write(&self, block: RegisterBlock, offset: usize, value: u32) {
        // SAFETY: `Mmio::new` requires valid, aligned, mapped base addresses
        unsafe { core::ptr::write_volatile(self.address(block, offset) as *mut u32, value) }
    }

    #[inline(always)]
    fn read8(&self, block: RegisterBlock, offset: usize) -> u8 {
        // SAFETY: `Mmio::new` requires valid, mapped base addresses
        unsafe { core::ptr::read_volatile(self.address(block, offset) as *const u8) }
    }

    #[inline(always)]
    fn write8(&self, block: RegisterBlock, offset: usize, value: u8) {
        // SAFETY: `Mmio::new` requires valid, mapped base addresses
        unsafe { core::ptr::write_volatile(self.address(block, offset) as *mut u8, value) }
    }
}
