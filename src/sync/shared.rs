//! ISR-safe engine wrapper using critical sections.
//!
//! Provides [`SharedDma`], which lets thread code and interrupt handlers
//! share one [`DmaEngine`].

use super::primitives::CriticalSectionCell;
use crate::driver::engine::DmaEngine;
use crate::hal::clock::ClockGate;
use crate::hal::mmio::DmaHardware;
use crate::internal::constants::DEFAULT_CHANNELS;

/// ISR-safe engine wrapper using critical sections.
///
/// All access goes through `critical_section::with()`, disabling interrupts
/// for the duration of the closure. Completion callbacks dispatched by
/// [`on_interrupt`](Self::on_interrupt) therefore also run inside the
/// critical section and must not touch the wrapper again.
///
/// # Example
///
/// ```ignore
/// static DMA: SharedDma<Mmio, ExternalClocks> =
///     SharedDma::new(unsafe { Mmio::new(0x4000_8000, 0x4002_1000) }, ExternalClocks);
///
/// DMA.with(|dma| dma.init(DmaConfig::default())).unwrap();
///
/// #[interrupt]
/// fn DMA0() {
///     DMA.on_interrupt();
/// }
/// ```
pub struct SharedDma<H: DmaHardware, G: ClockGate, const CHANNELS: usize = DEFAULT_CHANNELS> {
    inner: CriticalSectionCell<DmaEngine<H, G, CHANNELS>>,
}

impl<H: DmaHardware, G: ClockGate, const CHANNELS: usize> SharedDma<H, G, CHANNELS> {
    /// Create a new shared engine (const, suitable for static initialization).
    pub const fn new(hw: H, gate: G) -> Self {
        Self {
            inner: CriticalSectionCell::new(DmaEngine::new(hw, gate)),
        }
    }

    /// Wrap an existing engine
    pub const fn from_engine(engine: DmaEngine<H, G, CHANNELS>) -> Self {
        Self {
            inner: CriticalSectionCell::new(engine),
        }
    }

    /// Execute a closure with exclusive access to the engine.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut DmaEngine<H, G, CHANNELS>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut DmaEngine<H, G, CHANNELS>) -> R,
    {
        self.inner.try_with(f)
    }

    /// Dispatch every pending completion interrupt
    ///
    /// Call from the controller's interrupt handler. Returns the bitmask of
    /// dispatched channels, or 0 if the engine was already borrowed.
    pub fn on_interrupt(&self) -> u32 {
        self.inner
            .try_with(|dma| dma.handle_interrupts())
            .unwrap_or(0)
    }

    /// Check if a channel's major loop has completed
    pub fn is_done(&self, channel: usize) -> bool {
        self.inner.with_ref(|dma| dma.is_done(channel))
    }
}

impl<H: DmaHardware + Default, G: ClockGate + Default, const CHANNELS: usize> Default
    for SharedDma<H, G, CHANNELS>
{
    fn default() -> Self {
        Self::new(H::default(), G::default())
    }
}
