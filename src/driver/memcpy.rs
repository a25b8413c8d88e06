//! Blocking memory-to-memory copy.
//!
//! These helpers drive one channel through configure, start and a bounded
//! wait for DONE. [`DmaEngine::mem_copy`] bounds the wait by a fixed number
//! of status polls; [`DmaEngine::mem_copy_with_timeout`] bounds it in
//! wall-clock time using a `DelayNs` provider.
//!
//! Both copy whole 32-bit words and disable the channel's interrupt, so a
//! completion is never also dispatched to a callback. The awaitable
//! variant lives in `sync::asynch`.

use embedded_hal::delay::DelayNs;

use super::config::{ElementSize, TransferConfig};
use super::engine::DmaEngine;
use super::error::{ConfigError, IoError, Result};
use crate::hal::clock::ClockGate;
use crate::hal::mmio::DmaHardware;
use crate::internal::constants::{
    DONE_POLL_INTERVAL_US, MAX_MAJOR_ITERATIONS, MEMCOPY_ELEMENT_BYTES, MEMCOPY_POLL_BUDGET,
};

impl<H: DmaHardware, G: ClockGate, const CHANNELS: usize> DmaEngine<H, G, CHANNELS> {
    /// Copy `size` bytes from `source` to `destination`, polling for completion
    ///
    /// `size` must be a positive multiple of 4 and both addresses must be
    /// 4-byte aligned. Polls DONE at most `MEMCOPY_POLL_BUDGET` times; the
    /// real duration of that budget depends on the core clock.
    ///
    /// On success DONE is cleared again. On timeout the channel is stopped
    /// and the destination may be partially written.
    ///
    /// # Safety
    ///
    /// `source` and `destination` must be bus addresses of `size` bytes of
    /// readable and writable memory respectively, must not overlap, and
    /// must stay valid until this call returns.
    ///
    /// # Errors
    /// - `InvalidChannel` / `NotInitialized` - as for every channel operation
    /// - `InvalidLength` - `size` zero, not a multiple of 4, or too large
    /// - `MisalignedAddress` - an address not 4-byte aligned
    /// - `Timeout` - DONE not observed within the poll budget
    pub unsafe fn mem_copy(
        &mut self,
        channel: usize,
        source: u32,
        destination: u32,
        size: usize,
    ) -> Result<()> {
        // SAFETY: forwarded from the caller
        unsafe { self.start_copy(channel, source, destination, size, false)? };

        for _ in 0..MEMCOPY_POLL_BUDGET {
            if self.is_done(channel) {
                return self.clear_done(channel);
            }
        }

        self.copy_timed_out(channel)
    }

    /// Copy `size` bytes from `source` to `destination`, waiting at most
    /// `timeout_us` microseconds
    ///
    /// Same contract as [`mem_copy`](Self::mem_copy), with the wait bounded
    /// by `delay` instead of a poll count.
    ///
    /// # Safety
    ///
    /// Same contract as [`mem_copy`](Self::mem_copy).
    pub unsafe fn mem_copy_with_timeout<D: DelayNs>(
        &mut self,
        channel: usize,
        source: u32,
        destination: u32,
        size: usize,
        delay: D,
        timeout_us: u32,
    ) -> Result<()> {
        // SAFETY: forwarded from the caller
        unsafe { self.start_copy(channel, source, destination, size, false)? };

        match self.wait_done_timeout(channel, delay, timeout_us) {
            Ok(()) => self.clear_done(channel),
            Err(_) => self.copy_timed_out(channel),
        }
    }

    /// Wait for a channel's DONE flag, at most `timeout_us` microseconds
    ///
    /// DONE is left set for the caller to clear or dispatch.
    ///
    /// # Errors
    /// - `Timeout` - DONE not observed in time
    pub fn wait_done_timeout<D: DelayNs>(
        &self,
        channel: usize,
        mut delay: D,
        timeout_us: u32,
    ) -> Result<()> {
        self.check_channel(channel)?;

        let max_iterations = (timeout_us / DONE_POLL_INTERVAL_US).max(1);
        for _ in 0..max_iterations {
            if self.is_done(channel) {
                return Ok(());
            }
            delay.delay_us(DONE_POLL_INTERVAL_US);
        }

        if self.is_done(channel) {
            Ok(())
        } else {
            Err(IoError::Timeout.into())
        }
    }

    /// Validate, configure and start a word-sized copy
    ///
    /// `interrupt` selects whether the channel raises its completion
    /// interrupt.
    ///
    /// # Safety
    ///
    /// Same contract as [`mem_copy`](Self::mem_copy).
    pub(crate) unsafe fn start_copy(
        &mut self,
        channel: usize,
        source: u32,
        destination: u32,
        size: usize,
        interrupt: bool,
    ) -> Result<()> {
        self.check_channel(channel)?;

        let elements = size / MEMCOPY_ELEMENT_BYTES;
        if size == 0 || size % MEMCOPY_ELEMENT_BYTES != 0 || elements > MAX_MAJOR_ITERATIONS as usize
        {
            return Err(ConfigError::InvalidLength.into());
        }

        let config = TransferConfig::memory_to_memory(
            channel,
            source,
            destination,
            size as u32,
            ElementSize::Word,
        )
        .with_interrupt(interrupt)
        .with_disable_request_after_done(true);
        self.configure(&config)?;

        // SAFETY: forwarded from the caller
        unsafe { self.start(channel) }
    }

    fn copy_timed_out(&mut self, channel: usize) -> Result<()> {
        self.stop(channel)?;

        #[cfg(feature = "log")]
        log::warn!("eDMA channel {} copy timed out", channel);

        Err(IoError::Timeout.into())
    }
}
