//! Core eDMA engine implementation.
//!
//! This module contains the main [`DmaEngine`] structure and core operations:
//!
//! - Initialization and teardown
//! - Transfer configuration
//! - Start/stop control, priority and status queries
//! - Completion callbacks and interrupt dispatch
//! - Global error status
//!
//! For the blocking memory copy, see the [`memcpy`](super::memcpy) module.

use super::config::{Arbitration, DmaConfig, TransferConfig};
use super::error::{ConfigError, DmaError, Result};
use super::status::{ChannelState, ErrorStatus};
use crate::hal::clock::{ClockController, ClockGate};
use crate::hal::mmio::DmaHardware;
use crate::hal::router::{RequestRouter, RequestSource};
use crate::internal::constants::{DEFAULT_CHANNELS, MAX_CHANNELS};
use crate::internal::register::edma::{
    CR_EDBG, CR_ERCA, CR_HALT, CR_HOE, DCHPRI_CHPRI_MASK, DCHPRI_DPA, DCHPRI_ECP, EdmaRegs,
    TCD_CSR_BITER,
};
use crate::internal::tcd::TransferDescriptor;
use crate::internal::tcd::bits::{csr, iter};

/// Completion callback
///
/// Invoked from [`DmaEngine::dispatch`] with the channel number and the
/// user data registered alongside it.
pub type CompletionCallback = fn(channel: usize, user_data: usize);

// =============================================================================
// Channel Table
// =============================================================================

/// Software state kept per channel
///
/// Everything else about a channel lives in hardware registers.
#[derive(Clone, Copy)]
pub(super) struct ChannelSlot {
    /// Descriptor written by the last `configure`
    pub(super) descriptor: Option<TransferDescriptor>,
    /// Request source bound by the last `configure`
    pub(super) source: RequestSource,
    /// Registered completion callback and its user data
    pub(super) callback: Option<(CompletionCallback, usize)>,
}

impl ChannelSlot {
    const EMPTY: Self = Self {
        descriptor: None,
        source: RequestSource::DISABLED,
        callback: None,
    };
}

// =============================================================================
// DMA Engine
// =============================================================================

/// eDMA transfer engine
///
/// Owns the register backend, the clock gate and the channel table for one
/// physical controller.
///
/// # Type Parameters
/// * `H` - Register backend ([`Mmio`](crate::hal::mmio::Mmio) on hardware)
/// * `G` - Clock gate for the controller and router clock domains
/// * `CHANNELS` - Number of channels (1 to 32, default 16)
///
/// # Example
/// ```ignore
/// let hw = unsafe { Mmio::new(0x4000_8000, 0x4002_1000) };
/// let mut dma: DmaEngine<_, _> = DmaEngine::new(hw, ExternalClocks);
/// dma.init(DmaConfig::default())?;
///
/// let config = TransferConfig::memory_to_memory(0, src, dst, 64, ElementSize::Word);
/// dma.configure(&config)?;
/// unsafe { dma.start(0)? };
/// while !dma.is_done(0) {}
/// dma.clear_done(0)?;
/// ```
///
/// # Concurrency
///
/// A channel belongs to one logical user at a time. The only state shared
/// with interrupt context is the DONE flag, which both sides only ever
/// clear. Wrap the engine in [`SharedDma`](crate::sync::SharedDma) when an
/// interrupt handler dispatches completions.
pub struct DmaEngine<H: DmaHardware, G: ClockGate, const CHANNELS: usize = DEFAULT_CHANNELS> {
    /// Register backend
    pub(super) hw: H,
    /// Clock gate and state
    clocks: ClockController<G>,
    /// Per-channel software state
    pub(super) channels: [ChannelSlot; CHANNELS],
    /// Configuration applied by the last `init`
    config: DmaConfig,
    /// Set by `init`, cleared by `deinit`
    initialized: bool,
}

impl<H: DmaHardware, G: ClockGate, const CHANNELS: usize> DmaEngine<H, G, CHANNELS> {
    const VALID_CHANNEL_COUNT: () = assert!(
        CHANNELS >= 1 && CHANNELS <= MAX_CHANNELS,
        "channel count must be between 1 and 32"
    );

    /// Create a new engine
    ///
    /// The engine is created uninitialized; call [`init`](Self::init)
    /// before any other operation.
    pub const fn new(hw: H, gate: G) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CHANNEL_COUNT;
        Self {
            hw,
            clocks: ClockController::new(gate),
            channels: [ChannelSlot::EMPTY; CHANNELS],
            config: DmaConfig::new(),
            initialized: false,
        }
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Number of channels managed by this engine
    #[inline(always)]
    pub const fn channel_count(&self) -> usize {
        CHANNELS
    }

    /// Whether [`init`](Self::init) has run (and `deinit` has not)
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Configuration applied by the last `init`
    #[inline(always)]
    pub fn config(&self) -> &DmaConfig {
        &self.config
    }

    /// Borrow the register backend
    #[inline(always)]
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// Borrow the clock controller
    #[inline(always)]
    pub fn clocks(&self) -> &ClockController<G> {
        &self.clocks
    }

    #[inline(always)]
    pub(super) fn regs(&self) -> EdmaRegs<'_, H> {
        EdmaRegs::new(&self.hw)
    }

    #[inline(always)]
    fn router(&self) -> RequestRouter<'_, H> {
        RequestRouter::new(&self.hw)
    }

    /// Validate a channel number, then the initialization state
    #[inline]
    pub(super) fn check_channel(&self, channel: usize) -> Result<()> {
        if channel >= CHANNELS {
            return Err(ConfigError::InvalidChannel.into());
        }
        if !self.initialized {
            return Err(ConfigError::NotInitialized.into());
        }
        Ok(())
    }

    #[inline]
    fn check_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(ConfigError::NotInitialized.into())
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize the engine with the given configuration
    ///
    /// This performs the full initialization sequence:
    /// 1. Enable the controller and router clocks
    /// 2. Halt arbitration
    /// 3. Clear every request, error, interrupt and DONE flag
    /// 4. Zero every descriptor, reset priorities, unbind every request source
    /// 5. Apply arbitration and error policy, then release the halt
    ///
    /// Calling `init` again re-runs the sequence and discards every
    /// channel's configuration and callback.
    ///
    /// # Errors
    /// - `ClockError` - The clock gate could not be enabled
    pub fn init(&mut self, config: DmaConfig) -> Result<()> {
        self.clocks.enable()?;

        let regs = self.regs();
        regs.modify_cr(CR_HALT, 0);

        regs.clear_all_requests();
        regs.disable_all_error_interrupts();
        regs.clear_all_errors();
        regs.clear_all_interrupts();
        regs.clear_all_done();

        let router = self.router();
        for channel in 0..CHANNELS {
            regs.clear_tcd(channel);
            // Reset value: unique priority per channel within each group of 16
            regs.set_dchpri(channel, channel as u8 & DCHPRI_CHPRI_MASK);
            router.unbind(channel);
        }

        let mut control = 0;
        if config.arbitration == Arbitration::RoundRobin {
            control |= CR_ERCA;
        }
        if config.halt_on_error {
            control |= CR_HOE;
        }
        if config.debug_halt {
            control |= CR_EDBG;
        }
        regs.modify_cr(control, CR_ERCA | CR_HOE | CR_EDBG | CR_HALT);

        self.channels = [ChannelSlot::EMPTY; CHANNELS];
        self.config = config;
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::info!("eDMA initialized: {} channels", CHANNELS);

        Ok(())
    }

    /// Shut the engine down
    ///
    /// Stops every channel, clears every descriptor, request binding and
    /// callback, then gates the clocks off. Partially completed transfers
    /// are not rolled back.
    ///
    /// # Errors
    /// - `NotInitialized` - `init` has not run
    pub fn deinit(&mut self) -> Result<()> {
        self.check_initialized()?;

        let regs = self.regs();
        regs.clear_all_requests();
        regs.modify_cr(CR_HALT, 0);
        regs.disable_all_error_interrupts();

        let router = self.router();
        for channel in 0..CHANNELS {
            regs.clear_tcd(channel);
            router.unbind(channel);
        }

        regs.clear_all_errors();
        regs.clear_all_interrupts();
        regs.clear_all_done();

        self.clocks.disable();
        self.channels = [ChannelSlot::EMPTY; CHANNELS];
        self.initialized = false;

        #[cfg(feature = "defmt")]
        defmt::info!("eDMA deinitialized");

        Ok(())
    }

    /// Return a channel to the freshly initialized state
    ///
    /// Stops the channel, zeroes its descriptor, unbinds its request
    /// source, clears its DONE, interrupt and error flags and forgets its
    /// callback. Priority is left unchanged.
    pub fn reset_channel(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;

        let regs = self.regs();
        regs.clear_request(channel);
        regs.disable_error_interrupt(channel);
        regs.clear_tcd(channel);
        self.router().unbind(channel);
        regs.clear_done(channel);
        regs.clear_interrupt(channel);
        regs.clear_error(channel);

        self.channels[channel] = ChannelSlot::EMPTY;
        Ok(())
    }

    // =========================================================================
    // Transfer Configuration
    // =========================================================================

    /// Configure a channel for a transfer
    ///
    /// Validates `config`, writes the channel's descriptor with equal
    /// current and initial iteration counts, sets its priority (when the
    /// configuration carries one) and binds its request source.
    ///
    /// A channel that is still armed or active is stopped first. The stop
    /// does not wait for an in-flight minor loop and does not roll back
    /// data already moved.
    ///
    /// # Errors
    /// - `InvalidChannel` - Channel out of range (checked first)
    /// - `NotInitialized` - `init` has not run
    /// - Any validation error from [`TransferConfig::validate`]
    pub fn configure(&mut self, config: &TransferConfig) -> Result<()> {
        let channel = config.channel;
        self.check_channel(channel)?;
        config.validate(CHANNELS)?;

        let regs = self.regs();
        if self.is_armed(channel) || self.is_active(channel) {
            #[cfg(feature = "log")]
            log::warn!("eDMA channel {} reconfigured while armed, stopping", channel);

            regs.clear_request(channel);
        }

        let descriptor = config.descriptor();
        regs.clear_done(channel);
        regs.write_tcd(channel, &descriptor.encode());

        if let Some(priority) = config.priority {
            let dchpri = regs.dchpri(channel);
            regs.set_dchpri(
                channel,
                (dchpri & !DCHPRI_CHPRI_MASK) | (priority & DCHPRI_CHPRI_MASK),
            );
        }

        self.router().bind(channel, config.source);

        let slot = &mut self.channels[channel];
        slot.descriptor = Some(descriptor);
        slot.source = config.source;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "eDMA channel {} configured: {} x {} bytes",
            channel,
            config.major_loop_count,
            config.minor_loop_bytes
        );

        Ok(())
    }

    /// Read back a channel's descriptor from hardware
    ///
    /// The current iteration count and ACTIVE/DONE bits reflect the
    /// transfer's live progress.
    ///
    /// # Errors
    /// - `DescriptorError` - The hardware descriptor holds a reserved size code
    pub fn descriptor(&self, channel: usize) -> Result<TransferDescriptor> {
        self.check_channel(channel)?;
        TransferDescriptor::decode(&self.regs().read_tcd(channel))
            .ok_or_else(|| DmaError::DescriptorError.into())
    }

    // =========================================================================
    // Start / Stop
    // =========================================================================

    /// Arm a channel
    ///
    /// Clears DONE and enables the channel's request line. For always-on
    /// request sources a channel that has not yet begun its major loop is
    /// also started in software so the transfer begins without an external
    /// event.
    ///
    /// # Safety
    ///
    /// The source and destination regions described by the channel's
    /// descriptor must be valid for the whole transfer, and nothing else
    /// may access the destination until the transfer completes or the
    /// channel is stopped.
    pub unsafe fn start(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;

        let regs = self.regs();
        regs.clear_done(channel);
        regs.set_request(channel);
        if self.channels[channel].source.is_always_on() {
            // CITER before CSR: a major loop completing in between shows DONE
            let current = regs.tcd_citer(channel) & iter::COUNT_MASK;
            let word = regs.tcd_word(channel, TCD_CSR_BITER);
            let initial = (word >> 16) as u16 & iter::COUNT_MASK;
            if word & csr::DONE as u32 == 0 && current == initial {
                regs.start(channel);
            }
        }
        Ok(())
    }

    /// Disarm a channel
    ///
    /// Disables the request line only. The descriptor and its counters
    /// are left as they are, so a later `start` resumes where the transfer
    /// stopped unless the channel is reconfigured. Stopping a stopped
    /// channel is a no-op.
    pub fn stop(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        self.regs().clear_request(channel);
        Ok(())
    }

    /// Request one service of a channel in software
    ///
    /// Runs one minor loop (or the remaining transfer, for always-on
    /// sources) regardless of the request line.
    ///
    /// # Safety
    ///
    /// Same contract as [`start`](Self::start).
    pub unsafe fn trigger(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        self.regs().start(channel);
        Ok(())
    }

    // =========================================================================
    // Status Queries
    // =========================================================================

    /// Whether the hardware is executing the channel's major loop
    ///
    /// Returns `false` for an invalid channel or an uninitialized engine.
    pub fn is_active(&self, channel: usize) -> bool {
        self.check_channel(channel).is_ok() && self.regs().tcd_csr(channel) & csr::ACTIVE != 0
    }

    /// Whether the channel's major loop has completed
    ///
    /// Returns `false` for an invalid channel or an uninitialized engine.
    pub fn is_done(&self, channel: usize) -> bool {
        self.check_channel(channel).is_ok() && self.regs().tcd_csr(channel) & csr::DONE != 0
    }

    /// Whether the channel's request line is enabled
    ///
    /// Returns `false` for an invalid channel or an uninitialized engine.
    pub fn is_armed(&self, channel: usize) -> bool {
        self.check_channel(channel).is_ok() && self.regs().erq() & (1 << channel) != 0
    }

    /// Whether the channel's request source is currently asserting
    ///
    /// Returns `false` for an invalid channel or an uninitialized engine.
    pub fn is_hardware_requesting(&self, channel: usize) -> bool {
        self.check_channel(channel).is_ok() && self.regs().hrs() & (1 << channel) != 0
    }

    /// Clear a channel's DONE flag
    ///
    /// Needed before restarting a channel when the caller wants to observe
    /// a fresh completion.
    pub fn clear_done(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        self.regs().clear_done(channel);
        Ok(())
    }

    /// Current major loop iteration count
    ///
    /// Counts down from the configured major loop count while the transfer
    /// runs and reloads on completion.
    pub fn remaining_iterations(&self, channel: usize) -> Result<u16> {
        self.check_channel(channel)?;
        Ok(self.regs().tcd_citer(channel) & iter::COUNT_MASK)
    }

    /// Lifecycle state of a channel
    pub fn channel_state(&self, channel: usize) -> Result<ChannelState> {
        self.check_channel(channel)?;

        let csr_bits = self.regs().tcd_csr(channel);
        let state = if csr_bits & csr::DONE != 0 {
            ChannelState::Done
        } else if csr_bits & csr::ACTIVE != 0 {
            ChannelState::Active
        } else if self.is_armed(channel) {
            ChannelState::Armed
        } else if self.channels[channel].descriptor.is_some() {
            ChannelState::Configured
        } else {
            ChannelState::Idle
        };
        Ok(state)
    }

    /// Request source bound by the last `configure`
    pub fn request_source(&self, channel: usize) -> Result<RequestSource> {
        self.check_channel(channel)?;
        Ok(self.channels[channel].source)
    }

    // =========================================================================
    // Priority
    // =========================================================================

    /// Set a channel's arbitration priority
    ///
    /// Only the low four bits are used (15 is highest). Takes effect at the
    /// next arbitration decision.
    pub fn set_priority(&mut self, channel: usize, priority: u8) -> Result<()> {
        self.check_channel(channel)?;

        let regs = self.regs();
        let value = regs.dchpri(channel);
        regs.set_dchpri(
            channel,
            (value & !DCHPRI_CHPRI_MASK) | (priority & DCHPRI_CHPRI_MASK),
        );
        Ok(())
    }

    /// A channel's arbitration priority
    pub fn priority(&self, channel: usize) -> Result<u8> {
        self.check_channel(channel)?;
        Ok(self.regs().dchpri(channel) & DCHPRI_CHPRI_MASK)
    }

    /// Set a channel's preemption behaviour
    ///
    /// * `can_be_preempted` - a higher priority channel may suspend this one
    /// * `can_preempt` - this channel may suspend a lower priority one
    pub fn set_preemption(
        &mut self,
        channel: usize,
        can_be_preempted: bool,
        can_preempt: bool,
    ) -> Result<()> {
        self.check_channel(channel)?;

        let regs = self.regs();
        let mut value = regs.dchpri(channel) & !(DCHPRI_ECP | DCHPRI_DPA);
        if can_be_preempted {
            value |= DCHPRI_ECP;
        }
        if !can_preempt {
            value |= DCHPRI_DPA;
        }
        regs.set_dchpri(channel, value);
        Ok(())
    }

    // =========================================================================
    // Completion Notification
    // =========================================================================

    /// Raise an interrupt when the channel's major loop completes
    pub fn enable_interrupt(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        self.regs()
            .modify_tcd_csr(channel, |bits| bits | csr::INTMAJOR);
        Ok(())
    }

    /// Stop raising an interrupt on major loop completion
    pub fn disable_interrupt(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        self.regs()
            .modify_tcd_csr(channel, |bits| bits & !csr::INTMAJOR);
        Ok(())
    }

    /// Register a channel's completion callback
    ///
    /// A channel has one callback slot; installing replaces the previous
    /// callback.
    pub fn install_callback(
        &mut self,
        channel: usize,
        callback: CompletionCallback,
        user_data: usize,
    ) -> Result<()> {
        self.check_channel(channel)?;
        self.channels[channel].callback = Some((callback, user_data));
        Ok(())
    }

    /// Remove a channel's completion callback
    pub fn remove_callback(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        self.channels[channel].callback = None;
        Ok(())
    }

    /// Handle a channel's completion interrupt
    ///
    /// Clears the channel's interrupt request and DONE flag, then calls its
    /// callback (if any) synchronously. Call this from the channel's
    /// interrupt handler.
    pub fn dispatch(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;

        let regs = self.regs();
        regs.clear_interrupt(channel);
        regs.clear_done(channel);

        if let Some((callback, user_data)) = self.channels[channel].callback {
            callback(channel, user_data);
        }
        Ok(())
    }

    /// Bitmask of channels with a pending completion interrupt
    pub fn pending_interrupts(&self) -> u32 {
        if !self.initialized {
            return 0;
        }
        self.regs().int() & Self::channel_mask()
    }

    /// Dispatch every channel with a pending completion interrupt
    ///
    /// For controllers sharing one vector between channels. Returns the
    /// bitmask of dispatched channels.
    pub fn handle_interrupts(&mut self) -> u32 {
        let pending = self.pending_interrupts();
        let mut remaining = pending;
        while remaining != 0 {
            let channel = remaining.trailing_zeros() as usize;
            remaining &= remaining - 1;
            // Channel comes from the pending mask, so it is in range
            let _ = self.dispatch(channel);
        }
        pending
    }

    // =========================================================================
    // Error Status
    // =========================================================================

    /// Raise the error interrupt when the channel latches an error
    pub fn enable_error_interrupt(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        self.regs().enable_error_interrupt(channel);
        Ok(())
    }

    /// Stop raising the error interrupt for the channel
    pub fn disable_error_interrupt(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        self.regs().disable_error_interrupt(channel);
        Ok(())
    }

    /// Global error status
    pub fn error_status(&self) -> Result<ErrorStatus> {
        self.check_initialized()?;
        Ok(ErrorStatus::from_raw(self.regs().es()))
    }

    /// Bitmask of channels with an error latched
    pub fn error_channels(&self) -> Result<u32> {
        self.check_initialized()?;
        Ok(self.regs().err() & Self::channel_mask())
    }

    /// Clear a channel's latched error
    pub fn clear_error(&mut self, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        self.regs().clear_error(channel);
        Ok(())
    }

    /// Clear every channel's latched error
    pub fn clear_all_errors(&mut self) -> Result<()> {
        self.check_initialized()?;
        self.regs().clear_all_errors();
        Ok(())
    }

    /// Fail if the controller has an error latched
    ///
    /// # Errors
    /// - `BusError`, `DescriptorError`, `PriorityError` or
    ///   `TransferCanceled` as reported by [`ErrorStatus::to_result`]
    pub fn check_error(&self) -> Result<()> {
        let status = self.error_status()?;
        if let Err(e) = status.to_result() {
            #[cfg(feature = "log")]
            log::warn!("eDMA error on channel {}: {}", status.channel, e);

            return Err(e.into());
        }
        Ok(())
    }

    #[inline(always)]
    const fn channel_mask() -> u32 {
        if CHANNELS >= 32 {
            u32::MAX
        } else {
            (1u32 << CHANNELS) - 1
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
