//! Clock Gating HAL
//!
//! The engine does not own the clock tree. It asks a [`ClockGate`] supplied
//! by the platform to ungate the controller and request router clocks at
//! init and to gate them again at deinit. [`ClockController`] wraps the gate
//! and tracks its state.

use crate::driver::error::{ConfigError, ConfigResult};

/// Clock configuration state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    /// Clock not configured
    #[default]
    Unconfigured,
    /// Clock enabled
    Enabled,
    /// Clock disabled
    Disabled,
}

/// Platform hook gating the controller and router clock domains
///
/// # Example
///
/// ```ignore
/// struct Sim;
///
/// impl ClockGate for Sim {
///     fn enable(&mut self) -> ConfigResult<()> {
///         // SIM_SCGC6 |= DMAMUX; SIM_SCGC7 |= DMA
///         Ok(())
///     }
///
///     fn disable(&mut self) {
///         // SIM_SCGC6 &= !DMAMUX; SIM_SCGC7 &= !DMA
///     }
/// }
/// ```
pub trait ClockGate {
    /// Ungate both clock domains
    fn enable(&mut self) -> ConfigResult<()>;

    /// Gate both clock domains
    fn disable(&mut self);
}

impl<T: ClockGate + ?Sized> ClockGate for &mut T {
    fn enable(&mut self) -> ConfigResult<()> {
        (**self).enable()
    }

    fn disable(&mut self) {
        (**self).disable();
    }
}

/// Gate for platforms where the clocks are managed outside the engine
///
/// Both operations are no-ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalClocks;

impl ClockGate for ExternalClocks {
    fn enable(&mut self) -> ConfigResult<()> {
        Ok(())
    }

    fn disable(&mut self) {}
}

/// Clock controller for the DMA engine
///
/// Provides methods to enable and disable the clocks required for
/// engine operation.
#[derive(Debug)]
pub struct ClockController<G: ClockGate> {
    gate: G,
    state: ClockState,
}

impl<G: ClockGate> ClockController<G> {
    /// Create a new clock controller around `gate`
    pub const fn new(gate: G) -> Self {
        Self {
            gate,
            state: ClockState::Unconfigured,
        }
    }

    /// Enable the engine clocks
    ///
    /// Calling this while already enabled does not touch the gate again.
    pub fn enable(&mut self) -> ConfigResult<()> {
        if self.state == ClockState::Enabled {
            return Ok(());
        }
        self.gate.enable().map_err(|_| ConfigError::ClockError)?;
        self.state = ClockState::Enabled;
        Ok(())
    }

    /// Disable the engine clocks
    pub fn disable(&mut self) {
        self.gate.disable();
        self.state = ClockState::Disabled;
    }

    /// Check if clocks are enabled
    pub fn is_enabled(&self) -> bool {
        self.state == ClockState::Enabled
    }

    /// Get current clock state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Borrow the underlying gate
    pub fn gate(&self) -> &G {
        &self.gate
    }

    /// Consume the controller and return the gate
    pub fn into_gate(self) -> G {
        self.gate
    }
}
