//! Error types for the eDMA engine
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Parameter validation and initialization failures
//! - [`DmaError`]: Hardware-detected transfer errors (from the global error status)
//! - [`IoError`]: Runtime wait failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most engine methods. [`Error::kind`] folds every error into the
//! four-way [`ErrorKind`] taxonomy callers usually branch on.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
///
/// These errors are detected synchronously, before any register is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Channel number outside the engine's channel table
    InvalidChannel,
    /// Engine used before `init` (or after `deinit`)
    NotInitialized,
    /// Invalid configuration parameter
    InvalidConfig,
    /// Source or destination address not aligned to the element size
    MisalignedAddress,
    /// Source or destination stride not a multiple of the element size
    MisalignedOffset,
    /// Minor loop byte count zero or not a multiple of the element size
    InvalidMinorLoop,
    /// Major loop iteration count zero or above the 15-bit limit
    InvalidIterationCount,
    /// Priority above 15
    InvalidPriority,
    /// Copy length zero or not a multiple of the copy element size
    InvalidLength,
    /// Clock gate could not be enabled
    ClockError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidChannel => "invalid channel",
            ConfigError::NotInitialized => "engine not initialized",
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::MisalignedAddress => "address not aligned to element size",
            ConfigError::MisalignedOffset => "offset not a multiple of element size",
            ConfigError::InvalidMinorLoop => "invalid minor loop byte count",
            ConfigError::InvalidIterationCount => "invalid major iteration count",
            ConfigError::InvalidPriority => "priority out of range",
            ConfigError::InvalidLength => "invalid copy length",
            ConfigError::ClockError => "clock enable failed",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// Hardware-detected transfer errors
///
/// The controller latches these in its global error status register. They
/// are not tied to the completion path and only surface when polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Bus error on a source read or destination write
    BusError,
    /// Descriptor rejected by the controller (offset, address, NBYTES/CITER
    /// or scatter-gather consistency check)
    DescriptorError,
    /// Two channels configured with the same priority in fixed-priority mode
    PriorityError,
    /// Transfer canceled through the error cancel control
    TransferCanceled,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::BusError => "DMA bus error",
            DmaError::DescriptorError => "descriptor configuration error",
            DmaError::PriorityError => "channel priority error",
            DmaError::TransferCanceled => "transfer canceled",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime wait errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Completion not observed within the poll budget or time limit
    Timeout,
    /// Channel can never complete in its current state (not armed, not done)
    InvalidState,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::InvalidState => "invalid channel state for operation",
        }
    }
}

// =============================================================================
// Error Taxonomy
// =============================================================================

/// Coarse error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Bad channel, configuration, length or state
    InvalidParameter,
    /// Operation attempted before initialization
    NotInitialized,
    /// Bounded wait exhausted
    Timeout,
    /// Condition detected by the hardware (bus, descriptor, clock)
    HardwareError,
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::InvalidChannel)) => { /* ... */ }
///     Err(Error::Dma(DmaError::BusError)) => { /* ... */ }
///     Err(Error::Io(IoError::Timeout)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Hardware transfer error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

impl Error {
    /// Category of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(ConfigError::NotInitialized) => ErrorKind::NotInitialized,
            Error::Config(ConfigError::ClockError) | Error::Dma(_) => ErrorKind::HardwareError,
            Error::Io(IoError::Timeout) => ErrorKind::Timeout,
            Error::Config(_) | Error::Io(IoError::InvalidState) => ErrorKind::InvalidParameter,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for engine operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for hardware error checks
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
