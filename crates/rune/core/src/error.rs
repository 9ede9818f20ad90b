//! Error infrastructure for rune-core.
//!
//! Most pool operations cannot fail: scarcity and discarded overflow are
//! recorded as statistics, and broken invariants are assertions. The errors
//! here cover the few checked entry points (validated configuration, checked
//! consumption, slot addressing and expression parsing).

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry later (e.g. once runes regenerate)
/// - **Validation**: invalid input that should be rejected without retry
///
/// Broken pool invariants are assertions, not errors, so there is no internal
/// severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry once conditions change.
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    Validation,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for rune errors.
pub trait RuneFault: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors surfaced by the checked rune pool API.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RuneError {
    #[error("requested {requested} runes but only {available} are ready")]
    InsufficientRunes { requested: u32, available: u32 },

    #[error("haste multiplier must be finite and positive (got {0})")]
    InvalidHaste(f64),

    #[error("rune slot {index} out of range (pool holds {len})")]
    SlotOutOfRange { index: usize, len: usize },

    #[error("invalid rune configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("unknown rune expression '{0}'")]
    UnknownExpression(String),
}

impl RuneFault for RuneError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InsufficientRunes { .. } => ErrorSeverity::Recoverable,
            Self::InvalidHaste(_)
            | Self::SlotOutOfRange { .. }
            | Self::InvalidConfig(_)
            | Self::UnknownExpression(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientRunes { .. } => "INSUFFICIENT_RUNES",
            Self::InvalidHaste(_) => "INVALID_HASTE",
            Self::SlotOutOfRange { .. } => "SLOT_OUT_OF_RANGE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::UnknownExpression(_) => "UNKNOWN_EXPRESSION",
        }
    }
}
