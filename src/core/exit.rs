//! Exit codes signalling why an action wants its state to end.
//!
//! The exit-code space is a single byte. Values `0..=5` are reserved
//! conditions understood by the engine, `6..=15` are reserved for future use
//! and can never be constructed, and `16..=255` belong to the application.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced when converting a raw byte into an [`ExitCode`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ExitCodeError {
    #[error("Exit code {0} is reserved (6..=15 are not assignable)")]
    Reserved(u8),
}

/// Why an action requested the end of its current activation.
///
/// # Example
///
/// ```rust
/// use coop_fsm::core::ExitCode;
///
/// const BUTTON_PRESS: ExitCode = ExitCode::USER;
///
/// assert!(BUTTON_PRESS.is_user());
/// assert_eq!(ExitCode::new(2), Ok(ExitCode::TIMEOUT));
/// assert!(ExitCode::new(7).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ExitCode(u8);

impl ExitCode {
    /// No exit requested during this activation.
    pub const NONE: ExitCode = ExitCode(0);
    /// Normal completion (iterations done).
    pub const COMPLETE: ExitCode = ExitCode(1);
    /// The state's timeout window elapsed.
    pub const TIMEOUT: ExitCode = ExitCode(2);
    /// The action hit an error.
    pub const ERROR: ExitCode = ExitCode(3);
    /// Cancelled by request.
    pub const CANCEL: ExitCode = ExitCode(4);
    /// Emergency stop.
    pub const ABORT: ExitCode = ExitCode(5);
    /// First application-defined exit code.
    pub const USER: ExitCode = ExitCode(16);

    const LAST_RESERVED_KIND: u8 = 5;

    /// Validate a raw byte, rejecting the unassigned range `6..=15`.
    pub const fn new(raw: u8) -> Result<Self, ExitCodeError> {
        if raw > Self::LAST_RESERVED_KIND && raw < Self::USER.0 {
            Err(ExitCodeError::Reserved(raw))
        } else {
            Ok(ExitCode(raw))
        }
    }

    /// Application exit code `USER + offset`, or `None` if it overflows a byte.
    pub const fn user(offset: u8) -> Option<Self> {
        match Self::USER.0.checked_add(offset) {
            Some(raw) => Some(ExitCode(raw)),
            None => None,
        }
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// One of the engine-defined conditions `COMPLETE..=ABORT`.
    pub const fn is_reserved_kind(self) -> bool {
        self.0 >= Self::COMPLETE.0 && self.0 <= Self::LAST_RESERVED_KIND
    }

    pub const fn is_user(self) -> bool {
        self.0 >= Self::USER.0
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::NONE
    }
}

impl TryFrom<u8> for ExitCode {
    type Error = ExitCodeError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ExitCode> for u8 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.write_str("NONE"),
            Self::COMPLETE => f.write_str("COMPLETE"),
            Self::TIMEOUT => f.write_str("TIMEOUT"),
            Self::ERROR => f.write_str("ERROR"),
            Self::CANCEL => f.write_str("CANCEL"),
            Self::ABORT => f.write_str("ABORT"),
            ExitCode(raw) => write!(f, "USER+{}", raw.saturating_sub(Self::USER.0)),
        }
    }
}

impl fmt::Debug for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExitCode({self})")
    }
}
