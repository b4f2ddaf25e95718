//! Application close codes (4000-4999)

use std::fmt;

/// Why the gateway hung up
///
/// The numeric value goes in the close frame. The reason text is for humans
/// reading a packet capture; clients branch on the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    UnknownError = 4000,
    /// Op number outside the protocol, or a server-only op from a client
    UnknownOpcode = 4001,
    /// Frame was not a JSON object with an integer `op`, or `d` had the wrong shape
    DecodeError = 4002,
    /// Anything but Heartbeat or Identify before a successful Identify
    NotAuthenticated = 4003,
    AuthenticationFailed = 4004,
    AlreadyAuthenticated = 4005,
    /// Heartbeat watchdog fired
    SessionTimeout = 4009,
}

impl CloseCode {
    const ALL: [Self; 7] = [
        Self::UnknownError,
        Self::UnknownOpcode,
        Self::DecodeError,
        Self::NotAuthenticated,
        Self::AuthenticationFailed,
        Self::AlreadyAuthenticated,
        Self::SessionTimeout,
    ];

    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_u16() == value)
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Reconnecting with the same token cannot fix an auth failure
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        !matches!(self, Self::NotAuthenticated | Self::AuthenticationFailed)
    }

    /// Reason text for the close frame
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "internal error",
            Self::UnknownOpcode => "unknown op",
            Self::DecodeError => "malformed frame",
            Self::NotAuthenticated => "identify first",
            Self::AuthenticationFailed => "invalid token",
            Self::AlreadyAuthenticated => "already identified",
            Self::SessionTimeout => "heartbeat timeout",
        }
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.as_u16(), self)
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
