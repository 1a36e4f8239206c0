//! Protocol identity for scalability-protocol sockets.
//!
//! Numbers follow the SP convention of `pattern << 4 | role`, so the two
//! request/reply roles share the pattern nibble `3`.

use std::fmt;

/// Request/reply protocol identifiers exchanged during peer negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ProtocolId {
    /// Requester: sends correlated requests and awaits replies
    Req = 3 << 4,

    /// Replier: answers requests, echoing the correlation header
    Rep = (3 << 4) | 1,
}

impl ProtocolId {
    /// Wire number for this protocol.
    #[must_use]
    pub const fn number(self) -> u16 {
        self as u16
    }

    /// Lowercase protocol name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Req => "req",
            Self::Rep => "rep",
        }
    }

    /// Map a wire number back to a known protocol.
    #[must_use]
    pub const fn from_number(number: u16) -> Option<Self> {
        match number {
            48 => Some(Self::Req),
            49 => Some(Self::Rep),
            _ => None,
        }
    }

    /// The complementary role this protocol talks to.
    #[must_use]
    pub const fn peer(self) -> Self {
        match self {
            Self::Req => Self::Rep,
            Self::Rep => Self::Req,
        }
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static protocol metadata declared by every socket protocol.
pub trait ProtocolInfo {
    /// Pattern name, e.g. `"req"`.
    fn name(&self) -> &'static str;

    /// Numeric protocol identifier advertised to peers.
    fn number(&self) -> u16;

    /// Raw protocols pass headers through untouched.
    fn is_raw(&self) -> bool;

    /// Whether a peer advertising `peer` may be connected.
    fn valid_peer(&self, peer: u16) -> bool;
}
