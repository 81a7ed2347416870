//! NWK-layer message type octets and protocol discriminators
//!
//! Values follow ETSI EN 300 175-5 section 7.4. The message type octet
//! carries the value in its low seven bits; bit 8 is reserved.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Protocol discriminators (EN 300 175-5 section 7.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ProtocolDiscriminator {
    /// Link Control Entity
    Lce = 0x0,
    /// Call Control
    Cc = 0x3,
    /// Call Independent Supplementary Services
    Ciss = 0x4,
    /// Mobility Management
    Mm = 0x5,
    /// ConnectionLess Message Service
    Clms = 0x6,
    /// Connection Oriented Message Service
    Coms = 0x7,
}

impl ProtocolDiscriminator {
    /// Short protocol name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolDiscriminator::Lce => "LCE",
            ProtocolDiscriminator::Cc => "CC",
            ProtocolDiscriminator::Ciss => "CISS",
            ProtocolDiscriminator::Mm => "MM",
            ProtocolDiscriminator::Clms => "CLMS",
            ProtocolDiscriminator::Coms => "COMS",
        }
    }
}

/// Call Control message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum CcMessageType {
    Alerting = 0x01,
    CallProc = 0x02,
    Setup = 0x05,
    Connect = 0x07,
    SetupAck = 0x0d,
    ConnectAck = 0x0f,
    ServiceChange = 0x20,
    ServiceAccept = 0x21,
    ServiceReject = 0x23,
    Release = 0x4d,
    ReleaseCom = 0x5a,
    IwuInfo = 0x60,
    Notify = 0x6e,
    Info = 0x7b,
}

/// Mobility Management message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum MmMessageType {
    AuthenticationRequest = 0x40,
    AuthenticationReply = 0x41,
    KeyAllocate = 0x42,
    AuthenticationReject = 0x43,
    AccessRightsRequest = 0x44,
    AccessRightsAccept = 0x45,
    AccessRightsReject = 0x47,
    AccessRightsTerminateRequest = 0x48,
    AccessRightsTerminateAccept = 0x49,
    AccessRightsTerminateReject = 0x4b,
    CipherRequest = 0x4c,
    CipherSuggest = 0x4e,
    CipherReject = 0x4f,
    InfoRequest = 0x50,
    InfoAccept = 0x51,
    InfoSuggest = 0x52,
    InfoReject = 0x53,
    LocateRequest = 0x54,
    LocateAccept = 0x55,
    Detach = 0x56,
    LocateReject = 0x57,
    IdentityRequest = 0x58,
    IdentityReply = 0x59,
    Iwu = 0x5b,
    TemporaryIdentityAssign = 0x5c,
    TemporaryIdentityAssignAck = 0x5d,
    TemporaryIdentityAssignRej = 0x5e,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pd_values() {
        assert_eq!(u8::from(ProtocolDiscriminator::Cc), 0x3);
        assert_eq!(u8::from(ProtocolDiscriminator::Mm), 0x5);
        assert_eq!(
            ProtocolDiscriminator::try_from(0x0).unwrap(),
            ProtocolDiscriminator::Lce
        );
        assert!(ProtocolDiscriminator::try_from(0x9).is_err());
    }

    #[test]
    fn test_cc_message_type_values() {
        assert_eq!(u8::from(CcMessageType::Setup), 0x05);
        assert_eq!(u8::from(CcMessageType::ReleaseCom), 0x5a);
        assert_eq!(CcMessageType::try_from(0x7b).unwrap(), CcMessageType::Info);
    }

    #[test]
    fn test_mm_message_type_values() {
        assert_eq!(u8::from(MmMessageType::LocateRequest), 0x54);
        assert_eq!(
            MmMessageType::try_from(0x5e).unwrap(),
            MmMessageType::TemporaryIdentityAssignRej
        );
    }
}
