//! Information element catalog
//!
//! [`Ie`] is the tagged variant over all IE kinds the codec handles. The
//! wire identifier maps to a variant through [`IeType`]; parse and build
//! dispatch on the tag, replacing the handler table of a classic C
//! implementation with exhaustive matching.
//!
//! Elements the message grammars name but the stack never interprets
//! (e.g. <<SEGMENTED-INFO>>, <<IWU-ATTRIBUTES>>) have catalog entries
//! without codecs: parsing them fails, which the message driver tolerates
//! for optional elements and rejects for mandatory ones.

pub mod auth;
pub mod call;
pub mod fixed;
pub mod identity;

pub use auth::{IeAllocationType, IeAuthRes, IeAuthType, IeAuthValue, IeCipherInfo};
pub use call::{
    CodecEntry, EventNotification, IeCalledPartyNumber, IeCallingPartyName,
    IeCallingPartyNumber, IeCodecList, IeDuration, IeEscapeToProprietary,
    IeEventsNotification, IeFacility, IeFeatureActivate, IeFeatureIndicate, IeIwuToIwu,
    IeNetworkParameter, IeProgressIndicator, IeRejectReason, IeServiceChangeInfo,
    IeSetupCapability, IeTerminalCapability, IeTimeDate, RejectReasonValue,
};
pub use fixed::{
    BasicServiceValue, CallClass, IeBasicService, IeDisplay, IeKeypad, IeReleaseReason,
    IeSignal, IeTimerRestart, ReleaseReasonValue,
};
pub use identity::{
    IeFixedIdentity, IeIdentityType, IeInfoType, IeLocationArea, IePortableIdentity,
};

use crate::error::{SfmtError, SfmtResult};
use crate::ie::IeType;

/// A parsed information element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ie {
    SendingComplete,
    DelimiterRequest,
    UseTpui,
    BasicService(IeBasicService),
    ReleaseReason(IeReleaseReason),
    Signal(IeSignal),
    TimerRestart(IeTimerRestart),
    Display(IeDisplay),
    Keypad(IeKeypad),
    InfoType(IeInfoType),
    IdentityType(IeIdentityType),
    PortableIdentity(IePortableIdentity),
    FixedIdentity(IeFixedIdentity),
    LocationArea(IeLocationArea),
    AllocationType(IeAllocationType),
    AuthType(IeAuthType),
    Rand(IeAuthValue),
    Rs(IeAuthValue),
    Res(IeAuthRes),
    CipherInfo(IeCipherInfo),
    Facility(IeFacility),
    ProgressIndicator(IeProgressIndicator),
    TimeDate(IeTimeDate),
    FeatureActivate(IeFeatureActivate),
    FeatureIndicate(IeFeatureIndicate),
    NetworkParameter(IeNetworkParameter),
    RejectReason(IeRejectReason),
    SetupCapability(IeSetupCapability),
    TerminalCapability(IeTerminalCapability),
    CallingPartyNumber(IeCallingPartyNumber),
    CallingPartyName(IeCallingPartyName),
    CalledPartyNumber(IeCalledPartyNumber),
    Duration(IeDuration),
    ServiceChangeInfo(IeServiceChangeInfo),
    IwuToIwu(IeIwuToIwu),
    EscapeToProprietary(IeEscapeToProprietary),
    CodecList(IeCodecList),
    EventsNotification(IeEventsNotification),
}

impl Ie {
    /// The catalog type keying this IE in collections and descriptors.
    ///
    /// Display and keypad elements key as their SINGLE variant; the builder
    /// chooses the wire form from the payload length.
    pub fn ie_type(&self) -> IeType {
        match self {
            Ie::SendingComplete => IeType::SendingComplete,
            Ie::DelimiterRequest => IeType::DelimiterRequest,
            Ie::UseTpui => IeType::UseTpui,
            Ie::BasicService(_) => IeType::BasicService,
            Ie::ReleaseReason(_) => IeType::ReleaseReason,
            Ie::Signal(_) => IeType::Signal,
            Ie::TimerRestart(_) => IeType::TimerRestart,
            Ie::Display(_) => IeType::SingleDisplay,
            Ie::Keypad(_) => IeType::SingleKeypad,
            Ie::InfoType(_) => IeType::InfoType,
            Ie::IdentityType(_) => IeType::IdentityType,
            Ie::PortableIdentity(_) => IeType::PortableIdentity,
            Ie::FixedIdentity(_) => IeType::FixedIdentity,
            Ie::LocationArea(_) => IeType::LocationArea,
            Ie::AllocationType(_) => IeType::AllocationType,
            Ie::AuthType(_) => IeType::AuthType,
            Ie::Rand(_) => IeType::Rand,
            Ie::Rs(_) => IeType::Rs,
            Ie::Res(_) => IeType::Res,
            Ie::CipherInfo(_) => IeType::CipherInfo,
            Ie::Facility(_) => IeType::Facility,
            Ie::ProgressIndicator(_) => IeType::ProgressIndicator,
            Ie::TimeDate(_) => IeType::TimeDate,
            Ie::FeatureActivate(_) => IeType::FeatureActivate,
            Ie::FeatureIndicate(_) => IeType::FeatureIndicate,
            Ie::NetworkParameter(_) => IeType::NetworkParameter,
            Ie::RejectReason(_) => IeType::RejectReason,
            Ie::SetupCapability(_) => IeType::SetupCapability,
            Ie::TerminalCapability(_) => IeType::TerminalCapability,
            Ie::CallingPartyNumber(_) => IeType::CallingPartyNumber,
            Ie::CallingPartyName(_) => IeType::CallingPartyName,
            Ie::CalledPartyNumber(_) => IeType::CalledPartyNumber,
            Ie::Duration(_) => IeType::Duration,
            Ie::ServiceChangeInfo(_) => IeType::ServiceChangeInfo,
            Ie::IwuToIwu(_) => IeType::IwuToIwu,
            Ie::EscapeToProprietary(_) => IeType::EscapeToProprietary,
            Ie::CodecList(_) => IeType::CodecList,
            Ie::EventsNotification(_) => IeType::EventsNotification,
        }
    }

    /// Parses one IE of the given type from its raw bytes (header included).
    ///
    /// Returns `InvalidIe` for catalog entries without a parse handler.
    pub fn parse(ty: IeType, data: &[u8]) -> SfmtResult<Ie> {
        Ok(match ty {
            IeType::SendingComplete => Ie::SendingComplete,
            IeType::DelimiterRequest => Ie::DelimiterRequest,
            IeType::UseTpui => Ie::UseTpui,
            IeType::BasicService => Ie::BasicService(IeBasicService::parse(data)?),
            IeType::ReleaseReason => Ie::ReleaseReason(IeReleaseReason::parse(data)?),
            IeType::Signal => Ie::Signal(IeSignal::parse(data)?),
            IeType::TimerRestart => Ie::TimerRestart(IeTimerRestart::parse(data)?),
            IeType::SingleDisplay => Ie::Display(IeDisplay::parse_single(data)?),
            IeType::MultiDisplay => Ie::Display(IeDisplay::parse_multi(data)?),
            IeType::SingleKeypad => Ie::Keypad(IeKeypad::parse_single(data)?),
            IeType::MultiKeypad => Ie::Keypad(IeKeypad::parse_multi(data)?),
            IeType::InfoType => Ie::InfoType(IeInfoType::parse(data)?),
            IeType::IdentityType => Ie::IdentityType(IeIdentityType::parse(data)?),
            IeType::PortableIdentity => Ie::PortableIdentity(IePortableIdentity::parse(data)?),
            IeType::FixedIdentity => Ie::FixedIdentity(IeFixedIdentity::parse(data)?),
            IeType::LocationArea => Ie::LocationArea(IeLocationArea::parse(data)?),
            IeType::AllocationType => Ie::AllocationType(IeAllocationType::parse(data)?),
            IeType::AuthType => Ie::AuthType(IeAuthType::parse(data)?),
            IeType::Rand => Ie::Rand(IeAuthValue::parse(data)?),
            IeType::Rs => Ie::Rs(IeAuthValue::parse(data)?),
            IeType::Res => Ie::Res(IeAuthRes::parse(data)?),
            IeType::CipherInfo => Ie::CipherInfo(IeCipherInfo::parse(data)?),
            IeType::Facility => Ie::Facility(IeFacility::parse(data)?),
            IeType::ProgressIndicator => {
                Ie::ProgressIndicator(IeProgressIndicator::parse(data)?)
            }
            IeType::TimeDate => Ie::TimeDate(IeTimeDate::parse(data)?),
            IeType::FeatureActivate => Ie::FeatureActivate(IeFeatureActivate::parse(data)?),
            IeType::FeatureIndicate => Ie::FeatureIndicate(IeFeatureIndicate::parse(data)?),
            IeType::NetworkParameter => Ie::NetworkParameter(IeNetworkParameter::parse(data)?),
            IeType::RejectReason => Ie::RejectReason(IeRejectReason::parse(data)?),
            IeType::SetupCapability => Ie::SetupCapability(IeSetupCapability::parse(data)?),
            IeType::TerminalCapability => {
                Ie::TerminalCapability(IeTerminalCapability::parse(data)?)
            }
            IeType::CallingPartyNumber => {
                Ie::CallingPartyNumber(IeCallingPartyNumber::parse(data)?)
            }
            IeType::CallingPartyName => Ie::CallingPartyName(IeCallingPartyName::parse(data)?),
            IeType::CalledPartyNumber => Ie::CalledPartyNumber(IeCalledPartyNumber::parse(data)?),
            IeType::Duration => Ie::Duration(IeDuration::parse(data)?),
            IeType::ServiceChangeInfo => Ie::ServiceChangeInfo(IeServiceChangeInfo::parse(data)?),
            IeType::IwuToIwu => Ie::IwuToIwu(IeIwuToIwu::parse(data)?),
            IeType::EscapeToProprietary => {
                Ie::EscapeToProprietary(IeEscapeToProprietary::parse(data)?)
            }
            IeType::CodecList => Ie::CodecList(IeCodecList::parse(data)?),
            _ => return Err(SfmtError::InvalidIe(ty.name())),
        })
    }

    /// Builds this IE's payload octets (everything after the header).
    ///
    /// Returns `InvalidIe` for catalog entries without a build handler.
    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        match self {
            Ie::SendingComplete | Ie::DelimiterRequest | Ie::UseTpui => Ok(()),
            Ie::BasicService(ie) => ie.build(payload),
            Ie::ReleaseReason(ie) => ie.build(payload),
            Ie::Signal(ie) => ie.build(payload),
            Ie::TimerRestart(_) => Err(SfmtError::InvalidIe(IeType::TimerRestart.name())),
            Ie::Display(ie) => ie.build(payload),
            Ie::Keypad(ie) => ie.build(payload),
            Ie::InfoType(ie) => ie.build(payload),
            Ie::IdentityType(ie) => ie.build(payload),
            Ie::PortableIdentity(ie) => ie.build(payload),
            Ie::FixedIdentity(ie) => ie.build(payload),
            Ie::LocationArea(ie) => ie.build(payload),
            Ie::AllocationType(ie) => ie.build(payload),
            Ie::AuthType(ie) => ie.build(payload),
            Ie::Rand(ie) | Ie::Rs(ie) => ie.build(payload),
            Ie::Res(ie) => ie.build(payload),
            Ie::CipherInfo(ie) => ie.build(payload),
            Ie::Facility(_) => Err(SfmtError::InvalidIe(IeType::Facility.name())),
            Ie::ProgressIndicator(ie) => ie.build(payload),
            Ie::TimeDate(ie) => ie.build(payload),
            Ie::FeatureActivate(ie) => ie.build(payload),
            Ie::FeatureIndicate(_) => Err(SfmtError::InvalidIe(IeType::FeatureIndicate.name())),
            Ie::NetworkParameter(ie) => ie.build(payload),
            Ie::RejectReason(ie) => ie.build(payload),
            Ie::SetupCapability(ie) => ie.build(payload),
            Ie::TerminalCapability(ie) => ie.build(payload),
            Ie::CallingPartyNumber(ie) => ie.build(payload),
            Ie::CallingPartyName(ie) => ie.build(payload),
            Ie::CalledPartyNumber(ie) => ie.build(payload),
            Ie::Duration(ie) => ie.build(payload),
            Ie::ServiceChangeInfo(_) => {
                Err(SfmtError::InvalidIe(IeType::ServiceChangeInfo.name()))
            }
            Ie::IwuToIwu(ie) => ie.build(payload),
            Ie::EscapeToProprietary(ie) => ie.build(payload),
            Ie::CodecList(ie) => ie.build(payload),
            Ie::EventsNotification(ie) => ie.build(payload),
        }
    }

    /// The carried portable identity, if this IE is one.
    pub fn as_portable_identity(&self) -> Option<&IePortableIdentity> {
        match self {
            Ie::PortableIdentity(ie) => Some(ie),
            _ => None,
        }
    }

    /// The carried fixed identity, if this IE is one.
    pub fn as_fixed_identity(&self) -> Option<&IeFixedIdentity> {
        match self {
            Ie::FixedIdentity(ie) => Some(ie),
            _ => None,
        }
    }

    /// The carried basic service, if this IE is one.
    pub fn as_basic_service(&self) -> Option<&IeBasicService> {
        match self {
            Ie::BasicService(ie) => Some(ie),
            _ => None,
        }
    }

    /// The carried display info, if this IE is one.
    pub fn as_display(&self) -> Option<&IeDisplay> {
        match self {
            Ie::Display(ie) => Some(ie),
            _ => None,
        }
    }

    /// The carried keypad info, if this IE is one.
    pub fn as_keypad(&self) -> Option<&IeKeypad> {
        match self {
            Ie::Keypad(ie) => Some(ie),
            _ => None,
        }
    }

    /// The carried reject reason, if this IE is one.
    pub fn as_reject_reason(&self) -> Option<&IeRejectReason> {
        match self {
            Ie::RejectReason(ie) => Some(ie),
            _ => None,
        }
    }

    /// The carried release reason, if this IE is one.
    pub fn as_release_reason(&self) -> Option<&IeReleaseReason> {
        match self {
            Ie::ReleaseReason(ie) => Some(ie),
            _ => None,
        }
    }

    /// The carried location area, if this IE is one.
    pub fn as_location_area(&self) -> Option<&IeLocationArea> {
        match self {
            Ie::LocationArea(ie) => Some(ie),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatch() {
        let ie = Ie::parse(IeType::SingleDisplay, &[0xe8, b'x']).unwrap();
        assert_eq!(ie, Ie::Display(IeDisplay::new(b"x".to_vec())));
        assert_eq!(ie.ie_type(), IeType::SingleDisplay);
    }

    #[test]
    fn test_parse_without_handler_fails() {
        let raw = [0x75, 0x01, 0x00];
        assert_eq!(
            Ie::parse(IeType::SegmentedInfo, &raw),
            Err(SfmtError::InvalidIe("SEGMENTED-INFO"))
        );
    }

    #[test]
    fn test_build_without_handler_fails() {
        let ie = Ie::ServiceChangeInfo(IeServiceChangeInfo::default());
        let mut payload = Vec::new();
        assert!(ie.build(&mut payload).is_err());
    }

    #[test]
    fn test_rand_and_rs_key_differently() {
        let rand = Ie::Rand(IeAuthValue::new(1));
        let rs = Ie::Rs(IeAuthValue::new(1));
        assert_eq!(rand.ie_type(), IeType::Rand);
        assert_eq!(rs.ie_type(), IeType::Rs);
    }
}
