//! Message descriptors
//!
//! Every S-format message is described by an ordered table of IE entries
//! carrying the element type, its status in each transmission direction and
//! a repeat flag. Repeatable elements are introduced by a
//! <<REPEAT-INDICATOR>> entry immediately preceding them. The tables are
//! constant data; the drivers in [`crate::codec`] walk them for both
//! parsing and building.

use opendect_common::DectRole;

use crate::ie::IeType;

/// Presence status of an IE in one transmission direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IeStatus {
    /// Not allowed in this direction.
    None,
    /// May be present.
    Optional,
    /// Must be present.
    Mandatory,
}

/// One entry of a message descriptor.
#[derive(Debug, Clone, Copy)]
pub struct IeDescEntry {
    pub ie: IeType,
    /// Status in FP to PP direction.
    pub fp_pp: IeStatus,
    /// Status in PP to FP direction.
    pub pp_fp: IeStatus,
    /// The element may appear any number of times.
    pub repeat: bool,
}

impl IeDescEntry {
    /// Status applying to reception in the given role.
    pub fn rx_status(&self, role: DectRole) -> IeStatus {
        match role {
            DectRole::Fp => self.pp_fp,
            DectRole::Pp => self.fp_pp,
        }
    }

    /// Status applying to transmission in the given role.
    pub fn tx_status(&self, role: DectRole) -> IeStatus {
        match role {
            DectRole::Fp => self.fp_pp,
            DectRole::Pp => self.pp_fp,
        }
    }
}

/// A message descriptor: the IE grammar of one S-format message.
#[derive(Debug, Clone, Copy)]
pub struct MsgDescriptor {
    pub name: &'static str,
    pub entries: &'static [IeDescEntry],
}

const fn ie(ie: IeType, fp_pp: IeStatus, pp_fp: IeStatus) -> IeDescEntry {
    IeDescEntry {
        ie,
        fp_pp,
        pp_fp,
        repeat: false,
    }
}

const fn ie_rep(ie: IeType, fp_pp: IeStatus, pp_fp: IeStatus) -> IeDescEntry {
    IeDescEntry {
        ie,
        fp_pp,
        pp_fp,
        repeat: true,
    }
}

use IeStatus::{Mandatory, None as No, Optional as Opt};
use IeType::*;

/// Call Control message descriptors.
pub mod cc {
    use super::*;

    pub static CC_SETUP: MsgDescriptor = MsgDescriptor {
        name: "CC-SETUP",
        entries: &[
            ie(PortableIdentity, Mandatory, Mandatory),
            ie(FixedIdentity, Mandatory, Mandatory),
            ie(NwkAssignedIdentity, No, Opt),
            ie(BasicService, Mandatory, Mandatory),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(IwuAttributes, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(CallAttributes, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(ConnectionAttributes, Opt, Opt),
            ie(CipherInfo, Opt, Opt),
            ie(ConnectionIdentity, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(Facility, Opt, Opt),
            ie(RepeatIndicator, Opt, No),
            ie_rep(ProgressIndicator, Opt, No),
            ie(SingleDisplay, Opt, No),
            ie(SingleKeypad, No, Opt),
            ie(Signal, Opt, No),
            ie(FeatureActivate, No, Opt),
            ie(FeatureIndicate, Opt, No),
            ie(NetworkParameter, Opt, Opt),
            ie(ExtHoIndicator, Opt, No),
            ie(TerminalCapability, No, Opt),
            ie(EndToEndCompatibility, Opt, Opt),
            ie(RateParameters, Opt, Opt),
            ie(TransitDelay, Opt, Opt),
            ie(WindowSize, Opt, Opt),
            ie(CallingPartyNumber, Opt, Opt),
            ie(CalledPartyNumber, Opt, Opt),
            ie(CalledPartySubaddress, Opt, Opt),
            ie(SendingComplete, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(SegmentedInfo, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(IwuToIwu, Opt, Opt),
            ie(IwuPacket, Opt, Opt),
            ie(CallingPartyName, Opt, Opt),
            ie(CodecList, Opt, Opt),
            ie(CallInformation, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_INFO: MsgDescriptor = MsgDescriptor {
        name: "CC-INFO",
        entries: &[
            ie(LocationArea, No, Opt),
            ie(NwkAssignedIdentity, No, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(Facility, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(ProgressIndicator, Opt, No),
            ie(SingleDisplay, Opt, No),
            ie(SingleKeypad, Opt, Opt),
            ie(Signal, Opt, No),
            ie(FeatureActivate, No, Opt),
            ie(FeatureIndicate, Opt, No),
            ie(NetworkParameter, Opt, Opt),
            ie(ExtHoIndicator, Opt, No),
            ie(CallingPartyNumber, Opt, Opt),
            ie(CalledPartyNumber, Opt, Opt),
            ie(CalledPartySubaddress, Opt, Opt),
            ie(SendingComplete, Opt, Opt),
            ie(TestHookControl, Opt, No),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(IwuToIwu, Opt, Opt),
            ie(IwuPacket, Opt, Opt),
            ie(CallingPartyName, Opt, Opt),
            ie(CodecList, Opt, Opt),
            ie(CallInformation, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_SETUP_ACK: MsgDescriptor = MsgDescriptor {
        name: "CC-SETUP-ACK",
        entries: &[
            ie(InfoType, Opt, No),
            ie(PortableIdentity, Opt, No),
            ie(FixedIdentity, Opt, No),
            ie(LocationArea, Opt, No),
            ie(IwuAttributes, Opt, No),
            ie(CallAttributes, Opt, No),
            ie(ConnectionAttributes, Opt, No),
            ie(ConnectionIdentity, Opt, No),
            ie(RepeatIndicator, Opt, No),
            ie_rep(Facility, Opt, No),
            ie(RepeatIndicator, Opt, No),
            ie_rep(ProgressIndicator, Opt, No),
            ie(SingleDisplay, Opt, No),
            ie(Signal, Opt, No),
            ie(FeatureIndicate, Opt, No),
            ie(NetworkParameter, Opt, No),
            ie(ExtHoIndicator, Opt, No),
            ie(TransitDelay, Opt, No),
            ie(WindowSize, Opt, No),
            ie(DelimiterRequest, Opt, No),
            ie(RepeatIndicator, Opt, No),
            ie_rep(IwuToIwu, Opt, No),
            ie(IwuPacket, Opt, No),
            ie(CodecList, Opt, No),
            ie(EscapeToProprietary, Opt, No),
        ],
    };

    pub static CC_CALL_PROC: MsgDescriptor = MsgDescriptor {
        name: "CC-CALL-PROC",
        entries: &[
            ie(IwuAttributes, Opt, No),
            ie(CallAttributes, Opt, No),
            ie(ConnectionAttributes, Opt, No),
            ie(ConnectionIdentity, Opt, No),
            ie(RepeatIndicator, Opt, No),
            ie_rep(Facility, Opt, No),
            ie(RepeatIndicator, Opt, No),
            ie_rep(ProgressIndicator, Opt, No),
            ie(SingleDisplay, Opt, No),
            ie(Signal, Opt, No),
            ie(FeatureIndicate, Opt, No),
            ie(TransitDelay, Opt, No),
            ie(WindowSize, Opt, No),
            ie(RepeatIndicator, Opt, No),
            ie_rep(IwuToIwu, Opt, No),
            ie(IwuPacket, Opt, No),
            ie(CodecList, Opt, No),
            ie(EscapeToProprietary, Opt, No),
        ],
    };

    pub static CC_ALERTING: MsgDescriptor = MsgDescriptor {
        name: "CC-ALERTING",
        entries: &[
            ie(IwuAttributes, Opt, Opt),
            ie(CallAttributes, Opt, Opt),
            ie(ConnectionAttributes, Opt, Opt),
            ie(ConnectionIdentity, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(Facility, Opt, Opt),
            ie(RepeatIndicator, Opt, No),
            ie_rep(ProgressIndicator, Opt, No),
            ie(SingleDisplay, Opt, No),
            ie(Signal, Opt, No),
            ie(FeatureIndicate, Opt, No),
            ie(TerminalCapability, No, Opt),
            ie(TransitDelay, Opt, Opt),
            ie(WindowSize, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(IwuToIwu, Opt, Opt),
            ie(IwuPacket, Opt, Opt),
            ie(CodecList, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_CONNECT: MsgDescriptor = MsgDescriptor {
        name: "CC-CONNECT",
        entries: &[
            ie(IwuAttributes, Opt, Opt),
            ie(CallAttributes, Opt, Opt),
            ie(ConnectionAttributes, Opt, Opt),
            ie(ConnectionIdentity, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(Facility, Opt, Opt),
            ie(RepeatIndicator, Opt, No),
            ie_rep(ProgressIndicator, Opt, No),
            ie(SingleDisplay, Opt, No),
            ie(Signal, Opt, No),
            ie(FeatureIndicate, Opt, No),
            ie(NetworkParameter, Opt, No),
            ie(ExtHoIndicator, Opt, No),
            ie(TerminalCapability, No, Opt),
            ie(TransitDelay, Opt, Opt),
            ie(WindowSize, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(SegmentedInfo, Opt, Opt),
            ie(IwuToIwu, Opt, Opt),
            ie(IwuPacket, Opt, Opt),
            ie(CodecList, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_CONNECT_ACK: MsgDescriptor = MsgDescriptor {
        name: "CC-CONNECT-ACK",
        entries: &[
            ie(SingleDisplay, Opt, No),
            ie(FeatureIndicate, Opt, No),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(IwuToIwu, Opt, Opt),
            ie(IwuPacket, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_RELEASE: MsgDescriptor = MsgDescriptor {
        name: "CC-RELEASE",
        entries: &[
            ie(ReleaseReason, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(Facility, Opt, Opt),
            ie(RepeatIndicator, Opt, No),
            ie_rep(ProgressIndicator, Opt, No),
            ie(SingleDisplay, Opt, No),
            ie(FeatureIndicate, Opt, No),
            ie(RepeatIndicator, Opt, No),
            ie_rep(SegmentedInfo, Opt, Opt),
            ie(IwuToIwu, Opt, Opt),
            ie(IwuPacket, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_RELEASE_COM: MsgDescriptor = MsgDescriptor {
        name: "CC-RELEASE-COM",
        entries: &[
            ie(ReleaseReason, Opt, Opt),
            ie(IdentityType, Opt, No),
            ie(LocationArea, Opt, No),
            ie(IwuAttributes, Opt, Opt),
            ie(ConnectionAttributes, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(Facility, Opt, Opt),
            ie(SingleDisplay, Opt, No),
            ie(FeatureIndicate, Opt, No),
            ie(NetworkParameter, Opt, No),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(SegmentedInfo, Opt, Opt),
            ie(IwuToIwu, Opt, Opt),
            ie(IwuPacket, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_SERVICE_CHANGE: MsgDescriptor = MsgDescriptor {
        name: "CC-SERVICE-CHANGE",
        entries: &[
            ie(PortableIdentity, Mandatory, Mandatory),
            ie(IwuAttributes, Opt, Opt),
            ie(ServiceChangeInfo, Mandatory, Mandatory),
            ie(CallAttributes, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(ConnectionAttributes, Opt, Opt),
            ie(ConnectionIdentity, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(SegmentedInfo, Opt, Opt),
            ie(IwuToIwu, Opt, Opt),
            ie(CodecList, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_SERVICE_ACCEPT: MsgDescriptor = MsgDescriptor {
        name: "CC-SERVICE-ACCEPT",
        entries: &[
            ie(IwuAttributes, Opt, Opt),
            ie(ConnectionIdentity, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(SegmentedInfo, Opt, Opt),
            ie(IwuToIwu, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_SERVICE_REJECT: MsgDescriptor = MsgDescriptor {
        name: "CC-SERVICE-REJECT",
        entries: &[
            ie(ReleaseReason, Opt, Opt),
            ie(IwuAttributes, Opt, Opt),
            ie(ConnectionAttributes, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(SegmentedInfo, Opt, Opt),
            ie(IwuToIwu, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_NOTIFY: MsgDescriptor = MsgDescriptor {
        name: "CC-NOTIFY",
        entries: &[
            ie(TimerRestart, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static CC_IWU_INFO: MsgDescriptor = MsgDescriptor {
        name: "CC-IWU-INFO",
        entries: &[],
    };
}

/// Mobility Management message descriptors.
pub mod mm {
    use super::*;

    pub static MM_ACCESS_RIGHTS_ACCEPT: MsgDescriptor = MsgDescriptor {
        name: "MM-ACCESS-RIGHTS-ACCEPT",
        entries: &[
            ie(PortableIdentity, Mandatory, No),
            ie(RepeatIndicator, Opt, No),
            ie_rep(FixedIdentity, Mandatory, No),
            ie(LocationArea, Opt, No),
            ie(AuthType, Opt, No),
            ie(CipherInfo, Opt, No),
            ie(ZapField, Opt, No),
            ie(ServiceClass, Opt, No),
            ie(SetupCapability, Opt, No),
            ie(ModelIdentifier, Opt, No),
            ie(IwuToIwu, Opt, No),
            ie(CodecList, Opt, No),
            ie(EscapeToProprietary, Opt, No),
        ],
    };

    pub static MM_ACCESS_RIGHTS_REQUEST: MsgDescriptor = MsgDescriptor {
        name: "MM-ACCESS-RIGHTS-REQUEST",
        entries: &[
            ie(PortableIdentity, No, Mandatory),
            ie(AuthType, No, Opt),
            ie(CipherInfo, No, Opt),
            ie(SetupCapability, No, Opt),
            ie(TerminalCapability, No, Opt),
            ie(IwuToIwu, No, Opt),
            ie(ModelIdentifier, No, Opt),
            ie(CodecList, No, Opt),
            ie(EscapeToProprietary, No, Opt),
        ],
    };

    pub static MM_ACCESS_RIGHTS_REJECT: MsgDescriptor = MsgDescriptor {
        name: "MM-ACCESS-RIGHTS-REJECT",
        entries: &[
            ie(RejectReason, Opt, No),
            ie(Duration, Opt, No),
            ie(IwuToIwu, No, Opt),
            ie(EscapeToProprietary, No, Opt),
        ],
    };

    pub static MM_AUTHENTICATION_REJECT: MsgDescriptor = MsgDescriptor {
        name: "MM-AUTHENTICATION-REJECT",
        entries: &[
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(AuthType, Opt, Opt),
            ie(RejectReason, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(IwuToIwu, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static MM_AUTHENTICATION_REPLY: MsgDescriptor = MsgDescriptor {
        name: "MM-AUTHENTICATION-REPLY",
        entries: &[
            ie(Res, Mandatory, Mandatory),
            ie(Rs, Opt, No),
            ie(ZapField, No, Opt),
            ie(ServiceClass, No, Opt),
            ie(Key, No, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(IwuToIwu, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static MM_AUTHENTICATION_REQUEST: MsgDescriptor = MsgDescriptor {
        name: "MM-AUTHENTICATION-REQUEST",
        entries: &[
            ie(AuthType, Mandatory, Mandatory),
            ie(Rand, Mandatory, Mandatory),
            ie(Res, No, Opt),
            ie(Rs, Opt, No),
            ie(CipherInfo, Opt, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(IwuToIwu, Opt, Opt),
            ie(EscapeToProprietary, Opt, Opt),
        ],
    };

    pub static MM_KEY_ALLOCATE: MsgDescriptor = MsgDescriptor {
        name: "MM-KEY-ALLOCATE",
        entries: &[
            ie(AllocationType, Mandatory, No),
            ie(Rand, Mandatory, No),
            ie(Rs, Mandatory, No),
            ie(EscapeToProprietary, Opt, No),
        ],
    };

    pub static MM_LOCATE_ACCEPT: MsgDescriptor = MsgDescriptor {
        name: "MM-LOCATE-ACCEPT",
        entries: &[
            ie(PortableIdentity, Mandatory, No),
            ie(LocationArea, Mandatory, No),
            ie(UseTpui, Opt, No),
            ie(NwkAssignedIdentity, Opt, No),
            ie(ExtHoIndicator, Opt, No),
            ie(SetupCapability, Opt, No),
            ie(Duration, Opt, No),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(SegmentedInfo, Opt, Opt),
            ie(IwuToIwu, Opt, No),
            ie(ModelIdentifier, Opt, No),
            ie(CodecList, Opt, No),
            ie(EscapeToProprietary, Opt, No),
        ],
    };

    pub static MM_LOCATE_REJECT: MsgDescriptor = MsgDescriptor {
        name: "MM-LOCATE-REJECT",
        entries: &[
            ie(RejectReason, Opt, No),
            ie(Duration, Opt, No),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(SegmentedInfo, Opt, Opt),
            ie(IwuToIwu, Opt, No),
            ie(EscapeToProprietary, Opt, No),
        ],
    };

    pub static MM_LOCATE_REQUEST: MsgDescriptor = MsgDescriptor {
        name: "MM-LOCATE-REQUEST",
        entries: &[
            ie(PortableIdentity, No, Mandatory),
            ie(FixedIdentity, No, Opt),
            ie(LocationArea, No, Opt),
            ie(NwkAssignedIdentity, No, Opt),
            ie(CipherInfo, No, Opt),
            ie(SetupCapability, No, Opt),
            ie(TerminalCapability, No, Opt),
            ie(NetworkParameter, No, Opt),
            ie(RepeatIndicator, Opt, Opt),
            ie_rep(SegmentedInfo, Opt, Opt),
            ie(IwuToIwu, No, Opt),
            ie(ModelIdentifier, No, Opt),
            ie(CodecList, No, Opt),
            ie(EscapeToProprietary, No, Opt),
        ],
    };

    pub static MM_TEMPORARY_IDENTITY_ASSIGN: MsgDescriptor = MsgDescriptor {
        name: "MM-TEMPORARY-IDENTITY-ASSIGN",
        entries: &[
            ie(PortableIdentity, Opt, No),
            ie(LocationArea, Opt, No),
            ie(NwkAssignedIdentity, Opt, No),
            ie(Duration, Opt, No),
            ie(NetworkParameter, Opt, No),
            ie(RepeatIndicator, Opt, No),
            ie_rep(IwuToIwu, Opt, No),
            ie(EscapeToProprietary, Opt, No),
        ],
    };

    pub static MM_TEMPORARY_IDENTITY_ASSIGN_ACK: MsgDescriptor = MsgDescriptor {
        name: "MM-TEMPORARY-IDENTITY-ASSIGN-ACK",
        entries: &[
            ie(SegmentedInfo, No, Opt),
            ie(IwuToIwu, No, Opt),
            ie(EscapeToProprietary, No, Opt),
        ],
    };

    pub static MM_TEMPORARY_IDENTITY_ASSIGN_REJ: MsgDescriptor = MsgDescriptor {
        name: "MM-TEMPORARY-IDENTITY-ASSIGN-REJ",
        entries: &[
            ie(RejectReason, No, Opt),
            ie(EscapeToProprietary, No, Opt),
        ],
    };
}
