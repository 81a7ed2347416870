//! S-format information element framing
//!
//! Two IE framings exist on the wire (EN 300 175-5 section 7.5):
//!
//! - Fixed-length IEs have bit 8 of the first octet set. Bits 7-5 identify
//!   the element, bits 4-1 carry an in-line value. The `0xe0` family has a
//!   second value octet; the `0xb0` (extension prefix) family folds the
//!   value nibble into the identifier.
//! - Variable-length IEs have bit 8 clear: identifier octet, length octet,
//!   then the payload.

use opendect_common::MsgBuf;

use crate::error::{SfmtError, SfmtResult};

/// Fixed-length IE marker bit.
pub const IE_FIXED_LEN: u8 = 0x80;
/// Identifier bits of a fixed-length IE.
pub const IE_FIXED_ID_MASK: u8 = 0x70;
/// Value bits of a fixed-length IE.
pub const IE_FIXED_VAL_MASK: u8 = 0x0f;
/// Octet-group end marker used inside variable-length IE payloads.
pub const OCTET_GROUP_END: u8 = 0x80;

/// Identifier base of the single-octet extension prefix family.
pub const IE_EXT_PREFIX: u8 = 0xb0;
/// Identifier base of the double-octet element family.
pub const IE_DOUBLE_OCTET: u8 = 0xe0;

/// Information element identifiers.
///
/// The discriminant is the wire identifier: for double-octet and extension
/// prefix elements the value nibble is folded in, matching the framing
/// rules above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum IeType {
    // Variable-length IEs
    InfoType = 0x01,
    IdentityType = 0x02,
    PortableIdentity = 0x05,
    FixedIdentity = 0x06,
    LocationArea = 0x07,
    NwkAssignedIdentity = 0x09,
    AuthType = 0x0a,
    AllocationType = 0x0b,
    Rand = 0x0c,
    Res = 0x0d,
    Rs = 0x0e,
    IwuAttributes = 0x12,
    CallAttributes = 0x13,
    ServiceChangeInfo = 0x16,
    ConnectionAttributes = 0x17,
    CipherInfo = 0x19,
    CallIdentity = 0x1a,
    ConnectionIdentity = 0x1b,
    Facility = 0x1c,
    ProgressIndicator = 0x1e,
    MmsGenericHeader = 0x20,
    MmsObjectHeader = 0x21,
    MmsExtendedHeader = 0x22,
    TimeDate = 0x23,
    MultiDisplay = 0x28,
    MultiKeypad = 0x2c,
    FeatureActivate = 0x38,
    FeatureIndicate = 0x39,
    NetworkParameter = 0x41,
    ExtHoIndicator = 0x42,
    ZapField = 0x52,
    ServiceClass = 0x54,
    Key = 0x56,
    RejectReason = 0x60,
    SetupCapability = 0x62,
    TerminalCapability = 0x63,
    EndToEndCompatibility = 0x64,
    RateParameters = 0x65,
    TransitDelay = 0x66,
    WindowSize = 0x67,
    CallingPartyNumber = 0x6c,
    CallingPartyName = 0x6d,
    CalledPartyNumber = 0x70,
    CalledPartySubaddress = 0x71,
    Duration = 0x72,
    SegmentedInfo = 0x75,
    Alphanumeric = 0x76,
    IwuToIwu = 0x77,
    ModelIdentifier = 0x78,
    IwuPacket = 0x7a,
    EscapeToProprietary = 0x7b,
    CodecList = 0x7c,
    EventsNotification = 0x7d,
    CallInformation = 0x7e,
    EscapeForExtension = 0x7f,

    // Fixed-length single-octet IEs
    Shift = 0x90,
    SendingComplete = 0xb1,
    DelimiterRequest = 0xb2,
    UseTpui = 0xb3,
    RepeatIndicator = 0xd0,

    // Fixed-length double-octet IEs
    BasicService = 0xe0,
    ReleaseReason = 0xe2,
    Signal = 0xe4,
    TimerRestart = 0xe5,
    TestHookControl = 0xe6,
    SingleDisplay = 0xe8,
    SingleKeypad = 0xe9,
}

impl IeType {
    /// Maps a decoded wire identifier to the IE type.
    pub fn from_wire(id: u8) -> Option<IeType> {
        use IeType::*;
        Some(match id {
            0x01 => InfoType,
            0x02 => IdentityType,
            0x05 => PortableIdentity,
            0x06 => FixedIdentity,
            0x07 => LocationArea,
            0x09 => NwkAssignedIdentity,
            0x0a => AuthType,
            0x0b => AllocationType,
            0x0c => Rand,
            0x0d => Res,
            0x0e => Rs,
            0x12 => IwuAttributes,
            0x13 => CallAttributes,
            0x16 => ServiceChangeInfo,
            0x17 => ConnectionAttributes,
            0x19 => CipherInfo,
            0x1a => CallIdentity,
            0x1b => ConnectionIdentity,
            0x1c => Facility,
            0x1e => ProgressIndicator,
            0x20 => MmsGenericHeader,
            0x21 => MmsObjectHeader,
            0x22 => MmsExtendedHeader,
            0x23 => TimeDate,
            0x28 => MultiDisplay,
            0x2c => MultiKeypad,
            0x38 => FeatureActivate,
            0x39 => FeatureIndicate,
            0x41 => NetworkParameter,
            0x42 => ExtHoIndicator,
            0x52 => ZapField,
            0x54 => ServiceClass,
            0x56 => Key,
            0x60 => RejectReason,
            0x62 => SetupCapability,
            0x63 => TerminalCapability,
            0x64 => EndToEndCompatibility,
            0x65 => RateParameters,
            0x66 => TransitDelay,
            0x67 => WindowSize,
            0x6c => CallingPartyNumber,
            0x6d => CallingPartyName,
            0x70 => CalledPartyNumber,
            0x71 => CalledPartySubaddress,
            0x72 => Duration,
            0x75 => SegmentedInfo,
            0x76 => Alphanumeric,
            0x77 => IwuToIwu,
            0x78 => ModelIdentifier,
            0x7a => IwuPacket,
            0x7b => EscapeToProprietary,
            0x7c => CodecList,
            0x7d => EventsNotification,
            0x7e => CallInformation,
            0x7f => EscapeForExtension,
            0x90 => Shift,
            0xb1 => SendingComplete,
            0xb2 => DelimiterRequest,
            0xb3 => UseTpui,
            0xd0 => RepeatIndicator,
            0xe0 => BasicService,
            0xe2 => ReleaseReason,
            0xe4 => Signal,
            0xe5 => TimerRestart,
            0xe6 => TestHookControl,
            0xe8 => SingleDisplay,
            0xe9 => SingleKeypad,
            _ => return None,
        })
    }

    /// The wire identifier.
    pub fn wire_id(&self) -> u8 {
        *self as u8
    }

    /// Returns true for fixed-length (single- or double-octet) IEs.
    pub fn is_fixed(&self) -> bool {
        self.wire_id() & IE_FIXED_LEN != 0
    }

    /// Returns true for the double-octet element family.
    pub fn is_double_octet(&self) -> bool {
        self.is_fixed() && (self.wire_id() & (IE_FIXED_LEN | IE_FIXED_ID_MASK)) == IE_DOUBLE_OCTET
    }

    /// Human-readable IE name, as spelled in EN 300 175-5.
    pub fn name(&self) -> &'static str {
        use IeType::*;
        match self {
            InfoType => "INFO-TYPE",
            IdentityType => "IDENTITY-TYPE",
            PortableIdentity => "PORTABLE-IDENTITY",
            FixedIdentity => "FIXED-IDENTITY",
            LocationArea => "LOCATION-AREA",
            NwkAssignedIdentity => "NWK-ASSIGNED-IDENTITY",
            AuthType => "AUTH-TYPE",
            AllocationType => "ALLOCATION-TYPE",
            Rand => "RAND",
            Res => "RES",
            Rs => "RS",
            IwuAttributes => "IWU-ATTRIBUTES",
            CallAttributes => "CALL-ATTRIBUTES",
            ServiceChangeInfo => "SERVICE-CHANGE-INFO",
            ConnectionAttributes => "CONNECTION-ATTRIBUTES",
            CipherInfo => "CIPHER-INFO",
            CallIdentity => "CALL-IDENTITY",
            ConnectionIdentity => "CONNECTION-IDENTITY",
            Facility => "FACILITY",
            ProgressIndicator => "PROGRESS-INDICATOR",
            MmsGenericHeader => "MMS-GENERIC-HEADER",
            MmsObjectHeader => "MMS-OBJECT-HEADER",
            MmsExtendedHeader => "MMS-EXTENDED-HEADER",
            TimeDate => "TIME-DATE",
            MultiDisplay => "MULTI-DISPLAY",
            MultiKeypad => "MULTI-KEYPAD",
            FeatureActivate => "FEATURE-ACTIVATE",
            FeatureIndicate => "FEATURE-INDICATE",
            NetworkParameter => "NETWORK-PARAMETER",
            ExtHoIndicator => "EXT-H/O-INDICATOR",
            ZapField => "ZAP-FIELD",
            ServiceClass => "SERVICE-CLASS",
            Key => "KEY",
            RejectReason => "REJECT-REASON",
            SetupCapability => "SETUP-CAPABILITY",
            TerminalCapability => "TERMINAL-CAPABILITY",
            EndToEndCompatibility => "END-TO-END-COMPATIBILITY",
            RateParameters => "RATE-PARAMETERS",
            TransitDelay => "TRANSIT-DELAY",
            WindowSize => "WINDOW-SIZE",
            CallingPartyNumber => "CALLING-PARTY-NUMBER",
            CallingPartyName => "CALLING-PARTY-NAME",
            CalledPartyNumber => "CALLED-PARTY-NUMBER",
            CalledPartySubaddress => "CALLED-PARTY-SUBADDRESS",
            Duration => "DURATION",
            SegmentedInfo => "SEGMENTED-INFO",
            Alphanumeric => "ALPHANUMERIC",
            IwuToIwu => "IWU-TO-IWU",
            ModelIdentifier => "MODEL-IDENTIFIER",
            IwuPacket => "IWU-PACKET",
            EscapeToProprietary => "ESCAPE-TO-PROPRIETARY",
            CodecList => "CODEC-LIST",
            EventsNotification => "EVENTS-NOTIFICATION",
            CallInformation => "CALL-INFORMATION",
            EscapeForExtension => "ESCAPE-FOR-EXTENSION",
            Shift => "SHIFT",
            SendingComplete => "SENDING-COMPLETE",
            DelimiterRequest => "DELIMITER-REQUEST",
            UseTpui => "USE-TPUI",
            RepeatIndicator => "REPEAT-INDICATOR",
            BasicService => "BASIC-SERVICE",
            ReleaseReason => "RELEASE-REASON",
            Signal => "SIGNAL",
            TimerRestart => "TIMER-RESTART",
            TestHookControl => "TEST-HOOK-CONTROL",
            SingleDisplay => "SINGLE-DISPLAY",
            SingleKeypad => "SINGLE-KEYPAD",
        }
    }
}

/// A raw S-format IE located in a message buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeHeader {
    /// Decoded wire identifier (value nibble folded in where applicable).
    pub id: u8,
    /// Total length including the header octets.
    pub len: usize,
}

/// Parses the header of the next IE in the buffer without consuming it.
///
/// Verifies that the full IE is available. `mb.slice()[..hdr.len]` is the
/// raw IE, header octets included.
pub fn parse_ie_header(mb: &MsgBuf) -> SfmtResult<IeHeader> {
    let data = mb.slice();
    let Some(&first) = data.first() else {
        return Err(SfmtError::Truncated);
    };

    if first & IE_FIXED_LEN != 0 {
        let base = first & (IE_FIXED_LEN | IE_FIXED_ID_MASK);
        let val = first & IE_FIXED_VAL_MASK;
        if base != IE_DOUBLE_OCTET {
            let id = if base == IE_EXT_PREFIX { base | val } else { base };
            Ok(IeHeader { id, len: 1 })
        } else {
            if data.len() < 2 {
                return Err(SfmtError::Truncated);
            }
            Ok(IeHeader {
                id: base | val,
                len: 2,
            })
        }
    } else {
        if data.len() < 2 || data.len() < 2 + data[1] as usize {
            return Err(SfmtError::Truncated);
        }
        Ok(IeHeader {
            id: first,
            len: 2 + data[1] as usize,
        })
    }
}
