//! Call-related information elements
//!
//! The larger variable-length elements used by Call Control and the MM
//! reject path: party numbers and names, progress, capabilities, durations,
//! interworking containers and the reject reason.

use bytes::BufMut;
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::error::{SfmtError, SfmtResult};
use crate::ie::OCTET_GROUP_END;

/// Reject reasons (EN 300 175-5 section 7.7.34).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum RejectReasonValue {
    TpuiUnknown = 0x01,
    IpuiUnknown = 0x02,
    NetworkAssignedIdentityUnknown = 0x03,
    IpeiNotAccepted = 0x05,
    IpuiNotAccepted = 0x06,
    AuthenticationFailed = 0x10,
    NoAuthenticationAlgorithm = 0x11,
    AuthenticationAlgorithmNotSupported = 0x12,
    AuthenticationKeyNotSupported = 0x13,
    UpiNotEntered = 0x14,
    NoCipherAlgorithm = 0x17,
    CipherAlgorithmNotSupported = 0x18,
    CipherKeyNotSupported = 0x19,
    IncompatibleService = 0x20,
    FalseLceReply = 0x21,
    LateLceReply = 0x22,
    InvalidTpui = 0x23,
    TpuiAssignmentLimitsUnacceptable = 0x24,
    InsufficientMemory = 0x2f,
    Overload = 0x30,
    TestCallBackNormalEnBloc = 0x40,
    TestCallBackNormalPiecewise = 0x41,
    TestCallBackEmergencyEnBloc = 0x42,
    TestCallBackEmergencyPiecewise = 0x43,
    InvalidMessage = 0x5f,
    InformationElementError = 0x60,
    InvalidInformationElementContents = 0x64,
    TimerExpiry = 0x70,
    PlmnNotAllowed = 0x76,
    LocationAreaNotAllowed = 0x80,
    NationalRoamingNotAllowed = 0x81,
    #[num_enum(catch_all)]
    Other(u8),
}

/// <<REJECT-REASON>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeRejectReason {
    pub reason: RejectReasonValue,
}

impl IeRejectReason {
    pub fn new(reason: RejectReasonValue) -> Self {
        Self { reason }
    }

    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("reject reason too short"));
        }
        Ok(Self {
            reason: RejectReasonValue::from(data[2]),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(u8::from(self.reason));
        Ok(())
    }
}

/// <<PROGRESS-INDICATOR>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeProgressIndicator {
    /// Location (4 bits).
    pub location: u8,
    /// Progress description (7 bits).
    pub progress: u8,
}

impl IeProgressIndicator {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 4 {
            return Err(SfmtError::InvalidContents("progress indicator too short"));
        }
        Ok(Self {
            location: data[2] & 0x0f,
            progress: data[3] & !OCTET_GROUP_END,
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(OCTET_GROUP_END | self.location);
        payload.push(OCTET_GROUP_END | self.progress);
        Ok(())
    }
}

/// <<TIME-DATE>> coding values.
pub const TIME_DATE_TIME: u8 = 0x1;
pub const TIME_DATE_DATE: u8 = 0x2;
pub const TIME_DATE_TIME_AND_DATE: u8 = 0x3;

/// <<TIME-DATE>> IE. All calendar fields are BCD coded.
///
/// The coding field gates which octet groups follow: bit 1 the three date
/// octets, bit 0 the four time octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeTimeDate {
    pub coding: u8,
    pub interpretation: u8,
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub timezone: u8,
}

impl IeTimeDate {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("time-date too short"));
        }
        let mut ie = Self {
            coding: data[2] >> 6,
            interpretation: data[2] & 0x3f,
            ..Default::default()
        };
        let mut n = 3;

        if ie.coding & TIME_DATE_DATE != 0 {
            if data.len() < n + 3 {
                return Err(SfmtError::InvalidContents("time-date date octets"));
            }
            ie.year = data[n];
            ie.month = data[n + 1];
            ie.day = data[n + 2];
            n += 3;
        }
        if ie.coding & TIME_DATE_TIME != 0 {
            if data.len() < n + 4 {
                return Err(SfmtError::InvalidContents("time-date time octets"));
            }
            ie.hour = data[n];
            ie.minute = data[n + 1];
            ie.second = data[n + 2];
            ie.timezone = data[n + 3];
        }
        Ok(ie)
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push((self.coding << 6) | (self.interpretation & 0x3f));
        if self.coding & TIME_DATE_DATE != 0 {
            payload.push(self.year);
            payload.push(self.month);
            payload.push(self.day);
        }
        if self.coding & TIME_DATE_TIME != 0 {
            payload.push(self.hour);
            payload.push(self.minute);
            payload.push(self.second);
            payload.push(self.timezone);
        }
        Ok(())
    }
}

/// Feature values of <<FEATURE-ACTIVATE>> / <<FEATURE-INDICATE>>.
pub const FEATURE_REGISTER_RECALL: u8 = 0x01;

/// <<FEATURE-ACTIVATE>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeFeatureActivate {
    pub feature: u8,
}

impl IeFeatureActivate {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("feature activate too short"));
        }
        Ok(Self {
            feature: data[2] & !OCTET_GROUP_END,
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(self.feature | OCTET_GROUP_END);
        Ok(())
    }
}

/// <<FEATURE-INDICATE>> IE. The original only decodes this element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeFeatureIndicate {
    pub feature: u8,
    pub status: u8,
}

impl IeFeatureIndicate {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 4 {
            return Err(SfmtError::InvalidContents("feature indicate too short"));
        }
        Ok(Self {
            feature: data[2] & !OCTET_GROUP_END,
            status: data[3],
        })
    }
}

/// <<NETWORK-PARAMETER>> IE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeNetworkParameter {
    pub discriminator: u8,
    pub data: Vec<u8>,
}

impl IeNetworkParameter {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("network parameter too short"));
        }
        Ok(Self {
            discriminator: data[2],
            data: data[3..].to_vec(),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(self.discriminator);
        payload.extend_from_slice(&self.data);
        Ok(())
    }
}

/// <<SETUP-CAPABILITY>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeSetupCapability {
    pub page_capability: u8,
    pub setup_capability: u8,
}

impl IeSetupCapability {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("setup capability too short"));
        }
        Ok(Self {
            page_capability: data[2] & 0x3,
            setup_capability: (data[2] & 0xc) >> 2,
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(OCTET_GROUP_END | (self.setup_capability << 2) | self.page_capability);
        Ok(())
    }
}

/// <<TERMINAL-CAPABILITY>> IE.
///
/// Up to five octet groups, each terminated by the group-end bit of its
/// last octet; groups 4 onward are optional. The display memory spans two
/// octets with base-128 accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeTerminalCapability {
    pub display: u8,
    pub tone: u8,
    pub echo: u8,
    pub noise_rejection: u8,
    pub volume_ctrl: u8,
    pub slot: u8,
    pub display_memory: u32,
    pub display_lines: u8,
    pub display_columns: u8,
    pub scrolling: u8,
    pub profile_indicator: u64,
    pub display_control: u8,
    pub display_charsets: u8,
}

const TERMINAL_CAPABILITY_DISPLAY_MASK: u8 = 0x0f;
const TERMINAL_CAPABILITY_TONE_SHIFT: u8 = 4;
const TERMINAL_CAPABILITY_ECHO_SHIFT: u8 = 4;
const TERMINAL_CAPABILITY_NOISE_SHIFT: u8 = 2;

impl IeTerminalCapability {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        let mut ie = Self::default();
        let mut n = 2;

        let octet = |n: usize| -> SfmtResult<u8> {
            data.get(n)
                .copied()
                .ok_or(SfmtError::InvalidContents("terminal capability too short"))
        };

        // Octet group 3
        'group3: {
            let b = octet(n)?;
            ie.display = b & TERMINAL_CAPABILITY_DISPLAY_MASK;
            ie.tone = (b & 0x70) >> TERMINAL_CAPABILITY_TONE_SHIFT;
            n += 1;
            if b & OCTET_GROUP_END != 0 {
                break 'group3;
            }

            let b = octet(n)?;
            ie.echo = (b & 0x70) >> TERMINAL_CAPABILITY_ECHO_SHIFT;
            ie.noise_rejection = (b & 0x0c) >> TERMINAL_CAPABILITY_NOISE_SHIFT;
            ie.volume_ctrl = b & 0x03;
            n += 1;
            if b & OCTET_GROUP_END != 0 {
                break 'group3;
            }

            let b = octet(n)?;
            ie.slot = b & !OCTET_GROUP_END;
            n += 1;
            if b & OCTET_GROUP_END != 0 {
                break 'group3;
            }

            let b = octet(n)?;
            ie.display_memory = u32::from(b & !OCTET_GROUP_END);
            n += 1;
            if b & OCTET_GROUP_END != 0 {
                break 'group3;
            }
            ie.display_memory <<= 7;

            let b = octet(n)?;
            ie.display_memory += u32::from(b & !OCTET_GROUP_END);
            n += 1;
            if b & OCTET_GROUP_END != 0 {
                break 'group3;
            }

            let b = octet(n)?;
            ie.display_lines = b & !OCTET_GROUP_END;
            n += 1;
            if b & OCTET_GROUP_END != 0 {
                break 'group3;
            }

            let b = octet(n)?;
            ie.display_columns = b & !OCTET_GROUP_END;
            n += 1;
            if b & OCTET_GROUP_END != 0 {
                break 'group3;
            }

            let b = octet(n)?;
            ie.scrolling = b & !OCTET_GROUP_END;
            n += 1;
        }

        // Octet group 4: profile indicator, up to eight octets
        for i in 0..8 {
            let b = octet(n)?;
            ie.profile_indicator |= u64::from(b & !OCTET_GROUP_END) << (64 - 8 * (i + 1));
            n += 1;
            if b & OCTET_GROUP_END != 0 {
                break;
            }
        }

        // Octet group 5
        let b = octet(n)?;
        ie.display_control = b & 0x7;
        n += 1;
        if b & OCTET_GROUP_END == 0 {
            let b = octet(n)?;
            ie.display_charsets = b & !OCTET_GROUP_END;
            n += 1;
        }

        // Octet groups 6/7: tolerated but not stored; older equipment omits them
        if n < data.len() {
            let b = octet(n)?;
            n += 1;
            if b & OCTET_GROUP_END == 0 {
                let b = octet(n)?;
                if b & OCTET_GROUP_END == 0 {
                    return Err(SfmtError::InvalidContents("terminal capability group 6"));
                }
            }
        }
        Ok(ie)
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        // Octet group 3
        payload.push(self.display | (self.tone << TERMINAL_CAPABILITY_TONE_SHIFT));
        payload.push(
            (self.echo << TERMINAL_CAPABILITY_ECHO_SHIFT)
                | (self.noise_rejection << TERMINAL_CAPABILITY_NOISE_SHIFT)
                | self.volume_ctrl,
        );
        payload.push(self.slot);
        payload.push(((self.display_memory >> 7) & 0x7f) as u8);
        payload.push((self.display_memory & 0x7f) as u8);
        payload.push(self.display_lines);
        payload.push(self.display_columns);
        payload.push(self.scrolling | OCTET_GROUP_END);

        // Octet group 4
        for i in 0..8 {
            let shift = 64 - 8 * (i + 1);
            let mut b = ((self.profile_indicator >> shift) & 0x7f) as u8;
            let rest_mask = if shift == 0 { 0 } else { (1u64 << shift) - 1 };
            if self.profile_indicator & rest_mask == 0 {
                b |= OCTET_GROUP_END;
                payload.push(b);
                break;
            }
            payload.push(b);
        }

        // Octet group 5
        payload.push(self.display_control);
        payload.push(self.display_charsets | OCTET_GROUP_END);
        Ok(())
    }
}

/// Number types of the party number IEs.
pub const NUMBER_TYPE_UNKNOWN: u8 = 0x0;
pub const NUMBER_TYPE_INTERNATIONAL: u8 = 0x1;
pub const NUMBER_TYPE_NATIONAL: u8 = 0x2;
pub const NUMBER_TYPE_SUBSCRIBER: u8 = 0x4;

/// Numbering plan identifiers.
pub const NPI_UNKNOWN: u8 = 0x0;
pub const NPI_ISDN_E164: u8 = 0x1;
pub const NPI_PRIVATE: u8 = 0x9;

/// Presentation indicators.
pub const PRESENTATION_ALLOWED: u8 = 0x0;
pub const PRESENTATION_RESTRICTED: u8 = 0x1;
pub const PRESENTATION_NOT_AVAILABLE: u8 = 0x2;
pub const PRESENTATION_HANDSET_LOCATOR: u8 = 0x3;

/// Screening indicators.
pub const SCREENING_USER_PROVIDED_NOT_SCREENED: u8 = 0x0;
pub const SCREENING_NETWORK_PROVIDED: u8 = 0x3;

/// <<CALLING-PARTY-NUMBER>> IE.
///
/// Octet 3a (presentation/screening) is elided when presentation is
/// restricted or not available.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeCallingPartyNumber {
    pub ty: u8,
    pub npi: u8,
    pub presentation: u8,
    pub screening: u8,
    pub address: Vec<u8>,
}

impl IeCallingPartyNumber {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("calling party number too short"));
        }
        let mut ie = Self {
            ty: (data[2] & 0x70) >> 4,
            npi: data[2] & 0x0f,
            ..Default::default()
        };
        let mut n = 2;

        if data[n] & OCTET_GROUP_END == 0 {
            n += 1;
            let Some(&b) = data.get(n) else {
                return Err(SfmtError::InvalidContents("calling party number octet 3a"));
            };
            if b & OCTET_GROUP_END == 0 {
                return Err(SfmtError::InvalidContents("calling party number groups"));
            }
            ie.presentation = (b >> 5) & 0x3;
            ie.screening = b & 0x3;
        } else {
            ie.presentation = PRESENTATION_RESTRICTED;
        }
        n += 1;

        ie.address = data[n..].to_vec();
        Ok(ie)
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        let mut octet3 = (self.ty << 4) | (self.npi & 0x0f);
        if self.presentation == PRESENTATION_RESTRICTED
            || self.presentation == PRESENTATION_NOT_AVAILABLE
        {
            octet3 |= OCTET_GROUP_END;
            payload.push(octet3);
        } else {
            payload.push(octet3);
            payload.push(OCTET_GROUP_END | (self.presentation << 5) | (self.screening & 0x3));
        }
        payload.extend_from_slice(&self.address);
        Ok(())
    }
}

/// Alphabets used by <<CALLING-PARTY-NAME>>.
pub const ALPHABET_STANDARD: u8 = 0x0;
pub const ALPHABET_UTF8: u8 = 0x1;

/// <<CALLING-PARTY-NAME>> IE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeCallingPartyName {
    pub presentation: u8,
    pub alphabet: u8,
    pub screening: u8,
    pub name: Vec<u8>,
}

impl IeCallingPartyName {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("calling party name too short"));
        }
        Ok(Self {
            presentation: (data[2] >> 5) & 0x3,
            alphabet: (data[2] >> 2) & 0x7,
            screening: data[2] & 0x3,
            name: data[3..].to_vec(),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push((self.presentation << 5) | (self.alphabet << 2) | (self.screening & 0x3));
        payload.extend_from_slice(&self.name);
        Ok(())
    }
}

/// <<CALLED-PARTY-NUMBER>> IE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeCalledPartyNumber {
    pub ty: u8,
    pub npi: u8,
    pub address: Vec<u8>,
}

impl IeCalledPartyNumber {
    pub fn new(ty: u8, npi: u8, address: impl Into<Vec<u8>>) -> Self {
        Self {
            ty,
            npi,
            address: address.into(),
        }
    }

    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("called party number too short"));
        }
        Ok(Self {
            ty: (data[2] & 0x70) >> 4,
            npi: data[2] & 0x0f,
            address: data[3..].to_vec(),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(OCTET_GROUP_END | (self.ty << 4) | (self.npi & 0x0f));
        payload.extend_from_slice(&self.address);
        Ok(())
    }
}

/// Lock limits of the <<DURATION>> IE.
pub const LOCK_TEMPORARY_USER_LIMIT_2: u8 = 0x5;
pub const LOCK_TEMPORARY_USER_LIMIT_1: u8 = 0x6;
pub const LOCK_NO_LIMITS: u8 = 0x7;

/// Time limits of the <<DURATION>> IE.
pub const TIME_LIMIT_ERASE: u8 = 0x0;
pub const TIME_LIMIT_DEFINED_1: u8 = 0x1;
pub const TIME_LIMIT_DEFINED_2: u8 = 0x2;
pub const TIME_LIMIT_STANDARD: u8 = 0x4;
pub const TIME_LIMIT_INFINITE: u8 = 0xf;

/// <<DURATION>> IE. The duration octet is only present for the two
/// defined time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeDuration {
    pub lock: u8,
    pub time: u8,
    pub duration: u8,
}

impl IeDuration {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("duration too short"));
        }
        let mut ie = Self {
            lock: (data[2] >> 4) & 0x7,
            time: data[2] & 0x0f,
            duration: 0,
        };
        if data[2] & OCTET_GROUP_END == 0 {
            let Some(&b) = data.get(3) else {
                return Err(SfmtError::InvalidContents("duration octet 3a"));
            };
            ie.duration = b;
        }
        Ok(ie)
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        let mut octet = (self.lock << 4) | (self.time & 0x0f);
        if self.time != TIME_LIMIT_DEFINED_1 && self.time != TIME_LIMIT_DEFINED_2 {
            octet |= OCTET_GROUP_END;
            payload.push(octet);
        } else {
            payload.push(octet);
            payload.push(self.duration);
        }
        Ok(())
    }
}

/// <<FACILITY>> IE. The original only decodes this element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeFacility {
    pub service: u8,
    pub components: Vec<u8>,
}

impl IeFacility {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("facility too short"));
        }
        Ok(Self {
            service: data[2] & 0x1f,
            components: data[3..].to_vec(),
        })
    }
}

/// IWU-TO-IWU protocol discriminators used by the stack.
pub const IWU_TO_IWU_PD_USER_SPECIFIC: u8 = 0x00;
pub const IWU_TO_IWU_PD_LIST_ACCESS: u8 = 0x03;

/// <<IWU-TO-IWU>> IE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeIwuToIwu {
    /// Send/Reject bit: transmission (true) or rejection of a message.
    pub sr: bool,
    /// Protocol discriminator (6 bits).
    pub pd: u8,
    pub data: Vec<u8>,
}

impl IeIwuToIwu {
    pub fn new(pd: u8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            sr: true,
            pd,
            data: data.into(),
        }
    }

    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("iwu-to-iwu too short"));
        }
        if data[2] & OCTET_GROUP_END == 0 {
            return Err(SfmtError::InvalidContents("iwu-to-iwu group bits"));
        }
        Ok(Self {
            sr: data[2] & 0x40 != 0,
            pd: data[2] & 0x3f,
            data: data[3..].to_vec(),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(OCTET_GROUP_END | if self.sr { 0x40 } else { 0x00 } | (self.pd & 0x3f));
        payload.extend_from_slice(&self.data);
        Ok(())
    }
}

const ESC_TO_PROPRIETARY_EMC: u8 = 0x01;

/// <<ESCAPE-TO-PROPRIETARY>> IE, discriminated by an EMC.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeEscapeToProprietary {
    pub emc: u16,
    pub content: Vec<u8>,
}

impl IeEscapeToProprietary {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 5 {
            return Err(SfmtError::InvalidContents("escape-to-proprietary too short"));
        }
        if data[2] & !OCTET_GROUP_END != ESC_TO_PROPRIETARY_EMC {
            return Err(SfmtError::InvalidContents("proprietary discriminator"));
        }
        Ok(Self {
            emc: (u16::from(data[3]) << 8) | u16::from(data[4]),
            content: data[5..].to_vec(),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(OCTET_GROUP_END | ESC_TO_PROPRIETARY_EMC);
        payload.put_u16(self.emc);
        payload.extend_from_slice(&self.content);
        Ok(())
    }
}

/// Codecs of the <<CODEC-LIST>> IE.
pub const CODEC_USER_SPECIFIC_32KBIT: u8 = 0x1;
pub const CODEC_G726_32KBIT: u8 = 0x2;
pub const CODEC_G722_64KBIT: u8 = 0x3;
pub const CODEC_G711_ALAW_64KBIT: u8 = 0x4;
pub const CODEC_G711_ULAW_64KBIT: u8 = 0x5;

/// One entry of the <<CODEC-LIST>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecEntry {
    pub codec: u8,
    pub service: u8,
    pub slot: u8,
    pub cplane: u8,
}

/// <<CODEC-LIST>> IE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeCodecList {
    pub negotiation: u8,
    pub entries: Vec<CodecEntry>,
}

impl IeCodecList {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("codec list too short"));
        }
        let mut ie = Self {
            negotiation: (data[2] & !OCTET_GROUP_END) >> 4,
            entries: Vec::new(),
        };
        let mut n = 3;
        while data.len() - n >= 3 {
            ie.entries.push(CodecEntry {
                codec: data[n],
                service: data[n + 1] & 0x0f,
                cplane: (data[n + 2] & 0x70) >> 4,
                slot: data[n + 2] & 0x0f,
            });
            n += 3;
        }
        Ok(ie)
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push((self.negotiation << 4) | OCTET_GROUP_END);
        for entry in &self.entries {
            payload.push(entry.codec);
            payload.push(entry.service);
            payload.push((entry.cplane << 4) | entry.slot);
        }
        if let Some(last) = payload.last_mut() {
            *last |= OCTET_GROUP_END;
        }
        Ok(())
    }
}

/// <<SERVICE-CHANGE-INFO>> IE. The original only decodes this element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeServiceChangeInfo {
    pub master: bool,
    pub mode: u8,
}

impl IeServiceChangeInfo {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("service change info too short"));
        }
        Ok(Self {
            master: data[2] & 0x40 != 0,
            mode: data[2] & 0x0f,
        })
    }
}

/// Event types of the <<EVENTS-NOTIFICATION>> IE.
pub const EVENT_MESSAGE_WAITING: u8 = 0x0;
pub const EVENT_MISSED_CALL: u8 = 0x1;

/// One event of the <<EVENTS-NOTIFICATION>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventNotification {
    pub ty: u8,
    pub subtype: u8,
    pub multiplicity: u8,
}

/// <<EVENTS-NOTIFICATION>> IE. The original only encodes this element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeEventsNotification {
    pub events: Vec<EventNotification>,
}

impl IeEventsNotification {
    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        for event in &self.events {
            payload.push(event.ty);
            payload.push(event.subtype | OCTET_GROUP_END);
            payload.push(event.multiplicity | OCTET_GROUP_END);
        }
        Ok(())
    }
}
