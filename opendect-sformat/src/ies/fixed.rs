//! Fixed-length information elements
//!
//! The double-octet family carries one value octet; the extension prefix
//! family carries no value at all and exists purely as a presence marker.
//! SINGLE-DISPLAY and SINGLE-KEYPAD share their in-memory representation
//! with their MULTI variants; the builder picks the wire form from the
//! payload length.
//!
//! All `parse` functions take the raw IE including its header octets, so
//! the octet indices line up with EN 300 175-5.

use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};

use crate::error::{SfmtError, SfmtResult};

/// Call classes (EN 300 175-5 section 7.6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum CallClass {
    LiaServiceSetup = 0x2,
    Message = 0x4,
    DectIsdn = 0x7,
    Normal = 0x8,
    Internal = 0x9,
    Emergency = 0xa,
    Service = 0xb,
    ExternalHandover = 0xc,
    SupplementaryService = 0xd,
    QaM = 0xe,
}

/// Basic service values (EN 300 175-5 section 7.6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum BasicServiceValue {
    BasicSpeechDefault = 0x0,
    DectGsmIwp = 0x4,
    Lrms = 0x5,
    DectUmtsIwp = 0x6,
    GsmIwpSms = 0x7,
    WidebandSpeech = 0x8,
    SuotaClass4DprsManagement = 0x9,
    SuotaClass3DprsManagement = 0xa,
    Other = 0xf,
}

/// <<BASIC-SERVICE>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeBasicService {
    pub class: CallClass,
    pub service: BasicServiceValue,
}

impl IeBasicService {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        let class = CallClass::try_from(data[1] >> 4)
            .map_err(|_| SfmtError::InvalidContents("call class"))?;
        let service = BasicServiceValue::try_from(data[1] & 0x0f)
            .map_err(|_| SfmtError::InvalidContents("basic service"))?;
        Ok(Self { class, service })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push((u8::from(self.class) << 4) | u8::from(self.service));
        Ok(())
    }
}

/// Release reasons (EN 300 175-5 section 7.6.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum ReleaseReasonValue {
    Normal = 0x00,
    UnexpectedMessage = 0x01,
    UnknownTransactionIdentifier = 0x02,
    MandatoryIeMissing = 0x03,
    InvalidIeContents = 0x04,
    IncompatibleService = 0x05,
    ServiceNotImplemented = 0x06,
    NegotiationNotSupported = 0x07,
    InvalidIdentity = 0x08,
    AuthenticationFailed = 0x09,
    UnknownIdentity = 0x0a,
    NegotiationFailed = 0x0b,
    TimerExpiry = 0x0d,
    PartialRelease = 0x0e,
    Unknown = 0x0f,
    UserDetached = 0x10,
    UserNotInRange = 0x11,
    UserUnknown = 0x12,
    UserAlreadyActive = 0x13,
    UserBusy = 0x14,
    UserRejection = 0x15,
    UserCallModify = 0x16,
    ExternalHandoverNotSupported = 0x21,
    NetworkParametersMissing = 0x22,
    ExternalHandoverRelease = 0x23,
    Overload = 0x31,
    InsufficientResources = 0x32,
    InsufficientBearersAvailable = 0x33,
    IwuCongestion = 0x34,
    SecurityAttackAssumed = 0x40,
    EncryptionActivationFailed = 0x41,
    RekeyingFailed = 0x42,
    #[num_enum(catch_all)]
    Other(u8),
}

/// <<RELEASE-REASON>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeReleaseReason {
    pub reason: ReleaseReasonValue,
}

impl IeReleaseReason {
    pub fn new(reason: ReleaseReasonValue) -> Self {
        Self { reason }
    }

    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        Ok(Self {
            reason: ReleaseReasonValue::from(data[1]),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(u8::from(self.reason));
        Ok(())
    }
}

/// Base value of the alerting signal codes.
pub const SIGNAL_ALERTING_BASE: u8 = 0x40;

/// <<SIGNAL>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeSignal {
    pub code: u8,
}

impl IeSignal {
    /// Creates an alerting signal for the given ring pattern.
    pub fn alerting(pattern: u8) -> Self {
        Self {
            code: SIGNAL_ALERTING_BASE + pattern,
        }
    }

    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        Ok(Self { code: data[1] })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(self.code);
        Ok(())
    }
}

/// <<TIMER-RESTART>> IE values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TimerRestartValue {
    Restart = 0x00,
    Stop = 0x01,
}

/// <<TIMER-RESTART>> IE. The original only decodes this element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeTimerRestart {
    pub code: TimerRestartValue,
}

impl IeTimerRestart {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        let code = TimerRestartValue::try_from(data[1])
            .map_err(|_| SfmtError::InvalidContents("timer restart code"))?;
        Ok(Self { code })
    }
}

/// <<SINGLE-DISPLAY>> / <<MULTI-DISPLAY>> IE.
///
/// A one-character payload is built as the double-octet SINGLE-DISPLAY
/// form, anything longer as the variable-length MULTI-DISPLAY form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeDisplay {
    pub info: Vec<u8>,
}

impl IeDisplay {
    pub fn new(info: impl Into<Vec<u8>>) -> Self {
        Self { info: info.into() }
    }

    pub fn parse_single(data: &[u8]) -> SfmtResult<Self> {
        Ok(Self {
            info: vec![data[1]],
        })
    }

    pub fn parse_multi(data: &[u8]) -> SfmtResult<Self> {
        Ok(Self {
            info: data[2..].to_vec(),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        if self.info.is_empty() {
            return Err(SfmtError::InvalidContents("empty display"));
        }
        payload.extend_from_slice(&self.info);
        Ok(())
    }
}

/// Capacity of the keypad information field.
pub const KEYPAD_INFO_MAX: usize = 64;

/// <<SINGLE-KEYPAD>> / <<MULTI-KEYPAD>> IE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeKeypad {
    pub info: Vec<u8>,
}

impl IeKeypad {
    pub fn new(info: impl Into<Vec<u8>>) -> Self {
        Self { info: info.into() }
    }

    pub fn parse_single(data: &[u8]) -> SfmtResult<Self> {
        Ok(Self {
            info: vec![data[1]],
        })
    }

    pub fn parse_multi(data: &[u8]) -> SfmtResult<Self> {
        if data.len() - 2 > KEYPAD_INFO_MAX {
            return Err(SfmtError::InvalidContents("keypad info overlong"));
        }
        Ok(Self {
            info: data[2..].to_vec(),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        if self.info.is_empty() {
            return Err(SfmtError::InvalidContents("empty keypad"));
        }
        payload.extend_from_slice(&self.info);
        Ok(())
    }
}
