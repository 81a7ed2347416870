//! Identity-related information elements
//!
//! <<PORTABLE-IDENTITY>>, <<FIXED-IDENTITY>>, <<IDENTITY-TYPE>>,
//! <<LOCATION-AREA>> and <<INFO-TYPE>>. The identity elements carry their
//! sub-fields behind octet-group end bits and an explicit bit-length field;
//! the numeric encodings live in `opendect_common::identities`.

use opendect_common::identities::{Ari, AriClass, Ipui};

use crate::error::{SfmtError, SfmtResult};
use crate::ie::OCTET_GROUP_END;

/// Portable identity type values.
pub const PORTABLE_ID_TYPE_IPUI: u8 = 0x00;
pub const PORTABLE_ID_TYPE_IPEI: u8 = 0x10;
pub const PORTABLE_ID_TYPE_TPUI: u8 = 0x20;

/// <<PORTABLE-IDENTITY>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IePortableIdentity {
    /// International portable user identity.
    Ipui(Ipui),
    /// Temporary portable user identity (20 bits).
    Tpui(u32),
}

impl IePortableIdentity {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 5 {
            return Err(SfmtError::InvalidContents("portable identity too short"));
        }
        if data[2] & OCTET_GROUP_END == 0 {
            return Err(SfmtError::InvalidContents("portable identity type group"));
        }
        let ty = data[2] & !OCTET_GROUP_END;

        if data[3] & OCTET_GROUP_END == 0 {
            return Err(SfmtError::InvalidContents("portable identity length group"));
        }
        let bits = data[3] & !OCTET_GROUP_END;

        match ty {
            PORTABLE_ID_TYPE_IPUI | PORTABLE_ID_TYPE_IPEI => {
                let ipui = Ipui::parse(&data[4..], bits)
                    .map_err(|_| SfmtError::InvalidContents("IPUI"))?;
                Ok(IePortableIdentity::Ipui(ipui))
            }
            PORTABLE_ID_TYPE_TPUI => {
                if data.len() < 7 {
                    return Err(SfmtError::InvalidContents("TPUI too short"));
                }
                let tpui = (u32::from(data[4]) << 16)
                    | (u32::from(data[5]) << 8)
                    | u32::from(data[6]);
                Ok(IePortableIdentity::Tpui(tpui & 0xfffff))
            }
            _ => Err(SfmtError::InvalidContents("portable identity type")),
        }
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        match self {
            IePortableIdentity::Ipui(ipui) => {
                let mut buf = [0u8; 16];
                let bits = ipui
                    .build(&mut buf)
                    .map_err(|_| SfmtError::InvalidContents("IPUI"))?;
                payload.push(OCTET_GROUP_END | PORTABLE_ID_TYPE_IPUI);
                payload.push(OCTET_GROUP_END | bits);
                payload.extend_from_slice(&buf[..usize::from(bits).div_ceil(8)]);
            }
            IePortableIdentity::Tpui(tpui) => {
                payload.push(OCTET_GROUP_END | PORTABLE_ID_TYPE_TPUI);
                payload.push(OCTET_GROUP_END | 20);
                payload.push((tpui >> 16) as u8);
                payload.push((tpui >> 8) as u8);
                payload.push(*tpui as u8);
            }
        }
        Ok(())
    }

    /// The carried IPUI, if this identity is one.
    pub fn ipui(&self) -> Option<&Ipui> {
        match self {
            IePortableIdentity::Ipui(ipui) => Some(ipui),
            IePortableIdentity::Tpui(_) => None,
        }
    }
}

/// Fixed identity type values.
pub const FIXED_ID_TYPE_ARI: u8 = 0x00;
pub const FIXED_ID_TYPE_ARI_RPN: u8 = 0x01;
pub const FIXED_ID_TYPE_ARI_WRS: u8 = 0x02;
pub const FIXED_ID_TYPE_PARK: u8 = 0x20;

/// <<FIXED-IDENTITY>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeFixedIdentity {
    pub ty: u8,
    pub ari: Ari,
    pub rpn: u8,
}

impl IeFixedIdentity {
    /// Creates a PARK fixed identity carrying the given ARI.
    pub fn new_park(ari: Ari) -> Self {
        Self {
            ty: FIXED_ID_TYPE_PARK,
            ari,
            rpn: 0,
        }
    }

    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 9 {
            return Err(SfmtError::InvalidContents("fixed identity too short"));
        }
        if data[2] & OCTET_GROUP_END == 0 || data[3] & OCTET_GROUP_END == 0 {
            return Err(SfmtError::InvalidContents("fixed identity group bits"));
        }
        let ty = data[2] & !OCTET_GROUP_END;
        let bits = data[3] & !OCTET_GROUP_END;

        let mut raw: u64 = 0;
        for (i, b) in data[4..].iter().take(8).enumerate() {
            raw |= u64::from(*b) << (56 - 8 * i);
        }
        let (ari, ari_bits) =
            Ari::parse(raw << 1).map_err(|_| SfmtError::InvalidContents("ARI"))?;

        match ty {
            FIXED_ID_TYPE_ARI | FIXED_ID_TYPE_PARK => {
                if u16::from(ari_bits) + 1 != u16::from(bits) {
                    return Err(SfmtError::InvalidContents("fixed identity length"));
                }
                Ok(Self { ty, ari, rpn: 0 })
            }
            FIXED_ID_TYPE_ARI_RPN | FIXED_ID_TYPE_ARI_WRS => Ok(Self { ty, ari, rpn: 0 }),
            _ => Err(SfmtError::InvalidContents("fixed identity type")),
        }
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        let ari = self.ari.build() >> 1;
        payload.push(OCTET_GROUP_END | self.ty);
        payload.push(OCTET_GROUP_END | (AriClass::A.bits() + 1));
        payload.push((ari >> 56) as u8);
        payload.push((ari >> 48) as u8);
        payload.push((ari >> 40) as u8);
        payload.push((ari >> 32) as u8);
        payload.push((ari >> 24) as u8);
        Ok(())
    }
}

/// Identity group values of the <<IDENTITY-TYPE>> IE.
pub const IDENTITY_GROUP_PORTABLE: u8 = 0x0;
pub const IDENTITY_GROUP_NETWORK_ASSIGNED: u8 = 0x1;
pub const IDENTITY_GROUP_FIXED: u8 = 0x4;
pub const IDENTITY_GROUP_APPLICATION_ASSIGNED: u8 = 0x8;
pub const IDENTITY_GROUP_PROPRIETARY: u8 = 0xf;

/// <<IDENTITY-TYPE>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeIdentityType {
    pub group: u8,
    pub ty: u8,
}

impl IeIdentityType {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 4 {
            return Err(SfmtError::InvalidContents("identity type too short"));
        }
        Ok(Self {
            group: data[2] & !OCTET_GROUP_END,
            ty: data[3] & !OCTET_GROUP_END,
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(self.group | OCTET_GROUP_END);
        payload.push(self.ty | OCTET_GROUP_END);
        Ok(())
    }
}

/// <<LOCATION-AREA>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeLocationArea {
    /// Location information type (2 bits).
    pub ty: u8,
    /// Location area level (6 bits).
    pub level: u8,
}

impl IeLocationArea {
    pub fn new(level: u8) -> Self {
        Self {
            ty: 0,
            level: level & 0x3f,
        }
    }

    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 3 {
            return Err(SfmtError::InvalidContents("location area too short"));
        }
        Ok(Self {
            ty: (data[2] & 0xc0) >> 6,
            level: data[2] & 0x3f,
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push((self.ty << 6) | (self.level & 0x3f));
        Ok(())
    }
}

/// Info type parameter values used by the stack.
pub const INFO_LOCATE_SUGGEST: u8 = 0x00;
pub const INFO_ACCESS_RIGHTS_MODIFY_SUGGEST: u8 = 0x01;

/// <<INFO-TYPE>> IE: a group-end terminated list of parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IeInfoType {
    pub types: Vec<u8>,
}

impl IeInfoType {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        let mut types = Vec::new();
        let mut n = 2;
        while n < data.len() {
            types.push(data[n] & !OCTET_GROUP_END);
            if data[n] & OCTET_GROUP_END != 0 {
                break;
            }
            n += 1;
        }
        Ok(Self { types })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        if self.types.is_empty() {
            return Err(SfmtError::InvalidContents("empty info type list"));
        }
        for ty in &self.types {
            payload.push(*ty);
        }
        *payload.last_mut().unwrap() |= OCTET_GROUP_END;
        Ok(())
    }
}
