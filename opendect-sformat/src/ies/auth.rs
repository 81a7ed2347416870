//! Authentication and ciphering information elements
//!
//! <<ALLOCATION-TYPE>>, <<AUTH-TYPE>>, <<RAND>>/<<RS>>, <<RES>> and
//! <<CIPHER-INFO>>. Cryptographic computation is out of scope; these
//! elements only carry the values between the peers and the application.

use bytes::{Buf, BufMut};

use crate::error::{SfmtError, SfmtResult};

/// Authentication algorithm identifiers.
pub const AUTH_DSAA: u8 = 0x01;
pub const AUTH_GSM: u8 = 0x40;
pub const AUTH_UMTS: u8 = 0x20;
pub const AUTH_PROPRIETARY: u8 = 0x7f;

/// Authentication key types.
pub const KEY_USER_AUTHENTICATION_KEY: u8 = 0x1;
pub const KEY_USER_PERSONAL_IDENTITY: u8 = 0x3;
pub const KEY_AUTHENTICATION_CODE: u8 = 0x4;

/// AUTH-TYPE flag bits (octet 5, high nibble).
pub const AUTH_FLAG_INC: u8 = 0x80;
pub const AUTH_FLAG_DEF: u8 = 0x40;
pub const AUTH_FLAG_TXC: u8 = 0x20;
pub const AUTH_FLAG_UPC: u8 = 0x10;

/// <<ALLOCATION-TYPE>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeAllocationType {
    pub auth_id: u8,
    pub auth_key_num: u8,
    pub auth_code_num: u8,
}

impl IeAllocationType {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() < 4 {
            return Err(SfmtError::InvalidContents("allocation type too short"));
        }
        Ok(Self {
            auth_id: data[2],
            auth_key_num: (data[3] & 0xf0) >> 4,
            auth_code_num: data[3] & 0x0f,
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(self.auth_id);
        payload.push((self.auth_key_num << 4) | (self.auth_code_num & 0x0f));
        Ok(())
    }
}

/// <<AUTH-TYPE>> IE.
///
/// Octets 5a/5b carrying the default cipher key index are only present when
/// the DEF flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeAuthType {
    pub auth_id: u8,
    pub proprietary_auth_id: u8,
    pub auth_key_type: u8,
    pub auth_key_num: u8,
    pub flags: u8,
    pub cipher_key_num: u8,
    pub defck_index: u16,
}

impl IeAuthType {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        let mut ie = Self::default();
        let mut n = 2;

        let need = |n: usize| {
            if n >= data.len() {
                Err(SfmtError::InvalidContents("auth type too short"))
            } else {
                Ok(())
            }
        };

        need(n)?;
        ie.auth_id = data[n];
        n += 1;
        if ie.auth_id == AUTH_PROPRIETARY {
            need(n)?;
            ie.proprietary_auth_id = data[n];
            n += 1;
        }

        need(n)?;
        ie.auth_key_type = (data[n] & 0xf0) >> 4;
        ie.auth_key_num = data[n] & 0x0f;
        n += 1;

        need(n)?;
        ie.flags = data[n] & 0xf0;
        ie.cipher_key_num = data[n] & 0x0f;
        n += 1;

        if ie.flags & AUTH_FLAG_DEF != 0 {
            need(n + 1)?;
            ie.defck_index = (u16::from(data[n]) << 8) | u16::from(data[n + 1]);
        }
        Ok(ie)
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(self.auth_id);
        if self.auth_id == AUTH_PROPRIETARY {
            payload.push(self.proprietary_auth_id);
        }
        payload.push((self.auth_key_type << 4) | (self.auth_key_num & 0x0f));
        payload.push(self.flags | (self.cipher_key_num & 0x0f));
        if self.flags & AUTH_FLAG_DEF != 0 {
            payload.put_u16(self.defck_index);
        }
        Ok(())
    }
}

/// <<RAND>> / <<RS>> IE: a 64-bit authentication value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeAuthValue {
    pub value: u64,
}

impl IeAuthValue {
    pub fn new(value: u64) -> Self {
        Self { value }
    }

    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() != 10 {
            return Err(SfmtError::InvalidContents("auth value length"));
        }
        let mut buf = &data[2..];
        Ok(Self {
            value: buf.get_u64(),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.put_u64(self.value);
        Ok(())
    }
}

/// <<RES>> IE: a 32-bit authentication result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeAuthRes {
    pub value: u32,
}

impl IeAuthRes {
    pub fn new(value: u32) -> Self {
        Self { value }
    }

    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() != 6 {
            return Err(SfmtError::InvalidContents("auth res length"));
        }
        let mut buf = &data[2..];
        Ok(Self {
            value: buf.get_u32(),
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.put_u32(self.value);
        Ok(())
    }
}

/// Cipher algorithm identifiers.
pub const CIPHER_STANDARD_1: u8 = 0x01;
pub const CIPHER_ESC_TO_PROPRIETARY: u8 = 0x7f;

/// Cipher key types.
pub const CIPHER_DERIVED_KEY: u8 = 0x9;
pub const CIPHER_STATIC_KEY: u8 = 0xa;

/// <<CIPHER-INFO>> IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IeCipherInfo {
    pub enable: bool,
    pub cipher_alg_id: u8,
    pub cipher_key_type: u8,
    pub cipher_key_num: u8,
}

impl IeCipherInfo {
    pub fn parse(data: &[u8]) -> SfmtResult<Self> {
        if data.len() != 4 {
            return Err(SfmtError::InvalidContents("cipher info length"));
        }
        Ok(Self {
            enable: data[2] & 0x80 != 0,
            cipher_alg_id: data[2] & 0x7f,
            cipher_key_type: (data[3] & 0xf0) >> 4,
            cipher_key_num: data[3] & 0x0f,
        })
    }

    pub fn build(&self, payload: &mut Vec<u8>) -> SfmtResult<()> {
        payload.push(if self.enable { 0x80 } else { 0x00 } | self.cipher_alg_id);
        payload.push((self.cipher_key_type << 4) | self.cipher_key_num | 0x8);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_ie(id: u8, payload: &[u8]) -> Vec<u8> {
        let mut v = vec![id, payload.len() as u8];
        v.extend_from_slice(payload);
        v
    }

    #[test]
    fn test_allocation_type_round_trip() {
        let ie = IeAllocationType {
            auth_id: AUTH_DSAA,
            auth_key_num: 0x8,
            auth_code_num: 0x1,
        };
        let mut payload = Vec::new();
        ie.build(&mut payload).unwrap();
        assert_eq!(payload, [0x01, 0x81]);

        let raw = raw_ie(0x0b, &payload);
        assert_eq!(IeAllocationType::parse(&raw).unwrap(), ie);
    }

    #[test]
    fn test_auth_type_without_def_flag() {
        let ie = IeAuthType {
            auth_id: AUTH_DSAA,
            auth_key_type: KEY_USER_AUTHENTICATION_KEY,
            auth_key_num: 0x8,
            flags: AUTH_FLAG_TXC,
            cipher_key_num: 0x1,
            ..Default::default()
        };
        let mut payload = Vec::new();
        ie.build(&mut payload).unwrap();
        assert_eq!(payload.len(), 3);

        let raw = raw_ie(0x0a, &payload);
        assert_eq!(IeAuthType::parse(&raw).unwrap(), ie);
    }

    #[test]
    fn test_auth_type_def_flag_adds_defck_index() {
        let ie = IeAuthType {
            auth_id: AUTH_DSAA,
            auth_key_type: KEY_AUTHENTICATION_CODE,
            auth_key_num: 0x8,
            flags: AUTH_FLAG_DEF,
            cipher_key_num: 0x2,
            defck_index: 0xbeef,
            ..Default::default()
        };
        let mut payload = Vec::new();
        ie.build(&mut payload).unwrap();
        assert_eq!(payload.len(), 5);
        assert_eq!(&payload[3..], [0xbe, 0xef]);

        let raw = raw_ie(0x0a, &payload);
        assert_eq!(IeAuthType::parse(&raw).unwrap(), ie);
    }

    #[test]
    fn test_auth_value_round_trip() {
        let ie = IeAuthValue::new(0x0123_4567_89ab_cdef);
        let mut payload = Vec::new();
        ie.build(&mut payload).unwrap();
        assert_eq!(payload.len(), 8);
        assert_eq!(payload[0], 0x01);

        let raw = raw_ie(0x0c, &payload);
        assert_eq!(IeAuthValue::parse(&raw).unwrap(), ie);
    }

    #[test]
    fn test_auth_value_rejects_bad_length() {
        assert!(IeAuthValue::parse(&raw_ie(0x0c, &[1, 2, 3])).is_err());
    }

    #[test]
    fn test_cipher_info_round_trip() {
        let ie = IeCipherInfo {
            enable: true,
            cipher_alg_id: CIPHER_STANDARD_1,
            cipher_key_type: CIPHER_DERIVED_KEY,
            cipher_key_num: 0x8,
        };
        let mut payload = Vec::new();
        ie.build(&mut payload).unwrap();

        let raw = raw_ie(0x19, &payload);
        assert_eq!(IeCipherInfo::parse(&raw).unwrap(), ie);
    }
}
