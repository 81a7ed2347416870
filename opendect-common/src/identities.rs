//! NWK-layer identities (ETSI EN 300 175-6)
//!
//! Access Rights Identities (ARI/PARK) identify a fixed part, International
//! Portable User Identities (IPUI/IPEI) identify a portable user and
//! Temporary Portable User Identities (TPUI) are short-lived aliases
//! assigned by the fixed part.
//!
//! Parse and build helpers operate on the bit-exact wire layouts used inside
//! the PORTABLE-IDENTITY and FIXED-IDENTITY information elements: ARIs are
//! aligned to the top of a `u64`, IPUIs are nibble-packed byte strings with
//! an explicit bit length.

use std::fmt;

use crate::error::Error;

/// ARI classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AriClass {
    /// Residential and private (PBX) single- and small multiple-cell systems
    A = 0x0,
    /// Private (PABXs) multiple cell
    B = 0x1,
    /// Public single and multiple cell systems
    C = 0x2,
    /// Public DECT access to a GSM network
    D = 0x3,
    /// PP to PP direct communication (private)
    E = 0x4,
}

impl AriClass {
    /// Bit length of an ARI of this class.
    pub fn bits(&self) -> u8 {
        match self {
            AriClass::A => 36,
            AriClass::B | AriClass::C | AriClass::D | AriClass::E => 31,
        }
    }
}

/// Access Rights Identity.
///
/// Only class A (EMC + FPN) is fully coded; the remaining classes carry
/// their raw field values without interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ari {
    pub emc: u16,
    pub fpn: u32,
    pub fps: u32,
}

impl Ari {
    /// Creates a class A ARI from an equipment manufacturer code and a
    /// fixed part number (17 bits).
    pub fn new(emc: u16, fpn: u32) -> Self {
        Self {
            emc,
            fpn: fpn & 0x1ffff,
            fps: 0,
        }
    }

    /// ARI class. Only class A is currently produced.
    pub fn class(&self) -> AriClass {
        AriClass::A
    }

    /// Builds the ARI value aligned to the top of a `u64` (MSB first).
    pub fn build(&self) -> u64 {
        ((AriClass::A as u64) << 61)
            | ((self.emc as u64) << 45)
            | (((self.fpn as u64) & 0x1ffff) << 28)
    }

    /// Parses an ARI from a value aligned to the top of a `u64`.
    ///
    /// Returns the identity and its length in bits.
    pub fn parse(a: u64) -> Result<(Self, u8), Error> {
        let arc = ((a >> 61) & 0x7) as u8;
        match arc {
            0 => {
                let emc = ((a >> 45) & 0xffff) as u16;
                let fpn = ((a >> 28) & 0x1ffff) as u32;
                Ok((Ari::new(emc, fpn), AriClass::A.bits()))
            }
            1..=4 => Err(Error::Identity(format!("unhandled ARI class {arc}"))),
            _ => Err(Error::Identity(format!("invalid ARI class {arc}"))),
        }
    }
}

impl fmt::Display for Ari {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARI class A EMC {:04x} FPN {:05x}", self.emc, self.fpn)
    }
}

/// Portable Access Rights Key: an FP ARI plus a prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Park {
    pub ari: Ari,
    pub prefix_len: u8,
}

/// International Portable Equipment Identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ipei {
    /// Equipment Manufacturer Code
    pub emc: u16,
    /// Portable equipment Serial Number (20 bits)
    pub psn: u32,
}

impl fmt::Display for Ipei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EMC {:04x} PSN {:05x}", self.emc, self.psn & 0xfffff)
    }
}

/// Portable User Identity Type values (high nibble of the first IPUI octet).
pub const IPUI_PUT_N: u8 = 0x0;
pub const IPUI_PUT_O: u8 = 0x1;

/// International Portable User Identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ipui {
    /// Type N: residential/default, carries the IPEI.
    N(Ipei),
    /// Type O: private, a number of up to 60 bits.
    O { number: u64, bits: u8 },
}

impl Default for Ipui {
    fn default() -> Self {
        Ipui::N(Ipei::default())
    }
}

impl Ipui {
    /// Creates a type N IPUI from an IPEI.
    pub fn new_n(emc: u16, psn: u32) -> Self {
        Ipui::N(Ipei {
            emc,
            psn: psn & 0xfffff,
        })
    }

    /// Length of this identity in bits.
    pub fn bits(&self) -> u8 {
        match self {
            Ipui::N(_) => 40,
            Ipui::O { bits, .. } => 4 + bits,
        }
    }

    /// Builds the nibble-packed wire representation.
    ///
    /// Returns the encoded bytes and the length in bits.
    pub fn build(&self, out: &mut [u8]) -> Result<u8, Error> {
        match self {
            Ipui::N(ipei) => {
                if out.len() < 5 {
                    return Err(Error::Identity("IPUI buffer too small".into()));
                }
                out[0] = (IPUI_PUT_N << 4) | ((ipei.emc >> 12) as u8 & 0x0f);
                out[1] = (ipei.emc >> 4) as u8;
                out[2] = ((ipei.emc << 4) as u8) | ((ipei.psn >> 16) as u8 & 0x0f);
                out[3] = (ipei.psn >> 8) as u8;
                out[4] = ipei.psn as u8;
                Ok(40)
            }
            Ipui::O { number, bits } => {
                let total = 4 + *bits as usize;
                let nbytes = total.div_ceil(8);
                if out.len() < nbytes {
                    return Err(Error::Identity("IPUI buffer too small".into()));
                }
                // Number is left-aligned after the PUT nibble.
                let val = (u128::from(IPUI_PUT_O) << 124)
                    | ((*number as u128) << (124 - *bits as u32));
                for (i, b) in out.iter_mut().take(nbytes).enumerate() {
                    *b = (val >> (120 - 8 * i)) as u8;
                }
                Ok(total as u8)
            }
        }
    }

    /// Parses an IPUI from its nibble-packed wire representation.
    pub fn parse(data: &[u8], bits: u8) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::Identity("empty IPUI".into()));
        }
        let put = data[0] >> 4;
        match put {
            IPUI_PUT_N => {
                if bits != 40 || data.len() < 5 {
                    return Err(Error::Identity(format!(
                        "IPUI N needs 40 bits, got {bits}"
                    )));
                }
                let emc = (u16::from(data[0] & 0x0f) << 12)
                    | (u16::from(data[1]) << 4)
                    | u16::from(data[2] >> 4);
                let psn = (u32::from(data[2] & 0x0f) << 16)
                    | (u32::from(data[3]) << 8)
                    | u32::from(data[4]);
                Ok(Ipui::N(Ipei { emc, psn }))
            }
            IPUI_PUT_O => {
                if bits < 4 || usize::from(bits).div_ceil(8) > data.len() {
                    return Err(Error::Identity("truncated IPUI O".into()));
                }
                let nbits = bits - 4;
                let mut val: u128 = 0;
                for (i, b) in data.iter().enumerate().take(16) {
                    val |= (*b as u128) << (120 - 8 * i);
                }
                let number = if nbits == 0 {
                    0
                } else {
                    ((val << 4) >> (128 - u32::from(nbits))) as u64
                };
                Ok(Ipui::O {
                    number,
                    bits: nbits,
                })
            }
            _ => Err(Error::Identity(format!("unhandled IPUI type {put}"))),
        }
    }
}

impl fmt::Display for Ipui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ipui::N(ipei) => write!(f, "IPUI N {ipei}"),
            Ipui::O { number, bits } => write!(f, "IPUI O {number:x}/{bits}"),
        }
    }
}

/// TPUI types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tpui {
    /// Assigned individual TPUI (five 4-bit digits)
    IndividualAssigned([u8; 5]),
    /// Connectionless group TPUI
    ConnectionlessGroup(u16),
    /// Call group TPUI
    CallGroup(u16),
    /// Default individual TPUI derived from the IPUI
    IndividualDefault(u16),
    /// Emergency TPUI
    Emergency,
}

/// Collective broadcast identifier.
pub const TPUI_CBI: u32 = 0xcfff;

impl Tpui {
    /// Derives the default individual TPUI from an IPUI.
    pub fn from_ipui(ipui: &Ipui) -> Self {
        let low = match ipui {
            Ipui::N(ipei) => (ipei.psn & 0xffff) as u16,
            Ipui::O { number, .. } => (*number & 0xffff) as u16,
        };
        Tpui::IndividualDefault(low)
    }

    /// Builds the 20-bit TPUI value.
    pub fn build(&self) -> u32 {
        match self {
            Tpui::IndividualAssigned(d) => {
                let mut v = 0u32;
                for digit in d {
                    v = (v << 4) | u32::from(digit & 0x0f);
                }
                v
            }
            Tpui::ConnectionlessGroup(g) => 0xc0000 | u32::from(*g),
            Tpui::CallGroup(g) => 0xd0000 | u32::from(*g),
            Tpui::IndividualDefault(v) => 0xe0000 | u32::from(*v),
            Tpui::Emergency => 0xf0000,
        }
    }
}
