//! Stack configuration
//!
//! The handle is constructed from a [`DectConfig`] naming the protocol role
//! and, for a fixed part, the primary access rights identity. Configurations
//! can be loaded from a YAML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::identities::Ari;

/// Protocol role of this endpoint.
///
/// The role selects the direction-dependent policies of the S-format
/// descriptors and the state handling of the protocol entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DectRole {
    /// Fixed part (base station side)
    Fp,
    /// Portable part (handset side)
    #[default]
    Pp,
}

/// Handle construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DectConfig {
    /// Protocol role.
    pub role: DectRole,
    /// Primary ARI, required for the FP role.
    #[serde(default)]
    pub pari: PariConfig,
}

/// Serializable form of the primary ARI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PariConfig {
    pub emc: u16,
    pub fpn: u32,
}

impl DectConfig {
    /// Creates an FP configuration with the given primary ARI.
    pub fn new_fp(pari: Ari) -> Self {
        Self {
            role: DectRole::Fp,
            pari: PariConfig {
                emc: pari.emc,
                fpn: pari.fpn,
            },
        }
    }

    /// Creates a PP configuration.
    pub fn new_pp() -> Self {
        Self {
            role: DectRole::Pp,
            pari: PariConfig::default(),
        }
    }

    /// Loads a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parses a configuration from a YAML string.
    pub fn from_yaml(text: &str) -> Result<Self, Error> {
        let config: DectConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The primary ARI as an identity value.
    pub fn pari(&self) -> Ari {
        Ari::new(self.pari.emc, self.pari.fpn)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.role == DectRole::Fp && self.pari.emc == 0 && self.pari.fpn == 0 {
            return Err(Error::Config("FP role requires a PARI".into()));
        }
        Ok(())
    }
}
