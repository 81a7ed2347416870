//! Common types and utilities for the opendect stack
//!
//! This crate provides the leaf types shared by the S-format codec and the
//! NWK-layer entities: the fixed-capacity message buffer, the NWK-layer
//! identities of ETSI EN 300 175-6, the error type, logging setup and the
//! stack configuration.

pub mod config;
pub mod error;
pub mod identities;
pub mod logging;
pub mod msg_buf;

pub use config::{DectConfig, DectRole};
pub use error::Error;
pub use identities::{Ari, AriClass, Ipei, Ipui, Park, Tpui};
pub use logging::{format_hex, init_logging, LogLevel};
pub use msg_buf::MsgBuf;
