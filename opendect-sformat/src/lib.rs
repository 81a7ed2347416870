//! S-format NWK-layer message codec (ETSI EN 300 175-5)
//!
//! Every DECT NWK-layer signaling message is a message-type octet followed
//! by a stream of S-format information elements. This crate provides:
//!
//! - the IE catalog: a tagged enum over all handled IE kinds with
//!   bit-exact parse/build handlers ([`ies`]),
//! - reference-counted IE collections shared with the application
//!   ([`collection`]),
//! - per-message descriptor tables carrying each element's
//!   direction-dependent presence rules ([`msg`]),
//! - the parse/build drivers walking descriptor and buffer in step
//!   ([`codec`]).
//!
//! The codec is direction-aware: the caller's protocol role (FP or PP)
//! selects which of the two per-entry status columns applies for reception
//! and transmission.

pub mod codec;
pub mod collection;
pub mod error;
pub mod ie;
pub mod ies;
pub mod msg;
pub mod types;

pub use codec::{build_message, encode_ie, parse_message};
pub use collection::{IeCollection, IeList, IeRef, ListOrder};
pub use error::{SfmtError, SfmtResult};
pub use ie::{parse_ie_header, IeHeader, IeType};
pub use ies::Ie;
pub use msg::{IeDescEntry, IeStatus, MsgDescriptor};
pub use types::{CcMessageType, MmMessageType, ProtocolDiscriminator};
