//! DECT NWK-layer entities
//!
//! User-space implementation of the DECT network layer (ETSI EN 300
//! 175-5/6) on top of the kernel's DECT socket family: the transaction
//! layer multiplexing signaling associations, the Call Control and
//! Mobility Management protocol entities and the per-call U-plane socket
//! lifecycle.
//!
//! The library is single-threaded and cooperative. The application owns
//! the event loop: file descriptors and timers are registered through the
//! [`ops::EventOps`] vector, readiness and expiry are forwarded to
//! [`DectHandle::fd_process`] and [`DectHandle::timer_process`], and all
//! indications arrive through the [`ops::CcOps`] and [`ops::MmOps`]
//! vectors.
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use opendect_common::{DectConfig, Ipui};
//! use opendect_nwk::ops::{CcOps, DectOps, EventOps, MmOps};
//! use opendect_nwk::{DectHandle, TimerId};
//!
//! struct Loop;
//! impl EventOps for Loop {
//!     fn register_fd(&self, _fd: i32, _events: u32) -> std::io::Result<()> { Ok(()) }
//!     fn unregister_fd(&self, _fd: i32) {}
//!     fn register_timer(&self, _timer: TimerId, _timeout: std::time::Duration) {}
//!     fn unregister_timer(&self, _timer: TimerId) {}
//! }
//! struct Cc;
//! impl CcOps for Cc {}
//! struct Mm;
//! impl MmOps for Mm {}
//!
//! let config = DectConfig::new_pp();
//! let ops = DectOps::new(Box::new(Loop), Box::new(Cc), Box::new(Mm));
//! let mut dh = DectHandle::new(&config, ops);
//!
//! let param = opendect_sformat::IeCollection::new();
//! let _call = dh.mncc_setup_req(Ipui::new_n(0x1234, 0x56789), &param).unwrap();
//! ```

pub mod cc;
pub mod error;
pub mod handle;
pub mod io;
pub mod mm;
pub mod ops;
pub mod timer;
pub mod transaction;

pub use cc::{Call, CallId, CcState, CC_SETUP_TIMEOUT};
pub use error::{Error, Result};
pub use handle::DectHandle;
pub use mm::{MmTransaction, MmTransactionId};
pub use timer::TimerId;
pub use transaction::{
    DataLink, LinkRelease, ProtocolDesc, TransactionKey, TransactionRole, LINK_LINGER_TIMEOUT,
};
