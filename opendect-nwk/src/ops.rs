//! Application operation vectors
//!
//! The library never drives an event loop of its own: file descriptors and
//! timers are registered with the application through [`EventOps`], and all
//! protocol indications are delivered through [`CcOps`] and [`MmOps`].
//! Indication parameters are reference-counted [`IeCollection`]s; an
//! application wanting to keep an element beyond the callback clones its
//! reference out of the collection.
//!
//! All callbacks receive `&mut DectHandle` and may re-enter the library,
//! e.g. to answer an MM-LOCATE-ind from within the callback.

use std::os::unix::io::RawFd;
use std::rc::Rc;
use std::time::Duration;

use opendect_common::MsgBuf;
use opendect_sformat::IeCollection;

use crate::cc::CallId;
use crate::handle::DectHandle;
use crate::mm::MmTransactionId;
use crate::timer::TimerId;

/// File descriptor event bits passed to [`EventOps::register_fd`] and
/// [`DectHandle::fd_process`].
pub mod fd_events {
    /// The descriptor is readable.
    pub const READ: u32 = 0x1;
    /// The descriptor is writable.
    pub const WRITE: u32 = 0x2;
}

/// Event loop integration supplied by the application.
pub trait EventOps {
    /// Registers a file descriptor for the given event mask. The
    /// application must call [`DectHandle::fd_process`] when it fires.
    fn register_fd(&self, fd: RawFd, events: u32) -> std::io::Result<()>;

    /// Unregisters a previously registered file descriptor.
    fn unregister_fd(&self, fd: RawFd);

    /// Arms a timer. The application must call
    /// [`DectHandle::timer_process`] once when it expires.
    fn register_timer(&self, timer: TimerId, timeout: Duration);

    /// Disarms a timer before expiry.
    fn unregister_timer(&self, timer: TimerId);
}

/// Call Control indications.
///
/// All methods default to no-ops so applications implement only what they
/// consume.
#[allow(unused_variables)]
pub trait CcOps {
    /// An incoming call was received (CC-SETUP).
    fn mncc_setup_ind(&self, dh: &mut DectHandle, call: CallId, param: &IeCollection) {}

    /// The remote side is alerting (CC-ALERTING).
    fn mncc_alert_ind(&self, dh: &mut DectHandle, call: CallId, param: &IeCollection) {}

    /// The remote side answered (CC-CONNECT).
    fn mncc_connect_ind(&self, dh: &mut DectHandle, call: CallId, param: &IeCollection) {}

    /// The remote side acknowledged our connect (CC-CONNECT-ACK).
    fn mncc_connect_cfm(&self, dh: &mut DectHandle, call: CallId, param: &IeCollection) {}

    /// Release requested by the remote side (CC-RELEASE).
    fn mncc_release_ind(&self, dh: &mut DectHandle, call: CallId, param: &IeCollection) {}

    /// Our release completed (CC-RELEASE-COM in RELEASE-PENDING).
    fn mncc_release_cfm(&self, dh: &mut DectHandle, call: CallId, param: &IeCollection) {}

    /// The call failed without reaching the active state.
    fn mncc_reject_ind(&self, dh: &mut DectHandle, call: CallId, param: Option<&IeCollection>) {
    }

    /// Mid-call information (CC-INFO).
    fn mncc_info_ind(&self, dh: &mut DectHandle, call: CallId, param: &IeCollection) {}

    /// U-plane data arrived on the call's LU1 connection.
    fn dl_u_data_ind(&self, dh: &mut DectHandle, call: CallId, mb: &MsgBuf) {}
}

/// Mobility Management indications.
#[allow(unused_variables)]
pub trait MmOps {
    /// A portable requests a location update (LOCATE-REQUEST, FP only).
    fn mm_locate_ind(&self, dh: &mut DectHandle, mmta: MmTransactionId, param: &IeCollection) {}

    /// A portable requests access rights (ACCESS-RIGHTS-REQUEST, FP only).
    fn mm_access_rights_ind(
        &self,
        dh: &mut DectHandle,
        mmta: MmTransactionId,
        param: &IeCollection,
    ) {
    }

    /// The fixed part assigns a temporary identity (PP only).
    fn mm_identity_assign_ind(
        &self,
        dh: &mut DectHandle,
        mmta: MmTransactionId,
        param: &IeCollection,
    ) {
    }

    /// The portable acknowledged or rejected a temporary identity
    /// assignment (FP only).
    fn mm_identity_assign_cfm(
        &self,
        dh: &mut DectHandle,
        mmta: MmTransactionId,
        accept: bool,
        param: &IeCollection,
    ) {
    }

    /// An authentication request arrived. Key derivation is up to the
    /// application.
    fn mm_authenticate_ind(
        &self,
        dh: &mut DectHandle,
        mmta: MmTransactionId,
        param: &IeCollection,
    ) {
    }

    /// The peer answered or rejected our authentication request.
    fn mm_authenticate_cfm(
        &self,
        dh: &mut DectHandle,
        mmta: MmTransactionId,
        accept: bool,
        param: &IeCollection,
    ) {
    }

    /// A key allocation arrived (PP only).
    fn mm_key_allocate_ind(
        &self,
        dh: &mut DectHandle,
        mmta: MmTransactionId,
        param: &IeCollection,
    ) {
    }
}

/// The operation vectors gathered for the handle.
///
/// Held behind an `Rc` so that indication delivery can run while the
/// handle is mutably borrowed by the caller.
pub struct DectOps {
    pub event_ops: Box<dyn EventOps>,
    pub cc_ops: Box<dyn CcOps>,
    pub mm_ops: Box<dyn MmOps>,
}

impl DectOps {
    /// Bundles the three vectors into the shared form the handle keeps.
    pub fn new(
        event_ops: Box<dyn EventOps>,
        cc_ops: Box<dyn CcOps>,
        mm_ops: Box<dyn MmOps>,
    ) -> Rc<Self> {
        Rc::new(Self {
            event_ops,
            cc_ops,
            mm_ops,
        })
    }
}
