//! Shared test harness: recording operation vectors and wire helpers.
#![allow(dead_code)]

use std::cell::RefCell;
use std::os::unix::io::RawFd;
use std::rc::Rc;
use std::time::Duration;

use opendect_common::{DectConfig, DectRole, Ipui, MsgBuf};
use opendect_nwk::ops::{CcOps, DectOps, EventOps, MmOps};
use opendect_nwk::{CallId, DectHandle, MmTransactionId, TimerId, TransactionRole};
use opendect_sformat::ie::IeType;
use opendect_sformat::ies::IeLocationArea;
use opendect_sformat::{
    build_message, Ie, IeCollection, MsgDescriptor, ProtocolDiscriminator,
};

/// One recorded indication.
#[derive(Debug, Clone)]
pub enum TestEvent {
    SetupInd(CallId, IeCollection),
    AlertInd(CallId),
    ConnectInd(CallId),
    ConnectCfm(CallId),
    ReleaseInd(CallId),
    ReleaseCfm(CallId),
    RejectInd(CallId, bool),
    InfoInd(CallId, IeCollection),
    LocateInd(MmTransactionId, IeCollection),
    AccessRightsInd(MmTransactionId, IeCollection),
    IdentityAssignInd(MmTransactionId),
    IdentityAssignCfm(MmTransactionId, bool, IeCollection),
    AuthenticateInd(MmTransactionId, IeCollection),
    AuthenticateCfm(MmTransactionId, bool),
    KeyAllocateInd(MmTransactionId),
}

/// Recording operation vectors with optional auto-responses.
#[derive(Clone, Default)]
pub struct Recorder {
    pub events: Rc<RefCell<Vec<TestEvent>>>,
    pub armed_timers: Rc<RefCell<Vec<(TimerId, Duration)>>>,
    pub stopped_timers: Rc<RefCell<Vec<TimerId>>>,
    /// Answer MM-LOCATE-ind from inside the callback: `Some(true)` accepts
    /// with a location area, `Some(false)` rejects.
    pub locate_reply: Option<bool>,
}

impl Recorder {
    pub fn push(&self, event: TestEvent) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<TestEvent> {
        self.events.borrow().clone()
    }

    pub fn last_armed_timer(&self) -> Option<TimerId> {
        self.armed_timers.borrow().last().map(|(id, _)| *id)
    }
}

impl EventOps for Recorder {
    fn register_fd(&self, _fd: RawFd, _events: u32) -> std::io::Result<()> {
        Ok(())
    }

    fn unregister_fd(&self, _fd: RawFd) {}

    fn register_timer(&self, timer: TimerId, timeout: Duration) {
        self.armed_timers.borrow_mut().push((timer, timeout));
    }

    fn unregister_timer(&self, timer: TimerId) {
        self.stopped_timers.borrow_mut().push(timer);
    }
}

impl CcOps for Recorder {
    fn mncc_setup_ind(&self, _dh: &mut DectHandle, call: CallId, param: &IeCollection) {
        self.push(TestEvent::SetupInd(call, param.clone()));
    }

    fn mncc_alert_ind(&self, _dh: &mut DectHandle, call: CallId, _param: &IeCollection) {
        self.push(TestEvent::AlertInd(call));
    }

    fn mncc_connect_ind(&self, _dh: &mut DectHandle, call: CallId, _param: &IeCollection) {
        self.push(TestEvent::ConnectInd(call));
    }

    fn mncc_connect_cfm(&self, _dh: &mut DectHandle, call: CallId, _param: &IeCollection) {
        self.push(TestEvent::ConnectCfm(call));
    }

    fn mncc_release_ind(&self, _dh: &mut DectHandle, call: CallId, _param: &IeCollection) {
        self.push(TestEvent::ReleaseInd(call));
    }

    fn mncc_release_cfm(&self, _dh: &mut DectHandle, call: CallId, _param: &IeCollection) {
        self.push(TestEvent::ReleaseCfm(call));
    }

    fn mncc_reject_ind(&self, _dh: &mut DectHandle, call: CallId, param: Option<&IeCollection>) {
        self.push(TestEvent::RejectInd(call, param.is_some()));
    }

    fn mncc_info_ind(&self, _dh: &mut DectHandle, call: CallId, param: &IeCollection) {
        self.push(TestEvent::InfoInd(call, param.clone()));
    }
}

impl MmOps for Recorder {
    fn mm_locate_ind(&self, dh: &mut DectHandle, mmta: MmTransactionId, param: &IeCollection) {
        self.push(TestEvent::LocateInd(mmta, param.clone()));
        if let Some(accept) = self.locate_reply {
            let mut res = IeCollection::new();
            if accept {
                if let Some(pt_id) = param.get(IeType::PortableIdentity) {
                    res.add_ref(pt_id.clone());
                }
                res.add(Ie::LocationArea(IeLocationArea::new(1)));
            } else {
                res.add(Ie::RejectReason(
                    opendect_sformat::ies::IeRejectReason::new(
                        opendect_sformat::ies::RejectReasonValue::IpuiUnknown,
                    ),
                ));
            }
            dh.mm_locate_res(mmta, &res).unwrap();
        }
    }

    fn mm_access_rights_ind(
        &self,
        _dh: &mut DectHandle,
        mmta: MmTransactionId,
        param: &IeCollection,
    ) {
        self.push(TestEvent::AccessRightsInd(mmta, param.clone()));
    }

    fn mm_identity_assign_ind(
        &self,
        _dh: &mut DectHandle,
        mmta: MmTransactionId,
        _param: &IeCollection,
    ) {
        self.push(TestEvent::IdentityAssignInd(mmta));
    }

    fn mm_identity_assign_cfm(
        &self,
        _dh: &mut DectHandle,
        mmta: MmTransactionId,
        accept: bool,
        param: &IeCollection,
    ) {
        self.push(TestEvent::IdentityAssignCfm(mmta, accept, param.clone()));
    }

    fn mm_authenticate_ind(
        &self,
        _dh: &mut DectHandle,
        mmta: MmTransactionId,
        param: &IeCollection,
    ) {
        self.push(TestEvent::AuthenticateInd(mmta, param.clone()));
    }

    fn mm_authenticate_cfm(
        &self,
        _dh: &mut DectHandle,
        mmta: MmTransactionId,
        accept: bool,
        _param: &IeCollection,
    ) {
        self.push(TestEvent::AuthenticateCfm(mmta, accept));
    }

    fn mm_key_allocate_ind(
        &self,
        _dh: &mut DectHandle,
        mmta: MmTransactionId,
        _param: &IeCollection,
    ) {
        self.push(TestEvent::KeyAllocateInd(mmta));
    }
}

/// Builds a handle driven by the given recorder.
pub fn handle(config: &DectConfig, recorder: &Recorder) -> DectHandle {
    let ops = DectOps::new(
        Box::new(recorder.clone()),
        Box::new(recorder.clone()),
        Box::new(recorder.clone()),
    );
    DectHandle::new(config, ops)
}

/// The portable identity used throughout the tests.
pub fn test_ipui() -> Ipui {
    Ipui::new_n(0x1234, 0x56789a & 0xfffff)
}

/// Injects one peer message, link header included.
#[allow(clippy::too_many_arguments)]
pub fn inject(
    dh: &mut DectHandle,
    sender: DectRole,
    ipui: Ipui,
    pd: ProtocolDiscriminator,
    tv: u8,
    role: TransactionRole,
    desc: &MsgDescriptor,
    msg: &IeCollection,
    msg_type: u8,
) {
    let mut mb = MsgBuf::new();
    mb.append(&[(tv << 4) | u8::from(pd), ((role as u8) << 7) | msg_type])
        .unwrap();
    build_message(sender, desc, msg, &mut mb).unwrap();
    dh.lce_rcv(ipui, mb);
}

/// Pops the next outbound message and splits off the link header.
///
/// Returns `(tv, pd, role_bit, msg_type, body)`.
pub fn next_tx(dh: &mut DectHandle, ipui: &Ipui) -> (u8, u8, u8, u8, MsgBuf) {
    let mut mb = dh.dequeue_tx(ipui).expect("no outbound message queued");
    let header = mb.pull(2).unwrap();
    let (h0, h1) = (header[0], header[1]);
    mb.msg_type = h1 & 0x7f;
    (h0 >> 4, h0 & 0x0f, h1 >> 7, h1 & 0x7f, mb)
}
