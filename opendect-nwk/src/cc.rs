//! Call Control entity
//!
//! One call per CC transaction, driven by the MNCC primitives on the
//! application side and the CC message set on the wire side. The initiating
//! side runs a single-shot setup timer that is cancelled by any response to
//! the CC-SETUP; its expiry rejects the call. Entering the active phase
//! connects the call's U-plane socket, any release disconnects it.
//!
//! Out-of-state messages are logged and dropped; recovery stays local to
//! the affected call.

use std::time::Duration;

use opendect_common::{DectRole, Ipui, MsgBuf};
use opendect_sformat::ies::{IeFixedIdentity, IePortableIdentity};
use opendect_sformat::msg::cc::{
    CC_ALERTING, CC_CALL_PROC, CC_CONNECT, CC_CONNECT_ACK, CC_INFO, CC_IWU_INFO, CC_NOTIFY,
    CC_RELEASE, CC_RELEASE_COM, CC_SERVICE_ACCEPT, CC_SERVICE_CHANGE, CC_SERVICE_REJECT,
    CC_SETUP, CC_SETUP_ACK,
};
use opendect_sformat::{
    parse_message, CcMessageType, Ie, IeCollection, IeRef, IeType, MsgDescriptor,
    ProtocolDiscriminator,
};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::handle::DectHandle;
use crate::io::DectSocket;
use crate::ops::fd_events;
use crate::timer::{TimerEvent, TimerId};
use crate::transaction::{LinkRelease, TransactionKey};

/// Setup supervision timeout (<CC.03>).
pub const CC_SETUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Call Control states (EN 300 175-5 section 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CcState {
    #[default]
    Null,
    CallInitiated,
    OverlapSending,
    CallProceeding,
    CallDelivered,
    CallPresent,
    CallReceived,
    ConnectPending,
    Active,
    ReleasePending,
    OverlapReceiving,
    IncomingCallProceeding,
}

impl std::fmt::Display for CcState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CcState::Null => "NULL",
            CcState::CallInitiated => "CALL INITIATED",
            CcState::OverlapSending => "OVERLAP SENDING",
            CcState::CallProceeding => "CALL PROCEEDING",
            CcState::CallDelivered => "CALL DELIVERED",
            CcState::CallPresent => "CALL PRESENT",
            CcState::CallReceived => "CALL RECEIVED",
            CcState::ConnectPending => "CONNECT PENDING",
            CcState::Active => "ACTIVE",
            CcState::ReleasePending => "RELEASE PENDING",
            CcState::OverlapReceiving => "OVERLAP RECEIVING",
            CcState::IncomingCallProceeding => "INCOMING CALL PROCEEDING",
        };
        f.write_str(name)
    }
}

/// Opaque call reference handed to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(pub(crate) TransactionKey);

/// Per-call state.
#[derive(Debug)]
pub struct Call {
    pub(crate) state: CcState,
    pub(crate) key: TransactionKey,
    pub(crate) pt_id: Option<IeRef>,
    pub(crate) ft_id: Option<IeRef>,
    pub(crate) setup_timer: Option<TimerId>,
    pub(crate) lu_sap: Option<DectSocket>,
}

impl Call {
    fn new(key: TransactionKey) -> Self {
        Self {
            state: CcState::Null,
            key,
            pt_id: None,
            ft_id: None,
            setup_timer: None,
            lu_sap: None,
        }
    }

    /// Current CC state.
    pub fn state(&self) -> CcState {
        self.state
    }

    /// The portable identity held for this call, if known.
    pub fn portable_identity(&self) -> Option<&IePortableIdentity> {
        self.pt_id.as_deref().and_then(Ie::as_portable_identity)
    }

    /// Returns true when the U-plane is connected.
    pub fn uplane_connected(&self) -> bool {
        self.lu_sap.is_some()
    }

    /// The U-plane link endpoint identifier derived from the transaction.
    pub fn ulei(&self) -> u32 {
        (u32::from(u8::from(self.key.pd)) << 16)
            | (u32::from(self.key.tv) << 8)
            | self.key.role as u32
    }
}

/// Copies `param` into `msg`, skipping the listed element types.
fn merge_param(msg: &mut IeCollection, param: &IeCollection, skip: &[IeType]) {
    for (ty, list) in param.groups() {
        if skip.contains(&ty) {
            continue;
        }
        msg.set_order(ty, list.order);
        for item in &list.items {
            msg.add_ref(item.clone());
        }
    }
}

impl DectHandle {
    /// The call for the given reference, if it still exists.
    pub fn call(&self, call: CallId) -> Option<&Call> {
        self.calls.get(&call.0)
    }

    fn call_mut(&mut self, call: &CallId) -> Result<&mut Call> {
        self.calls.get_mut(&call.0).ok_or(Error::UnknownTransaction)
    }

    fn cc_send(
        &mut self,
        call: CallId,
        desc: &MsgDescriptor,
        msg: &IeCollection,
        ty: CcMessageType,
    ) -> Result<()> {
        self.lce_send(&call.0, desc, msg, ty.into())
    }

    /// MNCC-SETUP-req: originates a call towards `ipui`.
    ///
    /// The portable and fixed identity elements are supplied by the stack;
    /// `param` carries the remaining elements (basic service, called party
    /// number, ...).
    pub fn mncc_setup_req(&mut self, ipui: Ipui, param: &IeCollection) -> Result<CallId> {
        let key = self.open_transaction(ipui, ProtocolDiscriminator::Cc)?;
        let call = CallId(key);

        let mut msg = IeCollection::new();
        msg.add(Ie::PortableIdentity(IePortableIdentity::Ipui(ipui)));
        msg.add(Ie::FixedIdentity(IeFixedIdentity::new_park(self.pari)));
        merge_param(
            &mut msg,
            param,
            &[IeType::PortableIdentity, IeType::FixedIdentity],
        );

        if let Err(err) = self.cc_send(call, &CC_SETUP, &msg, CcMessageType::Setup) {
            self.close_transaction(&key, LinkRelease::Normal);
            return Err(err);
        }

        let mut c = Call::new(key);
        c.state = CcState::CallPresent;
        c.pt_id = msg.get(IeType::PortableIdentity).cloned();
        c.ft_id = msg.get(IeType::FixedIdentity).cloned();
        let ops = self.ops.clone();
        c.setup_timer =
            Some(self.timers.start(&ops, TimerEvent::CcSetup(key), CC_SETUP_TIMEOUT));
        self.calls.insert(key, c);

        trace!("CC: call {key:?}: setup request");
        Ok(call)
    }

    /// MNCC-SETUP-ACK-req: acknowledges an incoming setup for overlap
    /// receiving.
    pub fn mncc_setup_ack_req(&mut self, call: CallId, param: &IeCollection) -> Result<()> {
        let c = self.call_mut(&call)?;
        let mut msg = IeCollection::new();
        if let Some(pt_id) = &c.pt_id {
            msg.add_ref(pt_id.clone());
        }
        if let Some(ft_id) = &c.ft_id {
            msg.add_ref(ft_id.clone());
        }
        merge_param(
            &mut msg,
            param,
            &[IeType::PortableIdentity, IeType::FixedIdentity],
        );
        self.cc_send(call, &CC_SETUP_ACK, &msg, CcMessageType::SetupAck)?;
        self.call_mut(&call)?.state = CcState::OverlapReceiving;
        Ok(())
    }

    /// MNCC-CALL-PROC-req: signals that the incoming call is proceeding.
    pub fn mncc_call_proc_req(&mut self, call: CallId, param: &IeCollection) -> Result<()> {
        self.call_mut(&call)?;
        self.cc_send(call, &CC_CALL_PROC, param, CcMessageType::CallProc)?;
        self.call_mut(&call)?.state = CcState::CallProceeding;
        Ok(())
    }

    /// MNCC-ALERT-req: starts alerting for an incoming call.
    pub fn mncc_alert_req(&mut self, call: CallId, param: &IeCollection) -> Result<()> {
        self.call_mut(&call)?;
        self.cc_send(call, &CC_ALERTING, param, CcMessageType::Alerting)?;
        self.call_mut(&call)?.state = CcState::CallReceived;
        Ok(())
    }

    /// MNCC-CONNECT-req: answers an incoming call.
    pub fn mncc_connect_req(&mut self, call: CallId, param: &IeCollection) -> Result<()> {
        self.call_mut(&call)?;
        self.cc_send(call, &CC_CONNECT, param, CcMessageType::Connect)?;
        self.connect_uplane(&call.0);
        let c = self.call_mut(&call)?;
        c.state = CcState::ConnectPending;
        Ok(())
    }

    /// MNCC-CONNECT-res: completes the connection after an
    /// MNCC-CONNECT-ind.
    pub fn mncc_connect_res(&mut self, call: CallId, param: &IeCollection) -> Result<()> {
        self.call_mut(&call)?;
        self.connect_uplane(&call.0);
        self.cc_send(call, &CC_CONNECT_ACK, param, CcMessageType::ConnectAck)?;
        let c = self.call_mut(&call)?;
        c.state = CcState::Active;
        Ok(())
    }

    /// MNCC-RELEASE-req: initiates call release.
    pub fn mncc_release_req(&mut self, call: CallId, param: &IeCollection) -> Result<()> {
        self.cc_send(call, &CC_RELEASE, param, CcMessageType::Release)?;
        let c = self.call_mut(&call)?;
        c.state = CcState::ReleasePending;
        Ok(())
    }

    /// MNCC-RELEASE-res: completes a peer-initiated release.
    pub fn mncc_release_res(&mut self, call: CallId, param: &IeCollection) -> Result<()> {
        self.cc_send(call, &CC_RELEASE_COM, param, CcMessageType::ReleaseCom)?;
        self.disconnect_uplane(&call.0);
        self.close_transaction(&call.0, LinkRelease::Normal);
        self.destroy_call(&call.0);
        Ok(())
    }

    /// MNCC-REJECT-req: rejects a call before the active phase.
    pub fn mncc_reject_req(&mut self, call: CallId, param: &IeCollection) -> Result<()> {
        self.cc_send(call, &CC_RELEASE_COM, param, CcMessageType::ReleaseCom)?;
        self.close_transaction(&call.0, LinkRelease::Normal);
        self.destroy_call(&call.0);
        Ok(())
    }

    /// MNCC-INFO-req: sends mid-call information.
    pub fn mncc_info_req(&mut self, call: CallId, param: &IeCollection) -> Result<()> {
        self.call_mut(&call)?;
        self.cc_send(call, &CC_INFO, param, CcMessageType::Info)
    }

    /// DL-U-DATA-req: writes U-plane data for the call.
    pub fn dl_u_data_req(&mut self, call: CallId, mb: &MsgBuf) -> Result<()> {
        let c = self.call_mut(&call)?;
        let Some(lu_sap) = &c.lu_sap else {
            debug!("CC: call {:?}: U-plane data while unconnected", call.0);
            return Ok(());
        };
        lu_sap.send(mb)?;
        Ok(())
    }

    fn connect_uplane(&mut self, key: &TransactionKey) {
        let ops = self.ops.clone();
        let Some(call) = self.calls.get_mut(key) else {
            return;
        };
        if call.lu_sap.is_some() {
            return;
        }
        match DectSocket::lu1(call.ulei()) {
            Ok(socket) => {
                if let Err(err) = ops.event_ops.register_fd(socket.fd(), fd_events::READ) {
                    debug!("CC: call {key:?}: U-plane fd registration failed: {err}");
                    return;
                }
                call.lu_sap = Some(socket);
                trace!("CC: call {key:?}: U-plane connected");
            }
            Err(err) => debug!("CC: call {key:?}: U-plane connect failed: {err}"),
        }
    }

    fn disconnect_uplane(&mut self, key: &TransactionKey) {
        let ops = self.ops.clone();
        let Some(call) = self.calls.get_mut(key) else {
            return;
        };
        if let Some(socket) = call.lu_sap.take() {
            ops.event_ops.unregister_fd(socket.fd());
            trace!("CC: call {key:?}: U-plane disconnected");
        }
    }

    fn stop_setup_timer(&mut self, key: &TransactionKey) {
        let ops = self.ops.clone();
        if let Some(call) = self.calls.get_mut(key) {
            if let Some(timer) = call.setup_timer.take() {
                self.timers.stop(&ops, timer);
            }
        }
    }

    fn destroy_call(&mut self, key: &TransactionKey) {
        self.stop_setup_timer(key);
        self.disconnect_uplane(key);
        self.calls.remove(key);
    }
}

/// Handles CC setup timer expiry: one MNCC-REJECT-ind, then the call is
/// gone.
pub(crate) fn setup_timer_expired(dh: &mut DectHandle, key: TransactionKey) {
    let Some(call) = dh.calls.get_mut(&key) else {
        return;
    };
    debug!("CC: call {key:?}: setup timer expired");
    call.setup_timer = None;

    let ops = dh.ops.clone();
    ops.cc_ops.mncc_reject_ind(dh, CallId(key), None);

    dh.close_transaction(&key, LinkRelease::Normal);
    dh.destroy_call(&key);
}

fn set_state(dh: &mut DectHandle, key: &TransactionKey, state: CcState) {
    if let Some(call) = dh.calls.get_mut(key) {
        trace!("CC: call {key:?}: state {} -> {state}", call.state);
        call.state = state;
    }
}

fn parse(dh: &DectHandle, desc: &MsgDescriptor, mb: &mut MsgBuf) -> Option<IeCollection> {
    match parse_message(dh.role(), desc, mb) {
        Ok(msg) => Some(msg),
        Err(err) => {
            debug!("CC: {}: {err}", desc.name);
            None
        }
    }
}

fn rcv_alerting(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let state = dh.calls[key].state;
    if !matches!(
        state,
        CcState::CallPresent | CcState::OverlapSending | CcState::CallProceeding
    ) {
        debug!("CC: call {key:?}: CC-ALERTING in state {state}, dropped");
        return;
    }
    let Some(msg) = parse(dh, &CC_ALERTING, &mut mb) else {
        return;
    };

    dh.stop_setup_timer(key);
    set_state(dh, key, CcState::CallReceived);

    let ops = dh.ops.clone();
    ops.cc_ops.mncc_alert_ind(dh, CallId(*key), &msg);
}

fn rcv_call_proc(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let state = dh.calls[key].state;
    if !matches!(state, CcState::CallPresent | CcState::OverlapSending) {
        debug!("CC: call {key:?}: CC-CALL-PROC in state {state}, dropped");
        return;
    }
    if parse(dh, &CC_CALL_PROC, &mut mb).is_none() {
        return;
    }
    dh.stop_setup_timer(key);
    set_state(dh, key, CcState::CallProceeding);
}

fn rcv_connect(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let state = dh.calls[key].state;
    if !matches!(
        state,
        CcState::CallPresent
            | CcState::CallReceived
            | CcState::CallProceeding
            | CcState::OverlapSending
    ) {
        debug!("CC: call {key:?}: CC-CONNECT in state {state}, dropped");
        return;
    }
    let Some(msg) = parse(dh, &CC_CONNECT, &mut mb) else {
        return;
    };

    dh.stop_setup_timer(key);
    // The fixed part enters the active phase directly; the portable part
    // awaits its CC-CONNECT-ACK.
    let next = match dh.role() {
        DectRole::Fp => CcState::Active,
        DectRole::Pp => CcState::ConnectPending,
    };
    set_state(dh, key, next);
    dh.connect_uplane(key);

    let ops = dh.ops.clone();
    ops.cc_ops.mncc_connect_ind(dh, CallId(*key), &msg);
}

fn rcv_setup_ack(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let state = dh.calls[key].state;
    if state != CcState::CallPresent {
        debug!("CC: call {key:?}: CC-SETUP-ACK in state {state}, dropped");
        return;
    }
    if parse(dh, &CC_SETUP_ACK, &mut mb).is_none() {
        return;
    }
    dh.stop_setup_timer(key);
    set_state(dh, key, CcState::OverlapSending);
}

fn rcv_connect_ack(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let state = dh.calls[key].state;
    if state != CcState::ConnectPending {
        debug!("CC: call {key:?}: CC-CONNECT-ACK in state {state}, dropped");
        return;
    }
    let Some(msg) = parse(dh, &CC_CONNECT_ACK, &mut mb) else {
        return;
    };
    set_state(dh, key, CcState::Active);

    let ops = dh.ops.clone();
    ops.cc_ops.mncc_connect_cfm(dh, CallId(*key), &msg);
}

fn rcv_release(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let Some(msg) = parse(dh, &CC_RELEASE, &mut mb) else {
        return;
    };
    dh.stop_setup_timer(key);
    set_state(dh, key, CcState::ReleasePending);

    let ops = dh.ops.clone();
    ops.cc_ops.mncc_release_ind(dh, CallId(*key), &msg);
}

fn rcv_release_com(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let Some(msg) = parse(dh, &CC_RELEASE_COM, &mut mb) else {
        return;
    };
    let state = dh.calls[key].state;
    let ops = dh.ops.clone();
    if state == CcState::ReleasePending {
        ops.cc_ops.mncc_release_cfm(dh, CallId(*key), &msg);
    } else {
        ops.cc_ops.mncc_release_ind(dh, CallId(*key), &msg);
    }

    dh.disconnect_uplane(key);
    dh.close_transaction(key, LinkRelease::Normal);
    dh.destroy_call(key);
}

fn rcv_info(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let Some(msg) = parse(dh, &CC_INFO, &mut mb) else {
        return;
    };
    let ops = dh.ops.clone();
    ops.cc_ops.mncc_info_ind(dh, CallId(*key), &msg);
}

/// Receive path for open CC transactions.
pub(crate) fn rcv(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    if !dh.calls.contains_key(key) {
        debug!("CC: no call for transaction {key:?}");
        return;
    }
    let Ok(ty) = CcMessageType::try_from(mb.msg_type) else {
        debug!("CC: unknown message type {:#04x}", mb.msg_type);
        return;
    };
    trace!("CC: call {key:?}: receive {ty:?}");

    match ty {
        CcMessageType::Alerting => rcv_alerting(dh, key, mb),
        CcMessageType::CallProc => rcv_call_proc(dh, key, mb),
        CcMessageType::Connect => rcv_connect(dh, key, mb),
        CcMessageType::SetupAck => rcv_setup_ack(dh, key, mb),
        CcMessageType::ConnectAck => rcv_connect_ack(dh, key, mb),
        CcMessageType::Release => rcv_release(dh, key, mb),
        CcMessageType::ReleaseCom => rcv_release_com(dh, key, mb),
        CcMessageType::Info => rcv_info(dh, key, mb),
        CcMessageType::ServiceChange => {
            let _ = parse(dh, &CC_SERVICE_CHANGE, &mut mb);
        }
        CcMessageType::ServiceAccept => {
            let _ = parse(dh, &CC_SERVICE_ACCEPT, &mut mb);
        }
        CcMessageType::ServiceReject => {
            let _ = parse(dh, &CC_SERVICE_REJECT, &mut mb);
        }
        CcMessageType::Notify => {
            let _ = parse(dh, &CC_NOTIFY, &mut mb);
        }
        CcMessageType::IwuInfo => {
            let _ = parse(dh, &CC_IWU_INFO, &mut mb);
        }
        CcMessageType::Setup => {
            debug!("CC: call {key:?}: CC-SETUP on open transaction, dropped");
        }
    }
}

fn rcv_setup(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let Some(msg) = parse(dh, &CC_SETUP, &mut mb) else {
        // A setup failing its mandatory elements creates no call.
        return;
    };

    let mut call = Call::new(*key);
    call.state = CcState::CallInitiated;
    call.pt_id = msg.get(IeType::PortableIdentity).cloned();
    call.ft_id = msg.get(IeType::FixedIdentity).cloned();

    dh.confirm_transaction(key);
    dh.calls.insert(*key, call);
    trace!("CC: call {key:?}: new incoming call");

    let ops = dh.ops.clone();
    ops.cc_ops.mncc_setup_ind(dh, CallId(*key), &msg);
}

/// Open path for messages without a matching CC transaction.
pub(crate) fn open(dh: &mut DectHandle, key: &TransactionKey, mb: MsgBuf) {
    match CcMessageType::try_from(mb.msg_type) {
        Ok(CcMessageType::Setup) => rcv_setup(dh, key, mb),
        Ok(CcMessageType::Release) | Ok(CcMessageType::ReleaseCom) => {
            debug!("CC: release for unknown transaction {key:?}, dropped");
        }
        Ok(ty) => debug!("CC: {ty:?} for unknown transaction {key:?}, dropped"),
        Err(_) => debug!("CC: unknown message type {:#04x}", mb.msg_type),
    }
}

/// Link shutdown: the call fails with an MNCC-REJECT-ind.
pub(crate) fn shutdown(dh: &mut DectHandle, key: &TransactionKey) {
    if !dh.calls.contains_key(key) {
        return;
    }
    debug!("CC: call {key:?}: shutdown");
    let ops = dh.ops.clone();
    ops.cc_ops.mncc_reject_ind(dh, CallId(*key), None);
    dh.close_transaction(key, LinkRelease::Normal);
    dh.destroy_call(key);
}
