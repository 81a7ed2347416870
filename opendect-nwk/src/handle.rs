//! The DECT handle
//!
//! Long-lived process context owning the data links, transactions, calls
//! and timers. All entry points must run on the thread driving the host
//! event loop; the library never spawns threads or blocks on I/O. The
//! application forwards readiness through [`DectHandle::fd_process`] and
//! timer expiry through [`DectHandle::timer_process`].

use std::collections::HashMap;
use std::os::unix::io::RawFd;
use std::rc::Rc;

use opendect_common::{Ari, DectConfig, DectRole, Ipui};
use tracing::{debug, info, warn};

use crate::cc::{Call, CallId};
use crate::error::Result;
use crate::io::DectSocket;
use crate::mm::MmTransaction;
use crate::ops::{fd_events, DectOps};
use crate::timer::{TimerEvent, TimerId, TimerTable};
use crate::transaction::{register_protocols, DataLink, ProtocolDesc, TransactionKey};

/// The library context: one per DECT endpoint.
pub struct DectHandle {
    pub(crate) role: DectRole,
    pub(crate) pari: Ari,
    pub(crate) ops: Rc<DectOps>,
    pub(crate) protocols: Vec<ProtocolDesc>,
    pub(crate) links: HashMap<Ipui, DataLink>,
    pub(crate) calls: HashMap<TransactionKey, Call>,
    pub(crate) mm_transactions: HashMap<TransactionKey, MmTransaction>,
    pub(crate) timers: TimerTable,
    pub(crate) s_sap: Option<DectSocket>,
}

impl DectHandle {
    /// Creates a handle from a configuration and the application's
    /// operation vectors. No sockets are opened yet; see
    /// [`DectHandle::open`].
    pub fn new(config: &DectConfig, ops: Rc<DectOps>) -> Self {
        info!("new {:?} handle", config.role);
        Self {
            role: config.role,
            pari: config.pari(),
            ops,
            protocols: register_protocols(),
            links: HashMap::new(),
            calls: HashMap::new(),
            mm_transactions: HashMap::new(),
            timers: TimerTable::default(),
            s_sap: None,
        }
    }

    /// The configured protocol role.
    pub fn role(&self) -> DectRole {
        self.role
    }

    /// The primary access rights identity (FP).
    pub fn pari(&self) -> Ari {
        self.pari
    }

    /// Opens the signaling SAP socket and registers it with the
    /// application's event loop.
    pub fn open(&mut self) -> Result<()> {
        if self.s_sap.is_some() {
            return Ok(());
        }
        let socket = DectSocket::s_sap()?;
        self.ops
            .event_ops
            .register_fd(socket.fd(), fd_events::READ)?;
        self.s_sap = Some(socket);
        Ok(())
    }

    /// Shuts the handle down: every link's transactions get their shutdown
    /// notifications, then all resources are released.
    pub fn shutdown(&mut self) {
        let ipuis: Vec<Ipui> = self.links.keys().copied().collect();
        for ipui in ipuis {
            self.link_shutdown(&ipui);
        }
        if let Some(socket) = self.s_sap.take() {
            self.ops.event_ops.unregister_fd(socket.fd());
        }
    }

    /// Number of open calls.
    pub fn open_calls(&self) -> usize {
        self.calls.len()
    }

    /// Number of armed timers.
    pub fn armed_timers(&self) -> usize {
        self.timers.len()
    }

    /// Processes events on a registered file descriptor.
    ///
    /// Called by the application when its event loop signals readiness for
    /// a descriptor the library registered.
    pub fn fd_process(&mut self, fd: RawFd, events: u32) {
        if events & fd_events::READ == 0 {
            return;
        }

        if self.s_sap.as_ref().is_some_and(|s| s.fd() == fd) {
            self.s_sap_process();
            return;
        }

        // U-plane data for one of the calls.
        let call_key = self
            .calls
            .iter()
            .find(|(_, call)| call.lu_sap.as_ref().is_some_and(|s| s.fd() == fd))
            .map(|(key, _)| *key);
        if let Some(key) = call_key {
            self.lu_process(key);
            return;
        }

        debug!("event on unknown fd {fd}");
    }

    fn s_sap_process(&mut self) {
        loop {
            let Some(s_sap) = &self.s_sap else {
                return;
            };
            match s_sap.recv_from() {
                Ok((mb, addr)) => match addr.to_ipui() {
                    Ok(ipui) => self.lce_rcv(ipui, mb),
                    Err(err) => warn!("signaling message with bad address: {err}"),
                },
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => return,
                Err(err) => {
                    warn!("signaling receive error: {err}");
                    return;
                }
            }
        }
    }

    fn lu_process(&mut self, key: TransactionKey) {
        let Some(call) = self.calls.get(&key) else {
            return;
        };
        let Some(lu_sap) = &call.lu_sap else {
            return;
        };
        match lu_sap.recv() {
            Ok(mb) => {
                let ops = self.ops.clone();
                ops.cc_ops.dl_u_data_ind(self, CallId(key), &mb);
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(err) => debug!("U-plane receive error: {err}"),
        }
    }

    /// Processes the expiry of a registered timer.
    ///
    /// Called by the application when a timer armed through the event ops
    /// fires. Expiry of an already stopped timer is ignored.
    pub fn timer_process(&mut self, timer: TimerId) {
        let Some(event) = self.timers.expire(timer) else {
            debug!("expiry of unknown timer {timer}");
            return;
        };
        match event {
            TimerEvent::CcSetup(key) => crate::cc::setup_timer_expired(self, key),
            TimerEvent::LinkRelease(ipui) => self.link_release_expired(ipui),
        }
    }
}

impl Drop for DectHandle {
    fn drop(&mut self) {
        if let Some(socket) = self.s_sap.take() {
            self.ops.event_ops.unregister_fd(socket.fd());
        }
    }
}
