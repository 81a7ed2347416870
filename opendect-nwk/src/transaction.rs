//! Transaction layer
//!
//! One data link per portable identity carries the signaling association;
//! on it, transactions pair requests and responses per protocol
//! discriminator. A transaction is identified by its 4-bit transaction
//! value plus the role bit F naming the initiating side (0 = FP, 1 = PP),
//! which doubles the identifier space.
//!
//! The link header preceding every S-format message is supplied by the
//! kernel transport:
//!
//! ```text
//! octet 0: | TV (4 bits) | PD (4 bits) |
//! octet 1: | F | message type (7 bits) |
//! ```
//!
//! Inbound messages matching an open transaction go to the owning
//! protocol's receive path; others are offered to the protocol as a
//! prospective transaction which it either confirms or drops. When the
//! last transaction on a link closes with a normal release, the link
//! lingers for a grace period before it is destroyed.

use std::collections::VecDeque;
use std::time::Duration;

use opendect_common::{DectRole, Ipui, MsgBuf};
use opendect_sformat::ies::{IeReleaseReason, ReleaseReasonValue};
use opendect_sformat::msg::cc::CC_RELEASE_COM;
use opendect_sformat::{CcMessageType, Ie, IeCollection, MsgDescriptor, ProtocolDiscriminator};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::handle::DectHandle;
use crate::timer::TimerEvent;

/// Grace period an idle data link lingers before destruction.
pub const LINK_LINGER_TIMEOUT: Duration = Duration::from_secs(5);

/// Transaction values per protocol and direction.
pub const TV_MAX: u8 = 16;

/// The role bit F: which side initiated the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransactionRole {
    FpInitiated = 0,
    PpInitiated = 1,
}

impl TransactionRole {
    /// The role bit used for transactions initiated by the given side.
    pub fn initiated_by(role: DectRole) -> Self {
        match role {
            DectRole::Fp => TransactionRole::FpInitiated,
            DectRole::Pp => TransactionRole::PpInitiated,
        }
    }
}

/// Unique identifier of a transaction within the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionKey {
    pub ipui: Ipui,
    pub pd: ProtocolDiscriminator,
    pub tv: u8,
    pub role: TransactionRole,
}

/// An open transaction on a data link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transaction {
    pub pd: ProtocolDiscriminator,
    pub tv: u8,
    pub role: TransactionRole,
}

/// How a closing transaction treats its data link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRelease {
    /// Release the link when this was the last transaction.
    Normal,
    /// Keep the link open for follow-up transactions.
    Partial,
}

/// A signaling association with one portable identity.
#[derive(Debug, Default)]
pub struct DataLink {
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) tx_queue: VecDeque<MsgBuf>,
    pub(crate) release_timer: Option<crate::timer::TimerId>,
}

impl DataLink {
    pub(crate) fn has(&self, pd: ProtocolDiscriminator, tv: u8, role: TransactionRole) -> bool {
        self.transactions
            .iter()
            .any(|t| t.pd == pd && t.tv == tv && t.role == role)
    }

    pub(crate) fn count(&self, pd: ProtocolDiscriminator, role: TransactionRole) -> usize {
        self.transactions
            .iter()
            .filter(|t| t.pd == pd && t.role == role)
            .count()
    }

    /// Number of open transactions on this link.
    pub fn open_transactions(&self) -> usize {
        self.transactions.len()
    }

    /// Number of outbound messages waiting for the transport.
    pub fn pending_tx(&self) -> usize {
        self.tx_queue.len()
    }
}

/// Registry entry of one NWK-layer protocol.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolDesc {
    pub pd: ProtocolDiscriminator,
    pub name: &'static str,
    /// Maximum concurrent transactions per data link and direction.
    pub max_transactions: u8,
}

/// Builds the protocol registry. Invoked from the handle constructor in
/// place of self-registration at process start.
pub fn register_protocols() -> Vec<ProtocolDesc> {
    vec![
        ProtocolDesc {
            pd: ProtocolDiscriminator::Lce,
            name: "Link Control",
            max_transactions: 7,
        },
        ProtocolDesc {
            pd: ProtocolDiscriminator::Cc,
            name: "Call Control",
            max_transactions: 7,
        },
        ProtocolDesc {
            pd: ProtocolDiscriminator::Ciss,
            name: "Call Independent Supplementary Services",
            max_transactions: 7,
        },
        ProtocolDesc {
            pd: ProtocolDiscriminator::Mm,
            name: "Mobility Management",
            max_transactions: 1,
        },
        ProtocolDesc {
            pd: ProtocolDiscriminator::Clms,
            name: "ConnectionLess Message Service",
            max_transactions: 1,
        },
        ProtocolDesc {
            pd: ProtocolDiscriminator::Coms,
            name: "Connection Oriented Message Service",
            max_transactions: 7,
        },
    ]
}

fn encode_link_header(key: &TransactionKey, msg_type: u8) -> [u8; 2] {
    [
        (key.tv << 4) | u8::from(key.pd),
        ((key.role as u8) << 7) | (msg_type & 0x7f),
    ]
}

impl DectHandle {
    pub(crate) fn protocol(&self, pd: ProtocolDiscriminator) -> Option<&ProtocolDesc> {
        self.protocols.iter().find(|p| p.pd == pd)
    }

    fn link_mut(&mut self, ipui: Ipui) -> &mut DataLink {
        self.links.entry(ipui).or_insert_with(|| {
            trace!("new data link {ipui}");
            DataLink::default()
        })
    }

    /// The data link for the given portable identity, if one exists.
    pub fn link(&self, ipui: &Ipui) -> Option<&DataLink> {
        self.links.get(ipui)
    }

    /// Allocates an outbound transaction on the link to `ipui`.
    pub(crate) fn open_transaction(
        &mut self,
        ipui: Ipui,
        pd: ProtocolDiscriminator,
    ) -> Result<TransactionKey> {
        let max = self
            .protocol(pd)
            .ok_or(Error::UnknownProtocol)?
            .max_transactions;
        let role = TransactionRole::initiated_by(self.role);

        let link = self.link_mut(ipui);
        if link.count(pd, role) >= usize::from(max) {
            debug!("{}: transaction limit {max} reached", pd.name());
            return Err(Error::Overload);
        }
        let tv = (0..TV_MAX)
            .find(|tv| !link.has(pd, *tv, role))
            .ok_or(Error::Overload)?;

        link.transactions.push(Transaction { pd, tv, role });
        let key = TransactionKey {
            ipui,
            pd,
            tv,
            role,
        };
        self.cancel_link_release(ipui);
        trace!("{}: open transaction {tv}/{role:?}", pd.name());
        Ok(key)
    }

    /// Promotes a prospective inbound transaction into the open set.
    pub(crate) fn confirm_transaction(&mut self, key: &TransactionKey) {
        let link = self.link_mut(key.ipui);
        link.transactions.push(Transaction {
            pd: key.pd,
            tv: key.tv,
            role: key.role,
        });
        self.cancel_link_release(key.ipui);
        trace!("{}: confirm transaction {}/{:?}", key.pd.name(), key.tv, key.role);
    }

    /// Closes a transaction, optionally requesting link release.
    pub(crate) fn close_transaction(&mut self, key: &TransactionKey, release: LinkRelease) {
        let Some(link) = self.links.get_mut(&key.ipui) else {
            return;
        };
        link.transactions
            .retain(|t| !(t.pd == key.pd && t.tv == key.tv && t.role == key.role));
        trace!("{}: close transaction {}/{:?}", key.pd.name(), key.tv, key.role);

        if link.transactions.is_empty() && release == LinkRelease::Normal {
            self.schedule_link_release(key.ipui);
        }
    }

    fn schedule_link_release(&mut self, ipui: Ipui) {
        let ops = self.ops.clone();
        let Some(link) = self.links.get_mut(&ipui) else {
            return;
        };
        if link.release_timer.is_some() {
            return;
        }
        let timer = self
            .timers
            .start(&ops, TimerEvent::LinkRelease(ipui), LINK_LINGER_TIMEOUT);
        if let Some(link) = self.links.get_mut(&ipui) {
            link.release_timer = Some(timer);
        }
    }

    fn cancel_link_release(&mut self, ipui: Ipui) {
        let ops = self.ops.clone();
        if let Some(link) = self.links.get_mut(&ipui) {
            if let Some(timer) = link.release_timer.take() {
                self.timers.stop(&ops, timer);
            }
        }
    }

    /// Destroys an idle link after its grace period.
    pub(crate) fn link_release_expired(&mut self, ipui: Ipui) {
        if let Some(link) = self.links.get(&ipui) {
            if link.transactions.is_empty() {
                debug!("released data link {ipui}");
                self.links.remove(&ipui);
            } else if let Some(link) = self.links.get_mut(&ipui) {
                link.release_timer = None;
            }
        }
    }

    /// Serializes a message for the given transaction and queues it on the
    /// link.
    pub(crate) fn lce_send(
        &mut self,
        key: &TransactionKey,
        desc: &MsgDescriptor,
        msg: &IeCollection,
        msg_type: u8,
    ) -> Result<()> {
        let mut mb = MsgBuf::new();
        mb.append(&encode_link_header(key, msg_type))?;
        opendect_sformat::build_message(self.role, desc, msg, &mut mb)?;
        mb.msg_type = msg_type;
        self.queue_tx(key.ipui, mb);
        Ok(())
    }

    pub(crate) fn queue_tx(&mut self, ipui: Ipui, mb: MsgBuf) {
        self.link_mut(ipui).tx_queue.push_back(mb);
        self.flush_link(ipui);
    }

    /// Pushes queued messages to the kernel socket, in order.
    fn flush_link(&mut self, ipui: Ipui) {
        let Some(s_sap) = &self.s_sap else {
            return;
        };
        let Ok(addr) = crate::io::SockaddrDect::from_ipui(&ipui) else {
            warn!("unencodable link address {ipui}");
            return;
        };
        let Some(link) = self.links.get_mut(&ipui) else {
            return;
        };
        while let Some(mb) = link.tx_queue.front() {
            match s_sap.send_to(mb, &addr) {
                Ok(_) => {
                    link.tx_queue.pop_front();
                }
                Err(err) => {
                    trace!("link {ipui}: transmit deferred: {err}");
                    break;
                }
            }
        }
    }

    /// Removes the next outbound message queued on the link to `ipui`.
    ///
    /// Used when the link is driven by an external transport instead of
    /// the kernel socket.
    pub fn dequeue_tx(&mut self, ipui: &Ipui) -> Option<MsgBuf> {
        self.links.get_mut(ipui)?.tx_queue.pop_front()
    }

    /// Inbound entry point: one S-SAP message from the link to `ipui`.
    ///
    /// Decodes the link header and routes the message to an open
    /// transaction or to the owning protocol for a new one.
    pub fn lce_rcv(&mut self, ipui: Ipui, mut mb: MsgBuf) {
        let header = match mb.pull(2) {
            Ok(h) => [h[0], h[1]],
            Err(_) => {
                debug!("link {ipui}: runt message");
                return;
            }
        };
        let tv = header[0] >> 4;
        let Ok(pd) = ProtocolDiscriminator::try_from(header[0] & 0x0f) else {
            debug!("link {ipui}: unknown protocol discriminator {:#x}", header[0] & 0x0f);
            return;
        };
        let role = if header[1] & 0x80 != 0 {
            TransactionRole::PpInitiated
        } else {
            TransactionRole::FpInitiated
        };
        mb.msg_type = header[1] & 0x7f;

        let key = TransactionKey { ipui, pd, tv, role };
        let link = self.link_mut(ipui);

        if link.has(pd, tv, role) {
            trace!("{}: deliver type {:#04x} to {tv}/{role:?}", pd.name(), mb.msg_type);
            self.protocol_rcv(&key, mb);
            return;
        }

        // A new transaction must have been initiated by the peer.
        if role == TransactionRole::initiated_by(self.role) {
            debug!(
                "{}: message for unknown own transaction {tv}, dropped",
                pd.name()
            );
            return;
        }

        let Some(max) = self.protocol(pd).map(|p| p.max_transactions) else {
            debug!("{}: unregistered protocol", pd.name());
            return;
        };
        if self.link_mut(ipui).count(pd, role) >= usize::from(max) {
            warn!("{}: inbound transaction limit {max} reached", pd.name());
            self.protocol_reject(&key);
            return;
        }

        trace!("{}: new transaction {tv}/{role:?} type {:#04x}", pd.name(), mb.msg_type);
        self.protocol_open(&key, mb);
    }

    fn protocol_rcv(&mut self, key: &TransactionKey, mb: MsgBuf) {
        match key.pd {
            ProtocolDiscriminator::Cc => crate::cc::rcv(self, key, mb),
            ProtocolDiscriminator::Mm => crate::mm::rcv(self, key, mb),
            pd => debug!("{}: no receive handler", pd.name()),
        }
    }

    fn protocol_open(&mut self, key: &TransactionKey, mb: MsgBuf) {
        match key.pd {
            ProtocolDiscriminator::Cc => crate::cc::open(self, key, mb),
            ProtocolDiscriminator::Mm => crate::mm::open(self, key, mb),
            pd => debug!("{}: no open handler", pd.name()),
        }
    }

    /// Protocol-specific rejection of an inbound transaction that exceeds
    /// the concurrency limit.
    fn protocol_reject(&mut self, key: &TransactionKey) {
        match key.pd {
            ProtocolDiscriminator::Cc => {
                let mut msg = IeCollection::new();
                msg.add(Ie::ReleaseReason(IeReleaseReason::new(
                    ReleaseReasonValue::Overload,
                )));
                if let Err(err) = self.lce_send(
                    key,
                    &CC_RELEASE_COM,
                    &msg,
                    CcMessageType::ReleaseCom.into(),
                ) {
                    debug!("CC: overload reject failed: {err}");
                }
            }
            pd => debug!("{}: overloaded transaction dropped", pd.name()),
        }
    }

    /// Shuts down a data link: every open transaction's protocol gets its
    /// shutdown hook, then the link is destroyed.
    pub fn link_shutdown(&mut self, ipui: &Ipui) {
        let Some(link) = self.links.get(ipui) else {
            return;
        };
        let transactions = link.transactions.clone();
        for t in transactions {
            let key = TransactionKey {
                ipui: *ipui,
                pd: t.pd,
                tv: t.tv,
                role: t.role,
            };
            match t.pd {
                ProtocolDiscriminator::Cc => crate::cc::shutdown(self, &key),
                ProtocolDiscriminator::Mm => crate::mm::shutdown(self, &key),
                pd => debug!("{}: no shutdown handler", pd.name()),
            }
        }
        self.cancel_link_release(*ipui);
        self.links.remove(ipui);
    }
}
