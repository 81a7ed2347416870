//! Mobility Management entity
//!
//! MM exchanges are one-shot request/response transactions without state
//! beyond the transaction itself: LOCATE, ACCESS-RIGHTS,
//! TEMPORARY-IDENTITY-ASSIGN, AUTHENTICATION and KEY-ALLOCATE. At most one
//! MM transaction runs per data link and direction.
//!
//! Authentication values are carried, never computed; key derivation is
//! the application's concern.

use opendect_common::{Ipui, MsgBuf};
use opendect_sformat::ies::IeFixedIdentity;
use opendect_sformat::msg::mm::{
    MM_ACCESS_RIGHTS_ACCEPT, MM_ACCESS_RIGHTS_REJECT, MM_ACCESS_RIGHTS_REQUEST,
    MM_AUTHENTICATION_REJECT, MM_AUTHENTICATION_REPLY, MM_AUTHENTICATION_REQUEST,
    MM_KEY_ALLOCATE, MM_LOCATE_ACCEPT, MM_LOCATE_REJECT, MM_LOCATE_REQUEST,
    MM_TEMPORARY_IDENTITY_ASSIGN, MM_TEMPORARY_IDENTITY_ASSIGN_ACK,
    MM_TEMPORARY_IDENTITY_ASSIGN_REJ,
};
use opendect_sformat::{
    parse_message, Ie, IeCollection, IeType, MmMessageType, MsgDescriptor,
    ProtocolDiscriminator,
};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::handle::DectHandle;
use crate::transaction::{LinkRelease, TransactionKey};

/// Opaque MM transaction reference handed to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MmTransactionId(pub(crate) TransactionKey);

/// An open MM transaction. MM keeps no state beyond it.
#[derive(Debug)]
pub struct MmTransaction {
    pub(crate) key: TransactionKey,
}

impl MmTransaction {
    /// The reference the application uses in response primitives.
    pub fn id(&self) -> MmTransactionId {
        MmTransactionId(self.key)
    }
}

impl DectHandle {
    /// The MM transaction for the given reference, if it is still open.
    pub fn mm_transaction(&self, mmta: MmTransactionId) -> Option<&MmTransaction> {
        self.mm_transactions.get(&mmta.0)
    }

    fn mm_open_transaction(&mut self, ipui: Ipui) -> Result<MmTransactionId> {
        let key = self.open_transaction(ipui, ProtocolDiscriminator::Mm)?;
        self.mm_transactions.insert(key, MmTransaction { key });
        Ok(MmTransactionId(key))
    }

    fn mm_send(
        &mut self,
        mmta: MmTransactionId,
        desc: &MsgDescriptor,
        msg: &IeCollection,
        ty: MmMessageType,
    ) -> Result<()> {
        if !self.mm_transactions.contains_key(&mmta.0) {
            return Err(Error::UnknownTransaction);
        }
        self.lce_send(&mmta.0, desc, msg, ty.into())
    }

    fn mm_close(&mut self, mmta: MmTransactionId, release: LinkRelease) {
        self.close_transaction(&mmta.0, release);
        self.mm_transactions.remove(&mmta.0);
    }

    /// MM-ACCESS-RIGHTS-req: requests access rights from the fixed part
    /// (portable side).
    pub fn mm_access_rights_req(
        &mut self,
        ipui: Ipui,
        param: &IeCollection,
    ) -> Result<MmTransactionId> {
        trace!("MM: ACCESS-RIGHTS-req");
        let mmta = self.mm_open_transaction(ipui)?;
        if let Err(err) = self.mm_send(
            mmta,
            &MM_ACCESS_RIGHTS_REQUEST,
            param,
            MmMessageType::AccessRightsRequest,
        ) {
            self.mm_close(mmta, LinkRelease::Partial);
            return Err(err);
        }
        Ok(mmta)
    }

    /// MM-ACCESS-RIGHTS-res: accepts or rejects a portable's access rights
    /// request (fixed side).
    ///
    /// An accept without a <<FIXED-IDENTITY>> in `param` carries the PARK
    /// of the handle's PARI.
    pub fn mm_access_rights_res(
        &mut self,
        mmta: MmTransactionId,
        accept: bool,
        param: &IeCollection,
    ) -> Result<()> {
        trace!("MM: ACCESS-RIGHTS-res accept={accept}");
        let result = if accept {
            let mut msg = param.clone();
            if !msg.contains(IeType::FixedIdentity) {
                msg.add(Ie::FixedIdentity(IeFixedIdentity::new_park(self.pari)));
            }
            self.mm_send(
                mmta,
                &MM_ACCESS_RIGHTS_ACCEPT,
                &msg,
                MmMessageType::AccessRightsAccept,
            )
        } else {
            self.mm_send(
                mmta,
                &MM_ACCESS_RIGHTS_REJECT,
                param,
                MmMessageType::AccessRightsReject,
            )
        };
        self.mm_close(mmta, LinkRelease::Partial);
        result
    }

    /// MM-LOCATE-req: requests a location update (portable side).
    pub fn mm_locate_req(&mut self, ipui: Ipui, param: &IeCollection) -> Result<MmTransactionId> {
        trace!("MM: LOCATE-req");
        let mmta = self.mm_open_transaction(ipui)?;
        if let Err(err) = self.mm_send(
            mmta,
            &MM_LOCATE_REQUEST,
            param,
            MmMessageType::LocateRequest,
        ) {
            self.mm_close(mmta, LinkRelease::Partial);
            return Err(err);
        }
        Ok(mmta)
    }

    /// MM-LOCATE-res: answers a location update request (fixed side).
    ///
    /// A `param` carrying a <<REJECT-REASON>> produces a LOCATE-REJECT,
    /// anything else a LOCATE-ACCEPT. The transaction closes either way.
    pub fn mm_locate_res(&mut self, mmta: MmTransactionId, param: &IeCollection) -> Result<()> {
        trace!("MM: LOCATE-res");
        let result = if param.contains(IeType::RejectReason) {
            self.mm_send(mmta, &MM_LOCATE_REJECT, param, MmMessageType::LocateReject)
        } else {
            self.mm_send(mmta, &MM_LOCATE_ACCEPT, param, MmMessageType::LocateAccept)
        };
        self.mm_close(mmta, LinkRelease::Partial);
        result
    }

    /// MM-IDENTITY-ASSIGN-req: assigns a temporary identity to a portable
    /// (fixed side).
    pub fn mm_identity_assign_req(
        &mut self,
        ipui: Ipui,
        param: &IeCollection,
    ) -> Result<MmTransactionId> {
        trace!("MM: IDENTITY-ASSIGN-req");
        let mmta = self.mm_open_transaction(ipui)?;
        if let Err(err) = self.mm_send(
            mmta,
            &MM_TEMPORARY_IDENTITY_ASSIGN,
            param,
            MmMessageType::TemporaryIdentityAssign,
        ) {
            self.mm_close(mmta, LinkRelease::Partial);
            return Err(err);
        }
        Ok(mmta)
    }

    /// MM-IDENTITY-ASSIGN-res: acknowledges or rejects a temporary
    /// identity assignment (portable side).
    pub fn mm_identity_assign_res(
        &mut self,
        mmta: MmTransactionId,
        accept: bool,
        param: &IeCollection,
    ) -> Result<()> {
        trace!("MM: IDENTITY-ASSIGN-res accept={accept}");
        let result = if accept {
            self.mm_send(
                mmta,
                &MM_TEMPORARY_IDENTITY_ASSIGN_ACK,
                param,
                MmMessageType::TemporaryIdentityAssignAck,
            )
        } else {
            self.mm_send(
                mmta,
                &MM_TEMPORARY_IDENTITY_ASSIGN_REJ,
                param,
                MmMessageType::TemporaryIdentityAssignRej,
            )
        };
        self.mm_close(mmta, LinkRelease::Partial);
        result
    }

    /// MM-AUTHENTICATE-req: starts an authentication exchange.
    pub fn mm_authenticate_req(
        &mut self,
        ipui: Ipui,
        param: &IeCollection,
    ) -> Result<MmTransactionId> {
        trace!("MM: AUTHENTICATE-req");
        let mmta = self.mm_open_transaction(ipui)?;
        if let Err(err) = self.mm_send(
            mmta,
            &MM_AUTHENTICATION_REQUEST,
            param,
            MmMessageType::AuthenticationRequest,
        ) {
            self.mm_close(mmta, LinkRelease::Partial);
            return Err(err);
        }
        Ok(mmta)
    }

    /// MM-AUTHENTICATE-res: answers an authentication request with a
    /// reply (accept, carrying <<RES>>) or a reject.
    pub fn mm_authenticate_res(
        &mut self,
        mmta: MmTransactionId,
        accept: bool,
        param: &IeCollection,
    ) -> Result<()> {
        trace!("MM: AUTHENTICATE-res accept={accept}");
        let result = if accept {
            self.mm_send(
                mmta,
                &MM_AUTHENTICATION_REPLY,
                param,
                MmMessageType::AuthenticationReply,
            )
        } else {
            self.mm_send(
                mmta,
                &MM_AUTHENTICATION_REJECT,
                param,
                MmMessageType::AuthenticationReject,
            )
        };
        self.mm_close(mmta, LinkRelease::Partial);
        result
    }

    /// MM-KEY-ALLOCATE-req: starts a key allocation (fixed side).
    pub fn mm_key_allocate_req(
        &mut self,
        ipui: Ipui,
        param: &IeCollection,
    ) -> Result<MmTransactionId> {
        trace!("MM: KEY-ALLOCATE-req");
        let mmta = self.mm_open_transaction(ipui)?;
        if let Err(err) = self.mm_send(
            mmta,
            &MM_KEY_ALLOCATE,
            param,
            MmMessageType::KeyAllocate,
        ) {
            self.mm_close(mmta, LinkRelease::Partial);
            return Err(err);
        }
        Ok(mmta)
    }
}

fn parse(dh: &DectHandle, desc: &MsgDescriptor, mb: &mut MsgBuf) -> Option<IeCollection> {
    match parse_message(dh.role(), desc, mb) {
        Ok(msg) => Some(msg),
        Err(err) => {
            debug!("MM: {}: {err}", desc.name);
            None
        }
    }
}

/// Receive path for open MM transactions.
pub(crate) fn rcv(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let Ok(ty) = MmMessageType::try_from(mb.msg_type) else {
        debug!("MM: unknown message type {:#04x}", mb.msg_type);
        return;
    };
    trace!("MM: receive {ty:?}");
    let mmta = MmTransactionId(*key);
    let ops = dh.ops.clone();

    match ty {
        MmMessageType::LocateAccept => {
            debug!("MM: LOCATE-ACCEPT");
            let _ = parse(dh, &MM_LOCATE_ACCEPT, &mut mb);
            dh.mm_close(mmta, LinkRelease::Partial);
        }
        MmMessageType::LocateReject => {
            debug!("MM: LOCATE-REJECT");
            let _ = parse(dh, &MM_LOCATE_REJECT, &mut mb);
            dh.mm_close(mmta, LinkRelease::Partial);
        }
        MmMessageType::AccessRightsAccept => {
            debug!("MM: ACCESS-RIGHTS-ACCEPT");
            let _ = parse(dh, &MM_ACCESS_RIGHTS_ACCEPT, &mut mb);
            dh.mm_close(mmta, LinkRelease::Partial);
        }
        MmMessageType::AccessRightsReject => {
            debug!("MM: ACCESS-RIGHTS-REJECT");
            let _ = parse(dh, &MM_ACCESS_RIGHTS_REJECT, &mut mb);
            dh.mm_close(mmta, LinkRelease::Partial);
        }
        MmMessageType::TemporaryIdentityAssignAck => {
            debug!("MM: TEMPORARY-IDENTITY-ASSIGN-ACK");
            let Some(msg) = parse(dh, &MM_TEMPORARY_IDENTITY_ASSIGN_ACK, &mut mb) else {
                return;
            };
            ops.mm_ops.mm_identity_assign_cfm(dh, mmta, true, &msg);
            dh.mm_close(mmta, LinkRelease::Partial);
        }
        MmMessageType::TemporaryIdentityAssignRej => {
            debug!("MM: TEMPORARY-IDENTITY-ASSIGN-REJ");
            let Some(msg) = parse(dh, &MM_TEMPORARY_IDENTITY_ASSIGN_REJ, &mut mb) else {
                return;
            };
            ops.mm_ops.mm_identity_assign_cfm(dh, mmta, false, &msg);
            dh.mm_close(mmta, LinkRelease::Partial);
        }
        MmMessageType::AuthenticationReply => {
            debug!("MM: AUTHENTICATION-REPLY");
            let Some(msg) = parse(dh, &MM_AUTHENTICATION_REPLY, &mut mb) else {
                return;
            };
            ops.mm_ops.mm_authenticate_cfm(dh, mmta, true, &msg);
            dh.mm_close(mmta, LinkRelease::Partial);
        }
        MmMessageType::AuthenticationReject => {
            debug!("MM: AUTHENTICATION-REJECT");
            let Some(msg) = parse(dh, &MM_AUTHENTICATION_REJECT, &mut mb) else {
                return;
            };
            ops.mm_ops.mm_authenticate_cfm(dh, mmta, false, &msg);
            dh.mm_close(mmta, LinkRelease::Partial);
        }
        _ => debug!("MM: unhandled message type {ty:?}"),
    }
}

/// Open path for messages without a matching MM transaction.
pub(crate) fn open(dh: &mut DectHandle, key: &TransactionKey, mut mb: MsgBuf) {
    let Ok(ty) = MmMessageType::try_from(mb.msg_type) else {
        debug!("MM: unknown message type {:#04x}", mb.msg_type);
        return;
    };
    let mmta = MmTransactionId(*key);
    let ops = dh.ops.clone();

    match ty {
        MmMessageType::AccessRightsRequest => {
            debug!("MM: ACCESS-RIGHTS-REQUEST");
            let Some(msg) = parse(dh, &MM_ACCESS_RIGHTS_REQUEST, &mut mb) else {
                return;
            };
            dh.confirm_transaction(key);
            dh.mm_transactions.insert(*key, MmTransaction { key: *key });
            ops.mm_ops.mm_access_rights_ind(dh, mmta, &msg);
        }
        MmMessageType::LocateRequest => {
            debug!("MM: LOCATE-REQUEST");
            let Some(msg) = parse(dh, &MM_LOCATE_REQUEST, &mut mb) else {
                return;
            };
            dh.confirm_transaction(key);
            dh.mm_transactions.insert(*key, MmTransaction { key: *key });
            ops.mm_ops.mm_locate_ind(dh, mmta, &msg);
        }
        MmMessageType::TemporaryIdentityAssign => {
            debug!("MM: TEMPORARY-IDENTITY-ASSIGN");
            let Some(msg) = parse(dh, &MM_TEMPORARY_IDENTITY_ASSIGN, &mut mb) else {
                return;
            };
            dh.confirm_transaction(key);
            dh.mm_transactions.insert(*key, MmTransaction { key: *key });
            ops.mm_ops.mm_identity_assign_ind(dh, mmta, &msg);
        }
        MmMessageType::AuthenticationRequest => {
            debug!("MM: AUTHENTICATION-REQUEST");
            let Some(msg) = parse(dh, &MM_AUTHENTICATION_REQUEST, &mut mb) else {
                return;
            };
            dh.confirm_transaction(key);
            dh.mm_transactions.insert(*key, MmTransaction { key: *key });
            ops.mm_ops.mm_authenticate_ind(dh, mmta, &msg);
        }
        MmMessageType::KeyAllocate => {
            debug!("MM: KEY-ALLOCATE");
            let Some(msg) = parse(dh, &MM_KEY_ALLOCATE, &mut mb) else {
                return;
            };
            dh.confirm_transaction(key);
            dh.mm_transactions.insert(*key, MmTransaction { key: *key });
            ops.mm_ops.mm_key_allocate_ind(dh, mmta, &msg);
        }
        _ => debug!("MM: {ty:?} for unknown transaction, dropped"),
    }
}

/// Link shutdown: MM transactions close without notification.
pub(crate) fn shutdown(dh: &mut DectHandle, key: &TransactionKey) {
    debug!("MM: shutdown");
    dh.mm_close(MmTransactionId(*key), LinkRelease::Normal);
}
