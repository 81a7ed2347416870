//! Mobility Management integration tests: locate, access rights,
//! temporary identity assignment and authentication exchanges.

mod support;

use opendect_common::{DectConfig, DectRole};
use opendect_nwk::{Error, TransactionRole};
use opendect_sformat::ie::IeType;
use opendect_sformat::ies::{
    auth, IeAuthRes, IeAuthType, IeAuthValue, IePortableIdentity, IeRejectReason,
    IeTerminalCapability, RejectReasonValue,
};
use opendect_sformat::msg::mm::{
    MM_ACCESS_RIGHTS_ACCEPT, MM_ACCESS_RIGHTS_REQUEST, MM_AUTHENTICATION_REPLY,
    MM_LOCATE_ACCEPT, MM_LOCATE_REJECT, MM_LOCATE_REQUEST, MM_TEMPORARY_IDENTITY_ASSIGN_ACK,
    MM_TEMPORARY_IDENTITY_ASSIGN_REJ,
};
use opendect_sformat::{parse_message, Ie, IeCollection, MmMessageType, ProtocolDiscriminator};

use support::{handle, inject, next_tx, test_ipui, Recorder, TestEvent};

use opendect_common::identities::Ari;

fn fp_handle(recorder: &Recorder) -> opendect_nwk::DectHandle {
    handle(&DectConfig::new_fp(Ari::new(0x1234, 0x7)), recorder)
}

fn pp_handle(recorder: &Recorder) -> opendect_nwk::DectHandle {
    handle(&DectConfig::new_pp(), recorder)
}

fn locate_request() -> IeCollection {
    let mut msg = IeCollection::new();
    msg.add(Ie::PortableIdentity(IePortableIdentity::Ipui(test_ipui())));
    msg
}

/// Locate accept: the response carries PORTABLE-IDENTITY and
/// LOCATION-AREA exactly once each, then the transaction closes.
#[test]
fn test_locate_accept() {
    let recorder = Recorder {
        locate_reply: Some(true),
        ..Recorder::default()
    };
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    inject(
        &mut dh,
        DectRole::Pp,
        ipui,
        ProtocolDiscriminator::Mm,
        0,
        TransactionRole::PpInitiated,
        &MM_LOCATE_REQUEST,
        &locate_request(),
        MmMessageType::LocateRequest.into(),
    );
    assert!(matches!(
        recorder.events().first(),
        Some(TestEvent::LocateInd(_, _))
    ));

    let (tv, pd, _, ty, mut body) = next_tx(&mut dh, &ipui);
    assert_eq!((tv, pd), (0, u8::from(ProtocolDiscriminator::Mm)));
    assert_eq!(ty, u8::from(MmMessageType::LocateAccept));
    let msg = parse_message(DectRole::Pp, &MM_LOCATE_ACCEPT, &mut body).unwrap();
    assert_eq!(msg.list(IeType::PortableIdentity).len(), 1);
    assert_eq!(msg.list(IeType::LocationArea).len(), 1);

    // The one-shot transaction is gone.
    assert_eq!(dh.link(&ipui).unwrap().open_transactions(), 0);
}

/// Locate reject: a reject reason in the response selects LOCATE-REJECT.
#[test]
fn test_locate_reject() {
    let recorder = Recorder {
        locate_reply: Some(false),
        ..Recorder::default()
    };
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    inject(
        &mut dh,
        DectRole::Pp,
        ipui,
        ProtocolDiscriminator::Mm,
        0,
        TransactionRole::PpInitiated,
        &MM_LOCATE_REQUEST,
        &locate_request(),
        MmMessageType::LocateRequest.into(),
    );

    let (_, _, _, ty, mut body) = next_tx(&mut dh, &ipui);
    assert_eq!(ty, u8::from(MmMessageType::LocateReject));
    let msg = parse_message(DectRole::Pp, &MM_LOCATE_REJECT, &mut body).unwrap();
    assert!(msg.contains(IeType::RejectReason));
}

/// A locate request without its mandatory portable identity is dropped
/// without an indication.
#[test]
fn test_locate_missing_identity_dropped() {
    let recorder = Recorder {
        locate_reply: Some(true),
        ..Recorder::default()
    };
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    // Hand-framed: the terminal capability alone, no portable identity.
    let mut mb = opendect_common::MsgBuf::new();
    mb.append(&[
        u8::from(ProtocolDiscriminator::Mm),
        0x80 | u8::from(MmMessageType::LocateRequest),
    ])
    .unwrap();
    opendect_sformat::encode_ie(
        IeType::TerminalCapability,
        &Ie::TerminalCapability(IeTerminalCapability::default()),
        &mut mb,
    )
    .unwrap();
    dh.lce_rcv(ipui, mb);

    assert!(recorder.events().is_empty());
    assert!(dh.dequeue_tx(&ipui).is_none());
}

/// Access rights accept defaults the fixed identity to the PARK of the
/// handle's PARI when the application omits it.
#[test]
fn test_access_rights_accept_defaults_park() {
    let recorder = Recorder::default();
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    inject(
        &mut dh,
        DectRole::Pp,
        ipui,
        ProtocolDiscriminator::Mm,
        0,
        TransactionRole::PpInitiated,
        &MM_ACCESS_RIGHTS_REQUEST,
        &locate_request(),
        MmMessageType::AccessRightsRequest.into(),
    );
    let events = recorder.events();
    let Some(TestEvent::AccessRightsInd(mmta, param)) = events.last() else {
        panic!("no access rights indication");
    };
    assert!(param.contains(IeType::PortableIdentity));

    // Accept with the portable identity only.
    let mut res = IeCollection::new();
    if let Some(pt_id) = param.get(IeType::PortableIdentity) {
        res.add_ref(pt_id.clone());
    }
    dh.mm_access_rights_res(*mmta, true, &res).unwrap();

    let (_, _, _, ty, mut body) = next_tx(&mut dh, &ipui);
    assert_eq!(ty, u8::from(MmMessageType::AccessRightsAccept));
    let msg = parse_message(DectRole::Pp, &MM_ACCESS_RIGHTS_ACCEPT, &mut body).unwrap();
    let park = msg
        .get(IeType::FixedIdentity)
        .and_then(|ie| ie.as_fixed_identity())
        .unwrap();
    assert_eq!(park.ari, Ari::new(0x1234, 0x7));
    assert_eq!(dh.link(&ipui).unwrap().open_transactions(), 0);
}

/// Temporary identity assignment: the portable acknowledges, the fixed
/// part gets a positive confirmation.
#[test]
fn test_identity_assign_ack() {
    let recorder = Recorder::default();
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    let mmta = dh
        .mm_identity_assign_req(ipui, &IeCollection::new())
        .unwrap();
    let (_, _, f, ty, _) = next_tx(&mut dh, &ipui);
    assert_eq!(f, TransactionRole::FpInitiated as u8);
    assert_eq!(ty, u8::from(MmMessageType::TemporaryIdentityAssign));

    inject(
        &mut dh,
        DectRole::Pp,
        ipui,
        ProtocolDiscriminator::Mm,
        0,
        TransactionRole::FpInitiated,
        &MM_TEMPORARY_IDENTITY_ASSIGN_ACK,
        &IeCollection::new(),
        MmMessageType::TemporaryIdentityAssignAck.into(),
    );
    assert!(matches!(
        recorder.events().last(),
        Some(TestEvent::IdentityAssignCfm(id, true, _)) if *id == mmta
    ));
    assert!(dh.mm_transaction(mmta).is_none());
}

/// Temporary identity assignment rejected: the confirmation carries the
/// reject reason.
#[test]
fn test_identity_assign_rej() {
    let recorder = Recorder::default();
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    let mmta = dh
        .mm_identity_assign_req(ipui, &IeCollection::new())
        .unwrap();
    next_tx(&mut dh, &ipui);

    let mut msg = IeCollection::new();
    msg.add(Ie::RejectReason(IeRejectReason::new(
        RejectReasonValue::InsufficientMemory,
    )));
    inject(
        &mut dh,
        DectRole::Pp,
        ipui,
        ProtocolDiscriminator::Mm,
        0,
        TransactionRole::FpInitiated,
        &MM_TEMPORARY_IDENTITY_ASSIGN_REJ,
        &msg,
        MmMessageType::TemporaryIdentityAssignRej.into(),
    );

    let events = recorder.events();
    let Some(TestEvent::IdentityAssignCfm(id, false, param)) = events.last() else {
        panic!("no negative confirmation");
    };
    assert_eq!(*id, mmta);
    assert_eq!(
        param
            .get(IeType::RejectReason)
            .and_then(|ie| ie.as_reject_reason())
            .map(|r| r.reason),
        Some(RejectReasonValue::InsufficientMemory)
    );
}

/// The portable side of an assignment answers through
/// MM-IDENTITY-ASSIGN-res.
#[test]
fn test_identity_assign_portable_side() {
    let recorder = Recorder::default();
    let mut dh = pp_handle(&recorder);
    let ipui = test_ipui();

    inject(
        &mut dh,
        DectRole::Fp,
        ipui,
        ProtocolDiscriminator::Mm,
        0,
        TransactionRole::FpInitiated,
        &opendect_sformat::msg::mm::MM_TEMPORARY_IDENTITY_ASSIGN,
        &IeCollection::new(),
        MmMessageType::TemporaryIdentityAssign.into(),
    );
    let events = recorder.events();
    let Some(TestEvent::IdentityAssignInd(mmta)) = events.last() else {
        panic!("no assignment indication");
    };

    dh.mm_identity_assign_res(*mmta, true, &IeCollection::new())
        .unwrap();
    let (_, _, _, ty, _) = next_tx(&mut dh, &ipui);
    assert_eq!(ty, u8::from(MmMessageType::TemporaryIdentityAssignAck));
}

/// Authentication round trip: request out, reply in, positive
/// confirmation with the RES value.
#[test]
fn test_authentication_exchange() {
    let recorder = Recorder::default();
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    let mut req = IeCollection::new();
    req.add(Ie::AuthType(IeAuthType {
        auth_id: auth::AUTH_DSAA,
        auth_key_type: auth::KEY_USER_AUTHENTICATION_KEY,
        auth_key_num: 0x8,
        ..Default::default()
    }));
    req.add(Ie::Rand(IeAuthValue::new(0x0123_4567_89ab_cdef)));
    let mmta = dh.mm_authenticate_req(ipui, &req).unwrap();

    let (_, _, _, ty, _) = next_tx(&mut dh, &ipui);
    assert_eq!(ty, u8::from(MmMessageType::AuthenticationRequest));

    let mut reply = IeCollection::new();
    reply.add(Ie::Res(IeAuthRes::new(0xcafe_f00d)));
    inject(
        &mut dh,
        DectRole::Pp,
        ipui,
        ProtocolDiscriminator::Mm,
        0,
        TransactionRole::FpInitiated,
        &MM_AUTHENTICATION_REPLY,
        &reply,
        MmMessageType::AuthenticationReply.into(),
    );
    assert!(matches!(
        recorder.events().last(),
        Some(TestEvent::AuthenticateCfm(id, true)) if *id == mmta
    ));
    assert!(dh.mm_transaction(mmta).is_none());
}

/// The portable receives an authentication request as a new transaction.
#[test]
fn test_authentication_indication() {
    let recorder = Recorder::default();
    let mut dh = pp_handle(&recorder);
    let ipui = test_ipui();

    let mut req = IeCollection::new();
    req.add(Ie::AuthType(IeAuthType {
        auth_id: auth::AUTH_DSAA,
        auth_key_type: auth::KEY_USER_AUTHENTICATION_KEY,
        auth_key_num: 0x8,
        ..Default::default()
    }));
    req.add(Ie::Rand(IeAuthValue::new(42)));
    inject(
        &mut dh,
        DectRole::Fp,
        ipui,
        ProtocolDiscriminator::Mm,
        0,
        TransactionRole::FpInitiated,
        &opendect_sformat::msg::mm::MM_AUTHENTICATION_REQUEST,
        &req,
        MmMessageType::AuthenticationRequest.into(),
    );

    let events = recorder.events();
    let Some(TestEvent::AuthenticateInd(mmta, param)) = events.last() else {
        panic!("no authentication indication");
    };
    assert!(param.contains(IeType::Rand));

    let mut res = IeCollection::new();
    res.add(Ie::Res(IeAuthRes::new(7)));
    dh.mm_authenticate_res(*mmta, true, &res).unwrap();
    let (_, _, _, ty, _) = next_tx(&mut dh, &ipui);
    assert_eq!(ty, u8::from(MmMessageType::AuthenticationReply));
}

/// MM allows a single concurrent transaction per link and direction.
#[test]
fn test_mm_transaction_limit() {
    let recorder = Recorder::default();
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    let first = dh.mm_identity_assign_req(ipui, &IeCollection::new());
    assert!(first.is_ok());

    match dh.mm_identity_assign_req(ipui, &IeCollection::new()) {
        Err(Error::Overload) => {}
        other => panic!("expected overload, got {other:?}"),
    }
}
