//! Call Control integration tests: call setup, release, timers and the
//! transaction identifier space.

mod support;

use std::sync::Arc;

use opendect_common::{DectConfig, DectRole, MsgBuf};
use opendect_nwk::{CcState, Error, TransactionRole};
use opendect_sformat::ie::IeType;
use opendect_sformat::ies::{
    BasicServiceValue, CallClass, IeBasicService, IeDisplay, IeFixedIdentity, IeIwuToIwu,
    IePortableIdentity,
};
use opendect_sformat::msg::cc::{
    CC_ALERTING, CC_CONNECT, CC_CONNECT_ACK, CC_RELEASE_COM, CC_SETUP,
};
use opendect_sformat::{
    encode_ie, parse_message, CcMessageType, Ie, IeCollection, IeRef, ProtocolDiscriminator,
};

use support::{handle, inject, next_tx, test_ipui, Recorder, TestEvent};

use opendect_common::identities::Ari;

fn basic_speech() -> Ie {
    Ie::BasicService(IeBasicService {
        class: CallClass::Normal,
        service: BasicServiceValue::BasicSpeechDefault,
    })
}

fn pp_handle(recorder: &Recorder) -> opendect_nwk::DectHandle {
    handle(&DectConfig::new_pp(), recorder)
}

fn fp_handle(recorder: &Recorder) -> opendect_nwk::DectHandle {
    handle(&DectConfig::new_fp(Ari::new(0x1234, 0x7)), recorder)
}

/// Outgoing call from the portable part all the way to the active phase.
#[test]
fn test_outgoing_call_to_active() {
    let recorder = Recorder::default();
    let mut dh = pp_handle(&recorder);
    let ipui = test_ipui();

    let mut param = IeCollection::new();
    param.add(basic_speech());
    let call = dh.mncc_setup_req(ipui, &param).unwrap();
    assert_eq!(dh.call(call).unwrap().state(), CcState::CallPresent);

    // CC-SETUP reaches the wire with the identities filled in.
    let (tv, pd, f, ty, mut body) = next_tx(&mut dh, &ipui);
    assert_eq!(tv, 0);
    assert_eq!(pd, u8::from(ProtocolDiscriminator::Cc));
    assert_eq!(f, TransactionRole::PpInitiated as u8);
    assert_eq!(ty, u8::from(CcMessageType::Setup));
    let msg = parse_message(DectRole::Fp, &CC_SETUP, &mut body).unwrap();
    let pt_id = msg
        .get(IeType::PortableIdentity)
        .and_then(|ie| ie.as_portable_identity())
        .unwrap();
    assert_eq!(*pt_id, IePortableIdentity::Ipui(ipui));
    assert!(msg.contains(IeType::FixedIdentity));
    assert!(msg.contains(IeType::BasicService));

    // FP alerts.
    inject(
        &mut dh,
        DectRole::Fp,
        ipui,
        ProtocolDiscriminator::Cc,
        0,
        TransactionRole::PpInitiated,
        &CC_ALERTING,
        &IeCollection::new(),
        CcMessageType::Alerting.into(),
    );
    assert_eq!(dh.call(call).unwrap().state(), CcState::CallReceived);
    assert!(matches!(
        recorder.events().last(),
        Some(TestEvent::AlertInd(_))
    ));

    // FP answers; the portable awaits its connect acknowledgement.
    inject(
        &mut dh,
        DectRole::Fp,
        ipui,
        ProtocolDiscriminator::Cc,
        0,
        TransactionRole::PpInitiated,
        &CC_CONNECT,
        &IeCollection::new(),
        CcMessageType::Connect.into(),
    );
    assert_eq!(dh.call(call).unwrap().state(), CcState::ConnectPending);
    assert!(matches!(
        recorder.events().last(),
        Some(TestEvent::ConnectInd(_))
    ));

    // MNCC-CONNECT-res sends CC-CONNECT-ACK and enters the active phase.
    dh.mncc_connect_res(call, &IeCollection::new()).unwrap();
    let (_, _, _, ty, _) = next_tx(&mut dh, &ipui);
    assert_eq!(ty, u8::from(CcMessageType::ConnectAck));
    assert_eq!(dh.call(call).unwrap().state(), CcState::Active);
}

/// Setup timeout: exactly one MNCC-REJECT-ind, then the call is gone.
#[test]
fn test_setup_timer_expiry() {
    let recorder = Recorder::default();
    let mut dh = pp_handle(&recorder);
    let ipui = test_ipui();

    let mut param = IeCollection::new();
    param.add(basic_speech());
    let call = dh.mncc_setup_req(ipui, &param).unwrap();
    let timer = recorder.last_armed_timer().unwrap();

    dh.timer_process(timer);

    let rejects: Vec<_> = recorder
        .events()
        .into_iter()
        .filter(|e| matches!(e, TestEvent::RejectInd(_, _)))
        .collect();
    assert_eq!(rejects.len(), 1);
    assert!(matches!(rejects[0], TestEvent::RejectInd(_, false)));
    assert!(dh.call(call).is_none());
    assert_eq!(dh.open_calls(), 0);

    // A second (stale) expiry is ignored.
    dh.timer_process(timer);
    assert_eq!(
        recorder
            .events()
            .iter()
            .filter(|e| matches!(e, TestEvent::RejectInd(_, _)))
            .count(),
        1
    );
}

/// A response to the setup stops the timer; a later expiry is a no-op.
#[test]
fn test_setup_timer_cancelled_by_response() {
    let recorder = Recorder::default();
    let mut dh = pp_handle(&recorder);
    let ipui = test_ipui();

    let mut param = IeCollection::new();
    param.add(basic_speech());
    let call = dh.mncc_setup_req(ipui, &param).unwrap();
    let timer = recorder.last_armed_timer().unwrap();

    inject(
        &mut dh,
        DectRole::Fp,
        ipui,
        ProtocolDiscriminator::Cc,
        0,
        TransactionRole::PpInitiated,
        &CC_ALERTING,
        &IeCollection::new(),
        CcMessageType::Alerting.into(),
    );
    assert!(recorder.stopped_timers.borrow().contains(&timer));

    dh.timer_process(timer);
    assert!(recorder
        .events()
        .iter()
        .all(|e| !matches!(e, TestEvent::RejectInd(_, _))));
    assert!(dh.call(call).is_some());
}

/// Incoming call at the fixed part: setup indication, alerting, answer.
#[test]
fn test_incoming_call() {
    let recorder = Recorder::default();
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    let mut msg = IeCollection::new();
    msg.add(Ie::PortableIdentity(IePortableIdentity::Ipui(ipui)));
    msg.add(Ie::FixedIdentity(IeFixedIdentity::new_park(Ari::new(
        0x1234, 0x7,
    ))));
    msg.add(basic_speech());
    inject(
        &mut dh,
        DectRole::Pp,
        ipui,
        ProtocolDiscriminator::Cc,
        0,
        TransactionRole::PpInitiated,
        &CC_SETUP,
        &msg,
        CcMessageType::Setup.into(),
    );

    let events = recorder.events();
    let Some(TestEvent::SetupInd(call, param)) = events.last() else {
        panic!("no setup indication");
    };
    assert!(param.contains(IeType::BasicService));
    let call = *call;
    assert_eq!(dh.call(call).unwrap().state(), CcState::CallInitiated);
    assert_eq!(
        dh.call(call).unwrap().portable_identity(),
        Some(&IePortableIdentity::Ipui(ipui))
    );

    dh.mncc_alert_req(call, &IeCollection::new()).unwrap();
    let (tv, _, f, ty, _) = next_tx(&mut dh, &ipui);
    assert_eq!((tv, f), (0, TransactionRole::PpInitiated as u8));
    assert_eq!(ty, u8::from(CcMessageType::Alerting));
    assert_eq!(dh.call(call).unwrap().state(), CcState::CallReceived);

    dh.mncc_connect_res(call, &IeCollection::new()).unwrap();
    let (_, _, _, ty, _) = next_tx(&mut dh, &ipui);
    assert_eq!(ty, u8::from(CcMessageType::ConnectAck));
    assert_eq!(dh.call(call).unwrap().state(), CcState::Active);
}

/// Answering through MNCC-CONNECT-req awaits the peer's acknowledgement.
#[test]
fn test_connect_req_awaits_ack() {
    let recorder = Recorder::default();
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    let mut msg = IeCollection::new();
    msg.add(Ie::PortableIdentity(IePortableIdentity::Ipui(ipui)));
    msg.add(Ie::FixedIdentity(IeFixedIdentity::new_park(Ari::new(
        0x1234, 0x7,
    ))));
    msg.add(basic_speech());
    inject(
        &mut dh,
        DectRole::Pp,
        ipui,
        ProtocolDiscriminator::Cc,
        0,
        TransactionRole::PpInitiated,
        &CC_SETUP,
        &msg,
        CcMessageType::Setup.into(),
    );
    let Some(TestEvent::SetupInd(call, _)) = recorder.events().last().cloned() else {
        panic!("no setup indication");
    };

    dh.mncc_connect_req(call, &IeCollection::new()).unwrap();
    let (_, _, _, ty, _) = next_tx(&mut dh, &ipui);
    assert_eq!(ty, u8::from(CcMessageType::Connect));
    assert_eq!(dh.call(call).unwrap().state(), CcState::ConnectPending);

    inject(
        &mut dh,
        DectRole::Pp,
        ipui,
        ProtocolDiscriminator::Cc,
        0,
        TransactionRole::PpInitiated,
        &CC_CONNECT_ACK,
        &IeCollection::new(),
        CcMessageType::ConnectAck.into(),
    );
    assert_eq!(dh.call(call).unwrap().state(), CcState::Active);
    assert!(matches!(
        recorder.events().last(),
        Some(TestEvent::ConnectCfm(_))
    ));
}

/// CC-INFO with a corrupt optional keypad: the display is delivered, the
/// keypad is dropped.
#[test]
fn test_info_with_corrupt_optional_ie() {
    let recorder = Recorder::default();
    let mut dh = pp_handle(&recorder);
    let ipui = test_ipui();

    let mut param = IeCollection::new();
    param.add(basic_speech());
    let call = dh.mncc_setup_req(ipui, &param).unwrap();
    next_tx(&mut dh, &ipui);

    // Hand-framed CC-INFO: a valid display, then a keypad whose contents
    // exceed the information field.
    let mut mb = MsgBuf::new();
    mb.append(&[
        u8::from(ProtocolDiscriminator::Cc),
        0x80 | u8::from(CcMessageType::Info),
    ])
    .unwrap();
    encode_ie(
        IeType::SingleDisplay,
        &Ie::Display(IeDisplay::new(b"CALL".to_vec())),
        &mut mb,
    )
    .unwrap();
    let overlong = vec![b'1'; 70];
    mb.append(&[IeType::MultiKeypad.wire_id(), overlong.len() as u8])
        .unwrap();
    mb.append(&overlong).unwrap();
    dh.lce_rcv(ipui, mb);

    let events = recorder.events();
    let Some(TestEvent::InfoInd(info_call, param)) = events.last() else {
        panic!("no info indication");
    };
    assert_eq!(*info_call, call);
    assert_eq!(
        param
            .get(IeType::SingleDisplay)
            .and_then(|ie| ie.as_display())
            .map(|d| d.info.as_slice()),
        Some(&b"CALL"[..])
    );
    assert!(!param.contains(IeType::SingleKeypad));
}

/// CC-SETUP without the mandatory portable identity creates no call.
#[test]
fn test_setup_missing_mandatory_ie() {
    let recorder = Recorder::default();
    let mut dh = fp_handle(&recorder);
    let ipui = test_ipui();

    let mut mb = MsgBuf::new();
    mb.append(&[
        u8::from(ProtocolDiscriminator::Cc),
        0x80 | u8::from(CcMessageType::Setup),
    ])
    .unwrap();
    encode_ie(
        IeType::FixedIdentity,
        &Ie::FixedIdentity(IeFixedIdentity::new_park(Ari::new(0x1234, 0x7))),
        &mut mb,
    )
    .unwrap();
    encode_ie(IeType::BasicService, &basic_speech(), &mut mb).unwrap();
    dh.lce_rcv(ipui, mb);

    assert!(recorder.events().is_empty());
    assert_eq!(dh.open_calls(), 0);
}

/// Two IWU-TO-IWU elements serialize behind a repeat indicator and parse
/// back into a two-element list in insertion order.
#[test]
fn test_setup_repeat_list_round_trip() {
    let recorder = Recorder::default();
    let mut dh = pp_handle(&recorder);
    let ipui = test_ipui();

    let mut param = IeCollection::new();
    param.add(basic_speech());
    param.add(Ie::IwuToIwu(IeIwuToIwu::new(0, b"first".to_vec())));
    param.add(Ie::IwuToIwu(IeIwuToIwu::new(0, b"second".to_vec())));
    dh.mncc_setup_req(ipui, &param).unwrap();

    let (_, _, _, _, mut body) = next_tx(&mut dh, &ipui);
    let wire = body.slice().to_vec();
    let iwu_pos = wire
        .iter()
        .position(|&b| b == IeType::IwuToIwu.wire_id())
        .unwrap();
    assert_eq!(wire[iwu_pos - 1], 0xd1);

    let msg = parse_message(DectRole::Fp, &CC_SETUP, &mut body).unwrap();
    let list = msg.list(IeType::IwuToIwu);
    assert_eq!(list.len(), 2);
    assert_eq!(
        *list[0],
        Ie::IwuToIwu(IeIwuToIwu::new(0, b"first".to_vec()))
    );
    assert_eq!(
        *list[1],
        Ie::IwuToIwu(IeIwuToIwu::new(0, b"second".to_vec()))
    );
}

/// Transaction values stay unique until the CC limit, then allocation
/// fails with overload.
#[test]
fn test_transaction_values_unique_until_overload() {
    let recorder = Recorder::default();
    let mut dh = pp_handle(&recorder);
    let ipui = test_ipui();

    let mut param = IeCollection::new();
    param.add(basic_speech());

    let mut tvs = Vec::new();
    for _ in 0..7 {
        dh.mncc_setup_req(ipui, &param).unwrap();
        let (tv, _, _, _, _) = next_tx(&mut dh, &ipui);
        tvs.push(tv);
    }
    let mut unique = tvs.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), 7);

    match dh.mncc_setup_req(ipui, &param) {
        Err(Error::Overload) => {}
        other => panic!("expected overload, got {other:?}"),
    }
}

/// Peer release: MNCC-RELEASE-req, CC-RELEASE-COM back, then the idle
/// link lingers and is released by its timer.
#[test]
fn test_release_and_link_linger() {
    let recorder = Recorder::default();
    let mut dh = pp_handle(&recorder);
    let ipui = test_ipui();

    let mut param = IeCollection::new();
    param.add(basic_speech());
    let call = dh.mncc_setup_req(ipui, &param).unwrap();
    next_tx(&mut dh, &ipui);

    dh.mncc_release_req(call, &IeCollection::new()).unwrap();
    assert_eq!(dh.call(call).unwrap().state(), CcState::ReleasePending);
    let (_, _, _, ty, _) = next_tx(&mut dh, &ipui);
    assert_eq!(ty, u8::from(CcMessageType::Release));

    inject(
        &mut dh,
        DectRole::Fp,
        ipui,
        ProtocolDiscriminator::Cc,
        0,
        TransactionRole::PpInitiated,
        &CC_RELEASE_COM,
        &IeCollection::new(),
        CcMessageType::ReleaseCom.into(),
    );
    assert!(matches!(
        recorder.events().last(),
        Some(TestEvent::ReleaseCfm(_))
    ));
    assert!(dh.call(call).is_none());

    // The link lingers on a grace timer, then goes away.
    let linger = recorder.last_armed_timer().unwrap();
    assert!(dh.link(&ipui).is_some());
    dh.timer_process(linger);
    assert!(dh.link(&ipui).is_none());
}

/// Held IE references are released exactly once: the reference count
/// returns to its baseline after the collections are gone.
#[test]
fn test_ie_reference_counting() {
    let recorder = Recorder::default();
    let mut dh = pp_handle(&recorder);
    let ipui = test_ipui();

    let iwu: IeRef = Arc::new(Ie::IwuToIwu(IeIwuToIwu::new(0, b"x".to_vec())));
    let mut param = IeCollection::new();
    param.add(basic_speech());
    param.add_ref(iwu.clone());
    assert_eq!(Arc::strong_count(&iwu), 2);

    let call = dh.mncc_setup_req(ipui, &param).unwrap();
    // The transient build collection has been dropped again.
    assert_eq!(Arc::strong_count(&iwu), 2);

    drop(param);
    assert_eq!(Arc::strong_count(&iwu), 1);

    dh.mncc_reject_req(call, &IeCollection::new()).unwrap();
    assert_eq!(Arc::strong_count(&iwu), 1);
}
