//! Transaction layer integration tests: routing, rejection and link
//! lifecycle.

mod support;

use opendect_common::{DectConfig, DectRole, MsgBuf};
use opendect_nwk::TransactionRole;
use opendect_sformat::ie::IeType;
use opendect_sformat::ies::{
    BasicServiceValue, CallClass, IeBasicService, IeFixedIdentity, IePortableIdentity,
    ReleaseReasonValue,
};
use opendect_sformat::msg::cc::{CC_RELEASE_COM, CC_SETUP};
use opendect_sformat::{parse_message, CcMessageType, Ie, IeCollection, ProtocolDiscriminator};

use support::{handle, inject, next_tx, test_ipui, Recorder, TestEvent};

use opendect_common::identities::Ari;

fn setup_msg() -> IeCollection {
    let mut msg = IeCollection::new();
    msg.add(Ie::PortableIdentity(IePortableIdentity::Ipui(test_ipui())));
    msg.add(Ie::FixedIdentity(IeFixedIdentity::new_park(Ari::new(
        0x1234, 0x7,
    ))));
    msg.add(Ie::BasicService(IeBasicService {
        class: CallClass::Normal,
        service: BasicServiceValue::BasicSpeechDefault,
    }));
    msg
}

/// Runt and unparseable link headers are dropped without effect.
#[test]
fn test_malformed_link_headers_dropped() {
    let recorder = Recorder::default();
    let mut dh = handle(&DectConfig::new_pp(), &recorder);
    let ipui = test_ipui();

    dh.lce_rcv(ipui, MsgBuf::from_slice(&[0x03]).unwrap());
    // Protocol discriminator 0x9 is not assigned.
    dh.lce_rcv(ipui, MsgBuf::from_slice(&[0x09, 0x05]).unwrap());

    assert!(recorder.events().is_empty());
    assert_eq!(dh.open_calls(), 0);
}

/// A message for an unknown transaction carrying our own role bit cannot
/// open a new transaction and is dropped.
#[test]
fn test_unknown_own_transaction_dropped() {
    let recorder = Recorder::default();
    let mut dh = handle(&DectConfig::new_pp(), &recorder);
    let ipui = test_ipui();

    // Role bit PP-initiated towards a PP with no such transaction open.
    inject(
        &mut dh,
        DectRole::Fp,
        ipui,
        ProtocolDiscriminator::Cc,
        3,
        TransactionRole::PpInitiated,
        &CC_RELEASE_COM,
        &IeCollection::new(),
        CcMessageType::ReleaseCom.into(),
    );
    assert!(recorder.events().is_empty());
}

/// Inbound CC transactions beyond the limit are answered with a
/// CC-RELEASE-COM carrying reason overload.
#[test]
fn test_inbound_cc_overload_rejected() {
    let recorder = Recorder::default();
    let mut dh = handle(&DectConfig::new_fp(Ari::new(0x1234, 0x7)), &recorder);
    let ipui = test_ipui();

    for tv in 0..7 {
        inject(
            &mut dh,
            DectRole::Pp,
            ipui,
            ProtocolDiscriminator::Cc,
            tv,
            TransactionRole::PpInitiated,
            &CC_SETUP,
            &setup_msg(),
            CcMessageType::Setup.into(),
        );
    }
    assert_eq!(dh.open_calls(), 7);

    inject(
        &mut dh,
        DectRole::Pp,
        ipui,
        ProtocolDiscriminator::Cc,
        7,
        TransactionRole::PpInitiated,
        &CC_SETUP,
        &setup_msg(),
        CcMessageType::Setup.into(),
    );
    assert_eq!(dh.open_calls(), 7);

    let (tv, pd, f, ty, mut body) = next_tx(&mut dh, &ipui);
    assert_eq!(tv, 7);
    assert_eq!(pd, u8::from(ProtocolDiscriminator::Cc));
    assert_eq!(f, TransactionRole::PpInitiated as u8);
    assert_eq!(ty, u8::from(CcMessageType::ReleaseCom));
    let msg = parse_message(DectRole::Pp, &CC_RELEASE_COM, &mut body).unwrap();
    assert_eq!(
        msg.get(IeType::ReleaseReason)
            .and_then(|ie| ie.as_release_reason())
            .map(|r| r.reason),
        Some(ReleaseReasonValue::Overload)
    );
}

/// Link shutdown fails every open call with an MNCC-REJECT-ind and
/// removes the link.
#[test]
fn test_link_shutdown_rejects_calls() {
    let recorder = Recorder::default();
    let mut dh = handle(&DectConfig::new_pp(), &recorder);
    let ipui = test_ipui();

    let mut param = IeCollection::new();
    param.add(Ie::BasicService(IeBasicService {
        class: CallClass::Normal,
        service: BasicServiceValue::BasicSpeechDefault,
    }));
    let first = dh.mncc_setup_req(ipui, &param).unwrap();
    let second = dh.mncc_setup_req(ipui, &param).unwrap();
    assert_eq!(dh.open_calls(), 2);

    dh.link_shutdown(&ipui);

    let rejects = recorder
        .events()
        .iter()
        .filter(|e| matches!(e, TestEvent::RejectInd(_, _)))
        .count();
    assert_eq!(rejects, 2);
    assert!(dh.call(first).is_none());
    assert!(dh.call(second).is_none());
    assert!(dh.link(&ipui).is_none());
}

/// Messages on one link are delivered in arrival order.
#[test]
fn test_in_order_delivery() {
    let recorder = Recorder::default();
    let mut dh = handle(&DectConfig::new_fp(Ari::new(0x1234, 0x7)), &recorder);
    let ipui = test_ipui();

    for tv in 0..3 {
        inject(
            &mut dh,
            DectRole::Pp,
            ipui,
            ProtocolDiscriminator::Cc,
            tv,
            TransactionRole::PpInitiated,
            &CC_SETUP,
            &setup_msg(),
            CcMessageType::Setup.into(),
        );
    }

    let calls: Vec<_> = recorder
        .events()
        .into_iter()
        .filter_map(|e| match e {
            TestEvent::SetupInd(call, _) => Some(call),
            _ => None,
        })
        .collect();
    assert_eq!(calls.len(), 3);
    // Distinct transactions, in arrival order.
    assert!(calls.windows(2).all(|w| w[0] != w[1]));
}
