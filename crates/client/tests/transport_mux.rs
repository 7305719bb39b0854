//! Multiplexed transport: several clients on one connection, one shared
//! worker, per-client dispatch, and the detach/teardown handshake.

mod support;

use std::time::Duration;

use crossbeam_channel::unbounded;
use hublink_client::config::{AuthMethod, DeviceConfig};
use hublink_client::{Client, ConfirmationResult, Message, MessageDisposition, Transport};
use support::{script, LlEvent, MockEngineProvider};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn device(id: &str) -> DeviceConfig {
    DeviceConfig {
        device_id: id.to_owned(),
        auth: AuthMethod::SharedAccessKey("k".to_owned()),
    }
}

#[test]
fn two_clients_share_one_worker() {
    init_logging();
    let provider = MockEngineProvider::new();
    let transport = Transport::new(&provider, "h.example.net").unwrap();

    let first = Client::with_transport(&transport, &device("d1")).unwrap();
    let second = Client::with_transport(&transport, &device("d2")).unwrap();

    let (tx1, rx1) = unbounded();
    first
        .send_event(
            Message::new(b"from d1".to_vec()),
            Some(Box::new(move |result| tx1.send(result).unwrap())),
        )
        .unwrap();
    let (tx2, rx2) = unbounded();
    second
        .send_event(
            Message::new(b"from d2".to_vec()),
            Some(Box::new(move |result| tx2.send(result).unwrap())),
        )
        .unwrap();

    script(
        &provider.state_of("d1"),
        LlEvent::CompleteNextSend(ConfirmationResult::Ok),
    );
    script(
        &provider.state_of("d2"),
        LlEvent::CompleteNextSend(ConfirmationResult::Ok),
    );

    assert_eq!(
        rx1.recv_timeout(Duration::from_secs(5)).unwrap(),
        ConfirmationResult::Ok
    );
    assert_eq!(
        rx2.recv_timeout(Duration::from_secs(5)).unwrap(),
        ConfirmationResult::Ok
    );

    // In multiplexed mode the shared engine does the protocol work; the
    // per-client engines are never ticked directly.
    assert_eq!(provider.state_of("d1").lock().unwrap().do_work_count, 0);
    assert_eq!(provider.state_of("d2").lock().unwrap().do_work_count, 0);

    first.destroy();
    second.destroy();
}

#[test]
fn surviving_client_keeps_working_after_a_peer_detaches() {
    init_logging();
    let provider = MockEngineProvider::new();
    let transport = Transport::new(&provider, "h.example.net").unwrap();

    let first = Client::with_transport(&transport, &device("d1")).unwrap();
    let second = Client::with_transport(&transport, &device("d2")).unwrap();

    first.send_event(Message::new(b"warmup".to_vec()), None).unwrap();
    second.send_event(Message::new(b"warmup".to_vec()), None).unwrap();
    first.destroy();

    let (tx, rx) = unbounded();
    second
        .send_event(
            Message::new(b"still alive".to_vec()),
            Some(Box::new(move |result| tx.send(result).unwrap())),
        )
        .unwrap();
    script(
        &provider.state_of("d2"),
        LlEvent::CompleteNextSend(ConfirmationResult::Ok),
    );
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        ConfirmationResult::Ok
    );

    second.destroy();
}

#[test]
fn pending_confirmation_aborts_when_a_mux_client_detaches() {
    init_logging();
    let provider = MockEngineProvider::new();
    let transport = Transport::new(&provider, "h.example.net").unwrap();
    let client = Client::with_transport(&transport, &device("d1")).unwrap();

    let (tx, rx) = unbounded();
    client
        .send_event(
            Message::new(b"never acked".to_vec()),
            Some(Box::new(move |result| tx.send(result).unwrap())),
        )
        .unwrap();

    client.destroy();
    assert_eq!(rx.try_recv().unwrap(), ConfirmationResult::BecauseDestroy);
}

#[test]
fn mux_clients_dispatch_inbound_messages() {
    init_logging();
    let provider = MockEngineProvider::new();
    let transport = Transport::new(&provider, "h.example.net").unwrap();
    let client = Client::with_transport(&transport, &device("d1")).unwrap();

    let (tx, rx) = unbounded();
    client
        .set_message_callback(move |message| {
            tx.send(message.clone()).unwrap();
            MessageDisposition::Accepted
        })
        .unwrap();

    let inbound = Message::new(b"hello d1".to_vec());
    script(&provider.state_of("d1"), LlEvent::InboundMessage(inbound.clone()));

    let seen = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(seen.same_handle(&inbound));

    client.destroy();
}

#[test]
fn transport_outlives_a_full_attach_detach_cycle() {
    init_logging();
    let provider = MockEngineProvider::new();
    let transport = Transport::new(&provider, "h.example.net").unwrap();

    for round in 0..3 {
        let client = Client::with_transport(&transport, &device(&format!("d{round}"))).unwrap();
        client.send_event(Message::new(b"ping".to_vec()), None).unwrap();
        client.destroy();
    }

    drop(transport);
}
