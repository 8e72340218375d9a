use axum::extract::ws::Message;
use tokio::sync::mpsc;

use super::client::Client;

#[test]
fn new_clients_get_distinct_ids() {
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();
    let a = Client::new(tx_a);
    let b = Client::new(tx_b);

    assert!(!a.id.is_empty());
    assert_ne!(a.id, b.id);
}

#[test]
fn send_queues_for_open_client() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = Client::new(tx);

    assert!(client.send(Message::Text("hello".into())));
    assert!(matches!(rx.try_recv(), Ok(Message::Text(t)) if t.as_str() == "hello"));
}

#[test]
fn close_enqueues_a_single_close_frame() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = Client::new(tx);

    client.close();
    client.close();

    assert!(client.is_closed());
    assert!(matches!(rx.try_recv(), Ok(Message::Close(None))));
    assert!(rx.try_recv().is_err());
}

#[test]
fn send_after_close_is_rejected() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let client = Client::new(tx);

    client.close();
    assert!(!client.send(Message::Text("late".into())));

    // only the close frame made it into the channel
    assert!(matches!(rx.try_recv(), Ok(Message::Close(None))));
    assert!(rx.try_recv().is_err());
}

#[test]
fn send_failure_closes_the_client() {
    let (tx, rx) = mpsc::unbounded_channel();
    let client = Client::new(tx);
    drop(rx);

    assert!(!client.send(Message::Text("into the void".into())));
    assert!(client.is_closed());
}
