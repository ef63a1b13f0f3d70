// End-to-end tests for the textual binding over TCP
mod common;

use common::{start_stream_server, TIMEOUT};
use ipkcp_client::{ClientError, StreamClient};
use ipkcp_core::text::TextResponse;
use ipkcpd::MAX_CONNECTIONS;
use std::net::SocketAddr;

fn connect(address: SocketAddr) -> StreamClient {
    let client = StreamClient::connect(address).unwrap();
    client.set_timeout(TIMEOUT).unwrap();
    client
}

fn greeted(address: SocketAddr) -> StreamClient {
    let mut client = connect(address);
    assert_eq!(client.hello().unwrap(), TextResponse::Hello);
    client
}

fn assert_closed(client: &mut StreamClient) {
    assert!(matches!(
        client.read_response(),
        Err(ClientError::ConnectionClosed)
    ));
}

#[test]
fn hello_then_solve() {
    let server = start_stream_server();
    let mut client = greeted(server.address);

    assert_eq!(client.solve("(+ 1 2)").unwrap(), TextResponse::Result(3));
    assert_eq!(client.solve("(* 2 3 4)").unwrap(), TextResponse::Result(24));
    assert_eq!(
        client.solve("(/ (+ 10 20 30) (- 5 2))").unwrap(),
        TextResponse::Result(20)
    );

    server.stop().unwrap();
}

#[test]
fn solve_before_hello_is_rejected() {
    let server = start_stream_server();
    let mut client = connect(server.address);

    assert_eq!(client.solve("(+ 1 2)").unwrap(), TextResponse::Bye);
    assert_closed(&mut client);
}

#[test]
fn invalid_expression_ends_the_session() {
    let server = start_stream_server();
    let mut client = greeted(server.address);

    assert_eq!(client.solve("(/ 4 0)").unwrap(), TextResponse::Bye);
    assert_closed(&mut client);
}

#[test]
fn malformed_and_repeated_greeting_are_violations() {
    let server = start_stream_server();

    let mut client = connect(server.address);
    assert_eq!(client.send_raw(b"HI THERE\n").unwrap(), TextResponse::Bye);
    assert_closed(&mut client);

    let mut client = greeted(server.address);
    assert_eq!(client.hello().unwrap(), TextResponse::Bye);
    assert_closed(&mut client);
}

#[test]
fn negative_results_are_sent_without_sign() {
    let server = start_stream_server();
    let mut client = greeted(server.address);

    assert_eq!(client.solve("(- 1 5)").unwrap(), TextResponse::Result(4));
}

#[test]
fn solve_without_newline_is_evaluated() {
    let server = start_stream_server();
    let mut client = greeted(server.address);

    assert_eq!(client.send_raw(b"SOLVE (+ 40 2)").unwrap(), TextResponse::Result(42));
}

#[test]
fn violation_does_not_affect_other_clients() {
    let server = start_stream_server();
    let mut good = greeted(server.address);
    let mut bad = greeted(server.address);

    assert_eq!(bad.solve("(+ 1)").unwrap(), TextResponse::Bye);
    assert_closed(&mut bad);

    assert_eq!(good.solve("(+ 2 2)").unwrap(), TextResponse::Result(4));
}

#[test]
fn full_table_rejects_extra_clients() {
    let server = start_stream_server();
    let mut clients: Vec<_> = (0..MAX_CONNECTIONS).map(|_| greeted(server.address)).collect();

    let mut extra = connect(server.address);
    assert_eq!(extra.read_response().unwrap(), TextResponse::Bye);
    assert_closed(&mut extra);

    // BYE is only written after the slot has been released.
    let mut leaving = clients.remove(0);
    assert_eq!(leaving.hello().unwrap(), TextResponse::Bye);

    let mut late = greeted(server.address);
    assert_eq!(late.solve("(+ 1 1)").unwrap(), TextResponse::Result(2));
    for client in clients.iter_mut() {
        assert_eq!(client.solve("(* 3 3)").unwrap(), TextResponse::Result(9));
    }
}

#[test]
fn closed_client_frees_its_slot() {
    let server = start_stream_server();
    let mut clients: Vec<_> = (0..MAX_CONNECTIONS).map(|_| greeted(server.address)).collect();

    clients.remove(3).close().unwrap();

    let mut late = greeted(server.address);
    assert_eq!(late.solve("(- 2 9)").unwrap(), TextResponse::Result(7));
    for client in clients.iter_mut() {
        assert_eq!(client.solve("(+ 4 4)").unwrap(), TextResponse::Result(8));
    }

    // the table is full again
    let mut extra = connect(server.address);
    assert_eq!(extra.read_response().unwrap(), TextResponse::Bye);
    assert_closed(&mut extra);
}

#[test]
fn shutdown_says_bye_to_every_client() {
    let server = start_stream_server();
    let mut first = greeted(server.address);
    let mut second = connect(server.address);
    // make sure the second connection has been accepted
    assert_eq!(second.hello().unwrap(), TextResponse::Hello);

    server.stop().unwrap();

    for client in [&mut first, &mut second] {
        assert_eq!(client.read_response().unwrap(), TextResponse::Bye);
        assert_closed(client);
    }
}
