#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use spreq_core::message::Message;
use spreq_core::options::SocketOptions;
use spreq_core::timer::{ManualClock, ManualTimer};
use spreq_proto::{ReqFactory, Socket};

fuzz_target!(|data: &[u8]| {
    // First byte picks the header/body split of the reply.
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());
    let (header, body) = rest.split_at(split);

    let factory = ReqFactory::new()
        .with_clock(Arc::new(ManualClock::new()))
        .with_timer(Arc::new(ManualTimer::new()))
        .with_seed(0x1234_5678);
    let (socket, mut driver) = Socket::with_factory(&factory, SocketOptions::new());
    let peer = socket.pipe().unwrap();

    socket.send("request").unwrap();
    driver.run_pending();
    let request = peer.try_recv().unwrap();

    peer.send_raw(Message::with_header(header, body.to_vec())).unwrap();
    driver.run_pending();

    // Accepted only when the reply leads with our id; the id is consumed.
    let matches = header.len() >= 4 && header[..4] == *request.header();
    match socket.try_recv() {
        Some(reply) => {
            assert!(matches);
            assert_eq!(reply.header(), &header[4..]);
            assert_eq!(reply.body().as_ref(), body);
        }
        None => assert!(!matches),
    }
});
