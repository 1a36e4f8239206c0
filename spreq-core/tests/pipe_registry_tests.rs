//! Pipes and the endpoint registry working together

use std::sync::Arc;

use spreq_core::endpoint::Endpoint;
use spreq_core::error::SpError;
use spreq_core::message::Message;
use spreq_core::pipe;
use spreq_core::protocol::ProtocolId;
use spreq_core::registry::EndpointRegistry;

#[test]
fn test_round_robin_over_pipes() {
    let mut registry = EndpointRegistry::new();
    let remotes: Vec<_> = (0..3)
        .map(|_| {
            let (ep, remote) = pipe::pair(ProtocolId::Rep.number(), 8);
            registry.add(Arc::new(ep)).unwrap();
            remote
        })
        .collect();

    for i in 0..6u32 {
        let mut msg = Message::new("x");
        msg.put_u32(i);
        registry.next().unwrap().send_msg(&msg).unwrap();
    }

    for remote in &remotes {
        assert_eq!(remote.pending(), 2);
    }
}

#[test]
fn test_removed_pipe_is_skipped() {
    let mut registry = EndpointRegistry::new();
    let (a, ra) = pipe::pair(ProtocolId::Rep.number(), 8);
    let (b, rb) = pipe::pair(ProtocolId::Rep.number(), 8);
    registry.add(Arc::new(a)).unwrap();
    registry.add(Arc::new(b)).unwrap();

    registry.remove(ra.endpoint_id()).unwrap();

    for _ in 0..3 {
        let ep = registry.next().unwrap();
        assert_eq!(ep.id(), rb.endpoint_id());
        ep.send_msg(&Message::new("y")).unwrap();
    }
    assert_eq!(rb.pending(), 3);
}

#[test]
fn test_dropped_remote_reports_closed() {
    let (ep, remote) = pipe::pair(ProtocolId::Rep.number(), 1);
    drop(remote);

    let err = ep.send_msg(&Message::new("z")).unwrap_err();
    assert!(matches!(err, SpError::EndpointClosed));
    assert!(err.is_transient());
}
