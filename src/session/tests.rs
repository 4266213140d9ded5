use std::sync::Arc;

use super::{Session, SessionState};
use crate::config::Settings;
use crate::transport::loopback::LoopbackTransport;
use crate::transport::Transport;

fn connected_session() -> Session {
    let transport = Arc::new(LoopbackTransport::connect());
    Session::connect(Settings::default().session, transport).unwrap()
}

#[test]
fn test_session_starts_connected() {
    let session = connected_session();
    assert_eq!(session.state(), SessionState::Connected);
    assert!(session.is_connected());
}

#[test]
fn test_disconnect_transitions_state() {
    let session = connected_session();
    session.disconnect();
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());
}

#[test]
fn test_disconnect_is_idempotent() {
    let session = connected_session();
    session.disconnect();
    session.disconnect();
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[test]
fn test_connect_rejects_downed_transport() {
    let transport = Arc::new(LoopbackTransport::connect());
    transport.disconnect();
    assert!(Session::connect(Settings::default().session, transport).is_err());
}

#[test]
fn test_session_keeps_settings() {
    let session = connected_session();
    assert_eq!(session.settings().vpn_name, "default");
}
