use std::sync::Arc;

use tokio::sync::watch;

use crate::config::SessionSettings;
use crate::transport::{SessionEvent, Transport};
use crate::utils::error::TransportError;

/// Connection state of a session, derived from transport lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// One authenticated connection to the broker.
///
/// Holds the typed connection settings and the transport handle. The session
/// does not reconnect on its own; once the transport reports `Disconnected`
/// the session stays down and outstanding work is cancelled by its owner.
pub struct Session {
    settings: SessionSettings,
    transport: Arc<dyn Transport>,
    events: watch::Receiver<SessionEvent>,
}

impl Session {
    /// Wraps an already-connected transport. Fails with `NotConnected` when
    /// the transport has already gone down.
    pub fn connect(
        settings: SessionSettings,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, TransportError> {
        let events = transport.events();
        if *events.borrow() == SessionEvent::Disconnected {
            return Err(TransportError::NotConnected);
        }
        Ok(Self {
            settings,
            transport,
            events,
        })
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        match *self.events.borrow() {
            SessionEvent::Connecting => SessionState::Connecting,
            SessionEvent::Up => SessionState::Connected,
            SessionEvent::Disconnected => SessionState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Fresh lifecycle watch, used by callers awaiting disconnection.
    pub fn events(&self) -> watch::Receiver<SessionEvent> {
        self.transport.events()
    }

    /// Tears the connection down. Idempotent.
    pub fn disconnect(&self) {
        self.transport.disconnect();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("url", &self.settings.url)
            .field("vpn_name", &self.settings.vpn_name)
            .field("state", &self.state())
            .finish()
    }
}
