use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::correlation::Reply;
use crate::session::Session;
use crate::utils::error::ListenerError;

/// Listener lifecycle. Replies are delivered to the handler only in
/// `Active`; anything arriving outside `Active` is discarded, never
/// redelivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Closed,
    Opening,
    Active,
    Closing,
}

/// Owns one transient reply destination and its subscription.
pub struct ReplyListener {
    session: Arc<Session>,
    state: Arc<Mutex<ListenerState>>,
    destination: Option<String>,
    pump: Option<JoinHandle<()>>,
}

impl ReplyListener {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            state: Arc::new(Mutex::new(ListenerState::Closed)),
            destination: None,
            pump: None,
        }
    }

    /// Allocates the transient destination, subscribes, and starts the
    /// inbound pump. Returns the destination name once the listener is
    /// active. The handler is invoked once per reply carrying a
    /// correlation id.
    pub fn open<F>(&mut self, handler: F) -> Result<String, ListenerError>
    where
        F: Fn(Reply) + Send + 'static,
    {
        {
            let mut state = self.state.lock().unwrap();
            if *state != ListenerState::Closed {
                return Err(ListenerError::AlreadyOpen);
            }
            *state = ListenerState::Opening;
        }

        if !self.session.is_connected() {
            *self.state.lock().unwrap() = ListenerState::Closed;
            return Err(ListenerError::NotConnected);
        }

        let destination = match self.session.transport().create_temporary_destination() {
            Ok(destination) => destination,
            Err(e) => {
                *self.state.lock().unwrap() = ListenerState::Closed;
                return Err(e.into());
            }
        };

        let mut subscription = match self.session.transport().subscribe(&destination) {
            Ok(subscription) => subscription,
            Err(e) => {
                *self.state.lock().unwrap() = ListenerState::Closed;
                return Err(e.into());
            }
        };

        // Activate before pumping: frames buffered between subscribe and
        // the first recv are honored, not discarded.
        *self.state.lock().unwrap() = ListenerState::Active;

        let state = Arc::clone(&self.state);
        let pump = tokio::spawn(async move {
            while let Some(inbound) = subscription.receiver.recv().await {
                let active = *state.lock().unwrap() == ListenerState::Active;
                if !active {
                    debug!(
                        destination = %subscription.destination,
                        "listener not active, discarding late reply"
                    );
                    continue;
                }
                match inbound.correlation_id {
                    Some(correlation_id) => handler(Reply {
                        correlation_id,
                        payload: inbound.payload,
                        timestamp: inbound.timestamp,
                    }),
                    None => warn!(
                        destination = %subscription.destination,
                        "reply without correlation id discarded"
                    ),
                }
            }
        });

        self.destination = Some(destination.clone());
        self.pump = Some(pump);
        Ok(destination)
    }

    pub fn state(&self) -> ListenerState {
        *self.state.lock().unwrap()
    }

    /// The transient destination while the listener is open.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Unsubscribes and releases the destination. Closing twice is a no-op.
    pub fn close(&mut self) {
        {
            let mut state = self.state.lock().unwrap();
            if *state == ListenerState::Closed {
                return;
            }
            *state = ListenerState::Closing;
        }

        if let Some(destination) = self.destination.take() {
            if let Err(e) = self.session.transport().unsubscribe(&destination) {
                warn!(%destination, "unsubscribe failed during close: {e}");
            }
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }

        *self.state.lock().unwrap() = ListenerState::Closed;
    }
}

impl Drop for ReplyListener {
    fn drop(&mut self) {
        self.close();
    }
}
