use serde::Deserialize;

/// Top-level configuration for the application.
///
/// Includes the broker session parameters and the request defaults.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub session: SessionSettings,
    pub request: RequestSettings,
}

/// Connection parameters for one broker session.
///
/// This is the typed replacement for a dynamic session-property bag: every
/// recognized option is a named field.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    /// Transport endpoint, e.g. `ws://host:port`.
    pub url: String,
    /// Message routing domain on the broker.
    pub vpn_name: String,
    pub username: String,
    pub password: String,
}

/// Defaults for the request/reply exchange performed by the binary.
#[derive(Debug, Deserialize, Clone)]
pub struct RequestSettings {
    /// Destination the request is sent to.
    pub destination: String,
    /// Durable queue used by the fire-and-forget producer.
    pub queue_name: String,
    /// How long to wait for a reply before timing out.
    pub reply_timeout_secs: u64,
}

/// Partial configuration loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub session: Option<PartialSessionSettings>,
    pub request: Option<PartialRequestSettings>,
}

/// Partial session settings from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialSessionSettings {
    pub url: Option<String>,
    pub vpn_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Partial request settings from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialRequestSettings {
    pub destination: Option<String>,
    pub queue_name: Option<String>,
    pub reply_timeout_secs: Option<u64>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            session: SessionSettings {
                url: "ws://127.0.0.1:8080".to_string(),
                vpn_name: "default".to_string(),
                username: "default".to_string(),
                password: "default".to_string(),
            },
            request: RequestSettings {
                destination: "tutorial/requests".to_string(),
                queue_name: "tutorial/queue".to_string(),
                reply_timeout_secs: 5,
            },
        }
    }
}
