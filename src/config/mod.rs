mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{RequestSettings, SessionSettings, Settings};

/// Loads the configuration from the default file and environment variables.
/// Merges whatever is available with the built-in defaults and returns a
/// fully populated `Settings`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        session: SessionSettings {
            url: partial
                .session
                .as_ref()
                .and_then(|s| s.url.clone())
                .unwrap_or(default.session.url),
            vpn_name: partial
                .session
                .as_ref()
                .and_then(|s| s.vpn_name.clone())
                .unwrap_or(default.session.vpn_name),
            username: partial
                .session
                .as_ref()
                .and_then(|s| s.username.clone())
                .unwrap_or(default.session.username),
            password: partial
                .session
                .as_ref()
                .and_then(|s| s.password.clone())
                .unwrap_or(default.session.password),
        },
        request: RequestSettings {
            destination: partial
                .request
                .as_ref()
                .and_then(|r| r.destination.clone())
                .unwrap_or(default.request.destination),
            queue_name: partial
                .request
                .as_ref()
                .and_then(|r| r.queue_name.clone())
                .unwrap_or(default.request.queue_name),
            reply_timeout_secs: partial
                .request
                .as_ref()
                .and_then(|r| r.reply_timeout_secs)
                .unwrap_or(default.request.reply_timeout_secs),
        },
    })
}

/// Builds settings from the positional CLI form
/// `<host:port> <username> <password> <vpn>`.
///
/// Returns `None` when fewer than four arguments are given; the caller is
/// expected to print a usage line and exit without connecting.
pub fn from_args(args: &[String]) -> Option<Settings> {
    if args.len() < 4 {
        return None;
    }

    let mut settings = Settings::default();
    settings.session.url = format!("ws://{}", args[0]);
    settings.session.username = args[1].clone();
    settings.session.password = args[2].clone();
    settings.session.vpn_name = args[3].clone();
    Some(settings)
}

#[cfg(test)]
mod tests;
