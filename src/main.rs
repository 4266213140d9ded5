use std::env;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use replyq::config;
use replyq::coordinator::{Coordinator, QueueProducer};
use replyq::session::Session;
use replyq::transport::websocket::WsTransport;
use replyq::utils::logging;

#[tokio::main]
async fn main() {
    logging::init("info");

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(settings) = config::from_args(&args) else {
        eprintln!("usage: replyq <host:port> <username> <password> <vpn>");
        process::exit(1);
    };

    info!(url = %settings.session.url, vpn = %settings.session.vpn_name, "connecting");
    let transport = match WsTransport::connect(&settings.session).await {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            error!("failed to connect: {e}");
            process::exit(1);
        }
    };

    let session = Arc::new(
        Session::connect(settings.session.clone(), transport).expect("session over live transport"),
    );
    let coordinator = Coordinator::new(Arc::clone(&session));

    let timeout = Duration::from_secs(settings.request.reply_timeout_secs);
    match coordinator
        .request_reply(&settings.request.destination, "Sample Request", timeout)
        .await
    {
        Ok(reply) => info!("reply received: {reply}"),
        Err(e) => error!("request failed: {e}"),
    }

    let producer = QueueProducer::new(Arc::clone(coordinator.channel()));
    match producer.send_once(&settings.request.queue_name, "Sample Message") {
        Ok(()) => info!(queue = %settings.request.queue_name, "queue message delivered to broker"),
        Err(e) => error!("queue send failed: {e}"),
    }

    session.disconnect();
    info!("session closed");
}
