//! ghostchat terminal client
//!
//! Run with:
//! ```bash
//! GHOSTCHAT_IDENTITY=1234567 cargo run -p ghost-realtime
//! ```
//!
//! Configuration is loaded from environment variables.

use ghost_api::{ApiClient, AuthRequest};
use ghost_common::{try_init_tracing_with_config, AppError, AppResult, ClientConfig, TracingConfig};
use ghost_core::Handle;
use ghost_realtime::cli::{render_event, render_message, CliCommand};
use ghost_realtime::{Session, SessionHandle, WebSocketConnector};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, code = e.error_code(), "ghostchat failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let config = ClientConfig::from_env()?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        api = %config.api.base_url,
        relay = %config.realtime.ws_url,
        "Configuration loaded"
    );

    let api = Arc::new(ApiClient::new(&config.api)?);
    let identity = resolve_identity(&config, &api).await?;

    let (session, events) = Session::start(
        config.realtime.clone(),
        identity.clone(),
        Arc::new(WebSocketConnector),
        api,
    );
    println!("* you are {identity}");

    let printer = tokio::spawn(print_events(events));
    let result = read_commands(&session).await;

    session.shutdown().await?;
    printer.abort();
    result
}

/// Use the configured handle, or authenticate to obtain one
async fn resolve_identity(config: &ClientConfig, api: &ApiClient) -> AppResult<Handle> {
    if let Some(identity) = &config.identity {
        return Ok(identity.clone());
    }

    let telegram_id = config.telegram_id.as_ref().ok_or(AppError::MissingIdentity)?;
    let profile = api.authenticate(&AuthRequest::by_id(telegram_id.as_str())).await?;

    info!(identity = %profile.anonymous_id, name = ?profile.name, "Authenticated");
    Ok(profile.anonymous_id)
}

async fn read_commands(session: &SessionHandle) -> AppResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.map_err(AppError::internal)? {
        let command = match CliCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("! {e}");
                continue;
            }
        };

        let outcome = match command {
            CliCommand::Open(peer) => session.open_chat(peer.clone()).await.map(|()| {
                let status = if session.view().is_online(&peer) { "online" } else { "offline" };
                println!("* chatting with {peer} ({status})");
            }),
            CliCommand::Leave => session.leave_chat().await,
            CliCommand::Online => {
                let view = session.view();
                let online: Vec<String> = view.online.iter().map(ToString::to_string).collect();
                println!("* online: {}", online.join(", "));
                Ok(())
            }
            CliCommand::Quit => break,
            CliCommand::Say(text) => {
                session.input_changed().await?;
                match session.send_message(text).await {
                    Ok(Some(message)) => {
                        println!("{}", render_message(&message));
                        Ok(())
                    }
                    Ok(None) => {
                        println!("! not connected, message dropped");
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
        };

        match outcome {
            Ok(()) => {}
            Err(e) if e.is_user_error() || matches!(e, AppError::Domain(_)) => println!("! {e}"),
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

async fn print_events(mut events: broadcast::Receiver<ghost_realtime::SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => println!("{}", render_event(&event)),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event printer lagging");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
