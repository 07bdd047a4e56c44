//! # Chat Session Example
//!
//! Logs on to Steam chat with an OAuth access token, prints incoming
//! messages and presence changes, and answers every text message with an
//! echo. Shuts down cleanly on Ctrl+C.
//!
//! ## Running
//!
//! ```sh
//! STEAM_ACCESS_TOKEN=... cargo run --example chat_session
//!
//! # Verbose request logging:
//! RUST_LOG=steam_chat_client=debug STEAM_ACCESS_TOKEN=... cargo run --example chat_session
//! ```

use std::sync::Arc;

use steam_chat_client::{
    BearerTokenAuthenticator, ChatClient, ChatConfig, ChatEvent, ExecutorConfig, MessageKind,
    RequestExecutor, ReqwestTransport, WebApiDirectory,
};

/// Default endpoint when `STEAM_API_URL` is not set.
const DEFAULT_URL: &str = "https://api.steampowered.com";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let url = std::env::var("STEAM_API_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let Ok(token) = std::env::var("STEAM_ACCESS_TOKEN") else {
        return Err("set STEAM_ACCESS_TOKEN to an OAuth access token".into());
    };

    let executor = Arc::new(
        RequestExecutor::new(ExecutorConfig::new(url), Arc::new(ReqwestTransport::new()))
            .with_authenticator(BearerTokenAuthenticator::new(token)),
    );
    let directory = Arc::new(WebApiDirectory::new(Arc::clone(&executor)));
    let (mut client, mut events) = ChatClient::new(executor, directory, ChatConfig::new());

    // ── Log on ──────────────────────────────────────────────────────
    let session = client.log_on().await?;
    tracing::info!(owner = %session.owner_id, "logged on");
    tracing::info!("{} friend(s) in roster", client.roster().await.len());

    // ── Event loop ──────────────────────────────────────────────────
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    ChatEvent::StateChanged(state) => tracing::info!("state: {state}"),
                    ChatEvent::MessagesReceived { messages, .. } => {
                        for message in messages {
                            if message.kind != MessageKind::Text {
                                continue;
                            }
                            let text = message.text.unwrap_or_default();
                            tracing::info!("{}: {text}", message.sender);
                            if let Err(e) = client.send_message(message.sender, format!("echo: {text}")).await {
                                tracing::warn!("reply failed: {e}");
                            }
                        }
                    }
                    ChatEvent::PresenceChanged { notifications, .. } => {
                        for n in notifications {
                            tracing::info!(
                                "{} is now {:?}",
                                n.persona_name.as_deref().unwrap_or("someone"),
                                n.persona_state
                            );
                        }
                    }
                    ChatEvent::Disconnected { reason, manual } => {
                        tracing::info!(manual, "disconnected: {}", reason.as_deref().unwrap_or("clean"));
                        if !client.config().auto_reconnect || manual {
                            break;
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, logging off");
                break;
            }
        }
    }

    // ── Clean shutdown ──────────────────────────────────────────────
    client.disconnect().await;
    Ok(())
}
