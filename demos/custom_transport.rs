//! # Custom Transport Example
//!
//! Shows how to implement the [`HttpTransport`] trait with an in-process fake
//! Steam server. This is useful for:
//!
//! - **Testing**: drive the chat client without network access
//! - **Custom backends**: plug in any HTTP stack (hyper, a proxy, a recorder)
//!
//! ## Running
//!
//! ```sh
//! cargo run --example custom_transport
//! ```

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use steam_chat_client::protocol::PlayerSummary;
use steam_chat_client::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use steam_chat_client::{
    BearerTokenAuthenticator, ChatClient, ChatConfig, ChatEvent, ExecutorConfig,
    ProfileDirectory, RequestExecutor, SteamId,
};

const OWNER: u64 = 76_561_197_960_287_930;
const FRIEND: u64 = 76_561_197_960_287_931;

// ─────────────────────────────────────────────────────────────────────
// Step 1: A transport that answers like the chat endpoints
// ─────────────────────────────────────────────────────────────────────

/// Fake server: accepts logon, delivers one message per poll, acks sends.
#[derive(Default)]
struct FakeSteam {
    cursor: AtomicI64,
}

#[async_trait]
impl HttpTransport for FakeSteam {
    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!(method = %request.method, uri = %request.uri, "fake server received request");

        let body = if request.uri.contains("/Logon/") {
            serde_json::json!({
                "steamid": OWNER.to_string(),
                "umqid": "1",
                "message": 0,
                "error": "OK",
            })
        } else if request.uri.contains("/Poll/") {
            // Pretend the server held the poll open for a moment.
            tokio::time::sleep(Duration::from_millis(200)).await;
            let seq = self.cursor.fetch_add(1, Ordering::SeqCst) + 1;
            serde_json::json!({
                "messages": [{
                    "type": "saytext",
                    "utc_timestamp": 1_700_000_000 + seq,
                    "steamid_from": FRIEND.to_string(),
                    "text": format!("message #{seq}"),
                }],
                "messagelast": seq,
                "error": "OK",
            })
        } else {
            serde_json::json!({ "error": "OK" })
        };

        Ok(HttpResponse::new(200, "OK", body.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 2: A directory with no friends
// ─────────────────────────────────────────────────────────────────────

struct NoFriends;

#[async_trait]
impl ProfileDirectory for NoFriends {
    async fn friend_list(&self, _owner: SteamId) -> steam_chat_client::error::Result<Vec<SteamId>> {
        Ok(Vec::new())
    }

    async fn profiles(
        &self,
        _ids: &[SteamId],
    ) -> steam_chat_client::error::Result<Vec<PlayerSummary>> {
        Ok(Vec::new())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 3: Wire together the client and the fake server
// ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let executor = Arc::new(
        RequestExecutor::new(
            ExecutorConfig::new("http://fake.steam"),
            Arc::new(FakeSteam::default()),
        )
        .with_authenticator(BearerTokenAuthenticator::new("demo-token")),
    );
    let (mut client, mut events) = ChatClient::new(executor, Arc::new(NoFriends), ChatConfig::new());

    client.log_on().await?;

    let mut received = 0;
    while let Some(event) = events.recv().await {
        match event {
            ChatEvent::MessagesReceived { messages, .. } => {
                for message in messages {
                    tracing::info!("{}: {}", message.sender, message.text.unwrap_or_default());
                    received += 1;
                }
            }
            ChatEvent::Disconnected { reason, .. } => {
                tracing::info!("disconnected: {}", reason.as_deref().unwrap_or("clean"));
                break;
            }
            other => tracing::info!("event: {other:?}"),
        }
        if received >= 3 {
            break;
        }
    }

    client.disconnect().await;
    tracing::info!("Done, received {received} message(s). Custom transport works!");
    Ok(())
}
