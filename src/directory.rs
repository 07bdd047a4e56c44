//! Profile directory used to seed and backfill the friend roster.
//!
//! [`ProfileDirectory`] is the seam the chat client depends on;
//! [`WebApiDirectory`] implements it with `ISteamUser` calls through a
//! [`RequestExecutor`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::protocol::{
    FriendListResponse, PlayerSummariesResponse, PlayerSummary, FRIEND_LIST_RESOURCE,
    PLAYER_SUMMARIES_RESOURCE,
};
use crate::request::Request;
use crate::steam_id::SteamId;

/// Most ids `GetPlayerSummaries` accepts in one call.
pub const MAX_SUMMARIES_PER_REQUEST: usize = 100;

/// Looks up friends and profile snapshots.
#[async_trait]
pub trait ProfileDirectory: Send + Sync + 'static {
    /// Ids of `owner`'s friends.
    async fn friend_list(&self, owner: SteamId) -> Result<Vec<SteamId>>;

    /// Profile snapshots for `ids`. Unknown ids are simply absent from the result.
    async fn profiles(&self, ids: &[SteamId]) -> Result<Vec<PlayerSummary>>;
}

/// [`ProfileDirectory`] backed by the Steam Web API.
#[derive(Debug, Clone)]
pub struct WebApiDirectory {
    executor: Arc<RequestExecutor>,
}

impl WebApiDirectory {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ProfileDirectory for WebApiDirectory {
    async fn friend_list(&self, owner: SteamId) -> Result<Vec<SteamId>> {
        let mut request = Request::get(FRIEND_LIST_RESOURCE)
            .with_query("steamid", owner.to_string())
            .with_query("relationship", "friend");
        let response: FriendListResponse = self.executor.execute_json(&mut request).await?;
        Ok(response
            .friendslist
            .friends
            .into_iter()
            .map(|friend| friend.steamid)
            .collect())
    }

    async fn profiles(&self, ids: &[SteamId]) -> Result<Vec<PlayerSummary>> {
        let mut players = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_SUMMARIES_PER_REQUEST) {
            let joined = chunk
                .iter()
                .map(SteamId::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let mut request = Request::get(PLAYER_SUMMARIES_RESOURCE).with_query("steamids", joined);
            let response: PlayerSummariesResponse =
                self.executor.execute_json(&mut request).await?;
            debug!(
                requested = chunk.len(),
                returned = response.response.players.len(),
                "fetched player summaries"
            );
            players.extend(response.response.players);
        }
        Ok(players)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::executor::ExecutorConfig;
    use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
    use std::sync::Mutex as StdMutex;

    /// Answers every request with an empty summaries payload and records the URI.
    struct SummariesTransport {
        uris: Arc<StdMutex<Vec<String>>>,
    }

    #[async_trait]
    impl HttpTransport for SummariesTransport {
        async fn dispatch(
            &self,
            request: HttpRequest,
        ) -> std::result::Result<HttpResponse, TransportError> {
            self.uris.lock().unwrap().push(request.uri);
            Ok(HttpResponse::new(200, "OK", r#"{"response":{"players":[]}}"#))
        }
    }

    #[tokio::test]
    async fn profiles_are_requested_in_chunks_of_one_hundred() {
        let uris = Arc::new(StdMutex::new(Vec::new()));
        let executor = RequestExecutor::new(
            ExecutorConfig::new("http://h"),
            Arc::new(SummariesTransport {
                uris: Arc::clone(&uris),
            }),
        );
        let directory = WebApiDirectory::new(Arc::new(executor));

        let ids: Vec<SteamId> = (1..=150).map(SteamId::from_account_id).collect();
        directory.profiles(&ids).await.unwrap();

        let uris = uris.lock().unwrap();
        assert_eq!(uris.len(), 2);
        assert!(uris[0].starts_with("http://h/ISteamUser/GetPlayerSummaries/v0002?steamids="));
        // 100 ids joined by 99 encoded commas.
        assert_eq!(uris[0].matches("%2C").count(), 99);
        assert_eq!(uris[1].matches("%2C").count(), 49);
    }

    #[tokio::test]
    async fn no_ids_means_no_requests() {
        let uris = Arc::new(StdMutex::new(Vec::new()));
        let executor = RequestExecutor::new(
            ExecutorConfig::new("http://h"),
            Arc::new(SummariesTransport {
                uris: Arc::clone(&uris),
            }),
        );
        let directory = WebApiDirectory::new(Arc::new(executor));
        assert!(directory.profiles(&[]).await.unwrap().is_empty());
        assert!(uris.lock().unwrap().is_empty());
    }
}
