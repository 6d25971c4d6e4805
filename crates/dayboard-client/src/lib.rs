//! CLI, relay client, client poller, local collections
//!
//! This crate provides the `dayboard` command-line interface.

pub mod board;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod poller;
pub mod relay_client;
pub mod session;
pub mod store;

pub use board::Board;
pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use poller::{ClientPoller, PollFailure, PollerHandle, Snapshot, SnapshotSource};
pub use relay_client::RelayClient;
pub use session::SessionToken;
pub use store::{JsonFileStore, RecordStore};

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};
    use dayboard_core::Event;
    use dayboard_providers::{BoxFuture, CalendarSource, FetchError, FetchResult};
    use dayboard_server::{EventCache, Refresher, TokenStore, router};

    /// A calendar source with a fixed answer.
    pub struct StaticSource {
        result: FetchResult<Vec<Event>>,
        tokens: Mutex<Vec<String>>,
    }

    impl StaticSource {
        /// A 30-minute event at 09:00 UTC on 2024-03-15.
        pub fn event(id: &str, summary: &str) -> Event {
            let start = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
            Event::new(id, Some(summary.to_string()), start, start + chrono::Duration::minutes(30))
        }

        pub fn one(id: &str, summary: &str) -> Self {
            Self {
                result: Ok(vec![Self::event(id, summary)]),
                tokens: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: FetchError) -> Self {
            Self {
                result: Err(error),
                tokens: Mutex::new(Vec::new()),
            }
        }

        pub fn tokens(&self) -> Vec<String> {
            self.tokens.lock().unwrap().clone()
        }
    }

    impl CalendarSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn fetch<'a>(&'a self, token: &'a str) -> BoxFuture<'a, FetchResult<Vec<Event>>> {
            self.tokens.lock().unwrap().push(token.to_string());
            let result = self.result.clone();
            Box::pin(async move { result })
        }
    }

    /// A refresher over stores in `dir`.
    pub fn relay_with(dir: &Path, source: StaticSource) -> Arc<Refresher> {
        Arc::new(Refresher::new(
            Arc::new(TokenStore::open(dir)),
            Arc::new(EventCache::open(dir)),
            Arc::new(source),
        ))
    }

    /// Serves the relay routes on an ephemeral port and returns its base URL.
    pub async fn spawn_relay(refresher: Arc<Refresher>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(refresher, None)).await.unwrap();
        });
        format!("http://{addr}/")
    }
}
