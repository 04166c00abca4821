//! # Provider Script Loader
//!
//! Lifecycle management for the externally hosted Culqi checkout script.
//! The script is fetched at most once process-wide, no matter how many
//! components request tokenization concurrently, and `Ready` is reported
//! only after the provider actually answers a probe: the script's load
//! event alone is not proof the provider object is callable, since the
//! provider finishes wiring itself asynchronously after load.
//!
//! State machine: `NotRequested → Loading → {Ready | Failed}`. `Failed` is
//! terminal for the session; there is no degraded non-tokenized fallback.

use crate::config::CulqiConfig;
use checkout_core::TokenError;
use reqwest::Client;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, instrument};

/// Loader lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// No one has asked for the provider yet
    NotRequested,
    /// One caller is fetching the script; others wait on its outcome
    Loading,
    /// The provider answered a probe and is callable
    Ready,
    /// Script fetch or settle failed; fatal for this session
    Failed,
}

/// Process-wide loader for the provider script.
///
/// Instances are injectable for tests; production code shares one via
/// [`global`].
pub struct ScriptLoader {
    client: Client,
    js_url: String,
    probe_url: String,
    settle_attempts: u32,
    settle_delay: Duration,
    state: Mutex<LoaderState>,
    tx: watch::Sender<LoaderState>,
}

impl ScriptLoader {
    pub fn new(config: &CulqiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let (tx, _rx) = watch::channel(LoaderState::NotRequested);

        Self {
            client,
            js_url: config.js_url.clone(),
            probe_url: config.token_url(),
            settle_attempts: config.settle_attempts,
            settle_delay: config.settle_delay,
            state: Mutex::new(LoaderState::NotRequested),
            tx,
        }
    }

    /// Current state, for gating the pay action in the UI
    pub fn state(&self) -> LoaderState {
        *self.tx.borrow()
    }

    /// Make the provider callable, fetching the script at most once.
    ///
    /// Safe to call from any number of concurrent tasks: exactly one fetch
    /// happens and every caller observes the same `Ready`/`Failed`
    /// transition.
    #[instrument(skip(self))]
    pub async fn ensure_ready(&self) -> Result<(), TokenError> {
        // Check-and-set under the lock; the winner owns the load.
        let owns_load = {
            let mut state = self.state.lock().await;
            match *state {
                LoaderState::Ready => return Ok(()),
                LoaderState::Failed => {
                    return Err(TokenError::ScriptLoad(
                        "provider script previously failed to load".to_string(),
                    ))
                }
                LoaderState::Loading => false,
                LoaderState::NotRequested => {
                    *state = LoaderState::Loading;
                    self.tx.send_replace(LoaderState::Loading);
                    true
                }
            }
        };

        if owns_load {
            let result = self.load_and_settle().await;
            let next = if result.is_ok() {
                LoaderState::Ready
            } else {
                LoaderState::Failed
            };
            *self.state.lock().await = next;
            self.tx.send_replace(next);
            return result;
        }

        // Another caller is loading; wait for its transition.
        let mut rx = self.tx.subscribe();
        loop {
            match *rx.borrow_and_update() {
                LoaderState::Ready => return Ok(()),
                LoaderState::Failed => {
                    return Err(TokenError::ScriptLoad(
                        "provider script failed to load".to_string(),
                    ))
                }
                LoaderState::NotRequested | LoaderState::Loading => {}
            }
            if rx.changed().await.is_err() {
                return Err(TokenError::ScriptLoad("loader went away".to_string()));
            }
        }
    }

    async fn load_and_settle(&self) -> Result<(), TokenError> {
        debug!("Fetching provider script: {}", self.js_url);

        let response = self
            .client
            .get(&self.js_url)
            .send()
            .await
            .map_err(|e| TokenError::ScriptLoad(format!("script fetch failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            error!("Provider script fetch returned {}", status);
            return Err(TokenError::ScriptLoad(format!(
                "script fetch returned HTTP {}",
                status
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| TokenError::ScriptLoad(format!("script body failed: {}", e)))?;

        // Settle: probe until the provider answers.
        for attempt in 0..self.settle_attempts {
            if self.probe().await {
                debug!("Provider callable after {} probe(s)", attempt + 1);
                return Ok(());
            }
            tokio::time::sleep(self.settle_delay).await;
        }

        error!(
            "Provider never became callable after {} probes",
            self.settle_attempts
        );
        Err(TokenError::ScriptLoad(
            "provider did not become callable".to_string(),
        ))
    }

    /// Any HTTP answer from the token endpoint counts as callable; only a
    /// transport failure means the provider is not wired up yet.
    async fn probe(&self) -> bool {
        self.client.head(&self.probe_url).send().await.is_ok()
    }
}

static GLOBAL_LOADER: OnceLock<Arc<ScriptLoader>> = OnceLock::new();

/// The process-wide loader. First caller's config wins; later configs are
/// ignored, which matches "the script is injected once per page".
pub fn global(config: &CulqiConfig) -> Arc<ScriptLoader> {
    GLOBAL_LOADER
        .get_or_init(|| Arc::new(ScriptLoader::new(config)))
        .clone()
}
