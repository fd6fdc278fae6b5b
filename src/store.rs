//! Preference store
//!
//! The explicitly constructed context object owning the reader's current
//! preference set and derived description. Components receive the store by
//! reference and observe state through watch-channel snapshots; the
//! personalization intent is a typed generation signal on its own channel,
//! not a global event.
//!
//! All mutating operations are single-flight: while one is in flight, the
//! others observe `Busy` and change nothing.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::cache::PageCache;
use crate::client::ServiceClient;
use crate::preferences::PreferenceSet;

mod storage;

pub use storage::{preferences_path, PersistedPreferences};

/// Description sentinel while a describe call is in flight.
pub const LOADING_DESCRIPTION: &str = "loading...";

/// Description sentinel after a failed operation.
pub const ERROR_DESCRIPTION: &str = "(error)";

/// Point-in-time view of the store, delivered to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub preferences: PreferenceSet,
    pub description: String,
    pub error: Option<String>,
    pub busy: bool,
}

impl StoreSnapshot {
    pub fn has_wishes(&self) -> bool {
        self.preferences.has_wishes()
    }
}

/// Observable outcome of a mutating store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The operation ran and the state changed.
    Applied,
    /// Nothing differed from the current state; no call was made.
    Unchanged,
    /// Another operation was in flight; nothing happened.
    Busy,
    /// The operation ran but the remote call failed; the error is recorded.
    Failed,
}

pub struct PreferenceStore {
    client: ServiceClient,
    cache: Arc<PageCache>,
    path: Option<PathBuf>,
    state: Mutex<StoreSnapshot>,
    changes: watch::Sender<StoreSnapshot>,
    personalize: watch::Sender<u64>,
}

impl PreferenceStore {
    /// Create a store persisting to `path` (None disables persistence).
    ///
    /// Previously persisted preferences are loaded immediately.
    pub fn new(client: ServiceClient, cache: Arc<PageCache>, path: Option<PathBuf>) -> Self {
        let persisted = path
            .as_deref()
            .map(storage::load_preferences)
            .unwrap_or_default();

        let initial = StoreSnapshot {
            preferences: persisted.preferences,
            description: persisted.description,
            error: None,
            busy: false,
        };

        let (changes, _) = watch::channel(initial.clone());
        let (personalize, _) = watch::channel(0);

        PreferenceStore {
            client,
            cache,
            path,
            state: Mutex::new(initial),
            changes,
            personalize,
        }
    }

    /// Create a store persisting to the default user data location.
    pub fn with_default_storage(client: ServiceClient, cache: Arc<PageCache>) -> Self {
        PreferenceStore::new(client, cache, storage::preferences_path())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.lock().unwrap().clone()
    }

    /// Observe state snapshots; the receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.changes.subscribe()
    }

    /// Observe personalization requests as a monotonically increasing
    /// generation.
    pub fn subscribe_personalization(&self) -> watch::Receiver<u64> {
        self.personalize.subscribe()
    }

    /// Replace tags + free text and refresh the derived description.
    ///
    /// A no-op when nothing changed or another operation is in flight. The
    /// new preferences are kept even when the describe call fails; persisted
    /// state is only rewritten on success, so the last good state survives a
    /// transport failure.
    pub async fn update(&self, tags: BTreeSet<String>, free_text: String) -> StoreOutcome {
        {
            let mut state = self.state.lock().unwrap();
            if state.busy {
                return StoreOutcome::Busy;
            }
            if state.preferences.selected_tags == tags && state.preferences.free_text == free_text {
                return StoreOutcome::Unchanged;
            }

            state.busy = true;
            state.error = None;
            state.preferences.selected_tags = tags.clone();
            state.preferences.free_text = free_text.clone();
            state.description = LOADING_DESCRIPTION.to_string();
            self.changes.send_replace(state.clone());
        }

        let outcome = self.client.fetch_user_description(&tags, &free_text).await;

        let mut state = self.state.lock().unwrap();
        state.busy = false;
        let result = match outcome.error {
            None => {
                state.description = outcome.text;
                state.error = None;
                StoreOutcome::Applied
            }
            Some(message) => {
                state.description = ERROR_DESCRIPTION.to_string();
                state.error = Some(message);
                StoreOutcome::Failed
            }
        };

        let persisted = (result == StoreOutcome::Applied).then(|| PersistedPreferences {
            preferences: state.preferences.clone(),
            description: state.description.clone(),
        });
        self.changes.send_replace(state.clone());
        drop(state);

        if let Some(persisted) = persisted {
            self.persist(&persisted);
        }
        result
    }

    /// Ask the service for a recommendation and merge it into the store.
    ///
    /// On failure the prior preferences stay intact; only the error and the
    /// description sentinel change.
    pub async fn fetch_recommendation(&self) -> StoreOutcome {
        let (tags, free_text) = {
            let mut state = self.state.lock().unwrap();
            if state.busy {
                return StoreOutcome::Busy;
            }
            state.busy = true;
            state.error = None;
            state.description = LOADING_DESCRIPTION.to_string();
            self.changes.send_replace(state.clone());
            (
                state.preferences.selected_tags.clone(),
                state.preferences.free_text.clone(),
            )
        };

        let result = self.client.fetch_personalization(&tags, &free_text).await;

        let mut state = self.state.lock().unwrap();
        state.busy = false;
        let outcome = match result {
            Ok(response) => {
                let recommendation = response.recommendations;
                state.preferences.selected_tags =
                    recommendation.selected_options.into_iter().collect();
                state.preferences.free_text = recommendation.custom_prompt;
                if let Some(content) = recommendation.content_preferences {
                    state.preferences.content = content;
                }
                if let Some(visual) = recommendation.visual_preferences {
                    state.preferences.visual = visual;
                }
                state.description = recommendation.user_description;
                state.error = None;
                StoreOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "recommendation fetch failed");
                state.description = ERROR_DESCRIPTION.to_string();
                state.error = Some(e.to_string());
                StoreOutcome::Failed
            }
        };

        let persisted = (outcome == StoreOutcome::Applied).then(|| PersistedPreferences {
            preferences: state.preferences.clone(),
            description: state.description.clone(),
        });
        self.changes.send_replace(state.clone());
        drop(state);

        if let Some(persisted) = persisted {
            self.persist(&persisted);
        }
        outcome
    }

    /// Clear preferences, description, cached pages, and persisted state.
    /// Idempotent.
    pub fn reset(&self) -> StoreOutcome {
        {
            let mut state = self.state.lock().unwrap();
            if state.busy {
                return StoreOutcome::Busy;
            }
            *state = StoreSnapshot::default();
            self.changes.send_replace(state.clone());
        }

        self.cache.clear();
        if let Some(path) = &self.path {
            if let Err(e) = storage::clear_preferences(path) {
                tracing::warn!(error = %e, "failed to clear persisted preferences");
            }
        }
        StoreOutcome::Applied
    }

    /// Broadcast the intent to personalize the current page.
    ///
    /// Guarded by `has_wishes`; returns the generation that was broadcast,
    /// or None when there is nothing to personalize.
    pub fn request_personalization(&self) -> Option<u64> {
        let state = self.state.lock().unwrap();
        if !state.preferences.has_wishes() {
            return None;
        }

        let mut generation = 0;
        self.personalize.send_modify(|g| {
            *g += 1;
            generation = *g;
        });
        drop(state);
        Some(generation)
    }

    fn persist(&self, persisted: &PersistedPreferences) {
        if let Some(path) = &self.path {
            if let Err(e) = storage::save_preferences(path, persisted) {
                tracing::warn!(error = %e, "failed to persist preferences");
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
