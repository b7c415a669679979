pub mod pivotal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, instrument};

use crate::base::{
    output,
    types::{Res, StoryState},
};

// Traits.

/// Generic project tracker trait that clients must implement.
///
/// Work items are returned as opaque JSON values; the assistant never inspects
/// their fields, it only serializes them into the transcript.
#[async_trait]
pub trait GenericTrackerClient: Send + Sync + 'static {
    /// Fetch the work items of the configured project that are in `state`.
    async fn get_stories(&self, state: StoryState) -> Res<Vec<Value>>;
}

// Structs.

/// Tracker client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TrackerClient {
    inner: Arc<dyn GenericTrackerClient>,
}

impl Deref for TrackerClient {
    type Target = dyn GenericTrackerClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TrackerClient {
    pub fn new(inner: Arc<dyn GenericTrackerClient>) -> Self {
        Self { inner }
    }

    /// Fetch work items, degrading any failure to an empty list.
    ///
    /// Callers cannot tell a failed fetch from a project with no matching items.
    #[instrument(name = "TrackerClient::stories_or_empty", skip(self))]
    pub async fn stories_or_empty(&self, state: StoryState) -> Vec<Value> {
        output::progress(&format!("get_pivotal_data:{state}"));

        match self.get_stories(state).await {
            Ok(stories) => stories,
            Err(err) => {
                error!("Error fetching Pivotal data: {err:#}");
                Vec::new()
            }
        }
    }
}
