//! Pivotal Tracker REST client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{Res, StoryState},
};

use super::{GenericTrackerClient, TrackerClient};

/// Header carrying the Pivotal Tracker API token.
pub const TOKEN_HEADER: &str = "X-TrackerToken";

impl TrackerClient {
    pub fn pivotal(config: &Config) -> Res<Self> {
        let client = PivotalTrackerClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

/// Pivotal Tracker client implementation.
#[derive(Clone)]
pub struct PivotalTrackerClient {
    client: Client,
    api_base: String,
    project_id: String,
    token: String,
}

impl PivotalTrackerClient {
    #[instrument(name = "PivotalTrackerClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            api_base: config.pivotal_api_base.trim_end_matches('/').to_string(),
            project_id: config.pivotal_project_id.clone(),
            token: config.pivotal_token.clone(),
        })
    }

    fn stories_url(&self) -> String {
        format!("{}/projects/{}/stories", self.api_base, self.project_id)
    }
}

#[async_trait]
impl GenericTrackerClient for PivotalTrackerClient {
    #[instrument(name = "PivotalTrackerClient::get_stories", skip(self))]
    async fn get_stories(&self, state: StoryState) -> Res<Vec<Value>> {
        let stories: Vec<Value> = self
            .client
            .get(self.stories_url())
            .query(&[("with_state", state.as_str())])
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Fetched {} `{state}` stories", stories.len());

        Ok(stories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::config::ConfigInner;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    fn create_test_config(api_base: &str) -> Config {
        Config {
            inner: Arc::new(ConfigInner {
                pivotal_token: "pt-test".to_string(),
                pivotal_project_id: "99".to_string(),
                pivotal_api_base: api_base.to_string(),
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_get_stories_filters_by_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/99/stories"))
            .and(query_param("with_state", "unstarted"))
            .and(header(TOKEN_HEADER, "pt-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "Write docs" }, { "name": "Ship it" }])))
            .expect(1)
            .mount(&server)
            .await;

        let tracker = TrackerClient::pivotal(&create_test_config(&server.uri())).unwrap();

        let stories = tracker.get_stories(StoryState::Unstarted).await.unwrap();

        assert_eq!(stories, vec![json!({ "name": "Write docs" }), json!({ "name": "Ship it" })]);
    }

    #[tokio::test]
    async fn test_non_success_status_degrades_to_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET")).respond_with(ResponseTemplate::new(403).set_body_json(json!({ "code": "unauthorized" }))).mount(&server).await;

        let tracker = TrackerClient::pivotal(&create_test_config(&server.uri())).unwrap();

        assert!(tracker.get_stories(StoryState::Started).await.is_err());
        assert!(tracker.stories_or_empty(StoryState::Started).await.is_empty());
    }

    #[tokio::test]
    async fn test_non_array_body_degrades_to_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET")).respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "error" }))).mount(&server).await;

        let tracker = TrackerClient::pivotal(&create_test_config(&server.uri())).unwrap();

        assert!(tracker.stories_or_empty(StoryState::Started).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_tracker_degrades_to_empty() {
        let tracker = TrackerClient::pivotal(&create_test_config("http://127.0.0.1:9")).unwrap();

        assert!(tracker.stories_or_empty(StoryState::Unstarted).await.is_empty());
    }
}
