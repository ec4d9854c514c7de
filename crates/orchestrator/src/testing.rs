//! Test doubles shared by the runner tests.

use async_trait::async_trait;
use db::{create_pool, run_migrations, BriefRepository, CampaignRepository};
use llm::{ChatModel, ChatRequest, LlmError, LlmResult};
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Mutex;
use trudy_core::{Brief, Campaign};

pub async fn setup_test_db() -> SqlitePool {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

pub async fn seed_briefed_campaign(pool: &SqlitePool, parsed: Value) -> Campaign {
    let campaign = CampaignRepository::new(pool.clone())
        .create(&Campaign::new("Summer Sizzle", "Grant Burge").with_market("AU"))
        .await
        .unwrap();
    BriefRepository::new(pool.clone())
        .upsert(&Brief::new(campaign.id, "Drive rosé sales over summer.", parsed))
        .await
        .unwrap();
    campaign
}

/// Replies by the `runner` metadata key of each request.
#[derive(Default)]
pub struct ScriptedModel {
    replies: HashMap<String, Result<String, String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, runner: &str, reply: &str) -> Self {
        self.replies.insert(runner.to_string(), Ok(reply.to_string()));
        self
    }

    pub fn fail(mut self, runner: &str, message: &str) -> Self {
        self.replies
            .insert(runner.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self, runner: &str) -> Option<ChatRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| runner_of(r) == runner)
            .cloned()
    }
}

fn runner_of(request: &ChatRequest) -> &str {
    request
        .metadata
        .get("runner")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: ChatRequest) -> LlmResult<String> {
        let runner = runner_of(&request).to_string();
        self.requests.lock().unwrap().push(request);

        match self.replies.get(&runner) {
            Some(Ok(reply)) => Ok(reply.clone()),
            Some(Err(message)) => Err(LlmError::Api {
                message: message.clone(),
                status_code: Some(500),
            }),
            None => Err(LlmError::Api {
                message: format!("no scripted reply for runner '{runner}'"),
                status_code: None,
            }),
        }
    }
}
