//! Structured replies expected from JSON-mode phases. Every field defaults so
//! partial replies deserialize; `Payload::check` rejects unusable ones.

use serde::{Deserialize, Serialize};

pub trait Payload {
    fn check(&self) -> Result<(), String>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct RoutePayload {
    pub name: String,
    pub hook: String,
    pub mechanic: String,
    pub prize: Option<String>,
    pub rationale: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeaRoutesPayload {
    pub summary: String,
    pub routes: Vec<RoutePayload>,
}

impl Payload for IdeaRoutesPayload {
    fn check(&self) -> Result<(), String> {
        if self.routes.is_empty() {
            return Err("no routes returned".to_string());
        }
        if let Some(i) = self.routes.iter().position(|r| r.name.trim().is_empty()) {
            return Err(format!("routes[{i}] has no name"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct ScoreItem {
    pub criterion: String,
    pub score: f64,
    pub comment: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationPayload {
    pub summary: String,
    pub scores: Vec<ScoreItem>,
    pub overall: Option<f64>,
    pub risks: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Payload for EvaluationPayload {
    fn check(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() && self.scores.is_empty() {
            return Err("evaluation has neither summary nor scores".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategistPayload {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub risks: Vec<String>,
}

impl Payload for StrategistPayload {
    fn check(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("strategist summary is empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgePayload {
    pub winner: String,
    pub verdict: String,
    pub ranking: Vec<String>,
}

impl Payload for JudgePayload {
    fn check(&self) -> Result<(), String> {
        if self.verdict.trim().is_empty() {
            return Err("judge verdict is empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgePayload {
    pub summary: String,
    pub facts: Vec<String>,
}

impl Payload for KnowledgePayload {
    fn check(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("knowledge summary is empty".to_string());
        }
        Ok(())
    }
}
