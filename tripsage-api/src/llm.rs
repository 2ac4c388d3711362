use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use tripsage_core::summary::{BudgetBreakdown, ItineraryDay, Place, SummaryContent};
use tripsage_store::app_config::LlmConfig;

#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub destination: String,
    pub days: u32,
    pub budget: Option<f64>,
    pub interests: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("llm request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected llm response: {0}")]
    BadResponse(String),
}

/// Trip-summary generation capability. The network-backed implementation
/// may fail; the handler substitutes [`fallback_content`] and tags the
/// response so clients know the data is synthetic.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn generate(&self, req: &SummaryRequest) -> Result<SummaryContent, GeneratorError>;
}

/// Calls an OpenAI-compatible chat-completions endpoint and expects the
/// model to answer with a single JSON object matching [`SummaryContent`].
pub struct HttpSummaryGenerator {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpSummaryGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn prompt(req: &SummaryRequest) -> String {
        let mut prompt = format!(
            "Plan a {}-day trip to {}. Respond with a single JSON object with keys \
             summary_text (string), places (array of {{name, description}}), \
             budget ({{lodging, food, activities, transport}} as daily numbers), \
             and itinerary (array of {{day, title, activities}}).",
            req.days, req.destination
        );
        if let Some(budget) = req.budget {
            prompt.push_str(&format!(" The total budget is {:.0}.", budget));
        }
        if !req.interests.is_empty() {
            prompt.push_str(&format!(
                " The traveler is interested in: {}.",
                req.interests.join(", ")
            ));
        }
        prompt
    }
}

#[async_trait]
impl SummaryGenerator for HttpSummaryGenerator {
    async fn generate(&self, req: &SummaryRequest) -> Result<SummaryContent, GeneratorError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": Self::prompt(req) }
            ],
            "response_format": { "type": "json_object" },
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| GeneratorError::BadResponse("missing message content".to_string()))?;

        serde_json::from_str(content)
            .map_err(|e| GeneratorError::BadResponse(format!("content is not valid JSON: {}", e)))
    }
}

/// Deterministic generator used when no LLM is configured. Also the
/// source of the degraded payload when the network-backed generator
/// fails mid-request.
pub struct FallbackSummaryGenerator;

#[async_trait]
impl SummaryGenerator for FallbackSummaryGenerator {
    async fn generate(&self, req: &SummaryRequest) -> Result<SummaryContent, GeneratorError> {
        Ok(fallback_content(req))
    }
}

pub fn fallback_content(req: &SummaryRequest) -> SummaryContent {
    let daily = req.budget.map(|b| b / req.days as f64).unwrap_or(150.0);
    let itinerary = (1..=req.days)
        .map(|day| ItineraryDay {
            day,
            title: format!("Day {} in {}", day, req.destination),
            activities: vec![
                "Morning: explore the old town on foot".to_string(),
                "Afternoon: visit a local museum or market".to_string(),
                "Evening: dinner at a neighborhood restaurant".to_string(),
            ],
        })
        .collect();

    SummaryContent {
        summary_text: format!(
            "{} over {} days: a walkable mix of landmarks, local food, and \
             unhurried neighborhood time.",
            req.destination, req.days
        ),
        places: vec![
            Place {
                name: format!("{} historic center", req.destination),
                description: "The usual starting point: main squares, markets, and \
                              street life within walking distance."
                    .to_string(),
            },
            Place {
                name: "City viewpoint".to_string(),
                description: "A lookout over the city, best around sunset.".to_string(),
            },
        ],
        budget: BudgetBreakdown {
            lodging: daily * 0.5,
            food: daily * 0.25,
            activities: daily * 0.15,
            transport: daily * 0.1,
        },
        itinerary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fallback_generator_is_deterministic() {
        let req = SummaryRequest {
            destination: "Lisbon".to_string(),
            days: 3,
            budget: Some(600.0),
            interests: vec![],
        };
        let a = FallbackSummaryGenerator.generate(&req).await.unwrap();
        let b = FallbackSummaryGenerator.generate(&req).await.unwrap();

        assert_eq!(a.itinerary.len(), 3);
        assert_eq!(a.summary_text, b.summary_text);
        assert!(a.summary_text.contains("Lisbon"));
        // Daily budget splits the total across days.
        assert!((a.budget.lodging - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prompt_mentions_constraints() {
        let req = SummaryRequest {
            destination: "Kyoto".to_string(),
            days: 5,
            budget: Some(2000.0),
            interests: vec!["temples".to_string(), "food".to_string()],
        };
        let prompt = HttpSummaryGenerator::prompt(&req);
        assert!(prompt.contains("Kyoto"));
        assert!(prompt.contains("5-day"));
        assert!(prompt.contains("2000"));
        assert!(prompt.contains("temples"));
    }
}
