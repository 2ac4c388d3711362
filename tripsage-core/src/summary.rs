use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An AI-generated trip summary, cached for sharing. Never mutated after
/// creation; resolvable by internal id or the public share id.
#[derive(Debug, Clone, Serialize)]
pub struct TripSummary {
    pub id: Uuid,
    pub share_id: String,
    pub user_id: Option<Uuid>,
    pub destination: String,
    pub content: SummaryContent,
    pub is_fallback_data: bool,
    pub created_at: DateTime<Utc>,
}

impl TripSummary {
    pub fn new(
        user_id: Option<Uuid>,
        destination: String,
        content: SummaryContent,
        is_fallback_data: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            share_id: new_share_id(),
            user_id,
            destination,
            content,
            is_fallback_data,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryContent {
    pub summary_text: String,
    pub places: Vec<Place>,
    pub budget: BudgetBreakdown,
    pub itinerary: Vec<ItineraryDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub description: String,
}

/// Estimated daily spend, per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub lodging: f64,
    pub food: f64,
    pub activities: f64,
    pub transport: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u32,
    pub title: String,
    pub activities: Vec<String>,
}

/// Public opaque identifier, distinct from the internal id.
pub fn new_share_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_id_shape() {
        let a = new_share_id();
        let b = new_share_id();
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
