use serde::{Deserialize, Serialize};

use super::alumni::AlumnusSummary;

pub const NOT_ENOUGH_DATA: &str = "not enough data for recommendations";
pub const RECOMMENDATIONS_UNAVAILABLE: &str = "could not generate recommendations";

/// Recommended connections for one alumnus, most similar first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub alumni_id: i64,
    pub recommendations: Vec<AlumnusSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecommendationResponse {
    pub fn ranked(alumni_id: i64, recommendations: Vec<AlumnusSummary>) -> Self {
        Self {
            alumni_id,
            recommendations,
            message: None,
        }
    }

    /// Empty result with an explanation for the user.
    pub fn empty(alumni_id: i64, message: &str) -> Self {
        Self {
            alumni_id,
            recommendations: Vec::new(),
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_omitted_when_absent() {
        let json = serde_json::to_value(RecommendationResponse::ranked(1, Vec::new())).unwrap();
        assert!(json.get("message").is_none());
        assert_eq!(json["alumni_id"], 1);
    }

    #[test]
    fn empty_response_carries_message() {
        let response = RecommendationResponse::empty(3, NOT_ENOUGH_DATA);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], NOT_ENOUGH_DATA);
        assert_eq!(json["recommendations"].as_array().unwrap().len(), 0);
    }
}
