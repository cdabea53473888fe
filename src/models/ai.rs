//! AI assistant payloads. The backend proxies these; nothing is computed locally.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SuggestionPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AiSuggestion {
    pub category: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<SuggestionPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actionable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestionParams {
    #[validate(range(min = 1, message = "Season ID is required"))]
    pub season_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Query for the per-season AI endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeasonQuery {
    #[validate(range(min = 1, message = "Season ID is required"))]
    pub season_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct YieldPrediction {
    pub season_id: i64,
    pub predicted_yield_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub confidence_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factors: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRecommendation {
    pub category: String,
    pub description: String,
    pub potential_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CostOptimization {
    pub season_id: i64,
    pub current_cost: f64,
    pub suggested_savings: f64,
    pub recommendations: Vec<CostRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AiQaRequest {
    #[validate(length(min = 1, message = "Question is required"))]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AiQaResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prediction_confidence_bounds() {
        let prediction: YieldPrediction = serde_json::from_value(json!({
            "seasonId": 1,
            "predictedYieldKg": 5200.0,
            "confidencePercent": 140.0
        }))
        .unwrap();
        assert!(prediction.validate().is_err());
    }

    #[test]
    fn test_empty_question_rejected() {
        let request = AiQaRequest {
            question: String::new(),
            context: None,
        };
        assert!(request.validate().is_err());
    }
}
