//! AI assistant endpoints.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{
    AiQaRequest, AiQaResponse, AiSuggestion, AiSuggestionParams, CostOptimization, SeasonQuery,
    YieldPrediction,
};

/// GET /api/v1/farmer/ai/suggestions - Suggestions for a season.
pub async fn suggestions(
    client: &ApiClient,
    params: &AiSuggestionParams,
) -> Result<Vec<AiSuggestion>, ClientError> {
    client.get_list_with("/farmer/ai/suggestions", params).await
}

/// GET /api/v1/farmer/ai/predict-yield - Yield prediction for a season.
pub async fn predict_yield(
    client: &ApiClient,
    params: &SeasonQuery,
) -> Result<YieldPrediction, ClientError> {
    client.get_with("/farmer/ai/predict-yield", params).await
}

/// GET /api/v1/farmer/ai/optimize-cost - Cost savings for a season.
pub async fn optimize_cost(
    client: &ApiClient,
    params: &SeasonQuery,
) -> Result<CostOptimization, ClientError> {
    client.get_with("/farmer/ai/optimize-cost", params).await
}

/// GET /api/v1/ai/qa - Ask the assistant a question.
pub async fn ask(client: &ApiClient, request: &AiQaRequest) -> Result<AiQaResponse, ClientError> {
    client.get_with("/ai/qa", request).await
}
