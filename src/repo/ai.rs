//! AI assistant reads. Answers are expensive to compute, so they are cached longer than
//! anything else.

use super::Repository;
use crate::api::ai;
use crate::cache::{QueryKey, QueryResult, AI_ANALYSIS_TTL, AI_SUGGESTIONS_TTL};
use crate::errors::ClientError;
use crate::models::{
    AiQaRequest, AiQaResponse, AiSuggestion, AiSuggestionParams, CostOptimization, ResourceKind,
    SeasonQuery, YieldPrediction,
};

impl Repository {
    // ==================== AI OPERATIONS ====================

    pub async fn ai_suggestions(&self, params: &AiSuggestionParams) -> QueryResult<Vec<AiSuggestion>> {
        let key = QueryKey::all(ResourceKind::Ai)
            .push("suggestions")
            .with_params(params);
        self.read(key, AI_SUGGESTIONS_TTL, || ai::suggestions(&self.api, params))
            .await
    }

    pub async fn predict_yield(&self, params: &SeasonQuery) -> QueryResult<YieldPrediction> {
        let key = QueryKey::all(ResourceKind::Ai)
            .push("predict-yield")
            .with_params(params);
        self.read(key, AI_ANALYSIS_TTL, || ai::predict_yield(&self.api, params))
            .await
    }

    pub async fn optimize_cost(&self, params: &SeasonQuery) -> QueryResult<CostOptimization> {
        let key = QueryKey::all(ResourceKind::Ai)
            .push("optimize-cost")
            .with_params(params);
        self.read(key, AI_ANALYSIS_TTL, || ai::optimize_cost(&self.api, params))
            .await
    }

    /// Ask the assistant. Answers are not cached.
    pub async fn ask(&self, request: &AiQaRequest) -> Result<AiQaResponse, ClientError> {
        ai::ask(&self.api, request).await
    }
}
