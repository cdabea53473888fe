//! Seasons and the records kept under them: tasks, harvests, expenses, field logs and
//! incidents.

use serde_json::json;

use super::{draft, patch, Repository};
use crate::api::{expenses, field_logs, harvests, incidents, seasons, tasks};
use crate::cache::{QueryKey, QueryResult, DEFAULT_TTL};
use crate::errors::ClientError;
use crate::models::{
    DateRangeParams, Expense, ExpenseListParams, ExpenseRequest, FieldLog, FieldLogListParams,
    FieldLogRequest, Harvest, HarvestRequest, Incident, IncidentCreateRequest,
    IncidentUpdateRequest, Page, ResourceKind, Season, SeasonCreateRequest, SeasonDetail,
    SeasonListParams, SeasonStatusUpdateRequest, SeasonUpdateRequest, Task, TaskListParams,
    TaskRequest, TaskStatusUpdateRequest,
};
use crate::mutation::{run_optimistic, CreateInLists, RemoveFromLists, UpdateInPlace};

const SEASON_FIELD: &str = "seasonId";

fn in_season(kind: ResourceKind, season_id: i64) -> QueryKey {
    QueryKey::scoped_lists(kind, ResourceKind::Season, season_id)
}

impl Repository {
    // ==================== SEASON OPERATIONS ====================

    pub async fn list_seasons(&self, params: &SeasonListParams) -> QueryResult<Page<Season>> {
        let key = QueryKey::list(ResourceKind::Season, params);
        self.read(key, DEFAULT_TTL, || seasons::list_seasons(&self.api, params))
            .await
    }

    pub async fn get_season(&self, id: i64) -> QueryResult<SeasonDetail> {
        self.read_detail(id, || seasons::get_season(&self.api, id)).await
    }

    pub async fn create_season(
        &self,
        request: &SeasonCreateRequest,
    ) -> Result<SeasonDetail, ClientError> {
        let update = CreateInLists::new(ResourceKind::Season, draft(request, None)?);
        run_optimistic(&self.cache, &update, seasons::create_season(&self.api, request)).await
    }

    pub async fn update_season(
        &self,
        id: i64,
        request: &SeasonUpdateRequest,
    ) -> Result<SeasonDetail, ClientError> {
        let update = UpdateInPlace::new(ResourceKind::Season, id, patch(request)?);
        run_optimistic(
            &self.cache,
            &update,
            seasons::update_season(&self.api, id, request),
        )
        .await
    }

    /// Change a season's status. Only the status is applied speculatively; the actual
    /// dates are whatever the backend records.
    pub async fn update_season_status(
        &self,
        id: i64,
        request: &SeasonStatusUpdateRequest,
    ) -> Result<SeasonDetail, ClientError> {
        let update = UpdateInPlace::new(
            ResourceKind::Season,
            id,
            json!({ "status": request.status.as_str() }),
        );
        run_optimistic(
            &self.cache,
            &update,
            seasons::update_season_status(&self.api, id, request),
        )
        .await
    }

    pub async fn delete_season(&self, id: i64) -> Result<(), ClientError> {
        let update = RemoveFromLists::new(ResourceKind::Season, id);
        run_optimistic(&self.cache, &update, seasons::delete_season(&self.api, id)).await
    }

    // ==================== TASK OPERATIONS ====================

    pub async fn list_tasks(&self, season_id: i64, params: &TaskListParams) -> QueryResult<Page<Task>> {
        let key = in_season(ResourceKind::Task, season_id).with_params(params);
        self.read(key, DEFAULT_TTL, || tasks::list_tasks(&self.api, season_id, params))
            .await
    }

    pub async fn get_task(&self, id: i64) -> QueryResult<Task> {
        self.read_detail(id, || tasks::get_task(&self.api, id)).await
    }

    pub async fn create_task(&self, season_id: i64, request: &TaskRequest) -> Result<Task, ClientError> {
        let update = CreateInLists::new(
            ResourceKind::Task,
            draft(request, Some((SEASON_FIELD, season_id)))?,
        )
        .scoped(in_season(ResourceKind::Task, season_id));
        run_optimistic(
            &self.cache,
            &update,
            tasks::create_task(&self.api, season_id, request),
        )
        .await
    }

    pub async fn update_task(&self, id: i64, request: &TaskRequest) -> Result<Task, ClientError> {
        let update = UpdateInPlace::new(ResourceKind::Task, id, patch(request)?);
        run_optimistic(&self.cache, &update, tasks::update_task(&self.api, id, request)).await
    }

    pub async fn update_task_status(
        &self,
        id: i64,
        request: &TaskStatusUpdateRequest,
    ) -> Result<Task, ClientError> {
        let update = UpdateInPlace::new(ResourceKind::Task, id, patch(request)?);
        run_optimistic(
            &self.cache,
            &update,
            tasks::update_task_status(&self.api, id, request),
        )
        .await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        let update = RemoveFromLists::new(ResourceKind::Task, id);
        run_optimistic(&self.cache, &update, tasks::delete_task(&self.api, id)).await
    }

    // ==================== HARVEST OPERATIONS ====================

    pub async fn list_harvests(
        &self,
        season_id: i64,
        params: &DateRangeParams,
    ) -> QueryResult<Page<Harvest>> {
        let key = in_season(ResourceKind::Harvest, season_id).with_params(params);
        self.read(key, DEFAULT_TTL, || {
            harvests::list_harvests(&self.api, season_id, params)
        })
        .await
    }

    pub async fn get_harvest(&self, id: i64) -> QueryResult<Harvest> {
        self.read_detail(id, || harvests::get_harvest(&self.api, id)).await
    }

    /// Record a harvest. The season detail is refreshed afterwards since it carries the
    /// actual yield.
    pub async fn create_harvest(
        &self,
        season_id: i64,
        request: &HarvestRequest,
    ) -> Result<Harvest, ClientError> {
        let update = CreateInLists::new(
            ResourceKind::Harvest,
            draft(request, Some((SEASON_FIELD, season_id)))?,
        )
        .scoped(in_season(ResourceKind::Harvest, season_id))
        .also_invalidate(QueryKey::detail(ResourceKind::Season, season_id));
        run_optimistic(
            &self.cache,
            &update,
            harvests::create_harvest(&self.api, season_id, request),
        )
        .await
    }

    pub async fn update_harvest(
        &self,
        id: i64,
        request: &HarvestRequest,
    ) -> Result<Harvest, ClientError> {
        let update = UpdateInPlace::new(ResourceKind::Harvest, id, patch(request)?)
            .also_invalidate(QueryKey::details(ResourceKind::Season));
        run_optimistic(
            &self.cache,
            &update,
            harvests::update_harvest(&self.api, id, request),
        )
        .await
    }

    pub async fn delete_harvest(&self, id: i64) -> Result<(), ClientError> {
        let update = RemoveFromLists::new(ResourceKind::Harvest, id)
            .also_invalidate(QueryKey::details(ResourceKind::Season));
        run_optimistic(&self.cache, &update, harvests::delete_harvest(&self.api, id)).await
    }

    // ==================== EXPENSE OPERATIONS ====================

    pub async fn list_expenses(
        &self,
        season_id: i64,
        params: &ExpenseListParams,
    ) -> QueryResult<Page<Expense>> {
        let key = in_season(ResourceKind::Expense, season_id).with_params(params);
        self.read(key, DEFAULT_TTL, || {
            expenses::list_expenses(&self.api, season_id, params)
        })
        .await
    }

    pub async fn get_expense(&self, id: i64) -> QueryResult<Expense> {
        self.read_detail(id, || expenses::get_expense(&self.api, id)).await
    }

    pub async fn create_expense(
        &self,
        season_id: i64,
        request: &ExpenseRequest,
    ) -> Result<Expense, ClientError> {
        let update = CreateInLists::new(
            ResourceKind::Expense,
            draft(request, Some((SEASON_FIELD, season_id)))?,
        )
        .scoped(in_season(ResourceKind::Expense, season_id));
        run_optimistic(
            &self.cache,
            &update,
            expenses::create_expense(&self.api, season_id, request),
        )
        .await
    }

    pub async fn update_expense(
        &self,
        id: i64,
        request: &ExpenseRequest,
    ) -> Result<Expense, ClientError> {
        let update = UpdateInPlace::new(ResourceKind::Expense, id, patch(request)?);
        run_optimistic(
            &self.cache,
            &update,
            expenses::update_expense(&self.api, id, request),
        )
        .await
    }

    pub async fn delete_expense(&self, id: i64) -> Result<(), ClientError> {
        let update = RemoveFromLists::new(ResourceKind::Expense, id);
        run_optimistic(&self.cache, &update, expenses::delete_expense(&self.api, id)).await
    }

    // ==================== FIELD LOG OPERATIONS ====================

    pub async fn list_field_logs(
        &self,
        season_id: i64,
        params: &FieldLogListParams,
    ) -> QueryResult<Page<FieldLog>> {
        let key = in_season(ResourceKind::FieldLog, season_id).with_params(params);
        self.read(key, DEFAULT_TTL, || {
            field_logs::list_field_logs(&self.api, season_id, params)
        })
        .await
    }

    pub async fn get_field_log(&self, id: i64) -> QueryResult<FieldLog> {
        self.read_detail(id, || field_logs::get_field_log(&self.api, id)).await
    }

    pub async fn create_field_log(
        &self,
        season_id: i64,
        request: &FieldLogRequest,
    ) -> Result<FieldLog, ClientError> {
        let update = CreateInLists::new(
            ResourceKind::FieldLog,
            draft(request, Some((SEASON_FIELD, season_id)))?,
        )
        .scoped(in_season(ResourceKind::FieldLog, season_id));
        run_optimistic(
            &self.cache,
            &update,
            field_logs::create_field_log(&self.api, season_id, request),
        )
        .await
    }

    pub async fn update_field_log(
        &self,
        id: i64,
        request: &FieldLogRequest,
    ) -> Result<FieldLog, ClientError> {
        let update = UpdateInPlace::new(ResourceKind::FieldLog, id, patch(request)?);
        run_optimistic(
            &self.cache,
            &update,
            field_logs::update_field_log(&self.api, id, request),
        )
        .await
    }

    pub async fn delete_field_log(&self, id: i64) -> Result<(), ClientError> {
        let update = RemoveFromLists::new(ResourceKind::FieldLog, id);
        run_optimistic(
            &self.cache,
            &update,
            field_logs::delete_field_log(&self.api, id),
        )
        .await
    }

    // ==================== INCIDENT OPERATIONS ====================

    pub async fn list_incidents(&self, season_id: i64) -> QueryResult<Vec<Incident>> {
        let key = in_season(ResourceKind::Incident, season_id).push("all");
        self.read(Ok(key), DEFAULT_TTL, || {
            incidents::list_incidents(&self.api, season_id)
        })
        .await
    }

    pub async fn create_incident(
        &self,
        season_id: i64,
        request: &IncidentCreateRequest,
    ) -> Result<Incident, ClientError> {
        let update = CreateInLists::new(
            ResourceKind::Incident,
            draft(request, Some((SEASON_FIELD, season_id)))?,
        )
        .scoped(in_season(ResourceKind::Incident, season_id));
        run_optimistic(
            &self.cache,
            &update,
            incidents::create_incident(&self.api, season_id, request),
        )
        .await
    }

    pub async fn update_incident(
        &self,
        id: i64,
        request: &IncidentUpdateRequest,
    ) -> Result<Incident, ClientError> {
        let update = UpdateInPlace::new(ResourceKind::Incident, id, patch(request)?);
        run_optimistic(
            &self.cache,
            &update,
            incidents::update_incident(&self.api, id, request),
        )
        .await
    }

    pub async fn delete_incident(&self, id: i64) -> Result<(), ClientError> {
        let update = RemoveFromLists::new(ResourceKind::Incident, id);
        run_optimistic(
            &self.cache,
            &update,
            incidents::delete_incident(&self.api, id),
        )
        .await
    }
}
