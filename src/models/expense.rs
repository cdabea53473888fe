//! Expense model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{PageParams, Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[validate(range(min = 1))]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[validate(length(max = 255))]
    pub item_name: String,
    #[validate(range(exclusive_min = 0.0))]
    pub unit_price: f64,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    pub expense_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Resource for Expense {
    const KIND: ResourceKind = ResourceKind::Expense;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    #[serde(flatten)]
    #[validate(nested)]
    pub paging: PageParams,
}

/// Request to create or update an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    #[validate(length(min = 1, max = 255, message = "Item name is required"))]
    pub item_name: String,
    #[validate(range(exclusive_min = 0.0, message = "Unit price must be positive"))]
    pub unit_price: f64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    pub expense_date: NaiveDate,
}
