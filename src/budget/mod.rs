//! Monthly spending budgets, at most one per user per month.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_budget, create_budget_table, delete_budget, get_budget, get_budget_for_month,
    get_budgets, update_budget,
};
pub use domain::{Budget, BudgetData, BudgetId, BudgetMonth};
pub use endpoints::{
    create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint, list_budgets_endpoint,
    update_budget_endpoint,
};
