//! Page and endpoint composites built on the ledger aggregator.
//!
//! Each function here assembles the figures one presentation surface needs:
//! the dashboard cards, the income and expenses pages, and the JSON chart
//! endpoints. The output structs derive [serde::Serialize] for the JSON
//! surfaces and [Default] so a caller that hits a store failure can fall
//! back to the documented zero-valued shape instead of a half-filled one —
//! the functions themselves never return partial aggregates.

use rusqlite::Connection;
use serde::Serialize;
use time::{Date, Month};

use crate::{
    Error,
    budget::{Budget, budgets_for_period},
    category::category_label,
    ledger::{
        CategoryTotal, category_breakdown, monthly_budget_total, monthly_expenses, monthly_income,
        yearly_series,
    },
    period::resolve_month,
    transaction::{Transaction, TransactionKind, transactions_for_month},
    user::UserID,
};

/// The number of categories shown on the dashboard's top-spending card.
const TOP_CATEGORY_COUNT: u32 = 3;

/// The figures shown on the home dashboard for the current month.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct HomeStats {
    /// Total spent this month.
    pub monthly_expenses: f64,
    /// Total budgeted this month across all categories.
    pub monthly_budget: f64,
    /// Budget minus expenses; negative when overspent.
    pub monthly_remaining: f64,
    /// The top spending categories this month, at most three.
    pub top_categories: Vec<CategoryTotal>,
}

/// The figures shown on the income page for one resolved month.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct IncomePage {
    /// The month's income transactions in stable display order.
    pub transactions: Vec<Transaction>,
    /// The budget rows for the month, for the budget table and edit form.
    pub current_budget: Vec<Budget>,
    /// Total budgeted for the month.
    pub this_month_budget: f64,
    /// Total income for the month.
    pub this_month_income: f64,
    /// Display label for the month, e.g. "January 2025".
    pub period_label: String,
}

/// The figures shown on the expenses page for one resolved month.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ExpensesPage {
    /// The month's expense transactions in stable display order.
    pub transactions: Vec<Transaction>,
    /// The budget rows for the month.
    pub current_budget: Vec<Budget>,
    /// Total spent in the month.
    pub this_month_expenses: f64,
    /// Total income for the month.
    pub this_month_income: f64,
    /// Per-category expense totals, every category, deterministic order.
    pub by_category: Vec<CategoryTotal>,
    /// Total budgeted for the month across all categories.
    pub total_monthly_budget: f64,
    /// Display label for the month.
    pub period_label: String,
}

/// Labels and totals for the category pie chart, pairwise by index.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CategoryPie {
    /// Display labels resolved through the static category table.
    pub labels: Vec<&'static str>,
    /// The summed expense amount per label.
    pub totals: Vec<f64>,
}

/// Compute the dashboard figures for the month containing `today`.
///
/// # Errors
/// Returns an [Error::SqlError] if any read fails; no partial result is
/// produced. Callers may render `HomeStats::default()` as the degraded view.
pub fn compute_home_stats(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<HomeStats, Error> {
    let current = resolve_month(0, today);
    tracing::debug!("computing home stats for user {user_id} in {}", current.key);

    let monthly_expenses = monthly_expenses(user_id, current.month, current.year, connection)?;
    let monthly_budget = monthly_budget_total(user_id, current.key, connection)?;
    let top_categories = category_breakdown(
        user_id,
        current.month,
        current.year,
        TransactionKind::Expense,
        Some(TOP_CATEGORY_COUNT),
        connection,
    )?;

    Ok(HomeStats {
        monthly_expenses,
        monthly_budget,
        monthly_remaining: monthly_budget - monthly_expenses,
        top_categories,
    })
}

/// Compute the income page for the month `page` months before `today`.
///
/// # Errors
/// Returns an [Error::SqlError] if any read fails; no partial result is
/// produced.
pub fn compute_income_page(
    user_id: UserID,
    page: u32,
    today: Date,
    connection: &Connection,
) -> Result<IncomePage, Error> {
    let resolved = resolve_month(page, today);

    let transactions = transactions_for_month(
        user_id,
        TransactionKind::Income,
        resolved.month,
        resolved.year,
        connection,
    )?;
    let current_budget = budgets_for_period(user_id, resolved.key, connection)?;
    let this_month_budget = monthly_budget_total(user_id, resolved.key, connection)?;
    let this_month_income = monthly_income(user_id, resolved.month, resolved.year, connection)?;

    Ok(IncomePage {
        transactions,
        current_budget,
        this_month_budget,
        this_month_income,
        period_label: resolved.label,
    })
}

/// Compute the expenses page for the month `page` months before `today`.
///
/// # Errors
/// Returns an [Error::SqlError] if any read fails; no partial result is
/// produced.
pub fn compute_expenses_page(
    user_id: UserID,
    page: u32,
    today: Date,
    connection: &Connection,
) -> Result<ExpensesPage, Error> {
    let resolved = resolve_month(page, today);

    let transactions = transactions_for_month(
        user_id,
        TransactionKind::Expense,
        resolved.month,
        resolved.year,
        connection,
    )?;
    let current_budget = budgets_for_period(user_id, resolved.key, connection)?;
    let this_month_expenses = monthly_expenses(user_id, resolved.month, resolved.year, connection)?;
    let this_month_income = monthly_income(user_id, resolved.month, resolved.year, connection)?;
    let by_category = category_breakdown(
        user_id,
        resolved.month,
        resolved.year,
        TransactionKind::Expense,
        None,
        connection,
    )?;
    let total_monthly_budget = monthly_budget_total(user_id, resolved.key, connection)?;

    Ok(ExpensesPage {
        transactions,
        current_budget,
        this_month_expenses,
        this_month_income,
        by_category,
        total_monthly_budget,
        period_label: resolved.label,
    })
}

/// Monthly expense totals for `year`: exactly 12 entries, January first.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn yearly_expense_series(
    user_id: UserID,
    year: i32,
    connection: &Connection,
) -> Result<[f64; 12], Error> {
    yearly_series(user_id, year, TransactionKind::Expense, connection)
}

/// Monthly income totals for `year`: exactly 12 entries, January first.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn yearly_income_series(
    user_id: UserID,
    year: i32,
    connection: &Connection,
) -> Result<[f64; 12], Error> {
    yearly_series(user_id, year, TransactionKind::Income, connection)
}

/// Expense totals per category label for the pie chart, for `month` of
/// `year`.
///
/// Labels come from the static category table; ids without an entry show as
/// "Others". Order follows [category_breakdown], so slices render largest
/// first.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn category_pie(
    user_id: UserID,
    month: Month,
    year: i32,
    connection: &Connection,
) -> Result<CategoryPie, Error> {
    let breakdown = category_breakdown(
        user_id,
        month,
        year,
        TransactionKind::Expense,
        None,
        connection,
    )?;

    let labels = breakdown
        .iter()
        .map(|entry| category_label(entry.category_id))
        .collect();
    let totals = breakdown.into_iter().map(|entry| entry.total).collect();

    Ok(CategoryPie { labels, totals })
}
