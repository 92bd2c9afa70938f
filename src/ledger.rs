//! The ledger aggregator: derived financial figures for a user and month.
//!
//! Every operation here is a read over the transaction and budget tables.
//! The store performs the arithmetic, the engine fixes the contracts:
//! aggregating zero rows yields the documented zero value, never an error,
//! and every ordering is deterministic so repeated reads render identically.

use rusqlite::{Connection, named_params};
use serde::Serialize;
use time::Month;

use crate::{
    Error,
    category::CategoryId,
    period::{PeriodKey, month_bounds, year_bounds},
    transaction::TransactionKind,
    user::UserID,
};

/// The aggregated expense total for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category id, preserved even when unknown to the label table.
    pub category_id: CategoryId,
    /// The summed amount for the category.
    pub total: f64,
}

/// Sum of income amounts for `user_id` in `month` of `year`. Empty months
/// sum to 0.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn monthly_income(
    user_id: UserID,
    month: Month,
    year: i32,
    connection: &Connection,
) -> Result<f64, Error> {
    sum_for_month(user_id, TransactionKind::Income, month, year, connection)
}

/// Sum of expense amounts for `user_id` in `month` of `year`. Empty months
/// sum to 0.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn monthly_expenses(
    user_id: UserID,
    month: Month,
    year: i32,
    connection: &Connection,
) -> Result<f64, Error> {
    sum_for_month(user_id, TransactionKind::Expense, month, year, connection)
}

fn sum_for_month(
    user_id: UserID,
    kind: TransactionKind,
    month: Month,
    year: i32,
    connection: &Connection,
) -> Result<f64, Error> {
    let (start, end) = month_bounds(month, year);

    connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\" \
            WHERE user_id = :user_id AND kind = :kind AND date BETWEEN :start AND :end",
        )?
        .query_row(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":kind": kind.as_str(),
                ":start": start,
                ":end": end,
            },
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Cumulative income minus cumulative expenses across all time for `user_id`.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn lifetime_balance(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    connection
        .prepare(
            "SELECT COALESCE(SUM(CASE WHEN kind = 'income' THEN amount ELSE -amount END), 0) \
            FROM \"transaction\" WHERE user_id = :user_id",
        )?
        .query_row(named_params! { ":user_id": user_id.as_i64() }, |row| {
            row.get(0)
        })
        .map_err(Error::from)
}

/// Sum of budgeted amounts across all categories for `user_id` in `period`.
/// Periods with no budgets sum to 0.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn monthly_budget_total(
    user_id: UserID,
    period: PeriodKey,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0) FROM budget \
            WHERE user_id = :user_id AND period = :period",
        )?
        .query_row(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":period": period.to_string(),
            },
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Budget total minus expenses for the month `period` refers to.
///
/// Overspending makes this negative; the value is not clamped. Whether to
/// show a negative remainder or floor it at zero is a display decision left
/// to the presentation layer.
///
/// # Errors
/// Returns an [Error::SqlError] if either query fails.
pub fn remaining(user_id: UserID, period: PeriodKey, connection: &Connection) -> Result<f64, Error> {
    let budget = monthly_budget_total(user_id, period, connection)?;
    let expenses = monthly_expenses(user_id, period.month(), period.year(), connection)?;

    Ok(budget - expenses)
}

/// Per-category totals of `kind` for `user_id` in `month` of `year`, sorted
/// by descending total with ties broken by ascending category id.
///
/// Income rows carry no category and aggregate under id 0 when `kind` is
/// [TransactionKind::Income]. `limit` caps the number of entries (e.g. top 3
/// for the dashboard); `None` returns every category.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn category_breakdown(
    user_id: UserID,
    month: Month,
    year: i32,
    kind: TransactionKind,
    limit: Option<u32>,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    let (start, end) = month_bounds(month, year);
    // A negative LIMIT means "no limit" in SQLite.
    let limit = limit.map_or(-1, i64::from);

    connection
        .prepare(
            "SELECT COALESCE(category_id, 0) AS category, SUM(amount) AS total \
            FROM \"transaction\" \
            WHERE user_id = :user_id AND kind = :kind AND date BETWEEN :start AND :end \
            GROUP BY category \
            ORDER BY total DESC, category ASC \
            LIMIT :limit",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":kind": kind.as_str(),
                ":start": start,
                ":end": end,
                ":limit": limit,
            },
            |row| {
                Ok(CategoryTotal {
                    category_id: row.get(0)?,
                    total: row.get(1)?,
                })
            },
        )?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}

/// Monthly totals of `kind` for `user_id` across `year`.
///
/// Always exactly 12 entries, indexed by month − 1, zero-filled and
/// overwritten wherever the year has matching transactions.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn yearly_series(
    user_id: UserID,
    year: i32,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<[f64; 12], Error> {
    let (start, end) = year_bounds(year);
    let mut series = [0.0; 12];

    let mut statement = connection.prepare(
        "SELECT CAST(strftime('%m', date) AS INTEGER) AS month, SUM(amount) \
        FROM \"transaction\" \
        WHERE user_id = :user_id AND kind = :kind AND date BETWEEN :start AND :end \
        GROUP BY month",
    )?;
    let rows = statement.query_map(
        named_params! {
            ":user_id": user_id.as_i64(),
            ":kind": kind.as_str(),
            ":start": start,
            ":end": end,
        },
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)),
    )?;

    for row_result in rows {
        let (month, total) = row_result?;
        if (1..=12).contains(&month) {
            series[month as usize - 1] = total;
        }
    }

    Ok(series)
}
