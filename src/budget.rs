//! The budget table and the replace-on-conflict budget writer.
//!
//! A budget row is the amount a user plans to spend on one category in one
//! month. Rows are keyed by (user, period, category); writing the same key
//! again replaces the amount and description rather than accumulating a
//! second row. The replacement is a single SQL statement, so concurrent
//! edits of the same key serialize inside the store and last-write-wins
//! without ever producing duplicates.

use rusqlite::{Connection, Row, named_params};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    category::CategoryId,
    coerce::{amount_or_zero, category_or_zero},
    period::PeriodKey,
    user::UserID,
};

/// A per-user, per-month, per-category budget amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The owning user.
    pub user_id: UserID,
    /// The month this budget applies to.
    pub period: PeriodKey,
    /// The expense category being budgeted.
    pub category_id: CategoryId,
    /// The budgeted amount, always non-negative.
    pub amount: f64,
    /// An optional note.
    pub description: Option<String>,
}

/// A budget submission as received from the caller, before the amount and
/// category fields have been coerced.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetForm<'a> {
    /// The raw amount field, coerced to 0 when non-numeric.
    pub amount: Option<&'a str>,
    /// The raw category field, coerced to 0 when unparseable.
    pub category: Option<&'a str>,
    /// An optional note.
    pub description: Option<&'a str>,
}

/// Create the budget table.
///
/// The composite primary key is what makes [upsert_budget] a true
/// replace-on-conflict: the store, not the engine, enforces uniqueness.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub(crate) fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                user_id INTEGER NOT NULL,
                period TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                description TEXT,
                PRIMARY KEY(user_id, period, category_id),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Insert or replace the budget for (`user_id`, `period`, category).
///
/// A write for an existing key replaces the amount and description; there is
/// never more than one row per key. The amount coerces to 0 when non-numeric
/// and is stored as its absolute value; the category coerces to 0 when
/// missing or unparseable.
///
/// # Errors
/// Returns an [Error::SqlError] if the statement fails. Malformed input is
/// not an error.
pub fn upsert_budget(
    user_id: UserID,
    period: PeriodKey,
    form: BudgetForm,
    connection: &Connection,
) -> Result<Budget, Error> {
    let amount = amount_or_zero(form.amount).abs();
    let category_id = category_or_zero(form.category);

    connection.execute(
        "INSERT INTO budget (user_id, period, category_id, amount, description) \
        VALUES (:user_id, :period, :category_id, :amount, :description) \
        ON CONFLICT(user_id, period, category_id) \
        DO UPDATE SET amount = excluded.amount, description = excluded.description",
        named_params! {
            ":user_id": user_id.as_i64(),
            ":period": period.to_string(),
            ":category_id": category_id,
            ":amount": amount,
            ":description": form.description,
        },
    )?;

    Ok(Budget {
        user_id,
        period,
        category_id,
        amount,
        description: form.description.map(str::to_owned),
    })
}

/// Get the budget rows for `user_id` in `period`, ordered by category id.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails. A period with no budgets
/// yields an empty list, not an error.
pub fn budgets_for_period(
    user_id: UserID,
    period: PeriodKey,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT user_id, period, category_id, amount, description FROM budget \
            WHERE user_id = :user_id AND period = :period \
            ORDER BY category_id ASC",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":period": period.to_string(),
            },
            map_budget_row,
        )?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_period: String = row.get(1)?;
    let period = raw_period.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("{error}").into(),
        )
    })?;

    Ok(Budget {
        user_id: UserID::new(row.get(0)?),
        period,
        category_id: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
    })
}
