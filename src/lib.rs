//! Ledgerly is the aggregation engine behind a personal-finance tracker.
//!
//! It turns raw income/expense rows and per-category monthly budgets into the
//! derived figures shown across the app: monthly totals, lifetime balance,
//! remaining budget, category breakdowns, and the 12-month chart series.
//!
//! Routing, sessions, and page rendering belong to the caller; this crate
//! owns the data model, the month arithmetic, and the query contracts. Every
//! operation borrows a [rusqlite::Connection] so the caller decides how the
//! store handle is scoped.

#![warn(missing_docs)]

mod budget;
mod category;
mod coerce;
mod db;
mod ledger;
mod period;
mod report;
mod transaction;
mod user;

pub use budget::{Budget, BudgetForm, budgets_for_period, upsert_budget};
pub use category::{CategoryId, OTHERS_LABEL, category_label};
pub use coerce::{amount_or_zero, category_or_zero};
pub use db::initialize;
pub use ledger::{
    CategoryTotal, category_breakdown, lifetime_balance, monthly_budget_total, monthly_expenses,
    monthly_income, remaining, yearly_series,
};
pub use period::{PeriodKey, ResolvedMonth, month_bounds, resolve_month};
pub use report::{
    CategoryPie, ExpensesPage, HomeStats, IncomePage, category_pie, compute_expenses_page,
    compute_home_stats, compute_income_page, yearly_expense_series, yearly_income_series,
};
pub use transaction::{
    Transaction, TransactionForm, TransactionId, TransactionKind, create_transaction,
    transactions_for_month,
};
pub use user::{User, UserID, get_user_by_id, register_user};

/// The errors that may occur in the engine.
///
/// Malformed *input* (bad date strings, non-numeric amounts or categories) is
/// never an error: it coerces to safe defaults at the write boundaries. The
/// variants here cover store failures and the duplicate-registration case,
/// which callers are expected to report differently from a generic failure.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username or email is already taken by a registered user.
    #[error("username or email is already registered")]
    AlreadyRegistered,

    /// A period key string did not have the expected "MMYYYY" form.
    #[error("invalid period key \"{0}\"")]
    InvalidPeriodKey(String),

    /// The requested row could not be found.
    ///
    /// Aggregations never produce this: summing zero rows yields zero.
    /// Only point lookups such as [get_user_by_id] do.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067
                    && (desc.contains("user.username") || desc.contains("user.email")) =>
            {
                Error::AlreadyRegistered
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {error}");
                Error::SqlError(error)
            }
        }
    }
}
