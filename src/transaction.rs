//! The transaction table, the transaction writer, and month-scoped reads.
//!
//! Transactions store non-negative amounts; whether money came in or went
//! out is carried by [TransactionKind], never by the sign of the amount.

use rusqlite::{Connection, Row, named_params};
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{
    Error,
    category::CategoryId,
    coerce::{amount_or_zero, category_or_zero},
    period::month_bounds,
    user::UserID,
};

/// Alias for the integer type used for transaction ids.
pub type TransactionId = i64;

/// The direction of a transaction: money in or money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money received.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    fn from_column(raw: &str, index: usize) -> Result<Self, rusqlite::Error> {
        match raw {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(rusqlite::Error::FromSqlConversionFailure(
                index,
                rusqlite::types::Type::Text,
                format!("unknown transaction kind \"{raw}\"").into(),
            )),
        }
    }
}

/// An income or expense record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The transaction's ID in the application database.
    pub id: TransactionId,
    /// The owning user.
    pub user_id: UserID,
    /// The calendar date the transaction happened on.
    pub date: Date,
    /// The amount of money, always non-negative.
    pub amount: f64,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// A free-text note.
    pub description: String,
    /// The expense category. Income rows carry `None`.
    pub category_id: Option<CategoryId>,
}

/// A transaction submission as received from the caller, before the date,
/// amount, and category fields have been resolved.
///
/// All fields are raw strings from a form; see [create_transaction] for how
/// each one is interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionForm<'a> {
    /// The raw amount field.
    pub amount: Option<&'a str>,
    /// An explicit "YYYY-MM-DD" date, if provided.
    pub date: Option<&'a str>,
    /// A "YYYY-MM" month, defaulting to the 1st, if provided.
    pub month: Option<&'a str>,
    /// A free-text note.
    pub description: &'a str,
    /// The raw category field. Ignored for income rows.
    pub category: Option<&'a str>,
}

/// Create the transaction table.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub(crate) fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                kind TEXT NOT NULL,
                description TEXT NOT NULL,
                category_id INTEGER,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new transaction for `user_id`.
///
/// Field handling is deliberately permissive:
/// - The date is taken from `form.date` ("YYYY-MM-DD"), else from `form.month`
///   ("YYYY-MM", meaning the 1st of that month), else `today`. A string that
///   does not parse as a real calendar date counts as not provided, so
///   "2025-13-40" falls back to `today` rather than being rejected.
/// - The amount coerces to 0 when non-numeric and is stored as its absolute
///   value.
/// - For expense rows the category coerces to 0 when missing or unparseable;
///   income rows ignore the field entirely and store no category.
///
/// # Errors
/// Returns an [Error::SqlError] if the insert fails. Malformed input is not
/// an error.
pub fn create_transaction(
    user_id: UserID,
    kind: TransactionKind,
    form: TransactionForm,
    today: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let date = resolve_date(form.date, form.month, today);
    let amount = amount_or_zero(form.amount).abs();
    let category_id = match kind {
        TransactionKind::Expense => Some(category_or_zero(form.category)),
        TransactionKind::Income => None,
    };

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, date, amount, kind, description, category_id) \
        VALUES (:user_id, :date, :amount, :kind, :description, :category_id)",
        named_params! {
            ":user_id": user_id.as_i64(),
            ":date": date,
            ":amount": amount,
            ":kind": kind.as_str(),
            ":description": form.description,
            ":category_id": category_id,
        },
    )?;

    Ok(Transaction {
        id: connection.last_insert_rowid(),
        user_id,
        date,
        amount,
        kind,
        description: form.description.to_owned(),
        category_id,
    })
}

/// Get the transactions of `kind` for `user_id` that fall in `month` of
/// `year`, ordered by date and then ID so repeated reads render identically.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails. A month with no
/// transactions yields an empty list, not an error.
pub fn transactions_for_month(
    user_id: UserID,
    kind: TransactionKind,
    month: Month,
    year: i32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (start, end) = month_bounds(month, year);

    connection
        .prepare(
            "SELECT id, user_id, date, amount, kind, description, category_id \
            FROM \"transaction\" \
            WHERE user_id = :user_id AND kind = :kind AND date BETWEEN :start AND :end \
            ORDER BY date ASC, id ASC",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":kind": kind.as_str(),
                ":start": start,
                ":end": end,
            },
            map_transaction_row,
        )?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_kind: String = row.get(4)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        date: row.get(2)?,
        amount: row.get(3)?,
        kind: TransactionKind::from_column(&raw_kind, 4)?,
        description: row.get(5)?,
        category_id: row.get(6)?,
    })
}

fn resolve_date(date: Option<&str>, month: Option<&str>, today: Date) -> Date {
    if let Some(parsed) = date.and_then(parse_date_string) {
        return parsed;
    }

    if let Some(parsed) = month.and_then(parse_month_string) {
        return parsed;
    }

    today
}

/// Parse a strict "YYYY-MM-DD" string into a date.
///
/// Returns `None` for anything that is not four, two, and two digits, or that
/// names an impossible calendar date.
fn parse_date_string(raw: &str) -> Option<Date> {
    let mut parts = raw.split('-');
    let year = digits(parts.next()?, 4)?;
    let month = digits(parts.next()?, 2)? as u8;
    let day = digits(parts.next()?, 2)? as u8;

    if parts.next().is_some() {
        return None;
    }

    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Parse a strict "YYYY-MM" string into the first day of that month.
fn parse_month_string(raw: &str) -> Option<Date> {
    let (year, month) = raw.split_once('-')?;
    let year = digits(year, 4)?;
    let month = digits(month, 2)? as u8;

    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, 1).ok()
}

fn digits(raw: &str, count: usize) -> Option<i32> {
    if raw.len() != count || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{db::initialize, user::UserID};

    use super::{TransactionForm, TransactionKind, create_transaction, transactions_for_month};

    fn init_db() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = crate::user::register_user("alice", "Alice", "a@example.com", "hunter2", &conn)
            .unwrap();

        (conn, user.id)
    }

    #[test]
    fn explicit_date_is_used() {
        let (conn, user_id) = init_db();
        let form = TransactionForm {
            amount: Some("12.50"),
            date: Some("2025-02-15"),
            description: "groceries",
            category: Some("1"),
            ..Default::default()
        };

        let got = create_transaction(
            user_id,
            TransactionKind::Expense,
            form,
            date!(2024 - 06 - 01),
            &conn,
        )
        .unwrap();

        assert_eq!(got.date, date!(2025 - 02 - 15));
        assert_eq!(got.amount, 12.5);
        assert_eq!(got.category_id, Some(1));
    }

    #[test]
    fn month_field_defaults_to_first_of_month() {
        let (conn, user_id) = init_db();
        let form = TransactionForm {
            amount: Some("100"),
            month: Some("2025-02"),
            description: "rent",
            category: Some("3"),
            ..Default::default()
        };

        let got = create_transaction(
            user_id,
            TransactionKind::Expense,
            form,
            date!(2024 - 06 - 01),
            &conn,
        )
        .unwrap();

        assert_eq!(got.date, date!(2025 - 02 - 01));
    }

    #[test]
    fn invalid_date_falls_back_to_today() {
        let (conn, user_id) = init_db();
        let today = date!(2024 - 06 - 01);

        for bad_date in ["2025-13-40", "2025-02-30", "20250215", "soon", ""] {
            let form = TransactionForm {
                amount: Some("1"),
                date: Some(bad_date),
                description: "mystery",
                category: Some("0"),
                ..Default::default()
            };

            let got =
                create_transaction(user_id, TransactionKind::Expense, form, today, &conn).unwrap();

            assert_eq!(got.date, today, "date \"{bad_date}\" should fall back");
        }
    }

    #[test]
    fn invalid_month_falls_back_to_today() {
        let (conn, user_id) = init_db();
        let today = date!(2024 - 06 - 01);
        let form = TransactionForm {
            amount: Some("1"),
            month: Some("2025-13"),
            description: "",
            ..Default::default()
        };

        let got = create_transaction(user_id, TransactionKind::Income, form, today, &conn).unwrap();

        assert_eq!(got.date, today);
    }

    #[test]
    fn income_ignores_category() {
        let (conn, user_id) = init_db();
        let form = TransactionForm {
            amount: Some("2500"),
            date: Some("2025-01-31"),
            description: "salary",
            category: Some("7"),
            ..Default::default()
        };

        let got = create_transaction(
            user_id,
            TransactionKind::Income,
            form,
            date!(2025 - 01 - 31),
            &conn,
        )
        .unwrap();

        assert_eq!(got.category_id, None);
    }

    #[test]
    fn unparseable_expense_category_defaults_to_zero() {
        let (conn, user_id) = init_db();
        let form = TransactionForm {
            amount: Some("5"),
            date: Some("2025-01-10"),
            description: "",
            category: Some("snacks"),
            ..Default::default()
        };

        let got = create_transaction(
            user_id,
            TransactionKind::Expense,
            form,
            date!(2025 - 01 - 10),
            &conn,
        )
        .unwrap();

        assert_eq!(got.category_id, Some(0));
    }

    #[test]
    fn amount_is_coerced_and_stored_non_negative() {
        let (conn, user_id) = init_db();
        let today = date!(2025 - 01 - 10);

        let junk = TransactionForm {
            amount: Some("lots"),
            description: "",
            category: Some("1"),
            ..Default::default()
        };
        let got = create_transaction(user_id, TransactionKind::Expense, junk, today, &conn).unwrap();
        assert_eq!(got.amount, 0.0);

        let negative = TransactionForm {
            amount: Some("-42.50"),
            description: "",
            category: Some("1"),
            ..Default::default()
        };
        let got =
            create_transaction(user_id, TransactionKind::Expense, negative, today, &conn).unwrap();
        assert_eq!(got.amount, 42.5);
    }

    #[test]
    fn month_read_filters_by_user_kind_and_month() {
        let (conn, user_id) = init_db();
        let other = crate::user::register_user("bob", "Bob", "b@example.com", "hunter2", &conn)
            .unwrap()
            .id;
        let today = date!(2025 - 01 - 15);

        let insert = |user, kind, date_str: &str, amount: &str| {
            let form = TransactionForm {
                amount: Some(amount),
                date: Some(date_str),
                description: "",
                category: Some("1"),
                ..Default::default()
            };
            create_transaction(user, kind, form, today, &conn).unwrap()
        };

        let want_first = insert(user_id, TransactionKind::Expense, "2025-01-05", "10");
        let want_second = insert(user_id, TransactionKind::Expense, "2025-01-20", "20");
        insert(user_id, TransactionKind::Income, "2025-01-10", "30");
        insert(user_id, TransactionKind::Expense, "2025-02-01", "40");
        insert(other, TransactionKind::Expense, "2025-01-07", "50");

        let got = transactions_for_month(
            user_id,
            TransactionKind::Expense,
            time::Month::January,
            2025,
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![want_first, want_second]);
    }

    #[test]
    fn month_read_is_empty_for_quiet_month() {
        let (conn, user_id) = init_db();

        let got = transactions_for_month(
            user_id,
            TransactionKind::Income,
            time::Month::July,
            2031,
            &conn,
        )
        .unwrap();

        assert!(got.is_empty(), "expected no transactions, got {got:?}");
    }
}
