//! Database initialization for the engine's tables.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, budget::create_budget_table, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the user, transaction, and budget tables if they do not exist.
///
/// All tables are created within a single exclusive transaction so a partially
/// initialized database is never observable.
///
/// # Errors
/// Returns an [Error::SqlError] if table creation fails.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
