use std::ops::{Deref, DerefMut};

use error_stack::{Report, ResultExt};
use sqlx::{Error, PgConnection, Pool, Postgres};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{DependOnAccountQuery, DependOnRentalQuery, DependOnStockQuery};
use kernel::interface::update::DependOnRentalModifier;
use kernel::KernelError;

use crate::env;
use crate::error::ConvertError;

pub use self::{account::*, rental::*, stock::*};

mod account;
mod rental;
mod stock;

static POSTGRES_URL: &str = "POSTGRES_URL";

pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let pool = Pool::connect(&url).await.convert_error()?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> error_stack::Result<(), KernelError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .change_context(KernelError::Internal)
            .attach_printable("Failed to apply migrations")
    }
}

pub struct PostgresTransaction(sqlx::Transaction<'static, Postgres>);

impl Deref for PostgresTransaction {
    type Target = PgConnection;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PostgresTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[async_trait::async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for PostgresDatabase {
    type Transaction = PostgresTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let transaction = self.pool.begin().await.convert_error()?;
        Ok(PostgresTransaction(transaction))
    }
}

impl DependOnRentalQuery for PostgresDatabase {
    type RentalQuery = PostgresRentalRepository;
    fn rental_query(&self) -> &Self::RentalQuery {
        &PostgresRentalRepository
    }
}

impl DependOnRentalModifier for PostgresDatabase {
    type RentalModifier = PostgresRentalRepository;
    fn rental_modifier(&self) -> &Self::RentalModifier {
        &PostgresRentalRepository
    }
}

impl DependOnAccountQuery for PostgresDatabase {
    type AccountQuery = PostgresAccountRepository;
    fn account_query(&self) -> &Self::AccountQuery {
        &PostgresAccountRepository
    }
}

impl DependOnStockQuery for PostgresDatabase {
    type StockQuery = PostgresStockRepository;
    fn stock_query(&self) -> &Self::StockQuery {
        &PostgresStockRepository
    }
}

impl<T> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| match error {
            Error::PoolTimedOut => {
                tracing::warn!("Timed out waiting for a database connection");
                Report::from(error).change_context(KernelError::Timeout)
            }
            _ => {
                tracing::error!("Database error: {error}");
                Report::from(error).change_context(KernelError::Internal)
            }
        })
    }
}

/// Inserts one stock and one account inside `con`, returning their ids.
#[cfg(test)]
pub(in crate::database) async fn test_fixture(
    con: &mut PgConnection,
) -> error_stack::Result<(String, String), KernelError> {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..12];
    let stock_id = format!("S-{suffix}");
    let employee_id = format!("E-{suffix}");
    // language=postgresql
    sqlx::query("INSERT INTO stocks (id, title) VALUES ($1, 'fixture')")
        .bind(&stock_id)
        .execute(&mut *con)
        .await
        .convert_error()?;
    // language=postgresql
    sqlx::query("INSERT INTO accounts (employee_id, name) VALUES ($1, 'fixture')")
        .bind(&employee_id)
        .execute(&mut *con)
        .await
        .convert_error()?;
    Ok((stock_id, employee_id))
}
