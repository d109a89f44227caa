use sqlx::PgConnection;

use kernel::interface::query::AccountQuery;
use kernel::prelude::entity::{Account, AccountName, EmployeeId};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresAccountRepository;

#[async_trait::async_trait]
impl AccountQuery for PostgresAccountRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_employee_id(
        &self,
        con: &mut PostgresTransaction,
        employee_id: &EmployeeId,
    ) -> error_stack::Result<Option<Account>, KernelError> {
        PgAccountInternal::find_by_employee_id(con, employee_id).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<Vec<Account>, KernelError> {
        PgAccountInternal::find_all(con).await
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    employee_id: String,
    name: String,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account::new(EmployeeId::new(row.employee_id), AccountName::new(row.name))
    }
}

pub(in crate::database) struct PgAccountInternal;

impl PgAccountInternal {
    async fn find_by_employee_id(
        con: &mut PgConnection,
        employee_id: &EmployeeId,
    ) -> error_stack::Result<Option<Account>, KernelError> {
        let row = sqlx::query_as::<_, AccountRow>(
            // language=postgresql
            r#"
            SELECT employee_id, name
            FROM accounts
            WHERE employee_id = $1
            "#,
        )
        .bind(employee_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Account::from))
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Account>, KernelError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            // language=postgresql
            r#"
            SELECT employee_id, name
            FROM accounts
            ORDER BY employee_id
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Account::from).collect())
    }
}
