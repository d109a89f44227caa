use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Account, EmployeeId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait AccountQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_employee_id(
        &self,
        con: &mut Self::Transaction,
        employee_id: &EmployeeId,
    ) -> error_stack::Result<Option<Account>, KernelError>;

    async fn find_all(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<Vec<Account>, KernelError>;
}

pub trait DependOnAccountQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type AccountQuery: AccountQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn account_query(&self) -> &Self::AccountQuery;
}
