use error_stack::Report;

use crate::KernelError;

#[async_trait::async_trait]
pub trait DatabaseConnection: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError>;
}

pub trait DependOnDatabaseConnection: 'static + Sync + Send {
    type DatabaseConnection: DatabaseConnection;
    fn database_connection(&self) -> &Self::DatabaseConnection;
}

impl<T> DependOnDatabaseConnection for T
where
    T: DatabaseConnection,
{
    type DatabaseConnection = T;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        self
    }
}

/// A unit of work. Dropping it without [`Transaction::commit`] discards every
/// write made through it.
#[async_trait::async_trait]
pub trait Transaction: 'static + Sync + Send {
    async fn commit(self) -> error_stack::Result<(), KernelError>;
    async fn roll_back(self) -> error_stack::Result<(), KernelError>;

    /// Rolls back and fails with `report`.
    ///
    /// A failing rollback is reported instead of `report`.
    async fn reject<T>(self, report: Report<KernelError>) -> error_stack::Result<T, KernelError>
    where
        Self: Sized,
    {
        self.roll_back().await?;
        Err(report)
    }
}
