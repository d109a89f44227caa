use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Stock, StockId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait StockQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &StockId,
    ) -> error_stack::Result<Option<Stock>, KernelError>;

    async fn find_all(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<Vec<Stock>, KernelError>;
}

pub trait DependOnStockQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type StockQuery: StockQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn stock_query(&self) -> &Self::StockQuery;
}
