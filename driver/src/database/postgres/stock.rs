use sqlx::PgConnection;

use kernel::interface::query::StockQuery;
use kernel::prelude::entity::{BookTitle, Stock, StockId};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresStockRepository;

#[async_trait::async_trait]
impl StockQuery for PostgresStockRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &StockId,
    ) -> error_stack::Result<Option<Stock>, KernelError> {
        PgStockInternal::find_by_id(con, id).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<Vec<Stock>, KernelError> {
        PgStockInternal::find_all(con).await
    }
}

#[derive(sqlx::FromRow)]
struct StockRow {
    id: String,
    title: String,
}

impl From<StockRow> for Stock {
    fn from(row: StockRow) -> Self {
        Stock::new(StockId::new(row.id), BookTitle::new(row.title))
    }
}

pub(in crate::database) struct PgStockInternal;

impl PgStockInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &StockId,
    ) -> error_stack::Result<Option<Stock>, KernelError> {
        let row = sqlx::query_as::<_, StockRow>(
            // language=postgresql
            r#"
            SELECT id, title
            FROM stocks
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Stock::from))
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Stock>, KernelError> {
        let rows = sqlx::query_as::<_, StockRow>(
            // language=postgresql
            r#"
            SELECT id, title
            FROM stocks
            ORDER BY id
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Stock::from).collect())
    }
}
