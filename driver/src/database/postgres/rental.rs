use error_stack::Report;
use sqlx::PgConnection;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use kernel::interface::query::RentalQuery;
use kernel::interface::update::RentalModifier;
use kernel::prelude::entity::{
    CanceledAt, EmployeeId, ExpectedRentalOn, ExpectedReturnOn, Rental, RentalId, RentalStatus,
    RentaledAt, ReturnedAt, StockId,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresRentalRepository;

#[async_trait::async_trait]
impl RentalQuery for PostgresRentalRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &RentalId,
    ) -> error_stack::Result<Option<Rental>, KernelError> {
        PgRentalInternal::find_by_id(con, id).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<Vec<Rental>, KernelError> {
        PgRentalInternal::find_all(con).await
    }
}

#[async_trait::async_trait]
impl RentalModifier for PostgresRentalRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        rental: &Rental,
    ) -> error_stack::Result<(), KernelError> {
        PgRentalInternal::create(con, rental).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        rental: &Rental,
    ) -> error_stack::Result<(), KernelError> {
        PgRentalInternal::update(con, rental).await
    }
}

#[derive(sqlx::FromRow)]
struct RentalRow {
    id: Uuid,
    stock_id: String,
    employee_id: String,
    status: i32,
    expected_rental_on: Date,
    expected_return_on: Date,
    rentaled_at: Option<OffsetDateTime>,
    returned_at: Option<OffsetDateTime>,
    canceled_at: Option<OffsetDateTime>,
}

impl TryFrom<RentalRow> for Rental {
    type Error = Report<KernelError>;
    fn try_from(value: RentalRow) -> Result<Self, Self::Error> {
        Ok(Rental::new(
            RentalId::new(value.id),
            StockId::new(value.stock_id),
            EmployeeId::new(value.employee_id),
            RentalStatus::try_from(value.status)?,
            ExpectedRentalOn::new(value.expected_rental_on),
            ExpectedReturnOn::new(value.expected_return_on),
            value.rentaled_at.map(RentaledAt::new),
            value.returned_at.map(ReturnedAt::new),
            value.canceled_at.map(CanceledAt::new),
        ))
    }
}

pub(in crate::database) struct PgRentalInternal;

impl PgRentalInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &RentalId,
    ) -> error_stack::Result<Option<Rental>, KernelError> {
        let row = sqlx::query_as::<_, RentalRow>(
            // language=postgresql
            r#"
            SELECT id, stock_id, employee_id, status, expected_rental_on, expected_return_on,
                   rentaled_at, returned_at, canceled_at
            FROM rentals
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Rental::try_from).transpose()
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Rental>, KernelError> {
        let rows = sqlx::query_as::<_, RentalRow>(
            // language=postgresql
            r#"
            SELECT id, stock_id, employee_id, status, expected_rental_on, expected_return_on,
                   rentaled_at, returned_at, canceled_at
            FROM rentals
            ORDER BY expected_rental_on, id
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(Rental::try_from).collect()
    }

    async fn create(con: &mut PgConnection, rental: &Rental) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO rentals (id, stock_id, employee_id, status, expected_rental_on,
                                 expected_return_on, rentaled_at, returned_at, canceled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(rental.id().as_ref())
        .bind(rental.stock_id().as_ref())
        .bind(rental.employee_id().as_ref())
        .bind(rental.status().ordinal())
        .bind(rental.expected_rental_on().as_ref())
        .bind(rental.expected_return_on().as_ref())
        .bind(rental.rentaled_at().as_ref().map(|at| *at.as_ref()))
        .bind(rental.returned_at().as_ref().map(|at| *at.as_ref()))
        .bind(rental.canceled_at().as_ref().map(|at| *at.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, rental: &Rental) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            UPDATE rentals
            SET stock_id = $2, employee_id = $3, status = $4, expected_rental_on = $5,
                expected_return_on = $6, rentaled_at = $7, returned_at = $8, canceled_at = $9
            WHERE id = $1
            "#,
        )
        .bind(rental.id().as_ref())
        .bind(rental.stock_id().as_ref())
        .bind(rental.employee_id().as_ref())
        .bind(rental.status().ordinal())
        .bind(rental.expected_rental_on().as_ref())
        .bind(rental.expected_return_on().as_ref())
        .bind(rental.rentaled_at().as_ref().map(|at| *at.as_ref()))
        .bind(rental.returned_at().as_ref().map(|at| *at.as_ref()))
        .bind(rental.canceled_at().as_ref().map(|at| *at.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}
