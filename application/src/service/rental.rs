use error_stack::Report;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use kernel::interface::database::{
    DatabaseConnection, DependOnDatabaseConnection, Transaction,
};
use kernel::interface::query::{
    AccountQuery, DependOnAccountQuery, DependOnRentalQuery, DependOnStockQuery, RentalQuery,
    StockQuery,
};
use kernel::interface::update::{DependOnRentalModifier, RentalModifier};
use kernel::prelude::entity::{
    CanceledAt, DestructRental, EmployeeId, ExpectedRentalOn, ExpectedReturnOn, Rental, RentalId,
    RentalStatus, RentaledAt, ReturnedAt, StockId,
};
use kernel::prelude::validation::{validate_schedule, validate_transition};
use kernel::{FieldError, KernelError};

use crate::transfer::{
    CreateRentalDto, GetRentalDto, RentalFormDto, UpdateRentalDto, ValidateTransitionDto,
};

type TransactionOf<T> =
    <<T as DependOnDatabaseConnection>::DatabaseConnection as DatabaseConnection>::Transaction;

#[async_trait::async_trait]
pub trait GetRentalService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnRentalQuery
{
    #[tracing::instrument(skip_all, fields(id = %dto.id))]
    async fn get_rental(&self, dto: GetRentalDto) -> error_stack::Result<Rental, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = RentalId::new(dto.id);
        self.rental_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| rental_not_found(&dto.id))
    }
}

impl<T> GetRentalService for T where T: DependOnDatabaseConnection + DependOnRentalQuery {}

#[async_trait::async_trait]
pub trait GetAllRentalService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnRentalQuery
{
    #[tracing::instrument(skip_all)]
    async fn get_all_rentals(&self) -> error_stack::Result<Vec<Rental>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        self.rental_query().find_all(&mut connection).await
    }
}

impl<T> GetAllRentalService for T where T: DependOnDatabaseConnection + DependOnRentalQuery {}

#[async_trait::async_trait]
pub trait CreateRentalService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnAccountQuery
    + DependOnStockQuery
    + DependOnRentalModifier
{
    #[tracing::instrument(skip_all, fields(stock_id = %dto.stock_id, employee_id = %dto.employee_id))]
    async fn create_rental(&self, dto: CreateRentalDto) -> error_stack::Result<Rental, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        if let Some(status) = dto.status.filter(|status| *status != RentalStatus::RentWait) {
            tracing::debug!("Ignoring requested status {status} for a new rental");
        }

        let stock_id = StockId::new(dto.stock_id);
        let employee_id = EmployeeId::new(dto.employee_id);
        ensure_references(self, &mut connection, &stock_id, &employee_id).await?;

        let expected_rental_on = ExpectedRentalOn::new(dto.expected_rental_on);
        let expected_return_on = ExpectedReturnOn::new(dto.expected_return_on);
        if let Some(error) = validate_schedule(&expected_rental_on, &expected_return_on) {
            let message = error.to_string();
            tracing::warn!("Rejected rental schedule: {message}");
            let report = Report::new(error)
                .change_context(KernelError::Validation)
                .attach_printable(FieldError::new("expected_return_on", message));
            return connection.reject(report).await;
        }

        let rental = Rental::new(
            RentalId::new(Uuid::new_v4()),
            stock_id,
            employee_id,
            RentalStatus::RentWait,
            expected_rental_on,
            expected_return_on,
            None,
            None,
            None,
        );
        self.rental_modifier()
            .create(&mut connection, &rental)
            .await?;
        connection.commit().await?;

        tracing::info!("Created rental {}", rental.id().as_ref());
        Ok(rental)
    }
}

impl<T> CreateRentalService for T where
    T: DependOnDatabaseConnection
        + DependOnAccountQuery
        + DependOnStockQuery
        + DependOnRentalModifier
{
}

#[async_trait::async_trait]
pub trait UpdateRentalService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnRentalQuery
    + DependOnAccountQuery
    + DependOnStockQuery
    + DependOnRentalModifier
{
    /// Applies an edit to an existing rental.
    ///
    /// The edit is rejected as a whole when the status change is not allowed
    /// or the schedule is inverted; nothing is written in that case.
    #[tracing::instrument(skip_all, fields(id = %dto.id, status = %dto.status))]
    async fn update_rental(&self, dto: UpdateRentalDto) -> error_stack::Result<Rental, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = RentalId::new(dto.id);
        let current = self
            .rental_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| rental_not_found(&dto.id))?;

        if let Some(error) = validate_transition(*current.status(), dto.status) {
            let message = error.to_string();
            tracing::warn!("Rejected status change: {message}");
            let report = Report::new(error)
                .change_context(KernelError::Validation)
                .attach_printable(FieldError::new("status", message));
            return connection.reject(report).await;
        }

        let expected_rental_on = ExpectedRentalOn::new(dto.expected_rental_on);
        let expected_return_on = ExpectedReturnOn::new(dto.expected_return_on);
        if let Some(error) = validate_schedule(&expected_rental_on, &expected_return_on) {
            let message = error.to_string();
            tracing::warn!("Rejected rental schedule: {message}");
            let report = Report::new(error)
                .change_context(KernelError::Validation)
                .attach_printable(FieldError::new("expected_return_on", message));
            return connection.reject(report).await;
        }

        let stock_id = StockId::new(dto.stock_id);
        let employee_id = EmployeeId::new(dto.employee_id);
        ensure_references(self, &mut connection, &stock_id, &employee_id).await?;

        let revised = revise(
            current,
            Revision {
                stock_id,
                employee_id,
                status: dto.status,
                expected_rental_on,
                expected_return_on,
            },
            truncate_to_micros(OffsetDateTime::now_utc()),
        );
        self.rental_modifier()
            .update(&mut connection, &revised)
            .await?;
        connection.commit().await?;

        Ok(revised)
    }
}

impl<T> UpdateRentalService for T where
    T: DependOnDatabaseConnection
        + DependOnRentalQuery
        + DependOnAccountQuery
        + DependOnStockQuery
        + DependOnRentalModifier
{
}

/// Pre-submission check for a status change, without touching any rental.
pub trait ValidateTransitionService: 'static + Sync + Send {
    fn validate_transition(
        &self,
        dto: ValidateTransitionDto,
    ) -> error_stack::Result<(), KernelError> {
        match validate_transition(dto.previous, dto.proposed) {
            None => Ok(()),
            Some(error) => {
                let message = error.to_string();
                Err(Report::new(error)
                    .change_context(KernelError::Validation)
                    .attach_printable(FieldError::new("status", message)))
            }
        }
    }
}

impl<T> ValidateTransitionService for T where T: 'static + Sync + Send {}

#[async_trait::async_trait]
pub trait GetRentalFormService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnAccountQuery + DependOnStockQuery
{
    #[tracing::instrument(skip_all)]
    async fn get_rental_form(&self) -> error_stack::Result<RentalFormDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let accounts = self.account_query().find_all(&mut connection).await?;
        let stocks = self.stock_query().find_all(&mut connection).await?;

        Ok(RentalFormDto {
            accounts,
            stocks,
            statuses: RentalStatus::ALL.to_vec(),
        })
    }
}

impl<T> GetRentalFormService for T where
    T: DependOnDatabaseConnection + DependOnAccountQuery + DependOnStockQuery
{
}

async fn ensure_references<T>(
    module: &T,
    connection: &mut TransactionOf<T>,
    stock_id: &StockId,
    employee_id: &EmployeeId,
) -> error_stack::Result<(), KernelError>
where
    T: ?Sized + DependOnAccountQuery + DependOnStockQuery,
{
    if module
        .stock_query()
        .find_by_id(connection, stock_id)
        .await?
        .is_none()
    {
        let message = format!("stock {} does not exist", stock_id.as_ref());
        return Err(Report::new(KernelError::NotFound)
            .attach_printable(FieldError::new("stock_id", message)));
    }
    if module
        .account_query()
        .find_by_employee_id(connection, employee_id)
        .await?
        .is_none()
    {
        let message = format!("employee {} does not exist", employee_id.as_ref());
        return Err(Report::new(KernelError::NotFound)
            .attach_printable(FieldError::new("employee_id", message)));
    }
    Ok(())
}

fn rental_not_found(id: &Uuid) -> Report<KernelError> {
    Report::new(KernelError::NotFound).attach_printable(format!("rental {id} does not exist"))
}

struct Revision {
    stock_id: StockId,
    employee_id: EmployeeId,
    status: RentalStatus,
    expected_rental_on: ExpectedRentalOn,
    expected_return_on: ExpectedReturnOn,
}

// Timestamps are only filled in on the first entry into their status.
// Re-submitting the current status is not an entry.
fn revise(current: Rental, revision: Revision, now: OffsetDateTime) -> Rental {
    let DestructRental {
        id,
        status: previous,
        rentaled_at,
        returned_at,
        canceled_at,
        ..
    } = current.into_destruct();
    let status = revision.status;
    let enters = |target: RentalStatus| previous != target && status == target;
    let rentaled_at =
        rentaled_at.or_else(|| enters(RentalStatus::Renting).then(|| RentaledAt::new(now)));
    let returned_at =
        returned_at.or_else(|| enters(RentalStatus::Returned).then(|| ReturnedAt::new(now)));
    let canceled_at =
        canceled_at.or_else(|| enters(RentalStatus::Canceled).then(|| CanceledAt::new(now)));

    Rental::new(
        id,
        revision.stock_id,
        revision.employee_id,
        status,
        revision.expected_rental_on,
        revision.expected_return_on,
        rentaled_at,
        returned_at,
        canceled_at,
    )
}

// Stored timestamps keep microseconds only.
fn truncate_to_micros(now: OffsetDateTime) -> OffsetDateTime {
    now - Duration::nanoseconds(i64::from(now.nanosecond() % 1_000))
}

#[cfg(test)]
mod test {
    use error_stack::Report;
    use time::macros::{date, datetime};
    use time::Date;
    use uuid::Uuid;

    use kernel::prelude::entity::{
        Account, AccountName, BookTitle, EmployeeId, ExpectedRentalOn, ExpectedReturnOn, Rental,
        RentalId, RentalStatus, Stock, StockId,
    };
    use kernel::{FieldError, KernelError};

    use super::truncate_to_micros;
    use crate::service::memory::InMemoryDatabase;
    use crate::service::{
        CreateRentalService, GetAllRentalService, GetRentalFormService, GetRentalService,
        UpdateRentalService, ValidateTransitionService,
    };
    use crate::transfer::{
        CreateRentalDto, GetRentalDto, UpdateRentalDto, ValidateTransitionDto,
    };

    const STOCK: &str = "S-0001";
    const OTHER_STOCK: &str = "S-0002";
    const EMPLOYEE: &str = "E-1001";

    fn database() -> InMemoryDatabase {
        InMemoryDatabase::new(
            vec![Account::new(
                EmployeeId::new(EMPLOYEE),
                AccountName::new("Hanako"),
            )],
            vec![
                Stock::new(StockId::new(STOCK), BookTitle::new("The Rust Book")),
                Stock::new(StockId::new(OTHER_STOCK), BookTitle::new("Rust for Rustaceans")),
            ],
        )
    }

    fn stored(db: &InMemoryDatabase, status: RentalStatus) -> Rental {
        let rental = Rental::new(
            RentalId::new(Uuid::new_v4()),
            StockId::new(STOCK),
            EmployeeId::new(EMPLOYEE),
            status,
            ExpectedRentalOn::new(date!(2024 - 04 - 01)),
            ExpectedReturnOn::new(date!(2024 - 04 - 08)),
            None,
            None,
            None,
        );
        db.insert(rental.clone());
        rental
    }

    fn edit(rental: &Rental, status: RentalStatus) -> UpdateRentalDto {
        UpdateRentalDto {
            id: *rental.id().as_ref(),
            stock_id: STOCK.to_string(),
            employee_id: EMPLOYEE.to_string(),
            status,
            expected_rental_on: date!(2024 - 04 - 01),
            expected_return_on: date!(2024 - 04 - 08),
        }
    }

    fn create(status: Option<RentalStatus>, rental_on: Date, return_on: Date) -> CreateRentalDto {
        CreateRentalDto {
            stock_id: STOCK.to_string(),
            employee_id: EMPLOYEE.to_string(),
            status,
            expected_rental_on: rental_on,
            expected_return_on: return_on,
        }
    }

    fn field_of(report: &Report<KernelError>) -> Option<&'static str> {
        report.downcast_ref::<FieldError>().map(FieldError::field)
    }

    #[tokio::test]
    async fn create_starts_waiting() -> error_stack::Result<(), KernelError> {
        let db = database();
        let dto = create(
            Some(RentalStatus::Returned),
            date!(2024 - 05 - 01),
            date!(2024 - 05 - 15),
        );
        let rental = db.create_rental(dto).await?;

        assert_eq!(rental.status(), &RentalStatus::RentWait);
        assert_eq!(rental.stock_id(), &StockId::new(STOCK));
        assert_eq!(rental.employee_id(), &EmployeeId::new(EMPLOYEE));
        assert!(rental.rentaled_at().is_none());
        assert!(rental.returned_at().is_none());
        assert!(rental.canceled_at().is_none());
        assert_eq!(db.stored(rental.id()), Some(rental));
        Ok(())
    }

    #[tokio::test]
    async fn create_with_unknown_references() {
        let db = database();

        let mut dto = create(None, date!(2024 - 05 - 01), date!(2024 - 05 - 15));
        dto.stock_id = "missing".to_string();
        let error = db.create_rental(dto).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        assert_eq!(field_of(&error), Some("stock_id"));

        let mut dto = create(None, date!(2024 - 05 - 01), date!(2024 - 05 - 15));
        dto.employee_id = "missing".to_string();
        let error = db.create_rental(dto).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        assert_eq!(field_of(&error), Some("employee_id"));

        assert_eq!(db.count(), 0);
    }

    #[tokio::test]
    async fn create_with_inverted_schedule() {
        let db = database();
        let dto = create(None, date!(2024 - 05 - 15), date!(2024 - 05 - 01));
        let error = db.create_rental(dto).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
        assert_eq!(field_of(&error), Some("expected_return_on"));
        assert_eq!(db.count(), 0);
    }

    #[tokio::test]
    async fn get_unknown_rental() {
        let db = database();
        let error = db
            .get_rental(GetRentalDto { id: Uuid::new_v4() })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
    }

    #[tokio::test]
    async fn get_all_is_sorted() -> error_stack::Result<(), KernelError> {
        let db = database();
        let later = db
            .create_rental(create(None, date!(2024 - 06 - 01), date!(2024 - 06 - 02)))
            .await?;
        let earlier = db
            .create_rental(create(None, date!(2024 - 05 - 01), date!(2024 - 05 - 02)))
            .await?;

        let all = db.get_all_rentals().await?;
        assert_eq!(all, vec![earlier, later]);
        Ok(())
    }

    #[tokio::test]
    async fn waiting_to_returned_is_rejected() {
        let db = database();
        let rental = stored(&db, RentalStatus::RentWait);

        let error = db
            .update_rental(edit(&rental, RentalStatus::Returned))
            .await
            .unwrap_err();

        assert_eq!(error.current_context(), &KernelError::Validation);
        let field = error.downcast_ref::<FieldError>().unwrap();
        assert_eq!(field.field(), "status");
        assert_eq!(
            field.message(),
            "rental status cannot be changed from RENT_WAIT to RETURNED"
        );
        assert_eq!(db.stored(rental.id()), Some(rental));
    }

    #[tokio::test]
    async fn waiting_to_renting_stamps_rentaled_at() -> error_stack::Result<(), KernelError> {
        let db = database();
        let rental = stored(&db, RentalStatus::RentWait);

        let updated = db
            .update_rental(edit(&rental, RentalStatus::Renting))
            .await?;

        assert_eq!(updated.status(), &RentalStatus::Renting);
        assert!(updated.rentaled_at().is_some());
        assert!(updated.returned_at().is_none());
        assert!(updated.canceled_at().is_none());
        assert_eq!(db.stored(rental.id()), Some(updated));
        Ok(())
    }

    #[tokio::test]
    async fn renting_to_canceled_is_rejected() -> error_stack::Result<(), KernelError> {
        let db = database();
        let rental = stored(&db, RentalStatus::RentWait);
        let renting = db
            .update_rental(edit(&rental, RentalStatus::Renting))
            .await?;

        let error = db
            .update_rental(edit(&rental, RentalStatus::Canceled))
            .await
            .unwrap_err();

        assert_eq!(error.current_context(), &KernelError::Validation);
        assert_eq!(field_of(&error), Some("status"));
        assert_eq!(db.stored(rental.id()), Some(renting));
        Ok(())
    }

    #[tokio::test]
    async fn returned_is_terminal() -> error_stack::Result<(), KernelError> {
        let db = database();
        let rental = stored(&db, RentalStatus::Renting);
        let returned = db
            .update_rental(edit(&rental, RentalStatus::Returned))
            .await?;
        assert!(returned.returned_at().is_some());

        for status in [
            RentalStatus::RentWait,
            RentalStatus::Renting,
            RentalStatus::Canceled,
        ] {
            let error = db.update_rental(edit(&rental, status)).await.unwrap_err();
            assert_eq!(error.current_context(), &KernelError::Validation);
            assert_eq!(db.stored(rental.id()).as_ref(), Some(&returned));
        }

        let again = db
            .update_rental(edit(&rental, RentalStatus::Returned))
            .await?;
        assert_eq!(again.status(), &RentalStatus::Returned);
        assert_eq!(again.returned_at(), returned.returned_at());
        Ok(())
    }

    #[tokio::test]
    async fn stamping_happens_once() -> error_stack::Result<(), KernelError> {
        let db = database();
        let rental = stored(&db, RentalStatus::RentWait);

        let first = db
            .update_rental(edit(&rental, RentalStatus::Renting))
            .await?;
        let second = db
            .update_rental(edit(&rental, RentalStatus::Renting))
            .await?;

        assert!(first.rentaled_at().is_some());
        assert_eq!(first.rentaled_at(), second.rentaled_at());
        Ok(())
    }

    #[tokio::test]
    async fn resubmitting_status_does_not_stamp() -> error_stack::Result<(), KernelError> {
        let db = database();
        let rental = stored(&db, RentalStatus::Renting);

        let updated = db
            .update_rental(edit(&rental, RentalStatus::Renting))
            .await?;

        assert_eq!(updated.status(), &RentalStatus::Renting);
        assert!(updated.rentaled_at().is_none());
        assert_eq!(db.stored(rental.id()), Some(updated));
        Ok(())
    }

    #[tokio::test]
    async fn stamp_has_microsecond_precision() -> error_stack::Result<(), KernelError> {
        let db = database();
        let rental = stored(&db, RentalStatus::RentWait);

        let updated = db
            .update_rental(edit(&rental, RentalStatus::Renting))
            .await?;

        let rentaled_at = updated.rentaled_at().as_ref().map(|at| *at.as_ref());
        assert_eq!(rentaled_at.map(|at| at.nanosecond() % 1_000), Some(0));
        Ok(())
    }

    #[test]
    fn truncation_drops_sub_microseconds() {
        let now = datetime!(2024 - 04 - 01 09:30:00.123456789 UTC);
        assert_eq!(
            truncate_to_micros(now),
            datetime!(2024 - 04 - 01 09:30:00.123456 UTC)
        );
    }

    #[tokio::test]
    async fn cancel_waiting_rental() -> error_stack::Result<(), KernelError> {
        let db = database();
        let rental = stored(&db, RentalStatus::RentWait);

        let canceled = db
            .update_rental(edit(&rental, RentalStatus::Canceled))
            .await?;

        assert_eq!(canceled.status(), &RentalStatus::Canceled);
        assert!(canceled.canceled_at().is_some());
        assert!(canceled.rentaled_at().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_editable_fields() -> error_stack::Result<(), KernelError> {
        let db = database();
        let rental = stored(&db, RentalStatus::RentWait);

        let mut dto = edit(&rental, RentalStatus::RentWait);
        dto.stock_id = OTHER_STOCK.to_string();
        dto.expected_rental_on = date!(2024 - 04 - 02);
        dto.expected_return_on = date!(2024 - 04 - 20);
        let updated = db.update_rental(dto).await?;

        assert_eq!(updated.id(), rental.id());
        assert_eq!(updated.stock_id(), &StockId::new(OTHER_STOCK));
        assert_eq!(updated.expected_rental_on().as_ref(), &date!(2024 - 04 - 02));
        assert_eq!(updated.expected_return_on().as_ref(), &date!(2024 - 04 - 20));
        assert!(updated.rentaled_at().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn rejected_update_changes_nothing() {
        let db = database();
        let rental = stored(&db, RentalStatus::RentWait);

        let mut dto = edit(&rental, RentalStatus::Renting);
        dto.stock_id = "missing".to_string();
        let error = db.update_rental(dto).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);

        let mut dto = edit(&rental, RentalStatus::Renting);
        dto.expected_return_on = date!(2024 - 03 - 01);
        let error = db.update_rental(dto).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
        assert_eq!(field_of(&error), Some("expected_return_on"));

        assert_eq!(db.stored(rental.id()), Some(rental));
    }

    #[tokio::test]
    async fn update_unknown_rental() {
        let db = database();
        let dto = UpdateRentalDto {
            id: Uuid::new_v4(),
            stock_id: STOCK.to_string(),
            employee_id: EMPLOYEE.to_string(),
            status: RentalStatus::Renting,
            expected_rental_on: date!(2024 - 04 - 01),
            expected_return_on: date!(2024 - 04 - 08),
        };
        let error = db.update_rental(dto).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        assert_eq!(db.count(), 0);
    }

    #[test]
    fn pre_submission_check() {
        let db = database();
        let allowed = ValidateTransitionDto {
            previous: RentalStatus::RentWait,
            proposed: RentalStatus::Renting,
        };
        assert!(db.validate_transition(allowed).is_ok());

        let denied = ValidateTransitionDto {
            previous: RentalStatus::Canceled,
            proposed: RentalStatus::Renting,
        };
        let error = db.validate_transition(denied).unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
        assert_eq!(field_of(&error), Some("status"));
    }

    #[tokio::test]
    async fn form_lists_choices() -> error_stack::Result<(), KernelError> {
        let db = database();
        let form = db.get_rental_form().await?;
        assert_eq!(form.accounts.len(), 1);
        assert_eq!(form.stocks.len(), 2);
        assert_eq!(form.statuses, RentalStatus::ALL.to_vec());
        Ok(())
    }
}
