use kernel::prelude::entity::{Account, RentalStatus, Stock};
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct GetRentalDto {
    pub id: Uuid,
}

/// The status is accepted for symmetry with the edit form but a new rental
/// always starts as [`RentalStatus::RentWait`].
#[derive(Debug, Clone)]
pub struct CreateRentalDto {
    pub stock_id: String,
    pub employee_id: String,
    pub status: Option<RentalStatus>,
    pub expected_rental_on: Date,
    pub expected_return_on: Date,
}

#[derive(Debug, Clone)]
pub struct UpdateRentalDto {
    pub id: Uuid,
    pub stock_id: String,
    pub employee_id: String,
    pub status: RentalStatus,
    pub expected_rental_on: Date,
    pub expected_return_on: Date,
}

#[derive(Debug, Clone, Copy)]
pub struct ValidateTransitionDto {
    pub previous: RentalStatus,
    pub proposed: RentalStatus,
}

#[derive(Debug, Clone)]
pub struct RentalFormDto {
    pub accounts: Vec<Account>,
    pub stocks: Vec<Stock>,
    pub statuses: Vec<RentalStatus>,
}
