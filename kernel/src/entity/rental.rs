mod canceled_at;
mod expected_rental_on;
mod expected_return_on;
mod id;
mod rentaled_at;
mod returned_at;
mod status;

pub use self::{
    canceled_at::*, expected_rental_on::*, expected_return_on::*, id::*, rentaled_at::*,
    returned_at::*, status::*,
};
use destructure::Destructure;
use vodca::References;

use crate::entity::{EmployeeId, StockId};

/// One stock item lent to one account.
///
/// The three timestamps record the first time the rental entered
/// [`RentalStatus::Renting`], [`RentalStatus::Returned`] and
/// [`RentalStatus::Canceled`] respectively.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Rental {
    id: RentalId,
    stock_id: StockId,
    employee_id: EmployeeId,
    status: RentalStatus,
    expected_rental_on: ExpectedRentalOn,
    expected_return_on: ExpectedReturnOn,
    rentaled_at: Option<RentaledAt>,
    returned_at: Option<ReturnedAt>,
    canceled_at: Option<CanceledAt>,
}

impl Rental {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RentalId,
        stock_id: StockId,
        employee_id: EmployeeId,
        status: RentalStatus,
        expected_rental_on: ExpectedRentalOn,
        expected_return_on: ExpectedReturnOn,
        rentaled_at: Option<RentaledAt>,
        returned_at: Option<ReturnedAt>,
        canceled_at: Option<CanceledAt>,
    ) -> Self {
        Self {
            id,
            stock_id,
            employee_id,
            status,
            expected_rental_on,
            expected_return_on,
            rentaled_at,
            returned_at,
            canceled_at,
        }
    }
}
