use application::transfer::RentalFormDto;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kernel::prelude::entity::{
    AccountName, BookTitle, DestructAccount, DestructRental, DestructStock, EmployeeId,
    ExpectedRentalOn, ExpectedReturnOn, Rental, RentalId, RentalStatus, StockId,
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::controller::Exhaust;

#[derive(Debug, Serialize)]
pub struct RentalResponse {
    id: RentalId,
    stock_id: StockId,
    employee_id: EmployeeId,
    status: RentalStatus,
    expected_rental_on: ExpectedRentalOn,
    expected_return_on: ExpectedReturnOn,
    #[serde(with = "time::serde::rfc3339::option")]
    rentaled_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    returned_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    canceled_at: Option<OffsetDateTime>,
}

impl From<Rental> for RentalResponse {
    fn from(rental: Rental) -> Self {
        let DestructRental {
            id,
            stock_id,
            employee_id,
            status,
            expected_rental_on,
            expected_return_on,
            rentaled_at,
            returned_at,
            canceled_at,
        } = rental.into_destruct();
        Self {
            id,
            stock_id,
            employee_id,
            status,
            expected_rental_on,
            expected_return_on,
            rentaled_at: rentaled_at.map(OffsetDateTime::from),
            returned_at: returned_at.map(OffsetDateTime::from),
            canceled_at: canceled_at.map(OffsetDateTime::from),
        }
    }
}

impl IntoResponse for RentalResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedRentalResponse(RentalResponse);

impl IntoResponse for CreatedRentalResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    employee_id: EmployeeId,
    name: AccountName,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    id: StockId,
    title: BookTitle,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    value: RentalStatus,
    ordinal: i32,
    label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RentalFormResponse {
    accounts: Vec<AccountResponse>,
    stocks: Vec<StockResponse>,
    statuses: Vec<StatusResponse>,
}

pub struct RentalPresenter;

impl Exhaust<()> for RentalPresenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}

impl Exhaust<Rental> for RentalPresenter {
    type To = RentalResponse;
    fn emit(&self, output: Rental) -> Self::To {
        RentalResponse::from(output)
    }
}

impl Exhaust<Vec<Rental>> for RentalPresenter {
    type To = Json<Vec<RentalResponse>>;
    fn emit(&self, output: Vec<Rental>) -> Self::To {
        let result = output
            .into_iter()
            .map(RentalResponse::from)
            .collect::<Vec<_>>();
        Json::from(result)
    }
}

impl Exhaust<RentalFormDto> for RentalPresenter {
    type To = Json<RentalFormResponse>;
    fn emit(&self, output: RentalFormDto) -> Self::To {
        let accounts = output
            .accounts
            .into_iter()
            .map(|account| {
                let DestructAccount { employee_id, name } = account.into_destruct();
                AccountResponse { employee_id, name }
            })
            .collect();
        let stocks = output
            .stocks
            .into_iter()
            .map(|stock| {
                let DestructStock { id, title } = stock.into_destruct();
                StockResponse { id, title }
            })
            .collect();
        let statuses = output
            .statuses
            .into_iter()
            .map(|status| StatusResponse {
                value: status,
                ordinal: status.ordinal(),
                label: status.label(),
            })
            .collect();
        Json::from(RentalFormResponse {
            accounts,
            stocks,
            statuses,
        })
    }
}

pub struct CreatedRentalPresenter;

impl Exhaust<Rental> for CreatedRentalPresenter {
    type To = CreatedRentalResponse;
    fn emit(&self, output: Rental) -> Self::To {
        CreatedRentalResponse(RentalResponse::from(output))
    }
}
