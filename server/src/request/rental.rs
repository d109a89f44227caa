use application::transfer::{
    CreateRentalDto, GetRentalDto, UpdateRentalDto, ValidateTransitionDto,
};
use kernel::prelude::entity::RentalStatus;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::controller::Intake;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRentalRequest {
    stock_id: String,
    employee_id: String,
    #[serde(default)]
    status: Option<RentalStatus>,
    expected_rental_on: Date,
    expected_return_on: Date,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRentalRequest {
    stock_id: String,
    employee_id: String,
    status: RentalStatus,
    expected_rental_on: Date,
    expected_return_on: Date,
}

#[derive(Debug, Serialize)]
pub struct EditRentalRequest {
    id: Uuid,
    #[serde(flatten)]
    body: UpdateRentalRequest,
}

impl EditRentalRequest {
    pub fn new(id: Uuid, body: UpdateRentalRequest) -> Self {
        Self { id, body }
    }
}

#[derive(Debug, Serialize)]
pub struct GetRentalRequest {
    id: Uuid,
}

impl GetRentalRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransitionRequest {
    previous: RentalStatus,
    proposed: RentalStatus,
}

pub struct RentalTransformer;

impl Intake<CreateRentalRequest> for RentalTransformer {
    type To = CreateRentalDto;
    fn emit(&self, input: CreateRentalRequest) -> Self::To {
        CreateRentalDto {
            stock_id: input.stock_id,
            employee_id: input.employee_id,
            status: input.status,
            expected_rental_on: input.expected_rental_on,
            expected_return_on: input.expected_return_on,
        }
    }
}

impl Intake<EditRentalRequest> for RentalTransformer {
    type To = UpdateRentalDto;
    fn emit(&self, EditRentalRequest { id, body }: EditRentalRequest) -> Self::To {
        UpdateRentalDto {
            id,
            stock_id: body.stock_id,
            employee_id: body.employee_id,
            status: body.status,
            expected_rental_on: body.expected_rental_on,
            expected_return_on: body.expected_return_on,
        }
    }
}

impl Intake<GetRentalRequest> for RentalTransformer {
    type To = GetRentalDto;
    fn emit(&self, input: GetRentalRequest) -> Self::To {
        GetRentalDto { id: input.id }
    }
}

impl Intake<TransitionRequest> for RentalTransformer {
    type To = ValidateTransitionDto;
    fn emit(&self, input: TransitionRequest) -> Self::To {
        ValidateTransitionDto {
            previous: input.previous,
            proposed: input.proposed,
        }
    }
}
