mod employee_id;
mod name;

pub use self::{employee_id::*, name::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct Account {
    employee_id: EmployeeId,
    name: AccountName,
}

impl Account {
    pub fn new(employee_id: EmployeeId, name: AccountName) -> Self {
        Self { employee_id, name }
    }
}
