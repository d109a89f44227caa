use std::fmt::Display;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

/// Lifecycle state of a rental.
///
/// The discriminants are persisted, so they must never be renumbered.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RentalStatus {
    RentWait = 0,
    Renting = 1,
    Returned = 2,
    Canceled = 3,
}

impl RentalStatus {
    pub const ALL: [RentalStatus; 4] = [
        RentalStatus::RentWait,
        RentalStatus::Renting,
        RentalStatus::Returned,
        RentalStatus::Canceled,
    ];

    pub fn ordinal(&self) -> i32 {
        *self as i32
    }

    pub fn name(&self) -> &'static str {
        match self {
            RentalStatus::RentWait => "RENT_WAIT",
            RentalStatus::Renting => "RENTING",
            RentalStatus::Returned => "RETURNED",
            RentalStatus::Canceled => "CANCELED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RentalStatus::RentWait => "Awaiting rental",
            RentalStatus::Renting => "On loan",
            RentalStatus::Returned => "Returned",
            RentalStatus::Canceled => "Canceled",
        }
    }
}

impl Display for RentalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<RentalStatus> for i32 {
    fn from(value: RentalStatus) -> Self {
        value.ordinal()
    }
}

impl TryFrom<i32> for RentalStatus {
    type Error = Report<KernelError>;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        RentalStatus::ALL
            .into_iter()
            .find(|status| status.ordinal() == value)
            .ok_or_else(|| {
                Report::new(KernelError::Internal)
                    .attach_printable(format!("Unknown rental status ordinal: {value}"))
            })
    }
}
