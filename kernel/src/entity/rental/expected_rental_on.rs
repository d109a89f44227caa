use serde::{Deserialize, Serialize};
use time::Date;
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct ExpectedRentalOn(Date);

impl ExpectedRentalOn {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }
}
