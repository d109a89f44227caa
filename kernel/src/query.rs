mod account;
mod rental;
mod stock;

pub use self::{account::*, rental::*, stock::*};
