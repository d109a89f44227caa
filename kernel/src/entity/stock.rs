mod id;
mod title;

pub use self::{id::*, title::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

/// One physical copy of a book that can be lent out.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure)]
pub struct Stock {
    id: StockId,
    title: BookTitle,
}

impl Stock {
    pub fn new(id: StockId, title: BookTitle) -> Self {
        Self { id, title }
    }
}
