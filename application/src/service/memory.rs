use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{
    AccountQuery, DependOnAccountQuery, DependOnRentalQuery, DependOnStockQuery, RentalQuery,
    StockQuery,
};
use kernel::interface::update::{DependOnRentalModifier, RentalModifier};
use kernel::prelude::entity::{Account, EmployeeId, Rental, RentalId, Stock, StockId};
use kernel::KernelError;

type Rentals = HashMap<RentalId, Rental>;

pub struct InMemoryDatabase {
    rentals: Arc<Mutex<Rentals>>,
    accounts: Vec<Account>,
    stocks: Vec<Stock>,
}

impl InMemoryDatabase {
    pub fn new(accounts: Vec<Account>, stocks: Vec<Stock>) -> Self {
        Self {
            rentals: Arc::default(),
            accounts,
            stocks,
        }
    }

    pub fn insert(&self, rental: Rental) {
        self.rentals
            .lock()
            .unwrap()
            .insert(rental.id().clone(), rental);
    }

    pub fn stored(&self, id: &RentalId) -> Option<Rental> {
        self.rentals.lock().unwrap().get(id).cloned()
    }

    pub fn count(&self) -> usize {
        self.rentals.lock().unwrap().len()
    }
}

/// Writes stay in `staged` until commit.
pub struct InMemoryTransaction {
    store: Arc<Mutex<Rentals>>,
    staged: Rentals,
    accounts: Vec<Account>,
    stocks: Vec<Stock>,
}

#[async_trait::async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.store.lock().unwrap().extend(self.staged);
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for InMemoryDatabase {
    type Transaction = InMemoryTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        Ok(InMemoryTransaction {
            store: Arc::clone(&self.rentals),
            staged: Rentals::new(),
            accounts: self.accounts.clone(),
            stocks: self.stocks.clone(),
        })
    }
}

pub struct InMemoryRepository;

#[async_trait::async_trait]
impl RentalQuery for InMemoryRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &RentalId,
    ) -> error_stack::Result<Option<Rental>, KernelError> {
        let staged = con.staged.get(id).cloned();
        Ok(staged.or_else(|| con.store.lock().unwrap().get(id).cloned()))
    }

    async fn find_all(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<Vec<Rental>, KernelError> {
        let mut all = con.store.lock().unwrap().clone();
        all.extend(con.staged.clone());
        let mut rentals = all.into_values().collect::<Vec<_>>();
        rentals.sort_by_key(|rental| {
            (
                *rental.expected_rental_on().as_ref(),
                *rental.id().as_ref(),
            )
        });
        Ok(rentals)
    }
}

#[async_trait::async_trait]
impl RentalModifier for InMemoryRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut Self::Transaction,
        rental: &Rental,
    ) -> error_stack::Result<(), KernelError> {
        con.staged.insert(rental.id().clone(), rental.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut Self::Transaction,
        rental: &Rental,
    ) -> error_stack::Result<(), KernelError> {
        con.staged.insert(rental.id().clone(), rental.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountQuery for InMemoryRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_employee_id(
        &self,
        con: &mut Self::Transaction,
        employee_id: &EmployeeId,
    ) -> error_stack::Result<Option<Account>, KernelError> {
        Ok(con
            .accounts
            .iter()
            .find(|account| account.employee_id() == employee_id)
            .cloned())
    }

    async fn find_all(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<Vec<Account>, KernelError> {
        Ok(con.accounts.clone())
    }
}

#[async_trait::async_trait]
impl StockQuery for InMemoryRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &StockId,
    ) -> error_stack::Result<Option<Stock>, KernelError> {
        Ok(con.stocks.iter().find(|stock| stock.id() == id).cloned())
    }

    async fn find_all(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<Vec<Stock>, KernelError> {
        Ok(con.stocks.clone())
    }
}

impl DependOnRentalQuery for InMemoryDatabase {
    type RentalQuery = InMemoryRepository;
    fn rental_query(&self) -> &Self::RentalQuery {
        &InMemoryRepository
    }
}

impl DependOnRentalModifier for InMemoryDatabase {
    type RentalModifier = InMemoryRepository;
    fn rental_modifier(&self) -> &Self::RentalModifier {
        &InMemoryRepository
    }
}

impl DependOnAccountQuery for InMemoryDatabase {
    type AccountQuery = InMemoryRepository;
    fn account_query(&self) -> &Self::AccountQuery {
        &InMemoryRepository
    }
}

impl DependOnStockQuery for InMemoryDatabase {
    type StockQuery = InMemoryRepository;
    fn stock_query(&self) -> &Self::StockQuery {
        &InMemoryRepository
    }
}
