use crate::category_repo::{Category, CategoryRepo};
use crate::transaction_repo::{TransactionRepo, TransactionType};
use crate::user_repo::{User, UserRepo};
use crate::HealthCheck;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod associations;
mod category_repo;
mod transaction_repo;
mod user_repo;

/// Everything lives behind one lock so that a logical operation spanning an
/// entity row and its association pairs is a single atomic mutation.
struct State {
    users: HashMap<i32, User>,
    categories: HashMap<i32, Category>,
    transactions: HashMap<i32, TransactionRow>,
    user_transactions: BTreeSet<(i32, i32)>,
    transaction_categories: BTreeSet<(i32, i32)>,
    next_user_id: i32,
    next_category_id: i32,
    next_transaction_id: i32,
}

#[derive(Clone)]
struct TransactionRow {
    id: i32,
    amount: Decimal,
    transaction_type: TransactionType,
    description: Option<String>,
    date: NaiveDateTime,
}

pub struct MemStore {
    state: RwLock<State>,
}

impl MemStore {
    pub fn new() -> MemStore {
        let state = State {
            users: HashMap::new(),
            categories: HashMap::new(),
            transactions: HashMap::new(),
            user_transactions: BTreeSet::new(),
            transaction_categories: BTreeSet::new(),
            next_user_id: 1,
            next_category_id: 1,
            next_transaction_id: 1,
        };
        MemStore {
            state: RwLock::new(state),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemStore {
    fn default() -> Self {
        MemStore::new()
    }
}

#[async_trait]
impl HealthCheck for MemStore {
    async fn check(&self) -> bool {
        self.read_lock().is_ok()
    }
}

pub fn create_repos() -> (Arc<dyn UserRepo>, Arc<dyn CategoryRepo>, Arc<dyn TransactionRepo>) {
    let store = Arc::new(MemStore::new());
    (
        Arc::clone(&store) as Arc<dyn UserRepo>,
        Arc::clone(&store) as Arc<dyn CategoryRepo>,
        store as Arc<dyn TransactionRepo>,
    )
}
