use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire format for full timestamps.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[async_trait]
pub trait TransactionRepo: Sync + Send {
    async fn get_transaction(
        &self,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;

    /// All transactions, date descending then id descending.
    async fn get_all_transactions(&self) -> Result<Vec<Transaction>, TransactionRepoError>;

    /// Persists the transaction row and both association sets as one atomic
    /// write. Ids in `user_ids`/`category_ids` must already exist.
    async fn create_transaction(
        &self,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    /// Rewrites the transaction row; an association side is replaced
    /// wholesale when its id list is `Some`, untouched when `None`.
    async fn update_transaction(
        &self,
        transaction_id: i32,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionRepoError>;

    /// Removes the transaction and every association pair referencing it.
    async fn delete_transaction(
        &self,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;

    /// Per-category-name sums over the user's transactions in the half-open
    /// interval `[from, until)`, ordered by category name. A transaction
    /// tagged with several categories contributes its full amount to each.
    async fn category_totals(
        &self,
        user_id: i32,
        from: NaiveDateTime,
        until: NaiveDateTime,
        transaction_type: Option<TransactionType>,
        category: Option<String>,
    ) -> Result<Vec<CategoryTotal>, TransactionRepoError>;

    /// Per-calendar-date sums over the user's transactions of the given type
    /// in the half-open interval `[from, until)`, ordered by date ascending.
    async fn daily_totals(
        &self,
        user_id: i32,
        transaction_type: TransactionType,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<DailyTotal>, TransactionRepoError>;
}

#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Revenue,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Expense => write!(f, "expense"),
            TransactionType::Revenue => write!(f, "revenue"),
        }
    }
}

#[derive(Error, Debug)]
#[error("`{0}` is not a valid transaction type")]
pub struct InvalidTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = InvalidTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionType::Expense),
            "revenue" => Ok(TransactionType::Revenue),
            other => Err(InvalidTransactionType(other.to_owned())),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Transaction {
    pub id: i32,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    #[serde(with = "datetime_format")]
    pub date: NaiveDateTime,
    /// Sorted, deduplicated ids of the users sharing this transaction.
    pub user_ids: Vec<i32>,
    /// Sorted names of the categories tagging this transaction.
    pub categories: Vec<String>,
}

impl Transaction {
    pub const fn new(
        id: i32,
        amount: Decimal,
        transaction_type: TransactionType,
        description: Option<String>,
        date: NaiveDateTime,
        user_ids: Vec<i32>,
        categories: Vec<String>,
    ) -> Transaction {
        Transaction {
            id,
            amount,
            transaction_type,
            description,
            date,
            user_ids,
            categories,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub user_ids: Vec<i32>,
    pub category_ids: Vec<i32>,
}

impl NewTransaction {
    pub const fn new(
        amount: Decimal,
        transaction_type: TransactionType,
        description: Option<String>,
        date: NaiveDateTime,
        user_ids: Vec<i32>,
        category_ids: Vec<i32>,
    ) -> NewTransaction {
        NewTransaction {
            amount,
            transaction_type,
            description,
            date,
            user_ids,
            category_ids,
        }
    }
}

/// Full replacement row plus optional association overwrites. The scalar
/// fields are already merged by the caller; `None` on an id list means that
/// side's pairs stay as they are.
#[derive(Clone, Debug)]
pub struct TransactionUpdate {
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub user_ids: Option<Vec<i32>>,
    pub category_ids: Option<Vec<i32>>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

impl CategoryTotal {
    pub const fn new(category: String, total: Decimal) -> CategoryTotal {
        CategoryTotal { category, total }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: Decimal,
}

impl DailyTotal {
    pub const fn new(date: NaiveDate, total: Decimal) -> DailyTotal {
        DailyTotal { date, total }
    }
}

#[derive(Error, Debug)]
pub enum TransactionRepoError {
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub mod datetime_format {
    use super::DATE_TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}
