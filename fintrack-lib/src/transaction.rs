use chrono::{NaiveDateTime, Utc};
use fintrack_repo::category_repo::{CategoryRepo, CategoryRepoError};
use fintrack_repo::transaction_repo::{
    InvalidTransactionType, NewTransaction, Transaction, TransactionRepo, TransactionRepoError,
    TransactionType, TransactionUpdate, DATE_TIME_FORMAT,
};
use fintrack_repo::user_repo::{UserRepo, UserRepoError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Create payload. The type arrives as free text and is validated against the
/// enumeration; the date arrives as `YYYY-MM-DD HH:MM:SS` and defaults to the
/// current UTC time when absent.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TransactionRequest {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    pub user_ids: Vec<i32>,
    pub category_ids: Vec<i32>,
}

/// Partial update. Field presence is the update signal; an absent or empty
/// id list leaves that association side untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TransactionPatch {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(rename = "type", default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub user_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub category_ids: Option<Vec<i32>>,
}

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error(transparent)]
    InvalidType(#[from] InvalidTransactionType),
    #[error("Invalid date `{0}`, expected format {DATE_TIME_FORMAT}")]
    InvalidDateFormat(String),
    #[error("None of the given user ids exist")]
    NoValidUsers,
    #[error("None of the given category ids exist")]
    NoValidCategories,
    #[error("Transaction with id {0} not found")]
    NotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TransactionRepoError> for TransactionError {
    fn from(error: TransactionRepoError) -> Self {
        match error {
            TransactionRepoError::TransactionNotFound(id) => TransactionError::NotFound(id),
            TransactionRepoError::Other(e) => TransactionError::Other(e),
        }
    }
}

impl From<UserRepoError> for TransactionError {
    fn from(error: UserRepoError) -> Self {
        TransactionError::Other(error.into())
    }
}

impl From<CategoryRepoError> for TransactionError {
    fn from(error: CategoryRepoError) -> Self {
        TransactionError::Other(error.into())
    }
}

pub struct TransactionService {
    transaction_repo: Arc<dyn TransactionRepo>,
    user_repo: Arc<dyn UserRepo>,
    category_repo: Arc<dyn CategoryRepo>,
}

impl TransactionService {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepo>,
        user_repo: Arc<dyn UserRepo>,
        category_repo: Arc<dyn CategoryRepo>,
    ) -> TransactionService {
        TransactionService {
            transaction_repo,
            user_repo,
            category_repo,
        }
    }

    pub async fn create(
        &self,
        request: TransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        let transaction_type: TransactionType = request.transaction_type.parse()?;
        let date = match &request.date {
            Some(date) => parse_date_time(date)?,
            None => Utc::now().naive_utc(),
        };

        // Unknown ids are dropped; the operation only fails when nothing
        // resolves at all.
        let user_ids = self.user_repo.find_existing_ids(&request.user_ids).await?;
        if user_ids.is_empty() {
            return Err(TransactionError::NoValidUsers);
        }
        let category_ids = self
            .category_repo
            .find_existing_ids(&request.category_ids)
            .await?;
        if category_ids.is_empty() {
            return Err(TransactionError::NoValidCategories);
        }

        let new_transaction = NewTransaction::new(
            request.amount,
            transaction_type,
            request.description,
            date,
            user_ids,
            category_ids,
        );
        let transaction = self
            .transaction_repo
            .create_transaction(new_transaction)
            .await?;
        info!(transaction_id = transaction.id, "Created transaction");
        Ok(transaction)
    }

    pub async fn get(&self, transaction_id: i32) -> Result<Transaction, TransactionError> {
        let transaction = self.transaction_repo.get_transaction(transaction_id).await?;
        Ok(transaction)
    }

    pub async fn list(&self) -> Result<Vec<Transaction>, TransactionError> {
        let transactions = self.transaction_repo.get_all_transactions().await?;
        Ok(transactions)
    }

    pub async fn update(
        &self,
        transaction_id: i32,
        patch: TransactionPatch,
    ) -> Result<Transaction, TransactionError> {
        // Validate before touching the store so a rejected patch leaves the
        // stored transaction exactly as it was.
        let transaction_type = patch
            .transaction_type
            .as_deref()
            .map(|t| t.parse::<TransactionType>())
            .transpose()?;
        let date = patch.date.as_deref().map(parse_date_time).transpose()?;

        let existing = self.transaction_repo.get_transaction(transaction_id).await?;

        let user_ids = match &patch.user_ids {
            Some(user_ids) if !user_ids.is_empty() => {
                let resolved = self.user_repo.find_existing_ids(user_ids).await?;
                if resolved.is_empty() {
                    return Err(TransactionError::NoValidUsers);
                }
                Some(resolved)
            }
            _ => None,
        };
        let category_ids = match &patch.category_ids {
            Some(category_ids) if !category_ids.is_empty() => {
                let resolved = self.category_repo.find_existing_ids(category_ids).await?;
                if resolved.is_empty() {
                    return Err(TransactionError::NoValidCategories);
                }
                Some(resolved)
            }
            _ => None,
        };

        let update = TransactionUpdate {
            amount: patch.amount.unwrap_or(existing.amount),
            transaction_type: transaction_type.unwrap_or(existing.transaction_type),
            description: patch.description.or(existing.description),
            date: date.unwrap_or(existing.date),
            user_ids,
            category_ids,
        };
        let transaction = self
            .transaction_repo
            .update_transaction(transaction_id, update)
            .await?;
        Ok(transaction)
    }

    pub async fn delete(&self, transaction_id: i32) -> Result<Transaction, TransactionError> {
        let transaction = self
            .transaction_repo
            .delete_transaction(transaction_id)
            .await?;
        info!(transaction_id, "Deleted transaction");
        Ok(transaction)
    }
}

fn parse_date_time(date: &str) -> Result<NaiveDateTime, TransactionError> {
    NaiveDateTime::parse_from_str(date, DATE_TIME_FORMAT)
        .map_err(|_| TransactionError::InvalidDateFormat(date.to_owned()))
}
