use super::{associations, SqlxStore};
use crate::transaction_repo::TransactionRepoError::TransactionNotFound;
use crate::transaction_repo::{
    CategoryTotal, DailyTotal, NewTransaction, Transaction, TransactionRepo, TransactionRepoError,
    TransactionType, TransactionUpdate,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::QueryBuilder;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct TransactionEntry {
    id: i32,
    amount: Decimal,
    #[sqlx(rename = "type")]
    transaction_type: String,
    description: Option<String>,
    date: NaiveDateTime,
}

impl TransactionEntry {
    fn into_transaction(
        self,
        user_ids: Vec<i32>,
        categories: Vec<String>,
    ) -> Result<Transaction, TransactionRepoError> {
        let transaction_type = TransactionType::from_str(&self.transaction_type)
            .context("Stored transaction type is outside the enumeration")?;
        Ok(Transaction::new(
            self.id,
            self.amount,
            transaction_type,
            self.description,
            self.date,
            user_ids,
            categories,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct CategoryTotalRow {
    category: String,
    total: Option<Decimal>,
}

#[derive(sqlx::FromRow)]
struct DailyTotalRow {
    day: NaiveDate,
    total: Option<Decimal>,
}

#[async_trait]
impl TransactionRepo for SqlxStore {
    #[instrument(skip(self))]
    async fn get_transaction(
        &self,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Unable to acquire connection")?;

        let entry: Option<TransactionEntry> = sqlx::query_as(
            "SELECT id, amount, type, description, date FROM transactions WHERE id = $1",
        )
        .bind(transaction_id)
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("Unable to get transaction {}", transaction_id))?;
        let entry = entry.ok_or(TransactionNotFound(transaction_id))?;

        let user_ids = associations::transaction_user_ids(&mut conn, transaction_id).await?;
        let categories =
            associations::transaction_category_names(&mut conn, transaction_id).await?;

        entry.into_transaction(user_ids, categories)
    }

    #[instrument(skip(self))]
    async fn get_all_transactions(&self) -> Result<Vec<Transaction>, TransactionRepoError> {
        let entries: Vec<TransactionEntry> = sqlx::query_as(
            "SELECT id, amount, type, description, date FROM transactions \
             ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Unable to get transactions")?;

        let user_rows: Vec<(i32, i32)> = sqlx::query_as(
            "SELECT transaction_id, user_id FROM user_transaction ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Unable to get user associations")?;
        let category_rows: Vec<(i32, String)> = sqlx::query_as(
            "SELECT tc.transaction_id, c.name FROM transaction_categories tc \
             JOIN categories c ON c.id = tc.category_id ORDER BY c.name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Unable to get category associations")?;

        let mut users_by_transaction: HashMap<i32, Vec<i32>> = HashMap::new();
        for (transaction_id, user_id) in user_rows {
            users_by_transaction
                .entry(transaction_id)
                .or_default()
                .push(user_id);
        }
        let mut categories_by_transaction: HashMap<i32, Vec<String>> = HashMap::new();
        for (transaction_id, name) in category_rows {
            categories_by_transaction
                .entry(transaction_id)
                .or_default()
                .push(name);
        }

        entries
            .into_iter()
            .map(|entry| {
                let user_ids = users_by_transaction.remove(&entry.id).unwrap_or_default();
                let categories = categories_by_transaction
                    .remove(&entry.id)
                    .unwrap_or_default();
                entry.into_transaction(user_ids, categories)
            })
            .collect()
    }

    #[instrument(skip(self, new_transaction))]
    async fn create_transaction(
        &self,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO transactions (amount, type, description, date) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(new_transaction.amount)
        .bind(new_transaction.transaction_type.to_string())
        .bind(&new_transaction.description)
        .bind(new_transaction.date)
        .fetch_one(&mut *tx)
        .await
        .context("Unable to insert transaction")?;

        associations::link_users(&mut tx, id, &new_transaction.user_ids).await?;
        associations::link_categories(&mut tx, id, &new_transaction.category_ids).await?;
        let user_ids = associations::transaction_user_ids(&mut tx, id).await?;
        let categories = associations::transaction_category_names(&mut tx, id).await?;

        tx.commit().await.context("Unable to commit transaction")?;

        Ok(Transaction::new(
            id,
            new_transaction.amount,
            new_transaction.transaction_type,
            new_transaction.description,
            new_transaction.date,
            user_ids,
            categories,
        ))
    }

    #[instrument(skip(self, update))]
    async fn update_transaction(
        &self,
        transaction_id: i32,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let result = sqlx::query(
            "UPDATE transactions SET amount = $1, type = $2, description = $3, date = $4 \
             WHERE id = $5",
        )
        .bind(update.amount)
        .bind(update.transaction_type.to_string())
        .bind(&update.description)
        .bind(update.date)
        .bind(transaction_id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Unable to update transaction {}", transaction_id))?;
        if result.rows_affected() == 0 {
            return Err(TransactionNotFound(transaction_id));
        }

        if let Some(user_ids) = &update.user_ids {
            associations::replace_transaction_users(&mut tx, transaction_id, user_ids).await?;
        }
        if let Some(category_ids) = &update.category_ids {
            associations::replace_transaction_categories(&mut tx, transaction_id, category_ids)
                .await?;
        }
        let user_ids = associations::transaction_user_ids(&mut tx, transaction_id).await?;
        let categories =
            associations::transaction_category_names(&mut tx, transaction_id).await?;

        tx.commit().await.context("Unable to commit transaction")?;

        Ok(Transaction::new(
            transaction_id,
            update.amount,
            update.transaction_type,
            update.description,
            update.date,
            user_ids,
            categories,
        ))
    }

    #[instrument(skip(self))]
    async fn delete_transaction(
        &self,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let entry: Option<TransactionEntry> = sqlx::query_as(
            "SELECT id, amount, type, description, date FROM transactions WHERE id = $1",
        )
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await
        .with_context(|| format!("Unable to get transaction {}", transaction_id))?;
        let entry = entry.ok_or(TransactionNotFound(transaction_id))?;

        let user_ids = associations::transaction_user_ids(&mut tx, transaction_id).await?;
        let categories =
            associations::transaction_category_names(&mut tx, transaction_id).await?;

        associations::unlink_transaction(&mut tx, transaction_id).await?;
        sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(transaction_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to delete transaction {}", transaction_id))?;

        tx.commit().await.context("Unable to commit transaction")?;

        entry.into_transaction(user_ids, categories)
    }

    #[instrument(skip(self))]
    async fn category_totals(
        &self,
        user_id: i32,
        from: NaiveDateTime,
        until: NaiveDateTime,
        transaction_type: Option<TransactionType>,
        category: Option<String>,
    ) -> Result<Vec<CategoryTotal>, TransactionRepoError> {
        let mut query_builder = QueryBuilder::new(
            "SELECT c.name AS category, SUM(t.amount) AS total \
             FROM transactions t \
             JOIN user_transaction ut ON ut.transaction_id = t.id \
             JOIN transaction_categories tc ON tc.transaction_id = t.id \
             JOIN categories c ON c.id = tc.category_id \
             WHERE ut.user_id = ",
        );
        query_builder.push_bind(user_id);
        query_builder.push(" AND t.date >= ").push_bind(from);
        query_builder.push(" AND t.date < ").push_bind(until);
        if let Some(transaction_type) = transaction_type {
            query_builder
                .push(" AND t.type = ")
                .push_bind(transaction_type.to_string());
        }
        if let Some(category) = category {
            query_builder.push(" AND c.name = ").push_bind(category);
        }
        query_builder.push(" GROUP BY c.name ORDER BY c.name");
        let query = query_builder.build_query_as();

        let rows: Vec<CategoryTotalRow> = query
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get category totals for user {}", user_id))?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryTotal::new(row.category, row.total.unwrap_or(Decimal::ZERO)))
            .collect())
    }

    #[instrument(skip(self))]
    async fn daily_totals(
        &self,
        user_id: i32,
        transaction_type: TransactionType,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<DailyTotal>, TransactionRepoError> {
        let rows: Vec<DailyTotalRow> = sqlx::query_as(
            "SELECT CAST(t.date AS DATE) AS day, SUM(t.amount) AS total \
             FROM transactions t \
             JOIN user_transaction ut ON ut.transaction_id = t.id \
             WHERE ut.user_id = $1 AND t.type = $2 AND t.date >= $3 AND t.date < $4 \
             GROUP BY day ORDER BY day",
        )
        .bind(user_id)
        .bind(transaction_type.to_string())
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get daily totals for user {}", user_id))?;

        Ok(rows
            .into_iter()
            .map(|row| DailyTotal::new(row.day, row.total.unwrap_or(Decimal::ZERO)))
            .collect())
    }
}
