use super::{associations, MemStore, State, TransactionRow};
use crate::transaction_repo::TransactionRepoError::TransactionNotFound;
use crate::transaction_repo::{
    CategoryTotal, DailyTotal, NewTransaction, Transaction, TransactionRepo, TransactionRepoError,
    TransactionType, TransactionUpdate,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn assemble(state: &State, row: &TransactionRow) -> Transaction {
    Transaction::new(
        row.id,
        row.amount,
        row.transaction_type,
        row.description.clone(),
        row.date,
        associations::transaction_user_ids(state, row.id),
        associations::transaction_category_names(state, row.id),
    )
}

#[async_trait]
impl TransactionRepo for MemStore {
    async fn get_transaction(
        &self,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let state = self.read_lock()?;

        let row = state
            .transactions
            .get(&transaction_id)
            .ok_or(TransactionNotFound(transaction_id))?;
        Ok(assemble(&state, row))
    }

    async fn get_all_transactions(&self) -> Result<Vec<Transaction>, TransactionRepoError> {
        let state = self.read_lock()?;

        let mut transactions: Vec<Transaction> = state
            .transactions
            .values()
            .map(|row| assemble(&state, row))
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(transactions)
    }

    async fn create_transaction(
        &self,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut state = self.write_lock()?;

        let id = state.next_transaction_id;
        state.next_transaction_id += 1;

        let row = TransactionRow {
            id,
            amount: new_transaction.amount,
            transaction_type: new_transaction.transaction_type,
            description: new_transaction.description,
            date: new_transaction.date,
        };
        state.transactions.insert(id, row.clone());
        associations::link_users(&mut state, id, &new_transaction.user_ids);
        associations::link_categories(&mut state, id, &new_transaction.category_ids);

        Ok(assemble(&state, &row))
    }

    async fn update_transaction(
        &self,
        transaction_id: i32,
        update: TransactionUpdate,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut state = self.write_lock()?;

        let row = state
            .transactions
            .get_mut(&transaction_id)
            .ok_or(TransactionNotFound(transaction_id))?;
        row.amount = update.amount;
        row.transaction_type = update.transaction_type;
        row.description = update.description;
        row.date = update.date;
        let row = row.clone();

        if let Some(user_ids) = &update.user_ids {
            associations::replace_transaction_users(&mut state, transaction_id, user_ids);
        }
        if let Some(category_ids) = &update.category_ids {
            associations::replace_transaction_categories(&mut state, transaction_id, category_ids);
        }

        Ok(assemble(&state, &row))
    }

    async fn delete_transaction(
        &self,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut state = self.write_lock()?;

        let row = state
            .transactions
            .remove(&transaction_id)
            .ok_or(TransactionNotFound(transaction_id))?;
        let transaction = assemble(&state, &row);
        associations::unlink_transaction(&mut state, transaction_id);
        Ok(transaction)
    }

    async fn category_totals(
        &self,
        user_id: i32,
        from: NaiveDateTime,
        until: NaiveDateTime,
        transaction_type: Option<TransactionType>,
        category: Option<String>,
    ) -> Result<Vec<CategoryTotal>, TransactionRepoError> {
        let state = self.read_lock()?;

        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for (id, row) in &state.transactions {
            if !state.user_transactions.contains(&(user_id, *id)) {
                continue;
            }
            if row.date < from || row.date >= until {
                continue;
            }
            if let Some(wanted) = transaction_type {
                if row.transaction_type != wanted {
                    continue;
                }
            }
            for name in associations::transaction_category_names(&state, *id) {
                if let Some(wanted) = &category {
                    if &name != wanted {
                        continue;
                    }
                }
                *totals.entry(name).or_insert(Decimal::ZERO) += row.amount;
            }
        }

        Ok(totals
            .into_iter()
            .map(|(category, total)| CategoryTotal::new(category, total))
            .collect())
    }

    async fn daily_totals(
        &self,
        user_id: i32,
        transaction_type: TransactionType,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<DailyTotal>, TransactionRepoError> {
        let state = self.read_lock()?;

        let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for (id, row) in &state.transactions {
            if !state.user_transactions.contains(&(user_id, *id)) {
                continue;
            }
            if row.date < from || row.date >= until {
                continue;
            }
            if row.transaction_type != transaction_type {
                continue;
            }
            *totals.entry(row.date.date()).or_insert(Decimal::ZERO) += row.amount;
        }

        Ok(totals
            .into_iter()
            .map(|(date, total)| DailyTotal::new(date, total))
            .collect())
    }
}
