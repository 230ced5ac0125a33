use chrono::{NaiveDate, NaiveDateTime};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use fintrack_repo::transaction_repo::{NewTransaction, TransactionType};
use rust_decimal::Decimal;

#[allow(dead_code)]
pub fn date_time(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, min, sec)
        .unwrap()
}

#[allow(dead_code)]
pub fn generate_new_transaction(user_ids: Vec<i32>, category_ids: Vec<i32>) -> NewTransaction {
    generate_new_transaction_with(
        Decimal::from((1..500).fake::<i64>()),
        TransactionType::Expense,
        date_time(2025, 2, 10, 9, 30, 0),
        user_ids,
        category_ids,
    )
}

#[allow(dead_code)]
pub fn generate_new_transaction_with_date(
    date: NaiveDateTime,
    user_ids: Vec<i32>,
    category_ids: Vec<i32>,
) -> NewTransaction {
    generate_new_transaction_with(
        Decimal::from((1..500).fake::<i64>()),
        TransactionType::Expense,
        date,
        user_ids,
        category_ids,
    )
}

#[allow(dead_code)]
pub fn generate_new_transaction_with(
    amount: Decimal,
    transaction_type: TransactionType,
    date: NaiveDateTime,
    user_ids: Vec<i32>,
    category_ids: Vec<i32>,
) -> NewTransaction {
    NewTransaction::new(
        amount,
        transaction_type,
        Some(Sentence(3..8).fake()),
        date,
        user_ids,
        category_ids,
    )
}
