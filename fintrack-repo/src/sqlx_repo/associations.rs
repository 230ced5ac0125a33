//! Junction-table statements. Every mutation of `user_transaction` and
//! `transaction_categories` goes through here, always inside the caller's
//! SQL transaction so entity rows and their pairs commit together.

use anyhow::Context;
use sqlx::PgConnection;

pub(super) async fn link_users(
    conn: &mut PgConnection,
    transaction_id: i32,
    user_ids: &[i32],
) -> Result<(), anyhow::Error> {
    sqlx::query(
        "INSERT INTO user_transaction (user_id, transaction_id) \
         SELECT user_id, $2 FROM UNNEST($1::int4[]) AS user_id \
         ON CONFLICT DO NOTHING",
    )
    .bind(user_ids.to_vec())
    .bind(transaction_id)
    .execute(conn)
    .await
    .with_context(|| format!("Unable to link users to transaction {}", transaction_id))?;
    Ok(())
}

pub(super) async fn link_categories(
    conn: &mut PgConnection,
    transaction_id: i32,
    category_ids: &[i32],
) -> Result<(), anyhow::Error> {
    sqlx::query(
        "INSERT INTO transaction_categories (transaction_id, category_id) \
         SELECT $2, category_id FROM UNNEST($1::int4[]) AS category_id \
         ON CONFLICT DO NOTHING",
    )
    .bind(category_ids.to_vec())
    .bind(transaction_id)
    .execute(conn)
    .await
    .with_context(|| format!("Unable to link categories to transaction {}", transaction_id))?;
    Ok(())
}

pub(super) async fn replace_transaction_users(
    conn: &mut PgConnection,
    transaction_id: i32,
    user_ids: &[i32],
) -> Result<(), anyhow::Error> {
    sqlx::query("DELETE FROM user_transaction WHERE transaction_id = $1")
        .bind(transaction_id)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Unable to clear users of transaction {}", transaction_id))?;
    link_users(conn, transaction_id, user_ids).await
}

pub(super) async fn replace_transaction_categories(
    conn: &mut PgConnection,
    transaction_id: i32,
    category_ids: &[i32],
) -> Result<(), anyhow::Error> {
    sqlx::query("DELETE FROM transaction_categories WHERE transaction_id = $1")
        .bind(transaction_id)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Unable to clear categories of transaction {}", transaction_id))?;
    link_categories(conn, transaction_id, category_ids).await
}

/// Cascade for a user deletion: drop every pairing the user owned.
pub(super) async fn unlink_user(conn: &mut PgConnection, user_id: i32) -> Result<(), anyhow::Error> {
    sqlx::query("DELETE FROM user_transaction WHERE user_id = $1")
        .bind(user_id)
        .execute(conn)
        .await
        .with_context(|| format!("Unable to unlink user {}", user_id))?;
    Ok(())
}

/// Cascade for a category deletion.
pub(super) async fn unlink_category(
    conn: &mut PgConnection,
    category_id: i32,
) -> Result<(), anyhow::Error> {
    sqlx::query("DELETE FROM transaction_categories WHERE category_id = $1")
        .bind(category_id)
        .execute(conn)
        .await
        .with_context(|| format!("Unable to unlink category {}", category_id))?;
    Ok(())
}

/// Cascade for a transaction deletion: both sides go.
pub(super) async fn unlink_transaction(
    conn: &mut PgConnection,
    transaction_id: i32,
) -> Result<(), anyhow::Error> {
    sqlx::query("DELETE FROM user_transaction WHERE transaction_id = $1")
        .bind(transaction_id)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Unable to unlink users of transaction {}", transaction_id))?;
    sqlx::query("DELETE FROM transaction_categories WHERE transaction_id = $1")
        .bind(transaction_id)
        .execute(conn)
        .await
        .with_context(|| format!("Unable to unlink categories of transaction {}", transaction_id))?;
    Ok(())
}

pub(super) async fn transaction_user_ids(
    conn: &mut PgConnection,
    transaction_id: i32,
) -> Result<Vec<i32>, anyhow::Error> {
    let user_ids: Vec<i32> = sqlx::query_scalar(
        "SELECT user_id FROM user_transaction WHERE transaction_id = $1 ORDER BY user_id",
    )
    .bind(transaction_id)
    .fetch_all(conn)
    .await
    .with_context(|| format!("Unable to get users of transaction {}", transaction_id))?;
    Ok(user_ids)
}

pub(super) async fn transaction_category_names(
    conn: &mut PgConnection,
    transaction_id: i32,
) -> Result<Vec<String>, anyhow::Error> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT c.name FROM transaction_categories tc \
         JOIN categories c ON c.id = tc.category_id \
         WHERE tc.transaction_id = $1 ORDER BY c.name",
    )
    .bind(transaction_id)
    .fetch_all(conn)
    .await
    .with_context(|| format!("Unable to get categories of transaction {}", transaction_id))?;
    Ok(names)
}
