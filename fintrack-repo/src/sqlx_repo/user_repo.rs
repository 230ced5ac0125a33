use super::{associations, SqlxStore};
use crate::user_repo::UserRepoError::{DuplicateEmail, DuplicateUsername, UserNotFound};
use crate::user_repo::{NewUser, User, UserRepo, UserRepoError, UserUpdate};
use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct UserEntry {
    id: i32,
    username: String,
    email: String,
    password_hash: String,
    about_me: Option<String>,
}

impl From<UserEntry> for User {
    fn from(value: UserEntry) -> Self {
        User::new(
            value.id,
            value.username,
            value.email,
            value.password_hash,
            value.about_me,
        )
    }
}

#[async_trait]
impl UserRepo for SqlxStore {
    #[instrument(skip(self, new_user))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let email_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(&new_user.email)
                .fetch_one(&mut *tx)
                .await
                .context("Unable to check email uniqueness")?;
        if email_taken {
            return Err(DuplicateEmail(new_user.email));
        }
        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(&new_user.username)
                .fetch_one(&mut *tx)
                .await
                .context("Unable to check username uniqueness")?;
        if username_taken {
            return Err(DuplicateUsername(new_user.username));
        }

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash, about_me) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.about_me)
        .fetch_one(&mut *tx)
        .await
        .context("Unable to insert user")?;

        tx.commit().await.context("Unable to commit transaction")?;

        Ok(new_user.to_user(id))
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i32) -> Result<User, UserRepoError> {
        let entry: Option<UserEntry> = sqlx::query_as(
            "SELECT id, username, email, password_hash, about_me FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get user {}", user_id))?;
        entry.map(|e| e.into()).ok_or(UserNotFound(user_id))
    }

    #[instrument(skip(self))]
    async fn get_all_users(&self) -> Result<Vec<User>, UserRepoError> {
        let entries: Vec<UserEntry> = sqlx::query_as(
            "SELECT id, username, email, password_hash, about_me FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Unable to get users")?;
        Ok(entries.into_iter().map(|e| e.into()).collect())
    }

    #[instrument(skip(self, update))]
    async fn update_user(&self, user_id: i32, update: UserUpdate) -> Result<User, UserRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let entry: Option<UserEntry> = sqlx::query_as(
            "SELECT id, username, email, password_hash, about_me FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .with_context(|| format!("Unable to get user {}", user_id))?;
        let mut user: User = entry.ok_or(UserNotFound(user_id))?.into();

        if let Some(email) = &update.email {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
            )
            .bind(email)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .context("Unable to check email uniqueness")?;
            if taken {
                return Err(DuplicateEmail(email.clone()));
            }
        }
        if let Some(username) = &update.username {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 AND id <> $2)",
            )
            .bind(username)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .context("Unable to check username uniqueness")?;
            if taken {
                return Err(DuplicateUsername(username.clone()));
            }
        }

        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(about_me) = update.about_me {
            user.about_me = Some(about_me);
        }

        sqlx::query(
            "UPDATE users SET username = $1, email = $2, password_hash = $3, about_me = $4 \
             WHERE id = $5",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.about_me)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Unable to update user {}", user_id))?;

        tx.commit().await.context("Unable to commit transaction")?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i32) -> Result<(), UserRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        associations::unlink_user(&mut tx, user_id).await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to delete user {}", user_id))?;
        if result.rows_affected() == 0 {
            return Err(UserNotFound(user_id));
        }

        tx.commit().await.context("Unable to commit transaction")?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_existing_ids(&self, user_ids: &[i32]) -> Result<Vec<i32>, UserRepoError> {
        let existing: Vec<i32> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = ANY($1) ORDER BY id")
                .bind(user_ids.to_vec())
                .fetch_all(&self.pool)
                .await
                .context("Unable to resolve user ids")?;
        Ok(existing)
    }
}
