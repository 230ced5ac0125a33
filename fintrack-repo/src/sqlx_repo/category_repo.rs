use super::{associations, SqlxStore};
use crate::category_repo::CategoryRepoError::{CategoryNotFound, DuplicateName};
use crate::category_repo::{Category, CategoryRepo, CategoryRepoError};
use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;

#[async_trait]
impl CategoryRepo for SqlxStore {
    #[instrument(skip(self))]
    async fn create_category(&self, name: &str) -> Result<Category, CategoryRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE name = $1)")
                .bind(name)
                .fetch_one(&mut *tx)
                .await
                .context("Unable to check category uniqueness")?;
        if taken {
            return Err(DuplicateName(name.to_owned()));
        }

        let id: i32 = sqlx::query_scalar("INSERT INTO categories (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&mut *tx)
            .await
            .context("Unable to insert category")?;

        tx.commit().await.context("Unable to commit transaction")?;

        Ok(Category::new(id, name.to_owned()))
    }

    #[instrument(skip(self))]
    async fn get_category(&self, category_id: i32) -> Result<Category, CategoryRepoError> {
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT id, name FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get category {}", category_id))?;
        row.map(|(id, name)| Category::new(id, name))
            .ok_or(CategoryNotFound(category_id))
    }

    #[instrument(skip(self))]
    async fn get_all_categories(&self) -> Result<Vec<Category>, CategoryRepoError> {
        let rows: Vec<(i32, String)> = sqlx::query_as("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Unable to get categories")?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Category::new(id, name))
            .collect())
    }

    #[instrument(skip(self))]
    async fn rename_category(
        &self,
        category_id: i32,
        name: &str,
    ) -> Result<Category, CategoryRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE name = $1 AND id <> $2)",
        )
        .bind(name)
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await
        .context("Unable to check category uniqueness")?;
        if taken {
            return Err(DuplicateName(name.to_owned()));
        }

        let result = sqlx::query("UPDATE categories SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to rename category {}", category_id))?;
        if result.rows_affected() == 0 {
            return Err(CategoryNotFound(category_id));
        }

        tx.commit().await.context("Unable to commit transaction")?;

        Ok(Category::new(category_id, name.to_owned()))
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, category_id: i32) -> Result<(), CategoryRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        associations::unlink_category(&mut tx, category_id).await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to delete category {}", category_id))?;
        if result.rows_affected() == 0 {
            return Err(CategoryNotFound(category_id));
        }

        tx.commit().await.context("Unable to commit transaction")?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_existing_ids(&self, category_ids: &[i32]) -> Result<Vec<i32>, CategoryRepoError> {
        let existing: Vec<i32> =
            sqlx::query_scalar("SELECT id FROM categories WHERE id = ANY($1) ORDER BY id")
                .bind(category_ids.to_vec())
                .fetch_all(&self.pool)
                .await
                .context("Unable to resolve category ids")?;
        Ok(existing)
    }
}
