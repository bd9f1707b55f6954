//! Exhibitor repository for database operations.

use crate::entities::{CreateExhibitorRequest, DocumentKind, Exhibitor};
use crate::types::DatabaseResult;
use sqlx::SqlitePool;

const EXHIBITOR_COLUMNS: &str = "id, user_id, company, contact_name, email, phone, \
     registry_document_url, pledge_document_url, created_at";

/// Repository for exhibitor database operations
pub struct ExhibitorRepository {
    pool: SqlitePool,
}

impl ExhibitorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateExhibitorRequest) -> DatabaseResult<Exhibitor> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO exhibitors (user_id, company, contact_name, email, phone, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(request.user_id)
        .bind(&request.company)
        .bind(&request.contact_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let exhibitor = self
            .find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)?;
        Ok(exhibitor)
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Exhibitor>> {
        let exhibitor = sqlx::query_as::<_, Exhibitor>(&format!(
            "SELECT {EXHIBITOR_COLUMNS} FROM exhibitors WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exhibitor)
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> DatabaseResult<Option<Exhibitor>> {
        let exhibitor = sqlx::query_as::<_, Exhibitor>(&format!(
            "SELECT {EXHIBITOR_COLUMNS} FROM exhibitors WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exhibitor)
    }

    /// Attach a compliance document URL to its slot. Returns false when the
    /// exhibitor row does not exist.
    pub async fn set_document_url(
        &self,
        id: i64,
        kind: DocumentKind,
        url: &str,
    ) -> DatabaseResult<bool> {
        let statement = match kind {
            DocumentKind::Registry => "UPDATE exhibitors SET registry_document_url = ? WHERE id = ?",
            DocumentKind::Pledge => "UPDATE exhibitors SET pledge_document_url = ? WHERE id = ?",
        };

        let result = sqlx::query(statement)
            .bind(url)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_pool, seed_user};

    fn exhibitor_request(user_id: i64) -> CreateExhibitorRequest {
        CreateExhibitorRequest {
            user_id,
            company: "Yamada Foods".to_string(),
            contact_name: "Yamada Taro".to_string(),
            email: "taro@yamada-foods.example".to_string(),
            phone: "06-9876-5432".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_attach_documents() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = seed_user(&pool, "taro@yamada-foods.example").await;
        let repo = ExhibitorRepository::new(pool);

        let exhibitor = repo.create(&exhibitor_request(user_id)).await.unwrap();
        assert!(exhibitor.registry_document_url.is_none());

        assert!(repo
            .set_document_url(exhibitor.id, DocumentKind::Registry, "https://files.example/registry.pdf")
            .await
            .unwrap());
        assert!(repo
            .set_document_url(exhibitor.id, DocumentKind::Pledge, "https://files.example/pledge.pdf")
            .await
            .unwrap());

        let updated = repo.find_by_id(exhibitor.id).await.unwrap().unwrap();
        assert_eq!(
            updated.registry_document_url.as_deref(),
            Some("https://files.example/registry.pdf")
        );
        assert_eq!(
            updated.pledge_document_url.as_deref(),
            Some("https://files.example/pledge.pdf")
        );
    }

    #[tokio::test]
    async fn duplicate_profile_for_user_is_rejected() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = seed_user(&pool, "taro@yamada-foods.example").await;
        let repo = ExhibitorRepository::new(pool);

        repo.create(&exhibitor_request(user_id)).await.unwrap();
        let error = repo.create(&exhibitor_request(user_id)).await.unwrap_err();
        assert!(error.is_unique_violation());
    }
}
