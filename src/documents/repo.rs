use async_trait::async_trait;

use crate::documents::repo_types::{Document, ListScope, NewDocument, DELETED_MARKER};
use crate::store::PgSession;

/// Document store adapter.
#[async_trait]
pub trait DocumentRepo: Send {
    /// Newest first.
    async fn list_documents(&mut self, scope: ListScope) -> anyhow::Result<Vec<Document>>;

    async fn insert_document(&mut self, doc: NewDocument) -> anyhow::Result<Document>;

    async fn find_document(&mut self, id: i64) -> anyhow::Result<Option<Document>>;

    /// Clears the stored content and marks the description; the row stays.
    async fn soft_delete_document(&mut self, id: i64) -> anyhow::Result<()>;
}

const DOCUMENT_SELECT: &str = r#"
    SELECT d.id, d.user_id, d.file_name, d.file_size, d.file_type, d.file_url,
           d.description, d.uploaded_at, u.full_name AS user_name
      FROM documents d
      JOIN users u ON d.user_id = u.id
"#;

#[async_trait]
impl DocumentRepo for PgSession {
    async fn list_documents(&mut self, scope: ListScope) -> anyhow::Result<Vec<Document>> {
        let rows = match scope {
            ListScope::All => {
                sqlx::query_as::<_, Document>(&format!(
                    "{DOCUMENT_SELECT} ORDER BY d.uploaded_at DESC, d.id DESC"
                ))
                .fetch_all(self.conn())
                .await?
            }
            ListScope::Owner(user_id) => {
                sqlx::query_as::<_, Document>(&format!(
                    "{DOCUMENT_SELECT} WHERE d.user_id = $1 ORDER BY d.uploaded_at DESC, d.id DESC"
                ))
                .bind(user_id)
                .fetch_all(self.conn())
                .await?
            }
        };
        Ok(rows)
    }

    async fn insert_document(&mut self, doc: NewDocument) -> anyhow::Result<Document> {
        let row = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (user_id, file_name, file_size, file_type, file_url, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, file_name, file_size, file_type, file_url, description,
                      uploaded_at, NULL::text AS user_name
            "#,
        )
        .bind(doc.user_id)
        .bind(&doc.file_name)
        .bind(doc.file_size)
        .bind(&doc.file_type)
        .bind(&doc.file_url)
        .bind(&doc.description)
        .fetch_one(self.conn())
        .await?;
        Ok(row)
    }

    async fn find_document(&mut self, id: i64) -> anyhow::Result<Option<Document>> {
        let row = sqlx::query_as::<_, Document>(&format!("{DOCUMENT_SELECT} WHERE d.id = $1"))
            .bind(id)
            .fetch_optional(self.conn())
            .await?;
        Ok(row)
    }

    async fn soft_delete_document(&mut self, id: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE documents SET file_url = '', description = $2 WHERE id = $1")
            .bind(id)
            .bind(DELETED_MARKER)
            .execute(self.conn())
            .await?;
        Ok(())
    }
}
