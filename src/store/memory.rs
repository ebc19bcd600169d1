//! In-process store used by tests. Implements the same adapter traits as the
//! Postgres session so dispatchers run unchanged against it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::password::hash_password;
use crate::auth::repo::{CreateUserError, UserRepo};
use crate::auth::repo_types::{NewUser, Role, User};
use crate::documents::repo::DocumentRepo;
use crate::documents::repo_types::{Document, ListScope, NewDocument, DELETED_MARKER};
use crate::store::{Store, StoreSession};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    documents: Vec<Document>,
    next_user_id: i64,
    next_document_id: i64,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().expect("memory store poisoned");
        f(&mut tables)
    }

    /// Seeds a user directly, bypassing registration.
    pub fn add_user(&self, email: &str, password: &str, role: Role, is_active: bool) -> User {
        let password_hash = hash_password(password).expect("hash");
        self.with_tables(|t| {
            t.next_user_id += 1;
            let user = User {
                id: t.next_user_id,
                email: email.to_string(),
                password_hash,
                full_name: email.split('@').next().unwrap_or(email).to_string(),
                phone: None,
                position: None,
                department: None,
                role,
                is_active,
            };
            t.users.push(user.clone());
            user
        })
    }

    pub fn set_active(&self, user_id: i64, is_active: bool) {
        self.with_tables(|t| {
            if let Some(u) = t.users.iter_mut().find(|u| u.id == user_id) {
                u.is_active = is_active;
            }
        })
    }

    pub fn document(&self, id: i64) -> Option<Document> {
        self.with_tables(|t| t.documents.iter().find(|d| d.id == id).cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn session(&self) -> anyhow::Result<Box<dyn StoreSession>> {
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_user_by_email(&mut self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.with_tables(|t| t.users.iter().find(|u| u.email == email).cloned()))
    }

    async fn find_active_user(&mut self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.with_tables(|t| {
            t.users
                .iter()
                .find(|u| u.id == id && u.is_active)
                .cloned()
        }))
    }

    async fn create_user(&mut self, new_user: NewUser) -> Result<User, CreateUserError> {
        self.with_tables(|t| {
            if t.users.iter().any(|u| u.email == new_user.email) {
                return Err(CreateUserError::Duplicate);
            }
            t.next_user_id += 1;
            let user = User {
                id: t.next_user_id,
                email: new_user.email,
                password_hash: new_user.password_hash,
                full_name: new_user.full_name,
                phone: None,
                position: None,
                department: None,
                role: Role::User,
                is_active: true,
            };
            t.users.push(user.clone());
            Ok(user)
        })
    }
}

#[async_trait]
impl DocumentRepo for MemoryStore {
    async fn list_documents(&mut self, scope: ListScope) -> anyhow::Result<Vec<Document>> {
        Ok(self.with_tables(|t| {
            let mut docs: Vec<Document> = t
                .documents
                .iter()
                .filter(|d| match scope {
                    ListScope::All => true,
                    ListScope::Owner(owner) => d.user_id == owner,
                })
                .cloned()
                .map(|mut d| {
                    d.user_name = t
                        .users
                        .iter()
                        .find(|u| u.id == d.user_id)
                        .map(|u| u.full_name.clone());
                    d
                })
                .collect();
            docs.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
            docs
        }))
    }

    async fn insert_document(&mut self, doc: NewDocument) -> anyhow::Result<Document> {
        Ok(self.with_tables(|t| {
            t.next_document_id += 1;
            let stored = Document {
                id: t.next_document_id,
                user_id: doc.user_id,
                file_name: doc.file_name,
                file_size: doc.file_size,
                file_type: doc.file_type,
                file_url: doc.file_url,
                description: doc.description,
                uploaded_at: OffsetDateTime::now_utc(),
                user_name: None,
            };
            t.documents.push(stored.clone());
            stored
        }))
    }

    async fn find_document(&mut self, id: i64) -> anyhow::Result<Option<Document>> {
        Ok(self.document(id))
    }

    async fn soft_delete_document(&mut self, id: i64) -> anyhow::Result<()> {
        self.with_tables(|t| {
            if let Some(d) = t.documents.iter_mut().find(|d| d.id == id) {
                d.file_url.clear();
                d.description = DELETED_MARKER.to_string();
            }
        });
        Ok(())
    }
}
