//! Persistence and identity collaborators.
//!
//! The pipeline never talks to a database or an auth provider directly. It
//! reads project and user state through [`ProjectStore`], asks
//! [`SessionProvider`] who is calling, and hands the finished deck back to
//! the store. [`MemoryStore`] and [`StaticSession`] are in-process
//! implementations for tests and embedding.

use crate::error::DeckGenError;
use crate::model::LayoutNode;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Existence flags of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    pub exists: bool,
    pub is_deleted: bool,
}

impl ProjectStatus {
    /// Present and not soft-deleted.
    pub fn is_live(&self) -> bool {
        self.exists && !self.is_deleted
    }
}

/// Account flags of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub exists: bool,
    pub subscription_active: bool,
}

/// What gets persisted for a project after layout generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDeck {
    pub slides: Vec<LayoutNode>,
    pub theme_name: String,
}

/// Read and write access to projects and users.
pub trait ProjectStore: Send + Sync {
    fn project_status<'a>(
        &'a self,
        project_id: &'a str,
    ) -> BoxFuture<'a, Result<ProjectStatus, DeckGenError>>;

    fn project_outlines<'a>(
        &'a self,
        project_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, DeckGenError>>;

    fn user_status<'a>(&'a self, user_id: &'a str)
        -> BoxFuture<'a, Result<UserStatus, DeckGenError>>;

    fn save_slides<'a>(
        &'a self,
        project_id: &'a str,
        deck: SlideDeck,
    ) -> BoxFuture<'a, Result<(), DeckGenError>>;
}

/// Identity of the caller, if any.
pub trait SessionProvider: Send + Sync {
    /// Id of the authenticated user, `None` when nobody is signed in.
    fn current_user(&self) -> BoxFuture<'_, Option<String>>;
}

// ── In-memory implementations ────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct ProjectRecord {
    outlines: Vec<String>,
    is_deleted: bool,
    deck: Option<SlideDeck>,
}

/// [`ProjectStore`] backed by in-process maps.
///
/// ```rust
/// use deckgen::MemoryStore;
///
/// let store = MemoryStore::new()
///     .with_user("u1", true)
///     .with_project("p1", ["Intro", "Scope", "Plan", "Risks", "Budget", "Close"]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<String, ProjectRecord>>,
    users: RwLock<HashMap<String, UserStatus>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project<I, S>(mut self, project_id: impl Into<String>, outlines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projects.get_mut().insert(
            project_id.into(),
            ProjectRecord {
                outlines: outlines.into_iter().map(Into::into).collect(),
                ..Default::default()
            },
        );
        self
    }

    /// Add a soft-deleted project.
    pub fn with_deleted_project(mut self, project_id: impl Into<String>) -> Self {
        self.projects.get_mut().insert(
            project_id.into(),
            ProjectRecord {
                is_deleted: true,
                ..Default::default()
            },
        );
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>, subscription_active: bool) -> Self {
        self.users.get_mut().insert(
            user_id.into(),
            UserStatus {
                exists: true,
                subscription_active,
            },
        );
        self
    }

    /// The deck last saved for `project_id`.
    pub async fn saved_deck(&self, project_id: &str) -> Option<SlideDeck> {
        self.projects
            .read()
            .await
            .get(project_id)
            .and_then(|p| p.deck.clone())
    }
}

impl ProjectStore for MemoryStore {
    fn project_status<'a>(
        &'a self,
        project_id: &'a str,
    ) -> BoxFuture<'a, Result<ProjectStatus, DeckGenError>> {
        Box::pin(async move {
            let projects = self.projects.read().await;
            Ok(projects
                .get(project_id)
                .map(|p| ProjectStatus {
                    exists: true,
                    is_deleted: p.is_deleted,
                })
                .unwrap_or_default())
        })
    }

    fn project_outlines<'a>(
        &'a self,
        project_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, DeckGenError>> {
        Box::pin(async move {
            self.projects
                .read()
                .await
                .get(project_id)
                .map(|p| p.outlines.clone())
                .ok_or_else(|| DeckGenError::NotFound {
                    project_id: project_id.to_string(),
                })
        })
    }

    fn user_status<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Result<UserStatus, DeckGenError>> {
        Box::pin(async move {
            Ok(self
                .users
                .read()
                .await
                .get(user_id)
                .copied()
                .unwrap_or_default())
        })
    }

    fn save_slides<'a>(
        &'a self,
        project_id: &'a str,
        deck: SlideDeck,
    ) -> BoxFuture<'a, Result<(), DeckGenError>> {
        Box::pin(async move {
            let mut projects = self.projects.write().await;
            let record = projects
                .get_mut(project_id)
                .ok_or_else(|| DeckGenError::NotFound {
                    project_id: project_id.to_string(),
                })?;
            record.deck = Some(deck);
            Ok(())
        })
    }
}

/// [`SessionProvider`] with a fixed answer.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user_id: Option<String>,
}

impl StaticSession {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> BoxFuture<'_, Option<String>> {
        let user = self.user_id.clone();
        Box::pin(async move { user })
    }
}
