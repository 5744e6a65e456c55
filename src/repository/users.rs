use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Preferences, User, UserSnapshot};
use crate::storage::{SnapshotStore, StorageError};

/// Which article list of a user to append to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleList {
    Read,
    Favorites,
}

/// Fields of a user being registered; the id is assigned by the repository
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Option<String>,
}

/// Owns the user list and flushes the whole list after every mutation
pub struct UserRepository {
    users: Mutex<Vec<User>>,
    store: Arc<dyn SnapshotStore<UserSnapshot>>,
}

impl UserRepository {
    /// Load the persisted snapshot (if any) from `store`
    pub async fn load(
        store: Arc<dyn SnapshotStore<UserSnapshot>>,
    ) -> std::result::Result<Self, StorageError> {
        let users = store.load().await?.unwrap_or_default().users;
        tracing::info!("Loaded {} users", users.len());

        Ok(Self {
            users: Mutex::new(users),
            store,
        })
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn all(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }

    pub async fn find_by_id(&self, id: u64) -> Result<User> {
        let users = self.users.lock().await;
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(AppError::UserNotFound)
    }

    pub async fn find_by_username(&self, username: &str) -> Option<User> {
        let users = self.users.lock().await;
        users.iter().find(|u| u.username == username).cloned()
    }

    /// Insert a new user, rejecting duplicate usernames
    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.lock().await;

        if users.iter().any(|u| u.username == new_user.username) {
            tracing::info!("Registration rejected, username exists");
            return Err(AppError::UsernameTaken);
        }

        let user = User {
            id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            username: new_user.username,
            password: new_user.password_hash,
            role: new_user.role,
            preferences: Preferences::default(),
            read: Vec::new(),
            favorites: Vec::new(),
        };

        let mut staged = users.clone();
        staged.push(user.clone());
        self.persist(&staged).await?;
        *users = staged;

        tracing::info!(user_id = user.id, "New user registered");
        Ok(user)
    }

    pub async fn set_preferences(&self, id: u64, preferences: Preferences) -> Result<Preferences> {
        let mut users = self.users.lock().await;
        let index = Self::index_of(&users, id)?;

        let mut staged = users.clone();
        staged[index].preferences = preferences.clone();
        self.persist(&staged).await?;
        *users = staged;

        Ok(preferences)
    }

    /// Append `url` to one of the user's article lists if it is not there yet.
    ///
    /// Returns whether the list changed; unchanged lists are not persisted.
    pub async fn add_article(&self, id: u64, list: ArticleList, url: &str) -> Result<bool> {
        let mut users = self.users.lock().await;
        let index = Self::index_of(&users, id)?;

        let current = match list {
            ArticleList::Read => &users[index].read,
            ArticleList::Favorites => &users[index].favorites,
        };
        if current.iter().any(|existing| existing == url) {
            return Ok(false);
        }

        let mut staged = users.clone();
        match list {
            ArticleList::Read => staged[index].read.push(url.to_string()),
            ArticleList::Favorites => staged[index].favorites.push(url.to_string()),
        }
        self.persist(&staged).await?;
        *users = staged;

        Ok(true)
    }

    fn index_of(users: &[User], id: u64) -> Result<usize> {
        users
            .iter()
            .position(|u| u.id == id)
            .ok_or(AppError::UserNotFound)
    }

    async fn persist(&self, users: &[User]) -> Result<()> {
        let snapshot = UserSnapshot {
            users: users.to_vec(),
        };
        self.store.save(&snapshot).await?;
        Ok(())
    }
}
