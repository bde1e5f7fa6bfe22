use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use tokio::sync::RwLock;

use portal_shared::User;

/// Full account record as held by the store. The password hash stays inside
/// the server; handlers convert to the shared [`User`] via [`StoredUser::public`]
/// before responding.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub student_id: String,
    pub program: Option<String>,
    pub year_of_study: Option<String>,
    pub joined_date: String,
    pub avatar_initials: String,
}

impl StoredUser {
    /// Public view of the record, without the password hash.
    pub fn public(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            bio: self.bio.clone(),
            student_id: self.student_id.clone(),
            program: self.program.clone(),
            year_of_study: self.year_of_study.clone(),
            joined_date: self.joined_date.clone(),
            avatar_initials: self.avatar_initials.clone(),
        }
    }
}

/// Input for [`MemoryUserStore::create_user`]. The password arrives already
/// hashed; the derived fields are filled in by the store.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub program: Option<String>,
    pub year_of_study: Option<String>,
}

/// Partial profile update. `None` fields keep their current value. Username,
/// password and the derived fields are not reachable through this path.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub program: Option<String>,
    pub year_of_study: Option<String>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("username is already taken")]
    DuplicateUsername,

    #[error("email is already registered")]
    DuplicateEmail,
}

struct StoreInner {
    users: HashMap<i64, StoredUser>,
    by_username: HashMap<String, i64>,
    by_email: HashMap<String, i64>,
    next_id: i64,
}

/// In-memory user store: the primary id map plus username/email indexes,
/// all mutated under a single write lock so they can never drift apart.
/// Contents do not survive a restart.
#[derive(Clone)]
pub struct MemoryUserStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                users: HashMap::new(),
                by_username: HashMap::new(),
                by_email: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    pub async fn get_user(&self, id: i64) -> Option<StoredUser> {
        self.inner.read().await.users.get(&id).cloned()
    }

    pub async fn get_user_by_username(&self, username: &str) -> Option<StoredUser> {
        let inner = self.inner.read().await;
        let id = inner.by_username.get(username)?;
        inner.users.get(id).cloned()
    }

    pub async fn get_user_by_email(&self, email: &str) -> Option<StoredUser> {
        let inner = self.inner.read().await;
        let id = inner.by_email.get(email)?;
        inner.users.get(id).cloned()
    }

    /// Assign the next id, compute the derived fields and insert the record.
    /// Uniqueness is enforced here as well as in the auth layer, so the
    /// indexes cannot be clobbered no matter who calls.
    pub async fn create_user(&self, new_user: NewUser) -> Result<StoredUser, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.by_username.contains_key(&new_user.username) {
            return Err(StoreError::DuplicateUsername);
        }
        if inner.by_email.contains_key(&new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();
        let avatar_initials = avatar_initials(&new_user.full_name);

        let user = StoredUser {
            id,
            username: new_user.username,
            password_hash: new_user.password_hash,
            email: new_user.email,
            full_name: new_user.full_name,
            bio: new_user.bio,
            student_id: format!("ST-{}-{:04}", now.year(), id),
            program: new_user.program,
            year_of_study: new_user.year_of_study,
            joined_date: now.format("%B %Y").to_string(),
            avatar_initials,
        };

        inner.by_username.insert(user.username.clone(), id);
        inner.by_email.insert(user.email.clone(), id);
        inner.users.insert(id, user.clone());

        tracing::info!("Created user {} ({})", user.username, user.student_id);

        Ok(user)
    }

    /// Merge a partial update into an existing record. A changed full name
    /// recomputes the avatar initials; a changed email re-points the email
    /// index. An email belonging to another user fails with
    /// [`StoreError::DuplicateEmail`] and mutates nothing.
    pub async fn update_user(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<StoredUser, StoreError> {
        let mut inner = self.inner.write().await;

        let old_email = match inner.users.get(&id) {
            Some(user) => user.email.clone(),
            None => return Err(StoreError::NotFound),
        };

        if let Some(ref email) = update.email {
            if let Some(&owner) = inner.by_email.get(email) {
                if owner != id {
                    return Err(StoreError::DuplicateEmail);
                }
            }
        }

        if let Some(ref email) = update.email {
            if *email != old_email {
                inner.by_email.remove(&old_email);
                inner.by_email.insert(email.clone(), id);
            }
        }

        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(full_name) = update.full_name {
            user.avatar_initials = avatar_initials(&full_name);
            user.full_name = full_name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(program) = update.program {
            user.program = Some(program);
        }
        if let Some(year_of_study) = update.year_of_study {
            user.year_of_study = Some(year_of_study);
        }

        Ok(user.clone())
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

/// First letters of the first and last name tokens, uppercased. A single
/// token contributes its first two characters; an empty name yields "".
fn avatar_initials(full_name: &str) -> String {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    let initials: String = match tokens.as_slice() {
        [] => String::new(),
        [only] => only.chars().take(2).collect(),
        [first, .., last] => first.chars().take(1).chain(last.chars().take(1)).collect(),
    };
    initials.to_uppercase()
}
