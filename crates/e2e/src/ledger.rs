//! Bookkeeping of remote entities created during a scenario

use serde::Serialize;

use practice_api::UserCreate;

/// A registered and logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedUser {
    #[serde(skip_serializing)]
    pub token: String,
    pub user_data: UserCreate,
}

/// A note and the token of its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedNote {
    pub id: String,
    #[serde(skip_serializing)]
    pub token: String,
}

/// Created users and notes, in creation order
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    users: Vec<CreatedUser>,
    notes: Vec<CreatedNote>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_user(&mut self, token: impl Into<String>, user_data: UserCreate) {
        self.users.push(CreatedUser {
            token: token.into(),
            user_data,
        });
    }

    pub fn track_note(&mut self, id: impl Into<String>, token: impl Into<String>) {
        self.notes.push(CreatedNote {
            id: id.into(),
            token: token.into(),
        });
    }

    pub fn users(&self) -> &[CreatedUser] {
        &self.users
    }

    pub fn notes(&self) -> &[CreatedNote] {
        &self.notes
    }

    pub fn user(&self, index: usize) -> Option<&CreatedUser> {
        self.users.get(index)
    }

    /// Move every entry out, leaving the ledger empty
    pub fn take(&mut self) -> (Vec<CreatedUser>, Vec<CreatedNote>) {
        (
            std::mem::take(&mut self.users),
            std::mem::take(&mut self.notes),
        )
    }

    pub fn clear(&mut self) {
        self.users.clear();
        self.notes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.notes.is_empty()
    }
}
