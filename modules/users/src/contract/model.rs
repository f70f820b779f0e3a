/// Stored user. `id` is assigned by storage and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub active: bool,
}

/// A user that has not been persisted yet (no id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub active: bool,
}

impl NewUser {
    /// New users start active.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            active: true,
        }
    }
}

/// Replacement values for a full update. Every field overwrites the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub active: bool,
}

impl User {
    /// Overwrite all mutable fields with `update`; the id is untouched.
    pub fn apply(&mut self, update: UserUpdate) {
        self.name = update.name;
        self.email = update.email;
        self.active = update.active;
    }
}
