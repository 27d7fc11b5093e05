use serde::{Deserialize, Serialize};
use validator::Validate;

use super::UserRole;

/// Registration payload. Field checks are the caller's job (`validate()`);
/// the identity layer only enforces email uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub role: Option<UserRole>,
    pub avatar: Option<String>,
}

impl RegisterUserDto {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: None,
            avatar: None,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }
}
