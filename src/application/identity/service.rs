//! User management service, application-layer orchestration
//!
//! All user-related business logic lives here. Callers only ever receive
//! [`PublicUser`] values; the stored credential never leaves this module.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SeedConfig;
use crate::domain::{
    default_avatar_url, Collection, DomainError, DomainResult, PublicUser, RegisterUserDto,
    RepositoryProvider, UpdateUserDto, User, UserRole,
};
use crate::infrastructure::crypto::{hash_password, verify_password};
use crate::notifications::{ChangeEvent, ChangeKind, SharedChangeNotifier};
use crate::shared::{Operation, SharedClock, SimulatedLatency};

pub struct IdentityService {
    repos: Arc<dyn RepositoryProvider>,
    notifier: SharedChangeNotifier,
    latency: SimulatedLatency,
    clock: SharedClock,
    bcrypt_cost: u32,
    seed: SeedConfig,
}

impl IdentityService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        notifier: SharedChangeNotifier,
        latency: SimulatedLatency,
        clock: SharedClock,
        bcrypt_cost: u32,
        seed: SeedConfig,
    ) -> Self {
        Self {
            repos,
            notifier,
            latency,
            clock,
            bcrypt_cost,
            seed,
        }
    }

    /// Insert the seed administrator unless an admin already exists (the
    /// seed admin may have changed its email since). Returns `true` when the
    /// account was created.
    pub async fn seed_admin(&self) -> DomainResult<bool> {
        let users = self.repos.users().list_users().await?;
        if users
            .iter()
            .any(|u| u.role == UserRole::Admin || u.id == self.seed.admin_id)
        {
            return Ok(false);
        }

        let admin = User {
            id: self.seed.admin_id.clone(),
            name: self.seed.admin_name.clone(),
            email: self.seed.admin_email.clone(),
            password_hash: self.hash(&self.seed.admin_password)?,
            role: UserRole::Admin,
            avatar: self.seed.admin_avatar.clone(),
            created_at: self.clock.now(),
        };
        self.repos.users().insert_user(admin).await?;

        info!(user_id = %self.seed.admin_id, "Seed admin created");
        self.publish(ChangeKind::Created, &self.seed.admin_id);
        Ok(true)
    }

    // ── Authentication ──────────────────────────────────────────

    /// Exact, case-sensitive match on email and password. Unknown email and
    /// wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<PublicUser> {
        self.latency.wait(Operation::Login).await;

        let Some(user) = self.repos.users().find_by_email(email).await? else {
            metrics::counter!("taskdesk_logins_total", "outcome" => "rejected").increment(1);
            return Err(DomainError::InvalidCredentials);
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            metrics::counter!("taskdesk_logins_total", "outcome" => "rejected").increment(1);
            return Err(DomainError::InvalidCredentials);
        }

        metrics::counter!("taskdesk_logins_total", "outcome" => "success").increment(1);
        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(user.to_public())
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a new user (default role: employee). Nobody can register
    /// as admin.
    pub async fn register(&self, dto: RegisterUserDto) -> DomainResult<PublicUser> {
        self.latency.wait(Operation::Register).await;

        let role = dto.role.unwrap_or_default();
        if role == UserRole::Admin {
            return Err(DomainError::Forbidden(
                "the administrator account cannot be registered".into(),
            ));
        }

        let avatar = match dto.avatar {
            Some(avatar) if !avatar.trim().is_empty() => avatar,
            _ => default_avatar_url(&dto.name),
        };
        let user = User {
            id: Uuid::new_v4().to_string(),
            password_hash: self.hash(&dto.password)?,
            name: dto.name,
            email: dto.email,
            role,
            avatar,
            created_at: self.clock.now(),
        };

        let user = self.repos.users().insert_user(user).await?;

        info!(user_id = %user.id, role = %user.role, "New user registered");
        self.publish(ChangeKind::Created, &user.id);
        Ok(user.to_public())
    }

    /// Admin path: register a manager account.
    pub async fn create_manager(&self, dto: RegisterUserDto) -> DomainResult<PublicUser> {
        self.register(dto.with_role(UserRole::Manager)).await
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_users(&self) -> DomainResult<Vec<PublicUser>> {
        let users = self.repos.users().list_users().await?;
        Ok(users.iter().map(User::to_public).collect())
    }

    pub async fn list_users_by_role(&self, role: UserRole) -> DomainResult<Vec<PublicUser>> {
        let users = self.repos.users().list_users().await?;
        Ok(users
            .iter()
            .filter(|u| u.role == role)
            .map(User::to_public)
            .collect())
    }

    pub async fn get_user(&self, id: &str) -> DomainResult<PublicUser> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .map(|u| u.to_public())
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Shallow-merge profile fields. Id and role never change here.
    pub async fn update_profile(&self, id: &str, dto: UpdateUserDto) -> DomainResult<PublicUser> {
        let mut user = self
            .repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;

        if dto.is_empty() {
            return Ok(user.to_public());
        }
        if let Some(name) = dto.name {
            user.name = name;
        }
        if let Some(email) = dto.email {
            user.email = email;
        }
        if let Some(avatar) = dto.avatar {
            user.avatar = avatar;
        }
        if let Some(password) = dto.password {
            user.password_hash = self.hash(&password)?;
        }

        let user = self.repos.users().replace_user(user).await?;

        info!(user_id = %user.id, "Profile updated");
        self.publish(ChangeKind::Updated, &user.id);
        Ok(user.to_public())
    }

    /// Hard delete. Tasks assigned to the user are left as they are.
    pub async fn delete_user(&self, id: &str) -> DomainResult<()> {
        self.latency.wait(Operation::DeleteUser).await;

        if id == self.seed.admin_id {
            return Err(DomainError::Forbidden(
                "the administrator account cannot be deleted".into(),
            ));
        }
        self.repos.users().delete_user(id).await?;

        info!(user_id = id, "User deleted");
        self.publish(ChangeKind::Deleted, id);
        Ok(())
    }

    fn hash(&self, password: &str) -> DomainResult<String> {
        hash_password(password, self.bcrypt_cost).map_err(|e| {
            warn!(error = %e, "Password hashing failed");
            DomainError::Storage(format!("Failed to hash password: {}", e))
        })
    }

    fn publish(&self, kind: ChangeKind, user_id: &str) {
        self.notifier
            .publish(ChangeEvent::local(Collection::Users, kind, user_id));
    }
}
