//! Session / auth gate
//!
//! One gate per view. The signed-in user is kept in memory for the view
//! and mirrored to the session key so a view opened later can restore it.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::IdentityService;
use crate::domain::{Collection, DomainError, DomainResult, PublicUser, RegisterUserDto, UserRole};
use crate::infrastructure::PersistentStore;
use crate::notifications::{ChangeEvent, ChangeKind, SharedChangeNotifier};

const KEY: &str = Collection::Session.storage_key();

/// What the rest of the system may know about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub role: UserRole,
}

impl From<&PublicUser> for Session {
    fn from(user: &PublicUser) -> Self {
        Self {
            user_id: user.id.clone(),
            role: user.role,
        }
    }
}

pub struct SessionGate {
    identity: Arc<IdentityService>,
    store: Arc<PersistentStore>,
    notifier: SharedChangeNotifier,
    current: RwLock<Option<PublicUser>>,
}

impl SessionGate {
    pub fn new(
        identity: Arc<IdentityService>,
        store: Arc<PersistentStore>,
        notifier: SharedChangeNotifier,
    ) -> Self {
        Self {
            identity,
            store,
            notifier,
            current: RwLock::new(None),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<PublicUser> {
        let user = self.identity.login(email, password).await?;
        self.sign_in(user)
    }

    /// Self sign-up: register and sign the new user in.
    pub async fn register(&self, dto: RegisterUserDto) -> DomainResult<PublicUser> {
        let user = self.identity.register(dto).await?;
        self.sign_in(user)
    }

    pub fn logout(&self) -> DomainResult<()> {
        let previous = self.replace(None);
        self.store.remove(KEY)?;

        if let Some(user) = previous {
            info!(user_id = %user.id, "User logged out");
            self.notifier
                .publish(ChangeEvent::local(Collection::Session, ChangeKind::SignedOut, user.id));
        }
        Ok(())
    }

    /// Pick up the user persisted by an earlier view. A persisted user
    /// that no longer exists is discarded.
    pub async fn restore(&self) -> DomainResult<Option<PublicUser>> {
        let Some(stored) = self.store.read_value::<PublicUser>(KEY) else {
            self.replace(None);
            return Ok(None);
        };

        match self.identity.get_user(&stored.id).await {
            Ok(user) => {
                debug!(user_id = %user.id, "Session restored");
                self.replace(Some(user.clone()));
                Ok(Some(user))
            }
            Err(DomainError::NotFound { .. }) => {
                debug!(user_id = %stored.id, "Persisted session user is gone");
                self.replace(None);
                self.store.remove(KEY)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.read().as_ref().map(Session::from)
    }

    pub fn current_user(&self) -> Option<PublicUser> {
        self.read().clone()
    }

    pub fn require(&self) -> DomainResult<Session> {
        self.current().ok_or(DomainError::Unauthenticated)
    }

    fn sign_in(&self, user: PublicUser) -> DomainResult<PublicUser> {
        self.store.write_value(KEY, &user)?;
        self.replace(Some(user.clone()));
        self.notifier.publish(ChangeEvent::local(
            Collection::Session,
            ChangeKind::SignedIn,
            user.id.clone(),
        ));
        Ok(user)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<PublicUser>> {
        match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn replace(&self, user: Option<PublicUser>) -> Option<PublicUser> {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedConfig;
    use crate::infrastructure::{InMemoryBackend, LocalRepositoryProvider};
    use crate::notifications::create_change_notifier;
    use crate::shared::{SimulatedLatency, SystemClock};

    async fn setup() -> (Arc<IdentityService>, Arc<PersistentStore>, SharedChangeNotifier) {
        let store = Arc::new(PersistentStore::new(Arc::new(InMemoryBackend::new())));
        let notifier = create_change_notifier();
        let identity = Arc::new(IdentityService::new(
            Arc::new(LocalRepositoryProvider::new(store.clone())),
            notifier.clone(),
            SimulatedLatency::disabled(),
            Arc::new(SystemClock),
            crate::config::MIN_BCRYPT_COST,
            SeedConfig::default(),
        ));
        identity.seed_admin().await.unwrap();
        (identity, store, notifier)
    }

    #[tokio::test]
    async fn require_fails_until_signed_in() {
        let (identity, store, notifier) = setup().await;
        let gate = SessionGate::new(identity, store, notifier);

        assert!(matches!(gate.require(), Err(DomainError::Unauthenticated)));

        gate.login("admin@admin.com", "admin").await.unwrap();
        let session = gate.require().unwrap();
        assert_eq!(session.user_id, "admin_1");
        assert_eq!(session.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_state() {
        let (identity, store, notifier) = setup().await;
        let gate = SessionGate::new(identity, store, notifier);

        assert!(gate.login("admin@admin.com", "wrong").await.is_err());
        assert!(gate.current().is_none());
    }

    #[tokio::test]
    async fn second_view_restores_persisted_user() {
        let (identity, store, notifier) = setup().await;
        let first = SessionGate::new(identity.clone(), store.clone(), notifier.clone());
        let second = SessionGate::new(identity, store, notifier);

        first
            .register(RegisterUserDto::new("Ann", "ann@x.com", "pw"))
            .await
            .unwrap();
        assert!(second.current().is_none());

        let restored = second.restore().await.unwrap().unwrap();
        assert_eq!(restored.email, "ann@x.com");
        assert_eq!(second.current(), first.current());

        first.logout().unwrap();
        assert!(first.current().is_none());
        assert!(second.restore().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn restore_drops_deleted_user() {
        let (identity, store, notifier) = setup().await;
        let gate = SessionGate::new(identity.clone(), store.clone(), notifier);

        let user = gate
            .register(RegisterUserDto::new("Ann", "ann@x.com", "pw"))
            .await
            .unwrap();
        identity.delete_user(&user.id).await.unwrap();

        assert!(gate.restore().await.unwrap().is_none());
        assert!(store.read_value::<PublicUser>(KEY).is_none());
    }

    #[tokio::test]
    async fn sign_in_and_out_are_published() {
        let (identity, store, notifier) = setup().await;
        let mut sub = notifier.subscribe();
        let gate = SessionGate::new(identity, store, notifier);

        gate.login("admin@admin.com", "admin").await.unwrap();
        gate.logout().unwrap();
        gate.logout().unwrap();

        assert_eq!(sub.try_recv().unwrap().kind, ChangeKind::SignedIn);
        let out = sub.try_recv().unwrap();
        assert_eq!(out.kind, ChangeKind::SignedOut);
        assert_eq!(out.collection, Collection::Session);
        assert!(sub.try_recv().is_none());
    }
}
