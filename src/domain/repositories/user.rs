//! App user and admin user repository traits

use async_trait::async_trait;

use crate::domain::error::DomainResult;
use crate::domain::models::{AdminUser, User};

/// Mobile-app users and their linked vehicle plates.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Duplicate email or phone is a Conflict.
    async fn create(&self, user: User) -> DomainResult<User>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Resolve the owner of a normalized plate, if any. Best-effort lookup
    /// used by the entry flow; unregistered plates are not an error.
    async fn find_by_plate(&self, plate_number: &str) -> DomainResult<Option<User>>;

    /// Link a plate to a user. Plates are globally unique: a plate already
    /// linked to any user is a Conflict. Returns the updated plate list.
    async fn link_plate(&self, user_id: &str, plate_number: &str) -> DomainResult<Vec<String>>;

    /// Unlink a plate. Unlinking a plate the user does not own is NotFound.
    async fn unlink_plate(&self, user_id: &str, plate_number: &str) -> DomainResult<Vec<String>>;

    async fn set_fcm_token(&self, user_id: &str, token: Option<String>) -> DomainResult<()>;

    /// Drop a device token wherever it is stored. Used when push delivery
    /// reports the token as stale.
    async fn clear_fcm_token_by_value(&self, token: &str) -> DomainResult<()>;
}

/// Dashboard users.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(&self, admin: AdminUser) -> DomainResult<AdminUser>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<AdminUser>>;

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<AdminUser>>;

    async fn touch_last_login(&self, id: &str) -> DomainResult<()>;

    async fn count(&self) -> DomainResult<u64>;
}
