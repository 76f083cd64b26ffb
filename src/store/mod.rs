//! Storage abstractions for the dealership service

pub mod memory;
pub mod models;
pub mod sqlite;

pub use memory::MemoryStore;
pub use models::*;
pub use sqlite::SqliteStore;

use crate::error::{AppError, FieldError};

/// Result type for store operations
pub type StoreResult<T> = Result<T, AppError>;

/// Maximum favorites one account may hold
pub const MAX_FAVORITES: usize = 50;

/// Error for a classification name that is already taken; both store
/// implementations report the collision identically.
pub(crate) fn duplicate_classification() -> AppError {
    AppError::Validation(vec![FieldError::new(
        "classification_name",
        "That classification already exists.",
    )])
}

/// Account records and credential checks
pub trait AccountStore: Send + Sync {
    /// Insert a new account with role forced to Client.
    ///
    /// Fails with `DuplicateEmail` when the (case-normalized) email is
    /// taken; a storage-level unique-constraint violation maps to the
    /// same error, which is the real backstop for the check-then-insert
    /// race under concurrent registration.
    fn create_account(&self, new: NewAccount) -> StoreResult<Account>;

    /// Look up by email, hash included (login needs it)
    fn find_by_email(&self, email: &str) -> StoreResult<Option<Credentials>>;

    /// Look up by id, hash excluded
    fn find_by_id(&self, account_id: i64) -> StoreResult<Option<Account>>;

    /// Does the email belong to any account other than `exclude`?
    fn email_exists(&self, email: &str, exclude: Option<i64>) -> StoreResult<bool>;

    /// Update name/email; `None` when the id no longer exists.
    /// Fails with `DuplicateEmail` when the email belongs to another account.
    fn update_profile(
        &self,
        account_id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> StoreResult<Option<Account>>;

    /// Overwrite the stored hash; false when the id no longer exists
    fn update_password(&self, account_id: i64, password_hash: &str) -> StoreResult<bool>;
}

/// Vehicle inventory and classifications
pub trait InventoryStore: Send + Sync {
    fn list_classifications(&self) -> StoreResult<Vec<Classification>>;

    fn add_classification(&self, name: &str) -> StoreResult<Classification>;

    fn list_by_classification(&self, classification_id: i64) -> StoreResult<Vec<Vehicle>>;

    /// Vehicle joined with its classification name
    fn vehicle_detail(&self, inv_id: i64) -> StoreResult<Option<VehicleDetail>>;

    fn get_vehicle(&self, inv_id: i64) -> StoreResult<Option<Vehicle>>;

    fn add_vehicle(&self, new: NewVehicle) -> StoreResult<Vehicle>;

    /// Full-row update; `None` when the id no longer exists
    fn update_vehicle(&self, vehicle: Vehicle) -> StoreResult<Option<Vehicle>>;

    fn delete_vehicle(&self, inv_id: i64) -> StoreResult<bool>;
}

/// Per-account favorite vehicles
pub trait FavoriteStore: Send + Sync {
    /// Insert, or refresh notes/priority/created_at when the pair exists.
    /// Returns the favorite id and whether a new row was created.
    fn upsert_favorite(
        &self,
        account_id: i64,
        vehicle_id: i64,
        notes: Option<&str>,
        priority: i32,
    ) -> StoreResult<(i64, bool)>;

    fn remove_favorite(&self, account_id: i64, vehicle_id: i64) -> StoreResult<bool>;

    fn is_favorite(&self, account_id: i64, vehicle_id: i64) -> StoreResult<bool>;

    /// Favorites joined with vehicles, priority-then-recency ordered
    fn list_favorites(
        &self,
        account_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<FavoriteVehicle>, i64)>;

    /// How many accounts favorited this vehicle
    fn vehicle_favorite_count(&self, vehicle_id: i64) -> StoreResult<i64>;

    fn account_favorite_count(&self, account_id: i64) -> StoreResult<i64>;

    fn update_notes(&self, account_id: i64, vehicle_id: i64, notes: Option<&str>)
        -> StoreResult<bool>;

    fn update_priority(&self, account_id: i64, vehicle_id: i64, priority: i32)
        -> StoreResult<bool>;

    fn recent_favorites(&self, account_id: i64, limit: i64) -> StoreResult<Vec<FavoriteVehicle>>;

    fn favorite_stats(&self, account_id: i64) -> StoreResult<FavoriteStats>;
}

/// Contact-form submissions
pub trait ContactStore: Send + Sync {
    fn create_submission(&self, new: NewContactSubmission) -> StoreResult<ContactSubmission>;

    fn list_submissions(&self) -> StoreResult<Vec<ContactSubmission>>;

    fn get_submission(&self, contact_id: i64) -> StoreResult<Option<ContactSubmission>>;

    fn delete_submission(&self, contact_id: i64) -> StoreResult<bool>;

    fn mark_read(&self, contact_id: i64) -> StoreResult<bool>;
}

/// One-shot flash notices keyed by flash-session id.
///
/// `take_notices` has read-and-delete semantics: a notice is returned
/// exactly once.
pub trait NoticeStore: Send + Sync {
    fn push_notice(&self, session_id: &str, kind: &str, message: &str) -> StoreResult<()>;

    fn take_notices(&self, session_id: &str) -> StoreResult<Vec<Notice>>;
}

/// The full store surface the application state is generic over.
/// Blanket-implemented for anything providing all five concerns.
pub trait Store:
    AccountStore + InventoryStore + FavoriteStore + ContactStore + NoticeStore + Send + Sync
{
}

impl<T> Store for T where
    T: AccountStore + InventoryStore + FavoriteStore + ContactStore + NoticeStore + Send + Sync
{
}
