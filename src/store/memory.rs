//! In-memory storage implementation

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;

use super::{
    Account, AccountStore, Classification, ContactStore, ContactSubmission, Credentials,
    FavoriteStats, FavoriteStore, FavoriteVehicle, InventoryStore, NewAccount,
    NewContactSubmission, NewVehicle, Notice, NoticeStore, Role, StoreResult, Vehicle,
    VehicleDetail, DEFAULT_VEHICLE_IMAGE, DEFAULT_VEHICLE_THUMBNAIL,
};
use crate::error::AppError;

struct StoredAccount {
    account: Account,
    password_hash: String,
}

#[derive(Clone)]
struct StoredFavorite {
    favorite_id: i64,
    notes: Option<String>,
    priority: i32,
    created_at: chrono::DateTime<Utc>,
}

/// In-memory store backing tests and ephemeral deployments.
///
/// Cloning is cheap and clones share state, so tests can keep a handle
/// for out-of-band setup while the server owns another.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    accounts: RwLock<HashMap<i64, StoredAccount>>,
    classifications: RwLock<BTreeMap<i64, Classification>>,
    vehicles: RwLock<HashMap<i64, Vehicle>>,
    /// keyed by (account_id, vehicle_id)
    favorites: RwLock<HashMap<(i64, i64), StoredFavorite>>,
    contacts: RwLock<BTreeMap<i64, ContactSubmission>>,
    notices: RwLock<HashMap<String, Vec<Notice>>>,
    next_account_id: AtomicI64,
    next_classification_id: AtomicI64,
    next_vehicle_id: AtomicI64,
    next_favorite_id: AtomicI64,
    next_contact_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                accounts: RwLock::new(HashMap::new()),
                classifications: RwLock::new(BTreeMap::new()),
                vehicles: RwLock::new(HashMap::new()),
                favorites: RwLock::new(HashMap::new()),
                contacts: RwLock::new(BTreeMap::new()),
                notices: RwLock::new(HashMap::new()),
                next_account_id: AtomicI64::new(1),
                next_classification_id: AtomicI64::new(1),
                next_vehicle_id: AtomicI64::new(1),
                next_favorite_id: AtomicI64::new(1),
                next_contact_id: AtomicI64::new(1),
            }),
        }
    }

    /// Promote or demote an account (for testing purposes; role changes
    /// are out of band in normal flows)
    pub fn set_role(&self, account_id: i64, role: Role) -> StoreResult<()> {
        let mut accounts = self.inner.accounts.write().unwrap();
        match accounts.get_mut(&account_id) {
            Some(stored) => {
                stored.account.role = role;
                Ok(())
            }
            None => Err(AppError::NotFound("account")),
        }
    }

    /// Drop an account record (for testing the stale-claims fallback;
    /// accounts are never hard-deleted in normal flows)
    pub fn remove_account(&self, account_id: i64) {
        self.inner.accounts.write().unwrap().remove(&account_id);
    }

    fn join_vehicle(&self, vehicle_id: i64) -> Option<(Vehicle, String)> {
        let vehicles = self.inner.vehicles.read().unwrap();
        let vehicle = vehicles.get(&vehicle_id)?.clone();
        let classifications = self.inner.classifications.read().unwrap();
        let name = classifications
            .get(&vehicle.classification_id)
            .map(|c| c.classification_name.clone())
            .unwrap_or_default();
        Some((vehicle, name))
    }

    fn favorite_rows(&self, account_id: i64) -> Vec<FavoriteVehicle> {
        let favorites = self.inner.favorites.read().unwrap();
        let mut rows: Vec<FavoriteVehicle> = favorites
            .iter()
            .filter(|((aid, _), _)| *aid == account_id)
            .filter_map(|((_, vid), fav)| {
                let (vehicle, classification_name) = self.join_vehicle(*vid)?;
                Some(FavoriteVehicle {
                    favorite_id: fav.favorite_id,
                    notes: fav.notes.clone(),
                    priority: fav.priority,
                    created_at: fav.created_at,
                    vehicle,
                    classification_name,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.created_at.cmp(&a.created_at))
        });
        rows
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for MemoryStore {
    fn create_account(&self, new: NewAccount) -> StoreResult<Account> {
        let normalized = new.email.to_lowercase();
        let mut accounts = self.inner.accounts.write().unwrap();
        if accounts
            .values()
            .any(|a| a.account.email == normalized)
        {
            return Err(AppError::DuplicateEmail);
        }
        let account_id = self.inner.next_account_id.fetch_add(1, Ordering::SeqCst);
        let account = Account {
            account_id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: normalized,
            role: Role::Client,
        };
        accounts.insert(
            account_id,
            StoredAccount {
                account: account.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(account)
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Credentials>> {
        let normalized = email.to_lowercase();
        let accounts = self.inner.accounts.read().unwrap();
        Ok(accounts
            .values()
            .find(|a| a.account.email == normalized)
            .map(|a| Credentials {
                account: a.account.clone(),
                password_hash: a.password_hash.clone(),
            }))
    }

    fn find_by_id(&self, account_id: i64) -> StoreResult<Option<Account>> {
        let accounts = self.inner.accounts.read().unwrap();
        Ok(accounts.get(&account_id).map(|a| a.account.clone()))
    }

    fn email_exists(&self, email: &str, exclude: Option<i64>) -> StoreResult<bool> {
        let normalized = email.to_lowercase();
        let accounts = self.inner.accounts.read().unwrap();
        Ok(accounts.values().any(|a| {
            a.account.email == normalized && Some(a.account.account_id) != exclude
        }))
    }

    fn update_profile(
        &self,
        account_id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> StoreResult<Option<Account>> {
        let normalized = email.to_lowercase();
        let mut accounts = self.inner.accounts.write().unwrap();
        if accounts.values().any(|a| {
            a.account.email == normalized && a.account.account_id != account_id
        }) {
            return Err(AppError::DuplicateEmail);
        }
        match accounts.get_mut(&account_id) {
            Some(stored) => {
                stored.account.first_name = first_name.to_string();
                stored.account.last_name = last_name.to_string();
                stored.account.email = normalized;
                Ok(Some(stored.account.clone()))
            }
            None => Ok(None),
        }
    }

    fn update_password(&self, account_id: i64, password_hash: &str) -> StoreResult<bool> {
        let mut accounts = self.inner.accounts.write().unwrap();
        match accounts.get_mut(&account_id) {
            Some(stored) => {
                stored.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl InventoryStore for MemoryStore {
    fn list_classifications(&self) -> StoreResult<Vec<Classification>> {
        let classifications = self.inner.classifications.read().unwrap();
        let mut all: Vec<Classification> = classifications.values().cloned().collect();
        all.sort_by(|a, b| a.classification_name.cmp(&b.classification_name));
        Ok(all)
    }

    fn add_classification(&self, name: &str) -> StoreResult<Classification> {
        let mut classifications = self.inner.classifications.write().unwrap();
        if classifications
            .values()
            .any(|c| c.classification_name == name)
        {
            return Err(super::duplicate_classification());
        }
        let classification_id = self.inner.next_classification_id.fetch_add(1, Ordering::SeqCst);
        let classification = Classification {
            classification_id,
            classification_name: name.to_string(),
        };
        classifications.insert(classification_id, classification.clone());
        Ok(classification)
    }

    fn list_by_classification(&self, classification_id: i64) -> StoreResult<Vec<Vehicle>> {
        let vehicles = self.inner.vehicles.read().unwrap();
        let mut matched: Vec<Vehicle> = vehicles
            .values()
            .filter(|v| v.classification_id == classification_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.make.cmp(&b.make).then(a.model.cmp(&b.model)));
        Ok(matched)
    }

    fn vehicle_detail(&self, inv_id: i64) -> StoreResult<Option<VehicleDetail>> {
        Ok(self.join_vehicle(inv_id).map(|(vehicle, classification_name)| VehicleDetail {
            vehicle,
            classification_name,
        }))
    }

    fn get_vehicle(&self, inv_id: i64) -> StoreResult<Option<Vehicle>> {
        let vehicles = self.inner.vehicles.read().unwrap();
        Ok(vehicles.get(&inv_id).cloned())
    }

    fn add_vehicle(&self, new: NewVehicle) -> StoreResult<Vehicle> {
        let inv_id = self.inner.next_vehicle_id.fetch_add(1, Ordering::SeqCst);
        let vehicle = Vehicle {
            inv_id,
            make: new.make,
            model: new.model,
            year: new.year,
            description: new.description,
            image: new.image.unwrap_or_else(|| DEFAULT_VEHICLE_IMAGE.to_string()),
            thumbnail: new
                .thumbnail
                .unwrap_or_else(|| DEFAULT_VEHICLE_THUMBNAIL.to_string()),
            price: new.price,
            miles: new.miles,
            color: new.color,
            classification_id: new.classification_id,
        };
        self.inner.vehicles.write().unwrap().insert(inv_id, vehicle.clone());
        Ok(vehicle)
    }

    fn update_vehicle(&self, vehicle: Vehicle) -> StoreResult<Option<Vehicle>> {
        let mut vehicles = self.inner.vehicles.write().unwrap();
        match vehicles.get_mut(&vehicle.inv_id) {
            Some(existing) => {
                *existing = vehicle.clone();
                Ok(Some(vehicle))
            }
            None => Ok(None),
        }
    }

    fn delete_vehicle(&self, inv_id: i64) -> StoreResult<bool> {
        let removed = self.inner.vehicles.write().unwrap().remove(&inv_id).is_some();
        if removed {
            // favorites referencing the vehicle go with it
            self.inner.favorites
                .write()
                .unwrap()
                .retain(|(_, vid), _| *vid != inv_id);
        }
        Ok(removed)
    }
}

impl FavoriteStore for MemoryStore {
    fn upsert_favorite(
        &self,
        account_id: i64,
        vehicle_id: i64,
        notes: Option<&str>,
        priority: i32,
    ) -> StoreResult<(i64, bool)> {
        let mut favorites = self.inner.favorites.write().unwrap();
        match favorites.get_mut(&(account_id, vehicle_id)) {
            Some(existing) => {
                existing.notes = notes.map(|n| n.to_string());
                existing.priority = priority;
                existing.created_at = Utc::now();
                Ok((existing.favorite_id, false))
            }
            None => {
                let favorite_id = self.inner.next_favorite_id.fetch_add(1, Ordering::SeqCst);
                favorites.insert(
                    (account_id, vehicle_id),
                    StoredFavorite {
                        favorite_id,
                        notes: notes.map(|n| n.to_string()),
                        priority,
                        created_at: Utc::now(),
                    },
                );
                Ok((favorite_id, true))
            }
        }
    }

    fn remove_favorite(&self, account_id: i64, vehicle_id: i64) -> StoreResult<bool> {
        Ok(self
            .inner
            .favorites
            .write()
            .unwrap()
            .remove(&(account_id, vehicle_id))
            .is_some())
    }

    fn is_favorite(&self, account_id: i64, vehicle_id: i64) -> StoreResult<bool> {
        Ok(self
            .inner
            .favorites
            .read()
            .unwrap()
            .contains_key(&(account_id, vehicle_id)))
    }

    fn list_favorites(
        &self,
        account_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<FavoriteVehicle>, i64)> {
        let rows = self.favorite_rows(account_id);
        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    fn vehicle_favorite_count(&self, vehicle_id: i64) -> StoreResult<i64> {
        let favorites = self.inner.favorites.read().unwrap();
        Ok(favorites.keys().filter(|(_, vid)| *vid == vehicle_id).count() as i64)
    }

    fn account_favorite_count(&self, account_id: i64) -> StoreResult<i64> {
        let favorites = self.inner.favorites.read().unwrap();
        Ok(favorites.keys().filter(|(aid, _)| *aid == account_id).count() as i64)
    }

    fn update_notes(
        &self,
        account_id: i64,
        vehicle_id: i64,
        notes: Option<&str>,
    ) -> StoreResult<bool> {
        let mut favorites = self.inner.favorites.write().unwrap();
        match favorites.get_mut(&(account_id, vehicle_id)) {
            Some(fav) => {
                fav.notes = notes.map(|n| n.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_priority(
        &self,
        account_id: i64,
        vehicle_id: i64,
        priority: i32,
    ) -> StoreResult<bool> {
        let mut favorites = self.inner.favorites.write().unwrap();
        match favorites.get_mut(&(account_id, vehicle_id)) {
            Some(fav) => {
                fav.priority = priority;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn recent_favorites(&self, account_id: i64, limit: i64) -> StoreResult<Vec<FavoriteVehicle>> {
        let mut rows = self.favorite_rows(account_id);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    fn favorite_stats(&self, account_id: i64) -> StoreResult<FavoriteStats> {
        let favorites = self.inner.favorites.read().unwrap();
        let mine: Vec<&StoredFavorite> = favorites
            .iter()
            .filter(|((aid, _), _)| *aid == account_id)
            .map(|(_, fav)| fav)
            .collect();
        let total = mine.len() as i64;
        let average_priority = if total > 0 {
            Some(mine.iter().map(|f| f.priority as f64).sum::<f64>() / total as f64)
        } else {
            None
        };
        Ok(FavoriteStats {
            total_favorites: total,
            average_priority,
            first_added: mine.iter().map(|f| f.created_at).min(),
            last_added: mine.iter().map(|f| f.created_at).max(),
        })
    }
}

impl ContactStore for MemoryStore {
    fn create_submission(&self, new: NewContactSubmission) -> StoreResult<ContactSubmission> {
        let contact_id = self.inner.next_contact_id.fetch_add(1, Ordering::SeqCst);
        let submission = ContactSubmission {
            contact_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            subject: new.subject,
            message: new.message,
            vehicle_id: new.vehicle_id,
            preferred_contact: new.preferred_contact,
            newsletter: new.newsletter,
            is_read: false,
            created_at: Utc::now(),
        };
        self.inner.contacts
            .write()
            .unwrap()
            .insert(contact_id, submission.clone());
        Ok(submission)
    }

    fn list_submissions(&self) -> StoreResult<Vec<ContactSubmission>> {
        let contacts = self.inner.contacts.read().unwrap();
        let mut all: Vec<ContactSubmission> = contacts.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn get_submission(&self, contact_id: i64) -> StoreResult<Option<ContactSubmission>> {
        Ok(self.inner.contacts.read().unwrap().get(&contact_id).cloned())
    }

    fn delete_submission(&self, contact_id: i64) -> StoreResult<bool> {
        Ok(self.inner.contacts.write().unwrap().remove(&contact_id).is_some())
    }

    fn mark_read(&self, contact_id: i64) -> StoreResult<bool> {
        let mut contacts = self.inner.contacts.write().unwrap();
        match contacts.get_mut(&contact_id) {
            Some(submission) => {
                submission.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl NoticeStore for MemoryStore {
    fn push_notice(&self, session_id: &str, kind: &str, message: &str) -> StoreResult<()> {
        self.inner.notices
            .write()
            .unwrap()
            .entry(session_id.to_string())
            .or_default()
            .push(Notice {
                kind: kind.to_string(),
                message: message.to_string(),
            });
        Ok(())
    }

    fn take_notices(&self, session_id: &str) -> StoreResult<Vec<Notice>> {
        Ok(self
            .inner
            .notices
            .write()
            .unwrap()
            .remove(session_id)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(store: &MemoryStore, email: &str) -> Account {
        store
            .create_account(NewAccount {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: email.to_lowercase(),
                password_hash: "hashed".to_string(),
            })
            .unwrap()
    }

    fn vehicle(store: &MemoryStore, classification_id: i64) -> Vehicle {
        store
            .add_vehicle(NewVehicle {
                make: "DMC".to_string(),
                model: "DeLorean".to_string(),
                year: 1981,
                description: "Gullwing doors".to_string(),
                image: None,
                thumbnail: None,
                price: 29000.0,
                miles: 88000,
                color: "Silver".to_string(),
                classification_id,
            })
            .unwrap()
    }

    #[test]
    fn test_create_and_find_account() {
        let store = MemoryStore::new();
        let created = account(&store, "test@example.com");
        assert_eq!(created.role, Role::Client);

        let found = store.find_by_email("TEST@example.com").unwrap().unwrap();
        assert_eq!(found.account.account_id, created.account_id);
        assert_eq!(found.password_hash, "hashed");

        // find_by_id never exposes the hash
        let by_id = store.find_by_id(created.account_id).unwrap().unwrap();
        assert_eq!(by_id.email, "test@example.com");
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        account(&store, "dup@example.com");
        let err = store
            .create_account(NewAccount {
                first_name: "Other".to_string(),
                last_name: "User".to_string(),
                email: "dup@example.com".to_string(),
                password_hash: "hash2".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[test]
    fn test_duplicate_classification_rejected() {
        let store = MemoryStore::new();
        store.add_classification("Roadster").unwrap();
        let err = store.add_classification("Roadster").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_update_profile_email_collision() {
        let store = MemoryStore::new();
        let a = account(&store, "a@example.com");
        account(&store, "b@example.com");

        let err = store
            .update_profile(a.account_id, "A", "User", "b@example.com")
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));

        // own email is not a collision
        let updated = store
            .update_profile(a.account_id, "A", "User", "a@example.com")
            .unwrap();
        assert!(updated.is_some());
    }

    #[test]
    fn test_favorite_upsert_and_cap_counting() {
        let store = MemoryStore::new();
        let cls = store.add_classification("Sport").unwrap();
        let a = account(&store, "fav@example.com");
        let v = vehicle(&store, cls.classification_id);

        let (id1, created) = store
            .upsert_favorite(a.account_id, v.inv_id, Some("nice"), 3)
            .unwrap();
        assert!(created);

        let (id2, created) = store
            .upsert_favorite(a.account_id, v.inv_id, Some("nicer"), 5)
            .unwrap();
        assert!(!created);
        assert_eq!(id1, id2);

        assert_eq!(store.account_favorite_count(a.account_id).unwrap(), 1);
        let (rows, total) = store.list_favorites(a.account_id, 10, 0).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].priority, 5);
        assert_eq!(rows[0].notes.as_deref(), Some("nicer"));
    }

    #[test]
    fn test_deleting_vehicle_drops_favorites() {
        let store = MemoryStore::new();
        let cls = store.add_classification("SUV").unwrap();
        let a = account(&store, "drop@example.com");
        let v = vehicle(&store, cls.classification_id);

        store.upsert_favorite(a.account_id, v.inv_id, None, 1).unwrap();
        assert!(store.delete_vehicle(v.inv_id).unwrap());
        assert!(!store.is_favorite(a.account_id, v.inv_id).unwrap());
    }

    #[test]
    fn test_notices_read_once() {
        let store = MemoryStore::new();
        store.push_notice("sid", "notice", "Please log in.").unwrap();

        let first = store.take_notices("sid").unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].message, "Please log in.");

        assert!(store.take_notices("sid").unwrap().is_empty());
    }
}
