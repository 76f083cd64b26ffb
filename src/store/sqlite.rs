//! SQLite-based storage implementation

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    Account, AccountStore, Classification, ContactStore, ContactSubmission, Credentials,
    FavoriteStats, FavoriteStore, FavoriteVehicle, InventoryStore, NewAccount,
    NewContactSubmission, NewVehicle, Notice, NoticeStore, Role, StoreResult, Vehicle,
    VehicleDetail, DEFAULT_VEHICLE_IMAGE, DEFAULT_VEHICLE_THUMBNAIL,
};
use crate::error::AppError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite-backed store implementing the full [`super::Store`] surface
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, AppError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), AppError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, AppError> {
        let table_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        Ok(conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })?)
    }

    /// Migration to version 1: initial schema plus base classifications
    fn migrate_v1(conn: &Connection) -> Result<(), AppError> {
        conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Accounts (emails stored lower-cased)
            CREATE TABLE IF NOT EXISTS account (
                account_id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'Client'
            );

            -- Vehicle classifications
            CREATE TABLE IF NOT EXISTS classification (
                classification_id INTEGER PRIMARY KEY AUTOINCREMENT,
                classification_name TEXT NOT NULL UNIQUE
            );

            -- Inventory
            CREATE TABLE IF NOT EXISTS inventory (
                inv_id INTEGER PRIMARY KEY AUTOINCREMENT,
                make TEXT NOT NULL,
                model TEXT NOT NULL,
                year INTEGER NOT NULL,
                description TEXT NOT NULL,
                image TEXT NOT NULL,
                thumbnail TEXT NOT NULL,
                price REAL NOT NULL,
                miles INTEGER NOT NULL,
                color TEXT NOT NULL,
                classification_id INTEGER NOT NULL REFERENCES classification(classification_id)
            );
            CREATE INDEX IF NOT EXISTS idx_inventory_classification
                ON inventory(classification_id);

            -- Favorites (one row per account/vehicle pair)
            CREATE TABLE IF NOT EXISTS favorite (
                favorite_id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES account(account_id) ON DELETE CASCADE,
                vehicle_id INTEGER NOT NULL REFERENCES inventory(inv_id) ON DELETE CASCADE,
                notes TEXT,
                priority INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                UNIQUE(account_id, vehicle_id)
            );
            CREATE INDEX IF NOT EXISTS idx_favorite_account ON favorite(account_id);

            -- Contact-form submissions
            CREATE TABLE IF NOT EXISTS contact_submission (
                contact_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT,
                subject TEXT,
                message TEXT NOT NULL,
                vehicle_id INTEGER REFERENCES inventory(inv_id) ON DELETE SET NULL,
                preferred_contact TEXT NOT NULL DEFAULT 'email',
                newsletter INTEGER NOT NULL DEFAULT 0,
                is_read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            -- One-shot flash notices, keyed by flash-session id
            CREATE TABLE IF NOT EXISTS session_notice (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                message TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_notice_session ON session_notice(session_id);

            -- Base classifications
            INSERT OR IGNORE INTO classification (classification_name) VALUES
                ('Custom'), ('Sport'), ('SUV'), ('Truck'), ('Sedan');
            "#,
        )?;

        Ok(())
    }
}

fn parse_ts(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

fn account_from_row(row: &Row) -> rusqlite::Result<Account> {
    let role: String = row.get("role")?;
    Ok(Account {
        account_id: row.get("account_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        role: Role::from_str(&role).unwrap_or(Role::Client),
    })
}

fn vehicle_from_row(row: &Row) -> rusqlite::Result<Vehicle> {
    Ok(Vehicle {
        inv_id: row.get("inv_id")?,
        make: row.get("make")?,
        model: row.get("model")?,
        year: row.get("year")?,
        description: row.get("description")?,
        image: row.get("image")?,
        thumbnail: row.get("thumbnail")?,
        price: row.get("price")?,
        miles: row.get("miles")?,
        color: row.get("color")?,
        classification_id: row.get("classification_id")?,
    })
}

fn favorite_vehicle_from_row(row: &Row) -> rusqlite::Result<FavoriteVehicle> {
    let created_at: String = row.get("created_at")?;
    Ok(FavoriteVehicle {
        favorite_id: row.get("favorite_id")?,
        notes: row.get("notes")?,
        priority: row.get("priority")?,
        created_at: parse_ts(created_at),
        vehicle: vehicle_from_row(row)?,
        classification_name: row.get("classification_name")?,
    })
}

fn submission_from_row(row: &Row) -> rusqlite::Result<ContactSubmission> {
    let created_at: String = row.get("created_at")?;
    Ok(ContactSubmission {
        contact_id: row.get("contact_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        subject: row.get("subject")?,
        message: row.get("message")?,
        vehicle_id: row.get("vehicle_id")?,
        preferred_contact: row.get("preferred_contact")?,
        newsletter: row.get("newsletter")?,
        is_read: row.get("is_read")?,
        created_at: parse_ts(created_at),
    })
}

/// Map a unique-constraint violation to DuplicateEmail, everything else
/// to Internal. The constraint is the backstop for the non-transactional
/// check-then-insert registration path.
fn map_unique_email(e: rusqlite::Error) -> AppError {
    if let rusqlite::Error::SqliteFailure(err, _) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return AppError::DuplicateEmail;
        }
    }
    e.into()
}

/// Map the UNIQUE constraint on classification_name to the shared
/// duplicate-classification error rather than a server error.
fn map_unique_classification(e: rusqlite::Error) -> AppError {
    if let rusqlite::Error::SqliteFailure(err, _) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return super::duplicate_classification();
        }
    }
    e.into()
}

impl AccountStore for SqliteStore {
    fn create_account(&self, new: NewAccount) -> StoreResult<Account> {
        let conn = self.conn.lock().unwrap();
        let normalized = new.email.to_lowercase();

        // Pre-check for a friendlier error; the UNIQUE constraint still
        // catches concurrent registrations.
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM account WHERE email = ?1)",
            params![normalized],
            |row| row.get(0),
        )?;
        if exists {
            return Err(AppError::DuplicateEmail);
        }

        conn.query_row(
            "INSERT INTO account (first_name, last_name, email, password_hash, role)
             VALUES (?1, ?2, ?3, ?4, 'Client')
             RETURNING account_id, first_name, last_name, email, role",
            params![new.first_name, new.last_name, normalized, new.password_hash],
            account_from_row,
        )
        .map_err(map_unique_email)
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Credentials>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT account_id, first_name, last_name, email, password_hash, role
                 FROM account WHERE email = ?1",
                params![email.to_lowercase()],
                |row| {
                    Ok(Credentials {
                        account: account_from_row(row)?,
                        password_hash: row.get("password_hash")?,
                    })
                },
            )
            .optional()?)
    }

    fn find_by_id(&self, account_id: i64) -> StoreResult<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT account_id, first_name, last_name, email, role
                 FROM account WHERE account_id = ?1",
                params![account_id],
                account_from_row,
            )
            .optional()?)
    }

    fn email_exists(&self, email: &str, exclude: Option<i64>) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let normalized = email.to_lowercase();
        let exists: bool = match exclude {
            Some(id) => conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM account WHERE email = ?1 AND account_id != ?2)",
                params![normalized, id],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM account WHERE email = ?1)",
                params![normalized],
                |row| row.get(0),
            )?,
        };
        Ok(exists)
    }

    fn update_profile(
        &self,
        account_id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> StoreResult<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        let normalized = email.to_lowercase();

        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM account WHERE email = ?1 AND account_id != ?2)",
            params![normalized, account_id],
            |row| row.get(0),
        )?;
        if taken {
            return Err(AppError::DuplicateEmail);
        }

        conn.query_row(
            "UPDATE account SET first_name = ?1, last_name = ?2, email = ?3
             WHERE account_id = ?4
             RETURNING account_id, first_name, last_name, email, role",
            params![first_name, last_name, normalized, account_id],
            account_from_row,
        )
        .optional()
        .map_err(map_unique_email)
    }

    fn update_password(&self, account_id: i64, password_hash: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE account SET password_hash = ?1 WHERE account_id = ?2",
            params![password_hash, account_id],
        )?;
        Ok(changed > 0)
    }
}

impl InventoryStore for SqliteStore {
    fn list_classifications(&self) -> StoreResult<Vec<Classification>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT classification_id, classification_name
             FROM classification ORDER BY classification_name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Classification {
                classification_id: row.get(0)?,
                classification_name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn add_classification(&self, name: &str) -> StoreResult<Classification> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "INSERT INTO classification (classification_name) VALUES (?1)
             RETURNING classification_id, classification_name",
            params![name],
            |row| {
                Ok(Classification {
                    classification_id: row.get(0)?,
                    classification_name: row.get(1)?,
                })
            },
        )
        .map_err(map_unique_classification)
    }

    fn list_by_classification(&self, classification_id: i64) -> StoreResult<Vec<Vehicle>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM inventory WHERE classification_id = ?1 ORDER BY make, model",
        )?;
        let rows = stmt.query_map(params![classification_id], vehicle_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn vehicle_detail(&self, inv_id: i64) -> StoreResult<Option<VehicleDetail>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT i.*, c.classification_name
                 FROM inventory i
                 JOIN classification c ON i.classification_id = c.classification_id
                 WHERE i.inv_id = ?1",
                params![inv_id],
                |row| {
                    Ok(VehicleDetail {
                        vehicle: vehicle_from_row(row)?,
                        classification_name: row.get("classification_name")?,
                    })
                },
            )
            .optional()?)
    }

    fn get_vehicle(&self, inv_id: i64) -> StoreResult<Option<Vehicle>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT * FROM inventory WHERE inv_id = ?1",
                params![inv_id],
                vehicle_from_row,
            )
            .optional()?)
    }

    fn add_vehicle(&self, new: NewVehicle) -> StoreResult<Vehicle> {
        let conn = self.conn.lock().unwrap();
        let image = new.image.unwrap_or_else(|| DEFAULT_VEHICLE_IMAGE.to_string());
        let thumbnail = new
            .thumbnail
            .unwrap_or_else(|| DEFAULT_VEHICLE_THUMBNAIL.to_string());
        Ok(conn.query_row(
            "INSERT INTO inventory
                (make, model, year, description, image, thumbnail, price, miles, color, classification_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             RETURNING *",
            params![
                new.make,
                new.model,
                new.year,
                new.description,
                image,
                thumbnail,
                new.price,
                new.miles,
                new.color,
                new.classification_id
            ],
            vehicle_from_row,
        )?)
    }

    fn update_vehicle(&self, vehicle: Vehicle) -> StoreResult<Option<Vehicle>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "UPDATE inventory SET
                    make = ?1, model = ?2, year = ?3, description = ?4,
                    image = ?5, thumbnail = ?6, price = ?7, miles = ?8,
                    color = ?9, classification_id = ?10
                 WHERE inv_id = ?11
                 RETURNING *",
                params![
                    vehicle.make,
                    vehicle.model,
                    vehicle.year,
                    vehicle.description,
                    vehicle.image,
                    vehicle.thumbnail,
                    vehicle.price,
                    vehicle.miles,
                    vehicle.color,
                    vehicle.classification_id,
                    vehicle.inv_id
                ],
                vehicle_from_row,
            )
            .optional()?)
    }

    fn delete_vehicle(&self, inv_id: i64) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM inventory WHERE inv_id = ?1", params![inv_id])?;
        Ok(deleted > 0)
    }
}

const FAVORITE_JOIN: &str = "SELECT f.favorite_id, f.notes, f.priority, f.created_at,
        i.inv_id, i.make, i.model, i.year, i.description, i.image, i.thumbnail,
        i.price, i.miles, i.color, i.classification_id, c.classification_name
     FROM favorite f
     JOIN inventory i ON f.vehicle_id = i.inv_id
     JOIN classification c ON i.classification_id = c.classification_id";

impl FavoriteStore for SqliteStore {
    fn upsert_favorite(
        &self,
        account_id: i64,
        vehicle_id: i64,
        notes: Option<&str>,
        priority: i32,
    ) -> StoreResult<(i64, bool)> {
        let conn = self.conn.lock().unwrap();
        let existed: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM favorite WHERE account_id = ?1 AND vehicle_id = ?2)",
            params![account_id, vehicle_id],
            |row| row.get(0),
        )?;
        let favorite_id: i64 = conn.query_row(
            "INSERT INTO favorite (account_id, vehicle_id, notes, priority, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(account_id, vehicle_id) DO UPDATE SET
                notes = excluded.notes,
                priority = excluded.priority,
                created_at = excluded.created_at
             RETURNING favorite_id",
            params![account_id, vehicle_id, notes, priority, Utc::now().to_rfc3339()],
            |row| row.get(0),
        )?;
        Ok((favorite_id, !existed))
    }

    fn remove_favorite(&self, account_id: i64, vehicle_id: i64) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM favorite WHERE account_id = ?1 AND vehicle_id = ?2",
            params![account_id, vehicle_id],
        )?;
        Ok(deleted > 0)
    }

    fn is_favorite(&self, account_id: i64, vehicle_id: i64) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM favorite WHERE account_id = ?1 AND vehicle_id = ?2)",
            params![account_id, vehicle_id],
            |row| row.get(0),
        )?)
    }

    fn list_favorites(
        &self,
        account_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<FavoriteVehicle>, i64)> {
        let conn = self.conn.lock().unwrap();
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM favorite WHERE account_id = ?1",
            params![account_id],
            |row| row.get(0),
        )?;
        let sql = format!(
            "{FAVORITE_JOIN}
             WHERE f.account_id = ?1
             ORDER BY f.priority DESC, f.created_at DESC
             LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![account_id, limit, offset], favorite_vehicle_from_row)?;
        Ok((rows.collect::<rusqlite::Result<Vec<_>>>()?, total))
    }

    fn vehicle_favorite_count(&self, vehicle_id: i64) -> StoreResult<i64> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM favorite WHERE vehicle_id = ?1",
            params![vehicle_id],
            |row| row.get(0),
        )?)
    }

    fn account_favorite_count(&self, account_id: i64) -> StoreResult<i64> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM favorite WHERE account_id = ?1",
            params![account_id],
            |row| row.get(0),
        )?)
    }

    fn update_notes(
        &self,
        account_id: i64,
        vehicle_id: i64,
        notes: Option<&str>,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE favorite SET notes = ?3 WHERE account_id = ?1 AND vehicle_id = ?2",
            params![account_id, vehicle_id, notes],
        )?;
        Ok(changed > 0)
    }

    fn update_priority(
        &self,
        account_id: i64,
        vehicle_id: i64,
        priority: i32,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE favorite SET priority = ?3 WHERE account_id = ?1 AND vehicle_id = ?2",
            params![account_id, vehicle_id, priority],
        )?;
        Ok(changed > 0)
    }

    fn recent_favorites(&self, account_id: i64, limit: i64) -> StoreResult<Vec<FavoriteVehicle>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "{FAVORITE_JOIN}
             WHERE f.account_id = ?1
             ORDER BY f.created_at DESC
             LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![account_id, limit], favorite_vehicle_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn favorite_stats(&self, account_id: i64) -> StoreResult<FavoriteStats> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT COUNT(*), AVG(priority), MIN(created_at), MAX(created_at)
             FROM favorite WHERE account_id = ?1",
            params![account_id],
            |row| {
                Ok(FavoriteStats {
                    total_favorites: row.get(0)?,
                    average_priority: row.get(1)?,
                    first_added: row.get::<_, Option<String>>(2)?.map(parse_ts),
                    last_added: row.get::<_, Option<String>>(3)?.map(parse_ts),
                })
            },
        )?)
    }
}

impl ContactStore for SqliteStore {
    fn create_submission(&self, new: NewContactSubmission) -> StoreResult<ContactSubmission> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "INSERT INTO contact_submission
                (name, email, phone, subject, message, vehicle_id, preferred_contact, newsletter, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING *",
            params![
                new.name,
                new.email,
                new.phone,
                new.subject,
                new.message,
                new.vehicle_id,
                new.preferred_contact,
                new.newsletter,
                Utc::now().to_rfc3339()
            ],
            submission_from_row,
        )?)
    }

    fn list_submissions(&self) -> StoreResult<Vec<ContactSubmission>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM contact_submission ORDER BY created_at DESC")?;
        let rows = stmt.query_map([], submission_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_submission(&self, contact_id: i64) -> StoreResult<Option<ContactSubmission>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT * FROM contact_submission WHERE contact_id = ?1",
                params![contact_id],
                submission_from_row,
            )
            .optional()?)
    }

    fn delete_submission(&self, contact_id: i64) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM contact_submission WHERE contact_id = ?1",
            params![contact_id],
        )?;
        Ok(deleted > 0)
    }

    fn mark_read(&self, contact_id: i64) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE contact_submission SET is_read = 1 WHERE contact_id = ?1",
            params![contact_id],
        )?;
        Ok(changed > 0)
    }
}

impl NoticeStore for SqliteStore {
    fn push_notice(&self, session_id: &str, kind: &str, message: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO session_notice (session_id, kind, message) VALUES (?1, ?2, ?3)",
            params![session_id, kind, message],
        )?;
        Ok(())
    }

    fn take_notices(&self, session_id: &str) -> StoreResult<Vec<Notice>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "DELETE FROM session_notice WHERE session_id = ?1 RETURNING kind, message",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            Ok(Notice {
                kind: row.get(0)?,
                message: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_and_seeded_classifications() {
        let store = SqliteStore::open_in_memory().unwrap();
        let classifications = store.list_classifications().unwrap();
        assert_eq!(classifications.len(), 5);
        assert!(classifications
            .iter()
            .any(|c| c.classification_name == "Sedan"));
    }

    #[test]
    fn test_unique_email_constraint_maps_to_duplicate() {
        let store = SqliteStore::open_in_memory().unwrap();
        let new = |email: &str| NewAccount {
            first_name: "Jo".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        };
        store.create_account(new("jo@example.com")).unwrap();

        // Mixed case collides with the normalized stored email
        let err = store.create_account(new("JO@example.com")).unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[test]
    fn test_duplicate_classification_maps_to_validation() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add_classification("Hatchback").unwrap();

        let err = store.add_classification("Hatchback").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_favorite_upsert_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let account = store
            .create_account(NewAccount {
                first_name: "Fan".to_string(),
                last_name: "Atic".to_string(),
                email: "fan@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .unwrap();
        let vehicle = store
            .add_vehicle(NewVehicle {
                make: "Jeep".to_string(),
                model: "Wrangler".to_string(),
                year: 2019,
                description: "Trail rated".to_string(),
                image: None,
                thumbnail: None,
                price: 28500.0,
                miles: 41000,
                color: "Yellow".to_string(),
                classification_id: 1,
            })
            .unwrap();

        let (id, created) = store
            .upsert_favorite(account.account_id, vehicle.inv_id, None, 2)
            .unwrap();
        assert!(created);

        let (id2, created) = store
            .upsert_favorite(account.account_id, vehicle.inv_id, Some("want"), 5)
            .unwrap();
        assert!(!created);
        assert_eq!(id, id2);

        let (rows, total) = store.list_favorites(account.account_id, 10, 0).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].priority, 5);
        assert_eq!(rows[0].vehicle.make, "Jeep");

        let stats = store.favorite_stats(account.account_id).unwrap();
        assert_eq!(stats.total_favorites, 1);
        assert_eq!(stats.average_priority, Some(5.0));
    }

    #[test]
    fn test_notices_delete_on_read() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.push_notice("sid", "notice", "Please log in.").unwrap();
        assert_eq!(store.take_notices("sid").unwrap().len(), 1);
        assert!(store.take_notices("sid").unwrap().is_empty());
    }
}
