//! Data models for the dealership store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role tag.
///
/// Defaults to `Client` on self-registration; only staff tooling outside
/// the registration path assigns `Employee` or `Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Client,
    Employee,
    Admin,
}

impl Role {
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Employee | Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Employee => "Employee",
            Role::Admin => "Admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Client" => Some(Role::Client),
            "Employee" => Some(Role::Employee),
            "Admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Public account fields. The password hash never travels on this struct.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

/// Account plus its stored password hash, for login verification only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account: Account,
    pub password_hash: String,
}

/// Input for account creation. The email is normalized (lower-cased)
/// before it reaches the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// A vehicle classification (Sedan, SUV, ...)
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub classification_id: i64,
    pub classification_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub inv_id: i64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub description: String,
    pub image: String,
    pub thumbnail: String,
    pub price: f64,
    pub miles: i64,
    pub color: String,
    pub classification_id: i64,
}

/// Input for vehicle creation; image paths fall back to placeholders.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub price: f64,
    pub miles: i64,
    pub color: String,
    pub classification_id: i64,
}

pub const DEFAULT_VEHICLE_IMAGE: &str = "/images/vehicles/no-image.jpg";
pub const DEFAULT_VEHICLE_THUMBNAIL: &str = "/images/vehicles/no-image-tn.jpg";

/// A vehicle joined with its classification name, for detail pages.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleDetail {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub classification_name: String,
}

/// A favorited vehicle row: the favorite fields joined with the vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteVehicle {
    pub favorite_id: i64,
    pub notes: Option<String>,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub classification_name: String,
}

/// Aggregate statistics over one account's favorites
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteStats {
    pub total_favorites: i64,
    pub average_priority: Option<f64>,
    pub first_added: Option<DateTime<Utc>>,
    pub last_added: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactSubmission {
    pub contact_id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub vehicle_id: Option<i64>,
    pub preferred_contact: String,
    pub newsletter: bool,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub vehicle_id: Option<i64>,
    pub preferred_contact: String,
    pub newsletter: bool,
}

/// A queued one-shot flash notice, keyed by flash-session id
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub kind: String,
    pub message: String,
}
