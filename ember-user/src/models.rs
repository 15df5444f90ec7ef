use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use ember_shared::types::profile::Preferences;

use crate::schema::{photos, users};

// --- User ---

// Not Serialize: the credential hash stays inside this module. Responses go
// through AccountView (the owner's view) or PublicProfile (everyone else's).
#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: Option<String>,
    pub height_cm: Option<i32>,
    pub interests: serde_json::Value,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub preferences: serde_json::Value,
    pub onboarding_complete: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl User {
    pub fn preferences(&self) -> Preferences {
        Preferences::from_json(&self.preferences)
    }

    pub fn interest_tags(&self) -> Vec<String> {
        self.interests
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: Option<String>,
    pub height_cm: Option<i32>,
    pub interests: serde_json::Value,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub preferences: serde_json::Value,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub height_cm: Option<i32>,
    pub interests: Option<serde_json::Value>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub preferences: Option<serde_json::Value>,
    pub onboarding_complete: Option<bool>,
    pub last_active_at: Option<DateTime<Utc>>,
}

// --- Photo ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = photos)]
pub struct Photo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = photos)]
pub struct NewPhoto {
    pub user_id: Uuid,
    pub url: String,
}

// --- Response DTOs ---

/// The account owner's own view, including email and preferences.
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: Option<String>,
    pub height_cm: Option<i32>,
    pub interests: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub preferences: Preferences,
    pub onboarding_complete: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub photos: Vec<Photo>,
}

impl AccountView {
    pub fn from_user(user: &User, photos: Vec<Photo>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            age: user.age,
            gender: user.gender.clone(),
            bio: user.bio.clone(),
            height_cm: user.height_cm,
            interests: user.interest_tags(),
            latitude: user.latitude,
            longitude: user.longitude,
            preferences: user.preferences(),
            onboarding_complete: user.onboarding_complete,
            is_admin: user.is_admin,
            created_at: user.created_at,
            photos,
        }
    }
}

/// What other users see of a profile.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: Option<String>,
    pub height_cm: Option<i32>,
    pub interests: Vec<String>,
    pub photos: Vec<Photo>,
    pub created_at: DateTime<Utc>,
}

impl PublicProfile {
    pub fn from_user(user: &User, photos: Vec<Photo>) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            age: user.age,
            gender: user.gender.clone(),
            bio: user.bio.clone(),
            height_cm: user.height_cm,
            interests: user.interest_tags(),
            photos,
            created_at: user.created_at,
        }
    }
}
