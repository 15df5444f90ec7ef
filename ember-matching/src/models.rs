use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use ember_shared::types::profile::{Gender, Preferences};

use crate::matching::SwipeDirection;
use crate::schema::{blocks, matches, messages, photos, swipes, users};

// --- User (read-only view of the shared users table) ---

// Deliberately not Serialize: responses go through PublicProfile, which
// cannot carry the credential hash.
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

    pub fn gender(&self) -> Gender {
        self.gender.parse().unwrap_or(Gender::Other)
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

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
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

// --- Message (read-only view of the shared messages table) ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub message_type: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

// --- Swipe ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = swipes)]
pub struct Swipe {
    pub id: Uuid,
    pub swiper_id: Uuid,
    pub target_id: Uuid,
    pub direction: String,
    pub created_at: DateTime<Utc>,
}

impl Swipe {
    pub fn direction(&self) -> SwipeDirection {
        // The column only ever holds values written through NewSwipe.
        self.direction.parse().unwrap_or(SwipeDirection::Dislike)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = swipes)]
pub struct NewSwipe {
    pub swiper_id: Uuid,
    pub target_id: Uuid,
    pub direction: String,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub unmatched: bool,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    pub fn other_user(&self, user_id: Uuid) -> Uuid {
        if self.user1_id == user_id {
            self.user2_id
        } else {
            self.user1_id
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user1_id: Uuid,
    pub user2_id: Uuid,
}

// --- Block ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = blocks)]
pub struct Block {
    pub id: Uuid,
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blocks)]
pub struct NewBlock {
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
}

// --- Public profile DTO ---

#[derive(Debug, Serialize, Clone)]
pub struct PhotoView {
    pub id: Uuid,
    pub url: String,
}

/// The profile shape exposed to other users. Built from a User row plus its
/// photos; credential and admin fields never cross this boundary.
#[derive(Debug, Serialize, Clone)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: Option<String>,
    pub height_cm: Option<i32>,
    pub interests: Vec<String>,
    pub photos: Vec<PhotoView>,
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
            photos: photos
                .into_iter()
                .map(|p| PhotoView { id: p.id, url: p.url })
                .collect(),
            created_at: user.created_at,
        }
    }
}
