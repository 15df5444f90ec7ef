use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ event envelope wrapping all domain events.
///
/// Routing key format: `ember.{domain}.{entity}.{action}`
/// Example: `ember.matching.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys. Notification and real-time delivery services
/// bind to these; this backend only publishes.
pub mod routing_keys {
    // User events
    pub const USER_REGISTERED: &str = "ember.user.account.registered";
    pub const USER_PROFILE_UPDATED: &str = "ember.user.profile.updated";
    pub const USER_ONBOARDING_COMPLETED: &str = "ember.user.profile.onboarding_completed";

    // Matching events
    pub const MATCHING_SWIPE_RECORDED: &str = "ember.matching.swipe.recorded";
    pub const MATCHING_MATCH_CREATED: &str = "ember.matching.match.created";
    pub const MATCHING_MATCH_UNMATCHED: &str = "ember.matching.match.unmatched";
    pub const MATCHING_BLOCK_CREATED: &str = "ember.matching.block.created";

    // Messaging events
    pub const MESSAGING_MESSAGE_SENT: &str = "ember.messaging.message.sent";

    // Moderation events
    pub const MODERATION_REPORT_CREATED: &str = "ember.moderation.report.created";
    pub const MODERATION_USER_DELETED: &str = "ember.moderation.user.deleted";
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserRegistered {
        pub user_id: Uuid,
        pub email: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileUpdated {
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct OnboardingCompleted {
        pub user_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SwipeRecorded {
        pub swipe_id: Uuid,
        pub swiper_id: Uuid,
        pub target_id: Uuid,
        pub direction: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub user1_id: Uuid,
        pub user2_id: Uuid,
        pub rematch: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchUnmatched {
        pub match_id: Uuid,
        pub unmatched_by: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BlockCreated {
        pub blocker_id: Uuid,
        pub blocked_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MessageSent {
        pub message_id: Uuid,
        pub match_id: Uuid,
        pub sender_id: Uuid,
        pub receiver_id: Uuid,
        pub content_preview: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ReportCreated {
        pub report_id: Uuid,
        pub reporter_id: Uuid,
        pub target_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserDeleted {
        pub user_id: Uuid,
        pub deleted_by: Uuid,
    }
}
