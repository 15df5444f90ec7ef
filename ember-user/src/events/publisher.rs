use uuid::Uuid;

use ember_shared::clients::rabbitmq::RabbitMQClient;
use ember_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_user_registered(rabbitmq: &RabbitMQClient, user_id: Uuid, email: &str) {
    let event = Event::new(
        "ember-user",
        routing_keys::USER_REGISTERED,
        payloads::UserRegistered {
            user_id,
            email: email.to_string(),
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_REGISTERED, &event).await {
        tracing::error!(error = %e, "failed to publish account.registered event");
    }
}

pub async fn publish_profile_updated(rabbitmq: &RabbitMQClient, user_id: Uuid) {
    let event = Event::new(
        "ember-user",
        routing_keys::USER_PROFILE_UPDATED,
        payloads::ProfileUpdated { user_id },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_PROFILE_UPDATED, &event).await {
        tracing::error!(error = %e, "failed to publish profile.updated event");
    }
}

pub async fn publish_onboarding_completed(rabbitmq: &RabbitMQClient, user_id: Uuid, name: &str) {
    let event = Event::new(
        "ember-user",
        routing_keys::USER_ONBOARDING_COMPLETED,
        payloads::OnboardingCompleted {
            user_id,
            name: name.to_string(),
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_ONBOARDING_COMPLETED, &event).await {
        tracing::error!(error = %e, "failed to publish onboarding.completed event");
    }
}
