use uuid::Uuid;

use ember_shared::clients::rabbitmq::RabbitMQClient;
use ember_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{Match, Swipe};

pub async fn publish_swipe_recorded(rabbitmq: &RabbitMQClient, swipe: &Swipe) {
    let event = Event::new(
        "ember-matching",
        routing_keys::MATCHING_SWIPE_RECORDED,
        payloads::SwipeRecorded {
            swipe_id: swipe.id,
            swiper_id: swipe.swiper_id,
            target_id: swipe.target_id,
            direction: swipe.direction.clone(),
        },
    )
    .with_user(swipe.swiper_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_SWIPE_RECORDED, &event).await {
        tracing::error!(error = %e, "failed to publish swipe.recorded event");
    }
}

pub async fn publish_match_created(rabbitmq: &RabbitMQClient, record: &Match, rematch: bool) {
    let event = Event::new(
        "ember-matching",
        routing_keys::MATCHING_MATCH_CREATED,
        payloads::MatchCreated {
            match_id: record.id,
            user1_id: record.user1_id,
            user2_id: record.user2_id,
            rematch,
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_MATCH_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish match.created event");
    }
}

pub async fn publish_match_unmatched(rabbitmq: &RabbitMQClient, match_id: Uuid, unmatched_by: Uuid) {
    let event = Event::new(
        "ember-matching",
        routing_keys::MATCHING_MATCH_UNMATCHED,
        payloads::MatchUnmatched { match_id, unmatched_by },
    )
    .with_user(unmatched_by);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_MATCH_UNMATCHED, &event).await {
        tracing::error!(error = %e, "failed to publish match.unmatched event");
    }
}

pub async fn publish_block_created(rabbitmq: &RabbitMQClient, blocker_id: Uuid, blocked_id: Uuid) {
    let event = Event::new(
        "ember-matching",
        routing_keys::MATCHING_BLOCK_CREATED,
        payloads::BlockCreated { blocker_id, blocked_id },
    )
    .with_user(blocker_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_BLOCK_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish block.created event");
    }
}
