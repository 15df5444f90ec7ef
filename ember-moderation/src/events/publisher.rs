use uuid::Uuid;

use ember_shared::clients::rabbitmq::RabbitMQClient;
use ember_shared::types::event::{payloads, routing_keys, Event};

use crate::models::Report;

pub async fn publish_report_created(rabbitmq: &RabbitMQClient, report: &Report) {
    let event = Event::new(
        "ember-moderation",
        routing_keys::MODERATION_REPORT_CREATED,
        payloads::ReportCreated {
            report_id: report.id,
            reporter_id: report.reporter_id,
            target_id: report.target_id,
        },
    )
    .with_user(report.reporter_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_REPORT_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish report.created event");
    }
}

pub async fn publish_user_deleted(rabbitmq: &RabbitMQClient, user_id: Uuid, deleted_by: Uuid) {
    let event = Event::new(
        "ember-moderation",
        routing_keys::MODERATION_USER_DELETED,
        payloads::UserDeleted { user_id, deleted_by },
    )
    .with_user(deleted_by);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_USER_DELETED, &event).await {
        tracing::error!(error = %e, "failed to publish user.deleted event");
    }
}
