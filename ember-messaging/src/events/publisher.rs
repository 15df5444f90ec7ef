use ember_shared::clients::rabbitmq::RabbitMQClient;
use ember_shared::types::event::{payloads, routing_keys, Event};

use crate::models::Message;

/// The real-time relay consumes this to push the message to the receiver's
/// open connection.
pub async fn publish_message_sent(rabbitmq: &RabbitMQClient, message: &Message, preview: &str) {
    let event = Event::new(
        "ember-messaging",
        routing_keys::MESSAGING_MESSAGE_SENT,
        payloads::MessageSent {
            message_id: message.id,
            match_id: message.match_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content_preview: preview.to_string(),
        },
    )
    .with_user(message.sender_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MESSAGING_MESSAGE_SENT, &event).await {
        tracing::error!(error = %e, "failed to publish message.sent event");
    }
}
