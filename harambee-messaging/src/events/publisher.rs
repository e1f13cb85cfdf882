use uuid::Uuid;

use harambee_shared::clients::rabbitmq::RabbitMQClient;
use harambee_shared::types::event::{payloads, routing_keys, Event};

use crate::models::Message;
use crate::services::conversation_service;

pub async fn publish_message_sent(rabbitmq: &RabbitMQClient, message: &Message, recipient_id: Uuid) {
    let event = Event::new(
        "harambee-messaging",
        routing_keys::MESSAGING_MESSAGE_SENT,
        payloads::MessageSent {
            message_id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            recipient_id,
            content_preview: conversation_service::preview(&message.content),
        },
    )
    .with_user(message.sender_id);

    rabbitmq.publish_logged(event).await;
}
