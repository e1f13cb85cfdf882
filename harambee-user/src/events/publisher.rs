use uuid::Uuid;

use harambee_shared::clients::rabbitmq::RabbitMQClient;
use harambee_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_profile_updated(rabbitmq: &RabbitMQClient, profile_id: Uuid, section: &str) {
    let event = Event::new(
        "harambee-user",
        routing_keys::USER_PROFILE_UPDATED,
        payloads::ProfileUpdated {
            profile_id,
            section: section.to_string(),
        },
    )
    .with_user(profile_id);

    rabbitmq.publish_logged(event).await;
}

pub async fn publish_profile_deactivated(rabbitmq: &RabbitMQClient, profile_id: Uuid) {
    let event = Event::new(
        "harambee-user",
        routing_keys::USER_PROFILE_DEACTIVATED,
        payloads::ProfileDeactivated { profile_id },
    )
    .with_user(profile_id);

    rabbitmq.publish_logged(event).await;
}
