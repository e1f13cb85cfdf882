use uuid::Uuid;

use harambee_shared::clients::rabbitmq::RabbitMQClient;
use harambee_shared::types::event::{payloads, routing_keys, Event};

use crate::models::Match;

pub async fn publish_mutual_match(
    rabbitmq: &RabbitMQClient,
    record: &Match,
    conversation_id: Option<Uuid>,
) {
    let event = Event::new(
        "harambee-matching",
        routing_keys::MATCHING_MATCH_MUTUAL,
        payloads::MutualMatch {
            match_id: record.id,
            user1_id: record.user1_id,
            user2_id: record.user2_id,
            overall_score: record.overall_score,
            conversation_id,
        },
    )
    .with_user(record.user1_id);

    rabbitmq.publish_logged(event).await;
}
