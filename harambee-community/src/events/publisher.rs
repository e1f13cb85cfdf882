use harambee_shared::clients::rabbitmq::RabbitMQClient;
use harambee_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{Endorsement, QuizAttempt};

pub async fn publish_endorsement_created(rabbitmq: &RabbitMQClient, endorsement: &Endorsement) {
    let event = Event::new(
        "harambee-community",
        routing_keys::COMMUNITY_ENDORSEMENT_CREATED,
        payloads::EndorsementCreated {
            endorsement_id: endorsement.id,
            endorser_id: endorsement.endorser_id,
            endorsed_id: endorsement.endorsed_id,
            endorsement_type: endorsement.endorsement_type.clone(),
        },
    )
    .with_user(endorsement.endorser_id);

    rabbitmq.publish_logged(event).await;
}

pub async fn publish_quiz_passed(rabbitmq: &RabbitMQClient, attempt: &QuizAttempt) {
    let event = Event::new(
        "harambee-community",
        routing_keys::COMMUNITY_QUIZ_PASSED,
        payloads::QuizPassed {
            profile_id: attempt.profile_id,
            attempt_id: attempt.id,
            percentage: attempt.percentage,
        },
    )
    .with_user(attempt.profile_id);

    rabbitmq.publish_logged(event).await;
}
