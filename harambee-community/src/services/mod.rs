pub mod endorsement_service;
pub mod event_service;
pub mod quiz_service;
