pub mod profile_service;
