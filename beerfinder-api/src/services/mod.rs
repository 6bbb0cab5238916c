pub mod auth_service;
pub mod chat_service;
pub mod geo;
pub mod matching_service;
pub mod profile_service;
pub mod token_service;
