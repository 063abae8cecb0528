pub mod ranking;
pub mod selector;
pub mod upload_service;
pub mod vote_service;
