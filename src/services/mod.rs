pub mod completion_client;
pub mod extraction_service;
pub mod quiz_generator_service;
pub mod scoring_service;
