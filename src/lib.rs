pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod utils;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{
    completion_client::{CompletionClient, OpenAiClient},
    extraction_service::ExtractionService,
    quiz_generator_service::QuizGeneratorService,
};
use crate::session::SessionContext;
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct AppState {
    pub quiz_generator: QuizGeneratorService,
    pub extraction_service: ExtractionService,
    pub session: Arc<Mutex<SessionContext>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        let client = OpenAiClient::from_config(config, http_client);
        Ok(Self::with_client(Arc::new(client), config))
    }

    pub fn with_client(client: Arc<dyn CompletionClient>, config: &Config) -> Self {
        let quiz_generator = QuizGeneratorService::new(
            client,
            config.openai_model.clone(),
            config.generation_temperature,
        );

        Self {
            quiz_generator,
            extraction_service: ExtractionService::default(),
            session: Arc::new(Mutex::new(SessionContext::new())),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn session(&self) -> Result<MutexGuard<'_, SessionContext>> {
        self.session
            .lock()
            .map_err(|_| Error::Internal("session mutex poisoned".to_string()))
    }
}
