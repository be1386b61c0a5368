pub mod welcome_models;
pub mod welcome_service;

pub use welcome_models::{ApiErrorMessage, WelcomeModule, WelcomeUpdate};
pub use welcome_service::{
    ImageUpload, JoinMessageDraft, WelcomeApi, WelcomeError, WelcomeService,
};
