// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "http/http_client.rs"]
pub mod http;

#[path = "welcome/welcome_client.rs"]
pub mod welcome;

#[path = "config/app_config.rs"]
pub mod config;
