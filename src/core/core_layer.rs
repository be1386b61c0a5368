// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "guild/active_guild.rs"]
pub mod guild;

#[path = "embed/mod.rs"]
pub mod embed;

#[path = "welcome/mod.rs"]
pub mod welcome;

#[path = "navigation/active_path.rs"]
pub mod navigation;
