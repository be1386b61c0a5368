// The active guild is the Discord server every welcome call is scoped to.
// Instead of a hidden global, it is an explicit context object: whoever needs
// the guild id gets a clone, and all clones share the same cell.

use std::sync::{Arc, RwLock};

/// Shared, mutable handle to the currently selected guild id.
///
/// Cloning is cheap and every clone observes `set` immediately.
#[derive(Debug, Clone, Default)]
pub struct ActiveGuild {
    id: Arc<RwLock<String>>,
}

impl ActiveGuild {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Arc::new(RwLock::new(id.into())),
        }
    }

    /// Replace the current guild id. No validation is applied.
    pub fn set(&self, id: impl Into<String>) {
        let id = id.into();
        tracing::debug!(guild_id = %id, "Active guild changed");

        // A poisoned lock still holds a valid String, so keep using it.
        let mut guard = self.id.write().unwrap_or_else(|e| e.into_inner());
        *guard = id;
    }

    /// The guild id as of right now.
    pub fn get(&self) -> String {
        self.id.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_empty(&self) -> bool {
        self.id.read().unwrap_or_else(|e| e.into_inner()).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_the_new_id() {
        let guild = ActiveGuild::new("1");

        for id in ["123", "", "987654321098765432", "not-a-snowflake"] {
            guild.set(id);
            assert_eq!(guild.get(), id);
        }
    }

    #[test]
    fn clones_share_the_same_value() {
        let guild = ActiveGuild::new("111");
        let reader = guild.clone();

        guild.set("222");
        assert_eq!(reader.get(), "222");

        reader.set("333");
        assert_eq!(guild.get(), "333");
    }

    #[test]
    fn default_guild_is_empty() {
        let guild = ActiveGuild::default();
        assert!(guild.is_empty());

        guild.set("42");
        assert!(!guild.is_empty());
    }
}
