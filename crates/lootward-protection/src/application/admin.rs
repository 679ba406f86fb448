//! The administrative command surface: `reload` and a usage response.

use tracing::warn;

use super::engine::ProtectionEngine;
use crate::config::ConfigSource;

/// Permission required to reload configuration.
pub const ADMIN_PERMISSION: &str = "lootprotect.admin";

const RELOADED: &str = "✅ LootProtect configuration reloaded!";
const NO_PERMISSION: &str = "You don't have permission to use this command!";
const USAGE_HEADER: &str = "LootProtect Commands:";
const USAGE_RELOAD: &str = "/lootprotect reload - Reload configuration";

/// A parsed administrative command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// Re-read configuration.
    Reload,
    /// Anything unrecognized.
    Help,
}

impl AdminCommand {
    #[must_use]
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        match args.first() {
            Some(arg) if arg.as_ref().eq_ignore_ascii_case("reload") => Self::Reload,
            _ => Self::Help,
        }
    }

    /// Runs the command and returns the reply lines for the sender.
    /// `sender_is_admin` is the host's answer for [`ADMIN_PERMISSION`].
    pub fn execute(
        self,
        engine: &mut ProtectionEngine,
        source: &dyn ConfigSource,
        sender_is_admin: bool,
    ) -> Vec<String> {
        match self {
            Self::Reload if !sender_is_admin => vec![NO_PERMISSION.to_owned()],
            Self::Reload => match source.load() {
                Ok(config) => {
                    engine.reload(config);
                    vec![RELOADED.to_owned()]
                }
                Err(e) => {
                    warn!(error = %e, "configuration reload failed, keeping previous");
                    vec![format!("LootProtect configuration reload failed: {e}")]
                }
            },
            Self::Help => vec![USAGE_HEADER.to_owned(), USAGE_RELOAD.to_owned()],
        }
    }
}
