//! Engine configuration, loaded from YAML.
//!
//! Every key is optional; missing keys take the defaults below. Templates
//! substitute `%time%` and `%killer%` and leave colour codes untouched for
//! the host's chat formatter.

use std::path::PathBuf;

use lootward_core::error::DomainError;
use serde::Deserialize;
use tracing::info;

const DEFAULT_PROTECTION_SECONDS: u32 = 30;

const DEFAULT_LOOT_PROTECTED: &str =
    "&e🗡 Loot Protected! You have &c%time% &eseconds to collect the loot.";
const DEFAULT_CANNOT_LOOT: &str = "&cOnly &e%killer% &ccan loot this for &a%time% &cmore seconds!";
const DEFAULT_MAIN_TEXT: &str =
    "&6&l🗡 Loot Protected &7(&c%time%s remaining&7) &7Killer: &a%killer%";
const DEFAULT_ITEM_TEXT: &str = "&c⛔ &7Item Protected &c%time%s";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ProtectionConfig {
    /// How long a drop stays protected, in seconds.
    pub protection_time: u32,
    /// Chat message templates.
    pub messages: MessageTemplates,
    /// Marker text templates.
    pub hologram: HologramTemplates,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            protection_time: DEFAULT_PROTECTION_SECONDS,
            messages: MessageTemplates::default(),
            hologram: HologramTemplates::default(),
        }
    }
}

impl ProtectionConfig {
    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if the document is not valid
    /// YAML or a key has the wrong type.
    pub fn from_yaml_str(raw: &str) -> Result<Self, DomainError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|e| DomainError::Configuration(e.to_string()))
    }

    /// Protection window as a duration.
    #[must_use]
    pub fn protection_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.protection_time))
    }
}

/// Templates for messages sent to claimants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MessageTemplates {
    /// Sent to the owner when protection is created.
    pub loot_protected: String,
    /// Sent to a claimant whose claim is denied.
    pub cannot_loot: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            loot_protected: DEFAULT_LOOT_PROTECTED.to_owned(),
            cannot_loot: DEFAULT_CANNOT_LOOT.to_owned(),
        }
    }
}

/// Templates for countdown marker labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HologramTemplates {
    /// Label floating above the trigger location.
    pub main_text: String,
    /// Label floating above each protected object.
    pub item_text: String,
}

impl Default for HologramTemplates {
    fn default() -> Self {
        Self {
            main_text: DEFAULT_MAIN_TEXT.to_owned(),
            item_text: DEFAULT_ITEM_TEXT.to_owned(),
        }
    }
}

/// Fills `%time%` and `%killer%` placeholders.
#[must_use]
pub fn render_template(template: &str, seconds: i64, killer: &str) -> String {
    template
        .replace("%time%", &seconds.to_string())
        .replace("%killer%", killer)
}

/// Where configuration is (re)read from.
pub trait ConfigSource: Send {
    /// Reads the current configuration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if the configuration cannot be
    /// read or parsed.
    fn load(&self) -> Result<ProtectionConfig, DomainError>;
}

/// Reads configuration from a YAML file. A missing file yields defaults.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<ProtectionConfig, DomainError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => ProtectionConfig::from_yaml_str(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "config file not found, using defaults");
                Ok(ProtectionConfig::default())
            }
            Err(e) => Err(DomainError::Configuration(format!(
                "reading {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// Configuration held in memory as a YAML document, for hosts that fetch
/// configuration themselves.
#[derive(Debug, Clone, Default)]
pub struct YamlConfigSource {
    document: String,
}

impl YamlConfigSource {
    #[must_use]
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }

    /// Replaces the document returned by the next `load`.
    pub fn set_document(&mut self, document: impl Into<String>) {
        self.document = document.into();
    }
}

impl ConfigSource for YamlConfigSource {
    fn load(&self) -> Result<ProtectionConfig, DomainError> {
        ProtectionConfig::from_yaml_str(&self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = ProtectionConfig::from_yaml_str("").unwrap();

        assert_eq!(config, ProtectionConfig::default());
        assert_eq!(config.protection_time, 30);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        // Arrange
        let raw = "protection-time: 45\nmessages:\n  cannot-loot: \"Hands off, %killer%!\"\n";

        // Act
        let config = ProtectionConfig::from_yaml_str(raw).unwrap();

        // Assert
        assert_eq!(config.protection_time, 45);
        assert_eq!(config.messages.cannot_loot, "Hands off, %killer%!");
        assert_eq!(config.messages.loot_protected, DEFAULT_LOOT_PROTECTED);
        assert_eq!(config.hologram, HologramTemplates::default());
    }

    #[test]
    fn test_hologram_keys_are_kebab_case() {
        let raw = "hologram:\n  main-text: \"main %time%\"\n  item-text: \"item %time%\"\n";

        let config = ProtectionConfig::from_yaml_str(raw).unwrap();

        assert_eq!(config.hologram.main_text, "main %time%");
        assert_eq!(config.hologram.item_text, "item %time%");
    }

    #[test]
    fn test_wrong_type_is_a_configuration_error() {
        let result = ProtectionConfig::from_yaml_str("protection-time: forever\n");

        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[test]
    fn test_render_template_substitutes_every_placeholder() {
        let rendered = render_template("%killer% has %time%s (%time%)", 12, "Alex");

        assert_eq!(rendered, "Alex has 12s (12)");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let source = FileConfigSource::new("/nonexistent/lootward/config.yml");

        assert_eq!(source.load().unwrap(), ProtectionConfig::default());
    }
}
