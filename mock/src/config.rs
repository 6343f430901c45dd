//! Synthesis configuration.
//!
//! Defines the YAML-serializable settings of a build. Every field has a
//! default, so an empty file is a valid configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! channel: release
//! aliases:
//!   - action
//!   - menus
//! ```

use std::fmt;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use webext_schema_core::fold_key;

use crate::error::{MockError, Result};

/// Configuration format version written by [`MockConfig::default`].
pub const CONFIG_VERSION: &str = "1.0";

/// Namespaces whose canonical schema file differs from their runtime name.
pub const DEFAULT_ALIASES: [&str; 2] = ["action", "menus"];

/// Release channel a unified schema document was published for.
///
/// Schema trees are laid out as `<root>/<channel>/<file>`, where the file is
/// `mailext.json` for the mail client and `webext.json` otherwise.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use webext_schema_mock::Channel;
///
/// assert_eq!(Channel::default(), Channel::Beta);
/// assert_eq!(
///     Channel::Mail.schema_path("schemas"),
///     Path::new("schemas/mail/mailext.json")
/// );
/// assert_eq!("esr".parse::<Channel>().unwrap(), Channel::Esr);
/// assert!("nightly".parse::<Channel>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Beta releases.
    #[default]
    Beta,
    /// Nightly builds from mozilla-central.
    Central,
    /// Stable releases.
    Release,
    /// Extended support releases.
    Esr,
    /// The mail client.
    Mail,
}

impl Channel {
    /// Every channel, in declaration order.
    pub const ALL: [Channel; 5] = [
        Channel::Beta,
        Channel::Central,
        Channel::Release,
        Channel::Esr,
        Channel::Mail,
    ];

    /// Lowercase name, also the channel's directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beta => "beta",
            Self::Central => "central",
            Self::Release => "release",
            Self::Esr => "esr",
            Self::Mail => "mail",
        }
    }

    /// File name of the unified document for this channel.
    pub fn schema_file_name(&self) -> &'static str {
        match self {
            Self::Mail => "mailext.json",
            _ => "webext.json",
        }
    }

    /// Location of this channel's document under `root`.
    pub fn schema_path(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref()
            .join(self.as_str())
            .join(self.schema_file_name())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = MockError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| MockError::InvalidChannel(s.to_string()))
    }
}

/// Settings for [`NamespaceBuilder`](crate::NamespaceBuilder).
///
/// # Examples
///
/// ```
/// use webext_schema_mock::MockConfig;
///
/// let config = MockConfig::default();
/// assert!(config.is_alias("menus"));
/// assert!(!config.is_alias("tabs"));
///
/// let config: MockConfig = serde_yaml::from_str("aliases: [contextMenus]").unwrap();
/// assert!(config.is_alias("contextMenus"));
/// assert!(!config.is_alias("menus"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Release channel of the document the configuration targets.
    pub channel: Channel,
    /// Namespaces always included regardless of the file they appear in.
    pub aliases: Vec<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            channel: Channel::default(),
            aliases: DEFAULT_ALIASES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl MockConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::MockError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::MockError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::MockError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::MockError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` if `namespace` is on the alias allow-list.
    ///
    /// Comparison uses the folded form, so `contextMenus` matches an alias
    /// written as `context_menus`.
    pub fn is_alias(&self, namespace: &str) -> bool {
        let folded = fold_key(namespace);
        self.aliases.iter().any(|alias| fold_key(alias) == folded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: MockConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, MockConfig::default());
        assert_eq!(config.aliases, vec!["action", "menus"]);
    }

    #[test]
    fn test_deserialize_complete() {
        let config: MockConfig = serde_yaml::from_str(
            r#"
version: "2.0"
aliases:
  - pageAction
"#,
        )
        .unwrap();
        assert_eq!(config.version, "2.0");
        assert_eq!(config.channel, Channel::Beta);
        assert!(config.is_alias("page_action"));
        assert!(!config.is_alias("action"));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mock.yml");

        let original = MockConfig {
            version: "1.0".into(),
            channel: Channel::Mail,
            aliases: vec!["menus".into(), "sidebarAction".into()],
        };
        original.save(&path).unwrap();

        let loaded = MockConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_channel_from_yaml() {
        let config: MockConfig = serde_yaml::from_str("channel: mail").unwrap();
        assert_eq!(config.channel, Channel::Mail);
        assert_eq!(config.aliases, vec!["action", "menus"]);

        let err = serde_yaml::from_str::<MockConfig>("channel: nightly").unwrap_err();
        assert!(err.to_string().contains("nightly"));
    }

    #[test]
    fn test_channel_names_and_files() {
        for channel in Channel::ALL {
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
            assert_eq!(channel.to_string(), channel.as_str());
        }
        assert_eq!(Channel::Release.schema_file_name(), "webext.json");
        assert_eq!(Channel::Mail.schema_file_name(), "mailext.json");
        assert_eq!(
            Channel::Central.schema_path("/data/schemas"),
            Path::new("/data/schemas/central/webext.json")
        );

        let err = "Beta".parse::<Channel>().unwrap_err();
        assert!(matches!(err, MockError::InvalidChannel(ref name) if name == "Beta"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MockConfig::load("/nonexistent/mock.yml").unwrap_err();
        assert!(matches!(err, crate::MockError::IoError(_)));
    }
}
