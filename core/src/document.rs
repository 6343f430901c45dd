//! Parsed, read-only schema document with case- and separator-insensitive
//! lookup.
//!
//! A [`SchemaDocument`] maps source-file keys (e.g. `"browser_action.json"`)
//! to the namespace definitions the file declares. It is parsed once and
//! never mutated afterwards; builders borrow it.
//!
//! # Loading patterns
//!
//! ```no_run
//! use webext_schema_core::SchemaDocument;
//!
//! // Load the unified document produced by the schema acquisition tool
//! let doc = SchemaDocument::from_path("schemas/release/webext.json").unwrap();
//! assert!(doc.get("browserAction").is_some());
//! ```

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::NamespaceDefinition;
use crate::error::Result;

const FILE_SUFFIX: &str = ".json";

/// Folds a file key or namespace into its comparison form.
///
/// Strips a trailing `.json`, drops `_`, `-` and `.` separators and
/// lowercases the rest, so `"browser_action.json"`, `"browser-action"`,
/// `"browserAction"` and `"browser.action"` all fold to `"browseraction"`.
///
/// # Examples
///
/// ```
/// use webext_schema_core::fold_key;
///
/// assert_eq!(fold_key("browser_action.json"), "browseraction");
/// assert_eq!(fold_key("browserAction"), "browseraction");
/// assert_eq!(fold_key("devtools.inspectedWindow"), "devtoolsinspectedwindow");
/// ```
pub fn fold_key(name: &str) -> String {
    name.strip_suffix(FILE_SUFFIX)
        .unwrap_or(name)
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// In-memory schema document with lookup by file key.
///
/// Keys are kept in lexicographic order, so [`list`](Self::list) and
/// [`entries`](Self::entries) are deterministic.
///
/// # Examples
///
/// ```
/// use webext_schema_core::SchemaDocument;
///
/// let doc = SchemaDocument::parse(r#"{
///     "browser_action.json": [{ "namespace": "browserAction" }],
///     "alarms.json": [{ "namespace": "alarms" }]
/// }"#).unwrap();
///
/// assert_eq!(doc.list(), vec!["alarms.json", "browser_action.json"]);
/// assert!(doc.get("browser-action").is_some());
/// assert!(doc.get("foo").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument {
    files: BTreeMap<String, Vec<NamespaceDefinition>>,
}

impl SchemaDocument {
    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`](crate::SchemaError::Parse) if the text
    /// is not well-formed JSON, or
    /// [`SchemaError::Malformed`](crate::SchemaError::Malformed) if it does
    /// not have the shape of a schema document.
    pub fn parse(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parses a document from a reader.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Self::parse), plus
    /// [`SchemaError::IoError`](crate::SchemaError::IoError) on read failure.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads a document from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::IoError`](crate::SchemaError::IoError) if the
    /// file cannot be opened, otherwise the same errors as
    /// [`parse`](Self::parse).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Assembles a document from already-parsed per-file fragments.
    ///
    /// A later fragment with the same key replaces an earlier one.
    ///
    /// # Examples
    ///
    /// ```
    /// use webext_schema_core::{NamespaceDefinition, SchemaDocument};
    ///
    /// let doc = SchemaDocument::from_fragments([
    ///     ("menus.json", vec![NamespaceDefinition::new("menus")]),
    ///     ("tabs.json", vec![NamespaceDefinition::new("tabs")]),
    /// ]);
    /// assert_eq!(doc.len(), 2);
    /// ```
    pub fn from_fragments<K, I>(fragments: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Vec<NamespaceDefinition>)>,
    {
        Self {
            files: fragments
                .into_iter()
                .map(|(key, defs)| (key.into(), defs))
                .collect(),
        }
    }

    /// Looks up the definitions of a file by API or file name.
    ///
    /// The comparison ignores case, `_`/`-` separators and a `.json` suffix
    /// (see [`fold_key`]). Returns the first matching entry in key order.
    pub fn get(&self, name: &str) -> Option<&[NamespaceDefinition]> {
        let label = fold_key(name);
        self.files
            .iter()
            .find(|(key, _)| fold_key(key) == label)
            .map(|(_, defs)| defs.as_slice())
    }

    /// Returns all file keys in lexicographic order.
    pub fn list(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Returns an iterator over `(file key, definitions)` pairs in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[NamespaceDefinition])> {
        self.files
            .iter()
            .map(|(key, defs)| (key.as_str(), defs.as_slice()))
    }

    /// Returns the number of files in the document.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the document declares no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
