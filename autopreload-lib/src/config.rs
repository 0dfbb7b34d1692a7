//! User configuration: selectors, images and stylesheet files to add or ignore.

use crate::error::Result;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One or more configuration entries, so every `add_*`/`ignore_*` call takes a
/// single string or a list alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entries(Vec<String>);

impl Entries {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Entries {
    fn from(entry: &str) -> Self {
        Entries(vec![entry.to_string()])
    }
}

impl From<String> for Entries {
    fn from(entry: String) -> Self {
        Entries(vec![entry])
    }
}

impl From<&String> for Entries {
    fn from(entry: &String) -> Self {
        Entries(vec![entry.clone()])
    }
}

impl<S: Into<String>> From<Vec<S>> for Entries {
    fn from(entries: Vec<S>) -> Self {
        Entries(entries.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String> + Clone> From<&[S]> for Entries {
    fn from(entries: &[S]) -> Self {
        Entries(entries.iter().cloned().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Entries {
    fn from(entries: [S; N]) -> Self {
        Entries(entries.into_iter().map(Into::into).collect())
    }
}

/// An `add`/`ignore` pair of ordered sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserList {
    pub add: IndexSet<String>,
    pub ignore: IndexSet<String>,
}

impl UserList {
    pub fn add(&mut self, entries: impl Into<Entries>) {
        insert_all(&mut self.add, entries.into());
    }

    pub fn ignore(&mut self, entries: impl Into<Entries>) {
        insert_all(&mut self.ignore, entries.into());
    }

    pub fn is_added(&self, entry: &str) -> bool {
        self.add.contains(entry)
    }

    pub fn is_ignored(&self, entry: &str) -> bool {
        self.ignore.contains(entry)
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.ignore.is_empty()
    }

    pub fn clear(&mut self) {
        self.add.clear();
        self.ignore.clear();
    }
}

/// Stylesheets skipped as a whole, keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileList {
    pub ignore: IndexSet<String>,
}

impl FileList {
    pub fn ignore(&mut self, entries: impl Into<Entries>) {
        insert_all(&mut self.ignore, entries.into());
    }

    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.ignore.contains(file_name)
    }
}

/// How a rule's declarations are searched for image URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyLookup {
    /// Read `background-image` and take every `url(...)` token in it.
    #[default]
    Direct,
    /// Scan every declared property for a value shaped like `url(...)`.
    Enumerate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    pub selectors: UserList,
    pub images: UserList,
    pub files: FileList,
    pub lookup: PropertyLookup,
    /// Loader threads. `None` lets rayon pick.
    pub threads: Option<usize>,
}

impl PreloadConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&contents)?;
        log::info!("Loaded preload config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// True when no user selector, image or file entry is configured.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty() && self.images.is_empty() && self.files.ignore.is_empty()
    }

    /// Drops every user entry. `lookup` and `threads` describe the environment and stay.
    pub fn clear(&mut self) {
        self.selectors.clear();
        self.images.clear();
        self.files.ignore.clear();
    }
}

fn insert_all(set: &mut IndexSet<String>, entries: Entries) {
    for entry in entries.into_vec() {
        set.insert(entry);
    }
}
