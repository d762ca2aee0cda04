//! SQL script resources and `${name}` token replacement.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{MigrationError, Result};

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([A-Za-z0-9_.\-]+)\}").unwrap());

/// Replaces `${name}` tokens whose name is present in `parameters`.
/// Unknown tokens are left in place and values are inserted verbatim.
pub fn replace_tokens(text: &str, parameters: &BTreeMap<String, String>) -> String {
    if parameters.is_empty() {
        return text.to_string();
    }
    TOKEN
        .replace_all(text, |caps: &Captures| match parameters.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// A named collection of SQL scripts.
pub trait ResourceProvider: Send + Sync + Debug {
    /// Where the scripts come from, reported when a lookup fails.
    fn location(&self) -> String;

    fn names(&self) -> Result<Vec<String>>;

    fn read(&self, name: &str) -> Result<String>;
}

/// Scripts compiled into the binary, typically with `include_str!`.
#[derive(Debug, Clone, Default)]
pub struct StaticResources {
    location: String,
    scripts: BTreeMap<String, String>,
}

impl StaticResources {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            scripts: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.scripts.insert(name.into(), text.into());
        self
    }
}

impl ResourceProvider for StaticResources {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn names(&self) -> Result<Vec<String>> {
        Ok(self.scripts.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> Result<String> {
        self.scripts
            .get(name)
            .cloned()
            .ok_or_else(|| MigrationError::ScriptNotFound {
                name: name.to_string(),
                searched: vec![self.location()],
            })
    }
}

/// `.sql` files under a directory, named by their path relative to it
/// with `/` separators.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collect(&self, dir: &Path, names: &mut Vec<String>) -> Result<()> {
        let io = |source| MigrationError::Io {
            path: dir.to_path_buf(),
            source,
        };
        for entry in fs::read_dir(dir).map_err(io)? {
            let path = entry.map_err(io)?.path();
            if path.is_dir() {
                self.collect(&path, names)?;
            } else if path.extension().is_some_and(|ext| ext == "sql") {
                if let Ok(relative) = path.strip_prefix(&self.root) {
                    let parts: Vec<String> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    names.push(parts.join("/"));
                }
            }
        }
        Ok(())
    }
}

impl ResourceProvider for DirectoryResources {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        self.collect(&self.root, &mut names)?;
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        fs::read_to_string(&path).map_err(|source| MigrationError::Io { path, source })
    }
}

/// Finds `name` across the providers and reads it.
///
/// Exact matches win; otherwise names ending in `.name` or `/name` match.
/// No match and several matches are both errors.
pub fn load(providers: &[Arc<dyn ResourceProvider>], name: &str) -> Result<String> {
    let mut exact = Vec::new();
    let mut suffix = Vec::new();
    let dotted = format!(".{}", name);
    let nested = format!("/{}", name);

    for provider in providers {
        for candidate in provider.names()? {
            if candidate == name {
                exact.push((provider, candidate));
            } else if candidate.ends_with(&dotted) || candidate.ends_with(&nested) {
                suffix.push((provider, candidate));
            }
        }
    }

    let matches = if exact.is_empty() { suffix } else { exact };
    match matches.as_slice() {
        [] => Err(MigrationError::ScriptNotFound {
            name: name.to_string(),
            searched: providers.iter().map(|p| p.location()).collect(),
        }),
        [(provider, candidate)] => provider.read(candidate),
        many => Err(MigrationError::AmbiguousScript {
            name: name.to_string(),
            candidates: many
                .iter()
                .map(|(provider, candidate)| format!("{}:{}", provider.location(), candidate))
                .collect(),
        }),
    }
}
