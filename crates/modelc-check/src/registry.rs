//! Names registered during one checker run

use std::collections::HashMap;

/// Outcome of registering a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// First occurrence
    New,

    /// Already registered by the given owner
    Taken(String),
}

/// Unique names seen so far in the run
///
/// A fresh registry is created for each run, so two runs over different
/// model sets never see each other's names.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    namespaces: HashMap<String, String>,
    classes: HashMap<String, String>,
    trigrams: HashMap<String, String>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace name declared in `file`
    pub fn register_namespace(&mut self, name: &str, file: &str) -> Registration {
        Self::register(&mut self.namespaces, name, file)
    }

    /// Register a class name declared in `file`
    pub fn register_class(&mut self, name: &str, file: &str) -> Registration {
        Self::register(&mut self.classes, name, file)
    }

    /// Register a trigram used by `class`
    pub fn register_trigram(&mut self, trigram: &str, class: &str) -> Registration {
        Self::register(&mut self.trigrams, trigram, class)
    }

    /// Number of registered classes
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    fn register(map: &mut HashMap<String, String>, key: &str, owner: &str) -> Registration {
        match map.get(key) {
            Some(existing) => Registration::Taken(existing.clone()),
            None => {
                map.insert(key.to_string(), owner.to_string());
                Registration::New
            }
        }
    }
}
