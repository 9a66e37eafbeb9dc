//! Per-loader class registry.
//!
//! This module provides the [`ClassRegistry`], a thread-safe arena that owns every class
//! descriptor defined by one loader for as long as the loader lives. All other links
//! between descriptors are weak [`ClassRef`](crate::metadata::typesystem::ClassRef)s.
//!
//! # Registry Architecture
//!
//! - **Name index**: Primary lookup by internal name (`SkipMap`, ordered, lock-free)
//! - **Definition order**: Append-only list of descriptors in the order they were
//!   defined (`boxcar::Vec`)
//!
//! # Thread Safety
//!
//! Insertion is first-writer-wins: when two threads define the same name concurrently,
//! both receive the descriptor that reached the index first, and only that one is
//! recorded in definition order.
//!
//! # Examples
//!
//! ```rust
//! use classscope::{loader::{ClassLoader, MemoryLoader}, metadata::typesystem::ClassBuilder};
//!
//! let loader = MemoryLoader::system();
//! loader.add_definition(ClassBuilder::new("com/acme/Dog").extends("java/lang/Object").build());
//! loader.resolve("com/acme/Dog")?;
//!
//! let registry = loader.registry();
//! assert!(registry.get("com/acme/Dog").is_some());
//! registry.link_all()?;
//! # Ok::<(), classscope::Error>(())
//! ```

use crossbeam_skiplist::SkipMap;
use rayon::prelude::*;

use crate::{
    metadata::typesystem::{Class, ClassDefinition, ClassRc, LoaderRef},
    Result,
};

/// Owns the class descriptors of one loader
pub struct ClassRegistry {
    /// Primary index by internal name
    classes: SkipMap<String, ClassRc>,
    /// Descriptors in definition order
    defined: boxcar::Vec<ClassRc>,
}

impl ClassRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        ClassRegistry {
            classes: SkipMap::new(),
            defined: boxcar::Vec::new(),
        }
    }

    /// Insert a freshly created descriptor, returning the one that owns its name
    fn insert(&self, class: ClassRc) -> ClassRc {
        let entry = self
            .classes
            .get_or_insert(class.internal_name().to_string(), class.clone());
        let winner = entry.value().clone();

        if ClassRc::ptr_eq(&winner, &class) {
            self.defined.push(class);
            tracing::debug!(class = %winner.name(), "defined class");
        } else {
            tracing::trace!(class = %winner.name(), "concurrent definition lost the race");
        }
        winner
    }

    /// Create and register an unlinked class from its raw definition
    pub fn define(
        &self,
        definition: ClassDefinition,
        super_class: Option<&ClassRc>,
        loader: LoaderRef,
    ) -> ClassRc {
        if let Some(existing) = self.get(&definition.name) {
            return existing;
        }
        self.insert(Class::from_definition(definition, super_class, loader))
    }

    /// Create and register an array class over `component`
    pub fn define_array(
        &self,
        name: &str,
        component: &ClassRc,
        super_class: Option<&ClassRc>,
        loader: Option<LoaderRef>,
    ) -> ClassRc {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        self.insert(Class::new_array(name, component, super_class, loader))
    }

    /// Look up a class by internal name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ClassRc> {
        self.classes.get(name).map(|entry| entry.value().clone())
    }

    /// Returns `true` if a class of this internal name is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of registered classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if nothing has been registered yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// All registered classes, in definition order
    #[must_use]
    pub fn all_classes(&self) -> Vec<ClassRc> {
        self.defined.iter().map(|(_, class)| class.clone()).collect()
    }

    /// Classes declared directly in a package, ordered by name
    ///
    /// ## Arguments
    /// * 'package' - Internal package name, `/` separated (`java/lang`)
    #[must_use]
    pub fn by_package(&self, package: &str) -> Vec<ClassRc> {
        let prefix = format!("{package}/");
        self.classes
            .range(prefix.clone()..)
            .take_while(|entry| entry.key().starts_with(&prefix))
            .filter(|entry| !entry.key()[prefix.len()..].contains('/'))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Link every registered class in parallel
    ///
    /// # Errors
    /// Returns the first linking failure encountered.
    pub fn link_all(&self) -> Result<()> {
        let classes = self.all_classes();
        tracing::debug!(count = classes.len(), "linking all classes");

        let results: Vec<Result<()>> = classes
            .par_iter()
            .map(|class| class.ensure_linked().map(|_| ()))
            .collect();

        for result in results {
            result?;
        }

        Ok(())
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
