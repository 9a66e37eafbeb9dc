//! Runtime configuration
//!
//! This module provides the options that shape how loaders define and link classes.

/// Configuration for class definition and linking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Internal name of the root of the class hierarchy; superclass of every array
    pub root_class: String,

    /// Link classes as soon as they are defined instead of on first structural access.
    /// Requests made while a link is already running on the thread stay lazy.
    pub link_on_define: bool,

    /// Maximum number of array dimensions (default: 255)
    pub max_array_dimensions: u8,

    /// Maximum depth of nested class definitions, i.e. the longest superclass chain a
    /// single resolution may have to define (default: 256)
    pub max_definition_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            root_class: "java/lang/Object".to_string(),
            link_on_define: false,
            max_array_dimensions: u8::MAX,
            max_definition_depth: 256,
        }
    }
}

impl RuntimeConfig {
    /// Creates a configuration that links every class when it is defined
    ///
    /// Surfaces malformed metadata at definition time, at the cost of resolving every
    /// referenced class eagerly.
    #[must_use]
    pub fn eager() -> Self {
        Self {
            link_on_define: true,
            ..Self::default()
        }
    }

    /// Use a different root class
    #[must_use]
    pub fn with_root_class(mut self, root_class: &str) -> Self {
        self.root_class = root_class.to_string();
        self
    }

    /// Enable or disable linking at definition time
    #[must_use]
    pub fn with_link_on_define(mut self, enabled: bool) -> Self {
        self.link_on_define = enabled;
        self
    }

    /// Limit the number of array dimensions
    #[must_use]
    pub fn with_max_array_dimensions(mut self, dimensions: u8) -> Self {
        self.max_array_dimensions = dimensions;
        self
    }

    /// Limit the depth of nested class definitions
    #[must_use]
    pub fn with_max_definition_depth(mut self, depth: usize) -> Self {
        self.max_definition_depth = depth;
        self
    }
}
