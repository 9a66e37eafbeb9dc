//! # classscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the classscope library. Import this module to get quick access to the essential
//! types for defining, loading and reflecting over classes.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all classscope operations
pub use crate::Error;

/// The result type used throughout classscope
pub use crate::Result;

/// Options for class definition and linking
pub use crate::config::RuntimeConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Reflection entry point and the hooks an embedder provides
pub use crate::runtime::{Natives, Object, ObjectRc, Runtime};

/// Class loaders and resources
pub use crate::loader::{ClassLoader, MemoryLoader, Resource};

// ================================================================================================
// Type System
// ================================================================================================

/// Class descriptors and references between them
pub use crate::metadata::typesystem::{Class, ClassRc, ClassRef, ClassRegistry, ClassState};

/// Raw, unlinked class metadata
pub use crate::metadata::typesystem::{AnnotationDefinition, ClassBuilder, ClassDefinition};

/// Modifier flags
pub use crate::metadata::typesystem::Modifiers;

/// Primitive types
pub use crate::metadata::typesystem::{primitive_class, PrimitiveKind};

// ================================================================================================
// Members
// ================================================================================================

/// Reflected fields, methods and constructors
pub use crate::metadata::members::{Constructor, Field, FieldRc, Method, MethodRc};

// ================================================================================================
// Annotations
// ================================================================================================

/// Materialized annotations and their values
pub use crate::metadata::annotations::{
    Annotation, AnnotationRc, AnnotationValue, Constant, DefaultProxyFactory, ElementValue,
    ProxyFactory,
};
