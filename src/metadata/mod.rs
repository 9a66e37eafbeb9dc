//! Class metadata and reflection.
//!
//! This module contains the runtime representation of loaded types and every query the
//! reflection layer answers against it.
//!
//! # Key Components
//!
//! - [`typesystem`] - Class descriptors, primitives, the per-loader registry and
//!   assignability
//! - [`names`] - Name codec (internal, display, canonical and simple names) and
//!   descriptor parsing
//! - [`members`] - Fields, methods, constructors and their first-match lookup
//! - [`link`] - Lazy materialization of member tables from raw definitions
//! - [`init`] - One-time static initialization
//! - [`annotations`] - Annotation values, entries and proxies
//!
//! # Examples
//!
//! ```rust
//! use classscope::prelude::*;
//!
//! let loader = MemoryLoader::system();
//! let object = loader.resolve("java/lang/Object")?;
//!
//! let equals = object.get_method("equals", &[object.clone()])?;
//! assert_eq!(equals.to_string(), "boolean java.lang.Object.equals(java.lang.Object)");
//! assert!(object.get_methods()?.iter().all(|method| !method.is_reserved()));
//! # Ok::<(), classscope::Error>(())
//! ```

/// Annotation values, entries and proxies
pub mod annotations;
/// One-time static initialization of classes
pub mod init;
/// Lazy linking of raw class definitions
pub mod link;
/// Fields, methods and constructors
pub mod members;
/// Name codec and descriptor parsing
pub mod names;
/// Class descriptors and their relations
pub mod typesystem;
