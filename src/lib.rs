// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # classscope
//!
//! Runtime type metadata and reflection for a managed, class-based object runtime.
//!
//! Every loaded type (class, interface, array or primitive) is represented by a
//! [`Class`](metadata::typesystem::Class) descriptor. `classscope` answers the questions a
//! reflection layer asks about those descriptors: names in their various forms, fields,
//! methods and constructors, implemented interfaces, subtype relations and annotations.
//! It also drives the lazy linking of raw class metadata and the one-time static
//! initialization protocol that a multi-threaded runtime requires.
//!
//! ## Features
//!
//! - **Lazy linking** - Member tables are materialized from raw definitions on first use
//! - **Name codec** - Internal (`java/util/Map$Entry`), display, canonical and simple names
//! - **First-match member lookup** - Fields, methods and constructors, inheritance aware
//! - **Assignability** - One subtype check for classes, interfaces, arrays and primitives
//! - **Thread-safe initialization** - Static setup runs at most once, failures are sticky
//! - **Annotations** - Materialized once per entry, with element defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use classscope::prelude::*;
//!
//! let loader = MemoryLoader::system();
//! loader.add_definition(
//!     ClassBuilder::new("com/acme/Animal")
//!         .extends("java/lang/Object")
//!         .public()
//!         .field("name", "Ljava/lang/String;", Modifiers::PUBLIC)
//!         .build(),
//! );
//! loader.add_definition(
//!     ClassBuilder::new("com/acme/Dog")
//!         .extends("com/acme/Animal")
//!         .public()
//!         .build(),
//! );
//!
//! let dog = loader.load_class("com.acme.Dog")?;
//! let animal = dog.superclass().unwrap();
//!
//! assert!(animal.is_assignable_from(&dog));
//! assert_eq!(dog.get_field("name")?.declaring_class().unwrap().name(), "com.acme.Animal");
//! # Ok::<(), classscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - Descriptors, names, members, linking, initialization and annotations
//! - [`loader`] - The [`ClassLoader`](loader::ClassLoader) collaborator and an in-memory
//!   implementation
//! - [`runtime`] - The [`Runtime`](runtime::Runtime) entry point and the hooks an embedder
//!   provides
//! - [`config`] - Definition and linking options
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! `classscope` emits [`tracing`] events when classes are defined, linked and initialized
//! and when annotations are materialized. No subscriber is installed by the library.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use classscope::prelude::*;
///
/// let loader = MemoryLoader::system();
/// let object = loader.resolve("java/lang/Object")?;
/// assert!(object.is_root());
/// # Ok::<(), classscope::Error>(())
/// ```
pub mod prelude;

/// Runtime configuration
pub mod config;

/// Class loaders and resources
pub mod loader;

/// Class descriptors and the reflection queries answered against them
///
/// # Key Components
///
/// - [`metadata::typesystem`] - [`Class`](metadata::typesystem::Class), primitives, the
///   registry and assignability
/// - [`metadata::members`] - Field, method and constructor lookup
/// - [`metadata::link`] - The Link Gate
/// - [`metadata::init`] - Static initialization
/// - [`metadata::annotations`] - Annotation materialization
/// - [`metadata::names`] - Name codec
pub mod metadata;

/// Reflection entry point and embedder hooks
pub mod runtime;

/// `classscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `classscope` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use classscope::{Error, loader::{ClassLoader, MemoryLoader}};
///
/// let loader = MemoryLoader::system();
/// match loader.resolve("com/acme/Missing") {
///     Err(Error::TypeNotFound(name)) => assert_eq!(name, "com/acme/Missing"),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub use error::{Error, MemberKind};
