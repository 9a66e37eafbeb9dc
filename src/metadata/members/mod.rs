//! Fields, methods and constructors, and their lookup on [`Class`].
//!
//! Members are materialized by the Link Gate and kept in declaration order. Lookup is a
//! linear scan with a first-match rule:
//!
//! - **Fields** match by exact name; [`Class::get_field`] walks the superclass chain,
//!   interfaces are not consulted.
//! - **Methods** match by name, arity and, per position, a stored parameter type that is
//!   assignable from the requested one. The first match in declaration order wins, not
//!   the most specific one.
//! - **Constructors** are the `<init>` methods of exactly one class.
//!   [`Class::get_constructor`] returns the first match, while
//!   [`Class::get_declared_constructor`] returns the last.
//!
//! Reserved names (starting with `<`) are never found by the method lookups and never
//! listed by the method enumerations.
//!
//! [`Class`]: crate::metadata::typesystem::Class
//! [`Class::get_field`]: crate::metadata::typesystem::Class::get_field
//! [`Class::get_constructor`]: crate::metadata::typesystem::Class::get_constructor
//! [`Class::get_declared_constructor`]: crate::metadata::typesystem::Class::get_declared_constructor

mod field;
mod method;
mod resolver;

pub use field::{Field, FieldRc};
pub use method::{Constructor, Method, MethodRc};
