use std::{fmt, sync::Arc};

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The category of a class member, used to tag [`Error::MemberNotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A field declared on a class
    Field,
    /// A method (neither constructor nor static initializer)
    Method,
    /// A constructor, stored under the reserved `<init>` name
    Constructor,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Field => f.write_str("field"),
            MemberKind::Method => f.write_str("method"),
            MemberKind::Constructor => f.write_str("constructor"),
        }
    }
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Resolution Errors
/// - [`Error::TypeNotFound`] - A loader could not produce a class for a name
/// - [`Error::MemberNotFound`] - A field, method or constructor lookup came up empty
/// - [`Error::Malformed`] - Raw class metadata could not be linked
/// - [`Error::LoaderDropped`] - The defining loader of an unlinked class is gone
/// - [`Error::RecursionLimit`] - Class definition recursed too deep (usually a circular hierarchy)
///
/// ## Type Relation Errors
/// - [`Error::ClassCast`] - A narrowing or cast failed the assignability check
///
/// ## Initialization Errors
/// - [`Error::Initialization`] - Static setup of a class failed (sticky, never retried)
/// - [`Error::Instantiation`] - A class cannot be instantiated
///
/// ## Other
/// - [`Error::UnsupportedOperation`] - Metadata category not modelled by this crate
/// - [`Error::Error`] - Free-form failure, typically raised by a native hook
///
/// # Examples
///
/// ```rust,no_run
/// use classscope::{Error, loader::{ClassLoader, MemoryLoader}};
///
/// let loader = MemoryLoader::system();
/// match loader.load_class("com.example.Missing") {
///     Err(Error::TypeNotFound(name)) => eprintln!("no such class: {}", name),
///     Err(e) => eprintln!("other error: {}", e),
///     Ok(class) => println!("loaded {}", class),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The raw metadata of a class is damaged and could not be linked.
    ///
    /// The error includes the source location where the malformation was detected
    /// for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// No loader in the delegation chain knows a class of this name.
    ///
    /// The associated value is the requested name, in internal (slash separated) form.
    #[error("Failed to find class - {0}")]
    TypeNotFound(String),

    /// A member lookup found nothing on the queried class (or its whole superclass chain).
    #[error("No such {kind} - {name}{signature}")]
    MemberNotFound {
        /// What kind of member was requested
        kind: MemberKind,
        /// The requested member name
        name: String,
        /// The requested parameter list, rendered as `(a, b)`; empty for fields
        signature: String,
    },

    /// The assignability relation does not hold for a narrowing or cast.
    #[error("{actual} cannot be cast to {target}")]
    ClassCast {
        /// Display name of the type that was required
        target: String,
        /// Display name of the type that was found
        actual: String,
    },

    /// Static setup of a class failed.
    ///
    /// The class is now erroneous; every later initialization attempt surfaces this
    /// error again with the very same `cause`.
    #[error("Initialization of {class} failed: {cause}")]
    Initialization {
        /// Display name of the erroneous class
        class: String,
        /// The original failure, shared between every caller that observes it
        cause: Arc<Error>,
    },

    /// The class cannot be instantiated (abstract, interface, primitive or array).
    #[error("Cannot instantiate {0}")]
    Instantiation(String),

    /// The requested metadata query is not modelled by this crate.
    #[error("Unsupported operation - {0}")]
    UnsupportedOperation(&'static str),

    /// The loader that defined a class has been dropped, so its unlinked members can no
    /// longer be resolved. Carries the display name of the class.
    #[error("Loader of {0} is no longer alive")]
    LoaderDropped(String),

    /// Recursion limit reached.
    ///
    /// The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Generic error for miscellaneous failures.
    ///
    /// Used by native hooks to report failures that don't fit into other categories.
    #[error("{0}")]
    Error(String),
}

impl Error {
    /// Builds a [`Error::MemberNotFound`] for the given member and parameter list.
    pub(crate) fn member_not_found(kind: MemberKind, name: &str, signature: String) -> Self {
        Error::MemberNotFound {
            kind,
            name: name.to_string(),
            signature,
        }
    }

    /// Returns the original cause if this is an initialization failure.
    #[must_use]
    pub fn initialization_cause(&self) -> Option<&Arc<Error>> {
        match self {
            Error::Initialization { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
