//! Class loaders: turning names into class descriptors.
//!
//! The core consumes loaders through the [`ClassLoader`] trait. A loader resolves an
//! internal name (`com/acme/Dog`, `[I`, `[Lcom/acme/Dog;`) to a descriptor it owns or
//! delegates to, and locates resources by path. Descriptors come back unlinked; the Link
//! Gate uses the same loader to resolve the types their members refer to.
//!
//! [`MemoryLoader`] is an in-memory implementation with parent-first delegation, fed
//! with [`ClassDefinition`](crate::metadata::typesystem::ClassDefinition)s and resource
//! bytes.

mod memory;

use std::{io::Cursor, sync::Arc};

pub use memory::MemoryLoader;

use crate::{metadata::names::to_internal_name, metadata::typesystem::ClassRc, Result};

/// Resolves names to class descriptors and paths to resources
pub trait ClassLoader: Send + Sync {
    /// Name of this loader, for diagnostics
    fn name(&self) -> &str;

    /// Resolve a class by internal name.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if neither this loader nor a loader it
    /// delegates to knows the class.
    fn resolve(&self, internal_name: &str) -> Result<ClassRc>;

    /// Find a resource by path (`com/acme/bark.wav`). A leading `/` is ignored.
    fn get_resource(&self, path: &str) -> Option<Resource>;

    /// Resolve a class by display name (`com.acme.Dog`, `[Lcom.acme.Dog;`).
    ///
    /// # Errors
    /// Same as [`ClassLoader::resolve`].
    fn load_class(&self, name: &str) -> Result<ClassRc> {
        self.resolve(&to_internal_name(name))
    }
}

/// The bytes of one resource
#[derive(Debug, Clone)]
pub struct Resource {
    path: String,
    data: Arc<[u8]>,
}

impl Resource {
    /// Create a resource
    pub fn new(path: &str, data: Arc<[u8]>) -> Self {
        Resource {
            path: path.to_string(),
            data,
        }
    }

    /// Path the resource was found under
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The resource bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// A reader over the resource bytes
    #[must_use]
    pub fn open(&self) -> Cursor<Arc<[u8]>> {
        Cursor::new(self.data.clone())
    }
}
