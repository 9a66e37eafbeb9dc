//! Process-wide primitive class singletons.
//!
//! There is exactly one [`Class`] per [`PrimitiveKind`] in the whole process. They are
//! created together on first use and handed out by [`primitive_class`]; nothing else may
//! construct a primitive descriptor. Other code compares primitives by identity
//! (`Arc::ptr_eq`), e.g. when deciding assignability or deriving the component type of a
//! primitive array.

use std::{fmt, sync::OnceLock};

use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::metadata::typesystem::{Class, ClassRc};

/// The nine primitive kinds of the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PrimitiveKind {
    /// `void`, only valid as a return type
    Void,
    /// `boolean`
    Boolean,
    /// `byte`, 8-bit signed
    Byte,
    /// `char`, 16-bit unsigned
    Char,
    /// `short`, 16-bit signed
    Short,
    /// `int`, 32-bit signed
    Int,
    /// `float`, 32-bit IEEE 754
    Float,
    /// `long`, 64-bit signed
    Long,
    /// `double`, 64-bit IEEE 754
    Double,
}

impl PrimitiveKind {
    /// The fixed display name of this primitive
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Double => "double",
        }
    }

    /// The single-character descriptor of this primitive (`V Z B C S I F J D`)
    #[must_use]
    pub fn descriptor(&self) -> char {
        match self {
            PrimitiveKind::Void => 'V',
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Double => 'D',
        }
    }

    /// Maps a descriptor character back to its primitive kind
    #[must_use]
    pub fn from_descriptor(descriptor: char) -> Option<Self> {
        PrimitiveKind::iter().find(|kind| kind.descriptor() == descriptor)
    }

    /// Storage size in bytes of one value of this kind (0 for `void`)
    #[must_use]
    pub fn size(&self) -> u8 {
        match self {
            PrimitiveKind::Void => 0,
            PrimitiveKind::Boolean | PrimitiveKind::Byte => 1,
            PrimitiveKind::Char | PrimitiveKind::Short => 2,
            PrimitiveKind::Int | PrimitiveKind::Float => 4,
            PrimitiveKind::Long | PrimitiveKind::Double => 8,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static PRIMITIVES: OnceLock<[ClassRc; PrimitiveKind::COUNT]> = OnceLock::new();

fn primitives() -> &'static [ClassRc; PrimitiveKind::COUNT] {
    PRIMITIVES.get_or_init(|| {
        tracing::trace!("creating primitive class singletons");
        [
            Class::new_primitive(PrimitiveKind::Void),
            Class::new_primitive(PrimitiveKind::Boolean),
            Class::new_primitive(PrimitiveKind::Byte),
            Class::new_primitive(PrimitiveKind::Char),
            Class::new_primitive(PrimitiveKind::Short),
            Class::new_primitive(PrimitiveKind::Int),
            Class::new_primitive(PrimitiveKind::Float),
            Class::new_primitive(PrimitiveKind::Long),
            Class::new_primitive(PrimitiveKind::Double),
        ]
    })
}

/// Returns the one and only class descriptor of a primitive kind.
#[must_use]
pub fn primitive_class(kind: PrimitiveKind) -> ClassRc {
    primitives()[kind as usize].clone()
}

/// Identifies which primitive singleton `class` is, by identity.
///
/// Returns `None` for every descriptor that is not one of the singletons, including
/// descriptors that merely carry the primitive marker.
#[must_use]
pub fn primitive_kind_of(class: &Class) -> Option<PrimitiveKind> {
    PrimitiveKind::iter().find(|kind| std::ptr::eq(primitives()[*kind as usize].as_ref(), class))
}
