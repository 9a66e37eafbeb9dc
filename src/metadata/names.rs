//! Name codec: transforms between internal, display, canonical and simple names.
//!
//! Class names are stored in their internal binary form: ASCII, `/` separated and NUL
//! terminated (`java/lang/String\0`). Everything a consumer sees is derived from that:
//!
//! | Form      | `java/util/Map$Entry`  | `[Ljava/lang/String;`  | `[I`     |
//! |-----------|------------------------|------------------------|----------|
//! | display   | `java.util.Map$Entry`  | `[Ljava.lang.String;`  | `[I`     |
//! | canonical | `java.util.Map.Entry`  | `java.lang.String[]`   | `int[]`  |
//! | simple    | `Entry`                | `String[]`             | `int[]`  |
//!
//! The module also parses the field and method descriptors (`I`, `Ljava/lang/Object;`,
//! `(ILjava/lang/String;)V`) that raw member metadata uses to name its types.

use crate::{metadata::typesystem::PrimitiveKind, Result};

/// Member name reserved for constructors
pub const CONSTRUCTOR_NAME: &str = "<init>";
/// Member name reserved for the static initializer
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";
/// Every reserved member name starts with this character
pub const RESERVED_PREFIX: char = '<';

/// Separator of package segments in internal names
pub const INTERNAL_SEPARATOR: u8 = b'/';
/// Separator between an outer and a nested class name
pub const NESTED_SEPARATOR: char = '$';

/// Returns `true` for names reserved for constructors and static initializers.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// Encodes an internal name as the NUL terminated byte string stored on a descriptor.
#[must_use]
pub fn encode_internal(name: &str) -> Box<[u8]> {
    let mut bytes = Vec::with_capacity(name.len() + 1);
    bytes.extend_from_slice(name.as_bytes());
    bytes.push(0);
    bytes.into_boxed_slice()
}

/// Returns the internal name bytes without their NUL terminator.
#[must_use]
pub fn trim_nul(raw: &[u8]) -> &[u8] {
    match raw.split_last() {
        Some((0, rest)) => rest,
        _ => raw,
    }
}

/// Decodes stored internal name bytes into the display form (`/` becomes `.`).
#[must_use]
pub fn display_name(raw: &[u8]) -> String {
    trim_nul(raw)
        .iter()
        .map(|&c| {
            if c == INTERNAL_SEPARATOR {
                '.'
            } else {
                char::from(c)
            }
        })
        .collect()
}

/// Converts a display name (`java.lang.String`) into its internal form (`java/lang/String`).
#[must_use]
pub fn to_internal_name(display: &str) -> String {
    display.replace('.', "/")
}

/// Canonical form of a non-array display name: nested separators become `.`.
#[must_use]
pub fn canonical_from_display(display: &str) -> String {
    display.replace(NESTED_SEPARATOR, ".")
}

/// The part of a canonical name after its last `.`, or the whole name.
#[must_use]
pub fn simple_name(canonical: &str) -> &str {
    match canonical.rfind('.') {
        Some(index) => &canonical[index + 1..],
        None => canonical,
    }
}

/// The part of a canonical name before its last `.`, if there is one.
#[must_use]
pub fn package_name(canonical: &str) -> Option<&str> {
    canonical.rfind('.').map(|index| &canonical[..index])
}

/// The package directory of an internal name (`java/lang/String` -> `java/lang`).
#[must_use]
pub fn package_directory(internal: &str) -> Option<&str> {
    internal.rfind('/').map(|index| &internal[..index])
}

/// A type named by a field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDescriptor<'a> {
    /// One of the nine primitive kinds (`V Z B C S I F J D`)
    Primitive(PrimitiveKind),
    /// A class or interface, by internal name (`java/lang/String`)
    Class(&'a str),
    /// An array type, by its full internal name (`[I`, `[[Ljava/lang/Object;`)
    Array(&'a str),
}

impl<'a> TypeDescriptor<'a> {
    /// The internal name a loader resolves this descriptor by.
    ///
    /// Primitives have no loader-visible name and return `None`.
    #[must_use]
    pub fn internal_name(&self) -> Option<&'a str> {
        match self {
            TypeDescriptor::Primitive(_) => None,
            TypeDescriptor::Class(name) | TypeDescriptor::Array(name) => Some(name),
        }
    }
}

/// Splits one field descriptor off the front of `input`.
fn split_descriptor(input: &str) -> Result<(TypeDescriptor<'_>, &str)> {
    let Some(&first) = input.as_bytes().first() else {
        return Err(malformed_error!("Empty type descriptor"));
    };

    if let Some(kind) = PrimitiveKind::from_descriptor(char::from(first)) {
        return Ok((TypeDescriptor::Primitive(kind), &input[1..]));
    }

    match first {
        b'L' => {
            let end = input
                .find(';')
                .ok_or_else(|| malformed_error!("Unterminated class descriptor - {}", input))?;
            if end == 1 {
                return Err(malformed_error!("Empty class name in descriptor - {}", input));
            }
            Ok((TypeDescriptor::Class(&input[1..end]), &input[end + 1..]))
        }
        b'[' => {
            let dims = input.bytes().take_while(|&c| c == b'[').count();
            let (element, rest) = split_descriptor(&input[dims..])?;
            if element == TypeDescriptor::Primitive(PrimitiveKind::Void) {
                return Err(malformed_error!("Array of void in descriptor - {}", input));
            }
            let consumed = input.len() - rest.len();
            Ok((TypeDescriptor::Array(&input[..consumed]), rest))
        }
        _ => Err(malformed_error!("Invalid type descriptor - {}", input)),
    }
}

/// Parses a complete field descriptor such as `I`, `Ljava/lang/String;` or `[[J`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the descriptor is empty, invalid or has
/// trailing characters.
pub fn parse_field_descriptor(descriptor: &str) -> Result<TypeDescriptor<'_>> {
    let (parsed, rest) = split_descriptor(descriptor)?;
    if !rest.is_empty() {
        return Err(malformed_error!(
            "Trailing characters in field descriptor - {}",
            descriptor
        ));
    }
    Ok(parsed)
}

/// Parses a method descriptor such as `(ILjava/lang/Object;)V` into its parameter and
/// return types.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the descriptor is not of the form `(params)ret`.
pub fn parse_method_descriptor(
    descriptor: &str,
) -> Result<(Vec<TypeDescriptor<'_>>, TypeDescriptor<'_>)> {
    let mut rest = descriptor
        .strip_prefix('(')
        .ok_or_else(|| malformed_error!("Method descriptor must start with '(' - {}", descriptor))?;

    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        let (param, after) = split_descriptor(rest)?;
        if param == TypeDescriptor::Primitive(PrimitiveKind::Void) {
            return Err(malformed_error!("void parameter in - {}", descriptor));
        }
        params.push(param);
        rest = after;
    }

    let returns = parse_field_descriptor(rest)?;
    Ok((params, returns))
}

/// Descriptor of the component of an internal array name (`[I` -> `I`), if it is one.
#[must_use]
pub fn array_component(array_name: &str) -> Option<&str> {
    array_name.strip_prefix('[').filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_replaces_separators_and_trims_nul() {
        let raw = encode_internal("java/util/Map$Entry");
        assert_eq!(raw.last(), Some(&0));
        assert_eq!(display_name(&raw), "java.util.Map$Entry");
        assert_eq!(display_name(b"Plain"), "Plain");
    }

    #[test]
    fn test_canonical_simple_and_package() {
        let canonical = canonical_from_display("java.util.Map$Entry");
        assert_eq!(canonical, "java.util.Map.Entry");
        assert_eq!(simple_name(&canonical), "Entry");
        assert_eq!(package_name(&canonical), Some("java.util.Map"));

        assert_eq!(simple_name("Toplevel"), "Toplevel");
        assert_eq!(package_name("Toplevel"), None);
    }

    #[test]
    fn test_internal_round_trip() {
        assert_eq!(to_internal_name("com.acme.Dog"), "com/acme/Dog");
        assert_eq!(
            display_name(&encode_internal(&to_internal_name("com.acme.Dog"))),
            "com.acme.Dog"
        );
        assert_eq!(package_directory("com/acme/Dog"), Some("com/acme"));
        assert_eq!(package_directory("Dog"), None);
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved(CONSTRUCTOR_NAME));
        assert!(is_reserved(STATIC_INITIALIZER_NAME));
        assert!(!is_reserved("init"));
    }

    #[test]
    fn test_parse_field_descriptors() {
        assert_eq!(
            parse_field_descriptor("I").unwrap(),
            TypeDescriptor::Primitive(PrimitiveKind::Int)
        );
        assert_eq!(
            parse_field_descriptor("Ljava/lang/String;").unwrap(),
            TypeDescriptor::Class("java/lang/String")
        );
        assert_eq!(
            parse_field_descriptor("[[Ljava/lang/Object;").unwrap(),
            TypeDescriptor::Array("[[Ljava/lang/Object;")
        );
        assert!(parse_field_descriptor("").is_err());
        assert!(parse_field_descriptor("Ljava/lang/String").is_err());
        assert!(parse_field_descriptor("II").is_err());
        assert!(parse_field_descriptor("[V").is_err());
        assert!(parse_field_descriptor("Q").is_err());
    }

    #[test]
    fn test_parse_method_descriptor() {
        let (params, ret) = parse_method_descriptor("(I[JLjava/lang/String;)V").unwrap();
        assert_eq!(
            params,
            vec![
                TypeDescriptor::Primitive(PrimitiveKind::Int),
                TypeDescriptor::Array("[J"),
                TypeDescriptor::Class("java/lang/String"),
            ]
        );
        assert_eq!(ret, TypeDescriptor::Primitive(PrimitiveKind::Void));

        let (params, ret) = parse_method_descriptor("()Ljava/lang/Object;").unwrap();
        assert!(params.is_empty());
        assert_eq!(ret, TypeDescriptor::Class("java/lang/Object"));

        assert!(parse_method_descriptor("I)V").is_err());
        assert!(parse_method_descriptor("(I").is_err());
        assert!(parse_method_descriptor("(V)V").is_err());
    }

    #[test]
    fn test_array_component() {
        assert_eq!(array_component("[I"), Some("I"));
        assert_eq!(array_component("[[Lx/Y;"), Some("[Lx/Y;"));
        assert_eq!(array_component("["), None);
        assert_eq!(array_component("java/lang/Object"), None);
    }
}
