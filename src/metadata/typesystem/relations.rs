//! Assignability between class descriptors.
//!
//! [`Class::is_assignable_from`] is the single authoritative subtype check. Member
//! matching, instance checks, annotation gating and down-casts all go through it.
//!
//! Rules, for `target.is_assignable_from(candidate)`:
//! - every class is assignable to itself;
//! - primitives are assignable only to themselves;
//! - arrays are covariant: `A[]` accepts `B[]` when `A` accepts `B`;
//! - an interface accepts every class whose flattened interface table contains it;
//! - the root class accepts every reference type;
//! - any other class accepts the classes that have it in their superclass chain.

use std::{iter::successors, ptr, sync::Arc};

use crate::{
    metadata::typesystem::{Class, ClassRc},
    runtime::{Object, ObjectRc},
    Error, Result,
};

impl Class {
    /// Returns `true` if a value of type `candidate` can be used where `self` is expected.
    ///
    /// If linking `candidate` fails while consulting its interface table, the relation is
    /// reported as not holding.
    #[must_use]
    pub fn is_assignable_from(&self, candidate: &Class) -> bool {
        if ptr::eq(self, candidate) {
            return true;
        }
        if self.is_primitive() || candidate.is_primitive() {
            return false;
        }

        if self.is_array() {
            if !candidate.is_array() {
                return false;
            }
            return match (self.component_type(), candidate.component_type()) {
                (Some(target), Some(component)) => target.is_assignable_from(&component),
                _ => false,
            };
        }

        if self.is_interface() {
            return match candidate.ensure_linked() {
                Ok(tables) => tables.interfaces.iter().any(|entry| entry.interface.is(self)),
                Err(error) => {
                    tracing::warn!(
                        target = %self.name(),
                        candidate = %candidate.name(),
                        %error,
                        "cannot link candidate for assignability check"
                    );
                    false
                }
            };
        }

        if self.is_root() {
            return true;
        }

        successors(candidate.superclass(), |class| class.superclass())
            .any(|class| ptr::eq(Arc::as_ptr(&class), self))
    }

    /// Returns `true` if `value` is present and its runtime class is assignable to `self`
    #[must_use]
    pub fn is_instance(&self, value: Option<&dyn Object>) -> bool {
        value.is_some_and(|value| self.is_assignable_from(&value.class()))
    }

    /// Narrow `self` to a subclass of `target`.
    ///
    /// # Errors
    /// Returns [`Error::ClassCast`] if `self` is not assignable to `target`.
    pub fn as_subclass(&self, target: &Class) -> Result<ClassRc> {
        if target.is_assignable_from(self) {
            self.to_rc()
        } else {
            Err(Error::ClassCast {
                target: target.name().to_string(),
                actual: self.name().to_string(),
            })
        }
    }

    /// Check that `value` is an instance of `self`; an absent value always passes.
    ///
    /// # Errors
    /// Returns [`Error::ClassCast`] if the value's class is not assignable to `self`.
    pub fn cast(&self, value: Option<ObjectRc>) -> Result<Option<ObjectRc>> {
        match value {
            Some(object) if !self.is_instance(Some(object.as_ref())) => Err(Error::ClassCast {
                target: self.name().to_string(),
                actual: object.class().name().to_string(),
            }),
            other => Ok(other),
        }
    }
}
