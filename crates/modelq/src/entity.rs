//! Entity identity used to resolve backends.

use std::borrow::Cow;
use std::fmt;

/// A data model that queries can be built against.
///
/// The name is the registry key for the model's backend. It is compared
/// case-insensitively.
///
/// # Example
/// ```ignore
/// use modelq::Entity;
///
/// struct Widget;
///
/// impl Entity for Widget {
///     fn entity_name() -> &'static str {
///         "Widget"
///     }
/// }
/// ```
pub trait Entity {
    /// The model name.
    fn entity_name() -> &'static str;
}

/// Canonical identity of an entity: its lowercase name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityDescriptor {
    name: Cow<'static, str>,
}

impl EntityDescriptor {
    /// Descriptor for an [`Entity`] type.
    pub fn of<E: Entity + ?Sized>() -> Self {
        Self::named(E::entity_name())
    }

    /// Descriptor for a model name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        let canonical = canonical_name(&name);
        let name = if canonical == name {
            name
        } else {
            Cow::Owned(canonical)
        };
        Self { name }
    }

    /// The canonical (lowercase) name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Canonicalize a model name the same way [`EntityDescriptor`] does.
pub(crate) fn canonical_name(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    impl Entity for Widget {
        fn entity_name() -> &'static str {
            "Widget"
        }
    }

    #[test]
    fn test_descriptor_is_lowercase() {
        assert_eq!(EntityDescriptor::of::<Widget>().name(), "widget");
    }

    #[test]
    fn test_descriptor_is_case_insensitive() {
        assert_eq!(
            EntityDescriptor::named("WIDGET"),
            EntityDescriptor::named("widget")
        );
        assert_eq!(EntityDescriptor::named("wIdGeT"), EntityDescriptor::of::<Widget>());
    }

    #[test]
    fn test_canonical_name_matches_descriptor() {
        assert_eq!(canonical_name("OrderLine"), EntityDescriptor::named("OrderLine").name());
    }

    #[test]
    fn test_titlecase_letters_are_lowered() {
        // U+01C5 is titlecase, not uppercase, but still has a lowercase form.
        let titlecase = EntityDescriptor::named("\u{01C5}ab");
        assert_eq!(titlecase.name(), "\u{01C6}ab");
        assert_eq!(titlecase, EntityDescriptor::named("\u{01C4}ab"));
        assert_eq!(canonical_name("\u{01C5}ab"), titlecase.name());
    }
}
