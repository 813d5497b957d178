//! Caller-supplied conversions that override the default structural mapping.
//!
//! A converter is registered on a [`Deserializer`](crate::Deserializer) for one
//! exact target type. Lookup is by exact type only: a converter for `Hobby` is
//! not consulted for `Box<Hobby>` or `Option<Hobby>` themselves, only for the
//! `Hobby` they wrap.

use std::collections::HashMap;
use std::fmt;

use crate::deserializer::Structure;
use crate::error::BoxError;
use crate::from_value::FromValue;
use crate::value::Object;

/// Builds a target value from string text and the tags written in front of it.
///
/// The converter fully owns the result; no further processing happens.
pub trait StringConverter {
    type Output: 'static;

    fn convert(&self, tags: &[String], text: &str) -> Result<Self::Output, BoxError>;
}

/// Selects and constructs the concrete instance for an object value.
///
/// After [`create_instance`](Self::create_instance) returns, the engine still
/// runs structural field fill on the instance with the object's properties.
pub trait ObjectConverter {
    type Target: Structure;

    fn can_convert(&self, tags: &[String], object: &Object) -> bool;

    fn create_instance(&self, tags: &[String]) -> Result<Self::Target, BoxError>;
}

/// Supplies a collection for an array value and appends converted items to it.
pub trait ArrayConverter {
    type Collection: 'static;
    /// Every array item is converted to this type before [`add_value`](Self::add_value).
    type Element: FromValue;

    fn create_instance(&self) -> Self::Collection;

    fn add_value(&self, collection: &mut Self::Collection, value: Self::Element);
}

/// Tag-driven selection of one variant of a closed sum type.
///
/// ```
/// use omcl::{structure, Deserializer, Fields, Structure, TagRegistry};
///
/// #[derive(Debug, Default)]
/// struct Circle { radius: f64 }
/// #[derive(Debug, Default)]
/// struct Square { side: f64 }
/// structure!(Circle { radius });
/// structure!(Square { side });
///
/// #[derive(Debug)]
/// enum Shape { Circle(Circle), Square(Square) }
///
/// impl Structure for Shape {
///     fn fill(&mut self, fields: &mut Fields<'_>) -> omcl::Result<()> {
///         match self {
///             Shape::Circle(c) => c.fill(fields),
///             Shape::Square(s) => s.fill(fields),
///         }
///     }
/// }
///
/// let mut de = Deserializer::new();
/// de.register_object_converter(
///     TagRegistry::<Shape>::new()
///         .with("Circle", || Shape::Circle(Circle::default()))
///         .with("Square", || Shape::Square(Square::default())),
/// );
/// let value = omcl::parse_item_str("!Square { side = 2.5 }").unwrap();
/// let shape: Shape = de.convert_object(&value).unwrap();
/// assert!(matches!(shape, Shape::Square(Square { side }) if side == 2.5));
/// ```
pub struct TagRegistry<T> {
    factories: HashMap<String, fn() -> T>,
}

impl<T> TagRegistry<T> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn with(mut self, tag: impl Into<String>, factory: fn() -> T) -> Self {
        self.insert(tag, factory);
        self
    }

    /// Register `factory` for `tag`, replacing any earlier one.
    pub fn insert(&mut self, tag: impl Into<String>, factory: fn() -> T) {
        self.factories.insert(tag.into(), factory);
    }

    /// First tag, in written order, that has a factory.
    fn select(&self, tags: &[String]) -> Option<fn() -> T> {
        tags.iter().find_map(|t| self.factories.get(t).copied())
    }
}

impl<T> Default for TagRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TagRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.factories.keys().collect();
        tags.sort();
        f.debug_struct("TagRegistry").field("tags", &tags).finish()
    }
}

impl<T: Structure> ObjectConverter for TagRegistry<T> {
    type Target = T;

    fn can_convert(&self, tags: &[String], _object: &Object) -> bool {
        self.select(tags).is_some()
    }

    fn create_instance(&self, tags: &[String]) -> Result<T, BoxError> {
        match self.select(tags) {
            Some(factory) => Ok(factory()),
            None => Err(format!("no factory registered for tags {tags:?}").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_known_tag_wins() {
        let registry: TagRegistry<&'static str> = TagRegistry::new()
            .with("a", || "made a")
            .with("b", || "made b");
        let tags = vec!["x".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(registry.select(&tags).map(|f| f()), Some("made b"));
        assert!(registry.select(&["x".to_string()]).is_none());
    }

    #[test]
    fn later_insert_replaces() {
        let mut registry: TagRegistry<u8> = TagRegistry::new().with("n", || 1);
        registry.insert("n", || 2);
        assert_eq!(registry.select(&["n".to_string()]).map(|f| f()), Some(2));
    }
}
