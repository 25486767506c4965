//! Mapped entities and their attribute bags

use crate::value::FromValue;
use crate::{Result, Value};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Ordered field-name to value mapping held by every entity.
///
/// Insertion order is preserved, so derived INSERT columns and UPDATE
/// assignments follow the order attributes were first written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    values: IndexMap<String, Value>,
}

/// A raw result row keyed by column name
pub type Row = Attributes;

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn into_map(self) -> IndexMap<String, Value> {
        self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Typed read; `None` when the attribute is missing or does not convert
    pub fn get_as<T: FromValue>(&self, name: &str) -> Option<T> {
        self.values.get(name).and_then(T::from_value)
    }

    /// The attribute value, with a missing attribute read as null
    pub fn value_of(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// True when the attribute exists and is not null
    pub fn has(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|value| !value.is_null())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All attributes except the named ones, in insertion order
    pub fn without(&self, excluded: &[&str]) -> Vec<(String, Value)> {
        self.values
            .iter()
            .filter(|(name, _)| !excluded.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Convert into any serde type, e.g. a plain struct mirroring the row
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        let json = serde_json::to_value(self)?;
        Ok(serde_json::from_value(json)?)
    }

    /// Build attributes from any serde type that serializes as a map
    pub fn from_serialize<T: Serialize>(data: &T) -> Result<Self> {
        let json = serde_json::to_value(data)?;
        Ok(serde_json::from_value(json)?)
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// A mapped entity: an attribute bag plus its table configuration.
///
/// Usually declared with [`entity!`](crate::entity).
pub trait Entity: Sized + Send + Sync {
    /// Explicit table name; derived from the type name when `None`
    const TABLE: Option<&'static str> = None;

    const PRIMARY_KEY: &'static str = "id";

    /// Attributes that must be present before a write
    const REQUIRED: &'static [&'static str] = &[];

    /// Attributes never written by INSERT or UPDATE
    const SAFE: &'static [&'static str] = &[];

    /// Stamp `updated_at` on update
    const TIMESTAMPS: bool = false;

    fn attributes(&self) -> &Attributes;

    fn attributes_mut(&mut self) -> &mut Attributes;

    fn from_attributes(attributes: Attributes) -> Self;

    /// Full type path used to derive the default table name
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.attributes().get(name)
    }

    fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.attributes_mut().set(name, value);
        self
    }

    fn has(&self, name: &str) -> bool {
        self.attributes().has(name)
    }

    fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes_mut().remove(name)
    }
}

/// Declare a mapped entity with typed getters for its fields.
///
/// Configuration keys are optional but must appear in this order:
/// `table`, `primary_key`, `required`, `safe`, `timestamps`.
///
/// ```
/// use quarry_core::{entity, Entity};
///
/// entity! {
///     #[derive(Debug, Clone)]
///     pub struct Article {
///         table: "posts",
///         required: ["title"],
///         safe: ["created_at"],
///         timestamps: true,
///         fields { id: i64, title: String }
///     }
/// }
///
/// let mut article = Article::new();
/// article.set("title", "Hello");
/// assert_eq!(article.title(), Some("Hello".to_string()));
/// assert_eq!(article.id(), None);
/// assert_eq!(Article::TABLE, Some("posts"));
/// ```
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(table: $table:literal,)?
            $(primary_key: $pk:literal,)?
            $(required: [$($required:literal),* $(,)?],)?
            $(safe: [$($safe:literal),* $(,)?],)?
            $(timestamps: $timestamps:literal,)?
            fields { $($field:ident: $ty:ty),* $(,)? } $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            attributes: $crate::Attributes,
        }

        #[allow(dead_code)]
        impl $name {
            pub fn new() -> Self {
                Self {
                    attributes: $crate::Attributes::new(),
                }
            }

            $(
                pub fn $field(&self) -> Option<$ty> {
                    self.attributes.get_as::<$ty>(stringify!($field))
                }
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::Entity for $name {
            $(const TABLE: Option<&'static str> = Some($table);)?
            $(const PRIMARY_KEY: &'static str = $pk;)?
            $(const REQUIRED: &'static [&'static str] = &[$($required),*];)?
            $(const SAFE: &'static [&'static str] = &[$($safe),*];)?
            $(const TIMESTAMPS: bool = $timestamps;)?

            fn attributes(&self) -> &$crate::Attributes {
                &self.attributes
            }

            fn attributes_mut(&mut self) -> &mut $crate::Attributes {
                &mut self.attributes
            }

            fn from_attributes(attributes: $crate::Attributes) -> Self {
                Self { attributes }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::entity! {
        #[derive(Debug, Clone)]
        struct Account {
            primary_key: "account_id",
            required: ["owner"],
            fields { account_id: i64, owner: String, active: bool }
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct AccountRow {
        account_id: i64,
        owner: String,
    }

    #[test]
    fn test_attribute_bag_semantics() {
        let mut attrs = Attributes::new();
        attrs.set("name", "John").set("nickname", ());

        assert!(attrs.has("name"));
        assert!(!attrs.has("nickname"));
        assert!(!attrs.has("missing"));
        assert_eq!(attrs.value_of("missing"), Value::Null);

        assert_eq!(attrs.remove("name"), Some(Value::from("John")));
        assert!(attrs.get("name").is_none());
    }

    #[test]
    fn test_insertion_order_and_without() {
        let attrs: Attributes = [("id", Value::Int(1)), ("b", Value::from("x")), ("a", Value::Int(2))]
            .into_iter()
            .collect();

        let columns: Vec<String> = attrs.without(&["id"]).into_iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["b", "a"]);
    }

    #[test]
    fn test_macro_configuration_and_getters() {
        let mut account = Account::new();
        account.set("account_id", 3).set("owner", "ann").set("active", 1);

        assert_eq!(Account::PRIMARY_KEY, "account_id");
        assert_eq!(Account::REQUIRED, &["owner"]);
        assert!(Account::SAFE.is_empty());
        assert!(!Account::TIMESTAMPS);
        assert_eq!(Account::TABLE, None);

        assert_eq!(account.account_id(), Some(3));
        assert_eq!(account.owner(), Some("ann".to_string()));
        assert_eq!(account.active(), Some(true));
    }

    #[test]
    fn test_serde_bridge() {
        let account = Account::from_attributes(
            [("account_id", Value::Int(9)), ("owner", Value::from("bo"))]
                .into_iter()
                .collect(),
        );

        let row: AccountRow = account.attributes().deserialize_into().unwrap();
        assert_eq!(row, AccountRow { account_id: 9, owner: "bo".into() });

        let attrs = Attributes::from_serialize(&row).unwrap();
        assert_eq!(attrs.get("owner"), Some(&Value::from("bo")));
    }
}
