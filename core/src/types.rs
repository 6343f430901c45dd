//! Schema type definitions for API surface modeling.
//!
//! This module defines the data model of one release's schema document: the
//! namespace definitions grouped under each source file, and the members
//! (functions, events, properties, types) they declare. The types are
//! designed for deserialization with [`serde`] from the unified JSON document
//! and serialize back to the same shape.
//!
//! Fields of the raw schema that have no bearing on stub synthesis
//! (descriptions, parameters, manifest keys) are ignored on input.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Schema `type` value marking a callable member.
pub const FUNCTION_TYPE: &str = "function";

/// Schema `type` value marking an object member.
pub const OBJECT_TYPE: &str = "object";

/// Permissions declared by a namespace definition.
///
/// The raw schema accepts either a single permission string or a list.
///
/// # Examples
///
/// ```
/// use webext_schema_core::Permissions;
///
/// let one: Permissions = serde_json::from_str(r#""tabs""#).unwrap();
/// let many: Permissions = serde_json::from_str(r#"["tabs", "menus"]"#).unwrap();
/// assert_eq!(one.to_vec(), vec!["tabs"]);
/// assert_eq!(many.to_vec(), vec!["tabs", "menus"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Permissions {
    /// A single permission name.
    One(String),
    /// A list of permission names.
    Many(Vec<String>),
}

impl Permissions {
    /// Returns the permission names as a flat list.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(name) => vec![name.clone()],
            Self::Many(names) => names.clone(),
        }
    }
}

/// A function or event member.
///
/// Both lists share one shape: a `name`, a `type` (only `"function"` members
/// are synthesized) and an optional `unsupported` marker.
///
/// # Examples
///
/// ```
/// use webext_schema_core::FunctionMember;
///
/// let create = FunctionMember::function("create");
/// assert!(create.is_synthesizable());
///
/// let legacy = FunctionMember::function("legacy").unsupported();
/// assert!(!legacy.is_synthesizable());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionMember {
    /// Member name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Schema type (`"function"` for callables)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Not applicable to the current release
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unsupported: bool,
}

impl FunctionMember {
    /// Creates a function-typed member with the given name.
    pub fn function(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            kind: Some(FUNCTION_TYPE.to_string()),
            unsupported: false,
        }
    }

    /// Marks the member as unsupported.
    pub fn unsupported(mut self) -> Self {
        self.unsupported = true;
        self
    }

    /// Returns `true` if this member yields a stub: it is named,
    /// function-typed and not unsupported.
    pub fn is_synthesizable(&self) -> bool {
        !self.unsupported
            && self.name.as_deref().is_some_and(|n| !n.is_empty())
            && self.kind.as_deref() == Some(FUNCTION_TYPE)
    }
}

/// A property member, keyed by property name in its parent map.
///
/// `value` distinguishes an absent key from an explicit `null`: any present
/// `value`, falsy or not, is a literal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMember {
    /// Literal value, when the key is present
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    /// Schema type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Reference to another namespace or sibling member
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Nested properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, PropertyMember>>,
    /// Not applicable to the current release
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unsupported: bool,
}

/// A type member, keyed by `id`.
///
/// Carries everything a [`PropertyMember`] does plus an `$import` and its own
/// `events` and `functions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeMember {
    /// Type identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Namespace or type whose members are copied into this one
    #[serde(rename = "$import", default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
    /// Reference to another namespace or sibling member
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Literal value, when the key is present
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    /// Schema type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Events declared on the type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<FunctionMember>>,
    /// Functions declared on the type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionMember>>,
    /// Properties declared on the type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, PropertyMember>>,
    /// Not applicable to the current release
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unsupported: bool,
}

/// One namespace definition inside a schema file.
///
/// A file may carry several definitions, typically a primary namespace plus
/// private or nested ones (e.g. `menus` and `menus.internal`).
///
/// `namespace` is optional at the serde level so that a definition without it
/// can be reported as a schema defect by the consumer rather than rejected by
/// the parser with a less specific message.
///
/// # Examples
///
/// ```
/// use webext_schema_core::{FunctionMember, NamespaceDefinition};
///
/// let def = NamespaceDefinition::new("browserAction")
///     .with_function(FunctionMember::function("setTitle"))
///     .with_event(FunctionMember::function("onClicked"));
/// assert_eq!(def.namespace.as_deref(), Some("browserAction"));
/// assert_eq!(def.functions.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDefinition {
    /// Dotted namespace path (e.g. `devtools.inspectedWindow`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Permissions the namespace requires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    /// Namespace whose members are copied into this one
    #[serde(rename = "$import", default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
    /// Events
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<FunctionMember>,
    /// Functions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionMember>,
    /// Properties, keyed by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyMember>,
    /// Type definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeMember>,
}

impl NamespaceDefinition {
    /// Creates an empty definition for the given namespace.
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }
    }

    /// Adds a function.
    pub fn with_function(mut self, function: FunctionMember) -> Self {
        self.functions.push(function);
        self
    }

    /// Adds an event.
    pub fn with_event(mut self, event: FunctionMember) -> Self {
        self.events.push(event);
        self
    }

    /// Adds a property.
    pub fn with_property(mut self, name: &str, property: PropertyMember) -> Self {
        self.properties.insert(name.to_string(), property);
        self
    }

    /// Adds a type.
    pub fn with_type(mut self, member: TypeMember) -> Self {
        self.types.push(member);
        self
    }

    /// Returns the declared permissions, empty when none are declared.
    pub fn permission_names(&self) -> Vec<String> {
        self.permissions
            .as_ref()
            .map(Permissions::to_vec)
            .unwrap_or_default()
    }
}

/// Shape a member synthesizes to, decided once per member.
///
/// Priority is fixed: a literal `value` wins over a function type, which wins
/// over anything object-like (explicit object type, nested members, or a
/// `$ref`/`$import` placeholder); everything else is a primitive.
///
/// | present on the member                      | kind          |
/// |--------------------------------------------|---------------|
/// | `value`                                    | `Literal`     |
/// | `type: "function"`                         | `Function`    |
/// | `type: "object"` or nested members         | `Object`      |
/// | `$ref` / `$import` only                    | `Reference`   |
/// | anything else                              | `Primitive`   |
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberKind<'a> {
    /// Assign the literal verbatim.
    Literal(&'a Value),
    /// Assign a stub.
    Function,
    /// Ensure an object and recurse into nested members.
    Object,
    /// Ensure an empty object to be filled by reference resolution.
    Reference(&'a str),
    /// Assign `null`.
    Primitive,
}

impl MemberKind<'_> {
    /// Returns `true` for kinds that materialize an object container.
    pub fn is_object_like(&self) -> bool {
        matches!(self, Self::Object | Self::Reference(_))
    }
}

/// Common view over property and type members used for classification.
pub trait Member {
    /// Literal value, if the `value` key is present.
    fn literal(&self) -> Option<&Value>;
    /// Schema `type`, if any.
    fn kind_name(&self) -> Option<&str>;
    /// Deferred reference specifier, if any.
    fn reference(&self) -> Option<&str>;
    /// Whether the member declares nested members.
    fn has_nested(&self) -> bool;
    /// Whether the member is marked unsupported.
    fn is_unsupported(&self) -> bool;

    /// Classifies the member.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use webext_schema_core::{Member, MemberKind, PropertyMember};
    ///
    /// let prop: PropertyMember =
    ///     serde_json::from_value(json!({ "type": "function", "value": -1 })).unwrap();
    /// assert_eq!(prop.classify(), MemberKind::Literal(&json!(-1)));
    ///
    /// let prop: PropertyMember = serde_json::from_value(json!({ "$ref": "Foo" })).unwrap();
    /// assert_eq!(prop.classify(), MemberKind::Reference("Foo"));
    /// ```
    fn classify(&self) -> MemberKind<'_> {
        if let Some(value) = self.literal() {
            return MemberKind::Literal(value);
        }
        match self.kind_name() {
            Some(FUNCTION_TYPE) => MemberKind::Function,
            Some(OBJECT_TYPE) => MemberKind::Object,
            _ if self.has_nested() => MemberKind::Object,
            _ => match self.reference() {
                Some(specifier) => MemberKind::Reference(specifier),
                None => MemberKind::Primitive,
            },
        }
    }
}

impl Member for PropertyMember {
    fn literal(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn kind_name(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn has_nested(&self) -> bool {
        self.properties.is_some()
    }

    fn is_unsupported(&self) -> bool {
        self.unsupported
    }
}

impl Member for TypeMember {
    fn literal(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn kind_name(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    fn reference(&self) -> Option<&str> {
        self.import.as_deref().or(self.reference.as_deref())
    }

    fn has_nested(&self) -> bool {
        self.properties.is_some() || self.events.is_some() || self.functions.is_some()
    }

    fn is_unsupported(&self) -> bool {
        self.unsupported
    }
}

/// Keeps a present key as `Some`, including an explicit `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
