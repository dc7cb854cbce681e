//! Property descriptor model
//!
//! Supported kinds:
//! - string: UTF-8 text with optional length bounds and pattern
//! - number: any JSON number with optional inclusive bounds
//! - boolean
//! - object: nested property mapping
//! - array: homogeneous sequence with an element descriptor and item-count bounds
//!
//! Descriptors are plain data. Structural checks run once, when a [`Schema`]
//! is built, and a built schema cannot be mutated.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};

use super::compiler;
use super::config::SchemaConfig;
use super::errors::{SchemaError, SchemaResult};
use super::normalizer::{self, Mode};
use super::path;
use super::structure;
use super::uniques;
use crate::observability::{log_event_with_fields, Event, Fields};

/// Ordered mapping of property name to descriptor
pub type Properties = IndexMap<String, Property>;

/// Untyped document being validated
pub type Document = Map<String, Value>;

/// Compiled text pattern for string properties
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern. Fails with a structural error on invalid syntax.
    pub fn new(source: &str) -> SchemaResult<Self> {
        Regex::new(source)
            .map(Pattern)
            .map_err(|e| SchemaError::structure("", format!("invalid pattern: {}", e)))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern(regex)
    }
}

/// Kind-specific part of a descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// UTF-8 string
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<Pattern>,
    },
    /// Integer or floating point number
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    /// Boolean
    Boolean,
    /// Nested object with its own property mapping
    Object { schema: Properties },
    /// Homogeneous array
    Array {
        /// Element descriptor (boxed to allow recursive types)
        element: Box<Property>,
        /// Minimum item count
        minimum: Option<usize>,
        /// Maximum item count
        maximum: Option<usize>,
    },
}

impl PropertyKind {
    /// Returns the type name used in messages and compiled output
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyKind::String { .. } => "string",
            PropertyKind::Number { .. } => "number",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Object { .. } => "object",
            PropertyKind::Array { .. } => "array",
        }
    }
}

/// Declarative definition of one property's type and constraints.
///
/// Built with the kind constructors and chained setters:
///
/// ```
/// use docschema::Property;
///
/// let username = Property::string().required().unique().min_length(3).max_length(20);
/// assert!(username.required);
/// ```
///
/// A kind-specific setter applied to the wrong kind (say `min_items` on a
/// string) is remembered and reported as a structural error when the
/// enclosing [`Schema`] is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub kind: PropertyKind,
    pub required: bool,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<Value>,
    misuse: Option<String>,
}

impl Property {
    fn of(kind: PropertyKind) -> Self {
        Self {
            kind,
            required: false,
            nullable: false,
            unique: false,
            default: None,
            misuse: None,
        }
    }

    /// Create a string property
    pub fn string() -> Self {
        Self::of(PropertyKind::String {
            min_length: None,
            max_length: None,
            pattern: None,
        })
    }

    /// Create a number property
    pub fn number() -> Self {
        Self::of(PropertyKind::Number {
            minimum: None,
            maximum: None,
        })
    }

    /// Create a boolean property
    pub fn boolean() -> Self {
        Self::of(PropertyKind::Boolean)
    }

    /// Create an object property from its nested properties
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Property)>,
        K: Into<String>,
    {
        let (schema, duplicate) = collect_properties(properties);
        let mut prop = Self::of(PropertyKind::Object { schema });
        if let Some(name) = duplicate {
            prop.misuse = Some(format!("declares '{}' more than once", name));
        }
        prop
    }

    /// Create an array property with the given element descriptor
    pub fn array(element: Property) -> Self {
        Self::of(PropertyKind::Array {
            element: Box::new(element),
            minimum: None,
            maximum: None,
        })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Value substituted when the property is absent or null
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Minimum string length (inclusive)
    pub fn min_length(mut self, n: usize) -> Self {
        match &mut self.kind {
            PropertyKind::String { min_length, .. } => *min_length = Some(n),
            _ => self.misapplied("min_length"),
        }
        self
    }

    /// Maximum string length (inclusive)
    pub fn max_length(mut self, n: usize) -> Self {
        match &mut self.kind {
            PropertyKind::String { max_length, .. } => *max_length = Some(n),
            _ => self.misapplied("max_length"),
        }
        self
    }

    /// Pattern a string value must match
    pub fn pattern(mut self, p: Pattern) -> Self {
        match &mut self.kind {
            PropertyKind::String { pattern, .. } => *pattern = Some(p),
            _ => self.misapplied("pattern"),
        }
        self
    }

    /// Inclusive lower bound of a number
    pub fn minimum(mut self, n: f64) -> Self {
        match &mut self.kind {
            PropertyKind::Number { minimum, .. } => *minimum = Some(n),
            _ => self.misapplied("minimum"),
        }
        self
    }

    /// Inclusive upper bound of a number
    pub fn maximum(mut self, n: f64) -> Self {
        match &mut self.kind {
            PropertyKind::Number { maximum, .. } => *maximum = Some(n),
            _ => self.misapplied("maximum"),
        }
        self
    }

    /// Inclusive lower bound on array item count
    pub fn min_items(mut self, n: usize) -> Self {
        match &mut self.kind {
            PropertyKind::Array { minimum, .. } => *minimum = Some(n),
            _ => self.misapplied("min_items"),
        }
        self
    }

    /// Inclusive upper bound on array item count
    pub fn max_items(mut self, n: usize) -> Self {
        match &mut self.kind {
            PropertyKind::Array { maximum, .. } => *maximum = Some(n),
            _ => self.misapplied("max_items"),
        }
        self
    }

    fn misapplied(&mut self, setter: &str) {
        if self.misuse.is_none() {
            self.misuse = Some(format!(
                "{} does not apply to a {} property",
                setter,
                self.kind.type_name()
            ));
        }
    }

    /// Declaration defect recorded by the builder, if any
    pub(crate) fn misuse(&self) -> Option<&str> {
        self.misuse.as_deref()
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Collects properties in order, remembering the first duplicated name.
fn collect_properties<I, K>(properties: I) -> (Properties, Option<String>)
where
    I: IntoIterator<Item = (K, Property)>,
    K: Into<String>,
{
    let mut map = Properties::new();
    let mut duplicate = None;
    for (name, prop) in properties {
        let name = name.into();
        if map.contains_key(&name) {
            if duplicate.is_none() {
                duplicate = Some(name);
            }
            continue;
        }
        map.insert(name, prop);
    }
    (map, duplicate)
}

/// Immutable, structurally checked descriptor tree.
#[derive(Debug, Clone)]
pub struct Schema {
    properties: Properties,
    config: SchemaConfig,
}

impl Schema {
    /// Build a schema with the default configuration.
    pub fn new<I, K>(properties: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = (K, Property)>,
        K: Into<String>,
    {
        Self::with_config(properties, SchemaConfig::default())
    }

    /// Build a schema, enforcing every structural invariant.
    pub fn with_config<I, K>(properties: I, config: SchemaConfig) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = (K, Property)>,
        K: Into<String>,
    {
        let (mut properties, duplicate) = collect_properties(properties);
        let checked = match duplicate {
            Some(name) => Err(SchemaError::structure(name, "is declared more than once")),
            None => config
                .validate()
                .and_then(|()| structure::validate_structure(&mut properties, &config)),
        };

        if let Err(e) = checked {
            log_event_with_fields(
                Event::SchemaRejected,
                Fields::new().path(e.path()).reason(e.reason()),
            );
            return Err(e);
        }

        log_event_with_fields(Event::SchemaBuilt, Fields::new().count(properties.len()));
        Ok(Self { properties, config })
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Look up a root property
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// See [`normalizer::normalize`]
    pub fn normalize(&self, document: &Value, mode: Mode) -> SchemaResult<Document> {
        normalizer::normalize(self, document, mode)
    }

    /// See [`path::resolve_leaf`]
    pub fn resolve_leaf(&self, dotted_path: &str, value: &Value) -> SchemaResult<Option<Value>> {
        path::resolve_leaf(self, dotted_path, value)
    }

    /// See [`path::normalize_update`]
    pub fn normalize_update(&self, update: &Value) -> SchemaResult<Document> {
        path::normalize_update(self, update)
    }

    /// See [`compiler::compile`]
    pub fn json_schema(&self) -> Value {
        compiler::compile(self)
    }

    /// See [`compiler::compile_to_string`]
    pub fn json_schema_string(&self) -> String {
        compiler::compile_to_string(self)
    }

    /// See [`uniques::list_unique_keys`]
    pub fn unique_keys(&self) -> Vec<String> {
        uniques::list_unique_keys(self)
    }
}
