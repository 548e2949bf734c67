//! Typed view of the JSON Schema subset the prompter understands.
//!
//! A raw schema document is parsed once into a [`SchemaNode`] tree. The
//! prompter then dispatches on [`SchemaKind`] instead of re-inspecting
//! keys at every level, and a malformed document is rejected before the
//! first question is asked.

use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Keyword a union was declared with.
///
/// Both are prompted the same way: the operator picks exactly one branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionKeyword {
    OneOf,
    AnyOf,
}

impl UnionKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnionKeyword::OneOf => "oneOf",
            UnionKeyword::AnyOf => "anyOf",
        }
    }
}

/// A titled branch of a `oneOf`/`anyOf` union.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub title: String,
    pub schema: SchemaNode,
}

/// A named member of an object schema, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub required: bool,
    pub schema: SchemaNode,
}

impl Property {
    /// Label shown when prompting for this property: its title, else its name.
    pub fn label(&self) -> &str {
        self.schema.title.as_deref().unwrap_or(&self.name)
    }
}

/// What a schema node asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Const(Value),
    Enum(Vec<Value>),
    Union {
        keyword: UnionKeyword,
        variants: Vec<Variant>,
    },
    String,
    /// Covers both `number` and `integer`.
    Number,
    Boolean,
    Object(Vec<Property>),
    Array(Box<SchemaNode>),
}

/// A parsed schema node with its annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `None` when absent or `null`.
    pub default: Option<Value>,
}

impl SchemaNode {
    /// Parse a raw JSON Schema document.
    ///
    /// Dispatch is decided in priority order: `const`, `enum`, `oneOf`,
    /// `anyOf`, then `type`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` naming the first node that falls outside the
    /// supported subset.
    pub fn parse(schema: &Value) -> Result<Self, SchemaError> {
        parse_node(schema, "")
    }

    /// Kind name for log messages. Unions report the keyword they were
    /// declared with.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SchemaKind::Const(_) => "const",
            SchemaKind::Enum(_) => "enum",
            SchemaKind::Union { keyword, .. } => keyword.as_str(),
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Object(_) => "object",
            SchemaKind::Array(_) => "array",
        }
    }
}

// --- Internal implementation ---

fn parse_node(value: &Value, path: &str) -> Result<SchemaNode, SchemaError> {
    let Value::Object(map) = value else {
        return Err(SchemaError::NotAnObject {
            path: display_path(path),
            actual: json_type_name(value).to_string(),
        });
    };

    let kind = parse_kind(map, path)?;

    Ok(SchemaNode {
        kind,
        title: string_keyword(map, "title"),
        description: string_keyword(map, "description"),
        default: map.get("default").filter(|v| !v.is_null()).cloned(),
    })
}

fn parse_kind(map: &Map<String, Value>, path: &str) -> Result<SchemaKind, SchemaError> {
    if let Some(value) = map.get("const") {
        return Ok(SchemaKind::Const(value.clone()));
    }

    if let Some(value) = map.get("enum") {
        let values = array_keyword(value, "enum", path)?;
        return Ok(SchemaKind::Enum(values.clone()));
    }

    for keyword in [UnionKeyword::OneOf, UnionKeyword::AnyOf] {
        if let Some(value) = map.get(keyword.as_str()) {
            return parse_union(value, keyword, path);
        }
    }

    let Some(type_value) = map.get("type") else {
        return Err(SchemaError::MissingType {
            path: display_path(path),
        });
    };

    match type_value.as_str() {
        Some("string") => Ok(SchemaKind::String),
        Some("number") | Some("integer") => Ok(SchemaKind::Number),
        Some("boolean") => Ok(SchemaKind::Boolean),
        Some("object") => parse_object(map, path),
        Some("array") => {
            let Some(items) = map.get("items") else {
                return Err(SchemaError::MissingItems {
                    path: display_path(path),
                });
            };
            let items = parse_node(items, &format!("{}/items", path))?;
            Ok(SchemaKind::Array(Box::new(items)))
        }
        _ => Err(SchemaError::UnsupportedType {
            path: display_path(path),
            value: type_value.to_string(),
        }),
    }
}

fn parse_union(
    value: &Value,
    keyword: UnionKeyword,
    path: &str,
) -> Result<SchemaKind, SchemaError> {
    let union_path = format!("{}/{}", path, keyword.as_str());
    let entries = array_keyword(value, keyword.as_str(), path)?;

    let mut variants = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let entry_path = format!("{}/{}", union_path, index);
        let schema = parse_node(entry, &entry_path)?;
        let Some(title) = schema.title.clone() else {
            return Err(SchemaError::UntitledVariant {
                path: union_path,
                index,
            });
        };
        variants.push(Variant { title, schema });
    }

    Ok(SchemaKind::Union { keyword, variants })
}

fn parse_object(map: &Map<String, Value>, path: &str) -> Result<SchemaKind, SchemaError> {
    let Some(properties) = map.get("properties") else {
        return Err(SchemaError::MissingProperties {
            path: display_path(path),
        });
    };
    let Value::Object(properties) = properties else {
        return Err(SchemaError::InvalidKeyword {
            path: display_path(path),
            keyword: "properties".into(),
            expected: "object".into(),
            actual: json_type_name(properties).into(),
        });
    };

    let required: Vec<&str> = match map.get("required") {
        None => Vec::new(),
        Some(value) => array_keyword(value, "required", path)?
            .iter()
            .filter_map(|v| v.as_str())
            .collect(),
    };

    let mut fields = Vec::with_capacity(properties.len());
    for (name, sub_schema) in properties {
        let sub_path = format!("{}/properties/{}", path, escape_pointer(name));
        fields.push(Property {
            name: name.clone(),
            required: required.contains(&name.as_str()),
            schema: parse_node(sub_schema, &sub_path)?,
        });
    }

    Ok(SchemaKind::Object(fields))
}

fn array_keyword<'a>(
    value: &'a Value,
    keyword: &str,
    path: &str,
) -> Result<&'a Vec<Value>, SchemaError> {
    value.as_array().ok_or_else(|| SchemaError::InvalidKeyword {
        path: display_path(path),
        keyword: keyword.into(),
        expected: "array".into(),
        actual: json_type_name(value).into(),
    })
}

fn string_keyword(map: &Map<String, Value>, keyword: &str) -> Option<String> {
    map.get(keyword).and_then(|v| v.as_str()).map(str::to_string)
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
