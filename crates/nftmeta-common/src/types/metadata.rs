//! Factory and token metadata documents

use super::resource::{DynamicResource, StaticResource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Locale every document is written in
pub const DEFAULT_LOCALE: &str = "en-US";

/// Serial number reserved for the collection's default token
pub const DEFAULT_SERIAL: &str = "default";

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

/// Kind of asset a document describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Collectible,
    Game,
}

impl std::str::FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "collectible" => Ok(AssetType::Collectible),
            "game" => Ok(AssetType::Game),
            other => Err(format!("unknown asset type '{}'", other)),
        }
    }
}

/// Advertising content of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub product: StaticResource,
    pub square: StaticResource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<StaticResource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<StaticResource>>,
}

/// Fields shared by factory and token documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub spec_version: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<AssetType>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default = "default_locale")]
    pub default_locale: String,

    pub media: Media,

    /// Free-form properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,

    /// Additional static content, by name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<BTreeMap<String, StaticResource>>,
}

/// URL shape used to address token documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TokenUriTemplate {
    #[serde(rename = "{serial_number}")]
    SerialNumber,
    #[default]
    #[serde(rename = "{hash}")]
    Hash,
}

impl TokenUriTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenUriTemplate::SerialNumber => "{serial_number}",
            TokenUriTemplate::Hash => "{hash}",
        }
    }
}

impl std::str::FromStr for TokenUriTemplate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "{serial_number}" => Ok(TokenUriTemplate::SerialNumber),
            "{hash}" => Ok(TokenUriTemplate::Hash),
            other => Err(format!(
                "unknown token uri template '{}', expected '{{serial_number}}' or '{{hash}}'",
                other
            )),
        }
    }
}

impl std::fmt::Display for TokenUriTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a factory attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "ISODateString")]
    IsoDateString,
}

impl std::str::FromStr for AttributeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "boolean" => Ok(AttributeType::Boolean),
            "number" => Ok(AttributeType::Number),
            "string" => Ok(AttributeType::String),
            "ISODateString" => Ok(AttributeType::IsoDateString),
            other => Err(format!("unknown attribute type '{}'", other)),
        }
    }
}

/// Factory-side description of one token attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    #[serde(rename = "type")]
    pub kind: AttributeType,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Concrete attribute value carried by a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl AttributeValue {
    /// Coerce raw text to the declared attribute type.
    ///
    /// Text that does not parse as the declared type is kept as text.
    pub fn coerce(raw: &str, kind: Option<AttributeType>) -> Self {
        match kind {
            Some(AttributeType::Boolean) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => AttributeValue::Bool(true),
                "false" => AttributeValue::Bool(false),
                _ => AttributeValue::Text(raw.to_string()),
            },
            Some(AttributeType::Number) => raw
                .trim()
                .parse::<serde_json::Number>()
                .map(AttributeValue::Number)
                .unwrap_or_else(|_| AttributeValue::Text(raw.to_string())),
            _ => AttributeValue::Text(raw.to_string()),
        }
    }
}

/// Token serial number, either textual or any JSON number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerialNumber {
    Number(serde_json::Number),
    Text(String),
}

impl SerialNumber {
    /// Whether this is the sentinel marking the default token
    pub fn is_default(&self) -> bool {
        matches!(self, SerialNumber::Text(s) if s == DEFAULT_SERIAL)
    }

    /// Whether the serial can name a file inside one directory: non-empty,
    /// no path separators, and neither `.` nor `..`
    pub fn is_path_segment(&self) -> bool {
        match self {
            SerialNumber::Number(_) => true,
            SerialNumber::Text(s) => {
                !s.is_empty() && !s.contains(['/', '\\']) && s != "." && s != ".."
            },
        }
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerialNumber::Number(n) => write!(f, "{}", n),
            SerialNumber::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SerialNumber {
    fn from(value: &str) -> Self {
        SerialNumber::Text(value.to_string())
    }
}

impl From<u64> for SerialNumber {
    fn from(value: u64) -> Self {
        SerialNumber::Number(value.into())
    }
}

/// Per-collection metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factory {
    #[serde(flatten)]
    pub metadata: Metadata,

    /// Transient: drives token addressing, never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri_template: Option<TokenUriTemplate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, AttributeSchema>>,
}

impl Factory {
    pub fn token_uri_template(&self) -> TokenUriTemplate {
        self.token_uri_template.unwrap_or_default()
    }

    /// Attribute type declared for `name`, if any
    pub fn attribute_type(&self, name: &str) -> Option<AttributeType> {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(name))
            .map(|schema| schema.kind)
    }

    /// JSON form written to disk, without transient fields
    pub fn persisted_json(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("tokenUriTemplate");
        }
        Ok(value)
    }
}

/// Per-item metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Transient: identifies the token inside a run, never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<SerialNumber>,

    #[serde(flatten)]
    pub metadata: Metadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, AttributeValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_attributes: Option<DynamicResource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_resources: Option<BTreeMap<String, DynamicResource>>,
}

impl Token {
    pub fn is_default(&self) -> bool {
        self.serial_number.as_ref().is_some_and(SerialNumber::is_default)
    }

    /// JSON form written to disk, without transient fields
    pub fn persisted_json(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("serialNumber");
        }
        Ok(value)
    }
}
