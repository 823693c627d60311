//! # Data Codec
//!
//! Converts text documents between JSON, XML, CSV and YAML.
//!
//! ## Writing
//!
//! Input text is first stripped of a surrounding markdown code fence, then
//! parsed into a [`Parsed`] value for the target format. Anything that fails
//! to parse is kept as [`Parsed::Raw`] and written in a format-specific
//! fallback form:
//!
//! | Format | Parsed from | Fallback |
//! |--------|-------------|----------|
//! | json | JSON | raw text |
//! | xml | XML | `<data>` root holding the text |
//! | csv | JSON array | one single-cell row |
//! | yaml | JSON | raw text |
//!
//! ## Reading
//!
//! The format comes from the file extension. JSON, CSV and YAML are returned
//! as pretty JSON text, XML as indented XML, and any other extension as the
//! file content unchanged.

mod files;
mod table;
pub mod xml;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::text::strip_code_fence;

pub use files::{load_data, read_data, save_data, write_data};
pub use xml::{XmlElement, XmlError, XmlNode};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    #[error("Row {index} is not an object")]
    NonUniformRows { index: usize },

    #[error("Unknown data format '{0}': expected json, xml, csv or yaml")]
    UnknownFormat(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Structured data formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    #[default]
    Json,
    Xml,
    Csv,
    Yaml,
}

impl DataFormat {
    /// Extension used when writing files
    pub fn extension(self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Xml => "xml",
            DataFormat::Csv => "csv",
            DataFormat::Yaml => "yaml",
        }
    }

    /// Maps a file extension to a format; `None` means plain text
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "json" => Some(DataFormat::Json),
            "xml" => Some(DataFormat::Xml),
            "csv" => Some(DataFormat::Csv),
            "yaml" | "yml" => Some(DataFormat::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DataFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            "xml" => Ok(DataFormat::Xml),
            "csv" => Ok(DataFormat::Csv),
            "yaml" | "yml" => Ok(DataFormat::Yaml),
            _ => Err(CodecError::UnknownFormat(s.to_string())),
        }
    }
}

/// Outcome of trying to read text as a structured document
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Structured(T),
    Raw(String),
}

impl<T> Parsed<T> {
    fn from_result<E: fmt::Display>(result: Result<T, E>, text: &str, format: DataFormat) -> Self {
        match result {
            Ok(value) => Parsed::Structured(value),
            Err(e) => {
                tracing::debug!(%format, error = %e, "Input is not structured, keeping raw text");
                Parsed::Raw(text.to_string())
            }
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Parsed::Structured(_))
    }
}

fn parse_json(text: &str, format: DataFormat) -> Parsed<Value> {
    Parsed::from_result(serde_json::from_str::<Value>(text), text, format)
}

fn parse_json_array(text: &str) -> Parsed<Vec<Value>> {
    match parse_json(text, DataFormat::Csv) {
        Parsed::Structured(Value::Array(items)) => Parsed::Structured(items),
        _ => Parsed::Raw(text.to_string()),
    }
}

fn parse_xml(text: &str) -> Parsed<XmlElement> {
    Parsed::from_result(xml::parse(text), text, DataFormat::Xml)
}

/// Converts `text` into a document in `format`
pub fn encode(text: &str, format: DataFormat) -> Result<String, CodecError> {
    let text = strip_code_fence(text);

    match format {
        DataFormat::Json => match parse_json(&text, format) {
            Parsed::Structured(value) => Ok(serde_json::to_string_pretty(&value)?),
            Parsed::Raw(raw) => Ok(raw),
        },
        DataFormat::Xml => {
            let root = match parse_xml(&text) {
                Parsed::Structured(root) => root,
                Parsed::Raw(raw) => XmlElement::with_text("data", raw),
            };
            Ok(xml::render(&root, true)?)
        }
        DataFormat::Csv => table::encode(&parse_json_array(&text)),
        DataFormat::Yaml => match parse_json(&text, format) {
            Parsed::Structured(value) => Ok(serde_yaml::to_string(&value)?),
            Parsed::Raw(raw) => Ok(raw),
        },
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

/// Re-expresses file content according to its extension
pub fn decode(content: &str, extension: &str) -> Result<String, CodecError> {
    match DataFormat::from_extension(extension) {
        Some(DataFormat::Json) => {
            let value: Value = serde_json::from_str(content)?;
            Ok(serde_json::to_string_pretty(&value)?)
        }
        Some(DataFormat::Xml) => Ok(xml::render(&xml::parse(content)?, false)?),
        Some(DataFormat::Csv) => Ok(serde_json::to_string_pretty(&table::decode(content)?)?),
        Some(DataFormat::Yaml) => {
            let value: serde_yaml::Value = serde_yaml::from_str(content)?;
            Ok(serde_json::to_string_pretty(&yaml_to_json(value))?)
        }
        None => Ok(content.to_string()),
    }
}
