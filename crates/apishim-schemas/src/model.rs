//! Mapping configuration model
//!
//! One `MappingConfig` document describes one V2 endpoint: the V1 calls that
//! feed it, in execution order, and the field mappings that shape its
//! response. Field names follow the on-disk YAML layout exactly.
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Source name reserved for static (stubbed) field values
pub const STUB_SOURCE: &str = "stub";

/// HTTP verbs accepted for V2 endpoints and V1 calls
///
/// Parsed case-insensitively and always serialized upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Upper-case wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether inbound requests with this method may carry a JSON body
    pub fn accepts_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl Default for HttpMethod {
    fn default() -> Self {
        HttpMethod::Get
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(format!(
                "unsupported HTTP method '{}', expected one of GET, POST, PUT, DELETE, PATCH",
                s
            )),
        }
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter lives on a request
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    #[default]
    Query,
    Body,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamLocation::Path => write!(f, "path"),
            ParamLocation::Query => write!(f, "query"),
            ParamLocation::Body => write!(f, "body"),
        }
    }
}

/// Maps one V2 request parameter onto a V1 parameter
///
/// `location` records where the value came from on the V2 side. The group a
/// mapping is declared under decides where it is placed on the V1 side, so a
/// V2 path segment can become a V1 query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamMapping {
    pub v2_param: String,
    pub v1_param: String,
    #[serde(default)]
    pub location: ParamLocation,
}

/// A single V1 API call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V1ApiCall {
    /// Unique name; also the key of this call's response in the context
    pub name: String,
    /// Path template, `{param}` or `:param` placeholders
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<ParamLocation, Vec<ParamMapping>>>,
}

impl V1ApiCall {
    /// Parameter mappings declared under the given V1 group
    pub fn params_for(&self, location: ParamLocation) -> &[ParamMapping] {
        self.params
            .as_ref()
            .and_then(|groups| groups.get(&location))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a group is declared at all (even if empty)
    pub fn declares(&self, location: ParamLocation) -> bool {
        self.params
            .as_ref()
            .map_or(false, |groups| groups.contains_key(&location))
    }
}

/// How a stubbed field was classified by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StubType {
    Null,
    EmptyString,
    EmptyArray,
    ConfigurableDefault,
}

impl StubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StubType::Null => "null",
            StubType::EmptyString => "empty_string",
            StubType::EmptyArray => "empty_array",
            StubType::ConfigurableDefault => "configurable_default",
        }
    }
}

// Unknown stub types degrade to `configurable_default`.
impl From<String> for StubType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "null" => StubType::Null,
            "empty_string" => StubType::EmptyString,
            "empty_array" => StubType::EmptyArray,
            _ => StubType::ConfigurableDefault,
        }
    }
}

impl From<StubType> for String {
    fn from(stub_type: StubType) -> Self {
        stub_type.as_str().to_string()
    }
}

/// Maps one V2 output field to its V1 origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Dot path into the V2 response, e.g. `insured.name`
    pub v2_path: String,
    /// `stub` or the name of a V1 call
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v1_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub stub_value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stub_type: Option<StubType>,
    /// Reviewer workflow flag, ignored at runtime
    #[serde(default)]
    pub approved: bool,
    /// Reviewer workflow flag, ignored at runtime
    #[serde(default)]
    pub edited: bool,
}

impl FieldMapping {
    /// Whether this field is filled from a static value
    pub fn is_stub(&self) -> bool {
        self.source == STUB_SOURCE
    }

    /// The transform expression, if one is set and non-empty
    pub fn effective_transform(&self) -> Option<&str> {
        self.transform.as_deref().filter(|t| !t.is_empty())
    }

    /// The direct-copy path, if one is set and non-empty
    pub fn effective_v1_path(&self) -> Option<&str> {
        self.v1_path.as_deref().filter(|p| !p.is_empty())
    }
}

/// A V2 field with several candidate V1 origins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousMapping {
    pub v2_field: String,
    /// Candidates as `{v1_field, confidence}` objects
    pub proposals: Vec<Map<String, Value>>,
}

/// Generation metadata; informational only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub generated_at: DateTime<Utc>,
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiguous_mappings: Option<Vec<AmbiguousMapping>>,
    #[serde(default = "default_generator_version")]
    pub generator_version: String,
}

fn default_generator_version() -> String {
    "0.1.0".to_string()
}

/// Identity of the V2 endpoint a document implements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub v2_path: String,
    #[serde(default)]
    pub v2_method: HttpMethod,
}

/// Root configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default = "default_version")]
    pub version: String,
    pub endpoint: EndpointSpec,
    pub v1_calls: Vec<V1ApiCall>,
    pub field_mappings: Vec<FieldMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl MappingConfig {
    /// Look up a V1 call by name
    pub fn call(&self, name: &str) -> Option<&V1ApiCall> {
        self.v1_calls.iter().find(|call| call.name == name)
    }

    /// Names of all V1 calls in declaration order
    pub fn call_names(&self) -> Vec<&str> {
        self.v1_calls.iter().map(|call| call.name.as_str()).collect()
    }

    /// Number of field mappings marked approved by a reviewer
    pub fn approved_count(&self) -> usize {
        self.field_mappings.iter().filter(|m| m.approved).count()
    }

    /// Whether the generator flagged ambiguous mappings
    pub fn has_ambiguous(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.ambiguous_mappings.as_ref())
            .map_or(false, |list| !list.is_empty())
    }

    /// `(method, path)` pair this document serves
    pub fn route_key(&self) -> (HttpMethod, &str) {
        (self.endpoint.v2_method, self.endpoint.v2_path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        let method: HttpMethod = serde_json::from_value(json!("post")).unwrap();
        assert_eq!(method, HttpMethod::Post);
        assert_eq!(serde_json::to_value(method).unwrap(), json!("POST"));

        let err = serde_json::from_value::<HttpMethod>(json!("TRACE")).unwrap_err();
        assert!(err.to_string().contains("unsupported HTTP method"));
    }

    #[test]
    fn test_unknown_stub_type_degrades() {
        let stub: StubType = serde_json::from_value(json!("zero")).unwrap();
        assert_eq!(stub, StubType::ConfigurableDefault);

        let stub: StubType = serde_json::from_value(json!("empty_array")).unwrap();
        assert_eq!(stub, StubType::EmptyArray);
    }

    #[test]
    fn test_defaults_applied() {
        let config: MappingConfig = serde_json::from_value(json!({
            "endpoint": {"v2_path": "/api/v2/things"},
            "v1_calls": [{"name": "get_thing", "endpoint": "/api/v1/thing"}],
            "field_mappings": [{"v2_path": "id", "source": "get_thing", "v1_path": "id"}]
        }))
        .unwrap();

        assert_eq!(config.version, "1.0");
        assert_eq!(config.endpoint.v2_method, HttpMethod::Get);
        assert_eq!(config.v1_calls[0].method, HttpMethod::Get);
        assert!(!config.field_mappings[0].approved);
        assert!(config.field_mappings[0].stub_value.is_null());
    }

    #[test]
    fn test_param_groups_and_default_location() {
        let call: V1ApiCall = serde_json::from_value(json!({
            "name": "get_policy",
            "endpoint": "/api/v1/policy",
            "params": {
                "query": [
                    {"v2_param": "policyId", "v1_param": "policy_id", "location": "path"},
                    {"v2_param": "limit", "v1_param": "max"}
                ]
            }
        }))
        .unwrap();

        let query = call.params_for(ParamLocation::Query);
        assert_eq!(query.len(), 2);
        assert_eq!(query[0].location, ParamLocation::Path);
        assert_eq!(query[1].location, ParamLocation::Query);
        assert!(call.params_for(ParamLocation::Body).is_empty());
        assert!(!call.declares(ParamLocation::Body));
    }

    #[test]
    fn test_empty_transform_is_ignored() {
        let mapping = FieldMapping {
            v2_path: "a".to_string(),
            source: "call".to_string(),
            v1_path: Some("x".to_string()),
            transform: Some(String::new()),
            stub_value: Value::Null,
            stub_type: None,
            approved: false,
            edited: false,
        };
        assert_eq!(mapping.effective_transform(), None);
        assert_eq!(mapping.effective_v1_path(), Some("x"));
    }
}
