//! Per-call request construction
//!
//! The group a parameter mapping is declared under decides where its value
//! goes on the V1 request. The value is always read from the merged V2
//! parameter bag under `v2_param`; `location` is provenance only.

use crate::orchestrator::error::V1OrchestratorError;
use crate::types::V2Params;
use apishim_schemas::{ParamLocation, V1ApiCall};
use serde_json::{Map, Value};

/// Build the absolute URL for one call
///
/// Every path-group parameter must be present (non-null); both `{name}`
/// and `:name` placeholders are substituted.
pub fn build_v1_url(
    base_url: &str,
    call: &V1ApiCall,
    params: &V2Params,
) -> Result<String, V1OrchestratorError> {
    let mut path = call.endpoint.clone();

    for mapping in call.params_for(ParamLocation::Path) {
        let value = params
            .get(&mapping.v2_param)
            .filter(|v| !v.is_null())
            .ok_or_else(|| V1OrchestratorError::missing_path_param(&mapping.v2_param))?;
        let text = param_text(value);

        path = path.replace(&format!("{{{}}}", mapping.v1_param), &text);
        path = replace_colon_placeholder(&path, &mapping.v1_param, &text);
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        Ok(format!("{}{}", base, path))
    } else {
        Ok(format!("{}/{}", base, path))
    }
}

/// Query parameters for one call, in declaration order; absent values are skipped
pub fn build_query_params(call: &V1ApiCall, params: &V2Params) -> Vec<(String, String)> {
    call.params_for(ParamLocation::Query)
        .iter()
        .filter_map(|mapping| {
            params
                .get(&mapping.v2_param)
                .filter(|v| !v.is_null())
                .map(|v| (mapping.v1_param.clone(), param_text(v)))
        })
        .collect()
}

/// JSON body for one call, or `None` when no body group is declared
pub fn build_body(call: &V1ApiCall, params: &V2Params) -> Option<Map<String, Value>> {
    if !call.declares(ParamLocation::Body) {
        return None;
    }

    let body = call
        .params_for(ParamLocation::Body)
        .iter()
        .filter_map(|mapping| {
            params
                .get(&mapping.v2_param)
                .filter(|v| !v.is_null())
                .map(|v| (mapping.v1_param.clone(), v.clone()))
        })
        .collect();
    Some(body)
}

/// Text form of a parameter value for URLs
pub fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// `:id` must not match the prefix of `:identifier`.
fn replace_colon_placeholder(path: &str, name: &str, value: &str) -> String {
    let needle = format!(":{}", name);
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(pos) = rest.find(&needle) {
        let end = pos + needle.len();
        let boundary = rest[end..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        out.push_str(&rest[..pos]);
        if boundary {
            out.push_str(value);
        } else {
            out.push_str(&needle);
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}
