//! V2 route registry
//!
//! A `RouteTable` maps `(method, path template)` to the mapping document
//! serving it. Tables are immutable; `Registry` swaps whole tables so a
//! reader always sees either the old or the new set of routes.

use apishim_schemas::{ConfigStore, HttpMethod, LoaderError, LoaderResult, MappingConfig};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

impl Segment {
    /// Same position in a route: equal literals, or parameters of any name
    fn overlaps(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            (Segment::Param(_), Segment::Param(_)) => true,
            _ => false,
        }
    }
}

fn same_route(a: &[Segment], b: &[Segment]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.overlaps(y))
}

/// A registered V2 endpoint
#[derive(Debug)]
pub struct Endpoint {
    pub id: String,
    pub config: Arc<MappingConfig>,
    segments: Vec<Segment>,
}

impl Endpoint {
    pub fn method(&self) -> HttpMethod {
        self.config.endpoint.v2_method
    }

    pub fn path(&self) -> &str {
        &self.config.endpoint.v2_path
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Raw (still percent-encoded) path parameters if `segments` match
    fn capture(&self, segments: &[&str]) -> Option<Vec<(String, String)>> {
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (template, actual) in self.segments.iter().zip(segments) {
            match template {
                Segment::Literal(literal) if literal == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((name.clone(), actual.to_string())),
            }
        }
        Some(params)
    }
}

/// Result of resolving an inbound request path
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub endpoint: Arc<Endpoint>,
    /// Captured path parameters, percent-encoded as received
    pub raw_params: Vec<(String, String)>,
}

/// Immutable set of V2 routes
///
/// Documents shadowed by a duplicate route are retained so that removing the
/// one being served brings the other back.
#[derive(Debug, Default)]
pub struct RouteTable {
    endpoints: Vec<Arc<Endpoint>>,
    entries: Vec<(String, Arc<MappingConfig>)>,
}

impl RouteTable {
    /// Build a table from `(id, config)` pairs
    ///
    /// Entries are ordered by id. When two documents declare the same method
    /// and path, the one with the smaller id is kept.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Arc<MappingConfig>)>,
    {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut endpoints: Vec<Arc<Endpoint>> = Vec::with_capacity(entries.len());
        for (id, config) in entries.iter().cloned() {
            let segments = parse_template(&config.endpoint.v2_path);
            let method = config.endpoint.v2_method;

            if let Some(existing) = endpoints
                .iter()
                .find(|e| e.method() == method && same_route(&e.segments, &segments))
            {
                warn!(
                    id = %id,
                    kept = %existing.id,
                    route = %format!("{} {}", method, config.endpoint.v2_path),
                    "Duplicate V2 route, ignoring configuration"
                );
                continue;
            }

            endpoints.push(Arc::new(Endpoint {
                id,
                config,
                segments,
            }));
        }

        Self { endpoints, entries }
    }

    /// Build a table from every valid document in `store`
    ///
    /// Invalid documents are skipped and returned next to the table.
    pub fn from_store(store: &ConfigStore) -> LoaderResult<(Self, Vec<(String, LoaderError)>)> {
        let mut loaded = Vec::new();
        let mut failed = Vec::new();

        for outcome in store.load_all()? {
            match outcome.result {
                Ok(config) => {
                    info!(
                        id = %outcome.id,
                        route = %format!("{} {}", config.endpoint.v2_method, config.endpoint.v2_path),
                        "Registered endpoint"
                    );
                    loaded.push((outcome.id, Arc::new(config)));
                }
                Err(e) => {
                    warn!(id = %outcome.id, error = %e, "Skipping invalid configuration");
                    failed.push((outcome.id, e));
                }
            }
        }

        Ok((Self::build(loaded), failed))
    }

    /// Find the endpoint serving `method` and `path`
    ///
    /// Among matching templates the one with most literal segments wins.
    pub fn match_route(&self, method: HttpMethod, path: &str) -> Option<RouteMatch> {
        let segments = split_path(path);

        self.endpoints
            .iter()
            .filter(|e| e.method() == method)
            .filter_map(|e| e.capture(&segments).map(|params| (e, params)))
            .max_by(|(a, _), (b, _)| {
                a.literal_count()
                    .cmp(&b.literal_count())
                    // keep the first of equal candidates
                    .then_with(|| b.id.cmp(&a.id))
            })
            .map(|(endpoint, raw_params)| RouteMatch {
                endpoint: Arc::clone(endpoint),
                raw_params,
            })
    }

    /// Id of another served document already claiming `config`'s route
    pub fn conflicting_id(&self, id: &str, config: &MappingConfig) -> Option<&str> {
        let segments = parse_template(&config.endpoint.v2_path);
        self.endpoints
            .iter()
            .find(|e| {
                e.id != id
                    && e.method() == config.endpoint.v2_method
                    && same_route(&e.segments, &segments)
            })
            .map(|e| e.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Endpoint>> {
        self.endpoints.iter().find(|e| e.id == id)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Arc<Endpoint>> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == id)
    }

    fn entries(&self) -> impl Iterator<Item = (String, Arc<MappingConfig>)> + '_ {
        self.entries
            .iter()
            .map(|(id, config)| (id.clone(), Arc::clone(config)))
    }
}

/// Swappable holder of the current route table
#[derive(Debug, Default)]
pub struct Registry {
    table: RwLock<Arc<RouteTable>>,
}

impl Registry {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: RwLock::new(Arc::new(table)),
        }
    }

    /// The table in effect right now
    pub fn snapshot(&self) -> Arc<RouteTable> {
        Arc::clone(&self.table.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn replace(&self, table: RouteTable) {
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
    }

    /// Add or replace the document registered under `id`
    pub fn upsert(&self, id: &str, config: MappingConfig) {
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let entries = guard
            .entries()
            .filter(|(existing, _)| existing != id)
            .chain(std::iter::once((id.to_string(), Arc::new(config))))
            .collect::<Vec<_>>();
        *guard = Arc::new(RouteTable::build(entries));
    }

    /// Drop the document registered under `id`; false if there was none
    pub fn remove(&self, id: &str) -> bool {
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.contains(id) {
            return false;
        }
        let entries = guard
            .entries()
            .filter(|(existing, _)| existing != id)
            .collect::<Vec<_>>();
        *guard = Arc::new(RouteTable::build(entries));
        true
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn parse_template(template: &str) -> Vec<Segment> {
    split_path(template)
        .into_iter()
        .map(|segment| {
            if let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Segment::Param(name.to_string())
            } else if let Some(name) = segment.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(segment.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(method: &str, path: &str) -> Arc<MappingConfig> {
        Arc::new(
            apishim_schemas::validate_document(&json!({
                "endpoint": {"v2_path": path, "v2_method": method},
                "v1_calls": [{"name": "c", "endpoint": "/c"}],
                "field_mappings": [{"v2_path": "x", "source": "c", "v1_path": "x"}]
            }))
            .unwrap(),
        )
    }

    #[test]
    fn test_templated_match() {
        let table = RouteTable::build(vec![(
            "policy".to_string(),
            config("GET", "/api/v2/policies/{policyId}"),
        )]);

        let matched = table
            .match_route(HttpMethod::Get, "/api/v2/policies/POL%20123/")
            .unwrap();
        assert_eq!(matched.endpoint.id, "policy");
        assert_eq!(
            matched.raw_params,
            vec![("policyId".to_string(), "POL%20123".to_string())]
        );

        assert!(table.match_route(HttpMethod::Post, "/api/v2/policies/P1").is_none());
        assert!(table.match_route(HttpMethod::Get, "/api/v2/policies").is_none());
        assert!(table.match_route(HttpMethod::Get, "/api/v2/policies/P1/x").is_none());
    }

    #[test]
    fn test_literal_wins() {
        let table = RouteTable::build(vec![
            ("a_templated".to_string(), config("GET", "/api/v2/policies/{policyId}")),
            ("b_literal".to_string(), config("GET", "/api/v2/policies/summary")),
        ]);

        let matched = table.match_route(HttpMethod::Get, "/api/v2/policies/summary").unwrap();
        assert_eq!(matched.endpoint.id, "b_literal");
        assert!(matched.raw_params.is_empty());

        let matched = table.match_route(HttpMethod::Get, "/api/v2/policies/P9").unwrap();
        assert_eq!(matched.endpoint.id, "a_templated");
    }

    #[test]
    fn test_duplicate_routes_keep_first_id() {
        let table = RouteTable::build(vec![
            ("zz".to_string(), config("GET", "/api/v2/x/{a}")),
            ("aa".to_string(), config("GET", "/api/v2/x/{b}")),
        ]);
        assert_eq!(table.len(), 1);
        assert!(table.get("aa").is_some());
    }

    #[test]
    fn test_registry_copy_on_write() {
        let registry = Registry::new(RouteTable::build(vec![(
            "policy".to_string(),
            config("GET", "/api/v2/policies/{id}"),
        )]));

        let before = registry.snapshot();
        registry.upsert("claims", (*config("POST", "/api/v2/claims")).clone());

        // readers holding the old table are unaffected
        assert_eq!(before.len(), 1);
        let after = registry.snapshot();
        assert_eq!(after.len(), 2);
        assert!(after.match_route(HttpMethod::Post, "/api/v2/claims").is_some());

        assert!(registry.remove("policy"));
        assert!(!registry.remove("policy"));
        assert_eq!(registry.snapshot().len(), 1);

        registry.replace(RouteTable::default());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_conflicting_id() {
        let table = RouteTable::build(vec![(
            "policy".to_string(),
            config("GET", "/api/v2/policies/{id}"),
        )]);

        let same = config("GET", "/api/v2/policies/{policyId}");
        assert_eq!(table.conflicting_id("other", &same), Some("policy"));
        assert_eq!(table.conflicting_id("policy", &same), None);
        assert_eq!(
            table.conflicting_id("other", &config("POST", "/api/v2/policies/{id}")),
            None
        );
        assert_eq!(
            table.conflicting_id("other", &config("GET", "/api/v2/policies/summary")),
            None
        );
    }

    #[test]
    fn test_shadowed_document_restored_after_remove() {
        let registry = Registry::new(RouteTable::build(vec![(
            "b_orig".to_string(),
            config("GET", "/api/v2/x"),
        )]));

        registry.upsert("a_new", (*config("GET", "/api/v2/x")).clone());
        let ids: Vec<_> = registry.snapshot().endpoints().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["a_new".to_string()]);

        assert!(registry.remove("a_new"));
        let ids: Vec<_> = registry.snapshot().endpoints().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["b_orig".to_string()]);
    }
}
