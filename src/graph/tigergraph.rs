//! TigerGraph REST++ backend
//!
//! Endpoints used (all relative to the REST++ base URL):
//! - `GET  /requesttoken?secret=..&lifetime=..` for the bearer token
//! - `DELETE /graph/{graph}/vertices/{type}?filter=..`
//! - `POST /graph/{graph}` with an upsert document
//! - `GET  /query/{graph}/{query}?..` for installed queries
//!
//! Every response is a JSON envelope `{"error": bool, "message": .., "results": ..}`.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::store::{AttributeFilter, GraphStore};
use super::{EdgeType, GraphEdge, Vertex, VertexType};
use crate::config::GraphSettings;
use crate::{Error, Result};

/// Authenticated REST++ client for one graph
#[derive(Debug, Clone)]
pub struct TigerGraphClient {
    client: Client,
    restpp_url: String,
    graph_name: String,
    token: String,
}

impl TigerGraphClient {
    /// Connect and request a token with the configured secret
    pub fn connect(settings: &GraphSettings, timeout_secs: u64) -> Result<Self> {
        let secret = settings
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Config("graph secret is not set".to_string()))?;
        let restpp_url = settings.restpp_url()?;

        let mut builder = Client::builder();
        builder = if timeout_secs > 0 {
            builder.timeout(Duration::from_secs(timeout_secs))
        } else {
            builder.timeout(None::<Duration>)
        };
        let client = builder.build()?;

        let lifetime = settings.token_lifetime_secs.to_string();
        let response = client
            .get(format!("{}/requesttoken", restpp_url))
            .query(&[("secret", secret), ("lifetime", lifetime.as_str())])
            .send()?;
        let body = envelope(response)?;
        let token = extract_token(&body)
            .ok_or_else(|| Error::Graph("token response has no token".to_string()))?;

        info!(graph = %settings.graph_name, "connected to graph store");
        Ok(Self {
            client,
            restpp_url,
            graph_name: settings.graph_name.clone(),
            token,
        })
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    fn graph_url(&self) -> String {
        format!("{}/graph/{}", self.restpp_url, self.graph_name)
    }

    fn post_upsert(&self, document: &Value) -> Result<Value> {
        let response = self
            .authed(self.client.post(self.graph_url()))
            .json(document)
            .send()?;
        envelope(response)
    }
}

impl GraphStore for TigerGraphClient {
    fn delete_vertices(
        &mut self,
        vertex_type: VertexType,
        filter: Option<&AttributeFilter>,
    ) -> Result<usize> {
        let url = format!("{}/vertices/{}", self.graph_url(), vertex_type);
        let mut request = self.authed(self.client.delete(url));
        if let Some(f) = filter {
            request = request.query(&[("filter", filter_expression(f))]);
        }
        let body = envelope(request.send()?)?;
        let deleted = body["results"]["deleted_vertices"].as_u64().unwrap_or(0) as usize;
        debug!(%vertex_type, deleted, "deleted vertices");
        Ok(deleted)
    }

    fn upsert_vertices(&mut self, vertex_type: VertexType, vertices: &[Vertex]) -> Result<usize> {
        if vertices.is_empty() {
            return Ok(0);
        }
        let body = self.post_upsert(&vertex_upsert_document(vertex_type, vertices))?;
        Ok(accepted(&body, "accepted_vertices"))
    }

    fn upsert_edges(&mut self, edge_type: EdgeType, edges: &[GraphEdge]) -> Result<usize> {
        if edges.is_empty() {
            return Ok(0);
        }
        let body = self.post_upsert(&edge_upsert_document(edge_type, edges))?;
        Ok(accepted(&body, "accepted_edges"))
    }

    fn run_installed_query(&mut self, name: &str, params: &[(String, String)]) -> Result<Vec<Value>> {
        let url = format!("{}/query/{}/{}", self.restpp_url, self.graph_name, name);
        let response = self.authed(self.client.get(url)).query(params).send()?;
        let body = envelope(response)?;
        match body.get("results") {
            Some(Value::Array(results)) => Ok(results.clone()),
            _ => Err(Error::Graph(format!("query '{}' returned no result array", name))),
        }
    }
}

/// Read a REST++ response, failing on HTTP errors or an `error: true` envelope
fn envelope(response: reqwest::blocking::Response) -> Result<Value> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text()?;
    let body: Value = match serde_json::from_str(&text) {
        Ok(body) => body,
        Err(_) if !status.is_success() => {
            return Err(Error::HttpStatus { url, status: status.as_u16() });
        }
        Err(e) => return Err(e.into()),
    };

    if body["error"].as_bool().unwrap_or(false) || !status.is_success() {
        let message = body["message"].as_str().unwrap_or("unknown error");
        return Err(Error::Graph(format!("{} ({})", message, status.as_u16())));
    }
    Ok(body)
}

/// Token field, either top-level or under `results` depending on server version
fn extract_token(body: &Value) -> Option<String> {
    body.get("token")
        .or_else(|| body.get("results").and_then(|r| r.get("token")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn accepted(body: &Value, field: &str) -> usize {
    body["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter_map(|r| r[field].as_u64())
                .sum::<u64>() as usize
        })
        .unwrap_or(0)
}

/// `attr="value"` with quotes in the value escaped
pub fn filter_expression(filter: &AttributeFilter) -> String {
    format!("{}=\"{}\"", filter.attribute, filter.value.replace('"', "\\\""))
}

/// `{"vertices": {type: {id: {attr: {"value": v}}}}}`
pub fn vertex_upsert_document(vertex_type: VertexType, vertices: &[Vertex]) -> Value {
    let mut by_id = Map::new();
    for vertex in vertices {
        let attrs: Map<String, Value> = vertex
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), json!({ "value": v })))
            .collect();
        by_id.insert(vertex.id.clone(), Value::Object(attrs));
    }
    json!({ "vertices": { vertex_type.as_str(): by_id } })
}

/// `{"edges": {src_type: {src_id: {label: {tgt_type: {tgt_id: {}}}}}}}`
pub fn edge_upsert_document(edge_type: EdgeType, edges: &[GraphEdge]) -> Value {
    let mut by_source = Map::new();
    for edge in edges {
        let targets = by_source
            .entry(edge.from_id.clone())
            .or_insert_with(|| json!({ edge_type.as_str(): { edge_type.target().as_str(): {} } }));
        if let Some(Value::Object(ids)) = targets
            .get_mut(edge_type.as_str())
            .and_then(|t| t.get_mut(edge_type.target().as_str()))
        {
            ids.insert(edge.to_id.clone(), json!({}));
        }
    }
    json!({ "edges": { edge_type.source().as_str(): by_source } })
}
