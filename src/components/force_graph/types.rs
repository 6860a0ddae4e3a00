//! Raw graph payloads as they arrive over the wire.
//!
//! The backend is inconsistent about field names (`edges` vs `links`,
//! `label` vs `name`, `type` vs `kind`) and sometimes wraps the graph in a
//! response envelope. Records are kept as JSON values until normalization so
//! one malformed node cannot poison the whole payload, and a field of the
//! wrong type reads as absent instead of rejecting its record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads any JSON value and keeps it only if it decodes as `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let value = Value::deserialize(deserializer)?;
	Ok(serde_json::from_value(value).ok())
}

/// A node or endpoint identifier: string or number on the wire.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
	Text(String),
	Number(serde_json::Number),
}

impl RawId {
	/// Canonical string key. Blank strings count as missing.
	pub fn into_key(self) -> Option<String> {
		match self {
			RawId::Text(s) if s.trim().is_empty() => None,
			RawId::Text(s) => Some(s),
			RawId::Number(n) => Some(n.to_string()),
		}
	}
}

/// An edge endpoint: a bare id, or a node object carrying one.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawEndpoint {
	Id(RawId),
	Node { id: RawId },
}

impl RawEndpoint {
	pub fn into_key(self) -> Option<String> {
		match self {
			RawEndpoint::Id(id) | RawEndpoint::Node { id } => id.into_key(),
		}
	}
}

/// A node record with every field optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawNode {
	#[serde(deserialize_with = "lenient")]
	pub id: Option<RawId>,
	#[serde(deserialize_with = "lenient")]
	pub label: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub name: Option<String>,
	#[serde(rename = "type", deserialize_with = "lenient")]
	pub type_tag: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub kind: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub size: Option<f64>,
	#[serde(deserialize_with = "lenient")]
	pub color: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub summary: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub content_preview: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub key_terms: Option<Vec<String>>,
}

/// An edge record with every field optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawEdge {
	#[serde(deserialize_with = "lenient")]
	pub source: Option<RawEndpoint>,
	#[serde(deserialize_with = "lenient")]
	pub target: Option<RawEndpoint>,
	#[serde(rename = "type", deserialize_with = "lenient")]
	pub type_tag: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub kind: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub relationship: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub label: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub width: Option<f64>,
	#[serde(deserialize_with = "lenient")]
	pub strength: Option<f64>,
	#[serde(deserialize_with = "lenient")]
	pub weight: Option<f64>,
}

/// Graph payload: a node array plus an `edges` or `links` array.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGraph {
	#[serde(default)]
	pub nodes: Vec<Value>,
	pub edges: Option<Vec<Value>>,
	pub links: Option<Vec<Value>>,
}

impl RawGraph {
	/// Parses a response body, unwrapping the `{ "graph": { ... } }` envelope
	/// when present.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		let value: Value = serde_json::from_str(text)?;
		Self::from_value(value)
	}

	pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
		let envelope = value
			.get_mut("graph")
			.filter(|g| g.is_object())
			.map(Value::take);
		if let Some(graph) = envelope {
			value = graph;
		}
		serde_json::from_value(value)
	}

	/// Edge records, preferring `edges` over `links` when both are present.
	pub fn edge_values(&self) -> &[Value] {
		self.edges
			.as_deref()
			.or(self.links.as_deref())
			.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unwraps_backend_envelope() {
		let body = r#"{
			"message": "Knowledge graph retrieved",
			"graph": { "nodes": [{ "id": "a" }], "links": [] },
			"node_count": 1,
			"edge_count": 0
		}"#;
		let raw = RawGraph::from_json(body).unwrap();
		assert_eq!(raw.nodes.len(), 1);
		assert!(raw.edge_values().is_empty());
	}

	#[test]
	fn accepts_edges_or_links() {
		let with_edges =
			RawGraph::from_json(r#"{"nodes": [], "edges": [{"source": "a", "target": "b"}]}"#)
				.unwrap();
		let with_links =
			RawGraph::from_json(r#"{"nodes": [], "links": [{"source": "a", "target": "b"}]}"#)
				.unwrap();
		assert_eq!(with_edges.edge_values().len(), 1);
		assert_eq!(with_links.edge_values().len(), 1);
	}

	#[test]
	fn endpoints_may_be_numbers_or_objects() {
		let edge: RawEdge =
			serde_json::from_str(r#"{"source": 7, "target": {"id": "b", "x": 1.0}}"#).unwrap();
		assert_eq!(edge.source.and_then(RawEndpoint::into_key), Some("7".into()));
		assert_eq!(edge.target.and_then(RawEndpoint::into_key), Some("b".into()));
	}

	#[test]
	fn wrong_typed_fields_read_as_absent() {
		let node: RawNode = serde_json::from_str(
			r#"{"id": "a", "size": "15", "label": 5, "key_terms": "gdpr", "color": null}"#,
		)
		.unwrap();
		assert_eq!(node.id.and_then(RawId::into_key), Some("a".into()));
		assert!(node.size.is_none());
		assert!(node.label.is_none());
		assert!(node.key_terms.is_none());
		assert!(node.color.is_none());

		let edge: RawEdge =
			serde_json::from_str(r#"{"source": "a", "target": ["b"], "weight": "high"}"#).unwrap();
		assert!(edge.source.is_some());
		assert!(edge.target.is_none());
		assert!(edge.weight.is_none());
	}

	#[test]
	fn blank_ids_count_as_missing() {
		assert_eq!(RawId::Text("  ".into()).into_key(), None);
	}

	#[test]
	fn non_object_payload_is_an_error() {
		assert!(RawGraph::from_json("[1, 2, 3]").is_err());
		assert!(RawGraph::from_json("not json").is_err());
	}
}
