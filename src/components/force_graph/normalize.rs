//! Conversion of raw payloads into canonical snapshots.

use std::collections::HashSet;

use log::{debug, warn};

use super::model::{
	DEFAULT_EDGE_STRENGTH, DEFAULT_EDGE_WIDTH, DEFAULT_NODE_SIZE, Edge, EdgeKind, Node, NodeKind,
	Snapshot,
};
use super::theme::Color;
use super::types::{RawEdge, RawGraph, RawNode};

/// Normalizes a parsed payload.
///
/// Nodes without an id or with a duplicate id are skipped, as are edges whose
/// endpoints do not resolve. Every skip is logged; none is fatal.
pub fn normalize(raw: &RawGraph) -> Snapshot {
	let mut nodes = Vec::with_capacity(raw.nodes.len());
	let mut seen = HashSet::new();

	for (i, value) in raw.nodes.iter().enumerate() {
		let record: RawNode = match serde_json::from_value(value.clone()) {
			Ok(record) => record,
			Err(e) => {
				warn!("kg-canvas: skipping malformed node #{}: {}", i, e);
				continue;
			}
		};
		let Some(node) = normalize_node(record) else {
			warn!("kg-canvas: skipping node #{} without an id", i);
			continue;
		};
		if !seen.insert(node.id.clone()) {
			warn!("kg-canvas: skipping duplicate node id {:?}", node.id);
			continue;
		}
		nodes.push(node);
	}

	let mut edges = Vec::with_capacity(raw.edge_values().len());
	for (i, value) in raw.edge_values().iter().enumerate() {
		let record: RawEdge = match serde_json::from_value(value.clone()) {
			Ok(record) => record,
			Err(e) => {
				warn!("kg-canvas: skipping malformed edge #{}: {}", i, e);
				continue;
			}
		};
		let Some(edge) = normalize_edge(record) else {
			warn!("kg-canvas: skipping edge #{} without endpoints", i);
			continue;
		};
		if !seen.contains(&edge.source) || !seen.contains(&edge.target) {
			warn!(
				"kg-canvas: dropping dangling edge {:?} -> {:?}",
				edge.source, edge.target
			);
			continue;
		}
		edges.push(edge);
	}

	debug!(
		"kg-canvas: normalized {} nodes, {} edges",
		nodes.len(),
		edges.len()
	);
	Snapshot::new(nodes, edges)
}

fn normalize_node(raw: RawNode) -> Option<Node> {
	let id = raw.id?.into_key()?;
	let label = raw
		.label
		.or(raw.name)
		.filter(|l| !l.trim().is_empty())
		.unwrap_or_else(|| id.clone());
	let kind = raw
		.type_tag
		.or(raw.kind)
		.map(|tag| NodeKind::from_tag(&tag))
		.unwrap_or_default();
	let size = raw
		.size
		.filter(|s| s.is_finite() && *s > 0.0)
		.unwrap_or(DEFAULT_NODE_SIZE);
	let color = raw.color.as_deref().and_then(|c| {
		let parsed = Color::parse(c);
		if parsed.is_none() {
			debug!("kg-canvas: ignoring unparseable color {:?} on {:?}", c, id);
		}
		parsed
	});

	Some(Node {
		id,
		label,
		kind,
		size,
		color,
		summary: raw.summary.filter(|s| !s.is_empty()),
		content_preview: raw.content_preview.filter(|s| !s.is_empty()),
		key_terms: raw.key_terms.unwrap_or_default(),
	})
}

fn normalize_edge(raw: RawEdge) -> Option<Edge> {
	let source = raw.source?.into_key()?;
	let target = raw.target?.into_key()?;
	let tag = raw.type_tag.or(raw.kind).or(raw.relationship);
	let kind = tag
		.as_deref()
		.map(EdgeKind::from_tag)
		.unwrap_or_default();
	// Category names make poor labels; keep the raw text only when it says more.
	let label = raw
		.label
		.or(tag)
		.filter(|l| !l.trim().is_empty() && EdgeKind::from_tag(l) == EdgeKind::General);
	let width = raw
		.width
		.filter(|w| w.is_finite() && *w > 0.0)
		.unwrap_or(DEFAULT_EDGE_WIDTH);
	let strength = raw
		.strength
		.or(raw.weight)
		.filter(|s| s.is_finite())
		.map(|s| s.clamp(0.0, 1.0))
		.unwrap_or(DEFAULT_EDGE_STRENGTH);

	Some(Edge {
		source,
		target,
		kind,
		label,
		width,
		strength,
	})
}

/// Parses and normalizes a response body.
///
/// Returns `None` when the body is not a graph or normalizes to zero nodes;
/// callers substitute the demonstration graph so the canvas is never blank.
pub fn snapshot_from_json(text: &str) -> Option<Snapshot> {
	match RawGraph::from_json(text) {
		Ok(raw) => {
			let snapshot = normalize(&raw);
			if snapshot.is_empty() {
				warn!("kg-canvas: payload contained no usable nodes");
				None
			} else {
				Some(snapshot)
			}
		}
		Err(e) => {
			warn!("kg-canvas: failed to parse graph payload: {}", e);
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn raw(value: serde_json::Value) -> RawGraph {
		RawGraph::from_value(value).unwrap()
	}

	#[test]
	fn applies_defaults_for_missing_fields() {
		let snapshot = normalize(&raw(json!({
			"nodes": [{ "id": "a" }],
			"links": []
		})));
		let node = &snapshot.nodes[0];
		assert_eq!(node.label, "a");
		assert_eq!(node.kind, NodeKind::Unknown);
		assert_eq!(node.size, DEFAULT_NODE_SIZE);
		assert_eq!(node.color, None);
	}

	#[test]
	fn reads_backend_field_names() {
		let snapshot = normalize(&raw(json!({
			"graph": {
				"nodes": [
					{ "id": "doc_1", "name": "Policy Manual", "type": "document", "size": 15,
					  "color": "#00ff88", "summary": "Policies", "key_terms": ["GDPR"] },
					{ "id": "entity_gdpr", "label": "GDPR", "kind": "Entity" }
				],
				"links": [
					{ "source": "doc_1", "target": "entity_gdpr", "type": "contains", "strength": 0.9 }
				]
			}
		})));
		assert_eq!(snapshot.nodes.len(), 2);
		let doc = &snapshot.nodes[0];
		assert_eq!(doc.label, "Policy Manual");
		assert_eq!(doc.kind, NodeKind::Document);
		assert_eq!(doc.size, 15.0);
		assert_eq!(doc.color, Some(Color::rgb(0, 255, 136)));
		assert_eq!(doc.key_terms, vec!["GDPR".to_string()]);
		assert_eq!(snapshot.nodes[1].kind, NodeKind::Entity);

		let edge = &snapshot.edges[0];
		assert_eq!(edge.kind, EdgeKind::General);
		assert_eq!(edge.label.as_deref(), Some("contains"));
		assert_eq!(edge.strength, 0.9);
		assert_eq!(edge.width, DEFAULT_EDGE_WIDTH);
	}

	#[test]
	fn category_names_become_kinds_not_labels() {
		let snapshot = normalize(&raw(json!({
			"nodes": [{ "id": "a" }, { "id": "b" }],
			"edges": [{ "source": "a", "target": "b", "relationship": "Temporal" }]
		})));
		assert_eq!(snapshot.edges[0].kind, EdgeKind::Temporal);
		assert_eq!(snapshot.edges[0].label, None);
	}

	#[test]
	fn drops_dangling_edges() {
		let snapshot = normalize(&raw(json!({
			"nodes": [{ "id": "a" }, { "id": "b" }],
			"edges": [
				{ "source": "a", "target": "b" },
				{ "source": "a", "target": "missing" },
				{ "source": "ghost", "target": "b" },
				{ "target": "b" }
			]
		})));
		assert_eq!(snapshot.edges.len(), 1);
		let ids: HashSet<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
		for edge in &snapshot.edges {
			assert!(ids.contains(edge.source.as_str()));
			assert!(ids.contains(edge.target.as_str()));
		}
	}

	#[test]
	fn skips_malformed_and_duplicate_nodes() {
		let snapshot = normalize(&raw(json!({
			"nodes": [
				{ "id": "a" },
				{ "id": "a", "label": "second" },
				{ "label": "no id" },
				{ "id": "b", "size": "huge" },
				"not an object",
				{ "id": 42, "size": -3.0 }
			],
			"links": []
		})));
		let ids: Vec<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec!["a", "b", "42"]);
		assert_eq!(snapshot.nodes[0].label, "a");
		assert_eq!(snapshot.nodes[1].size, DEFAULT_NODE_SIZE);
		assert_eq!(snapshot.nodes[2].size, DEFAULT_NODE_SIZE);
	}

	#[test]
	fn wrong_typed_fields_fall_back_to_defaults() {
		let snapshot = normalize(&raw(json!({
			"nodes": [
				{ "id": "doc_1", "type": "document", "size": "15", "label": 5, "name": "Policy Manual" },
				{ "id": "x", "label": ["not", "text"], "type": 3 }
			],
			"edges": [{ "source": "doc_1", "target": "x", "weight": "strong", "label": {} }]
		})));
		assert_eq!(snapshot.nodes.len(), 2);
		let doc = &snapshot.nodes[0];
		assert_eq!(doc.size, DEFAULT_NODE_SIZE);
		assert_eq!(doc.label, "Policy Manual");
		assert_eq!(doc.kind, NodeKind::Document);
		assert_eq!(snapshot.nodes[1].label, "x");
		assert_eq!(snapshot.nodes[1].kind, NodeKind::Unknown);
		assert_eq!(snapshot.edges.len(), 1);
		assert_eq!(snapshot.edges[0].strength, DEFAULT_EDGE_STRENGTH);
		assert_eq!(snapshot.edges[0].label, None);
	}

	#[test]
	fn keeps_self_loops() {
		let snapshot = normalize(&raw(json!({
			"nodes": [{ "id": "a" }],
			"edges": [{ "source": "a", "target": "a" }]
		})));
		assert_eq!(snapshot.edges.len(), 1);
		assert!(snapshot.edges[0].is_self_loop());
	}

	#[test]
	fn clamps_strength_and_rejects_bad_widths() {
		let snapshot = normalize(&raw(json!({
			"nodes": [{ "id": "a" }, { "id": "b" }],
			"edges": [{ "source": "a", "target": "b", "weight": 4.0, "width": 0.0 }]
		})));
		assert_eq!(snapshot.edges[0].strength, 1.0);
		assert_eq!(snapshot.edges[0].width, DEFAULT_EDGE_WIDTH);
	}

	#[test]
	fn unusable_bodies_yield_nothing() {
		assert_eq!(snapshot_from_json("<html>502</html>"), None);
		assert_eq!(snapshot_from_json(r#"{"nodes": [], "links": []}"#), None);
		assert_eq!(snapshot_from_json(r#"{"nodes": [{"label": "no id"}]}"#), None);
	}

	#[test]
	fn valid_body_is_parsed() {
		let snapshot =
			snapshot_from_json(r#"{"nodes": [{"id": "q", "type": "query"}], "links": []}"#).unwrap();
		assert_eq!(snapshot.nodes.len(), 1);
		assert_eq!(snapshot.nodes[0].kind, NodeKind::Query);
	}
}
