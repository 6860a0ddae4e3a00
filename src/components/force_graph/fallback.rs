//! Built-in demonstration graph shown when the backend is unreachable.

use super::model::{Edge, EdgeKind, Node, NodeKind, Snapshot};

const NODES: &[(&str, &str, NodeKind, f64)] = &[
	("doc_1", "Policy Manual 2024", NodeKind::Document, 15.0),
	("doc_2", "Compliance Guide", NodeKind::Document, 15.0),
	("doc_3", "Data Privacy Report", NodeKind::Document, 15.0),
	("doc_4", "Security Framework", NodeKind::Document, 15.0),
	("entity_gdpr", "GDPR", NodeKind::Entity, 12.0),
	("entity_compliance", "Compliance", NodeKind::Entity, 12.0),
	("entity_data_protection", "Data Protection", NodeKind::Entity, 12.0),
	("entity_security", "Security", NodeKind::Entity, 12.0),
	("entity_privacy", "Privacy", NodeKind::Entity, 12.0),
	("insight_1", "Privacy Requirements", NodeKind::Insight, 10.0),
	("insight_2", "Risk Assessment", NodeKind::Insight, 10.0),
	("insight_3", "Compliance Framework", NodeKind::Insight, 10.0),
	("insight_4", "Security Controls", NodeKind::Insight, 10.0),
	("dept_legal", "Legal Department", NodeKind::Department, 15.0),
	("dept_it", "IT Department", NodeKind::Department, 15.0),
	("person_dpo", "Data Protection Officer", NodeKind::Person, 11.0),
	("person_ciso", "Chief Security Officer", NodeKind::Person, 11.0),
	("tech_iam", "Identity Platform", NodeKind::Technology, 11.0),
	("project_audit", "Annual Audit", NodeKind::Project, 11.0),
	("process_review", "Access Review", NodeKind::Process, 10.0),
	("location_eu", "EU Data Center", NodeKind::Location, 10.0),
	("vendor_cloud", "Cloud Provider", NodeKind::Vendor, 10.0),
	("product_portal", "Customer Portal", NodeKind::Product, 10.0),
];

const EDGES: &[(&str, &str, EdgeKind, Option<&str>)] = &[
	("doc_1", "entity_gdpr", EdgeKind::General, Some("contains")),
	("doc_1", "entity_compliance", EdgeKind::General, Some("contains")),
	("doc_1", "entity_data_protection", EdgeKind::General, Some("contains")),
	("doc_2", "entity_compliance", EdgeKind::General, Some("contains")),
	("doc_2", "entity_gdpr", EdgeKind::General, Some("contains")),
	("doc_3", "entity_privacy", EdgeKind::General, Some("contains")),
	("doc_3", "entity_data_protection", EdgeKind::General, Some("contains")),
	("doc_4", "entity_security", EdgeKind::General, Some("contains")),
	("doc_4", "entity_compliance", EdgeKind::General, Some("contains")),
	("entity_gdpr", "insight_1", EdgeKind::Technical, Some("generates")),
	("entity_privacy", "insight_1", EdgeKind::Technical, Some("generates")),
	("entity_compliance", "insight_2", EdgeKind::Technical, Some("generates")),
	("entity_data_protection", "insight_2", EdgeKind::Technical, Some("generates")),
	("entity_compliance", "insight_3", EdgeKind::Technical, Some("generates")),
	("entity_gdpr", "insight_3", EdgeKind::Technical, Some("generates")),
	("entity_security", "insight_4", EdgeKind::Technical, Some("generates")),
	("entity_compliance", "insight_4", EdgeKind::Technical, Some("generates")),
	("doc_1", "doc_2", EdgeKind::Collaborative, Some("relates to")),
	("doc_2", "doc_3", EdgeKind::Collaborative, Some("relates to")),
	("doc_3", "doc_4", EdgeKind::Collaborative, Some("relates to")),
	("dept_legal", "doc_1", EdgeKind::Hierarchical, Some("owns")),
	("dept_legal", "doc_2", EdgeKind::Hierarchical, Some("owns")),
	("dept_it", "doc_4", EdgeKind::Hierarchical, Some("owns")),
	("dept_legal", "person_dpo", EdgeKind::Hierarchical, None),
	("dept_it", "person_ciso", EdgeKind::Hierarchical, None),
	("person_dpo", "person_ciso", EdgeKind::Collaborative, None),
	("person_ciso", "tech_iam", EdgeKind::Technical, Some("operates")),
	("tech_iam", "process_review", EdgeKind::Technical, Some("automates")),
	("project_audit", "doc_3", EdgeKind::Temporal, Some("reviews")),
	("project_audit", "process_review", EdgeKind::Temporal, Some("schedules")),
	("vendor_cloud", "location_eu", EdgeKind::Geographic, Some("hosts in")),
	("product_portal", "location_eu", EdgeKind::Geographic, Some("served from")),
	("vendor_cloud", "tech_iam", EdgeKind::Technical, Some("supplies")),
];

/// The demonstration snapshot. Deterministic: every call returns an equal value.
pub fn demo_snapshot() -> Snapshot {
	let nodes = NODES
		.iter()
		.map(|&(id, label, kind, size)| Node::new(id, label, kind).with_size(size))
		.collect();
	let edges = EDGES
		.iter()
		.map(|&(source, target, kind, label)| {
			let edge = Edge::new(source, target, kind);
			match label {
				Some(label) => edge.with_label(label),
				None => edge,
			}
		})
		.collect();
	Snapshot::new(nodes, edges)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn demo_graph_is_consistent() {
		let snapshot = demo_snapshot();
		let ids: HashSet<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids.len(), snapshot.nodes.len(), "ids must be unique");
		for edge in &snapshot.edges {
			assert!(ids.contains(edge.source.as_str()), "{}", edge.source);
			assert!(ids.contains(edge.target.as_str()), "{}", edge.target);
		}
	}

	#[test]
	fn demo_graph_covers_every_edge_kind() {
		let kinds: HashSet<EdgeKind> = demo_snapshot().edges.iter().map(|e| e.kind).collect();
		assert_eq!(kinds.len(), 6);
	}
}
