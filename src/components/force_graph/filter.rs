//! Relevance filtering: narrowing a snapshot to a subset of node ids.

use std::collections::HashSet;

use super::model::Snapshot;

/// Restricts `snapshot` to the nodes named in `ids`, keeping only edges whose
/// endpoints both survive.
///
/// `None` and an empty list both mean "no filter". Order and duplicates in
/// `ids` are irrelevant. Runs in O(|nodes| + |edges|).
pub fn filter_snapshot(snapshot: &Snapshot, ids: Option<&[String]>) -> Snapshot {
	let Some(ids) = ids.filter(|ids| !ids.is_empty()) else {
		return snapshot.clone();
	};
	let keep: HashSet<&str> = ids.iter().map(String::as_str).collect();

	Snapshot {
		nodes: snapshot
			.nodes
			.iter()
			.filter(|node| keep.contains(node.id.as_str()))
			.cloned()
			.collect(),
		edges: snapshot
			.edges
			.iter()
			.filter(|edge| {
				keep.contains(edge.source.as_str()) && keep.contains(edge.target.as_str())
			})
			.cloned()
			.collect(),
	}
}

/// Normalizes relevance input: an empty list is the same as no list.
pub fn active_filter(ids: Option<Vec<String>>) -> Option<Vec<String>> {
	ids.filter(|ids| !ids.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::fallback::demo_snapshot;
	use crate::components::force_graph::model::{Edge, EdgeKind, Node, NodeKind};

	fn ids(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	fn query_graph() -> Snapshot {
		Snapshot::new(
			vec![
				Node::new("q", "What is GDPR?", NodeKind::Query),
				Node::new("d1", "Policy Manual", NodeKind::Document),
				Node::new("e1", "GDPR", NodeKind::Entity),
			],
			vec![
				Edge::new("q", "d1", EdgeKind::General),
				Edge::new("d1", "e1", EdgeKind::Hierarchical),
			],
		)
	}

	#[test]
	fn query_subgraph_example() {
		let filtered = filter_snapshot(&query_graph(), Some(ids(&["q", "d1"]).as_slice()));
		let node_ids: Vec<&str> = filtered.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(node_ids, vec!["q", "d1"]);
		assert_eq!(filtered.edges.len(), 1);
		assert_eq!(filtered.edges[0].source, "q");
		assert_eq!(filtered.edges[0].target, "d1");
	}

	#[test]
	fn no_filter_is_identity() {
		let snapshot = demo_snapshot();
		assert_eq!(filter_snapshot(&snapshot, None), snapshot);
		let empty: Vec<String> = Vec::new();
		assert_eq!(filter_snapshot(&snapshot, Some(empty.as_slice())), snapshot);
	}

	#[test]
	fn filtering_is_idempotent() {
		let snapshot = demo_snapshot();
		let subset = ids(&["doc_1", "entity_gdpr", "insight_1", "dept_legal", "nope"]);
		let once = filter_snapshot(&snapshot, Some(subset.as_slice()));
		let twice = filter_snapshot(&once, Some(subset.as_slice()));
		assert_eq!(once, twice);
	}

	#[test]
	fn filtered_graph_only_references_requested_ids() {
		let snapshot = demo_snapshot();
		let subset = ids(&["doc_2", "doc_3", "entity_privacy", "entity_compliance"]);
		let filtered = filter_snapshot(&snapshot, Some(subset.as_slice()));
		assert!(!filtered.edges.is_empty());
		for node in &filtered.nodes {
			assert!(subset.contains(&node.id));
		}
		for edge in &filtered.edges {
			assert!(subset.contains(&edge.source));
			assert!(subset.contains(&edge.target));
		}
	}

	#[test]
	fn order_and_duplicates_do_not_matter() {
		let snapshot = demo_snapshot();
		let forward = ids(&["doc_1", "doc_2", "entity_gdpr"]);
		let shuffled = ids(&["entity_gdpr", "doc_2", "doc_1", "doc_2"]);
		let a = filter_snapshot(&snapshot, Some(forward.as_slice()));
		let b = filter_snapshot(&snapshot, Some(shuffled.as_slice()));
		assert_eq!(a, b);
	}

	#[test]
	fn unknown_ids_yield_an_empty_graph() {
		let filtered = filter_snapshot(&query_graph(), Some(ids(&["zzz"]).as_slice()));
		assert!(filtered.nodes.is_empty());
		assert!(filtered.edges.is_empty());
	}

	#[test]
	fn empty_relevance_list_clears_the_filter() {
		assert_eq!(active_filter(Some(Vec::new())), None);
		assert_eq!(active_filter(Some(ids(&["a"]))), Some(ids(&["a"])));
	}
}
