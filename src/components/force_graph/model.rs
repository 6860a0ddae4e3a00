//! Canonical graph model shared by every stage of the pipeline.
//!
//! The normalizer produces a [`Snapshot`], the relevance filter narrows it,
//! and the layout engine, renderer and interaction layer all read it. Node
//! positions are not part of this model: they live in the layout engine's
//! arena and are addressed by [`NodeHandle`], which is the node's index in
//! [`Snapshot::nodes`].

use std::collections::HashMap;

use super::theme::Color;

/// Default base radius for nodes that arrive without a `size`.
pub const DEFAULT_NODE_SIZE: f64 = 10.0;
/// Default stroke width for edges that arrive without a `width`.
pub const DEFAULT_EDGE_WIDTH: f64 = 1.5;
/// Default relationship strength, matching the backend's fixed value.
pub const DEFAULT_EDGE_STRENGTH: f64 = 0.7;

/// Category of a node. Drives color and glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Document,
	Person,
	Department,
	Project,
	Technology,
	Process,
	Location,
	Product,
	Vendor,
	Entity,
	Insight,
	Query,
	#[default]
	Unknown,
}

impl NodeKind {
	/// Parses a wire tag case-insensitively. Unrecognized tags map to `Unknown`.
	pub fn from_tag(tag: &str) -> Self {
		match tag.trim().to_ascii_lowercase().as_str() {
			"document" => NodeKind::Document,
			"person" => NodeKind::Person,
			"department" => NodeKind::Department,
			"project" => NodeKind::Project,
			"technology" => NodeKind::Technology,
			"process" => NodeKind::Process,
			"location" => NodeKind::Location,
			"product" => NodeKind::Product,
			"vendor" => NodeKind::Vendor,
			"entity" => NodeKind::Entity,
			"insight" => NodeKind::Insight,
			"query" => NodeKind::Query,
			_ => NodeKind::Unknown,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Document => "document",
			NodeKind::Person => "person",
			NodeKind::Department => "department",
			NodeKind::Project => "project",
			NodeKind::Technology => "technology",
			NodeKind::Process => "process",
			NodeKind::Location => "location",
			NodeKind::Product => "product",
			NodeKind::Vendor => "vendor",
			NodeKind::Entity => "entity",
			NodeKind::Insight => "insight",
			NodeKind::Query => "query",
			NodeKind::Unknown => "unknown",
		}
	}

	/// Glyph drawn at the node center.
	pub fn glyph(self) -> &'static str {
		match self {
			NodeKind::Document => "📄",
			NodeKind::Person => "👤",
			NodeKind::Department => "🏢",
			NodeKind::Project => "📋",
			NodeKind::Technology => "⚙",
			NodeKind::Process => "🔄",
			NodeKind::Location => "📍",
			NodeKind::Product => "📦",
			NodeKind::Vendor => "🤝",
			NodeKind::Entity => "🔷",
			NodeKind::Insight => "💡",
			NodeKind::Query => "🔍",
			NodeKind::Unknown => "❔",
		}
	}
}

/// Category of a relationship. Drives stroke color and dash pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeKind {
	Hierarchical,
	Collaborative,
	Technical,
	Geographic,
	Temporal,
	#[default]
	General,
}

impl EdgeKind {
	/// Parses a wire tag case-insensitively. Unrecognized tags map to `General`.
	pub fn from_tag(tag: &str) -> Self {
		match tag.trim().to_ascii_lowercase().as_str() {
			"hierarchical" => EdgeKind::Hierarchical,
			"collaborative" => EdgeKind::Collaborative,
			"technical" => EdgeKind::Technical,
			"geographic" => EdgeKind::Geographic,
			"temporal" => EdgeKind::Temporal,
			_ => EdgeKind::General,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			EdgeKind::Hierarchical => "hierarchical",
			EdgeKind::Collaborative => "collaborative",
			EdgeKind::Technical => "technical",
			EdgeKind::Geographic => "geographic",
			EdgeKind::Temporal => "temporal",
			EdgeKind::General => "general",
		}
	}
}

/// A node in a graph snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Identifier, unique within one snapshot.
	pub id: String,
	/// Display name.
	pub label: String,
	pub kind: NodeKind,
	/// Base radius in world units.
	pub size: f64,
	/// Explicit color from the payload. Replaces the kind's primary color.
	pub color: Option<Color>,
	/// Short description shown in the details panel.
	pub summary: Option<String>,
	/// Excerpt of the underlying document, if any.
	pub content_preview: Option<String>,
	pub key_terms: Vec<String>,
}

impl Node {
	/// Builds a node with default size and no descriptive fields.
	pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			kind,
			size: DEFAULT_NODE_SIZE,
			color: None,
			summary: None,
			content_preview: None,
			key_terms: Vec::new(),
		}
	}

	pub fn with_size(mut self, size: f64) -> Self {
		self.size = size;
		self
	}
}

/// A relationship between two nodes, referenced by id.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub source: String,
	pub target: String,
	pub kind: EdgeKind,
	/// Raw relationship text from the payload (e.g. `contains`).
	pub label: Option<String>,
	/// Stroke width in screen pixels.
	pub width: f64,
	/// Relationship weight in `[0, 1]`; scales link attraction.
	pub strength: f64,
}

impl Edge {
	pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind,
			label: None,
			width: DEFAULT_EDGE_WIDTH,
			strength: DEFAULT_EDGE_STRENGTH,
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Text drawn at the edge midpoint.
	pub fn display_label(&self) -> &str {
		self.label.as_deref().unwrap_or(self.kind.as_str())
	}

	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

/// Stable integer handle of a node: its index in [`Snapshot::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u32);

impl NodeHandle {
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

/// Complete node and edge set for one graph state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

impl Snapshot {
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		Self { nodes, edges }
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Maps each node id to its handle.
	pub fn handles(&self) -> HashMap<&str, NodeHandle> {
		self.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.as_str(), NodeHandle(i as u32)))
			.collect()
	}

	pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
		self.nodes.get(handle.index())
	}

	/// Resolves every edge to a pair of handles, aligned with [`Snapshot::edges`].
	/// Edges whose endpoints are missing resolve to `None`.
	pub fn edge_handles(&self) -> Vec<Option<(NodeHandle, NodeHandle)>> {
		let handles = self.handles();
		self.edges
			.iter()
			.map(|edge| {
				let source = handles.get(edge.source.as_str())?;
				let target = handles.get(edge.target.as_str())?;
				Some((*source, *target))
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kind_tags_are_case_insensitive() {
		assert_eq!(NodeKind::from_tag("Document"), NodeKind::Document);
		assert_eq!(NodeKind::from_tag(" QUERY "), NodeKind::Query);
		assert_eq!(NodeKind::from_tag("spreadsheet"), NodeKind::Unknown);
		assert_eq!(EdgeKind::from_tag("Temporal"), EdgeKind::Temporal);
		assert_eq!(EdgeKind::from_tag("contains"), EdgeKind::General);
	}

	#[test]
	fn kind_tags_round_trip_through_as_str() {
		let kinds = [
			NodeKind::Document,
			NodeKind::Person,
			NodeKind::Department,
			NodeKind::Project,
			NodeKind::Technology,
			NodeKind::Process,
			NodeKind::Location,
			NodeKind::Product,
			NodeKind::Vendor,
			NodeKind::Entity,
			NodeKind::Insight,
			NodeKind::Query,
			NodeKind::Unknown,
		];
		for kind in kinds {
			assert_eq!(NodeKind::from_tag(kind.as_str()), kind);
		}
	}

	#[test]
	fn edge_handles_align_with_edges() {
		let snapshot = Snapshot::new(
			vec![
				Node::new("a", "A", NodeKind::Entity),
				Node::new("b", "B", NodeKind::Entity),
			],
			vec![
				Edge::new("a", "b", EdgeKind::General),
				Edge::new("a", "ghost", EdgeKind::General),
			],
		);
		let resolved = snapshot.edge_handles();
		assert_eq!(resolved.len(), 2);
		assert_eq!(resolved[0], Some((NodeHandle(0), NodeHandle(1))));
		assert_eq!(resolved[1], None);
	}

	#[test]
	fn display_label_falls_back_to_kind() {
		let edge = Edge::new("a", "b", EdgeKind::Technical);
		assert_eq!(edge.display_label(), "technical");
		assert_eq!(edge.with_label("uses").display_label(), "uses");
	}
}
