//! Outbound notifications from the canvas to its host.
//!
//! State methods push events while the graph context is borrowed; the
//! component drains them after the borrow ends and forwards them to the
//! host's callbacks, so a callback may freely touch reactive state.

use super::model::Node;

#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	/// The displayed node set changed.
	VisibleNodesChanged(Vec<Node>),
	/// A node was clicked, or the background was (`None`).
	NodeSelected(Option<Node>),
	/// The view scale changed.
	ZoomChanged(f64),
}

/// Pending events in emission order. Consecutive zoom changes collapse into
/// the latest one.
#[derive(Debug, Default)]
pub struct EventQueue {
	pending: Vec<GraphEvent>,
}

impl EventQueue {
	pub fn push(&mut self, event: GraphEvent) {
		if let GraphEvent::ZoomChanged(k) = event {
			if let Some(GraphEvent::ZoomChanged(last)) = self.pending.last_mut() {
				*last = k;
				return;
			}
		}
		self.pending.push(event);
	}

	pub fn drain(&mut self) -> Vec<GraphEvent> {
		std::mem::take(&mut self.pending)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::model::NodeKind;

	#[test]
	fn zoom_events_coalesce() {
		let mut queue = EventQueue::default();
		queue.push(GraphEvent::ZoomChanged(1.0));
		queue.push(GraphEvent::ZoomChanged(1.1));
		queue.push(GraphEvent::ZoomChanged(1.21));
		assert_eq!(queue.drain(), vec![GraphEvent::ZoomChanged(1.21)]);
		assert!(queue.drain().is_empty());
	}

	#[test]
	fn other_events_keep_their_order() {
		let mut queue = EventQueue::default();
		let node = Node::new("a", "A", NodeKind::Entity);
		queue.push(GraphEvent::ZoomChanged(2.0));
		queue.push(GraphEvent::NodeSelected(None));
		queue.push(GraphEvent::ZoomChanged(3.0));
		queue.push(GraphEvent::VisibleNodesChanged(vec![node.clone()]));
		assert_eq!(
			queue.drain(),
			vec![
				GraphEvent::ZoomChanged(2.0),
				GraphEvent::NodeSelected(None),
				GraphEvent::ZoomChanged(3.0),
				GraphEvent::VisibleNodesChanged(vec![node]),
			]
		);
	}
}
