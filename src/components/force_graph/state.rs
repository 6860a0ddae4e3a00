//! Graph state and interaction tracking.
//!
//! Owns the current snapshot, its relevance-filtered view, the layout engine,
//! view transforms for pan/zoom, selection, and highlight state for hover
//! effects with smooth intensity transitions. Notifications for the host are
//! queued in an [`EventQueue`] and drained by the component.

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use super::events::{EventQueue, GraphEvent};
use super::filter::{active_filter, filter_snapshot};
use super::layout::{LayoutEngine, TickOutcome, Vec2};
use super::model::{Node, NodeHandle, Snapshot};
use super::render::{Frame, paint_order};
use super::scale::ScaleConfig;

/// Zoom bounds for user-driven and automatic zoom.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Pointer travel in screen pixels below which a press counts as a click.
const CLICK_TOLERANCE: f64 = 3.0;
/// Energy restored to the layout while a node is dragged.
const DRAG_REHEAT: f64 = 0.3;
/// Screen margin kept around the graph by fit-to-view.
const FIT_PADDING: f64 = 40.0;
/// Fit-to-view never zooms in further than this.
const FIT_MAX_ZOOM: f64 = 2.0;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub handle: Option<NodeHandle>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Vec2,
	/// Set once the pointer travelled far enough to stop being a click.
	pub moved: bool,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

/// Manages smooth highlight transitions with per-node intensity tracking.
///
/// Each node has its own intensity value (0.0 to 1.0) that smoothly animates
/// based on whether it's in the active highlight set. Exponential smoothing
/// gives transitions that slow down as they approach their target.
///
/// A minimum hold time prevents flashing when the pointer briefly skirts the
/// edge of a node's hover zone.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	hovered_node: Option<NodeHandle>,
	/// Hovered node plus its neighbours.
	target_set: HashSet<NodeHandle>,
	/// Nodes not in this map have intensity 0.
	node_intensity: HashMap<NodeHandle, f64>,
	hover_ring_intensity: HashMap<NodeHandle, f64>,
	/// Time remaining before fade-out can begin.
	hold_timer: HashMap<NodeHandle, f64>,
	cached_max: f64,
}

/// Minimum time (seconds) a highlight must be held before it can fade out.
const MIN_HOLD_TIME: f64 = 0.12;

impl HighlightState {
	/// Update the hovered node and recompute the target highlight set.
	pub fn set_hover(&mut self, node: Option<NodeHandle>, links: &[(NodeHandle, NodeHandle)]) {
		if self.hovered_node == node {
			return;
		}

		self.hovered_node = node;
		self.target_set.clear();

		if let Some(handle) = node {
			self.target_set.insert(handle);
			for &(source, target) in links {
				if source == handle {
					self.target_set.insert(target);
				} else if target == handle {
					self.target_set.insert(source);
				}
			}
			for &handle in &self.target_set {
				self.hold_timer.insert(handle, MIN_HOLD_TIME);
			}
		}
	}

	/// Animate all node intensities towards their targets.
	///
	/// Exponential smoothing: value += (target - value) * (1 - e^(-speed * dt))
	pub fn tick(&mut self, dt: f64) {
		// ~150ms to 95%
		const FADE_IN_SPEED: f64 = 6.0;
		// ~250ms to 95%
		const FADE_OUT_SPEED: f64 = 4.0;

		let fade_in_factor = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out_decay = (-FADE_OUT_SPEED * dt).exp();

		for &handle in &self.target_set {
			let intensity = self.node_intensity.entry(handle).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in_factor;
		}

		if let Some(handle) = self.hovered_node {
			let intensity = self.hover_ring_intensity.entry(handle).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in_factor;
		}

		let mut new_max: f64 = 0.0;

		self.hold_timer.retain(|handle, timer| {
			if self.target_set.contains(handle) {
				true
			} else {
				*timer -= dt;
				*timer > 0.0
			}
		});

		self.node_intensity.retain(|handle, intensity| {
			if self.target_set.contains(handle) {
				new_max = new_max.max(*intensity);
				return true;
			}
			if self.hold_timer.get(handle).copied().unwrap_or(0.0) <= 0.0 {
				*intensity *= fade_out_decay;
			}
			new_max = new_max.max(*intensity);
			*intensity > 0.005
		});

		self.hover_ring_intensity.retain(|handle, intensity| {
			if self.hovered_node == Some(*handle) {
				return true;
			}
			if self.hold_timer.get(handle).copied().unwrap_or(0.0) <= 0.0 {
				*intensity *= fade_out_decay;
			}
			*intensity > 0.005
		});

		self.cached_max = new_max;
	}

	pub fn node_intensity(&self, handle: NodeHandle) -> f64 {
		self.node_intensity.get(&handle).copied().unwrap_or(0.0)
	}

	pub fn hover_ring_intensity(&self, handle: NodeHandle) -> f64 {
		self.hover_ring_intensity.get(&handle).copied().unwrap_or(0.0)
	}

	/// Geometric mean of the endpoint intensities.
	pub fn edge_intensity(&self, a: NodeHandle, b: NodeHandle) -> f64 {
		(self.node_intensity(a) * self.node_intensity(b)).sqrt()
	}

	/// Strongest intensity of any node, used to dim everything else.
	pub fn max_intensity(&self) -> f64 {
		self.cached_max
	}
}

/// Core graph state combining layout with interaction and highlight tracking.
///
/// Created once when the component mounts, then mutated by the animation loop
/// and pointer handlers.
pub struct ForceGraphState {
	full: Snapshot,
	relevance: Option<Vec<String>>,
	active: Snapshot,
	edge_handles: Vec<Option<(NodeHandle, NodeHandle)>>,
	links: Vec<(NodeHandle, NodeHandle)>,
	pub engine: LayoutEngine,
	/// Zoom-dependent visuals. Node radii from here drive both painting and
	/// fit-to-view.
	pub scale: ScaleConfig,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub highlight: HighlightState,
	selected: Option<NodeHandle>,
	pub width: f64,
	pub height: f64,
	/// Fit the view when the layout settles. Cleared once the user pans or zooms.
	auto_fit: bool,
	events: EventQueue,
}

impl ForceGraphState {
	pub fn new(snapshot: Snapshot, engine: LayoutEngine, width: f64, height: f64) -> Self {
		let mut state = Self {
			full: Snapshot::default(),
			relevance: None,
			active: Snapshot::default(),
			edge_handles: Vec::new(),
			links: Vec::new(),
			engine,
			scale: ScaleConfig::default(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			selected: None,
			width,
			height,
			auto_fit: true,
			events: EventQueue::default(),
		};
		state.set_snapshot(snapshot);
		state.events.push(GraphEvent::ZoomChanged(state.transform.k));
		state
	}

	/// Replaces the full graph, e.g. after a new query resolved. The layout
	/// starts over and any selection is cleared.
	pub fn set_snapshot(&mut self, snapshot: Snapshot) {
		info!(
			"kg-canvas: showing snapshot with {} nodes, {} edges",
			snapshot.nodes.len(),
			snapshot.edges.len()
		);
		self.full = snapshot;
		self.auto_fit = true;
		self.clear_selection();
		self.rebuild(&HashMap::new());
	}

	/// Narrows the displayed graph to `ids` without re-fetching. `None` or an
	/// empty list shows the full snapshot again. Surviving nodes keep their
	/// current positions.
	pub fn set_relevance(&mut self, ids: Option<Vec<String>>) {
		let ids = active_filter(ids);
		if ids == self.relevance {
			return;
		}
		debug!(
			"kg-canvas: relevance filter {}",
			ids.as_ref()
				.map_or_else(|| "cleared".to_string(), |ids| format!("set to {} ids", ids.len()))
		);

		let seeds = self.engine.seeds();
		let selected_id = self.selected_node().map(|node| node.id.clone());
		self.relevance = ids;
		self.auto_fit = true;
		self.rebuild(&seeds);

		let still_visible = selected_id.and_then(|id| self.engine.handle_of(&id));
		match still_visible {
			Some(handle) => self.selected = Some(handle),
			None => self.clear_selection(),
		}
	}

	fn rebuild(&mut self, seeds: &HashMap<String, Vec2>) {
		self.active = filter_snapshot(&self.full, self.relevance.as_deref());
		self.engine.set_center(self.view_center());
		self.engine.load(&self.active, seeds);
		self.edge_handles = self.active.edge_handles();
		self.links = self.edge_handles.iter().flatten().copied().collect();
		self.highlight = HighlightState::default();
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.events
			.push(GraphEvent::VisibleNodesChanged(self.active.nodes.clone()));
	}

	fn clear_selection(&mut self) {
		if self.selected.take().is_some() {
			self.events.push(GraphEvent::NodeSelected(None));
		}
	}

	pub fn selected_node(&self) -> Option<&Node> {
		self.selected.and_then(|handle| self.active.node(handle))
	}

	/// Advances layout and highlight animation by one frame.
	pub fn tick(&mut self, dt: f64) -> TickOutcome {
		self.engine.set_zoom(self.transform.k);
		let outcome = self.engine.tick();
		if outcome == TickOutcome::Settled && self.auto_fit {
			self.fit_to_view();
		}
		self.highlight.tick(dt);
		outcome
	}

	/// Centers the graph and zooms so every drawn node body is on screen.
	///
	/// Bodies grow with zoom, so the fit is computed against the radii at the
	/// current zoom and then refined once against the radii at the fitted one.
	pub fn fit_to_view(&mut self) {
		if !(self.width > 0.0 && self.height > 0.0) {
			return;
		}
		let Some((k, center)) = self.fit(self.transform.k) else {
			return;
		};
		let (k, center) = self.fit(k).unwrap_or((k, center));

		self.transform.x = self.width / 2.0 - center.x * k;
		self.transform.y = self.height / 2.0 - center.y * k;
		self.apply_zoom(k);
		self.engine.set_center(center);
	}

	/// Zoom and world center that frame every body drawn at zoom `k`.
	fn fit(&self, k: f64) -> Option<(f64, Vec2)> {
		let (min, max) = self.engine.bounds(self.scale.node_radius(1.0, k))?;
		let (span_x, span_y) = ((max.x - min.x).max(1.0), (max.y - min.y).max(1.0));
		let avail_x = (self.width - 2.0 * FIT_PADDING).max(self.width * 0.5);
		let avail_y = (self.height - 2.0 * FIT_PADDING).max(self.height * 0.5);
		let k = (avail_x / span_x)
			.min(avail_y / span_y)
			.clamp(MIN_ZOOM, FIT_MAX_ZOOM);
		Some((k, Vec2::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0)))
	}

	fn apply_zoom(&mut self, k: f64) {
		if (k - self.transform.k).abs() > f64::EPSILON {
			self.transform.k = k;
			self.events.push(GraphEvent::ZoomChanged(k));
		}
	}

	pub fn frame(&self) -> Frame<'_> {
		Frame {
			snapshot: &self.active,
			positions: self.engine.positions(),
			edge_handles: &self.edge_handles,
			transform: &self.transform,
			width: self.width,
			height: self.height,
			highlight: &self.highlight,
			selected: self.selected,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Vec2 {
		Vec2::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// World point under the middle of the viewport.
	fn view_center(&self) -> Vec2 {
		self.screen_to_graph(self.width / 2.0, self.height / 2.0)
	}

	/// Topmost node whose hit square (side `2 × size` in world units, at any
	/// zoom) contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeHandle> {
		let point = self.screen_to_graph(sx, sy);
		if !point.is_finite() {
			return None;
		}
		paint_order(self.active.nodes.len(), &self.highlight, self.selected)
			.into_iter()
			.rev()
			.find(|&handle| {
				let (Some(node), Some(p)) = (self.active.node(handle), self.engine.position(handle))
				else {
					return false;
				};
				p.is_finite() && (p.x - point.x).abs() <= node.size && (p.y - point.y).abs() <= node.size
			})
	}

	pub fn set_hover(&mut self, node: Option<NodeHandle>) {
		self.highlight.set_hover(node, &self.links);
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		if let Some(handle) = self.node_at_position(x, y) {
			self.drag = DragState {
				active: true,
				handle: Some(handle),
				start_x: x,
				start_y: y,
				node_start: self.engine.position(handle).unwrap_or_default(),
				moved: false,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
				moved: false,
			};
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if self.drag.active {
			let Some(handle) = self.drag.handle else {
				return;
			};
			let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
			if !self.drag.moved && dx.hypot(dy) < CLICK_TOLERANCE {
				return;
			}
			self.drag.moved = true;
			let target = self.drag.node_start
				+ Vec2::new(dx / self.transform.k, dy / self.transform.k);
			self.engine.pin(handle, target);
			self.engine.reheat(DRAG_REHEAT);
		} else if self.pan.active {
			let (dx, dy) = (x - self.pan.start_x, y - self.pan.start_y);
			if !self.pan.moved && dx.hypot(dy) < CLICK_TOLERANCE {
				return;
			}
			self.pan.moved = true;
			self.auto_fit = false;
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
		} else {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}
	}

	/// Ends a drag or pan. A press that never moved is a click: on a node it
	/// selects the node, on the background it clears the selection.
	pub fn pointer_up(&mut self) {
		if self.drag.active {
			if let (Some(handle), false) = (self.drag.handle, self.drag.moved) {
				self.select(Some(handle));
			}
		} else if self.pan.active && !self.pan.moved {
			self.select(None);
		}
		self.drag = DragState::default();
		self.pan = PanState::default();
	}

	pub fn pointer_leave(&mut self) {
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.set_hover(None);
	}

	/// Zooms by one wheel step, keeping the point under the pointer fixed.
	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.auto_fit = false;
		self.apply_zoom(new_k);
	}

	fn select(&mut self, handle: Option<NodeHandle>) {
		let selection = handle.and_then(|h| self.active.node(h)).cloned();
		match &selection {
			Some(node) => debug!("kg-canvas: selected {:?}", node.id),
			None if self.selected.is_none() => return,
			None => debug!("kg-canvas: selection cleared"),
		}
		self.selected = handle.filter(|_| selection.is_some());
		self.events.push(GraphEvent::NodeSelected(selection));
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		let (dx, dy) = ((width - self.width) / 2.0, (height - self.height) / 2.0);
		self.transform.x += dx;
		self.transform.y += dy;
		self.width = width;
		self.height = height;
		self.engine.set_center(self.view_center());
	}

	/// Events queued since the last call.
	pub fn drain_events(&mut self) -> Vec<GraphEvent> {
		self.events.drain()
	}
}
