//! Frame painting for the knowledge graph.
//!
//! [`paint`] turns one frame of state into [`DrawCommand`]s without touching
//! a graphics context. Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edge glows, then edge lines and their labels (world space)
//! 3. Nodes in [`paint_order`]: dimmed nodes, highlighted nodes, then the
//!    selected node on top

use super::draw::{DrawCommand, Paint, RadialGradient, TextBaseline};
use super::layout::Vec2;
use super::model::{Edge, Node, NodeHandle, Snapshot};
use super::scale::{ScaleConfig, ScaledValues, truncate_label};
use super::state::{HighlightState, ViewTransform};
use super::theme::{Color, EdgeStyle, KindPalette, Theme};

/// Attempt to smooth values that would otherwise cause abrupt visual changes.
pub fn smooth_step(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

/// Everything one frame reads. Borrowed, never mutated.
pub struct Frame<'a> {
	pub snapshot: &'a Snapshot,
	/// Positions indexed by [`NodeHandle`].
	pub positions: &'a [Vec2],
	/// Resolved endpoints, aligned with `snapshot.edges`.
	pub edge_handles: &'a [Option<(NodeHandle, NodeHandle)>],
	pub transform: &'a ViewTransform,
	pub width: f64,
	pub height: f64,
	pub highlight: &'a HighlightState,
	pub selected: Option<NodeHandle>,
}

impl Frame<'_> {
	fn position(&self, handle: NodeHandle) -> Option<Vec2> {
		self.positions
			.get(handle.index())
			.copied()
			.filter(|p| p.is_finite())
	}
}

/// Order in which nodes are painted, bottom to top. Hit-testing walks it in
/// reverse so the topmost node wins.
pub fn paint_order(
	node_count: usize,
	highlight: &HighlightState,
	selected: Option<NodeHandle>,
) -> Vec<NodeHandle> {
	let handles = (0..node_count as u32).map(NodeHandle);
	let is_raised = |h: &NodeHandle| highlight.node_intensity(*h) > 0.001;

	let mut order: Vec<NodeHandle> = handles
		.clone()
		.filter(|h| !is_raised(h) && Some(*h) != selected)
		.collect();
	order.extend(handles.filter(|h| is_raised(h) && Some(*h) != selected));
	if let Some(handle) = selected.filter(|h| h.index() < node_count) {
		order.push(handle);
	}
	order
}

/// Paints a complete frame.
pub fn paint(frame: &Frame, config: &ScaleConfig, theme: &Theme) -> Vec<DrawCommand> {
	let scale = ScaledValues::new(config, frame.transform.k);
	let mut out = Vec::with_capacity(8 + frame.snapshot.nodes.len() * 10 + frame.snapshot.edges.len() * 3);

	paint_background(frame, theme, &mut out);

	out.push(DrawCommand::Save);
	out.push(DrawCommand::Transform {
		x: frame.transform.x,
		y: frame.transform.y,
		k: scale.k,
	});

	paint_edges(frame, &scale, theme, &mut out);
	paint_nodes(frame, &scale, theme, &mut out);

	out.push(DrawCommand::Restore);
	out
}

fn paint_background(frame: &Frame, theme: &Theme, out: &mut Vec<DrawCommand>) {
	let (w, h) = (frame.width, frame.height);
	if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
		return;
	}
	out.push(DrawCommand::FillRect {
		x: 0.0,
		y: 0.0,
		width: w,
		height: h,
		paint: Paint::Radial(RadialGradient {
			x0: w / 2.0,
			y0: h / 2.0,
			r0: 0.0,
			x1: w / 2.0,
			y1: h / 2.0,
			r1: w.max(h) * 0.8,
			stops: vec![
				(0.0, theme.background.color_secondary),
				(1.0, theme.background.color),
			],
		}),
	});
}

/// Node dimming shared by edges and nodes: `(alpha, radius_mult)` for an
/// element with eased highlight intensity `t` while the graph's strongest
/// highlight is `max_t`.
fn emphasis(t: f64, max_t: f64, theme: &Theme) -> (f64, f64) {
	let dim_alpha = 1.0 - (1.0 - theme.node.dim_alpha) * max_t;
	let dim_radius = 1.0 - 0.15 * max_t;
	let alpha = dim_alpha + (1.0 - dim_alpha) * t;
	let radius = dim_radius + (1.0 + 0.25 * t - dim_radius) * t;
	(alpha, radius)
}

fn paint_edges(frame: &Frame, scale: &ScaledValues, theme: &Theme, out: &mut Vec<DrawCommand>) {
	let max_t = smooth_step(frame.highlight.max_intensity());
	let mut labels = Vec::new();

	let drawable: Vec<(&Edge, Vec2, Vec2, f64)> = frame
		.snapshot
		.edges
		.iter()
		.zip(frame.edge_handles)
		.filter_map(|(edge, handles)| {
			let (s, t) = (*handles)?;
			let (a, b) = (frame.position(s)?, frame.position(t)?);
			let edge_t = smooth_step(frame.highlight.edge_intensity(s, t));
			Some((edge, a, b, edge_t))
		})
		.filter(|(edge, ..)| edge.width.is_finite())
		.collect();

	if theme.edge.glow_intensity > 0.0 {
		for (edge, a, b, edge_t) in &drawable {
			if edge.is_self_loop() {
				continue;
			}
			let style = EdgeStyle::for_kind(edge.kind);
			let (alpha, _) = emphasis(*edge_t, max_t, theme);
			let glow_alpha = theme.edge.glow_intensity * alpha;
			if glow_alpha < 0.01 {
				continue;
			}
			out.push(DrawCommand::Line {
				x1: a.x,
				y1: a.y,
				x2: b.x,
				y2: b.y,
				color: style.color.with_alpha(glow_alpha),
				width: edge.width * theme.edge.glow_width * scale.pixel,
				dash: Vec::new(),
			});
		}
	}

	for (edge, a, b, edge_t) in &drawable {
		let style = EdgeStyle::for_kind(edge.kind);
		let (alpha, _) = emphasis(*edge_t, max_t, theme);
		let color = style.color.with_alpha(theme.edge.alpha * alpha);
		let width = edge.width * (1.0 + 0.4 * edge_t) * scale.pixel;

		if edge.is_self_loop() {
			let loop_radius = frame
				.snapshot
				.nodes
				.iter()
				.find(|n| n.id == edge.source)
				.map_or(scale.pixel * 8.0, |n| node_radius(n, scale) * 0.6);
			out.push(DrawCommand::StrokeCircle {
				x: a.x,
				y: a.y - loop_radius * 1.6,
				radius: loop_radius,
				paint: Paint::Solid(color),
				width,
			});
			continue;
		}

		out.push(DrawCommand::Line {
			x1: a.x,
			y1: a.y,
			x2: b.x,
			y2: b.y,
			color,
			width,
			dash: style.dash.iter().map(|d| d * scale.pixel).collect(),
		});

		if scale.show_edge_labels() {
			labels.push(DrawCommand::Text {
				text: edge.display_label().to_string(),
				x: (a.x + b.x) / 2.0,
				y: (a.y + b.y) / 2.0,
				font: scale.edge_label_font.clone(),
				color: theme
					.label
					.edge_text
					.with_alpha(theme.label.edge_text.a * scale.edge_label_alpha * alpha),
				baseline: TextBaseline::Middle,
			});
		}
	}

	out.extend(labels);
}

fn node_radius(node: &Node, scale: &ScaledValues) -> f64 {
	node.size * scale.node_radius_mult
}

fn paint_nodes(frame: &Frame, scale: &ScaledValues, theme: &Theme, out: &mut Vec<DrawCommand>) {
	let max_t = smooth_step(frame.highlight.max_intensity());

	for handle in paint_order(frame.snapshot.nodes.len(), frame.highlight, frame.selected) {
		let (Some(node), Some(p)) = (frame.snapshot.node(handle), frame.position(handle)) else {
			continue;
		};
		if !(node.size.is_finite() && node.size > 0.0) {
			continue;
		}
		let node_t = smooth_step(frame.highlight.node_intensity(handle));
		let (alpha, radius_mult) = emphasis(node_t, max_t, theme);
		let radius = node_radius(node, scale) * radius_mult;

		out.push(DrawCommand::SetAlpha(alpha));
		paint_node_body(node, p, radius, scale, theme, out);

		let hover_t = smooth_step(frame.highlight.hover_ring_intensity(handle));
		if frame.selected == Some(handle) {
			out.push(DrawCommand::StrokeCircle {
				x: p.x,
				y: p.y,
				radius: radius + scale.ring_offset,
				paint: Paint::Solid(theme.selection_ring),
				width: scale.ring_width,
			});
		} else if hover_t > 0.01 {
			out.push(DrawCommand::StrokeCircle {
				x: p.x,
				y: p.y,
				radius: radius + scale.ring_offset,
				paint: Paint::Solid(Color::rgba(255, 255, 255, 0.8 * hover_t)),
				width: scale.ring_width * 0.75,
			});
		}
		out.push(DrawCommand::SetAlpha(1.0));

		if scale.show_labels() {
			paint_label(node, p, radius, alpha * scale.label_alpha, scale, theme, out);
		}
	}
}

fn paint_node_body(
	node: &Node,
	p: Vec2,
	radius: f64,
	scale: &ScaledValues,
	theme: &Theme,
	out: &mut Vec<DrawCommand>,
) {
	let palette = KindPalette::for_kind(node.kind);
	let primary = node.color.unwrap_or(palette.primary);
	let (outer, inner) = theme.node.halo_scale;

	for (mult, color, halo_alpha) in [
		(outer, palette.accent, theme.node.outer_halo_alpha),
		(inner, primary, theme.node.inner_halo_alpha),
	] {
		if halo_alpha <= 0.0 {
			continue;
		}
		out.push(DrawCommand::FillCircle {
			x: p.x,
			y: p.y,
			radius: radius * mult,
			paint: Paint::Radial(RadialGradient {
				x0: p.x,
				y0: p.y,
				r0: radius * 0.5,
				x1: p.x,
				y1: p.y,
				r1: radius * mult,
				stops: vec![(0.0, color.with_alpha(halo_alpha)), (1.0, color.with_alpha(0.0))],
			}),
		});
	}

	out.push(DrawCommand::FillCircle {
		x: p.x,
		y: p.y,
		radius,
		paint: Paint::Radial(RadialGradient {
			x0: p.x - radius * 0.3,
			y0: p.y - radius * 0.3,
			r0: 0.0,
			x1: p.x,
			y1: p.y,
			r1: radius,
			stops: vec![
				(0.0, primary.lighten(0.4)),
				(0.7, primary),
				(1.0, palette.secondary),
			],
		}),
	});

	let spot = radius * 0.35;
	out.push(DrawCommand::FillCircle {
		x: p.x - spot,
		y: p.y - spot,
		radius: spot,
		paint: Paint::Radial(RadialGradient {
			x0: p.x - spot,
			y0: p.y - spot,
			r0: 0.0,
			x1: p.x - spot,
			y1: p.y - spot,
			r1: spot,
			stops: vec![
				(0.0, Color::rgba(255, 255, 255, theme.node.highlight_alpha)),
				(1.0, Color::rgba(255, 255, 255, 0.0)),
			],
		}),
	});

	if theme.node.border_width > 0.0 {
		out.push(DrawCommand::StrokeCircle {
			x: p.x,
			y: p.y,
			radius,
			paint: Paint::Radial(RadialGradient {
				x0: p.x - radius,
				y0: p.y - radius,
				r0: 0.0,
				x1: p.x,
				y1: p.y,
				r1: radius * 2.0,
				stops: vec![(0.0, palette.accent), (1.0, palette.secondary)],
			}),
			width: theme.node.border_width * scale.pixel,
		});
	}

	out.push(DrawCommand::Text {
		text: node.kind.glyph().to_string(),
		x: p.x,
		y: p.y,
		font: scale.glyph_font(radius),
		color: Color::rgb(255, 255, 255),
		baseline: TextBaseline::Middle,
	});
}

fn paint_label(
	node: &Node,
	p: Vec2,
	radius: f64,
	alpha: f64,
	scale: &ScaledValues,
	theme: &Theme,
	out: &mut Vec<DrawCommand>,
) {
	if alpha <= 0.0 {
		return;
	}
	let text = truncate_label(&node.label, scale.label_max_chars);
	let font_size = scale.label_font_size;
	let pad = 3.0 * scale.pixel;
	let text_width = text.chars().count() as f64 * font_size * 0.6;
	let top = p.y + radius + 4.0 * scale.pixel;

	out.push(DrawCommand::FillRect {
		x: p.x - text_width / 2.0 - pad,
		y: top - pad,
		width: text_width + pad * 2.0,
		height: font_size + pad * 2.0,
		paint: Paint::Solid(theme.label.plate.with_alpha(theme.label.plate.a * alpha)),
	});
	out.push(DrawCommand::Text {
		text,
		x: p.x,
		y: top,
		font: scale.label_font.clone(),
		color: theme.label.text.with_alpha(theme.label.text.a * alpha),
		baseline: TextBaseline::Top,
	});
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::model::{EdgeKind, NodeKind};

	fn snapshot() -> Snapshot {
		Snapshot::new(
			vec![
				Node::new("q", "What is GDPR?", NodeKind::Query),
				Node::new("d1", "Policy Manual", NodeKind::Document),
				Node::new("e1", "GDPR", NodeKind::Entity),
			],
			vec![
				Edge::new("q", "d1", EdgeKind::Collaborative).with_label("asks about"),
				Edge::new("d1", "e1", EdgeKind::Hierarchical),
			],
		)
	}

	fn positions() -> Vec<Vec2> {
		vec![
			Vec2::new(0.0, 0.0),
			Vec2::new(60.0, 10.0),
			Vec2::new(-40.0, 50.0),
		]
	}

	fn render(
		snapshot: &Snapshot,
		positions: &[Vec2],
		k: f64,
		selected: Option<NodeHandle>,
	) -> Vec<DrawCommand> {
		let edge_handles = snapshot.edge_handles();
		let transform = ViewTransform { x: 400.0, y: 300.0, k };
		let highlight = HighlightState::default();
		let frame = Frame {
			snapshot,
			positions,
			edge_handles: &edge_handles,
			transform: &transform,
			width: 800.0,
			height: 600.0,
			highlight: &highlight,
			selected,
		};
		paint(&frame, &ScaleConfig::default(), &Theme::default())
	}

	fn texts(commands: &[DrawCommand]) -> Vec<&str> {
		commands
			.iter()
			.filter_map(|c| match c {
				DrawCommand::Text { text, .. } => Some(text.as_str()),
				_ => None,
			})
			.collect()
	}

	fn lines(commands: &[DrawCommand]) -> Vec<&DrawCommand> {
		commands
			.iter()
			.filter(|c| matches!(c, DrawCommand::Line { .. }))
			.collect()
	}

	/// Every coordinate and length the command carries.
	fn numbers(command: &DrawCommand) -> Vec<f64> {
		match command {
			DrawCommand::Save | DrawCommand::Restore => Vec::new(),
			DrawCommand::Transform { x, y, k } => vec![*x, *y, *k],
			DrawCommand::SetAlpha(alpha) => vec![*alpha],
			DrawCommand::FillRect {
				x,
				y,
				width,
				height,
				paint,
			} => {
				let mut out = vec![*x, *y, *width, *height];
				out.extend(paint_numbers(paint));
				out
			}
			DrawCommand::FillCircle { x, y, radius, paint } => {
				let mut out = vec![*x, *y, *radius];
				out.extend(paint_numbers(paint));
				out
			}
			DrawCommand::StrokeCircle {
				x,
				y,
				radius,
				paint,
				width,
			} => {
				let mut out = vec![*x, *y, *radius, *width];
				out.extend(paint_numbers(paint));
				out
			}
			DrawCommand::Line {
				x1,
				y1,
				x2,
				y2,
				width,
				dash,
				..
			} => {
				let mut out = vec![*x1, *y1, *x2, *y2, *width];
				out.extend(dash);
				out
			}
			DrawCommand::Text { x, y, .. } => vec![*x, *y],
		}
	}

	fn paint_numbers(paint: &Paint) -> Vec<f64> {
		match paint {
			Paint::Solid(color) => vec![color.a],
			Paint::Radial(g) => {
				let mut out = vec![g.x0, g.y0, g.r0, g.x1, g.y1, g.r1];
				out.extend(g.stops.iter().map(|(offset, _)| *offset));
				out
			}
		}
	}

	#[test]
	fn empty_snapshot_paints_only_the_frame() {
		let commands = render(&Snapshot::default(), &[], 1.0, None);
		assert_eq!(commands.len(), 4);
		assert!(matches!(commands[0], DrawCommand::FillRect { .. }));
		assert_eq!(commands[1], DrawCommand::Save);
		assert!(matches!(commands[2], DrawCommand::Transform { .. }));
		assert_eq!(commands[3], DrawCommand::Restore);
	}

	#[test]
	fn non_finite_positions_are_skipped() {
		let snapshot = snapshot();
		let positions = vec![
			Vec2::new(0.0, 0.0),
			Vec2::new(f64::NAN, 10.0),
			Vec2::new(f64::INFINITY, f64::NEG_INFINITY),
		];
		let commands = render(&snapshot, &positions, 1.0, None);

		for command in &commands {
			for n in numbers(command) {
				assert!(n.is_finite(), "{:?}", command);
			}
		}
		assert!(lines(&commands).is_empty());
		let labels = texts(&commands);
		assert!(labels.contains(&"What is GDPR?"));
		assert!(!labels.contains(&"Policy Manual"));
		assert!(!labels.contains(&"GDPR"));
	}

	#[test]
	fn missing_positions_are_tolerated() {
		let commands = render(&snapshot(), &[Vec2::new(1.0, 1.0)], 1.0, None);
		assert!(lines(&commands).is_empty());
		assert_eq!(commands.last(), Some(&DrawCommand::Restore));
	}

	#[test]
	fn node_labels_need_zoom_above_half() {
		let hidden = render(&snapshot(), &positions(), 0.4, None);
		assert!(!texts(&hidden).contains(&"Policy Manual"));
		let shown = render(&snapshot(), &positions(), 1.0, None);
		assert!(texts(&shown).contains(&"Policy Manual"));
	}

	#[test]
	fn edge_labels_need_zoom_above_threshold() {
		let near = render(&snapshot(), &positions(), 2.0, None);
		assert!(texts(&near).contains(&"asks about"));
		assert!(texts(&near).contains(&"hierarchical"));
		let far = render(&snapshot(), &positions(), 1.0, None);
		assert!(!texts(&far).contains(&"asks about"));
	}

	#[test]
	fn long_labels_are_truncated() {
		let mut snapshot = snapshot();
		snapshot.nodes[1].label = "A very long document title that keeps going".into();
		let commands = render(&snapshot, &positions(), 1.0, None);
		assert!(texts(&commands).iter().any(|t| t.ends_with('…')));
	}

	#[test]
	fn edge_dash_follows_kind() {
		let commands = render(&snapshot(), &positions(), 1.0, None);
		let dashed: Vec<bool> = lines(&commands)
			.into_iter()
			.filter_map(|c| match c {
				DrawCommand::Line { dash, .. } => Some(!dash.is_empty()),
				_ => None,
			})
			.collect();
		assert!(dashed.contains(&true));
		assert!(dashed.contains(&false));
	}

	#[test]
	fn explicit_color_replaces_kind_primary() {
		let mut snapshot = snapshot();
		let custom = Color::rgb(1, 2, 3);
		snapshot.nodes[2].color = Some(custom);
		let commands = render(&snapshot, &positions(), 1.0, None);
		let uses_custom = commands.iter().any(|c| match c {
			DrawCommand::FillCircle {
				paint: Paint::Radial(g),
				..
			} => g.stops.iter().any(|(_, color)| *color == custom),
			_ => false,
		});
		assert!(uses_custom);
	}

	#[test]
	fn selected_node_is_painted_last_with_ring() {
		let order = paint_order(3, &HighlightState::default(), Some(NodeHandle(0)));
		assert_eq!(order, vec![NodeHandle(1), NodeHandle(2), NodeHandle(0)]);

		let commands = render(&snapshot(), &positions(), 1.0, Some(NodeHandle(0)));
		let ring = Paint::Solid(Theme::default().selection_ring);
		assert!(commands.iter().any(|c| matches!(
			c,
			DrawCommand::StrokeCircle { paint, .. } if *paint == ring
		)));
	}

	#[test]
	fn painting_does_not_mutate_inputs() {
		let snapshot = snapshot();
		let positions = positions();
		let (before_snapshot, before_positions) = (snapshot.clone(), positions.clone());
		let _ = render(&snapshot, &positions, 1.5, Some(NodeHandle(1)));
		assert_eq!(snapshot, before_snapshot);
		assert_eq!(positions, before_positions);
	}

	#[test]
	fn self_loops_paint_without_lines() {
		let snapshot = Snapshot::new(
			vec![Node::new("a", "A", NodeKind::Entity)],
			vec![Edge::new("a", "a", EdgeKind::General)],
		);
		let commands = render(&snapshot, &[Vec2::new(5.0, 5.0)], 1.0, None);
		assert!(lines(&commands).is_empty());
		for command in &commands {
			assert!(numbers(command).iter().all(|n| n.is_finite()));
		}
	}
}
