//! Zoom-dependent scaling configuration for graph visuals.
//!
//! All zoom-dependent detail levels live here: node growth, label visibility
//! and length, edge label thresholds, and ring widths.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: The coordinate system of the layout. Values in
//!   world-space scale proportionally with zoom.
//! - **Screen-space**: Pixel coordinates on the canvas. Values in screen-space
//!   remain constant regardless of zoom level.
//!
//! Everything in [`ScaledValues`] is expressed in world-space so it can be used
//! directly after the canvas transform has been applied.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World size grows with zoom, but only within `[min_k, max_k]`.
	/// Below `min_k` the element keeps its `min_k` world size, above `max_k`
	/// it stops growing.
	Clamped { min_k: f64, max_k: f64 },
}

impl ScaleBehavior {
	/// World-space value for a base size at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped { min_k, max_k } => base * k.clamp(*min_k, *max_k),
		}
	}
}

/// Defines how alpha/opacity scales with zoom level.
#[derive(Clone, Debug)]
pub enum AlphaBehavior {
	/// Hidden at or below `zero_alpha_k`, fully visible from `full_alpha_k`.
	Fade {
		zero_alpha_k: f64,
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	/// Alpha multiplier for a given zoom level.
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if k <= *zero_alpha_k {
					return 0.0;
				}
				if full_alpha_k <= zero_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

/// Node and node label scaling.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// How node radius follows zoom. Layout collision uses the same clamp, see
	/// `LayoutConfig::zoom_clamp`.
	pub radius_behavior: ScaleBehavior,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Label visibility. Labels are hidden at or below `zero_alpha_k`.
	pub label_alpha: AlphaBehavior,
	/// Label length limit at zoom 1.
	pub label_chars: usize,
	/// Bounds on the label length limit across all zoom levels.
	pub label_chars_range: (usize, usize),
	/// Glyph size relative to the node radius.
	pub glyph_ratio: f64,
}

/// Edge and edge label scaling.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Relationship label visibility.
	pub label_alpha: AlphaBehavior,
	/// Edge label font size in screen pixels.
	pub label_size: f64,
}

/// Selection and hover ring sizing.
#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	/// Stroke width in screen pixels.
	pub width: f64,
	/// Gap between node edge and ring in screen pixels.
	pub offset: f64,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub edge: EdgeScaleConfig,
	pub ring: RingScaleConfig,
}

impl ScaleConfig {
	/// World-space radius of a node body of base `size` at zoom `k`.
	pub fn node_radius(&self, size: f64, k: f64) -> f64 {
		self.node.radius_behavior.apply(size, k)
	}
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius_behavior: ScaleBehavior::Clamped {
					min_k: 0.8,
					max_k: 2.5,
				},
				label_size: 11.0,
				label_alpha: AlphaBehavior::Fade {
					zero_alpha_k: 0.5,
					full_alpha_k: 0.8,
				},
				label_chars: 18,
				label_chars_range: (8, 40),
				glyph_ratio: 0.9,
			},
			edge: EdgeScaleConfig {
				label_alpha: AlphaBehavior::Fade {
					zero_alpha_k: 1.2,
					full_alpha_k: 1.5,
				},
				label_size: 9.0,
			},
			ring: RingScaleConfig {
				width: 2.0,
				offset: 3.0,
			},
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	/// World-space radius multiplier applied to a node's `size`,
	/// `clamp(k, 0.8, 2.5)` by default.
	pub node_radius_mult: f64,
	/// Label alpha multiplier. Zero means labels are skipped.
	pub label_alpha: f64,
	/// Maximum label length before truncation.
	pub label_max_chars: usize,
	/// Label font in world-space pixels.
	pub label_font: String,
	/// Label font size in world-space.
	pub label_font_size: f64,
	/// Glyph size relative to the drawn node radius.
	pub glyph_ratio: f64,
	/// One screen pixel in world-space.
	pub pixel: f64,
	/// Edge label alpha multiplier. Zero means edge labels are skipped.
	pub edge_label_alpha: f64,
	/// Edge label font in world-space pixels.
	pub edge_label_font: String,
	/// Ring width in world-space.
	pub ring_width: f64,
	/// Ring offset in world-space.
	pub ring_offset: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let k = if k.is_finite() && k > 0.0 { k } else { 1.0 };
		let font_family = "sans-serif";
		let label_font_size = config.node.label_size / k;
		let edge_font_size = config.edge.label_size / k;
		let (min_chars, max_chars) = config.node.label_chars_range;
		let label_max_chars = ((config.node.label_chars as f64 * k).round() as usize)
			.clamp(min_chars, max_chars.max(min_chars));

		Self {
			k,
			node_radius_mult: config.node_radius(1.0, k),
			label_alpha: config.node.label_alpha.apply(k),
			label_max_chars,
			label_font: format!("{}px {}", label_font_size, font_family),
			label_font_size,
			glyph_ratio: config.node.glyph_ratio,
			pixel: 1.0 / k,
			edge_label_alpha: config.edge.label_alpha.apply(k),
			edge_label_font: format!("{}px {}", edge_font_size, font_family),
			ring_width: config.ring.width / k,
			ring_offset: config.ring.offset / k,
		}
	}

	pub fn show_labels(&self) -> bool {
		self.label_alpha > 0.0
	}

	pub fn show_edge_labels(&self) -> bool {
		self.edge_label_alpha > 0.0
	}

	/// Font for a node glyph drawn inside a body of world radius `radius`.
	pub fn glyph_font(&self, radius: f64) -> String {
		format!("{}px sans-serif", (radius * self.glyph_ratio).max(self.pixel))
	}
}

/// Shortens `label` to at most `max_chars` characters, ending in an ellipsis
/// when anything was cut.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
	if label.chars().count() <= max_chars {
		return label.to_string();
	}
	let keep = max_chars.saturating_sub(1);
	let mut out: String = label.chars().take(keep).collect();
	out.push('…');
	out
}
