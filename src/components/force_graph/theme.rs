//! Visual theming for the knowledge graph.
//!
//! Node and edge styling is keyed by the closed [`NodeKind`] and [`EdgeKind`]
//! enums, so every kind has an entry checked at compile time.

use super::model::{EdgeKind, NodeKind};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parses a CSS color string.
	/// Supports hex (`#RGB`, `#RRGGBB`) and `rgb()`/`rgba()` functional notation.
	pub fn parse(color_str: &str) -> Option<Self> {
		let s = color_str.trim();
		if let Some(hex) = s.strip_prefix('#') {
			let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
			return match hex.len() {
				6 => Some(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
				3 => {
					let short = |i: usize| channel(i..i + 1).map(|v| v * 17);
					Some(Color::rgb(short(0)?, short(1)?, short(2)?))
				}
				_ => None,
			};
		}
		if s.starts_with("rgb") {
			let nums: Vec<&str> = s
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.collect();
			let r = nums.first()?.trim().parse().ok()?;
			let g = nums.get(1)?.trim().parse().ok()?;
			let b = nums.get(2)?.trim().parse().ok()?;
			let a = match nums.get(3) {
				Some(a) => a.trim().parse::<f64>().ok()?.clamp(0.0, 1.0),
				None => 1.0,
			};
			return Some(Color::rgba(r, g, b, a));
		}
		None
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Three-tone palette for one node kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindPalette {
	/// Body color.
	pub primary: Color,
	/// Gradient rim and border end color.
	pub secondary: Color,
	/// Glow and border start color.
	pub accent: Color,
}

impl KindPalette {
	const fn new(primary: Color, secondary: Color, accent: Color) -> Self {
		Self {
			primary,
			secondary,
			accent,
		}
	}

	/// Palette for a node kind. `Unknown` carries the default palette.
	pub fn for_kind(kind: NodeKind) -> Self {
		match kind {
			NodeKind::Document => Self::new(
				Color::rgb(0, 255, 136),
				Color::rgb(0, 170, 90),
				Color::rgb(160, 255, 210),
			),
			NodeKind::Person => Self::new(
				Color::rgb(79, 172, 254),
				Color::rgb(0, 120, 220),
				Color::rgb(180, 220, 255),
			),
			NodeKind::Department => Self::new(
				Color::rgb(255, 159, 67),
				Color::rgb(210, 110, 20),
				Color::rgb(255, 210, 160),
			),
			NodeKind::Project => Self::new(
				Color::rgb(254, 202, 87),
				Color::rgb(220, 160, 30),
				Color::rgb(255, 235, 170),
			),
			NodeKind::Technology => Self::new(
				Color::rgb(179, 71, 217),
				Color::rgb(120, 30, 160),
				Color::rgb(225, 170, 245),
			),
			NodeKind::Process => Self::new(
				Color::rgb(72, 219, 251),
				Color::rgb(10, 160, 200),
				Color::rgb(180, 240, 255),
			),
			NodeKind::Location => Self::new(
				Color::rgb(255, 107, 107),
				Color::rgb(200, 50, 50),
				Color::rgb(255, 190, 190),
			),
			NodeKind::Product => Self::new(
				Color::rgb(29, 209, 161),
				Color::rgb(10, 150, 110),
				Color::rgb(160, 245, 220),
			),
			NodeKind::Vendor => Self::new(
				Color::rgb(200, 214, 229),
				Color::rgb(130, 150, 170),
				Color::rgb(235, 242, 250),
			),
			NodeKind::Entity => Self::new(
				Color::rgb(179, 71, 217),
				Color::rgb(110, 40, 150),
				Color::rgb(230, 180, 250),
			),
			NodeKind::Insight => Self::new(
				Color::rgb(255, 107, 157),
				Color::rgb(200, 50, 110),
				Color::rgb(255, 190, 215),
			),
			NodeKind::Query => Self::new(
				Color::rgb(255, 234, 167),
				Color::rgb(225, 180, 60),
				Color::rgb(255, 250, 225),
			),
			NodeKind::Unknown => Self::new(
				Color::rgb(136, 136, 136),
				Color::rgb(90, 90, 90),
				Color::rgb(200, 200, 200),
			),
		}
	}
}

/// Stroke color and dash pattern for one edge kind.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: Color,
	/// Dash lengths in screen pixels. Empty means solid.
	pub dash: &'static [f64],
}

impl EdgeStyle {
	pub fn for_kind(kind: EdgeKind) -> Self {
		match kind {
			EdgeKind::Hierarchical => Self {
				color: Color::rgb(255, 107, 157),
				dash: &[],
			},
			EdgeKind::Collaborative => Self {
				color: Color::rgb(0, 255, 136),
				dash: &[5.0, 5.0],
			},
			EdgeKind::Technical => Self {
				color: Color::rgb(179, 71, 217),
				dash: &[],
			},
			EdgeKind::Geographic => Self {
				color: Color::rgb(255, 159, 67),
				dash: &[10.0, 5.0],
			},
			EdgeKind::Temporal => Self {
				color: Color::rgb(254, 202, 87),
				dash: &[2.0, 3.0],
			},
			EdgeKind::General => Self {
				color: Color::rgb(79, 172, 254),
				dash: &[],
			},
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for the radial gradient center
	pub color_secondary: Color,
}

/// Node effect strengths.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Alpha of the outer halo pass.
	pub outer_halo_alpha: f64,
	/// Alpha of the inner halo pass.
	pub inner_halo_alpha: f64,
	/// Halo radii as multiples of the node radius (outer, inner).
	pub halo_scale: (f64, f64),
	/// Alpha of the pseudo-3D highlight spot.
	pub highlight_alpha: f64,
	/// Border width in screen pixels.
	pub border_width: f64,
	/// Alpha applied to nodes outside the hover neighbourhood.
	pub dim_alpha: f64,
}

/// Edge effect strengths.
#[derive(Clone, Debug)]
pub struct EdgeGlowStyle {
	/// Glow alpha (0.0 disables the glow pass).
	pub glow_intensity: f64,
	/// Glow width as a multiple of the stroke width.
	pub glow_width: f64,
	/// Alpha of the main stroke.
	pub alpha: f64,
}

/// Label text and plate colors.
#[derive(Clone, Debug)]
pub struct LabelStyle {
	pub text: Color,
	pub plate: Color,
	pub edge_text: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: BackgroundStyle,
	pub node: NodeStyle,
	pub edge: EdgeGlowStyle,
	pub label: LabelStyle,
	/// Ring drawn around the selected node.
	pub selection_ring: Color,
}

impl Theme {
	/// Dark neon theme (default)
	pub fn neon() -> Self {
		Self {
			background: BackgroundStyle {
				color: Color::rgb(10, 14, 26),
				color_secondary: Color::rgb(22, 28, 48),
			},
			node: NodeStyle {
				outer_halo_alpha: 0.12,
				inner_halo_alpha: 0.25,
				halo_scale: (2.2, 1.5),
				highlight_alpha: 0.55,
				border_width: 1.5,
				dim_alpha: 0.3,
			},
			edge: EdgeGlowStyle {
				glow_intensity: 0.2,
				glow_width: 3.0,
				alpha: 0.8,
			},
			label: LabelStyle {
				text: Color::rgb(255, 255, 255),
				plate: Color::rgba(0, 0, 0, 0.7),
				edge_text: Color::rgba(255, 255, 255, 0.75),
			},
			selection_ring: Color::rgb(255, 255, 255),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::neon()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_and_functional_colors() {
		assert_eq!(Color::parse("#00ff88"), Some(Color::rgb(0, 255, 136)));
		assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
		assert_eq!(
			Color::parse("rgba(10, 20, 30, 0.5)"),
			Some(Color::rgba(10, 20, 30, 0.5))
		);
		assert_eq!(Color::parse("rgb(1,2,3)"), Some(Color::rgb(1, 2, 3)));
	}

	#[test]
	fn rejects_garbage_colors() {
		assert_eq!(Color::parse("#12"), None);
		assert_eq!(Color::parse("#gggggg"), None);
		assert_eq!(Color::parse("chartreuse"), None);
		assert_eq!(Color::parse("rgb(1, 2)"), None);
	}

	#[test]
	fn css_output_drops_opaque_alpha() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(
			Color::rgba(1, 2, 3, 0.25).to_css(),
			"rgba(1, 2, 3, 0.25)"
		);
	}

	#[test]
	fn unknown_kind_uses_the_default_palette() {
		let unknown = KindPalette::for_kind(NodeKind::Unknown);
		assert_eq!(unknown.primary, Color::rgb(136, 136, 136));
		assert_ne!(KindPalette::for_kind(NodeKind::Document), unknown);
	}

	#[test]
	fn edge_dash_patterns_follow_kind() {
		assert!(EdgeStyle::for_kind(EdgeKind::Hierarchical).dash.is_empty());
		assert_eq!(EdgeStyle::for_kind(EdgeKind::Collaborative).dash, &[5.0, 5.0]);
		assert_eq!(EdgeStyle::for_kind(EdgeKind::Geographic).dash, &[10.0, 5.0]);
		assert_eq!(EdgeStyle::for_kind(EdgeKind::Temporal).dash, &[2.0, 3.0]);
		assert!(EdgeStyle::for_kind(EdgeKind::General).dash.is_empty());
	}
}
