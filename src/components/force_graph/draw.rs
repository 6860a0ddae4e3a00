//! Backend-independent drawing commands.
//!
//! The renderer emits a flat list of [`DrawCommand`]s; [`super::canvas`]
//! replays them onto a 2D canvas context. Keeping the two apart lets frames be
//! inspected in native tests.

use super::theme::Color;

/// A radial gradient between two circles with color stops in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
	pub x0: f64,
	pub y0: f64,
	pub r0: f64,
	pub x1: f64,
	pub y1: f64,
	pub r1: f64,
	pub stops: Vec<(f64, Color)>,
}

/// Fill or stroke paint.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
	Solid(Color),
	Radial(RadialGradient),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
	Top,
	Middle,
}

impl TextBaseline {
	pub fn as_css(self) -> &'static str {
		match self {
			TextBaseline::Top => "top",
			TextBaseline::Middle => "middle",
		}
	}
}

/// One drawing operation. Coordinates are in whatever space the current
/// transform establishes.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
	Save,
	Restore,
	/// Translate by `(x, y)`, then scale uniformly by `k`.
	Transform { x: f64, y: f64, k: f64 },
	/// Global alpha for subsequent commands.
	SetAlpha(f64),
	FillRect {
		x: f64,
		y: f64,
		width: f64,
		height: f64,
		paint: Paint,
	},
	FillCircle {
		x: f64,
		y: f64,
		radius: f64,
		paint: Paint,
	},
	StrokeCircle {
		x: f64,
		y: f64,
		radius: f64,
		paint: Paint,
		width: f64,
	},
	Line {
		x1: f64,
		y1: f64,
		x2: f64,
		y2: f64,
		color: Color,
		width: f64,
		/// Dash lengths; empty means solid.
		dash: Vec<f64>,
	},
	/// Horizontally centered on `x`.
	Text {
		text: String,
		x: f64,
		y: f64,
		font: String,
		color: Color,
		baseline: TextBaseline,
	},
}
