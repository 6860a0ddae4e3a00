//! Replays [`DrawCommand`]s onto a browser 2D canvas context.

use std::f64::consts::PI;

use log::debug;
use wasm_bindgen::JsValue;
use web_sys::{CanvasGradient, CanvasRenderingContext2d};

use super::draw::{DrawCommand, Paint, RadialGradient};

/// Executes every command in order. Canvas API failures are logged and the
/// offending command skipped; the rest of the frame still draws.
pub fn replay(ctx: &CanvasRenderingContext2d, commands: &[DrawCommand]) {
	for command in commands {
		if let Err(e) = execute(ctx, command) {
			debug!("kg-canvas: canvas call failed: {:?}", e);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn execute(ctx: &CanvasRenderingContext2d, command: &DrawCommand) -> Result<(), JsValue> {
	match command {
		DrawCommand::Save => ctx.save(),
		DrawCommand::Restore => ctx.restore(),
		DrawCommand::Transform { x, y, k } => {
			ctx.translate(*x, *y)?;
			ctx.scale(*k, *k)?;
		}
		DrawCommand::SetAlpha(alpha) => ctx.set_global_alpha(*alpha),
		DrawCommand::FillRect {
			x,
			y,
			width,
			height,
			paint,
		} => {
			set_fill(ctx, paint)?;
			ctx.fill_rect(*x, *y, *width, *height);
		}
		DrawCommand::FillCircle { x, y, radius, paint } => {
			set_fill(ctx, paint)?;
			ctx.begin_path();
			ctx.arc(*x, *y, *radius, 0.0, 2.0 * PI)?;
			ctx.fill();
		}
		DrawCommand::StrokeCircle {
			x,
			y,
			radius,
			paint,
			width,
		} => {
			set_stroke(ctx, paint)?;
			ctx.set_line_width(*width);
			ctx.set_line_dash(&js_sys::Array::new())?;
			ctx.begin_path();
			ctx.arc(*x, *y, *radius, 0.0, 2.0 * PI)?;
			ctx.stroke();
		}
		DrawCommand::Line {
			x1,
			y1,
			x2,
			y2,
			color,
			width,
			dash,
		} => {
			ctx.set_stroke_style_str(&color.to_css());
			ctx.set_line_width(*width);
			let pattern: js_sys::Array = dash.iter().map(|d| JsValue::from_f64(*d)).collect();
			ctx.set_line_dash(&pattern)?;
			ctx.begin_path();
			ctx.move_to(*x1, *y1);
			ctx.line_to(*x2, *y2);
			ctx.stroke();
		}
		DrawCommand::Text {
			text,
			x,
			y,
			font,
			color,
			baseline,
		} => {
			ctx.set_font(font);
			ctx.set_text_align("center");
			ctx.set_text_baseline(baseline.as_css());
			ctx.set_fill_style_str(&color.to_css());
			ctx.fill_text(text, *x, *y)?;
		}
	}
	Ok(())
}

fn gradient(ctx: &CanvasRenderingContext2d, g: &RadialGradient) -> Result<CanvasGradient, JsValue> {
	let gradient = ctx.create_radial_gradient(g.x0, g.y0, g.r0.max(0.0), g.x1, g.y1, g.r1.max(0.0))?;
	for (offset, color) in &g.stops {
		gradient.add_color_stop(offset.clamp(0.0, 1.0) as f32, &color.to_css())?;
	}
	Ok(gradient)
}

fn set_fill(ctx: &CanvasRenderingContext2d, paint: &Paint) -> Result<(), JsValue> {
	match paint {
		Paint::Solid(color) => ctx.set_fill_style_str(&color.to_css()),
		Paint::Radial(g) => {
			let gradient = gradient(ctx, g)?;
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
	}
	Ok(())
}

fn set_stroke(ctx: &CanvasRenderingContext2d, paint: &Paint) -> Result<(), JsValue> {
	match paint {
		Paint::Solid(color) => ctx.set_stroke_style_str(&color.to_css()),
		Paint::Radial(g) => {
			let gradient = gradient(ctx, g)?;
			#[allow(deprecated)]
			ctx.set_stroke_style(&gradient);
		}
	}
	Ok(())
}
