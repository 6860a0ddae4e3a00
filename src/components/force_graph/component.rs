//! Leptos component wrapping the knowledge graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for selection, node dragging, panning, and zooming. An animation
//! loop runs via `requestAnimationFrame`: each frame advances the layout once,
//! paints the frame once, then forwards queued events to the host.
//!
//! Graph fetches run on the local task queue and never block the loop; the
//! previous snapshot (initially the demonstration graph) stays on screen
//! until a response for the latest query arrives.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::canvas;
use super::events::GraphEvent;
use super::fallback::demo_snapshot;
use super::layout::{LayoutConfig, LayoutEngine};
use super::loader::{GraphLoader, HttpGraphSource};
use super::model::Node;
use super::render;
use super::state::ForceGraphState;
use super::theme::Theme;

/// Backend used when the host does not name one.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Nominal frame time fed to highlight animation.
const FRAME_DT: f64 = 0.016;

/// Bundles graph state with its color theme.
struct GraphContext {
	state: ForceGraphState,
	theme: Theme,
}

/// Host callbacks. Invoked outside any borrow of the graph context.
#[derive(Clone, Copy, Default)]
struct GraphCallbacks {
	on_node_select: Option<Callback<Option<Node>>>,
	on_visible_nodes: Option<Callback<Vec<Node>>>,
	on_zoom: Option<Callback<f64>>,
}

impl GraphCallbacks {
	fn dispatch(&self, events: Vec<GraphEvent>) {
		for event in events {
			match event {
				GraphEvent::VisibleNodesChanged(nodes) => {
					if let Some(cb) = self.on_visible_nodes {
						cb.run(nodes);
					}
				}
				GraphEvent::NodeSelected(selection) => {
					if let Some(cb) = self.on_node_select {
						cb.run(selection);
					}
				}
				GraphEvent::ZoomChanged(k) => {
					if let Some(cb) = self.on_zoom {
						cb.run(k);
					}
				}
			}
		}
	}
}

fn build_engine(config: LayoutConfig) -> LayoutEngine {
	LayoutEngine::new(config).unwrap_or_else(|e| {
		error!("kg-canvas: invalid layout config ({}), using defaults", e);
		LayoutEngine::default()
	})
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders an interactive knowledge graph on a canvas element.
///
/// The graph for `query` is fetched from `api_base` whenever the query
/// changes; with `use_remote = false` the demonstration graph is shown
/// instead. `relevant_ids` narrows the display to a subset of nodes without
/// re-fetching; `None` or an empty list shows everything.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize automatically with the
/// window. Explicit `width`/`height` override automatic sizing.
#[component]
pub fn KnowledgeGraphCanvas(
	#[prop(into)] query: Signal<String>,
	#[prop(into, default = Signal::stored(None))] relevant_ids: Signal<Option<Vec<String>>>,
	#[prop(into, default = DEFAULT_API_BASE.to_string())] api_base: String,
	#[prop(default = true)] use_remote: bool,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] layout: Option<LayoutConfig>,
	#[prop(optional, into)] on_node_select: Option<Callback<Option<Node>>>,
	#[prop(optional, into)] on_visible_nodes: Option<Callback<Vec<Node>>>,
	#[prop(optional, into)] on_zoom: Option<Callback<f64>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let callbacks = GraphCallbacks {
		on_node_select,
		on_visible_nodes,
		on_zoom,
	};

	let context = Rc::new(RefCell::new(GraphContext {
		state: ForceGraphState::new(
			demo_snapshot(),
			build_engine(layout.unwrap_or_default()),
			width.unwrap_or(800.0),
			height.unwrap_or(600.0),
		),
		theme: Theme::default(),
	}));
	let loader = Rc::new(GraphLoader::new(HttpGraphSource::new(api_base)));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let (context_query, loader_query) = (context.clone(), loader.clone());
	Effect::new(move |_| {
		let query = query.get();
		if !use_remote {
			debug!("kg-canvas: remote loading disabled, keeping demo graph");
			return;
		}
		let ticket = loader_query.begin();
		let (context, loader) = (context_query.clone(), loader_query.clone());
		spawn_local(async move {
			if let Some(snapshot) = loader.resolve(ticket, &query).await {
				context.borrow_mut().state.set_snapshot(snapshot);
			}
		});
	});

	let context_relevance = context.clone();
	Effect::new(move |_| {
		let ids = relevant_ids.get();
		context_relevance.borrow_mut().state.set_relevance(ids);
	});

	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			error!("kg-canvas: no window, canvas stays blank");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_width() as f64)
						.filter(|w| *w > 0.0)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_height() as f64)
						.filter(|h| *h > 0.0)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		context_init.borrow_mut().state.resize(w, h);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				error!("kg-canvas: 2d canvas context unavailable");
				return;
			}
		};

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				context_resize.borrow_mut().state.resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let events = {
				let mut c = context_anim.borrow_mut();
				c.state.tick(FRAME_DT);
				let commands = render::paint(&c.state.frame(), &c.state.scale, &c.theme);
				canvas::replay(&ctx, &commands);
				c.state.drain_events()
			};
			callbacks.dispatch(events);

			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			context_md.borrow_mut().state.pointer_down(x, y);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			context_mm.borrow_mut().state.pointer_move(x, y);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		context_mu.borrow_mut().state.pointer_up();
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		context_ml.borrow_mut().state.pointer_leave();
	};

	let context_wh = context;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			context_wh.borrow_mut().state.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="knowledge-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
