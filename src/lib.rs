//! knowledge-graph-canvas: Interactive force-directed renderer for enterprise
//! knowledge graphs.
//!
//! This crate provides a WASM-based canvas component that fetches a knowledge
//! graph for a search query, lays it out with a force simulation, and lets the
//! user pan, zoom, drag and select nodes. A relevance list from the search
//! backend narrows the display without re-fetching.

use std::rc::Rc;

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, info, warn};

pub mod components;
pub mod config;

pub use components::force_graph::{
	Edge, EdgeKind, HttpGraphSource, KnowledgeGraphCanvas, Node, NodeKind, QuerySequencer,
	Snapshot, fetch_relevant_ids,
};
pub use config::AppConfig;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("kg-canvas: logging initialized");
}

#[component]
fn NodeDetails(node: Node) -> impl IntoView {
	let has_terms = !node.key_terms.is_empty();
	view! {
		<aside class="node-details">
			<h2>{node.kind.glyph()} " " {node.label.clone()}</h2>
			<p class="node-kind">{node.kind.as_str()} " · " <code>{node.id.clone()}</code></p>
			{node.summary.clone().map(|summary| view! { <p class="node-summary">{summary}</p> })}
			{node
				.content_preview
				.clone()
				.map(|preview| view! { <blockquote class="node-preview">{preview}</blockquote> })}
			{has_terms
				.then(|| {
					view! {
						<ul class="node-terms">
							{node
								.key_terms
								.iter()
								.map(|term| view! { <li>{term.clone()}</li> })
								.collect_view()}
						</ul>
					}
				})}
		</aside>
	}
}

/// Main application component.
/// Reads page configuration, then renders the search bar, the graph canvas
/// and a details panel for the selected node.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = AppConfig::load();
	let use_remote = config.use_remote;
	let (query, set_query) = signal(config.initial_query.clone());
	let (draft, set_draft) = signal(config.initial_query.clone());
	let (relevant, set_relevant) = signal(None::<Vec<String>>);
	let (selected, set_selected) = signal(None::<Node>);
	let (visible_count, set_visible_count) = signal(0usize);
	let (zoom, set_zoom) = signal(1.0_f64);

	let search_source = Rc::new(HttpGraphSource::new(config.api_base.clone()));
	let search_sequencer = Rc::new(QuerySequencer::default());
	let show_all_sequencer = search_sequencer.clone();

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let text = draft.get_untracked().trim().to_string();
		set_query.set(text.clone());
		set_relevant.set(None);
		let ticket = search_sequencer.issue();
		if !use_remote || text.is_empty() {
			return;
		}
		let (source, sequencer) = (search_source.clone(), search_sequencer.clone());
		spawn_local(async move {
			match fetch_relevant_ids(source.as_ref(), &text).await {
				Ok(ids) if sequencer.is_current(ticket) => set_relevant.set(Some(ids)),
				Ok(_) => info!("kg-canvas: ignoring relevance for superseded search {:?}", text),
				Err(e) => warn!("kg-canvas: relevance search failed: {}", e),
			}
		});
	};

	// Invalidates any search still in flight so its result cannot re-apply a filter.
	let on_show_all = move |_| {
		show_all_sequencer.issue();
		set_relevant.set(None);
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Knowledge Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<KnowledgeGraphCanvas
				query=query
				relevant_ids=relevant
				api_base=config.api_base.clone()
				use_remote=use_remote
				fullscreen=true
				on_node_select=Callback::new(move |node: Option<Node>| set_selected.set(node))
				on_visible_nodes=Callback::new(move |nodes: Vec<Node>| {
					set_visible_count.set(nodes.len())
				})
				on_zoom=Callback::new(move |k: f64| set_zoom.set(k))
			/>
			<div class="graph-overlay">
				<h1>"Knowledge Graph"</h1>
				<form class="search" on:submit=on_submit>
					<input
						type="search"
						placeholder="Search documents, people, projects…"
						prop:value=draft
						on:input=move |ev| set_draft.set(event_target_value(&ev))
					/>
					<button type="submit">"Search"</button>
					<button type="button" on:click=on_show_all>
						"Show all"
					</button>
				</form>
				<p class="subtitle">
					{move || {
						format!(
							"{} nodes visible, zoom {:.0}%",
							visible_count.get(),
							zoom.get() * 100.0,
						)
					}}
				</p>
				<p class="subtitle">
					"Click a node for details. Drag nodes to reposition. Scroll to zoom. Drag background to pan."
				</p>
			</div>
			{move || selected.get().map(|node| view! { <NodeDetails node=node /> })}
		</div>
	}
}
