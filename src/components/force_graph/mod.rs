//! Knowledge graph visualization component.
//!
//! Renders an interactive force-directed knowledge graph on an HTML canvas:
//! - Tolerant normalization of backend payloads with a built-in fallback graph
//! - Relevance filtering of the displayed nodes without re-fetching
//! - Force-directed layout with charge, links, collision and centering
//! - Pan, zoom, node dragging, hover highlighting and click selection
//! - Kind-based styling with zoom-adaptive labels
//!
//! # Example
//!
//! ```ignore
//! use knowledge_graph_canvas::KnowledgeGraphCanvas;
//!
//! let (query, _set_query) = signal(String::from("data privacy"));
//! let (relevant, _set_relevant) = signal(None::<Vec<String>>);
//!
//! view! {
//!     <KnowledgeGraphCanvas
//!         query=query
//!         relevant_ids=relevant
//!         on_node_select=Callback::new(|node| log::info!("{:?}", node))
//!         fullscreen=true
//!     />
//! }
//! ```

mod canvas;
mod component;
pub mod draw;
pub mod events;
mod fallback;
pub mod filter;
pub mod layout;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod render;
pub mod scale;
mod state;
pub mod theme;
mod types;

pub use component::{DEFAULT_API_BASE, KnowledgeGraphCanvas};
pub use fallback::demo_snapshot;
pub use layout::{ConfigError, LayoutConfig, LayoutEngine};
pub use loader::{FetchError, GraphSource, HttpGraphSource, QuerySequencer, fetch_relevant_ids};
pub use model::{Edge, EdgeKind, Node, NodeKind, Snapshot};
pub use theme::Theme;
