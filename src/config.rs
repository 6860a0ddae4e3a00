//! Page-level configuration.
//!
//! The host page can embed settings as JSON:
//!
//! ```html
//! <script id="kg-config" type="application/json">
//!   { "api_base": "https://kg.example.com", "initial_query": "data privacy" }
//! </script>
//! ```
//!
//! Missing fields take their defaults; a missing or invalid element yields
//! [`AppConfig::default`].

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

use crate::components::force_graph::DEFAULT_API_BASE;

/// Id of the script element holding the configuration.
pub const CONFIG_ELEMENT_ID: &str = "kg-config";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
	/// Base URL of the knowledge graph backend.
	pub api_base: String,
	/// Query shown on first load.
	pub initial_query: String,
	/// Fetch graphs from the backend. When false only the demo graph is shown.
	pub use_remote: bool,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base: DEFAULT_API_BASE.to_string(),
			initial_query: String::new(),
			use_remote: true,
		}
	}
}

impl AppConfig {
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Reads the configuration element from the current document.
	pub fn load() -> Self {
		let Some(text) = config_text() else {
			info!("kg-canvas: no #{} element, using default config", CONFIG_ELEMENT_ID);
			return Self::default();
		};
		match Self::from_json(&text) {
			Ok(config) => {
				info!("kg-canvas: backend at {}", config.api_base);
				config
			}
			Err(e) => {
				warn!("kg-canvas: failed to parse config: {}", e);
				Self::default()
			}
		}
	}
}

fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_fields_take_defaults() {
		let config = AppConfig::from_json(r#"{ "initial_query": "gdpr" }"#).unwrap();
		assert_eq!(config.api_base, "http://localhost:8000");
		assert_eq!(config.initial_query, "gdpr");
		assert!(config.use_remote);
	}

	#[test]
	fn all_fields_are_read() {
		let config = AppConfig::from_json(
			r#"{ "api_base": "https://kg.example.com", "initial_query": "", "use_remote": false }"#,
		)
		.unwrap();
		assert_eq!(config.api_base, "https://kg.example.com");
		assert!(!config.use_remote);
	}

	#[test]
	fn wrong_types_are_rejected() {
		assert!(AppConfig::from_json(r#"{ "use_remote": "yes" }"#).is_err());
	}
}
