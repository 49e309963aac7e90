//! bom-graph-viz: interactive BOM dependency graph viewer.
//!
//! Fetches a Gephi-formatted JSON document describing software components
//! and their relationships, adapts it into renderable node/edge records, and
//! draws it as a force-directed graph with click-to-inspect details.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};

pub mod components;
pub mod graph;

pub use components::force_graph::{CanvasHandle, GraphCanvas, PhysicsConfig, Theme};
pub use graph::{GephiOptions, GraphStore, GraphView, Selection};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("bom-graph-viz: logging initialized");
}

/// Resolve the graph document path: the fixed default with the page's query
/// string appended verbatim, so a URL can select a different graph file.
fn graph_path() -> String {
	let search = web_sys::window()
		.and_then(|w| w.location().search().ok())
		.unwrap_or_default();
	format!("data/graph.json{search}")
}

/// Main application component.
///
/// Owns the page session's [`GraphView`], issues the first load, and lays
/// out the canvas next to the details panel.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let handle = CanvasHandle::new();
	let view = Rc::new(RefCell::new(GraphView::new(
		handle.clone(),
		GephiOptions::default(),
	)));
	let details = view.borrow().details();

	graph::view::spawn_load(view.clone(), graph_path());

	// The view lives on the main thread only, so the callback must too.
	let select_view = view.clone();
	let on_select = UnsyncCallback::new(move |selection: Selection| {
		select_view.borrow().on_select(&selection);
	});

	let relayout_view = view.clone();
	let on_relayout = move |_| {
		if !relayout_view.borrow_mut().reload() {
			info!("no graph loaded yet, nothing to re-layout");
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="BOM Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="graph-page" style="display: flex; height: 100vh;">
			<div class="graph-area" style="flex: 1 1 auto; min-width: 0;">
				<GraphCanvas handle=handle on_select=on_select />
				<button class="relayout" on:click=on_relayout>
					"Re-layout"
				</button>
			</div>
			<aside class="graph-details" style="flex: 0 0 20rem; overflow: auto;">
				<pre>{move || details.content().get()}</pre>
			</aside>
		</div>
	}
}
