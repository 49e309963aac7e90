//! Load→render orchestration and selection handling.
//!
//! `GraphView` is the one object a page session owns: it holds the store, the
//! loader, the adapter options, a handle to the rendering surface, and the
//! details panel. The rendering surface stays behind a trait so the whole
//! pipeline runs (and is tested) without a browser.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};

use super::gephi::{self, GephiOptions, ParsedGraph};
use super::loader::{self, GraphLoader, LoadError, LoadToken};
use super::store::{ElementId, GraphStore};

/// Neutral prompt shown when nothing is selected.
pub const DETAILS_PROMPT: &str = "Click a node or edge to view details";

/// Fixed message shown for any failed load, transport or parse alike.
pub const LOAD_FAILED: &str = "Failed to load graph.";

/// The rendering engine as seen by the view controller: it can rebuild its
/// scene from the store and re-fit the viewport to the graph extents.
pub trait RenderSurface {
	/// Replace the rendered scene with the store's current contents.
	fn rebuild(&self, store: &GraphStore);
	/// Recenter and rescale the viewport so the whole graph is visible.
	fn fit(&self);
}

/// Element ids reported under the cursor by one click, nodes and edges apart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
	/// Selected node ids, most specific first.
	pub nodes: Vec<ElementId>,
	/// Selected edge ids, most specific first.
	pub edges: Vec<ElementId>,
}

impl Selection {
	/// A selection containing a single node.
	pub fn node(id: ElementId) -> Self {
		Self {
			nodes: vec![id],
			..Self::default()
		}
	}

	/// A selection containing a single edge.
	pub fn edge(id: ElementId) -> Self {
		Self {
			edges: vec![id],
			..Self::default()
		}
	}
}

/// Passive text sink for the currently selected element's attributes.
///
/// Content is a reactive signal so the panel markup re-renders on `show`;
/// the latest call always wins.
#[derive(Clone, Copy, Debug)]
pub struct DetailsPanel {
	content: RwSignal<String>,
}

impl DetailsPanel {
	/// Create a panel showing the neutral prompt.
	pub fn new() -> Self {
		Self {
			content: RwSignal::new(DETAILS_PROMPT.to_owned()),
		}
	}

	/// Replace the panel content.
	pub fn show(&self, content: &str) {
		self.content.set(content.to_owned());
	}

	/// The reactive content signal, for rendering.
	pub fn content(&self) -> RwSignal<String> {
		self.content
	}

	/// Current content without subscribing, for assertions and logging.
	pub fn text(&self) -> String {
		self.content.get_untracked()
	}
}

impl Default for DetailsPanel {
	fn default() -> Self {
		Self::new()
	}
}

/// Owns the graph session: store, loader, adapter options, rendering surface
/// handle, and details panel.
pub struct GraphView<R: RenderSurface> {
	store: GraphStore,
	loader: GraphLoader,
	options: GephiOptions,
	surface: R,
	details: DetailsPanel,
}

impl<R: RenderSurface> GraphView<R> {
	/// Create a view with an empty store.
	pub fn new(surface: R, options: GephiOptions) -> Self {
		Self {
			store: GraphStore::new(),
			loader: GraphLoader::new(),
			options,
			surface,
			details: DetailsPanel::new(),
		}
	}

	/// The store currently backing the rendered graph.
	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	/// The details panel, shared with the page markup.
	pub fn details(&self) -> DetailsPanel {
		self.details
	}

	/// Issue a token for a new load attempt, superseding in-flight ones.
	pub fn begin_load(&mut self) -> LoadToken {
		self.loader.begin()
	}

	/// Resolve a load attempt with the fetch outcome.
	///
	/// A stale response is discarded without touching anything, whether it
	/// succeeded or failed. A current transport or parse failure shows the
	/// fixed failure message and leaves the store and the retained snapshot
	/// untouched. Success atomically replaces the store contents, resets the
	/// details panel, and re-fits the view.
	pub fn finish_load(&mut self, token: LoadToken, fetched: Result<String, LoadError>) {
		if !self.loader.is_current(token) {
			debug!("discarding superseded graph response");
			return;
		}
		let outcome = fetched.and_then(|body| {
			let document = self.loader.commit(token, &body)?;
			let parsed = gephi::parse(&document, &self.options)?;
			self.loader.retain(document);
			Ok(parsed)
		});
		match outcome {
			Ok(parsed) => self.install(parsed),
			Err(LoadError::Stale) => debug!("discarding superseded graph response"),
			Err(err) => self.fail(&err),
		}
	}

	/// Re-run adaptation on the retained snapshot without refetching.
	///
	/// Returns false when no load has ever succeeded.
	pub fn reload(&mut self) -> bool {
		let outcome = match self.loader.snapshot() {
			None => return false,
			Some(document) => gephi::parse(document, &self.options),
		};
		match outcome {
			Ok(parsed) => {
				self.install(parsed);
				true
			}
			Err(err) => {
				self.fail(&LoadError::Parse(err));
				false
			}
		}
	}

	fn install(&mut self, parsed: ParsedGraph) {
		info!(
			"graph loaded: {} nodes, {} edges",
			parsed.nodes.len(),
			parsed.edges.len()
		);
		self.store.clear();
		self.store.add_nodes(parsed.nodes);
		self.store.add_edges(parsed.edges);
		self.details.show(DETAILS_PROMPT);
		self.surface.rebuild(&self.store);
		self.surface.fit();
	}

	fn fail(&mut self, err: &LoadError) {
		warn!("graph load failed: {err}");
		self.details.show(LOAD_FAILED);
	}

	/// Apply a selection reported by the rendering engine.
	///
	/// Exactly the first selected node wins; otherwise the first selected
	/// edge; an empty selection resets the panel to the neutral prompt.
	pub fn on_select(&self, selection: &Selection) {
		let shown = if let Some(id) = selection.nodes.first() {
			self.store.node(id).map(|n| pretty_attributes(&n.attributes))
		} else if let Some(id) = selection.edges.first() {
			self.store.edge(id).map(|e| pretty_attributes(&e.attributes))
		} else {
			None
		};
		match shown {
			Some(text) => self.details.show(&text),
			None => self.details.show(DETAILS_PROMPT),
		}
	}
}

/// Pretty-print an attribute bag for the details panel.
pub fn pretty_attributes(attributes: &super::store::AttributeBag) -> String {
	serde_json::to_string_pretty(attributes).unwrap_or_default()
}

/// Fetch `path` and hand the outcome to the view, discarding stale responses.
pub fn spawn_load<R: RenderSurface + 'static>(view: Rc<RefCell<GraphView<R>>>, path: String) {
	let token = view.borrow_mut().begin_load();
	wasm_bindgen_futures::spawn_local(async move {
		let fetched = loader::fetch_text(&path).await;
		view.borrow_mut().finish_load(token, fetched);
	});
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	/// Counts surface calls instead of drawing anything.
	#[derive(Clone, Default)]
	struct MockSurface {
		rebuilds: Rc<Cell<usize>>,
		fits: Rc<Cell<usize>>,
	}

	impl RenderSurface for MockSurface {
		fn rebuild(&self, _store: &GraphStore) {
			self.rebuilds.set(self.rebuilds.get() + 1);
		}

		fn fit(&self) {
			self.fits.set(self.fits.get() + 1);
		}
	}

	fn view() -> GraphView<MockSurface> {
		GraphView::new(MockSurface::default(), GephiOptions::default())
	}

	fn load(view: &mut GraphView<MockSurface>, body: &str) {
		let token = view.begin_load();
		view.finish_load(token, Ok(body.to_owned()));
	}

	const SMALL: &str =
		r#"{"nodes":[{"id":"a"},{"id":"b"}],"edges":[{"id":"e1","source":"a","target":"b"}]}"#;

	#[test]
	fn successful_load_populates_store_and_fits() {
		let mut view = view();
		load(&mut view, SMALL);

		assert_eq!(view.store().node_count(), 2);
		assert_eq!(view.store().edge_count(), 1);
		let edge = view.store().edge(&"e1".into()).unwrap();
		assert_eq!(edge.source, "a".into());
		assert_eq!(edge.target, "b".into());
		assert_eq!(view.surface.rebuilds.get(), 1);
		assert_eq!(view.surface.fits.get(), 1);
		assert_eq!(view.details().text(), DETAILS_PROMPT);
	}

	#[test]
	fn reloading_the_same_document_is_idempotent() {
		let mut view = view();
		load(&mut view, SMALL);
		load(&mut view, SMALL);

		assert_eq!(view.store().node_count(), 2);
		assert_eq!(view.store().edge_count(), 1);
		assert!(view.store().node(&"a".into()).is_some());
	}

	#[test]
	fn transport_failure_leaves_store_untouched() {
		let mut view = view();
		let token = view.begin_load();
		view.finish_load(
			token,
			Err(LoadError::Transport {
				status: Some(404),
				message: "Not Found".into(),
			}),
		);

		assert!(view.store().is_empty());
		assert_eq!(view.details().text(), LOAD_FAILED);
		assert_eq!(view.surface.rebuilds.get(), 0);
	}

	#[test]
	fn malformed_edge_commits_nothing() {
		let mut view = view();
		load(&mut view, SMALL);
		load(
			&mut view,
			r#"{"nodes":[{"id":"c"}],"edges":[{"id":"e2"}]}"#,
		);

		// The bad document replaced nothing: previous load still visible.
		assert_eq!(view.details().text(), LOAD_FAILED);
		assert_eq!(view.store().node_count(), 2);
		assert!(view.store().node(&"c".into()).is_none());
	}

	#[test]
	fn stale_response_is_discarded_silently() {
		let mut view = view();
		let first = view.begin_load();
		let second = view.begin_load();
		view.finish_load(second, Ok(SMALL.to_owned()));
		view.finish_load(first, Ok(r#"{"nodes":[{"id":"old"}]}"#.to_owned()));

		assert_eq!(view.store().node_count(), 2);
		assert!(view.store().node(&"old".into()).is_none());
		assert_eq!(view.details().text(), DETAILS_PROMPT);
	}

	#[test]
	fn late_failure_of_a_superseded_load_is_discarded() {
		let mut view = view();
		let first = view.begin_load();
		let second = view.begin_load();
		view.finish_load(second, Ok(SMALL.to_owned()));
		// The older request's 404 arrives after the newer load rendered.
		view.finish_load(
			first,
			Err(LoadError::Transport {
				status: Some(404),
				message: "Not Found".into(),
			}),
		);

		assert_eq!(view.details().text(), DETAILS_PROMPT);
		assert_eq!(view.store().node_count(), 2);
		assert_eq!(view.surface.rebuilds.get(), 1);
	}

	#[test]
	fn reload_reuses_the_retained_snapshot() {
		let mut view = view();
		assert!(!view.reload());

		load(&mut view, SMALL);
		let token = view.begin_load();
		view.finish_load(token, Err(LoadError::Transport {
			status: None,
			message: "connection refused".into(),
		}));
		assert_eq!(view.details().text(), LOAD_FAILED);

		assert!(view.reload());
		assert_eq!(view.store().node_count(), 2);
		assert_eq!(view.details().text(), DETAILS_PROMPT);
		assert_eq!(view.surface.fits.get(), 2);
	}

	#[test]
	fn selecting_a_node_shows_its_attributes() {
		let mut view = view();
		load(
			&mut view,
			r#"{"nodes":[{"id":"n1","name":"libfoo","version":"1.2"}]}"#,
		);

		view.on_select(&Selection::node("n1".into()));
		let expected =
			serde_json::to_string_pretty(&json!({"name": "libfoo", "version": "1.2"})).unwrap();
		assert_eq!(view.details().text(), expected);
	}

	#[test]
	fn first_selected_node_wins_over_edges() {
		let mut view = view();
		load(
			&mut view,
			r#"{"nodes":[{"id":"a","kind":"first"},{"id":"b","kind":"second"}],
			    "edges":[{"id":"e1","source":"a","target":"b","rel":"dep"}]}"#,
		);

		let selection = Selection {
			nodes: vec!["a".into(), "b".into()],
			edges: vec!["e1".into()],
		};
		view.on_select(&selection);
		assert_eq!(
			view.details().text(),
			serde_json::to_string_pretty(&json!({"kind": "first"})).unwrap()
		);
	}

	#[test]
	fn empty_selection_resets_the_prompt() {
		let mut view = view();
		load(&mut view, SMALL);
		view.on_select(&Selection::node("a".into()));
		view.on_select(&Selection::default());
		assert_eq!(view.details().text(), DETAILS_PROMPT);
	}

	#[test]
	fn unknown_id_falls_back_to_the_prompt() {
		let mut view = view();
		load(&mut view, SMALL);
		view.on_select(&Selection::node("nope".into()));
		assert_eq!(view.details().text(), DETAILS_PROMPT);
	}
}
