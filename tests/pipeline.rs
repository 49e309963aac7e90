//! End-to-end exercise of the load pipeline against a realistic BOM document.

#![allow(unused_crate_dependencies)]

use std::cell::RefCell;
use std::rc::Rc;

use bom_graph_viz::graph::view::{DETAILS_PROMPT, LOAD_FAILED};
use bom_graph_viz::graph::{GephiOptions, GraphStore, GraphView, LoadError, RenderSurface, Selection};
use leptos::prelude::{Callable, UnsyncCallback};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Records surface calls so atomic replacement is observable.
#[derive(Clone, Default)]
struct RecordingSurface {
	calls: Rc<RefCell<Vec<&'static str>>>,
}

impl RenderSurface for RecordingSurface {
	fn rebuild(&self, _store: &GraphStore) {
		self.calls.borrow_mut().push("rebuild");
	}

	fn fit(&self) {
		self.calls.borrow_mut().push("fit");
	}
}

const BOM_DOCUMENT: &str = r#"{
	"nodes": [
		{"id": "project-1", "label": "acme-app", "size": 15,
		 "attributes": {"name": "acme-app", "version": "2.0.0"}},
		{"id": "component-7", "label": "libfoo", "size": 10,
		 "attributes": {"name": "libfoo", "version": "1.2", "license": "MIT"}},
		{"id": "file-42", "size": 5, "attributes": {"path": "lib/libfoo.so"}}
	],
	"edges": [
		{"id": "e1", "source": "project-1", "target": "component-7", "title": "DEPENDS_ON"},
		{"id": "e2", "source": "component-7", "target": "file-42", "title": "DECLARED_BY"}
	]
}"#;

fn load(view: &mut GraphView<RecordingSurface>, body: &str) {
	let token = view.begin_load();
	view.finish_load(token, Ok(body.to_owned()));
}

#[test]
fn bom_document_round_trips_to_selection_details() {
	let surface = RecordingSurface::default();
	let mut view = GraphView::new(surface.clone(), GephiOptions::default());

	load(&mut view, BOM_DOCUMENT);
	assert_eq!(view.store().node_count(), 3);
	assert_eq!(view.store().edge_count(), 2);
	assert_eq!(*surface.calls.borrow(), vec!["rebuild", "fit"]);

	view.on_select(&Selection::node("component-7".into()));
	let expected = serde_json::to_string_pretty(&json!({
		"name": "libfoo",
		"version": "1.2",
		"license": "MIT",
	}))
	.unwrap();
	assert_eq!(view.details().text(), expected);

	view.on_select(&Selection::edge("e1".into()));
	let expected = serde_json::to_string_pretty(&json!({"title": "DEPENDS_ON"})).unwrap();
	assert_eq!(view.details().text(), expected);

	view.on_select(&Selection::default());
	assert_eq!(view.details().text(), DETAILS_PROMPT);
}

#[test]
fn failed_reload_keeps_the_previous_graph_renderable() {
	let surface = RecordingSurface::default();
	let mut view = GraphView::new(surface.clone(), GephiOptions::default());
	load(&mut view, BOM_DOCUMENT);

	// A 404 on reload must not blank the view.
	let token = view.begin_load();
	view.finish_load(
		token,
		Err(LoadError::Transport {
			status: Some(404),
			message: "Not Found".into(),
		}),
	);
	assert_eq!(view.details().text(), LOAD_FAILED);
	assert_eq!(view.store().node_count(), 3);

	// The retained snapshot still re-renders on demand.
	assert!(view.reload());
	assert_eq!(view.details().text(), DETAILS_PROMPT);
	assert_eq!(view.store().node_count(), 3);
	assert_eq!(
		*surface.calls.borrow(),
		vec!["rebuild", "fit", "rebuild", "fit"]
	);
}

#[test]
fn canvas_callback_delivers_selections_to_a_shared_view() {
	// Same wiring as the app shell: the canvas reports clicks through an
	// UnsyncCallback into a view shared behind Rc<RefCell<_>>.
	let view = Rc::new(RefCell::new(GraphView::new(
		RecordingSurface::default(),
		GephiOptions::default(),
	)));
	load(&mut view.borrow_mut(), BOM_DOCUMENT);

	let select_view = view.clone();
	let on_select = UnsyncCallback::new(move |selection: Selection| {
		select_view.borrow().on_select(&selection);
	});

	on_select.run(Selection::node("file-42".into()));
	let expected = serde_json::to_string_pretty(&json!({"path": "lib/libfoo.so"})).unwrap();
	assert_eq!(view.borrow().details().text(), expected);

	on_select.run(Selection::default());
	assert_eq!(view.borrow().details().text(), DETAILS_PROMPT);
}

#[test]
fn overlapping_loads_resolve_to_the_latest_request() {
	let mut view = GraphView::new(RecordingSurface::default(), GephiOptions::default());

	let first = view.begin_load();
	let second = view.begin_load();

	// The newer request's response lands first.
	view.finish_load(second, Ok(BOM_DOCUMENT.to_owned()));
	// The older response arrives late and is discarded.
	view.finish_load(
		first,
		Ok(r#"{"nodes":[{"id":"stale"}]}"#.to_owned()),
	);

	assert_eq!(view.store().node_count(), 3);
	assert!(view.store().node(&"stale".into()).is_none());
}
