//! The graph loading pipeline: fetch, adapt, store, redraw.
//!
//! Data flows one way on load: [`loader`] fetches and parses the JSON
//! document, [`gephi`] adapts it into node/edge records, [`store`] holds the
//! records the canvas renders, and [`view`] orchestrates the cycle and keeps
//! the details panel in sync with clicks. User clicks flow the opposite
//! direction: the canvas reports a [`view::Selection`] of element ids and the
//! view resolves them against the store.

pub mod gephi;
pub mod loader;
pub mod store;
pub mod view;

pub use gephi::{GephiOptions, ParseError};
pub use loader::{GraphLoader, LoadError};
pub use store::{AttributeBag, EdgeRecord, ElementId, GraphStore, NodeRecord};
pub use view::{DetailsPanel, GraphView, RenderSurface, Selection};
