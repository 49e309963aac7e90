//! Force-directed graph canvas.
//!
//! Renders the contents of a [`crate::graph::GraphStore`] on an HTML canvas:
//! physics-based layout via force simulation, pan/zoom and node dragging,
//! click selection of nodes and edges, and fit-to-view. The view controller
//! drives the canvas through [`CanvasHandle`], which implements
//! [`crate::graph::RenderSurface`].

mod component;
mod render;
pub mod scale;
mod state;
pub mod theme;

pub use component::{CanvasHandle, GraphCanvas};
pub use state::{PhysicsConfig, SceneState};
pub use theme::Theme;
