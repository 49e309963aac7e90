//! Graph scene state: physics simulation, view transform, and hit testing.
//!
//! A scene is rebuilt from the [`GraphStore`] after every successful load and
//! then mutated each frame by the animation loop. Element ids survive the
//! trip into the simulation so clicks can be resolved back to store records.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::scale::{ScaleConfig, ScaledValues};
use super::theme::Theme;
use crate::graph::store::{ElementId, GraphStore};
use crate::graph::view::Selection;

/// Physics parameters for the force-directed layout.
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
	/// Node repulsion strength (gravitational constant analogue).
	pub force_charge: f32,
	/// Edge spring constant.
	pub force_spring: f32,
	/// Cap on the combined force applied to a node.
	pub force_max: f32,
	/// Node movement speed.
	pub node_speed: f32,
	/// Velocity damping per tick.
	pub damping_factor: f32,
}

impl Default for PhysicsConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	/// Screen-space translation.
	pub x: f64,
	/// Screen-space translation.
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Whether a node drag is active.
	pub active: bool,
	/// The dragged node.
	pub node_idx: Option<DefaultNodeIdx>,
	/// Pointer position at press, screen space.
	pub start_x: f64,
	/// Pointer position at press, screen space.
	pub start_y: f64,
	/// Node position at press, world space.
	pub node_start_x: f32,
	/// Node position at press, world space.
	pub node_start_y: f32,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether a pan is active.
	pub active: bool,
	/// Pointer position at press, screen space.
	pub start_x: f64,
	/// Pointer position at press, screen space.
	pub start_y: f64,
	/// Transform translation at press.
	pub transform_start_x: f64,
	/// Transform translation at press.
	pub transform_start_y: f64,
}

/// Per-node display data attached to each node in the simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeVisual {
	/// Store id, for resolving clicks.
	pub id: ElementId,
	/// Optional display label.
	pub label: Option<String>,
	/// Resolved CSS color.
	pub color: String,
	/// Size multiplier (1.0 = normal).
	pub size: f64,
}

/// An edge kept alongside the simulation, with its store id.
#[derive(Clone, Debug)]
pub struct SceneEdge {
	/// Store id, for resolving clicks.
	pub id: ElementId,
	/// Simulation index of the source node.
	pub from: DefaultNodeIdx,
	/// Simulation index of the target node.
	pub to: DefaultNodeIdx,
}

/// The element a click landed on.
#[derive(Clone, Debug, PartialEq)]
pub enum Hit {
	/// A node was hit.
	Node(ElementId),
	/// An edge was hit.
	Edge(ElementId),
}

/// Simulation plus interaction state for one rendered graph.
pub struct SceneState {
	/// The physics simulation.
	pub graph: ForceGraph<NodeVisual, ()>,
	/// Current pan/zoom transform.
	pub transform: ViewTransform,
	/// In-progress node drag, if any.
	pub drag: DragState,
	/// In-progress pan, if any.
	pub pan: PanState,
	/// Currently selected element, highlighted by the renderer.
	pub selected: Option<Hit>,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// Whether the physics simulation advances each frame.
	pub animation_running: bool,
	edges: Vec<SceneEdge>,
}

impl SceneState {
	/// Build a scene from the store's current contents.
	///
	/// Nodes with a source position keep it (and are anchored when `fixed`);
	/// the rest are seeded on a circle around the canvas center. Edges whose
	/// endpoints are missing from the same load stay in the store but are
	/// left out of the simulation.
	pub fn from_store(
		store: &GraphStore,
		width: f64,
		height: f64,
		physics: &PhysicsConfig,
		theme: &Theme,
	) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: physics.force_charge,
			force_spring: physics.force_spring,
			force_max: physics.force_max,
			node_speed: physics.node_speed,
			damping_factor: physics.damping_factor,
		});

		// Sort for deterministic seeding and palette assignment.
		let mut records: Vec<_> = store.nodes().collect();
		records.sort_by(|a, b| a.id.cmp(&b.id));

		let mut id_to_idx = HashMap::new();
		for (i, record) in records.iter().enumerate() {
			let color = record
				.color
				.clone()
				.unwrap_or_else(|| theme.palette.get(i).to_css());
			let (x, y) = match (record.x, record.y) {
				(Some(x), Some(y)) => (x as f32, y as f32),
				_ => {
					let angle = (i as f64) * 2.0 * PI / records.len().max(1) as f64;
					(
						(width / 2.0 + 100.0 * angle.cos()) as f32,
						(height / 2.0 + 100.0 * angle.sin()) as f32,
					)
				}
			};
			let size = record
				.size
				.map(|s| (s / 10.0).clamp(0.4, 2.5))
				.unwrap_or(1.0);

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: record.fixed,
				user_data: NodeVisual {
					id: record.id.clone(),
					label: record.label.clone(),
					color,
					size,
				},
			});
			id_to_idx.insert(record.id.clone(), idx);
		}

		let mut edges: Vec<_> = store.edges().collect();
		edges.sort_by(|a, b| a.id.cmp(&b.id));
		let edges = edges
			.into_iter()
			.filter_map(|record| {
				let from = *id_to_idx.get(&record.source)?;
				let to = *id_to_idx.get(&record.target)?;
				graph.add_edge(from, to, EdgeData::default());
				Some(SceneEdge {
					id: record.id.clone(),
					from,
					to,
				})
			})
			.collect();

		Self {
			graph,
			edges,
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			selected: None,
			width,
			height,
			animation_running: true,
		}
	}

	/// Edges participating in the simulation.
	pub fn edges(&self) -> &[SceneEdge] {
		&self.edges
	}

	/// Map a screen position into world coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Recenter and rescale so the whole graph is visible with a margin.
	pub fn fit(&mut self, margin: f64) {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			bounds = Some(match bounds {
				None => (x, y, x, y),
				Some((min_x, min_y, max_x, max_y)) => {
					(min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
				}
			});
		});
		let Some((min_x, min_y, max_x, max_y)) = bounds else {
			self.transform = ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			};
			return;
		};

		let (span_x, span_y) = (max_x - min_x, max_y - min_y);
		let avail_x = (self.width - 2.0 * margin).max(1.0);
		let avail_y = (self.height - 2.0 * margin).max(1.0);
		let k = if span_x <= f64::EPSILON && span_y <= f64::EPSILON {
			1.0
		} else {
			(avail_x / span_x.max(f64::EPSILON))
				.min(avail_y / span_y.max(f64::EPSILON))
				.clamp(0.1, 10.0)
		};
		let (center_x, center_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - k * center_x,
			y: self.height / 2.0 - k * center_y,
			k,
		};
	}

	/// Find the element under a screen position, nodes before edges.
	pub fn hit_at(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<Hit> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);

		let mut positions = HashMap::new();
		let mut found = None;
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let radius = scale.hit_radius * node.data.user_data.size;
			if (dx * dx + dy * dy).sqrt() < radius {
				found = Some(Hit::Node(node.data.user_data.id.clone()));
			}
		});
		if found.is_some() {
			return found;
		}

		for edge in &self.edges {
			let (Some(&a), Some(&b)) = (positions.get(&edge.from), positions.get(&edge.to)) else {
				continue;
			};
			if segment_distance((gx, gy), a, b) < scale.edge_hit {
				return Some(Hit::Edge(edge.id.clone()));
			}
		}
		None
	}

	/// Hit-test a click and express the result as a [`Selection`].
	pub fn selection_at(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Selection {
		match self.hit_at(sx, sy, config) {
			Some(Hit::Node(id)) => Selection::node(id),
			Some(Hit::Edge(id)) => Selection::edge(id),
			None => Selection::default(),
		}
	}

	/// Advance the physics simulation.
	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
	}

	/// Record a canvas size change.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Distance from a point to a line segment.
fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (px, py) = p;
	let (ax, ay) = a;
	let (bx, by) = b;
	let (dx, dy) = (bx - ax, by - ay);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq <= f64::EPSILON {
		0.0
	} else {
		(((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (ax + t * dx, ay + t * dy);
	((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::store::{EdgeRecord, NodeRecord};

	fn store_with_positions() -> GraphStore {
		let mut store = GraphStore::new();
		store.add_nodes([
			NodeRecord {
				id: "a".into(),
				x: Some(0.0),
				y: Some(0.0),
				fixed: true,
				..NodeRecord::default()
			},
			NodeRecord {
				id: "b".into(),
				x: Some(200.0),
				y: Some(0.0),
				fixed: true,
				..NodeRecord::default()
			},
		]);
		store.add_edges([EdgeRecord {
			id: "e1".into(),
			source: "a".into(),
			target: "b".into(),
			..EdgeRecord::default()
		}]);
		store
	}

	fn scene(store: &GraphStore) -> SceneState {
		SceneState::from_store(
			store,
			800.0,
			600.0,
			&PhysicsConfig::default(),
			&Theme::default(),
		)
	}

	#[test]
	fn scene_mirrors_store_contents() {
		let store = store_with_positions();
		let scene = scene(&store);
		let mut count = 0;
		scene.graph.visit_nodes(|_| count += 1);
		assert_eq!(count, 2);
		assert_eq!(scene.edges().len(), 1);
	}

	#[test]
	fn dangling_edges_stay_out_of_the_simulation() {
		let mut store = store_with_positions();
		store.add_edges([EdgeRecord {
			id: "e2".into(),
			source: "a".into(),
			target: "missing".into(),
			..EdgeRecord::default()
		}]);
		let scene = scene(&store);
		assert_eq!(store.edge_count(), 2);
		assert_eq!(scene.edges().len(), 1);
	}

	#[test]
	fn clicks_resolve_to_element_ids() {
		let store = store_with_positions();
		let mut scene = scene(&store);
		// Identity transform: screen space equals world space.
		scene.transform = ViewTransform {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		};
		let config = ScaleConfig::default();

		assert_eq!(
			scene.hit_at(0.0, 0.0, &config),
			Some(Hit::Node("a".into()))
		);
		// Midway along the edge, clear of both node hit radii.
		assert_eq!(
			scene.hit_at(100.0, 2.0, &config),
			Some(Hit::Edge("e1".into()))
		);
		assert_eq!(scene.hit_at(100.0, 300.0, &config), None);

		let selection = scene.selection_at(0.0, 0.0, &config);
		assert_eq!(selection.nodes, vec!["a".into()]);
		assert!(selection.edges.is_empty());
	}

	#[test]
	fn fit_centers_the_graph() {
		let store = store_with_positions();
		let mut scene = scene(&store);
		scene.fit(40.0);

		// Both nodes sit on y=0 spanning x 0..200; the center of the span
		// must land at the canvas center.
		let k = scene.transform.k;
		assert!((scene.transform.x + k * 100.0 - 400.0).abs() < 1e-6);
		assert!((scene.transform.y - 300.0).abs() < 1e-6);
		assert!((0.1..=10.0).contains(&k));
	}

	#[test]
	fn fit_on_an_empty_scene_resets_the_transform() {
		let store = GraphStore::new();
		let mut scene = scene(&store);
		scene.fit(40.0);
		assert_eq!(scene.transform.k, 1.0);
	}

	#[test]
	fn segment_distance_basics() {
		assert!((segment_distance((0.0, 5.0), (-10.0, 0.0), (10.0, 0.0)) - 5.0).abs() < 1e-9);
		// Beyond the endpoint the distance is to the endpoint itself.
		assert!((segment_distance((15.0, 0.0), (-10.0, 0.0), (10.0, 0.0)) - 5.0).abs() < 1e-9);
	}
}
