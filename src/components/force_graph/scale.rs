//! Zoom-dependent sizing for graph visuals.
//!
//! The canvas transform scales world-space coordinates by the zoom factor
//! `k`, so anything that should keep a constant on-screen size must divide by
//! `k`, and anything that should not vanish when zoomed out needs a minimum
//! screen size. [`ScaledValues`] folds those rules into plain numbers once
//! per frame.

/// Visual sizing configuration, in screen pixels unless noted.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Base node radius in world units.
	pub node_radius: f64,
	/// Minimum node radius on screen, so nodes stay visible zoomed out.
	pub node_min_screen: f64,
	/// Hit-test radius around a node center, in world units.
	pub hit_radius: f64,
	/// Hit-test distance from an edge segment, in screen pixels.
	pub edge_hit_width: f64,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Zoom below which label text stops growing.
	pub label_min_k: f64,
	/// Edge line width in screen pixels.
	pub edge_line_width: f64,
	/// Arrowhead size in world units, capped on screen.
	pub arrow_size: f64,
	/// Maximum arrowhead size on screen.
	pub arrow_max_screen: f64,
	/// Selection ring stroke width in screen pixels.
	pub ring_width: f64,
	/// Selection ring offset from the node edge in screen pixels.
	pub ring_offset: f64,
	/// Margin kept around the graph when fitting the viewport, in pixels.
	pub fit_margin: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node_radius: 5.0,
			node_min_screen: 5.0,
			hit_radius: 12.0,
			edge_hit_width: 6.0,
			label_size: 10.0,
			label_min_k: 0.5,
			edge_line_width: 1.5,
			arrow_size: 5.0,
			arrow_max_screen: 18.0,
			ring_width: 1.5,
			ring_offset: 2.0,
			fit_margin: 40.0,
		}
	}
}

/// Scale values resolved for one zoom level, in world-space units ready to
/// use after the canvas transform. Computed once per frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Node radius.
	pub node_radius: f64,
	/// Node hit-test radius.
	pub hit_radius: f64,
	/// Edge hit-test distance.
	pub edge_hit: f64,
	/// Label font shorthand for the 2d context.
	pub label_font: String,
	/// Edge line width.
	pub edge_line_width: f64,
	/// Arrowhead size.
	pub arrow_size: f64,
	/// Selection ring stroke width.
	pub ring_width: f64,
	/// Selection ring offset.
	pub ring_offset: f64,
}

impl ScaledValues {
	/// Resolve the configuration for zoom level `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let k = if k > 0.0 { k } else { 1.0 };
		// World-space floor that guarantees the minimum screen size.
		let node_radius = config.node_radius.max(config.node_min_screen / k);
		let hit_radius = config.hit_radius.max(config.node_min_screen / k);
		let label_font_size = config.label_size / k.max(config.label_min_k);
		Self {
			node_radius,
			hit_radius,
			edge_hit: config.edge_hit_width / k,
			label_font: format!("{label_font_size}px sans-serif"),
			edge_line_width: config.edge_line_width / k,
			arrow_size: config.arrow_size.min(config.arrow_max_screen / k),
			ring_width: config.ring_width / k,
			ring_offset: config.ring_offset / k,
		}
	}
}
