//! Canvas drawing for the graph scene.
//!
//! Draw order per frame: background in screen space, then edges with their
//! arrowheads, then nodes and labels in world space, with the selected
//! element emphasized on top.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::{Hit, SceneState};
use super::theme::Theme;
use crate::graph::store::ElementId;

/// Render the complete scene to the canvas.
pub fn render(
	state: &SceneState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	let interacting = state.drag.active || state.pan.active;
	if !(theme.hide_edges_on_drag && interacting) {
		draw_edges(state, ctx, &scale, theme);
	}
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();
}

fn draw_background(state: &SceneState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if theme.use_gradient {
		if let Ok(gradient) = ctx.create_radial_gradient(
			state.width / 2.0,
			state.height / 2.0,
			0.0,
			state.width / 2.0,
			state.height / 2.0,
			state.width.max(state.height) * 0.8,
		) {
			let _ = gradient.add_color_stop(0.0, &theme.background_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
	} else {
		ctx.set_fill_style_str(&theme.background.to_css());
	}
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn node_positions(state: &SceneState) -> HashMap<DefaultNodeIdx, (f64, f64, f64)> {
	let mut positions = HashMap::new();
	state.graph.visit_nodes(|node| {
		positions.insert(
			node.index(),
			(node.x() as f64, node.y() as f64, node.data.user_data.size),
		);
	});
	positions
}

fn selected_edge(state: &SceneState) -> Option<&ElementId> {
	match &state.selected {
		Some(Hit::Edge(id)) => Some(id),
		_ => None,
	}
}

fn draw_edges(
	state: &SceneState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let positions = node_positions(state);
	let selected = selected_edge(state);

	for edge in state.edges() {
		let (Some(&(ax, ay, _)), Some(&(bx, by, target_size))) =
			(positions.get(&edge.from), positions.get(&edge.to))
		else {
			continue;
		};
		let is_selected = selected == Some(&edge.id);
		let color = if is_selected {
			theme.selection_color
		} else {
			theme.edge_color
		};
		let width = if is_selected {
			scale.edge_line_width * 2.0
		} else {
			scale.edge_line_width
		};

		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(ax, ay);
		ctx.line_to(bx, by);
		ctx.stroke();

		draw_arrowhead(
			ctx,
			(ax, ay),
			(bx, by),
			scale.node_radius * target_size,
			scale.arrow_size,
			&color.to_css(),
		);
	}
}

/// Arrowhead at the target end, pulled back to the node's rim.
fn draw_arrowhead(
	ctx: &CanvasRenderingContext2d,
	(ax, ay): (f64, f64),
	(bx, by): (f64, f64),
	target_radius: f64,
	size: f64,
	color: &str,
) {
	let (dx, dy) = (bx - ax, by - ay);
	let len = (dx * dx + dy * dy).sqrt();
	if len <= target_radius {
		return;
	}
	let (ux, uy) = (dx / len, dy / len);
	let (tip_x, tip_y) = (bx - ux * target_radius, by - uy * target_radius);
	let (base_x, base_y) = (tip_x - ux * size, tip_y - uy * size);
	// Perpendicular half-width of the triangle base.
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);

	ctx.set_fill_style_str(color);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(base_x + px, base_y + py);
	ctx.line_to(base_x - px, base_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_nodes(
	state: &SceneState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let selected = match &state.selected {
		Some(Hit::Node(id)) => Some(id.clone()),
		_ => None,
	};

	state.graph.visit_nodes(|node| {
		let visual = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let radius = scale.node_radius * visual.size;

		ctx.set_fill_style_str(&visual.color);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.fill();

		if selected.as_ref() == Some(&visual.id) {
			ctx.set_stroke_style_str(&theme.selection_color.to_css());
			ctx.set_line_width(scale.ring_width);
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + scale.ring_offset, 0.0, 2.0 * PI);
			ctx.stroke();
		}

		if let Some(label) = &visual.label {
			ctx.set_fill_style_str(&theme.label_color.to_css());
			ctx.set_font(&scale.label_font);
			ctx.set_text_align("center");
			let _ = ctx.fill_text(label, x, y - radius - scale.ring_offset * 2.0);
		}
	});
}
