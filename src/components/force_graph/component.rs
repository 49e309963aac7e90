//! Leptos component wrapping the graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel
//! handlers for node dragging, panning, zooming, and click selection. An
//! animation loop runs via `requestAnimationFrame`, advancing the physics
//! simulation and redrawing each frame. The view controller reaches the
//! mounted scene through [`CanvasHandle`].

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::scale::ScaleConfig;
use super::state::{Hit, PhysicsConfig, SceneState};
use super::theme::Theme;
use crate::graph::store::GraphStore;
use crate::graph::view::{RenderSurface, Selection};

/// Movement below this many pixels between press and release counts as a
/// click rather than a drag.
const CLICK_SLOP: f64 = 4.0;

/// Scene plus the visual configuration it is drawn with.
struct GraphContext {
	state: SceneState,
	scale: ScaleConfig,
	theme: Theme,
	physics: PhysicsConfig,
}

#[derive(Default)]
struct CanvasShared {
	context: Option<GraphContext>,
	/// Store contents delivered before the canvas mounted.
	pending: Option<GraphStore>,
	fit_requested: bool,
}

/// Shared handle linking the view controller to the mounted canvas.
///
/// Rebuild and fit requests issued before the canvas mounts are buffered and
/// applied on mount.
#[derive(Clone, Default)]
pub struct CanvasHandle {
	inner: Rc<RefCell<CanvasShared>>,
}

impl CanvasHandle {
	/// Create a handle not yet bound to a canvas.
	pub fn new() -> Self {
		Self::default()
	}
}

impl RenderSurface for CanvasHandle {
	fn rebuild(&self, store: &GraphStore) {
		let mut shared = self.inner.borrow_mut();
		match shared.context.as_mut() {
			Some(c) => {
				let (w, h) = (c.state.width, c.state.height);
				c.state = SceneState::from_store(store, w, h, &c.physics, &c.theme);
			}
			None => shared.pending = Some(store.clone()),
		}
	}

	fn fit(&self) {
		self.inner.borrow_mut().fit_requested = true;
	}
}

fn event_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Renders an interactive force-directed graph on a canvas element.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize with the window.
/// Clicks are hit-tested against nodes and edges and reported through
/// `on_select`.
#[component]
pub fn GraphCanvas(
	/// Handle the view controller uses to push scenes and fit requests.
	handle: CanvasHandle,
	/// Receives the ids under the cursor for every click. Unsync because the
	/// receiver typically borrows main-thread-only state.
	#[prop(into)]
	on_select: UnsyncCallback<Selection>,
	/// Fill the viewport instead of the parent container.
	#[prop(default = false)]
	fullscreen: bool,
	/// Explicit canvas width, overriding automatic sizing.
	#[prop(default = None)]
	width: Option<f64>,
	/// Explicit canvas height, overriding automatic sizing.
	#[prop(default = None)]
	height: Option<f64>,
	/// Visual theme.
	#[prop(default = Theme::default())]
	theme: Theme,
	/// Physics parameters for the layout simulation.
	#[prop(default = PhysicsConfig::default())]
	physics: PhysicsConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let shared = handle.inner.clone();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (shared_init, animate_init, resize_cb_init) =
		(shared.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		{
			let mut s = shared_init.borrow_mut();
			let store = s.pending.take().unwrap_or_default();
			s.context = Some(GraphContext {
				state: SceneState::from_store(&store, w, h, &physics, &theme),
				scale: ScaleConfig::default(),
				theme: theme.clone(),
				physics: physics.clone(),
			});
		}

		if fullscreen {
			let (shared_resize, canvas_resize) = (shared_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = shared_resize.borrow_mut().context {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (shared_anim, animate_inner) = (shared_init.clone(), animate_init.clone());
		let last_frame = std::cell::Cell::new(js_sys::Date::now());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			let dt = ((now - last_frame.get()) / 1000.0).clamp(0.0, 0.05) as f32;
			last_frame.set(now);
			{
				let mut s = shared_anim.borrow_mut();
				let fit_requested = s.fit_requested;
				if let Some(ref mut c) = s.context {
					if c.state.animation_running {
						c.state.tick(dt);
					}
					if fit_requested {
						let margin = c.scale.fit_margin;
						c.state.fit(margin);
					}
					render::render(&c.state, &ctx, &c.scale, &c.theme);
				}
				s.fit_requested = false;
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let shared_md = shared.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);

		if let Some(ref mut c) = shared_md.borrow_mut().context {
			if let Some(Hit::Node(id)) = c.state.hit_at(x, y, &c.scale) {
				let mut node_idx = None;
				let mut start = (0.0f32, 0.0f32);
				c.state.graph.visit_nodes(|node| {
					if node.data.user_data.id == id {
						node_idx = Some(node.index());
						start = (node.x(), node.y());
					}
				});
				c.state.drag.active = true;
				c.state.drag.node_idx = node_idx;
				c.state.drag.start_x = x;
				c.state.drag.start_y = y;
				c.state.drag.node_start_x = start.0;
				c.state.drag.node_start_y = start.1;
			} else {
				c.state.pan.active = true;
				c.state.pan.start_x = x;
				c.state.pan.start_y = y;
				c.state.pan.transform_start_x = c.state.transform.x;
				c.state.pan.transform_start_y = c.state.transform.y;
			}
		}
	};

	let shared_mm = shared.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);

		if let Some(ref mut c) = shared_mm.borrow_mut().context {
			if c.state.drag.active {
				if let Some(idx) = c.state.drag.node_idx {
					let (dx, dy) = (
						(x - c.state.drag.start_x) / c.state.transform.k,
						(y - c.state.drag.start_y) / c.state.transform.k,
					);
					let (nx, ny) = (
						c.state.drag.node_start_x + dx as f32,
						c.state.drag.node_start_y + dy as f32,
					);
					c.state.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
			} else if c.state.pan.active {
				c.state.transform.x = c.state.pan.transform_start_x + (x - c.state.pan.start_x);
				c.state.transform.y = c.state.pan.transform_start_y + (y - c.state.pan.start_y);
			}
		}
	};

	let shared_mu = shared.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);

		let clicked = {
			let mut s = shared_mu.borrow_mut();
			let Some(ref mut c) = s.context else {
				return;
			};
			let origin = if c.state.drag.active {
				Some((c.state.drag.start_x, c.state.drag.start_y))
			} else if c.state.pan.active {
				Some((c.state.pan.start_x, c.state.pan.start_y))
			} else {
				None
			};
			c.state.drag.active = false;
			c.state.drag.node_idx = None;
			c.state.pan.active = false;

			origin.and_then(|(ox, oy)| {
				let moved = ((x - ox).powi(2) + (y - oy).powi(2)).sqrt() > CLICK_SLOP;
				if moved {
					None
				} else {
					let hit = c.state.hit_at(x, y, &c.scale);
					c.state.selected = hit.clone();
					Some(match hit {
						Some(Hit::Node(id)) => Selection::node(id),
						Some(Hit::Edge(id)) => Selection::edge(id),
						None => Selection::default(),
					})
				}
			})
		};
		// The borrow is released before the selection reaches the view.
		if let Some(selection) = clicked {
			on_select.run(selection);
		}
	};

	let shared_ml = shared.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = shared_ml.borrow_mut().context {
			c.state.drag.active = false;
			c.state.drag.node_idx = None;
			c.state.pan.active = false;
		}
	};

	let shared_wh = shared.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = event_position(&canvas, &ev);

		if let Some(ref mut c) = shared_wh.borrow_mut().context {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (c.state.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / c.state.transform.k;
			c.state.transform.x = x - (x - c.state.transform.x) * ratio;
			c.state.transform.y = y - (y - c.state.transform.y) * ratio;
			c.state.transform.k = new_k;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
