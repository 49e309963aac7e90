//! Colors and visual style for the graph canvas.

/// RGBA color representation.
#[derive(Clone, Copy, Debug)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color from RGB channels.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with an explicit alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with a different alpha.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// CSS rendering, hex when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fallback palette for nodes whose document carries no usable color.
#[derive(Clone, Debug)]
pub struct NodePalette {
	/// Palette entries, cycled by node index.
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Muted slate blues and teals.
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),
				Color::rgb(129, 161, 193),
				Color::rgb(100, 148, 160),
				Color::rgb(136, 160, 175),
				Color::rgb(108, 142, 173),
				Color::rgb(119, 158, 165),
				Color::rgb(143, 163, 180),
				Color::rgb(122, 153, 168),
			],
		}
	}

	/// Palette color for a node index, cycling past the end.
	pub fn get(&self, index: usize) -> Color {
		self.colors[index % self.colors.len()]
	}
}

/// Complete visual theme for the canvas.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Primary background color.
	pub background: Color,
	/// Secondary background color for the radial gradient.
	pub background_secondary: Color,
	/// Whether the background uses a radial gradient.
	pub use_gradient: bool,
	/// Base edge color.
	pub edge_color: Color,
	/// Emphasis color for the selected node ring and selected edge.
	pub selection_color: Color,
	/// Node label color.
	pub label_color: Color,
	/// Skip edge drawing while a drag or pan is in progress.
	pub hide_edges_on_drag: bool,
	/// Fallback node palette.
	pub palette: NodePalette,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			background_secondary: Color::rgb(30, 35, 42),
			use_gradient: true,
			edge_color: Color::rgba(140, 160, 180, 0.5),
			selection_color: Color::rgb(224, 175, 104),
			label_color: Color::rgba(220, 228, 235, 0.9),
			hide_edges_on_drag: true,
			palette: NodePalette::slate(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn css_rendering() {
		assert_eq!(Color::rgb(94, 129, 172).to_css(), "#5e81ac");
		assert_eq!(
			Color::rgb(94, 129, 172).with_alpha(0.5).to_css(),
			"rgba(94, 129, 172, 0.5)"
		);
	}

	#[test]
	fn palette_cycles() {
		let palette = NodePalette::slate();
		let n = palette.colors.len();
		assert_eq!(palette.get(0).to_css(), palette.get(n).to_css());
	}
}
