use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::selection::FULL_OPACITY;
use super::state::ForceGraphState;

const BACKGROUND: &str = "#1a1a2e";
/// Below this zoom, unselected labels are skipped.
const LABEL_MIN_ZOOM: f64 = 0.6;

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, dash, gap) = (1.2 / k, 8.0 / k, 4.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let positions = state.layout.positions();
	let selecting = state.has_selection();

	for edge in &state.layout.edges {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let (x1, y1, x2, y2) = (x1 as f64, y1 as f64, x2 as f64, y2 as f64);
		let (dx, dy) = (x2 - x1, y2 - y1);
		if (dx * dx + dy * dy).sqrt() < 0.001 {
			continue;
		}

		let alpha = edge.shown_opacity;
		let emphasized = selecting && edge.opacity >= FULL_OPACITY;
		ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", 0.6 * alpha));
		ctx.set_line_width(if emphasized {
			line_width * 1.5
		} else {
			line_width
		});
		if emphasized {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		// Character names only show for the selected node's roles.
		if emphasized && !edge.label.is_empty() {
			ctx.set_fill_style_str(&format!("rgba(200, 220, 255, {})", 0.9 * alpha));
			ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
			let _ = ctx.fill_text(&edge.label, (x1 + x2) / 2.0, (y1 + y2) / 2.0);
		}
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let selected = state
		.selection
		.selected()
		.and_then(|id| state.layout.index_of(id));

	state.layout.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let alpha = info.shown_opacity;

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, info.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(info.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		if selected == Some(node.index()) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, info.radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		if k < LABEL_MIN_ZOOM && info.opacity < FULL_OPACITY {
			return;
		}
		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.85));
		ctx.set_font(&format!("{}px sans-serif", info.font_size / k.max(0.5)));
		let _ = ctx.fill_text(&info.label, x + info.radius + 3.0, y + 3.0);
	});
}
