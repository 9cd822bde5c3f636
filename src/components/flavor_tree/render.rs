use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scene::{Scene, SceneEdge, SceneNode};
use super::state::ViewTransform;

const BACKGROUND: &str = "#f3f7f1";
const INK: &str = "#1a5c36";
const COLLAPSED: &str = "#7d5a9a";
const CORNER_RADIUS: f64 = 12.0;
const BADGE_WIDTH: f64 = 36.0;
const BADGE_HEIGHT: f64 = 32.0;
const BADGE_GAP: f64 = 12.0;
const FADE_HEIGHT: f64 = 20.0;

pub fn render(
	scene: &Scene,
	view: &ViewTransform,
	width: f64,
	height: f64,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_global_alpha(1.0);
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(view.x, view.y);
	let _ = ctx.scale(view.k, view.k);
	for edge in &scene.edges {
		draw_edge(edge, ctx);
	}
	for node in &scene.nodes {
		draw_node(node, ctx);
	}
	ctx.restore();
}

fn draw_edge(edge: &SceneEdge, ctx: &CanvasRenderingContext2d) {
	let c = &edge.curve;
	ctx.set_global_alpha(0.7);
	ctx.set_stroke_style_str(INK);
	ctx.set_line_width(3.0);
	ctx.begin_path();
	ctx.move_to(c.start.x, c.start.y);
	ctx.bezier_curve_to(c.c1.x, c.c1.y, c.c2.x, c.c2.y, c.end.x, c.end.y);
	ctx.stroke();

	let [tip, left, right] = edge.arrow;
	ctx.set_fill_style_str(INK);
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(left.x, left.y);
	ctx.line_to(right.x, right.y);
	ctx.close_path();
	ctx.fill();
	ctx.set_global_alpha(1.0);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_node(node: &SceneNode, ctx: &CanvasRenderingContext2d) {
	let (x, y, w, h) = (node.x, node.y, node.width, node.height);
	let (cx, cy) = (x + w / 2.0, y + h / 2.0);
	let alpha = node.opacity();

	// Body: diagonal sweep over the first three flavor colors.
	ctx.set_global_alpha(alpha * 0.95);
	let gradient = ctx.create_linear_gradient(x, y, x + w, y + h);
	let [a, b, c] = node.swatches;
	for (i, rgb) in [a, b, c, a, b, c, a].iter().enumerate() {
		let _ = gradient.add_color_stop(i as f32 / 6.0, &rgb.css());
	}
	rounded_rect(ctx, x, y, w, h, CORNER_RADIUS);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();

	let fade = ctx.create_linear_gradient(0.0, y + h - FADE_HEIGHT, 0.0, y + h);
	let _ = fade.add_color_stop(0.0, "rgba(255, 255, 255, 0)");
	let _ = fade.add_color_stop(1.0, "rgba(255, 255, 255, 0.95)");
	#[allow(deprecated)]
	ctx.set_fill_style(&fade);
	ctx.fill_rect(x, y + h - FADE_HEIGHT, w, FADE_HEIGHT);

	ctx.set_global_alpha(alpha);
	rounded_rect(ctx, x, y, w, h, CORNER_RADIUS);
	ctx.set_stroke_style_str(INK);
	ctx.set_line_width(if node.suppressed { 2.0 } else { 3.0 });
	ctx.stroke();

	draw_badges(node, cx, cy + 5.0, ctx);
	draw_labels(node, cx, cy, ctx);
	draw_indicator(node, x + w - 15.0, y + 15.0, ctx);
	ctx.set_global_alpha(1.0);
}

fn draw_badges(node: &SceneNode, cx: f64, cy: f64, ctx: &CanvasRenderingContext2d) {
	let n = node.icons.len() as f64;
	let total = n * BADGE_WIDTH + (n - 1.0).max(0.0) * BADGE_GAP;
	let mut bx = cx - total / 2.0 + BADGE_WIDTH / 2.0;
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_font("22px sans-serif");
	for icon in &node.icons {
		ctx.begin_path();
		let _ = ctx.ellipse(bx, cy, BADGE_WIDTH / 2.0, BADGE_HEIGHT / 2.0, 0.0, 0.0, 2.0 * PI);
		ctx.set_fill_style_str("white");
		ctx.fill();
		ctx.set_stroke_style_str("rgba(200, 200, 200, 0.8)");
		ctx.set_line_width(1.5);
		ctx.stroke();
		let _ = ctx.fill_text(icon, bx, cy + 1.0);
		bx += BADGE_WIDTH + BADGE_GAP;
	}
}

fn draw_labels(node: &SceneNode, cx: f64, cy: f64, ctx: &CanvasRenderingContext2d) {
	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");

	ctx.set_font("900 17px sans-serif");
	ctx.set_line_width(4.0);
	ctx.set_stroke_style_str("#000");
	let _ = ctx.stroke_text(&node.name, cx, cy - 25.0);
	ctx.set_fill_style_str("white");
	let _ = ctx.fill_text(&node.name, cx, cy - 25.0);

	ctx.set_font("800 12px sans-serif");
	ctx.set_fill_style_str(INK);
	let _ = ctx.fill_text(&node.category.to_uppercase(), cx, cy + 40.0);
}

fn draw_indicator(node: &SceneNode, x: f64, y: f64, ctx: &CanvasRenderingContext2d) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, 10.0, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(if node.suppressed { COLLAPSED } else { INK });
	ctx.fill();
	ctx.set_stroke_style_str("white");
	ctx.set_line_width(2.0);
	ctx.stroke();

	ctx.set_fill_style_str("white");
	ctx.set_font("bold 14px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(if node.suppressed { "+" } else { "−" }, x, y + 1.0);
}
