//! Frame painting. Pure over the state: reads `GridState`, never mutates it.
//! All drawing is issued in CSS-pixel space under a device-pixel-ratio
//! scaling transform; the backing store is cleared in device pixels.

use web_sys::CanvasRenderingContext2d;

use crate::model::GridConfig;
use crate::state::{Cell, GridState};

/// Minimum visible alpha for far snake segments.
const MIN_SEGMENT_ALPHA: f64 = 0.2;

pub fn draw(
    ctx: &CanvasRenderingContext2d,
    config: &GridConfig,
    state: &GridState,
    view_w: f64,
    view_h: f64,
    dpr: f64,
) {
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.clear_rect(0.0, 0.0, view_w * dpr, view_h * dpr);
    let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

    let s = config.square_size;
    ctx.set_line_width(if config.mobile { 1.0 } else { 0.5 });
    if config.mobile {
        // Half-pixel snap keeps 1px strokes crisp on phone screens.
        let _ = ctx.translate(0.5, 0.5);
    }

    draw_snake(ctx, config, state, s);
    draw_cells(ctx, config, state, s, view_w, view_h);

    if config.mobile {
        let _ = ctx.translate(-0.5, -0.5);
    }

    draw_vignette(ctx, view_w, view_h);
}

fn draw_snake(ctx: &CanvasRenderingContext2d, config: &GridConfig, state: &GridState, s: f64) {
    for (index, segment) in state.snake.iter().enumerate() {
        let origin = state.cell_origin(*segment, s);

        ctx.set_shadow_color(&config.hover_shadow_color.to_css());
        ctx.set_shadow_blur(15.0);
        ctx.set_shadow_offset_x(0.0);
        ctx.set_shadow_offset_y(0.0);

        let color = if index == 0 {
            config.snake_head_color
        } else {
            // Head-to-tail gradient; decay^index blends towards the tail.
            let factor = config.snake_color_decay.powi(index as i32);
            let mut blended = config
                .snake_head_color
                .lerp(config.snake_tail_color, 1.0 - factor);
            blended.a = blended.a.max(MIN_SEGMENT_ALPHA);
            blended
        };
        ctx.set_fill_style_str(&color.to_css());
        ctx.fill_rect(origin.x, origin.y, s, s);

        ctx.set_shadow_color("transparent");
        ctx.set_shadow_blur(0.0);
    }
}

fn draw_cells(
    ctx: &CanvasRenderingContext2d,
    config: &GridConfig,
    state: &GridState,
    s: f64,
    view_w: f64,
    view_h: f64,
) {
    let border_css = config.border_color.to_css();

    let mut x = 0.0;
    while x < view_w + s {
        let mut y = 0.0;
        while y < view_h + s {
            let square_x = (x - state.grid_offset.x % s).round();
            let square_y = (y - state.grid_offset.y % s).round();
            let cell = Cell {
                x: (x / s).floor() as i32,
                y: (y / s).floor() as i32,
            };

            if let Some(sb) = state.special {
                if sb.cell == cell {
                    ctx.set_shadow_color("rgba(255, 255, 255, 0.5)");
                    ctx.set_shadow_blur(20.0);
                    ctx.set_fill_style_str(&sb.color.to_css());
                    ctx.fill_rect(square_x, square_y, s, s);
                    ctx.set_shadow_color("transparent");
                    ctx.set_shadow_blur(0.0);
                }
            }

            if state.hovered == Some(cell) {
                ctx.set_shadow_color(&config.hover_shadow_color.to_css());
                ctx.set_shadow_blur(15.0);
                ctx.set_shadow_offset_x(0.0);
                ctx.set_shadow_offset_y(0.0);

                let fill = config.hover_fill_color.with_alpha(state.current_opacity);
                ctx.set_fill_style_str(&fill.to_css());
                ctx.fill_rect(square_x, square_y, s, s);

                ctx.set_shadow_color("transparent");
                ctx.set_shadow_blur(0.0);
            }

            ctx.set_stroke_style_str(&border_css);
            ctx.stroke_rect(square_x, square_y, s, s);

            y += s;
        }
        x += s;
    }
}

/// Radial vignette: transparent center fading to near-black at the corners.
fn draw_vignette(ctx: &CanvasRenderingContext2d, view_w: f64, view_h: f64) {
    let radius = (view_w * view_w + view_h * view_h).sqrt() / 2.0;
    let Ok(gradient) = ctx.create_radial_gradient(
        view_w / 2.0,
        view_h / 2.0,
        0.0,
        view_w / 2.0,
        view_h / 2.0,
        radius,
    ) else {
        return;
    };
    let _ = gradient.add_color_stop(0.0, "rgba(6, 6, 6, 0)");
    let _ = gradient.add_color_stop(1.0, "#060606");
    ctx.set_fill_style_canvas_gradient(&gradient);
    ctx.fill_rect(0.0, 0.0, view_w, view_h);
}
