use web_sys::HtmlCanvasElement;
use yew::prelude::*;

use crate::engine::GridAnimation;
use crate::model::{Direction, GridOptions, SiteConfig};
use crate::util;

#[derive(Properties, PartialEq, Clone)]
pub struct MainViewProps {
    pub site: SiteConfig,
}

/// Landing card over the grid canvas. The engine lives as long as this
/// component: mounted -> `init`, unmounted -> `destroy`.
#[function_component(MainView)]
pub fn main_view(props: &MainViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let engine = use_mut_ref(|| None::<GridAnimation>);

    {
        let canvas_ref = canvas_ref.clone();
        let engine = engine.clone();
        use_effect_with((), move |_| {
            let mobile = util::is_phone();
            if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                let options = GridOptions {
                    direction: Some(Direction::Diagonal),
                    speed: Some(if mobile { 0.03 } else { 0.05 }),
                    square_size: Some(if mobile { 50.0 } else { 40.0 }),
                    border_color: Some(
                        if mobile {
                            "rgba(255, 255, 255, 0.2)"
                        } else {
                            "rgba(255, 255, 255, 0.1)"
                        }
                        .into(),
                    ),
                    hover_fill_color: Some("rgba(255, 255, 255, 0.8)".into()),
                    hover_shadow_color: Some("rgba(255, 255, 255, 0.8)".into()),
                    special_block_color: Some("rgba(100, 255, 152, 0.8)".into()),
                    snake_head_color: Some("rgba(255, 255, 255, 0.95)".into()),
                    snake_tail_color: Some("rgba(218, 231, 255, 0.25)".into()),
                    transition_duration: Some(if mobile { 150.0 } else { 200.0 }),
                    trail_duration: Some(if mobile { 2000.0 } else { 1500.0 }),
                    snake_color_decay: Some(0.85),
                    touch_sensitivity: Some(if mobile { 1.2 } else { 1.0 }),
                    vibration_enabled: Some(mobile),
                };
                if let Some(mut animation) = GridAnimation::new(canvas, options) {
                    animation.init();
                    *engine.borrow_mut() = Some(animation);
                }
            }
            move || {
                if let Some(mut animation) = engine.borrow_mut().take() {
                    animation.destroy();
                }
            }
        });
    }

    html! {
        <div class="content-main">
            <canvas id="gridCanvas" ref={canvas_ref} class="grid-canvas"></canvas>
            <div class="card-inner in">
                <img
                    class="avatar"
                    src={props.site.main.avatar.clone()}
                    alt={props.site.main.name.clone()}
                    width="100"
                    height="100"
                />
                <h2 class="main-name">{ &props.site.main.name }</h2>
                <p class="signature">{ &props.site.main.signature }</p>
            </div>
        </div>
    }
}
