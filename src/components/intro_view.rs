use web_sys::{MouseEvent, TouchEvent, WheelEvent};
use yew::prelude::*;

use crate::model::SiteConfig;
use crate::util::{self, SwipeDirection};

#[derive(Properties, PartialEq, Clone)]
pub struct IntroViewProps {
    pub site: SiteConfig,
    /// True while the slide-out choreography plays.
    pub leaving: bool,
    pub on_enter: Callback<()>,
}

/// Intro cover: enter via button click, scroll down, arrow hover, or
/// swipe-up on touch devices.
#[function_component(IntroView)]
pub fn intro_view(props: &IntroViewProps) -> Html {
    let touch_start = use_mut_ref(|| (0.0_f64, 0.0_f64));

    let on_click = {
        let on_enter = props.on_enter.clone();
        Callback::from(move |_: MouseEvent| on_enter.emit(()))
    };
    let on_wheel = {
        let on_enter = props.on_enter.clone();
        Callback::from(move |e: WheelEvent| {
            if e.delta_y() > 0.0 {
                on_enter.emit(());
            }
        })
    };
    let on_arrow_hover = {
        let on_enter = props.on_enter.clone();
        Callback::from(move |_: MouseEvent| on_enter.emit(()))
    };
    let on_touch_start = {
        let touch_start = touch_start.clone();
        Callback::from(move |e: TouchEvent| {
            if let Some(touch) = e.touches().item(0) {
                *touch_start.borrow_mut() = (touch.page_x() as f64, touch.page_y() as f64);
            }
        })
    };
    let on_touch_end = {
        let touch_start = touch_start.clone();
        let on_enter = props.on_enter.clone();
        Callback::from(move |e: TouchEvent| {
            let Some(touch) = e.changed_touches().item(0) else {
                return;
            };
            let (sx, sy) = *touch_start.borrow();
            let dir = util::move_direction(sx, sy, touch.page_x() as f64, touch.page_y() as f64);
            if dir == SwipeDirection::Up {
                on_enter.emit(());
            }
        })
    };

    let class = if props.leaving {
        "content-intro leaving"
    } else {
        "content-intro"
    };
    html! {
        <div
            class={class}
            onwheel={on_wheel}
            ontouchstart={on_touch_start}
            ontouchend={on_touch_end}
        >
            <h1 class="content-title">{ &props.site.intro.title }</h1>
            <p class="content-subtitle">
                { for props.site.intro.subtitle.chars().map(|c| html! { <span>{ c }</span> }) }
            </p>
            <button class="enter" onclick={on_click}>{ &props.site.intro.enter }</button>
            <div class="arrow" onmouseenter={on_arrow_hover}>{ "\u{2193}" }</div>
        </div>
    }
}
