use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use yew::prelude::*;

use super::{intro_view::IntroView, main_view::MainView};
use crate::model::SiteConfig;

/// Intro-to-main transition stages. One controller owns the whole
/// choreography instead of scattered "loaded once" flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageStage {
    Intro,
    Transitioning,
    Main,
}

/// Duration of the intro slide-out, ms.
const TRANSITION_MS: i32 = 1100;

#[function_component(App)]
pub fn app() -> Html {
    let stage = use_state(|| PageStage::Intro);
    let site = use_memo((), |_| SiteConfig::load());

    // Transitioning -> Main once the slide-out completes.
    {
        let stage = stage.clone();
        use_effect_with(*stage, move |current| {
            let mut timer: Option<(i32, Closure<dyn FnMut()>)> = None;
            if *current == PageStage::Transitioning {
                let stage_done = stage.clone();
                let cb = Closure::wrap(Box::new(move || {
                    stage_done.set(PageStage::Main);
                }) as Box<dyn FnMut()>);
                if let Some(win) = web_sys::window() {
                    if let Ok(id) = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                        cb.as_ref().unchecked_ref(),
                        TRANSITION_MS,
                    ) {
                        timer = Some((id, cb));
                    }
                }
            }
            move || {
                if let Some((id, cb)) = timer {
                    if let Some(win) = web_sys::window() {
                        win.clear_timeout_with_handle(id);
                    }
                    drop(cb);
                }
            }
        });
    }

    let enter = {
        let stage = stage.clone();
        Callback::from(move |_| {
            if *stage == PageStage::Intro {
                stage.set(PageStage::Transitioning);
            }
        })
    };

    html! {
        <div id="root">
            {
                match *stage {
                    PageStage::Intro | PageStage::Transitioning => html! {
                        <IntroView
                            site={(*site).clone()}
                            leaving={*stage == PageStage::Transitioning}
                            on_enter={enter}
                        />
                    },
                    PageStage::Main => html! { <MainView site={(*site).clone()} /> },
                }
            }
        </div>
    }
}
