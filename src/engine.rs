//! Host-boundary wrapper around the pure animation core. Owns the canvas
//! context, the RAF handle and every event-listener closure, so `destroy`
//! can detach exactly what `init` attached.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, TouchEvent};

use crate::model::{GridConfig, GridOptions};
use crate::render;
use crate::state::{GridState, TapAction, TouchGate};
use crate::util::{self, clog};

const MOUSE_HOVER_OPACITY: f64 = 0.6;
const TOUCH_HOVER_OPACITY: f64 = 0.8;
const MOUSE_LEAVE_TRAIL_OPACITY: f64 = 0.6;
const TOUCH_RELEASE_TRAIL_OPACITY: f64 = 0.8;
const TOUCH_RELEASE_TARGET_OPACITY: f64 = 0.4;

type SharedState = Rc<RefCell<GridState>>;
type RafHandle = Rc<RefCell<Option<i32>>>;
type RafCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct GridAnimation {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    config: Rc<GridConfig>,
    state: SharedState,
    gate: Rc<RefCell<TouchGate>>,
    raf_id: RafHandle,
    raf_cb: RafCallback,
    resize_cb: Option<Closure<dyn FnMut(Event)>>,
    mousemove_cb: Option<Closure<dyn FnMut(MouseEvent)>>,
    mouseleave_cb: Option<Closure<dyn FnMut(MouseEvent)>>,
    touchstart_cb: Option<Closure<dyn FnMut(TouchEvent)>>,
    touchmove_cb: Option<Closure<dyn FnMut(TouchEvent)>>,
    touchend_cb: Option<Closure<dyn FnMut(TouchEvent)>>,
    touchcancel_cb: Option<Closure<dyn FnMut(TouchEvent)>>,
    visibility_cb: Option<Closure<dyn FnMut(Event)>>,
}

impl GridAnimation {
    /// Returns `None` when the canvas has no usable 2D context; the host
    /// page simply skips the animation in that case.
    pub fn new(canvas: HtmlCanvasElement, options: GridOptions) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let mobile = util::is_phone();
        let mut config = options.build(mobile);
        if mobile {
            adapt_to_device(&ctx, &mut config);
        }
        Some(Self {
            canvas,
            ctx,
            config: Rc::new(config),
            state: Rc::new(RefCell::new(GridState::new())),
            gate: Rc::new(RefCell::new(TouchGate::new())),
            raf_id: Rc::new(RefCell::new(None)),
            raf_cb: Rc::new(RefCell::new(None)),
            resize_cb: None,
            mousemove_cb: None,
            mouseleave_cb: None,
            touchstart_cb: None,
            touchmove_cb: None,
            touchend_cb: None,
            touchcancel_cb: None,
            visibility_cb: None,
        })
    }

    /// Sizes the backing store, attaches input/visibility listeners, places
    /// the first special block and starts the frame loop.
    pub fn init(&mut self) {
        apply_canvas_size(&self.canvas, &self.ctx);
        self.attach_listeners();

        {
            let (w, h) = css_size(&self.canvas);
            let mut state = self.state.borrow_mut();
            state.spawn_special(
                self.config.square_size,
                w,
                h,
                self.config.special_block_color,
                &mut || js_sys::Math::random(),
            );
        }

        self.install_frame_loop();
        schedule_frame(&self.raf_id, &self.raf_cb);
        clog("grid animation started");
    }

    fn install_frame_loop(&self) {
        let state = self.state.clone();
        let config = self.config.clone();
        let ctx = self.ctx.clone();
        let canvas = self.canvas.clone();
        let raf_id = self.raf_id.clone();
        let raf_cb = self.raf_cb.clone();
        *self.raf_cb.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            let (w, h) = css_size(&canvas);
            {
                let mut st = state.borrow_mut();
                st.step(timestamp, &config, w, h, &mut || js_sys::Math::random());
                render::draw(&ctx, &config, &st, w, h, util::device_pixel_ratio());
            }
            schedule_frame(&raf_id, &raf_cb);
        }) as Box<dyn FnMut(f64)>));
    }

    fn attach_listeners(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let resize_cb = {
            let canvas = self.canvas.clone();
            let ctx = self.ctx.clone();
            Closure::wrap(Box::new(move |_: Event| {
                apply_canvas_size(&canvas, &ctx);
            }) as Box<dyn FnMut(_)>)
        };
        let _ = window
            .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
        self.resize_cb = Some(resize_cb);

        let mousemove_cb = {
            let state = self.state.clone();
            let config = self.config.clone();
            let canvas = self.canvas.clone();
            Closure::wrap(Box::new(move |e: MouseEvent| {
                let rect = canvas.get_bounding_client_rect();
                let x = e.client_x() as f64 - rect.left();
                let y = e.client_y() as f64 - rect.top();
                let captured = state.borrow_mut().pointer_move(
                    x,
                    y,
                    MOUSE_HOVER_OPACITY,
                    config.square_size,
                );
                if captured {
                    respawn_special(&state, &config, &canvas);
                }
            }) as Box<dyn FnMut(_)>)
        };
        let _ = self
            .canvas
            .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref());
        self.mousemove_cb = Some(mousemove_cb);

        let mouseleave_cb = {
            let state = self.state.clone();
            let config = self.config.clone();
            Closure::wrap(Box::new(move |_: MouseEvent| {
                state
                    .borrow_mut()
                    .release(MOUSE_LEAVE_TRAIL_OPACITY, 0.0, config.square_size);
            }) as Box<dyn FnMut(_)>)
        };
        let _ = self
            .canvas
            .add_event_listener_with_callback("mouseleave", mouseleave_cb.as_ref().unchecked_ref());
        self.mouseleave_cb = Some(mouseleave_cb);

        if self.config.mobile {
            self.attach_touch_listeners();
        }

        let visibility_cb = {
            let state = self.state.clone();
            let raf_id = self.raf_id.clone();
            let raf_cb = self.raf_cb.clone();
            Closure::wrap(Box::new(move |_: Event| {
                let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
                    return;
                };
                if doc.hidden() {
                    cancel_frame(&raf_id);
                } else if raf_id.borrow().is_none() {
                    // Fresh baseline so the hidden interval is not replayed.
                    state.borrow_mut().rebase_clock();
                    schedule_frame(&raf_id, &raf_cb);
                }
            }) as Box<dyn FnMut(_)>)
        };
        if let Some(doc) = window.document() {
            let _ = doc.add_event_listener_with_callback(
                "visibilitychange",
                visibility_cb.as_ref().unchecked_ref(),
            );
        }
        self.visibility_cb = Some(visibility_cb);
    }

    fn attach_touch_listeners(&mut self) {
        let touchstart_cb = {
            let state = self.state.clone();
            let config = self.config.clone();
            let canvas = self.canvas.clone();
            let gate = self.gate.clone();
            Closure::wrap(Box::new(move |e: TouchEvent| {
                e.prevent_default();
                match gate.borrow_mut().on_start(util::now_ms()) {
                    TapAction::Ignored => return,
                    TapAction::Reset => {
                        state.borrow_mut().reset();
                        respawn_special(&state, &config, &canvas);
                        if config.vibration_enabled {
                            util::vibrate(200);
                        }
                        return;
                    }
                    TapAction::Track => {}
                }
                let touches = e.touches();
                if touches.length() != 1 {
                    return;
                }
                let Some(touch) = touches.item(0) else {
                    return;
                };
                let rect = canvas.get_bounding_client_rect();
                let x = touch.client_x() as f64 - rect.left();
                let y = touch.client_y() as f64 - rect.top();
                let intensity = TOUCH_HOVER_OPACITY * config.touch_sensitivity;
                let captured =
                    state
                        .borrow_mut()
                        .pointer_move(x, y, intensity, config.square_size);
                if captured {
                    respawn_special(&state, &config, &canvas);
                    if config.vibration_enabled {
                        util::vibrate(100);
                    }
                } else if config.vibration_enabled {
                    util::vibrate(10);
                }
            }) as Box<dyn FnMut(_)>)
        };
        let _ = self
            .canvas
            .add_event_listener_with_callback("touchstart", touchstart_cb.as_ref().unchecked_ref());
        self.touchstart_cb = Some(touchstart_cb);

        let touchmove_cb = {
            let state = self.state.clone();
            let config = self.config.clone();
            let canvas = self.canvas.clone();
            let gate = self.gate.clone();
            Closure::wrap(Box::new(move |e: TouchEvent| {
                e.prevent_default();
                if !gate.borrow().active {
                    return;
                }
                let touches = e.touches();
                if touches.length() != 1 {
                    return;
                }
                let Some(touch) = touches.item(0) else {
                    return;
                };
                let rect = canvas.get_bounding_client_rect();
                let x = touch.client_x() as f64 - rect.left();
                let y = touch.client_y() as f64 - rect.top();
                let intensity = TOUCH_HOVER_OPACITY * config.touch_sensitivity;
                let captured =
                    state
                        .borrow_mut()
                        .pointer_move(x, y, intensity, config.square_size);
                if captured {
                    respawn_special(&state, &config, &canvas);
                    if config.vibration_enabled {
                        util::vibrate(100);
                    }
                }
            }) as Box<dyn FnMut(_)>)
        };
        let _ = self
            .canvas
            .add_event_listener_with_callback("touchmove", touchmove_cb.as_ref().unchecked_ref());
        self.touchmove_cb = Some(touchmove_cb);

        let touchend_cb = {
            let state = self.state.clone();
            let config = self.config.clone();
            let gate = self.gate.clone();
            Closure::wrap(Box::new(move |e: TouchEvent| {
                e.prevent_default();
                gate.borrow_mut().on_end();
                state.borrow_mut().release(
                    TOUCH_RELEASE_TRAIL_OPACITY,
                    TOUCH_RELEASE_TARGET_OPACITY,
                    config.square_size,
                );
            }) as Box<dyn FnMut(_)>)
        };
        let _ = self
            .canvas
            .add_event_listener_with_callback("touchend", touchend_cb.as_ref().unchecked_ref());
        self.touchend_cb = Some(touchend_cb);

        let touchcancel_cb = {
            let gate = self.gate.clone();
            Closure::wrap(Box::new(move |e: TouchEvent| {
                e.prevent_default();
                gate.borrow_mut().on_cancel();
            }) as Box<dyn FnMut(_)>)
        };
        let _ = self.canvas.add_event_listener_with_callback(
            "touchcancel",
            touchcancel_cb.as_ref().unchecked_ref(),
        );
        self.touchcancel_cb = Some(touchcancel_cb);
    }

    /// Cancels the pending frame and detaches every listener using the stored
    /// closure references. Idempotent.
    pub fn destroy(&mut self) {
        cancel_frame(&self.raf_id);
        self.raf_cb.borrow_mut().take();

        if let Some(cb) = self.mousemove_cb.take() {
            let _ = self
                .canvas
                .remove_event_listener_with_callback("mousemove", cb.as_ref().unchecked_ref());
        }
        if let Some(cb) = self.mouseleave_cb.take() {
            let _ = self
                .canvas
                .remove_event_listener_with_callback("mouseleave", cb.as_ref().unchecked_ref());
        }
        if let Some(cb) = self.touchstart_cb.take() {
            let _ = self
                .canvas
                .remove_event_listener_with_callback("touchstart", cb.as_ref().unchecked_ref());
        }
        if let Some(cb) = self.touchmove_cb.take() {
            let _ = self
                .canvas
                .remove_event_listener_with_callback("touchmove", cb.as_ref().unchecked_ref());
        }
        if let Some(cb) = self.touchend_cb.take() {
            let _ = self
                .canvas
                .remove_event_listener_with_callback("touchend", cb.as_ref().unchecked_ref());
        }
        if let Some(cb) = self.touchcancel_cb.take() {
            let _ = self
                .canvas
                .remove_event_listener_with_callback("touchcancel", cb.as_ref().unchecked_ref());
        }
        if let Some(window) = web_sys::window() {
            if let Some(cb) = self.resize_cb.take() {
                let _ = window
                    .remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
            }
            if let (Some(cb), Some(doc)) = (self.visibility_cb.take(), window.document()) {
                let _ = doc.remove_event_listener_with_callback(
                    "visibilitychange",
                    cb.as_ref().unchecked_ref(),
                );
            }
        }
        clog("grid animation destroyed");
    }
}

impl Drop for GridAnimation {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// CSS-pixel size of the canvas box.
fn css_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
    (canvas.offset_width() as f64, canvas.offset_height() as f64)
}

/// Backing store = CSS size x device pixel ratio; the CSS box is pinned so
/// the element does not grow with its own buffer.
fn apply_canvas_size(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d) {
    let dpr = util::device_pixel_ratio();
    let (w, h) = css_size(canvas);
    canvas.set_width((w * dpr).floor().max(0.0) as u32);
    canvas.set_height((h * dpr).floor().max(0.0) as u32);
    let style = canvas.style();
    let _ = style.set_property("width", &format!("{w}px"));
    let _ = style.set_property("height", &format!("{h}px"));
    let _ = ctx.scale(dpr, dpr);
}

fn respawn_special(state: &SharedState, config: &Rc<GridConfig>, canvas: &HtmlCanvasElement) {
    let (w, h) = css_size(canvas);
    state.borrow_mut().spawn_special(
        config.square_size,
        w,
        h,
        config.special_block_color,
        &mut || js_sys::Math::random(),
    );
}

fn schedule_frame(raf_id: &RafHandle, raf_cb: &RafCallback) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let cb_slot = raf_cb.borrow();
    let Some(cb) = cb_slot.as_ref() else {
        return;
    };
    if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
        *raf_id.borrow_mut() = Some(id);
    }
}

fn cancel_frame(raf_id: &RafHandle) {
    if let Some(id) = raf_id.borrow_mut().take() {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

/// One-shot fill-rate probe on phones: slow devices get a coarser, slower
/// grid with a shorter trail.
fn adapt_to_device(ctx: &CanvasRenderingContext2d, config: &mut GridConfig) {
    let Some(perf) = web_sys::window().and_then(|w| w.performance()) else {
        return;
    };
    let start = perf.now();
    for _ in 0..1000 {
        ctx.fill_rect(0.0, 0.0, 1.0, 1.0);
    }
    let score = perf.now() - start;
    if score > 10.0 {
        config.square_size = (config.square_size * 1.5).max(60.0);
        config.speed *= 0.7;
        config.trail_duration *= 0.5;
    } else if score > 5.0 {
        config.square_size = (config.square_size * 1.2).max(50.0);
        config.speed *= 0.8;
    }
}
