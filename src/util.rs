//! Host helpers: console logging, device detection, swipe classification.

use wasm_bindgen::JsValue;

pub fn clog(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

const PHONE_MARKERS: [&str; 8] = [
    "Mobile",
    "Android",
    "iOS",
    "iPhone",
    "iPad",
    "iPod",
    "Windows Phone",
    "KFAPWI",
];

pub fn is_phone() -> bool {
    web_sys::window()
        .and_then(|w| w.navigator().user_agent().ok())
        .map(|ua| PHONE_MARKERS.iter().any(|m| ua.contains(m)))
        .unwrap_or(false)
}

pub fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|dpr| *dpr > 0.0)
        .unwrap_or(1.0)
}

pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub fn vibrate(ms: u32) {
    if let Some(win) = web_sys::window() {
        let _ = win.navigator().vibrate_with_duration(ms);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
    Undirected,
}

/// Classifies a touch drag by angle, with a 2px dead zone. Used for the
/// swipe-up enter gesture on the intro page.
pub fn move_direction(start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> SwipeDirection {
    let dx = end_x - start_x;
    let dy = end_y - start_y;
    if dx.abs() < 2.0 && dy.abs() < 2.0 {
        return SwipeDirection::Undirected;
    }
    let angle = dy.atan2(dx).to_degrees();
    if (-135.0..=-45.0).contains(&angle) {
        SwipeDirection::Up
    } else if angle > 45.0 && angle < 135.0 {
        SwipeDirection::Down
    } else if !(-135.0..135.0).contains(&angle) {
        SwipeDirection::Left
    } else {
        SwipeDirection::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_cardinal_swipes() {
        assert_eq!(move_direction(0.0, 0.0, 50.0, 0.0), SwipeDirection::Right);
        assert_eq!(move_direction(0.0, 0.0, -50.0, 0.0), SwipeDirection::Left);
        assert_eq!(move_direction(0.0, 0.0, 0.0, -50.0), SwipeDirection::Up);
        assert_eq!(move_direction(0.0, 0.0, 0.0, 50.0), SwipeDirection::Down);
    }

    #[test]
    fn diagonals_lean_to_nearest_quadrant() {
        assert_eq!(move_direction(0.0, 0.0, 10.0, -30.0), SwipeDirection::Up);
        assert_eq!(move_direction(0.0, 0.0, -30.0, 10.0), SwipeDirection::Left);
    }

    #[test]
    fn small_jitter_is_undirected() {
        assert_eq!(move_direction(0.0, 0.0, 1.5, -1.5), SwipeDirection::Undirected);
    }
}
