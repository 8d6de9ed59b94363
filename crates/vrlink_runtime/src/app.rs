//! Demo application handlers
//!
//! A headless version of the classic spinning-triangle sample: keyboard
//! events steer a rotation angle and the escape key ends the run. Drawing
//! itself lives on the native side of the boundary, so the scene pass here
//! only reads the viewport values out of the render state.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vrlink_core::prelude::*;

/// How often the scene pass logs a frame summary
const FRAME_LOG_INTERVAL: u64 = 300;

#[derive(Debug, Default)]
struct SharedState {
    rotate_angle: f32,
}

/// Event + render handler for the demo run
///
/// Cloning shares the control state, so one `App` can be registered for
/// events and a clone of it for rendering, the way the original sample
/// attaches a single object to both registries.
#[derive(Clone)]
pub struct App {
    running: Arc<AtomicBool>,
    state: Arc<Mutex<SharedState>>,
    frames: u64,
}

impl App {
    pub fn new(running: Arc<AtomicBool>) -> Self {
        Self {
            running,
            state: Arc::new(Mutex::new(SharedState::default())),
            frames: 0,
        }
    }

    fn apply_event(&mut self, name: &str) {
        match name {
            "/KbdEsc_Down" => {
                log::info!("escape pressed; leaving the main loop");
                self.running.store(false, Ordering::Relaxed);
            }
            "/KbdRight_Down" | "/KbdRight_Repeat" => {
                self.state.lock().rotate_angle += 0.05;
            }
            "/KbdLeft_Down" | "/KbdLeft_Repeat" => {
                self.state.lock().rotate_angle -= 0.05;
            }
            _ => {}
        }
    }
}

impl VrEventHandler for App {
    fn on_event(&mut self, name: &str, _data: &DataIndex) {
        self.apply_event(name);
    }
}

impl VrRenderHandler for App {
    fn on_render_context(&mut self, state: &DataIndex) {
        if state
            .get_value("InitRender", "/")
            .and_then(|v| v.as_int())
            .unwrap_or(0)
            != 0
        {
            log::info!("render context initialized");
        }
    }

    fn on_render_scene(&mut self, state: &DataIndex) {
        self.frames += 1;
        if self.frames % FRAME_LOG_INTERVAL != 0 {
            return;
        }

        let width = state.get_value("WindowWidth", "/").and_then(|v| v.as_float());
        let height = state.get_value("WindowHeight", "/").and_then(|v| v.as_float());
        let angle = self.state.lock().rotate_angle;
        match (width, height) {
            (Some(w), Some(h)) => {
                log::info!("frame {}: {}x{} viewport, angle {:.2}", self.frames, w, h, angle)
            }
            _ => log::info!("frame {}: angle {:.2}", self.frames, angle),
        }
    }
}

/// Built-in plugin that traces every dispatched event
///
/// Registered in the driver's plugin table; activated only when the native
/// runtime lists `event_trace` in its companion plugin list.
pub struct EventTracePlugin;

impl VrPlugin for EventTracePlugin {
    fn name(&self) -> &str {
        "event_trace"
    }

    fn register(&self, session: &mut VrSession) -> Result<()> {
        session.add_event_handler(EventTraceHandler)
    }
}

struct EventTraceHandler;

impl VrEventHandler for EventTraceHandler {
    fn on_event(&mut self, name: &str, _data: &DataIndex) {
        log::trace!("event: {}", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_clears_the_running_flag() {
        let running = Arc::new(AtomicBool::new(true));
        let mut app = App::new(running.clone());

        app.apply_event("/KbdX_Down");
        assert!(running.load(Ordering::Relaxed));

        app.apply_event("/KbdEsc_Down");
        assert!(!running.load(Ordering::Relaxed));
    }

    #[test]
    fn test_arrow_keys_steer_the_shared_angle() {
        let mut app = App::new(Arc::new(AtomicBool::new(true)));
        let render_side = app.clone();

        app.apply_event("/KbdRight_Down");
        app.apply_event("/KbdRight_Repeat");
        app.apply_event("/KbdLeft_Down");

        let angle = render_side.state.lock().rotate_angle;
        assert!((angle - 0.05).abs() < f32::EPSILON);
    }
}
