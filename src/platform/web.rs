//! Browser scheduler backed by `requestAnimationFrame`

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::scheduler::{FrameCallback, FrameToken, Scheduler};

struct PendingFrame {
    raf_id: i32,
    callback: FrameCallback,
}

/// `Scheduler` on top of the window's repaint hook
///
/// Callbacks are held on the Rust side; the JS shim only carries the token,
/// so cancelling drops the callback immediately.
pub struct RafScheduler {
    window: web_sys::Window,
    next_token: Cell<u64>,
    pending: Rc<RefCell<HashMap<FrameToken, PendingFrame>>>,
}

impl RafScheduler {
    pub fn new(window: web_sys::Window) -> Self {
        Self {
            window,
            next_token: Cell::new(1),
            pending: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    fn run(pending: &Weak<RefCell<HashMap<FrameToken, PendingFrame>>>, token: FrameToken, time: f64) {
        let Some(pending) = pending.upgrade() else { return };
        let frame = pending.borrow_mut().remove(&token);
        if let Some(frame) = frame {
            (frame.callback)(time);
        }
    }
}

impl Scheduler for RafScheduler {
    fn now(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn schedule_frame(&self, callback: FrameCallback) -> FrameToken {
        let token = FrameToken(self.next_token.get());
        self.next_token.set(token.0 + 1);

        let pending = Rc::downgrade(&self.pending);
        let shim = Closure::once_into_js(move |time: f64| {
            RafScheduler::run(&pending, token, time);
        });

        match self.window.request_animation_frame(shim.unchecked_ref()) {
            Ok(raf_id) => {
                self.pending
                    .borrow_mut()
                    .insert(token, PendingFrame { raf_id, callback });
            }
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        token
    }

    fn cancel(&self, token: FrameToken) {
        let frame = self.pending.borrow_mut().remove(&token);
        if let Some(frame) = frame {
            let _ = self.window.cancel_animation_frame(frame.raf_id);
        }
    }
}
