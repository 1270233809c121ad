//! Prize wheel entry point
//!
//! The browser build wires the engine to the page; the native build runs a
//! headless demo spin on a manual clock.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlButtonElement, HtmlCanvasElement, HtmlElement};

    use prize_wheel::audio::AudioManager;
    use prize_wheel::persistence::{LocalStorage, Persistence};
    use prize_wheel::platform::RafScheduler;
    use prize_wheel::renderer::CanvasPainter;
    use prize_wheel::settings::Appearance;
    use prize_wheel::sim::{PrizeSet, Segment};
    use prize_wheel::{NoticeLevel, WheelEngine, WheelObserver};

    /// Paints frames and reports results into the page
    struct PageObserver {
        window: web_sys::Window,
        document: web_sys::Document,
        painter: CanvasPainter,
    }

    impl PageObserver {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_style(&self, id: &str, property: &str, value: &str) {
            if let Some(el) = self
                .document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let _ = el.style().set_property(property, value);
            }
        }

        /// Apply title, pointer, border and button styling
        fn apply_appearance(&self, look: &Appearance) {
            self.set_text("wheelTitle", &look.title);
            self.set_style("wheelTitle", "color", &look.title_text_color);
            self.set_style("wheelTitle", "text-shadow", &look.title_text_shadow());
            self.set_style("pointer", "border-top-color", &look.pointer_color);
            self.set_style("canvasContainer", "border-color", &look.wheel_border_color);
            self.set_text("spinButton", &look.spin_button_text);
            self.set_style("spinButton", "background-color", &look.spin_button_color);
            self.set_style("spinButton", "box-shadow", &look.spin_button_box_shadow());
        }

        fn set_button_enabled(&self, enabled: bool) {
            if let Some(btn) = self
                .document
                .get_element_by_id("spinButton")
                .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
            {
                btn.set_disabled(!enabled);
            }
        }
    }

    impl WheelObserver for PageObserver {
        fn frame(&self, rotation_deg: f64, prizes: &PrizeSet) {
            self.painter.draw(rotation_deg, prizes);
        }

        fn winner(&self, segment: &Segment) {
            self.set_text("winnerDisplay", &format!("{} {}", segment.icon, segment.name));
            self.set_button_enabled(true);
        }

        fn notify(&self, level: NoticeLevel, message: &str) {
            match level {
                NoticeLevel::Error => log::error!("{}", message),
                NoticeLevel::Info | NoticeLevel::Success => log::info!("{}", message),
            }
            self.set_text("notification", message);
        }

        fn confirm(&self, prompt: &str) -> bool {
            self.window.confirm_with_message(prompt).unwrap_or(false)
        }
    }

    fn spin(engine: &Rc<RefCell<WheelEngine>>, audio: &AudioManager, observer: &PageObserver) {
        // Browsers only allow audio after a user gesture
        audio.resume();
        match engine.borrow_mut().request_spin() {
            Ok(Some(_)) => {
                observer.set_text("winnerDisplay", "");
                observer.set_button_enabled(false);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Spin failed: {}", e),
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        log::info!("Prize wheel starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("wheelCanvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #wheelCanvas element");
            return;
        };
        let Some(painter) = CanvasPainter::new(canvas) else {
            log::error!("Canvas 2D context unavailable");
            return;
        };
        painter.resize();

        let store = match LocalStorage::open() {
            Some(storage) => Persistence::new(storage),
            None => {
                log::warn!("localStorage unavailable, nothing will be saved");
                Persistence::in_memory()
            }
        };

        let observer = Rc::new(PageObserver {
            window: window.clone(),
            document: document.clone(),
            painter,
        });
        let scheduler = Rc::new(RafScheduler::new(window.clone()));
        let seed = js_sys::Date::now() as u64;

        let engine = WheelEngine::new(scheduler, store, seed);
        let audio = Rc::new(AudioManager::new(engine.settings().audio.clone()));
        let engine = engine
            .with_observer(observer.clone())
            .with_audio(audio.clone());

        observer.apply_appearance(&engine.settings().appearance);
        engine.redraw();

        let engine = Rc::new(RefCell::new(engine));

        // Spin button
        if let Some(btn) = document.get_element_by_id("spinButton") {
            let engine = engine.clone();
            let audio = audio.clone();
            let observer = observer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                spin(&engine, &audio, &observer);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let engine = engine.clone();
            let audio = audio.clone();
            let observer = observer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if matches!(event.key().as_str(), " " | "Enter") {
                    event.prevent_default();
                    spin(&engine, &audio, &observer);
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keep the canvas crisp when the layout changes
        {
            let engine = engine.clone();
            let observer = observer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                observer.painter.resize();
                if let Ok(engine) = engine.try_borrow() {
                    engine.redraw();
                }
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        log::info!("Prize wheel ready");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Prize wheel (native) starting...");
    log::info!("The interactive wheel runs in the browser; running a headless demo spin");

    if let Err(e) = demo_spin() {
        log::error!("Demo spin failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn demo_spin() -> prize_wheel::Result<()> {
    use std::rc::Rc;

    use prize_wheel::WheelEngine;
    use prize_wheel::consts::FRAME_INTERVAL_MS;
    use prize_wheel::persistence::Persistence;
    use prize_wheel::platform::{ManualScheduler, wall_clock_ms};

    let scheduler = Rc::new(ManualScheduler::new());
    let mut engine = WheelEngine::new(scheduler.clone(), Persistence::in_memory(), wall_clock_ms() as u64);

    for segment in engine.prizes().iter() {
        println!("  [{}] {} {}", segment.order_index, segment.icon, segment.name);
    }

    let Some(plan) = engine.request_spin()? else {
        return Ok(());
    };
    let frames = scheduler.run_until_idle(FRAME_INTERVAL_MS, 10_000);

    println!(
        "\nSpun {} revolutions in {} ms ({} frames), stopped at {:.2} deg",
        plan.revolutions,
        plan.duration_ms,
        frames,
        engine.rotation_deg()
    );
    if let Some(winner) = engine.last_winner() {
        println!("Winner: {} {}", winner.icon, winner.name);
    }
    Ok(())
}
