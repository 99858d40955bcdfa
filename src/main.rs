//! Neon Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop. The web
//! build drives the simulation from `requestAnimationFrame` and exposes the
//! per-frame render state to the JS renderer; the native build plays a
//! headless autopilot run.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde::Serialize;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, TouchEvent};

    use neon_runner::audio::AudioManager;
    use neon_runner::consts::*;
    use neon_runner::platform::{SwipeTracker, command_for_key};
    use neon_runner::sim::{Command, GamePhase, Renderable, SessionSnapshot};
    use neon_runner::{Game, LocalHighScore, Settings, Tuning};

    thread_local! {
        static HOST: RefCell<Option<Rc<RefCell<Host>>>> = const { RefCell::new(None) };
    }

    /// Everything the JS renderer needs for one frame
    #[derive(Serialize)]
    struct Frame {
        snapshot: SessionSnapshot,
        renderables: Vec<Renderable>,
    }

    /// Host state around the game: timing, queued input, preferences
    struct Host {
        game: Game<AudioManager, LocalHighScore>,
        settings: Settings,
        accumulator: f32,
        last_time: f64,
        /// Commands from input handlers, applied at the top of the next frame
        pending: Vec<Command>,
        swipe: SwipeTracker,
    }

    impl Host {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                game: Game::new(seed, Tuning::load(), audio, LocalHighScore::load()),
                settings,
                accumulator: 0.0,
                last_time: 0.0,
                pending: Vec::new(),
                swipe: SwipeTracker::default(),
            }
        }

        fn queue(&mut self, command: Command) {
            // Input handlers run inside a user gesture, the only time audio may resume
            self.game.audio_mut().resume();
            self.pending.push(command);
        }

        /// Apply queued commands, then run fixed simulation steps
        fn update(&mut self, dt: f32) {
            for command in std::mem::take(&mut self.pending) {
                self.game.command(command);
            }

            self.accumulator += dt.min(MAX_FRAME_DT);
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.game.update(SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        fn frame_json(&self) -> String {
            let frame = Frame {
                snapshot: self.game.snapshot(),
                renderables: self.game.renderables(),
            };
            serde_json::to_string(&frame).unwrap_or_default()
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let snap = self.game.snapshot();
            set_text(document, "#hud-score .hud-value", &snap.score.to_string());
            set_text(document, "#hud-distance .hud-value", &snap.distance.to_string());
            set_text(document, "#hud-crystals .hud-value", &snap.crystals.to_string());
            set_text(document, "#hud-best .hud-value", &snap.high_score.to_string());

            show(document, "menu", snap.phase == GamePhase::Idle);
            show(document, "hud", snap.phase != GamePhase::Idle);
            show(document, "game-over", snap.phase == GamePhase::GameOver);
            if snap.phase == GamePhase::GameOver {
                set_text(document, "#final-score", &snap.score.to_string());
                set_text(document, "#final-distance", &snap.distance.to_string());
            }
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Current frame for the JS renderer, as JSON
    #[wasm_bindgen]
    pub fn frame_state() -> String {
        HOST.with(|host| {
            host.borrow()
                .as_ref()
                .map(|h| h.borrow().frame_json())
                .unwrap_or_default()
        })
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        // Fails only if a logger is already installed
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Neon Runner starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window - cannot start");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document - cannot start");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let host = Rc::new(RefCell::new(Host::new(seed)));
        HOST.with(|h| *h.borrow_mut() = Some(host.clone()));

        setup_input_handlers(&window, &document, host.clone());
        setup_visibility(&document, host.clone());

        request_animation_frame(host);
        log::info!("Neon Runner running!");
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        document: &Document,
        host: Rc<RefCell<Host>>,
    ) {
        // Keyboard
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                let mut h = host.borrow_mut();
                if let Some(command) = command_for_key(&event.key(), h.game.phase()) {
                    event.prevent_default();
                    h.queue(command);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.changed_touches().get(0) {
                    host.borrow_mut()
                        .swipe
                        .begin(touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch cancel
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                host.borrow_mut().swipe.cancel();
            });
            let _ = document
                .add_event_listener_with_callback("touchcancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end (swipe or tap)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(touch) = event.changed_touches().get(0) else {
                    return;
                };
                let mut h = host.borrow_mut();
                let phase = h.game.phase();
                let command = h
                    .swipe
                    .end(touch.client_x() as f32, touch.client_y() as f32, phase);
                if let Some(command) = command {
                    event.prevent_default();
                    h.queue(command);
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_visibility(document: &Document, host: Rc<RefCell<Host>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut h = host.borrow_mut();
            if !h.settings.mute_on_blur {
                return;
            }
            let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
            let muted = hidden || h.settings.muted;
            h.game.audio_mut().set_muted(muted);
            // Drop the time spent hidden instead of fast-forwarding through it
            h.last_time = 0.0;
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        {
            let mut h = host.borrow_mut();

            let dt = if h.last_time > 0.0 {
                ((time - h.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            h.last_time = time;

            h.update(dt);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                h.update_hud(&document);
            }
        }

        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Longest native demo run in simulated seconds
#[cfg(not(target_arch = "wasm32"))]
const DEMO_SECONDS: f32 = 180.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_runner::audio::SilentAudio;
    use neon_runner::consts::SIM_DT;
    use neon_runner::sim::{GamePhase, autopilot_command};
    use neon_runner::{Game, HighScoreStore, LocalHighScore, Tuning};

    env_logger::init();
    log::info!("Neon Runner (native) starting headless autopilot demo...");

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut game = Game::new(seed, Tuning::load(), SilentAudio, LocalHighScore::load());

    let mut elapsed = 0.0;
    while elapsed < DEMO_SECONDS && game.phase() != GamePhase::GameOver {
        if let Some(command) = autopilot_command(game.session()) {
            game.command(command);
        }
        game.update(SIM_DT);
        elapsed += SIM_DT;
    }

    let snap = game.snapshot();
    let stats = game.session().spawner.stats;
    println!("Seed:      {seed}");
    println!("Outcome:   {:?} after {:.1}s", snap.phase, elapsed);
    println!("Distance:  {}", snap.distance);
    println!("Crystals:  {}", snap.crystals);
    println!("Avoided:   {}", snap.obstacles_avoided);
    println!("Score:     {}", snap.score);
    println!("Best:      {}", game.scores().high_score());
    println!(
        "Spawned:   {} obstacles ({} double), {} patterns, {} blocked, {} pool-limited",
        stats.obstacles, stats.double_walls, stats.patterns, stats.blocked, stats.exhausted
    );
}
