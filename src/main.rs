//! Goptcha entry point
//!
//! On the web this wires the engine to a page: clocks come from
//! `setInterval`, verdicts go out as DOM events, and the renderer pulls JSON
//! snapshots. Natively it plays one scripted session headlessly.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, CustomEventInit};

    use goptcha::{Challenge, ChallengeHost, RecordingHost, RuleSet, Settings, SharedChallenge};

    /// Height of the HUD strip above the play area
    const HEADER_HEIGHT: f32 = 40.0;
    const CONTAINER_ID: &str = "goptcha";

    /// Host that re-dispatches callbacks as `goptcha:*` events on `window`.
    /// Only ever handed callbacks after the engine is released, so listeners
    /// may call back into any export.
    struct DomHost;

    impl DomHost {
        fn emit(&self, name: &str, detail: JsValue) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let init = CustomEventInit::new();
            init.set_detail(&detail);
            match CustomEvent::new_with_event_init_dict(name, &init) {
                Ok(event) => {
                    let _ = window.dispatch_event(&event);
                }
                Err(e) => log::error!("Failed to create {} event: {:?}", name, e),
            }
        }
    }

    impl ChallengeHost for DomHost {
        fn on_challenge_response(&mut self, success: bool) {
            self.emit("goptcha:response", JsValue::from_bool(success));
        }

        fn on_challenge_expired(&mut self) {
            self.emit("goptcha:expired", JsValue::NULL);
        }

        fn on_challenge_error(&mut self) {
            self.emit("goptcha:error", JsValue::NULL);
        }
    }

    thread_local! {
        static GAME: SharedChallenge = const { SharedChallenge::new() };
    }

    fn with_game<T>(f: impl FnOnce(&mut Challenge<RecordingHost>) -> T) -> Option<T> {
        GAME.with(|game| game.with(&mut DomHost, f))
    }

    /// Play area size from the container element, minus the HUD
    fn container_size() -> Option<(f32, f32)> {
        let document = web_sys::window()?.document()?;
        let el = document.get_element_by_id(CONTAINER_ID)?;
        Some((
            el.client_width() as f32,
            el.client_height() as f32 - HEADER_HEIGHT,
        ))
    }

    #[wasm_bindgen]
    pub fn goptcha_start() {
        with_game(|g| g.start());
    }

    #[wasm_bindgen]
    pub fn goptcha_restart() {
        with_game(|g| g.restart());
    }

    /// Returns false when the name is not one of the four shapes
    #[wasm_bindgen]
    pub fn goptcha_click(shape: &str) -> bool {
        with_game(|g| g.handle_click_name(shape).is_ok()).unwrap_or(false)
    }

    #[wasm_bindgen]
    pub fn goptcha_snapshot() -> String {
        with_game(|g| g.snapshot().to_json())
            .and_then(|json| json.ok())
            .unwrap_or_default()
    }

    /// Switch to the named rule set ("revised" or "legacy") and remember it.
    /// Returns false for unknown names or while a session is under way.
    #[wasm_bindgen]
    pub fn goptcha_set_rules(name: &str) -> bool {
        let Some(rules) = RuleSet::from_name(name) else {
            log::warn!("Unknown rule set {:?}", name);
            return false;
        };
        with_game(|g| {
            let changed = g.set_rules(rules);
            if changed {
                g.settings().save();
            }
            changed
        })
        .unwrap_or(false)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        let settings = Settings::load();
        let tick_ms = settings.motion_tick_ms;

        let challenge = match Challenge::new(settings, RecordingHost::new()) {
            Ok(challenge) => challenge,
            Err(e) => {
                log::error!("Goptcha failed to start: {}", e);
                return;
            }
        };
        GAME.with(|game| game.install(challenge));

        // The live container wins over the stored size; a collapsed or hidden
        // container is ignored by resize and the stored size stays
        if let Some((w, h)) = container_size() {
            with_game(|g| g.resize(w, h));
        }

        let Some(window) = web_sys::window() else {
            return;
        };

        // Motion clock; the engine schedules everything else off it
        let tick = Closure::<dyn FnMut()>::new(move || {
            with_game(|g| g.advance(u64::from(tick_ms)));
        });
        if let Err(e) = window.set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            tick_ms as i32,
        ) {
            log::error!("Failed to start clock: {:?}", e);
        }
        tick.forget();

        let resize = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Some((w, h)) = container_size() {
                with_game(|g| g.resize(w, h));
            }
        });
        let _ = window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref());
        resize.forget();

        log::info!("Goptcha ready");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Goptcha (native) starting...");
    log::info!("Native mode runs a scripted session - serve the wasm build for the widget");

    // Optional rule set name; a valid one is also written back to the
    // settings file when GOPTCHA_SETTINGS names one
    let rules = match std::env::args().nth(1) {
        Some(name) => match goptcha::RuleSet::from_name(&name) {
            Some(rules) => Some(rules),
            None => {
                eprintln!("Unknown rule set {:?} (expected revised or legacy)", name);
                std::process::exit(2);
            }
        },
        None => None,
    };

    if let Err(e) = play_scripted_session(rules) {
        eprintln!("Scripted session failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// A bot that waits a reaction delay after the shapes reappear, then clicks
/// the target. Exercises the same path a page would.
#[cfg(not(target_arch = "wasm32"))]
fn play_scripted_session(rules: Option<goptcha::RuleSet>) -> Result<(), goptcha::ChallengeError> {
    use goptcha::sim::ChallengeState;
    use goptcha::{Challenge, RecordingHost, Settings};

    const REACTION_MS: u64 = 400;

    let settings = Settings::load();
    let frame_ms = u64::from(settings.motion_tick_ms);
    let mut challenge = Challenge::new(settings, RecordingHost::new())?;
    if let Some(rules) = rules {
        if challenge.set_rules(rules) {
            challenge.settings().save();
        }
    }
    challenge.start();

    let mut hidden_for = 0;
    while challenge.snapshot().state == ChallengeState::Playing {
        challenge.advance(frame_ms);
        let snapshot = challenge.snapshot();
        if snapshot.target_visible {
            hidden_for = 0;
            continue;
        }
        hidden_for += frame_ms;
        if hidden_for >= REACTION_MS {
            if let Some(target) = snapshot.target {
                log::info!("Bot clicks {} at t={}ms", target, challenge.scheduler().now());
                challenge.handle_click(target);
            }
            hidden_for = 0;
        }
    }

    let snapshot = challenge.snapshot();
    println!("{}", snapshot.to_json()?);
    println!("Host saw: {:?}", challenge.host().events);
    Ok(())
}
