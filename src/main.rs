//! Ghost Scare entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, Window};

    use ghost_scare::audio::{AudioManager, SoundEffect};
    use ghost_scare::consts::*;
    use ghost_scare::hud::HudSnapshot;
    use ghost_scare::renderer::SdfRenderState;
    use ghost_scare::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
    use ghost_scare::{Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        render_state: Option<SdfRenderState>,
        audio: AudioManager,
        /// Mirrors the `#audioEnabled` toggle
        audio_allowed: bool,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Last HUD written to the DOM
        hud: Option<HudSnapshot>,
        hud_fps: u32,
    }

    impl Game {
        fn new(tuning: Tuning, settings: Settings, seed: u64) -> Self {
            Self {
                state: GameState::new(tuning),
                audio: AudioManager::new(&settings, seed),
                audio_allowed: settings.audio_enabled,
                settings,
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                hud: None,
                hud_fps: u32::MAX,
            }
        }

        fn overlay_visible(&self) -> bool {
            self.state.phase != GamePhase::Playing
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(MAX_FRAME_DT);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.scare = false;
                self.input.pause = false;
            }
            if substeps == MAX_SUBSTEPS {
                self.accumulator = self.accumulator.min(SIM_DT);
            }

            self.handle_events();
            self.audio.update(dt);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn handle_events(&mut self) {
            for event in self.state.drain_events() {
                if let Some(effect) = SoundEffect::for_event(&event) {
                    self.audio.play(effect);
                }
                if event == GameEvent::Victory {
                    self.audio.stop();
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, &self.settings, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, document: &Document) {
            if self.settings.show_fps && self.fps != self.hud_fps {
                if let Some(el) = document.get_element_by_id("fps") {
                    el.set_text_content(Some(&format!("FPS: {}", self.fps)));
                }
                self.hud_fps = self.fps;
            }

            let snapshot = HudSnapshot::from_state(&self.state);
            if self.hud.as_ref() == Some(&snapshot) {
                return;
            }

            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&snapshot.score));
            }
            if let Some(el) = document.get_element_by_id("level") {
                el.set_text_content(Some(&snapshot.level));
            }

            if let Some(overlay) = document.get_element_by_id("overlay") {
                match &snapshot.overlay {
                    Some((title, sub)) => {
                        if let Some(el) = document.get_element_by_id("overlay-title") {
                            el.set_text_content(Some(title));
                        }
                        if let Some(el) = document.get_element_by_id("overlay-sub") {
                            el.set_text_content(Some(sub));
                        }
                        let _ = overlay.class_list().remove_1("hidden");
                    }
                    None => {
                        let _ = overlay.class_list().add_1("hidden");
                    }
                }
            }

            self.hud = Some(snapshot);
        }

        /// Reset game state for restart
        fn restart(&mut self) {
            self.state.restart();
            self.accumulator = 0.0;
            self.input = TickInput::default();
            if self.audio_allowed && !self.audio.is_running() {
                self.audio.start();
            }
        }

        fn set_audio_allowed(&mut self, allowed: bool) {
            self.audio_allowed = allowed;
            if allowed {
                self.audio.start();
                self.audio.resume();
            } else {
                self.audio.stop();
            }
        }
    }

    fn window() -> Result<Window, JsValue> {
        web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
    }

    fn document() -> Result<Document, JsValue> {
        window()?
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))
    }

    /// Size the canvas backing store to the window in device pixels.
    /// Returns (css width, css height, device pixel ratio).
    fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) -> (f32, f32, f32) {
        let dpr = window.device_pixel_ratio();
        let css_w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_VIEWPORT_WIDTH as f64);
        let css_h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_VIEWPORT_HEIGHT as f64);
        canvas.set_width((css_w * dpr) as u32);
        canvas.set_height((css_h * dpr) as u32);
        (css_w as f32, css_h as f32, dpr as f32)
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        log::info!("Ghost Scare starting...");

        let window = window()?;
        let document = document()?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game")
            .ok_or_else(|| JsValue::from_str("no #game canvas"))?
            .dyn_into()?;

        let (css_w, css_h, dpr) = fit_canvas(&window, &canvas);

        let tuning = Tuning::load();
        let mut settings = Settings::load();
        let toggle = document
            .get_element_by_id("audioEnabled")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        match &toggle {
            Some(toggle) => settings.audio_enabled = toggle.checked(),
            None => log::warn!("No #audioEnabled toggle; audio follows settings"),
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(tuning, settings, seed)));
        game.borrow_mut().state.set_viewport(css_w, css_h);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("no GPU adapter: {e}")))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut render_state =
            SdfRenderState::new(surface, &adapter, canvas.width(), canvas.height(), dpr)
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
        render_state.set_start_time(window.performance().map_or(0.0, |p| p.now()));
        game.borrow_mut().render_state = Some(render_state);

        if game.borrow().audio_allowed {
            game.borrow_mut().audio.start();
        }

        setup_keyboard(&window, game.clone())?;
        setup_restart_button(&document, game.clone())?;
        if let Some(toggle) = toggle {
            setup_audio_toggle(toggle, game.clone())?;
        }
        setup_resize(&window, canvas, game.clone())?;
        setup_auto_pause(&window, &document, game.clone())?;

        request_animation_frame(game);

        log::info!("Ghost Scare running!");
        Ok(())
    }

    fn setup_keyboard(window: &Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if matches!(
                    key.as_str(),
                    " " | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight"
                ) {
                    event.prevent_default();
                }

                let mut g = game.borrow_mut();
                // Autoplay policy: contexts created before a gesture start suspended
                g.audio.resume();
                match key.as_str() {
                    "ArrowLeft" => g.input.left = true,
                    "ArrowRight" => g.input.right = true,
                    "ArrowUp" => g.input.jump = true,
                    "Shift" => g.input.sprint = true,
                    " " if !g.overlay_visible() => g.input.scare = true,
                    "Escape" if !event.repeat() => g.input.pause = true,
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => g.input.left = false,
                    "ArrowRight" => g.input.right = false,
                    "ArrowUp" => g.input.jump = false,
                    "Shift" => g.input.sprint = false,
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render(time);
            if let Ok(document) = document() {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let Some(btn) = document.get_element_by_id("restart") else {
            log::warn!("No #restart button");
            return Ok(());
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            game.borrow_mut().restart();
        });
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_audio_toggle(toggle: HtmlInputElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let input = toggle.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let allowed = input.checked();
            log::info!("Audio {}", if allowed { "enabled" } else { "disabled" });
            game.borrow_mut().set_audio_allowed(allowed);
        });
        toggle.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_resize(
        window: &Window,
        canvas: HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (css_w, css_h, dpr) = fit_canvas(&window, &canvas);
            let mut g = game.borrow_mut();
            g.state.set_viewport(css_w, css_h);
            if let Some(render_state) = g.render_state.as_mut() {
                render_state.set_pixel_ratio(dpr);
                render_state.resize(canvas.width(), canvas.height());
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_auto_pause(
        window: &Window,
        document: &Document,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == GamePhase::Playing {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                // Held keys never see their keyup once focus is gone
                g.input = TickInput::default();
                if g.state.phase == GamePhase::Playing {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Ghost Scare failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ghost Scare (native) starting...");
    log::info!("Native mode runs a headless demo - use `trunk serve` for the web version");

    let state = headless_demo(ghost_scare::Tuning::load(), 60 * 60);
    log::info!(
        "Demo finished: phase {:?}, score {}, level {} ({}), {} ticks",
        state.phase,
        state.score,
        state.level_index + 1,
        state.current_level().name,
        state.time_ticks
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run: drift right, hop now and then, and scare on a fixed rhythm
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo(tuning: ghost_scare::Tuning, max_ticks: u32) -> ghost_scare::sim::GameState {
    use ghost_scare::consts::SIM_DT;
    use ghost_scare::sim::{GameEvent, GameState, TickInput, tick};

    let mut state = GameState::new(tuning);
    for step in 0..max_ticks {
        let input = TickInput {
            right: true,
            jump: step % 90 < 4,
            sprint: step % 240 < 120,
            scare: step % 20 == 0,
            ..TickInput::default()
        };
        tick(&mut state, &input, SIM_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::ScareMissed => {}
                other => log::info!("tick {}: {:?}", state.time_ticks, other),
            }
        }
        if state.phase.is_over() {
            break;
        }
    }
    state
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_headless_demo_runs_to_a_sane_state() {
        let state = headless_demo(ghost_scare::Tuning::default(), 600);

        assert!(state.time_ticks <= 600);
        assert!(state.level_index < state.levels.len());
        assert!(state.player.pos.is_finite());
        assert!(state.player.vel.is_finite());

        let scared = state
            .levels
            .iter()
            .flat_map(|level| &level.kids)
            .filter(|kid| kid.scared)
            .count() as u32;
        assert!(state.score <= scared);
        assert!(state.score <= state.win_target());
    }

    #[test]
    fn test_headless_demo_stops_when_over() {
        let state = headless_demo(ghost_scare::Tuning::default(), 3600);
        assert!(state.phase.is_over() || state.time_ticks == 3600);
    }
}
