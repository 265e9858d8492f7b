//! Browser glue
//!
//! `BlockNinja` mounts the game on a canvas, runs the animation-frame loop,
//! feeds pointer/touch/keyboard events into a [`SampleQueue`] and mirrors
//! menu and HUD state into the host page's DOM. Host hooks are plain JS
//! functions on an object passed at construction.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlCanvasElement, HtmlElement, KeyboardEvent, PointerEvent, TouchEvent};

use super::input::{PointerSample, SampleQueue, TouchTracker, Viewport, primary_sample};
use super::menu::MENU_BUTTONS;
use super::reentry::read_or_last;
use crate::audio::AudioManager;
use crate::game::{Game, Host, MenuAction};
use crate::persistence::LocalStore;
use crate::renderer::{self, CanvasSurface};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameMode, GameSession, Hud, MenuState};

/// Host hooks read off a JS object (`canPlay`, `requireWallet`, ...)
struct JsHost {
    hooks: JsValue,
}

impl JsHost {
    fn hook(&self, name: &str) -> Option<js_sys::Function> {
        js_sys::Reflect::get(&self.hooks, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()
    }

    fn call(&self, name: &str, arg: Option<JsValue>) -> Option<JsValue> {
        let hook = self.hook(name)?;
        let result = match arg {
            Some(arg) => hook.call1(&self.hooks, &arg),
            None => hook.call0(&self.hooks),
        };
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Host hook {name} threw: {err:?}");
                None
            }
        }
    }
}

impl Host for JsHost {
    fn can_play(&self) -> bool {
        match self.hook("canPlay") {
            Some(_) => self.call("canPlay", None).and_then(|v| v.as_bool()).unwrap_or(false),
            // Also accept a plain boolean property
            None => js_sys::Reflect::get(&self.hooks, &JsValue::from_str("canPlay"))
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        }
    }

    fn require_wallet(&mut self) {
        self.call("requireWallet", None);
    }

    fn submit_score(&mut self, score: u64) {
        let Some(result) = self.call("submitScore", Some(JsValue::from_f64(score as f64))) else {
            return;
        };
        // Fire and forget; only a rejection is worth a log line
        if let Ok(promise) = result.dyn_into::<js_sys::Promise>() {
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                    log::warn!("Score submission failed: {err:?}");
                }
            });
        }
    }

    fn open_leaderboard(&mut self) {
        self.call("openLeaderboard", None);
    }

    fn auto_start(&mut self) {
        self.call("autoStart", None);
    }
}

type Listener = (EventTarget, &'static str, Closure<dyn FnMut(web_sys::Event)>);

/// Last values written to the DOM, to skip redundant updates
#[derive(Default)]
struct DomCache {
    menu: Option<MenuState>,
    interactive: Option<bool>,
    hud: Option<Hud>,
}

struct Shared {
    game: RefCell<Game<JsHost>>,
    surface: RefCell<CanvasSurface>,
    canvas: HtmlCanvasElement,
    document: Document,
    audio: RefCell<AudioManager>,
    queue: SampleQueue,
    touches: RefCell<TouchTracker>,
    dom: RefCell<DomCache>,
    running: Cell<bool>,
    /// Best score as of the last frame, for reads during a host hook
    best: Cell<u64>,
    listeners: RefCell<Vec<Listener>>,
}

impl Shared {
    /// Run `f` on the game unless it is already borrowed (re-entrant host hook)
    fn with_game(&self, f: impl FnOnce(&mut Game<JsHost>)) {
        match self.game.try_borrow_mut() {
            Ok(mut game) => f(&mut game),
            Err(_) => log::warn!("Ignoring re-entrant game call"),
        }
    }

    fn frame(&self, timestamp: f64) {
        let Ok(mut game) = self.game.try_borrow_mut() else {
            return;
        };
        let advanced = game.frame(timestamp);
        let events = game.take_events();
        if advanced {
            let mut surface = self.surface.borrow_mut();
            surface.begin_frame(game.viewport());
            renderer::draw(&mut *surface, &game.state, &game.settings);
        }
        let menu = game.state.menu;
        let interactive = game.is_interactive_menu();
        let hud = game.hud();
        let session = game.state.session.clone();
        drop(game);
        self.best.set(session.high_score.best());

        let audio = self.audio.borrow();
        for event in &events {
            if let GameEvent::Sound(effect) = event {
                audio.play(*effect);
            }
        }
        drop(audio);

        self.sync_menus(menu, interactive, &session);
        self.sync_hud(hud);
    }

    fn resize(&self) {
        let Some(window) = web_sys::window() else { return };
        let viewport = Viewport::new(
            self.canvas.client_width() as f32,
            self.canvas.client_height() as f32,
            window.device_pixel_ratio() as f32,
        );
        let (w, h) = viewport.buffer_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.with_game(|game| game.set_viewport(viewport));
    }

    /// Pointer position relative to the canvas, in CSS pixels
    fn canvas_point(&self, client_x: i32, client_y: i32) -> Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        Vec2::new(
            (client_x as f64 - rect.left()) as f32,
            (client_y as f64 - rect.top()) as f32,
        )
    }

    fn select(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn select_all(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn set_class(&self, selector: &str, class: &str, on: bool) {
        if let Some(el) = self.select(selector) {
            el.class_list().toggle_with_force(class, on).ok();
        }
    }

    fn set_text(&self, selector: &str, text: &str) {
        if let Some(el) = self.select(selector) {
            el.set_text_content(Some(text));
        }
    }

    fn sync_menus(&self, menu: MenuState, interactive: bool, session: &GameSession) {
        let mut dom = self.dom.borrow_mut();
        if dom.interactive.replace(interactive) != Some(interactive) {
            self.set_class(".menus", "interactive-mode", interactive);
        }
        if dom.menu == Some(menu) {
            return;
        }
        dom.menu = Some(menu);

        self.set_class(".menu--main", "active", menu == MenuState::Main);
        self.set_class(".menu--pause", "active", menu == MenuState::Pause);
        self.set_class(".menu--score", "active", menu == MenuState::Score);
        self.set_class(".menus", "has-active", menu != MenuState::None);
        // The canvas is inert behind menus
        let pointer_events = if menu == MenuState::None { "auto" } else { "none" };
        self.canvas.style().set_property("pointer-events", pointer_events).ok();

        if menu == MenuState::Score {
            self.set_text(".final-score-lbl", &session.score.to_string());
            let best = session.high_score.best();
            let label = if session.high_score.is_new_high_score(session.score) {
                format!("New High Score! ({best})")
            } else {
                format!("High Score: {best}")
            };
            self.set_text(".high-score-lbl", &label);
        }
    }

    fn sync_hud(&self, hud: Hud) {
        let mut dom = self.dom.borrow_mut();
        let last = dom.hud.replace(hud);
        if last == Some(hud) {
            return;
        }
        if last.is_none_or(|l| l.score != hud.score) {
            self.set_text(".score-lbl", &format!("Score: {}", hud.score));
        }
        if last.is_none_or(|l| l.cube_count != hud.cube_count) {
            self.set_text(".cube-count-lbl", &format!("Cubes Smashed: {}", hud.cube_count));
        }
        if let Some(bar) = self.select(".slowmo__bar").and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
            bar.style()
                .set_property("transform", &format!("scaleX({})", hud.slowmo))
                .ok();
        }
        self.set_class(".slowmo", "active", hud.slowmo > 0.0);
        self.set_class(".hud", "hidden", !hud.visible);
        self.set_class(".hud", "casual", hud.casual);
    }

    fn listen(
        self: &Rc<Self>,
        target: &EventTarget,
        kind: &'static str,
        mut handler: impl FnMut(&Shared, web_sys::Event) + 'static,
    ) {
        let weak = Rc::downgrade(self);
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            if let Some(shared) = weak.upgrade() {
                handler(&shared, event);
            }
        });
        if target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("Failed to listen for {kind}");
            return;
        }
        self.listeners.borrow_mut().push((target.clone(), kind, closure));
    }

    fn on_click(self: &Rc<Self>, selector: &str, action: MenuAction) {
        let buttons = self.select_all(selector);
        if buttons.is_empty() {
            log::debug!("No {selector} in page");
        }
        for button in &buttons {
            self.listen(button, "click", move |shared, _| {
                shared.with_game(|game| game.dispatch(action));
            });
        }
    }

    fn install_listeners(self: &Rc<Self>, window: &web_sys::Window) {
        let canvas: &EventTarget = self.canvas.as_ref();
        let window_target: &EventTarget = window.as_ref();

        let has_pointer_events = js_sys::Reflect::has(window, &JsValue::from_str("PointerEvent")).unwrap_or(false);
        if has_pointer_events {
            self.listen(canvas, "pointerdown", |shared, event| {
                let Some(e) = event.dyn_ref::<PointerEvent>() else { return };
                let pos = shared.canvas_point(e.client_x(), e.client_y());
                if let Some(sample) = primary_sample(e.is_primary(), PointerSample::Down(pos)) {
                    shared.queue.push(sample);
                }
            });
            self.listen(window_target, "pointermove", |shared, event| {
                let Some(e) = event.dyn_ref::<PointerEvent>() else { return };
                let pos = shared.canvas_point(e.client_x(), e.client_y());
                if let Some(sample) = primary_sample(e.is_primary(), PointerSample::Move(pos)) {
                    shared.queue.push(sample);
                }
            });
            for kind in ["pointerup", "pointercancel"] {
                self.listen(window_target, kind, |shared, event| {
                    let Some(e) = event.dyn_ref::<PointerEvent>() else { return };
                    if let Some(sample) = primary_sample(e.is_primary(), PointerSample::Up) {
                        shared.queue.push(sample);
                    }
                });
            }
        } else {
            self.listen(canvas, "touchstart", |shared, event| {
                let Some(e) = event.dyn_ref::<TouchEvent>() else { return };
                e.prevent_default();
                let touches = e.changed_touches();
                for i in 0..touches.length() {
                    let Some(t) = touches.get(i) else { continue };
                    let pos = shared.canvas_point(t.client_x(), t.client_y());
                    if let Some(sample) = shared.touches.borrow_mut().start(t.identifier(), pos) {
                        shared.queue.push(sample);
                    }
                }
            });
            self.listen(canvas, "touchmove", |shared, event| {
                let Some(e) = event.dyn_ref::<TouchEvent>() else { return };
                e.prevent_default();
                let touches = e.changed_touches();
                for i in 0..touches.length() {
                    let Some(t) = touches.get(i) else { continue };
                    let pos = shared.canvas_point(t.client_x(), t.client_y());
                    if let Some(sample) = shared.touches.borrow().moved(t.identifier(), pos) {
                        shared.queue.push(sample);
                    }
                }
            });
            for kind in ["touchend", "touchcancel"] {
                self.listen(canvas, kind, |shared, event| {
                    let Some(e) = event.dyn_ref::<TouchEvent>() else { return };
                    let touches = e.changed_touches();
                    let ids: Vec<i32> = (0..touches.length())
                        .filter_map(|i| touches.get(i))
                        .map(|t| t.identifier())
                        .collect();
                    if let Some(sample) = shared.touches.borrow_mut().end(ids) {
                        shared.queue.push(sample);
                    }
                });
            }
        }

        self.listen(window_target, "keydown", |shared, event| {
            let Some(e) = event.dyn_ref::<KeyboardEvent>() else { return };
            if e.key().eq_ignore_ascii_case("p") {
                shared.with_game(|game| game.toggle_pause());
            }
        });
        self.listen(window_target, "resize", |shared, _| shared.resize());
        self.listen(window_target, "blur", |shared, _| {
            shared.with_game(|game| {
                if game.state.is_in_game() {
                    game.pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
        });

        for &(selector, action) in MENU_BUTTONS {
            self.on_click(selector, action);
        }
    }

    fn remove_listeners(&self) {
        for (target, kind, closure) in self.listeners.borrow_mut().drain(..) {
            target
                .remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
                .ok();
        }
    }
}

fn request_animation_frame(callback: &Closure<dyn FnMut(f64)>) {
    let Some(window) = web_sys::window() else { return };
    if window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .is_err()
    {
        log::warn!("requestAnimationFrame failed");
    }
}

/// Game handle owned by the host page
#[wasm_bindgen]
pub struct BlockNinja {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl BlockNinja {
    /// Mount on the canvas with id `canvas_id`
    ///
    /// `hooks` may provide `canPlay`, `requireWallet`, `submitScore`,
    /// `openLeaderboard` and `autoStart`. `settings` is optional JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, hooks: JsValue, settings: Option<String>) -> Result<BlockNinja, JsValue> {
        console_error_panic_hook::set_once();
        // Fails harmlessly if a previous mount already installed it
        console_log::init_with_level(log::Level::Info).ok();

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str("canvas not found"))?
            .dyn_into()
            .map_err(|_| JsValue::from_str("element is not a canvas"))?;
        let surface = CanvasSurface::new(&canvas).ok_or_else(|| {
            log::warn!("Canvas 2D context unavailable");
            JsValue::from_str("2d context unavailable")
        })?;

        let settings = settings.map(|json| Settings::from_json(&json)).unwrap_or_default();
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(seed, JsHost { hooks }, Box::new(LocalStore), settings);
        let queue = SampleQueue::new();
        game.add_pointer_source(Box::new(queue.clone()));
        let best = game.state.session.high_score.best();

        let shared = Rc::new(Shared {
            game: RefCell::new(game),
            surface: RefCell::new(surface),
            canvas,
            document,
            audio: RefCell::new(audio),
            queue,
            touches: RefCell::new(TouchTracker::new()),
            dom: RefCell::new(DomCache::default()),
            running: Cell::new(true),
            best: Cell::new(best),
            listeners: RefCell::new(Vec::new()),
        });
        shared.resize();
        shared.install_listeners(&window);

        let handle = BlockNinja { shared };
        handle.start_loop();
        log::info!("Block Ninja mounted on #{canvas_id}");
        Ok(handle)
    }

    #[wasm_bindgen(js_name = playRanked)]
    pub fn play_ranked(&self) -> bool {
        let mut started = false;
        self.shared.with_game(|game| started = game.play(GameMode::Ranked));
        started
    }

    #[wasm_bindgen(js_name = playCasual)]
    pub fn play_casual(&self) -> bool {
        let mut started = false;
        self.shared.with_game(|game| started = game.play(GameMode::Casual));
        started
    }

    pub fn pause(&self) {
        self.shared.with_game(|game| game.pause());
    }

    pub fn resume(&self) {
        self.shared.with_game(|game| game.resume());
    }

    /// Call when the host's `canPlay` may have changed
    #[wasm_bindgen(js_name = startIfReady)]
    pub fn start_if_ready(&self) -> bool {
        let mut started = false;
        self.shared.with_game(|game| started = game.start_if_ready());
        started
    }

    #[wasm_bindgen(js_name = setSettings)]
    pub fn set_settings(&self, json: &str) {
        let settings = Settings::from_json(json);
        self.shared.audio.borrow_mut().apply_settings(&settings);
        self.shared.with_game(|game| game.apply_settings(settings));
    }

    #[wasm_bindgen(js_name = highScore)]
    pub fn high_score(&self) -> f64 {
        read_or_last(&self.shared.game, &self.shared.best, |game| game.state.session.high_score.best()) as f64
    }

    /// Stop the frame loop and detach every listener
    pub fn destroy(&self) {
        if !self.shared.running.replace(false) {
            return;
        }
        self.shared.remove_listeners();
        log::info!("Block Ninja destroyed");
    }
}

impl BlockNinja {
    fn start_loop(&self) {
        let slot: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let next = slot.clone();
        let shared = Rc::downgrade(&self.shared);
        *slot.borrow_mut() = Some(Closure::new(move |time: f64| {
            let Some(shared) = shared.upgrade().filter(|s| s.running.get()) else {
                // Dropping the closure ends the loop
                let _ = next.borrow_mut().take();
                return;
            };
            shared.frame(time);
            if let Some(callback) = next.borrow().as_ref() {
                request_animation_frame(callback);
            }
        }));
        if let Some(callback) = slot.borrow().as_ref() {
            request_animation_frame(callback);
        }
    }
}
