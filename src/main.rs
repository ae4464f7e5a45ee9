//! Coconut Steps entry point
//!
//! Browser builds drive the tutorial from `requestAnimationFrame` and hand
//! every frame to the page as a `coconut-frame` event. Native builds run a
//! headless walkthrough of all steps.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, CustomEventInit, Document, KeyboardEvent, MouseEvent};

    use coconut_steps::consts::STEP_COUNT;
    use coconut_steps::renderer::{Vertex, build_frame_mesh};
    use coconut_steps::scene::{FramePose, SceneDescription};
    use coconut_steps::sim::{SceneSink, Tutorial};
    use coconut_steps::steps::{Step, StepStatus};
    use coconut_steps::{QualityPreset, Settings};

    const FRAME_EVENT: &str = "coconut-frame";

    /// Frame metadata sent to the page alongside the vertex arrays
    #[derive(serde::Serialize)]
    struct FrameMessage<'a> {
        caption: String,
        progress: u8,
        /// Only present on the first frame after a step change
        scene: Option<&'a SceneDescription>,
        pose: &'a FramePose,
    }

    /// Dispatches composed frames to the page
    struct PageSink {
        quality: QualityPreset,
        caption: String,
        progress: u8,
        scene_sent: Option<Step>,
    }

    impl SceneSink for PageSink {
        fn submit(&mut self, scene: &SceneDescription, pose: &FramePose) {
            let fresh = self.scene_sent != Some(scene.step);
            let message = FrameMessage {
                caption: self.caption.clone(),
                progress: self.progress,
                scene: fresh.then_some(scene),
                pose,
            };
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("Failed to serialize frame: {}", e);
                    return;
                }
            };

            let mesh = build_frame_mesh(scene, pose, self.quality);
            let detail = js_sys::Object::new();
            let _ = js_sys::Reflect::set(&detail, &"frame".into(), &json.into());
            let _ = js_sys::Reflect::set(&detail, &"opaque".into(), &float_array(&mesh.opaque));
            let _ = js_sys::Reflect::set(
                &detail,
                &"transparent".into(),
                &float_array(&mesh.transparent),
            );

            let init = CustomEventInit::new();
            init.set_detail(&detail);
            let Ok(event) = CustomEvent::new_with_event_init_dict(FRAME_EVENT, &init) else {
                return;
            };
            if let Some(window) = web_sys::window() {
                let _ = window.dispatch_event(&event);
            }
            if fresh {
                self.scene_sent = Some(scene.step);
            }
        }
    }

    fn float_array(vertices: &[Vertex]) -> js_sys::Float32Array {
        js_sys::Float32Array::from(bytemuck::cast_slice::<Vertex, f32>(vertices))
    }

    /// App instance holding the tutorial and page bindings
    struct App {
        tutorial: Tutorial,
        settings: Settings,
        sink: PageSink,
        start_time: f64,
    }

    impl App {
        fn new(settings: Settings, seed: u64) -> Self {
            Self {
                tutorial: Tutorial::new(settings.clone(), seed),
                sink: PageSink {
                    quality: settings.quality,
                    caption: String::new(),
                    progress: 0,
                    scene_sent: None,
                },
                settings,
                start_time: 0.0,
            }
        }

        fn frame(&mut self, time: f64) {
            if self.start_time == 0.0 {
                self.start_time = time;
            }
            let step = self.tutorial.current_step();
            self.sink.caption = self.tutorial.caption();
            self.sink.progress = step.progress_percent();

            let t = ((time - self.start_time) / 1000.0) as f32;
            self.tutorial.run_frame(t, &mut self.sink);
        }

        fn cycle_quality(&mut self) {
            let next = match self.settings.quality {
                QualityPreset::Low => QualityPreset::Medium,
                QualityPreset::Medium => QualityPreset::High,
                QualityPreset::High => QualityPreset::Low,
            };
            self.settings.quality = next;
            self.sink.quality = next;
            self.settings.save();
            log::info!("Quality: {}", next.as_str());
        }

        /// Update the step panel in the DOM
        fn update_panel(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let step = self.tutorial.current_step();
            let descriptor = self.tutorial.descriptor();
            let state = self.tutorial.state();

            set_text(&document, "step-caption", &self.tutorial.caption());
            set_text(&document, "step-description", &descriptor.description);
            set_text(&document, "step-instruction", &descriptor.instruction);
            set_text(&document, "step-progress", &format!("{}%", step.progress_percent()));
            set_text(&document, "step-phase", step.phase().as_str());

            set_hidden(&document, "spill-notice", !step.shows_spill_notice());
            set_hidden(&document, "complete-banner", !step.is_complete());
            set_disabled(&document, "prev-btn", !state.can_go_previous());
            set_disabled(&document, "next-btn", !state.can_go_next());

            for indicator in Step::all() {
                let id = format!("step-dot-{}", indicator);
                if let Some(el) = document.get_element_by_id(&id) {
                    let class = match step.status_of(indicator) {
                        StepStatus::Done => "step-dot done",
                        StepStatus::Current => "step-dot current",
                        StepStatus::Pending => "step-dot",
                    };
                    let _ = el.set_attribute("class", class);
                }
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn set_disabled(document: &Document, id: &str, disabled: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = if disabled {
                el.set_attribute("disabled", "")
            } else {
                el.remove_attribute("disabled")
            };
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Coconut Steps starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document; nothing to drive");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(Settings::load(), seed)));
        app.borrow().update_panel();

        setup_buttons(&document, app.clone());
        setup_keyboard(app.clone());

        request_animation_frame(app);

        log::info!("Coconut Steps running!");
    }

    fn on_click(document: &Document, id: &str, app: Rc<RefCell<App>>, action: fn(&mut Tutorial)) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                action(&mut a.tutorial);
                a.update_panel();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        on_click(document, "prev-btn", app.clone(), |t| {
            t.previous();
        });
        on_click(document, "next-btn", app.clone(), |t| {
            t.next();
        });
        on_click(document, "reset-btn", app.clone(), Tutorial::reset);

        // Step indicators jump straight to their step
        for step in 1..=STEP_COUNT {
            let id = format!("step-dot-{}", step);
            if let Some(dot) = document.get_element_by_id(&id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    let mut a = app.borrow_mut();
                    let _ = a.tutorial.go_to(i64::from(step));
                    a.update_panel();
                });
                let _ = dot.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut a = app.borrow_mut();
            match event.key().as_str() {
                "ArrowRight" | " " => {
                    a.tutorial.next();
                }
                "ArrowLeft" => {
                    a.tutorial.previous();
                }
                "Home" | "r" | "R" => a.tutorial.reset(),
                "q" | "Q" => a.cycle_quality(),
                key => {
                    if let Ok(n) = key.parse::<i64>() {
                        let _ = a.tutorial.go_to(n);
                    }
                }
            }
            a.update_panel();
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            app_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn app_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use coconut_steps::renderer::{Vertex, build_frame_mesh};
    use coconut_steps::scene::{FramePose, SceneDescription};
    use coconut_steps::sim::SceneSink;
    use coconut_steps::QualityPreset;

    /// Collects per-step statistics instead of drawing
    pub struct StatsSink {
        pub quality: QualityPreset,
        pub frames: usize,
        pub max_vertices: usize,
        /// Largest vertex buffer the host would upload, in bytes
        pub max_buffer_bytes: u64,
        pub max_droplets: usize,
    }

    impl StatsSink {
        pub fn new(quality: QualityPreset) -> Self {
            Self {
                quality,
                frames: 0,
                max_vertices: 0,
                max_buffer_bytes: 0,
                max_droplets: 0,
            }
        }

        pub fn clear(&mut self) {
            self.frames = 0;
            self.max_vertices = 0;
            self.max_buffer_bytes = 0;
            self.max_droplets = 0;
        }
    }

    impl SceneSink for StatsSink {
        fn submit(&mut self, scene: &SceneDescription, pose: &FramePose) {
            let mesh = build_frame_mesh(scene, pose, self.quality);
            self.frames += 1;
            self.max_vertices = self.max_vertices.max(mesh.vertex_count());
            let stride = Vertex::desc().array_stride;
            self.max_buffer_bytes = self
                .max_buffer_bytes
                .max(mesh.vertex_count() as u64 * stride);
            self.max_droplets = self.max_droplets.max(pose.droplets.len());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use coconut_steps::{QualityPreset, Settings, Tutorial};

    /// Simulated frame rate and time spent on each step
    const FRAME_DT: f32 = 1.0 / 60.0;
    const SECONDS_PER_STEP: f32 = 3.0;

    env_logger::init();
    log::info!("Coconut Steps (native) starting...");

    // First argument: a quality preset name or a settings JSON path
    let settings = match std::env::args().nth(1) {
        Some(arg) => match QualityPreset::from_str(&arg) {
            Some(preset) => Settings::from_preset(preset),
            None => Settings::load_from_path(&arg)
                .with_context(|| format!("failed to load settings from {}", arg))?,
        },
        None => Settings::default(),
    };
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let mut tutorial = Tutorial::new(settings.clone(), seed);
    let mut sink = headless::StatsSink::new(settings.quality);
    let frames_per_step = (SECONDS_PER_STEP / FRAME_DT) as usize;
    let mut time = 0.0f32;

    loop {
        let step = tutorial.current_step();
        sink.clear();
        for _ in 0..frames_per_step {
            tutorial.run_frame(time, &mut sink);
            time += FRAME_DT;
        }

        println!("{}", tutorial.caption());
        println!(
            "  {}% | {} | {} parts | {} vertices ({} KiB) | {} droplets",
            step.progress_percent(),
            step.phase().as_str(),
            tutorial.scene().parts.len(),
            sink.max_vertices,
            sink.max_buffer_bytes / 1024,
            sink.max_droplets,
        );
        if step.shows_spill_notice() {
            println!("  Coconut water is spilling out");
        }

        if !tutorial.next() {
            break;
        }
    }

    println!("Done: all steps completed in {} frames", tutorial.frames());
    Ok(())
}
