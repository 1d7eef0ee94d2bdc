mod gpu;
mod hand;

use std::f32::consts::TAU;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use winit::{
    dpi::PhysicalPosition,
    event::*,
    event_loop::{EventLoop, EventLoopWindowTarget},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use gpu::{GpuPhoto, GpuState, MAX_PHOTO_EDGE};
use hand::Inference;
use tree_core::signal::{self, SignalReader};
use tree_core::{FrameClock, Scene, SceneInstances, TreeConfig, TreeError, TreeResult};

/// Everything the event loop owns besides the GPU.
struct App {
    scene: Scene<GpuPhoto>,
    clock: FrameClock,
    signal: SignalReader,
    instances: SceneInstances,
    hand_open: Arc<AtomicBool>,
    inference: Inference,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
}

/// Distance factor per wheel line.
const ZOOM_STEP: f32 = 0.95;

impl App {
    fn frame(&mut self) {
        // One read per frame; every animator sees the same value
        let state = self.signal.snapshot();
        self.clock.tick();
        self.scene.update(&self.clock.frame(state));
        self.scene.write_instances(&mut self.instances);
    }

    fn on_key(&mut self, key: &Key, elwt: &EventLoopWindowTarget<()>) {
        match key {
            Key::Named(NamedKey::Space) => {
                let open = !self.hand_open.load(Ordering::Relaxed);
                self.hand_open.store(open, Ordering::Relaxed);
                log::info!("[gesture] synthetic hand {}", if open { "open" } else { "closed" });
            }
            Key::Named(NamedKey::Backspace) => {
                if let Some(id) = self.scene.photos().newest() {
                    match self.scene.remove_photo(id) {
                        Ok(photo) => log::debug!("[photos] dropped {}", photo.name),
                        Err(e) => log::warn!("[photos] {e}"),
                    }
                }
            }
            Key::Named(NamedKey::Escape) => elwt.exit(),
            _ => {}
        }
    }

    /// Dragging across the full window height turns the camera once.
    fn on_cursor(&mut self, position: PhysicalPosition<f64>, height: u32) {
        if let (true, Some(last)) = (self.dragging, self.cursor) {
            let per_px = TAU / height.max(1) as f32;
            let dx = (position.x - last.x) as f32;
            let dy = (position.y - last.y) as f32;
            self.scene.setup.orbit_camera(-dx * per_px, -dy * per_px, 1.0);
        }
        self.cursor = Some(position);
    }

    fn on_wheel(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
        };
        self.scene.setup.orbit_camera(0.0, 0.0, ZOOM_STEP.powf(lines));
    }

    fn teardown(&mut self) {
        self.inference.shutdown();
        self.scene.teardown();
        log::info!("[scene] torn down");
    }
}

fn decode_photo(path: &Path) -> TreeResult<(String, image::RgbaImage)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let img = image::open(path).map_err(|e| TreeError::TextureDecode {
        name: name.clone(),
        reason: e.to_string(),
    })?;
    let img = if img.width() > MAX_PHOTO_EDGE || img.height() > MAX_PHOTO_EDGE {
        img.thumbnail(MAX_PHOTO_EDGE, MAX_PHOTO_EDGE)
    } else {
        img
    };
    Ok((name, img.to_rgba8()))
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = TreeConfig::from_env()?;
    let decoded: Vec<_> = std::env::args_os()
        .skip(1)
        .map(|arg| decode_photo(Path::new(&arg)))
        .collect();

    let (writer, reader) = signal::channel();
    let hand_open = Arc::new(AtomicBool::new(false));
    let inference = Inference::spawn(writer, config.gesture.clone(), Arc::clone(&hand_open))?;

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Grand Tree (native)")
        .build(&event_loop)?;

    let s = &config.scene;
    let sprite_capacity = s.foliage_count + s.ornament_count + s.star_count + 1;
    let mut gpu = pollster::block_on(GpuState::new(&window, sprite_capacity))?;

    let mut scene = Scene::from_config(&config);
    let uploads = decoded.into_iter().map(|result| {
        result.map(|(name, rgba)| {
            let photo = gpu.upload_photo(&name, &rgba);
            (name, photo)
        })
    });
    scene.add_photos(uploads);
    log::info!(
        "[scene] space toggles the hand, backspace removes a photo, escape quits, drag orbits"
    );

    let mut app = App {
        scene,
        clock: FrameClock::new(),
        signal: reader,
        instances: SceneInstances::default(),
        hand_open,
        inference,
        dragging: false,
        cursor: None,
    };

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => gpu.resize(size),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event:
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                },
            ..
        } => app.on_key(&logical_key, elwt),
        Event::WindowEvent {
            event:
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                },
            ..
        } => app.dragging = state == ElementState::Pressed,
        Event::WindowEvent {
            event: WindowEvent::CursorMoved { position, .. },
            ..
        } => app.on_cursor(position, gpu.window.inner_size().height),
        Event::WindowEvent {
            event: WindowEvent::MouseWheel { delta, .. },
            ..
        } => app.on_wheel(delta),
        Event::AboutToWait => {
            app.frame();
            match gpu.render(&app.scene, &app.instances) {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("[render] out of GPU memory");
                    elwt.exit();
                }
                Err(e) => log::warn!("[render] {e:?}"),
            }
        }
        Event::LoopExiting => app.teardown(),
        _ => {}
    })?;
    Ok(())
}
