use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, DeviceEvents, EventLoop};
use winit::monitor::MonitorHandle;
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::assets::SpriteSheet;
use crate::audio::AudioSink;
use crate::config::Config;
use crate::error::NekoError;
use crate::input::InputState;
use crate::pet::{Bounds, Pet, TickInput};
use crate::render::selector::FrameSelector;
use crate::render::GpuState;

/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;

fn monitor_bounds(monitor: &MonitorHandle) -> Bounds {
    let pos = monitor.position();
    let size = monitor.size();
    Bounds::new(
        DVec2::new(pos.x as f64, pos.y as f64),
        DVec2::new(size.width as f64, size.height as f64),
    )
}

fn round_position(p: DVec2) -> PhysicalPosition<i32> {
    let p = p.round();
    PhysicalPosition::new(p.x as i32, p.y as i32)
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    config: Config,
    sprites: SpriteSheet,
    audio: Box<dyn AudioSink>,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,

    // Behavior
    pet: Option<Pet>,
    selector: FrameSelector,
    input: InputState,
    /// Monitor seen at startup, used if the window cannot report its own.
    home_monitor: Option<Bounds>,
    placed_at: Option<PhysicalPosition<i32>>,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    accumulator: f64,
    tick_count: u64,

    /// Startup failure to hand back from `run`.
    error: Option<NekoError>,
}

impl App {
    fn new(config: Config, sprites: SpriteSheet, audio: Box<dyn AudioSink>) -> Self {
        Self {
            config,
            sprites,
            audio,
            window: None,
            gpu: None,
            pet: None,
            selector: FrameSelector::new(),
            input: InputState::new(DVec2::ZERO),
            home_monitor: None,
            placed_at: None,
            last_frame_time: None,
            accumulator: 0.0,
            tick_count: 0,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: NekoError) {
        self.error = Some(err);
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), NekoError> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or(NekoError::NoMonitor)?;
        let bounds = monitor_bounds(&monitor);

        let pet = Pet::new(self.config.tuning(), &bounds);
        let side = self.config.window_size();
        let start = round_position(pet.state.position);

        let attrs = WindowAttributes::default()
            .with_title("Neko")
            .with_decorations(false)
            .with_resizable(false)
            .with_active(false)
            .with_visible(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(PhysicalSize::new(side, side))
            .with_position(start);

        // On Windows transparency comes from wgpu's DxgiFromVisual +
        // PreMultiplied alpha; with_transparent would add WS_EX_LAYERED.
        #[cfg(not(windows))]
        let attrs = attrs.with_transparent(true);

        #[cfg(windows)]
        let attrs = {
            use winit::platform::windows::WindowAttributesExtWindows;
            attrs.with_skip_taskbar(true)
        };

        #[cfg(target_os = "linux")]
        let attrs = {
            use winit::platform::x11::WindowAttributesExtX11;
            attrs.with_name("Neko", "Neko")
        };

        let window = Arc::new(event_loop.create_window(attrs)?);

        #[cfg(windows)]
        crate::platform::win32::setup_pet_window(&window);

        if self.config.mouse_passthrough {
            if let Err(e) = window.set_cursor_hittest(false) {
                log::warn!("Mouse passthrough unavailable: {e}");
            }
        }

        let gpu = GpuState::new(window.clone(), &self.sprites)?;

        log::info!(
            "Pet window created: {}x{} at {:?} on {:?}",
            side,
            side,
            start,
            monitor.name().unwrap_or_default()
        );
        log::info!(
            "Speed {} px/tick at {} ticks/s",
            pet.tuning().speed,
            self.config.tps
        );

        self.input.set_cursor(bounds.center());
        self.home_monitor = Some(bounds);
        self.placed_at = Some(start);
        self.pet = Some(pet);
        self.gpu = Some(gpu);

        // Show window now that all styles and GPU resources are ready.
        window.set_visible(true);
        self.window = Some(window);
        Ok(())
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        self.accumulator = (self.accumulator + dt).min(MAX_ACCUMULATOR);

        let tick_rate = self.config.tick_rate();
        while self.accumulator >= tick_rate {
            self.tick();
            self.accumulator -= tick_rate;
            self.tick_count += 1;
        }
    }

    /// One behavior step: sample inputs, advance the pet, forward its sound
    /// cue and move the window.
    fn tick(&mut self) {
        let (Some(window), Some(pet)) = (&self.window, &mut self.pet) else {
            return;
        };

        #[cfg(windows)]
        if let Some((x, y)) = crate::platform::win32::cursor_pos() {
            self.input.set_cursor(DVec2::new(x as f64, y as f64));
        }

        let Some(monitor) = window
            .current_monitor()
            .map(|m| monitor_bounds(&m))
            .or(self.home_monitor)
        else {
            return;
        };
        let size = window.outer_size();

        let input = TickInput {
            cursor: self.input.cursor(),
            clicked: self.input.take_click(),
            window: DVec2::new(size.width as f64, size.height as f64),
            monitor,
        };

        if let Some(cue) = pet.step(&input) {
            log::debug!("tick {}: sound {}", self.tick_count, cue.name());
            self.audio.play(cue);
        }

        let target = round_position(pet.state.position);
        if self.placed_at != Some(target) {
            window.set_outer_position(target);
            self.placed_at = Some(target);
        }
    }

    /// Ask for a redraw if the pet's frame changed since the last one drawn.
    fn schedule_redraw(&mut self) {
        let (Some(window), Some(pet)) = (&self.window, &self.pet) else {
            return;
        };
        let s = &pet.state;
        let selection = self.selector.select(s.sprite, s.frame_count, s.window.min);
        if selection.redraw {
            log::trace!("frame {}", selection.frame);
            window.request_redraw();
        }
    }

    fn redraw(&mut self) {
        let (Some(gpu), Some(frame)) = (&self.gpu, self.selector.current()) else {
            return;
        };
        if !gpu.draw(frame) {
            self.selector.invalidate();
        }
    }

    /// Screen position of the window's client area.
    fn client_origin(&self) -> DVec2 {
        let from_window = self
            .window
            .as_ref()
            .and_then(|w| w.inner_position().ok())
            .map(|p| DVec2::new(p.x as f64, p.y as f64));
        from_window
            .or_else(|| self.pet.as_ref().map(|pet| pet.state.position))
            .unwrap_or(DVec2::ZERO)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        // Raw pointer motion keeps the cursor estimate alive while it is
        // outside the window.
        event_loop.listen_device_events(DeviceEvents::Always);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            return;
        }

        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            self.run_fixed_update(now.duration_since(last).as_secs_f64());
        }
        self.last_frame_time = Some(now);

        self.schedule_redraw();

        let wait = (self.config.tick_rate() - self.accumulator).max(0.0);
        event_loop.set_control_flow(ControlFlow::WaitUntil(now + Duration::from_secs_f64(wait)));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.selector.invalidate();
                }
            }
            WindowEvent::Occluded(false) => self.selector.invalidate(),
            WindowEvent::CursorMoved { position, .. } => {
                let origin = self.client_origin();
                self.input
                    .cursor_moved(origin, DVec2::new(position.x, position.y));
            }
            WindowEvent::CursorLeft { .. } => self.input.cursor_left(),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.input.primary_button(state == ElementState::Pressed),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.input.mouse_motion(DVec2::new(dx, dy));
        }
    }
}

/// Entry point: create the event loop and run until the window closes.
pub fn run(
    config: Config,
    sprites: SpriteSheet,
    audio: Box<dyn AudioSink>,
) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, sprites, audio);
    event_loop.run_app(&mut app)?;
    app.audio.stop_current();
    match app.error.take() {
        Some(e) => Err(e.into()),
        None => {
            log::info!("Exited after {} ticks", app.tick_count);
            Ok(())
        }
    }
}
