use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashboard::render::{add_dial, add_swoop, load_font, Canvas, DrawCommand, Rect, Scene};
use dashboard::{
    format_label, AnimationRequest, DashboardError, DemoConfig, Dial360, Dial360Config, DialEvent,
    Notch, NotchCollection, Swoop, SwoopConfig,
};
use pixels::{Pixels, SurfaceTexture};
use rusttype::Font;
use tracing_subscriber::EnvFilter;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

/// Plays back the dial's animation requests.
struct NeedleTimeline {
    request: AnimationRequest,
    started: Instant,
}

impl NeedleTimeline {
    fn start(request: AnimationRequest, now: Instant) -> Self {
        Self {
            request,
            started: now,
        }
    }

    fn angle_at(&self, now: Instant) -> f64 {
        let AnimationRequest { from, to, duration } = self.request;
        if duration.is_zero() {
            return to;
        }
        let t = (now.duration_since(self.started).as_secs_f64() / duration.as_secs_f64()).min(1.0);
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        from + (to - from) * eased
    }
}

/// Scripted demo session: a steady value ramp, then a notch added to the
/// live collection, then a collection swap.
struct DemoScript {
    started: Instant,
    last_tick: Instant,
    tick_interval: Duration,
    tick_step: f64,
    notches: NotchCollection,
    notch_added: bool,
    collection_swapped: bool,
}

impl DemoScript {
    const ADD_NOTCH_AFTER: Duration = Duration::from_secs(2);
    const SWAP_AFTER: Duration = Duration::from_secs(4);

    fn new(config: &DemoConfig, notches: NotchCollection, now: Instant) -> Self {
        Self {
            started: now,
            last_tick: now,
            tick_interval: config.tick_interval,
            tick_step: config.tick_step,
            notches,
            notch_added: false,
            collection_swapped: false,
        }
    }

    fn advance(&mut self, dial: &Dial360, now: Instant) {
        while now.duration_since(self.last_tick) >= self.tick_interval {
            self.last_tick += self.tick_interval;
            let mut value = dial.value() + self.tick_step;
            if value > dial.maximum() + 5.0 {
                value = dial.minimum() - 5.0;
            }
            dial.set_value(value);
            dial.set_label(format_label(value.round()));
        }

        let elapsed = now.duration_since(self.started);
        if !self.notch_added && elapsed >= Self::ADD_NOTCH_AFTER {
            self.notch_added = true;
            tracing::info!("adding notch C to the live collection");
            self.notches.push(Notch::new("C", 0.0));
        }
        if !self.collection_swapped && elapsed >= Self::SWAP_AFTER {
            self.collection_swapped = true;
            tracing::info!("swapping the notch collection");
            let replacement =
                NotchCollection::from_iter([Notch::new("First", -100.0), Notch::new("Last", 100.0)]);
            dial.set_notches(Some(replacement.clone().into()));
            self.notches = replacement;
        }
    }
}

/// Left half holds the dial, right half the swoop; both kept square.
fn layout(width: usize, height: usize) -> (Rect, Rect) {
    let half = width as f64 / 2.0;
    let side = half.min(height as f64);
    let top = (height as f64 - side) / 2.0;
    (
        Rect::new((half - side) / 2.0, top, side, side),
        Rect::new(half + (half - side) / 2.0, top, side, side),
    )
}

fn load_demo_font(config: &DemoConfig) -> Option<Font<'static>> {
    let Some(path) = &config.font_path else {
        tracing::info!(
            "no font configured (set {}), labels will not be drawn",
            DemoConfig::FONT_ENV
        );
        return None;
    };
    match load_font(path) {
        Ok(font) => Some(font),
        Err(err) => {
            tracing::warn!(%err, "labels will not be drawn");
            None
        }
    }
}

fn run(config: DemoConfig) -> Result<(), DashboardError> {
    let font = load_demo_font(&config);

    let notches = NotchCollection::from_iter([Notch::new("A", -150.0), Notch::new("B", 150.0)]);
    let dial = Dial360::new(
        &Dial360Config::builder()
            .minimum(50.0)
            .maximum(100.0)
            .value(75.0)
            .label("75")
            .notches(notches.clone().into())
            .build(),
    );
    let mut swoop = Swoop::new(&SwoopConfig::default());

    let retarget = Rc::new(Cell::new(false));
    let _dial_events = {
        let retarget = Rc::clone(&retarget);
        dial.subscribe(move |event| match event {
            DialEvent::NeedleRetarget { .. } => retarget.set(true),
            DialEvent::NotchesRebuilt { span, count } => {
                tracing::info!(count, min_angle = span.min_angle, max_angle = span.max_angle, "notches rebuilt");
            }
            DialEvent::PropertyChanged(_) => {}
        })
    };

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(
            config.window_width as f64,
            config.window_height as f64,
        ))
        .build(&event_loop)?;
    let window = Arc::new(window);

    let window_clone = window.clone();
    let size = window.inner_size();
    let mut fb_width = size.width as usize;
    let mut fb_height = size.height as usize;
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

    let (_, swoop_rect) = layout(fb_width, fb_height);
    swoop.set_size(swoop_rect.width, swoop_rect.height);
    swoop.load();

    let now = Instant::now();
    dial.load();
    let mut timeline = NeedleTimeline::start(dial.animation_request(dial.needle_angle()), now);
    retarget.set(false);
    let mut script = DemoScript::new(&config, notches, now);

    let frame_duration = Duration::from_secs_f64(1.0 / config.max_framerate);
    let mut last_frame = Instant::now();

    event_loop.run(move |event, window_target| {
        window_target.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    dial.unload();
                    swoop.unload();
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    fb_width = new_size.width as usize;
                    fb_height = new_size.height as usize;
                    if let Err(err) = pixels.resize_buffer(new_size.width, new_size.height) {
                        tracing::warn!(%err, "failed to resize pixel buffer");
                    }
                    if let Err(err) = pixels.resize_surface(new_size.width, new_size.height) {
                        tracing::warn!(%err, "failed to resize surface");
                    }
                    let (_, swoop_rect) = layout(fb_width, fb_height);
                    swoop.set_size(swoop_rect.width, swoop_rect.height);
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    script.advance(&dial, now);
                    if retarget.take() {
                        let current = timeline.angle_at(now);
                        timeline = NeedleTimeline::start(dial.animation_request(current), now);
                    }

                    let (dial_rect, swoop_rect) = layout(fb_width, fb_height);
                    let mut scene = Scene::new();
                    scene.add_command(DrawCommand::Clear(config.background));
                    add_dial(
                        &mut scene,
                        dial_rect,
                        &dial.layout(),
                        timeline.angle_at(now),
                        &dial.label(),
                        &config.style,
                    );
                    add_swoop(&mut scene, swoop_rect, &swoop.polygon(), config.swoop_color);

                    {
                        let mut canvas = Canvas::new(pixels.frame_mut(), fb_width, fb_height);
                        scene.render(&mut canvas, font.as_ref());
                    }
                    if let Err(err) = pixels.render() {
                        tracing::error!(%err, "failed to present frame");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if last_frame.elapsed() >= frame_duration {
                    window_clone.request_redraw();
                    last_frame = Instant::now();
                }
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DemoConfig::from_env();
    tracing::info!(title = %config.title, "starting dashboard demo");
    run(config)?;
    Ok(())
}
