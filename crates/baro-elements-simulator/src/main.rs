//! Desktop simulator for baro-elements layouts.
//!
//! Renders a demo dashboard in an SDL2 window via `embedded-graphics-simulator`.
//! Readings are synthetic so layouts can be exercised without hardware.
//!
//! # Key bindings
//!
//! | Key   | Action                          |
//! |-------|---------------------------------|
//! | N     | Advance the carousel            |
//! | 1 / 2 | Jump to a carousel slide        |
//! | H     | Hide and re-show the whole tree |
//! | Q     | Quit                            |

use std::fmt::Write;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info};

use baro_elements::elements::TextBuf;
use baro_elements::style::rgb;
use baro_elements::{
    Anchor, ElementError, ElementId, ElementKind, ElementTree, FrameClock, ScrollMode, TextAlign,
    TextElement, TextSize,
};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

const DISPLAY_WIDTH_PX: u32 = 320;
const DISPLAY_HEIGHT_PX: u32 = 240;

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// How long each carousel slide stays on screen.
const SLIDE_DURATION: embassy_time::Duration = embassy_time::Duration::from_secs(6);

// ---------------------------------------------------------------------------
// Mock readings
// ---------------------------------------------------------------------------

/// Synthetic sensor reading that drifts with wall-clock time.
#[derive(Clone, Copy)]
enum Reading {
    Temperature,
    Humidity,
    Co2,
}

impl Reading {
    fn sample(self, t: f64) -> f64 {
        match self {
            Reading::Temperature => 23.0 + 3.0 * (t / 120.0).sin() + 0.5 * (t / 37.0).cos(),
            Reading::Humidity => 50.0 + 10.0 * (t / 180.0).sin() + 2.0 * (t / 23.0).cos(),
            Reading::Co2 => 600.0 + 200.0 * (t / 300.0).sin() + 30.0 * (t / 41.0).cos(),
        }
    }

    fn format(self, t: f64) -> TextBuf {
        let mut buf = TextBuf::new();
        let value = self.sample(t);
        let _ = match self {
            Reading::Temperature => write!(buf, "{:.1} C", value),
            Reading::Humidity => write!(buf, "{:.0} %", value),
            Reading::Co2 => write!(buf, "{:.0} ppm", value),
        };
        buf
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Handles the main loop needs after building the layout.
struct Dashboard {
    tree: ElementTree,
    carousel: ElementId,
}

/// Build the demo layout:
///
/// ```text
/// Vertical
/// ├── uptime (dynamic, centered)
/// └── Sequence
///     ├── Horizontal [temperature, humidity, co2]
///     └── scrolling banner
/// ```
fn build_dashboard(start: Instant) -> Result<Dashboard, ElementError> {
    let mut tree = ElementTree::new();

    let root = tree.insert(ElementKind::vertical())?;
    let uptime = tree.insert(
        TextElement::new()
            .with_size(TextSize::Large)
            .with_anchor(Anchor::CENTER)
            .with_align(TextAlign::CENTER)
            .with_color(rgb(255, 200, 0))
            .with_update_interval(embassy_time::Duration::from_secs(1))
            .with_lambda(move || {
                let mut buf = TextBuf::new();
                let _ = write!(buf, "Up {}s", start.elapsed().as_secs());
                buf
            }),
    )?;
    tree.add_child(root, uptime)?;

    let carousel = tree.insert(ElementKind::sequence(SLIDE_DURATION))?;
    tree.add_child(root, carousel)?;

    let readings = tree.insert(ElementKind::horizontal())?;
    tree.add_child(carousel, readings)?;
    for reading in [Reading::Temperature, Reading::Humidity, Reading::Co2] {
        let label = tree.insert(
            TextElement::new()
                .with_anchor(Anchor::CENTER)
                .with_align(TextAlign::CENTER)
                .with_lambda(move || reading.format(start.elapsed().as_secs_f64())),
        )?;
        tree.add_child(readings, label)?;
    }

    let banner = tree.insert(
        TextElement::new()
            .with_text("Air quality is good. Open a window after lunch.")?
            .with_size(TextSize::Large)
            .with_anchor(Anchor::CENTER_LEFT)
            .with_align(TextAlign::CENTER)
            .with_color(rgb(0, 255, 128))
            .with_scroll(ScrollMode::Left, 80.0),
    )?;
    tree.add_child(carousel, banner)?;

    tree.set_root(root)?;
    Ok(Dashboard { tree, carousel })
}

/// Monotonic time since `start` as the element tree's clock.
fn uptime(start: Instant) -> embassy_time::Instant {
    embassy_time::Instant::from_micros(start.elapsed().as_micros() as u64)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting baro-elements simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: N=Next  1/2=Slide  H=Hide/Show  Q=Quit");

    let start = Instant::now();
    let Dashboard {
        mut tree,
        carousel,
    } = match build_dashboard(start) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            error!("Invalid layout: {}", e);
            return;
        }
    };

    let mut display =
        SimulatorDisplay::<Rgb565>::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("baro-elements", &output_settings);

    let mut clock = FrameClock::new();
    if let Err(e) = tree.show(uptime(start)) {
        error!("Cannot show layout: {}", e);
        return;
    }
    let mut hidden = false;

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    let _ = display.clear(Rgb565::BLACK);
    window.update(&display);

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => break 'running,
                    Keycode::N => tree.on_next(carousel, uptime(start)),
                    Keycode::Num1 | Keycode::Num2 => {
                        let index = if keycode == Keycode::Num1 { 0 } else { 1 };
                        if let Err(e) = tree.go_to(carousel, index, uptime(start)) {
                            error!("Cannot jump to slide {}: {}", index, e);
                        }
                    }
                    Keycode::H => {
                        let result = if hidden {
                            tree.show(uptime(start))
                        } else {
                            tree.hide()
                        };
                        match result {
                            Ok(()) => {
                                hidden = !hidden;
                                info!("Tree {}", if hidden { "hidden" } else { "shown" });
                            }
                            Err(e) => error!("Cannot toggle layout: {}", e),
                        }
                    }
                    _ => {}
                },

                _ => {}
            }
        }

        // --- Render -------------------------------------------------------
        let frame = clock.tick(uptime(start));
        let _ = display.clear(Rgb565::BLACK);
        if !hidden {
            if let Err(e) = tree.draw(&frame, &mut display) {
                error!("Draw error: {:?}", e);
            }
        }

        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
