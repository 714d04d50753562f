//! The frame loop: wall-clock time on top, event marquee below.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use tokio::sync::watch;
use tracing::debug;

use calclock_core::marquee::Marquee;
use calclock_core::ticker::TickerSnapshot;

use crate::config::DisplayConfig;
use crate::surface::{DisplaySurface, FontRole, Rgb};

pub struct RenderLoop<S> {
    surface: S,
    cfg: DisplayConfig,
    rx: watch::Receiver<TickerSnapshot>,
    shutdown: Arc<AtomicBool>,
}

impl<S: DisplaySurface> RenderLoop<S> {
    pub fn new(
        surface: S,
        cfg: DisplayConfig,
        rx: watch::Receiver<TickerSnapshot>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            surface,
            cfg,
            rx,
            shutdown,
        }
    }

    /// Run until the window closes or shutdown is flagged.
    pub fn run(mut self) -> Result<()> {
        let frame_budget = Duration::from_millis(1000 / u64::from(self.cfg.fps.max(1)));
        let width = self.surface.width();
        let height = self.surface.height();
        let clock_color = Rgb::from(self.cfg.clock_color);
        let ticker_color = Rgb::from(self.cfg.ticker_color);

        // Clock baseline sits in the upper half, ticker on the bottom row.
        let clock_y = height * 2 / 5;
        let ticker_y = height - 4;

        let mut marquee = Marquee::new(width);
        let mut snapshot = self.rx.borrow().clone();
        // Settles after the first frame; the clock string's width is constant.
        let mut clock_width = 0;

        while !self.shutdown.load(Ordering::Relaxed) && !self.surface.poll_quit() {
            let frame_start = Instant::now();

            if self.rx.has_changed().unwrap_or(false) {
                snapshot = self.rx.borrow_and_update().clone();
                marquee.reset(width);
                debug!(generation = snapshot.generation, "ticker line replaced");
            }

            self.surface.clear()?;

            let clock = Local::now().format("%H:%M:%S").to_string();
            let clock_x = (width - clock_width) / 2;
            clock_width =
                self.surface
                    .draw_text(clock_x, clock_y, clock_color, &clock, FontRole::Clock)?;

            if !snapshot.line.is_empty() {
                let text_width = self.surface.draw_text(
                    marquee.offset(),
                    ticker_y,
                    ticker_color,
                    &snapshot.line,
                    FontRole::Ticker,
                )?;
                marquee.advance(self.cfg.scroll_step, text_width, width);
            }

            self.surface.present()?;

            let elapsed = frame_start.elapsed();
            if elapsed < frame_budget {
                std::thread::sleep(frame_budget - elapsed);
            }
        }

        Ok(())
    }
}
