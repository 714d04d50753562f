//! Physical HUB75 panel via the rpi-rgb-led-matrix bindings.
//!
//! Frames are drawn on an offscreen canvas and swapped in on vsync, so the
//! panel never shows a half-painted frame.

use std::path::Path;

use anyhow::Result;
use rpi_led_matrix::{LedCanvas, LedColor, LedFont, LedMatrix, LedMatrixOptions};

use calclock_core::ClockError;

use crate::config::MatrixConfig;

use super::{DisplaySurface, FontRole, Rgb};

pub struct MatrixSurface {
    matrix: LedMatrix,
    canvas: Option<LedCanvas>,
    font: LedFont,
    font_width: i32,
    width: i32,
    height: i32,
}

impl MatrixSurface {
    pub fn new(cfg: &MatrixConfig) -> Result<Self> {
        let mut options = LedMatrixOptions::new();
        options.set_rows(cfg.rows);
        options.set_cols(cfg.cols);
        options.set_chain_length(cfg.chain_length);
        options.set_hardware_mapping(&cfg.hardware_mapping);
        options
            .set_brightness(cfg.brightness)
            .map_err(|e| ClockError::Render(format!("invalid brightness: {e}")))?;

        let matrix = LedMatrix::new(Some(options), None)
            .map_err(|e| ClockError::Render(format!("matrix init failed: {e}")))?;

        let font = LedFont::new(Path::new(&cfg.font))
            .map_err(|e| ClockError::Render(format!("loading BDF font {}: {e}", cfg.font)))?;

        let canvas = matrix.offscreen_canvas();

        Ok(Self {
            canvas: Some(canvas),
            font,
            font_width: cfg.font_width as i32,
            width: (cfg.cols * cfg.chain_length) as i32,
            height: cfg.rows as i32,
            matrix,
        })
    }
}

impl DisplaySurface for MatrixSurface {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn clear(&mut self) -> Result<()> {
        let canvas = self
            .canvas
            .as_mut()
            .expect("offscreen canvas is restored after every swap");
        canvas.fill(&LedColor {
            red: 0,
            green: 0,
            blue: 0,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        color: Rgb,
        text: &str,
        _role: FontRole,
    ) -> Result<i32> {
        let led = LedColor {
            red: color.r,
            green: color.g,
            blue: color.b,
        };
        let canvas = self
            .canvas
            .as_mut()
            .expect("offscreen canvas is restored after every swap");

        canvas.draw_text(&self.font, text, x, y, &led, 0, false);

        // The BDF fonts we load are fixed-width.
        Ok(text.chars().count() as i32 * self.font_width)
    }

    fn present(&mut self) -> Result<()> {
        if let Some(canvas) = self.canvas.take() {
            self.canvas = Some(self.matrix.swap(canvas));
        }
        Ok(())
    }

    fn poll_quit(&mut self) -> bool {
        // The panel has no input; shutdown comes from the signal handler.
        false
    }
}
