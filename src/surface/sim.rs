//! Simulated display: an SDL window standing in for the panel.

use anyhow::Result;
use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X13},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};

use super::{DisplaySurface, FontRole, Rgb};

/// Each logical pixel becomes a 2x2 block on screen.
const PIXEL_SCALE: u32 = 2;

pub struct SimSurface {
    display: SimulatorDisplay<Rgb888>,
    window: Window,
    quit: bool,
}

impl SimSurface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let display = SimulatorDisplay::<Rgb888>::new(Size::new(width, height));
        let output_settings = OutputSettingsBuilder::new().scale(PIXEL_SCALE).build();
        let window = Window::new("calclock", &output_settings);

        Ok(Self {
            display,
            window,
            quit: false,
        })
    }

    fn font(role: FontRole) -> &'static MonoFont<'static> {
        match role {
            FontRole::Clock => &FONT_10X20,
            FontRole::Ticker => &FONT_6X13,
        }
    }

    fn text_width(font: &MonoFont<'_>, text: &str) -> i32 {
        let glyphs = text.chars().count() as u32;
        (glyphs * (font.character_size.width + font.character_spacing)) as i32
    }
}

impl DisplaySurface for SimSurface {
    fn width(&self) -> i32 {
        self.display.size().width as i32
    }

    fn height(&self) -> i32 {
        self.display.size().height as i32
    }

    fn clear(&mut self) -> Result<()> {
        // Drawing to the in-memory framebuffer is infallible.
        self.display.clear(Rgb888::BLACK).unwrap();
        Ok(())
    }

    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        color: Rgb,
        text: &str,
        role: FontRole,
    ) -> Result<i32> {
        let font = Self::font(role);
        let style = MonoTextStyle::new(font, Rgb888::new(color.r, color.g, color.b));

        Text::with_baseline(text, Point::new(x, y), style, Baseline::Alphabetic)
            .draw(&mut self.display)
            .unwrap();

        Ok(Self::text_width(font, text))
    }

    fn present(&mut self) -> Result<()> {
        self.window.update(&self.display);

        if self.window.events().any(|e| e == SimulatorEvent::Quit) {
            self.quit = true;
        }

        Ok(())
    }

    fn poll_quit(&mut self) -> bool {
        self.quit
    }
}
