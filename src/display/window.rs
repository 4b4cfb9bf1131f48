use super::{FrameSink, InputEvents, InputState, KeyCommand};
use anyhow::Result;
use image::RgbImage;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct WindowDisplay {
    window: Window,
    width: u32,
    height: u32,
    buffer: Vec<u32>,
    mouse_was_down: bool,
}

impl WindowDisplay {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        tracing::info!("Opening preview window at {}x{}", width, height);

        let window = Window::new(
            title,
            width as usize,
            height as usize,
            WindowOptions::default(),
        )
        .map_err(|e| anyhow::anyhow!("Failed to create preview window: {}", e))?;

        Ok(Self {
            window,
            width,
            height,
            buffer: Vec::with_capacity((width * height) as usize),
            mouse_was_down: false,
        })
    }

    /// Pack an RGB frame into the 0RGB u32 layout minifb expects.
    fn fill_buffer(&mut self, frame: &RgbImage) {
        self.buffer.clear();
        self.buffer.extend(
            frame
                .as_raw()
                .chunks_exact(3)
                .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | (p[2] as u32)),
        );
    }
}

impl FrameSink for WindowDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        // Resize frame if needed
        let frame = if frame.dimensions() != (self.width, self.height) {
            image::imageops::resize(
                frame,
                self.width,
                self.height,
                image::imageops::FilterType::Lanczos3,
            )
        } else {
            frame.clone()
        };

        self.fill_buffer(&frame);
        self.window
            .update_with_buffer(&self.buffer, self.width as usize, self.height as usize)
            .map_err(|e| anyhow::anyhow!("Failed to present frame: {}", e))
    }

    fn is_open(&self) -> bool {
        self.window.is_open()
    }
}

impl InputEvents for WindowDisplay {
    fn poll_input(&mut self) -> InputState {
        let key = if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            Some(KeyCommand::Quit)
        } else if self.window.is_key_pressed(Key::B, KeyRepeat::No) {
            Some(KeyCommand::RecaptureBackground)
        } else if self.window.is_key_pressed(Key::M, KeyRepeat::No) {
            Some(KeyCommand::ToggleMaskView)
        } else {
            None
        };

        // Report a click only on the press edge, not while held.
        let mouse_down = self.window.get_mouse_down(MouseButton::Left);
        let click = if mouse_down && !self.mouse_was_down {
            self.window
                .get_mouse_pos(MouseMode::Clamp)
                .map(|(x, y)| (x as u32, y as u32))
        } else {
            None
        };
        self.mouse_was_down = mouse_down;

        InputState { click, key }
    }
}
