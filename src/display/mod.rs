mod window;

pub use window::WindowDisplay;

use anyhow::Result;
use image::RgbImage;

/// Key commands the pipeline reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    RecaptureBackground,
    ToggleMaskView,
    Quit,
}

/// Pending input gathered once per loop iteration: at most one click and
/// one key command. Click coordinates are in the coordinate space of the
/// last displayed frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    pub click: Option<(u32, u32)>,
    pub key: Option<KeyCommand>,
}

/// Trait for frame presentation targets.
pub trait FrameSink {
    /// Display a frame. Best-effort; an error means the surface is gone.
    fn show(&mut self, frame: &RgbImage) -> Result<()>;

    /// Whether the surface still accepts frames.
    fn is_open(&self) -> bool;
}

/// Trait for per-iteration input polling.
pub trait InputEvents {
    /// Drain the input state accumulated since the previous poll.
    fn poll_input(&mut self) -> InputState;
}
