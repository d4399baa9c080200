use winit::dpi::PhysicalPosition;

use crate::window::Size;

/// Pointer position normalized to `[-1, 1]` on both axes, x to the right and y up.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub const CENTER: Pointer = Pointer { x: 0., y: 0. };

    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(-1., 1.),
            y: y.clamp(-1., 1.),
        }
    }

    /// Maps a cursor position in window pixels. Positions outside the window
    /// (e.g. while dragging) are clamped to the edges.
    pub fn from_cursor(position: PhysicalPosition<f64>, size: Size) -> Self {
        if size.is_empty() {
            return Self::CENTER;
        }
        let x = position.x / size.width as f64 * 2. - 1.;
        let y = -(position.y / size.height as f64) * 2. + 1.;
        Self::new(x as f32, y as f32)
    }
}
