pub trait HasSize {
    fn size(&self) -> Size;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Size {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

impl HasSize for winit::window::Window {
    fn size(&self) -> Size {
        self.inner_size().into()
    }
}

pub trait Window: HasSize + raw_window_handle::HasRawWindowHandle {}

impl Window for winit::window::Window {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_of_minimized_window_is_one() {
        let size = Size {
            width: 0,
            height: 720,
        };
        assert!(size.is_empty());
        assert_eq!(size.aspect_ratio(), 1.0);
    }

    #[test]
    fn aspect_ratio_is_width_over_height() {
        let size = Size {
            width: 1280,
            height: 720,
        };
        assert!(!size.is_empty());
        assert!((size.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }
}
