use std::time::Instant;

/// Timing of a single animation frame, threaded explicitly into every update.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the animation started. Monotonically non-decreasing.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
}

impl FrameTime {
    #[cfg(test)]
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self { elapsed, delta }
    }

    /// The frame that follows this one after `delta` seconds.
    #[cfg(test)]
    pub fn advance(self, delta: f32) -> Self {
        Self {
            elapsed: self.elapsed + delta,
            delta,
        }
    }
}

pub struct Clock {
    start: Instant,
    last: Instant,
}

impl Clock {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let time = FrameTime {
            elapsed: now.duration_since(self.start).as_secs_f32(),
            delta: now.duration_since(self.last).as_secs_f32(),
        };
        self.last = now;
        time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_monotonic() {
        let mut clock = Clock::start();
        let first = clock.tick();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = clock.tick();
        assert!(second.elapsed > first.elapsed);
        assert!(second.delta > 0.);
        assert!(second.delta <= second.elapsed);
    }

    #[test]
    fn advance_accumulates_elapsed() {
        let time = FrameTime::default().advance(0.5).advance(0.25);
        assert_eq!(time, FrameTime::new(0.75, 0.25));
    }
}
