use std::f32::consts::{FRAC_PI_3, FRAC_PI_4};

use glam::{const_vec3, Mat4, Vec3};

use crate::{
    clock::FrameTime,
    entity::{euler_xyz, Transform},
    transform_buffer::TransformBuffer,
};

const RING_TUBE: f32 = 0.05;
const CORE_RADIUS: f32 = 0.8;
const ACCENT_SCALE: f32 = 1.2;
const PULSE_FREQUENCY: f32 = 2.;
const PULSE_AMPLITUDE: f32 = 0.05;

/// Scale of the core at elapsed time `t`. Set each frame, never integrated.
pub fn pulse_scale(t: f32) -> f32 {
    1. + (t * PULSE_FREQUENCY).sin() * PULSE_AMPLITUDE
}

/// Gentle bobbing and wobbling of the whole accent, a pure function of time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hover {
    pub speed: f32,
    pub rotation_intensity: f32,
    pub float_intensity: f32,
}

impl Default for Hover {
    fn default() -> Self {
        Self {
            speed: 2.,
            rotation_intensity: 0.5,
            float_intensity: 0.5,
        }
    }
}

impl Hover {
    pub fn transform(&self, t: f32) -> Transform {
        let u = t / 4. * self.speed;
        let rotation = Vec3::new(u.cos() / 8., u.sin() / 8., u.sin() / 20.) * self.rotation_intensity;
        Transform {
            position: Vec3::new(0., u.sin() / 10. * self.float_intensity, 0.),
            rotation: euler_xyz(rotation),
            ..Default::default()
        }
    }
}

pub struct Ring {
    pub radius: f32,
    pub tube: f32,
    /// Static orientation of the ring's orbital plane.
    tilt: Vec3,
    /// Angular velocity per axis in rad/s.
    spin_rate: Vec3,
    spin: Vec3,
    instances: TransformBuffer,
}

impl Ring {
    fn new(radius: f32, tilt: Vec3, spin_rate: Vec3) -> Self {
        let mut instances = TransformBuffer::with_capacity(1);
        instances.set_color(0, Vec3::ONE);
        Self {
            radius,
            tube: RING_TUBE,
            tilt,
            spin_rate,
            spin: Vec3::ZERO,
            instances,
        }
    }

    #[cfg(test)]
    pub fn tilt(&self) -> Vec3 {
        self.tilt
    }

    #[cfg(test)]
    pub fn spin_rate(&self) -> Vec3 {
        self.spin_rate
    }

    /// Accumulated rotation per axis.
    #[cfg(test)]
    pub fn spin(&self) -> Vec3 {
        self.spin
    }

    pub fn instances(&self) -> &TransformBuffer {
        &self.instances
    }

    pub fn instances_mut(&mut self) -> &mut TransformBuffer {
        &mut self.instances
    }

    fn update(&mut self, delta: f32, root: Mat4) {
        self.spin += self.spin_rate * delta;
        let local = Mat4::from_quat(euler_xyz(self.tilt)) * Mat4::from_quat(euler_xyz(self.spin));
        self.instances.set_matrix(0, root * local);
        self.instances.mark_dirty();
    }
}

pub struct Core {
    pub radius: f32,
    pulse: f32,
    instances: TransformBuffer,
}

impl Core {
    fn new() -> Self {
        let mut instances = TransformBuffer::with_capacity(1);
        instances.set_color(0, Vec3::ONE);
        Self {
            radius: CORE_RADIUS,
            pulse: 1.,
            instances,
        }
    }

    #[cfg(test)]
    pub fn pulse(&self) -> f32 {
        self.pulse
    }

    pub fn instances(&self) -> &TransformBuffer {
        &self.instances
    }

    pub fn instances_mut(&mut self) -> &mut TransformBuffer {
        &mut self.instances
    }

    fn update(&mut self, t: f32, root: Mat4) {
        self.pulse = pulse_scale(t);
        self.instances
            .set_matrix(0, root * Mat4::from_scale(Vec3::splat(self.pulse)));
        self.instances.mark_dirty();
    }
}

/// Three nested, tilted rings spinning around a pulsing core.
pub struct OrbitalAccent {
    rings: [Ring; 3],
    core: Core,
    hover: Hover,
}

impl Default for OrbitalAccent {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitalAccent {
    pub fn new() -> Self {
        let mut accent = Self {
            rings: [
                Ring::new(
                    1.8,
                    const_vec3!([FRAC_PI_3, 0., 0.]),
                    const_vec3!([0.2, 0.1, 0.]),
                ),
                Ring::new(
                    2.4,
                    const_vec3!([-FRAC_PI_3, 0., 0.]),
                    const_vec3!([0.15, -0.2, 0.]),
                ),
                // Spins about x and z so it never mirrors the inner two.
                Ring::new(
                    3.0,
                    const_vec3!([0., FRAC_PI_4, 0.]),
                    const_vec3!([-0.1, 0., 0.15]),
                ),
            ],
            core: Core::new(),
            hover: Hover::default(),
        };
        accent.update(FrameTime::default());
        accent
    }

    pub fn rings(&self) -> &[Ring; 3] {
        &self.rings
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn parts_mut(&mut self) -> (&mut Core, &mut [Ring; 3]) {
        (&mut self.core, &mut self.rings)
    }

    pub fn root_matrix(&self, t: f32) -> Mat4 {
        self.hover.transform(t).matrix() * Mat4::from_scale(Vec3::splat(ACCENT_SCALE))
    }

    pub fn update(&mut self, time: FrameTime) {
        let root = self.root_matrix(time.elapsed);
        for ring in &mut self.rings {
            ring.update(time.delta, root);
        }
        self.core.update(time.elapsed, root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_stays_bounded() {
        let mut t = -50.;
        while t < 500. {
            let s = pulse_scale(t);
            assert!((0.95..=1.05).contains(&s), "t={} s={}", t, s);
            t += 0.013;
        }
    }

    #[test]
    fn pulse_is_set_not_accumulated() {
        let mut jittery = OrbitalAccent::new();
        let mut steady = OrbitalAccent::new();
        let mut time = FrameTime::default();
        for delta in [0.5, 0.001, 0.2, 0.033, 1.7] {
            time = time.advance(delta);
            jittery.update(time);
        }
        steady.update(FrameTime::new(time.elapsed, 1. / 60.));
        assert_eq!(jittery.core().pulse(), steady.core().pulse());
        assert_eq!(jittery.core().pulse(), pulse_scale(time.elapsed));
    }

    #[test]
    fn rings_accumulate_at_fixed_rates() {
        let mut accent = OrbitalAccent::new();
        let mut time = FrameTime::default();
        for _ in 0..120 {
            time = time.advance(0.5);
            accent.update(time);
        }
        let [inner, middle, outer] = accent.rings();
        assert!(inner.spin().abs_diff_eq(Vec3::new(12., 6., 0.), 1e-3));
        assert!(middle.spin().abs_diff_eq(Vec3::new(9., -12., 0.), 1e-3));
        assert!(outer.spin().abs_diff_eq(Vec3::new(-6., 0., 9.), 1e-3));
    }

    #[test]
    fn middle_ring_counter_rotates_inner_ring() {
        let mut accent = OrbitalAccent::new();
        accent.update(FrameTime::new(0.1, 0.1));
        let [inner, middle, _] = accent.rings();
        assert!(inner.spin().y > 0.);
        assert!(middle.spin().y < 0.);
        assert_eq!(inner.spin_rate().y.signum(), -middle.spin_rate().y.signum());
    }

    #[test]
    fn outer_ring_uses_x_z_axis_pair() {
        let accent = OrbitalAccent::new();
        let outer = &accent.rings()[2];
        assert_eq!(outer.spin_rate().y, 0.);
        assert!(outer.spin_rate().x < 0. && outer.spin_rate().z > 0.);
    }

    #[test]
    fn rings_nest_by_radius() {
        let accent = OrbitalAccent::new();
        let radii: Vec<f32> = accent.rings().iter().map(|r| r.radius).collect();
        assert_eq!(radii, vec![1.8, 2.4, 3.0]);
        assert!(accent.rings().iter().all(|r| r.tube == RING_TUBE));
        assert_eq!(accent.core().radius, CORE_RADIUS);
    }

    #[test]
    fn zero_delta_leaves_spin_unchanged() {
        let mut accent = OrbitalAccent::new();
        accent.update(FrameTime::new(3., 0.));
        assert!(accent.rings().iter().all(|r| r.spin() == Vec3::ZERO));
    }

    #[test]
    fn ring_matrix_composes_root_tilt_and_spin() {
        let mut accent = OrbitalAccent::new();
        let time = FrameTime::new(1.25, 0.25);
        accent.update(time);
        let root = accent.root_matrix(time.elapsed);
        let ring = &accent.rings()[1];
        let expected = root
            * Mat4::from_quat(euler_xyz(ring.tilt()))
            * Mat4::from_quat(euler_xyz(ring.spin()));
        assert!(ring.instances().matrices()[0].abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn hover_is_small_and_periodic() {
        let hover = Hover::default();
        let period = 2. * std::f32::consts::PI * 4. / hover.speed;
        let a = hover.transform(0.7).matrix();
        let b = hover.transform(0.7 + period).matrix();
        assert!(a.abs_diff_eq(b, 1e-4));
        for step in 0..100 {
            let transform = hover.transform(step as f32 * 0.1);
            assert!(transform.position.y.abs() <= 0.05 + 1e-6);
        }
    }

    #[test]
    fn every_update_writes_each_buffer_once() {
        let mut accent = OrbitalAccent::new();
        let before = accent.core().instances().generation();
        accent.update(FrameTime::new(0.5, 0.5));
        assert_eq!(accent.core().instances().generation(), before + 1);
        for ring in accent.rings() {
            assert_eq!(ring.instances().generation(), before + 1);
        }
    }
}
