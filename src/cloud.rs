use glam::{const_vec3, Mat4, Quat, Vec3};
use log::info;
use rand::prelude::*;
use rand_pcg::Pcg64Mcg;

use crate::{
    clock::FrameTime,
    color::{hex_to_linear, hsl_to_linear},
    entity::Shape,
    pointer::Pointer,
    transform_buffer::TransformBuffer,
};

pub const PALETTE: [u32; 16] = [
    0x4285F4, 0xDB4437, 0xF4B400, 0x0F9D58, // primaries
    0xFF6B6B, 0x4ECDC4, 0x45B7D1, 0x96CEB4, // pastels
    0xFFEEAD, 0xFF69B4, 0x00FFFF, 0xFF00FF, // neon
    0x1A1A1D, 0x6F2232, 0x950740, 0xC3073F, // dark reds
];

/// Extent of the box the rest positions are scattered in, centered on the origin.
const SPREAD: Vec3 = const_vec3!([25., 25., 15.]);
const MAX_BASE_SCALE: f32 = 0.5;
const RANDOM_HUE_SATURATION: f32 = 0.8;
const RANDOM_HUE_LIGHTNESS: f32 = 0.5;

const INSTANCE_SCALE: f32 = 0.15;
const TIME_SCALE: f32 = 0.3;
const DRIFT_AMPLITUDE: f32 = 0.5;
/// Pointer halved, then mapped to at most 0.2 rad: ±0.1 rad at the viewport edge.
const POINTER_TILT: f32 = 0.5 * 0.2;
const SMOOTHING_FACTOR: f32 = 0.1;
const REFERENCE_FRAME_RATE: f32 = 60.;

pub fn lerp(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// How the group rotation eases toward the pointer target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Smoothing {
    /// Fixed factor per frame. Faster displays ease faster.
    #[default]
    PerFrame,
    /// Factor derived from the frame delta so easing matches a 60 Hz display.
    FrameRateIndependent,
}

impl Smoothing {
    pub fn factor(self, delta: f32) -> f32 {
        match self {
            Smoothing::PerFrame => SMOOTHING_FACTOR,
            Smoothing::FrameRateIndependent => {
                let frames = (delta * REFERENCE_FRAME_RATE).max(0.);
                (1. - (1. - SMOOTHING_FACTOR).powf(frames)).clamp(0., 1.)
            }
        }
    }
}

/// Rigid rotation of a whole cloud, in radians about X and Y.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GroupRotation {
    pub x: f32,
    pub y: f32,
}

impl GroupRotation {
    pub fn target(pointer: Pointer) -> Self {
        Self {
            x: -pointer.y * POINTER_TILT,
            y: pointer.x * POINTER_TILT,
        }
    }

    pub fn ease_toward(&mut self, target: GroupRotation, factor: f32) {
        self.x = lerp(self.x, target.x, factor);
        self.y = lerp(self.y, target.y, factor);
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_quat(Quat::from_rotation_x(self.x) * Quat::from_rotation_y(self.y))
    }
}

/// Offset of instance `index` from its rest position at scaled time `t`.
pub fn drift(t: f32, index: f32, phase: f32) -> Vec3 {
    Vec3::new(
        (t + index * 0.1 + phase).sin(),
        (t * 0.8 + index * 0.2 + phase).cos(),
        (t * 0.5 + index * 0.3 + phase).sin(),
    ) * DRIFT_AMPLITUDE
}

/// A field of small instanced shapes drifting around fixed rest positions.
///
/// Rest positions, sizes and colors are drawn once from `seed`; every frame
/// is a pure function of elapsed time over those bases, apart from the eased
/// group rotation which follows the pointer.
pub struct ShapeCloud {
    shape: Shape,
    seed: u32,
    smoothing: Smoothing,
    base_positions: Vec<Vec3>,
    base_scales: Vec<f32>,
    base_colors: Vec<Vec3>,
    group_rotation: GroupRotation,
    instances: TransformBuffer,
}

impl ShapeCloud {
    pub fn new(shape: Shape, count: usize, seed: u32) -> Self {
        let mut rng = Pcg64Mcg::seed_from_u64(seed as u64);
        info!("Seeded {:?} cloud RNG with {}", shape, seed);

        let mut base_positions = Vec::with_capacity(count);
        let mut base_scales = Vec::with_capacity(count);
        let mut base_colors = Vec::with_capacity(count);

        for _ in 0..count {
            let unit = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            base_positions.push((unit - 0.5) * SPREAD);

            let color = if rng.gen::<f32>() > 0.5 {
                hex_to_linear(PALETTE[rng.gen_range(0..PALETTE.len())])
            } else {
                hsl_to_linear(rng.gen(), RANDOM_HUE_SATURATION, RANDOM_HUE_LIGHTNESS)
            };
            base_colors.push(color);

            base_scales.push(rng.gen::<f32>() * MAX_BASE_SCALE);
        }

        let mut cloud = Self {
            shape,
            seed,
            smoothing: Smoothing::default(),
            base_positions,
            base_scales,
            base_colors,
            group_rotation: GroupRotation::default(),
            instances: TransformBuffer::with_capacity(count),
        };
        cloud.write_rest_layout();
        cloud
    }

    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[cfg(test)]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn count(&self) -> usize {
        self.base_positions.len()
    }

    #[cfg(test)]
    pub fn base_positions(&self) -> &[Vec3] {
        &self.base_positions
    }

    #[cfg(test)]
    pub fn base_scales(&self) -> &[f32] {
        &self.base_scales
    }

    #[cfg(test)]
    pub fn base_colors(&self) -> &[Vec3] {
        &self.base_colors
    }

    #[cfg(test)]
    pub fn group_rotation(&self) -> GroupRotation {
        self.group_rotation
    }

    /// Parent transform shared by every instance.
    pub fn group_matrix(&self) -> Mat4 {
        self.group_rotation.matrix()
    }

    #[cfg(test)]
    pub fn instances(&self) -> &TransformBuffer {
        &self.instances
    }

    pub fn instances_mut(&mut self) -> &mut TransformBuffer {
        &mut self.instances
    }

    fn phase(&self) -> f32 {
        self.seed as f32
    }

    /// Every instance at its rest position, unrotated. Colors are written only here.
    fn write_rest_layout(&mut self) {
        for (i, ((position, scale), color)) in self
            .base_positions
            .iter()
            .zip(&self.base_scales)
            .zip(&self.base_colors)
            .enumerate()
        {
            self.instances
                .set_transform(i, *position, Quat::IDENTITY, scale * INSTANCE_SCALE);
            self.instances.set_color(i, *color);
        }
        self.instances.mark_dirty();
    }

    pub fn update(&mut self, time: FrameTime, pointer: Pointer) {
        let target = GroupRotation::target(pointer);
        self.group_rotation
            .ease_toward(target, self.smoothing.factor(time.delta));

        let t = time.elapsed * TIME_SCALE;
        let phase = self.phase();

        for (i, (position, scale)) in self
            .base_positions
            .iter()
            .zip(&self.base_scales)
            .enumerate()
        {
            let index = i as f32;
            let rotation =
                Quat::from_rotation_x(t * 0.2 + index) * Quat::from_rotation_y(t * 0.1 + index);
            self.instances.set_transform(
                i,
                *position + drift(t, index, phase),
                rotation,
                scale * INSTANCE_SCALE,
            );
        }
        self.instances.mark_dirty();
    }
}
