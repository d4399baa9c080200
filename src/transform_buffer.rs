use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3, Vec4};
use log::debug;

/// Per-instance layout uploaded to the GPU instance vertex buffer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Fixed-capacity per-frame output of an instanced layer.
///
/// Matrices and colors are kept in separate flat arrays; `raw_instances`
/// interleaves them into a reusable staging array right before upload.
#[derive(Debug, Clone)]
pub struct TransformBuffer {
    matrices: Vec<Mat4>,
    colors: Vec<Vec4>,
    staging: Vec<InstanceRaw>,
    dirty: bool,
    generation: u64,
}

impl TransformBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; capacity],
            colors: vec![Vec4::ONE; capacity],
            staging: Vec::with_capacity(capacity),
            dirty: true,
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    #[cfg(test)]
    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    #[cfg(test)]
    pub fn color(&self, index: usize) -> Option<Vec3> {
        self.colors.get(index).map(|c| c.truncate())
    }

    pub fn set_transform(&mut self, index: usize, position: Vec3, rotation: Quat, scale: f32) {
        self.set_matrix(
            index,
            Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, position),
        );
    }

    pub fn set_matrix(&mut self, index: usize, matrix: Mat4) {
        match self.matrices.get_mut(index) {
            Some(slot) => *slot = matrix,
            None => debug!("Ignored transform write at {} (len {})", index, self.len()),
        }
    }

    pub fn set_color(&mut self, index: usize, color: Vec3) {
        match self.colors.get_mut(index) {
            Some(slot) => *slot = color.extend(1.),
            None => debug!("Ignored color write at {} (len {})", index, self.len()),
        }
    }

    /// Flags the whole buffer for upload. Called once per frame after all writes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }

    #[cfg(test)]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, returning whether an upload is due.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Number of completed frame writes.
    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn raw_instances(&mut self) -> &[InstanceRaw] {
        self.staging.clear();
        self.staging.extend(
            self.matrices
                .iter()
                .zip(&self.colors)
                .map(|(matrix, color)| InstanceRaw {
                    model: matrix.to_cols_array_2d(),
                    color: color.to_array(),
                }),
        );
        &self.staging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_dirty_so_the_rest_layout_is_uploaded() {
        let mut buffer = TransformBuffer::with_capacity(3);
        assert_eq!(buffer.len(), 3);
        assert!(buffer.take_dirty());
        assert!(!buffer.take_dirty());
        assert_eq!(buffer.generation(), 0);
    }

    #[test]
    fn mark_dirty_bumps_generation() {
        let mut buffer = TransformBuffer::with_capacity(1);
        let _ = buffer.take_dirty();
        buffer.mark_dirty();
        buffer.mark_dirty();
        assert!(buffer.is_dirty());
        assert_eq!(buffer.generation(), 2);
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut buffer = TransformBuffer::with_capacity(2);
        buffer.set_matrix(5, Mat4::from_translation(Vec3::X));
        buffer.set_color(5, Vec3::X);
        assert!(buffer.matrices().iter().all(|m| *m == Mat4::IDENTITY));
        assert_eq!(buffer.color(5), None);
    }

    #[test]
    fn raw_instances_interleave_matrix_and_color() {
        let mut buffer = TransformBuffer::with_capacity(2);
        buffer.set_transform(1, Vec3::new(1., 2., 3.), Quat::IDENTITY, 0.5);
        buffer.set_color(1, Vec3::new(0.25, 0.5, 0.75));

        let raw = buffer.raw_instances();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].model, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(raw[1].model[0], [0.5, 0., 0., 0.]);
        assert_eq!(raw[1].model[3], [1., 2., 3., 1.]);
        assert_eq!(raw[1].color, [0.25, 0.5, 0.75, 1.]);
        assert_eq!(
            std::mem::size_of::<InstanceRaw>(),
            20 * std::mem::size_of::<f32>()
        );
    }
}
