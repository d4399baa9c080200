use glam::{const_vec3, Mat4, Quat, Vec3};

/// Rotation from Euler angles applied in X, then Y, then Z order (intrinsic).
pub fn euler_xyz(angles: Vec3) -> Quat {
    Quat::from_rotation_x(angles.x) * Quat::from_rotation_y(angles.y) * Quat::from_rotation_z(angles.z)
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub const DEFAULT_POSITION: Vec3 = const_vec3!([0., 0., 8.]);

    pub fn looking_at_origin(fov: f32, aspect_ratio: f32) -> Self {
        Self {
            position: Self::DEFAULT_POSITION,
            target: Vec3::ZERO,
            fov,
            aspect_ratio,
            near: 0.1,
            far: 1000.,
        }
    }

    pub fn proj_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect_ratio, self.near, self.far)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_proj_matrix(&self) -> Mat4 {
        self.proj_matrix() * self.view_matrix()
    }
}

/// Base geometry shared by every instance of a layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    Sphere {
        radius: f32,
        segments: u16,
    },
    Cuboid {
        size: f32,
    },
    Cone {
        radius: f32,
        height: f32,
        segments: u16,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u16,
        tubular_segments: u16,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    /// Multiplied with the per-instance color.
    pub color: Vec3,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: f32,
}

impl Material {
    /// Glossy, mostly dielectric surface tinted by per-instance colors.
    pub const GLOSSY: Material = Material {
        color: Vec3::ONE,
        roughness: 0.1,
        metalness: 0.1,
        emissive: 0.0,
    };

    /// White polished metal.
    pub const CHROME: Material = Material {
        color: Vec3::ONE,
        roughness: 0.1,
        metalness: 0.8,
        emissive: 0.0,
    };

    pub fn with_emissive(self, emissive: f32) -> Self {
        Self { emissive, ..self }
    }
}

/// Ambient term, a key point light and an opposing fill light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub point_position: Vec3,
    pub point_intensity: f32,
    /// Diffuse only. Zero intensity disables it.
    pub fill_position: Vec3,
    pub fill_intensity: f32,
}

impl Lighting {
    pub const FIELD: Lighting = Lighting {
        ambient: 0.55,
        point_position: const_vec3!([10., 10., 10.]),
        point_intensity: 1.0,
        fill_position: Vec3::ZERO,
        fill_intensity: 0.0,
    };

    pub const ACCENT: Lighting = Lighting {
        ambient: 0.35,
        point_position: const_vec3!([10., 10., 10.]),
        point_intensity: 0.9,
        fill_position: const_vec3!([-10., -10., -10.]),
        fill_intensity: 0.45,
    };
}
