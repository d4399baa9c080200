use glam::{Mat4, Vec3};
use log::info;

use crate::{
    clock::FrameTime,
    cloud::ShapeCloud,
    config::Config,
    entity::{Camera, Lighting, Material, Shape},
    orbital::OrbitalAccent,
    pointer::Pointer,
    transform_buffer::TransformBuffer,
};

const FIELD_FOV: f32 = 60.;
const ACCENT_FOV: f32 = 45.;

/// What the renderer needs to allocate GPU storage for one drawable layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub shape: Shape,
    pub material: Material,
    pub capacity: usize,
}

/// Per-frame view of one drawable layer.
pub struct Layer<'a> {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub lighting: Lighting,
    pub material: Material,
    pub group: Mat4,
    pub instances: &'a mut TransformBuffer,
}

struct Mounted {
    field_camera: Camera,
    accent_camera: Camera,
    clouds: Vec<ShapeCloud>,
    accent: Option<OrbitalAccent>,
}

/// The mountable background: shape clouds and/or the orbital accent.
///
/// Once unmounted it holds no simulation state or transform buffers, and
/// frames are ignored.
pub struct Backdrop {
    mounted: Option<Mounted>,
    frames: u64,
}

impl Backdrop {
    pub fn mount(config: &Config, aspect_ratio: f32) -> Self {
        let clouds: Vec<_> = config
            .clouds
            .iter()
            .map(|cloud| {
                ShapeCloud::new(cloud.shape, cloud.count, cloud.seed)
                    .with_smoothing(config.smoothing)
            })
            .collect();
        let accent = config.accent.then(OrbitalAccent::new);

        info!(
            "Mounted backdrop: {} clouds ({} instances), accent: {}",
            clouds.len(),
            clouds.iter().map(ShapeCloud::count).sum::<usize>(),
            accent.is_some()
        );

        Self {
            mounted: Some(Mounted {
                field_camera: Camera::looking_at_origin(FIELD_FOV, aspect_ratio),
                accent_camera: Camera::looking_at_origin(ACCENT_FOV, aspect_ratio),
                clouds,
                accent,
            }),
            frames: 0,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Drops every cloud, ring and transform buffer. Idempotent.
    pub fn unmount(&mut self) {
        if self.mounted.take().is_some() {
            info!("Unmounted backdrop after {} frames", self.frames);
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if let Some(mounted) = &mut self.mounted {
            mounted.field_camera.aspect_ratio = aspect_ratio;
            mounted.accent_camera.aspect_ratio = aspect_ratio;
        }
    }

    /// Advances every mounted visual. Returns `false` once unmounted.
    pub fn frame(&mut self, time: FrameTime, pointer: Pointer) -> bool {
        let mounted = match &mut self.mounted {
            Some(mounted) => mounted,
            None => return false,
        };

        for cloud in &mut mounted.clouds {
            cloud.update(time, pointer);
        }
        if let Some(accent) = &mut mounted.accent {
            accent.update(time);
        }

        self.frames += 1;
        true
    }

    /// Layers in draw order: clouds first, then core and rings.
    pub fn descriptors(&self) -> Vec<LayerDescriptor> {
        let mounted = match &self.mounted {
            Some(mounted) => mounted,
            None => return Vec::new(),
        };

        let mut descriptors: Vec<_> = mounted
            .clouds
            .iter()
            .map(|cloud| LayerDescriptor {
                shape: cloud.shape(),
                material: Material::GLOSSY,
                capacity: cloud.count(),
            })
            .collect();

        if let Some(accent) = &mounted.accent {
            let core = accent.core();
            descriptors.push(LayerDescriptor {
                shape: Shape::Sphere {
                    radius: core.radius,
                    segments: 64,
                },
                material: Material::CHROME.with_emissive(0.2),
                capacity: core.instances().len(),
            });
            descriptors.extend(accent.rings().iter().map(|ring| LayerDescriptor {
                shape: Shape::Torus {
                    radius: ring.radius,
                    tube: ring.tube,
                    radial_segments: 16,
                    tubular_segments: 100,
                },
                material: Material::CHROME,
                capacity: ring.instances().len(),
            }));
        }

        descriptors
    }

    /// Number of layers [`Backdrop::for_each_layer`] yields.
    pub fn layer_count(&self) -> usize {
        self.mounted.as_ref().map_or(0, |mounted| {
            let accent = mounted
                .accent
                .as_ref()
                .map_or(0, |accent| 1 + accent.rings().len());
            mounted.clouds.len() + accent
        })
    }

    /// Visits every layer in the same order as [`Backdrop::descriptors`].
    pub fn for_each_layer<'a>(&'a mut self, mut f: impl FnMut(Layer<'a>)) {
        let Mounted {
            field_camera,
            accent_camera,
            clouds,
            accent,
        } = match &mut self.mounted {
            Some(mounted) => mounted,
            None => return,
        };

        for cloud in clouds.iter_mut() {
            let group = cloud.group_matrix();
            f(layer(
                field_camera,
                Lighting::FIELD,
                Material::GLOSSY,
                group,
                cloud.instances_mut(),
            ));
        }

        if let Some(accent) = accent {
            let (core, rings) = accent.parts_mut();
            f(layer(
                accent_camera,
                Lighting::ACCENT,
                Material::CHROME.with_emissive(0.2),
                Mat4::IDENTITY,
                core.instances_mut(),
            ));
            for ring in rings {
                f(layer(
                    accent_camera,
                    Lighting::ACCENT,
                    Material::CHROME,
                    Mat4::IDENTITY,
                    ring.instances_mut(),
                ));
            }
        }
    }

    #[cfg(test)]
    pub fn layers(&mut self) -> Vec<Layer<'_>> {
        let mut layers = Vec::new();
        self.for_each_layer(|layer| layers.push(layer));
        layers
    }
}

fn layer<'a>(
    camera: &Camera,
    lighting: Lighting,
    material: Material,
    group: Mat4,
    instances: &'a mut TransformBuffer,
) -> Layer<'a> {
    Layer {
        view_proj: camera.view_proj_matrix(),
        camera_position: camera.position,
        lighting,
        material,
        group,
        instances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        for cloud in &mut config.clouds {
            cloud.count = 16;
        }
        config
    }

    fn generations(backdrop: &mut Backdrop) -> Vec<u64> {
        backdrop
            .layers()
            .iter()
            .map(|layer| layer.instances.generation())
            .collect()
    }

    #[test]
    fn descriptors_and_layers_line_up() {
        let mut backdrop = Backdrop::mount(&small_config(), 1.5);
        let descriptors = backdrop.descriptors();
        assert_eq!(descriptors.len(), 3 + 1 + 3);
        let layers = backdrop.layers();
        assert_eq!(layers.len(), descriptors.len());
        for (layer, descriptor) in layers.iter().zip(&descriptors) {
            assert_eq!(layer.instances.len(), descriptor.capacity);
            assert_eq!(layer.material, descriptor.material);
        }
    }

    #[test]
    fn layer_count_tracks_mounted_parts() {
        let mut backdrop = Backdrop::mount(&small_config(), 1.5);
        assert_eq!(backdrop.layer_count(), backdrop.descriptors().len());
        assert_eq!(backdrop.layer_count(), backdrop.layers().len());

        let mut config = small_config();
        config.accent = false;
        assert_eq!(Backdrop::mount(&config, 1.).layer_count(), 3);

        backdrop.unmount();
        assert_eq!(backdrop.layer_count(), 0);
        let mut visited = 0;
        backdrop.for_each_layer(|_| visited += 1);
        assert_eq!(visited, 0);
    }

    #[test]
    fn every_frame_writes_every_layer_once() {
        let mut backdrop = Backdrop::mount(&small_config(), 1.5);
        let before = generations(&mut backdrop);
        assert!(backdrop.frame(FrameTime::new(0.1, 0.1), Pointer::CENTER));
        let after = generations(&mut backdrop);
        for (b, a) in before.iter().zip(&after) {
            assert_eq!(*a, b + 1);
        }
        assert_eq!(backdrop.frames(), 1);
    }

    #[test]
    fn unmount_mid_animation_stops_all_writes() {
        let mut backdrop = Backdrop::mount(&small_config(), 1.5);
        let mut time = FrameTime::default();
        for _ in 0..10 {
            time = time.advance(1. / 60.);
            assert!(backdrop.frame(time, Pointer::new(0.3, 0.3)));
        }

        backdrop.unmount();
        assert!(!backdrop.is_mounted());

        for _ in 0..10 {
            time = time.advance(1. / 60.);
            assert!(!backdrop.frame(time, Pointer::new(0.3, 0.3)));
        }
        assert_eq!(backdrop.frames(), 10);
        assert!(backdrop.layers().is_empty());
        assert!(backdrop.descriptors().is_empty());

        backdrop.unmount();
        assert!(!backdrop.is_mounted());
    }

    #[test]
    fn field_only_has_no_accent_layers() {
        let mut config = small_config();
        config.accent = false;
        let backdrop = Backdrop::mount(&config, 1.);
        let descriptors = backdrop.descriptors();
        assert_eq!(descriptors.len(), 3);
        assert!(descriptors
            .iter()
            .all(|d| !matches!(d.shape, Shape::Torus { .. })));
    }

    #[test]
    fn cloud_layers_carry_the_group_rotation() {
        let mut config = small_config();
        config.accent = false;
        let mut backdrop = Backdrop::mount(&config, 1.);
        let mut time = FrameTime::default();
        for _ in 0..5 {
            time = time.advance(1. / 60.);
            backdrop.frame(time, Pointer::new(1., 0.));
        }
        for layer in backdrop.layers() {
            assert!(!layer.group.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn aspect_ratio_updates_projection() {
        let mut backdrop = Backdrop::mount(&small_config(), 1.);
        let square = backdrop.layers()[0].view_proj;
        backdrop.set_aspect_ratio(2.);
        let wide = backdrop.layers()[0].view_proj;
        assert!(!square.abs_diff_eq(wide, 1e-6));
    }
}
