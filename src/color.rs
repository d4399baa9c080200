//! sRGB / HSL helpers. Everything handed to the renderer is linear RGB.

use glam::Vec3;

pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// Decodes a packed `0xRRGGBB` sRGB swatch.
pub fn hex_to_linear(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.);
    Vec3::new(channel(16), channel(8), channel(0))
}

/// HSL to sRGB, all components in `[0, 1]`. Hue wraps.
pub fn hsl_to_srgb(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    let h = hue.rem_euclid(1.);
    let s = saturation.clamp(0., 1.);
    let l = lightness.clamp(0., 1.);

    if s == 0. {
        return Vec3::splat(l);
    }

    let p = if l <= 0.5 { l * (1. + s) } else { l + s - l * s };
    let q = 2. * l - p;

    Vec3::new(
        hue_to_rgb(q, p, h + 1. / 3.),
        hue_to_rgb(q, p, h),
        hue_to_rgb(q, p, h - 1. / 3.),
    )
}

pub fn hsl_to_linear(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    let srgb = hsl_to_srgb(hue, saturation, lightness);
    Vec3::new(
        srgb_to_linear(srgb.x),
        srgb_to_linear(srgb.y),
        srgb_to_linear(srgb.z),
    )
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.);
    if t < 1. / 6. {
        p + (q - p) * 6. * t
    } else if t < 0.5 {
        q
    } else if t < 2. / 3. {
        p + (q - p) * 6. * (2. / 3. - t)
    } else {
        p
    }
}
