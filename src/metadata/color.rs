use image::RgbaImage;

/// An opaque 8-bit color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Accent used when the loaded track has no cover.
pub const DEFAULT_ACCENT: Rgb = Rgb::new(108, 92, 231);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `rgb(r, g, b)` notation.
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// Linear blend towards `other`; `t` is clamped to `0..=1`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Mean color of every pixel, channel sums floor-divided by the pixel count.
///
/// Alpha is ignored. `None` for an image without pixels.
pub fn average_color(image: &RgbaImage) -> Option<Rgb> {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return None;
    }
    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for px in image.pixels() {
        r += u64::from(px[0]);
        g += u64::from(px[1]);
        b += u64::from(px[2]);
    }
    Some(Rgb::new(
        (r / count) as u8,
        (g / count) as u8,
        (b / count) as u8,
    ))
}
