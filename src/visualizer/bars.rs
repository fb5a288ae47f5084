use crate::metadata::Rgb;

/// Color at the foot of every bar.
pub const GRADIENT_BOTTOM: Rgb = Rgb::new(0xa2, 0x9b, 0xfe);
/// Color at the top of every bar, whatever its height.
pub const GRADIENT_TOP: Rgb = Rgb::new(0x6c, 0x5c, 0xe7);

/// One bar in drawing units, origin at the left edge and bottom of the area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

/// Lay out one bar per value across `width`, stopping at the right edge.
///
/// Bars are `width / bins * 2.5` wide and `value / 255 * height * 0.8` tall,
/// separated by one unit.
pub fn bar_layout(values: &[u8], width: f32, height: f32) -> Vec<Bar> {
    if values.is_empty() || width <= 0.0 {
        return Vec::new();
    }
    let bar_width = width / values.len() as f32 * 2.5;
    let mut bars = Vec::new();
    let mut x = 0.0;
    for &value in values {
        if x >= width {
            break;
        }
        bars.push(Bar {
            x,
            width: bar_width,
            height: f32::from(value) / 255.0 * height * 0.8,
        });
        x += bar_width + 1.0;
    }
    bars
}

/// Gradient color at `fraction` of a bar's own height, `0.0` at its foot.
pub fn gradient_color(fraction: f32) -> Rgb {
    GRADIENT_BOTTOM.lerp(GRADIENT_TOP, fraction)
}
