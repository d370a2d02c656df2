//! Rasterizes turtle drawings into grayscale bitmaps, and prints bitmaps as
//! ASCII art.

use crate::eval::{Drawing, Segment};
use itertools::Itertools;

/// Half the side length of the square region of the plane that is rendered,
/// centred on the turtle's starting point.
pub const VIEW_RADIUS: f64 = 5.0;

/// The largest side length, in pixels, a canvas may have.
pub const MAX_RESOLUTION: usize = 4096;

/// A square grayscale image, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    resolution: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    /// An empty canvas with `resolution × resolution` pixels.
    #[must_use]
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            pixels: vec![0; resolution * resolution],
        }
    }

    /// Renders `drawing` with anti-aliased strokes.
    #[must_use]
    pub fn render(drawing: &Drawing, resolution: usize) -> Self {
        let mut canvas = Self::new(resolution);
        for segment in &drawing.segments {
            canvas.stroke(segment);
        }
        canvas
    }

    #[allow(clippy::cast_precision_loss)]
    fn to_pixel(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let scale = self.resolution as f64 / (2.0 * VIEW_RADIUS);
        ((x + VIEW_RADIUS) * scale, (VIEW_RADIUS - y) * scale)
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn stroke(&mut self, segment: &Segment) {
        let half_width = self.resolution as f64 / 56.0;
        let (x0, y0) = self.to_pixel(segment.start);
        let (x1, y1) = self.to_pixel(segment.end);
        let reach = half_width + 1.0;
        let max = self.resolution as f64;
        let clamp = |v: f64| v.max(0.0).min(max) as usize;
        let (left, right) = (clamp(x0.min(x1) - reach), clamp(x0.max(x1) + reach));
        let (top, bottom) = (clamp(y0.min(y1) - reach), clamp(y0.max(y1) + reach));

        for row in top..bottom {
            for column in left..right {
                let center = (column as f64 + 0.5, row as f64 + 0.5);
                let distance = distance_to_segment(center, (x0, y0), (x1, y1));
                let coverage = (half_width + 0.5 - distance).max(0.0).min(1.0);
                let value = (coverage * 255.0).round() as u8;
                let pixel = &mut self.pixels[row * self.resolution + column];
                *pixel = (*pixel).max(value);
            }
        }
    }

    /// The number of pixels along each side.
    #[must_use]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// The pixel intensities, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consumes the canvas, returning its pixel intensities.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The pixel intensities as comma-separated integers.
    #[must_use]
    pub fn to_csv(&self) -> String {
        self.pixels.iter().join(",")
    }
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length_squared = dx * dx + dy * dy;
    let t = if length_squared == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / length_squared)
            .max(0.0)
            .min(1.0)
    };
    (p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

/// Renders a `size × size` bitmap as boxed ASCII art, two characters per
/// pixel.
#[must_use]
pub fn pretty_string(shape: &[u8], size: usize) -> String {
    let mut out = String::new();
    out.push('╭');
    out.push_str(&"─".repeat(size * 2));
    out.push_str("╮\n");
    for row in shape.chunks(size).take(size) {
        out.push('│');
        for &value in row {
            let value = f64::from(value);
            out.push_str(if value < 51.0 {
                "  "
            } else if value < 102.0 {
                "░░"
            } else if value < 153.6 {
                "▒▒"
            } else if value < 204.8 {
                "▓▓"
            } else {
                "██"
            });
        }
        out.push_str("│\n");
    }
    out.push('╰');
    out.push_str(&"─".repeat(size * 2));
    out.push_str("╯\n");
    out
}

/// Prints a bitmap as ASCII art on standard output.
pub fn pretty_print(shape: &[u8], size: usize) {
    println!("{}", pretty_string(shape, size));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile::compile, eval::run_turtle};

    #[test]
    fn empty_drawing_is_blank() {
        let canvas = Canvas::render(&Drawing::default(), 28);
        assert_eq!(canvas.pixels().len(), 28 * 28);
        assert!(canvas.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn line_is_drawn_right_of_center() {
        let drawing = run_turtle(&compile("(move 1d 0a)").unwrap()).unwrap();
        let canvas = Canvas::render(&drawing, 100);
        let at = |row: usize, column: usize| canvas.pixels()[row * 100 + column];
        // One unit is ten pixels at this resolution.
        assert_eq!(at(49, 55), 255);
        assert_eq!(at(49, 45), 0);
        assert_eq!(at(20, 55), 0);
    }

    #[test]
    fn csv_format() {
        let mut canvas = Canvas::new(2);
        canvas.pixels[1] = 255;
        assert_eq!(canvas.to_csv(), "0,255,0,0");
    }

    #[test]
    fn ascii_art() {
        let art = pretty_string(&[0, 60, 120, 255], 2);
        assert_eq!(art, "╭────╮\n│  ░░│\n│▒▒██│\n╰────╯\n");
    }
}
