use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use image::{ Rgb, RgbImage };
use thiserror::Error;

use crate::color::Color;

/// Anything a renderer can draw pixels onto.
///
/// Pixels are addressed by column `x` in `[0, width)` and row `y` in
/// `[0, height)`. Writing outside those bounds is a caller bug.
pub trait Drawable {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn put_pixel(&mut self, x: usize, y: usize, color: Color);
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Failed to write image: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// A canvas for drawing pixels.
///
/// The canvas stores the rendered color of each pixel. Once rendering
/// finishes, the `Canvas` can be saved to an image file: PNG when the path
/// ends in `.png`, plain PPM otherwise.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored row by row.
    pixels: Vec<Color>,
}

/// Scales a color component to a byte.
fn channel(c: f64) -> u8 {
    (c * 255.0).clamp(0.0, 255.0).ceil() as u8
}

impl Drawable for Canvas {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn put_pixel(&mut self, x: usize, y: usize, color: Color) {
        debug_assert!(x < self.width && y < self.height,
            "Pixel ({}, {}) outside {}x{} canvas", x, y, self.width, self.height);

        self.pixels[(y * self.width) + x] = color;
    }
}

impl Canvas {
    /// Creates a new black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Returns `None` if the location is out-of-bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use whitted_tracer::color::Color;
    /// # use whitted_tracer::canvas::{ Canvas, Drawable };
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.put_pixel(4, 2, purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// assert!(canvas.read_pixel(8, 2).is_none());
    /// ```
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Saves a canvas to an image file, picking the format by extension.
    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        let is_png = path.extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("png"));

        if is_png {
            self.to_image().save(path)?;
        } else {
            let mut out = BufWriter::new(File::create(path)?);
            self.write_ppm(&mut out)?;
            out.flush()?;
        }

        Ok(())
    }

    /// Converts the canvas to an 8-bit RGB image buffer.
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = self.pixels[(y as usize * self.width) + x as usize];
            Rgb([channel(c.r), channel(c.g), channel(c.b)])
        })
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Lines are clamped to 70 columns. If some color component would cross
    /// the 70 column mark on a line, it is moved to the next line over.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        let mut col = 0;
        for pixel in self.pixels.iter() {
            for c in [pixel.r, pixel.g, pixel.b].iter() {
                let s = channel(*c).to_string();

                if col == 0 {
                    write!(out, "{}", s)?;
                    col = s.len();
                } else if col + 1 + s.len() > 70 {
                    write!(out, "\n{}", s)?;
                    col = s.len();
                } else {
                    write!(out, " {}", s)?;
                    col += 1 + s.len();
                }
            }
        }

        // Terminate the PPM file with a newline
        writeln!(out)?;

        Ok(())
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width(), 10);
    assert_eq!(c.height(), 20);
    for y in 0..20 {
        for x in 0..10 {
            assert_eq!(c.read_pixel(x, y).unwrap(), Color::black());
        }
    }
}

#[test]
fn put_and_read_pixel() {
    let mut c = Canvas::new(10, 20);
    let red = Color::rgb(1.0, 0.0, 0.0);
    c.put_pixel(2, 3, red);

    assert_eq!(c.read_pixel(2, 3).unwrap(), red);
    assert_eq!(c.read_pixel(3, 2).unwrap(), Color::black());
}

#[test]
#[should_panic]
fn put_pixel_out_of_bounds_panics() {
    let mut c = Canvas::new(4, 4);
    c.put_pixel(0, 4, Color::white());
}

#[test]
fn ppm_header_and_pixels() {
    let mut c = Canvas::new(5, 3);
    c.put_pixel(0, 0, Color::rgb(1.5, 0.0, 0.0));
    c.put_pixel(2, 1, Color::rgb(0.0, 0.5, 0.0));
    c.put_pixel(4, 2, Color::rgb(-0.5, 0.0, 1.0));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = ppm.lines().collect();

    assert_eq!(lines[0], "P3");
    assert_eq!(lines[1], "5 3");
    assert_eq!(lines[2], "255");
    assert!(ppm.ends_with('\n'));

    let values: Vec<&str> = lines[3..].iter()
        .flat_map(|l| l.split_whitespace())
        .collect();
    assert_eq!(values.len(), 5 * 3 * 3);
    assert_eq!(&values[0..3], &["255", "0", "0"]);
    assert_eq!(&values[21..24], &["0", "128", "0"]);
    assert_eq!(&values[42..45], &["0", "0", "255"]);
}

#[test]
fn ppm_lines_stay_within_70_columns() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.put_pixel(x, y, Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();

    for line in ppm.lines() {
        assert!(line.len() <= 70);
    }
    assert!(ppm.lines().skip(3).all(|l| !l.starts_with(' ')));
}

#[test]
fn canvas_converts_to_image() {
    let mut c = Canvas::new(3, 2);
    c.put_pixel(2, 1, Color::blue());

    let img = c.to_image();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1), &Rgb([0, 0, 255]));
    assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
}
