//! Writing task renderings to PNG files, individually and tiled into
//! montages.

use crate::{catalog::HIGH_RESOLUTION, task::Task};
use log::info;
use rand::{seq::SliceRandom, Rng};
use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// An error while writing images.
#[derive(Debug, Error)]
pub enum MontageError {
    /// A file could not be created.
    #[error("{}: {source}", path.display())]
    Io {
        /// The path being written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The image could not be encoded.
    #[error("{}: {source}", path.display())]
    Png {
        /// The path being written.
        path: PathBuf,
        /// The underlying error.
        source: png::EncodingError,
    },

    /// A task has no high-resolution rendering.
    #[error("task `{0}` has no high-resolution image")]
    MissingImage(String),

    /// A task's high-resolution rendering has the wrong size.
    #[error("task `{name}` has a {len}-pixel image, expected {expected}")]
    WrongSize {
        /// The task's name.
        name: String,
        /// The number of pixels in the image.
        len: usize,
        /// The number of pixels expected.
        expected: usize,
    },
}

/// A grayscale image.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

/// Tiles `size × size` images row-major into a grid with `ceil(sqrt(n))`
/// columns. Unused cells are left blank.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn montage<T: AsRef<[u8]>>(images: &[T], size: usize) -> Image {
    if images.is_empty() {
        return Image {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
    }
    let columns = (images.len() as f64).sqrt().ceil() as usize;
    let rows = (images.len() + columns - 1) / columns;
    let (width, height) = (columns * size, rows * size);
    let mut pixels = vec![0; width * height];

    for (i, image) in images.iter().enumerate() {
        let (row, column) = (i / columns, i % columns);
        for (y, line) in image.as_ref().chunks(size).take(size).enumerate() {
            let start = (row * size + y) * width + column * size;
            pixels[start..start + line.len()].copy_from_slice(line);
        }
    }
    Image {
        width,
        height,
        pixels,
    }
}

/// Writes an 8-bit grayscale PNG.
///
/// # Errors
///
/// Returns an error if the file can't be created or written.
#[allow(clippy::cast_possible_truncation)]
pub fn write_png<P: AsRef<Path>>(
    path: P,
    pixels: &[u8],
    width: usize,
    height: usize,
) -> Result<(), MontageError> {
    let path = path.as_ref();
    let png_error = |source| MontageError::Png {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|source| MontageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width as u32, height as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(png_error)?;
    writer.write_image_data(pixels).map_err(png_error)?;
    writer.finish().map_err(png_error)
}

impl Image {
    /// Writes the image as a PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be created or written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), MontageError> {
        write_png(path, &self.pixels, self.width, self.height)
    }
}

/// Writes `<prefix>montage.png` with every task's high-resolution image,
/// `<prefix>randomMontage.png` with the same images shuffled, and
/// `logo<n>.png` for the `n`th task, all into `dir`.
///
/// # Errors
///
/// Returns an error if a task lacks a `128 × 128` image or a file can't be
/// written.
pub fn write_task_images<P: AsRef<Path>, R: Rng + ?Sized>(
    tasks: &[Task],
    dir: P,
    prefix: &str,
    rng: &mut R,
) -> Result<(), MontageError> {
    let dir = dir.as_ref();
    let expected = HIGH_RESOLUTION * HIGH_RESOLUTION;
    let mut images = tasks
        .iter()
        .map(|task| {
            let image = task
                .high_resolution
                .as_deref()
                .ok_or_else(|| MontageError::MissingImage(task.name.clone()))?;
            if image.len() == expected {
                Ok(image)
            } else {
                Err(MontageError::WrongSize {
                    name: task.name.clone(),
                    len: image.len(),
                    expected,
                })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (n, image) in images.iter().enumerate() {
        write_png(
            dir.join(format!("logo{}.png", n)),
            image,
            HIGH_RESOLUTION,
            HIGH_RESOLUTION,
        )?;
    }
    montage(&images, HIGH_RESOLUTION).save(dir.join(format!("{}montage.png", prefix)))?;
    images.shuffle(rng);
    montage(&images, HIGH_RESOLUTION).save(dir.join(format!("{}randomMontage.png", prefix)))?;

    info!("wrote {} task images to {}", images.len(), dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{manual_task, TaskOptions},
        dataset::load_alpha,
        program::{arrow, Type},
    };
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn tiles_row_major() {
        let images = vec![vec![1; 4], vec![2; 4], vec![3; 4]];
        let image = montage(&images, 2);
        assert_eq!((image.width, image.height), (4, 4));
        #[rustfmt::skip]
        assert_eq!(image.pixels, vec![
            1, 1, 2, 2,
            1, 1, 2, 2,
            3, 3, 0, 0,
            3, 3, 0, 0,
        ]);
        assert_eq!(montage::<Vec<u8>>(&[], 2).pixels, Vec::<u8>::new());
    }

    #[test]
    fn png_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        let pixels: Vec<u8> = (0..12).collect();
        write_png(&path, &pixels, 4, 3).unwrap();
        assert_eq!(load_alpha(&path).unwrap(), pixels);
    }

    #[test]
    fn writes_task_images() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = vec![
            manual_task("line", "(move 1d 0a)", TaskOptions::default()).unwrap(),
            manual_task("square", "(loop i 4 (move 1d (/a 1a 4)))", TaskOptions::default())
                .unwrap(),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        write_task_images(&tasks, dir.path(), "test_", &mut rng).unwrap();

        for name in &["test_montage.png", "test_randomMontage.png", "logo0.png", "logo1.png"] {
            assert!(dir.path().join(name).exists(), "{} is missing", name);
        }
        let square = load_alpha(dir.path().join("logo1.png")).unwrap();
        assert_eq!(Some(square), tasks[1].high_resolution);
        let montage = load_alpha(dir.path().join("test_montage.png")).unwrap();
        assert_eq!(montage.len(), 2 * HIGH_RESOLUTION * HIGH_RESOLUTION);
    }

    #[test]
    fn rejects_tasks_without_images() {
        let dir = tempfile::tempdir().unwrap();
        let task = Task::new("plain", arrow(Type::turtle(), Type::turtle()), Vec::new());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            write_task_images(&[task.clone()], dir.path(), "", &mut rng),
            Err(MontageError::MissingImage(name)) if name == "plain"
        ));

        let mut small = task;
        small.high_resolution = Some(vec![0; 28 * 28]);
        assert!(matches!(
            write_task_images(&[small], dir.path(), "", &mut rng),
            Err(MontageError::WrongSize { len: 784, .. })
        ));
    }
}
