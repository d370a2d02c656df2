//! LOGO tasks whose targets are bitmaps stored on disk.
//!
//! The data root holds one directory per task family. Each family has one
//! directory per task containing a low-resolution `*_l.png` target and,
//! optionally, a high-resolution `*_h.png` rendering next to it.

use crate::{
    catalog::{manual_tasks, ManualTaskError},
    program::{arrow, Type},
    task::{Example, SpecialTask, Task, Value},
};
use log::{debug, info};
use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// The default location of the task families.
pub const DEFAULT_ROOT: &str = "./data/logo/";

const LOW_SUFFIX: &str = "_l.png";
const HIGH_SUFFIX: &str = "_h.png";

/// An error while loading tasks from disk.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A file or directory could not be read.
    #[error("{}: {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A file is not a valid PNG image.
    #[error("{}: {source}", path.display())]
    Png {
        /// The path being decoded.
        path: PathBuf,
        /// The underlying error.
        source: png::DecodingError,
    },

    /// A hand-written task could not be built.
    #[error(transparent)]
    Manual(#[from] ManualTaskError),
}

impl DatasetError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(DatasetError::io(dir))? {
        let entry = entry.map_err(DatasetError::io(dir))?;
        if entry.file_type().map_err(DatasetError::io(dir))?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Collects the low-resolution targets below `dir`, recursively.
fn low_resolution_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), DatasetError> {
    let mut entries = fs::read_dir(dir)
        .map_err(DatasetError::io(dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatasetError::io(dir))?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            low_resolution_files(&path, files)?;
        } else if path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.ends_with(LOW_SUFFIX))
        {
            files.push(path);
        }
    }
    Ok(())
}

/// The names of the task families under `root`, sorted.
///
/// # Errors
///
/// Returns an error if `root` can't be read.
pub fn all_task_folders<P: AsRef<Path>>(root: P) -> Result<Vec<String>, DatasetError> {
    Ok(subdirectories(root.as_ref())?
        .iter()
        .filter_map(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

/// Decodes a PNG and returns its alpha channel, or its luminance if it has
/// no alpha channel.
///
/// # Errors
///
/// Returns an error if the file can't be opened or decoded.
pub fn load_alpha<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, DatasetError> {
    let path = path.as_ref();
    let png_error = |source| DatasetError::Png {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(DatasetError::io(path))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(png_error)?;
    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer).map_err(png_error)?;
    let bytes = &buffer[..frame.buffer_size()];

    Ok(match frame.color_type {
        png::ColorType::Rgba => bytes.iter().skip(3).step_by(4).copied().collect(),
        png::ColorType::GrayscaleAlpha => bytes.iter().skip(1).step_by(2).copied().collect(),
        png::ColorType::Rgb => bytes.chunks_exact(3).map(luminance).collect(),
        png::ColorType::Grayscale | png::ColorType::Indexed => bytes.to_vec(),
    })
}

#[allow(clippy::cast_possible_truncation)]
fn luminance(rgb: &[u8]) -> u8 {
    let weighted = 299 * u32::from(rgb[0]) + 587 * u32::from(rgb[1]) + 114 * u32::from(rgb[2]);
    (weighted / 1000) as u8
}

fn disk_task(name: String, shape: Vec<u8>, high_resolution: Option<Vec<u8>>, proto: bool) -> Task {
    let mut task = Task::new(
        name,
        arrow(Type::turtle(), Type::turtle()),
        vec![Example::new(vec![Value::Int(0)], Value::Bitmap(shape))],
    );
    task.must_train = true;
    task.proto = proto;
    task.special_task = Some(SpecialTask::logo(proto));
    task.high_resolution = high_resolution;
    task
}

/// Builds the hand-written tasks followed by the tasks stored under `root`
/// in the given families. `["all"]` selects every family.
///
/// # Errors
///
/// Returns an error if a directory or image can't be read, or if a
/// hand-written task can't be built.
pub fn make_tasks<P, S>(root: P, subfolders: &[S], proto: bool) -> Result<Vec<Task>, DatasetError>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let root = root.as_ref();
    let folders: Vec<String> = match subfolders {
        [all] if all.as_ref() == "all" => all_task_folders(root)?,
        _ => subfolders.iter().map(|s| s.as_ref().to_string()).collect(),
    };

    let mut tasks = manual_tasks()?;
    let manual = tasks.len();
    for folder in &folders {
        for dir in subdirectories(&root.join(folder))? {
            let sub = dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut files = Vec::new();
            low_resolution_files(&dir, &mut files)?;
            for low in files {
                debug!("loading {}", low.display());
                let shape = load_alpha(&low)?;
                let high = low.with_file_name(
                    low.file_name()
                        .map(|name| name.to_string_lossy().replace(LOW_SUFFIX, HIGH_SUFFIX))
                        .unwrap_or_default(),
                );
                let task = match load_alpha(&high) {
                    Ok(high_resolution) => disk_task(
                        format!("{}/{}", folder, sub),
                        shape,
                        Some(high_resolution),
                        proto,
                    ),
                    Err(e) if e.is_not_found() => {
                        let file = low
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        disk_task(format!("{}_{}", folder, file), shape, None, proto)
                    }
                    Err(e) => return Err(e),
                };
                tasks.push(task);
            }
        }
    }
    info!(
        "loaded {} tasks from {} ({} hand-written)",
        tasks.len() - manual,
        root.display(),
        manual
    );
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufWriter;

    fn write_rgba(path: &Path, size: u32, alpha: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = png::Encoder::new(BufWriter::new(file), size, size);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let data: Vec<u8> = alpha.iter().flat_map(|&a| vec![10, 20, 30, a]).collect();
        encoder
            .write_header()
            .unwrap()
            .write_image_data(&data)
            .unwrap();
    }

    #[test]
    fn alpha_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_l.png");
        write_rgba(&path, 2, &[0, 64, 128, 255]);
        assert_eq!(load_alpha(&path).unwrap(), vec![0, 64, 128, 255]);
    }

    #[test]
    fn luminance_without_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        crate::montage::write_png(&path, &[7, 8, 9, 10], 2, 2).unwrap();
        assert_eq!(load_alpha(&path).unwrap(), vec![7, 8, 9, 10]);
        assert_eq!(luminance(&[255, 255, 255]), 255);
    }

    #[test]
    fn missing_files() {
        let error = load_alpha("/nonexistent/image_h.png").unwrap_err();
        assert!(error.is_not_found());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        fs::write(&path, b"not a png").unwrap();
        assert!(matches!(load_alpha(&path), Err(DatasetError::Png { .. })));
    }

    #[test]
    fn tasks_from_disk() {
        let root = tempfile::tempdir().unwrap();
        let with_high = root.path().join("shapes").join("triangle");
        let without_high = root.path().join("shapes").join("blob");
        fs::create_dir_all(&with_high).unwrap();
        fs::create_dir_all(&without_high).unwrap();
        fs::create_dir_all(root.path().join("other")).unwrap();
        write_rgba(&with_high.join("triangle_l.png"), 2, &[1, 2, 3, 4]);
        write_rgba(&with_high.join("triangle_h.png"), 4, &[9; 16]);
        write_rgba(&without_high.join("blob_l.png"), 2, &[5, 6, 7, 8]);

        assert_eq!(
            all_task_folders(root.path()).unwrap(),
            vec!["other".to_string(), "shapes".to_string()]
        );

        let tasks = make_tasks(root.path(), &["all"], false).unwrap();
        let manual = manual_tasks().unwrap().len();
        assert_eq!(tasks.len(), manual + 2);

        let blob = &tasks[manual];
        assert_eq!(blob.name, "shapes_blob_l.png");
        assert!(blob.high_resolution.is_none());
        assert_eq!(blob.examples[0].output, Value::Bitmap(vec![5, 6, 7, 8]));

        let triangle = &tasks[manual + 1];
        assert_eq!(triangle.name, "shapes/triangle");
        assert!(triangle.must_train);
        assert_eq!(triangle.special_task, Some(SpecialTask::logo(false)));
        assert_eq!(triangle.high_resolution, Some(vec![9; 16]));
    }

    #[test]
    fn missing_family() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(
            make_tasks(root.path(), &["nope"], false),
            Err(DatasetError::Io { .. })
        ));
    }
}
