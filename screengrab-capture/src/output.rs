//! Writing captures to disk.

use crate::error::{Error, Result};
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

const FILE_STEM: &str = "screenshot";

/// Image format of the saved screenshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Re-encoded as BMP
    #[default]
    Bmp,
    /// Browser PNG bytes written unchanged
    Png,
    /// Re-encoded as JPEG (alpha dropped)
    Jpeg,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bmp" => Ok(OutputFormat::Bmp),
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err(format!("Unknown format '{}'. Use: bmp, png, jpeg", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Bmp => "bmp",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", FILE_STEM, self.extension())
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Create the output directory. Failure is fatal for the run.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| Error::OutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Convert browser PNG bytes into `format`.
pub fn encode_screenshot(png: &[u8], format: OutputFormat) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(png, ImageFormat::Png)?;
    if format == OutputFormat::Png {
        return Ok(png.to_vec());
    }

    let img = match format {
        OutputFormat::Jpeg => image::DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };

    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), format.image_format())?;
    Ok(bytes)
}

/// Save one capture as `<dir>/screenshot.<ext>`, replacing the previous one.
///
/// The image is written to a temporary sibling and renamed into place, so a
/// reader never sees a partially written file. Returns the absolute path.
pub fn save_screenshot(png: &[u8], dir: &Path, format: OutputFormat) -> Result<PathBuf> {
    ensure_output_dir(dir)?;

    let bytes = encode_screenshot(png, format)?;

    let path = dir.join(format.file_name());
    let tmp_path = dir.join(format!(".{}.tmp", format.file_name()));
    if let Err(e) = fs::write(&tmp_path, &bytes).and_then(|_| fs::rename(&tmp_path, &path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::Io(e));
    }

    Ok(fs::canonicalize(&path)?)
}
