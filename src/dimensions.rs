use regex::Regex;
use thiserror::Error;

use crate::constants::{BASE_SIZE, SIZE_MULTIPLE};

#[derive(Debug, Error)]
pub enum DimensionError {
    #[error("Cannot specify both --ar and --width/--height")]
    Conflict,
    #[error("Invalid aspect ratio: {0}")]
    InvalidAspectRatio(String),
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// Named presets and their `W:H` aliases, mapped to pixel dimensions.
pub const ASPECT_RATIOS: &[(&str, (u32, u32))] = &[
    ("square", (1024, 1024)),
    ("1:1", (1024, 1024)),
    ("landscape", (1264, 848)),
    ("3:2", (1264, 848)),
    ("cinema", (1280, 720)),
    ("16:9", (1280, 720)),
    ("tall", (720, 1280)),
    ("9:16", (720, 1280)),
    ("portrait", (848, 1264)),
    ("2:3", (848, 1264)),
    ("instagram", (1011, 1264)),
    ("4:5", (1011, 1264)),
];

pub fn preset(name: &str) -> Option<(u32, u32)> {
    let name = name.trim().to_lowercase();
    ASPECT_RATIOS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, dims)| *dims)
}

/// Resolve a preset name or a custom `W:H` ratio into `(width, height)`.
///
/// Custom ratios put [`BASE_SIZE`] on the longer side, truncate the shorter
/// side, then round both up to a multiple of [`SIZE_MULTIPLE`].
///
/// # Example
///
/// ```
/// use venice_image::dimensions::parse_aspect_ratio;
///
/// assert_eq!(parse_aspect_ratio("portrait").unwrap(), (848, 1264));
/// assert_eq!(parse_aspect_ratio("4:3").unwrap(), (1024, 768));
/// ```
pub fn parse_aspect_ratio(aspect_ratio: &str) -> Result<(u32, u32), DimensionError> {
    if let Some(dims) = preset(aspect_ratio) {
        return Ok(dims);
    }

    let invalid = || DimensionError::InvalidAspectRatio(aspect_ratio.to_string());

    let re = Regex::new(r"^\s*(\d+(?:\.\d*)?|\.\d+)\s*:\s*(\d+(?:\.\d*)?|\.\d+)\s*$")?;
    let caps = re.captures(aspect_ratio).ok_or_else(invalid)?;
    let w_ratio: f64 = caps[1].parse().map_err(|_| invalid())?;
    let h_ratio: f64 = caps[2].parse().map_err(|_| invalid())?;
    if w_ratio <= 0.0 || h_ratio <= 0.0 {
        return Err(invalid());
    }

    let base = BASE_SIZE as f64;
    let (width, height) = if w_ratio >= h_ratio {
        (BASE_SIZE, (base * h_ratio / w_ratio) as u32)
    } else {
        ((base * w_ratio / h_ratio) as u32, BASE_SIZE)
    };

    Ok((round_up(width), round_up(height)))
}

fn round_up(size: u32) -> u32 {
    size.div_ceil(SIZE_MULTIPLE) * SIZE_MULTIPLE
}

/// Combine explicit `--width`/`--height` with an optional aspect ratio.
///
/// An aspect ratio wins when given alone; mixing it with either explicit
/// dimension is rejected.
pub fn resolve_dimensions(
    width: Option<u32>,
    height: Option<u32>,
    aspect_ratio: Option<&str>,
) -> Result<(Option<u32>, Option<u32>), DimensionError> {
    match aspect_ratio {
        Some(_) if width.is_some() || height.is_some() => Err(DimensionError::Conflict),
        Some(aspect_ratio) => {
            let (width, height) = parse_aspect_ratio(aspect_ratio)?;
            Ok((Some(width), Some(height)))
        }
        None => Ok((width, height)),
    }
}
