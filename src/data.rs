use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::constants::{DEFAULT_IMAGE_ID, NO_IMAGES_MSG, SAVE_ERROR_MSG};
use crate::structs::GenerateResponse;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// `<id>.<ext>`, the name used when no output file is given.
pub fn default_file_name(image_id: &str, format: ImageFormat) -> String {
    format!("{}.{}", image_id, format.extension())
}

/// First path among `path`, `<stem>_1<ext>`, `<stem>_2<ext>`, ... that does
/// not exist yet. Suffixed candidates stay in the directory of `path`.
pub fn unique_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().unwrap_or_default();
    let ext = path.extension();

    let mut counter = 1u64;
    loop {
        let mut name = OsString::from(stem);
        name.push(format!("_{}", counter));
        if let Some(ext) = ext {
            name.push(".");
            name.push(ext);
        }
        let candidate = path.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// A single base64-encoded image returned by the generation endpoint.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GeneratedImage {
    pub id: String,
    pub data: String,
}

impl GeneratedImage {
    /// Take the first image of a response. Responses without an id fall back
    /// to [`DEFAULT_IMAGE_ID`].
    pub fn from_response(response: &GenerateResponse) -> Result<Self> {
        let data = response
            .images
            .first()
            .ok_or_else(|| anyhow::anyhow!(NO_IMAGES_MSG))?
            .clone();
        let id = response
            .id
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_ID.to_string());
        Ok(Self { id, data })
    }

    pub fn decode(&self) -> Result<bytes::Bytes> {
        let bytes = STANDARD
            .decode(self.data.trim())
            .context("Invalid base64 image data")?;
        Ok(bytes::Bytes::from(bytes))
    }

    pub fn suggest_file_name(&self, format: ImageFormat) -> String {
        default_file_name(&self.id, format)
    }

    /// Write the decoded image to `output`, or to `<id>.<ext>` when `output`
    /// is `None`, never overwriting an existing file. Returns the path written.
    pub async fn save(&self, output: Option<&Path>, format: ImageFormat) -> Result<PathBuf> {
        self.save_in(Path::new(""), output, format).await
    }

    /// Like [`GeneratedImage::save`], with relative names resolved against
    /// `dir` instead of the working directory.
    pub async fn save_in(
        &self,
        dir: impl AsRef<Path>,
        output: Option<&Path>,
        format: ImageFormat,
    ) -> Result<PathBuf> {
        let candidate = match output {
            Some(output) => dir.as_ref().join(output),
            None => dir.as_ref().join(self.suggest_file_name(format)),
        };
        let path = unique_path(&candidate);
        if path != candidate {
            debug!("{} exists, saving to {}", candidate.display(), path.display());
        }

        self.save_to_path(&path).await.context(SAVE_ERROR_MSG)?;
        info!("Saved image {} to {}", self.id, path.display());
        Ok(path)
    }

    pub async fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.decode()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }
}
