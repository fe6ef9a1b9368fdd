use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::DEFAULT_MODEL;
use crate::data::ImageFormat;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub format: ImageFormat,
    pub hide_watermark: bool,
    pub safe_mode: bool,
    pub return_binary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<String>,
}

impl GenerateRequest {
    /// A request for `prompt` with the default model, jpeg output, safe mode
    /// off and the watermark hidden.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: prompt.into(),
            format: ImageFormat::default(),
            hide_watermark: true,
            safe_mode: false,
            return_binary: false,
            negative_prompt: None,
            width: None,
            height: None,
            steps: None,
            cfg_scale: None,
            seed: None,
            style_preset: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_safe_mode(mut self, safe_mode: bool) -> Self {
        self.safe_mode = safe_mode;
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_dimensions(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_cfg_scale(mut self, cfg_scale: f64) -> Self {
        self.cfg_scale = Some(cfg_scale);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_style_preset(mut self, style_preset: impl Into<String>) -> Self {
        self.style_preset = Some(style_preset.into());
        self
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default)]
    pub timing: Option<GenerateTiming>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct GenerateTiming {
    /// Milliseconds.
    #[serde(default)]
    pub total: Option<f64>,
}

impl GenerateTiming {
    pub fn total_secs(&self) -> Option<f64> {
        self.total.map(|total| total / 1000.0)
    }
}

impl GenerateResponse {
    /// Server-side generation time, when the response reports one.
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.timing.as_ref().and_then(GenerateTiming::total_secs)
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ModelList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<ModelInfo>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_spec: ModelSpec,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ModelSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub traits: Vec<String>,
}

impl ModelInfo {
    /// `id (trait, trait)` as shown by `--list-models`.
    pub fn summary(&self) -> String {
        let id = self.id.as_deref().unwrap_or("unknown");
        if self.model_spec.traits.is_empty() {
            id.to_string()
        } else {
            format!("{} ({})", id, self.model_spec.traits.join(", "))
        }
    }
}
