// api
pub const BASE_URL: &str = "https://api.venice.ai/api/v1";
pub const MODELS_URL: &str = "models";
pub const GENERATE_URL: &str = "image/generate";
pub const MODEL_TYPE_IMAGE: &str = "image";
pub const USER_AGENT: &str = "Rust Venice Image Client";

// environment
pub const API_KEY_ENV: &str = "VENICE_API_KEY";

// defaults
pub const DEFAULT_MODEL: &str = "venice-sd35";
pub const DEFAULT_IMAGE_ID: &str = "generated_image";
pub const BASE_SIZE: u32 = 1024;
pub const SIZE_MULTIPLE: u32 = 8;

// messages
pub const NO_IMAGES_MSG: &str = "No images returned from API";
pub const PROMPT_REQUIRED_MSG: &str =
    "Prompt is required for image generation. Use --list-models to see available models.";
pub const MODELS_ERROR_MSG: &str = "Error fetching models";
pub const GENERATE_ERROR_MSG: &str = "Error generating image";
pub const SAVE_ERROR_MSG: &str = "Error saving image";
