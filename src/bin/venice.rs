use std::path::PathBuf;

use anyhow::Result;
use clap::{arg, error::ErrorKind, value_parser, Command};
use venice_image::constants::{DEFAULT_MODEL, PROMPT_REQUIRED_MSG};
use venice_image::dimensions::{resolve_dimensions, DimensionError};
use venice_image::{Client, ClientOptions, GenerateRequest, GeneratedImage, ImageFormat};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let mut cmd = cli();
    let matches = cmd.get_matches_mut();

    if matches.get_flag("list-models") {
        let options = ClientOptions::from_env()?;
        return list_command(options, matches.get_flag("verbose")).await;
    }

    let Some(prompt) = matches.get_one::<String>("prompt") else {
        cmd.error(ErrorKind::MissingRequiredArgument, PROMPT_REQUIRED_MSG)
            .exit();
    };

    let (width, height) = match resolve_dimensions(
        matches.get_one::<u32>("width").copied(),
        matches.get_one::<u32>("height").copied(),
        matches.get_one::<String>("ar").map(String::as_str),
    ) {
        Ok(dims) => dims,
        Err(err @ DimensionError::Conflict) => cmd.error(ErrorKind::ArgumentConflict, err).exit(),
        Err(err) => cmd.error(ErrorKind::ValueValidation, err).exit(),
    };

    let format = matches
        .get_one::<ImageFormat>("format")
        .copied()
        .unwrap_or_default();
    let model = matches
        .get_one::<String>("model")
        .cloned()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let mut request = GenerateRequest::new(prompt)
        .with_model(model)
        .with_format(format)
        .with_safe_mode(matches.get_flag("safe-mode"))
        .with_dimensions(width, height);
    if let Some(negative_prompt) = matches.get_one::<String>("negative-prompt") {
        request = request.with_negative_prompt(negative_prompt);
    }
    if let Some(steps) = matches.get_one::<u32>("steps") {
        request = request.with_steps(*steps);
    }
    if let Some(cfg_scale) = matches.get_one::<f64>("cfg-scale") {
        request = request.with_cfg_scale(*cfg_scale);
    }
    if let Some(seed) = matches.get_one::<i64>("seed") {
        request = request.with_seed(*seed);
    }
    if let Some(style_preset) = matches.get_one::<String>("style-preset") {
        request = request.with_style_preset(style_preset);
    }

    let options = ClientOptions::from_env()?;
    generate_command(options, request, matches.get_one::<PathBuf>("output")).await
}

fn cli() -> Command {
    Command::new("venice")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate images using Venice AI API")
        .after_help(
            "Examples:\n  \
             venice --list-models\n  \
             venice \"A beautiful sunset\" --model flux-dev\n  \
             venice \"A cat in space\" --ar square --output cat.png --format png\n  \
             venice \"Mountain landscape\" --negative-prompt \"people, cars\" --steps 30\n\n\
             The API key is read from the VENICE_API_KEY environment variable.",
        )
        .arg(arg!(--"list-models" "List available image generation models"))
        .arg(arg!(--verbose "Show detailed output (for --list-models)"))
        .arg(arg!([prompt] "Text prompt for image generation"))
        .arg(
            arg!(--model <model> "Model to use for generation")
                .default_value(DEFAULT_MODEL),
        )
        .arg(arg!(--"negative-prompt" <text> "Negative prompt to avoid certain elements"))
        .arg(arg!(--width <pixels> "Image width in pixels").value_parser(value_parser!(u32)))
        .arg(arg!(--height <pixels> "Image height in pixels").value_parser(value_parser!(u32)))
        .arg(
            arg!(--ar <ratio> "Aspect ratio (square, landscape, cinema, tall, portrait, instagram, or custom like 4:3)")
                .visible_alias("aspect-ratio"),
        )
        .arg(arg!(--steps <n> "Number of inference steps").value_parser(value_parser!(u32)))
        .arg(
            arg!(--"cfg-scale" <scale> "CFG scale for prompt adherence")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            arg!(--seed <seed> "Random seed for reproducible results")
                .value_parser(value_parser!(i64))
                .allow_negative_numbers(true),
        )
        .arg(arg!(--"style-preset" <preset> "Style preset to apply"))
        .arg(
            arg!(--format <format> "Output image format")
                .value_parser(value_parser!(ImageFormat))
                .default_value("jpeg"),
        )
        .arg(arg!(--output <file> "Output filename").value_parser(value_parser!(PathBuf)))
        .arg(arg!(--"safe-mode" "Enable safe mode content filtering"))
}

async fn list_command(options: ClientOptions, verbose: bool) -> Result<()> {
    let client = Client::new(options)?;
    let raw = client.list_models_raw().await?;

    if verbose {
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    let models: venice_image::ModelList = serde_json::from_value(raw)?;
    println!("Available models:");
    for model in &models.data {
        println!("  - {}", model.summary());
    }

    Ok(())
}

async fn generate_command(
    options: ClientOptions,
    request: GenerateRequest,
    output: Option<&PathBuf>,
) -> Result<()> {
    let client = Client::new(options)?;

    println!("Generating image with model '{}'...", request.model);
    let res = client.generate(&request).await?;

    let image = GeneratedImage::from_response(&res)?;
    let path = image
        .save(output.map(PathBuf::as_path), request.format)
        .await?;
    println!("Image saved as: {}", path.display());

    if let Some(secs) = res.elapsed_secs() {
        println!("Generation completed in {:.2} seconds", secs);
    }

    Ok(())
}
