//! CLI for Newswall - headlines in, wallpaper set.

use chrono::Timelike;
use clap::{Args, Parser, Subcommand, ValueEnum};
use newswall::config::{timestamp_slug, EnvConfig, WallpaperConfig, CONFIG_FILE};
use newswall::image::{AcquisitionPipeline, FileAttemptLog, ImageRequest};
use newswall::prompt::{build_draft_prompt, time_of_day_descriptor, DraftContext};
use newswall::refine::{PromptRefiner, RefineContext};
use newswall::wallpaper::DesktopEnv;
use newswall::{GeminiProvider, OpenAiImageProvider};
use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "newswall")]
#[command(about = "Turn the morning's headlines into a fresh desktop wallpaper")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch headlines, build a prompt, acquire an image, set the wallpaper
    Run(RunArgs),

    /// Acquire a single image from an explicit prompt
    Image(ImageArgs),

    /// List providers and their configuration state
    Providers,
}

#[derive(Args)]
struct RunArgs {
    /// Config file path
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Save the image but leave the current wallpaper alone
    #[arg(long)]
    no_apply: bool,
}

#[derive(Args)]
struct ImageArgs {
    /// The text prompt describing the image
    prompt: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Generator tried before the stock chain
    #[arg(short, long, value_enum, default_value = "gemini")]
    generator: GeneratorArg,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Comma-separated search terms for the stock sources
    #[arg(short, long)]
    keywords: Option<String>,

    /// Model identifier override
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GeneratorArg {
    Gemini,
    Openai,
    None,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("newswall=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            run(args, cli.json).await?;
        }
        Commands::Image(args) => {
            acquire_image(args, cli.json).await?;
        }
        Commands::Providers => {
            list_providers(cli.json)?;
        }
    }

    Ok(())
}

async fn run(args: RunArgs, json_output: bool) -> anyhow::Result<()> {
    let env = EnvConfig::from_env();
    let cfg = WallpaperConfig::load(&args.config)?;
    let now = chrono::Local::now();

    let client = reqwest::Client::new();
    let headlines = newswall::news::fetch_headlines(&client, &cfg.feeds).await;
    anyhow::ensure!(!headlines.is_empty(), "no headlines fetched");

    let keywords = newswall::keywords::extract_keywords(&headlines, &cfg.keywords);
    anyhow::ensure!(!keywords.is_empty(), "no keywords extracted");

    let time_of_day = time_of_day_descriptor(now.hour());
    let (artist_hint, selected_style) = {
        let mut rng = rand::thread_rng();
        (
            cfg.artist_hints
                .choose(&mut rng)
                .cloned()
                .unwrap_or_default(),
            cfg.style_pool.choose(&mut rng).cloned().unwrap_or_default(),
        )
    };

    let draft = build_draft_prompt(&DraftContext {
        keywords: keywords.clone(),
        style: cfg.style.clone(),
        vibe: cfg.vibe.clone(),
        artist_hint,
        negative: cfg.negative.clone(),
        time_of_day: time_of_day.to_string(),
    });
    tracing::debug!(%draft, "draft prompt");

    let prompt = if env.openai_api_key.is_empty() {
        draft
    } else {
        let mut builder = PromptRefiner::builder().api_key(&env.openai_api_key);
        if !cfg.openai_text_model.is_empty() {
            builder = builder.model(&cfg.openai_text_model);
        }
        let context = RefineContext {
            keywords: keywords.clone(),
            headlines: headlines.clone(),
            time_of_day: time_of_day.to_string(),
            style: cfg.style.clone(),
            vibe: cfg.vibe.clone(),
            negative: cfg.negative.clone(),
            selected_style,
        };
        match builder.build().refine(&context).await {
            Ok(refined) => refined,
            Err(e) => {
                tracing::warn!("prompt refinement failed, keeping the draft: {e}");
                draft
            }
        }
    };
    tracing::debug!(%prompt, "final prompt");

    let request = ImageRequest::new(&prompt)
        .with_size(cfg.resolution.width, cfg.resolution.height)
        .with_keywords(keywords.clone());

    let mut pipeline = AcquisitionPipeline::new();
    if !env.gemini_api_key.is_empty() {
        let model = env
            .gemini_model
            .clone()
            .unwrap_or_else(|| cfg.gemini_model.clone());
        let provider = GeminiProvider::builder()
            .api_key(&env.gemini_api_key)
            .model(model)
            .journal(Arc::new(FileAttemptLog::new(cfg.attempt_log.as_str())), "auto")
            .build();
        pipeline = pipeline.with_generator(Box::new(provider));
    }

    let image = pipeline.acquire(&request).await?;

    let file_name = format!("background-{}.{}", timestamp_slug(&now), image.extension());
    let path = PathBuf::from(&env.output_dir).join(file_name);
    image.save(&path)?;
    tracing::info!(path = %path.display(), origin = %image.origin, "wallpaper saved");

    if !args.no_apply {
        let desktop = DesktopEnv::from_name(&env.desktop_env);
        newswall::wallpaper::apply(&path, desktop).await?;
    }

    if json_output {
        let result = serde_json::json!({
            "type": "run",
            "success": true,
            "output": path.display().to_string(),
            "size_bytes": image.size(),
            "origin": image.origin,
            "headline_count": headlines.len(),
            "keywords": keywords,
            "applied": !args.no_apply,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Saved wallpaper: {} ({} bytes) via {}",
            path.display(),
            image.size(),
            image.origin
        );
        if !args.no_apply {
            println!("Wallpaper applied.");
        }
    }

    Ok(())
}

async fn acquire_image(args: ImageArgs, json_output: bool) -> anyhow::Result<()> {
    let keywords: Vec<String> = args
        .keywords
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();

    let mut request = ImageRequest::new(&args.prompt).with_keywords(keywords);
    if let (Some(w), Some(h)) = (args.width, args.height) {
        request = request.with_size(w, h);
    }

    let mut pipeline = AcquisitionPipeline::new();
    match args.generator {
        GeneratorArg::Gemini => {
            let mut builder = GeminiProvider::builder();
            if let Some(model) = &args.model {
                builder = builder.model(model);
            }
            pipeline = pipeline.with_generator(Box::new(builder.build()));
        }
        GeneratorArg::Openai => {
            let mut builder = OpenAiImageProvider::builder();
            if let Some(model) = &args.model {
                builder = builder.model(model);
            }
            pipeline = pipeline.with_generator(Box::new(builder.build()));
        }
        GeneratorArg::None => {}
    }

    let image = pipeline.acquire(&request).await?;
    image.save(&args.output)?;

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "success": true,
            "output": args.output.display().to_string(),
            "size_bytes": image.size(),
            "format": image.extension(),
            "origin": image.origin,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Acquired image: {} ({} bytes) via {}",
            args.output.display(),
            image.size(),
            image.origin
        );
    }

    Ok(())
}

fn list_providers(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ProviderInfo {
        name: &'static str,
        kind: &'static str,
        role: &'static str,
        env_var: &'static str,
        configured: bool,
    }

    fn has_key(var: &str) -> bool {
        std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false)
    }

    let providers = vec![
        ProviderInfo {
            name: "Gemini (Google)",
            kind: "gemini",
            role: "image",
            env_var: "GEMINI_API_KEY",
            configured: has_key("GEMINI_API_KEY"),
        },
        ProviderInfo {
            name: "OpenAI Images",
            kind: "openai",
            role: "image",
            env_var: "OPENAI_API_KEY",
            configured: has_key("OPENAI_API_KEY"),
        },
        ProviderInfo {
            name: "OpenAI Chat (prompt refinement)",
            kind: "openai",
            role: "refine",
            env_var: "OPENAI_API_KEY",
            configured: has_key("OPENAI_API_KEY"),
        },
        ProviderInfo {
            name: "Stock chain (unsplash, loremflickr, picsum)",
            kind: "stock",
            role: "fallback",
            env_var: "",
            configured: true,
        },
    ];

    if json_output {
        println!("{}", serde_json::to_string_pretty(&providers)?);
    } else {
        println!("Available providers:\n");
        for p in &providers {
            let status = if p.configured { "✓" } else { "✗" };
            println!("  {} {} ({})", status, p.name, p.role);
            if !p.env_var.is_empty() {
                println!("    API key: {}", p.env_var);
            }
        }
    }

    Ok(())
}
