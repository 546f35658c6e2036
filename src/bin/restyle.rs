//! CLI for Restyle - instruction-driven image editing.

use clap::{Args, Parser, Subcommand};
use restyle::{Config, EditAdapter, EditRequest, ImagePayload};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "restyle")]
#[command(about = "Edit images with a text instruction via Gemini image models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Model identifier (overrides RESTYLE_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit an image according to an instruction
    Edit(EditArgs),

    /// Verify the API key and model are usable
    Check,
}

#[derive(Args)]
struct EditArgs {
    /// What to change in the image
    instruction: String,

    /// Image to edit
    #[arg(short, long)]
    input: PathBuf,

    /// Optional reference image (style or object to use)
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut builder = Config::builder();
    if let Some(ref model) = cli.model {
        builder = builder.model_id(model);
    }
    let config = builder.build()?;
    let adapter = EditAdapter::new(&config)?;

    match cli.command {
        Commands::Edit(args) => edit_image(&adapter, args, cli.json).await?,
        Commands::Check => check(&adapter, cli.json).await?,
    }

    Ok(())
}

async fn edit_image(
    adapter: &EditAdapter,
    args: EditArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    if args.instruction.trim().is_empty() {
        anyhow::bail!("instruction must not be empty");
    }

    let mut request = EditRequest::new(ImagePayload::from_path(&args.input)?, &args.instruction);
    if let Some(ref reference) = args.reference {
        request = request.with_reference(ImagePayload::from_path(reference)?);
    }

    let result = adapter.edit(&request).await?;

    let mut output = args.output;
    if output.extension().is_none() {
        if let Some(format) = result.format() {
            output.set_extension(format.extension());
        }
    }
    let bytes = result.decode()?;
    std::fs::write(&output, &bytes)?;

    if json_output {
        let summary = serde_json::json!({
            "success": true,
            "output": output.display().to_string(),
            "size_bytes": bytes.len(),
            "mime_type": result.mime_type,
            "model": adapter.model(),
            "reference": args.reference.map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Edited image: {} ({} bytes, {}) via {}",
            output.display(),
            bytes.len(),
            result.mime_type,
            adapter.model()
        );
    }

    Ok(())
}

async fn check(adapter: &EditAdapter, json_output: bool) -> anyhow::Result<()> {
    adapter.health_check().await?;

    if json_output {
        let summary = serde_json::json!({ "success": true, "model": adapter.model() });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("OK: {} is reachable", adapter.model());
    }
    Ok(())
}
