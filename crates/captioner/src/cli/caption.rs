//! The `captioner caption` command: one URL, one render.

use std::path::PathBuf;

use captioner_core::{Config, Orchestrator, Phase, RecordingRenderer, RenderState};
use clap::{Args, ValueEnum};

use super::display::TerminalRenderer;
use super::ModelArgs;

/// Output format for the final render state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable zones on the terminal
    #[default]
    Text,
    /// The final render state as JSON on stdout
    Json,
}

/// Arguments for the `caption` command.
#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// Image URL (http or https)
    pub url: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the fetched image bytes to this path
    #[arg(long, value_name = "PATH")]
    pub save_image: Option<PathBuf>,

    /// Exit with a non-zero status if no generated caption was shown
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Execute the caption command.
pub async fn execute(args: CaptionArgs, mut config: Config) -> anyhow::Result<()> {
    args.model.apply(&mut config)?;
    let mut orchestrator = Orchestrator::new(&config)?;

    let state = match args.format {
        OutputFormat::Text => {
            let mut renderer = TerminalRenderer::stdout();
            orchestrator.handle(&args.url, &mut renderer).await.clone()
        }
        OutputFormat::Json => {
            let mut renderer = RecordingRenderer::default();
            let state = orchestrator.handle(&args.url, &mut renderer).await;
            println!("{}", serde_json::to_string_pretty(state)?);
            state.clone()
        }
    };

    if let Some(ref path) = args.save_image {
        save_image(&state, path)?;
    }

    if args.strict && state.phase != Phase::Captioned {
        anyhow::bail!(
            "No caption generated for {}",
            state.url.as_deref().unwrap_or(&args.url)
        );
    }

    Ok(())
}

/// Write the fetched bytes, if there are any, to `path`.
fn save_image(state: &RenderState, path: &std::path::Path) -> anyhow::Result<()> {
    let Some(ref image) = state.image else {
        tracing::warn!("No image to save");
        return Ok(());
    };

    let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&path, &image.bytes[..])?;
    tracing::info!("Image saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use captioner_core::RenderedImage;
    use std::sync::Arc;

    fn state_with_bytes(bytes: &[u8]) -> RenderState {
        RenderState {
            request_id: 1,
            phase: Phase::Captioned,
            image: Some(RenderedImage {
                source_url: "https://example.com/cat.jpg".to_string(),
                width: 1,
                height: 1,
                format: "jpeg".to_string(),
                byte_len: bytes.len() as u64,
                thumbnail: None,
                bytes: Arc::from(bytes),
            }),
            ..RenderState::default()
        }
    }

    #[test]
    fn test_save_image_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cat.jpg");

        save_image(&state_with_bytes(&[0xFF, 0xD8, 0xFF]), &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_save_image_without_image_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.jpg");

        save_image(&RenderState::idle(), &path).unwrap();
        assert!(!path.exists());
    }
}
