//! Interactive mode: prompt for image URLs until interrupted.
//!
//! Runs for `captioner interactive` and for bare `captioner` on a TTY. Each
//! URL replaces what the previous one showed; a blank line does nothing.

pub mod theme;

use captioner_core::{Config, ModelAvailability, Orchestrator};
use dialoguer::Input;

use super::display::TerminalRenderer;
use super::ModelArgs;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Entry point for interactive mode.
pub async fn run(overrides: ModelArgs, mut config: Config) -> anyhow::Result<()> {
    overrides.apply(&mut config)?;
    theme::print_banner(&config);

    let theme = theme::captioner_theme();
    let mut orchestrator = Orchestrator::new(&config)?;
    let mut renderer = TerminalRenderer::stdout();

    // Load the model before the first prompt so a load failure shows up front.
    if let ModelAvailability::Unavailable { diagnostic } = orchestrator.model_status().await {
        renderer.model_notice(&diagnostic);
    }

    loop {
        let Some(input) = handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Enter Image URL")
                .allow_empty(true)
                .interact_text(),
        )?
        else {
            break;
        };

        orchestrator.handle(&input, &mut renderer).await;
    }

    tracing::debug!(
        requests = orchestrator.state().request_id,
        "Interactive session ended"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_ends_prompt_quietly() {
        let interrupted: dialoguer::Result<String> = Err(dialoguer::Error::IO(
            std::io::Error::new(std::io::ErrorKind::Interrupted, "ctrl-c"),
        ));
        assert!(handle_interrupt(interrupted).unwrap().is_none());
    }

    #[test]
    fn test_other_io_errors_propagate() {
        let broken: dialoguer::Result<String> = Err(dialoguer::Error::IO(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "gone",
        )));
        assert!(handle_interrupt(broken).is_err());
    }

    #[test]
    fn test_value_passed_through() {
        let ok: dialoguer::Result<String> = Ok("https://example.com/cat.jpg".to_string());
        assert_eq!(
            handle_interrupt(ok).unwrap().as_deref(),
            Some("https://example.com/cat.jpg")
        );
    }
}
