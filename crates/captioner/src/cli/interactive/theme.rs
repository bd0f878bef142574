//! Dialoguer theme and banner for the interactive prompt.

use captioner_core::Config;
use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with a cyan `?` prompt and green `✓` for accepted input.
pub fn captioner_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Box-drawn banner lines, without styling.
fn banner_lines(config: &Config) -> Vec<String> {
    let version_line = format!("Captioner v{}", captioner_core::VERSION);
    let tagline = "Paste an image URL, get a caption";
    let model_line = format!("{} · {}", config.model.backend, config.model_name());

    let inner_width = [version_line.chars().count(), tagline.len(), model_line.chars().count()]
        .into_iter()
        .max()
        .unwrap_or(0)
        + 4;

    vec![
        format!("╔{:═<width$}╗", "", width = inner_width),
        format!("║{:^width$}║", version_line, width = inner_width),
        format!("║{:^width$}║", tagline, width = inner_width),
        format!("║{:^width$}║", model_line, width = inner_width),
        format!("╚{:═<width$}╝", "", width = inner_width),
    ]
}

/// Print the banner and a usage hint to stderr.
pub fn print_banner(config: &Config) {
    let cyan = Style::new().for_stderr().cyan();
    let dim = Style::new().for_stderr().dim();

    eprintln!();
    for line in banner_lines(config) {
        eprintln!("  {}", cyan.apply_to(line));
    }
    eprintln!(
        "  {}",
        dim.apply_to("Enter an image URL to caption it. Ctrl+C to quit.")
    );
    eprintln!();
}
