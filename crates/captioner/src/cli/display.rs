//! Terminal rendering of the image, caption and error zones.

use std::fmt::Write as _;
use std::time::Duration;

use captioner_core::{CaptionZone, Phase, RenderState, RenderedImage, Renderer};
use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};

/// Which zones of the current request have been printed already.
#[derive(Debug, Default)]
struct Printed {
    request_id: u64,
    image: bool,
    caption: bool,
    error: bool,
    notice: bool,
}

/// Prints render states as they arrive, with a spinner during slow phases.
///
/// A terminal cannot redraw earlier lines, so each zone is printed once per
/// request, the first time a state carries it.
pub struct TerminalRenderer {
    term: Term,
    spinner: Option<ProgressBar>,
    printed: Printed,
    show_spinner: bool,
}

impl TerminalRenderer {
    /// Zones to stdout, spinner to stderr.
    pub fn stdout() -> Self {
        Self::new(Term::stdout())
    }

    pub fn new(term: Term) -> Self {
        Self {
            term,
            spinner: None,
            printed: Printed::default(),
            show_spinner: console::user_attended_stderr(),
        }
    }

    /// Print a load diagnostic before any request is made.
    pub fn model_notice(&mut self, diagnostic: &str) {
        let yellow = Style::new().yellow();
        self.write(&format!("  {} {diagnostic}", yellow.apply_to("!")));
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn write(&self, line: &str) {
        if let Err(e) = self.term.write_line(line) {
            tracing::warn!("Failed to write to terminal: {e}");
        }
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, state: &RenderState) {
        self.clear_spinner();

        if state.request_id != self.printed.request_id {
            self.printed = Printed {
                request_id: state.request_id,
                ..Printed::default()
            };
            self.write("");
        }

        for line in pending_lines(state, &mut self.printed) {
            self.write(&line);
        }
    }

    fn progress(&mut self, phase: Phase, url: &str) {
        self.clear_spinner();
        if !self.show_spinner {
            return;
        }

        let message = match phase {
            Phase::Fetching => format!("Fetching {url}"),
            Phase::Captioning => "Generating caption...".to_string(),
            _ => return,
        };

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

/// Lines for the zones in `state` not yet marked in `printed`.
fn pending_lines(state: &RenderState, printed: &mut Printed) -> Vec<String> {
    let label = Style::new().bold();
    let mut lines = Vec::new();

    if let Some(ref notice) = state.notice {
        if !printed.notice {
            let yellow = Style::new().yellow();
            lines.push(format!("  {} {notice}", yellow.apply_to("!")));
            printed.notice = true;
        }
    }

    if let Some(ref image) = state.image {
        if !printed.image {
            lines.push(format!(
                "  {:<9}{}",
                label.apply_to("Image"),
                image_summary(image)
            ));
            let dim = Style::new().dim();
            lines.push(format!("  {:<9}{}", "", dim.apply_to(&image.source_url)));
            printed.image = true;
        }
    }

    if let Some(ref caption) = state.caption {
        if !printed.caption {
            let text = match caption {
                CaptionZone::Generated(c) => Style::new().green().apply_to(c.text.as_str()),
                CaptionZone::Fallback { text } => Style::new().yellow().apply_to(text.as_str()),
            };
            lines.push(format!("  {:<9}{text}", label.apply_to("Caption")));
            printed.caption = true;
        }
    }

    if let Some(ref error) = state.error {
        if !printed.error {
            let red = Style::new().red();
            lines.push(format!("  {} {}", red.apply_to("✗"), red.apply_to(error)));
            printed.error = true;
        }
    }

    lines
}

/// "400x300 JPEG, 12.3 KB"
fn image_summary(image: &RenderedImage) -> String {
    let mut summary = format!(
        "{}x{} {}",
        image.width,
        image.height,
        image.format.to_uppercase()
    );
    let kb = image.byte_len as f64 / 1024.0;
    if kb >= 1024.0 {
        let _ = write!(summary, ", {:.1} MB", kb / 1024.0);
    } else {
        let _ = write!(summary, ", {kb:.1} KB");
    }
    summary
}
