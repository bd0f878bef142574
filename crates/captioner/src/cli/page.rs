//! The `captioner page` command: write the static captioning web page.
//!
//! The page posts `{ "image_url": ... }` to `/api/generate_caption`. Nothing
//! in this binary serves that route; the page is shipped as-is.

use std::path::PathBuf;

use clap::Args;

/// The page, byte for byte.
pub const PAGE_HTML: &str = include_str!("../../assets/index.html");

/// Arguments for the `page` command.
#[derive(Args, Debug)]
pub struct PageArgs {
    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Execute the page command.
pub fn execute(args: PageArgs) -> anyhow::Result<()> {
    let Some(output) = args.output else {
        print!("{PAGE_HTML}");
        return Ok(());
    };

    let path = PathBuf::from(shellexpand::tilde(&output.to_string_lossy()).into_owned());
    if path.exists() && !args.force {
        anyhow::bail!(
            "File already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    std::fs::write(&path, PAGE_HTML)?;
    eprintln!("Page written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_posts_to_caption_endpoint() {
        assert!(PAGE_HTML.starts_with("<!DOCTYPE html>"));
        assert!(PAGE_HTML.contains("/api/generate_caption"));
        assert!(PAGE_HTML.contains("Generate Caption"));
    }

    #[test]
    fn test_page_written_and_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");

        execute(PageArgs {
            output: Some(path.clone()),
            force: false,
        })
        .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PAGE_HTML);

        let again = execute(PageArgs {
            output: Some(path.clone()),
            force: false,
        });
        assert!(again.is_err());

        execute(PageArgs {
            output: Some(path),
            force: true,
        })
        .unwrap();
    }
}
