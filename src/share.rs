use std::io::{self, Write};

use base64::{engine::general_purpose, Engine as _};

use crate::collection::Link;

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("link has no URL")]
    NoUrl,
    #[error("{0} unavailable: {1}")]
    Unavailable(&'static str, String),
    #[error("write to terminal: {0}")]
    Io(#[from] io::Error),
    #[error("no share method succeeded ({0})")]
    Exhausted(String),
}

pub trait ShareTarget {
    fn name(&self) -> &'static str;
    fn share(&mut self, link: &Link) -> Result<(), ShareError>;
}

/// The desktop clipboard, opened on first use and held open afterwards so
/// the copied text outlives the share call.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    fn handle(&mut self) -> Result<&mut arboard::Clipboard, ShareError> {
        if self.clipboard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|err| ShareError::Unavailable("clipboard", err.to_string()))?;
            self.clipboard = Some(clipboard);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| ShareError::Unavailable("clipboard", "not initialised".into()))
    }
}

impl ShareTarget for SystemClipboard {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    fn share(&mut self, link: &Link) -> Result<(), ShareError> {
        self.handle()?
            .set_text(link.url.clone())
            .map_err(|err| ShareError::Unavailable("clipboard", err.to_string()))
    }
}

pub struct Osc52<W: Write> {
    out: W,
}

impl<W: Write> Osc52<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!(
        "\x1b]52;c;{}\x07",
        general_purpose::STANDARD.encode(text.as_bytes())
    )
}

impl<W: Write> ShareTarget for Osc52<W> {
    fn name(&self) -> &'static str {
        "terminal clipboard"
    }

    fn share(&mut self, link: &Link) -> Result<(), ShareError> {
        self.out.write_all(osc52_sequence(&link.url).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

pub fn share(link: &Link, targets: &mut [Box<dyn ShareTarget>]) -> Result<&'static str, ShareError> {
    if link.url.trim().is_empty() {
        return Err(ShareError::NoUrl);
    }
    let mut failures = Vec::new();
    for target in targets.iter_mut() {
        match target.share(link) {
            Ok(()) => return Ok(target.name()),
            Err(err) => {
                tracing::debug!(target = target.name(), error = %err, "share target failed");
                failures.push(err.to_string());
            }
        }
    }
    Err(ShareError::Exhausted(failures.join("; ")))
}

pub fn default_targets() -> Vec<Box<dyn ShareTarget>> {
    vec![
        Box::new(SystemClipboard::default()),
        Box::new(Osc52::new(io::stdout())),
    ]
}
