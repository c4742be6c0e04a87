//! i3bar protocol output.

use std::io::{self, Write};

use serde::Serialize;

use super::block::Block;

/// One block as serialized in a status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarItem<'a> {
    /// Block name.
    pub name: &'a str,
    /// Block instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<&'a str>,
    /// Label followed by the current text.
    pub full_text: String,
    /// Short text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_text: Option<&'a str>,
    /// Color from output, else from configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'a str>,
    /// Urgency hint.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub urgent: bool,
}

impl<'a> BarItem<'a> {
    /// Snapshot of a block.
    #[must_use]
    pub fn from_block(block: &'a Block) -> Self {
        let config = block.config();
        let output = block.output();
        let label = config.label.as_deref().unwrap_or_default();
        Self {
            name: &config.name,
            instance: config.instance.as_deref(),
            full_text: format!("{label}{}", output.full_text),
            short_text: output.short_text.as_deref(),
            color: output.color.as_deref().or(config.color.as_deref()),
            urgent: output.urgent,
        }
    }
}

#[derive(Serialize)]
struct Header {
    version: u32,
    click_events: bool,
}

/// Writes the header once, then one array per status line.
#[derive(Debug)]
pub struct Renderer<W> {
    out: W,
    click_events: bool,
    started: bool,
    lines: u64,
}

impl<W: Write> Renderer<W> {
    /// Renderer over a writer, usually stdout.
    pub const fn new(out: W, click_events: bool) -> Self {
        Self {
            out,
            click_events,
            started: false,
            lines: 0,
        }
    }

    /// Status lines written so far.
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// The underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// Write one status line and flush.
    ///
    /// # Errors
    ///
    /// Serialization or write failures.
    pub fn render(&mut self, blocks: &[Block]) -> io::Result<()> {
        if !self.started {
            let header = Header {
                version: 1,
                click_events: self.click_events,
            };
            serde_json::to_writer(&mut self.out, &header)?;
            self.out.write_all(b"\n[\n")?;
            self.started = true;
        }
        let items: Vec<BarItem<'_>> = blocks.iter().map(BarItem::from_block).collect();
        serde_json::to_writer(&mut self.out, &items)?;
        self.out.write_all(b",\n")?;
        self.out.flush()?;
        self.lines += 1;
        Ok(())
    }
}
