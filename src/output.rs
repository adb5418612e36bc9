use std::io::Write;

use color_eyre::Result;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// A 1-based page of results
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    /// Page `0` is treated as the first page; the size falls back to the default when zero
    /// and is capped at [`MAX_PAGE_SIZE`]
    pub fn new(number: usize, size: usize) -> Self {
        let size = match size {
            0 => DEFAULT_PAGE_SIZE,
            size => size.min(MAX_PAGE_SIZE),
        };

        Self {
            number: number.max(1),
            size,
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.number - 1).saturating_mul(self.size);
        let items = items.get(start..).unwrap_or_default();

        &items[..items.len().min(self.size)]
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// JSON wrapper for listings
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T> {
    /// Number of results before paging
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    pub results: &'a [T],
}

impl<'a, T: Serialize> Envelope<'a, T> {
    pub fn all(results: &'a [T]) -> Self {
        Self {
            count: results.len(),
            skipped: None,
            page: None,
            page_size: None,
            results,
        }
    }

    pub fn paged(results: &'a [T], page: Page) -> Self {
        Self {
            count: results.len(),
            skipped: None,
            page: Some(page.number),
            page_size: Some(page.size),
            results: page.slice(results),
        }
    }

    /// Reports lines of command output that could not be parsed
    pub fn skipped(mut self, skipped: usize) -> Self {
        self.skipped = Some(skipped).filter(|&v| v > 0);
        self
    }
}

/// Writes `value` as pretty-printed JSON followed by a newline
pub fn write_json<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;

    Ok(())
}
