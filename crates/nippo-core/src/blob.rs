//! Line-oriented text encoding of item lists, as stored in a single cell.
//!
//! Each item with non-empty text becomes one line `"<marker> <text>"`. Items
//! with empty text produce no line, so a round trip keeps only the non-empty
//! items.

use crate::record::ReportItem;

pub const DONE_MARKER: &str = "✅";
pub const OPEN_MARKER: &str = "⬜";

fn marker(done: bool) -> &'static str {
  if done { DONE_MARKER } else { OPEN_MARKER }
}

/// Encode `items` into a newline-joined blob.
pub fn encode(items: &[ReportItem]) -> String {
  items
    .iter()
    .filter(|item| !item.text.is_empty())
    .map(|item| format!("{} {}", marker(item.done), item.text))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Decode a blob back into items.
///
/// Lines without a recognised marker (e.g. typed by hand in the edit view)
/// become open items carrying the whole line. Blank lines are dropped.
pub fn decode(blob: &str) -> Vec<ReportItem> {
  blob
    .lines()
    .map(|line| line.trim_end_matches('\r'))
    .filter(|line| !line.trim().is_empty())
    .map(|line| {
      if let Some(text) = line.strip_prefix(DONE_MARKER).and_then(|r| r.strip_prefix(' ')) {
        ReportItem::new(true, text)
      } else if let Some(text) = line.strip_prefix(OPEN_MARKER).and_then(|r| r.strip_prefix(' ')) {
        ReportItem::new(false, text)
      } else {
        ReportItem::new(false, line)
      }
    })
    .collect()
}
