//! Decides whether a point in a document lies inside a multi-column region.
//!
//! The locator only sees the text above and below the point. It is run once
//! per mounted fragment, in whatever order fragments arrive.

use serde::Serialize;

use super::markers::{Marker, MarkerKind, Scanner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegionKind {
    /// Opened by a `start-multi-column` line or fenced block.
    Legacy,
    /// Opened by a `::: {.N-columns}` fence.
    Pandoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionLocation {
    /// Region id; an absent id is the empty string.
    pub region_id: String,
    /// Number of earlier regions above this one carrying the same id.
    pub occurrence: usize,
    pub kind: RegionKind,
    /// The region's opening marker, positioned within the text above.
    pub start: Marker,
    /// Text above the point from the opening marker onwards.
    pub lines_above_trimmed: String,
    /// Text below the point up to the end of the region.
    pub lines_below_trimmed: String,
}

impl RegionLocation {
    pub fn is_duplicate(&self) -> bool {
        self.occurrence > 0
    }
}

/// Locates the region enclosing the point between `above` and `below`.
///
/// Returns `None` when the point is outside every region. When both marker
/// syntaxes have an open region above the point, the most recent start wins.
pub fn locate_region(scanner: &Scanner, above: &str, below: &str) -> Option<RegionLocation> {
    let legacy = locate_legacy(scanner, above, below);
    let pandoc = locate_pandoc(scanner, above, below);
    match (legacy, pandoc) {
        (Some(l), Some(p)) => Some(if p.start.start() > l.start.start() { p } else { l }),
        (l, p) => l.or(p),
    }
}

fn locate_legacy(scanner: &Scanner, above: &str, below: &str) -> Option<RegionLocation> {
    let max_tags = scanner.limits().max_region_tags;
    let mut tags = scanner.find_all(MarkerKind::RegionStart, above);
    tags.extend(scanner.find_all(MarkerKind::RegionEnd, above));
    tags.sort_by_key(Marker::start);

    // Regions do not nest: the most recent start since the last end is
    // authoritative. Text past the tag cap is left unmatched.
    let mut open = None;
    for (walked, tag) in tags.into_iter().enumerate() {
        if walked == max_tags {
            log::warn!("region scan stopped after {max_tags} region tags");
            return None;
        }
        open = (tag.kind == MarkerKind::RegionStart).then_some(tag);
    }
    let start = open?;

    let region_id = start.id.clone().unwrap_or_default();
    let occurrence = count_earlier_ids(scanner, &above[..start.start()], &region_id);

    let cut = [
        scanner.find(MarkerKind::RegionEnd, below).map(|m| m.end()),
        scanner.find(MarkerKind::RegionStart, below).map(|m| m.start()),
        scanner.find(MarkerKind::PandocFenceOpen, below).map(|m| m.start()),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(below.len());

    log::trace!("legacy region {region_id:?} opens at byte {}", start.start());
    Some(RegionLocation {
        region_id,
        occurrence,
        kind: RegionKind::Legacy,
        lines_above_trimmed: above[start.start()..].to_string(),
        lines_below_trimmed: below[..cut].to_string(),
        start,
    })
}

fn locate_pandoc(scanner: &Scanner, above: &str, below: &str) -> Option<RegionLocation> {
    let opens = scanner.find_all(MarkerKind::PandocFenceOpen, above);
    let max_tags = scanner.limits().max_region_tags;
    if opens.len() > max_tags {
        log::warn!("region scan stopped after {max_tags} pandoc column fences");
    }

    for (ordinal, open) in opens.iter().enumerate().rev().take(max_tags) {
        let tail = &above[open.end()..];
        if scanner.find(MarkerKind::PandocFenceClose, tail).is_some() {
            continue;
        }

        let separator = if tail.is_empty() || tail.ends_with('\n') { "" } else { "\n" };
        let joined = format!("{tail}{separator}{below}");
        let below_offset = tail.len() + separator.len();
        let cut = scanner
            .find(MarkerKind::PandocFenceClose, &joined)
            .filter(|close| close.start() >= below_offset)
            .map_or(below.len(), |close| close.end() - below_offset);

        let region_id = open.id.clone().unwrap_or_else(|| format!("pandoc-{ordinal}"));
        let occurrence = count_earlier_ids(scanner, &above[..open.start()], &region_id);
        log::trace!("pandoc region {region_id:?} opens at byte {}", open.start());
        return Some(RegionLocation {
            region_id,
            occurrence,
            kind: RegionKind::Pandoc,
            start: open.clone(),
            lines_above_trimmed: above[open.start()..].to_string(),
            lines_below_trimmed: below[..cut].to_string(),
        });
    }
    None
}

/// Counts region starts of either syntax in `text` whose id equals `id`.
fn count_earlier_ids(scanner: &Scanner, text: &str, id: &str) -> usize {
    let max_tags = scanner.limits().max_region_tags;
    let starts = scanner.find_all(MarkerKind::RegionStart, text);
    let opens = scanner.find_all(MarkerKind::PandocFenceOpen, text);
    if starts.len() + opens.len() > max_tags {
        log::warn!("duplicate id scan stopped after {max_tags} region tags");
    }
    starts
        .iter()
        .chain(opens.iter().filter(|open| open.id.is_some()))
        .take(max_tags)
        .filter(|marker| marker.id.as_deref().unwrap_or_default() == id)
        .count()
}
