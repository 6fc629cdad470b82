use super::{lines::lines_with_spans, span::Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceSig {
    Backticks,
    Tildes,
}

pub struct CodeFence;

impl CodeFence {
    pub const BACKTICKS: &'static str = "```";
    pub const TILDES: &'static str = "~~~";

    pub fn sig(line: &str) -> Option<FenceSig> {
        let t = line.trim_end_matches(['\r', '\n']).trim_start();
        if t.starts_with(Self::BACKTICKS) {
            Some(FenceSig::Backticks)
        } else if t.starts_with(Self::TILDES) {
            Some(FenceSig::Tildes)
        } else {
            None
        }
    }

    /// The info string following the fence characters, e.g. `column-settings`.
    pub fn info(line: &str) -> &str {
        let t = line.trim_end_matches(['\r', '\n']).trim_start();
        t.trim_start_matches(['`', '~']).trim()
    }

    pub fn closes(open: FenceSig, sig: Option<FenceSig>) -> bool {
        sig == Some(open)
    }
}

/// A fenced code block whose info string named one of the requested kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FencedBlock {
    /// From the opening fence line through the end of the closing fence line
    /// (newline excluded).
    pub span: Span,
    /// The lines between the fences.
    pub body: Span,
    /// False when the text ended before a closing fence was found.
    pub terminated: bool,
}

#[derive(Debug, Clone, Copy)]
enum FenceState {
    Outside,
    Inside {
        sig: FenceSig,
        wanted: bool,
        start: usize,
        body_start: usize,
    },
}

/// Every fenced code block in `text`, whatever its info string.
pub fn code_blocks(text: &str) -> Vec<FencedBlock> {
    scan_fences(text, |_| true)
}

/// Finds every fenced block whose info string's first word is one of `infos`.
///
/// The block end is the first following line that closes the fence. Fences
/// with other info strings are skipped as a whole so their content is never
/// mistaken for a requested block. An unterminated requested block runs to
/// the end of the text.
pub fn fenced_blocks(text: &str, infos: &[&str]) -> Vec<FencedBlock> {
    scan_fences(text, |info| infos.contains(&info))
}

fn scan_fences(text: &str, wanted: impl Fn(&str) -> bool) -> Vec<FencedBlock> {
    let mut out = vec![];
    let mut state = FenceState::Outside;

    for line in lines_with_spans(text) {
        let sig = CodeFence::sig(line.text);
        match state {
            FenceState::Outside => {
                if let Some(sig) = sig {
                    let info = CodeFence::info(line.text);
                    let first_word = info.split_whitespace().next().unwrap_or("");
                    state = FenceState::Inside {
                        sig,
                        wanted: wanted(first_word),
                        start: line.span.start,
                        body_start: line.span.end,
                    };
                }
            }
            FenceState::Inside {
                sig: open,
                wanted,
                start,
                body_start,
            } => {
                if CodeFence::closes(open, sig) {
                    if wanted {
                        out.push(FencedBlock {
                            span: Span::new(start, line.content_end()),
                            body: Span::new(body_start, line.span.start),
                            terminated: true,
                        });
                    }
                    state = FenceState::Outside;
                }
            }
        }
    }

    // Unterminated fence: emit as a block anyway
    if let FenceState::Inside {
        wanted: true,
        start,
        body_start,
        ..
    } = state
    {
        let end = text.trim_end_matches(['\r', '\n']).len().max(start);
        out.push(FencedBlock {
            span: Span::new(start, end),
            body: Span::new(body_start.min(end), end),
            terminated: false,
        });
    }

    out
}
