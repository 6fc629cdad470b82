use serde::Serialize;

/// The special-kind tag of a rendered fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FragmentKind {
    Paragraph,
    Heading { level: u8 },
    CodeBlock { lang: Option<String> },
    /// A list whose items carry checkboxes, in item order.
    TaskList { checked: Vec<bool> },
    List,
    BlockQuote,
    /// A transcluded note or file, e.g. `![[note]]`.
    Embed { target: String },
    ThematicBreak,
    Other,
}

/// One piece of rendered content handed over by the host renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// Rendered text content.
    pub text: String,
    pub kind: FragmentKind,
}

impl Fragment {
    pub fn new(kind: FragmentKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(FragmentKind::Paragraph, text)
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, FragmentKind::Heading { .. })
    }

    /// Key used to find this fragment again among its siblings.
    ///
    /// Derived from the text alone with whitespace collapsed, so re-rendering
    /// the same content yields the same key. Task lists ignore checkbox state;
    /// embeds are keyed by target. Fragments without text have an empty key
    /// and never serve as anchors.
    pub fn node_key(&self) -> String {
        match &self.kind {
            FragmentKind::Embed { target } => format!("embed:{}", collapse_whitespace(target)),
            _ => collapse_whitespace(&self.text),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
