//! What the content-frame host reports back to the core.

/// The kind of event that made the frame's location (possibly) change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationSignal {
    /// The frame fired `load`.
    Load,
    /// Script inside the frame called `history.pushState`.
    PushState,
    /// Script inside the frame called `history.replaceState`.
    ReplaceState,
    PopState,
    HashChange,
    /// A top-level link inside the frame was activated.
    LinkActivated,
}

/// Document readiness as reported by the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// Observable parts of the frame's document at the time of a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDocument {
    pub title: Option<String>,
    /// Absolute `href` of the first `link[rel=icon]`, if any.
    pub icon_href: Option<String>,
    pub ready_state: ReadyState,
    pub head_html: String,
    pub body_html: String,
}

impl FrameDocument {
    /// A fully loaded document with some content in head and body.
    pub fn complete(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            icon_href: None,
            ready_state: ReadyState::Complete,
            head_html: "<meta charset=\"utf-8\">".to_string(),
            body_html: "<main></main>".to_string(),
        }
    }

    /// A document that finished loading without any content.
    pub fn empty() -> Self {
        Self {
            title: None,
            icon_href: None,
            ready_state: ReadyState::Complete,
            head_html: String::new(),
            body_html: String::new(),
        }
    }

    pub fn with_icon(mut self, href: &str) -> Self {
        self.icon_href = Some(href.to_string());
        self
    }

    pub fn with_ready_state(mut self, ready_state: ReadyState) -> Self {
        self.ready_state = ready_state;
        self
    }

    /// Both head and body carry markup.
    pub fn is_populated(&self) -> bool {
        !self.head_html.trim().is_empty() && !self.body_html.trim().is_empty()
    }
}

/// The frame's raw location plus its document, captured when a signal fires.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub location: String,
    /// `None` when the document could not be inspected.
    pub document: Option<FrameDocument>,
}

impl FrameSnapshot {
    pub fn new(location: &str, document: FrameDocument) -> Self {
        Self {
            location: location.to_string(),
            document: Some(document),
        }
    }

    pub fn opaque(location: &str) -> Self {
        Self {
            location: location.to_string(),
            document: None,
        }
    }
}
