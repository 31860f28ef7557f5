//! # Log Ring Buffer
//!
//! Fixed-capacity circular buffer backing the on-screen terminal log.
//!
//! Every line carries a color tag chosen from its first character:
//! lines starting with `W` or `!` render yellow, everything else green.
//! Rendering emits the most recent [`LOG_LINES_SHOWN`] lines, oldest first,
//! using the label recolor syntax `#RRGGBB text#`.
//!
//! The ring holds no lock. Callers sharing it between contexts wrap it
//! (see [`crate::bridge::context::PanelContext`]).

/// Number of slots in the ring
pub const LOG_RING_CAPACITY: usize = 20;

/// Maximum characters stored per line (longer input is truncated)
pub const LOG_LINE_CAPACITY: usize = 79;

/// Number of most recent lines included in a render
pub const LOG_LINES_SHOWN: usize = 10;

/// Recolor tag for informational lines
pub const INFO_COLOR: &str = "#00FF00";

/// Recolor tag for warning lines
pub const WARN_COLOR: &str = "#FFFF00";

/// Severity class of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Info,
    Warn,
}

impl LogTag {
    /// Classify a message by its first character.
    ///
    /// # Examples
    ///
    /// ```
    /// use biospider_panel::log_ring::LogTag;
    ///
    /// assert_eq!(LogTag::classify("W link lost"), LogTag::Warn);
    /// assert_eq!(LogTag::classify("!!! E-STOP sent !!!"), LogTag::Warn);
    /// assert_eq!(LogTag::classify("I UP"), LogTag::Info);
    /// ```
    pub fn classify(text: &str) -> Self {
        match text.chars().next() {
            Some('W') | Some('!') => LogTag::Warn,
            _ => LogTag::Info,
        }
    }

    /// Recolor tag used when rendering
    pub fn color(self) -> &'static str {
        match self {
            LogTag::Info => INFO_COLOR,
            LogTag::Warn => WARN_COLOR,
        }
    }
}

/// A single classified, length-bounded log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    tag: LogTag,
    text: String,
}

impl LogLine {
    /// Create a line, truncating `text` to [`LOG_LINE_CAPACITY`] characters.
    pub fn new(text: &str) -> Self {
        Self {
            tag: LogTag::classify(text),
            text: text.chars().take(LOG_LINE_CAPACITY).collect(),
        }
    }

    pub fn tag(&self) -> LogTag {
        self.tag
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Render with the recolor tag, e.g. `#00FF00 I UP#`
    pub fn render(&self) -> String {
        format!("{} {}#", self.tag.color(), self.text)
    }
}

/// Circular buffer of the last [`LOG_RING_CAPACITY`] log lines
#[derive(Debug, Clone)]
pub struct LogRing {
    /// `None` marks a slot that has never been written
    slots: [Option<LogLine>; LOG_RING_CAPACITY],
    /// Next slot to overwrite, always in `0..LOG_RING_CAPACITY`
    cursor: usize,
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new()
    }
}

impl LogRing {
    /// Create an empty ring
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            cursor: 0,
        }
    }

    /// Append a line, overwriting the oldest slot once the ring is full.
    ///
    /// # Examples
    ///
    /// ```
    /// use biospider_panel::log_ring::LogRing;
    ///
    /// let mut ring = LogRing::new();
    /// ring.append("I UP");
    /// ring.append("W SCAN send failed");
    /// assert_eq!(ring.render(), "#00FF00 I UP#\n#FFFF00 W SCAN send failed#\n");
    /// ```
    pub fn append(&mut self, text: &str) {
        self.slots[self.cursor] = Some(LogLine::new(text));
        self.cursor = (self.cursor + 1) % LOG_RING_CAPACITY;
    }

    /// Index of the next slot to be overwritten
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The most recent (up to [`LOG_LINES_SHOWN`]) lines, oldest first
    pub fn recent(&self) -> impl Iterator<Item = &LogLine> + '_ {
        (0..LOG_LINES_SHOWN).filter_map(move |i| {
            let idx = (self.cursor + LOG_RING_CAPACITY - LOG_LINES_SHOWN + i) % LOG_RING_CAPACITY;
            self.slots[idx].as_ref()
        })
    }

    /// Render the recent lines into one display string, one line each.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(LOG_LINES_SHOWN * (LOG_LINE_CAPACITY + 10));
        for line in self.recent() {
            out.push_str(&line.render());
            out.push('\n');
        }
        out
    }
}
