use std::fmt;

use serde::Serialize;

/// How a status message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Work in progress.
    Info,
    Success,
    Warning,
    Error,
    /// Neutral notice, e.g. after clearing the layer.
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub level: Level,
    /// Plain text. Lines are separated with `\n`.
    pub message: String,
}

impl Status {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self::new(Level::Notice, message)
    }

    /// Render as the HTML fragment shown in the upload panel. The first line
    /// of a success message is bold.
    pub fn to_html(&self) -> String {
        let color = match self.level {
            Level::Info => return format!("<b>{}</b>", self.message.replace('\n', "<br/>")),
            Level::Success => "green",
            Level::Warning => "orange",
            Level::Error => "red",
            Level::Notice => "blue",
        };
        let body = match (self.level, self.message.split_once('\n')) {
            (Level::Success, Some((head, rest))) => {
                format!("<b>{head}</b><br/>{}", rest.replace('\n', "<br/>"))
            }
            _ => self.message.replace('\n', "<br/>"),
        };
        format!("<p style=\"color:{color}\">{body}</p>")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

type Listener = Box<dyn Fn(&Status) + Send + Sync>;

/// Latest-value status broadcast.
///
/// Holds one current value. Publishing replaces it and notifies every
/// listener; a new listener is immediately called with the current value.
#[derive(Default)]
pub struct StatusFeed {
    current: Option<Status>,
    listeners: Vec<Listener>,
}

impl StatusFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, status: Status) {
        for listener in &self.listeners {
            listener(&status);
        }
        self.current = Some(status);
    }

    /// The last published status, `None` before anything was published.
    pub fn current(&self) -> Option<&Status> {
        self.current.as_ref()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&Status) + Send + Sync + 'static) {
        if let Some(status) = &self.current {
            listener(status);
        }
        self.listeners.push(Box::new(listener));
    }
}

impl fmt::Debug for StatusFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusFeed")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
