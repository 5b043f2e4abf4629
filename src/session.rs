pub const DEFAULT_HELP_URL: &str = "https://aistudio.google.com/apikey";

/// Receives a confirmed credential. Called at most once per start attempt,
/// always with a trimmed, non-empty string.
pub trait SessionStarter {
    fn start(&mut self, credential: &str);
}

pub trait HelpOpener {
    fn open_help(&mut self);
}

/// Records start requests without connecting anywhere.
#[derive(Debug, Default)]
pub struct LoggingSessionStarter {
    requests: usize,
}

impl SessionStarter for LoggingSessionStarter {
    fn start(&mut self, credential: &str) {
        self.requests += 1;
        tracing::info!(
            key_len = credential.chars().count(),
            request = self.requests,
            "starting session with API key"
        );
    }
}

pub struct BrowserHelp {
    url: String,
}

impl BrowserHelp {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl HelpOpener for BrowserHelp {
    fn open_help(&mut self) {
        tracing::info!(url = %self.url, "opening API key help");
        if let Err(err) = open::that(&self.url) {
            tracing::warn!(url = %self.url, error = %err, "failed to open help link");
        }
    }
}
