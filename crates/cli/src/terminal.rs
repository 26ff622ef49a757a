//! Terminal implementations of the session and navigation seams

use std::path::PathBuf;

use planshift_billing::{DialogView, Navigator, SessionManager};

/// Session backed by the token file the CLI was configured with
pub struct TerminalSession {
    base_url: String,
    token_file: Option<PathBuf>,
}

impl TerminalSession {
    pub fn new(base_url: &str, token_file: Option<PathBuf>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token_file,
        }
    }
}

impl SessionManager for TerminalSession {
    fn reset_and_redirect(&self, route: &str) {
        if let Some(path) = &self.token_file {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::info!(path = %path.display(), "Removed stored access token"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove access token"),
            }
        }
        println!("\nYour session has expired. Please log in again: {}{}", self.base_url, route);
    }
}

/// Prints external URLs for the user to open
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, url: &str) {
        println!("\nContinue to checkout to complete your purchase:\n  {}", url);
    }
}

/// Render the dialog as plain text. Cards are numbered from 1.
pub fn render(view: &DialogView) -> String {
    let mut out = format!("\n{}\n{}\n", view.title, "=".repeat(view.title.len()));
    for (i, card) in view.cards.iter().enumerate() {
        out.push_str(&format!("\n{}) {}", i + 1, card.render_text()));
    }
    if let Some(banner) = &view.banner {
        out.push_str(&format!("\n! {}\n", banner));
    }
    if let Some(status) = &view.status {
        out.push_str(&format!("\nError: {}\n", status));
    }
    let submit = if view.resolution.submit_enabled {
        format!("s) {}", view.resolution.submit_label)
    } else {
        format!("s) {} (nothing to change)", view.resolution.submit_label)
    };
    out.push_str(&format!("\n{}\nq) Close\n", submit));
    out
}
