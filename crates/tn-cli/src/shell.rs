//! Terminal stand-in for the page shell

use std::sync::Mutex;
use tn_core::{NavigateOptions, Navigator, Route};

/// Navigator that tracks the current path and logs every move
pub struct TerminalNavigator {
    path: Mutex<String>,
}

impl TerminalNavigator {
    pub fn new() -> Self {
        Self {
            path: Mutex::new(Route::Home.path().to_string()),
        }
    }
}

impl Default for TerminalNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str, options: NavigateOptions) {
        tracing::info!(
            "{} {}",
            if options.replace { "Redirect" } else { "Navigate" },
            path
        );
        let mut current = self.path.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = path.to_string();
    }

    fn scroll_to_section(&self, section_id: &str) {
        tracing::debug!("Scroll to #{}", section_id);
    }

    fn scroll_to_top(&self) {
        tracing::debug!("Scroll to top");
    }

    fn current_path(&self) -> String {
        self.path
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_core::Shell;

    #[test]
    fn test_tracks_current_path() {
        let shell = Shell::new(TerminalNavigator::new());
        assert_eq!(shell.current_page(), "home");
        shell.go("detect");
        assert_eq!(shell.navigator().current_path(), "/detect");
        assert_eq!(shell.current_page(), "detect");
    }

    #[test]
    fn test_default_starts_at_home() {
        let navigator = TerminalNavigator::default();
        assert_eq!(navigator.current_path(), Route::Home.path());
        navigator.navigate("/login", NavigateOptions::replace());
        assert_eq!(navigator.current_path(), "/login");
    }
}
