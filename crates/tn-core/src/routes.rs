//! Routes and the navigation shell capabilities

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay between leaving a page and scrolling to a section of the home page
const SECTION_SCROLL_DELAY: Duration = Duration::from_millis(100);

/// Navigable locations of the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Home,
    Detect,
    Report,
    About,
    Login,
    SsoCallback,
    AdminDashboard,
    UserDashboard,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Home,
        Route::Detect,
        Route::Report,
        Route::About,
        Route::Login,
        Route::SsoCallback,
        Route::AdminDashboard,
        Route::UserDashboard,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Detect => "/detect",
            Route::Report => "/report",
            Route::About => "/about",
            Route::Login => "/login",
            Route::SsoCallback => "/sso-callback",
            Route::AdminDashboard => "/dashboard-admin",
            Route::UserDashboard => "/dashboard-user",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    /// Path for a navbar page name; "home" is the root.
    pub fn for_page(page: &str) -> String {
        if page == "home" {
            "/".to_string()
        } else {
            format!("/{}", page)
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Navbar item highlighted for a location
pub fn current_page(path: &str) -> &'static str {
    match path {
        "/detect" => "detect",
        "/report" => "report",
        "/about" => "about",
        _ => "home",
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one
    pub replace: bool,
}

impl NavigateOptions {
    pub fn replace() -> Self {
        Self { replace: true }
    }
}

/// Capabilities supplied by the page-rendering shell. All calls are fire-and-forget.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, options: NavigateOptions);

    fn scroll_to_section(&self, section_id: &str);

    fn scroll_to_top(&self);

    fn current_path(&self) -> String;
}

/// Page-level navigation helpers on top of a [`Navigator`]
pub struct Shell<N> {
    navigator: N,
}

impl<N: Navigator> Shell<N> {
    pub fn new(navigator: N) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn current_page(&self) -> &'static str {
        current_page(&self.navigator.current_path())
    }

    /// Go to a navbar page and jump to its top.
    pub fn go(&self, page: &str) {
        let path = Route::for_page(page);
        tracing::debug!("Navigating to {}", path);
        self.navigator.navigate(&path, NavigateOptions::default());
        self.navigator.scroll_to_top();
    }

    /// Scroll to a home page section, leaving the current page first if needed.
    pub async fn scroll_to(&self, section_id: &str) {
        if self.navigator.current_path() != Route::Home.path() {
            self.navigator
                .navigate(Route::Home.path(), NavigateOptions::default());
            tokio::time::sleep(SECTION_SCROLL_DELAY).await;
        }
        self.navigator.scroll_to_section(section_id);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every navigation call
    #[derive(Default)]
    pub struct RecordingNavigator {
        pub path: Mutex<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        pub fn at(path: &str) -> Self {
            Self {
                path: Mutex::new(path.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str, options: NavigateOptions) {
            *self.path.lock().unwrap() = path.to_string();
            let mode = if options.replace { "replace" } else { "push" };
            self.calls.lock().unwrap().push(format!("{} {}", mode, path));
        }

        fn scroll_to_section(&self, section_id: &str) {
            self.calls.lock().unwrap().push(format!("section {}", section_id));
        }

        fn scroll_to_top(&self) {
            self.calls.lock().unwrap().push("top".to_string());
        }

        fn current_path(&self) -> String {
            self.path.lock().unwrap().clone()
        }
    }
}
