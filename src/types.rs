//! Shared types used by rendering, the server, and static export.

use serde::Serialize;

/// The four pages of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Home,
    About,
    Portfolio,
    Contact,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Home, Route::About, Route::Portfolio, Route::Contact];

    /// URL path served by the HTTP server.
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Portfolio => "/portfolio",
            Route::Contact => "/contact",
        }
    }

    /// File written by static export, relative to the output directory.
    pub fn output_file(self) -> &'static str {
        match self {
            Route::Home => "index.html",
            Route::About => "about/index.html",
            Route::Portfolio => "portfolio/index.html",
            Route::Contact => "contact/index.html",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::About => "About",
            Route::Portfolio => "Portfolio",
            Route::Contact => "Contact",
        }
    }
}

/// Navigation bar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: String,
    pub path: String,
}

/// Navigation bar entries, in display order. Home is reached via the brand.
pub fn navigation() -> Vec<NavItem> {
    [Route::Portfolio, Route::About, Route::Contact]
        .into_iter()
        .map(|route| NavItem {
            title: route.title().to_string(),
            path: route.path().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_have_distinct_paths_and_files() {
        let paths: std::collections::HashSet<_> = Route::ALL.iter().map(|r| r.path()).collect();
        let files: std::collections::HashSet<_> = Route::ALL.iter().map(|r| r.output_file()).collect();
        assert_eq!(paths.len(), 4);
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn navigation_order() {
        let titles: Vec<String> = navigation().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Portfolio", "About", "Contact"]);
    }
}
