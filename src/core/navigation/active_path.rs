// Path matching for highlighting the current dashboard link.
// Targets are escaped before being turned into a pattern, so a link like
// "/a.b" only ever matches itself.

use regex::Regex;

/// `path` is exactly `target`, optionally followed by a query string.
pub fn is_active_path(path: &str, target: &str) -> bool {
    matches(path, &format!(r"^{}(\?.*)*$", regex::escape(target)))
}

/// `path` is `target` or anything below it, optionally followed by a query string.
pub fn is_partial_path(path: &str, target: &str) -> bool {
    matches(path, &format!(r"^{}(/.*)*(\?.*)*$", regex::escape(target)))
}

fn matches(path: &str, pattern: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(path))
        .unwrap_or(false)
}

/// One entry of the dashboard menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
    /// Highlight for sub-pages too, not just the page itself.
    pub partial: bool,
}

impl NavLink {
    pub fn is_active(&self, path: &str) -> bool {
        if self.partial {
            is_partial_path(path, self.href)
        } else {
            is_active_path(path, self.href)
        }
    }
}

/// The module pages the dashboard links to.
pub fn dashboard_links() -> Vec<NavLink> {
    vec![
        NavLink {
            label: "Dashboard",
            href: "/",
            partial: false,
        },
        NavLink {
            label: "Welcome",
            href: "/welcome",
            partial: true,
        },
        NavLink {
            label: "Reaction Roles",
            href: "/reaction-roles",
            partial: true,
        },
        NavLink {
            label: "Polls",
            href: "/polls",
            partial: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_allows_a_query_string() {
        assert!(is_active_path("/foo", "/foo"));
        assert!(is_active_path("/foo?x=1", "/foo"));
        assert!(!is_active_path("/foo/bar", "/foo"));
        assert!(!is_active_path("/foobar", "/foo"));
    }

    #[test]
    fn partial_match_needs_a_separator() {
        assert!(is_partial_path("/foo", "/foo"));
        assert!(is_partial_path("/foo/bar", "/foo"));
        assert!(is_partial_path("/foo/bar?tab=embed", "/foo"));
        assert!(!is_partial_path("/foobar", "/foo"));
    }

    #[test]
    fn targets_are_matched_literally() {
        assert!(is_active_path("/a.b", "/a.b"));
        assert!(!is_active_path("/axb", "/a.b"));
        assert!(is_partial_path("/(x)+/y", "/(x)+"));
        assert!(!is_partial_path("/xx/y", "/(x)+"));
    }

    #[test]
    fn only_the_matching_dashboard_link_is_active() {
        let active: Vec<_> = dashboard_links()
            .into_iter()
            .filter(|link| link.is_active("/welcome/join?preview=1"))
            .map(|link| link.label)
            .collect();
        assert_eq!(active, vec!["Welcome"]);

        let active: Vec<_> = dashboard_links()
            .into_iter()
            .filter(|link| link.is_active("/"))
            .map(|link| link.label)
            .collect();
        assert_eq!(active, vec!["Dashboard"]);
    }
}
