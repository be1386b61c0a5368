use crate::core::navigation::{dashboard_links, NavLink};

pub fn render_menu(path: &str) -> Vec<String> {
    dashboard_links()
        .iter()
        .map(|link: &NavLink| {
            let marker = if link.is_active(path) { "▶" } else { " " };
            format!("{} {:<16} {}", marker, link.label, link.href)
        })
        .collect()
}

pub fn nav(path: &str) {
    for line in render_menu(path) {
        println!("{}", line);
    }
}
