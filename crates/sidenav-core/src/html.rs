//! HTML projection of a rendered sidebar.
//!
//! Produces the markup the page shell embeds: a `menu` container with nested
//! `menu__list` lists, followed by the overlay toggle button.

use std::fmt::Write;

use crate::collapse::HeightStyle;
use crate::sidebar::{RenderedCategory, RenderedItem, RenderedLink, RenderedSidebar, ToggleIcon};

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the sidebar to HTML.
#[must_use]
pub fn render_html(sidebar: &RenderedSidebar) -> String {
    let mut out = String::new();
    out.push_str(r#"<nav class="sidebar">"#);
    if sidebar.toggle_button.expanded {
        out.push_str(r#"<div class="menu menu--show">"#);
    } else {
        out.push_str(r#"<div class="menu">"#);
    }
    write_list(&mut out, &sidebar.items, None);
    out.push_str("</div>");
    write_toggle_button(&mut out, sidebar);
    out.push_str("</nav>");
    out
}

fn write_list(out: &mut String, items: &[RenderedItem], height: Option<HeightStyle>) {
    match height {
        Some(HeightStyle::Fixed(px)) => {
            write!(out, r#"<ul class="menu__list" style="height:{px}px;overflow:hidden">"#).unwrap();
        }
        Some(HeightStyle::Auto) | None => out.push_str(r#"<ul class="menu__list">"#),
    }
    for item in items {
        match item {
            RenderedItem::Link(link) => write_link(out, link),
            RenderedItem::Category(category) => write_category(out, category),
        }
    }
    out.push_str("</ul>");
}

fn write_link(out: &mut String, link: &RenderedLink) {
    let mut class = String::from("menu__link");
    if link.active {
        class.push_str(" menu__link--active");
    }
    if link.external {
        class.push_str(" menu__link--external");
    }

    out.push_str(r#"<li class="menu__item">"#);
    write!(
        out,
        r#"<a class="{class}" href="{}""#,
        escape_html(&link.href)
    )
    .unwrap();
    if link.active {
        out.push_str(r#" aria-current="page""#);
    }
    if link.external {
        out.push_str(r#" target="_blank" rel="noopener noreferrer""#);
    }
    if !link.focusable {
        out.push_str(r#" tabindex="-1""#);
    }
    out.push('>');
    out.push_str(&escape_html(&link.label));
    for tag in &link.tags {
        write!(out, r#"<span class="menu__tag">{}</span>"#, escape_html(tag)).unwrap();
    }
    out.push_str("</a></li>");
}

fn write_category(out: &mut String, category: &RenderedCategory) {
    if category.collapsed {
        out.push_str(r#"<li class="menu__item menu__item--collapsed">"#);
    } else {
        out.push_str(r#"<li class="menu__item">"#);
    }

    if category.collapsible {
        let mut class = String::from("menu__link menu__link--sublist");
        if category.active {
            class.push_str(" menu__link--active");
        }
        write!(
            out,
            r##"<a class="{class}" href="#!" aria-expanded="{}""##,
            !category.collapsed
        )
        .unwrap();
        if !category.focusable {
            out.push_str(r#" tabindex="-1""#);
        }
        write!(out, ">{}</a>", escape_html(&category.label)).unwrap();
    } else {
        write!(
            out,
            r#"<span class="menu__link menu__text">{}</span>"#,
            escape_html(&category.label)
        )
        .unwrap();
    }

    write_list(out, &category.children, Some(category.height));
    out.push_str("</li>");
}

fn write_toggle_button(out: &mut String, sidebar: &RenderedSidebar) {
    let button = &sidebar.toggle_button;
    write!(
        out,
        r#"<button class="sidebar__toggle" type="button" aria-label="{}" aria-haspopup="true" aria-expanded="{}">"#,
        button.aria_label, button.expanded
    )
    .unwrap();
    match button.icon {
        ToggleIcon::Close => out.push_str(r#"<span class="sidebar__icon sidebar__icon--close">&times;</span>"#),
        ToggleIcon::Menu => write!(
            out,
            r#"<span class="sidebar__icon sidebar__icon--menu" style="width:{size}px;height:{size}px"></span>"#,
            size = button.icon_size
        )
        .unwrap(),
    }
    out.push_str("</button>");
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::collapse::DEFAULT_TOGGLE_DELAY;
    use crate::measure::RowHeightMeasure;
    use crate::overlay::BodyScrollLock;
    use crate::sidebar::{SidebarOptions, SidebarTree};
    use crate::tree::{NodePath, Tree, TreeNode};

    fn sidebar(path: &str) -> SidebarTree {
        let tree = Tree::new(vec![
            TreeNode::category(
                "Guides",
                vec![
                    TreeNode::link("Intro", "/docs/intro"),
                    TreeNode::tagged_link("Setup & <Run>", "/docs/setup", ["new"]),
                ],
                true,
            ),
            TreeNode::link("GitHub", "https://github.com/questdb"),
        ])
        .unwrap();
        SidebarTree::new(
            tree,
            path,
            SidebarOptions::default(),
            BodyScrollLock::new(),
            Some(1280),
        )
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_html_marks_active_link() {
        let html = render_html(&sidebar("/docs/setup").render());

        assert!(html.contains(
            r#"<a class="menu__link menu__link--active" href="/docs/setup/" aria-current="page">Setup &amp; &lt;Run&gt;<span class="menu__tag">new</span></a>"#
        ));
        assert!(html.contains(r#"<a class="menu__link" href="/docs/intro/">Intro</a>"#));
        assert!(html.contains(r#"aria-expanded="true">Guides</a>"#));
    }

    #[test]
    fn test_render_html_collapsed_category_has_no_children() {
        let html = render_html(&sidebar("/blog/").render());

        assert!(html.contains(r#"<li class="menu__item menu__item--collapsed">"#));
        assert!(html.contains(r#"aria-expanded="false">Guides</a><ul class="menu__list"></ul>"#));
        assert!(!html.contains("Intro"));
    }

    #[test]
    fn test_render_html_external_link() {
        let html = render_html(&sidebar("/").render());

        assert!(html.contains(
            r#"<a class="menu__link menu__link--external" href="https://github.com/questdb" target="_blank" rel="noopener noreferrer">GitHub</a>"#
        ));
    }

    #[test]
    fn test_render_html_transition_sets_height() {
        let mut sidebar = sidebar("/blog/");
        let now = Instant::now();
        sidebar
            .click_category(&NodePath::root(0), now, &RowHeightMeasure::new(30.0))
            .unwrap();
        sidebar.tick(now + DEFAULT_TOGGLE_DELAY);

        let html = render_html(&sidebar.render());

        assert!(html.contains(r#"<ul class="menu__list" style="height:60px;overflow:hidden">"#));
    }

    #[test]
    fn test_render_html_toggle_button() {
        let mut sidebar = sidebar("/");
        let closed = render_html(&sidebar.render());
        assert!(closed.contains(r#"aria-label="Open menu""#));
        assert!(closed.contains(r#"<div class="menu">"#));

        sidebar.toggle_overlay();
        let open = render_html(&sidebar.render());

        assert!(open.contains(r#"aria-label="Close menu""#));
        assert!(open.contains(r#"<div class="menu menu--show">"#));
        assert!(open.contains("&times;"));
    }
}
