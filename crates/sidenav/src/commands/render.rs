//! `sidenav render` command implementation.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, ValueEnum};
use sidenav_config::{CliSettings, Config};
use sidenav_core::{
    BodyScrollLock, CollapseOptions, NodePath, RowHeightMeasure, SidebarOptions, SidebarTree,
    Tree, render_html,
};

use crate::error::CliError;
use crate::output::Output;

/// Output format for rendered sidebars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// HTML markup.
    #[default]
    Html,
    /// Render tree as JSON.
    Json,
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Generated sidebar JSON file.
    #[arg(short, long)]
    sidebar: PathBuf,

    /// Current page path.
    #[arg(short, long, default_value = "/")]
    path: String,

    /// Viewport width in pixels (default: unknown, treated as desktop).
    #[arg(short, long)]
    width: Option<u32>,

    /// Render with the mobile overlay open.
    #[arg(long)]
    open: bool,

    /// Click the category at this position before rendering (e.g. "0.2").
    #[arg(long = "toggle", value_name = "POSITION")]
    toggles: Vec<String>,

    /// Render mid-transition instead of after transitions settle.
    #[arg(long)]
    mid_transition: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: Format,

    /// Path to configuration file (default: auto-discover sidenav.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mobile/desktop breakpoint in pixels (overrides config).
    #[arg(long)]
    breakpoint: Option<u32>,

    /// Keep every category expanded (overrides config).
    #[arg(long)]
    no_collapse: bool,

    /// Enable verbose output (show state transition logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, the sidebar file, or a toggle
    /// position is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            breakpoint: self.breakpoint,
            collapsible: self.no_collapse.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let tree = Tree::from_json(&std::fs::read_to_string(&self.sidebar)?)?;
        let options = SidebarOptions {
            collapse: CollapseOptions {
                collapsible: config.sidebar.collapsible,
                toggle_delay: config.sidebar.toggle_delay(),
            },
            breakpoint: config.viewport.breakpoint,
        };
        let mut sidebar =
            SidebarTree::new(tree, &self.path, options, BodyScrollLock::new(), self.width);

        let toggles = self
            .toggles
            .iter()
            .map(|raw| parse_position(raw))
            .collect::<Result<Vec<_>, _>>()?;
        if !toggles.is_empty() {
            apply_toggles(
                &mut sidebar,
                &toggles,
                &RowHeightMeasure::new(config.sidebar.row_height),
                !self.mid_transition,
            )?;
        }

        if self.open {
            sidebar.toggle_overlay();
        }

        let rendered = sidebar.render();
        let text = match self.format {
            Format::Html => render_html(&rendered),
            Format::Json => serde_json::to_string_pretty(&rendered)?,
        };
        output.result(&text)?;
        Ok(())
    }
}

/// Replay clicks one at a time, in order.
///
/// Each click fires its debounced toggle before the next one, so a later
/// position sees the children an earlier toggle mounted or unmounted. With
/// `settle`, each transition also ends before the next click.
fn apply_toggles(
    sidebar: &mut SidebarTree,
    toggles: &[NodePath],
    measure: &RowHeightMeasure,
    settle: bool,
) -> Result<(), CliError> {
    let mut now = Instant::now();
    for position in toggles {
        sidebar.click_category(position, now, measure)?;
        if let Some(deadline) = sidebar.next_deadline() {
            sidebar.tick(deadline);
            now = deadline;
        }
        if settle {
            sidebar.transition_end(position)?;
        }
    }
    Ok(())
}

/// Parse a dotted position such as `0.2.1`.
fn parse_position(raw: &str) -> Result<NodePath, CliError> {
    let trimmed = raw.trim_matches(|c| c == '[' || c == ']');
    if trimmed.is_empty() {
        return Err(CliError::Validation(format!("empty toggle position: {raw:?}")));
    }
    trimmed
        .split('.')
        .map(str::parse::<usize>)
        .collect::<Result<Vec<_>, _>>()
        .map(NodePath::from)
        .map_err(|_| CliError::Validation(format!("invalid toggle position: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sidenav_core::{CollapsePhase, SidebarError};

    use super::*;

    const SIDEBAR: &str = r#"[
        {"type": "category", "label": "Guides", "items": [
            {"type": "link", "label": "Intro", "href": "/docs/intro"},
            {"type": "link", "label": "Setup", "href": "/docs/setup"}
        ]},
        {"type": "link", "label": "Blog", "href": "/blog"}
    ]"#;

    fn sidebar() -> SidebarTree {
        SidebarTree::new(
            Tree::from_json(SIDEBAR).unwrap(),
            "/blog",
            SidebarOptions::default(),
            BodyScrollLock::new(),
            None,
        )
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("0").unwrap(), NodePath::root(0));
        assert_eq!(parse_position("0.2.1").unwrap(), NodePath::from(vec![0, 2, 1]));
        assert_eq!(parse_position("[1.3]").unwrap(), NodePath::from(vec![1, 3]));
    }

    #[test]
    fn test_parse_position_rejects_garbage() {
        assert!(matches!(parse_position(""), Err(CliError::Validation(_))));
        assert!(matches!(parse_position("0.x"), Err(CliError::Validation(_))));
        assert!(matches!(parse_position("0..1"), Err(CliError::Validation(_))));
    }

    #[test]
    fn test_apply_toggles_settles_open() {
        let mut sidebar = sidebar();
        let guides = NodePath::root(0);

        apply_toggles(&mut sidebar, &[guides.clone()], &RowHeightMeasure::default(), true)
            .unwrap();

        assert_eq!(sidebar.phase(&guides).unwrap(), CollapsePhase::Expanded);
    }

    #[test]
    fn test_apply_toggles_mid_transition() {
        let mut sidebar = sidebar();
        let guides = NodePath::root(0);

        apply_toggles(&mut sidebar, &[guides.clone()], &RowHeightMeasure::default(), false)
            .unwrap();

        assert!(matches!(
            sidebar.phase(&guides).unwrap(),
            CollapsePhase::Transitioning(_)
        ));
    }

    fn nested() -> Tree {
        Tree::from_json(
            r#"[{"type": "category", "label": "Reference", "items": [
                {"type": "category", "label": "Functions", "items": [
                    {"type": "link", "label": "Aggregate", "href": "/agg"}
                ]}
            ]}]"#,
        )
        .unwrap()
    }

    fn nested_sidebar(path: &str) -> SidebarTree {
        SidebarTree::new(
            nested(),
            path,
            SidebarOptions::default(),
            BodyScrollLock::new(),
            None,
        )
    }

    #[test]
    fn test_apply_toggles_opens_parent_then_child() {
        let mut sidebar = nested_sidebar("/");
        let toggles = [NodePath::root(0), NodePath::from(vec![0, 0])];

        apply_toggles(&mut sidebar, &toggles, &RowHeightMeasure::default(), true).unwrap();

        assert_eq!(sidebar.phase(&toggles[0]).unwrap(), CollapsePhase::Expanded);
        assert_eq!(sidebar.phase(&toggles[1]).unwrap(), CollapsePhase::Expanded);
    }

    #[test]
    fn test_apply_toggles_opens_nested_mid_transition() {
        let mut sidebar = nested_sidebar("/");
        let toggles = [NodePath::root(0), NodePath::from(vec![0, 0])];

        apply_toggles(&mut sidebar, &toggles, &RowHeightMeasure::default(), false).unwrap();

        assert!(matches!(
            sidebar.phase(&toggles[1]).unwrap(),
            CollapsePhase::Transitioning(_)
        ));
    }

    #[test]
    fn test_apply_toggles_closes_child_then_parent() {
        let mut sidebar = nested_sidebar("/agg");
        let toggles = [NodePath::from(vec![0, 0]), NodePath::root(0)];

        apply_toggles(&mut sidebar, &toggles, &RowHeightMeasure::default(), true).unwrap();

        assert_eq!(sidebar.phase(&toggles[1]).unwrap(), CollapsePhase::Collapsed);
    }

    #[test]
    fn test_apply_toggles_child_hidden_by_closed_parent() {
        let mut sidebar = nested_sidebar("/agg");
        let child = NodePath::from(vec![0, 0]);

        let result = apply_toggles(
            &mut sidebar,
            &[NodePath::root(0), child.clone()],
            &RowHeightMeasure::default(),
            true,
        );

        assert!(matches!(
            result,
            Err(CliError::Sidebar(SidebarError::NotMounted(path))) if path == child
        ));
    }

    #[test]
    fn test_apply_toggles_rejects_link() {
        let mut sidebar = sidebar();

        let result = apply_toggles(
            &mut sidebar,
            &[NodePath::root(1)],
            &RowHeightMeasure::default(),
            true,
        );

        assert!(matches!(result, Err(CliError::Sidebar(_))));
    }
}
