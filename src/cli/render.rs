//! Terminal rendering of a mindmap via `termtree`.

use colored::{ColoredString, Colorize};
use generational_arena::Index;
use termtree::Tree;

use crate::application::Renderer;
use crate::config::DisplayConfig;
use crate::domain::{MindMap, NodeData, NodeId};

/// How nodes are drawn.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub show_ids: bool,
    pub display: DisplayConfig,
}

/// Draws the tree to stdout after every accepted change.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    options: RenderOptions,
}

impl TerminalRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, tree: &MindMap, selected: Option<&NodeId>) {
        println!("{}", to_termtree(tree, selected, &self.options));
    }
}

/// Display tree of `tree`; the selected node is bold and marked with `*`.
pub fn to_termtree(tree: &MindMap, selected: Option<&NodeId>, options: &RenderOptions) -> Tree<String> {
    build(tree, tree.root(), selected, options)
}

fn build(tree: &MindMap, idx: Index, selected: Option<&NodeId>, options: &RenderOptions) -> Tree<String> {
    match tree.get_node(idx) {
        Some(node) => {
            let is_selected = selected == Some(&node.data.id);
            Tree::new(format_node(&node.data, is_selected, options)).with_leaves(
                node.children
                    .iter()
                    .map(|&child| build(tree, child, selected, options)),
            )
        }
        None => Tree::new(String::new()),
    }
}

/// One line of the display: label, optional id and explicit font size.
pub fn format_node(data: &NodeData, selected: bool, options: &RenderOptions) -> String {
    let color = data.color.as_deref().unwrap_or(&options.display.color);
    let mut label = paint(&data.label, color);
    if selected {
        label = label.bold();
    }

    let mut line = if selected {
        format!("* {}", label)
    } else {
        label.to_string()
    };
    if let Some(size) = data.font_size.filter(|&s| s != options.display.font_size) {
        line.push_str(&format!(" ({}pt)", size));
    }
    if options.show_ids {
        line.push_str(&format!(" {}", format!("[{}]", data.id).dimmed()));
    }
    line
}

fn paint(text: &str, color: &str) -> ColoredString {
    match parse_hex_color(color) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

/// `#rgb` or `#rrggbb` to an RGB triple.
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
                .collect::<Option<_>>()?;
            Some((digits[0], digits[1], digits[2]))
        }
        6 => Some((
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{sample_record, NodeRecord, TreeBuilder};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#3498db"), Some((0x34, 0x98, 0xdb)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn test_format_node_marks_selection_and_ids() {
        plain();
        let options = RenderOptions {
            show_ids: true,
            ..RenderOptions::default()
        };
        let data = NodeData {
            id: NodeId::from("node_3"),
            label: "Topic".into(),
            color: None,
            font_size: Some(20),
        };

        assert_eq!(format_node(&data, true, &options), "* Topic (20pt) [node_3]");
        assert_eq!(format_node(&data, false, &RenderOptions::default()), "Topic (20pt)");
    }

    #[test]
    fn test_termtree_follows_child_order() {
        plain();
        let tree = TreeBuilder::new()
            .build(NodeRecord::new("Root").with_children(vec![
                NodeRecord::new("A").with_children(vec![NodeRecord::new("A1")]),
                NodeRecord::new("B"),
            ]))
            .unwrap();

        let rendered = to_termtree(&tree, None, &RenderOptions::default()).to_string();

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Root");
        assert!(lines[1].ends_with("A"));
        assert!(lines[2].ends_with("A1"));
        assert!(lines[3].ends_with("B"));
    }

    #[test]
    fn test_sample_renders_every_node() {
        plain();
        let tree = TreeBuilder::new().build(sample_record()).unwrap();
        let rendered = to_termtree(&tree, None, &RenderOptions::default()).to_string();
        assert_eq!(rendered.lines().count(), tree.node_count());
    }
}
