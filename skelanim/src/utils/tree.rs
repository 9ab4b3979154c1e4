//! Tree rendering for node hierarchies

use console::Style;
use std::fmt::Write;

/// A node in a rendered tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    /// Ordered `(key, value)` annotations
    pub metadata: Vec<(String, String)>,
}

/// Role of a hierarchy node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Root,
    /// Drives mesh vertices
    Bone,
    /// Not a bone, but an ancestor of one
    Joint,
    /// Outside every bone subtree
    Node,
}

/// Options for tree rendering
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
    pub compact: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            no_color: false,
            show_metadata: true,
            compact: false,
        }
    }
}

impl TreeNode {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.push((key.to_string(), value.into()));
        self
    }
}

impl NodeType {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Root => "📁",
            Self::Bone => "🦴",
            Self::Joint => "🔗",
            Self::Node => "·",
        }
    }

    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                Self::Root => Style::new().bold().cyan(),
                Self::Bone => Style::new().green(),
                Self::Joint => Style::new().yellow(),
                Self::Node => Style::new().dim(),
            }
        }
    }
}

/// Render a tree structure to string
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    render_node(root, &mut output, "", true, 0, options);
    output
}

fn render_node(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) {
    if let Some(max_depth) = options.max_depth
        && depth > max_depth
    {
        return;
    }

    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    let _ = write!(
        output,
        "{}{}{} {}",
        prefix,
        connector,
        node.node_type.icon(),
        node.node_type.style(options.no_color).apply_to(&node.name)
    );

    if options.show_metadata && options.compact && !node.metadata.is_empty() {
        let parts: Vec<String> = node
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        let _ = write!(output, " [{}]", parts.join(", "));
    }
    output.push('\n');

    let child_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    if options.show_metadata && !options.compact {
        let meta_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        for (key, value) in &node.metadata {
            let _ = writeln!(
                output,
                "{}    {}",
                child_prefix,
                meta_style.apply_to(format!("{key}: {value}"))
            );
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        render_node(
            child,
            output,
            &child_prefix,
            i == node.children.len() - 1,
            depth + 1,
            options,
        );
    }
}
