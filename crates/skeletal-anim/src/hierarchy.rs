//! Scene node hierarchy
//!
//! Nodes are stored in an arena indexed by `usize`, with the root at index 0.
//! Each node carries its static local transform from import, and a derived
//! "required" flag marking nodes that are bones or ancestors of bones.

use std::collections::HashMap;

use glam::Mat4;

use crate::error::{AnimError, Result};

/// Index of the root node
pub const ROOT: usize = 0;

/// One node in the imported scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    transform: Mat4,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Static local transform relative to the parent
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

/// Tree of named nodes
#[derive(Debug, Clone)]
pub struct NodeHierarchy {
    nodes: Vec<Node>,
    by_name: HashMap<String, usize>,
    required: Vec<bool>,
}

impl NodeHierarchy {
    /// Create a hierarchy holding only a root node
    pub fn new(root_name: impl Into<String>, root_transform: Mat4) -> Self {
        let name = root_name.into();
        let mut by_name = HashMap::new();
        by_name.insert(name.clone(), ROOT);

        Self {
            nodes: vec![Node {
                name,
                transform: root_transform,
                parent: None,
                children: Vec::new(),
            }],
            by_name,
            required: vec![false],
        }
    }

    /// Append a child to `parent` and return its index
    pub fn add_child(
        &mut self,
        parent: usize,
        name: impl Into<String>,
        transform: Mat4,
    ) -> Result<usize> {
        let name = name.into();

        if parent >= self.nodes.len() {
            return Err(AnimError::MissingNode {
                name: format!("#{parent}"),
            });
        }
        if self.by_name.contains_key(&name) {
            return Err(AnimError::DuplicateNode { name });
        }

        let index = self.nodes.len();
        self.by_name.insert(name.clone(), index);
        self.nodes.push(Node {
            name,
            transform,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.required.push(false);
        self.nodes[parent].children.push(index);

        Ok(index)
    }

    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a hierarchy has at least a root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the node called `name`
    pub fn find(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Depth of a node, the root being at depth 0
    pub fn depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(index).and_then(Node::parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent].parent;
        }
        depth
    }

    /// Mark the node called `name` and every ancestor up to the root as
    /// required
    pub fn mark_required(&mut self, name: &str) -> Result<()> {
        let Some(start) = self.find(name) else {
            return Err(AnimError::MissingNode {
                name: name.to_string(),
            });
        };

        let mut current = Some(start);
        while let Some(index) = current {
            if self.required[index] {
                // Ancestors were marked by an earlier bone
                break;
            }
            self.required[index] = true;
            current = self.nodes[index].parent;
        }

        Ok(())
    }

    pub fn is_required(&self, index: usize) -> bool {
        self.required.get(index).copied().unwrap_or(false)
    }

    pub fn required_count(&self) -> usize {
        self.required.iter().filter(|&&r| r).count()
    }

    /// Node indices in depth-first pre-order
    pub fn depth_first(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.nodes[index].children.iter().rev());
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sample_hierarchy() -> NodeHierarchy {
        // Root
        // ├── Hips
        // │   ├── Spine
        // │   │   └── Arm
        // │   └── Leg
        // └── Camera
        let mut h = NodeHierarchy::new("Root", Mat4::IDENTITY);
        let hips = h.add_child(ROOT, "Hips", Mat4::IDENTITY).unwrap();
        let spine = h.add_child(hips, "Spine", Mat4::IDENTITY).unwrap();
        h.add_child(spine, "Arm", Mat4::IDENTITY).unwrap();
        h.add_child(hips, "Leg", Mat4::IDENTITY).unwrap();
        h.add_child(ROOT, "Camera", Mat4::from_translation(Vec3::Z))
            .unwrap();
        h
    }

    #[test]
    fn test_add_and_find() {
        let h = sample_hierarchy();
        assert_eq!(h.len(), 6);
        assert_eq!(h.root().name(), "Root");

        let arm = h.find("Arm").unwrap();
        assert_eq!(h.node(arm).unwrap().name(), "Arm");
        assert_eq!(h.depth(arm), 3);
        assert_eq!(h.find("Tail"), None);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut h = sample_hierarchy();
        let result = h.add_child(ROOT, "Spine", Mat4::IDENTITY);
        assert!(matches!(result, Err(AnimError::DuplicateNode { .. })));
    }

    #[test]
    fn test_mark_required_walks_to_root() {
        let mut h = sample_hierarchy();
        h.mark_required("Arm").unwrap();

        for name in ["Root", "Hips", "Spine", "Arm"] {
            assert!(h.is_required(h.find(name).unwrap()), "{name}");
        }
        for name in ["Leg", "Camera"] {
            assert!(!h.is_required(h.find(name).unwrap()), "{name}");
        }
        assert_eq!(h.required_count(), 4);

        h.mark_required("Leg").unwrap();
        assert_eq!(h.required_count(), 5);
    }

    #[test]
    fn test_mark_required_missing_bone() {
        let mut h = sample_hierarchy();
        let result = h.mark_required("Tail");
        assert!(matches!(result, Err(AnimError::MissingNode { name }) if name == "Tail"));
    }

    #[test]
    fn test_depth_first_order() {
        let h = sample_hierarchy();
        let names: Vec<&str> = h
            .depth_first()
            .into_iter()
            .map(|i| h.nodes()[i].name())
            .collect();
        assert_eq!(names, ["Root", "Hips", "Spine", "Arm", "Leg", "Camera"]);
    }
}
