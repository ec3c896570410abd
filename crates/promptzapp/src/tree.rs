//! # Category Tree
//!
//! Categories are stored flat, each named by its full path. The tree is derived
//! on demand and never stored: [`build_tree`] synthesizes one node for every
//! unique prefix of every category path, including prefixes that are not
//! categories themselves.
//!
//! ```text
//! ["default", "art/sketch", "art/paint"]
//!
//! art            (implicit)
//! ├── paint
//! └── sketch
//! default
//! ```
//!
//! Siblings are ordered by name (case-insensitive first, then by raw string to
//! break ties), so the same set of categories always yields the same tree no
//! matter how the input list is ordered.

use crate::model::Category;
use crate::path::split_path;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTreeNode {
    /// Last path segment.
    pub name: String,
    pub full_name: String,
    /// True when `full_name` is a real category rather than a synthesized prefix.
    pub explicit: bool,
    pub children: Vec<CategoryTreeNode>,
}

impl CategoryTreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first search by full path.
    pub fn find(&self, full_name: &str) -> Option<&CategoryTreeNode> {
        if self.full_name == full_name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(full_name))
    }
}

struct ArenaNode {
    name: String,
    full_name: String,
    explicit: bool,
    children: Vec<usize>,
}

pub fn build_tree(categories: &[Category]) -> Vec<CategoryTreeNode> {
    let mut arena: Vec<ArenaNode> = Vec::new();
    let mut by_path: HashMap<String, usize> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();

    for category in categories {
        let segments = split_path(&category.name);
        let mut accumulated = String::new();
        let mut parent: Option<usize> = None;

        for (depth, segment) in segments.iter().enumerate() {
            if !accumulated.is_empty() {
                accumulated.push('/');
            }
            accumulated.push_str(segment);

            let idx = match by_path.get(&accumulated) {
                Some(&idx) => idx,
                None => {
                    let idx = arena.len();
                    arena.push(ArenaNode {
                        name: segment.to_string(),
                        full_name: accumulated.clone(),
                        explicit: false,
                        children: Vec::new(),
                    });
                    by_path.insert(accumulated.clone(), idx);
                    match parent {
                        Some(p) => arena[p].children.push(idx),
                        None => roots.push(idx),
                    }
                    idx
                }
            };

            if depth + 1 == segments.len() {
                arena[idx].explicit = true;
            }
            parent = Some(idx);
        }
    }

    let mut forest: Vec<CategoryTreeNode> =
        roots.into_iter().map(|idx| materialize(&arena, idx)).collect();
    forest.sort_by(|a, b| compare_names(&a.name, &b.name));
    forest
}

fn materialize(arena: &[ArenaNode], idx: usize) -> CategoryTreeNode {
    let node = &arena[idx];
    let mut children: Vec<CategoryTreeNode> = node
        .children
        .iter()
        .map(|&child| materialize(arena, child))
        .collect();
    children.sort_by(|a, b| compare_names(&a.name, &b.name));

    CategoryTreeNode {
        name: node.name.clone(),
        full_name: node.full_name.clone(),
        explicit: node.explicit,
        children,
    }
}

/// Orders segment names case-insensitively, falling back to a byte
/// comparison so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(names: &[&str]) -> Vec<Category> {
        names.iter().map(|n| Category::new(*n)).collect()
    }

    fn names(nodes: &[CategoryTreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_implicit_parent_is_synthesized() {
        let tree = build_tree(&categories(&["default", "art/sketch", "art/paint"]));

        assert_eq!(names(&tree), vec!["art", "default"]);
        let art = &tree[0];
        assert_eq!(art.full_name, "art");
        assert!(!art.explicit);
        assert_eq!(names(&art.children), vec!["paint", "sketch"]);
        assert_eq!(art.children[1].full_name, "art/sketch");
        assert!(art.children[1].explicit);
        assert!(art.children[1].is_leaf());
    }

    #[test]
    fn test_explicit_parent_and_deep_paths() {
        let tree = build_tree(&categories(&["a/b/c", "a", "a/b/d"]));
        assert_eq!(tree.len(), 1);
        let a = &tree[0];
        assert!(a.explicit);
        let b = &a.children[0];
        assert!(!b.explicit);
        assert_eq!(names(&b.children), vec!["c", "d"]);
        assert_eq!(a.find("a/b/d").map(|n| n.name.as_str()), Some("d"));
    }

    #[test]
    fn test_tree_is_independent_of_input_order() {
        let base = ["default", "art/sketch", "art/paint", "Zoo", "art", "b/x/y", "b/a"];
        let expected = build_tree(&categories(&base));

        // Every rotation and the reversed list
        for shift in 0..base.len() {
            let mut rotated = base.to_vec();
            rotated.rotate_left(shift);
            assert_eq!(build_tree(&categories(&rotated)), expected);
        }
        let mut reversed = base.to_vec();
        reversed.reverse();
        assert_eq!(build_tree(&categories(&reversed)), expected);
    }

    #[test]
    fn test_sibling_order_is_case_insensitive() {
        let tree = build_tree(&categories(&["beta", "Alpha", "alpha", "Gamma"]));
        assert_eq!(names(&tree), vec!["Alpha", "alpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        let tree = build_tree(&categories(&["/x//y/"]));
        assert_eq!(tree[0].full_name, "x");
        assert_eq!(tree[0].children[0].full_name, "x/y");
    }
}
