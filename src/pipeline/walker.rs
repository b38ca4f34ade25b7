//! Pre-order traversal over content trees.
//!
//! Read-only walks return references into the original tree, in document
//! order, so two walks over an unchanged tree yield equal sequences. The
//! mutable helpers locate a single node by id; they are what the image stage
//! uses to write results back after its fan-out.

use crate::model::{ContentNode, LayoutNode};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

/// An image node to resolve, addressed by slide index and node id.
///
/// Carries only owned data so it can move into a concurrent task while the
/// tree itself stays with the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub slide_index: usize,
    pub node_id: String,
    /// Content hint: the node's current alt text, falling back to its name.
    pub hint: String,
}

/// Collect every node matching `predicate`, in pre-order.
pub fn find_nodes<'a, P>(root: &'a ContentNode, predicate: P) -> Vec<&'a ContentNode>
where
    P: Fn(&ContentNode) -> bool,
{
    let mut found = Vec::new();
    visit(root, &predicate, &mut found);
    found
}

fn visit<'a, P>(node: &'a ContentNode, predicate: &P, found: &mut Vec<&'a ContentNode>)
where
    P: Fn(&ContentNode) -> bool,
{
    if predicate(node) {
        found.push(node);
    }
    for child in node.children() {
        visit(child, predicate, found);
    }
}

/// Every `image` node under `root`, in document order.
pub fn find_images(root: &ContentNode) -> Vec<&ContentNode> {
    find_nodes(root, ContentNode::is_image)
}

/// Find the node with `id` under `root`.
pub fn find_node_mut<'a>(root: &'a mut ContentNode, id: &str) -> Option<&'a mut ContentNode> {
    if root.id == id {
        return Some(root);
    }
    root.children_mut()
        .iter_mut()
        .find_map(|child| find_node_mut(child, id))
}

/// Apply `f` to every node under `root`, in pre-order.
pub fn for_each_mut<F>(root: &mut ContentNode, f: &mut F)
where
    F: FnMut(&mut ContentNode),
{
    f(root);
    for child in root.children_mut() {
        for_each_mut(child, f);
    }
}

/// Image targets across all slides, slide by slide in document order.
pub fn image_targets(slides: &[LayoutNode]) -> Vec<ImageTarget> {
    slides
        .iter()
        .enumerate()
        .flat_map(|(slide_index, slide)| {
            find_images(slide.content())
                .into_iter()
                .map(move |node| ImageTarget {
                    slide_index,
                    node_id: node.id.clone(),
                    hint: image_hint(node),
                })
        })
        .collect()
}

fn image_hint(node: &ContentNode) -> String {
    node.alt
        .as_deref()
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
        .unwrap_or(node.name.trim())
        .to_string()
}

/// Give every duplicated or empty slide/node id a fresh UUID.
///
/// The first occurrence of an id keeps it. Returns the number of ids replaced.
pub fn ensure_unique_ids(slides: &mut [LayoutNode]) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    let mut replaced = 0;

    let mut claim = |id: &mut String| {
        if id.is_empty() || !seen.insert(id.clone()) {
            let fresh = Uuid::new_v4().to_string();
            warn!("Replacing duplicate id '{}' with '{}'", id, fresh);
            seen.insert(fresh.clone());
            *id = fresh;
            replaced += 1;
        }
    };

    for slide in slides.iter_mut() {
        claim(&mut slide.id);
        for_each_mut(slide.content_mut(), &mut |node: &mut ContentNode| {
            claim(&mut node.id)
        });
    }
    replaced
}
