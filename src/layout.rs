//! Layout resolver
//!
//! One forward pass, run for each element right after it is attached. The
//! parent and the previous sibling come earlier in document order, so their
//! boxes are already resolved. Nothing is re-laid out afterwards, neither on
//! later insertions nor on window resize.

use crate::dom::{Document, NodeId};

/// Gap between a container's edge and its auto-placed content.
pub const INSET: f32 = 10.0;

/// Tag of the root container, which is never auto-placed.
pub const ROOT_TAG: &str = "window";

/// Resolves position and size of `id` from its declared box, its style, its
/// parent and its previous sibling.
pub fn resolve(doc: &mut Document, id: NodeId) {
    let node = doc.node(id);
    let parent = node.parent.map(|p| doc.node(p).frame);
    let prev = node.prev_sibling.map(|s| doc.node(s).frame);
    let is_root = node.tag == ROOT_TAG;
    let style_width = node.style.width;
    let style_height = node.style.height;

    let frame = &mut doc.node_mut(id).frame;

    // position
    if frame.x == 0.0 && frame.y == 0.0 {
        if let (false, Some(parent)) = (is_root, parent) {
            frame.rel_x = parent.rel_x + INSET;
            frame.rel_y = parent.rel_y + INSET;
            if let Some(prev) = prev {
                frame.rel_y += prev.rel_y + prev.height;
            }
        }
    } else {
        frame.rel_x = frame.x;
        frame.rel_y = frame.y;
    }

    // width
    if frame.width == 0.0 {
        if style_width != 0.0 {
            frame.width = style_width;
        } else if let Some(parent) = parent {
            frame.width = parent.width - INSET * 2.0;
        }
    }

    // height
    if frame.height == 0.0 && style_height != 0.0 {
        frame.height = style_height;
    }
}

/// Prints the resolved box of every element below `start`, indented by depth.
pub fn print_report(doc: &Document, start: NodeId) {
    report_node(doc, start, 0);
}

fn report_node(doc: &Document, id: NodeId, indent: usize) {
    let node = doc.node(id);
    let f = node.frame;
    let prefix = " ".repeat(indent);
    let label = if node.name.is_empty() {
        String::new()
    } else {
        format!(" name='{}'", node.name)
    };
    println!(
        "{}{:?} <{}>{} -> (x={}, y={}, w={}, h={})",
        prefix, node.kind, node.tag, label, f.rel_x, f.rel_y, f.width, f.height
    );
    for child in doc.children(id) {
        report_node(doc, child, indent + 2);
    }
}
