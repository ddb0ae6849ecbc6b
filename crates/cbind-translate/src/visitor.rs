//! Depth-bounded traversal over cursors.

use std::cell::Cell;

use cbind_ast::{ChildVisit, Cursor};

/// Traversal rooted at one cursor.
///
/// [`Visitor::visit`] follows the `Break`/`Continue`/`Recurse` protocol of
/// [`Cursor::visit_children`], refusing to descend past `max_depth` levels
/// below the root. [`Visitor::children`] and [`Visitor::declarations`] are
/// lazy views of the direct children; the unit is immutable, so calling
/// them again restarts from the first child.
#[derive(Debug)]
pub struct Visitor<'tu> {
    root: Cursor<'tu>,
    max_depth: usize,
    depth_limited: Cell<bool>,
}

impl<'tu> Visitor<'tu> {
    #[must_use]
    pub const fn new(root: Cursor<'tu>, max_depth: usize) -> Self {
        Self {
            root,
            max_depth,
            depth_limited: Cell::new(false),
        }
    }

    /// Walk the subtree; returns `true` when the walk ended on `Break`.
    pub fn visit<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(Cursor<'tu>, Cursor<'tu>) -> ChildVisit,
    {
        // Children of the cursor on top of the stack sit at its depth.
        let mut depths: Vec<(Cursor<'tu>, usize)> = vec![(self.root, 1)];
        self.root.visit_children(|child, parent| {
            while depths.last().is_some_and(|(cursor, _)| *cursor != parent) {
                depths.pop();
            }
            let depth = depths.last().map_or(1, |(_, depth)| *depth);
            match visit(child, parent) {
                ChildVisit::Recurse if depth >= self.max_depth => {
                    if !self.depth_limited.replace(true) {
                        tracing::warn!(
                            max_depth = self.max_depth,
                            cursor = %child.spelling(),
                            "not descending past the depth limit"
                        );
                    }
                    ChildVisit::Continue
                }
                ChildVisit::Recurse => {
                    depths.push((child, depth + 1));
                    ChildVisit::Recurse
                }
                other => other,
            }
        })
    }

    /// Direct children as `(cursor, parent)` pairs.
    pub fn children(&self) -> impl Iterator<Item = (Cursor<'tu>, Cursor<'tu>)> + use<'tu> {
        let root = self.root;
        root.children().map(move |child| (child, root))
    }

    /// Direct children that are declarations.
    pub fn declarations(&self) -> impl Iterator<Item = (Cursor<'tu>, Cursor<'tu>)> + use<'tu> {
        self.children()
            .filter(|(child, _)| child.kind().is_declaration())
    }

    /// Whether a `Recurse` was refused because of the depth limit.
    #[must_use]
    pub fn depth_limited(&self) -> bool {
        self.depth_limited.get()
    }
}
