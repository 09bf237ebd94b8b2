//! A static, immutable kd-tree over 3D points, used by the scanner to prune
//! per-template-atom candidate sets against region constraints.

use crate::{Region, Vec3};

enum NodeKind {
    /// Holds the single point of a one-element subtree.
    Leaf,
    /// Splits its subtree along `axis`; `left`/`right` index into the arena
    /// (`None` when the median split left that side empty).
    Internal { axis: usize, left: Option<usize>, right: Option<usize> },
}

struct Node {
    kind: NodeKind,
    /// The point associated with this node. An internal node's point is a real
    /// candidate excluded from both children by the median split, not a virtual
    /// pivot, so it must be tested for inclusion exactly like a leaf's.
    point: Vec3,
    point_index: usize,
    /// Axis-aligned bounding box of every point in this node's subtree.
    lo: Vec3,
    hi: Vec3,
}

/// An immutable kd-tree over `N` points in ℝ³.
///
/// Construction sorts indices by the splitting axis (cycling with depth, starting
/// at 0), picks the median, and advances it rightward through any run of points
/// sharing the splitting coordinate so that ties are broken deterministically
/// (equal-valued points land in the left subtree).
pub struct KdTree {
    nodes: Vec<Node>,
    root: usize,
    depth: usize,
}

impl KdTree {
    /// Builds a tree over `points`. Returns `None` for an empty input; queries
    /// against a missing tree simply yield no results (see [`KdTree::query`]).
    ///
    /// ```
    /// use jess_geom::{Annulus, KdTree, Vec3};
    /// let points = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)];
    /// let tree = KdTree::build(&points).unwrap();
    /// let hit: Vec<usize> = tree.query(Box::new(Annulus::new(Vec3::new(0.0, 0.0, 0.0), 0.0, 1.5))).collect();
    /// assert_eq!(hit.len(), 2);
    /// ```
    pub fn build(points: &[Vec3]) -> Option<KdTree> {
        if points.is_empty() {
            return None;
        }
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let mut max_depth = 0usize;
        let root = Self::build_rec(points, &mut indices, 0, &mut nodes, &mut max_depth);
        Some(KdTree { nodes, root, depth: max_depth + 1 })
    }

    fn build_rec(
        points: &[Vec3],
        indices: &mut [usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        max_depth: &mut usize,
    ) -> usize {
        *max_depth = (*max_depth).max(depth);

        if indices.len() == 1 {
            let p = points[indices[0]];
            nodes.push(Node { kind: NodeKind::Leaf, point: p, point_index: indices[0], lo: p, hi: p });
            return nodes.len() - 1;
        }

        let axis = depth % 3;
        indices.sort_by(|&a, &b| points[a][axis].partial_cmp(&points[b][axis]).unwrap());

        let mut median = indices.len() / 2;
        while median + 1 < indices.len() && points[indices[median]][axis] == points[indices[median + 1]][axis] {
            median += 1;
        }

        let pivot = indices[median];
        let (left_idx, rest) = indices.split_at_mut(median);
        let right_idx = &mut rest[1..];

        let left = if !left_idx.is_empty() {
            Some(Self::build_rec(points, left_idx, depth + 1, nodes, max_depth))
        } else {
            None
        };
        let right = if !right_idx.is_empty() {
            Some(Self::build_rec(points, right_idx, depth + 1, nodes, max_depth))
        } else {
            None
        };

        let point = points[pivot];
        let mut lo = point;
        let mut hi = point;
        for child in [left, right].into_iter().flatten() {
            let c = &nodes[child];
            for i in 0..3 {
                lo[i] = lo[i].min(c.lo[i]);
                hi[i] = hi[i].max(c.hi[i]);
            }
        }

        nodes.push(Node { kind: NodeKind::Internal { axis, left, right }, point, point_index: pivot, lo, hi });
        nodes.len() - 1
    }

    /// Depth of the tree (root at depth 1), used only to pre-size query stacks.
    pub fn depth(&self) -> usize { self.depth }

    /// Runs a region query, returning a pull-based iterator over point indices.
    ///
    /// The region is consumed: ownership transfers to the query, mirroring the
    /// reference engine's single-use query objects. Traversal pushes the left
    /// child then the right child, so right is popped first; callers must not
    /// assume any particular result order.
    pub fn query(&self, region: Box<dyn Region>) -> RegionQuery<'_> {
        RegionQuery { tree: self, region, stack: self.fresh_stack() }
    }

    /// A stack pre-seeded with the root, pre-sized to this tree's depth.
    ///
    /// Lets a caller that cannot hold a borrow of the tree alongside its
    /// query state (the scanner interleaves queries over several trees it
    /// owns) drive a traversal itself via [`KdTree::step`].
    pub fn fresh_stack(&self) -> Vec<usize> {
        let mut stack = Vec::with_capacity(self.depth);
        stack.push(self.root);
        stack
    }

    /// Advances an explicit-stack traversal by one step, returning the next
    /// matching point index or `None` once `stack` is exhausted.
    pub fn step(&self, region: &dyn Region, stack: &mut Vec<usize>) -> Option<usize> {
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            let hit = if region.inclusion(&node.point) { Some(node.point_index) } else { None };

            if let NodeKind::Internal { left, right, .. } = node.kind {
                if region.intersection(&node.lo, &node.hi) {
                    if let Some(l) = left { stack.push(l); }
                    if let Some(r) = right { stack.push(r); }
                }
            }

            if hit.is_some() {
                return hit;
            }
        }
        None
    }
}

/// An explicit-stack, resumable traversal of a [`KdTree`] against a region.
///
/// This is deliberately not implemented via recursion: the scanner suspends a
/// query mid-traversal between calls to its own step function, so the stack must
/// be inspectable state rather than hidden call-stack frames.
pub struct RegionQuery<'a> {
    tree: &'a KdTree,
    region: Box<dyn Region>,
    stack: Vec<usize>,
}

impl<'a> Iterator for RegionQuery<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.tree.step(self.region.as_ref(), &mut self.stack)
    }
}
