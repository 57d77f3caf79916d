use super::BvhNode;
use crate::math::Real;
use crate::partitioning::Bvh;
use ordered_float::OrderedFloat;
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

const TRAVERSAL_STACK_SIZE: usize = 32;

/// Iterator through the leaves of a [`Bvh`] whose ancestors all pass a check.
pub struct Leaves<'a, Check: Fn(&BvhNode) -> bool> {
    tree: &'a Bvh,
    next: Option<&'a BvhNode>,
    stack: SmallVec<[&'a BvhNode; TRAVERSAL_STACK_SIZE]>,
    check: Check,
}

impl<'a, Check: Fn(&BvhNode) -> bool> Leaves<'a, Check> {
    fn new(tree: &'a Bvh, check: Check) -> Leaves<'a, Check> {
        let mut stack = SmallVec::default();
        let mut next = None;

        if let Some(root) = tree.nodes.first() {
            if check(&root.left) {
                next = Some(&root.left);
            }

            if root.right.leaf_count() > 0 && check(&root.right) {
                stack.push(&root.right);
            }
        }

        Leaves {
            tree,
            next,
            stack,
            check,
        }
    }
}

impl<Check: Fn(&BvhNode) -> bool> Iterator for Leaves<'_, Check> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.next.is_none() {
                self.next = self.stack.pop();
            }

            let node = self.next.take()?;

            if node.is_leaf() {
                return Some(node.children);
            }

            let children = &self.tree.nodes[node.children as usize];

            if (self.check)(&children.left) {
                self.next = Some(&children.left);
            }

            if (self.check)(&children.right) {
                if self.next.is_none() {
                    self.next = Some(&children.right);
                } else {
                    self.stack.push(&children.right);
                }
            }
        }
    }
}

impl Bvh {
    /// Iterates through the leaves, in depth-first order.
    ///
    /// The `check_node` closure is called on every traversed node. If it returns `false` then the
    /// node and all its descendants won’t be iterated on.
    pub fn leaves<F: Fn(&BvhNode) -> bool>(&self, check_node: F) -> Leaves<'_, F> {
        Leaves::new(self, check_node)
    }

    /// Finds the leaf with the smallest cost, visiting nodes in best-first order.
    ///
    /// `node_cost` must be a lower bound of the cost of every leaf below the node (e.g. the
    /// distance from a query point to the node AABB). `leaf_cost` computes the exact cost of a
    /// leaf, or `None` to reject it. Among leaves with equal costs, the first one found wins.
    pub fn find_best(
        &self,
        max_cost: Real,
        node_cost: impl Fn(&BvhNode) -> Real,
        mut leaf_cost: impl FnMut(u32) -> Option<Real>,
    ) -> Option<(u32, Real)> {
        let mut queue = BinaryHeap::new();
        let mut best = None;
        let mut best_cost = max_cost;

        if let Some(root) = self.nodes.first() {
            for (side, node) in root.as_array().into_iter().enumerate() {
                if node.leaf_count() > 0 {
                    queue.push(Reverse((OrderedFloat(node_cost(node)), 0u32, side)));
                }
            }
        }

        while let Some(Reverse((cost, wide_id, side))) = queue.pop() {
            if cost.0 >= best_cost {
                break;
            }

            let node = self.nodes[wide_id as usize].as_array()[side];

            if let Some(leaf) = node.leaf_data() {
                if let Some(cost) = leaf_cost(leaf) {
                    if cost < best_cost {
                        best_cost = cost;
                        best = Some((leaf, cost));
                    }
                }
            } else {
                for (child_side, child) in self.nodes[node.children as usize]
                    .as_array()
                    .into_iter()
                    .enumerate()
                {
                    let child_cost = node_cost(child);
                    if child_cost < best_cost {
                        queue.push(Reverse((OrderedFloat(child_cost), node.children, child_side)));
                    }
                }
            }
        }

        best
    }
}
