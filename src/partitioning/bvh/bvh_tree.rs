use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};

/// A pair of sibling nodes.
///
/// Both children of a node are stored next to each other: the children of a node with
/// `children == i` are `nodes[i].left` and `nodes[i].right`.
#[derive(Copy, Clone, Debug)]
pub(super) struct BvhNodeWide {
    pub(super) left: BvhNode,
    pub(super) right: BvhNode,
}

impl BvhNodeWide {
    #[inline(always)]
    pub(super) fn zeros() -> Self {
        Self {
            left: BvhNode::zeros(),
            right: BvhNode::zeros(),
        }
    }

    /// The node whose children are `self.left` and `self.right`, stored at `my_id`.
    #[inline(always)]
    pub(super) fn merged(&self, my_id: u32) -> BvhNode {
        BvhNode {
            aabb: self.left.aabb.merged(&self.right.aabb),
            children: my_id,
            leaf_count: self.left.leaf_count + self.right.leaf_count,
        }
    }

    #[inline(always)]
    pub(super) fn as_array(&self) -> [&BvhNode; 2] {
        [&self.left, &self.right]
    }
}

/// A node of a [`Bvh`].
#[derive(Copy, Clone, Debug)]
pub struct BvhNode {
    pub(super) aabb: Aabb,
    /// The leaf data if `leaf_count == 1`, otherwise the index of the children pair.
    pub(super) children: u32,
    pub(super) leaf_count: u32,
}

impl BvhNode {
    #[inline(always)]
    pub(super) fn zeros() -> Self {
        Self {
            aabb: Aabb::new(Point::origin(), Point::origin()),
            children: 0,
            leaf_count: 0,
        }
    }

    /// Creates a leaf node with the given bounds and associated data.
    #[inline(always)]
    pub fn leaf(aabb: Aabb, data: u32) -> Self {
        Self {
            aabb,
            children: data,
            leaf_count: 1,
        }
    }

    /// The bounding box of this node.
    #[inline(always)]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// The center of the bounding box of this node.
    #[inline(always)]
    pub fn center(&self) -> Point<Real> {
        self.aabb.center()
    }

    /// Is this node a leaf?
    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        self.leaf_count == 1
    }

    /// The number of leaves below this node.
    #[inline(always)]
    pub fn leaf_count(&self) -> u32 {
        self.leaf_count
    }

    /// The data associated to this node if it is a leaf.
    #[inline(always)]
    pub fn leaf_data(&self) -> Option<u32> {
        self.is_leaf().then_some(self.children)
    }
}

/// A static bounding volume hierarchy of AABBs, built with a binned surface-area heuristic.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    pub(super) nodes: Vec<BvhNodeWide>,
}

impl Bvh {
    /// Builds a BVH with the given AABBs as leaves.
    ///
    /// Each leaf is associated an index equal to its position in the slice: the AABB
    /// `leaves[42]` is associated to the leaf with index 42.
    pub fn from_leaves(leaves: &[Aabb]) -> Self {
        let mut leaves: Vec<_> = leaves
            .iter()
            .enumerate()
            .map(|(i, aabb)| BvhNode::leaf(*aabb, i as u32))
            .collect();
        let mut result = Bvh::default();

        match leaves.len() {
            0 => {}
            1 => {
                let mut root = BvhNodeWide::zeros();
                root.left = leaves[0];
                result.nodes.push(root);
            }
            _ => {
                result.nodes.push(BvhNodeWide::zeros());
                result.rebuild_range_binned(0, &mut leaves);
            }
        }

        result
    }

    /// Does this BVH contain no leaf?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The number of leaves of this BVH.
    pub fn leaf_count(&self) -> u32 {
        self.nodes
            .first()
            .map(|root| root.left.leaf_count + root.right.leaf_count)
            .unwrap_or(0)
    }

    /// The bounding box of all the leaves of this BVH.
    pub fn root_aabb(&self) -> Aabb {
        match self.nodes.first() {
            None => Aabb::new_invalid(),
            Some(root) if root.right.leaf_count == 0 => root.left.aabb,
            Some(root) => root.left.aabb.merged(&root.right.aabb),
        }
    }
}
