use crate::mesh::Triangle;

const MAX_LEAF_TRIANGLES: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    fn empty() -> Self {
        Aabb {
            min: [f64::MAX; 3],
            max: [f64::MIN; 3],
        }
    }

    fn grow(&mut self, min: [f64; 3], max: [f64; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(min[i]);
            self.max[i] = self.max[i].max(max[i]);
        }
    }

    fn longest_axis(&self) -> usize {
        let extent = [0, 1, 2].map(|i| self.max[i] - self.min[i]);
        if extent[0] >= extent[1] && extent[0] >= extent[2] {
            0
        } else if extent[1] >= extent[2] {
            1
        } else {
            2
        }
    }

    /// Whether a ray from `origin` along +Z can enter the box.
    pub fn hit_by_up_ray(&self, origin: [f64; 3]) -> bool {
        self.min[0] <= origin[0]
            && origin[0] <= self.max[0]
            && self.min[1] <= origin[1]
            && origin[1] <= self.max[1]
            && origin[2] <= self.max[2]
    }
}

#[derive(Debug)]
enum BvhNode {
    Leaf {
        bounds: Aabb,
        triangles: Vec<usize>,
    },
    Branch {
        bounds: Aabb,
        children: [Box<BvhNode>; 2],
    },
}

impl BvhNode {
    fn build(triangles: &[Triangle], mut indices: Vec<usize>) -> Self {
        let mut bounds = Aabb::empty();
        let mut centroids = Aabb::empty();
        for &i in &indices {
            bounds.grow(triangles[i].min(), triangles[i].max());
            let c = triangles[i].centroid();
            centroids.grow(c, c);
        }

        if indices.len() <= MAX_LEAF_TRIANGLES {
            return BvhNode::Leaf {
                bounds,
                triangles: indices,
            };
        }

        // Median split on the axis where the centroids spread the most.
        let axis = centroids.longest_axis();
        indices.sort_by(|a, b| {
            triangles[*a].centroid()[axis].total_cmp(&triangles[*b].centroid()[axis])
        });
        let right = indices.split_off(indices.len() / 2);

        BvhNode::Branch {
            bounds,
            children: [
                Box::new(BvhNode::build(triangles, indices)),
                Box::new(BvhNode::build(triangles, right)),
            ],
        }
    }

    fn bounds(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Branch { bounds, .. } => bounds,
        }
    }

    fn count_up_hits(&self, triangles: &[Triangle], origin: [f64; 3]) -> usize {
        if !self.bounds().hit_by_up_ray(origin) {
            return 0;
        }
        match self {
            BvhNode::Leaf {
                triangles: indices, ..
            } => indices
                .iter()
                .filter(|i| triangles[**i].hit_by_up_ray(origin))
                .count(),
            BvhNode::Branch { children, .. } => children
                .iter()
                .map(|child| child.count_up_hits(triangles, origin))
                .sum(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { children, .. } => {
                1 + children.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
        }
    }
}

/// Bounding volume hierarchy over triangles for vertical ray queries.
#[derive(Debug)]
pub struct Bvh {
    triangles: Vec<Triangle>,
    root: Option<BvhNode>,
}

impl Bvh {
    pub fn build(triangles: Vec<Triangle>) -> Self {
        let root = (!triangles.is_empty())
            .then(|| BvhNode::build(&triangles, (0..triangles.len()).collect()));
        Bvh { triangles, root }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounds(&self) -> Option<&Aabb> {
        self.root.as_ref().map(BvhNode::bounds)
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map(BvhNode::depth).unwrap_or(0)
    }

    /// Number of triangles crossed by the ray from `origin` along +Z.
    pub fn count_up_hits(&self, origin: [f64; 3]) -> usize {
        self.root
            .as_ref()
            .map(|root| root.count_up_hits(&self.triangles, origin))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A stack of unit triangles at z = 0, 1, ... n-1 over the XY origin.
    fn stack(n: usize) -> Vec<Triangle> {
        (0..n)
            .map(|i| {
                let z = i as f64;
                Triangle::new([0.0, 0.0, z], [1.0, 0.0, z], [0.0, 1.0, z])
            })
            .collect()
    }

    #[test]
    fn counts_match_brute_force() {
        let triangles = stack(37);
        let bvh = Bvh::build(triangles.clone());
        assert!(bvh.depth() > 1);
        for origin in [
            [0.2, 0.2, -1.0],
            [0.2, 0.2, 10.5],
            [0.2, 0.2, 36.5],
            [0.9, 0.9, 0.0],
            [5.0, 5.0, 0.0],
        ] {
            let brute = triangles.iter().filter(|t| t.hit_by_up_ray(origin)).count();
            assert_eq!(bvh.count_up_hits(origin), brute, "origin {:?}", origin);
        }
        assert_eq!(bvh.count_up_hits([0.2, 0.2, -1.0]), 37);
        assert_eq!(bvh.count_up_hits([0.2, 0.2, 10.5]), 26);
    }

    #[test]
    fn bounds_cover_all_triangles() {
        let bvh = Bvh::build(stack(9));
        let bounds = bvh.bounds().unwrap();
        assert_eq!(bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(bounds.max, [1.0, 1.0, 8.0]);
    }

    #[test]
    fn empty_tree() {
        let bvh = Bvh::build(Vec::new());
        assert!(bvh.is_empty());
        assert_eq!(bvh.depth(), 0);
        assert_eq!(bvh.count_up_hits([0.0; 3]), 0);
    }
}
