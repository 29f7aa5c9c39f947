use crate::bvh::Bvh;
use crate::mesh::CropMesh;

/// Point-in-solid test against a set of closed crop meshes.
///
/// A point is inside when a ray cast from it along +Z crosses the merged
/// surface an odd number of times. Rays that graze a vertex or an edge are
/// counted per triangle, so points exactly below one may be misclassified.
#[derive(Debug)]
pub struct CropIndex {
    bvh: Bvh,
}

impl CropIndex {
    /// Returns `None` when there is nothing to crop against.
    pub fn build(meshes: &[CropMesh]) -> Option<Self> {
        if meshes.is_empty() {
            return None;
        }

        let merged = CropMesh::merge(meshes);
        let triangles = merged.triangulate();
        if triangles.is_empty() {
            log::warn!("crop meshes have no usable faces, every point is outside");
        }

        let bvh = Bvh::build(triangles);
        log::debug!(
            "crop index: {} meshes, {} triangles, depth {}",
            meshes.len(),
            bvh.len(),
            bvh.depth()
        );
        Some(Self { bvh })
    }

    pub fn triangle_count(&self) -> usize {
        self.bvh.len()
    }

    pub fn hit_count(&self, point: [f64; 3]) -> usize {
        self.bvh.count_up_hits(point)
    }

    pub fn contains(&self, point: [f64; 3]) -> bool {
        self.hit_count(point) % 2 == 1
    }

    /// Whether a point survives the crop.
    pub fn classify(&self, point: [f64; 3], want_inside: bool) -> bool {
        self.contains(point) == want_inside
    }
}
