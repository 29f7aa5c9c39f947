use pcd_core::{pointcloud::cloud::AsprCloud, Error, Result};

use crate::tester::CropIndex;

/// Crops an already materialized cloud, keeping points inside (or outside)
/// the index's solids.
pub fn crop_cloud(cloud: &AsprCloud, index: &CropIndex, inside: bool) -> Result<AsprCloud> {
    if cloud.is_empty() {
        return Err(Error::EmptyCloud);
    }

    let mask: Vec<bool> = cloud
        .points()
        .iter()
        .map(|p| index.classify(p.xyz(), inside))
        .collect();
    cloud.filter_by_mask(&mask)
}
