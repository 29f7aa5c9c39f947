use std::{path::Path, time::Instant};

use pcd_core::pointcloud::{
    cloud::{AsprCloud, DecodedCloud, PointAttributes},
    decimation::density::DensityMask,
    metadata::{Header, LasSource, PointFormatCapabilities},
    point::Point,
};
use pcd_crop::CropIndex;

use super::{ImportOptions, Parser};
use crate::error::{ParseError, Result};
use crate::reader::{
    las::{check_extension, read_source, LasPointReader},
    PointReader,
};

// Upper bound on points reserved up front; the header count is not trusted.
const MAX_PREALLOCATED_POINTS: u64 = 1 << 20;

/// Reads `header.point_count()` records from `reader`, keeping those selected
/// by the density mask and, when `crop` is given, by the crop test.
///
/// Every record is read even when it is skipped, so the mask stays aligned
/// with file order.
pub fn decode<R: PointReader>(
    reader: &mut R,
    header: &Header,
    capabilities: PointFormatCapabilities,
    density: f32,
    crop: Option<&CropIndex>,
    want_inside: bool,
) -> Result<DecodedCloud> {
    let mut mask = DensityMask::new(density)?;
    let expected = header.point_count();
    let capacity = mask.expected_count(expected).min(MAX_PREALLOCATED_POINTS) as usize;

    let mut points = Vec::with_capacity(capacity);
    let mut attributes = PointAttributes::with_capacity(capacity, capabilities);
    let mut cropped = 0;

    for read in 0..expected {
        let Some(raw) = reader.next_point()? else {
            return Err(ParseError::TruncatedPointStream { expected, read });
        };
        if !mask.select() {
            continue;
        }
        if let Some(index) = crop {
            if !index.classify([raw.x, raw.y, raw.z], want_inside) {
                cropped += 1;
                continue;
            }
        }

        points.push(Point::new(raw.x, raw.y, raw.z));
        attributes.intensity.push(raw.intensity);
        attributes.classification.push(raw.classification);
        attributes.number_of_returns.push(raw.number_of_returns);
        if let Some(rgb) = attributes.rgb.as_mut() {
            let [red, green, blue] = raw.color.unwrap_or_default();
            rgb.push(red, green, blue);
        }
    }

    log::debug!(
        "kept {} of {} records at density {} ({} cropped)",
        points.len(),
        expected,
        density,
        cropped
    );
    Ok(DecodedCloud { points, attributes })
}

/// Decodes one LAS/LAZ file with a fixed set of import options.
pub struct LasParser<'a> {
    source: &'a LasSource,
    options: ImportOptions,
    crop: Option<&'a CropIndex>,
}

impl<'a> LasParser<'a> {
    pub fn new(source: &'a LasSource, options: ImportOptions, crop: Option<&'a CropIndex>) -> Self {
        Self {
            source,
            options,
            crop,
        }
    }
}

impl Parser for LasParser<'_> {
    fn parse(&self) -> Result<DecodedCloud> {
        let start = Instant::now();
        let mut reader = LasPointReader::open(&self.source.path)?;
        let decoded = decode(
            &mut reader,
            &self.source.header,
            self.source.capabilities(),
            self.options.density,
            self.crop,
            self.options.inside,
        )?;
        log::info!(
            "Decoded {} points from {} in {:?}",
            decoded.len(),
            self.source.path.display(),
            start.elapsed()
        );
        Ok(decoded)
    }
}

/// Opens a LAS/LAZ file as a cloud with no points yet.
pub fn open_cloud(path: &Path) -> Result<AsprCloud> {
    check_extension(path)?;
    let source = read_source(path)?;
    Ok(AsprCloud::new(source))
}

/// Re-reads the cloud's file and replaces its contents.
///
/// The cloud is left as it was if anything fails.
pub fn materialize(
    cloud: &mut AsprCloud,
    options: &ImportOptions,
    crop: Option<&CropIndex>,
) -> Result<()> {
    let source = cloud.source().ok_or(ParseError::NotFileBacked)?;
    let decoded = LasParser::new(source, *options, crop).parse()?;
    cloud.set_contents(decoded, options.density)?;
    Ok(())
}

/// Opens and materializes a file at preview density without cropping.
pub fn preview(path: &Path) -> Result<AsprCloud> {
    let mut cloud = open_cloud(path)?;
    materialize(&mut cloud, &ImportOptions::preview(), None)?;
    Ok(cloud)
}
