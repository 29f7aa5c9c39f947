use std::{fs, path::Path};

use las::{point::Classification, point::Format, Builder, Transform, Vector, Writer};
use pcd_core::pointcloud::cloud::AsprCloud;

use crate::error::{ExportError, Result};

const SCALE: f64 = 0.001;

// Bit widths of the LAS 1.2 formats: 3 bits of returns, 5 bits of class.
const LEGACY_MAX_RETURNS: u8 = 7;
const LEGACY_MAX_CLASSIFICATION: u8 = 31;
const MAX_RETURNS: u8 = 15;

/// Writes a LAS file, compressed when `path` ends in `.laz`.
///
/// Clouds decoded from an extended format, or holding returns or classes
/// wider than the legacy fields, are written as LAS 1.4 format 6 (7 with
/// RGB). Everything else is written as LAS 1.2 format 0 (2 with RGB).
/// Display colors from field coloring are not written.
///
/// The output file is removed if writing fails partway through.
pub fn write_las(cloud: &AsprCloud, path: &Path) -> Result<()> {
    if let Some(&n) = cloud.number_of_returns().iter().find(|&&n| n > MAX_RETURNS) {
        return Err(ExportError::NumberOfReturns(n));
    }
    let rgb = cloud.rgb();
    let (version, format): ((u8, u8), u8) = match (needs_extended_format(cloud), rgb.is_some()) {
        (true, true) => ((1, 4), 7),
        (true, false) => ((1, 4), 6),
        (false, true) => ((1, 2), 2),
        (false, false) => ((1, 2), 0),
    };

    let mut builder = Builder::from(version);
    builder.point_format = Format::new(format)?;
    let has_gps_time = builder.point_format.has_gps_time;
    if let Some(bounding_volume) = cloud.bounding_volume() {
        let [x, y, z] = bounding_volume.min;
        builder.transforms = Vector {
            x: Transform { scale: SCALE, offset: x },
            y: Transform { scale: SCALE, offset: y },
            z: Transform { scale: SCALE, offset: z },
        };
    }
    let header = builder.into_header()?;

    let mut writer = Writer::from_path(path, header)?;
    let written = cloud
        .points()
        .iter()
        .enumerate()
        .try_for_each(|(i, point)| -> Result<()> {
            writer.write_point(las::Point {
                x: point.x,
                y: point.y,
                z: point.z,
                intensity: cloud.intensity()[i],
                return_number: 1,
                number_of_returns: cloud.number_of_returns()[i],
                classification: Classification::new(cloud.classification()[i])?,
                gps_time: has_gps_time.then_some(0.0),
                color: rgb.map(|rgb| {
                    let c = rgb.colors[i];
                    las::Color::new(c.r as u16 * 256, c.g as u16 * 256, c.b as u16 * 256)
                }),
                ..Default::default()
            })?;
            Ok(())
        })
        .and_then(|()| Ok(writer.close()?));
    drop(writer);

    if let Err(err) = written {
        if let Err(remove) = fs::remove_file(path) {
            log::warn!("Failed to remove {}: {}", path.display(), remove);
        }
        return Err(err);
    }

    log::info!(
        "Wrote {} points to {} (LAS {}.{}, format {})",
        cloud.len(),
        path.display(),
        version.0,
        version.1,
        format
    );
    Ok(())
}

fn needs_extended_format(cloud: &AsprCloud) -> bool {
    cloud.point_format().is_some_and(|f| f.is_extended())
        || cloud.number_of_returns().iter().any(|&n| n > LEGACY_MAX_RETURNS)
        || cloud
            .classification()
            .iter()
            .any(|&c| c > LEGACY_MAX_CLASSIFICATION)
}
