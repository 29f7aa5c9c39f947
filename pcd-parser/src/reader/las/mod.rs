mod vlr;

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use las::Reader;
use pcd_core::pointcloud::{
    metadata::{Header, LasSource, PointFormat, VlrMap},
    point::BoundingVolume,
};

use super::{PointReader, RawPoint};
use crate::error::{ParseError, Result};

pub use vlr::parse_vlr_payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
}

/// Accepts `.las` and `.laz` in any letter case.
pub fn check_extension(path: &Path) -> Result<Extension> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("las") => Ok(Extension::Las),
        Some("laz") => Ok(Extension::Laz),
        _ => Err(ParseError::InvalidFileType(path.to_path_buf())),
    }
}

fn open(path: &Path) -> Result<Reader> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Reader::new(BufReader::new(file)).map_err(|e| malformed(path, e.to_string()))
}

fn malformed(path: &Path, reason: impl Into<String>) -> ParseError {
    ParseError::MalformedHeader {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn convert_point_format(path: &Path, header: &las::Header) -> Result<PointFormat> {
    let format = header
        .point_format()
        .to_u8()
        .map_err(|e| malformed(path, e.to_string()))?;
    PointFormat::new(format)
        .ok_or_else(|| malformed(path, format!("point format {} is outside 0..=10", format)))
}

fn convert_header(path: &Path, header: &las::Header) -> Result<Header> {
    let point_format = convert_point_format(path, header)?;
    let point_count = header.number_of_points();
    let bounds = header.bounds();
    let mut bounding_volume = BoundingVolume {
        min: [bounds.min.x, bounds.min.y, bounds.min.z],
        max: [bounds.max.x, bounds.max.y, bounds.max.z],
    };
    let finite = bounding_volume
        .min
        .iter()
        .chain(&bounding_volume.max)
        .all(|v| v.is_finite());
    if !finite {
        // Writers leave the bounds of an empty file unset.
        if point_count > 0 {
            return Err(malformed(path, "bounds are not finite"));
        }
        bounding_volume = BoundingVolume::default();
    }

    Ok(Header::new(point_count, bounding_volume, point_format))
}

fn convert_vlrs(header: &las::Header) -> VlrMap {
    let mut vlrs = VlrMap::new();
    for vlr in header.vlrs() {
        for (key, value) in parse_vlr_payload(&vlr.data) {
            vlrs.insert_dup(&key, &value);
        }
    }
    vlrs
}

pub fn read_header(path: &Path) -> Result<Header> {
    let reader = open(path)?;
    let header = convert_header(path, reader.header())?;
    log::debug!("{}: {:?}", path.display(), header);
    Ok(header)
}

pub fn read_vlrs(path: &Path) -> Result<VlrMap> {
    let reader = open(path)?;
    Ok(convert_vlrs(reader.header()))
}

pub fn read_point_format(path: &Path) -> Result<PointFormat> {
    let reader = open(path)?;
    convert_point_format(path, reader.header())
}

/// Header, VLRs and point format from a single open of `path`.
pub fn read_source(path: &Path) -> Result<LasSource> {
    let reader = open(path)?;
    let las_header = reader.header();
    let header = convert_header(path, las_header)?;
    let vlrs = convert_vlrs(las_header);
    log::debug!(
        "{}: {} points, format {}, {} VLR entries",
        path.display(),
        header.point_count(),
        header.point_format(),
        vlrs.len()
    );
    Ok(LasSource {
        path: PathBuf::from(path),
        point_format: header.point_format(),
        header,
        vlrs,
    })
}

impl From<las::Point> for RawPoint {
    fn from(point: las::Point) -> Self {
        RawPoint {
            x: point.x,
            y: point.y,
            z: point.z,
            intensity: point.intensity,
            classification: u8::from(point.classification),
            number_of_returns: point.number_of_returns,
            color: point.color.map(|c| [c.red, c.green, c.blue]),
        }
    }
}

/// Streams point records from one LAS/LAZ file.
pub struct LasPointReader {
    reader: Reader,
}

impl LasPointReader {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            reader: open(path)?,
        })
    }
}

impl PointReader for LasPointReader {
    fn next_point(&mut self) -> Result<Option<RawPoint>> {
        let point = self.reader.points().next().transpose()?;
        Ok(point.map(RawPoint::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_points, write_las};

    #[test]
    fn extension_check() {
        assert_eq!(check_extension(Path::new("a/b.las")).unwrap(), Extension::Las);
        assert_eq!(check_extension(Path::new("B.LAZ")).unwrap(), Extension::Laz);
        assert!(matches!(
            check_extension(Path::new("cloud.xyz")),
            Err(ParseError::InvalidFileType(_))
        ));
        assert!(check_extension(Path::new("las")).is_err());
    }

    #[test]
    fn header_of_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.las");
        write_las(&path, 2, &sample_points(12), &[]);

        let header = read_header(&path).unwrap();
        assert_eq!(header.point_count(), 12);
        assert_eq!(header.point_format().to_u8(), 2);
        assert_eq!(header.min_point(), [0.0, 10.0, 0.5]);
        assert_eq!(header.max_point(), [11.0, 21.0, 6.0]);
        assert_eq!(header.lines()[0], "Number of Points : 12");
        assert_eq!(read_point_format(&path).unwrap().to_u8(), 2);
    }

    #[test]
    fn vlrs_of_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.las");
        write_las(
            &path,
            0,
            &sample_points(3),
            &["scale[1.0],units[m]", "scale[2.0],origin[0,0]", "binary"],
        );

        let vlrs = read_vlrs(&path).unwrap();
        assert_eq!(vlrs.get("scale"), Some("1.0"));
        assert_eq!(vlrs.get("scale_2"), Some("2.0"));
        assert_eq!(vlrs.get("units"), Some("m"));
        assert_eq!(vlrs.get("origin"), Some("0,0"));
        assert_eq!(vlrs.len(), 4);
    }

    #[test]
    fn no_vlrs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.las");
        write_las(&path, 0, &sample_points(1), &[]);

        let vlrs = read_vlrs(&path).unwrap();
        assert!(vlrs.is_empty());
        assert_eq!(vlrs.lines(), vec!["No VLRs found.".to_string()]);
    }

    #[test]
    fn empty_file_has_zero_points() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.las");
        write_las(&path, 1, &[], &[]);
        assert_eq!(read_header(&path).unwrap().point_count(), 0);
    }

    #[test]
    fn missing_and_garbage_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.las");
        assert!(matches!(read_header(&missing), Err(ParseError::Io { .. })));

        let garbage = dir.path().join("garbage.las");
        std::fs::write(&garbage, b"definitely not a LAS file").unwrap();
        assert!(matches!(
            read_header(&garbage),
            Err(ParseError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn point_reader_streams_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.las");
        let points = sample_points(4);
        write_las(&path, 2, &points, &[]);

        let mut reader = LasPointReader::open(&path).unwrap();
        let mut read = Vec::new();
        while let Some(point) = reader.next_point().unwrap() {
            read.push(point);
        }
        assert_eq!(read, points);
    }
}
