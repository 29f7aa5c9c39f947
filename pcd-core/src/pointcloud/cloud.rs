use std::{fmt, path::Path, sync::Arc};

use crate::error::{Error, Result};
use crate::pointcloud::{
    field::{colorize_u16, colorize_u8, normalize_u16, normalize_u8, FieldKind},
    gradient::GradientTable,
    histogram::Histogram,
    metadata::{Header, LasSource, PointFormat, PointFormatCapabilities, VlrMap},
    point::{BoundingVolume, Color, Point},
};

/// RGB samples of formats that store them.
///
/// `colors` is the 8-bit display color of each point; `red`, `green` and
/// `blue` hold the same channels as field values (16-bit sample / 256).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RgbChannels {
    pub colors: Vec<Color>,
    pub red: Vec<u16>,
    pub green: Vec<u16>,
    pub blue: Vec<u16>,
}

impl RgbChannels {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            colors: Vec::with_capacity(capacity),
            red: Vec::with_capacity(capacity),
            green: Vec::with_capacity(capacity),
            blue: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, red: u16, green: u16, blue: u16) {
        self.colors.push(Color::from_rgb16(red, green, blue));
        self.red.push(red / 256);
        self.green.push(green / 256);
        self.blue.push(blue / 256);
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    fn check(&self, expected: usize) -> Result<()> {
        check_len("RGB colors", expected, self.colors.len())?;
        check_len("red channel", expected, self.red.len())?;
        check_len("green channel", expected, self.green.len())?;
        check_len("blue channel", expected, self.blue.len())
    }

    fn keep(&self, mask: &[bool]) -> Self {
        Self {
            colors: keep(&self.colors, mask),
            red: keep(&self.red, mask),
            green: keep(&self.green, mask),
            blue: keep(&self.blue, mask),
        }
    }
}

/// Columnar LAS attributes, index-aligned with the cloud's points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointAttributes {
    pub intensity: Vec<u16>,
    pub rgb: Option<RgbChannels>,
    pub classification: Vec<u8>,
    pub number_of_returns: Vec<u8>,
}

impl PointAttributes {
    pub fn with_capacity(capacity: usize, capabilities: PointFormatCapabilities) -> Self {
        Self {
            intensity: Vec::with_capacity(capacity),
            rgb: capabilities
                .has_rgb
                .then(|| RgbChannels::with_capacity(capacity)),
            classification: Vec::with_capacity(capacity),
            number_of_returns: Vec::with_capacity(capacity),
        }
    }

    /// Zeroed attributes for geometry that did not come from a LAS file.
    pub fn zeroed(len: usize) -> Self {
        Self {
            intensity: vec![0; len],
            rgb: None,
            classification: vec![0; len],
            number_of_returns: vec![0; len],
        }
    }

    pub fn check(&self, expected: usize) -> Result<()> {
        check_len("intensity", expected, self.intensity.len())?;
        check_len("classification", expected, self.classification.len())?;
        check_len("number of returns", expected, self.number_of_returns.len())?;
        match &self.rgb {
            Some(rgb) => rgb.check(expected),
            None => Ok(()),
        }
    }

    fn keep(&self, mask: &[bool]) -> Self {
        Self {
            intensity: keep(&self.intensity, mask),
            rgb: self.rgb.as_ref().map(|rgb| rgb.keep(mask)),
            classification: keep(&self.classification, mask),
            number_of_returns: keep(&self.number_of_returns, mask),
        }
    }
}

/// Geometry plus attributes produced by one full pass over a point stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedCloud {
    pub points: Vec<Point>,
    pub attributes: PointAttributes,
}

impl DecodedCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn check(&self) -> Result<()> {
        self.attributes.check(self.points.len())
    }
}

/// A point cloud linked with the ASPRS data it was decoded from.
///
/// All attribute sequences and the active field are kept the same length as
/// `points`. Header, VLRs and point format are shared between every cloud
/// derived from the same import.
#[derive(Debug, Clone)]
pub struct AsprCloud {
    source: Option<Arc<LasSource>>,
    points: Vec<Point>,
    attributes: PointAttributes,
    current_field: Option<Vec<f32>>,
    display_density: f32,
}

impl AsprCloud {
    /// An empty cloud for a freshly opened LAS file.
    pub fn new(source: LasSource) -> Self {
        Self {
            source: Some(Arc::new(source)),
            points: Vec::new(),
            attributes: PointAttributes::default(),
            current_field: None,
            display_density: 0.0,
        }
    }

    /// A cloud referenced from plain geometry, without any LAS header.
    pub fn from_points(points: Vec<Point>) -> Self {
        let attributes = PointAttributes::zeroed(points.len());
        Self {
            source: None,
            points,
            attributes,
            current_field: None,
            display_density: 1.0,
        }
    }

    pub fn source(&self) -> Option<&LasSource> {
        self.source.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.source().map(|s| s.path.as_path())
    }

    pub fn header(&self) -> Option<&Header> {
        self.source().map(|s| &s.header)
    }

    pub fn vlrs(&self) -> Option<&VlrMap> {
        self.source().map(|s| &s.vlrs)
    }

    pub fn point_format(&self) -> Option<PointFormat> {
        self.source().map(|s| s.point_format)
    }

    pub fn capabilities(&self) -> PointFormatCapabilities {
        self.source()
            .map(|s| s.capabilities())
            .unwrap_or_default()
    }

    pub fn is_user_referenced(&self) -> bool {
        self.source.is_none()
    }

    pub fn display_density(&self) -> f32 {
        self.display_density
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn coordinates(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(Point::xyz).collect()
    }

    pub fn attributes(&self) -> &PointAttributes {
        &self.attributes
    }

    pub fn intensity(&self) -> &[u16] {
        &self.attributes.intensity
    }

    pub fn rgb(&self) -> Option<&RgbChannels> {
        self.attributes.rgb.as_ref()
    }

    pub fn classification(&self) -> &[u8] {
        &self.attributes.classification
    }

    pub fn number_of_returns(&self) -> &[u8] {
        &self.attributes.number_of_returns
    }

    pub fn current_field(&self) -> Option<&[f32]> {
        self.current_field.as_deref()
    }

    pub fn bounding_volume(&self) -> Option<BoundingVolume> {
        BoundingVolume::from_points(&self.points)
    }

    /// Checks that every sequence is aligned with the geometry.
    pub fn validate(&self) -> Result<()> {
        self.attributes.check(self.points.len())?;
        if let Some(field) = &self.current_field {
            check_len("active field", self.points.len(), field.len())?;
        }
        Ok(())
    }

    /// Replaces geometry and attributes wholesale with a new materialization.
    ///
    /// The active field is dropped since it described the previous points.
    /// Nothing changes if `data` is misaligned.
    pub fn set_contents(&mut self, data: DecodedCloud, density: f32) -> Result<()> {
        data.check()?;
        log::info!(
            "materialized {} points at density {}",
            data.points.len(),
            density
        );
        self.points = data.points;
        self.attributes = data.attributes;
        self.current_field = None;
        self.display_density = density;
        Ok(())
    }

    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// A copy whose geometry is replaced by `points`; attributes are copied
    /// unchanged.
    pub fn with_geometry(&self, points: Vec<Point>) -> Result<Self> {
        check_len("geometry", self.points.len(), points.len())?;
        Ok(Self {
            source: self.source.clone(),
            points,
            attributes: self.attributes.clone(),
            current_field: self.current_field.clone(),
            display_density: self.display_density,
        })
    }

    /// A copy with `transform` applied to every coordinate.
    pub fn transformed<F>(&self, mut transform: F) -> Self
    where
        F: FnMut([f64; 3]) -> [f64; 3],
    {
        let points = self
            .points
            .iter()
            .map(|p| {
                let [x, y, z] = transform(p.xyz());
                Point {
                    x,
                    y,
                    z,
                    color: p.color,
                }
            })
            .collect();
        Self {
            source: self.source.clone(),
            points,
            attributes: self.attributes.clone(),
            current_field: self.current_field.clone(),
            display_density: self.display_density,
        }
    }

    pub fn translated(&self, offset: [f64; 3]) -> Self {
        self.transformed(|[x, y, z]| [x + offset[0], y + offset[1], z + offset[2]])
    }

    /// The XY offset that moves the header minimum to the origin.
    pub fn origin_offset(&self) -> Option<[f64; 3]> {
        self.header().map(|h| {
            let min = h.min_point();
            [-min[0], -min[1], 0.0]
        })
    }

    /// A copy that keeps only the points whose mask entry is true.
    pub fn filter_by_mask(&self, mask: &[bool]) -> Result<Self> {
        check_len("filter mask", self.points.len(), mask.len())?;
        let filtered = Self {
            source: self.source.clone(),
            points: keep(&self.points, mask),
            attributes: self.attributes.keep(mask),
            current_field: self.current_field.as_ref().map(|f| keep(f, mask)),
            display_density: self.display_density,
        };
        log::debug!(
            "filter kept {} of {} points",
            filtered.points.len(),
            self.points.len()
        );
        Ok(filtered)
    }

    /// Mask of points whose active field value lies in `[low, high]`.
    pub fn range_mask(&self, low: f32, high: f32) -> Result<Vec<bool>> {
        let field = self.current_field.as_ref().ok_or(Error::NoActiveField)?;
        Ok(field.iter().map(|v| low <= *v && *v <= high).collect())
    }

    pub fn filter_by_range(&self, low: f32, high: f32) -> Result<Self> {
        let mask = self.range_mask(low, high)?;
        self.filter_by_mask(&mask)
    }

    /// Normalized values of `field`, without touching the cloud.
    pub fn field_values(&self, field: FieldKind) -> Result<Vec<f32>> {
        let values = match field {
            FieldKind::Intensity => normalize_u16(&self.attributes.intensity),
            FieldKind::Red => normalize_u16(&self.require_rgb(field)?.red),
            FieldKind::Green => normalize_u16(&self.require_rgb(field)?.green),
            FieldKind::Blue => normalize_u16(&self.require_rgb(field)?.blue),
            FieldKind::Classification => normalize_u8(&self.attributes.classification),
            FieldKind::NumberOfReturns => normalize_u8(&self.attributes.number_of_returns),
        };
        Ok(values)
    }

    pub fn field_colors(&self, field: FieldKind, gradient: &GradientTable) -> Result<Vec<Color>> {
        let len = self.points.len();
        let colors = match field {
            FieldKind::Intensity => colorize_u16(&self.attributes.intensity, gradient, len),
            FieldKind::Red => colorize_u16(&self.require_rgb(field)?.red, gradient, len),
            FieldKind::Green => colorize_u16(&self.require_rgb(field)?.green, gradient, len),
            FieldKind::Blue => colorize_u16(&self.require_rgb(field)?.blue, gradient, len),
            FieldKind::Classification => {
                colorize_u8(&self.attributes.classification, gradient, len)
            }
            FieldKind::NumberOfReturns => {
                colorize_u8(&self.attributes.number_of_returns, gradient, len)
            }
        };
        Ok(colors)
    }

    /// Colors the points by `field` and makes it the active field.
    pub fn apply_field(&mut self, field: FieldKind, gradient: &GradientTable) -> Result<()> {
        let colors = self.field_colors(field, gradient)?;
        let values = self.field_values(field)?;
        check_len("active field", self.points.len(), values.len())?;
        self.apply_colors(&colors)?;
        self.current_field = Some(values);
        log::debug!("applied {} to {} points", field, self.points.len());
        Ok(())
    }

    /// Paints the file's own RGB onto the points and clears the active field.
    pub fn apply_rgb_colors(&mut self) -> Result<()> {
        let colors = self.require_rgb(FieldKind::Red)?.colors.clone();
        self.apply_colors(&colors)?;
        self.current_field = None;
        Ok(())
    }

    /// Overwrites point colors positionally.
    pub fn apply_colors(&mut self, colors: &[Color]) -> Result<()> {
        check_len("colors", self.points.len(), colors.len())?;
        for (point, color) in self.points.iter_mut().zip(colors) {
            point.color = Some(*color);
        }
        Ok(())
    }

    pub fn histogram(&self) -> Result<Histogram> {
        let field = self.current_field.as_ref().ok_or(Error::NoActiveField)?;
        Ok(Histogram::compute(field))
    }

    pub fn header_lines(&self) -> Vec<String> {
        self.header().map(Header::lines).unwrap_or_default()
    }

    pub fn vlr_lines(&self) -> Vec<String> {
        self.vlrs()
            .map(VlrMap::lines)
            .unwrap_or_else(|| VlrMap::new().lines())
    }

    fn require_rgb(&self, field: FieldKind) -> Result<&RgbChannels> {
        self.attributes
            .rgb
            .as_ref()
            .ok_or(Error::FieldUnavailable(field))
    }
}

impl fmt::Display for AsprCloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point Cloud with {} points.", self.points.len())
    }
}

fn check_len(sequence: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            sequence,
            expected,
            actual,
        })
    }
}

fn keep<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask)
        .filter_map(|(value, selected)| selected.then(|| value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::pointcloud::gradient::Gradient;

    fn source(format: u8) -> LasSource {
        let point_format = PointFormat::new(format).unwrap();
        LasSource {
            path: PathBuf::from("site.las"),
            header: Header::new(
                5,
                BoundingVolume {
                    min: [100.0, 200.0, 0.0],
                    max: [104.0, 204.0, 4.0],
                },
                point_format,
            ),
            vlrs: VlrMap::new(),
            point_format,
        }
    }

    fn data(with_rgb: bool) -> DecodedCloud {
        let capabilities = PointFormatCapabilities { has_rgb: with_rgb };
        let mut attributes = PointAttributes::with_capacity(5, capabilities);
        let mut points = Vec::new();
        for i in 0..5u16 {
            let f = i as f64;
            points.push(Point::new(100.0 + f, 200.0 + f, f));
            attributes.intensity.push(i * 100);
            attributes.classification.push((i % 3) as u8);
            attributes.number_of_returns.push(1 + (i % 2) as u8);
            if let Some(rgb) = attributes.rgb.as_mut() {
                rgb.push(i * 256, 65535 - i * 256, 512);
            }
        }
        DecodedCloud { points, attributes }
    }

    fn cloud(with_rgb: bool) -> AsprCloud {
        let mut cloud = AsprCloud::new(source(if with_rgb { 2 } else { 1 }));
        cloud.set_contents(data(with_rgb), 1.0).unwrap();
        cloud
    }

    #[test]
    fn new_cloud_is_empty() {
        let cloud = AsprCloud::new(source(2));
        assert!(cloud.is_empty());
        assert_eq!(cloud.header().unwrap().point_count(), 5);
        assert!(cloud.capabilities().has_rgb);
        assert_eq!(cloud.to_string(), "Point Cloud with 0 points.");
    }

    #[test]
    fn misaligned_contents_are_rejected() {
        let mut cloud = cloud(false);
        let mut bad = data(false);
        bad.attributes.intensity.pop();
        let err = cloud.set_contents(bad, 0.5).unwrap_err();
        assert_eq!(
            err,
            Error::LengthMismatch {
                sequence: "intensity",
                expected: 5,
                actual: 4
            }
        );
        assert_eq!(cloud.len(), 5);
        assert_eq!(cloud.display_density(), 1.0);
    }

    #[test]
    fn apply_field_colors_points_and_sets_active_field() {
        let mut cloud = cloud(false);
        let table = Gradient::Greyscale.table();
        cloud.apply_field(FieldKind::Intensity, &table).unwrap();

        let field = cloud.current_field().unwrap();
        assert_eq!(field, &[0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(cloud.points()[0].color, Some(table.color(0)));
        assert_eq!(cloud.points()[4].color, Some(table.color(255)));
        cloud.validate().unwrap();
    }

    #[test]
    fn rgb_fields_need_rgb() {
        let mut cloud = cloud(false);
        let table = GradientTable::default();
        assert_eq!(
            cloud.apply_field(FieldKind::Red, &table),
            Err(Error::FieldUnavailable(FieldKind::Red))
        );
        assert!(cloud.current_field().is_none());
        assert!(cloud.apply_rgb_colors().is_err());
    }

    #[test]
    fn rgb_channels_and_true_color() {
        let mut cloud = cloud(true);
        let rgb = cloud.rgb().unwrap();
        assert_eq!(rgb.red, vec![0, 1, 2, 3, 4]);
        assert_eq!(rgb.green, vec![255, 254, 253, 252, 251]);
        assert_eq!(rgb.blue, vec![2; 5]);

        cloud
            .apply_field(FieldKind::Green, &GradientTable::default())
            .unwrap();
        assert_eq!(cloud.current_field().unwrap()[0], 1.0);

        cloud.apply_rgb_colors().unwrap();
        assert!(cloud.current_field().is_none());
        assert_eq!(cloud.points()[1].color, Some(Color::new(1, 254, 2)));
    }

    #[test]
    fn filter_without_field() {
        let cloud = cloud(false);
        assert_eq!(cloud.filter_by_range(0.0, 1.0).unwrap_err(), Error::NoActiveField);
        assert_eq!(cloud.histogram().unwrap_err(), Error::NoActiveField);
    }

    #[test]
    fn full_range_filter_is_a_no_op() {
        let mut cloud = cloud(true);
        cloud
            .apply_field(FieldKind::Classification, &GradientTable::default())
            .unwrap();
        let once = cloud.filter_by_range(0.0, 1.0).unwrap();
        let twice = once.filter_by_range(0.0, 1.0).unwrap();
        assert_eq!(once.len(), cloud.len());
        assert_eq!(twice.len(), cloud.len());
        twice.validate().unwrap();
    }

    #[test]
    fn range_filter_slices_every_sequence() {
        let mut cloud = cloud(true);
        cloud
            .apply_field(FieldKind::Intensity, &GradientTable::default())
            .unwrap();
        let filtered = cloud.filter_by_range(0.2, 0.6).unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.intensity(), &[100, 200]);
        assert_eq!(filtered.classification(), &[1, 2]);
        assert_eq!(filtered.number_of_returns(), &[2, 1]);
        assert_eq!(filtered.rgb().unwrap().red, vec![1, 2]);
        assert_eq!(filtered.current_field().unwrap(), &[0.25, 0.5]);
        assert_eq!(filtered.points()[0].x, 101.0);
        filtered.validate().unwrap();

        // The source cloud is untouched.
        assert_eq!(cloud.len(), 5);
    }

    #[test]
    fn mask_length_must_match() {
        let cloud = cloud(false);
        assert!(matches!(
            cloud.filter_by_mask(&[true, false]),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn transform_copies_attributes() {
        let cloud = cloud(true);
        let offset = cloud.origin_offset().unwrap();
        let moved = cloud.translated(offset);
        assert_eq!(moved.points()[0].xyz(), [0.0, 0.0, 0.0]);
        assert_eq!(moved.points()[4].xyz(), [4.0, 4.0, 4.0]);
        assert_eq!(moved.intensity(), cloud.intensity());
        assert_eq!(moved.rgb(), cloud.rgb());
        assert_eq!(moved.header(), cloud.header());

        let flipped = cloud
            .with_geometry(cloud.points().iter().map(|p| Point::new(p.y, p.x, -p.z)).collect())
            .unwrap();
        assert_eq!(flipped.points()[1].xyz(), [201.0, 101.0, -1.0]);
        assert!(cloud.with_geometry(Vec::new()).is_err());
    }

    #[test]
    fn duplicate_is_independent() {
        let original = cloud(false);
        let mut copy = original.duplicate();
        copy.apply_field(FieldKind::NumberOfReturns, &GradientTable::default())
            .unwrap();
        assert!(original.current_field().is_none());
        assert!(original.points()[0].color.is_none());
        assert!(copy.points()[0].color.is_some());
    }

    #[test]
    fn histogram_of_active_field() {
        let mut cloud = cloud(false);
        cloud
            .apply_field(FieldKind::NumberOfReturns, &GradientTable::default())
            .unwrap();
        let histogram = cloud.histogram().unwrap();
        assert_eq!(histogram.values, vec![128, 256]);
        assert_eq!(histogram.counts, vec![3, 2]);
    }

    #[test]
    fn user_referenced_cloud() {
        let cloud = AsprCloud::from_points(vec![Point::new(0.0, 0.0, 0.0); 3]);
        assert!(cloud.is_user_referenced());
        assert!(cloud.header_lines().is_empty());
        assert_eq!(cloud.vlr_lines(), vec!["No VLRs found.".to_string()]);
        assert!(cloud.origin_offset().is_none());
        cloud.validate().unwrap();
    }
}
