use std::path::Path;

use las::{point::Classification, point::Format, Builder, Vlr, Writer};

use crate::reader::RawPoint;

pub(crate) fn sample_points(n: usize) -> Vec<RawPoint> {
    (0..n)
        .map(|i| RawPoint {
            x: i as f64,
            y: 10.0 + i as f64,
            z: 0.5 + i as f64 * 0.5,
            intensity: (i * 100) as u16,
            classification: (i % 4) as u8,
            number_of_returns: 1 + (i % 3) as u8,
            color: Some([(i * 256) as u16, (65535 - i * 256) as u16, 1024]),
        })
        .collect()
}

/// Writes a LAS 1.2 file. Colors are dropped for formats without RGB.
pub(crate) fn write_las(path: &Path, format: u8, points: &[RawPoint], vlrs: &[&str]) {
    let point_format = Format::new(format).unwrap();
    let mut builder = Builder::from((1, 2));
    builder.point_format = Format::new(format).unwrap();
    for (i, payload) in vlrs.iter().enumerate() {
        builder.vlrs.push(Vlr {
            user_id: "siteread".to_string(),
            record_id: i as u16,
            description: "test".to_string(),
            data: payload.as_bytes().to_vec(),
        });
    }
    let header = builder.into_header().unwrap();

    let mut writer = Writer::from_path(path, header).unwrap();
    for p in points {
        writer
            .write_point(las::Point {
                x: p.x,
                y: p.y,
                z: p.z,
                intensity: p.intensity,
                return_number: 1,
                number_of_returns: p.number_of_returns,
                classification: Classification::new(p.classification).unwrap(),
                gps_time: point_format.has_gps_time.then_some(0.0),
                color: if point_format.has_color {
                    p.color.map(|[r, g, b]| las::Color::new(r, g, b))
                } else {
                    None
                },
                ..Default::default()
            })
            .unwrap();
    }
    writer.close().unwrap();
}
