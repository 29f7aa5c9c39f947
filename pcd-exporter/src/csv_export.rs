use std::path::Path;

use csv::WriterBuilder;
use pcd_core::pointcloud::cloud::AsprCloud;
use serde::Serialize;

use crate::error::Result;

const COLUMNS: [&str; 10] = [
    "x",
    "y",
    "z",
    "intensity",
    "classification",
    "number_of_returns",
    "red",
    "green",
    "blue",
    "field",
];

#[derive(Serialize)]
struct CsvRow {
    x: f64,
    y: f64,
    z: f64,
    intensity: u16,
    classification: u8,
    number_of_returns: u8,
    red: Option<u16>,
    green: Option<u16>,
    blue: Option<u16>,
    field: Option<f32>,
}

/// One row per point. RGB and field columns are left empty when the cloud
/// has no RGB or no active field.
pub fn write_csv(cloud: &AsprCloud, path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(COLUMNS)?;

    let rgb = cloud.rgb();
    let field = cloud.current_field();
    for (i, point) in cloud.points().iter().enumerate() {
        writer.serialize(CsvRow {
            x: point.x,
            y: point.y,
            z: point.z,
            intensity: cloud.intensity()[i],
            classification: cloud.classification()[i],
            number_of_returns: cloud.number_of_returns()[i],
            red: rgb.map(|rgb| rgb.red[i]),
            green: rgb.map(|rgb| rgb.green[i]),
            blue: rgb.map(|rgb| rgb.blue[i]),
            field: field.map(|field| field[i]),
        })?;
    }
    writer.flush()?;

    log::info!("Wrote {} rows to {}", cloud.len(), path.display());
    Ok(())
}
