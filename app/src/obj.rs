use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use anyhow::{bail, Context, Result};
use pcd_crop::{CropMesh, MeshFace};

pub fn load_obj(path: &Path) -> Result<CropMesh> {
    let file =
        File::open(path).with_context(|| format!("failed to open crop mesh {}", path.display()))?;
    let mesh =
        parse_obj(file).with_context(|| format!("failed to parse crop mesh {}", path.display()))?;
    log::info!(
        "crop mesh {}: {} vertices, {} faces",
        path.display(),
        mesh.vertices().len(),
        mesh.faces().len()
    );
    Ok(mesh)
}

/// Reads `v` and `f` records of a Wavefront OBJ. Faces must be triangles or
/// quads; other polygons are skipped.
pub fn parse_obj<R: Read>(r: R) -> Result<CropMesh> {
    let mut rd = BufReader::new(r);
    let mut line = String::with_capacity(256);
    let mut vertices = Vec::<[f64; 3]>::new();
    let mut faces = Vec::new();
    loop {
        line.clear();
        let n = rd.read_line(&mut line)?;
        if n == 0 {
            break;
        }
        let mut it = line.split_whitespace();
        match it.next() {
            Some("v") => {
                let mut xyz = [0.0; 3];
                for value in xyz.iter_mut() {
                    let token = it.next().context("vertex with fewer than 3 coordinates")?;
                    *value = token
                        .parse()
                        .with_context(|| format!("bad vertex coordinate '{}'", token))?;
                }
                vertices.push(xyz);
            }
            Some("f") => {
                let indices = it
                    .map(|token| resolve_index(token, vertices.len()))
                    .collect::<Result<Vec<_>>>()?;
                match indices[..] {
                    [a, b, c] => faces.push(MeshFace::Triangle([a, b, c])),
                    [a, b, c, d] => faces.push(MeshFace::Quad([a, b, c, d])),
                    _ => log::warn!("skipping face with {} vertices", indices.len()),
                }
            }
            _ => {}
        }
    }
    Ok(CropMesh::new(vertices, faces))
}

// Accepts "7", "7/1", "7//3" and negative (relative) indices.
fn resolve_index(token: &str, vertex_count: usize) -> Result<usize> {
    let index: i64 = token
        .split('/')
        .next()
        .unwrap_or_default()
        .parse()
        .with_context(|| format!("bad face index '{}'", token))?;
    let resolved = if index > 0 {
        index - 1
    } else {
        vertex_count as i64 + index
    };
    if index == 0 || resolved < 0 || resolved >= vertex_count as i64 {
        bail!("face index {} out of range for {} vertices", index, vertex_count);
    }
    Ok(resolved as usize)
}
