use std::f64::consts::PI;
use std::io::Cursor;
use voxgen3d::generation::{GeometryReader, SiteRecord};
use voxgen3d::math::{LatticeIndex, Point, Real};
use voxgen3d::shape::Surface;

/// A closed prism of axis `z` with a regular `n`-gon section of circumradius `radius`.
///
/// The polygon vertices are rotated by half a sector so that no vertex lies on an axis.
pub fn cylinder(n: u32, radius: Real, z0: Real, z1: Real) -> Surface {
    let mut vertices = vec![];
    for z in [z0, z1] {
        for k in 0..n {
            let angle = 2.0 * PI * (k as Real + 0.5) / n as Real;
            vertices.push(Point::new(radius * angle.cos(), radius * angle.sin(), z));
        }
    }
    let bottom = 2 * n;
    let top = 2 * n + 1;
    vertices.push(Point::new(0.0, 0.0, z0));
    vertices.push(Point::new(0.0, 0.0, z1));

    let mut indices = vec![];
    for k in 0..n {
        let next = (k + 1) % n;
        indices.push([k, next, n + next]);
        indices.push([k, n + next, n + k]);
        indices.push([bottom, next, k]);
        indices.push([top, n + k, n + next]);
    }

    Surface::new(vertices, indices).unwrap()
}

/// A latitude-longitude triangulation of the sphere of radius `radius` centered at `centre`.
pub fn sphere(centre: Point<Real>, radius: Real, rings: u32, segments: u32) -> Surface {
    let mut vertices = vec![centre + Point::new(0.0, 0.0, -radius).coords];
    for r in 1..rings {
        let polar = PI * r as Real / rings as Real;
        for s in 0..segments {
            let azimuth = 2.0 * PI * s as Real / segments as Real;
            vertices.push(Point::new(
                centre.x + radius * polar.sin() * azimuth.cos(),
                centre.y + radius * polar.sin() * azimuth.sin(),
                centre.z - radius * polar.cos(),
            ));
        }
    }
    let north = vertices.len() as u32;
    vertices.push(centre + Point::new(0.0, 0.0, radius).coords);

    let ring = |r: u32, s: u32| 1 + r * segments + s % segments;
    let mut indices = vec![];
    for s in 0..segments {
        indices.push([0, ring(0, s + 1), ring(0, s)]);
        indices.push([north, ring(rings - 2, s), ring(rings - 2, s + 1)]);
    }
    for r in 0..rings - 2 {
        for s in 0..segments {
            indices.push([ring(r, s), ring(r, s + 1), ring(r + 1, s + 1)]);
            indices.push([ring(r, s), ring(r + 1, s + 1), ring(r + 1, s)]);
        }
    }

    Surface::new(vertices, indices).unwrap()
}

/// Decodes a whole geometry file, pairing each site record with its global index.
pub fn read_sites(bytes: &[u8]) -> Vec<(LatticeIndex, SiteRecord)> {
    let mut reader = GeometryReader::new(Cursor::new(bytes)).unwrap();
    let [_, ny, nz] = reader.block_counts().map(|n| n as i32);
    let size = reader.block_size() as i32;
    let mut result = vec![];
    let mut n = 0;

    while let Some(records) = reader.read_block().unwrap() {
        let block = LatticeIndex::new(n / (ny * nz), (n / nz) % ny, n % nz);
        for (j, record) in records.into_iter().enumerate() {
            let j = j as i32;
            let local = LatticeIndex::new(j / (size * size), (j / size) % size, j % size);
            result.push((block * size + local.coords, record));
        }
        n += 1;
    }

    result
}
