use crate::shapes::{cylinder, read_sites};
use std::io::Cursor;
use voxgen3d::bounding_volume::Aabb;
use voxgen3d::generation::{
    write_geometry, GeneratorParameters, GeometryGenerator, GeometryReader, BLOCK_HEADER_SIZE,
    PREAMBLE_SIZE,
};
use voxgen3d::lattice::{Domain, SiteType};
use voxgen3d::math::{Point, Vector};
use voxgen3d::shape::Iolet;

fn generator() -> GeometryGenerator {
    let iolets = [
        Iolet::inlet(Point::new(0.0, 0.0, 0.0), Vector::z()),
        Iolet::outlet(Point::new(0.0, 0.0, 4.0), -Vector::z()),
    ];
    let parameters = GeneratorParameters {
        block_size: 2,
        seed_point: Point::new(0.0, 0.0, 2.0),
        ..Default::default()
    };

    GeometryGenerator::new(&cylinder(12, 1.5, -1.0, 5.0), &iolets, parameters).unwrap()
}

#[test]
fn region_without_fluid_writes_empty_blocks() {
    let generator = generator();
    let far = Aabb::new(Point::new(20.0, 20.0, 20.0), Point::new(23.5, 21.0, 22.0));
    let mut domain = Domain::new(1.0, &far, 2).unwrap();
    let num_blocks = domain.total_blocks() as u64;

    let (sink, summary) = write_geometry(
        generator.surface(),
        generator.iolets(),
        &mut domain,
        7,
        GeneratorParameters::default().probe_offset,
        Cursor::new(vec![]),
    )
    .unwrap();
    let bytes = sink.into_inner();

    assert_eq!(summary.non_empty_blocks, 0);
    assert_eq!(summary.fluid_sites, 0);
    // Only the preamble and the zeroed headers.
    assert_eq!(bytes.len() as u64, PREAMBLE_SIZE + num_blocks * BLOCK_HEADER_SIZE);

    let reader = GeometryReader::new(&bytes[..]).unwrap();
    assert_eq!(reader.stress_type(), 7);
    assert!(reader
        .headers()
        .iter()
        .all(|h| h.fluid_sites == 0 && h.byte_length == 0));
    assert!(read_sites(&bytes)
        .iter()
        .all(|(_, record)| record.site_type() == SiteType::Solid));
}

#[test]
fn headers_describe_the_body() {
    let generator = generator();
    let (sink, summary) = generator.write_to(Cursor::new(vec![])).unwrap();
    let bytes = sink.into_inner();
    let reader = GeometryReader::new(&bytes[..]).unwrap();
    let headers = reader.headers();

    assert_eq!(headers.len(), summary.total_blocks);
    assert!(headers
        .iter()
        .all(|h| (h.fluid_sites == 0) == (h.byte_length == 0)));

    let header_len = headers.len() as u64 * BLOCK_HEADER_SIZE;
    assert_eq!(
        bytes.len() as u64,
        PREAMBLE_SIZE + header_len + reader.body_length()
    );
    assert_eq!(
        headers.iter().map(|h| h.fluid_sites as u64).sum::<u64>(),
        summary.fluid_sites
    );

    let sites = read_sites(&bytes);
    let fluid = sites
        .iter()
        .filter(|(_, record)| record.site_type().is_fluid())
        .count() as u64;
    assert_eq!(fluid, summary.fluid_sites);
}
