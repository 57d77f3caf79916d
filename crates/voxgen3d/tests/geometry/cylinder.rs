use crate::shapes::{cylinder, read_sites};
use approx::assert_relative_eq;
use std::io::Cursor;
use voxgen3d::generation::{GeneratorParameters, GeometryGenerator, GeometryReader};
use voxgen3d::lattice::SiteType;
use voxgen3d::math::{LatticeIndex, Point, Vector};
use voxgen3d::shape::{Iolet, WALL_IOLET_ID};

fn generator() -> GeometryGenerator {
    let surface = cylinder(16, 1.0, -1.0, 11.0);
    let iolets = [
        Iolet::inlet(Point::new(0.0, 0.0, 0.0), Vector::z()),
        Iolet::outlet(Point::new(0.0, 0.0, 10.0), -Vector::z()),
    ];
    let parameters = GeneratorParameters {
        seed_point: Point::new(0.0, 0.0, 5.0),
        ..Default::default()
    };

    GeometryGenerator::new(&surface, &iolets, parameters).unwrap()
}

#[test]
fn clipped_cylinder_is_capped() {
    let generator = generator();
    let surface = generator.surface();
    let aabb = surface.aabb();

    assert_relative_eq!(aabb.mins.z, 0.0, epsilon = 1.0e-12);
    assert_relative_eq!(aabb.maxs.z, 10.0, epsilon = 1.0e-12);
    assert!(surface.boundary_half_edges().is_empty());

    let tags: Vec<_> = surface.iolet_ids().to_vec();
    assert!(tags.contains(&WALL_IOLET_ID));
    assert!(tags.contains(&0));
    assert!(tags.contains(&1));
    assert!(tags.iter().all(|t| *t >= WALL_IOLET_ID && *t <= 1));

    let domain = generator.domain();
    assert_eq!(domain.block_counts(), [1, 1, 2]);
    assert_relative_eq!(domain.origin(), Point::new(-1.5, -1.5, -1.0), epsilon = 1.0e-9);
}

#[test]
fn cylinder_sites() {
    let generator = generator();
    let (sink, summary) = generator.write_to(Cursor::new(vec![])).unwrap();
    let bytes = sink.into_inner();

    assert_eq!(summary.total_blocks, 2);
    assert_eq!(summary.non_empty_blocks, 2);
    assert_eq!(summary.fluid_sites, 40);

    let reader = GeometryReader::new(&bytes[..]).unwrap();
    assert_eq!(reader.stress_type(), 1);
    assert_eq!(reader.block_size(), 8);
    let fluid: u32 = reader.headers().iter().map(|h| h.fluid_sites).sum();
    assert_eq!(fluid, 40);

    let sites = read_sites(&bytes);
    let mut num_fluid = 0;

    for (index, record) in &sites {
        let column = (index.x == 1 || index.x == 2) && (index.y == 1 || index.y == 2);
        let expected = column && index.z >= 1 && index.z <= 10;
        assert_eq!(record.site_type().is_fluid(), expected, "{}", index);

        if !expected {
            assert_eq!(record.site_type(), SiteType::Solid);
            continue;
        }

        num_fluid += 1;
        // Every site of the column has a wall neighbour.
        assert!(record.config.is_edge());
        assert!(record.wall.is_some());
        assert!(record.cut_distances.is_some());

        let expected_type = match index.z {
            1 => SiteType::Inlet,
            10 => SiteType::Outlet,
            _ => SiteType::Fluid,
        };
        assert_eq!(record.site_type(), expected_type, "{}", index);
        assert_eq!(record.boundary.is_some(), expected_type.is_boundary());

        if expected_type.is_boundary() {
            assert_eq!(record.config.boundary_id(), 0);
        }
    }

    assert_eq!(num_fluid, 40);

    let record = |x, y, z| {
        &sites
            .iter()
            .find(|(index, _)| *index == LatticeIndex::new(x, y, z))
            .unwrap()
            .1
    };

    let inlet = record(1, 1, 1).boundary.unwrap();
    assert_relative_eq!(inlet.normal, Vector::z(), epsilon = 1.0e-12);
    assert!(inlet.distance > 0.0 && inlet.distance < 1.0e-5);

    let outlet = record(2, 2, 10).boundary.unwrap();
    assert_relative_eq!(outlet.normal, -Vector::z(), epsilon = 1.0e-12);
    assert_relative_eq!(outlet.distance, 1.0, epsilon = 1.0e-5);

    // The closest wall crossing is along a diagonal link, about a third of a voxel away.
    let wall = record(1, 2, 5).wall.unwrap();
    assert!(wall.distance > 0.3 && wall.distance < 1.0);
    assert!(wall.normal.x < 0.0 && wall.normal.y > 0.0);
}

#[test]
fn generation_is_idempotent() {
    let generator = generator();
    let (first, first_summary) = generator.write_to(Cursor::new(vec![])).unwrap();
    let (second, second_summary) = generator.write_to(Cursor::new(vec![])).unwrap();

    assert_eq!(first_summary, second_summary);
    assert_eq!(first.into_inner(), second.into_inner());
}

#[test]
fn written_file_matches_stream() {
    let generator = generator();
    let path = std::env::temp_dir().join("voxgen3d_cylinder.gmy");
    let summary = generator.write_file(&path).unwrap();
    let (sink, _) = generator.write_to(Cursor::new(vec![])).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(bytes, sink.into_inner());
    assert_eq!(summary.fluid_sites, 40);
}
