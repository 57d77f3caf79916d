use crate::shapes::{read_sites, sphere};
use std::collections::HashMap;
use std::io::Cursor;
use voxgen3d::generation::{
    GenerationSummary, GeneratorParameters, GeometryGenerator, SiteRecord, SpatialIndex,
};
use voxgen3d::lattice::{neighbour_offset, reverse_direction, Domain, LATER_NEIGHBOURS};
use voxgen3d::math::{LatticeIndex, Point, Real};

const CENTRE: Point<Real> = Point::new(0.3, -0.2, 0.1);

fn voxelised_sphere(
    radius: Real,
) -> (GeometryGenerator, GenerationSummary, Vec<(LatticeIndex, SiteRecord)>) {
    let surface = sphere(CENTRE, radius, 24, 48);
    let parameters = GeneratorParameters {
        voxel_size: 0.5,
        block_size: 4,
        seed_point: CENTRE,
        ..Default::default()
    };
    let generator = GeometryGenerator::new(&surface, &[], parameters).unwrap();
    let (sink, summary) = generator.write_to(Cursor::new(vec![])).unwrap();
    let sites = read_sites(&sink.into_inner());
    (generator, summary, sites)
}

#[test]
fn fluid_sites_are_inside_the_sphere() {
    let centre = CENTRE;
    let radius = 3.2;
    let (generator, summary, sites) = voxelised_sphere(radius);
    let origin = generator.domain().origin();
    let mut num_fluid = 0;

    for (index, record) in &sites {
        let position = origin + index.coords.cast::<Real>() * 0.5;
        let distance = (position - centre).norm();
        let is_fluid = record.site_type().is_fluid();

        // The tessellation stays within a few hundredths of the sphere.
        if (distance - radius).abs() > 0.05 {
            assert_eq!(is_fluid, distance < radius, "{}", index);
        }

        if is_fluid {
            num_fluid += 1;
            assert!(record.boundary.is_none());
            // Sites with a solid neighbour carry a wall crossing.
            assert_eq!(record.wall.is_some(), record.config.cut_mask() != 0);
        }
    }

    assert_eq!(num_fluid, summary.fluid_sites);
    assert!(num_fluid > 0);
}

#[test]
fn adjacent_sites_differ_by_the_crossing_parity() {
    let (generator, _, sites) = voxelised_sphere(3.2);
    let domain = generator.domain();
    let voxel_size = domain.voxel_size();
    let offset = generator.parameters().probe_offset * voxel_size;
    let index = SpatialIndex::new(generator.surface());
    let records: HashMap<_, _> = sites.iter().map(|(i, r)| (*i, r)).collect();
    let [_, ny, nz] = domain.block_counts().map(|n| n as i32);
    let block_rank = |site: &LatticeIndex| {
        let block = domain.block_of(site);
        (block.x * ny + block.y) * nz + block.z
    };
    let mut num_links = 0;
    let mut num_walls = 0;

    for (a, record) in &sites {
        let start = domain.calc_position(a) + offset;

        for i in LATER_NEIGHBOURS {
            let b = a + neighbour_offset(i);
            let Some(neighbour) = records.get(&b) else {
                continue;
            };

            let end = domain.calc_position(&b) + offset;
            let hits = index.intersect_segment(&start, &end);
            let same_side = record.site_type().is_fluid() == neighbour.site_type().is_fluid();
            assert_eq!(hits.len() % 2 == 0, same_side, "{} -> {}", a, b);
            num_links += 1;

            if same_side {
                continue;
            }

            num_walls += 1;
            let length = (end - start).norm();
            // The first site of the link records the cut itself. The other one receives it
            // unless its block was written earlier in the sweep.
            let (fluid, solid, j) = if record.site_type().is_fluid() {
                (a, &b, i)
            } else if block_rank(&b) >= block_rank(a) {
                (&b, a, reverse_direction(i))
            } else {
                continue;
            };

            let fluid_record = records[fluid];
            let cuts = fluid_record.cut_distances.unwrap();
            assert!(fluid_record.config.is_edge(), "{} -> {}", fluid, solid);
            assert!(fluid_record.config.is_cut(j), "{} -> {}", fluid, solid);
            assert!(fluid_record.wall.is_some());
            assert!(cuts[j] >= 0.0 && cuts[j] <= length, "{}", cuts[j]);
        }
    }

    assert_eq!(num_links, sites.len() * LATER_NEIGHBOURS.len() - num_links_out(domain));
    assert!(num_walls > 0);
}

// The links of the later directions leaving the lattice.
fn num_links_out(domain: &Domain) -> usize {
    let counts = domain.site_counts().map(|n| n as i32);
    let mut result = 0;

    for x in 0..counts[0] {
        for y in 0..counts[1] {
            for z in 0..counts[2] {
                let site = LatticeIndex::new(x, y, z);
                result += LATER_NEIGHBOURS
                    .iter()
                    .filter(|i| !domain.contains_site(&(site + neighbour_offset(**i))))
                    .count();
            }
        }
    }

    result
}
