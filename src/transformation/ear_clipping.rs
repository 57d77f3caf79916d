//! Ear-clipping algorithm for creating a triangle mesh from a simple polygon.
//! Based on <https://github.com/ivanfratric/polypartition>.

use crate::math::{Point2, Real};
use std::cmp::Ordering;

/// The orientation or winding direction of a corner or polygon.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
enum Orientation {
    Ccw,
    Cw,
    None,
}

/// Returns the direction of a line through `p1`, `p2` and `p3`.
fn corner_direction(p1: &Point2<Real>, p2: &Point2<Real>, p3: &Point2<Real>) -> Orientation {
    let v1 = p1 - p2;
    let v2 = p3 - p2;

    match v1.perp(&v2).partial_cmp(&0.0) {
        Some(Ordering::Less) => Orientation::Ccw,
        Some(Ordering::Greater) => Orientation::Cw,
        _ => Orientation::None,
    }
}

/// Returns `true` if point `p` is in triangle with corners `v1`, `v2` and `v3`, boundary
/// included. Returns `None` if the triangle is flat.
fn is_point_in_triangle(
    p: &Point2<Real>,
    v1: &Point2<Real>,
    v2: &Point2<Real>,
    v3: &Point2<Real>,
) -> Option<bool> {
    if corner_direction(v1, v2, v3) == Orientation::None {
        return None;
    }

    let d = [
        corner_direction(p, v1, v2),
        corner_direction(p, v2, v3),
        corner_direction(p, v3, v1),
    ];
    let has_cw = d.contains(&Orientation::Cw);
    let has_ccw = d.contains(&Orientation::Ccw);

    Some(!(has_cw && has_ccw))
}

/// The information stored for each vertex in the ear clipping algorithm.
#[derive(Clone, Default)]
struct VertexInfo {
    /// Whether the vertex has not been clipped yet.
    is_active: bool,
    /// Whether the vertex is the tip of an ear.
    is_ear: bool,
    /// Cosine of the corner angle. Ears with a smaller angle are clipped first.
    pointiness: Real,
    p_prev: usize,
    p_next: usize,
}

/// Updates the fields `pointiness` and `is_ear` for a given vertex index.
///
/// Returns `false` if the corner is degenerate.
fn update_vertex(idx: usize, info: &mut VertexInfo, points: &[Point2<Real>]) -> bool {
    let p = points[idx];
    let p1 = points[info.p_prev];
    let p3 = points[info.p_next];

    info.pointiness = (p1 - p).normalize().dot(&(p3 - p).normalize());
    if info.pointiness.is_nan() {
        return false;
    }

    // An ear is a convex corner whose triangle contains no other vertex.
    let mut error = false;
    info.is_ear = corner_direction(&p1, &p, &p3) == Orientation::Ccw
        && (0..points.len())
            .filter(|&i| i != info.p_prev && i != idx && i != info.p_next)
            .all(|i| match is_point_in_triangle(&points[i], &p1, &p, &p3) {
                Some(inside) => !inside,
                None => {
                    error = true;
                    true
                }
            });
    !error
}

/// Triangulates a simple polygon given by its vertices in counter-clockwise order.
///
/// The returned triangles index `vertices` and are counter-clockwise. Returns `None` if the
/// polygon has less than three vertices, is clockwise, or has degenerate corners that prevent
/// the clipping of an ear.
pub fn triangulate_ear_clipping(vertices: &[Point2<Real>]) -> Option<Vec<[u32; 3]>> {
    let n_vertices = vertices.len();

    if n_vertices < 3 {
        return None;
    }

    let mut vertex_info = vec![VertexInfo::default(); n_vertices];

    let success = vertex_info.iter_mut().enumerate().all(|(i, info)| {
        info.is_active = true;
        info.p_prev = if i == 0 { n_vertices - 1 } else { i - 1 };
        info.p_next = if i == n_vertices - 1 { 0 } else { i + 1 };
        update_vertex(i, info, vertices)
    });
    if !success {
        return None;
    }

    let mut output_indices = Vec::with_capacity(n_vertices - 2);

    for i in 0..n_vertices - 3 {
        // Clip the pointiest of the active ears.
        let (ear_i, _) = vertex_info
            .iter()
            .enumerate()
            .filter(|(_, info)| info.is_active && info.is_ear)
            .max_by(|(_, info1), (_, info2)| info1.pointiness.total_cmp(&info2.pointiness))?;

        vertex_info[ear_i].is_active = false;

        let VertexInfo { p_prev, p_next, .. } = vertex_info[ear_i];
        output_indices.push([p_prev as u32, ear_i as u32, p_next as u32]);

        vertex_info[p_prev].p_next = p_next;
        vertex_info[p_next].p_prev = p_prev;

        // The last three vertices form the last triangle.
        if i == n_vertices - 4 {
            break;
        };

        if !update_vertex(p_prev, &mut vertex_info[p_prev], vertices)
            || !update_vertex(p_next, &mut vertex_info[p_next], vertices)
        {
            return None;
        }
    }

    let (i, info) = vertex_info
        .iter()
        .enumerate()
        .find(|(_, info)| info.is_active)?;
    output_indices.push([info.p_prev as u32, i as u32, info.p_next as u32]);

    Some(output_indices)
}

/// Twice the signed area of a polygon, positive if it is counter-clockwise.
pub(crate) fn signed_area2(vertices: &[Point2<Real>]) -> Real {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            a.x * b.y - a.y * b.x
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(vertices: &[Point2<Real>], triangles: &[[u32; 3]]) -> Real {
        triangles
            .iter()
            .map(|t| signed_area2(&t.map(|i| vertices[i as usize])) / 2.0)
            .sum()
    }

    #[test]
    fn triangle_ccw() {
        let vertices = vec![Point2::new(0., 0.), Point2::new(1., 0.), Point2::new(1., 1.)];
        let triangles = triangulate_ear_clipping(&vertices);
        assert_eq!(triangles.unwrap(), vec![[2, 0, 1]]);
    }

    #[test]
    fn square_cw_is_rejected() {
        let vertices = vec![
            Point2::new(0., 1.),
            Point2::new(1., 1.),
            Point2::new(1., 0.),
            Point2::new(0., 0.),
        ];
        assert!(signed_area2(&vertices) < 0.0);
        assert!(triangulate_ear_clipping(&vertices).is_none());
    }

    #[test]
    fn square_with_dent() {
        let vertices = vec![
            Point2::new(0., 0.),
            Point2::new(1., 0.),
            Point2::new(0.5, 0.5),
            Point2::new(1., 1.),
            Point2::new(0., 1.),
        ];
        let triangles = triangulate_ear_clipping(&vertices).unwrap();
        assert_eq!(triangles.len(), 3);
        assert_relative_eq!(area(&vertices, &triangles), 0.75);
    }

    #[test]
    /// A cut through a box: the corners alternate with points lying on the sides.
    fn square_with_collinear_points() {
        let vertices = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.25, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 0.5),
            Point2::new(1.0, 1.0),
            Point2::new(0.4, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.9),
        ];
        let triangles = triangulate_ear_clipping(&vertices).unwrap();
        assert_eq!(triangles.len(), 6);
        assert_relative_eq!(area(&vertices, &triangles), 1.0);
        for t in &triangles {
            assert!(signed_area2(&t.map(|i| vertices[i as usize])) > 0.0);
        }
    }

    #[test]
    fn too_few_vertices() {
        assert!(triangulate_ear_clipping(&[Point2::origin(), Point2::new(1.0, 0.0)]).is_none());
    }
}
