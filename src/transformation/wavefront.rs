use crate::shape::{Surface, WALL_IOLET_ID};
use obj::{Group, IndexTuple, ObjData, ObjError, Object, SimplePolygon};
use std::collections::BTreeMap;
use std::path::Path;

impl Surface {
    /// Outputs a Wavefront (`.obj`) file at the given path.
    ///
    /// Triangles are grouped by iolet tag: the wall triangles form the group `wall`, and the
    /// caps of the `i`-th iolet the group `iolet_i`.
    ///
    /// This function is enabled by the `wavefront` feature flag.
    pub fn to_obj_file(&self, path: &Path) -> Result<(), ObjError> {
        let mut file = std::fs::File::create(path)?;
        let mut polys_by_tag: BTreeMap<i32, Vec<SimplePolygon>> = BTreeMap::new();

        for (tri, tag) in self.indices().iter().zip(self.iolet_ids()) {
            polys_by_tag
                .entry(*tag)
                .or_default()
                .push(SimplePolygon(
                    tri.iter()
                        .map(|i| IndexTuple(*i as usize, None, None))
                        .collect(),
                ));
        }

        let groups = polys_by_tag
            .into_iter()
            .enumerate()
            .map(|(index, (tag, polys))| Group {
                polys,
                name: if tag == WALL_IOLET_ID {
                    "wall".to_string()
                } else {
                    format!("iolet_{}", tag)
                },
                index,
                material: None,
            })
            .collect();

        ObjData {
            position: self
                .vertices()
                .iter()
                .map(|v| [v.x as f32, v.y as f32, v.z as f32])
                .collect(),
            objects: vec![Object {
                groups,
                name: "surface".to_string(),
            }],
            ..Default::default()
        }
        .write_to_buf(&mut file)
    }
}
