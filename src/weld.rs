use std::collections::HashMap;

use glam::{IVec3, Vec3};

use crate::{
    element::{Handle, VH},
    error::Error,
    mesh::PolyMesh,
};

/// Spatial hash grid of points, with cells as large as the weld tolerance,
/// so that all points within the tolerance of a query are in the 27 cells
/// around it.
struct PointGrid {
    cell: f32,
    cells: HashMap<IVec3, Vec<u32>>,
}

impl PointGrid {
    fn new(cell: f32) -> Self {
        PointGrid {
            cell,
            cells: HashMap::new(),
        }
    }

    fn key(&self, p: Vec3) -> IVec3 {
        (p / self.cell).floor().as_ivec3()
    }

    fn insert(&mut self, p: Vec3, index: u32) {
        self.cells.entry(self.key(p)).or_default().push(index);
    }

    fn find(&self, p: Vec3, tolerance: f32, points: &[Vec3]) -> Option<u32> {
        let key = self.key(p);
        let tol2 = tolerance * tolerance;
        (-1..=1)
            .flat_map(|x| (-1..=1).flat_map(move |y| (-1..=1).map(move |z| IVec3::new(x, y, z))))
            .filter_map(|offset| self.cells.get(&key.wrapping_add(offset)))
            .flatten()
            .copied()
            .filter(|i| points[*i as usize].distance_squared(p) <= tol2)
            .min()
    }
}

impl PolyMesh {
    /// Collapse vertices within `tolerance` of each other into one vertex,
    /// and remap the faces. The first vertex of each cluster, in index order,
    /// survives. Consecutive repeated vertices are removed from faces, and
    /// faces left with fewer than 3 vertices are dropped. Returns the number
    /// of vertices removed.
    pub fn weld(&mut self, tolerance: f32) -> Result<usize, Error> {
        let tolerance = tolerance.max(0.0);
        let mut grid = PointGrid::new(tolerance.max(1e-6));
        let mut kept: Vec<Vec3> = Vec::with_capacity(self.num_vertices());
        let mut remap: Vec<u32> = Vec::with_capacity(self.num_vertices());
        for p in self.points() {
            let index = match grid.find(*p, tolerance, &kept) {
                Some(i) => i,
                None => {
                    let i = kept.len() as u32;
                    kept.push(*p);
                    grid.insert(*p, i);
                    i
                }
            };
            remap.push(index);
        }
        let removed = self.num_vertices() - kept.len();
        let mut out = PolyMesh::with_capacity(kept.len(), self.num_faces());
        out.add_vertices(&kept)?;
        let mut fverts: Vec<VH> = Vec::new();
        for f in self.faces() {
            fverts.clear();
            for v in self.fv_ccw_iter(f) {
                let v: VH = remap[v.index() as usize].into();
                if fverts.last() != Some(&v) {
                    fverts.push(v);
                }
            }
            while fverts.len() > 1 && fverts.first() == fverts.last() {
                fverts.pop();
            }
            if fverts.len() >= 3 {
                out.add_face(&fverts)?;
            }
        }
        *self = out;
        Ok(removed)
    }

    /// Remove vertices not referenced by any face, and remap the faces.
    /// Returns the number of vertices removed.
    pub fn remove_unreferenced_vertices(&mut self) -> Result<usize, Error> {
        let mut used = vec![false; self.num_vertices()];
        for f in self.faces() {
            for v in self.fv_ccw_iter(f) {
                used[v.index() as usize] = true;
            }
        }
        if used.iter().all(|u| *u) {
            return Ok(0);
        }
        let mut remap = vec![u32::MAX; self.num_vertices()];
        let mut points = Vec::with_capacity(self.num_vertices());
        for (i, p) in self.points().iter().enumerate() {
            if used[i] {
                remap[i] = points.len() as u32;
                points.push(*p);
            }
        }
        let removed = self.num_vertices() - points.len();
        let faces: Vec<Vec<VH>> = self
            .face_lists()
            .map(|fverts| {
                fverts
                    .iter()
                    .map(|v| VH::from(remap[v.index() as usize]))
                    .collect()
            })
            .collect();
        *self = PolyMesh::from_faces(points, faces)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod test {
    use glam::vec3;

    use crate::mesh::PolyMesh;

    /// Two unit quads side by side, with duplicated vertices along the
    /// shared edge.
    fn split_quads() -> PolyMesh {
        let mut mesh = PolyMesh::new();
        mesh.add_vertices(&[
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(1.0, 1.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            vec3(1.0 + 1e-7, 0.0, 0.0),
            vec3(2.0, 0.0, 0.0),
            vec3(2.0, 1.0, 0.0),
            vec3(1.0, 1.0 - 1e-7, 0.0),
        ])
        .expect("Cannot add vertices");
        mesh.add_quad_face(0.into(), 1.into(), 2.into(), 3.into())
            .expect("Cannot add face");
        mesh.add_quad_face(4.into(), 5.into(), 6.into(), 7.into())
            .expect("Cannot add face");
        mesh
    }

    #[test]
    fn t_weld_shared_edge() {
        let mut mesh = split_quads();
        assert_eq!(8, mesh.num_edges());
        let removed = mesh.weld(1e-5).expect("Cannot weld");
        assert_eq!(2, removed);
        assert_eq!(6, mesh.num_vertices());
        assert_eq!(2, mesh.num_faces());
        assert_eq!(7, mesh.num_edges());
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_weld_zero_tolerance() {
        let mut mesh = split_quads();
        let removed = mesh.weld(0.0).expect("Cannot weld");
        assert_eq!(0, removed);
        assert_eq!(8, mesh.num_vertices());
    }

    #[test]
    fn t_weld_drops_collapsed_faces() {
        let mut mesh = PolyMesh::new();
        mesh.add_vertices(&[
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(1.0, 1e-6, 0.0),
            vec3(0.0, 1.0, 0.0),
        ])
        .expect("Cannot add vertices");
        mesh.add_tri_face(0.into(), 1.into(), 2.into())
            .expect("Cannot add face");
        mesh.add_quad_face(0.into(), 1.into(), 2.into(), 3.into())
            .expect("Cannot add face");
        mesh.weld(1e-4).expect("Cannot weld");
        assert_eq!(3, mesh.num_vertices());
        // The sliver collapsed, the quad became a triangle.
        assert_eq!(1, mesh.num_faces());
        assert_eq!(3, mesh.face_valence(0.into()));
    }

    #[test]
    fn t_remove_unreferenced() {
        let mut mesh = PolyMesh::new();
        mesh.add_vertices(&[
            vec3(5.0, 5.0, 5.0),
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        ])
        .expect("Cannot add vertices");
        mesh.add_tri_face(1.into(), 2.into(), 3.into())
            .expect("Cannot add face");
        assert_eq!(1, mesh.remove_unreferenced_vertices().expect("Cannot compact"));
        assert_eq!(3, mesh.num_vertices());
        assert_eq!(vec3(0.0, 0.0, 0.0), mesh.points()[0]);
        assert_eq!(0, mesh.remove_unreferenced_vertices().expect("Cannot compact"));
    }
}
