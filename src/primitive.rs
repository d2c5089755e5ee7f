use glam::{Vec3, vec3};

use crate::{error::Error, mesh::PolyMesh};

impl PolyMesh {
    /// Makes a box with the following topology, spanning from the min point to
    /// the max point.
    ///
    ///  ```text
    ///       7-----------6
    ///      /|          /|
    ///     / |         / |
    ///    4-----------5  |
    ///    |  |        |  |
    ///    |  3--------|--2
    ///    | /         | /
    ///    |/          |/
    ///    0-----------1
    ///  ```
    pub fn quad_box(min: Vec3, max: Vec3) -> Result<Self, Error> {
        const BOX_POS: [(bool, bool, bool); 8] = [
            (false, false, false),
            (true, false, false),
            (true, true, false),
            (false, true, false),
            (false, false, true),
            (true, false, true),
            (true, true, true),
            (false, true, true),
        ];
        const BOX_IDX: [(u32, u32, u32, u32); 6] = [
            (0, 3, 2, 1),
            (0, 1, 5, 4),
            (1, 2, 6, 5),
            (2, 3, 7, 6),
            (3, 0, 4, 7),
            (4, 5, 6, 7),
        ];
        let mut qbox = Self::with_capacity(8, 6);
        let pos = BOX_POS.map(|(xf, yf, zf)| {
            vec3(
                if xf { max.x } else { min.x },
                if yf { max.y } else { min.y },
                if zf { max.z } else { min.z },
            )
        });
        qbox.add_vertices(&pos)?;
        for (a, b, c, d) in BOX_IDX {
            qbox.add_quad_face(a.into(), b.into(), c.into(), d.into())?;
        }
        Ok(qbox)
    }

    /// Create a mesh representing a box with quadrilateral faces, of size 1,
    /// spanning from the origin to (1, 1, 1).
    pub fn unit_box() -> Result<Self, Error> {
        Self::quad_box(Vec3::ZERO, Vec3::ONE)
    }

    /// Create an octahedron centered at the origin, with the given
    /// circumradius. The vertices of the mesh will lie on the sphere.
    pub fn octahedron(radius: f32) -> Result<Self, Error> {
        let mut mesh = Self::with_capacity(6, 8);
        mesh.add_vertices(&[
            vec3(radius, 0.0, 0.0),
            vec3(0.0, radius, 0.0),
            vec3(-radius, 0.0, 0.0),
            vec3(0.0, -radius, 0.0),
            vec3(0.0, 0.0, radius),
            vec3(0.0, 0.0, -radius),
        ])?;
        mesh.add_tri_face(0.into(), 4.into(), 3.into())?;
        mesh.add_tri_face(1.into(), 4.into(), 0.into())?;
        mesh.add_tri_face(2.into(), 4.into(), 1.into())?;
        mesh.add_tri_face(3.into(), 4.into(), 2.into())?;
        mesh.add_tri_face(3.into(), 5.into(), 0.into())?;
        mesh.add_tri_face(0.into(), 5.into(), 1.into())?;
        mesh.add_tri_face(1.into(), 5.into(), 2.into())?;
        mesh.add_tri_face(2.into(), 5.into(), 3.into())?;
        Ok(mesh)
    }

    /// Create a quad sphere: a box around `center` refined with
    /// `subdivisions` Catmull-Clark passes, with every vertex then pushed out
    /// onto the sphere. Has `6 * 4^subdivisions` quad faces.
    pub fn sphere(center: Vec3, radius: f32, subdivisions: usize) -> Result<Self, Error> {
        let half = Vec3::splat(radius);
        let mut mesh = Self::quad_box(center - half, center + half)?;
        mesh.subdivide_catmull_clark(subdivisions)?;
        for p in mesh.points_mut() {
            *p = center + (*p - center).normalize_or_zero() * radius;
        }
        Ok(mesh)
    }
}
