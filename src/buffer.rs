//! Flat, fixed stride views of a mesh, and copying them into caller owned
//! buffers.

use crate::{element::Handle, error::Error, mesh::PolyMesh};

/// Copy `items` into `out`, `N` values per item, and return the number of
/// items copied.
///
/// When `out` cannot hold every item, as many whole items as fit are still
/// copied, and [`Error::BufferTooSmall`] reports the number of values
/// required and written.
pub fn fill_buffer<T, const N: usize>(
    items: impl IntoIterator<Item = [T; N]>,
    out: &mut [T],
) -> Result<usize, Error>
where
    T: Copy,
{
    let mut items = items.into_iter();
    let mut written = 0usize;
    for (dst, item) in out.chunks_exact_mut(N).zip(items.by_ref()) {
        dst.copy_from_slice(&item);
        written += 1;
    }
    let remaining = items.count();
    if remaining > 0 {
        return Err(Error::BufferTooSmall {
            required: (written + remaining) * N,
            written: written * N,
        });
    }
    Ok(written)
}

impl PolyMesh {
    /// Vertex positions as `[x, y, z]`.
    pub fn vertex_position_array(&self) -> impl ExactSizeIterator<Item = [f32; 3]> + use<'_> {
        self.points().iter().map(|p| p.to_array())
    }

    /// Vertex indices of the triangles of the triangulated mesh.
    pub fn triangle_index_array(&self) -> impl Iterator<Item = [u32; 3]> + use<'_> {
        self.triangles().map(|t| t.map(|v| v.index()))
    }

    /// Unit normals of the triangles of the triangulated mesh.
    pub fn triangle_normal_array(&self) -> impl Iterator<Item = [f32; 3]> + use<'_> {
        self.triangle_normals().map(|n| n.to_array())
    }

    /// Both vertex indices of every edge, the lower index first.
    pub fn edge_index_array(&self) -> impl Iterator<Item = [u32; 2]> + use<> {
        self.edge_vertices()
            .into_iter()
            .map(|(a, b)| [a.index(), b.index()])
    }

    /// Number of triangles in the triangulated mesh.
    pub fn num_triangles(&self) -> usize {
        self.face_lists().map(|f| f.len().saturating_sub(2)).sum()
    }
}

#[cfg(test)]
mod test {
    use super::fill_buffer;
    use crate::{
        error::{Error, ErrorKind},
        mesh::PolyMesh,
    };

    #[test]
    fn t_fill_exact() {
        let mut out = [0u32; 6];
        let count = fill_buffer([[1, 2], [3, 4], [5, 6]], &mut out).expect("Cannot fill buffer");
        assert_eq!(3, count);
        assert_eq!([1, 2, 3, 4, 5, 6], out);
        // Larger buffers keep their tail.
        let mut out = [9u32; 5];
        let count = fill_buffer([[1, 2]], &mut out).expect("Cannot fill buffer");
        assert_eq!(1, count);
        assert_eq!([1, 2, 9, 9, 9], out);
    }

    #[test]
    fn t_fill_truncated() {
        let mut out = [0.0f32; 7];
        let err = fill_buffer([[1.0, 1.0, 1.0], [2.0, 2.0, 2.0], [3.0, 3.0, 3.0]], &mut out)
            .expect_err("Buffer should be too small");
        assert_eq!(ErrorKind::BufferTooSmall, err.kind());
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                required: 9,
                written: 6
            }
        ));
        assert_eq!([1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 0.0], out);
        let mut empty: [u32; 0] = [];
        assert!(fill_buffer([[1u32; 3]], &mut empty).is_err());
        assert_eq!(
            0,
            fill_buffer(std::iter::empty::<[u32; 3]>(), &mut empty).expect("Cannot fill buffer")
        );
    }

    #[test]
    fn t_box_arrays() {
        let qbox = PolyMesh::unit_box().expect("Cannot create box");
        assert_eq!(8, qbox.vertex_position_array().len());
        assert_eq!(12, qbox.num_triangles());
        assert_eq!(12, qbox.triangle_index_array().count());
        let mut normals = vec![0.0f32; 36];
        assert_eq!(
            12,
            fill_buffer(qbox.triangle_normal_array(), &mut normals).expect("Cannot fill buffer")
        );
        for n in normals.chunks_exact(3) {
            let len2: f32 = n.iter().map(|x| x * x).sum();
            assert!((len2 - 1.0).abs() < 1e-5);
        }
        let edges: Vec<[u32; 2]> = qbox.edge_index_array().collect();
        assert_eq!(12, edges.len());
        assert!(edges.iter().all(|[a, b]| a < b && *b < 8));
    }
}
