use std::collections::{HashMap, HashSet};

use glam::Vec3;
use log::{debug, warn};

use super::{
    GenerateOptions, IsolatedNode,
    joint::{self, Branch, Site},
    segment::{Ring, tube},
};
use crate::{element::NodeH, error::Error, mesh::PolyMesh, skeleton::Skeleton, vector};

/// Normal of the plane best fitting a set of branch directions, facing
/// positive Z. `None` when the branches are collinear.
fn plane_normal(branches: &[Branch]) -> Option<Vec3> {
    let mut total = Vec3::ZERO;
    for (i, a) in branches.iter().enumerate() {
        for b in &branches[(i + 1)..] {
            let c = a.dir.cross(b.dir);
            total += if c.dot(total) < 0.0 { -c } else { c };
        }
    }
    if total.length() < 1e-3 {
        return None;
    }
    let n = total.normalize();
    Some(if n.z < 0.0 { -n } else { n })
}

/// "Up" direction of every node, in traversal order. Nodes whose branches
/// are collinear inherit the direction of the node they were reached from.
fn base_normals(order: &[(NodeH, Option<NodeH>)], branches: &[Vec<Branch>]) -> Vec<Vec3> {
    let own: Vec<Option<Vec3>> = branches.iter().map(|b| plane_normal(b)).collect();
    let fallback = own.iter().flatten().next().copied().unwrap_or(Vec3::Z);
    let mut ups: HashMap<NodeH, Vec3> = HashMap::with_capacity(order.len());
    for ((n, parent), normal) in order.iter().zip(own) {
        let up = normal
            .or_else(|| parent.and_then(|p| ups.get(&p).copied()))
            .unwrap_or(fallback);
        ups.insert(*n, up);
    }
    order
        .iter()
        .map(|(n, _)| ups.get(n).copied().unwrap_or(fallback))
        .collect()
}

fn isolated(skeleton: &Skeleton, root: NodeH, options: &GenerateOptions) -> Result<PolyMesh, Error> {
    match options.isolated_node {
        IsolatedNode::Skip => {
            debug!("{} has no edges, generating an empty mesh", root);
            Ok(PolyMesh::new())
        }
        IsolatedNode::Sphere => {
            let node = skeleton.node(root)?;
            // Catmull-Clark passes over a box that give about as many
            // points around the equator as a ring.
            let passes = (options.ring_segments as f32 / 4.0).log2().ceil().max(0.0) as usize;
            let mut mesh = PolyMesh::sphere(node.position, node.radius, passes)?;
            mesh.triangulate()?;
            mesh.subdivide(options.subdivisions)?;
            debug!(
                "{} has no edges, generated a sphere with {} faces",
                root,
                mesh.num_faces()
            );
            Ok(mesh)
        }
    }
}

pub(super) fn generate(
    skeleton: &Skeleton,
    root: NodeH,
    options: &GenerateOptions,
) -> Result<PolyMesh, Error> {
    let order = skeleton.traverse(root)?;
    for (n, _) in &order {
        if skeleton.radius(*n)? < options.min_radius {
            return Err(Error::RadiusTooSmall(*n));
        }
    }
    if order.len() == 1 {
        return isolated(skeleton, root, options);
    }
    let mut branches: Vec<Vec<Branch>> = Vec::with_capacity(order.len());
    for (n, _) in &order {
        let p = skeleton.position(*n)?;
        let bs = skeleton
            .neighbors(*n)?
            .into_iter()
            .map(|nb| {
                let q = skeleton.position(nb)?;
                if p.distance(q) < options.min_edge_length {
                    return Err(Error::ShortEdge(*n, nb));
                }
                Ok(Branch {
                    neighbor: nb,
                    dir: vector::direction(p, q)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        branches.push(bs);
    }
    let component: HashSet<NodeH> = order.iter().map(|(n, _)| *n).collect();
    for (a, b) in skeleton.overlapping_edges() {
        if component.contains(&a) {
            warn!("Spheres of {} and {} overlap, the tube between them may fold", a, b);
        }
    }
    let ups = base_normals(&order, &branches);
    // Ring of the first node towards the second.
    let mut rings: HashMap<(NodeH, NodeH), Ring> = HashMap::new();
    let mut pieces: Vec<PolyMesh> = Vec::new();
    for (((n, _), mut bs), up) in order.iter().zip(branches).zip(ups) {
        let node = skeleton.node(*n)?;
        let site = Site {
            node: *n,
            center: node.position,
            radius: node.radius,
            up,
        };
        joint::sort_branches(&mut bs, up);
        let resolved = joint::resolve(&site, &bs, options)?;
        for (nb, ring) in resolved.rings {
            rings.insert((*n, nb), ring);
        }
        if !resolved.mesh.is_empty() {
            pieces.push(resolved.mesh);
        }
    }
    let num_joints = pieces.len();
    for (a, _) in &order {
        for b in skeleton.neighbors(*a)? {
            if *a > b {
                continue;
            }
            let near = rings.get(&(*a, b)).ok_or(Error::UnresolvedJoint(*a))?;
            let far = rings.get(&(b, *a)).ok_or(Error::UnresolvedJoint(b))?;
            pieces.push(tube(*a, b, near, far, options.min_edge_length)?);
        }
    }
    debug!(
        "Generating from {}: {} nodes, {} joint patches, {} tubes",
        root,
        order.len(),
        num_joints,
        pieces.len() - num_joints
    );
    let mut mesh = PolyMesh::with_capacity(
        pieces.iter().map(|p| p.num_vertices()).sum(),
        pieces.iter().map(|p| p.num_faces()).sum(),
    );
    for piece in &pieces {
        mesh.merge(piece);
    }
    let welded = mesh.weld(options.weld_tolerance)?;
    mesh.triangulate()?;
    mesh.check_closed_manifold()?;
    mesh.subdivide(options.subdivisions)?;
    debug!(
        "Generated {} vertices and {} faces, welded {} vertices",
        mesh.num_vertices(),
        mesh.num_faces(),
        welded
    );
    Ok(mesh)
}

#[cfg(test)]
mod test {
    use glam::{Vec3, vec3};

    use super::{base_normals, plane_normal};
    use crate::{
        bmesh::{GenerateOptions, IsolatedNode, joint::Branch},
        element::NodeH,
        error::ErrorKind,
        macros::{assert_f32_eq, assert_vec3_eq},
        mesh::PolyMesh,
        skeleton::Skeleton,
    };

    fn euler(mesh: &PolyMesh) -> i64 {
        mesh.num_vertices() as i64 - mesh.num_edges() as i64 + mesh.num_faces() as i64
    }

    fn skeleton(nodes: &[(Vec3, f32)], edges: &[(u32, u32)]) -> Skeleton {
        let mut sk = Skeleton::new();
        for (pos, radius) in nodes {
            sk.add_node(*pos, *radius).expect("Cannot add node");
        }
        for (a, b) in edges {
            sk.add_edge((*a).into(), (*b).into())
                .expect("Cannot add edge");
        }
        sk
    }

    fn branch(neighbor: u32, dir: Vec3) -> Branch {
        Branch {
            neighbor: neighbor.into(),
            dir: dir.normalize(),
        }
    }

    #[test]
    fn t_plane_normal() {
        let n = plane_normal(&[branch(1, vec3(1.0, 0.0, 0.0)), branch(2, vec3(0.0, -1.0, 0.0))])
            .expect("Cannot find plane");
        assert_vec3_eq!(Vec3::Z, n);
        assert!(plane_normal(&[branch(1, Vec3::X), branch(2, -Vec3::X)]).is_none());
        assert!(plane_normal(&[branch(1, Vec3::X)]).is_none());
    }

    #[test]
    fn t_base_normals_inherited() {
        // Straight chain 0 - 1 - 2 bending at 2 towards 3 in the XY plane.
        let order = vec![
            (NodeH::from(0u32), None),
            (1.into(), Some(0.into())),
            (2.into(), Some(1.into())),
            (3.into(), Some(2.into())),
        ];
        let branches = vec![
            vec![branch(1, Vec3::X)],
            vec![branch(0, -Vec3::X), branch(2, Vec3::X)],
            vec![branch(1, -Vec3::X), branch(3, Vec3::Y)],
            vec![branch(2, -Vec3::Y)],
        ];
        let ups = base_normals(&order, &branches);
        for up in ups {
            assert_vec3_eq!(Vec3::Z, up);
        }
    }

    #[test]
    fn t_capsule() {
        let sk = skeleton(
            &[(vec3(0.0, 0.0, 0.0), 1.0), (vec3(0.0, 0.0, 5.0), 1.0)],
            &[(0, 1)],
        );
        let mesh = sk
            .generate(0.into(), &GenerateOptions::default())
            .expect("Cannot generate mesh");
        // Two rings of 12, and two domes of 2 rings with a tip each.
        assert_eq!(74, mesh.num_vertices());
        assert_eq!(144, mesh.num_faces());
        assert_eq!(216, mesh.num_edges());
        assert_eq!(2, euler(&mesh));
        assert!(mesh.is_triangle_mesh());
        mesh.check_closed_manifold()
            .expect("Mesh is not closed");
        let volume = mesh.calc_volume();
        // Between an inscribed polyhedron and the exact capsule.
        let exact = std::f32::consts::PI * (5.0 + 4.0 / 3.0);
        assert!(volume > 0.7 * exact && volume < exact, "{}", volume);
        let (min, max) = mesh.bounding_box().expect("Mesh is empty");
        assert_f32_eq!(-1.0, min.z, 1e-5);
        assert_f32_eq!(6.0, max.z, 1e-5);
    }

    #[test]
    fn t_star() {
        let sk = skeleton(
            &[
                (vec3(0.0, 0.0, 0.0), 1.0),
                (vec3(5.0, 0.0, 0.0), 0.5),
                (vec3(-2.5, 4.0, 0.0), 0.5),
                (vec3(-2.5, -4.0, 0.0), 0.5),
            ],
            &[(0, 1), (0, 2), (0, 3)],
        );
        let (n, m) = (8, 2);
        let opts = GenerateOptions::default()
            .with_ring_segments(n)
            .with_cap_rings(m);
        let mesh = sk.generate(0.into(), &opts).expect("Cannot generate mesh");
        // Hull of three rings, and a dome with its own ring for every leaf.
        assert_eq!(3 * n + 3 * (n + m * n + 1), mesh.num_vertices());
        assert_eq!((3 * n + 2) + 3 * 2 * n + 3 * (2 * m * n + n), mesh.num_faces());
        assert_eq!(2, euler(&mesh));
        mesh.check_closed_manifold()
            .expect("Mesh is not closed");
        assert!(mesh.calc_volume() > 0.0);
    }

    #[test]
    fn t_chain_and_bend() {
        // Straight through node 1, sharp bend at node 2.
        let sk = skeleton(
            &[
                (vec3(0.0, 0.0, 0.0), 1.0),
                (vec3(4.0, 0.0, 0.0), 1.0),
                (vec3(8.0, 0.0, 0.0), 1.0),
                (vec3(8.0, 4.0, 0.0), 1.0),
            ],
            &[(0, 1), (1, 2), (2, 3)],
        );
        let n = 12;
        let mesh = sk
            .generate(0.into(), &GenerateOptions::default())
            .expect("Cannot generate mesh");
        // Two domes, one ring shared through node 1 and two rings wrapped at
        // the bend.
        assert_eq!(2 * (3 * n + 1) + n + 2 * n, mesh.num_vertices());
        assert_eq!(2, euler(&mesh));
        mesh.check_closed_manifold()
            .expect("Mesh is not closed");
    }

    #[test]
    fn t_cycle() {
        let sk = skeleton(
            &[
                (vec3(0.0, 0.0, 0.0), 1.0),
                (vec3(6.0, 0.0, 0.0), 1.0),
                (vec3(6.0, 6.0, 0.0), 1.0),
                (vec3(0.0, 6.0, 0.0), 1.0),
            ],
            &[(0, 1), (1, 2), (2, 3), (3, 0)],
        );
        let mesh = sk
            .generate(2.into(), &GenerateOptions::default())
            .expect("Cannot generate mesh");
        mesh.check_closed_manifold()
            .expect("Mesh is not closed");
        // A torus.
        assert_eq!(0, euler(&mesh));
    }

    #[test]
    fn t_component_only() {
        let sk = skeleton(
            &[
                (vec3(0.0, 0.0, 0.0), 1.0),
                (vec3(0.0, 0.0, 5.0), 1.0),
                (vec3(20.0, 0.0, 0.0), 1.0),
                (vec3(20.0, 0.0, 5.0), 1.0),
                (vec3(20.0, 0.0, 10.0), 1.0),
            ],
            &[(0, 1), (2, 3), (3, 4)],
        );
        let mesh = sk
            .generate(1.into(), &GenerateOptions::default())
            .expect("Cannot generate mesh");
        assert_eq!(74, mesh.num_vertices());
        let (_, max) = mesh.bounding_box().expect("Mesh is empty");
        assert!(max.x < 2.0);
    }

    #[test]
    fn t_isolated_node() {
        let sk = skeleton(&[(vec3(1.0, 2.0, 3.0), 2.0)], &[]);
        let empty = sk
            .generate(0.into(), &GenerateOptions::default())
            .expect("Cannot generate mesh");
        assert!(empty.is_empty());
        let opts = GenerateOptions::default().with_isolated_node(IsolatedNode::Sphere);
        let sphere = sk.generate(0.into(), &opts).expect("Cannot generate mesh");
        sphere
            .check_closed_manifold()
            .expect("Sphere is not closed");
        assert!(sphere.is_triangle_mesh());
        for p in sphere.points() {
            assert!((p.distance(vec3(1.0, 2.0, 3.0)) - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn t_generation_errors() {
        let sk = skeleton(
            &[(vec3(0.0, 0.0, 0.0), 1.0), (vec3(0.0, 0.0, 5.0), 1e-6)],
            &[(0, 1)],
        );
        let opts = GenerateOptions::default();
        let err = sk
            .generate(7.into(), &opts)
            .expect_err("Generated from a missing root");
        assert_eq!(ErrorKind::UnreachableRoot, err.kind());
        let err = sk
            .generate(0.into(), &opts)
            .expect_err("Generated with a tiny radius");
        assert_eq!(ErrorKind::DegenerateEdge, err.kind());
        let short = skeleton(
            &[(vec3(0.0, 0.0, 0.0), 1.0), (vec3(0.0, 0.0, 0.5), 1.0)],
            &[(0, 1)],
        );
        let err = short
            .generate(0.into(), &opts.with_min_edge_length(1.0))
            .expect_err("Generated a short edge");
        assert_eq!(ErrorKind::DegenerateEdge, err.kind());
    }

    #[test]
    fn t_deterministic() {
        let sk = skeleton(
            &[
                (vec3(0.0, 0.0, 0.0), 1.0),
                (vec3(4.0, 1.0, 0.0), 0.7),
                (vec3(-3.0, 3.0, 1.0), 0.6),
                (vec3(-1.0, -4.0, -1.0), 0.5),
                (vec3(0.0, 0.5, 4.0), 0.8),
            ],
            &[(0, 1), (0, 2), (0, 3), (0, 4)],
        );
        let before = format!("{:?}", sk);
        let opts = GenerateOptions::default();
        let a = sk.generate(0.into(), &opts).expect("Cannot generate mesh");
        let b = sk.generate(0.into(), &opts).expect("Cannot generate mesh");
        assert_eq!(a.points(), b.points());
        assert!(a.face_lists().eq(b.face_lists()));
        assert_eq!(before, format!("{:?}", sk));
        a.check_closed_manifold()
            .expect("Mesh is not closed");
    }
}
