use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Vec2, Vec3};
use log::{trace, warn};

use super::{
    GenerateOptions,
    segment::Ring,
    wrap::{WrapFailure, wrap},
};
use crate::{
    element::{NodeH, VH},
    error::Error,
    mesh::PolyMesh,
    vector,
};

/// Two edges bending by less than this share one ring at their node.
const BRIDGE_ANGLE: f32 = 2.0 * PI / 3.0;
/// Edges leaving a node closer than this angle are coincident.
const COINCIDENT_ANGLE: f32 = 1e-3;
/// Factor by which ring angles shrink after a failed wrap.
const SHRINK: f32 = 0.8;

/// An edge leaving a node.
#[derive(Debug, Clone, Copy)]
pub(super) struct Branch {
    pub neighbor: NodeH,
    /// Unit direction towards the neighbor.
    pub dir: Vec3,
}

/// The mesh patch at a node, and the rings it leaves open for the tubes.
#[derive(Debug, Clone)]
pub(super) struct Joint {
    pub rings: Vec<(NodeH, Ring)>,
    pub mesh: PolyMesh,
}

/// The sphere of a node and the "up" direction orienting its rings.
#[derive(Debug, Clone, Copy)]
pub(super) struct Site {
    pub node: NodeH,
    pub center: Vec3,
    pub radius: f32,
    pub up: Vec3,
}

fn vh(i: usize) -> VH {
    (i as u32).into()
}

/// Radii of a ring of the given `radius`, along and across the "up"
/// direction of its node.
fn ring_radii(radius: f32, options: &GenerateOptions) -> Vec2 {
    Vec2::new(radius * options.deform_thickness, radius * options.deform_width)
}

/// Sort branches by their angle around `up`, breaking ties with the
/// neighbor index.
pub(super) fn sort_branches(branches: &mut [Branch], up: Vec3) {
    let (e1, e2) = vector::frame(up, Vec3::X);
    branches.sort_by(|a, b| {
        vector::angle_around(a.dir, e1, e2)
            .total_cmp(&vector::angle_around(b.dir, e1, e2))
            .then(a.neighbor.cmp(&b.neighbor))
    });
}

/// Resolve the joint at `site`, with its branches already sorted.
pub(super) fn resolve(
    site: &Site,
    branches: &[Branch],
    options: &GenerateOptions,
) -> Result<Joint, Error> {
    for (i, a) in branches.iter().enumerate() {
        if branches[(i + 1)..]
            .iter()
            .any(|b| a.dir.angle_between(b.dir) < COINCIDENT_ANGLE)
        {
            return Err(Error::CoincidentBranches(site.node));
        }
    }
    match branches {
        [] => Ok(Joint {
            rings: Vec::new(),
            mesh: PolyMesh::new(),
        }),
        [branch] => cap(site, branch, options),
        [b0, b1] if b0.dir.angle_between(b1.dir) >= BRIDGE_ANGLE => bridge(site, b0, b1, options),
        _ => hull(site, branches, options),
    }
}

/// Close the single tube at a terminal node with a dome.
fn cap(site: &Site, branch: &Branch, options: &GenerateOptions) -> Result<Joint, Error> {
    let n = options.ring_segments;
    let m = options.cap_rings;
    let (c, r, u) = (site.center, site.radius, branch.dir);
    let base = Ring::new(c, u, site.up, ring_radii(r, options), n);
    let mut mesh = PolyMesh::with_capacity(n * (m + 1) + 1, n * (m + 1));
    mesh.add_vertices(&base.points)?;
    for j in 1..=m {
        let phi = FRAC_PI_2 * j as f32 / (m + 1) as f32;
        let layer = Ring::ellipse(
            c - u * (r * phi.sin()),
            u,
            site.up,
            ring_radii(r * phi.cos(), options),
            n,
        );
        mesh.add_vertices(&layer)?;
    }
    let apex = mesh.add_vertex(c - u * r)?;
    for j in 0..m {
        let (lo, hi) = (j * n, (j + 1) * n);
        for k in 0..n {
            let k1 = (k + 1) % n;
            mesh.add_quad_face(vh(lo + k1), vh(lo + k), vh(hi + k), vh(hi + k1))?;
        }
    }
    let last = m * n;
    for k in 0..n {
        mesh.add_tri_face(vh(last + (k + 1) % n), vh(last + k), apex)?;
    }
    trace!("Capped {} towards {}", site.node, branch.neighbor);
    Ok(Joint {
        rings: vec![(branch.neighbor, base)],
        mesh,
    })
}

/// Share one ring between two nearly collinear tubes. The ring lies in the
/// plane bisecting the bend.
fn bridge(site: &Site, b0: &Branch, b1: &Branch, options: &GenerateOptions) -> Result<Joint, Error> {
    let normal = vector::try_normalize(b1.dir - b0.dir)?;
    let toward1 = Ring {
        center: site.center,
        axis: b1.dir,
        points: Ring::ellipse(
            site.center,
            normal,
            site.up,
            ring_radii(site.radius, options),
            options.ring_segments,
        ),
    };
    let toward0 = Ring {
        center: site.center,
        axis: b0.dir,
        points: toward1.reversed_points(),
    };
    trace!(
        "Bridged {} between {} and {}",
        site.node, b0.neighbor, b1.neighbor
    );
    Ok(Joint {
        rings: vec![(b0.neighbor, toward0), (b1.neighbor, toward1)],
        mesh: PolyMesh::new(),
    })
}

/// Place a ring for every branch on the node sphere and wrap them all in
/// their convex hull. The rings are shrunk and wrapped again when wrapping
/// fails.
fn hull(site: &Site, branches: &[Branch], options: &GenerateOptions) -> Result<Joint, Error> {
    let max_angles: Vec<f32> = branches
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let closest = branches
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, b)| a.dir.angle_between(b.dir))
                .fold(PI, f32::min);
            options.branch_cap_angle.min(0.45 * closest)
        })
        .collect();
    let tolerance = 1e-4 * site.radius;
    let mut scale = 1.0f32;
    let mut failure: Option<WrapFailure> = None;
    for attempt in 0..options.wrap_attempts {
        let rings: Vec<Ring> = branches
            .iter()
            .zip(max_angles.iter())
            .map(|(branch, max_angle)| {
                let alpha = max_angle * scale;
                Ring::new(
                    site.center + branch.dir * (site.radius * alpha.cos()),
                    branch.dir,
                    site.up,
                    ring_radii(site.radius * alpha.sin(), options),
                    options.ring_segments,
                )
            })
            .collect();
        match wrap(&rings, tolerance) {
            Ok((points, triangles)) => {
                let mut mesh = PolyMesh::with_capacity(points.len(), triangles.len());
                mesh.add_vertices(&points)?;
                for [a, b, c] in triangles {
                    mesh.add_tri_face(vh(a), vh(b), vh(c))?;
                }
                trace!(
                    "Wrapped {} rings at {} into {} triangles",
                    rings.len(),
                    site.node,
                    mesh.num_faces()
                );
                return Ok(Joint {
                    rings: branches
                        .iter()
                        .map(|b| b.neighbor)
                        .zip(rings)
                        .collect(),
                    mesh,
                });
            }
            Err(reason) => {
                warn!(
                    "Wrapping the joint at {} failed on attempt {}: {:?}. Shrinking its rings.",
                    site.node,
                    attempt + 1,
                    reason
                );
                failure = Some(reason);
                scale *= SHRINK;
            }
        }
    }
    warn!(
        "Giving up on the joint at {} after {} attempts, last failure {:?}",
        site.node, options.wrap_attempts, failure
    );
    Err(Error::UnresolvedJoint(site.node))
}
