/*!
Generation of a closed mesh from a [`Skeleton`] of spheres.

Every edge of the skeleton becomes a tube between two rings of points, one
ring at each end. Every node closes or connects the rings around it:

+ A terminal node caps its ring with a dome.
+ A node with two nearly collinear edges shares one ring between both tubes.
+ Sharp bends and branches move their rings onto the node sphere and wrap
  them in the convex hull of all their points.

The pieces are merged, welded along the shared rings and triangulated.
*/

mod assemble;
mod joint;
mod segment;
mod wrap;

use std::f32::consts::PI;

use crate::{element::NodeH, error::Error, mesh::PolyMesh, skeleton::Skeleton};

const MIN_DEFORM: f32 = 1e-3;

/// What to do with a root node that has no edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolatedNode {
    /// Produce an empty mesh.
    #[default]
    Skip,
    /// Produce a sphere approximating the node.
    Sphere,
}

/// Parameters of mesh generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    /// Number of points in each ring around a tube. At least 3.
    pub ring_segments: usize,
    /// Number of rings between the base and the tip of a dome closing a
    /// terminal node.
    pub cap_rings: usize,
    /// Edges shorter than this, after the rings at both ends are placed, are
    /// rejected.
    pub min_edge_length: f32,
    /// Nodes with a radius below this are rejected.
    pub min_radius: f32,
    /// Distance within which vertices of adjacent pieces are welded.
    pub weld_tolerance: f32,
    /// Largest angle, in radians, between the direction of an edge and the
    /// points of its ring on the sphere of a branch node.
    pub branch_cap_angle: f32,
    /// Number of times the rings of a branch node are shrunk and wrapped
    /// again, before giving up on the node.
    pub wrap_attempts: usize,
    /// Scale of every ring along the "up" direction of its node, flattening
    /// or thickening the tubes.
    pub deform_thickness: f32,
    /// Scale of every ring across the "up" direction of its node, widening
    /// or narrowing the tubes.
    pub deform_width: f32,
    /// What to generate for a component with a single node.
    pub isolated_node: IsolatedNode,
    /// Number of subdivision passes applied to the generated mesh.
    pub subdivisions: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            ring_segments: 12,
            cap_rings: 2,
            min_edge_length: 1e-4,
            min_radius: 1e-4,
            weld_tolerance: 1e-5,
            branch_cap_angle: PI / 3.0,
            wrap_attempts: 8,
            deform_thickness: 1.0,
            deform_width: 1.0,
            isolated_node: IsolatedNode::Skip,
            subdivisions: 0,
        }
    }
}

impl GenerateOptions {
    pub fn with_ring_segments(mut self, segments: usize) -> Self {
        self.ring_segments = segments.max(3);
        self
    }

    pub fn with_cap_rings(mut self, rings: usize) -> Self {
        self.cap_rings = rings;
        self
    }

    pub fn with_min_edge_length(mut self, length: f32) -> Self {
        self.min_edge_length = length.max(0.0);
        self
    }

    pub fn with_min_radius(mut self, radius: f32) -> Self {
        self.min_radius = radius.max(0.0);
        self
    }

    pub fn with_weld_tolerance(mut self, tolerance: f32) -> Self {
        self.weld_tolerance = tolerance.max(0.0);
        self
    }

    /// The angle is clamped to `[0.001, pi / 2]`.
    pub fn with_branch_cap_angle(mut self, angle: f32) -> Self {
        self.branch_cap_angle = angle.clamp(1e-3, PI / 2.0);
        self
    }

    pub fn with_wrap_attempts(mut self, attempts: usize) -> Self {
        self.wrap_attempts = attempts.max(1);
        self
    }

    /// The scale is at least `0.001`.
    pub fn with_deform_thickness(mut self, scale: f32) -> Self {
        self.deform_thickness = scale.max(MIN_DEFORM);
        self
    }

    /// The scale is at least `0.001`.
    pub fn with_deform_width(mut self, scale: f32) -> Self {
        self.deform_width = scale.max(MIN_DEFORM);
        self
    }

    pub fn with_isolated_node(mut self, policy: IsolatedNode) -> Self {
        self.isolated_node = policy;
        self
    }

    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions;
        self
    }

    /// Copy of these options with every field brought into its valid range.
    pub fn sanitized(&self) -> Self {
        let fallback = Self::default();
        let finite_or = |value: f32, default: f32| if value.is_finite() { value } else { default };
        (*self)
            .with_ring_segments(self.ring_segments)
            .with_min_edge_length(finite_or(self.min_edge_length, fallback.min_edge_length))
            .with_min_radius(finite_or(self.min_radius, fallback.min_radius))
            .with_weld_tolerance(finite_or(self.weld_tolerance, fallback.weld_tolerance))
            .with_branch_cap_angle(finite_or(self.branch_cap_angle, fallback.branch_cap_angle))
            .with_wrap_attempts(self.wrap_attempts)
            .with_deform_thickness(finite_or(self.deform_thickness, fallback.deform_thickness))
            .with_deform_width(finite_or(self.deform_width, fallback.deform_width))
    }
}

impl Skeleton {
    /// Generate a closed mesh from the component of this skeleton that is
    /// reachable from `root`. Nodes and edges outside that component are
    /// ignored. The skeleton is not modified.
    ///
    /// ```rust
    /// use glam::vec3;
    /// use sinew::{GenerateOptions, Skeleton};
    ///
    /// let mut skeleton = Skeleton::new();
    /// let a = skeleton.add_node(vec3(0.0, 0.0, 0.0), 1.0).expect("Cannot add node");
    /// let b = skeleton.add_node(vec3(0.0, 0.0, 5.0), 1.0).expect("Cannot add node");
    /// skeleton.add_edge(a, b).expect("Cannot add edge");
    /// let mesh = skeleton
    ///     .generate(a, &GenerateOptions::default())
    ///     .expect("Cannot generate mesh");
    /// assert!(mesh.is_closed_manifold());
    /// ```
    pub fn generate(&self, root: NodeH, options: &GenerateOptions) -> Result<PolyMesh, Error> {
        assemble::generate(self, root, &options.sanitized())
    }
}

#[cfg(test)]
mod test {
    use std::f32::consts::PI;

    use super::{GenerateOptions, IsolatedNode};

    #[test]
    fn t_options_clamped() {
        let opts = GenerateOptions::default()
            .with_ring_segments(1)
            .with_branch_cap_angle(3.0)
            .with_wrap_attempts(0)
            .with_weld_tolerance(-1.0)
            .with_deform_width(0.0);
        assert_eq!(3, opts.ring_segments);
        assert_eq!(1e-3, opts.deform_width);
        assert_eq!(1.0, opts.deform_thickness);
        assert_eq!(PI / 2.0, opts.branch_cap_angle);
        assert_eq!(1, opts.wrap_attempts);
        assert_eq!(0.0, opts.weld_tolerance);
        assert_eq!(IsolatedNode::Skip, opts.isolated_node);
    }

    #[test]
    fn t_options_sanitized() {
        let opts = GenerateOptions {
            ring_segments: 0,
            min_radius: f32::NAN,
            branch_cap_angle: -1.0,
            deform_thickness: f32::INFINITY,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(3, opts.ring_segments);
        assert_eq!(1.0, opts.deform_thickness);
        assert_eq!(GenerateOptions::default().min_radius, opts.min_radius);
        assert!(opts.branch_cap_angle > 0.0);
        assert_eq!(
            GenerateOptions::default(),
            GenerateOptions::default().sanitized()
        );
    }
}
