/// Assert that the floating point numbers are equal within the given epsilon.
#[cfg(test)]
macro_rules! assert_float_eq {
    ($a:expr, $b:expr, $eps:expr, $debug:expr) => {{
        // Make variables to avoid evaluating experssions multiple times.
        let a = $a;
        let b = $b;
        let eps = $eps;
        let error = (a - b).abs();
        if error > eps {
            eprintln!("{:?}", $debug);
        }
        assert!(
            error <= eps,
            "Assertion failed: |({}) - ({})| = {:e} <= {:e}",
            a,
            b,
            error,
            eps
        );
    }};
    ($a:expr, $b:expr, $eps:expr) => {
        $crate::macros::assert_float_eq!($a, $b, $eps, "")
    };
}

#[cfg(test)]
macro_rules! assert_f32_eq {
    ($a:expr, $b:expr, $eps:expr, $debug:expr) => {
        $crate::macros::assert_float_eq!($a, $b, $eps, $debug)
    };
    ($a:expr, $b:expr, $eps:expr) => {
        $crate::macros::assert_float_eq!($a, $b, $eps)
    };
    ($a:expr, $b:expr) => {
        $crate::macros::assert_float_eq!($a, $b, f32::EPSILON)
    };
}

/// Assert that two points are within the given distance of each other.
#[cfg(test)]
macro_rules! assert_vec3_eq {
    ($a:expr, $b:expr, $eps:expr) => {{
        let a: glam::Vec3 = $a;
        let b: glam::Vec3 = $b;
        let eps: f32 = $eps;
        let dist = a.distance(b);
        assert!(
            dist <= eps,
            "Assertion failed: |{} - {}| = {:e} <= {:e}",
            a,
            b,
            dist,
            eps
        );
    }};
    ($a:expr, $b:expr) => {
        $crate::macros::assert_vec3_eq!($a, $b, 1e-6)
    };
}

#[cfg(test)]
pub(crate) use assert_f32_eq;
#[cfg(test)]
pub(crate) use assert_float_eq;
#[cfg(test)]
pub(crate) use assert_vec3_eq;
