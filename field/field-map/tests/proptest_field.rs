//! Property-based tests for meshes and field maps.
//!
//! These tests use proptest to generate random meshes and zone tilings and
//! check lookup and interpolation invariants against brute-force answers.
//!
//! Run with: cargo test -p field-map -- proptest

use approx::relative_eq;
use field_map::{
    FieldBounds, FieldMap, FieldMapConfig, FieldVector, Mesh, Point3, ScaleFactor, Vector3,
    ZoneRecord,
};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Strictly increasing break-points with `min_len..=max_len` entries.
fn arb_breaks(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (
        -50.0..50.0f64,
        prop::collection::vec(0.05..5.0f64, (min_len - 1)..max_len),
    )
        .prop_map(|(start, gaps)| {
            let mut breaks = Vec::with_capacity(gaps.len() + 1);
            breaks.push(start);
            let mut x = start;
            for gap in gaps {
                x += gap;
                breaks.push(x);
            }
            breaks
        })
}

/// A built mesh with random non-uniform axes and random samples.
fn arb_mesh(min_len: usize, max_len: usize) -> impl Strategy<Value = Mesh<f64>> {
    (
        arb_breaks(min_len, max_len),
        arb_breaks(2, max_len),
        arb_breaks(2, max_len),
        0.001..10.0f64,
    )
        .prop_flat_map(|(xs, ys, zs, scale)| {
            let nodes = xs.len() * ys.len() * zs.len();
            let samples = prop::collection::vec(prop::array::uniform3(-10.0..10.0f64), nodes);
            (Just([xs, ys, zs]), samples, Just(scale))
        })
        .prop_map(|(axes, samples, scale)| build_mesh(axes, &samples, scale))
}

/// Random zone edges per axis, a keep mask over the grid cells, overlapping
/// extra boxes, and a load-order key per zone.
fn arb_tiling() -> impl Strategy<Value = Tiling> {
    (
        [arb_breaks(2, 5), arb_breaks(2, 5), arb_breaks(2, 5)],
        prop::collection::vec(any::<bool>(), 64),
        prop::collection::vec(
            (prop::array::uniform3(0.0..1.0f64), prop::array::uniform3(0.0..1.0f64)),
            0..3,
        ),
        prop::collection::vec(any::<u32>(), 80),
    )
        .prop_map(|(edges, keep, extras, order)| Tiling {
            edges,
            keep,
            extras,
            order,
        })
}

#[derive(Debug, Clone)]
struct Tiling {
    edges: [Vec<f64>; 3],
    keep: Vec<bool>,
    extras: Vec<([f64; 3], [f64; 3])>,
    order: Vec<u32>,
}

// =============================================================================
// Helpers
// =============================================================================

fn build_mesh(axes: [Vec<f64>; 3], samples: &[[f64; 3]], scale: f64) -> Mesh<f64> {
    let bounds = FieldBounds::from_extents(
        [axes[0][0], axes[0][axes[0].len() - 1]],
        [axes[1][0], axes[1][axes[1].len() - 1]],
        [axes[2][0], axes[2][axes[2].len() - 1]],
    );
    let mut mesh = Mesh::new(bounds, scale);
    for (axis, coords) in axes.iter().enumerate() {
        for &c in coords {
            mesh.append_mesh(axis, c);
        }
    }
    for &s in samples {
        mesh.append_field(FieldVector::from(s));
    }
    mesh.build_lut().expect("generated mesh is valid");
    mesh
}

/// Point at fractions `f` of the box, clamped inside.
fn point_in(bounds: &FieldBounds, f: [f64; 3]) -> Point3<f64> {
    Point3::from(std::array::from_fn::<f64, 3, _>(|a| {
        f[a].mul_add(bounds.width(a), bounds.min_axis(a)).min(bounds.max_axis(a))
    }))
}

/// A smooth field sampled at every node of every zone.
fn smooth(p: [f64; 3]) -> [f64; 3] {
    [
        (0.1 * p[0]).sin() + 0.01 * p[1] * p[2],
        (0.2 * p[1]).cos(),
        0.05 * p[0] * p[2] - 0.3,
    ]
}

/// One zone over `[min, max]` with an extra break-point per axis at
/// fraction `split` of the width.
fn zone_record(id: i32, min: [f64; 3], max: [f64; 3], split: f64, uniform: Option<f64>) -> ZoneRecord<f64> {
    let mesh: [Vec<f64>; 3] = std::array::from_fn(|a| {
        vec![min[a], split.mul_add(max[a] - min[a], min[a]), max[a]]
    });
    let mut samples = Vec::with_capacity(27);
    for &x in &mesh[0] {
        for &y in &mesh[1] {
            for &z in &mesh[2] {
                let value = uniform.map_or_else(|| smooth([x, y, z]), |v| [v, 0.0, 0.0]);
                samples.push(FieldVector::from(value));
            }
        }
    }
    ZoneRecord {
        id,
        min,
        max,
        unit_scale: 1.0,
        mesh,
        samples,
    }
}

/// Zone records for a tiling, in shuffled load order.
///
/// With `all_cells` every grid cell becomes a zone and extras are skipped,
/// giving a gap-free, non-overlapping partition.
fn tiling_records(t: &Tiling, all_cells: bool, smooth_samples: bool) -> Vec<ZoneRecord<f64>> {
    let [xs, ys, zs] = &t.edges;
    let mut boxes = Vec::new();
    for ix in 0..xs.len() - 1 {
        for iy in 0..ys.len() - 1 {
            for iz in 0..zs.len() - 1 {
                let k = (ix * (ys.len() - 1) + iy) * (zs.len() - 1) + iz;
                if all_cells || k == 0 || t.keep[k % t.keep.len()] {
                    boxes.push(([xs[ix], ys[iy], zs[iz]], [xs[ix + 1], ys[iy + 1], zs[iz + 1]]));
                }
            }
        }
    }
    if !all_cells {
        for (a, b) in &t.extras {
            let span = |axis: usize| -> Option<(f64, f64)> {
                let e = &t.edges[axis];
                let pick = |f: f64| ((f * e.len() as f64) as usize).min(e.len() - 1);
                let (lo, hi) = (pick(a[axis]).min(pick(b[axis])), pick(a[axis]).max(pick(b[axis])));
                (lo < hi).then_some((e[lo], e[hi]))
            };
            if let (Some(x), Some(y), Some(z)) = (span(0), span(1), span(2)) {
                boxes.push(([x.0, y.0, z.0], [x.1, y.1, z.1]));
            }
        }
    }

    let mut keyed: Vec<(u32, usize)> = (0..boxes.len())
        .map(|i| (t.order[i % t.order.len()], i))
        .collect();
    keyed.sort_unstable();

    keyed
        .into_iter()
        .map(|(_, i)| {
            let (min, max) = boxes[i];
            let id = i32::try_from(i).expect("few zones");
            let split = 0.3 + 0.4 * f64::from(t.order[i % t.order.len()] % 100) / 100.0;
            let uniform = (!smooth_samples).then_some(f64::from(id));
            zone_record(id, min, max, split, uniform)
        })
        .collect()
}

/// Edges plus cell midpoints along one axis.
fn probe_coords(edges: &[f64]) -> Vec<f64> {
    let mut coords = edges.to_vec();
    coords.extend(edges.windows(2).map(|w| f64::midpoint(w[0], w[1])));
    coords
}

fn on_face(bounds: &FieldBounds, p: &Point3<f64>) -> bool {
    (0..3).any(|a| p[a] == bounds.min_axis(a) || p[a] == bounds.max_axis(a))
}

// =============================================================================
// Property Tests: Mesh
// =============================================================================

proptest! {
    /// The located cell always contains the query point.
    #[test]
    fn located_cell_contains_point(
        mesh in arb_mesh(2, 12),
        fractions in prop::collection::vec(prop::array::uniform3(0.0..=1.0f64), 1..40),
    ) {
        for f in fractions {
            let p = point_in(mesh.bounds(), f);
            let cell = mesh.locate_cell(&p);
            prop_assert!(cell.is_some(), "{:?} not located", p);
            let cell = cell.unwrap_or_default();
            for axis in 0..3 {
                let c = mesh.coords(axis);
                let i = cell[axis];
                prop_assert!(
                    c[i] <= p[axis] && p[axis] <= c[i + 1],
                    "axis {} coordinate {} not in [{}, {}]", axis, p[axis], c[i], c[i + 1]
                );
            }
        }
    }

    /// Every node returns its stored sample, scaled, bit for bit.
    #[test]
    fn corners_are_exact(mesh in arb_mesh(2, 6), factor in 0.1..3.0f64) {
        let [nx, ny, nz] = mesh.dimensions();
        for ix in 0..nx {
            for iy in 0..ny {
                for iz in 0..nz {
                    let p = Point3::new(mesh.coords(0)[ix], mesh.coords(1)[iy], mesh.coords(2)[iz]);
                    let cache = mesh.cache_at(&p, factor);
                    prop_assert!(cache.is_some());
                    let b = cache.map(|c| c.field(&p)).unwrap_or_default();
                    let sample = mesh.node(ix, iy, iz).copied().unwrap_or_default();
                    prop_assert_eq!(b, sample.scaled(factor) * mesh.scale());
                }
            }
        }
    }

    /// Adjacent cells agree on their shared face.
    #[test]
    fn interpolation_is_continuous_across_faces(
        mesh in arb_mesh(3, 8),
        pick in 0.0..1.0f64,
        fy in 0.0..=1.0f64,
        fz in 0.0..=1.0f64,
    ) {
        let xs = mesh.coords(0);
        let interior = xs.len() - 2;
        let i = 1 + ((pick * interior as f64) as usize).min(interior - 1);
        let face = point_in(mesh.bounds(), [0.0, fy, fz]);
        let face = Point3::new(xs[i], face.y, face.z);

        let left = Point3::new(f64::midpoint(xs[i - 1], xs[i]), face.y, face.z);
        let right = Point3::new(f64::midpoint(xs[i], xs[i + 1]), face.y, face.z);
        let from_left = mesh.cache_at(&left, 1.0).map(|c| c.field(&face));
        let from_right = mesh.cache_at(&right, 1.0).map(|c| c.field(&face));

        prop_assert!(from_left.is_some() && from_right.is_some());
        let (l, r) = (from_left.unwrap_or_default(), from_right.unwrap_or_default());
        prop_assert!(relative_eq!(l, r, epsilon = 1e-9, max_relative = 1e-9), "{} != {}", l, r);
    }
}

// =============================================================================
// Property Tests: Zone lookup
// =============================================================================

proptest! {
    /// The zone table agrees with a last-loaded-wins linear scan everywhere,
    /// including on shared faces, edges and corners.
    #[test]
    fn zone_lookup_matches_linear_scan(
        tiling in arb_tiling(),
        fractions in prop::collection::vec(prop::array::uniform3(0.0..=1.0f64), 0..30),
    ) {
        let map = FieldMap::from_records(tiling_records(&tiling, false, false), FieldMapConfig::default())
            .expect("generated tiling is valid");

        let probes = [
            probe_coords(map.edges(0)),
            probe_coords(map.edges(1)),
            probe_coords(map.edges(2)),
        ];
        for &x in &probes[0] {
            for &y in &probes[1] {
                for &z in &probes[2] {
                    let p = Point3::new(x, y, z);
                    prop_assert_eq!(map.find_zone_index(&p), map.find_zone_index_slow(&p), "at {:?}", p);
                }
            }
        }
        for f in fractions {
            let p = point_in(map.bounds(), f);
            prop_assert_eq!(map.find_zone_index(&p), map.find_zone_index_slow(&p), "at {:?}", p);
        }
    }

    /// Points outside the global box resolve to no zone.
    #[test]
    fn outside_global_box_has_no_zone(tiling in arb_tiling(), axis in 0..3usize, above in any::<bool>()) {
        let map = FieldMap::from_records(tiling_records(&tiling, false, false), FieldMapConfig::default())
            .expect("generated tiling is valid");
        let mut p = map.bounds().center();
        p[axis] = if above { map.bounds().max_axis(axis) + 0.01 } else { map.bounds().min_axis(axis) - 0.01 };
        prop_assert!(map.find_zone(&p).is_none());
        prop_assert_eq!(map.field_uncached(&p, 1.0), map.fallback_field());
    }
}

// =============================================================================
// Property Tests: Query cache and rescaling
// =============================================================================

proptest! {
    /// A cached walk returns exactly what fresh lookups return, except on
    /// the faces of the cached cell where either neighbour may answer.
    #[test]
    fn cached_walk_matches_uncached(
        tiling in arb_tiling(),
        start in prop::array::uniform3(0.0..1.0f64),
        steps in prop::collection::vec(prop::array::uniform3(-0.4..0.4f64), 1..150),
        factor in 0.5..2.0f64,
    ) {
        let map = FieldMap::from_records(tiling_records(&tiling, true, true), FieldMapConfig::default())
            .expect("generated tiling is valid");
        let mut query = map.query(ScaleFactor::new(factor)).expect("built");

        let mut p = point_in(map.bounds(), start);
        for step in steps {
            p += Vector3::from(step);
            let cached = query.field(&p);
            if on_face(query.cache().bounds(), &p) {
                continue;
            }
            prop_assert_eq!(cached, map.field_uncached(&p, factor), "at {:?}", p);
        }
        prop_assert!(query.stats().total() > 0);
    }

    /// Rescaling touches the configured zone only, and does not accumulate.
    #[test]
    fn rescale_is_isolated(
        tiling in arb_tiling(),
        pick in any::<prop::sample::Index>(),
        factor in -3.0..3.0f64,
        fractions in prop::collection::vec(prop::array::uniform3(0.0..1.0f64), 1..30),
    ) {
        let records = tiling_records(&tiling, true, true);
        let dipole = records[pick.index(records.len())].id;
        let mut map = FieldMap::from_records(records, FieldMapConfig::with_dipole(dipole))
            .expect("generated tiling is valid");

        let points: Vec<Point3<f64>> = fractions.iter().map(|&f| point_in(map.bounds(), f)).collect();
        let before: Vec<Vector3<f64>> = points.iter().map(|p| map.field_uncached(p, 1.0)).collect();

        map.rescale_zone(factor).expect("finite factor");
        map.rescale_zone(factor).expect("finite factor");

        for (p, b0) in points.iter().zip(&before) {
            let b1 = map.field_uncached(p, 1.0);
            if map.find_zone(p).map(|z| z.id()) == Some(dipole) {
                prop_assert!(relative_eq!(b1, b0 * factor, epsilon = 1e-12, max_relative = 1e-12));
            } else {
                prop_assert_eq!(b1, *b0);
            }
        }
    }
}
