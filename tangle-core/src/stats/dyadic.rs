//! Dyadic-covariate change statistics.
//!
//! Both covariates are derived on the fly from pairs of continuous
//! columns; a missing coordinate on either endpoint contributes zero.

use crate::graph::{Digraph, NodeId};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between the endpoints' latitude
/// and longitude columns (decimal degrees), by the haversine formula.
pub(super) fn geo_distance(g: &Digraph, i: NodeId, j: NodeId, lat: usize, lon: usize) -> f64 {
    let attrs = g.attributes();
    let (lat_i, lon_i) = (attrs.continuous(lat).get(i), attrs.continuous(lon).get(i));
    let (lat_j, lon_j) = (attrs.continuous(lat).get(j), attrs.continuous(lon).get(j));
    if lat_i.is_nan() || lon_i.is_nan() || lat_j.is_nan() || lon_j.is_nan() {
        return 0.0;
    }
    let (phi_i, phi_j) = (lat_i.to_radians(), lat_j.to_radians());
    let d_phi = (lat_j - lat_i).to_radians();
    let d_lambda = (lon_j - lon_i).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi_i.cos() * phi_j.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Planar distance between the endpoints' coordinate columns.
pub(super) fn euclidean_distance(g: &Digraph, i: NodeId, j: NodeId, x: usize, y: usize) -> f64 {
    let attrs = g.attributes();
    let dx = attrs.continuous(x).get(i) - attrs.continuous(x).get(j);
    let dy = attrs.continuous(y).get(i) - attrs.continuous(y).get(j);
    if dx.is_nan() || dy.is_nan() {
        return 0.0;
    }
    dx.hypot(dy)
}
