use crate::data::{PolygonGeom, Region};

/// Naive vertex centroid of a region's geometry: the arithmetic mean of
/// every ring vertex (exterior and holes alike), matching how the camera
/// target has always been aimed. Not area-weighted, so dense coastlines
/// pull the result toward them.
///
/// Returns `(lat, lon)`, or `None` for empty geometry.
pub fn vertex_centroid(polygons: &[PolygonGeom]) -> Option<(f64, f64)> {
    let mut lon_sum = 0.0;
    let mut lat_sum = 0.0;
    let mut count = 0usize;

    for poly in polygons {
        for ring in std::iter::once(&poly.exterior).chain(poly.holes.iter()) {
            for &(lon, lat) in ring {
                lon_sum += lon;
                lat_sum += lat;
                count += 1;
            }
        }
    }

    if count == 0 {
        return None;
    }
    Some((lat_sum / count as f64, lon_sum / count as f64))
}

/// Ray-casting point-in-ring test on raw lon/lat coordinates.
/// Antimeridian-crossing rings are not handled specially; province and
/// country polygons in the source data do not straddle it.
pub fn point_in_ring(lon: f64, lat: f64, ring: &[(f64, f64)]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) {
            let x_cross = (xj - xi) * (lat - yi) / (yj - yi) + xi;
            if lon < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Does the point fall inside the region (inside an exterior, outside
/// that polygon's holes)?
pub fn region_contains(region: &Region, lon: f64, lat: f64) -> bool {
    region.polygons.iter().any(|poly| {
        point_in_ring(lon, lat, &poly.exterior)
            && !poly.holes.iter().any(|hole| point_in_ring(lon, lat, hole))
    })
}

/// Index of the first region containing the point, if any.
pub fn region_at(regions: &[Region], lon: f64, lat: f64) -> Option<usize> {
    regions.iter().position(|r| region_contains(r, lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<(f64, f64)> {
        vec![(x0, y0), (x0, y1), (x1, y1), (x1, y0), (x0, y0)]
    }

    fn region(name: &str, polygons: Vec<PolygonGeom>) -> Region {
        Region {
            name: name.to_string(),
            polygons,
        }
    }

    #[test]
    fn centroid_of_unit_square() {
        // (lng, lat) vertices (0,0),(0,2),(2,2),(2,0) → target lat=1, lng=1
        let poly = PolygonGeom {
            exterior: vec![(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)],
            holes: vec![],
        };
        let (lat, lon) = vertex_centroid(&[poly]).unwrap();
        assert_eq!(lat, 1.0);
        assert_eq!(lon, 1.0);
    }

    #[test]
    fn centroid_of_empty_geometry_is_none() {
        assert!(vertex_centroid(&[]).is_none());
        let empty = PolygonGeom::default();
        assert!(vertex_centroid(&[empty]).is_none());
    }

    #[test]
    fn centroid_spans_all_rings_and_polygons() {
        let a = PolygonGeom {
            exterior: vec![(0.0, 0.0), (0.0, 4.0)],
            holes: vec![vec![(4.0, 0.0)]],
        };
        let b = PolygonGeom {
            exterior: vec![(4.0, 4.0)],
            holes: vec![],
        };
        let (lat, lon) = vertex_centroid(&[a, b]).unwrap();
        assert_eq!(lat, 2.0);
        assert_eq!(lon, 2.0);
    }

    #[test]
    fn point_in_ring_basic() {
        let ring = square(0.0, 0.0, 10.0, 10.0);
        assert!(point_in_ring(5.0, 5.0, &ring));
        assert!(!point_in_ring(15.0, 5.0, &ring));
        assert!(!point_in_ring(5.0, -1.0, &ring));
    }

    #[test]
    fn hole_excludes_point() {
        let poly = PolygonGeom {
            exterior: square(0.0, 0.0, 10.0, 10.0),
            holes: vec![square(4.0, 4.0, 6.0, 6.0)],
        };
        let r = region("holed", vec![poly]);
        assert!(region_contains(&r, 2.0, 2.0));
        assert!(!region_contains(&r, 5.0, 5.0));
    }

    #[test]
    fn region_at_picks_first_match() {
        let a = region(
            "a",
            vec![PolygonGeom {
                exterior: square(0.0, 0.0, 10.0, 10.0),
                holes: vec![],
            }],
        );
        let b = region(
            "b",
            vec![PolygonGeom {
                exterior: square(20.0, 0.0, 30.0, 10.0),
                holes: vec![],
            }],
        );
        let regions = [a, b];
        assert_eq!(region_at(&regions, 5.0, 5.0), Some(0));
        assert_eq!(region_at(&regions, 25.0, 5.0), Some(1));
        assert_eq!(region_at(&regions, 15.0, 5.0), None);
    }
}
