use crate::braille::BrailleCanvas;
use crate::data::Region;
use crate::map::geometry::{draw_line, fill_polygon};
use crate::map::globe::{walk_great_circle, GlobeViewport};

/// Rendered map output, split into layers so the UI can color them
/// independently: plain outlines at the back, then the hovered region,
/// then the selected region on top.
pub struct RegionLayers {
    pub outlines: BrailleCanvas,
    pub hovered: BrailleCanvas,
    pub selected: BrailleCanvas,
}

/// Render a region collection onto braille layers through the globe
/// projection. `hovered`/`selected` are indices into `regions`.
pub fn render_regions(
    regions: &[Region],
    hovered: Option<usize>,
    selected: Option<usize>,
    globe: &GlobeViewport,
    cols: usize,
    rows: usize,
) -> RegionLayers {
    let mut layers = RegionLayers {
        outlines: BrailleCanvas::new(cols, rows),
        hovered: BrailleCanvas::new(cols, rows),
        selected: BrailleCanvas::new(cols, rows),
    };

    for (idx, region) in regions.iter().enumerate() {
        let canvas = if Some(idx) == selected {
            &mut layers.selected
        } else if Some(idx) == hovered {
            &mut layers.hovered
        } else {
            &mut layers.outlines
        };
        let fill = Some(idx) == selected || Some(idx) == hovered;

        for poly in &region.polygons {
            draw_ring(canvas, &poly.exterior, globe, fill);
            for hole in &poly.holes {
                draw_ring(canvas, hole, globe, false);
            }
        }
    }

    layers
}

/// Draw one ring: great-circle subdivided outline, optionally filled.
fn draw_ring(canvas: &mut BrailleCanvas, ring: &[(f64, f64)], globe: &GlobeViewport, fill: bool) {
    if ring.len() < 2 {
        return;
    }

    let mut projected: Vec<(i32, i32)> = Vec::with_capacity(ring.len() * 2);
    let mut prev: Option<(i32, i32)> = None;
    let mut any_backface = false;

    let mut visit = |lon: f64, lat: f64| {
        match globe.project(lon, lat) {
            Some((px, py)) => {
                if let Some((prev_x, prev_y)) = prev {
                    if globe.line_might_be_visible((prev_x, prev_y), (px, py)) {
                        draw_line(canvas, prev_x, prev_y, px, py);
                    }
                }
                projected.push((px, py));
                prev = Some((px, py));
            }
            None => {
                any_backface = true;
                prev = None;
            }
        }
    };

    let (lon0, lat0) = ring[0];
    visit(lon0, lat0);
    for window in ring.windows(2) {
        let (alon, alat) = window[0];
        let (blon, blat) = window[1];
        walk_great_circle(alon, alat, blon, blat, &mut visit);
    }
    // Close the ring back to the first vertex
    if let (Some(&(llon, llat)), true) = (ring.last(), ring.len() > 2) {
        walk_great_circle(llon, llat, lon0, lat0, &mut visit);
    }

    // Fill only rings that are entirely front-facing; a part-hidden ring
    // would produce a garbage silhouette when scanline-filled.
    if fill && !any_backface {
        fill_polygon(canvas, &projected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PolygonGeom;

    fn region(name: &str, exterior: Vec<(f64, f64)>) -> Region {
        Region {
            name: name.to_string(),
            polygons: vec![PolygonGeom {
                exterior,
                holes: vec![],
            }],
        }
    }

    fn painted(canvas: &BrailleCanvas) -> usize {
        canvas
            .rows()
            .map(|r| r.chars().filter(|&c| c != '\u{2800}').count())
            .sum()
    }

    #[test]
    fn hovered_region_lands_on_its_own_layer() {
        let globe = GlobeViewport::new(5.0, 5.0, 60.0, 160, 160);
        let regions = vec![
            region("front", vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            region("side", vec![(20.0, 0.0), (30.0, 0.0), (30.0, 10.0), (20.0, 10.0)]),
        ];

        let layers = render_regions(&regions, Some(0), None, &globe, 80, 40);
        assert!(painted(&layers.hovered) > 0);
        assert!(painted(&layers.outlines) > 0);
        assert_eq!(painted(&layers.selected), 0);

        // Selecting moves the region to the selected layer
        let selected = render_regions(&regions, None, Some(0), &globe, 80, 40);
        assert!(painted(&selected.selected) > 0);
        assert_eq!(painted(&selected.hovered), 0);
    }

    #[test]
    fn back_face_regions_draw_nothing() {
        let globe = GlobeViewport::new(0.0, 0.0, 60.0, 160, 160);
        let regions = vec![region(
            "antipode",
            vec![(175.0, 0.0), (-175.0, 0.0), (-175.0, 5.0), (175.0, 5.0)],
        )];
        let layers = render_regions(&regions, None, None, &globe, 80, 40);
        assert_eq!(painted(&layers.outlines), 0);
    }

    #[test]
    fn empty_collection_renders_empty_layers() {
        let globe = GlobeViewport::world(160, 160);
        let layers = render_regions(&[], None, None, &globe, 80, 40);
        assert_eq!(painted(&layers.outlines), 0);
        assert_eq!(painted(&layers.hovered), 0);
        assert_eq!(painted(&layers.selected), 0);
    }
}
