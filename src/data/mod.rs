use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, JsonObject, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A single polygon: exterior ring plus any interior holes,
/// as (lon, lat) pairs in GeoJSON order.
#[derive(Clone, Debug, Default)]
pub struct PolygonGeom {
    pub exterior: Vec<(f64, f64)>,
    pub holes: Vec<Vec<(f64, f64)>>,
}

/// A named geographic region (country or province).
#[derive(Clone, Debug)]
pub struct Region {
    pub name: String,
    pub polygons: Vec<PolygonGeom>,
}

/// Results delivered from background loader threads to the event loop.
pub enum DataEvent {
    World(Vec<Region>),
    /// Province fetch result, tagged with the request generation that
    /// issued it so stale responses can be discarded.
    Provinces { epoch: u64, regions: Vec<Region> },
}

/// Filesystem-backed GeoJSON source rooted at a base directory.
#[derive(Clone)]
pub struct RegionSource {
    base: PathBuf,
}

impl RegionSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn world_path(&self) -> PathBuf {
        self.base.join("geo").join("world.geojson")
    }

    pub fn province_path(&self, country: &str) -> PathBuf {
        self.base
            .join("geo")
            .join("provincias")
            .join(format!("{}.geojson", slugify(country)))
    }

    /// Load the world country collection on a background thread.
    /// A failure degrades to an empty collection; the globe just stays bare.
    pub fn spawn_world(&self, tx: Sender<DataEvent>) {
        let path = self.world_path();
        std::thread::spawn(move || {
            let regions = match load_countries(&path) {
                Ok(regions) => {
                    info!(count = regions.len(), "loaded world countries");
                    regions
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "could not load world countries");
                    Vec::new()
                }
            };
            let _ = tx.send(DataEvent::World(regions));
        });
    }

    /// Load one country's provinces on a background thread. The result is
    /// tagged with `epoch`; the receiver drops it if the user has moved on.
    pub fn spawn_provinces(&self, country: &str, epoch: u64, tx: Sender<DataEvent>) {
        let path = self.province_path(country);
        let country = country.to_string();
        std::thread::spawn(move || {
            let regions = match load_provinces(&path) {
                Ok(regions) => {
                    info!(%country, count = regions.len(), "loaded provinces");
                    regions
                }
                Err(err) => {
                    warn!(%country, path = %path.display(), %err, "could not load provinces");
                    Vec::new()
                }
            };
            let _ = tx.send(DataEvent::Provinces { epoch, regions });
        });
    }
}

/// Derive the on-disk slug for a country name: lowercase, whitespace to
/// hyphens, then NFD decomposition with combining marks stripped
/// ("Ciudad de México" → "ciudad-de-mexico").
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Resolve a province display name by probing candidate properties in
/// priority order, falling back to a fixed placeholder.
pub fn resolve_province_name(props: Option<&JsonObject>) -> String {
    for key in ["NAME_2", "name", "state_name"] {
        if let Some(name) = props
            .and_then(|p| p.get(key))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
        {
            return name.to_string();
        }
    }
    "Unnamed".to_string()
}

/// Load the world collection; country names come from the `name` property.
pub fn load_countries(path: &Path) -> Result<Vec<Region>> {
    load_regions(path, |props| {
        props
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string()
    })
}

/// Load a province collection; display names go through the candidate probe.
pub fn load_provinces(path: &Path) -> Result<Vec<Region>> {
    load_regions(path, |props| resolve_province_name(props))
}

fn load_regions<F>(path: &Path, mut name_of: F) -> Result<Vec<Region>>
where
    F: FnMut(Option<&JsonObject>) -> String,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut regions = Vec::new();
    if let GeoJson::FeatureCollection(fc) = geojson {
        for feature in fc.features {
            let name = name_of(feature.properties.as_ref());
            let mut polygons = Vec::new();
            if let Some(ref geometry) = feature.geometry {
                collect_polygons(geometry, &mut polygons);
            }
            regions.push(Region { name, polygons });
        }
    }
    Ok(regions)
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<PolygonGeom>) {
    match &geometry.value {
        Value::Polygon(rings) => {
            if let Some(poly) = rings_to_polygon(rings) {
                out.push(poly);
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(poly) = rings_to_polygon(rings) {
                    out.push(poly);
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

fn rings_to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<PolygonGeom> {
    let mut iter = rings.iter().map(|ring| {
        ring.iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect::<Vec<_>>()
    });
    let exterior = iter.next()?;
    let holes = iter.collect();
    Some(PolygonGeom { exterior, holes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::JsonValue;

    fn props(pairs: &[(&str, &str)]) -> JsonObject {
        let mut map = JsonObject::new();
        for (k, v) in pairs {
            map.insert(k.to_string(), JsonValue::String(v.to_string()));
        }
        map
    }

    #[test]
    fn province_name_prefers_name_2() {
        let p = props(&[("NAME_2", "X"), ("name", "other")]);
        assert_eq!(resolve_province_name(Some(&p)), "X");
    }

    #[test]
    fn province_name_falls_back_to_name() {
        let p = props(&[("name", "Y")]);
        assert_eq!(resolve_province_name(Some(&p)), "Y");
    }

    #[test]
    fn province_name_falls_back_to_state_name() {
        let p = props(&[("state_name", "Z")]);
        assert_eq!(resolve_province_name(Some(&p)), "Z");
    }

    #[test]
    fn province_name_placeholder_when_absent() {
        assert_eq!(resolve_province_name(Some(&props(&[]))), "Unnamed");
        assert_eq!(resolve_province_name(None), "Unnamed");
    }

    #[test]
    fn province_name_skips_empty_strings() {
        let p = props(&[("NAME_2", ""), ("name", "Y")]);
        assert_eq!(resolve_province_name(Some(&p)), "Y");
    }

    #[test]
    fn slug_strips_diacritics_after_nfd() {
        assert_eq!(slugify("Ciudad de México"), "ciudad-de-mexico");
        assert_eq!(slugify("Bogotá"), "bogota");
        assert_eq!(slugify("Peru"), "peru");
    }

    #[test]
    fn province_path_uses_slug() {
        let source = RegionSource::new("data");
        let path = source.province_path("Ciudad de México");
        assert!(path.ends_with("geo/provincias/ciudad-de-mexico.geojson"));
    }

    #[test]
    fn parse_feature_collection_with_multipolygon() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "Atlantis"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]],
                        [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
                    ]
                }
            }]
        }"#;
        let dir = std::env::temp_dir().join("globe-hopper-test-mp");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("world.geojson");
        std::fs::write(&path, raw).unwrap();

        let regions = load_countries(&path).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name, "Atlantis");
        assert_eq!(regions[0].polygons.len(), 2);
        assert_eq!(regions[0].polygons[0].exterior.len(), 5);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_countries(Path::new("/nonexistent/world.geojson")).is_err());
    }
}
