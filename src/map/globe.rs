use glam::DVec3;
use std::time::{Duration, Instant};

/// Camera altitude (in globe radii above the surface) shown before any
/// camera flight.
pub const DEFAULT_ALTITUDE: f64 = 2.5;

const MIN_RADIUS_FACTOR: f64 = 0.35;
const MAX_RADIUS_FACTOR: f64 = 35.0;

/// An in-progress animated camera move. Progress is driven by the event
/// loop tick; dropping the flight cancels it.
#[derive(Clone)]
struct CameraFlight {
    from_forward: DVec3,
    to_forward: DVec3,
    from_radius: f64,
    to_radius: f64,
    started: Instant,
    duration: Duration,
}

/// Globe viewport using orthographic projection of a rotating sphere.
/// Orientation stored as a rotation matrix (3 column vectors) for
/// efficient point transformation without quaternion dependency on DQuat.
#[derive(Clone)]
pub struct GlobeViewport {
    /// Forward direction (what points at the camera)
    forward: DVec3,
    /// Right direction
    right: DVec3,
    /// Up direction
    up: DVec3,
    /// Sphere radius in braille pixels (controls zoom)
    pub radius: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    flight: Option<CameraFlight>,
}

impl GlobeViewport {
    /// Build a globe viewport centered on (lon, lat) with given radius.
    pub fn new(center_lon: f64, center_lat: f64, radius: f64, width: usize, height: usize) -> Self {
        let (forward, right, up) = basis_for(center_lon, center_lat);
        Self {
            forward,
            right,
            up,
            radius,
            width,
            height,
            flight: None,
        }
    }

    /// World view: whole globe visible, centered on the Atlantic.
    pub fn world(width: usize, height: usize) -> Self {
        let radius = (width as f64 * MIN_RADIUS_FACTOR).max(1.0);
        Self::new(0.0, 20.0, radius, width, height)
    }

    fn min_radius(&self) -> f64 {
        (self.width as f64 * MIN_RADIUS_FACTOR).max(1.0)
    }

    fn max_radius(&self) -> f64 {
        self.width as f64 * MAX_RADIUS_FACTOR
    }

    /// Sphere radius that shows the globe from the given altitude
    /// (radii above the surface; smaller = closer).
    fn radius_for_altitude(&self, altitude: f64) -> f64 {
        let alt = altitude.max(0.05);
        (self.min_radius() * DEFAULT_ALTITUDE / alt).clamp(self.min_radius(), self.max_radius())
    }

    /// Extract the center lon/lat that the globe is looking at.
    pub fn center_lonlat(&self) -> (f64, f64) {
        let lat = self.forward.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = self.forward.y.atan2(self.forward.x).to_degrees();
        (lon, lat)
    }

    /// Begin an animated flight to the given geographic target, replacing
    /// any flight already in progress.
    pub fn fly_to(&mut self, lat: f64, lon: f64, altitude: f64, duration: Duration, now: Instant) {
        self.flight = Some(CameraFlight {
            from_forward: self.forward,
            to_forward: lonlat_to_vec3(lon, lat),
            from_radius: self.radius,
            to_radius: self.radius_for_altitude(altitude),
            started: now,
            duration,
        });
    }

    /// Whether a camera flight is currently animating.
    pub fn in_flight(&self) -> bool {
        self.flight.is_some()
    }

    /// Advance the camera flight. Returns true while animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(flight) = self.flight.clone() else {
            return false;
        };

        let elapsed = now.saturating_duration_since(flight.started);
        let t = if flight.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / flight.duration.as_secs_f64()).min(1.0)
        };
        // Smoothstep easing
        let s = t * t * (3.0 - 2.0 * t);

        let dir = slerp(flight.from_forward, flight.to_forward, s);
        let (lon, lat) = (dir.y.atan2(dir.x).to_degrees(), dir.z.clamp(-1.0, 1.0).asin().to_degrees());
        let (forward, right, up) = basis_for(lon, lat);
        self.forward = forward;
        self.right = right;
        self.up = up;
        self.radius = flight.from_radius + (flight.to_radius - flight.from_radius) * s;

        if t >= 1.0 {
            self.flight = None;
        }
        self.flight.is_some()
    }

    /// Project a geographic point to screen pixels.
    /// Returns `None` for back-face points (behind the visible hemisphere).
    pub fn project(&self, lon: f64, lat: f64) -> Option<(i32, i32)> {
        let p = lonlat_to_vec3(lon, lat);

        // Dot with forward: positive = front-facing
        let depth = p.dot(self.forward);
        if depth < 0.0 {
            return None;
        }

        // Orthographic: project onto right/up plane
        let sx = p.dot(self.right);
        let sy = p.dot(self.up);

        let px = (self.width as f64 / 2.0 + sx * self.radius) as i32;
        let py = (self.height as f64 / 2.0 - sy * self.radius) as i32;

        Some((px, py))
    }

    /// Unproject screen pixels back to lon/lat.
    /// Returns `None` if the point is outside the sphere disk.
    pub fn unproject(&self, px: i32, py: i32) -> Option<(f64, f64)> {
        let sx = (px as f64 - self.width as f64 / 2.0) / self.radius;
        let sy = -(py as f64 - self.height as f64 / 2.0) / self.radius;

        let r2 = sx * sx + sy * sy;
        if r2 > 1.0 {
            return None;
        }

        // Reconstruct 3D point on unit sphere
        let sz = (1.0 - r2).sqrt();
        let p = self.right * sx + self.up * sy + self.forward * sz;

        let lat = p.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = p.y.atan2(p.x).to_degrees();

        Some((lon, lat))
    }

    /// Rotate the globe by a pixel drag delta. Cancels any camera flight.
    /// Positive dx = dragged left → globe center shifts east (surface follows cursor).
    pub fn rotate_drag(&mut self, dx: i32, dy: i32) {
        self.flight = None;

        let angle_x = (dx as f64) / self.radius;
        let angle_y = -(dy as f64) / self.radius;

        // Rotate around up axis (horizontal drag → longitude change)
        if angle_x.abs() > 1e-10 {
            let (sin_a, cos_a) = angle_x.sin_cos();
            let new_forward = self.forward * cos_a + self.right * sin_a;
            let new_right = self.right * cos_a - self.forward * sin_a;
            self.forward = new_forward.normalize();
            self.right = new_right.normalize();
        }

        // Rotate around right axis (vertical drag → latitude change)
        if angle_y.abs() > 1e-10 {
            let (sin_a, cos_a) = angle_y.sin_cos();
            let new_forward = self.forward * cos_a + self.up * sin_a;
            let new_up = self.up * cos_a - self.forward * sin_a;
            self.forward = new_forward.normalize();
            self.up = new_up.normalize();
        }
    }

    /// Zoom in by scaling the sphere radius.
    pub fn zoom_in(&mut self) {
        self.radius = (self.radius * 1.5).min(self.max_radius());
    }

    /// Zoom out by scaling the sphere radius.
    pub fn zoom_out(&mut self) {
        self.radius = (self.radius / 1.5).max(self.min_radius());
    }

    /// Zoom in towards a specific pixel location.
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location.
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor towards a specific pixel, keeping the geographic point under cursor fixed.
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        // Get geo coords under cursor before zoom
        let target = self.unproject(px, py);

        let min_r = self.min_radius();
        let max_r = self.max_radius();
        self.radius = (self.radius * factor).clamp(min_r, max_r);

        // Re-orient so the same geo point stays under cursor
        if let Some((lon, lat)) = target {
            let target_vec = lonlat_to_vec3(lon, lat);
            // Where does this point project now?
            let sx_now = target_vec.dot(self.right);
            let sy_now = target_vec.dot(self.up);
            // Where should it be (in unit-sphere coords)?
            let sx_want = (px as f64 - self.width as f64 / 2.0) / self.radius;
            let sy_want = -(py as f64 - self.height as f64 / 2.0) / self.radius;

            let dsx = sx_want - sx_now;
            let dsy = sy_want - sy_now;

            // Apply small rotation to re-center
            let angle_x = -dsx;
            let angle_y = dsy;

            if angle_x.abs() > 1e-10 {
                let (sin_a, cos_a) = angle_x.sin_cos();
                let new_forward = self.forward * cos_a + self.right * sin_a;
                let new_right = self.right * cos_a - self.forward * sin_a;
                self.forward = new_forward.normalize();
                self.right = new_right.normalize();
            }
            if angle_y.abs() > 1e-10 {
                let (sin_a, cos_a) = angle_y.sin_cos();
                let new_forward = self.forward * cos_a + self.up * sin_a;
                let new_up = self.up * cos_a - self.forward * sin_a;
                self.forward = new_forward.normalize();
                self.up = new_up.normalize();
            }
        }
    }

    /// Effective zoom level relative to the world view.
    pub fn effective_zoom(&self) -> f64 {
        self.radius / self.min_radius()
    }

    /// Set viewport dimensions, keeping the zoom inside the valid band
    /// for the new size.
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        let min_r = self.min_radius();
        let max_r = self.max_radius().max(min_r);
        self.radius = self.radius.clamp(min_r, max_r);
    }

    /// Check if a line segment might be visible (rough bounding box check).
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}

/// Orthonormal basis looking at (lon, lat), north up.
fn basis_for(center_lon: f64, center_lat: f64) -> (DVec3, DVec3, DVec3) {
    let lon_rad = center_lon.to_radians();
    let lat_rad = center_lat.to_radians();

    // Forward = direction from origin to (lon, lat) on unit sphere
    let forward = DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    );

    // Up = derivative of forward w.r.t. latitude (points north on sphere)
    let raw_up = DVec3::new(
        -lat_rad.sin() * lon_rad.cos(),
        -lat_rad.sin() * lon_rad.sin(),
        lat_rad.cos(),
    );

    // Right = forward × up (points east)
    let right = forward.cross(raw_up).normalize();
    let up = right.cross(forward).normalize();

    (forward, right, up)
}

/// Convert lon/lat (degrees) to a unit sphere vector.
#[inline(always)]
pub fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

/// Spherical interpolation between two unit vectors.
fn slerp(a: DVec3, b: DVec3, t: f64) -> DVec3 {
    let dot = a.dot(b).clamp(-1.0, 1.0);
    let angle = dot.acos();
    let sin_angle = angle.sin();
    if sin_angle.abs() < 1e-10 {
        return b;
    }
    let sa = ((1.0 - t) * angle).sin() / sin_angle;
    let sb = (t * angle).sin() / sin_angle;
    (a * sa + b * sb).normalize()
}

/// Interpolate along a great circle arc and call a visitor for each subdivision point.
/// Subdivides adaptively: ~2° segments for smooth curves at braille resolution.
/// No allocation — projects each point inline and passes to visitor.
#[inline]
pub fn walk_great_circle(
    lon0: f64, lat0: f64,
    lon1: f64, lat1: f64,
    mut visitor: impl FnMut(f64, f64),
) {
    let a = lonlat_to_vec3(lon0, lat0);
    let b = lonlat_to_vec3(lon1, lat1);

    let dot = a.dot(b).clamp(-1.0, 1.0);
    let angle = dot.acos(); // angular distance in radians

    // ~2° segments
    let steps = ((angle.to_degrees() / 2.0).ceil() as usize).max(1);

    if steps == 1 {
        // Short segment, just emit endpoint
        visitor(lon1, lat1);
        return;
    }

    let sin_angle = angle.sin();
    if sin_angle.abs() < 1e-10 {
        // Points are nearly identical or antipodal
        visitor(lon1, lat1);
        return;
    }

    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let sa = ((1.0 - t) * angle).sin() / sin_angle;
        let sb = (t * angle).sin() / sin_angle;
        let p = a * sa + b * sb;

        let lat = p.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = p.y.atan2(p.x).to_degrees();
        visitor(lon, lat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_projects_to_middle() {
        let globe = GlobeViewport::new(10.0, 45.0, 40.0, 100, 100);
        let (px, py) = globe.project(10.0, 45.0).unwrap();
        assert_eq!(px, 50);
        assert_eq!(py, 50);
    }

    #[test]
    fn far_side_is_culled() {
        let globe = GlobeViewport::new(0.0, 0.0, 40.0, 100, 100);
        assert!(globe.project(180.0, 0.0).is_none());
    }

    #[test]
    fn unproject_roundtrip_near_center() {
        let globe = GlobeViewport::new(-60.0, -10.0, 40.0, 100, 100);
        let (lon, lat) = globe.unproject(50, 50).unwrap();
        assert!((lon - -60.0).abs() < 1.0);
        assert!((lat - -10.0).abs() < 1.0);
    }

    #[test]
    fn flight_reaches_target_and_stops() {
        let start = Instant::now();
        let mut globe = GlobeViewport::world(200, 100);
        globe.fly_to(10.0, 55.0, 0.8, Duration::from_millis(2000), start);
        assert!(globe.in_flight());

        // Mid-flight: still animating
        assert!(globe.tick(start + Duration::from_millis(1000)));

        // Past the duration: settled on the target
        assert!(!globe.tick(start + Duration::from_millis(2100)));
        assert!(!globe.in_flight());
        let (lon, lat) = globe.center_lonlat();
        assert!((lon - 55.0).abs() < 0.5);
        assert!((lat - 10.0).abs() < 0.5);
        assert!(globe.effective_zoom() > 1.5); // altitude 0.8 is zoomed in
    }

    #[test]
    fn resize_keeps_zoom_in_range() {
        let mut globe = GlobeViewport::world(200, 100);

        // Growing the view raises the minimum radius
        globe.set_size(400, 200);
        assert!((globe.effective_zoom() - 1.0).abs() < 1e-9);

        // Shrinking clamps a deep zoom back under the maximum
        globe.radius = 100_000.0;
        globe.set_size(100, 50);
        assert!(globe.radius <= 100.0 * MAX_RADIUS_FACTOR);
        assert!(globe.radius >= globe.min_radius());
    }

    #[test]
    fn drag_cancels_flight() {
        let start = Instant::now();
        let mut globe = GlobeViewport::world(200, 100);
        globe.fly_to(0.0, 90.0, 0.8, Duration::from_millis(2000), start);
        globe.rotate_drag(5, 0);
        assert!(!globe.in_flight());
    }
}
