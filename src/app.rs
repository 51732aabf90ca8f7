use crate::data::{DataEvent, Region, RegionSource};
use crate::geo;
use crate::map::GlobeViewport;
use crate::ui;
use ratatui::layout::{Position, Rect};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::debug;

/// Origin cities offered on the intro screen.
pub const CITIES: [&str; 8] = [
    "Madrid",
    "Barcelona",
    "Ciudad de México",
    "Buenos Aires",
    "Lima",
    "Santiago",
    "Bogotá",
    "Miami",
];

/// How long the cloud veil lingers before the province view appears.
pub const CLOUDS_DWELL: Duration = Duration::from_millis(2500);
/// Duration of the camera flight to a selected country's centroid.
pub const FLIGHT_DURATION: Duration = Duration::from_millis(2000);
/// Camera altitude over the selected country, in globe radii.
pub const COUNTRY_ALTITUDE: f64 = 0.8;

/// Which view is active. Exactly one at a time; `Intro` is initial and
/// there is no terminal state — `Provinces` can return to `Globe`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Intro,
    Globe,
    Clouds,
    Provinces,
}

/// Application state: the phase machine, the loaded region collections,
/// and the current hover/selection. All mutation goes through the
/// transition methods below; the event loop is the single writer.
pub struct App {
    pub phase: Phase,
    pub globe: GlobeViewport,
    pub should_quit: bool,

    /// Highlighted city on the intro screen; `None` until the user moves
    /// the cursor, so starting without a choice stays rejected.
    pub city_cursor: Option<usize>,

    pub countries: Vec<Region>,
    pub provinces: Vec<Region>,
    pub selected_country: Option<String>,
    /// Index into `provinces`, so the selection always belongs to the
    /// currently loaded list.
    pub selected_province: Option<usize>,
    /// Hovered region index: into `countries` during Globe/Clouds, into
    /// `provinces` during Provinces.
    pub hovered: Option<usize>,
    /// Stats panel orientation: false = flat list, true = comparison table.
    pub flipped: bool,

    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Whether the current button hold has moved (drag vs. click)
    pub drag_moved: bool,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,

    /// Terminal dimensions in cells, kept for panel hit-testing.
    term_width: u16,
    term_height: u16,

    /// Deadline anchor for the Clouds → Provinces transition. Cleared on
    /// any phase change, so a stale timer can never fire.
    clouds_entered: Option<Instant>,
    /// Generation counter for province fetches; a response is applied
    /// only if its tag still matches.
    province_epoch: u64,

    source: RegionSource,
    data_tx: Sender<DataEvent>,
    data_rx: Receiver<DataEvent>,
}

impl App {
    pub fn new(width: usize, height: usize, source: RegionSource) -> Self {
        // Braille gives 2x4 resolution per character.
        // Account for border (2 chars horizontal, 2 vertical + status bar).
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        let (data_tx, data_rx) = channel();

        Self {
            phase: Phase::Intro,
            globe: GlobeViewport::world(inner_width * 2, inner_height * 4),
            should_quit: false,
            city_cursor: None,
            countries: Vec::new(),
            provinces: Vec::new(),
            selected_country: None,
            selected_province: None,
            hovered: None,
            flipped: false,
            last_mouse: None,
            drag_moved: false,
            mouse_pos: None,
            term_width: width as u16,
            term_height: height as u16,
            clouds_entered: None,
            province_epoch: 0,
            source,
            data_tx,
            data_rx,
        }
    }

    /// Kick off the one-time world collection load.
    pub fn load_world(&self) {
        self.source.spawn_world(self.data_tx.clone());
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        self.term_width = width as u16;
        self.term_height = height as u16;
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        self.globe.set_size(inner_width * 2, inner_height * 4);
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// The chosen origin city, once the cursor has landed on one.
    pub fn origin_city(&self) -> Option<&'static str> {
        self.city_cursor.map(|i| CITIES[i])
    }

    /// Move the intro city cursor down (first press lands on the top entry).
    pub fn city_next(&mut self) {
        if self.phase != Phase::Intro {
            return;
        }
        self.city_cursor = Some(match self.city_cursor {
            None => 0,
            Some(i) => (i + 1).min(CITIES.len() - 1),
        });
    }

    /// Move the intro city cursor up.
    pub fn city_prev(&mut self) {
        if self.phase != Phase::Intro {
            return;
        }
        self.city_cursor = Some(match self.city_cursor {
            None => 0,
            Some(i) => i.saturating_sub(1),
        });
    }

    /// Intro → Globe, rejected while no origin city is chosen.
    pub fn start_journey(&mut self) {
        if self.phase == Phase::Intro && self.city_cursor.is_some() {
            self.phase = Phase::Globe;
        }
    }

    /// Globe → Clouds: remember the country, kick off its province fetch,
    /// and aim the camera at its centroid.
    pub fn select_country(&mut self, idx: usize, now: Instant) {
        if self.phase != Phase::Globe {
            return;
        }
        let Some(region) = self.countries.get(idx) else {
            return;
        };
        let name = region.name.clone();

        self.selected_country = Some(name.clone());
        self.province_epoch += 1;
        self.source
            .spawn_provinces(&name, self.province_epoch, self.data_tx.clone());

        self.phase = Phase::Clouds;
        self.clouds_entered = Some(now);
        self.aim_camera(&name, now);
    }

    /// Animate the camera to the named country's vertex centroid. Silently
    /// skipped when the country is missing from the collection or has no
    /// vertices; the phase timer runs regardless.
    fn aim_camera(&mut self, country: &str, now: Instant) {
        let Some(region) = self.countries.iter().find(|c| c.name == country) else {
            debug!(%country, "no such country in world collection, camera aim skipped");
            return;
        };
        let Some((lat, lon)) = geo::vertex_centroid(&region.polygons) else {
            debug!(%country, "empty geometry, camera aim skipped");
            return;
        };
        self.globe
            .fly_to(lat, lon, COUNTRY_ALTITUDE, FLIGHT_DURATION, now);
    }

    /// Provinces: pick a province; the stats panel opens un-flipped.
    pub fn select_province(&mut self, idx: usize) {
        if self.phase != Phase::Provinces || idx >= self.provinces.len() {
            return;
        }
        self.selected_province = Some(idx);
        self.flipped = false;
    }

    /// Provinces → Globe: drop the selection and the province list. The
    /// generation bump discards any still-in-flight fetch result.
    pub fn go_back(&mut self) {
        if self.phase != Phase::Provinces {
            return;
        }
        self.phase = Phase::Globe;
        self.selected_country = None;
        self.selected_province = None;
        self.provinces.clear();
        self.hovered = None;
        self.province_epoch += 1;
    }

    /// Toggle the stats panel between flat list and comparison table.
    pub fn flip_panel(&mut self) {
        if self.selected_province.is_some() {
            self.flipped = !self.flipped;
        }
    }

    /// Hide the stats panel without leaving the province view.
    pub fn dismiss_panel(&mut self) {
        self.selected_province = None;
        self.flipped = false;
    }

    /// Dataset the current phase draws and hit-tests against.
    pub fn current_regions(&self) -> &[Region] {
        match self.phase {
            Phase::Intro => &[],
            Phase::Globe | Phase::Clouds => &self.countries,
            Phase::Provinces => &self.provinces,
        }
    }

    pub fn hovered_name(&self) -> Option<&str> {
        self.hovered
            .and_then(|i| self.current_regions().get(i))
            .map(|r| r.name.as_str())
    }

    pub fn selected_province_name(&self) -> Option<&str> {
        self.selected_province
            .and_then(|i| self.provinces.get(i))
            .map(|r| r.name.as_str())
    }

    /// Advance timers, the camera flight, and any completed fetches.
    pub fn tick(&mut self, now: Instant) {
        self.globe.tick(now);

        if self.phase == Phase::Clouds {
            if let Some(entered) = self.clouds_entered {
                if now.saturating_duration_since(entered) >= CLOUDS_DWELL {
                    self.phase = Phase::Provinces;
                    self.clouds_entered = None;
                    self.hovered = None;
                }
            }
        }

        let mut events = Vec::new();
        while let Ok(event) = self.data_rx.try_recv() {
            events.push(event);
        }
        for event in events {
            self.apply_data_event(event);
        }
    }

    /// Fold a background load result into app state. Province results are
    /// gated on the generation tag so a response for a country the user
    /// has already left never overwrites the current view.
    pub fn apply_data_event(&mut self, event: DataEvent) {
        match event {
            DataEvent::World(regions) => {
                self.countries = regions;
            }
            DataEvent::Provinces { epoch, regions } => {
                if epoch == self.province_epoch && self.selected_country.is_some() {
                    self.provinces = regions;
                } else {
                    debug!(epoch, current = self.province_epoch, "stale province response discarded");
                }
            }
        }
    }

    // ---- mouse plumbing -------------------------------------------------

    /// Update mouse cursor position and the hover highlight under it.
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.hover_at(col, row);
    }

    /// Convert terminal coords to braille pixel coords.
    /// Each terminal cell is 2 braille pixels wide, 4 tall; 1-cell border.
    fn to_pixels(col: u16, row: u16) -> (i32, i32) {
        let px = ((col.saturating_sub(1)) as i32) * 2;
        let py = ((row.saturating_sub(1)) as i32) * 4;
        (px, py)
    }

    /// Hover the region under the cursor for the current phase's dataset.
    pub fn hover_at(&mut self, col: u16, row: u16) {
        if self.phase == Phase::Intro {
            return;
        }
        let (px, py) = Self::to_pixels(col, row);
        self.hovered = self
            .globe
            .unproject(px, py)
            .and_then(|(lon, lat)| geo::region_at(self.current_regions(), lon, lat));
    }

    /// Terminal cells covered by the open stats card, if it is showing.
    fn panel_contains(&self, col: u16, row: u16) -> bool {
        if self.phase != Phase::Provinces || self.selected_province.is_none() {
            return false;
        }
        let map_area = Rect::new(0, 0, self.term_width, self.term_height.saturating_sub(1));
        ui::stats_panel_rect(map_area, self.flipped).contains(Position::new(col, row))
    }

    /// Route a left click by phase: country selection on the globe,
    /// province selection in the province view, otherwise a no-op.
    /// Clicks over the open stats card stay on the card.
    pub fn click_at(&mut self, col: u16, row: u16, now: Instant) {
        if self.panel_contains(col, row) {
            return;
        }
        let (px, py) = Self::to_pixels(col, row);
        let Some((lon, lat)) = self.globe.unproject(px, py) else {
            return;
        };
        match self.phase {
            Phase::Globe => {
                if let Some(idx) = geo::region_at(&self.countries, lon, lat) {
                    self.select_country(idx, now);
                }
            }
            Phase::Provinces => {
                if let Some(idx) = geo::region_at(&self.provinces, lon, lat) {
                    self.select_province(idx);
                }
            }
            Phase::Intro | Phase::Clouds => {}
        }
    }

    /// Begin a button hold; whether it becomes a drag or a click is
    /// decided on release.
    pub fn begin_drag(&mut self, x: u16, y: u16) {
        self.last_mouse = Some((x, y));
        self.drag_moved = false;
    }

    /// Handle mouse drag rotation (disabled during the cloud flight).
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        self.drag_moved = true;
        if self.phase == Phase::Clouds || self.phase == Phase::Intro {
            return;
        }
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (y as i32 - last_y as i32) * 4;
            self.globe.rotate_drag(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn zoom_in(&mut self) {
        if self.interaction_allowed() {
            self.globe.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if self.interaction_allowed() {
            self.globe.zoom_out();
        }
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if self.interaction_allowed() {
            let (px, py) = Self::to_pixels(col, row);
            self.globe.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if self.interaction_allowed() {
            let (px, py) = Self::to_pixels(col, row);
            self.globe.zoom_out_at(px, py);
        }
    }

    fn interaction_allowed(&self) -> bool {
        matches!(self.phase, Phase::Globe | Phase::Provinces)
    }
}
