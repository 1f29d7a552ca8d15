//! The render pass: turns the live vehicle set into map markers.

use std::{cmp::Ordering, time::UNIX_EPOCH};

use itertools::Itertools;
use serde::Serialize;

use crate::{
    data::{Color, Vehicle},
    route_table::RouteTable,
    state::{LiveState, PollStats},
};

pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str =
    r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors"#;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapView {
    /// `[latitude, longitude]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_url: &'static str,
    pub attribution: &'static str,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [50.06, 14.46],
            zoom: 12,
            tile_url: OSM_TILE_URL,
            attribution: OSM_ATTRIBUTION,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MarkerIcon {
    pub class_name: &'static str,
    pub size: [u32; 2],
    pub anchor: [u32; 2],
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            class_name: "custom-marker",
            size: [30, 18],
            anchor: [15, 9],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Marker {
    /// `[latitude, longitude]`, the order the map expects.
    pub position: [f64; 2],
    pub label: String,
    pub background: Color,
    pub foreground: Color,
    pub html: String,
}

impl Marker {
    pub fn new(vehicle: &Vehicle, routes: &RouteTable) -> Self {
        let style = routes.style_for(&vehicle.line_id);

        Self {
            position: [vehicle.coordinates.latitude, vehicle.coordinates.longitude],
            label: vehicle.line.to_owned(),
            background: style.background,
            foreground: style.foreground,
            html: icon_html(&vehicle.line, style.background, style.foreground),
        }
    }
}

fn icon_html(label: &str, background: Color, foreground: Color) -> String {
    format!(
        r#"<div style="background-color: {}; color: {}; font-weight: bold; text-align: center;">{}</div>"#,
        background.css(),
        foreground.css(),
        escape_html(label)
    )
}

fn escape_html(text: &str) -> String {
    text.chars().fold(String::with_capacity(text.len()), |mut acc, c| {
        match c {
            '&' => acc.push_str("&amp;"),
            '<' => acc.push_str("&lt;"),
            '>' => acc.push_str("&gt;"),
            '"' => acc.push_str("&quot;"),
            '\'' => acc.push_str("&#39;"),
            c => acc.push(c),
        }
        acc
    })
}

/// One marker per vehicle, in feed order.
pub fn render(vehicles: &[Vehicle], routes: &RouteTable) -> Vec<Marker> {
    vehicles
        .iter()
        .map(|vehicle| Marker::new(vehicle, routes))
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LegendEntry {
    pub line: String,
    pub line_id: String,
    pub vehicles: usize,
    pub background: Color,
    pub foreground: Color,
}

/// Numbered lines first in numeric order, then the rest alphabetically.
fn line_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

pub fn legend(vehicles: &[Vehicle], routes: &RouteTable) -> Vec<LegendEntry> {
    vehicles
        .iter()
        .map(|vehicle| (vehicle.line_id.as_str(), vehicle))
        .into_group_map()
        .into_iter()
        .map(|(line_id, group)| {
            let style = routes.style_for(line_id);
            let line = match group[0].line.as_str() {
                "" => routes
                    .get(line_id)
                    .and_then(|route| route.short_name.to_owned())
                    .unwrap_or_default(),
                label => label.to_owned(),
            };
            LegendEntry {
                line,
                line_id: line_id.to_owned(),
                vehicles: group.len(),
                background: style.background,
                foreground: style.foreground,
            }
        })
        .sorted_by(|a, b| line_order(&a.line, &b.line).then_with(|| a.line_id.cmp(&b.line_id)))
        .collect()
}

/// Everything the page needs to paint one refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub view: MapView,
    pub icon: MarkerIcon,
    /// Changes whenever vehicles or routes change; the page repaints markers on change.
    pub revision: u64,
    /// Seconds until the next expected vehicle poll.
    pub countdown: i64,
    /// Unix milliseconds of the last successful vehicle poll.
    pub fetched_at: Option<u64>,
    pub stats: PollStats,
    pub marker_count: usize,
    pub markers: Vec<Marker>,
}

impl Frame {
    pub fn capture(state: &LiveState, view: &MapView) -> Self {
        // Read before the data so a concurrent publish leads to one more repaint, never one less.
        let revision = state.revision();
        let snapshot = state.snapshot();
        let routes = state.routes();
        let markers = render(&snapshot.vehicles, &routes);

        Self {
            view: view.clone(),
            icon: MarkerIcon::default(),
            revision,
            countdown: state.countdown(),
            fetched_at: snapshot
                .fetched_at
                .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
                .and_then(|since| u64::try_from(since.as_millis()).ok()),
            stats: state.stats(),
            marker_count: markers.len(),
            markers,
        }
    }
}
