use std::{collections::HashMap, path::Path, sync::Arc};

use tracing::warn;

use crate::{
    data::{Color, Route},
    error::{Error, Result},
    golemio,
};

/// Background and foreground color of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub background: Color,
    pub foreground: Color,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            foreground: Color::WHITE,
        }
    }
}

impl From<&Route> for Style {
    fn from(route: &Route) -> Self {
        Self {
            background: route.color,
            foreground: route.text_color,
        }
    }
}

/// Routes keyed by id. Only ever used to style markers.
#[derive(Debug, Default)]
pub struct RouteTable {
    pub routes: HashMap<String, Arc<Route>>,
}

impl RouteTable {
    pub fn get(&self, route_id: &str) -> Option<&Arc<Route>> {
        self.routes.get(route_id)
    }

    pub fn style_for(&self, line_id: &str) -> Style {
        self.get(line_id)
            .map(|route| Style::from(route.as_ref()))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Loads a static GTFS `routes.txt`.
    pub fn from_gtfs_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let to_error = |source| Error::RoutesFile {
            path: path.display().to_string(),
            source,
        };

        let records = csv::Reader::from_path(path)
            .map_err(to_error)?
            .deserialize::<golemio::Route>()
            .collect::<Result<Vec<_>, csv::Error>>()
            .map_err(to_error)?;

        Ok(Self::from_iter(records))
    }
}

impl From<Vec<Route>> for RouteTable {
    fn from(val: Vec<Route>) -> Self {
        Self {
            routes: val
                .into_iter()
                .map(|route| (route.id.to_owned(), Arc::new(route)))
                .collect(),
        }
    }
}

/// Records whose colors are unusable are skipped; their vehicles get the default style.
impl FromIterator<golemio::Route> for RouteTable {
    fn from_iter<T: IntoIterator<Item = golemio::Route>>(iter: T) -> Self {
        let routes = iter
            .into_iter()
            .filter_map(|record| match Route::try_from(record) {
                Ok(route) => Some(route),
                Err(err) => {
                    warn!(%err, "skipping route");
                    None
                }
            })
            .collect::<Vec<_>>();

        Self::from(routes)
    }
}
