use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

use crate::{
    error::{Error, Result},
    golemio,
};

pub type ID = String;

/// Longitude/latitude pair, in the order the feed delivers it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl From<[f64; 2]> for Coordinates {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub coordinates: Coordinates,
    /// Human readable route label, e.g. `"22"`.
    pub line: String,
    pub line_id: ID,
}

impl TryFrom<(usize, golemio::Feature)> for Vehicle {
    type Error = Error;

    fn try_from((index, feature): (usize, golemio::Feature)) -> Result<Self> {
        let gtfs = feature
            .properties
            .trip
            .ok_or(Error::MalformedFeature {
                index,
                field: "properties.trip",
            })?
            .gtfs
            .ok_or(Error::MalformedFeature {
                index,
                field: "properties.trip.gtfs",
            })?;

        let line_id = gtfs.route_id.ok_or(Error::MalformedFeature {
            index,
            field: "properties.trip.gtfs.route_id",
        })?;

        Ok(Self {
            coordinates: Coordinates::from(feature.geometry.coordinates),
            line: gtfs.route_short_name.unwrap_or_default(),
            line_id,
        })
    }
}

impl From<golemio::VehiclePositions> for Result<Vec<Vehicle>> {
    fn from(val: golemio::VehiclePositions) -> Self {
        val.features
            .into_iter()
            .enumerate()
            .map(Vehicle::try_from)
            .collect()
    }
}

/// Six hex digit RGB color. Displays as `RRGGBB`, serializes as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color([u8; 3]);

impl Color {
    pub const BLACK: Color = Color([0x00, 0x00, 0x00]);
    pub const WHITE: Color = Color([0xFF, 0xFF, 0xFF]);

    pub fn css(&self) -> String {
        format!("#{self}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColor;

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidColor);
        }

        let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).map_err(|_| InvalidColor);
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "{r:02X}{g:02X}{b:02X}")
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.css())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: ID,
    pub short_name: Option<String>,
    pub color: Color,
    pub text_color: Color,
}

fn parse_color(route_id: &str, field: &'static str, value: Option<String>) -> Result<Color> {
    value
        .as_deref()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| Error::InvalidColor {
            route_id: route_id.to_owned(),
            field,
            value,
        })
}

impl TryFrom<golemio::Route> for Route {
    type Error = Error;

    fn try_from(val: golemio::Route) -> Result<Self> {
        let color = parse_color(&val.route_id, "route_color", val.route_color)?;
        let text_color = parse_color(&val.route_id, "route_text_color", val.route_text_color)?;

        Ok(Self {
            id: val.route_id,
            short_name: val.route_short_name.filter(|name| !name.is_empty()),
            color,
            text_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(json: &str) -> golemio::Feature {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn vehicle_keeps_feed_coordinate_order() {
        let vehicle = Vehicle::try_from((
            0,
            feature(
                r#"{"geometry":{"coordinates":[14.5,50.1]},
                    "properties":{"trip":{"gtfs":{"route_id":"L9","route_short_name":"9"}}}}"#,
            ),
        ))
        .unwrap();

        assert_eq!(vehicle.coordinates.longitude, 14.5);
        assert_eq!(vehicle.coordinates.latitude, 50.1);
        assert_eq!(vehicle.line, "9");
        assert_eq!(vehicle.line_id, "L9");
    }

    #[test]
    fn missing_short_name_gives_empty_label() {
        let vehicle = Vehicle::try_from((
            0,
            feature(
                r#"{"geometry":{"coordinates":[14.5,50.1]},
                    "properties":{"trip":{"gtfs":{"route_id":"L9","route_short_name":null}}}}"#,
            ),
        ))
        .unwrap();

        assert_eq!(vehicle.line, "");
    }

    #[test]
    fn feature_without_gtfs_block_is_rejected_with_its_index() {
        let err = Vehicle::try_from((
            3,
            feature(r#"{"geometry":{"coordinates":[14.5,50.1]},"properties":{"trip":{}}}"#),
        ))
        .unwrap_err();

        assert!(matches!(
            err,
            Error::MalformedFeature {
                index: 3,
                field: "properties.trip.gtfs"
            }
        ));
    }

    #[test]
    fn one_bad_feature_fails_the_whole_collection() {
        let positions: golemio::VehiclePositions = serde_json::from_str(
            r#"{"features":[
                {"geometry":{"coordinates":[14.5,50.1]},
                 "properties":{"trip":{"gtfs":{"route_id":"L9","route_short_name":"9"}}}},
                {"geometry":{"coordinates":[14.4,50.0]}}
            ]}"#,
        )
        .unwrap();

        let vehicles: Result<Vec<Vehicle>> = positions.into();
        assert!(matches!(
            vehicles,
            Err(Error::MalformedFeature { index: 1, .. })
        ));
    }

    #[test]
    fn color_parsing() {
        assert_eq!("7A0603".parse::<Color>().unwrap().to_string(), "7A0603");
        assert_eq!("#ffffff".parse::<Color>(), Ok(Color::WHITE));
        assert_eq!(" 000000 ".parse::<Color>(), Ok(Color::BLACK));
        assert_eq!("FFF".parse::<Color>(), Err(InvalidColor));
        assert_eq!("GG0000".parse::<Color>(), Err(InvalidColor));
        assert_eq!(Color::BLACK.css(), "#000000");
        assert_eq!(serde_json::to_string(&Color::WHITE).unwrap(), "\"#FFFFFF\"");
    }

    #[test]
    fn route_without_text_color_is_rejected() {
        let err = Route::try_from(golemio::Route {
            route_id: "L22".into(),
            route_short_name: Some("22".into()),
            route_color: Some("7A0603".into()),
            route_text_color: None,
        })
        .unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidColor {
                field: "route_text_color",
                ..
            }
        ));
    }
}
