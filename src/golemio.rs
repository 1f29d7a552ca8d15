//! Wire shapes of the Golemio v2 payloads and of static GTFS `routes.txt` rows.

use serde::Deserialize;

/// `GET /vehiclepositions` answers with a GeoJSON feature collection.
#[derive(Deserialize, Debug)]
pub struct VehiclePositions {
    pub features: Vec<Feature>,
}

#[derive(Deserialize, Debug)]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Deserialize, Debug)]
pub struct Geometry {
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

#[derive(Deserialize, Debug, Default)]
pub struct Properties {
    pub trip: Option<Trip>,
}

#[derive(Deserialize, Debug)]
pub struct Trip {
    pub gtfs: Option<TripGtfs>,
}

#[derive(Deserialize, Debug)]
pub struct TripGtfs {
    pub route_id: Option<String>,
    pub route_short_name: Option<String>,
}

/// One element of `GET /gtfs/routes`, also one row of a static `routes.txt`.
#[derive(Deserialize, Debug)]
pub struct Route {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: Option<String>,
    #[serde(default)]
    pub route_color: Option<String>,
    #[serde(default)]
    pub route_text_color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_vehicle_feature_collection() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [14.4209, 50.0874] },
                "properties": {
                    "trip": {
                        "gtfs": { "route_id": "L22", "route_short_name": "22", "trip_id": "22_1" },
                        "vehicle_type": { "description_en": "tram" }
                    },
                    "last_position": { "delay": { "actual": 30 } }
                }
            }]
        }"#;

        let positions: VehiclePositions = serde_json::from_str(body).unwrap();
        assert_eq!(positions.features.len(), 1);

        let feature = &positions.features[0];
        assert_eq!(feature.geometry.coordinates, [14.4209, 50.0874]);
        let gtfs = feature
            .properties
            .trip
            .as_ref()
            .and_then(|trip| trip.gtfs.as_ref())
            .unwrap();
        assert_eq!(gtfs.route_id.as_deref(), Some("L22"));
        assert_eq!(gtfs.route_short_name.as_deref(), Some("22"));
    }

    #[test]
    fn decodes_route_array_with_nulls() {
        let body = r#"[
            { "route_id": "L22", "route_short_name": "22", "route_color": "7A0603", "route_text_color": "FFFFFF", "route_type": 0 },
            { "route_id": "L991", "route_color": null }
        ]"#;

        let routes: Vec<Route> = serde_json::from_str(body).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].route_color.as_deref(), Some("7A0603"));
        assert_eq!(routes[1].route_color, None);
        assert_eq!(routes[1].route_text_color, None);
    }
}
