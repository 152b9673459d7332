//! Wiener Linien realtime monitor DTOs.
//!
//! These types map directly to the `ogd_realtime/monitor` JSON response.
//! They use `Option` liberally because the API omits fields (and whole
//! arrays) rather than sending empty values, e.g. after end of service.

use serde::Deserialize;

/// Top-level monitor response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorResponse {
    /// Payload. Absent on some server-side errors.
    pub data: Option<MonitorData>,

    /// Status message from the server.
    pub message: Option<ServerMessage>,
}

/// The `data` block of a monitor response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorData {
    /// One entry per stop/platform grouping served by the requested DIVA.
    pub monitors: Option<Vec<Monitor>>,

    /// Disruption and elevator notices, present when traffic info was requested.
    pub traffic_infos: Option<Vec<TrafficInfo>>,
}

/// A single monitor: one physical stop and the lines serving it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    /// GeoJSON feature describing the stop.
    pub location_stop: Option<LocationStop>,

    /// Lines serving this stop. Usually exactly one per monitor.
    pub lines: Option<Vec<Line>>,
}

/// GeoJSON feature for a stop.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationStop {
    /// Always "Feature".
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Point geometry.
    pub geometry: Option<Geometry>,

    /// Stop metadata.
    pub properties: Option<StopProperties>,
}

/// GeoJSON point geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Always "Point".
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Longitude, latitude (WGS84).
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// Stop metadata from `locationStop.properties`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopProperties {
    /// The DIVA number as text.
    pub name: Option<String>,

    /// Human-readable stop name.
    pub title: Option<String>,

    /// Municipality name, e.g. "Wien".
    pub municipality: Option<String>,

    /// Municipality code.
    pub municipality_id: Option<u32>,

    /// Stop type, usually "stop".
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Coordinate reference name, usually "WGS84".
    pub coord_name: Option<String>,
}

/// A line serving a monitor, with its upcoming departures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    /// Line name, e.g. "U3", "13A", "D".
    #[serde(default)]
    pub name: String,

    /// Destination text.
    #[serde(default)]
    pub towards: String,

    /// Direction marker ("H" or "R").
    pub direction: Option<String>,

    /// Platform, when the stop has several.
    pub platform: Option<String>,

    /// Direction id.
    pub richtungs_id: Option<String>,

    /// Whether the stop is step-free for this line.
    pub barrier_free: Option<bool>,

    /// Whether countdowns are realtime rather than timetable-based.
    pub realtime_supported: Option<bool>,

    /// Whether the line is currently stuck in traffic.
    pub trafficjam: Option<bool>,

    /// Upcoming departures, soonest first.
    pub departures: Option<Departures>,

    /// Transport mode tag, e.g. "ptMetro", "ptTram", "ptBusCity".
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Numeric line id.
    pub line_id: Option<u32>,
}

/// Wrapper around the departure list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Departures {
    /// Departures, soonest first.
    #[serde(default)]
    pub departure: Vec<Departure>,
}

/// A single upcoming departure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    /// Timing information.
    pub departure_time: Option<DepartureTime>,

    /// Vehicle details, present when the departure deviates from the line
    /// defaults (e.g. short workings).
    pub vehicle: Option<Vehicle>,
}

/// Planned and realtime departure times.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureTime {
    /// Timetabled departure (ISO 8601 with offset).
    pub time_planned: Option<String>,

    /// Realtime prediction (ISO 8601 with offset).
    pub time_real: Option<String>,

    /// Minutes until departure. Zero or negative means "now".
    pub countdown: Option<i32>,
}

/// Per-departure vehicle details.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Line name.
    pub name: Option<String>,

    /// Destination text for this particular run.
    pub towards: Option<String>,

    /// Direction marker.
    pub direction: Option<String>,

    /// Platform.
    pub platform: Option<String>,

    /// Whether the vehicle is step-free.
    pub barrier_free: Option<bool>,

    /// Whether the vehicle has a folding ramp.
    pub folding_ramp: Option<bool>,

    /// Whether countdowns are realtime.
    pub realtime_supported: Option<bool>,

    /// Whether the vehicle is stuck in traffic.
    pub trafficjam: Option<bool>,

    /// Transport mode tag.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Numeric line id.
    pub linien_id: Option<u32>,
}

/// A disruption or elevator notice.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficInfo {
    /// Notice id.
    pub name: Option<String>,

    /// Short headline.
    pub title: Option<String>,

    /// Full text.
    pub description: Option<String>,

    /// Line names affected.
    #[serde(default)]
    pub related_lines: Vec<String>,
}

/// Server status message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    /// Status text, "OK" on success.
    pub value: Option<String>,

    /// Numeric status, 1 on success.
    pub message_code: Option<i32>,

    /// Server clock at response time.
    pub server_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_monitor_response() {
        let json = r#"{
            "data": {
                "monitors": [
                    {
                        "locationStop": {
                            "type": "Feature",
                            "geometry": {"type": "Point", "coordinates": [16.3726, 48.2084]},
                            "properties": {
                                "name": "60201040",
                                "title": "Stephansplatz",
                                "municipality": "Wien",
                                "municipalityId": 90001,
                                "type": "stop",
                                "coordName": "WGS84",
                                "attributes": {"rbl": 4116}
                            }
                        },
                        "lines": [
                            {
                                "name": "U3",
                                "towards": "Ottakring",
                                "direction": "H",
                                "platform": "1",
                                "richtungsId": "1",
                                "barrierFree": true,
                                "realtimeSupported": true,
                                "trafficjam": false,
                                "departures": {
                                    "departure": [
                                        {
                                            "departureTime": {
                                                "timePlanned": "2024-03-15T10:30:00.000+0100",
                                                "timeReal": "2024-03-15T10:30:30.000+0100",
                                                "countdown": 2
                                            }
                                        }
                                    ]
                                },
                                "type": "ptMetro",
                                "lineId": 303
                            }
                        ],
                        "attributes": {}
                    }
                ]
            },
            "message": {"value": "OK", "messageCode": 1, "serverTime": "2024-03-15T10:28:00.000+0100"}
        }"#;

        let response: MonitorResponse = serde_json::from_str(json).unwrap();
        let monitors = response.data.unwrap().monitors.unwrap();
        assert_eq!(monitors.len(), 1);

        let stop = monitors[0].location_stop.as_ref().unwrap();
        let props = stop.properties.as_ref().unwrap();
        assert_eq!(props.title.as_deref(), Some("Stephansplatz"));

        let line = &monitors[0].lines.as_ref().unwrap()[0];
        assert_eq!(line.name, "U3");
        assert_eq!(line.kind, "ptMetro");
        assert_eq!(line.barrier_free, Some(true));

        let departure = &line.departures.as_ref().unwrap().departure[0];
        assert_eq!(departure.departure_time.as_ref().unwrap().countdown, Some(2));

        let message = response.message.unwrap();
        assert_eq!(message.message_code, Some(1));
    }

    #[test]
    fn deserialize_missing_arrays() {
        let response: MonitorResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(response.data.unwrap().monitors.is_none());

        let response: MonitorResponse = serde_json::from_str("{}").unwrap();
        assert!(response.data.is_none());

        let line: Line =
            serde_json::from_str(r#"{"name": "D", "departures": {}}"#).unwrap();
        assert!(line.departures.unwrap().departure.is_empty());
    }

    #[test]
    fn deserialize_traffic_infos() {
        let json = r#"{
            "data": {
                "monitors": [],
                "trafficInfos": [
                    {
                        "name": "ftazS_4242",
                        "title": "Aufzug Stephansplatz",
                        "description": "Aufzug außer Betrieb",
                        "relatedLines": ["U1", "U3"]
                    }
                ]
            }
        }"#;

        let response: MonitorResponse = serde_json::from_str(json).unwrap();
        let infos = response.data.unwrap().traffic_infos.unwrap();
        assert_eq!(infos[0].related_lines, vec!["U1", "U3"]);
    }
}
