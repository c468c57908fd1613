//! Map marker for the selected table row
//!
//! Rows without a usable location are pinned to a fixed point and their
//! popup says so.

use serde::Serialize;
use serde_json::Value;

use crate::store::Record;

pub const FALLBACK_LATITUDE: f64 = 30.75;
pub const FALLBACK_LONGITUDE: f64 = -97.48;
pub const DEFAULT_ZOOM: u8 = 10;

const LATITUDE_FIELD: &str = "location_lat";
const LONGITUDE_FIELD: &str = "location_long";
const CATEGORY_FIELD: &str = "breed";
const NAME_FIELD: &str = "name";

const UNKNOWN_CATEGORY: &str = "Unknown";
const UNKNOWN_NAME: &str = "Unnamed";
const UNKNOWN_LOCATION_NOTE: &str = " (location unknown)";

/// Everything needed to draw one marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    pub name: String,
    pub breed: String,
    /// Hover text
    pub tooltip: String,
    /// Popup text
    pub message: String,
    pub location_known: bool,
}

/// Marker for `rows[selected]`, or the first row when nothing is selected.
///
/// Returns `None` when the selection points past the end of `rows`.
pub fn select_marker(rows: &[Record], selected: Option<usize>) -> Option<MapMarker> {
    let row = rows.get(selected.unwrap_or(0))?;
    Some(marker_for(row))
}

/// Marker for a single row
///
/// Each coordinate falls back on its own; the popup is annotated only when
/// both ended up at the fallback point.
pub fn marker_for(row: &Record) -> MapMarker {
    let latitude = coordinate(row, LATITUDE_FIELD).unwrap_or(FALLBACK_LATITUDE);
    let longitude = coordinate(row, LONGITUDE_FIELD).unwrap_or(FALLBACK_LONGITUDE);
    let location_known = !(latitude == FALLBACK_LATITUDE && longitude == FALLBACK_LONGITUDE);

    let breed = text(row, CATEGORY_FIELD).unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
    let name = text(row, NAME_FIELD).unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let mut message = format!("{} ({})", name, breed);
    if !location_known {
        message.push_str(UNKNOWN_LOCATION_NOTE);
    }

    MapMarker {
        latitude,
        longitude,
        zoom: DEFAULT_ZOOM,
        tooltip: breed.clone(),
        name,
        breed,
        message,
        location_known,
    }
}

/// A zero coordinate is treated as missing, as the intake data uses it that way.
fn coordinate(row: &Record, field: &str) -> Option<f64> {
    row.get(field)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v != 0.0)
}

fn text(row: &Record, field: &str) -> Option<String> {
    match row.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
