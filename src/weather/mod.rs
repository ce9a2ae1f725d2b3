pub mod openmeteo;
pub mod simplify;
pub mod types;

/// Cities the frontend offers directly, with their coordinates.
pub const CITY_COORDS: &[(&str, f64, f64)] = &[
    ("Zürich", 47.3769, 8.5417),
    ("Basel", 47.5596, 7.5886),
    ("Bern", 46.9480, 7.4474),
    ("Genf", 46.2044, 6.1432),
    ("Lausanne", 46.5197, 6.6323),
    ("Luzern", 47.0502, 8.3093),
    ("St. Gallen", 47.4245, 9.3767),
    ("Lugano", 46.0037, 8.9511),
];

pub fn city_coords(city: &str) -> Option<(f64, f64)> {
    CITY_COORDS
        .iter()
        .find(|(name, _, _)| *name == city)
        .map(|(_, lat, lon)| (*lat, *lon))
}

pub fn cities() -> Vec<&'static str> {
    CITY_COORDS.iter().map(|(name, _, _)| *name).collect()
}

pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Invalid latitude: {}. Must be between -90 and 90", lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!(
            "Invalid longitude: {}. Must be between -180 and 180",
            lon
        ));
    }
    Ok(())
}
