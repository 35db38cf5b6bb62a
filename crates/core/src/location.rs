//! Optional position suffix for outgoing messages

use serde::{Deserialize, Serialize};

const MAP_URL: &str = "https://www.openstreetmap.org/";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn map_link(&self) -> String {
        format!("{}?mlat={}&mlon={}", MAP_URL, self.latitude, self.longitude)
    }
}

/// Build the outgoing text: trimmed input plus a map link when a position is known.
pub fn compose_outgoing(text: &str, location: Option<&Location>) -> String {
    let mut msg = text.trim().to_string();
    if let Some(location) = location {
        msg.push_str("\nLocation: ");
        msg.push_str(&location.map_link());
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_location() {
        assert_eq!(compose_outgoing("  hello \n", None), "hello");
    }

    #[test]
    fn test_with_location() {
        let loc = Location::new(52.52, 13.405);
        assert_eq!(
            compose_outgoing("meet here", Some(&loc)),
            "meet here\nLocation: https://www.openstreetmap.org/?mlat=52.52&mlon=13.405"
        );
    }

    #[test]
    fn test_negative_coordinates() {
        let loc = Location::new(-33.8688, -151.2093);
        assert!(loc.map_link().ends_with("?mlat=-33.8688&mlon=-151.2093"));
    }
}
