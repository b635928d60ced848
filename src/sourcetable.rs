//! Sourcetable caster record
//!
//! The caster advertises itself with a single `CAS` record:
//!
//! ```text
//! CAS;<host>;<port>;<identifier>;<operator>;<nmea>;<country>;<lat>;<lon>
//! ```

use std::fmt;

use serde::Deserialize;

/// Caster (`CAS`) sourcetable record
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourcetableConfig {
    /// Caster host name or address
    pub host: String,
    /// Caster port
    pub port: u16,
    /// Caster identifier
    pub identifier: String,
    /// Operator name
    pub operator: String,
    /// Whether the caster accepts NMEA from clients
    pub nmea: bool,
    /// Three letter country code
    pub country: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Default for SourcetableConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 2101,
            identifier: "local".into(),
            operator: "local".into(),
            nmea: false,
            country: "AUS".into(),
            latitude: -1.0,
            longitude: 1.0,
        }
    }
}

impl fmt::Display for SourcetableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CAS;{};{};{};{};{};{};{};{}",
            self.host,
            self.port,
            self.identifier,
            self.operator,
            u8::from(self.nmea),
            self.country,
            Coordinate(self.latitude),
            Coordinate(self.longitude),
        )
    }
}

/// Degrees, always printed with a fractional part (`1.0`, not `1`)
struct Coordinate(f64);

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record() {
        assert_eq!(
            SourcetableConfig::default().to_string(),
            "CAS;localhost;2101;local;local;0;AUS;-1.0;1.0"
        );
    }

    #[test]
    fn test_custom_record() {
        let record = SourcetableConfig {
            host: "caster.example.net".into(),
            port: 443,
            identifier: "EXAMPLE".into(),
            operator: "Example Ops".into(),
            nmea: true,
            country: "NZL".into(),
            latitude: -41.29,
            longitude: 174.78,
        };

        assert_eq!(
            record.to_string(),
            "CAS;caster.example.net;443;EXAMPLE;Example Ops;1;NZL;-41.29;174.78"
        );
    }
}
