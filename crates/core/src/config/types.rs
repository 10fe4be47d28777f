use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::booking::BookingConfig;
use crate::catalog::TmdbConfig;
use crate::seating::{
    OccupancyPolicy, SeatLabels, SeatLayoutConfiguration, DEFAULT_PACKAGE_SURCHARGE,
};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub seating: SeatingConfig,
    /// Movie catalog; listing endpoints are disabled without it
    #[serde(default)]
    pub tmdb: Option<TmdbConfig>,
    /// Booking upload; checkout is disabled without it
    #[serde(default)]
    pub booking: Option<BookingConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Capacity of each session's event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Sessions untouched for this long are closed
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// How often idle sessions are swept
    #[serde(default = "default_session_sweep_secs")]
    pub session_sweep_secs: u64,
    /// Open sessions allowed at once; creation fails beyond this
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            event_buffer: default_event_buffer(),
            session_ttl_secs: default_session_ttl_secs(),
            session_sweep_secs: default_session_sweep_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_event_buffer() -> usize {
    256
}

fn default_session_ttl_secs() -> u64 {
    1800
}

fn default_session_sweep_secs() -> u64 {
    60
}

fn default_max_sessions() -> usize {
    1000
}

/// Seating hall configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeatingConfig {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_seats_per_row")]
    pub seats_per_row: usize,
    #[serde(default = "default_ticket_price")]
    pub base_ticket_price: u64,
    #[serde(default = "default_package_surcharge")]
    pub package_surcharge: u64,
    #[serde(default)]
    pub occupancy: OccupancyPolicy,
    #[serde(default)]
    pub labels: SeatLabels,
}

impl Default for SeatingConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            seats_per_row: default_seats_per_row(),
            base_ticket_price: default_ticket_price(),
            package_surcharge: default_package_surcharge(),
            occupancy: OccupancyPolicy::default(),
            labels: SeatLabels::default(),
        }
    }
}

impl SeatingConfig {
    /// Layout used for every new seat selection session.
    pub fn layout(&self) -> SeatLayoutConfiguration {
        SeatLayoutConfiguration {
            number_of_rows: self.rows,
            seats_per_row: self.seats_per_row,
            base_ticket_price: self.base_ticket_price,
            package_surcharge: self.package_surcharge,
            occupancy: self.occupancy,
        }
    }
}

fn default_rows() -> usize {
    8
}

fn default_seats_per_row() -> usize {
    10
}

fn default_ticket_price() -> u64 {
    280
}

fn default_package_surcharge() -> u64 {
    DEFAULT_PACKAGE_SURCHARGE
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub seating: SeatingConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<SanitizedTmdbConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<SanitizedBookingConfig>,
}

/// Sanitized TMDB config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTmdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub api_key_configured: bool,
}

/// Sanitized booking config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBookingConfig {
    pub endpoint: String,
    pub api_token_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            seating: config.seating.clone(),
            tmdb: config.tmdb.as_ref().map(|t| SanitizedTmdbConfig {
                base_url: t.base_url.clone(),
                language: t.language.clone(),
                region: t.region.clone(),
                api_key_configured: !t.api_key.is_empty(),
            }),
            booking: config.booking.as_ref().map(|b| SanitizedBookingConfig {
                endpoint: b.endpoint.clone(),
                api_token_configured: b.api_token.as_ref().is_some_and(|t| !t.is_empty()),
                timeout_secs: b.timeout_secs,
            }),
        }
    }
}
