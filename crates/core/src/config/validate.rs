use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Session limits (TTL, sweep interval, cap) are not 0
/// - Seating layout is usable (dimensions, price, occupancy probability)
/// - Booking endpoint is not blank when a booking section is present
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "server.event_buffer cannot be 0".to_string(),
        ));
    }

    if config.server.session_ttl_secs == 0 || config.server.session_sweep_secs == 0 {
        return Err(ConfigError::ValidationError(
            "server.session_ttl_secs and server.session_sweep_secs must be greater than 0"
                .to_string(),
        ));
    }

    if config.server.max_sessions == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_sessions cannot be 0".to_string(),
        ));
    }

    config
        .seating
        .layout()
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("seating: {}", e)))?;

    if let Some(booking) = &config.booking {
        if booking.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "booking.endpoint cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
