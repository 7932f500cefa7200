//! Application configuration loaded from environment variables.

use checkout::DeliveryPolicy;
use domain::Money;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `FREE_DELIVERY_THRESHOLD_RS` — subtotal, in whole rupees, at or above
///   which delivery is free (default: `2000`)
/// - `DELIVERY_FALLBACK_RS` — flat charge, in whole rupees, used when the
///   rate service is unreachable (default: `100`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub free_delivery_threshold: Money,
    pub delivery_fallback_charge: Money,
}

fn env_rupees(key: &str, default: i64) -> Money {
    let rupees = std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Money::from_rupees(rupees)
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            free_delivery_threshold: env_rupees("FREE_DELIVERY_THRESHOLD_RS", 2000),
            delivery_fallback_charge: env_rupees("DELIVERY_FALLBACK_RS", 100),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the delivery policy this configuration describes.
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy {
            free_threshold: self.free_delivery_threshold,
            fallback_charge: self.delivery_fallback_charge,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            free_delivery_threshold: Money::from_rupees(2000),
            delivery_fallback_charge: Money::from_rupees(100),
        }
    }
}
