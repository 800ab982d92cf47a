use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::OnceLock;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;

/// Credentials for the image host. All three must be present for uploads.
#[derive(Clone)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Absent until first use surfaces it as a configuration error.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub production: bool,
    pub media: Option<MediaConfig>,
    /// Reject bookings whose event id does not resolve to a stored event.
    pub booking_requires_event: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let host = env::var("HOST")
            .ok()
            .and_then(|h| h.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let media = match (
            non_empty_var("CLOUDINARY_CLOUD_NAME"),
            non_empty_var("CLOUDINARY_API_KEY"),
            non_empty_var("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(MediaConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => {
                tracing::warn!("Media: image host credentials missing, uploads will fail");
                None
            }
        };

        Self {
            database_url: non_empty_var("DATABASE_URL"),
            bind_addr: SocketAddr::new(host, port),
            production: is_production(),
            media,
            booking_requires_event: env::var("BOOKING_REQUIRE_EVENT")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

/// Whether `RUST_ENV` selects production mode. Read once per process.
pub fn is_production() -> bool {
    static PRODUCTION: OnceLock<bool> = OnceLock::new();
    *PRODUCTION.get_or_init(|| {
        env::var("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false)
    })
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
