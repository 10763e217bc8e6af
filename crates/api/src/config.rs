use std::path::PathBuf;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use solicitudes_core::solicitudes::DEFAULT_ANNULLED_STATUS_ID;
use solicitudes_core::types::DbId;

use crate::auth::jwt::JwtConfig;

/// Characters left as-is inside a URL path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Default upload ceiling for a single request body (25 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Directory holding uploaded documents.
    pub media_root: PathBuf,
    /// URL path prefix under which `media_root` is served, with leading and
    /// trailing slash.
    pub media_url: String,
    /// Scheme and authority used to build absolute document URLs.
    pub public_base_url: String,
    /// Status id that marks a request as annulled.
    pub annulled_status_id: DbId,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// IANA time zone used for year/month/day filters.
    pub time_zone: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `MEDIA_ROOT`           | `media`                    |
    /// | `MEDIA_URL`            | `/media/`                  |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:3000`    |
    /// | `ANNULLED_STATUS_ID`   | `5`                        |
    /// | `MAX_UPLOAD_BYTES`     | `26214400`                 |
    /// | `TIME_ZONE`            | `UTC`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let media_root =
            PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into()));

        let media_url = normalize_media_url(
            &std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".into()),
        );

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let annulled_status_id: DbId = std::env::var("ANNULLED_STATUS_ID")
            .unwrap_or_else(|_| DEFAULT_ANNULLED_STATUS_ID.to_string())
            .parse()
            .expect("ANNULLED_STATUS_ID must be a valid i64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let time_zone = std::env::var("TIME_ZONE").unwrap_or_else(|_| "UTC".into());

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            media_root,
            media_url,
            public_base_url,
            annulled_status_id,
            max_upload_bytes,
            time_zone,
        }
    }

    /// Absolute URL of a stored document given its relative path.
    ///
    /// Each path segment is percent-encoded.
    pub fn media_url_for(&self, relative: &str) -> String {
        let path = relative
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}{}{}", self.public_base_url, self.media_url, path)
    }

    /// Route prefix for the static media service (`/media`).
    pub fn media_mount_path(&self) -> &str {
        self.media_url.trim_end_matches('/')
    }
}

/// Ensure the media URL prefix starts and ends with a single `/`.
pub fn normalize_media_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/media/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_url_is_normalized() {
        assert_eq!(normalize_media_url("media"), "/media/");
        assert_eq!(normalize_media_url("/uploads"), "/uploads/");
        assert_eq!(normalize_media_url("//files//"), "/files/");
        assert_eq!(normalize_media_url(""), "/media/");
    }

    fn config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: vec![],
            request_timeout_secs: 30,
            jwt: JwtConfig {
                secret: "secret".to_string(),
                access_token_expiry_mins: 15,
            },
            media_root: PathBuf::from("/srv/media"),
            media_url: "/media/".to_string(),
            public_base_url: "https://ayuda.techo.cl".to_string(),
            annulled_status_id: DEFAULT_ANNULLED_STATUS_ID,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            time_zone: "UTC".to_string(),
        }
    }

    #[test]
    fn media_urls_are_percent_encoded() {
        let config = config();
        assert_eq!(
            config.media_url_for("solicitud_archivos/7/plano.pdf"),
            "https://ayuda.techo.cl/media/solicitud_archivos/7/plano.pdf"
        );
        assert_eq!(
            config.media_url_for("solicitud_archivos/7/Techo_dañado #2.png"),
            "https://ayuda.techo.cl/media/solicitud_archivos/7/Techo_da%C3%B1ado%20%232.png"
        );
    }
}
