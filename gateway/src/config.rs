use std::env;

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::utils::cookies::{CookieOptions, SameSite};

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_base_url: String,
    pub jwt_secret: String,
    pub production: bool,
    pub use_mock_backend: bool,
    pub refresh_token_expiration_days: u64,
    pub bind_addr: String,
    pub gate: GateConfig,
}

/// Path tables evaluated by the request gate. Compiled-in defaults; tests
/// construct their own instances.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub static_prefixes: Vec<String>,
    pub public_prefixes: Vec<String>,
    pub admin_prefixes: Vec<String>,
    pub admin_roles: Vec<String>,
    pub legacy_prefixes: Vec<(String, String)>,
    pub login_path: String,
}

impl GateConfig {
    pub fn new(production: bool) -> Self {
        let mut public_prefixes: Vec<String> = [
            "/login",
            "/find-password",
            "/reset-password",
            "/guest",
            "/m",
            "/api/auth/login",
            "/api/auth/refresh",
            "/api/auth/logout",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        // The component preview is reachable without login on non-production
        // environments only.
        if !production {
            public_prefixes.push("/preview".to_string());
        }

        Self {
            static_prefixes: ["/assets", "/static", "/favicon.ico"]
                .into_iter()
                .map(String::from)
                .collect(),
            public_prefixes,
            admin_prefixes: vec!["/admin".to_string()],
            admin_roles: vec!["ROLE_ADMIN".to_string(), "ROLE_SUPER_ADMIN".to_string()],
            legacy_prefixes: vec![
                ("/workorder".to_string(), "/work-orders".to_string()),
                ("/facility".to_string(), "/facilities".to_string()),
                ("/patrol".to_string(), "/patrols".to_string()),
            ],
            login_path: "/login".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_base_url =
            env::var("BACKEND_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        // The shared secret is stored base64-encoded and decoded before use.
        let jwt_secret = match env::var("JWT_SECRET_B64") {
            Ok(encoded) => {
                let bytes = STANDARD
                    .decode(encoded.trim())
                    .context("JWT_SECRET_B64 is not valid base64")?;
                String::from_utf8(bytes).context("decoded JWT secret is not valid UTF-8")?
            }
            Err(_) => "facilityhub-dev-secret".to_string(),
        };

        let production = env::var("APP_ENV")
            .map(|value| value.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let use_mock_backend = env::var("MOCK_BACKEND")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let refresh_token_expiration_days = env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .unwrap_or(7);

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Config {
            backend_base_url,
            jwt_secret,
            production,
            use_mock_backend,
            refresh_token_expiration_days,
            bind_addr,
            gate: GateConfig::new(production),
        })
    }

    /// Cookie attributes for the long-lived credential. `Secure` only in
    /// production so local development over plain HTTP keeps working.
    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            secure: self.production,
            same_site: SameSite::Lax,
        }
    }
}
