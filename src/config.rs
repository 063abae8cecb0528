use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_acquire_timeout_secs: u64,
    pub redis_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,

    // Uploads
    pub max_image_size: usize,

    // Leaderboard
    pub leaderboard_default_limit: usize,
    /// How many top entries the leaderboard cache keeps.
    pub leaderboard_cache_size: usize,
    pub leaderboard_cache_ttl: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: 20,
            database_min_connections: 2,
            database_acquire_timeout_secs: 30,
            redis_url: None,
            host: "0.0.0.0".to_string(),
            port: 8001,
            allowed_origins: vec!["*".to_string()],
            max_image_size: 10485760, // 10MB
            leaderboard_default_limit: 20,
            leaderboard_cache_size: 100,
            leaderboard_cache_ttl: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            database_min_connections: parse_or(
                "DATABASE_MIN_CONNECTIONS",
                defaults.database_min_connections,
            ),
            database_acquire_timeout_secs: parse_or(
                "DATABASE_ACQUIRE_TIMEOUT",
                defaults.database_acquire_timeout_secs,
            ),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", defaults.port),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            max_image_size: parse_or("MAX_IMAGE_SIZE", defaults.max_image_size),
            leaderboard_default_limit: parse_or(
                "LEADERBOARD_DEFAULT_LIMIT",
                defaults.leaderboard_default_limit,
            ),
            leaderboard_cache_size: parse_or(
                "LEADERBOARD_CACHE_SIZE",
                defaults.leaderboard_cache_size,
            ),
            leaderboard_cache_ttl: parse_or("LEADERBOARD_CACHE_TTL", defaults.leaderboard_cache_ttl),
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
