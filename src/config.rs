#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds. Default: 24h.
    pub token_ttl_secs: u64,
    /// Directory uploaded files are written under; served at /uploads.
    pub upload_dir: String,
    /// Maximum proposal document size in bytes. Default: 10 MiB.
    pub max_proposal_bytes: usize,
    /// Maximum room image size in bytes. Default: 5 MiB.
    pub max_image_bytes: usize,
    /// Notifications older than this are swept. Default: 30 days.
    pub notification_ttl_days: i64,
    pub bcrypt_cost: u32,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let jwt_secret =
        std::env::var("ROOMSERVE_JWT_SECRET").unwrap_or_else(|_| "CHANGE_ME_JWT_SECRET".into());

    if jwt_secret == "CHANGE_ME_JWT_SECRET" {
        let env_mode = std::env::var("ROOMSERVE_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "ROOMSERVE_JWT_SECRET is still the insecure placeholder. \
                 Set a proper secret before running in production."
            );
        }
        eprintln!("warning: ROOMSERVE_JWT_SECRET is not set — using insecure placeholder");
    }

    Ok(Config {
        port: std::env::var("ROOMSERVE_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/roomserve".into()),
        jwt_secret,
        token_ttl_secs: std::env::var("ROOMSERVE_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400),
        upload_dir: std::env::var("ROOMSERVE_UPLOAD_DIR")
            .unwrap_or_else(|_| "public/uploads".into()),
        max_proposal_bytes: std::env::var("ROOMSERVE_MAX_PROPOSAL_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10 * 1024 * 1024),
        max_image_bytes: std::env::var("ROOMSERVE_MAX_IMAGE_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5 * 1024 * 1024),
        notification_ttl_days: std::env::var("ROOMSERVE_NOTIFICATION_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
        bcrypt_cost: std::env::var("ROOMSERVE_BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(bcrypt::DEFAULT_COST),
    })
}
