use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roomserve::cli::{Cli, Commands};
use roomserve::store::postgres::PgStore;
use roomserve::{api, config, jobs, models::user::Role, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "roomserve=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(Commands::CreateAdmin {
            name,
            email,
            password,
            role,
        }) => create_admin(&cfg, &name, &email, &password, role.into()).await,
        Some(Commands::Seed) => seed(&cfg).await,
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let upload_dir = cfg.upload_dir.clone();
    tokio::fs::create_dir_all(&upload_dir).await?;

    let notification_ttl_days = cfg.notification_ttl_days;
    let state = Arc::new(AppState {
        db: db.clone(),
        config: cfg,
    });

    // Proposals cap at 10 MiB; leave headroom for the rest of the form.
    let body_limit = DefaultBodyLimit::max(12 * 1024 * 1024);

    let app = axum::Router::new()
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .nest("/api/v1", api::api_router())
        .nest_service("/uploads", ServeDir::new(&upload_dir))
        .with_state(state)
        .layer(body_limit)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer({
            use axum::http::Method;
            use tower_http::cors::AllowOrigin;
            let frontend_origin = std::env::var("ROOMSERVE_FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string());
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(move |origin, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str == frontend_origin
                        || origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                }))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::PATCH,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::HeaderName::from_static("content-type"),
                    axum::http::HeaderName::from_static("authorization"),
                ])
        })
        .layer(axum::middleware::from_fn(request_id_middleware));

    jobs::cleanup::spawn(db, notification_ttl_days);
    tracing::info!("Notification sweep started (every 1h)");

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("roomserve listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Middleware: injects a unique X-Request-Id into every response so clients
/// can correlate errors with server logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

async fn create_admin(
    cfg: &config::Config,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<()> {
    let db = PgStore::connect(&cfg.database_url).await?;
    db.migrate().await?;

    let email = email.trim().to_lowercase();
    if db.email_taken(&email, None).await? {
        anyhow::bail!("email {} is already registered", email);
    }
    let hash = bcrypt::hash(password, cfg.bcrypt_cost)?;
    let user = db.insert_user(name, &email, &hash, role).await?;
    println!("created {:?} account {} ({})", user.role, user.email, user.id);
    Ok(())
}

/// Demo data: the department's buildings and a few rooms.
async fn seed(cfg: &config::Config) -> anyhow::Result<()> {
    let db = PgStore::connect(&cfg.database_url).await?;
    db.migrate().await?;

    let buildings = [
        ("Gedung A", "GDA"),
        ("Gedung F", "GDF"),
        ("Gedung G", "GDG"),
        ("Gedung Kreativitas Mahasiswa", "GKM"),
    ];

    let mut ids = std::collections::HashMap::new();
    for (name, code) in buildings {
        let b = db.insert_building(name, code).await?;
        println!("building {} ({})", b.name, b.code);
        ids.insert(code, b.id);
    }

    let rooms = [
        ("Auditorium Algoritma", 100, "Proyektor, Sound System, AC, Microphone", "GDG"),
        ("Lab Komputer 1", 40, "Komputer, Proyektor, AC, Whiteboard", "GDG"),
        ("Kelas F 4.10", 50, "Proyektor, AC, Sound System", "GDF"),
        ("Ruang Rapat GKM", 30, "Proyektor, AC, Whiteboard", "GKM"),
    ];

    for (name, capacity, facilities, code) in rooms {
        let room = db
            .insert_room(name, capacity, facilities, None, ids[code])
            .await?;
        println!("room {} (capacity {})", room.name, room.capacity);
    }

    println!("seed complete");
    Ok(())
}
