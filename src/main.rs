use axum::{
    routing::{get, patch, post},
    Router,
};
use marketplace_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let api = Router::new()
        .route(
            "/api/conversations",
            get(routes::conversations::list_inbox).post(routes::conversations::start_conversation),
        )
        .route(
            "/api/conversations/:id/read",
            post(routes::conversations::mark_conversation_read),
        )
        .route(
            "/api/messages",
            get(routes::messages::list_messages).post(routes::messages::send_message),
        )
        .route(
            "/api/messages/unread",
            get(routes::messages::unread_count),
        )
        .route(
            "/api/opportunities/:id/interest",
            post(routes::applications::express_interest),
        )
        .route(
            "/api/applications",
            get(routes::applications::list_my_applications),
        )
        .route(
            "/api/applications/:id",
            patch(routes::applications::transition_application),
        )
        .layer(axum::middleware::from_fn(
            marketplace_backend::middleware::auth::require_bearer_auth,
        ));

    let app = base_routes
        .merge(api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
