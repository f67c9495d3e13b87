use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, patch, post},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use marketplace_backend::{middleware::auth::Claims, AppState};

async fn setup() -> (Router, PgPool) {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    let _ = marketplace_backend::config::init_config();

    let pool = marketplace_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");

    let app_state = AppState::new(pool.clone());
    let app = Router::new()
        .route(
            "/api/opportunities/:id/interest",
            post(marketplace_backend::routes::applications::express_interest),
        )
        .route(
            "/api/applications",
            get(marketplace_backend::routes::applications::list_my_applications),
        )
        .route(
            "/api/applications/:id",
            patch(marketplace_backend::routes::applications::transition_application),
        )
        .layer(axum::middleware::from_fn(
            marketplace_backend::middleware::auth::require_bearer_auth,
        ))
        .with_state(app_state);

    (app, pool)
}

fn bearer(user: Uuid) -> String {
    let claims = Claims {
        sub: user.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret("test_secret_key".as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    user: Uuid,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", bearer(user));
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, body)
}

async fn seed_opportunity(pool: &PgPool, owner: Uuid, title: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO opportunities (user_id, title, category, description) VALUES ($1, $2, 'gig', 'seeded listing') RETURNING id",
    )
    .bind(owner)
    .bind(title)
    .fetch_one(pool)
    .await
    .expect("seed opportunity")
}

#[tokio::test]
async fn duplicate_interest_is_a_conflict() {
    let (app, pool) = setup().await;
    let owner = Uuid::new_v4();
    let carol = Uuid::new_v4();
    let opportunity = seed_opportunity(&pool, owner, "Garden clean-up").await;

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/opportunities/{}/interest", opportunity),
        carol,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], json!("pending"));

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/opportunities/{}/interest", opportunity),
        carol,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM applications WHERE user_id = $1 AND opportunity_id = $2",
    )
    .bind(carol)
    .bind(opportunity)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn owner_cannot_apply_to_own_opportunity() {
    let (app, pool) = setup().await;
    let owner = Uuid::new_v4();
    let opportunity = seed_opportunity(&pool, owner, "My own gig").await;

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/opportunities/{}/interest", opportunity),
        owner,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/opportunities/{}/interest", Uuid::new_v4()),
        owner,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn withdraw_frees_the_slot_and_terminal_states_stay_put() {
    let (app, pool) = setup().await;
    let owner = Uuid::new_v4();
    let carol = Uuid::new_v4();
    let opportunity = seed_opportunity(&pool, owner, "Hackathon staffing").await;

    let (status, first) = request(
        &app,
        "POST",
        &format!("/api/opportunities/{}/interest", opportunity),
        carol,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let first_id = first["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/applications/{}", first_id),
        carol,
        Some(json!({ "status": "withdrawn" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("withdrawn"));

    // withdrawn rows do not hold the pending slot
    let (status, second) = request(
        &app,
        "POST",
        &format!("/api/opportunities/{}/interest", opportunity),
        carol,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let second_id = second["id"].as_str().unwrap().to_string();
    assert_ne!(first_id, second_id);

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/applications/{}", second_id),
        owner,
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("accepted"));

    // no transition leaves a terminal state
    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/applications/{}", second_id),
        owner,
        Some(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/applications/{}", second_id),
        carol,
        Some(json!({ "status": "withdrawn" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM applications WHERE user_id = $1 AND opportunity_id = $2 AND status = 'pending'",
    )
    .bind(carol)
    .bind(opportunity)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(pending, 0);
}

#[tokio::test]
async fn transition_entitlements_enforced() {
    let (app, pool) = setup().await;
    let owner = Uuid::new_v4();
    let carol = Uuid::new_v4();
    let opportunity = seed_opportunity(&pool, owner, "Library shift").await;

    let (_, application) = request(
        &app,
        "POST",
        &format!("/api/opportunities/{}/interest", opportunity),
        carol,
        None,
    )
    .await;
    let application_id = application["id"].as_str().unwrap().to_string();

    // only the owner settles, only the applicant withdraws
    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/applications/{}", application_id),
        carol,
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/applications/{}", application_id),
        owner,
        Some(json!({ "status": "withdrawn" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // pending is not a transition target
    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/applications/{}", application_id),
        carol,
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/applications/{}", Uuid::new_v4()),
        carol,
        Some(json!({ "status": "withdrawn" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn my_applications_listed_newest_first() {
    let (app, pool) = setup().await;
    let owner = Uuid::new_v4();
    let carol = Uuid::new_v4();
    let first = seed_opportunity(&pool, owner, "First gig").await;
    let second = seed_opportunity(&pool, owner, "Second gig").await;

    for opportunity in [first, second] {
        let (status, _) = request(
            &app,
            "POST",
            &format!("/api/opportunities/{}/interest", opportunity),
            carol,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = request(&app, "GET", "/api/applications", carol, None).await;
    assert_eq!(status, StatusCode::OK);
    let applications = body.as_array().unwrap();
    assert_eq!(applications.len(), 2);
    for pair in applications.windows(2) {
        assert!(
            pair[0]["created_at"].as_str().unwrap() >= pair[1]["created_at"].as_str().unwrap()
        );
    }
}
