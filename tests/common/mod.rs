#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::{RawQuery, State},
    http::{Request, StatusCode},
};
use embedquery::{ApiError, ModelSchema, QueryParams, QueryTranslator, Schema, Translation};
use sea_orm::{
    ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, JoinType,
    QuerySelect, RelationTrait, sea_query::Alias,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub mod boat_entity;
pub mod user_entity;

/// Route `tracing` output to the test harness so diagnostics show up with `--nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_target(false)
        .compact()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    let backend = db.get_database_backend();
    let schema = sea_orm::Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(boat_entity::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(user_entity::Entity)))
        .await?;

    Ok(db)
}

/// Database with a small fleet and two owners
pub async fn setup_seeded_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;

    let users = [(1, "nemo@example.com"), (2, "jack@example.com")];
    user_entity::Entity::insert_many(users.map(|(id, email)| user_entity::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        password_hash: Set("x".to_string()),
        version: Set(0),
    }))
    .exec(&db)
    .await?;

    let boats = [
        (1, "Nautilus", Some("Submarine of Captain Nemo"), 70, false, Some(1)),
        (2, "Black Pearl", Some("Fast pirate ship"), 50, true, Some(2)),
        (3, "Endurance", None, 44, true, None),
        (4, "Flying Dutchman", Some("Ghost ship"), 60, false, Some(2)),
        (5, "Kon-Tiki", Some("Balsa raft"), 14, false, None),
    ];
    boat_entity::Entity::insert_many(boats.map(
        |(id, title, description, length, sold, owner_id)| boat_entity::ActiveModel {
            id: Set(id),
            title: Set(title.to_string()),
            description: Set(description.map(str::to_string)),
            length: Set(length),
            sold: Set(sold),
            owner_id: Set(owner_id),
            version: Set(0),
        },
    ))
    .exec(&db)
    .await?;

    Ok(db)
}

/// Registry for the test entities
pub fn test_schema() -> Schema {
    Schema::from_models([
        ModelSchema::from_entity::<boat_entity::Entity>()
            .queryable(&["title", "description", "length", "sold"])
            .association("owner", "Owner", "users"),
        ModelSchema::from_entity::<user_entity::Entity>()
            .queryable(&["email"])
            .exclude(&["password_hash"])
            .association("boats", "Boats", "boats"),
    ])
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub schema: Arc<Schema>,
}

/// List handler: translate the query, then run filter, order, pagination and projection
async fn list_boats(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let mut params = QueryParams::parse(query.as_deref().unwrap_or_default());
    let Translation { plan, diagnostics } =
        QueryTranslator::new(&state.schema).translate("boats", &mut params)?;

    let columns: Vec<boat_entity::Column> = plan
        .attributes
        .iter()
        .filter_map(|name| name.parse().ok())
        .collect();

    let mut select = boat_entity::Entity::find();
    for alias in plan.sort_join_aliases() {
        let relation = match alias.as_str() {
            "Owner" => boat_entity::Relation::Owner.def(),
            _ => {
                return Err(ApiError::bad_request(format!(
                    "sorting through '{alias}' is not supported"
                )));
            }
        };
        select = select.join_as(JoinType::LeftJoin, relation, Alias::new(alias));
    }

    let mut select = plan.apply_to(select);
    if !columns.is_empty() {
        select = select.select_only().columns(columns);
    }

    let rows = select
        .into_json()
        .all(&state.db)
        .await
        .map_err(|err| ApiError::internal("Database error", Some(err.to_string())))?;

    Ok(Json(json!({ "data": rows, "diagnostics": diagnostics })))
}

/// Route wired to a model the registry doesn't know
async fn list_docks(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let mut params = QueryParams::parse(query.as_deref().unwrap_or_default());
    let translation = QueryTranslator::new(&state.schema).translate("docks", &mut params)?;
    Ok(Json(json!(translation.plan)))
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let state = AppState {
        db,
        schema: Arc::new(test_schema()),
    };

    let api = Router::new()
        .route("/boats", axum::routing::get(list_boats))
        .route("/docks", axum::routing::get(list_docks))
        .with_state(state);

    Router::new().nest("/api/v1", api)
}

/// GET `uri` and decode the JSON body
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

/// Titles of the rows in a list response, in response order
pub fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["title"].as_str().unwrap().to_string())
        .collect()
}
