use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use pubsub_api::{PublishRequest, PublishResponse, TopicInfo};

use super::AppState;

// ═══════════════════════════════════════════════════════════════
//  REST: POST /api/publish
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_publish(
    State(state): State<AppState>,
    Json(request): Json<PublishRequest>,
) -> impl IntoResponse {
    let ack = state.broker.publish(request.topic, request.content);
    Json(PublishResponse {
        success: true,
        message_id: ack.message_id,
    })
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/topics
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_list_topics(
    State(state): State<AppState>,
) -> impl IntoResponse {
    let names: Vec<String> = state.broker.list_topics().into_iter().collect();
    Json(names)
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/topics/{name}
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_topic_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let count = state.broker.count_for_topic(&name);
    Json(TopicInfo { topic: name, count })
}
