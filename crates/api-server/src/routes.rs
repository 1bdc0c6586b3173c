use application::SocialApp;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use domain::{Comment, Follow, Post, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub social_app: Arc<SocialApp>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub author_id: String,
    pub content: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub author_id: String,
    pub content: String,
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    id: String,
    username: String,
    email: String,
    bio: Option<String>,
    profile_picture_url: Option<String>,
    created_at: DateTime<Utc>,
    followers_count: u32,
    following_count: u32,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            bio: user.bio().map(str::to_string),
            profile_picture_url: user.profile_picture_url().map(str::to_string),
            created_at: user.created_at(),
            followers_count: user.followers_count(),
            following_count: user.following_count(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostInfo {
    id: String,
    author_id: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    likes_count: u32,
    comments_count: u32,
    image_urls: Vec<String>,
    hashtags: Vec<String>,
    mentions: Vec<String>,
}

impl From<Post> for PostInfo {
    fn from(post: Post) -> Self {
        Self {
            id: post.id().to_string(),
            author_id: post.author_id().to_string(),
            content: post.content().to_string(),
            created_at: post.created_at(),
            updated_at: post.updated_at(),
            likes_count: post.likes_count(),
            comments_count: post.comments_count(),
            image_urls: post.image_urls().to_vec(),
            hashtags: post.hashtags().iter().cloned().collect(),
            mentions: post.mentions().iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentInfo {
    id: String,
    post_id: String,
    author_id: String,
    content: String,
    parent_comment_id: Option<String>,
    created_at: DateTime<Utc>,
    likes_count: u32,
}

impl From<Comment> for CommentInfo {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id().to_string(),
            post_id: comment.post_id().to_string(),
            author_id: comment.author_id().to_string(),
            content: comment.content().to_string(),
            parent_comment_id: comment.parent_comment_id().map(str::to_string),
            created_at: comment.created_at(),
            likes_count: comment.likes_count(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FollowInfo {
    id: String,
    follower_id: String,
    followee_id: String,
    created_at: DateTime<Utc>,
}

impl From<Follow> for FollowInfo {
    fn from(follow: Follow) -> Self {
        Self {
            id: follow.id().to_string(),
            follower_id: follow.follower_id().to_string(),
            followee_id: follow.followee_id().to_string(),
            created_at: follow.created_at(),
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        // Users and follows
        .route("/api/users/register", post(register_user))
        .route("/api/users/:id", get(get_user))
        .route(
            "/api/users/:id/follow/:target",
            post(follow_user).delete(unfollow_user),
        )
        // Posts and comments
        .route("/api/posts", post(create_post))
        .route("/api/posts/hashtag/:tag", get(posts_by_hashtag))
        .route("/api/posts/:id", get(get_post))
        .route("/api/posts/:id/comments", get(list_comments).post(add_comment))
        // Operations
        .route("/api/migrations/status", get(migration_status))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn migration_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.social_app.migration_runner.status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("Failed to read migration status: {}", e) })),
        )
            .into_response(),
    }
}

async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .social_app
        .user_service
        .register(&payload.username, &payload.email, &payload.password)
        .await?;
    info!("👤 Registered user {}", user.username());
    Ok((StatusCode::CREATED, Json(UserInfo::from(user))))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.social_app.user_service.get_user_by_id(&id).await?;
    Ok(Json(UserInfo::from(user)))
}

async fn follow_user(
    State(state): State<AppState>,
    Path((id, target)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let follow = state.social_app.follow_service.follow(&id, &target).await?;
    Ok((StatusCode::CREATED, Json(FollowInfo::from(follow))))
}

async fn unfollow_user(
    State(state): State<AppState>,
    Path((id, target)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    state.social_app.follow_service.unfollow(&id, &target).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .social_app
        .post_service
        .create_post(&payload.author_id, &payload.content, payload.image_urls)
        .await?;
    Ok((StatusCode::CREATED, Json(PostInfo::from(post))))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.social_app.post_service.get_post(&id).await?;
    Ok(Json(PostInfo::from(post)))
}

async fn posts_by_hashtag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.social_app.post_service.posts_by_hashtag(&tag).await?;
    let posts: Vec<PostInfo> = posts.into_iter().map(Into::into).collect();
    Ok(Json(posts))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(payload): Json<AddCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .social_app
        .post_service
        .add_comment(
            &post_id,
            &payload.author_id,
            &payload.content,
            payload.parent_comment_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CommentInfo::from(comment))))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // 404 for an unknown post rather than an empty list
    state.social_app.post_service.get_post(&post_id).await?;
    let comments = state.social_app.post_service.comments_for_post(&post_id).await?;
    let comments: Vec<CommentInfo> = comments.into_iter().map(Into::into).collect();
    Ok(Json(comments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let social_app = SocialApp::in_memory();
        social_app.migrate().await.unwrap();
        app_router(AppState {
            social_app: Arc::new(social_app),
        })
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(router: &Router, username: &str) -> String {
        let (status, body) = send(
            router,
            Method::POST,
            "/api/users/register",
            Some(json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "password1"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.get("passwordHash").is_none());
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_and_migration_status() {
        let router = test_router().await;

        let (status, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&router, Method::GET, "/api/migrations/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currentVersion"], "002");
        assert_eq!(body["pending"], json!([]));
    }

    #[tokio::test]
    async fn registration_errors_map_to_status_codes() {
        let router = test_router().await;
        register(&router, "alice").await;

        let (status, _) = send(
            &router,
            Method::POST,
            "/api/users/register",
            Some(json!({"username": "alice", "email": "new@example.com", "password": "pw123456"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/users/register",
            Some(json!({"username": "bo", "email": "bo@example.com", "password": "pw123456"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Validation error"));

        let (status, _) = send(&router, Method::GET, "/api/users/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn posts_comments_and_follows() {
        let router = test_router().await;
        let alice = register(&router, "alice").await;
        let bob = register(&router, "bob").await;

        let (status, post) = send(
            &router,
            Method::POST,
            "/api/posts",
            Some(json!({"authorId": alice, "content": "Hello #World from @bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(post["hashtags"], json!(["world"]));
        let post_id = post["id"].as_str().unwrap().to_string();

        let (_, tagged) = send(&router, Method::GET, "/api/posts/hashtag/world", None).await;
        assert_eq!(tagged.as_array().unwrap().len(), 1);

        let uri = format!("/api/posts/{}/comments", post_id);
        let (status, _) = send(
            &router,
            Method::POST,
            &uri,
            Some(json!({"authorId": bob, "content": "Hi!"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, comments) = send(&router, Method::GET, &uri, None).await;
        assert_eq!(comments.as_array().unwrap().len(), 1);

        let (_, post) = send(&router, Method::GET, &format!("/api/posts/{}", post_id), None).await;
        assert_eq!(post["commentsCount"], 1);

        let follow_uri = format!("/api/users/{}/follow/{}", bob, alice);
        let (status, _) = send(&router, Method::POST, &follow_uri, None).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&router, Method::POST, &follow_uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, user) = send(&router, Method::GET, &format!("/api/users/{}", alice), None).await;
        assert_eq!(user["followersCount"], 1);

        let (status, _) = send(&router, Method::DELETE, &follow_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&router, Method::DELETE, &follow_uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let self_follow = format!("/api/users/{}/follow/{}", alice, alice);
        let (status, _) = send(&router, Method::POST, &self_follow, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
