use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use serde_json::{Map, Value, json};
use tower::ServiceExt;

use scribe::application::posts::PostService;
use scribe::application::repos::{PostsRepo, PostsWriteRepo};
use scribe::domain::posts::{IdStrategy, Post, PostId};
use scribe::infra::http::api::extract::{ApiJson, ApiPath, ApiQuery};
use scribe::infra::http::api::handlers;
use scribe::infra::http::api::models::*;
use scribe::infra::http::{ApiState, REQUEST_ID_HEADER, RouterOptions, build_router};
use scribe::infra::store::InMemoryPostStore;

fn post(id: PostId, title: &str, content: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        content: content.to_string(),
        extra: Map::new(),
    }
}

fn seed() -> Vec<Post> {
    vec![post(1, "T1", "C1"), post(2, "T2", "C2")]
}

fn build_state(posts: Vec<Post>, strategy: IdStrategy) -> ApiState {
    let store = Arc::new(InMemoryPostStore::new(posts, strategy).expect("valid seed"));
    let reader: Arc<dyn PostsRepo> = store.clone();
    let writer: Arc<dyn PostsWriteRepo> = store;
    ApiState::new(Arc::new(PostService::new(reader, writer)))
}

fn build_app(posts: Vec<Post>) -> Router {
    build_router(
        build_state(posts, IdStrategy::Length),
        RouterOptions { cors: false },
    )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("router response");
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn ids(value: &Value) -> Vec<u64> {
    value
        .as_array()
        .expect("array body")
        .iter()
        .map(|post| post["id"].as_u64().expect("numeric id"))
        .collect()
}

fn titles(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array body")
        .iter()
        .map(|post| post["title"].as_str().expect("title").to_string())
        .collect()
}

#[tokio::test]
async fn list_returns_posts_in_collection_order() {
    let app = build_app(seed());

    let (status, body) = send(&app, Method::GET, "/api/posts", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": 1, "title": "T1", "content": "C1"},
            {"id": 2, "title": "T2", "content": "C2"}
        ])
    );
}

#[tokio::test]
async fn list_sorts_by_field_and_direction() {
    let app = build_app(vec![
        post(1, "banana", "z"),
        post(2, "apple", "y"),
        post(3, "cherry", "x"),
    ]);

    let (status, body) = send(&app, Method::GET, "/api/posts?sort=title", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["apple", "banana", "cherry"]);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/posts?sort=title&direction=desc",
        None,
    )
    .await;
    assert_eq!(titles(&body), vec!["cherry", "banana", "apple"]);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/posts?sort=content&direction=asc",
        None,
    )
    .await;
    assert_eq!(ids(&body), vec![3, 2, 1]);
}

#[tokio::test]
async fn sort_is_stable_for_equal_keys() {
    let app = build_app(vec![
        post(1, "same", "a"),
        post(2, "other", "b"),
        post(3, "same", "c"),
    ]);

    let (_, body) = send(&app, Method::GET, "/api/posts?sort=title", None).await;
    assert_eq!(ids(&body), vec![2, 1, 3]);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/posts?sort=title&direction=desc",
        None,
    )
    .await;
    assert_eq!(ids(&body), vec![1, 3, 2]);
}

#[tokio::test]
async fn invalid_direction_with_valid_sort_is_rejected() {
    let app = build_app(seed());

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/posts?sort=title&direction=sideways",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Direction must be 'asc' or 'desc'"}));
}

#[tokio::test]
async fn unknown_sort_field_ignores_direction() {
    let app = build_app(vec![post(1, "b", "b"), post(2, "a", "a")]);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/posts?sort=id&direction=sideways",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2]);
}

#[tokio::test]
async fn create_then_list_round_trip() {
    let app = build_app(seed());

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({"title": "A", "content": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, json!({"id": 3, "title": "A", "content": "B"}));

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    let matches: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .filter(|post| post["title"] == "A" && post["content"] == "B")
        .collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["id"], 3);
}

#[tokio::test]
async fn create_requires_title_and_content() {
    let app = build_app(seed());

    for payload in [
        json!({"title": "only title"}),
        json!({"content": "only content"}),
        json!({}),
    ] {
        let (status, body) = send(&app, Method::POST, "/api/posts", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Title and content are required."}));
    }

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(ids(&listed), vec![1, 2]);
}

#[tokio::test]
async fn create_accepts_empty_strings_and_keeps_extra_fields() {
    let app = build_app(seed());

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({"title": "", "content": "", "author": "ada", "tags": ["x"], "id": 77})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 3);
    assert_eq!(created["title"], "");
    assert_eq!(created["author"], "ada");
    assert_eq!(created["tags"], json!(["x"]));

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(listed[2]["author"], "ada");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = build_app(seed());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/posts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = read_json(app.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({"title": 5, "content": "c"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_content_type_is_a_bad_request() {
    let app = build_app(seed());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/posts")
        .body(Body::from(r#"{"title": "t", "content": "c"}"#))
        .unwrap();
    let (status, body) = read_json(app.oneshot(request).await.unwrap()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let app = build_app(seed());

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/posts/1",
        Some(json!({"title": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "title": "X", "content": "C1"}));

    let (status, body) = send(&app, Method::PUT, "/api/posts/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "title": "X", "content": "C1"}));

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(listed[0], json!({"id": 1, "title": "X", "content": "C1"}));
}

#[tokio::test]
async fn array_bodies_are_rejected() {
    let app = build_app(seed());

    for payload in [json!(["hijacked", "via array"]), json!([])] {
        let (status, body) =
            send(&app, Method::PUT, "/api/posts/1", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, Method::POST, "/api/posts", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(
        listed,
        json!([
            {"id": 1, "title": "T1", "content": "C1"},
            {"id": 2, "title": "T2", "content": "C2"}
        ])
    );
}

#[tokio::test]
async fn explicit_null_fields_are_rejected() {
    let app = build_app(seed());

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/posts/1",
        Some(json!({"title": null})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Title must be a string."}));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({"title": null, "content": "c"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Title must be a string."}));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({"title": "t", "content": null})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Content must be a string."}));

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(ids(&listed), vec![1, 2]);
    assert_eq!(listed[0]["title"], "T1");
}

#[tokio::test]
async fn update_unknown_post_is_not_found() {
    let app = build_app(seed());

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/posts/99",
        Some(json!({"title": "X"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Post not found."}));
}

#[tokio::test]
async fn non_integer_post_id_is_rejected() {
    let app = build_app(seed());

    let (status, body) = send(&app, Method::DELETE, "/api/posts/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Post id must be a non-negative integer."})
    );

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/posts/-1",
        Some(json!({"title": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_post_and_reports_message() {
    let app = build_app(seed());

    let (status, body) = send(&app, Method::DELETE, "/api/posts/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Post with id 1 has been deleted successfully."})
    );

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(ids(&listed), vec![2]);
}

#[tokio::test]
async fn delete_unknown_post_never_mutates() {
    let app = build_app(seed());

    for _ in 0..2 {
        let (status, body) = send(&app, Method::DELETE, "/api/posts/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Post not found."}));
    }

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(ids(&listed), vec![1, 2]);
}

#[tokio::test]
async fn search_matches_case_insensitive_substrings() {
    let app = build_app(vec![
        post(1, "Category theory", "maths"),
        post(2, "Dogs", "A CAT shows up"),
        post(3, "Birds", "feathers"),
    ]);

    let (status, body) = send(&app, Method::GET, "/api/posts/search?title=cat", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1]);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/posts/search?title=cat&content=cat",
        None,
    )
    .await;
    assert_eq!(ids(&body), vec![1, 2]);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/posts/search?content=FEATHER",
        None,
    )
    .await;
    assert_eq!(ids(&body), vec![3]);
}

#[tokio::test]
async fn search_without_terms_returns_nothing() {
    let app = build_app(seed());

    let (status, body) = send(&app, Method::GET, "/api/posts/search", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/posts/search?title=&content=",
        None,
    )
    .await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn repeated_query_keys_use_the_first_value() {
    let app = build_app(vec![post(1, "b", "x"), post(2, "a", "y")]);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/posts/search?title=a&title=b",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![2]);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/posts?sort=title&sort=content&direction=asc&direction=sideways",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![2, 1]);
}

#[tokio::test]
async fn delete_then_create_reuses_length_based_id() {
    let app = build_app(seed());

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({"title": "T3", "content": "C3"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, json!({"id": 3, "title": "T3", "content": "C3"}));

    let (status, _) = send(&app, Method::DELETE, "/api/posts/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(ids(&listed), vec![2, 3]);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({"title": "T4", "content": "C4"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 3);

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(ids(&listed), vec![2, 3, 3]);
}

#[tokio::test]
async fn monotonic_ids_survive_delete_then_create() {
    let app = build_router(
        build_state(seed(), IdStrategy::Monotonic),
        RouterOptions { cors: false },
    );

    send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({"title": "T3", "content": "C3"})),
    )
    .await;
    send(&app, Method::DELETE, "/api/posts/1", None).await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({"title": "T4", "content": "C4"})),
    )
    .await;

    assert_eq!(created["id"], 4);
    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(ids(&listed), vec![2, 3, 4]);
}

#[tokio::test]
async fn exhausted_monotonic_ids_are_an_internal_error() {
    let app = build_router(
        build_state(vec![post(PostId::MAX, "T", "C")], IdStrategy::Monotonic),
        RouterOptions { cors: false },
    );

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({"title": "A", "content": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error."}));

    let (_, listed) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(ids(&listed), vec![PostId::MAX]);
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let app = build_app(seed());

    let (status, body) = send(&app, Method::GET, "/api/nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/posts/1", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = build_app(seed());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("request id header");
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn cors_headers_follow_the_toggle() {
    let request = || {
        Request::builder()
            .uri("/api/posts")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap()
    };

    let enabled = build_router(
        build_state(seed(), IdStrategy::Length),
        RouterOptions { cors: true },
    );
    let response = enabled.oneshot(request()).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );

    let disabled = build_app(seed());
    let response = disabled.oneshot(request()).await.unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn handlers_can_be_called_directly() {
    let state = build_state(seed(), IdStrategy::Length);

    let response = handlers::create_post(
        State(state.clone()),
        ApiJson(PostCreateRequest {
            title: Some(Some("handler-post".into())),
            content: Some(Some("body".into())),
            ..Default::default()
        }),
    )
    .await
    .expect("create post via handler")
    .into_response();
    let (status, created) = read_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 3);

    let response = handlers::update_post(
        State(state.clone()),
        ApiPath(3),
        ApiJson(PostUpdateRequest {
            title: None,
            content: Some(Some("edited".into())),
        }),
    )
    .await
    .expect("update post via handler")
    .into_response();
    let (_, updated) = read_json(response).await;
    assert_eq!(updated["title"], "handler-post");
    assert_eq!(updated["content"], "edited");

    let response = handlers::search_posts(
        State(state.clone()),
        ApiQuery(PostSearchQuery {
            title: Some("HANDLER".into()),
            content: None,
        }),
    )
    .await
    .expect("search via handler")
    .into_response();
    let (_, found) = read_json(response).await;
    assert_eq!(ids(&found), vec![3]);

    let err = handlers::delete_post(State(state.clone()), ApiPath(404))
        .await
        .err()
        .expect("missing post");
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.message(), "Post not found.");

    let err = handlers::list_posts(
        State(state),
        ApiQuery(PostListQuery {
            sort: Some("content".into()),
            direction: Some("up".into()),
        }),
    )
    .await
    .err()
    .expect("bad direction");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}
