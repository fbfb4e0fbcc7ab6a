use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use tracing::debug;

pub async fn fallback_handler(uri: Uri) -> impl IntoResponse {
    debug!(path = %uri.path(), "No route matched");

    (
        StatusCode::NOT_FOUND,
        "Invalid endpoint. Valid endpoints: /announce, /infohash, /manifest/{name}, /health, /metrics",
    )
}

#[cfg(test)]
mod tests {
    use crate::core::routes::build_router;
    use crate::core::state::test_helpers::state_with;
    use crate::storage::MockStorage;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(state_with(Arc::new(MockStorage::new())));
        let response = app
            .oneshot(Request::builder().uri("/scrape").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8(bytes.to_vec()).unwrap().starts_with("Invalid endpoint"));
    }
}
