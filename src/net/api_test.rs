use super::*;

#[test]
fn normalize_base_url_trims_trailing_slashes() {
    assert_eq!(normalize_base_url("http://localhost:3000/api/proxy/"), "http://localhost:3000/api/proxy");
    assert_eq!(normalize_base_url(" https://example.test// "), "https://example.test");
}

#[test]
fn new_client_keeps_normalized_base() {
    let client = ApiClient::new("http://127.0.0.1:9/").unwrap();
    assert_eq!(client.base_url(), "http://127.0.0.1:9");
}

#[test]
fn endpoint_appends_segments_to_base_path() {
    let client = ApiClient::new("http://localhost:3000/api/proxy/").unwrap();
    assert_eq!(client.endpoint(&["spaces", "s1"]).as_str(), "http://localhost:3000/api/proxy/spaces/s1");
    assert_eq!(
        client.endpoint(&["spaces", "s1", "nodes", "n1"]).as_str(),
        "http://localhost:3000/api/proxy/spaces/s1/nodes/n1"
    );

    let bare = ApiClient::new("http://127.0.0.1:9").unwrap();
    assert_eq!(bare.endpoint(&["users", "u1"]).as_str(), "http://127.0.0.1:9/users/u1");
}

#[test]
fn endpoint_encodes_reserved_characters_in_ids() {
    let client = ApiClient::new("https://api.example.test/Prod").unwrap();
    assert_eq!(
        client.endpoint(&["spaces", "a/b?c#d"]).as_str(),
        "https://api.example.test/Prod/spaces/a%2Fb%3Fc%23d"
    );
}

#[test]
fn relative_base_url_is_rejected() {
    let err = ApiClient::new("/api/proxy").unwrap_err();
    assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    assert_eq!(err.error_code(), "E_BASE_URL");
    assert!(matches!(ApiClient::new("mailto:someone@example.test").unwrap_err(), ApiError::InvalidBaseUrl { .. }));
}

#[test]
fn status_error_maps_not_found() {
    let err = status_error("get space", StatusCode::NOT_FOUND, r#"{"error":"Space not found"}"#.into());
    assert!(err.is_not_found());
}

#[test]
fn status_error_keeps_reason_phrase() {
    let err = status_error("list spaces", StatusCode::INTERNAL_SERVER_ERROR, String::new());
    match err {
        ApiError::Http { status, reason, .. } => {
            assert_eq!(status, 500);
            assert_eq!(reason, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn decode_body_reports_operation() {
    let err = decode_body::<Space>("get space", "not json").unwrap_err();
    assert!(matches!(err, ApiError::Decode { operation: "get space", .. }));
}
