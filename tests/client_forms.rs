use reqwest::StatusCode;

use storefront_admin_api::client::http::map_error_response;
use storefront_admin_api::client::images::{ImageSet, MAX_PRODUCT_IMAGES, PendingImage};
use storefront_admin_api::client::stock::{parse_adjustment, preview_stock};
use storefront_admin_api::client::{ClientError, Session};

fn pending(name: &str) -> PendingImage {
    PendingImage {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0u8; 8],
    }
}

#[test]
fn selection_over_the_cap_is_rejected_without_state_change() {
    let mut images = ImageSet::from_persisted(vec![
        "/uploads/a.webp".into(),
        "/uploads/b.webp".into(),
        "/uploads/c.webp".into(),
    ]);

    let err = images
        .add_pending(vec![pending("d.png"), pending("e.png"), pending("f.png")])
        .unwrap_err();
    assert_eq!(err.existing, 3);
    assert_eq!(err.selected, 3);

    // Neither list changed.
    assert_eq!(images.persisted().len(), 3);
    assert!(images.pending().is_empty());

    // A selection that fits is accepted.
    images
        .add_pending(vec![pending("d.png"), pending("e.png")])
        .expect("within the cap");
    assert_eq!(images.total(), MAX_PRODUCT_IMAGES);
}

#[test]
fn final_urls_keep_relative_order() {
    let mut images = ImageSet::from_persisted(vec![
        "/uploads/a.webp".into(),
        "/uploads/b.webp".into(),
    ]);
    images.add_pending(vec![pending("c.png")]).unwrap();
    images.remove_persisted(0);

    let urls = images.final_urls(vec!["/uploads/c.webp".into()]);
    assert_eq!(urls, vec!["/uploads/b.webp", "/uploads/c.webp"]);
}

#[test]
fn removing_a_pending_file_before_submit() {
    let mut images = ImageSet::new();
    images
        .add_pending(vec![pending("a.png"), pending("b.png")])
        .unwrap();
    images.remove_pending(0);
    assert_eq!(images.pending().len(), 1);
    assert_eq!(images.pending()[0].file_name, "b.png");
}

#[test]
fn stock_preview_adds_the_signed_delta() {
    assert_eq!(preview_stock(10, -3), 7);
    assert_eq!(preview_stock(0, 5), 5);
    // Widened arithmetic: no wrap at the i32 edge.
    assert_eq!(preview_stock(i32::MAX, 1), i32::MAX as i64 + 1);
}

#[test]
fn adjustment_parsing_accepts_signed_input() {
    assert_eq!(parse_adjustment("-3"), Ok(-3));
    assert_eq!(parse_adjustment("+5"), Ok(5));
    assert_eq!(parse_adjustment(" 12 "), Ok(12));
    assert!(parse_adjustment("three").is_err());
    assert!(parse_adjustment("1.5").is_err());
    assert!(parse_adjustment("").is_err());
}

#[test]
fn unauthorized_response_clears_the_session() {
    let session = Session::with_token("stale-token");
    assert!(session.is_authenticated());

    let err = map_error_response(
        StatusCode::UNAUTHORIZED,
        r#"{"message":"Unauthorized: Invalid token"}"#,
        &session,
    );
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(!session.is_authenticated());
}

#[test]
fn error_mapping_follows_the_status_taxonomy() {
    let session = Session::new();

    let err = map_error_response(
        StatusCode::NOT_FOUND,
        r#"{"message":"Order with ID 42 not found"}"#,
        &session,
    );
    match err {
        ClientError::NotFound(message) => assert!(message.contains("42")),
        other => panic!("expected NotFound, got {other:?}"),
    }

    let err = map_error_response(
        StatusCode::CONFLICT,
        r#"{"message":"A category with this name already exists."}"#,
        &session,
    );
    assert!(matches!(err, ClientError::Conflict(_)));

    let err = map_error_response(
        StatusCode::BAD_REQUEST,
        r#"{"message":"Validation failed","errors":{"name":["Name is required"]}}"#,
        &session,
    );
    match err {
        ClientError::Validation(errors) => {
            assert_eq!(errors["name"], vec!["Name is required".to_string()]);
        }
        other => panic!("expected Validation, got {other:?}"),
    }

    // Unparseable body falls back to the generic message.
    let err = map_error_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>", &session);
    assert!(matches!(err, ClientError::Server(_)));
}

#[test]
fn cloned_sessions_share_the_token_slot() {
    let session = Session::new();
    let observer = session.clone();
    session.store("token");
    assert_eq!(observer.token().as_deref(), Some("token"));
    observer.clear();
    assert!(!session.is_authenticated());
}
