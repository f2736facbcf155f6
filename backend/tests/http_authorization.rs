//! Authorisation behaviour across the HTTP surface: token verification runs
//! before role checks, role checks run before any mutation, and self-scoped
//! lookups only pass for the token's own email.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use coursedesk_backend::domain::{ClassOffering, OfferingStatus, Role};
use rust_decimal_macros::dec;
use support::TestBackend;

#[actix_rt::test]
async fn protected_routes_reject_missing_tokens() {
    let backend = TestBackend::new();
    let app = test::init_service(backend.app()).await;

    for uri in [
        "/api/v1/users",
        "/api/v1/classes/all",
        "/api/v1/students/a@x.com/bookings",
        "/api/v1/students/a@x.com/payments",
    ] {
        let response =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri {uri}");
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body.get("error"), Some(&json!(true)));
        assert_eq!(body.get("message"), Some(&json!("Unauthorized Access")));
    }
}

#[actix_rt::test]
async fn garbage_tokens_never_reach_the_directory() {
    let backend = TestBackend::new();
    backend.seed_role("admin@x.com", Role::Admin);
    let app = test::init_service(backend.app()).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users")
            .insert_header(("Authorization", "Bearer not.a.token"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn role_mismatches_are_forbidden_before_any_mutation() {
    let backend = TestBackend::new();
    backend.seed_role("student@x.com", Role::Student);
    let offering = ClassOffering::submit(
        TestBackend::email("ana@x.com"),
        "Pottery",
        8,
        dec!(25),
    )
    .expect("valid offering");
    let offering_id = backend.stores.seed_offering(offering);

    let app = test::init_service(backend.app()).await;

    // A student may not review; the verdict must not be applied.
    let response = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/classes/{offering_id}/review"))
            .insert_header(backend.bearer_for("student@x.com"))
            .set_json(json!({ "status": "approved" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body.get("message"), Some(&json!("Access Forbidden")));

    let untouched = backend.stores.offering(offering_id).expect("still present");
    assert_eq!(untouched.status, OfferingStatus::Pending);
}

#[actix_rt::test]
async fn unknown_identities_are_forbidden_even_with_valid_tokens() {
    let backend = TestBackend::new();
    let app = test::init_service(backend.app()).await;

    // The token verifies, but no directory record backs it.
    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users")
            .insert_header(backend.bearer_for("ghost@x.com"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn role_lookup_is_self_scoped() {
    let backend = TestBackend::new();
    backend.seed_role("ada@x.com", Role::Student);
    backend.seed_role("eve@x.com", Role::Student);
    let app = test::init_service(backend.app()).await;

    let own = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/ada@x.com/role")
            .insert_header(backend.bearer_for("ada@x.com"))
            .to_request(),
    )
    .await;
    assert_eq!(own.status(), StatusCode::OK);
    let body: Value = test::read_body_json(own).await;
    assert_eq!(body.get("role"), Some(&json!("student")));

    let other = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/eve@x.com/role")
            .insert_header(backend.bearer_for("ada@x.com"))
            .to_request(),
    )
    .await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn promotions_apply_to_the_next_request_without_a_new_token() {
    let backend = TestBackend::new();
    backend.seed_role("admin@x.com", Role::Admin);
    let target_id = backend.seed_role("ana@x.com", Role::Unset);
    let app = test::init_service(backend.app()).await;

    // Before promotion the submission is forbidden.
    let before = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .insert_header(backend.bearer_for("ana@x.com"))
            .set_json(json!({ "name": "Pottery", "seats": 8, "price": "25" }))
            .to_request(),
    )
    .await;
    assert_eq!(before.status(), StatusCode::FORBIDDEN);

    let promote = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/users/{target_id}/role"))
            .insert_header(backend.bearer_for("admin@x.com"))
            .set_json(json!({ "role": "instructor" }))
            .to_request(),
    )
    .await;
    assert_eq!(promote.status(), StatusCode::NO_CONTENT);

    // Same token; the persisted role now satisfies the guard.
    let after = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .insert_header(backend.bearer_for("ana@x.com"))
            .set_json(json!({ "name": "Pottery", "seats": 8, "price": "25" }))
            .to_request(),
    )
    .await;
    assert_eq!(after.status(), StatusCode::CREATED);
}

#[actix_rt::test]
async fn registration_is_idempotent_and_creates_no_second_record() {
    let backend = TestBackend::new();
    let app = test::init_service(backend.app()).await;

    for expected_created in [true, false] {
        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(json!({ "email": "a@x.com" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body.get("created"), Some(&json!(expected_created)));
    }

    let directory = backend.stores.clone();
    let records = coursedesk_backend::domain::ports::DirectoryStore::list(&directory)
        .await
        .expect("list");
    assert_eq!(records.len(), 1);
}
