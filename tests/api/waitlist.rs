use crate::utils::spawn_app;
use http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::json;

#[tokio::test]
async fn join_returns_a_200_for_a_valid_email() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_waitlist(&json!({ "email": "ursula_le_guin@gmail.com" }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Invalid JSON body");
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn join_persists_the_normalized_email() {
    // Arrange
    let app = spawn_app().await;

    // Act
    app.post_waitlist(&json!({ "email": "  Ursula_Le_Guin@Gmail.com  " }))
        .await;

    // Assert
    assert_eq!(app.saved_emails().await, vec!["ursula_le_guin@gmail.com"]);
}

#[tokio::test]
async fn join_returns_a_409_when_the_email_is_already_on_the_list() {
    // Arrange
    let app = spawn_app().await;
    app.post_waitlist(&json!({ "email": "  A@B.com " })).await;

    // Act
    let response = app.post_waitlist(&json!({ "email": "a@b.com" })).await;

    // Assert
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await.expect("Invalid JSON body");
    assert_eq!(body, json!({ "message": "Already on the list" }));
    assert_eq!(app.saved_emails().await, vec!["a@b.com"]);
}

#[rstest]
#[case(json!({ "email": "ursuladomain.com" }).to_string(), "missing @")]
#[case(json!({ "email": "ursula@domain" }).to_string(), "missing dot")]
#[case(json!({ "email": "" }).to_string(), "empty email")]
#[case(json!({ "name": "Ursula" }).to_string(), "missing email")]
#[case(json!(["ursula_le_guin@gmail.com"]).to_string(), "array body")]
#[tokio::test]
async fn join_returns_a_400_when_the_email_is_invalid(
    #[case] body: String,
    #[case] description: String,
) {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_waitlist_raw(body).await;

    // Assert
    assert_eq!(
        response.status(),
        StatusCode::BAD_REQUEST,
        // Additional customised error message on test failure
        "The API did not fail with 400 Bad Request when the payload had {}.",
        description
    );
    let body: serde_json::Value = response.json().await.expect("Invalid JSON body");
    assert_eq!(body, json!({ "message": "Invalid email" }));
    assert!(app.saved_emails().await.is_empty());
}

#[tokio::test]
async fn join_returns_a_500_when_the_body_is_not_json() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_waitlist_raw("{ not json".to_string()).await;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.expect("Invalid JSON body");
    assert_eq!(body, json!({ "message": "Server error" }));
    assert!(app.saved_emails().await.is_empty());
}

#[tokio::test]
async fn concurrent_submissions_of_one_email_store_a_single_entry() {
    // Arrange
    let app = spawn_app().await;
    let body = json!({ "email": "ursula_le_guin@gmail.com" });

    // Act
    let (first, second, third) = tokio::join!(
        app.post_waitlist(&body),
        app.post_waitlist(&body),
        app.post_waitlist(&body),
    );

    // Assert
    let mut statuses = vec![
        first.status().as_u16(),
        second.status().as_u16(),
        third.status().as_u16(),
    ];
    statuses.sort();
    assert_eq!(statuses, vec![200, 409, 409]);
    assert_eq!(app.saved_emails().await.len(), 1);
}

#[tokio::test]
async fn join_fails_if_there_is_a_fatal_database_error() {
    // Arrange
    let app = spawn_app().await;
    // Sabotage the database
    sqlx::query("ALTER TABLE waitlist DROP COLUMN created_at;")
        .execute(app.db_pool())
        .await
        .unwrap();

    // Act
    let response = app
        .post_waitlist(&json!({ "email": "ursula_le_guin@gmail.com" }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.expect("Invalid JSON body");
    assert_eq!(body, json!({ "message": "Server error" }));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_waitlist(&json!({ "email": "a@b.com" })).await;

    // Assert
    assert!(response.headers().contains_key("x-request-id"));
}
