use crate::utils::spawn_app;
use pretty_assertions::assert_eq;
use reqwest::Url;
use std::sync::Arc;
use waitlist::waitlist_client::{
    fallback::{load_signups, MemoryStorage},
    NotifyForm, SubmitStatus, WaitlistClient,
};

#[tokio::test]
async fn the_client_signs_up_through_the_endpoint() {
    // Arrange
    let app = spawn_app().await;
    let storage = Arc::new(MemoryStorage::default());
    let client = WaitlistClient::new(Url::parse(app.address()).unwrap(), storage.clone()).unwrap();

    // Act
    let first = client.submit("  Ursula@Gmail.com ").await.unwrap();
    let second = client.submit("ursula@gmail.com").await.unwrap();

    // Assert
    assert_eq!(first.status, SubmitStatus::Accepted);
    assert_eq!(second.status, SubmitStatus::Duplicate);
    assert_eq!(app.saved_emails().await, vec!["ursula@gmail.com"]);
    assert!(load_signups(storage.as_ref()).unwrap().is_empty());
}

#[tokio::test]
async fn the_client_records_locally_when_the_endpoint_is_missing() {
    // Arrange
    let app = spawn_app().await;
    let storage = Arc::new(MemoryStorage::default());
    let base_url = Url::parse(&app.at_url("/preview/")).unwrap();
    let client = WaitlistClient::new(base_url, storage.clone()).unwrap();

    // Act
    let outcome = client.submit("ursula@gmail.com").await.unwrap();

    // Assert
    assert_eq!(outcome.status, SubmitStatus::Accepted);
    assert!(app.saved_emails().await.is_empty());
    let local: Vec<String> = load_signups(storage.as_ref())
        .unwrap()
        .into_iter()
        .map(|signup| signup.email)
        .collect();
    assert_eq!(local, vec!["ursula@gmail.com"]);
}

#[tokio::test]
async fn the_form_clears_after_signing_up() {
    // Arrange
    let app = spawn_app().await;
    let client = WaitlistClient::new(
        Url::parse(app.address()).unwrap(),
        Arc::new(MemoryStorage::default()),
    )
    .unwrap();
    let mut form = NotifyForm::new();
    form.set_email("ursula@gmail.com");

    // Act
    let status = form.submit(&client).await;

    // Assert
    assert_eq!(status, Some(SubmitStatus::Accepted));
    assert_eq!(form.email(), "");
    assert!(!form.is_error());
}
