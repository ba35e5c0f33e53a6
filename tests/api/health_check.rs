use crate::helpers::{spawn_app, SPREADSHEET_NAME};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app("{}", SPREADSHEET_NAME).await;

    let response = app
        .api_client
        .get(format!("{}/", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "CER Parser is running.");
}
