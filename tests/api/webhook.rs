use cer_parser::domain::HEADER;
use reqwest::multipart::{Form, Part};

use crate::helpers::{spawn_app, SPREADSHEET_NAME};

const FULL_COMPLETION: &str = "```json\n{\"Forwarded Date\":\"2025-03-04\",\"Ardent CER#\":\"5510-001\",\"Notes\":\"ED Expansion\",\"Capital $\":\"315000\",\"ETA/Install\":\"Q3 2025\",\"Mfg\":\"Stryker\",\"Model\":\"Prime Series Stretcher\",\"URL\":\"https://erp.example.com/cer/5510-001\"}\n```";

const EMAIL_TEXT: &str = "From: Tim\nSent: Tuesday, March 4, 2025 10:15 AM\nCER: 5510-001\nED Expansion, $315k";

#[tokio::test]
async fn webhook_appends_header_and_row_to_new_market_tab() {
    let app = spawn_app(FULL_COMPLETION, SPREADSHEET_NAME).await;

    let response = app
        .post_webhook(&[("text", EMAIL_TEXT), ("from", "tim@example.com")])
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.text().await.unwrap(),
        "Success: Email processed and sheet updated."
    );
    assert_eq!(app.worksheets(), vec!["Sheet1", "East Texas"]);

    let appends = app.appended_rows();
    assert_eq!(appends.len(), 2);
    assert!(appends[0].0.contains("East"));
    assert_eq!(appends[0].1, HEADER.map(String::from).to_vec());
    assert_eq!(
        appends[1].1,
        vec![
            "3/4/2025",
            "East Texas",
            "5510-001",
            "315000",
            "ED Expansion",
            "Stryker",
            "Prime Series Stretcher",
            "Q3 2025",
            "https://erp.example.com/cer/5510-001",
            "tim@example.com",
        ]
    );
}

#[tokio::test]
async fn existing_market_tab_gets_no_second_header() {
    let app = spawn_app(FULL_COMPLETION, SPREADSHEET_NAME).await;

    for _ in 0..2 {
        let response = app
            .post_webhook(&[("text", EMAIL_TEXT), ("from", "tim@example.com")])
            .await;
        assert_eq!(response.status().as_u16(), 200);
    }

    let appends = app.appended_rows();
    assert_eq!(app.worksheets(), vec!["Sheet1", "East Texas"]);
    assert_eq!(appends.len(), 3);
    assert_eq!(appends[1].1, appends[2].1);
    assert_eq!(app.upstream.state.lock().unwrap().token_requests, 2);
}

#[tokio::test]
async fn missing_text_returns_400() {
    let app = spawn_app(FULL_COMPLETION, SPREADSHEET_NAME).await;

    let response = app.post_webhook(&[("from", "tim@example.com")]).await;

    assert_eq!(response.status().as_u16(), 400);
    assert!(app.appended_rows().is_empty());
}

#[tokio::test]
async fn missing_cer_returns_400() {
    let completion = r#"Sure! {"Forwarded Date":"2025-03-04","Ardent CER#":"","Notes":"OR Tables"}"#;
    let app = spawn_app(completion, SPREADSHEET_NAME).await;

    let response = app
        .post_webhook(&[("text", "No request number here"), ("from", "tim@example.com")])
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        response.text().await.unwrap(),
        "Failed: Could not extract CER#."
    );
    assert!(app.appended_rows().is_empty());
}

#[tokio::test]
async fn unparseable_model_answer_returns_500() {
    let app = spawn_app("{\"Ardent CER#\": 5510-001}", SPREADSHEET_NAME).await;

    let response = app
        .post_webhook(&[("text", EMAIL_TEXT), ("from", "tim@example.com")])
        .await;

    assert_eq!(response.status().as_u16(), 500);
    assert!(response
        .text()
        .await
        .unwrap()
        .starts_with("Internal server error:"));
}

#[tokio::test]
async fn spreadsheet_failure_still_reports_success() {
    let app = spawn_app(FULL_COMPLETION, "Missing_Report").await;

    let response = app
        .post_webhook(&[("text", EMAIL_TEXT), ("from", "tim@example.com")])
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert!(app.appended_rows().is_empty());
}

#[tokio::test]
async fn unmatched_cer_goes_to_no_match_tab() {
    let completion = r#"{"Ardent CER#":"9999-123","Forwarded Date":"not sure"}"#;
    let app = spawn_app(completion, SPREADSHEET_NAME).await;

    let response = app.post_webhook(&[("text", "CER: 9999-123")]).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.worksheets(), vec!["Sheet1", "No Match"]);
    let appends = app.appended_rows();
    assert_eq!(appends[1].1[0], "not sure");
    assert_eq!(appends[1].1[1], "No Match");
    assert_eq!(appends[1].1[9], "");
}

#[tokio::test]
async fn relay_multipart_post_with_attachment_writes_row() {
    let app = spawn_app(FULL_COMPLETION, SPREADSHEET_NAME).await;

    let attachment = Part::bytes(b"%PDF-1.4 quote".to_vec())
        .file_name("quote.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let form = Form::new()
        .text("headers", "Received: by mx.example.com\nSubject: FW: CER 5510-001")
        .text("dkim", "{@example.com : pass}")
        .text("to", "cer@parse.example.com")
        .text("html", "<p>CER: 5510-001</p>")
        .text("from", "Tim <tim@example.com>")
        .text("text", EMAIL_TEXT)
        .text("subject", "FW: CER 5510-001")
        .text(
            "charsets",
            r#"{"to":"UTF-8","html":"UTF-8","subject":"UTF-8","from":"UTF-8","text":"UTF-8"}"#,
        )
        .text("attachments", "1")
        .part("attachment1", attachment);

    let response = app.post_webhook_multipart(form).await;

    assert_eq!(response.status().as_u16(), 200);
    let appends = app.appended_rows();
    assert_eq!(appends.len(), 2);
    assert_eq!(appends[1].1[1], "East Texas");
    assert_eq!(appends[1].1[2], "5510-001");
    assert_eq!(appends[1].1[9], "Tim <tim@example.com>");
}
