use std::collections::HashMap;

use actix_multipart::form::{bytes::Bytes, MultipartForm};
use actix_web::{http::StatusCode, post, web, Either, HttpResponse, ResponseError};
use encoding_rs::{Encoding, UTF_8};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::{ExtractionClient, ExtractionError, SheetWriter};

#[derive(Deserialize)]
pub struct InboundEmailForm {
    text: Option<String>,
    from: Option<String>,
}

/// The inbound parse relay posts multipart bodies with many more fields
/// (headers, html, attachments); only these are read.
///
/// `text` and `from` arrive in the email's own charset, named per field in
/// the `charsets` JSON object, so they are kept as raw bytes until decoded.
#[derive(MultipartForm)]
pub struct InboundEmailUpload {
    text: Option<Bytes>,
    from: Option<Bytes>,
    charsets: Option<Bytes>,
}

impl InboundEmailUpload {
    fn into_fields(self) -> (Option<String>, Option<String>) {
        let charsets: HashMap<String, String> = self
            .charsets
            .and_then(|c| serde_json::from_slice(&c.data).ok())
            .unwrap_or_default();

        let decode = |field: Option<Bytes>, name: &str| {
            field.map(|f| decode_field(&f.data, charsets.get(name).map(String::as_str)))
        };
        (decode(self.text, "text"), decode(self.from, "from"))
    }
}

/// Decodes with the named charset, falling back to UTF-8. Malformed
/// sequences become U+FFFD instead of failing the request.
fn decode_field(data: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(data);
    text.into_owned()
}

pub type InboundEmail = Either<web::Form<InboundEmailForm>, MultipartForm<InboundEmailUpload>>;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Failed: No email body content.")]
    MissingBody,
    #[error("Failed: Could not extract CER#.")]
    MissingCer,
    #[error("Internal server error: {0}")]
    Extraction(#[from] ExtractionError),
}

impl ResponseError for WebhookError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingBody | WebhookError::MissingCer => StatusCode::BAD_REQUEST,
            WebhookError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[post("/webhook")]
pub async fn handle_email(
    extraction_client: web::Data<ExtractionClient>,
    sheet_writer: web::Data<SheetWriter>,
    form: InboundEmail,
) -> Result<HttpResponse, WebhookError> {
    let request_id = Uuid::new_v4();
    log::info!("[{}] Webhook received a new email.", request_id);

    let (email_body, email_from) = match form {
        Either::Left(form) => {
            let form = form.into_inner();
            (form.text, form.from)
        }
        Either::Right(upload) => upload.into_inner().into_fields(),
    };

    let email_body = email_body
        .filter(|body| !body.is_empty())
        .ok_or(WebhookError::MissingBody)?;

    let mut record = match extraction_client.extract_record(&email_body).await {
        Ok(record) => record,
        Err(e) => {
            log::error!("[{}] Error during email processing: {}", request_id, e);
            return Err(e.into());
        }
    };

    if record.cer_number.is_empty() {
        log::error!("[{}] Could not extract CER# from email.", request_id);
        return Err(WebhookError::MissingCer);
    }

    record.enrich(email_from.as_deref());
    log::info!(
        "[{}] CER# {} classified as '{}'",
        request_id,
        record.cer_number,
        record.market
    );

    sheet_writer.update_sheet(&record).await;

    Ok(HttpResponse::Ok().body("Success: Email processed and sheet updated."))
}
