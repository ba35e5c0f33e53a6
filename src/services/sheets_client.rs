use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::configuration::GoogleSettings;

const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.file",
];
const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
const TOKEN_LIFETIME_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("GOOGLE_CREDENTIALS_JSON environment variable not set.")]
    MissingCredentials,
    #[error("Invalid service account credentials: {0}")]
    Credentials(#[from] serde_json::Error),
    #[error("Failed to sign token request: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Google API responded {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("Invalid API url: {0}")]
    Url(#[from] url::ParseError),
    #[error("Spreadsheet not found: '{0}'")]
    SpreadsheetNotFound(String),
}

/// The fields of a service account key that the token exchange needs.
#[derive(Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    assertion: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetMetadata>,
}

#[derive(Deserialize)]
struct SheetMetadata {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

pub struct SheetsClient {
    client: Client,
    credentials_json: Option<String>,
    sheets_base_url: String,
    drive_base_url: String,
}

impl SheetsClient {
    pub fn new(settings: &GoogleSettings) -> Self {
        SheetsClient {
            client: Client::new(),
            credentials_json: settings.credentials_json.clone(),
            sheets_base_url: settings.sheets_base_url.clone(),
            drive_base_url: settings.drive_base_url.clone(),
        }
    }

    /// Exchanges a signed service account assertion for an access token.
    pub async fn authorize(&self) -> Result<SheetsSession<'_>, SheetsError> {
        let credentials_json = self
            .credentials_json
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(SheetsError::MissingCredentials)?;
        let key: ServiceAccountKey = serde_json::from_str(credentials_json)?;

        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let claims = Claims {
            iss: &key.client_email,
            scope: SCOPES.join(" "),
            aud: &key.token_uri,
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &EncodingKey::from_rsa_pem(key.private_key.as_bytes())?,
        )?;

        let response = self
            .client
            .post(&key.token_uri)
            .form(&TokenRequest {
                grant_type: "urn:ietf:params:oauth:grant-type:jwt-bearer",
                assertion,
            })
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;

        Ok(SheetsSession {
            sheets: self,
            access_token: token.access_token,
        })
    }
}

pub struct Spreadsheet {
    pub id: String,
    pub title: String,
}

pub struct SheetsSession<'a> {
    sheets: &'a SheetsClient,
    access_token: String,
}

impl SheetsSession<'_> {
    /// Finds a spreadsheet visible to the service account by its title.
    pub async fn open(&self, title: &str) -> Result<Spreadsheet, SheetsError> {
        let url = endpoint(&self.sheets.drive_base_url, &["drive", "v3", "files"])?;
        let query = spreadsheet_query(title);

        let response = self
            .sheets
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("includeItemsFromAllDrives", "true"),
                ("supportsAllDrives", "true"),
            ])
            .send()
            .await?;
        let list: FileList = check(response).await?.json().await?;

        list.files
            .into_iter()
            .next()
            .map(|file| Spreadsheet {
                id: file.id,
                title: title.to_string(),
            })
            .ok_or_else(|| SheetsError::SpreadsheetNotFound(title.to_string()))
    }

    pub async fn worksheet_titles(
        &self,
        spreadsheet: &Spreadsheet,
    ) -> Result<Vec<String>, SheetsError> {
        let url = endpoint(
            &self.sheets.sheets_base_url,
            &["v4", "spreadsheets", &spreadsheet.id],
        )?;

        let response = self
            .sheets
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;
        let metadata: SpreadsheetMetadata = check(response).await?.json().await?;

        Ok(metadata
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    pub async fn add_worksheet(
        &self,
        spreadsheet: &Spreadsheet,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<(), SheetsError> {
        let url = endpoint(
            &self.sheets.sheets_base_url,
            &["v4", "spreadsheets", &format!("{}:batchUpdate", spreadsheet.id)],
        )?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "sheetType": "GRID",
                        "gridProperties": { "rowCount": rows, "columnCount": cols }
                    }
                }
            }]
        });

        let response = self
            .sheets
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        check(response).await?;

        Ok(())
    }

    /// Appends `values` as a new row after the last row of the worksheet's table.
    pub async fn append_row<S: Serialize>(
        &self,
        spreadsheet: &Spreadsheet,
        worksheet: &str,
        values: &[S],
    ) -> Result<(), SheetsError> {
        let range = format!("'{}'!A1", worksheet.replace('\'', "''"));
        let url = endpoint(
            &self.sheets.sheets_base_url,
            &[
                "v4",
                "spreadsheets",
                &spreadsheet.id,
                "values",
                &format!("{}:append", range),
            ],
        )?;

        let response = self
            .sheets
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": [values] }))
            .send()
            .await?;
        check(response).await?;

        Ok(())
    }
}

/// Drive search for a spreadsheet by exact title. String literals in Drive
/// queries escape `\` and `'` with a backslash.
fn spreadsheet_query(title: &str) -> String {
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        title.replace('\\', "\\\\").replace('\'', "\\'"),
        SPREADSHEET_MIME_TYPE
    )
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url, SheetsError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn check(response: Response) -> Result<Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SheetsError::Api { status, body })
}
