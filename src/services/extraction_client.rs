use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};

use crate::{configuration::ExtractionSettings, domain::ExtractionRecord};

const EXTRACTION_PROMPT: &str = r#"
Analyze the email content. Extract the following fields:
- "Forwarded Date": The 'Sent' date of the forwarded email. Format it strictly as YYYY-MM-DD.
- "Ardent CER#": The Capital Equipment Request number, often following "CER:".
- "Notes": A concise project description (e.g., "ED Expansion", "OR Tables").
- "Capital $": A number only, converting 'k' to thousands (e.g., $315k becomes 315000).
- "ETA/Install": The estimated arrival or installation date/quarter.
- "Mfg": Based on the notes and content, infer the Manufacturer.
- "Model": Based on the notes and content, infer the specific Model.
- "URL": The ERP link, which is a URL usually starting with "http".
Return a single, minified JSON object. If a field is not found, use an empty string "".
---
Email Content:
"#;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("GEMINI_API_KEY not found in environment variables.")]
    MissingApiKey,
    #[error("Gemini API call failed: {0}")]
    Api(#[from] OpenAIError),
    #[error("Gemini API returned no content")]
    EmptyResponse,
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct ExtractionClient {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl ExtractionClient {
    pub fn new(settings: &ExtractionSettings) -> Self {
        // Without a key the app still serves health checks; requests fail on use.
        let client = settings
            .api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .map(|key| {
                let config = OpenAIConfig::new()
                    .with_api_key(key)
                    .with_api_base(&settings.api_base);
                Client::with_config(config)
            });

        ExtractionClient {
            client,
            model: settings.model.clone(),
        }
    }

    pub async fn extract_record(
        &self,
        email_body: &str,
    ) -> Result<ExtractionRecord, ExtractionError> {
        let client = self.client.as_ref().ok_or(ExtractionError::MissingApiKey)?;

        let prompt = format!("{}{}", EXTRACTION_PROMPT, email_body);
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .build()?;

        let response = client.chat().create(request).await?;
        log::info!("Response: {:?}", response);

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(ExtractionError::EmptyResponse)?;

        let record = ExtractionRecord::from_llm_json(clean_json_response(&content))?;
        Ok(record)
    }
}

/// Slice from the first `{` to the last `}`, dropping prose and code fences
/// the model wraps around its answer.
pub fn clean_json_response(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => "{}",
    }
}
