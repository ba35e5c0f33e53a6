use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{market::market_from_cer, normalize_date};

pub const HEADER: [&str; 10] = [
    "Forwarded Date",
    "Market",
    "Ardent CER#",
    "Capital $",
    "Notes",
    "Mfg",
    "Model",
    "ETA/Install",
    "URL",
    "Source Email",
];

/// Fields pulled out of one forwarded CER email.
///
/// The first eight come from the extraction model, `market` and
/// `source_email` are filled in by [`ExtractionRecord::enrich`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractionRecord {
    #[serde(rename = "Forwarded Date", deserialize_with = "lenient_string")]
    pub forwarded_date: String,
    #[serde(rename = "Ardent CER#", deserialize_with = "lenient_string")]
    pub cer_number: String,
    #[serde(rename = "Notes", deserialize_with = "lenient_string")]
    pub notes: String,
    #[serde(rename = "Capital $", deserialize_with = "lenient_string")]
    pub capital: String,
    #[serde(rename = "ETA/Install", deserialize_with = "lenient_string")]
    pub eta_install: String,
    #[serde(rename = "Mfg", deserialize_with = "lenient_string")]
    pub manufacturer: String,
    #[serde(rename = "Model", deserialize_with = "lenient_string")]
    pub model: String,
    #[serde(rename = "URL", deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(skip)]
    pub market: String,
    #[serde(skip)]
    pub source_email: String,
}

impl ExtractionRecord {
    pub fn from_llm_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn enrich(&mut self, source_email: Option<&str>) {
        self.forwarded_date = normalize_date(&self.forwarded_date);
        self.market = market_from_cer(&self.cer_number).to_string();
        self.source_email = source_email.unwrap_or_default().to_string();
    }

    /// Row values in [`HEADER`] order.
    pub fn to_row(&self) -> [String; 10] {
        [
            self.forwarded_date.clone(),
            self.market.clone(),
            self.cer_number.clone(),
            self.capital.clone(),
            self.notes.clone(),
            self.manufacturer.clone(),
            self.model.clone(),
            self.eta_install.clone(),
            self.url.clone(),
            self.source_email.clone(),
        ]
    }
}

// The model is asked for strings but sometimes answers `315000` or `null`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
