use crate::{
    configuration::GoogleSettings,
    domain::{ExtractionRecord, HEADER},
};

use super::{SheetsClient, SheetsError};

const NEW_WORKSHEET_ROWS: u32 = 100;
const NEW_WORKSHEET_COLS: u32 = 20;

pub struct SheetWriter {
    sheets: SheetsClient,
    sheet_name: String,
}

impl SheetWriter {
    pub fn new(settings: &GoogleSettings) -> Self {
        SheetWriter {
            sheets: SheetsClient::new(settings),
            sheet_name: settings.sheet_name.clone(),
        }
    }

    /// Appends the record to its market's tab. Failures are logged, never returned.
    pub async fn update_sheet(&self, record: &ExtractionRecord) {
        if let Err(e) = self.append_record(record).await {
            log::error!("Failed to update Google Sheet. Reason: {:?} - {}", e, e);
        }
    }

    async fn append_record(&self, record: &ExtractionRecord) -> Result<(), SheetsError> {
        log::info!("Connecting to Google Sheets");
        let session = self.sheets.authorize().await?;

        log::info!("Opening spreadsheet: '{}'", self.sheet_name);
        let spreadsheet = session.open(&self.sheet_name).await?;

        let market = record.market.as_str();
        let titles = session.worksheet_titles(&spreadsheet).await?;
        if titles.iter().any(|t| t == market) {
            log::info!("Found existing worksheet tab: '{}'", market);
        } else {
            log::info!("Worksheet tab not found. Creating new tab: '{}'", market);
            session
                .add_worksheet(&spreadsheet, market, NEW_WORKSHEET_ROWS, NEW_WORKSHEET_COLS)
                .await?;
            session.append_row(&spreadsheet, market, &HEADER).await?;
        }

        let row = record.to_row();
        log::info!("Adding row: {:?}", row);
        session.append_row(&spreadsheet, market, &row).await?;
        log::info!("Wrote data to tab: '{}'", market);

        Ok(())
    }
}
