//! Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet.
//!
//! Cell values are read and written with the `sheets` crate. Tab metadata, tab creation and row
//! deletion go through the `spreadsheets.batchUpdate` REST endpoint with `reqwest`, since they are
//! structural changes rather than value updates.

use crate::api::{Sheet, TokenProvider};
use crate::model::WIDTH;
use crate::Result;
use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::json;
use sheets::types::{
    BatchUpdateValuesRequest, DateTimeRenderOption, Dimension, ValueInputOption, ValueRange,
    ValueRenderOption,
};
use sheets::ClientError;
use tracing::trace;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Implements the `Sheet` trait against one Google spreadsheet. It takes a `TokenProvider`, on
/// which it calls refresh to keep the token up-to-date.
pub(crate) struct GoogleSheet {
    spreadsheet_id: String,
    token_provider: TokenProvider,
    http: reqwest::Client,
}

impl GoogleSheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>, token_provider: TokenProvider) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            token_provider,
            http: reqwest::Client::new(),
        }
    }

    /// Creates a sheets client with an access token that is refreshed if needed.
    async fn client(&mut self) -> Result<sheets::Client> {
        let access_token = self.token_provider.token_with_refresh().await?;
        // The sheets crate wants the full OAuth configuration but only uses the access token for
        // API calls. Refreshing is handled by the `TokenProvider`.
        Ok(sheets::Client::new(
            String::new(),
            String::new(),
            String::new(),
            access_token.to_string(),
            String::new(),
        ))
    }

    async fn values(&mut self, range: &str) -> Result<Vec<Vec<String>>> {
        let client = self.client().await?;
        let response = client
            .spreadsheets()
            .values_get(
                &self.spreadsheet_id,
                range,
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to fetch {range}"))?;
        Ok(response.body.values)
    }

    /// Looks up the numeric id of the tab named `name`.
    async fn tab_id(&mut self, name: &str) -> Result<Option<i64>> {
        let token = self.token_provider.token_with_refresh().await?.to_string();
        let url = format!(
            "{SHEETS_API}/{}?fields=sheets.properties(sheetId,title)",
            self.spreadsheet_id
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send the spreadsheet metadata request")?;
        let metadata: Metadata = checked(response)
            .await?
            .json()
            .await
            .context("Failed to parse the spreadsheet metadata")?;
        Ok(metadata
            .sheets
            .into_iter()
            .map(|tab| tab.properties)
            .find(|properties| properties.title == name)
            .map(|properties| properties.sheet_id))
    }

    async fn batch_update(&mut self, request: serde_json::Value) -> Result<()> {
        let token = self.token_provider.token_with_refresh().await?.to_string();
        let url = format!("{SHEETS_API}/{}:batchUpdate", self.spreadsheet_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .context("Failed to send the batchUpdate request")?;
        checked(response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn exists(&mut self, name: &str) -> Result<bool> {
        Ok(self.tab_id(name).await?.is_some())
    }

    async fn create(&mut self, name: &str, header: &[String]) -> Result<()> {
        trace!("create tab {name}");
        self.batch_update(json!({
            "requests": [{ "addSheet": { "properties": { "title": name, "index": 0 } } }]
        }))
        .await
        .with_context(|| format!("Failed to create the tab '{name}'"))?;
        self.write_row(name, 1, header).await
    }

    async fn get(&mut self, name: &str) -> Result<Vec<Vec<String>>> {
        trace!("get for {name}");
        self.values(&full_range(name)).await
    }

    async fn last_row(&mut self, name: &str) -> Result<usize> {
        // Trailing empty rows are not returned, so the row count is the last row in use.
        Ok(self.values(&full_range(name)).await?.len())
    }

    async fn get_row(&mut self, name: &str, row: usize) -> Result<Vec<String>> {
        trace!("get_row {row} of {name}");
        let mut values = self.values(&row_range(name, row)).await?;
        Ok(if values.is_empty() {
            Vec::new()
        } else {
            values.swap_remove(0)
        })
    }

    async fn write_row(&mut self, name: &str, row: usize, values: &[String]) -> Result<()> {
        trace!("write_row {row} of {name}");
        let client = self.client().await?;
        let request = BatchUpdateValuesRequest {
            data: vec![ValueRange {
                major_dimension: Some(Dimension::Rows),
                range: row_range(name, row),
                values: vec![values.to_vec()],
            }],
            include_values_in_response: Some(false),
            response_date_time_render_option: None,
            response_value_render_option: None,
            value_input_option: Some(ValueInputOption::UserEntered),
        };
        client
            .spreadsheets()
            .values_batch_update(&self.spreadsheet_id, &request)
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to write row {row} of '{name}'"))?;
        Ok(())
    }

    async fn delete_row(&mut self, name: &str, row: usize) -> Result<()> {
        trace!("delete_row {row} of {name}");
        if row == 0 {
            bail!("Row numbers start at 1");
        }
        let sheet_id = self
            .tab_id(name)
            .await?
            .with_context(|| format!("The tab '{name}' does not exist"))?;
        self.batch_update(json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row - 1,
                        "endIndex": row
                    }
                }
            }]
        }))
        .await
        .with_context(|| format!("Failed to delete row {row} of '{name}'"))
    }
}

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(default)]
    sheets: Vec<Tab>,
}

#[derive(Debug, Deserialize)]
struct Tab {
    properties: TabProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabProperties {
    sheet_id: i64,
    title: String,
}

/// Turns a non-success HTTP status into an error carrying the response body.
async fn checked(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("Google Sheets API request failed with status {status}: {body}")
}

/// Quotes a tab name for use in A1 notation.
fn quote(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

fn last_column() -> char {
    (b'A' + WIDTH as u8 - 1) as char
}

fn full_range(name: &str) -> String {
    format!("{}!A:{}", quote(name), last_column())
}

fn row_range(name: &str, row: usize) -> String {
    format!("{}!A{row}:{}{row}", quote(name), last_column())
}

fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::new(e).context(error_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert_eq!(full_range("2023年6月"), "'2023年6月'!A:G");
        assert_eq!(row_range("2023年6月", 5), "'2023年6月'!A5:G5");
        assert_eq!(quote("it's"), "'it''s'");
    }

    #[test]
    fn test_metadata() {
        let json = r#"{"sheets": [
            {"properties": {"sheetId": 0, "title": "2023年5月"}},
            {"properties": {"sheetId": 1234, "title": "2023年6月"}}
        ]}"#;
        let metadata: Metadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.sheets.len(), 2);
        assert_eq!(metadata.sheets[1].properties.sheet_id, 1234);
        assert_eq!(metadata.sheets[1].properties.title, "2023年6月");
    }
}
