//! Reconciliation report handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::DateWindow;

use crate::error::{AppError, AppResult};
use crate::services::ReconciliationService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportQuery {
    /// Parse the ISO dates into a window. Blank values mean unbounded.
    pub fn window(&self) -> AppResult<DateWindow> {
        Ok(DateWindow::new(
            parse_date("date_from", self.date_from.as_deref())?,
            parse_date("date_to", self.date_to.as_deref())?,
        ))
    }

    pub fn format(&self) -> AppResult<ReportFormat> {
        match self.format.as_deref().map(str::trim) {
            None | Some("") | Some("json") => Ok(ReportFormat::Json),
            Some("csv") => Ok(ReportFormat::Csv),
            Some(_) => Err(AppError::validation(
                "format",
                "format must be json or csv",
                "Biçim json veya csv olmalıdır",
            )),
        }
    }
}

fn parse_date(field: &str, value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Some).map_err(|_| {
            AppError::validation(
                field,
                "Date must be in YYYY-MM-DD format",
                "Tarih YYYY-AA-GG biçiminde olmalıdır",
            )
        }),
    }
}

/// Get the stock reconciliation report
pub async fn get_reconciliation_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let window = query.window()?;
    let format = query.format()?;

    let service = ReconciliationService::new(
        state.stores.plants,
        state.stores.deliveries,
        state.stores.consumption,
    );
    let report = service.compute_report(window).await?;

    match format {
        ReportFormat::Csv => {
            let csv = ReconciliationService::export_to_csv(&report.per_plant)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"stock_reconciliation.csv\"",
                    ),
                ],
                csv,
            )
                .into_response())
        }
        ReportFormat::Json => Ok(Json(report).into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(from: Option<&str>, to: Option<&str>, format: Option<&str>) -> ReportQuery {
        ReportQuery {
            date_from: from.map(String::from),
            date_to: to.map(String::from),
            format: format.map(String::from),
        }
    }

    #[test]
    fn test_window_parsing() {
        let window = query(Some("2025-03-01"), Some(" 2025-03-31 "), None)
            .window()
            .unwrap();
        assert_eq!(window.date_from, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(window.date_to, NaiveDate::from_ymd_opt(2025, 3, 31));

        assert!(query(Some(""), None, None).window().unwrap().is_unbounded());
    }

    #[test]
    fn test_bad_date_names_the_field() {
        match query(None, Some("31.03.2025"), None).window() {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "date_to"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(query(None, None, None).format().unwrap(), ReportFormat::Json);
        assert_eq!(query(None, None, Some("csv")).format().unwrap(), ReportFormat::Csv);
        assert!(query(None, None, Some("xlsx")).format().is_err());
    }
}
