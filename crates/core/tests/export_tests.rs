// ═══════════════════════════════════════════════════════════════════
// Export Tests — format mapping, query construction, file names
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use uuid::Uuid;

use invest_tracker_core::models::filter::TransactionFilter;
use invest_tracker_core::models::transaction::TransactionType;
use invest_tracker_core::services::export::{ExportFormat, ExportRequest};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
}

mod format {
    use super::*;

    #[test]
    fn parse_is_lenient() {
        assert_eq!(ExportFormat::parse("csv"), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(" PDF "), ExportFormat::Pdf);
        assert_eq!(ExportFormat::parse("excel"), ExportFormat::Excel);
        assert_eq!(ExportFormat::parse("xlsx"), ExportFormat::Excel);
        assert_eq!(ExportFormat::parse("anything"), ExportFormat::Excel);
    }

    #[test]
    fn extensions() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
        assert_eq!(ExportFormat::Excel.extension(), "xlsx");
    }
}

mod query {
    use super::*;

    #[test]
    fn portfolio_export_path() {
        let id = Uuid::new_v4();
        let req = ExportRequest::Portfolio {
            id,
            name: "Growth".into(),
            format: ExportFormat::Excel,
        };
        assert_eq!(
            req.path_and_query(),
            format!("/export/portfolio/{id}?format=excel")
        );
    }

    #[test]
    fn unfiltered_transactions_only_send_format() {
        let req = ExportRequest::Transactions {
            filter: TransactionFilter::default(),
            format: ExportFormat::Csv,
        };
        assert_eq!(req.path_and_query(), "/export/transactions?format=csv");
    }

    #[test]
    fn only_set_filters_are_included() {
        let portfolio_id = Uuid::new_v4();
        let req = ExportRequest::Transactions {
            filter: TransactionFilter {
                portfolio_id: Some(portfolio_id),
                transaction_type: Some(TransactionType::Sell),
                end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
                ..TransactionFilter::default()
            },
            format: ExportFormat::Pdf,
        };

        let pairs = req.query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["format", "portfolioId", "transactionType", "endDate"]);
        assert!(pairs.iter().all(|(_, v)| !v.is_empty()));

        let url = req.path_and_query();
        assert!(url.contains("transactionType=SELL"));
        assert!(url.contains("endDate=2024-06-30T23%3A59%3A59"));
        assert!(!url.contains("assetId"));
        assert!(!url.contains("startDate"));
    }

    #[test]
    fn client_side_only_fields_are_not_sent() {
        let req = ExportRequest::Transactions {
            filter: TransactionFilter {
                min_amount: Some(10.0),
                include_transfers: false,
                search: Some("AAPL".into()),
                ..TransactionFilter::default()
            },
            format: ExportFormat::Csv,
        };
        assert_eq!(req.query_pairs().len(), 1);
    }
}

mod file_name {
    use super::*;

    #[test]
    fn portfolio_name_and_date() {
        let req = ExportRequest::Portfolio {
            id: Uuid::new_v4(),
            name: "Retirement".into(),
            format: ExportFormat::Csv,
        };
        assert_eq!(req.file_name(day()), "portfolio_Retirement_2024-03-09.csv");
    }

    #[test]
    fn transactions_name_and_date() {
        let req = ExportRequest::Transactions {
            filter: TransactionFilter::default(),
            format: ExportFormat::Excel,
        };
        assert_eq!(req.file_name(day()), "transactions_2024-03-09.xlsx");
    }

    #[test]
    fn path_separators_replaced() {
        let req = ExportRequest::Portfolio {
            id: Uuid::new_v4(),
            name: "EU/US mix".into(),
            format: ExportFormat::Pdf,
        };
        assert_eq!(req.file_name(day()), "portfolio_EU_US mix_2024-03-09.pdf");
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let req = ExportRequest::Transactions {
            filter: TransactionFilter::default(),
            format: ExportFormat::Csv,
        };
        assert_eq!(req.file_name(day()), req.file_name(day()));
    }
}
