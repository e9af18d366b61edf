// ═══════════════════════════════════════════════════════════════════
// Model Tests — wire shapes, client-side validation, settings, config
// ═══════════════════════════════════════════════════════════════════

mod common;

use chrono::NaiveDate;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use common::dt;
use invest_tracker_core::config::ClientConfig;
use invest_tracker_core::errors::CoreError;
use invest_tracker_core::models::alert::{Alert, AlertRequest, BulkOutcome, ConditionType};
use invest_tracker_core::models::asset::{Asset, AssetRequest, AssetType, WatchedAsset};
use invest_tracker_core::models::filter::{SavedFilter, TransactionFilter};
use invest_tracker_core::models::page::{ListResponse, Page};
use invest_tracker_core::models::portfolio::{
    DuplicatePortfolioRequest, Portfolio, PortfolioRequest, RiskProfile,
};
use invest_tracker_core::models::settings::UserSettings;
use invest_tracker_core::models::transaction::{Transaction, TransactionRequest, TransactionType};

// ═══════════════════════════════════════════════════════════════════
// Transaction
// ═══════════════════════════════════════════════════════════════════

mod transaction {
    use super::*;

    fn request(kind: TransactionType) -> TransactionRequest {
        TransactionRequest::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            kind,
            2.0,
            100.0,
            dt("2024-05-01T12:00:00"),
        )
    }

    #[test]
    fn type_wire_names() {
        assert_eq!(
            serde_json::to_value(TransactionType::TransferOut).unwrap(),
            json!("TRANSFER_OUT")
        );
        assert_eq!(TransactionType::Withdraw.to_string(), "WITHDRAW");
    }

    #[test]
    fn type_from_str_is_lenient_on_case() {
        assert_eq!("buy".parse::<TransactionType>().unwrap(), TransactionType::Buy);
        assert_eq!(
            " transfer_in ".parse::<TransactionType>().unwrap(),
            TransactionType::TransferIn
        );
        assert!(matches!(
            "DIVIDEND".parse::<TransactionType>(),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn deserializes_backend_shape() {
        let id = Uuid::new_v4();
        let raw = common::transaction_json(id, "AAPL", "BUY", 10.0, 150.0, "2024-01-15T10:30:00");
        let tx: Transaction = serde_json::from_value(raw).unwrap();
        assert_eq!(tx.id, id);
        assert_eq!(tx.symbol(), "AAPL");
        assert_eq!(tx.asset_name.as_deref(), Some("AAPL Inc."));
        assert_eq!(tx.amount(), 1500.0);
        assert_eq!(tx.transaction_date, dt("2024-01-15T10:30:00"));
    }

    #[test]
    fn amount_excludes_fee_total_includes_it() {
        let mut tx = common::tx("BTC", TransactionType::Buy, 0.5, 40000.0, "2024-01-01T00:00:00");
        tx.fee = 12.0;
        assert_eq!(tx.amount(), 20000.0);
        assert_eq!(tx.total(), 20012.0);
    }

    #[test]
    fn valid_buy() {
        assert!(request(TransactionType::Buy).validate().is_ok());
    }

    #[test]
    fn asset_required() {
        let mut req = request(TransactionType::Buy);
        req.asset_id = None;
        assert_eq!(req.validate().unwrap_err().to_string(), "Please select an asset");
    }

    #[test]
    fn quantity_and_price_required_and_non_negative() {
        let mut req = request(TransactionType::Sell);
        req.quantity = None;
        assert_eq!(req.validate().unwrap_err().to_string(), "Quantity is required");

        let mut req = request(TransactionType::Sell);
        req.price = Some(-1.0);
        assert_eq!(
            req.validate().unwrap_err().to_string(),
            "Price must be a non-negative number"
        );

        let mut req = request(TransactionType::Sell);
        req.fee = f64::NAN;
        assert!(req.validate().is_err());
    }

    #[test]
    fn transfer_needs_distinct_destination() {
        let mut req = request(TransactionType::TransferOut);
        assert_eq!(
            req.validate().unwrap_err().to_string(),
            "Please select a destination portfolio"
        );

        req.transfer_portfolio_id = Some(req.portfolio_id);
        assert!(req.validate().is_err());

        req.transfer_portfolio_id = Some(Uuid::new_v4());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn request_serializes_camel_case() {
        let req = request(TransactionType::Deposit);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["transactionType"], "DEPOSIT");
        assert_eq!(v["transactionDate"], "2024-05-01T12:00:00");
        assert!(v.get("portfolioId").is_some());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Portfolio & asset
// ═══════════════════════════════════════════════════════════════════

mod portfolio {
    use super::*;

    #[test]
    fn request_defaults_and_validation() {
        let req = PortfolioRequest::new("Growth");
        assert_eq!(req.base_currency, "USD");
        assert_eq!(req.risk_profile, RiskProfile::Moderate);
        assert!(req.validate().is_ok());

        assert!(PortfolioRequest::new("  ").validate().is_err());

        let mut bad = PortfolioRequest::new("Growth");
        bad.base_currency = "US".into();
        assert!(bad.validate().unwrap_err().to_string().contains("3 ASCII letters"));
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let id = Uuid::new_v4();
        let p: Portfolio =
            serde_json::from_value(json!({"id": id, "name": "Core", "baseCurrency": "EUR"})).unwrap();
        assert_eq!(p.description, None);
        assert_eq!(p.risk_profile, None);

        let p: Portfolio = serde_json::from_value(common::portfolio_json(id, "Core", Some("d"))).unwrap();
        assert_eq!(p.risk_profile, Some(RiskProfile::Moderate));
    }

    #[test]
    fn duplicate_request_omits_missing_name() {
        let body = serde_json::to_value(DuplicatePortfolioRequest {
            name: None,
            copy_transactions: true,
        })
        .unwrap();
        assert_eq!(body, json!({"copyTransactions": true}));
    }
}

mod asset {
    use super::*;

    #[test]
    fn new_uppercases_symbol() {
        let a = Asset::new(Uuid::new_v4(), "btc", "Bitcoin", AssetType::Crypto);
        assert_eq!(a.symbol, "BTC");
    }

    #[test]
    fn type_wire_names() {
        assert_eq!(serde_json::to_value(AssetType::Etf).unwrap(), json!("ETF"));
        assert_eq!(AssetType::Commodity.to_string(), "COMMODITY");
    }

    #[test]
    fn request_normalized() {
        let req = AssetRequest {
            asset_type: AssetType::Stock,
            symbol: "  aapl ".into(),
            name: None,
            exchange: None,
            network: None,
            currency: "usd".into(),
        }
        .normalized()
        .unwrap();
        assert_eq!(req.symbol, "AAPL");
        assert_eq!(req.currency, "USD");
    }

    #[test]
    fn request_without_symbol_rejected() {
        let req = AssetRequest {
            asset_type: AssetType::Stock,
            symbol: " ".into(),
            name: None,
            exchange: None,
            network: None,
            currency: "USD".into(),
        };
        assert!(req.normalized().is_err());
    }

    #[test]
    fn watched_asset_flattens() {
        let a = Asset::new(Uuid::new_v4(), "ETH", "Ethereum", AssetType::Crypto);
        let w = WatchedAsset {
            asset: a,
            current_price: Some(2500.0),
        };
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["symbol"], "ETH");
        assert_eq!(v["currentPrice"], 2500.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Alerts
// ═══════════════════════════════════════════════════════════════════

mod alert {
    use super::*;

    #[test]
    fn triggered_flag_from_timestamp() {
        let a: Alert = serde_json::from_value(common::alert_json(Uuid::new_v4(), true)).unwrap();
        assert!(a.is_triggered());
        assert_eq!(a.condition_type, ConditionType::Above);

        let b: Alert = serde_json::from_value(common::alert_json(Uuid::new_v4(), false)).unwrap();
        assert!(!b.is_triggered());
    }

    #[test]
    fn request_validation() {
        let mut req = AlertRequest {
            asset_id: Some(Uuid::new_v4()),
            condition_type: ConditionType::Below,
            target_price: 10.0,
            currency: "USD".into(),
        };
        assert!(req.validate().is_ok());

        req.target_price = 0.0;
        assert_eq!(req.validate().unwrap_err().to_string(), "Target price must be positive");

        req.target_price = 10.0;
        req.asset_id = None;
        assert!(req.validate().is_err());
    }

    #[test]
    fn bulk_outcome() {
        let mut outcome = BulkOutcome::default();
        assert!(outcome.all_succeeded());
        outcome.failed.push((Uuid::nil(), "Failed to update alert".into()));
        assert!(!outcome.all_succeeded());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Pages & filters
// ═══════════════════════════════════════════════════════════════════

mod page {
    use super::*;

    #[test]
    fn backend_page_shape() {
        let page: Page<u32> = serde_json::from_value(json!({
            "content": [1, 2],
            "number": 1,
            "size": 2,
            "totalElements": 4,
            "totalPages": 2
        }))
        .unwrap();
        assert_eq!(page.page, 1);
        assert!(page.is_last());
        assert!(!page.is_first());
    }

    #[test]
    fn list_response_accepts_both_shapes() {
        let plain: ListResponse<u32> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(plain.into_items(), vec![1, 2, 3]);

        let paged: ListResponse<u32> =
            serde_json::from_value(json!({"content": [7], "totalElements": 1})).unwrap();
        assert_eq!(paged.into_items(), vec![7]);
    }
}

mod filter {
    use super::*;

    #[test]
    fn default_includes_transfers() {
        let f = TransactionFilter::default();
        assert!(f.include_transfers);
        assert!(f.to_query_pairs().is_empty());
    }

    #[test]
    fn query_pairs_expand_dates_to_day_bounds() {
        let f = TransactionFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..TransactionFilter::default()
        };
        assert_eq!(
            f.to_query_pairs(),
            vec![
                ("startDate", "2024-01-01T00:00:00".to_string()),
                ("endDate", "2024-01-31T23:59:59".to_string()),
            ]
        );
    }

    #[test]
    fn saved_filter_missing_include_transfers_defaults_true() {
        let saved: SavedFilter = serde_json::from_value(json!({
            "id": "1",
            "name": "Buys",
            "filters": {"transactionType": "BUY"}
        }))
        .unwrap();
        assert!(saved.filters.include_transfers);
        assert_eq!(saved.filters.transaction_type, Some(TransactionType::Buy));
    }

    #[test]
    fn browser_form_values_decode() {
        let f: TransactionFilter = serde_json::from_value(json!({
            "portfolioId": "",
            "assetId": "",
            "transactionType": "",
            "startDate": "2024-01-01",
            "endDate": "",
            "minAmount": "100",
            "maxAmount": 2500.5,
            "includeTransfers": false,
            "page": 0,
            "size": 20
        }))
        .unwrap();
        assert_eq!(f.portfolio_id, None);
        assert_eq!(f.asset_id, None);
        assert_eq!(f.transaction_type, None);
        assert_eq!(f.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(f.end_date, None);
        assert_eq!(f.min_amount, Some(100.0));
        assert_eq!(f.max_amount, Some(2500.5));
        assert!(!f.include_transfers);
    }

    #[test]
    fn garbage_amount_text_is_rejected() {
        let r = serde_json::from_value::<TransactionFilter>(json!({"minAmount": "lots"}));
        assert!(r.is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings & config
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = UserSettings::default();
        assert_eq!(s.default_currency, "USD");
        assert_eq!(s.price_update_minutes(), Some(5));
        assert!(s.show_notifications);
        assert!(!s.email_notifications);
    }

    #[test]
    fn partial_object_fills_defaults() {
        let s: UserSettings = serde_json::from_value(json!({"chartType": "bar"})).unwrap();
        assert_eq!(s.chart_type, "bar");
        assert_eq!(s.date_format, "MM/DD/YYYY");
    }

    #[test]
    fn interval_must_be_positive_integer() {
        for bad in ["0", "", "five", "-3"] {
            let s = UserSettings {
                price_update_interval: bad.into(),
                ..UserSettings::default()
            };
            assert_eq!(s.price_update_minutes(), None, "{bad}");
        }
    }

    #[test]
    fn config_with_settings() {
        let settings = UserSettings {
            default_currency: " eur ".into(),
            price_update_interval: "2".into(),
            ..UserSettings::default()
        };
        let config = ClientConfig::new("http://host/api").with_settings(&settings);
        assert_eq!(config.default_currency, "EUR");
        assert_eq!(config.alert_poll_interval, Duration::from_secs(120));
        assert_eq!(config.base_url, "http://host/api");
    }

    #[test]
    fn unusable_interval_keeps_config_value() {
        let settings = UserSettings {
            price_update_interval: "soon".into(),
            ..UserSettings::default()
        };
        let config = ClientConfig::default().with_settings(&settings);
        assert_eq!(config.alert_poll_interval, Duration::from_secs(300));
    }

    #[test]
    fn oversized_interval_keeps_config_value() {
        let settings = UserSettings {
            price_update_interval: "999999999999999999".into(),
            ..UserSettings::default()
        };
        assert_eq!(settings.price_update_minutes(), Some(999_999_999_999_999_999));
        let config = ClientConfig::default().with_settings(&settings);
        assert_eq!(config.alert_poll_interval, Duration::from_secs(300));
    }
}
