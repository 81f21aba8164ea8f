//! End-to-end tests of the transferors against the in-memory platform.
//!
//! Tests: imported rows → transferor → stock items + entity annotations + activity summary
//!
//! Verifies:
//! - Per-record failures are isolated and counted
//! - Stop-on-first-error persists the partial summary and touches nothing after the failure
//! - Zero-fill targets exactly the eligible products absent from the import

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;
    use serde_json::{json, Value as JsonValue};

    use stocksync_activity::{Activity, ActivityRepository};
    use stocksync_core::{ActivityId, ProductId, StockId};
    use stocksync_inventory::{Product, StockItemStore};
    use stocksync_transfer::{
        ConfigError, DefaultStockTransferor, EnvStockConfig, FieldMapping, QtyToZeroTransferor,
        StockConfigProvider, StockTransferSettings, Transferor, TransferorError,
    };

    use crate::platform::{InMemoryPlatform, DEFAULT_STOCK_TRANSFEROR, QTY_TO_ZERO_TRANSFEROR};
    use crate::stock_store::InMemoryStockListing;

    const TRANSFEROR: &str = "default_stock";
    const ZERO_FILL: &str = "qty_to_zero";

    fn fields() -> FieldMapping {
        FieldMapping::new("stock.sku", "stock.qty")
    }

    fn settings(continue_on_errors: bool) -> Arc<dyn StockConfigProvider> {
        Arc::new(StockTransferSettings::default().with_continue_in_case_of_errors(continue_on_errors))
    }

    /// Catalog of `(sku, product id, auto_qty_to_zero)`.
    fn platform(products: &[(&str, i64, bool)]) -> InMemoryPlatform {
        let platform = InMemoryPlatform::new();
        for (sku, id, auto_zero) in products {
            platform
                .catalog
                .upsert(Product::new(ProductId::new(*id), *sku).with_auto_qty_to_zero(*auto_zero))
                .unwrap();
        }
        platform
    }

    /// Register the activity and one `stock` row per `(identifier, data)`.
    fn import(platform: &InMemoryPlatform, activity_id: ActivityId, rows: &[(&str, JsonValue)]) {
        platform.activities.insert(Activity::new(activity_id)).unwrap();
        for (identifier, data) in rows {
            platform
                .entities
                .insert_row(activity_id, *identifier, "stock", data.clone())
                .unwrap();
        }
    }

    fn qty(platform: &InMemoryPlatform, product_id: i64) -> Option<f64> {
        platform
            .stock_items
            .get(ProductId::new(product_id), StockId::DEFAULT)
            .map(|item| item.qty)
    }

    fn extra(platform: &InMemoryPlatform, activity_id: ActivityId, key: &str) -> Option<JsonValue> {
        platform
            .activities
            .get_by_id(activity_id)
            .unwrap()
            .extra()
            .get(key)
            .cloned()
    }

    #[test]
    fn missing_quantity_is_counted_and_annotated() {
        stocksync_observability::init();

        let platform = platform(&[("X", 1, false), ("Y", 2, false)]);
        let activity_id = ActivityId::new(100);
        platform.stock_items.put(ProductId::new(1), StockId::DEFAULT, 2.0).unwrap();
        import(
            &platform,
            activity_id,
            &[("e1", json!({"sku": "X", "qty": 5})), ("e2", json!({"sku": "Y"}))],
        );

        let transferor = DefaultStockTransferor::new(platform.context(settings(true)), fields());
        transferor.execute(activity_id, TRANSFEROR).unwrap();

        assert_eq!(extra(&platform, activity_id, "ok"), Some(json!(1)));
        assert_eq!(extra(&platform, activity_id, "ko"), Some(json!(1)));

        let e1 = platform.entities.extra_for(activity_id, "e1").unwrap();
        assert_eq!(e1.get("old_qty"), Some(&json!(2.0)));
        assert_eq!(e1.get("new_qty"), Some(&json!(5.0)));

        let e2 = platform.entities.extra_for(activity_id, "e2").unwrap();
        assert_eq!(e2.get("error"), Some(&json!("path not found: stock.qty")));

        let item = platform.stock_items.get(ProductId::new(1), StockId::DEFAULT).unwrap();
        assert_eq!(item.qty, 5.0);
        assert!(item.is_in_stock);
        assert_eq!(qty(&platform, 2), None);
    }

    #[test]
    fn first_failure_aborts_after_saving_partial_summary() {
        let platform = platform(&[("X", 1, false), ("Y", 2, false)]);
        let activity_id = ActivityId::new(100);
        import(
            &platform,
            activity_id,
            &[("e1", json!({"sku": "X"})), ("e2", json!({"sku": "Y", "qty": 3}))],
        );

        let transferor = DefaultStockTransferor::new(platform.context(settings(false)), fields());
        let err = transferor.execute(activity_id, TRANSFEROR).unwrap_err();

        let abort = err.as_abort().expect("batch abort");
        assert_eq!(abort.activity_id, activity_id);
        assert_eq!(abort.transferor, TRANSFEROR);
        assert_eq!(abort.identifier, "e1");

        assert_eq!(extra(&platform, activity_id, "ok"), Some(json!(0)));
        assert_eq!(extra(&platform, activity_id, "ko"), Some(json!(1)));
        assert_eq!(platform.activities.save_history(activity_id).len(), 1);
        assert_eq!(qty(&platform, 2), None);
    }

    #[test]
    fn records_after_the_failing_one_are_never_read() {
        let platform = platform(&[("A", 1, false), ("C", 3, false)]);
        let activity_id = ActivityId::new(7);
        import(
            &platform,
            activity_id,
            &[
                ("e1", json!({"sku": "A", "qty": 1})),
                ("e2", json!({"sku": "B", "qty": 2})),
                ("e3", json!({"sku": "C", "qty": 3})),
            ],
        );

        let transferor = DefaultStockTransferor::new(platform.context(settings(false)), fields());
        let err = transferor.execute(activity_id, TRANSFEROR).unwrap_err();
        assert_eq!(err.as_abort().unwrap().identifier, "e2");

        let lookups = platform.catalog.sku_lookups();
        assert!(lookups.contains(&"B".to_string()));
        assert!(!lookups.contains(&"C".to_string()));

        assert_eq!(extra(&platform, activity_id, "ok"), Some(json!(1)));
        assert_eq!(extra(&platform, activity_id, "ko"), Some(json!(1)));
        assert!(platform.entities.extra_for(activity_id, "e3").unwrap().is_empty());
        assert_eq!(qty(&platform, 3), None);
    }

    #[test]
    fn rerun_yields_the_same_summary() {
        let platform = platform(&[("A", 1, false)]);
        let activity_id = ActivityId::new(8);
        import(
            &platform,
            activity_id,
            &[("e1", json!({"sku": "A", "qty": 4})), ("e2", json!({"sku": "missing", "qty": 1}))],
        );

        let transferor = DefaultStockTransferor::new(platform.context(settings(true)), fields());
        transferor.execute(activity_id, TRANSFEROR).unwrap();
        let first = (extra(&platform, activity_id, "ok"), extra(&platform, activity_id, "ko"));

        transferor.execute(activity_id, TRANSFEROR).unwrap();
        let second = (extra(&platform, activity_id, "ok"), extra(&platform, activity_id, "ko"));

        assert_eq!(first, second);
        assert_eq!(first, (Some(json!(1)), Some(json!(1))));

        let e1 = platform.entities.extra_for(activity_id, "e1").unwrap();
        assert_eq!(e1.get("old_qty"), Some(&json!(4.0)));
    }

    #[test]
    fn summary_keeps_unrelated_activity_extras() {
        let platform = platform(&[("A", 1, false)]);
        let activity_id = ActivityId::new(9);
        platform
            .activities
            .insert(Activity::new(activity_id).with_extra("file", json!("loft.csv")))
            .unwrap();
        platform
            .entities
            .insert_row(activity_id, "e1", "stock", json!({"sku": "A", "qty": 1}))
            .unwrap();

        DefaultStockTransferor::new(platform.context(settings(true)), fields())
            .execute(activity_id, TRANSFEROR)
            .unwrap();

        assert_eq!(extra(&platform, activity_id, "file"), Some(json!("loft.csv")));
        assert_eq!(extra(&platform, activity_id, "ok"), Some(json!(1)));
    }

    #[test]
    fn stock_flag_follows_written_quantity() {
        let platform = platform(&[("A", 1, false), ("B", 2, false)]);
        let activity_id = ActivityId::new(10);
        import(
            &platform,
            activity_id,
            &[("e1", json!({"sku": "A", "qty": 0})), ("e2", json!({"sku": "B", "qty": "0.001"}))],
        );

        DefaultStockTransferor::new(platform.context(settings(true)), fields())
            .execute(activity_id, TRANSFEROR)
            .unwrap();

        let a = platform.stock_items.get(ProductId::new(1), StockId::DEFAULT).unwrap();
        let b = platform.stock_items.get(ProductId::new(2), StockId::DEFAULT).unwrap();
        assert!(!a.is_in_stock);
        assert_eq!(b.qty, 0.001);
        assert!(b.is_in_stock);
    }

    #[test]
    fn reindex_runs_when_configured_and_its_failure_is_a_record_failure() {
        let platform = platform(&[("A", 1, false), ("B", 2, false)]);
        platform.indexer.fail_for(ProductId::new(2));
        let activity_id = ActivityId::new(11);
        import(
            &platform,
            activity_id,
            &[("e1", json!({"sku": "A", "qty": 1})), ("e2", json!({"sku": "B", "qty": 1}))],
        );

        let config: Arc<dyn StockConfigProvider> =
            Arc::new(StockTransferSettings::default().with_reindex_after_import(true));
        DefaultStockTransferor::new(platform.context(config), fields())
            .execute(activity_id, TRANSFEROR)
            .unwrap();

        assert_eq!(platform.indexer.reindexed(), vec![ProductId::new(1), ProductId::new(2)]);
        assert_eq!(extra(&platform, activity_id, "ok"), Some(json!(1)));
        assert_eq!(extra(&platform, activity_id, "ko"), Some(json!(1)));

        let e2 = platform.entities.extra_for(activity_id, "e2").unwrap();
        assert!(e2["error"].as_str().unwrap().starts_with("reindex failed"));
    }

    #[test]
    fn configured_stock_must_exist() {
        let platform = platform(&[("A", 1, false)]);
        let activity_id = ActivityId::new(12);
        import(&platform, activity_id, &[("e1", json!({"sku": "A", "qty": 1}))]);

        let config = EnvStockConfig::new()
            .with_lookup(|key| (key == "STOCKSYNC_STOCK_ID").then(|| "5".to_string()))
            .with_listing(Arc::new(InMemoryStockListing::default_only()));
        let err = DefaultStockTransferor::new(platform.context(Arc::new(config)), fields())
            .execute(activity_id, TRANSFEROR)
            .unwrap_err();

        assert_eq!(err, TransferorError::Config(ConfigError::UnknownStock(StockId::new(5))));
        assert_eq!(extra(&platform, activity_id, "ok"), None);
        assert_eq!(qty(&platform, 1), None);
    }

    #[test]
    fn zero_fill_targets_the_complement() {
        let platform = platform(&[("A", 1, true), ("B", 2, true), ("C", 3, true), ("D", 4, true), ("E", 5, false)]);
        for id in 1..=5 {
            platform.stock_items.put(ProductId::new(id), StockId::DEFAULT, 10.0).unwrap();
        }
        let activity_id = ActivityId::new(20);
        import(&platform, activity_id, &[("e1", json!({"sku": "A", "qty": 3}))]);

        QtyToZeroTransferor::new(platform.context(settings(true)), "stock.sku")
            .execute(activity_id, ZERO_FILL)
            .unwrap();

        assert_eq!(extra(&platform, activity_id, "qty_to_zero"), Some(json!("B,C,D")));
        assert_eq!(extra(&platform, activity_id, "qty_not_to_zero"), Some(json!("")));
        assert_eq!(qty(&platform, 1), Some(10.0));
        for id in 2..=4 {
            let item = platform.stock_items.get(ProductId::new(id), StockId::DEFAULT).unwrap();
            assert_eq!(item.qty, 0.0);
            assert!(!item.is_in_stock);
        }
        assert_eq!(qty(&platform, 5), Some(10.0));
    }

    #[test]
    fn unreadable_skus_are_not_protected_from_zero_fill() {
        let platform = platform(&[("A", 1, true), ("B", 2, true)]);
        let activity_id = ActivityId::new(21);
        import(
            &platform,
            activity_id,
            &[("e1", json!({"sku": "A"})), ("e2", json!({"code": "B", "qty": 3}))],
        );

        QtyToZeroTransferor::new(platform.context(settings(true)), "stock.sku")
            .execute(activity_id, ZERO_FILL)
            .unwrap();

        assert_eq!(extra(&platform, activity_id, "qty_to_zero"), Some(json!("B")));
        let e2 = platform.entities.extra_for(activity_id, "e2").unwrap();
        assert_eq!(e2.get("error"), Some(&json!("path not found: stock.sku")));
        assert!(platform.entities.extra_for(activity_id, "e1").unwrap().is_empty());
    }

    #[test]
    fn zero_fill_is_skipped_for_targeted_requests() {
        let platform = platform(&[("A", 1, true)]);
        platform.stock_items.put(ProductId::new(1), StockId::DEFAULT, 4.0).unwrap();
        let activity_id = ActivityId::new(22);
        platform
            .activities
            .insert(Activity::new(activity_id).with_extra("data", json!({"sku": "Z"})))
            .unwrap();

        QtyToZeroTransferor::new(platform.context(settings(true)), "stock.sku")
            .execute(activity_id, ZERO_FILL)
            .unwrap();

        assert_eq!(qty(&platform, 1), Some(4.0));
        assert!(platform.activities.save_history(activity_id).is_empty());
    }

    #[test]
    fn empty_data_key_still_marks_a_targeted_request() {
        let platform = platform(&[("A", 1, true)]);
        platform.stock_items.put(ProductId::new(1), StockId::DEFAULT, 4.0).unwrap();

        for (offset, data) in [json!(null), json!(""), json!([]), json!({})].into_iter().enumerate() {
            let activity_id = ActivityId::new(25 + offset as i64);
            platform
                .activities
                .insert(Activity::new(activity_id).with_extra("data", data))
                .unwrap();

            QtyToZeroTransferor::new(platform.context(settings(true)), "stock.sku")
                .execute(activity_id, ZERO_FILL)
                .unwrap();

            assert_eq!(qty(&platform, 1), Some(4.0));
            assert!(platform.activities.save_history(activity_id).is_empty());
        }
    }

    #[test]
    fn zero_fill_absorbs_errors_and_panics() {
        let platform = platform(&[("B", 2, true), ("C", 3, true), ("D", 4, true)]);
        platform.stock_items.reject_saves_for(ProductId::new(3));
        platform.indexer.panic_for(ProductId::new(4));
        let activity_id = ActivityId::new(23);
        import(&platform, activity_id, &[]);

        let config: Arc<dyn StockConfigProvider> =
            Arc::new(StockTransferSettings::default().with_reindex_after_import(true));
        QtyToZeroTransferor::new(platform.context(config), "stock.sku")
            .execute(activity_id, ZERO_FILL)
            .unwrap();

        assert_eq!(extra(&platform, activity_id, "qty_to_zero"), Some(json!("B")));
        assert_eq!(extra(&platform, activity_id, "qty_not_to_zero"), Some(json!("C,D")));
    }

    #[test]
    fn zero_fill_aborts_on_first_failure() {
        let platform = platform(&[("B", 2, true), ("C", 3, true), ("D", 4, true)]);
        platform.stock_items.reject_saves_for(ProductId::new(3));
        let activity_id = ActivityId::new(24);
        import(&platform, activity_id, &[]);

        let err = QtyToZeroTransferor::new(platform.context(settings(false)), "stock.sku")
            .execute(activity_id, ZERO_FILL)
            .unwrap_err();

        let abort = err.as_abort().unwrap();
        assert_eq!(abort.identifier, "C");
        assert_eq!(abort.transferor, ZERO_FILL);
        assert_eq!(extra(&platform, activity_id, "qty_to_zero"), Some(json!("B")));
        assert_eq!(extra(&platform, activity_id, "qty_not_to_zero"), Some(json!("C")));
        assert_eq!(qty(&platform, 4), None);
    }

    #[test]
    fn default_chain_transfers_then_zero_fills() {
        let platform = platform(&[("A", 1, true), ("B", 2, true)]);
        platform.stock_items.put(ProductId::new(2), StockId::DEFAULT, 6.0).unwrap();
        let activity_id = ActivityId::new(30);
        import(&platform, activity_id, &[("e1", json!({"sku": "A", "qty": 9}))]);

        let chain = platform.default_chain(settings(true), fields());
        assert_eq!(
            chain.labels().collect::<Vec<_>>(),
            vec![DEFAULT_STOCK_TRANSFEROR, QTY_TO_ZERO_TRANSFEROR]
        );
        chain.execute(activity_id).unwrap();

        assert_eq!(qty(&platform, 1), Some(9.0));
        assert_eq!(qty(&platform, 2), Some(0.0));
        assert_eq!(extra(&platform, activity_id, "ok"), Some(json!(1)));
        assert_eq!(extra(&platform, activity_id, "qty_to_zero"), Some(json!("B")));
        assert_eq!(platform.activities.save_history(activity_id).len(), 2);
    }

    #[test]
    fn status_only_update_keeps_transferred_quantity() {
        let platform = platform(&[("A", 1, false)]);
        let activity_id = ActivityId::new(31);
        import(&platform, activity_id, &[("e1", json!({"sku": "A", "qty": 2}))]);
        let ctx = platform.context(settings(true));

        DefaultStockTransferor::new(ctx, fields())
            .execute(activity_id, TRANSFEROR)
            .unwrap();

        let writer = stocksync_inventory::DefaultStockWriter::new(platform.stock_items.clone());
        writer
            .apply_status_only(ProductId::new(1), StockId::DEFAULT, stocksync_inventory::StockStatus::OutOfStock)
            .unwrap();

        let item = platform.stock_items.load(ProductId::new(1), StockId::DEFAULT).unwrap().unwrap();
        assert_eq!(item.qty, 2.0);
        assert!(!item.is_in_stock);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// With continue-on-error, every entity is counted exactly once.
        #[test]
        fn ok_plus_ko_equals_entity_count(valid in prop::collection::vec(any::<bool>(), 0..16)) {
            let platform = platform(&[("A", 1, false)]);
            let activity_id = ActivityId::new(40);
            let rows: Vec<(String, JsonValue)> = valid
                .iter()
                .enumerate()
                .map(|(i, ok)| {
                    let data = if *ok { json!({"sku": "A", "qty": i}) } else { json!({"sku": "A"}) };
                    (format!("e{i}"), data)
                })
                .collect();
            let rows: Vec<(&str, JsonValue)> = rows.iter().map(|(id, d)| (id.as_str(), d.clone())).collect();
            import(&platform, activity_id, &rows);

            DefaultStockTransferor::new(platform.context(settings(true)), fields())
                .execute(activity_id, TRANSFEROR)
                .unwrap();

            let expected_ok = valid.iter().filter(|v| **v).count() as u64;
            let expected_ko = valid.len() as u64 - expected_ok;
            prop_assert_eq!(extra(&platform, activity_id, "ok"), Some(json!(expected_ok)));
            prop_assert_eq!(extra(&platform, activity_id, "ko"), Some(json!(expected_ko)));
        }
    }
}
