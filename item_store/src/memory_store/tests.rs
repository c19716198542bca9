//! In-memory store tests
//!
//! Fetch modes, filters, joins, aggregation, sorting, projection and paging
//! over the demo catalogue.

#[cfg(test)]
mod tests {
    use crate::errors::StoreError;
    use crate::models::{Item, ItemDto, ItemDtoProj};
    use crate::query_builder::{
        GroupBy, JoinClause, JoinType, PageRequest, QueryBuilder, QueryFilter, SelectField,
    };
    use crate::schema::{item, shop};
    use crate::test_support::{names, seed};
    use crate::traits::{EntityStore, ItemStore};
    use chrono::{Duration, Utc};
    use serde_json::json;

    // ========================================
    // Fetch modes
    // ========================================

    #[tokio::test]
    async fn test_find_all_and_count() {
        let demo = seed().await;

        let all = demo.items.find(QueryBuilder::new()).await.unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(demo.items.count().await.unwrap(), 6);
        assert_eq!(demo.items.count_where(QueryBuilder::new()).await.unwrap(), 6);
        assert_eq!(demo.shops.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_one_multiplicity() {
        let demo = seed().await;

        let found = demo
            .items
            .find_one(QueryBuilder::new().filter(item::ID.eq(1)))
            .await
            .unwrap();
        assert_eq!(found.map(|i| i.id), Some(1));

        let missing = demo
            .items
            .find_one(QueryBuilder::new().filter(item::ID.eq(0)))
            .await
            .unwrap();
        assert!(missing.is_none());

        let err = demo.items.find_one(QueryBuilder::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NonUniqueResult { count: 2 }));
    }

    #[tokio::test]
    async fn test_find_first_and_offset_limit() {
        let demo = seed().await;

        let first = demo
            .items
            .find_first(QueryBuilder::new().order_by(item::ID.asc()))
            .await
            .unwrap();
        assert_eq!(first.and_then(|i| i.name), Some("itemA".to_string()));

        let window = demo
            .items
            .find(QueryBuilder::new().order_by(item::ID.asc()).offset(3).limit(2))
            .await
            .unwrap();
        assert_eq!(names(&window), vec![Some("itemD"), Some("itemE")]);
    }

    #[tokio::test]
    async fn test_get_by_id_and_list_all() {
        let demo = seed().await;

        let item = demo.items.get_by_id(2).await.unwrap().unwrap();
        assert_eq!(item.name.as_deref(), Some("itemB"));
        assert_eq!(item.shop_id, Some(demo.shop_a.id));
        assert!(demo.items.get_by_id(99).await.unwrap().is_none());

        let ids: Vec<i64> = demo.items.list_all().await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    // ========================================
    // Filters
    // ========================================

    #[tokio::test]
    async fn test_where_list_is_conjunction() {
        let demo = seed().await;

        let found = demo
            .items
            .find(
                QueryBuilder::new()
                    .filter(item::NAME.is_not_null())
                    .filter(item::PRICE.lt(8000))
                    .filter(item::STOCK.gt(20)),
            )
            .await
            .unwrap();
        assert_eq!(names(&found), vec![Some("itemB")]);
    }

    #[tokio::test]
    async fn test_and_or_chains() {
        let demo = seed().await;

        let chained = demo
            .items
            .find(
                QueryBuilder::new().filter(
                    item::PRICE
                        .lte(6000)
                        .or(item::PRICE.gte(9000))
                        .or(item::STOCK.in_values([20, 30, 40]))
                        .and(item::NAME.is_not_null()),
                ),
            )
            .await
            .unwrap();
        assert_eq!(chained.len(), 5);

        let grouped = demo
            .items
            .find(
                QueryBuilder::new()
                    .filter(item::PRICE.lte(6000).or(item::PRICE.gte(9000)))
                    .filter(item::STOCK.lt(40).or(item::STOCK.gt(60))),
            )
            .await
            .unwrap();
        assert_eq!(names(&grouped), vec![Some("itemA"), Some("itemB"), Some("itemE")]);
    }

    #[tokio::test]
    async fn test_string_operators() {
        let demo = seed().await;
        let count = |filter: QueryFilter| {
            let items = demo.items.clone();
            async move { items.count_where(QueryBuilder::new().filter(filter)).await.unwrap() }
        };

        assert_eq!(count(item::NAME.like("%item_")).await, 5);
        assert_eq!(count(item::NAME.contains("item")).await, 5);
        assert_eq!(count(item::NAME.starts_with("item")).await, 5);
        assert_eq!(count(item::NAME.ends_with("item")).await, 0);
        assert_eq!(count(item::NAME.is_not_empty()).await, 5);
        assert_eq!(count(item::NAME.is_null()).await, 1);
        // NULL names are neither equal nor unequal to "itemC"
        assert_eq!(count(!item::NAME.eq("itemC")).await, 4);
        assert_eq!(count(item::NAME.ne("itemB")).await, 4);
    }

    #[tokio::test]
    async fn test_numeric_and_time_operators() {
        let demo = seed().await;
        let count = |filter: QueryFilter| {
            let items = demo.items.clone();
            async move { items.count_where(QueryBuilder::new().filter(filter)).await.unwrap() }
        };

        assert_eq!(count(item::PRICE.between(5000, 10000)).await, 6);
        assert_eq!(count(item::PRICE.in_values([5000, 6000, 7000, 8000])).await, 3);
        assert_eq!(count(item::PRICE.lte(6000)).await, 3);
        assert_eq!(count(item::PRICE.gt(7000)).await, 3);

        let five_days_ago = Utc::now() - Duration::days(5);
        assert_eq!(count(item::CREATED_AT.after(five_days_ago)).await, 6);
        assert_eq!(count(item::CREATED_AT.before(five_days_ago)).await, 0);
    }

    // ========================================
    // Sorting
    // ========================================

    #[tokio::test]
    async fn test_multi_key_sort_with_nulls_first() {
        let demo = seed().await;
        demo.items
            .save_all(vec![
                Item::builder().name("itemF").price(6000).stock(40).build(),
                Item::builder().price(6000).stock(40).build(),
            ])
            .await
            .unwrap();

        let sorted = demo
            .items
            .find(QueryBuilder::new().order_by_all(vec![
                item::PRICE.asc(),
                item::STOCK.desc(),
                item::NAME.asc().nulls_first(),
            ]))
            .await
            .unwrap();

        assert_eq!(
            names(&sorted),
            vec![
                Some("itemA"),
                Some("itemE"),
                None,
                Some("itemF"),
                Some("itemB"),
                None,
                Some("itemC"),
                Some("itemD"),
            ]
        );

        let nulls_last = demo
            .items
            .find(
                QueryBuilder::new()
                    .filter(item::PRICE.eq(6000))
                    .filter(item::STOCK.eq(40))
                    .order_by(item::NAME.asc().nulls_last()),
            )
            .await
            .unwrap();
        assert_eq!(names(&nulls_last), vec![Some("itemF"), None]);
    }

    #[tokio::test]
    async fn test_default_null_placement() {
        let demo = seed().await;

        let asc = demo
            .items
            .find(QueryBuilder::new().order_by(item::NAME.asc()))
            .await
            .unwrap();
        assert_eq!(names(&asc).last(), Some(&None));

        let desc = demo
            .items
            .find(QueryBuilder::new().order_by(item::NAME.desc()))
            .await
            .unwrap();
        assert_eq!(names(&desc).first(), Some(&None));
    }

    // ========================================
    // Joins
    // ========================================

    #[tokio::test]
    async fn test_join_kinds() {
        let demo = seed().await;

        let inner = QueryBuilder::new().join(item::shop_join(JoinType::Inner));
        assert_eq!(demo.items.find(inner).await.unwrap().len(), 4);

        let left = QueryBuilder::new().join(item::shop_join(JoinType::Left));
        assert_eq!(demo.items.find(left).await.unwrap().len(), 6);

        // shopC has no items: a row without an item
        let right = QueryBuilder::new().join(item::shop_join(JoinType::Right));
        assert_eq!(demo.items.count_where(right.clone()).await.unwrap(), 5);
        assert_eq!(demo.items.find(right).await.unwrap().len(), 4);

        let unowned = QueryBuilder::new()
            .join(item::shop_join(JoinType::Left))
            .filter(shop::ID.is_null());
        let found = demo.items.find(unowned).await.unwrap();
        assert_eq!(names(&found), vec![Some("itemE"), None]);
    }

    #[tokio::test]
    async fn test_join_filter_on_shop_columns() {
        let demo = seed().await;

        let found = demo
            .items
            .find(
                QueryBuilder::new()
                    .join(item::shop_join(JoinType::Inner))
                    .filter(shop::NAME.eq("shopB"))
                    .order_by(item::PRICE.desc()),
            )
            .await
            .unwrap();
        assert_eq!(names(&found), vec![Some("itemD"), Some("itemC")]);

        let aliased = QueryBuilder::new()
            .join(
                JoinClause::new_on(JoinType::Inner, "shops", "items.shop_id", "s.id")
                    .with_alias("s"),
            )
            .filter(QueryFilter::eq("s.name", json!("shopA")));
        assert_eq!(demo.items.count_where(aliased).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_join_loads_shop() {
        let demo = seed().await;

        let loaded = demo
            .items
            .find_with_shop(QueryBuilder::new().filter(item::NAME.eq("itemB")), JoinType::Inner)
            .await
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].is_shop_loaded());
        assert_eq!(loaded[0].shop.as_ref().map(|s| s.name.as_str()), Some("shopA"));

        let all = demo
            .items
            .find_with_shop(QueryBuilder::new().order_by(item::ID.asc()), JoinType::Left)
            .await
            .unwrap();
        assert_eq!(all.len(), 6);
        let loaded_count = all.iter().filter(|row| row.is_shop_loaded()).count();
        assert_eq!(loaded_count, 4);
        assert_eq!(all[2].shop.as_ref().map(|s| s.id), Some(demo.shop_b.id));
    }

    #[tokio::test]
    async fn test_unknown_join_table() {
        let demo = seed().await;
        let err = demo
            .items
            .find(QueryBuilder::new().inner_join("owners", "items.shop_id", "owners.id"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownTable(table) if table == "owners"));
    }

    // ========================================
    // Aggregation
    // ========================================

    #[tokio::test]
    async fn test_aggregate_tuple() {
        let demo = seed().await;
        let selection = vec![
            item::ID.count(),
            item::PRICE.avg(),
            item::PRICE.max(),
            item::STOCK.sum(),
        ];

        let tuple = demo
            .items
            .fetch_one_tuple(QueryBuilder::new().select(selection))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(tuple.field_as::<i64>(&item::ID.count()), Some(6));
        assert_eq!(tuple.field_as::<f64>(&item::PRICE.avg()), Some(7000.0));
        assert_eq!(tuple.field_as::<i32>(&item::PRICE.max()), Some(10000));
        assert_eq!(tuple.field_as::<i64>(&item::STOCK.sum()), Some(175));
        assert_eq!(tuple.field(&item::STOCK.field()), None);
    }

    #[tokio::test]
    async fn test_group_by_shop_name() {
        let demo = seed().await;

        let tuples = demo
            .items
            .fetch_tuples(
                QueryBuilder::new()
                    .select(vec![
                        shop::NAME.field(),
                        item::ID.count(),
                        item::PRICE.avg(),
                        item::STOCK.sum(),
                    ])
                    .join(item::shop_join(JoinType::Inner))
                    .group_by(GroupBy::single(shop::NAME.qualified()))
                    .order_by(shop::NAME.asc()),
            )
            .await
            .unwrap();

        let summary: Vec<(String, i64, f64, i64)> = tuples
            .iter()
            .map(|t| {
                (
                    t.get_as("shops.name").unwrap(),
                    t.get_as("COUNT(items.id)").unwrap(),
                    t.get_as("AVG(items.price)").unwrap(),
                    t.get_as("SUM(items.stock)").unwrap(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("shopA".to_string(), 2, 5500.0, 50),
                ("shopB".to_string(), 2, 9000.0, 90),
            ]
        );
    }

    #[tokio::test]
    async fn test_having_filters_groups() {
        let demo = seed().await;

        let tuples = demo
            .items
            .fetch_tuples(
                QueryBuilder::new()
                    .select(vec![shop::NAME.field(), item::PRICE.avg().with_alias("avg_price")])
                    .join(item::shop_join(JoinType::Inner))
                    .group_by(
                        GroupBy::single(shop::NAME.qualified())
                            .having(QueryFilter::gt("AVG(items.price)", json!(6000)))
                            .having(QueryFilter::gte("COUNT(*)", json!(2))),
                    ),
            )
            .await
            .unwrap();

        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].get_as::<String>("shops.name"), Some("shopB".to_string()));
        assert_eq!(tuples[0].get_as::<f64>("avg_price"), Some(9000.0));
    }

    #[tokio::test]
    async fn test_left_join_groups_unowned_items() {
        let demo = seed().await;

        let tuples = demo
            .items
            .fetch_tuples(
                QueryBuilder::new()
                    .select(vec![shop::NAME.field(), SelectField::count_all()])
                    .join(item::shop_join(JoinType::Left))
                    .group_by(GroupBy::single(shop::NAME.qualified()))
                    .order_by(shop::NAME.asc()),
            )
            .await
            .unwrap();

        let counts: Vec<(Option<String>, i64)> = tuples
            .iter()
            .map(|t| (t.get_as("shops.name"), t.get_as("COUNT(*)").unwrap()))
            .collect();
        assert_eq!(
            counts,
            vec![
                (Some("shopA".to_string()), 2),
                (Some("shopB".to_string()), 2),
                (None, 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_aggregate_over_no_rows() {
        let demo = seed().await;

        let tuple = demo
            .items
            .fetch_one_tuple(
                QueryBuilder::new()
                    .select(vec![SelectField::count_all(), item::PRICE.sum()])
                    .filter(item::PRICE.gt(1_000_000)),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tuple.get_as::<i64>("COUNT(*)"), Some(0));
        assert_eq!(tuple.get("SUM(items.price)"), Some(&serde_json::Value::Null));
    }

    // ========================================
    // Projection
    // ========================================

    #[tokio::test]
    async fn test_scalar_and_multi_column_tuples() {
        let demo = seed().await;

        let name = demo
            .items
            .fetch_one_tuple(
                QueryBuilder::new()
                    .select(vec![item::NAME.field()])
                    .filter(item::ID.eq(4)),
            )
            .await
            .unwrap()
            .and_then(|t| t.field_as::<String>(&item::NAME.field()));
        assert_eq!(name.as_deref(), Some("itemD"));

        let tuple = demo
            .items
            .fetch_one_tuple(
                QueryBuilder::new()
                    .select(vec![item::PRICE.field(), item::STOCK.field()])
                    .filter(item::NAME.eq("itemB")),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tuple.field_as::<i32>(&item::PRICE.field()), Some(6000));
        assert_eq!(tuple.field_as::<i32>(&item::STOCK.field()), Some(30));
        assert_eq!(tuple.field(&item::NAME.field()), None);
    }

    #[tokio::test]
    async fn test_dto_projection() {
        let demo = seed().await;

        let dtos: Vec<ItemDto> = demo
            .items
            .find_projected(QueryBuilder::new().filter(item::NAME.eq("itemB")))
            .await
            .unwrap();
        assert_eq!(dtos, vec![ItemDto::new(Some("itemB".to_string()), 6000, 30)]);

        let projs: Vec<ItemDtoProj> = demo
            .items
            .find_projected(QueryBuilder::new().filter(item::NAME.eq("itemB")))
            .await
            .unwrap();
        assert_eq!(projs[0].total_cost, 180000);

        let named: Vec<ItemDto> = demo
            .items
            .find_projected(QueryBuilder::new().filter(item::NAME.is_not_null()))
            .await
            .unwrap();
        assert_eq!(named.len(), 5);

        let stored = demo.items.get_by_id(2).await.unwrap().unwrap();
        assert_eq!(ItemDto::from_entity(&stored), dtos[0]);
    }

    // ========================================
    // Paging
    // ========================================

    #[tokio::test]
    async fn test_full_first_page_runs_count() {
        let demo = seed().await;

        let page = demo
            .items
            .find_page(
                QueryBuilder::new().order_by(item::ID.asc()),
                PageRequest::of(0, 2).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(page.number_of_elements(), 2);
        assert_eq!(page.total_elements(), 6);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(demo.db.stats().snapshot().counts, 1);
        assert_eq!(demo.db.stats().snapshot().selects, 1);
    }

    #[tokio::test]
    async fn test_short_last_page_skips_count() {
        let demo = seed().await;

        let page = demo
            .items
            .find_page(
                QueryBuilder::new().order_by(item::ID.asc()),
                PageRequest::of(1, 5).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(names(page.content()), vec![None]);
        assert_eq!(page.total_elements(), 6);
        assert!(page.is_last());
        assert_eq!(demo.db.stats().snapshot().counts, 0);
    }

    #[tokio::test]
    async fn test_short_first_page_skips_count() {
        let demo = seed().await;

        let page = demo
            .items
            .find_page(QueryBuilder::new(), PageRequest::of(0, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(page.number_of_elements(), 6);
        assert_eq!(page.total_elements(), 6);
        assert_eq!(demo.db.stats().snapshot().counts, 0);
    }

    #[tokio::test]
    async fn test_page_past_the_end_runs_count() {
        let demo = seed().await;

        let page = demo
            .items
            .find_page(QueryBuilder::new(), PageRequest::of(4, 5).unwrap())
            .await
            .unwrap();

        assert!(page.content().is_empty());
        assert_eq!(page.total_elements(), 6);
        assert_eq!(demo.db.stats().snapshot().counts, 1);
    }

    #[tokio::test]
    async fn test_count_uses_page_filters() {
        let demo = seed().await;

        let page = demo
            .items
            .find_page(
                QueryBuilder::new().filter(item::SHOP_ID.is_not_null()),
                PageRequest::of(1, 2).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(page.number_of_elements(), 2);
        assert_eq!(page.total_elements(), 4);
        assert_eq!(demo.db.stats().snapshot().counts, 1);
    }

    #[tokio::test]
    async fn test_right_join_pages_agree_with_find() {
        let demo = seed().await;
        // shopC has no items; DESC puts its NULL item id first
        let query = QueryBuilder::new()
            .join(item::shop_join(JoinType::Right))
            .order_by(item::ID.desc());

        let all = demo.items.find(query.clone()).await.unwrap();
        assert_eq!(all.len(), 4);

        let first = demo
            .items
            .find_page(query.clone(), PageRequest::of(0, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(names(first.content()), vec![Some("itemD"), Some("itemC")]);
        assert_eq!(first.total_elements(), 4);

        let second = demo
            .items
            .find_page(query.clone(), PageRequest::of(1, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(names(second.content()), vec![Some("itemB"), Some("itemA")]);
        assert_eq!(second.total_elements(), 4);
        assert!(second.is_last());

        let past = demo
            .items
            .find_page(query, PageRequest::of(2, 2).unwrap())
            .await
            .unwrap();
        assert!(past.content().is_empty());
        assert_eq!(past.total_elements(), 4);
        assert_eq!(past.total_pages(), 2);
    }

    // ========================================
    // Mutations
    // ========================================

    #[tokio::test]
    async fn test_invalid_item_rejected() {
        let demo = seed().await;

        let err = demo
            .items
            .save(Item::builder().name("broken").price(-10).stock(1).build())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ValidationError(_)));
        assert_eq!(demo.items.count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_deleting_shop_detaches_items() {
        let demo = seed().await;

        assert!(demo.shops.delete(demo.shop_a.id).await.unwrap());
        assert!(!demo.shops.delete(demo.shop_a.id).await.unwrap());

        let orphaned = demo
            .items
            .count_where(QueryBuilder::new().filter(item::SHOP_ID.is_null()))
            .await
            .unwrap();
        assert_eq!(orphaned, 4);
        assert_eq!(demo.items.count().await.unwrap(), 6);

        let owned = QueryBuilder::new().join(item::shop_join(JoinType::Inner));
        assert_eq!(demo.items.find(owned).await.unwrap().len(), 2);
        assert_eq!(demo.shop_c.name, "shopC");
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let demo = seed().await;

        assert!(demo.items.delete(6).await.unwrap());
        let saved = demo
            .items
            .save(Item::builder().name("itemG").price(1).stock(1).build())
            .await
            .unwrap();
        assert_eq!(saved.id, 7);
    }
}
