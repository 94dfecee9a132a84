use lifecycle_risk::aggregate::{
    self, CorrelationMetric, DistrictQuery, QueryError, RankLimit, StateFilter,
};
use lifecycle_risk::scoring::{
    DistrictFlags, DistrictRecord, RiskCategory, RiskCutPoints, ScoreScale, ScoredTable,
};

fn record(id: &str, state: &str, alhs: f64, flags: DistrictFlags) -> DistrictRecord {
    let cut_points = RiskCutPoints::four_tier_percent();
    DistrictRecord {
        district_id: id.to_string(),
        district_name: format!("District {id}"),
        state: state.to_string(),
        population: 10_000,
        total_enrolments: 9_000,
        pending_biometric_updates: 150,
        ehi: 1.0 - alhs / 100.0,
        dsi: 0.5,
        bci: alhs / 100.0,
        alhs,
        flags,
        risk_category: cut_points.classify(alhs),
        last_updated: None,
    }
}

fn table(records: Vec<DistrictRecord>) -> ScoredTable {
    ScoredTable::from_records(
        records,
        ScoreScale::Percent,
        RiskCutPoints::four_tier_percent(),
        1,
    )
    .expect("unique district ids")
}

fn flagged(count: usize) -> DistrictFlags {
    DistrictFlags {
        low_child_compliance: count > 0,
        infra_stress: count > 1,
        catchup_spike: count > 2,
        future_surge: count > 3,
    }
}

fn sample_table() -> ScoredTable {
    table(vec![
        record("A", "Kerala", 30.0, flagged(0)),
        record("B", "Bihar", 90.0, flagged(3)),
        record("C", "Kerala", 60.0, flagged(1)),
        record("D", "Assam", 10.0, flagged(2)),
        record("E", "Bihar", 55.0, flagged(0)),
    ])
}

#[test]
fn top_districts_orders_by_alhs_descending() {
    let table = table(vec![
        record("A", "Kerala", 30.0, flagged(0)),
        record("B", "Kerala", 90.0, flagged(0)),
        record("C", "Kerala", 60.0, flagged(0)),
    ]);
    let limit = RankLimit::new(2).expect("limit in range");
    let top = aggregate::top_districts(&table, limit, &StateFilter::all());

    assert_eq!(top.count, 2);
    let scores: Vec<f64> = top.districts.iter().map(|entry| entry.alhs).collect();
    assert_eq!(scores, vec![90.0, 60.0]);
}

#[test]
fn top_districts_keeps_input_order_for_ties_and_honours_state() {
    let table = table(vec![
        record("A", "Kerala", 70.0, flagged(0)),
        record("B", "Bihar", 70.0, flagged(0)),
        record("C", "Kerala", 70.0, flagged(0)),
    ]);
    let all = aggregate::top_districts(&table, RankLimit::default(), &StateFilter::all());
    let ids: Vec<&str> = all
        .districts
        .iter()
        .map(|entry| entry.district_id.as_str())
        .collect();
    assert_eq!(ids, vec!["A", "B", "C"]);

    let kerala =
        aggregate::top_districts(&table, RankLimit::default(), &StateFilter::only("Kerala"));
    assert_eq!(kerala.count, 2);
    assert!(kerala.districts.iter().all(|entry| entry.state == "Kerala"));
}

#[test]
fn rank_limit_rejects_out_of_range_requests() {
    assert!(matches!(
        RankLimit::new(0),
        Err(QueryError::LimitOutOfRange { requested: 0, .. })
    ));
    assert!(RankLimit::new(51).is_err());
}

#[test]
fn summary_counts_categories_and_totals() {
    let table = sample_table();
    let summary = aggregate::summary(&table, &StateFilter::all());

    assert_eq!(summary.total_districts, 5);
    assert_eq!(summary.critical_districts, 1);
    assert_eq!(summary.count_for(RiskCategory::Low), 2);
    assert_eq!(summary.count_for(RiskCategory::Medium), 1);
    assert_eq!(summary.count_for(RiskCategory::High), 1);
    assert_eq!(summary.category_counts.len(), 4);
    assert_eq!(summary.total_flags, 6);
    assert_eq!(summary.total_population, 50_000);
    assert_eq!(summary.pending_biometric_updates, 750);
    assert_eq!(summary.avg_alhs, 49.0);
    assert_eq!(summary.system_health, 51.0);
}

#[test]
fn summary_can_be_scoped_to_a_state() {
    let table = sample_table();
    let bihar = aggregate::summary(&table, &StateFilter::only("Bihar"));
    assert_eq!(bihar.total_districts, 2);
    assert_eq!(bihar.avg_alhs, 72.5);

    let everyone = aggregate::summary(&table, &StateFilter::from_param(Some("All India".into())));
    assert_eq!(everyone.total_districts, 5);
}

#[test]
fn empty_table_yields_identity_aggregates() {
    let table = table(Vec::new());

    let summary = aggregate::summary(&table, &StateFilter::all());
    assert_eq!(summary.total_districts, 0);
    assert_eq!(summary.avg_alhs, 0.0);
    assert_eq!(summary.total_flags, 0);
    assert!(summary.category_counts.iter().all(|entry| entry.count == 0));

    assert!(aggregate::state_rollup(&table).is_empty());
    assert_eq!(
        aggregate::top_districts(&table, RankLimit::default(), &StateFilter::all()).count,
        0
    );
    assert!(aggregate::risk_distribution(&table, &StateFilter::all())
        .entries
        .is_empty());
    assert!(aggregate::correlation_matrix(&table).is_empty());
    assert!(aggregate::state_names(&table).is_empty());
}

#[test]
fn classification_scenario_matches_tiers() {
    let table = table(vec![
        record("A", "Kerala", 10.0, flagged(0)),
        record("B", "Kerala", 55.0, flagged(0)),
        record("C", "Kerala", 80.0, flagged(0)),
    ]);
    let categories: Vec<RiskCategory> = table
        .records()
        .iter()
        .map(|record| record.risk_category)
        .collect();
    assert_eq!(
        categories,
        vec![
            RiskCategory::Low,
            RiskCategory::Medium,
            RiskCategory::Critical
        ]
    );
}

#[test]
fn distribution_percentages_sum_to_one_hundred() {
    let table = table(vec![
        record("A", "Kerala", 10.0, flagged(0)),
        record("B", "Kerala", 20.0, flagged(0)),
        record("C", "Kerala", 50.0, flagged(0)),
    ]);
    let distribution = aggregate::risk_distribution(&table, &StateFilter::all());

    assert_eq!(distribution.total_districts, 3);
    let categories: Vec<RiskCategory> = distribution
        .entries
        .iter()
        .map(|entry| entry.category)
        .collect();
    assert_eq!(categories, vec![RiskCategory::Low, RiskCategory::Medium]);
    assert_eq!(distribution.entries[0].percentage, 66.67);
    assert_eq!(distribution.entries[1].percentage, 33.33);
    assert!((distribution.percentage_total() - 100.0).abs() <= 0.01);
}

#[test]
fn state_rollup_sorts_by_mean_and_preserves_counts() {
    let table = sample_table();
    let rollup = aggregate::state_rollup(&table);

    let states: Vec<&str> = rollup.iter().map(|entry| entry.state.as_str()).collect();
    assert_eq!(states, vec!["Bihar", "Kerala", "Assam"]);
    assert_eq!(
        rollup.iter().map(|entry| entry.district_count).sum::<usize>(),
        table.len()
    );

    let bihar = &rollup[0];
    assert_eq!(bihar.avg_alhs, 72.5);
    assert_eq!(bihar.total_flags, 3);
    assert_eq!(bihar.critical_count, 1);
    assert_eq!(bihar.population, 20_000);

    assert_eq!(
        aggregate::state_names(&table),
        vec!["Assam".to_string(), "Bihar".to_string(), "Kerala".to_string()]
    );
}

#[test]
fn flag_summary_counts_each_flag_and_multi_flag_districts() {
    let table = sample_table();
    let flags = aggregate::flag_summary(&table, &StateFilter::all());

    assert_eq!(flags.low_child_compliance, 3);
    assert_eq!(flags.infra_stress, 2);
    assert_eq!(flags.catchup_spike, 1);
    assert_eq!(flags.future_surge, 0);
    assert_eq!(flags.total_flags, 6);
    assert_eq!(flags.districts_with_multiple_flags, 2);
}

#[test]
fn district_listing_applies_every_filter() {
    let table = sample_table();

    let query = DistrictQuery {
        state: StateFilter::only("Kerala"),
        min_alhs: Some(50.0),
        ..DistrictQuery::default()
    };
    let kerala = aggregate::list_districts(&table, &query);
    assert_eq!(kerala.len(), 1);
    assert_eq!(kerala[0].district_id, "C");

    let query = DistrictQuery {
        risk_category: Some(RiskCategory::Low),
        ..DistrictQuery::default()
    };
    let low: Vec<String> = aggregate::list_districts(&table, &query)
        .into_iter()
        .map(|view| view.district_id)
        .collect();
    assert_eq!(low, vec!["A".to_string(), "D".to_string()]);

    let query = DistrictQuery {
        limit: Some(2),
        ..DistrictQuery::default()
    };
    let views = aggregate::list_districts(&table, &query);
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].district_id, "B");
    assert_eq!(views[0].flags_count, 3);
}

#[test]
fn correlation_matrix_is_symmetric_with_unit_diagonal() {
    let table = sample_table();
    let matrix = aggregate::correlation_matrix(&table);

    for row in CorrelationMetric::ordered() {
        assert_eq!(matrix.get(row, row), Some(1.0));
        for column in CorrelationMetric::ordered() {
            let forward = matrix.get(row, column).expect("value present");
            let backward = matrix.get(column, row).expect("value present");
            assert!((forward - backward).abs() < 1e-12);
            assert!((-1.0..=1.0).contains(&forward));
        }
    }

    // ehi falls as alhs rises, bci tracks it, dsi is constant.
    let ehi_alhs = matrix
        .get(CorrelationMetric::Ehi, CorrelationMetric::Alhs)
        .expect("value present");
    assert!((ehi_alhs + 1.0).abs() < 1e-9);
    let bci_alhs = matrix
        .get(CorrelationMetric::Bci, CorrelationMetric::Alhs)
        .expect("value present");
    assert!((bci_alhs - 1.0).abs() < 1e-9);
    assert_eq!(
        matrix.get(CorrelationMetric::Dsi, CorrelationMetric::Ehi),
        Some(0.0)
    );
}

#[test]
fn lookup_returns_none_for_unknown_ids() {
    let table = sample_table();
    assert_eq!(table.get("B").map(|record| record.alhs), Some(90.0));
    assert!(table.get("Z").is_none());
}
