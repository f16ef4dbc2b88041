use boroughstats_core::{Metric, Mobility, Record, WindowSummary, summarize};
use chrono::NaiveDate;

#[test]
fn record_serialization_uses_expected_wire_fields() {
    let record = Record::new(NaiveDate::from_ymd_opt(2022, 1, 4).unwrap(), "Hackney")
        .with_cases(Some(12), Some(3400))
        .with_deaths(None, Some(250))
        .with_mobility(Mobility {
            parks: Some(-18),
            ..Mobility::default()
        });

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["date"], "2022-01-04");
    assert_eq!(json["region"], "Hackney");
    assert_eq!(json["new_cases"], 12);
    assert!(json["new_deaths"].is_null());
    assert_eq!(json["total_deaths"], 250);
    assert_eq!(json["mobility"]["parks"], -18);
    assert!(json["mobility"]["transit"].is_null());
}

#[test]
fn metric_names_are_snake_case_on_the_wire() {
    assert_eq!(serde_json::to_value(Metric::TotalDeaths).unwrap(), "total_deaths");
    assert_eq!(Metric::RetailRecreation.as_str(), "retail_recreation");
}

#[test]
fn window_summary_is_tagged_by_status() {
    let no_data = serde_json::to_value(WindowSummary::NoData).unwrap();
    assert_eq!(no_data["status"], "no_data");

    let record = Record::new(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(), "Hackney")
        .with_deaths(None, Some(5));
    let stats = serde_json::to_value(summarize(&[&record])).unwrap();
    assert_eq!(stats["status"], "stats");
    assert_eq!(stats["sum_total_deaths"], 5);
    assert!(stats["mean_total_cases"].is_null());
}
