use boroughstats_core::{
    parse_csv, CsvFileSource, LoadError, RecordRepository, RecordSource, RepoError,
};
use chrono::NaiveDate;
use std::io::Write;

const HEADER: &str = "date,borough,retail_recreation_GMR,grocery_pharmacy_GMR,parks_GMR,transit_GMR,workplaces_GMR,residential_GMR,new_cases,total_cases,new_deaths,total_deaths";

fn write_csv(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    write!(file, "{body}").unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_rows_in_source_order() {
    let file = write_csv(
        "2022-01-02,Camden,-10,5,20,-30,-40,8,12,3400,1,250\n\
         2022-01-01,Brent,,,,,,,7,2000,0,300\n",
    );

    let mut repo = RecordRepository::new();
    assert_eq!(repo.load(&CsvFileSource::new(file.path())).unwrap(), 2);

    let records = repo.records().unwrap();
    assert_eq!(records[0].region, "Camden");
    assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2022, 1, 2).unwrap());
    assert_eq!(records[0].mobility.transit, Some(-30));
    assert_eq!(records[0].total_deaths, Some(250));
    assert_eq!(records[1].region, "Brent");
    assert_eq!(records[1].mobility.parks, None);
    assert_eq!(records[1].new_deaths, Some(0));
}

#[test]
fn missing_cells_and_legacy_marker_become_unknown() {
    let records = parse_csv(
        format!("{HEADER}\n2022-01-01,Camden,1,2,3,4,5,6,-1,,-1,\n").as_bytes(),
    )
    .unwrap();
    let record = &records[0];
    assert_eq!(record.new_cases, None);
    assert_eq!(record.total_cases, None);
    assert_eq!(record.new_deaths, None);
    assert_eq!(record.total_deaths, None);
    assert_eq!(record.mobility.residential, Some(6));
}

#[test]
fn optional_columns_may_be_absent() {
    let records = parse_csv("borough,date\nHackney,2022-02-01\n".as_bytes()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].region, "Hackney");
    assert_eq!(records[0].total_deaths, None);
    assert_eq!(records[0].average_mobility(), None);
}

#[test]
fn structural_problems_are_load_errors() {
    assert!(matches!(parse_csv("".as_bytes()), Err(LoadError::MissingHeader)));
    assert!(matches!(
        parse_csv("borough,new_cases\nCamden,1\n".as_bytes()),
        Err(LoadError::MissingColumn("date"))
    ));
    assert!(matches!(
        parse_csv("date,new_cases\n2022-01-01,1\n".as_bytes()),
        Err(LoadError::MissingColumn("borough"))
    ));

    let err = parse_csv("date,borough,new_cases\n2022-01-01,Camden\n".as_bytes()).unwrap_err();
    assert!(matches!(err, LoadError::Malformed { line: 2, .. }), "{err}");

    let err = parse_csv("date,borough\n01/02/2022,Camden\n".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("invalid date"), "{err}");

    let err = parse_csv("date,borough,total_deaths\n2022-01-01,Camden,-5\n".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("negative count"), "{err}");
}

#[test]
fn unreadable_source_leaves_repository_unusable() {
    let dir = tempfile::tempdir().unwrap();
    let source = CsvFileSource::new(dir.path().join("missing.csv"));
    assert!(source.describe().contains("missing.csv"));

    let mut repo = RecordRepository::new();
    let err = repo.load(&source).unwrap_err();
    assert!(matches!(err, RepoError::Load(LoadError::Io(_))));
    assert!(matches!(repo.regions(), Err(RepoError::NotLoaded)));
    assert!(matches!(
        repo.filter_by_region("Camden", false),
        Err(RepoError::NotLoaded)
    ));
}
