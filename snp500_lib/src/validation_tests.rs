use super::*;

// -- Date validation --

#[test]
fn date_valid() {
    assert_eq!(
        validate_date("2015-09-15").unwrap(),
        NaiveDate::from_ymd_opt(2015, 9, 15).unwrap()
    );
}

#[test]
fn date_trims_whitespace() {
    assert_eq!(
        validate_date("  2014-08-01 ").unwrap(),
        NaiveDate::from_ymd_opt(2014, 8, 1).unwrap()
    );
}

#[test]
fn date_wrong_format() {
    assert!(validate_date("09/15/2015").is_err());
}

#[test]
fn date_impossible_day() {
    assert!(validate_date("2015-02-30").is_err());
}

#[test]
fn query_date_defaults_when_omitted() {
    assert_eq!(validate_query_date(None).unwrap(), DEFAULT_QUERY_DATE);
}

#[test]
fn query_date_uses_given_value() {
    assert_eq!(
        validate_query_date(Some("2014-08-01")).unwrap(),
        NaiveDate::from_ymd_opt(2014, 8, 1).unwrap()
    );
    assert!(validate_query_date(Some("2014/08/01")).is_err());
}

#[test]
fn date_empty() {
    let err = validate_date("").unwrap_err();
    assert!(matches!(err, Snp500Error::InvalidInput(_)));
}

// -- Date range validation --

#[test]
fn range_ordered() {
    let from = NaiveDate::from_ymd_opt(2014, 8, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2015, 9, 15).unwrap();
    assert!(validate_date_range(from, to).is_ok());
}

#[test]
fn range_same_day() {
    let day = NaiveDate::from_ymd_opt(2015, 9, 15).unwrap();
    assert!(validate_date_range(day, day).is_ok());
}

#[test]
fn range_reversed() {
    let from = NaiveDate::from_ymd_opt(2015, 9, 15).unwrap();
    let to = NaiveDate::from_ymd_opt(2014, 8, 1).unwrap();
    assert!(validate_date_range(from, to).is_err());
}

// -- Year validation --

#[test]
fn year_valid() {
    assert_eq!(validate_year(2012).unwrap(), 2012);
    assert_eq!(validate_year(FIRST_INDEX_YEAR).unwrap(), FIRST_INDEX_YEAR);
}

#[test]
fn year_too_early() {
    assert!(validate_year(1956).is_err());
}

#[test]
fn year_in_future() {
    let next = Utc::now().date_naive().year() + 1;
    assert!(validate_year(next).is_err());
}
