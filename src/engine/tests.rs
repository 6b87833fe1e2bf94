use crate::{
    ConvertOptions, ConvertOutput, ConverterOptions, CountryConverter, Resolution, Value, default_converter,
};
use crate::test_log::capture_warnings;
use proptest::prelude::*;

fn cc() -> &'static CountryConverter {
    default_converter().unwrap()
}

fn convert_one(name: &str, options: &ConvertOptions) -> Resolution {
    match cc().convert(name, options).unwrap() {
        ConvertOutput::Single(r) => r,
        other => panic!("expected a single result for {name:?}, got {other:?}"),
    }
}

#[test]
fn conversion_examples() {
    // (input, src, to, expected rendering)
    let cases: Vec<(&str, Option<&str>, &str, &str)> = vec![
        ("NA", None, "ISO3", "NAM"),
        ("na", None, "name_short", "Namibia"),
        ("UK", None, "ISO2", "GB"),
        ("GB", None, "ISO3", "GBR"),
        ("EL", None, "ISO3", "GRC"),
        ("40", None, "ISO2", "AT"),
        ("040", None, "ISO3", "AUT"),
        ("276", None, "name_short", "Germany"),
        ("DEU", None, "name_short", "Germany"),
        ("deu", None, "continent", "Europe"),
        ("Kosovo", None, "ISOnumeric", "412"),
        ("Congo", None, "ISO3", "COG"),
        ("Republic of Congo", None, "ISO3", "COG"),
        ("Congo-Brazzaville", None, "ISO3", "COG"),
        ("Democratic Republic of the Congo", None, "ISO3", "COD"),
        ("Zaire", None, "ISO3", "COD"),
        ("Niger", None, "ISO3", "NER"),
        ("Nigeria", None, "ISO3", "NGA"),
        ("united_states", None, "ISO3", "USA"),
        ("U.S.A.", None, "ISO3", "USA"),
        ("Great Britain", None, "ISO3", "GBR"),
        ("Federal Republic of Germany", None, "ISO3", "DEU"),
        ("The Swedish Kingdom", None, "ISO3", "SWE"),
        ("Taiwan", None, "ISO3", "TWN"),
        ("Republic of China", None, "ISO3", "TWN"),
        ("People's Republic of China", None, "ISO3", "CHN"),
        ("Österreich", None, "ISO3", "AUT"),
        ("Türkiye", None, "ISO3", "TUR"),
        ("South Korea", None, "ISO3", "KOR"),
        ("DPRK", None, "ISO3", "PRK"),
        ("Japan", None, "UNcode", "392"),
        ("Japan", None, "OECD", "1964"),
        ("Germany", Some("regex"), "EU", "1958"),
        ("Asia excluding China", Some("continent"), "continent", "Asia"),
        ("Japan w/o Okinawa", None, "ISO2", "JP"),
        ("abc", Some("regex"), "ISO3", "not found"),
        ("USSR", None, "ISO3", "not found"),
        ("Germany", Some("name_short"), "iso3", "DEU"),
        ("Germany", Some("short"), "ISO3", "DEU"),
        ("Hellenic Republic", Some("long"), "ISO2", "GR"),
        ("40", Some("UNnumeric"), "ISO3", "AUT"),
    ];

    for (input, src, to, expected) in cases {
        let mut options = ConvertOptions::default().with_to(to);
        if let Some(src) = src {
            options = options.with_src(src);
        }
        let got = convert_one(input, &options);
        assert_eq!(got.to_string(), expected, "convert({input:?}, src={src:?}, to={to})");
    }
}

#[test]
fn not_found_fill_policy() {
    let echo = ConvertOptions::default().with_src("regex").with_not_found(None);
    assert_eq!(convert_one("abc", &echo), "abc");
    let empty = ConvertOptions::default().with_not_found(Some(""));
    assert_eq!(convert_one("Atlantis excluding Crete", &empty), "Atlantis");
    let custom = ConvertOptions::default().with_not_found(Some("XXX"));
    assert_eq!(convert_one("Atlantis", &custom), "XXX");
}

#[test]
fn numeric_targets_are_integers() {
    assert_eq!(convert_one("Austria", &ConvertOptions::default().with_to("ISOnumeric")), 40);
    assert_eq!(convert_one("AT", &ConvertOptions::default().with_to("EU")), 1995);
}

#[test]
fn missing_target_value() {
    let r = convert_one("Taiwan", &ConvertOptions::default().with_to("UNcode"));
    assert_eq!(r, Resolution::One(Value::Missing));
}

#[test]
fn exact_scheme_collects_all_rows() {
    let options = ConvertOptions::default().with_src("continent").with_to("ISO3");
    let r = convert_one("Oceania", &options);
    assert_eq!(r, Resolution::Many(vec![Value::from("AUS"), Value::from("NZL")]));
}

#[test]
fn enforced_lists() {
    let options = ConvertOptions::default().with_enforce_list(true);
    let out = cc().convert(vec!["Austria", "xyz"], &options).unwrap();
    assert_eq!(
        out,
        ConvertOutput::Batch(vec![
            Resolution::Many(vec![Value::from("AUT")]),
            Resolution::Many(vec![Value::from("not found")]),
        ])
    );
}

#[test]
fn batch_keeps_input_order() {
    let out = cc().convert(vec!["JP", "276", "Chile"], &ConvertOptions::default()).unwrap();
    assert_eq!(out.to_string(), "JPN DEU CHL");
}

#[test]
fn integer_inputs() {
    assert_eq!(cc().convert(840_i64, &ConvertOptions::default()).unwrap(), "USA");
    let out = cc().convert(vec![40_i64, 392], &ConvertOptions::default().with_to("ISO2")).unwrap();
    assert_eq!(out.to_string(), "AT JP");
}

#[test]
fn unknown_schemes() {
    let err = cc().convert("Austria", &ConvertOptions::default().with_to("abc")).unwrap_err();
    assert_eq!(err.to_string(), "abc is not a valid country classification");
    let err = cc().convert("Austria", &ConvertOptions::default().with_src("xyz")).unwrap_err();
    assert_eq!(err.to_string(), "xyz is not a valid country classification");
}

#[test]
fn custom_exclusion_markers() {
    let options = ConvertOptions::default().with_src("continent").with_to("continent").with_exclude_prefix(&["but"]);
    assert_eq!(convert_one("Europe but not Norway", &options), "Europe");
    let bad = ConvertOptions::default().with_exclude_prefix(&["("]);
    assert!(cc().convert("Austria", &bad).is_err());
}

#[test]
fn obsolete_rows_on_request() {
    let cc = CountryConverter::with_options(ConverterOptions::default().with_include_obsolete(true)).unwrap();
    assert_eq!(cc.convert("USSR", &ConvertOptions::default()).unwrap(), "SUN");
    assert_eq!(cc.convert("Yugoslavia", &ConvertOptions::default()).unwrap(), "YUG");
}

#[test]
fn every_name_resolves_to_its_own_row() {
    let table = cc().data();
    let short = table.column_index("name_short").unwrap();
    let official = table.column_index("name_official").unwrap();
    let options = ConvertOptions::default().with_src("regex").with_to("name_short");
    for row in table.rows() {
        for col in [short, official] {
            let name = row.get(col).to_string();
            let got = convert_one(&name, &options);
            assert_eq!(&got, &Resolution::One(row.get(short).clone()), "name {name:?}");
        }
    }
}

#[test]
fn unmatched_names_are_logged() {
    let (got, log) = capture_warnings(|| convert_one("abc", &ConvertOptions::default().with_src("regex")));
    assert_eq!(got, "not found");
    assert!(log.contains("WARN"), "log: {log}");
    assert!(log.contains("abc not found in regex"), "log: {log}");

    let (_, log) = capture_warnings(|| convert_one("XX", &ConvertOptions::default()));
    assert!(log.contains("XX not found in ISO2"), "log: {log}");
}

#[test]
fn multiple_pattern_matches_are_logged() {
    let (got, log) = capture_warnings(|| convert_one("Germany Austria", &ConvertOptions::default()));
    assert_eq!(got, Resolution::Many(vec![Value::from("AUT"), Value::from("DEU")]));
    assert!(log.contains("More than one pattern match for Germany Austria"), "log: {log}");
}

#[test]
fn single_matches_log_nothing() {
    let (_, log) = capture_warnings(|| convert_one("Austria", &ConvertOptions::default()));
    assert!(log.is_empty(), "log: {log}");
}

#[test]
fn empty_head_skips_the_pattern_scan() {
    let (got, log) = capture_warnings(|| convert_one("without anything", &ConvertOptions::default()));
    assert_eq!(got, "not found");
    assert!(log.contains(" not found in regex"), "log: {log}");
    let trace = cc().convert_verbose("excluding all", &ConvertOptions::default()).unwrap();
    let name = &trace.details.names[0];
    assert!(name.rows.is_empty());
    assert!(name.flags.contains(crate::MatchFlags::PATTERN));
}

proptest! {
    #[test]
    fn iso3_iso2_round_trip(row in 0usize..40) {
        let iso3 = cc().data().value(row, cc().data().column_index("ISO3").unwrap()).to_string();
        let iso2 = convert_one(&iso3, &ConvertOptions::default().with_src("ISO3").with_to("ISO2")).to_string();
        let back = convert_one(&iso2, &ConvertOptions::default().with_src("ISO2").with_to("ISO3"));
        prop_assert_eq!(back.to_string(), iso3);
    }

    #[test]
    fn conversion_is_idempotent(
        row in 0usize..40,
        scheme in prop::sample::select(vec!["ISO2", "ISO3", "name_short", "continent", "ISOnumeric"]),
    ) {
        let name = cc().data().value(row, 0).to_string();
        let once = convert_one(&name, &ConvertOptions::default().with_to(scheme));
        let again = convert_one(&once.to_string(), &ConvertOptions::default().with_src(scheme).with_to(scheme));
        prop_assert_eq!(again, once);
    }

    #[test]
    fn arbitrary_text_never_errors(name in "\\PC{0,24}") {
        prop_assert!(cc().convert(name.as_str(), &ConvertOptions::default()).is_ok());
    }
}
