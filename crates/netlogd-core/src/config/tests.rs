use crate::config::{global_schema, ConfigParseOutcome, ConfigParser, TomlConfigParser};

#[test]
fn global_section_applies_defaults_when_absent() {
    let parser = TomlConfigParser::from_str("").unwrap();
    // No [global] table at all -> section missing, caller falls back to defaults.
    let err = parser.parse_section("global", &global_schema()).unwrap_err();
    assert_eq!(err, ConfigParseOutcome::SectionMissing);
}

#[test]
fn global_section_parses_multi_valued_callback_entries_in_order() {
    let raw = r#"
        [global]
        logfile = "/tmp/custom.log"
        loglevel = 1
        plugin = ["/lib/netlogd/SRC.so", "/lib/netlogd/SINK.so"]
        stack = ["a:SRC,b:SINK"]
    "#;
    let parser = TomlConfigParser::from_str(raw).unwrap();
    let section = parser.parse_section("global", &global_schema()).unwrap();

    assert_eq!(section.get_str("logfile"), Some("/tmp/custom.log"));
    assert_eq!(section.get_int("loglevel"), Some(1));
    assert_eq!(section.get_all("plugin").len(), 2);
    assert_eq!(section.get_all("stack").len(), 1);
}

#[test]
fn unknown_key_is_rejected() {
    let raw = r#"
        [global]
        bogus = 1
    "#;
    let parser = TomlConfigParser::from_str(raw).unwrap();
    let err = parser.parse_section("global", &global_schema()).unwrap_err();
    assert_eq!(err, ConfigParseOutcome::UnknownKey { key: "bogus".to_string() });
}

#[test]
fn single_valued_entry_rejects_duplicates() {
    use crate::config::{ConfigEntry, ConfigOptions, ConfigValueKind};
    let raw = r#"
        [section]
        key = [1, 2]
    "#;
    let parser = TomlConfigParser::from_str(raw).unwrap();
    let schema = vec![ConfigEntry::new("key", ConfigValueKind::Int, ConfigOptions::empty())];
    let err = parser.parse_section("section", &schema).unwrap_err();
    assert_eq!(err, ConfigParseOutcome::DuplicateNotAllowed { key: "key".to_string() });
}

#[test]
fn mandatory_missing_is_reported() {
    use crate::config::{ConfigEntry, ConfigOptions, ConfigValueKind};
    let raw = r#"
        [section]
        other = 1
    "#;
    let parser = TomlConfigParser::from_str(raw).unwrap();
    let schema = vec![
        ConfigEntry::new("needed", ConfigValueKind::Int, ConfigOptions::MANDATORY),
        ConfigEntry::new("other", ConfigValueKind::Int, ConfigOptions::empty()),
    ];
    let err = parser.parse_section("section", &schema).unwrap_err();
    assert_eq!(err, ConfigParseOutcome::MandatoryMissing { key: "needed".to_string() });
}
