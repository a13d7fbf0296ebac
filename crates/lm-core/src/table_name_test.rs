use super::*;

#[test]
fn test_parse_unqualified() {
    let name = TableName::parse("schema_migrations").unwrap();
    assert_eq!(name.schema(), None);
    assert_eq!(name.table(), "schema_migrations");
    assert_eq!(name.quoted(), r#""schema_migrations""#);
    assert_eq!(name.quoted_sequence(), r#""schema_migrations_id_seq""#);
    assert_eq!(
        name.quoted_filename_index(),
        r#""schema_migrations_filename_idx""#
    );
}

#[test]
fn test_parse_qualified() {
    let name = TableName::parse("lims.migrations").unwrap();
    assert_eq!(name.schema(), Some("lims"));
    assert_eq!(name.table(), "migrations");
    assert_eq!(name.quoted(), r#""lims"."migrations""#);
    assert_eq!(name.quoted_sequence(), r#""lims"."migrations_id_seq""#);
    assert_eq!(name.sequence_name(), "lims.migrations_id_seq");
    assert_eq!(name.to_string(), "lims.migrations");
}

#[test]
fn test_parse_rejects_bad_names() {
    for bad in [
        "",
        "a.b.c",
        ".migrations",
        "lims.",
        "1migrations",
        "mig-rations",
        "migrations; DROP TABLE animals",
        r#"mig"rations"#,
    ] {
        assert!(
            matches!(
                TableName::parse(bad),
                Err(CoreError::InvalidTableName { .. })
            ),
            "expected '{bad}' to be rejected"
        );
    }
}

#[test]
fn test_default_table_name() {
    assert_eq!(TableName::default().to_string(), DEFAULT_TABLE_NAME);
}

#[test]
fn test_quote_ident_escapes_quotes() {
    assert_eq!(quote_ident("users"), r#""users""#);
    assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
}

#[test]
fn test_serde_roundtrip_through_string() {
    let name: TableName = serde_yaml::from_str("lims.migrations").unwrap();
    assert_eq!(name.schema(), Some("lims"));
    let yaml = serde_yaml::to_string(&name).unwrap();
    assert_eq!(yaml.trim(), "lims.migrations");
    assert!(serde_yaml::from_str::<TableName>("'bad name'").is_err());
}
