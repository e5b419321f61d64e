use super::*;

struct Blank;

impl TextureOperator for Blank {
    fn execute(&mut self, _output: &mut CookOutput<'_>, _inputs: &CookInputs<'_>) {}
}

#[test]
fn defaults_are_no_ops() {
    let mut op = Blank;
    let mut settings = GeneralSettings::default();
    op.general_settings(&mut settings);
    assert_eq!(settings, GeneralSettings::default());
    assert!(op.output_format(&OutputFormat::default()).is_none());
    assert_eq!(op.info_channel_count(), 0);
    assert!(op.info_channel(0).is_none());
    assert!(op.info_table_size().is_none());
    assert!(op.warning().is_none());
    assert!(op.error().is_none());
    assert!(op.info_popup().is_none());
}

#[test]
fn fn_factory_reports_version_and_creates() {
    let f = FnFactory::new(|_info: &NodeInfo| Some(Box::new(Blank) as Box<dyn TextureOperator>));
    assert_eq!(f.api_version(), API_VERSION);
    assert!(f.create(&NodeInfo::new("/project1/op1", 1)).is_some());

    let old = FnFactory::new(|_info: &NodeInfo| None).with_version(2);
    assert_eq!(old.api_version(), 2);
    assert!(old.create(&NodeInfo::new("/project1/op2", 2)).is_none());
}

#[test]
fn info_table_orientation() {
    let rows = InfoTableSize::by_rows(3, 2);
    assert_eq!((rows.fill_calls(), rows.entries_per_call()), (3, 2));
    let cols = InfoTableSize::by_columns(3, 2);
    assert_eq!((cols.fill_calls(), cols.entries_per_call()), (2, 3));
}

#[test]
fn table_entries_ignore_out_of_range() {
    let mut e = InfoTableEntries::new(2);
    e.set(0, "a");
    e.set(5, "z");
    assert_eq!(e.len(), 2);
    assert_eq!(e.into_values(), vec!["a".to_string(), String::new()]);
}
