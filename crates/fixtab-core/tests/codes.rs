use fixtab_core::{FixtabError, RecordId, Width, DEVICE_CODE_THRESHOLD, RW_OK};

#[test]
fn test_reserved_codes() {
    assert_eq!(FixtabError::UnknownRecord.code(), -1);
    assert_eq!(FixtabError::RecordTooLarge.code(), -2);
    assert_eq!(FixtabError::AddressOutOfRange.code(), -3);
    assert_eq!(FixtabError::Checksum.code(), -4);
    assert_eq!(FixtabError::RecordTableCorrupt.code(), -5);
    assert_eq!(FixtabError::LowLevelWrite.code(), -10);
    assert_eq!(FixtabError::LowLevelRead.code(), -11);
    assert_eq!(FixtabError::Busy.code(), -12);
}

#[test]
fn test_code_mapping_is_reversible() {
    let all = [
        FixtabError::UnknownRecord,
        FixtabError::RecordTooLarge,
        FixtabError::AddressOutOfRange,
        FixtabError::Checksum,
        FixtabError::RecordTableCorrupt,
        FixtabError::LowLevelWrite,
        FixtabError::LowLevelRead,
        FixtabError::Device(-42),
        FixtabError::Busy,
    ];
    for err in all {
        assert_eq!(FixtabError::from_code(err.code()), Some(Err(err)));
    }
    assert_eq!(FixtabError::from_code(RW_OK), Some(Ok(())));
}

#[test]
fn test_unreserved_codes_rejected() {
    // Gap between reserved kinds and the device range.
    assert_eq!(FixtabError::from_code(-15), None);
    assert_eq!(FixtabError::from_code(DEVICE_CODE_THRESHOLD), None);
    assert_eq!(FixtabError::from_code(7), None);
}

#[test]
fn test_device_fallback() {
    assert_eq!(
        FixtabError::device(-33, FixtabError::LowLevelWrite),
        FixtabError::Device(-33)
    );
    assert_eq!(
        FixtabError::device(-3, FixtabError::LowLevelWrite),
        FixtabError::LowLevelWrite
    );
}

#[test]
fn test_display_carries_code() {
    let text = format!("{}", FixtabError::Checksum);
    assert!(text.contains("checksum"));
    assert!(text.contains("-4"));
    assert_eq!(format!("{}", RecordId(3)), "#3");
}

#[test]
fn test_width_limits() {
    assert_eq!(Width::U8.max(), 255);
    assert_eq!(Width::U16.max(), 65_535);
    assert_eq!(Width::fitting(39), Width::U8);
    assert_eq!(Width::fitting(2047), Width::U16);
    assert_eq!(Width::fitting(70_000), Width::U32);
}
