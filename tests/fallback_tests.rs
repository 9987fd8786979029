use endpoint_scout::errors::ResolveError;
use endpoint_scout::fallback::FallbackList;
use test_utils::addr;

mod test_utils;

#[test]
fn test_cap_keeps_five_most_recent() {
    let mut list = FallbackList::new(5);
    for host in 1..=6 {
        list.record_success(addr(&format!("192.168.1.{}", host)));
    }

    assert_eq!(list.len(), 5);
    assert_eq!(
        list.list(),
        &[
            addr("192.168.1.6"),
            addr("192.168.1.5"),
            addr("192.168.1.4"),
            addr("192.168.1.3"),
            addr("192.168.1.2"),
        ]
    );
}

#[test]
fn test_reconfirmed_address_moves_to_front() {
    let mut list = FallbackList::with_entries(
        [addr("10.0.0.1"), addr("10.0.0.2"), addr("10.0.0.3")],
        5,
    );

    list.record_success(addr("10.0.0.3"));

    assert_eq!(
        list.list(),
        &[addr("10.0.0.3"), addr("10.0.0.1"), addr("10.0.0.2")]
    );
}

#[test]
fn test_with_entries_drops_duplicates_and_trims() {
    let list = FallbackList::with_entries(
        ["10.0.0.1", "10.0.0.1", "10.0.0.2", "10.0.0.3"].map(addr),
        2,
    );

    assert_eq!(list.list(), &[addr("10.0.0.1"), addr("10.0.0.2")]);
}

#[test]
fn test_builtin_list_is_nonempty_and_bounded() {
    let list = FallbackList::builtin(5);
    assert!(!list.is_empty());
    assert!(list.len() <= 5);
}

#[test]
fn test_save_then_load_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fallbacks.json");
    let mut list = FallbackList::new(5);
    list.record_success(addr("192.168.0.7"));
    list.record_success(addr("localhost"));

    list.save(&path).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    let loaded = FallbackList::load(&path, 5).unwrap();

    assert!(raw.contains("\"localhost\""));
    assert_eq!(loaded, list);
}

#[test]
fn test_missing_file_uses_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let list = FallbackList::load_or_builtin(&dir.path().join("absent.json"), 5);

    assert_eq!(list, FallbackList::builtin(5));
}

#[test]
fn test_malformed_entries_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fallbacks.json");
    std::fs::write(&path, r#"["192.168.1.300"]"#).unwrap();

    assert!(matches!(
        FallbackList::load(&path, 5),
        Err(ResolveError::Serialization(_))
    ));
}
