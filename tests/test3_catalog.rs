use course_sync::controller::catalog::{
    CollisionPolicy, CourseCatalog, CourseNameNormalizer, prefix_key,
};
use course_sync::error::CatalogError;
use std::io::Write;

fn pga_normalizer() -> CourseNameNormalizer {
    CourseNameNormalizer::new(CourseCatalog::default_pga(CollisionPolicy::LastWins).unwrap())
}

#[test]
fn test3_prefix_match_resolves_to_canonical() {
    let mut normalizer = pga_normalizer();
    assert_eq!(
        normalizer.normalize("Augusta National Golf Club Amateur"),
        ("Augusta National Golf Club".to_string(), true)
    );
    assert_eq!(
        normalizer.normalize("augusta national"),
        ("Augusta National Golf Club".to_string(), true)
    );
}

#[test]
fn test3_miss_passes_raw_name_through() {
    let mut normalizer = pga_normalizer();
    assert_eq!(
        normalizer.normalize("Unknown Golf Course XYZ"),
        ("Unknown Golf Course XYZ".to_string(), false)
    );
    normalizer.normalize("Unknown Golf Course XYZ");
    normalizer.normalize("Augusta National Golf Club");
    let report = normalizer.report();
    assert_eq!(report.matched, 1);
    assert_eq!(report.unmatched, 2);
    assert_eq!(report.unmatched_names, vec!["Unknown Golf Course XYZ".to_string()]);
}

#[test]
fn test3_prefix_counts_characters_not_bytes() {
    assert_eq!(prefix_key("Château de Golf"), "château ");
    assert_eq!(prefix_key("TPC"), "tpc");
}

#[test]
fn test3_collision_policies() {
    let names = ["Sea Island (Plantation)", "Sea Island (Seaside)", "Riviera"];
    let catalog = CourseCatalog::from_names(names, CollisionPolicy::LastWins).unwrap();
    assert_eq!(catalog.lookup("Sea Islands"), Some("Sea Island (Seaside)"));
    assert_eq!(catalog.collisions().len(), 1);
    assert_eq!(catalog.collisions()[0].shadowed, "Sea Island (Plantation)");

    match CourseCatalog::from_names(names, CollisionPolicy::Reject) {
        Err(CatalogError::PrefixCollision { prefix, first, second }) => {
            assert_eq!(prefix, "sea isla");
            assert_eq!(first, "Sea Island (Plantation)");
            assert_eq!(second, "Sea Island (Seaside)");
        }
        other => panic!("expected a collision, got {other:?}"),
    }
}

#[test]
fn test3_catalog_file_skips_blanks_and_comments() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# home courses\nPebble Beach Golf Links\n\n  Spyglass Hill  \n").unwrap();
    let catalog = CourseCatalog::from_file(file.path(), CollisionPolicy::Reject).unwrap();
    assert_eq!(catalog.names(), ["Pebble Beach Golf Links", "Spyglass Hill"]);
    assert_eq!(catalog.lookup("Pebble Beach (host)"), Some("Pebble Beach Golf Links"));
}

#[test]
fn test3_unreadable_catalog_file() {
    let missing = std::path::Path::new("/no/such/catalog.txt");
    assert!(matches!(
        CourseCatalog::from_file(missing, CollisionPolicy::LastWins),
        Err(CatalogError::Unreadable { .. })
    ));
}
