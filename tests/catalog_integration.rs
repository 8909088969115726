use std::fs;

use musicquiz::language::{self, LANGUAGE_KEY};
use musicquiz::{
    Catalog, CatalogError, DirectorySource, FilePreferences, Language, PreferenceStore,
    demo_pieces,
};

fn write_catalog(dir: &std::path::Path, language: Language) {
    let serialized =
        serde_json::to_string(&demo_pieces(language)).expect("pieces should serialize to JSON");
    fs::write(dir.join(format!("music.{}.json", language.code())), serialized)
        .expect("catalog file should be written");
}

#[test]
fn language_preference_drives_initial_catalog() {
    let root = tempfile::tempdir().expect("temporary directory should be created");
    write_catalog(root.path(), Language::Ja);
    write_catalog(root.path(), Language::En);
    let prefs_path = root.path().join("prefs.json");
    let source = DirectorySource::new(root.path());

    let mut prefs = FilePreferences::open(&prefs_path).expect("preferences should open");
    let mut catalog = Catalog::new(language::load_language(&prefs));
    catalog.load(&source, false);
    assert_eq!(catalog.language(), Language::Ja);
    assert_eq!(
        catalog.get_by_id("canon_in_d").map(|p| p.composer.as_str()),
        Some("パッヘルベル")
    );

    assert!(catalog.set_language(Language::En, &mut prefs, &source));

    let reopened = FilePreferences::open(&prefs_path).expect("preferences should reopen");
    assert_eq!(reopened.get(LANGUAGE_KEY).as_deref(), Some("en"));

    let restored = Catalog::new(language::load_language(&reopened));
    assert_eq!(restored.language(), Language::En);
}

#[test]
fn missing_language_file_keeps_previous_pieces() {
    let root = tempfile::tempdir().expect("temporary directory should be created");
    write_catalog(root.path(), Language::Ja);
    let source = DirectorySource::new(root.path());
    let mut prefs = musicquiz::MemoryPreferences::new();

    let mut catalog = Catalog::new(Language::Ja);
    catalog.load(&source, false);
    let loaded = catalog.len();

    catalog.set_language(Language::En, &mut prefs, &source);

    assert_eq!(catalog.language(), Language::En);
    assert_eq!(catalog.len(), loaded);
    assert!(matches!(catalog.error(), Some(CatalogError::Read { .. })));
    assert!(!catalog.is_loading());
}
