use std::fmt;

/// Canonical composer identity used for category filtering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ComposerKey(String);

impl ComposerKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComposerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Spellings seen in the localized catalogs, mapped to their canonical key.
/// New locales only need new rows here.
const SPELLINGS: &[(&str, &str)] = &[
    ("Beethoven", "Beethoven"),
    ("ベートーヴェン", "Beethoven"),
    ("Mozart", "Mozart"),
    ("モーツァルト", "Mozart"),
    ("Bach", "Bach"),
    ("バッハ", "Bach"),
    ("Chopin", "Chopin"),
    ("ショパン", "Chopin"),
    ("Tchaikovsky", "Tchaikovsky"),
    ("チャイコフスキー", "Tchaikovsky"),
    ("Vivaldi", "Vivaldi"),
    ("ヴィヴァルディ", "Vivaldi"),
    ("Brahms", "Brahms"),
    ("ブラームス", "Brahms"),
    ("Pachelbel", "Pachelbel"),
    ("パッヘルベル", "Pachelbel"),
];

/// Maps a catalog composer string to its canonical key.
///
/// Unknown spellings pass through unchanged, so a composer missing from the
/// table still forms its own category.
pub fn normalize(raw: &str) -> ComposerKey {
    let key = SPELLINGS
        .iter()
        .find(|(spelling, _)| *spelling == raw)
        .map(|(_, key)| *key)
        .unwrap_or(raw);

    ComposerKey::new(key)
}

/// Canonical keys offered as quiz categories, in table order.
pub fn known_composers() -> Vec<ComposerKey> {
    let mut keys: Vec<ComposerKey> = Vec::new();

    for (_, key) in SPELLINGS {
        if !keys.iter().any(|existing| existing.as_str() == *key) {
            keys.push(ComposerKey::new(*key));
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_and_japanese_spellings_share_a_key() {
        assert_eq!(normalize("Beethoven"), normalize("ベートーヴェン"));
        assert_eq!(normalize("チャイコフスキー").as_str(), "Tchaikovsky");
    }

    #[test]
    fn unmapped_composer_passes_through() {
        assert_eq!(normalize("Debussy").as_str(), "Debussy");
        assert_eq!(normalize("").as_str(), "");
    }

    #[test]
    fn normalization_is_exact_match() {
        assert_eq!(normalize("beethoven").as_str(), "beethoven");
        assert_eq!(normalize(" Bach").as_str(), " Bach");
    }

    #[test]
    fn known_composers_are_unique_and_ordered() {
        let keys = known_composers();
        let names: Vec<&str> = keys.iter().map(ComposerKey::as_str).collect();

        assert_eq!(
            names,
            vec![
                "Beethoven",
                "Mozart",
                "Bach",
                "Chopin",
                "Tchaikovsky",
                "Vivaldi",
                "Brahms",
                "Pachelbel",
            ]
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ComposerKey::new("Mozart")).expect("key should serialize");
        assert_eq!(json, "\"Mozart\"");
    }
}
