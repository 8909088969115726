use crate::catalog::StaticSource;
use crate::language::Language;
use crate::piece::Piece;

#[cfg(test)]
use crate::{Catalog, Category, QuestionCount, QuizFormat, generate_questions};
#[cfg(test)]
use rand::SeedableRng;

/// Questions in the demo quiz.
pub const DEMO_QUESTION_COUNT: usize = 5;

struct DemoEntry {
    id: &'static str,
    audio: &'static str,
    ja: [&'static str; 3],
    en: [&'static str; 3],
}

/// Title, composer and genre per language; ids and audio are shared.
const DEMO_ENTRIES: &[DemoEntry] = &[
    DemoEntry {
        id: "symphony_5_beethoven",
        audio: "https://example.com/audio/symphony5.ogg",
        ja: ["交響曲第5番「運命」", "ベートーヴェン", "交響曲"],
        en: ["Symphony No. 5", "Beethoven", "Symphony"],
    },
    DemoEntry {
        id: "fur_elise",
        audio: "https://example.com/audio/fur_elise.ogg",
        ja: ["エリーゼのために", "ベートーヴェン", "ピアノ曲"],
        en: ["Für Elise", "Beethoven", "Piano"],
    },
    DemoEntry {
        id: "eine_kleine_nachtmusik",
        audio: "https://example.com/audio/nachtmusik.ogg",
        ja: ["アイネ・クライネ・ナハトムジーク", "モーツァルト", "セレナーデ"],
        en: ["Eine kleine Nachtmusik", "Mozart", "Serenade"],
    },
    DemoEntry {
        id: "toccata_fugue",
        audio: "https://example.com/audio/toccata.ogg",
        ja: ["トッカータとフーガ ニ短調", "バッハ", "オルガン曲"],
        en: ["Toccata and Fugue in D minor", "Bach", "Organ"],
    },
    DemoEntry {
        id: "nocturne_op9_2",
        audio: "https://example.com/audio/nocturne.ogg",
        ja: ["夜想曲第2番", "ショパン", "ピアノ曲"],
        en: ["Nocturne Op. 9 No. 2", "Chopin", "Piano"],
    },
    DemoEntry {
        id: "swan_lake",
        audio: "https://example.com/audio/swan_lake.ogg",
        ja: ["白鳥の湖", "チャイコフスキー", "バレエ音楽"],
        en: ["Swan Lake", "Tchaikovsky", "Ballet"],
    },
    DemoEntry {
        id: "four_seasons_spring",
        audio: "https://example.com/audio/spring.ogg",
        ja: ["四季「春」", "ヴィヴァルディ", "協奏曲"],
        en: ["The Four Seasons: Spring", "Vivaldi", "Concerto"],
    },
    DemoEntry {
        id: "hungarian_dance_5",
        audio: "https://example.com/audio/hungarian5.ogg",
        ja: ["ハンガリー舞曲第5番", "ブラームス", "管弦楽曲"],
        en: ["Hungarian Dance No. 5", "Brahms", "Orchestral"],
    },
    DemoEntry {
        id: "canon_in_d",
        audio: "https://example.com/audio/canon.ogg",
        ja: ["カノン ニ長調", "パッヘルベル", "室内楽"],
        en: ["Canon in D", "Pachelbel", "Chamber"],
    },
];

pub fn demo_pieces(language: Language) -> Vec<Piece> {
    DEMO_ENTRIES
        .iter()
        .map(|entry| {
            let [title, composer, genre] = match language {
                Language::Ja => entry.ja,
                Language::En => entry.en,
            };

            Piece {
                id: entry.id.to_string(),
                title: title.to_string(),
                composer: composer.to_string(),
                genre: genre.to_string(),
                audio_url: entry.audio.to_string(),
                description: String::new(),
                trivia: String::new(),
            }
        })
        .collect()
}

/// A catalog source serving the demo pieces in every supported language.
pub fn demo_source() -> StaticSource {
    Language::ALL
        .into_iter()
        .fold(StaticSource::new(), |source, language| {
            source.with_language(language, demo_pieces(language))
        })
}
