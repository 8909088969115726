use std::fmt;
use std::str::FromStr;

use crate::composer::{self, ComposerKey};
use crate::quiz::QuizFormat;

/// Longest accepted nickname, in characters.
pub const NICKNAME_MAX_CHARS: usize = 20;

/// Legacy numeric request meaning "every available piece".
pub const ALL_QUESTIONS_SENTINEL: usize = 999;

const DISALLOWED_NICKNAME_CHARS: &[char] = &['<', '>', '&', '"', '\'', '`', '\\'];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("nickname is required")]
    NicknameRequired,
    #[error("nickname must be at most {max} characters")]
    NicknameTooLong { max: usize },
    #[error("nickname contains characters that are not allowed")]
    NicknameInvalidChars,
    #[error("invalid question count: {0}")]
    InvalidCount(String),
}

/// Which pieces a quiz draws from.
///
/// Every string form is normalized, so the ranking `region` always carries
/// the canonical composer key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Category {
    #[default]
    All,
    Composer(ComposerKey),
}

impl Category {
    /// Category for a composer, normalizing any localized spelling.
    pub fn composer(name: &str) -> Self {
        Category::Composer(composer::normalize(name))
    }

    pub fn matches(&self, composer: &str) -> bool {
        match self {
            Category::All => true,
            Category::Composer(key) => composer::normalize(composer) == *key,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::All => "all",
            Category::Composer(key) => key.as_str(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        if value == "all" {
            Category::All
        } else {
            Category::composer(&value)
        }
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Category::from(value.to_string()))
    }
}

/// How many questions to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum QuestionCount {
    All,
    Limit(usize),
}

impl QuestionCount {
    /// Choices offered on the setup screen.
    pub const PRESETS: [QuestionCount; 4] = [
        QuestionCount::Limit(5),
        QuestionCount::Limit(10),
        QuestionCount::Limit(30),
        QuestionCount::All,
    ];

    /// Converts the numeric form used by external callers.
    pub fn from_requested(requested: usize) -> Self {
        if requested >= ALL_QUESTIONS_SENTINEL {
            QuestionCount::All
        } else {
            QuestionCount::Limit(requested)
        }
    }

    /// Number of questions for a pool of `available` pieces.
    pub fn resolve(self, available: usize) -> usize {
        match self {
            QuestionCount::All => available,
            QuestionCount::Limit(requested) => requested.min(available),
        }
    }
}

impl Default for QuestionCount {
    fn default() -> Self {
        QuestionCount::Limit(5)
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionCount::All => f.write_str("all"),
            QuestionCount::Limit(count) => write!(f, "{count}"),
        }
    }
}

impl From<QuestionCount> for String {
    fn from(count: QuestionCount) -> Self {
        count.to_string()
    }
}

impl TryFrom<String> for QuestionCount {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for QuestionCount {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == "all" {
            return Ok(QuestionCount::All);
        }

        value
            .parse::<usize>()
            .map(QuestionCount::from_requested)
            .map_err(|_| ConfigError::InvalidCount(value.to_string()))
    }
}

/// Trims and checks a player nickname.
pub fn validate_nickname(raw: &str) -> Result<String, ConfigError> {
    let nickname = raw.trim();

    if nickname.is_empty() {
        return Err(ConfigError::NicknameRequired);
    }

    if nickname.chars().count() > NICKNAME_MAX_CHARS {
        return Err(ConfigError::NicknameTooLong {
            max: NICKNAME_MAX_CHARS,
        });
    }

    if nickname
        .chars()
        .any(|c| c.is_control() || DISALLOWED_NICKNAME_CHARS.contains(&c))
    {
        return Err(ConfigError::NicknameInvalidChars);
    }

    Ok(nickname.to_string())
}

/// A validated quiz configuration, ready to hand to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    nickname: String,
    pub format: QuizFormat,
    pub category: Category,
    pub count: QuestionCount,
}

impl QuizConfig {
    pub fn new(
        nickname: &str,
        format: QuizFormat,
        category: Category,
        count: QuestionCount,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            nickname: validate_nickname(nickname)?,
            format,
            category,
            count,
        })
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            nickname: "Guest".to_string(),
            format: QuizFormat::default(),
            category: Category::All,
            count: QuestionCount::default(),
        }
    }
}
