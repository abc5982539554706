/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to the `vocabulary` table and provide
 * type-safe access to persisted data, plus the draft and patch shapes used
 * by the add/edit flow.
 */

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::WordClass;
use crate::errors::ValidationError;

/// Spaced-repetition grade of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Score {
    /// Marked for repetition
    Repeat,
    /// Never drilled
    #[default]
    New,
    /// Answered with difficulty
    Hard,
    /// Answered correctly
    Good,
    /// Answered without effort
    Easy,
}

impl Score {
    /// All scores in ascending order
    pub const ALL: [Score; 5] = [Score::Repeat, Score::New, Score::Hard, Score::Good, Score::Easy];

    /// Stored integer value
    pub fn value(self) -> i64 {
        match self {
            Score::Repeat => -1,
            Score::New => 0,
            Score::Hard => 1,
            Score::Good => 2,
            Score::Easy => 3,
        }
    }
}

impl TryFrom<i64> for Score {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Score::Repeat),
            0 => Ok(Score::New),
            1 => Ok(Score::Hard),
            2 => Ok(Score::Good),
            3 => Ok(Score::Easy),
            other => Err(ValidationError::InvalidScore(other)),
        }
    }
}

impl From<Score> for i64 {
    fn from(score: Score) -> Self {
        score.value()
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

impl std::str::FromStr for Score {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "repeat" => Ok(Score::Repeat),
            "new" => Ok(Score::New),
            "hard" => Ok(Score::Hard),
            "good" => Ok(Score::Good),
            "easy" => Ok(Score::Easy),
            other => other
                .parse::<i64>()
                .map_err(|_| ValidationError::InvalidScore(i64::MIN))
                .and_then(Score::try_from),
        }
    }
}

impl ToSql for Score {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.value()))
    }
}

impl FromSql for Score {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_i64()?;
        Score::try_from(raw).map_err(|_| FromSqlError::OutOfRange(raw))
    }
}

/// Columns of the vocabulary table that callers may address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Type,
    German,
    Translation,
    SecondTranslation,
    Example,
    Meaning,
    Score,
}

impl Column {
    /// Every column in table order
    pub const ALL: [Column; 7] = [
        Column::Type,
        Column::German,
        Column::Translation,
        Column::SecondTranslation,
        Column::Example,
        Column::Meaning,
        Column::Score,
    ];

    /// SQL column name
    pub fn name(self) -> &'static str {
        match self {
            Column::Type => "type",
            Column::German => "german",
            Column::Translation => "translation",
            Column::SecondTranslation => "second_translation",
            Column::Example => "example",
            Column::Meaning => "meaning",
            Column::Score => "score",
        }
    }

    /// Resolve a column name; `None` for anything outside the schema
    pub fn from_name(name: &str) -> Option<Self> {
        Column::ALL.into_iter().find(|c| c.name() == name.trim())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// True for values the add/edit flow treats as "nothing entered"
pub fn is_blank(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == "-"
}

/// Map blank values to `None` and trim the rest
pub fn normalize_field(value: Option<String>) -> Option<String> {
    value.and_then(|v| if is_blank(&v) { None } else { Some(v.trim().to_string()) })
}

fn require(value: &str, field: &'static str) -> Result<String, ValidationError> {
    if is_blank(value) {
        Err(ValidationError::BlankRequiredField(field))
    } else {
        Ok(value.trim().to_string())
    }
}

/// One persisted vocabulary row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Store-assigned row identity
    pub id: i64,
    /// Article or part-of-speech tag
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Headword
    pub german: String,
    /// Main-language rendering
    pub translation: Option<String>,
    /// Second-language rendering
    pub second_translation: Option<String>,
    /// Example sentences joined by the field delimiter
    pub example: Option<String>,
    /// Definitions joined by the field delimiter
    pub meaning: Option<String>,
    /// Spaced-repetition grade
    pub score: Score,
}

impl VocabularyEntry {
    /// Bucket the entry's type falls into
    pub fn word_class(&self) -> WordClass {
        WordClass::of(&self.entry_type)
    }
}

/// A record ready to be inserted (everything except the id)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub german: String,
    pub translation: Option<String>,
    pub second_translation: Option<String>,
    pub example: Option<String>,
    pub meaning: Option<String>,
    #[serde(default)]
    pub score: Score,
}

impl NewEntry {
    /// Create an entry with only the mandatory fields set
    pub fn new(entry_type: impl Into<String>, german: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            german: german.into(),
            ..Self::default()
        }
    }

    /// Set the main translation
    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }

    /// Set the score
    pub fn with_score(mut self, score: Score) -> Self {
        self.score = score;
        self
    }

    /// Reject blank mandatory fields and normalise the optional ones
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            entry_type: require(&self.entry_type, "type")?,
            german: require(&self.german, "german")?,
            translation: normalize_field(self.translation),
            second_translation: normalize_field(self.second_translation),
            example: normalize_field(self.example),
            meaning: normalize_field(self.meaning),
            score: self.score,
        })
    }

    /// Attach the id the store assigned
    pub fn into_entry(self, id: i64) -> VocabularyEntry {
        VocabularyEntry {
            id,
            entry_type: self.entry_type,
            german: self.german,
            translation: self.translation,
            second_translation: self.second_translation,
            example: self.example,
            meaning: self.meaning,
            score: self.score,
        }
    }
}

/// Free-text state of the "create new record" form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub entry_type: String,
    pub german: String,
    pub translation: String,
    pub second_translation: String,
    pub example: String,
    pub meaning: String,
    pub score: Score,
}

impl RecordDraft {
    /// Turn the form into an insertable record
    pub fn into_new_entry(self) -> Result<NewEntry, ValidationError> {
        NewEntry {
            entry_type: self.entry_type,
            german: self.german,
            translation: Some(self.translation),
            second_translation: Some(self.second_translation),
            example: Some(self.example),
            meaning: Some(self.meaning),
            score: self.score,
        }
        .validated()
    }
}

/// Partial update of one row; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub entry_type: Option<String>,
    pub german: Option<String>,
    pub translation: Option<Option<String>>,
    pub second_translation: Option<Option<String>>,
    pub example: Option<Option<String>>,
    pub meaning: Option<Option<String>>,
    pub score: Option<Score>,
}

impl EntryPatch {
    /// Patch that only sets the main translation
    pub fn translation(value: impl Into<String>) -> Self {
        Self {
            translation: Some(Some(value.into())),
            ..Self::default()
        }
    }

    /// Patch that only sets the score
    pub fn score(score: Score) -> Self {
        Self {
            score: Some(score),
            ..Self::default()
        }
    }

    /// Build a patch from column/value pairs as the edit form produces them.
    ///
    /// Returns the patch together with the keys that are not schema columns;
    /// those are dropped rather than treated as errors.
    pub fn from_fields<K, V, I>(fields: I) -> Result<(Self, Vec<String>), ValidationError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut patch = Self::default();
        let mut unknown = Vec::new();

        for (key, value) in fields {
            let value = value.as_ref().to_string();
            match Column::from_name(key.as_ref()) {
                Some(Column::Type) => patch.entry_type = Some(value),
                Some(Column::German) => patch.german = Some(value),
                Some(Column::Translation) => patch.translation = Some(Some(value)),
                Some(Column::SecondTranslation) => patch.second_translation = Some(Some(value)),
                Some(Column::Example) => patch.example = Some(Some(value)),
                Some(Column::Meaning) => patch.meaning = Some(Some(value)),
                Some(Column::Score) => patch.score = Some(value.parse()?),
                None => unknown.push(key.as_ref().to_string()),
            }
        }

        Ok((patch, unknown))
    }

    /// True when no column would change
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the blank rules: mandatory columns may not be blanked, optional ones become NULL
    pub fn normalized(self) -> Result<Self, ValidationError> {
        Ok(Self {
            entry_type: self.entry_type.map(|v| require(&v, "type")).transpose()?,
            german: self.german.map(|v| require(&v, "german")).transpose()?,
            translation: self.translation.map(normalize_field),
            second_translation: self.second_translation.map(normalize_field),
            example: self.example.map(normalize_field),
            meaning: self.meaning.map(normalize_field),
            score: self.score,
        })
    }

    /// Column assignments in table order
    pub fn assignments(&self) -> Vec<(Column, Box<dyn ToSql + Send>)> {
        let mut out: Vec<(Column, Box<dyn ToSql + Send>)> = Vec::new();
        if let Some(v) = &self.entry_type {
            out.push((Column::Type, Box::new(v.clone())));
        }
        if let Some(v) = &self.german {
            out.push((Column::German, Box::new(v.clone())));
        }
        if let Some(v) = &self.translation {
            out.push((Column::Translation, Box::new(v.clone())));
        }
        if let Some(v) = &self.second_translation {
            out.push((Column::SecondTranslation, Box::new(v.clone())));
        }
        if let Some(v) = &self.example {
            out.push((Column::Example, Box::new(v.clone())));
        }
        if let Some(v) = &self.meaning {
            out.push((Column::Meaning, Box::new(v.clone())));
        }
        if let Some(v) = self.score {
            out.push((Column::Score, Box::new(v)));
        }
        out
    }

    /// Mirror the patch onto an in-memory row
    pub fn apply_to(&self, entry: &mut VocabularyEntry) {
        if let Some(v) = &self.entry_type {
            entry.entry_type = v.clone();
        }
        if let Some(v) = &self.german {
            entry.german = v.clone();
        }
        if let Some(v) = &self.translation {
            entry.translation = v.clone();
        }
        if let Some(v) = &self.second_translation {
            entry.second_translation = v.clone();
        }
        if let Some(v) = &self.example {
            entry.example = v.clone();
        }
        if let Some(v) = &self.meaning {
            entry.meaning = v.clone();
        }
        if let Some(v) = self.score {
            entry.score = v;
        }
    }
}

/// "Problematic" rows offered by the special filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialFilter {
    /// (type, german) pairs that occur more than once
    Duplicates,
    /// Rows without a main translation
    Nulls,
}

impl std::str::FromStr for SpecialFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "duplicates" => Ok(SpecialFilter::Duplicates),
            "nulls" => Ok(SpecialFilter::Nulls),
            _ => Err(anyhow::anyhow!("Invalid special filter: {}", s)),
        }
    }
}

/// Column/value-set predicate behind chip-based filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Exact stored type values, e.g. the noun articles
    Type(Vec<String>),
    /// Score values
    Score(Vec<Score>),
    /// Word-class buckets; several buckets are OR-ed
    WordClass(Vec<WordClass>),
    /// Duplicates and/or rows without translation; several are OR-ed
    Special(Vec<SpecialFilter>),
}

impl Filter {
    /// Build a filter from the filter column name and its selected values.
    ///
    /// Returns `Ok(None)` when nothing is selected.
    pub fn from_parts<S: AsRef<str>>(column: &str, values: &[S]) -> anyhow::Result<Option<Self>> {
        if values.is_empty() {
            return Ok(None);
        }
        let values: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
        let filter = match column.trim().to_lowercase().as_str() {
            "type" => Filter::Type(values.iter().map(|v| v.trim().to_string()).collect()),
            "score" => Filter::Score(
                values
                    .iter()
                    .map(|v| v.parse::<Score>())
                    .collect::<Result<_, _>>()?,
            ),
            "class" | "word_class" => Filter::WordClass(
                values
                    .iter()
                    .map(|v| v.parse::<WordClass>())
                    .collect::<Result<_, _>>()?,
            ),
            "special" => Filter::Special(
                values
                    .iter()
                    .map(|v| v.parse::<SpecialFilter>())
                    .collect::<Result<_, _>>()?,
            ),
            other => return Err(anyhow::anyhow!("Invalid filter column: {}", other)),
        };
        Ok(Some(filter))
    }

    /// True when the filter selects nothing
    pub fn is_empty(&self) -> bool {
        match self {
            Filter::Type(v) => v.is_empty(),
            Filter::Score(v) => v.is_empty(),
            Filter::WordClass(v) => v.is_empty(),
            Filter::Special(v) => v.is_empty(),
        }
    }
}

/// Row selections understood by the record store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    All,
    /// score = 0
    New,
    /// score in {-1, 1}
    Repeat,
    /// score in {2, 3}
    Learnt,
    Nouns,
    Verbs,
    Adjectives,
    /// Not in any of the three named buckets
    Other,
    Duplicates,
    /// translation is NULL
    Nulls,
    Filter(Filter),
}

impl std::str::FromStr for QueryMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(QueryMode::All),
            "new" => Ok(QueryMode::New),
            "repeat" => Ok(QueryMode::Repeat),
            "learnt" | "learned" => Ok(QueryMode::Learnt),
            "nouns" => Ok(QueryMode::Nouns),
            "verbs" => Ok(QueryMode::Verbs),
            "adjectives" => Ok(QueryMode::Adjectives),
            "other" => Ok(QueryMode::Other),
            "duplicates" => Ok(QueryMode::Duplicates),
            "nulls" => Ok(QueryMode::Nulls),
            other => Err(ValidationError::UnknownQueryMode(other.to_string())),
        }
    }
}
