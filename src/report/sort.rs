#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{cmp::Ordering, fmt::Display, str::FromStr};

use anyhow::bail;

use super::model::GradingResult;

/// Field the roster is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Given name, Vietnamese collation.
    #[default]
    Name,
    /// Numeric score.
    Score,
    /// Submission time text.
    Time,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "score" => Ok(SortKey::Score),
            "time" => Ok(SortKey::Time),
            other => bail!("Unknown sort key `{other}`, expected one of: name, score, time"),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SortKey::Name => "name",
            SortKey::Score => "score",
            SortKey::Time => "time",
        })
    }
}

/// Direction of the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortOrder {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Active ordering of the roster view.
///
/// Views are always derived from the report's stored order, never from a
/// previous view, so flipping the direction twice gives back the same view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortPolicy {
    /// Field compared.
    key:   SortKey,
    /// Direction applied to the comparison.
    order: SortOrder,
}

impl SortPolicy {
    /// Creates a policy.
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Field compared.
    pub fn key(&self) -> SortKey {
        self.key
    }

    /// Direction applied.
    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Same direction, different key.
    pub fn with_key(self, key: SortKey) -> Self {
        Self { key, ..self }
    }

    /// Same key, opposite direction.
    pub fn toggled(self) -> Self {
        Self {
            order: self.order.toggled(),
            ..self
        }
    }

    /// Compares two results under this policy.
    pub fn compare(&self, a: &GradingResult, b: &GradingResult) -> Ordering {
        let ord = match self.key {
            SortKey::Name => collate_vi(a.first_name(), b.first_name()),
            SortKey::Score => a.score().total_cmp(&b.score()),
            SortKey::Time => a.submission_time().cmp(b.submission_time()),
        };
        match self.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    }

    /// Stable ordering of borrowed results. Ties keep their input order.
    pub fn apply<'a>(&self, results: &'a [GradingResult]) -> Vec<&'a GradingResult> {
        let mut view: Vec<&GradingResult> = results.iter().collect();
        view.sort_by(|a, b| self.compare(a, b));
        view
    }

    /// Owned variant of [`SortPolicy::apply`].
    pub fn sorted(&self, results: &[GradingResult]) -> Vec<GradingResult> {
        self.apply(results).into_iter().cloned().collect()
    }
}

/// Vietnamese alphabet with the four Latin letters it does not use slotted in
/// their usual places.
const ALPHABET: [char; 33] = [
    'a', 'ă', 'â', 'b', 'c', 'd', 'đ', 'e', 'ê', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'ô', 'ơ', 'p', 'q', 'r', 's', 't', 'u', 'ư', 'v', 'w', 'x', 'y', 'z',
];

/// Precomposed vowels. Column index is the tone weight: none, huyền, hỏi,
/// ngã, sắc, nặng.
const TONED_VOWELS: [&str; 12] = [
    "aàảãáạ", "ăằẳẵắặ", "âầẩẫấậ", "eèẻẽéẹ", "êềểễếệ", "iìỉĩíị", "oòỏõóọ", "ôồổỗốộ", "ơờởỡớợ",
    "uùủũúụ", "ưừửữứự", "yỳỷỹýỵ",
];

/// Tone weight of a combining tone mark.
fn combining_tone(c: char) -> Option<u8> {
    match c {
        '\u{0300}' => Some(1),
        '\u{0309}' => Some(2),
        '\u{0303}' => Some(3),
        '\u{0301}' => Some(4),
        '\u{0323}' => Some(5),
        _ => None,
    }
}

/// Applies a combining breve, circumflex or horn to a base letter.
fn compose_modifier(base: char, mark: char) -> Option<char> {
    match (base, mark) {
        ('a', '\u{0306}') => Some('ă'),
        ('a', '\u{0302}') => Some('â'),
        ('e', '\u{0302}') => Some('ê'),
        ('o', '\u{0302}') => Some('ô'),
        ('o', '\u{031B}') => Some('ơ'),
        ('u', '\u{031B}') => Some('ư'),
        _ => None,
    }
}

/// Splits a lower-case letter into its toneless base and tone weight.
fn split_tone(c: char) -> (char, u8) {
    for row in TONED_VOWELS {
        let mut chars = row.chars();
        let Some(base) = chars.next() else {
            continue;
        };
        if base == c {
            return (base, 0);
        }
        if let Some(pos) = chars.position(|v| v == c) {
            return (base, pos as u8 + 1);
        }
    }
    (c, 0)
}

/// Primary weight: whitespace, then punctuation, digits, letters, and every
/// other script last.
fn primary_weight(c: char) -> u32 {
    if c.is_whitespace() {
        return 1;
    }
    if let Some(i) = ALPHABET.iter().position(|&a| a == c) {
        return 2_000 + i as u32;
    }
    if let Some(d) = c.to_digit(10) {
        return 1_000 + d;
    }
    if c.is_ascii() {
        return 100 + c as u32;
    }
    10_000 + c as u32
}

/// Three-level sort key.
#[derive(Debug, PartialEq, Eq)]
struct CollationKey {
    /// Letter identity.
    primary:   Vec<u32>,
    /// Tone marks.
    secondary: Vec<u8>,
    /// Case, lower first.
    tertiary:  Vec<u8>,
}

impl CollationKey {
    /// Builds the key, folding combining marks onto the preceding letter.
    fn new(s: &str) -> Self {
        let mut bases: Vec<char> = Vec::with_capacity(s.len());
        let mut secondary = Vec::with_capacity(s.len());
        let mut tertiary = Vec::with_capacity(s.len());

        for c in s.chars() {
            if let Some(tone) = combining_tone(c) {
                if let Some(last) = secondary.last_mut() {
                    *last = tone;
                }
                continue;
            }
            if ('\u{0300}'..='\u{036F}').contains(&c) {
                if let Some(last) = bases.last_mut()
                    && let Some(composed) = compose_modifier(*last, c)
                {
                    *last = composed;
                }
                continue;
            }

            let lower = c.to_lowercase().next().unwrap_or(c);
            let (base, tone) = split_tone(lower);
            bases.push(base);
            secondary.push(tone);
            tertiary.push(u8::from(c != lower));
        }

        Self {
            primary: bases.into_iter().map(primary_weight).collect(),
            secondary,
            tertiary,
        }
    }
}

impl Ord for CollationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .cmp(&other.primary)
            .then_with(|| self.secondary.cmp(&other.secondary))
            .then_with(|| self.tertiary.cmp(&other.tertiary))
    }
}

impl PartialOrd for CollationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares two strings the way a Vietnamese reader orders names.
pub fn collate_vi(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}
