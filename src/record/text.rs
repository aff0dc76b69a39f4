use crate::error::Result;
use crate::metric::{Kind, Metric, Sample, WireType};
use crate::tags::Tags;
use crate::time;
use crate::trap::TrapMetrics;
use chrono::{DateTime, Utc};
use unicode_general_category::{get_general_category, GeneralCategory};

/// Letters, marks, numbers, punctuation, symbols and the ASCII space are
/// printable. Other separators, controls, format characters, surrogates,
/// private use and unassigned code points are not.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    match get_general_category(c) {
        GeneralCategory::SpaceSeparator
        | GeneralCategory::LineSeparator
        | GeneralCategory::ParagraphSeparator
        | GeneralCategory::Control
        | GeneralCategory::Format
        | GeneralCategory::Surrogate
        | GeneralCategory::PrivateUse
        | GeneralCategory::Unassigned => false,
        _ => true,
    }
}

/// Clean up a text value for the collector.
///
/// Surrounding whitespace is trimmed, typographic quotes become their ASCII
/// counterparts and anything else non-printable is replaced with `replace`.
pub fn sanitize(value: &str, replace: char) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            c if is_printable(c) => c,
            _ => replace,
        })
        .collect()
}

impl TrapMetrics {
    /// Set a text sample. The last value set at a timestamp wins; without a
    /// timestamp the sample is sent with `_ts` 0.
    pub fn text_set(
        &self,
        name: &str,
        tags: &Tags,
        value: &str,
        ts: Option<&DateTime<Utc>>,
    ) -> Result<()> {
        let key = time::sample_key(ts);
        let value = sanitize(value, self.config.non_print_char_replace);
        self.store.update(name, Kind::Text, tags, |m| {
            m.wire_type = Some(WireType::String);
            m.samples.insert(key, Sample::Text(value));
            Ok(())
        })
    }

    /// Snapshot of a text metric and all of its samples.
    pub fn text_fetch(&self, name: &str, tags: &Tags) -> Result<Metric> {
        self.store.fetch(name, Kind::Text, tags)
    }
}
