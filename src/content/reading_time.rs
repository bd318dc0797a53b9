//! Reading time estimation

use serde::Serialize;

use super::post::ContentSection;

/// Average reading speed
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: usize,
}

/// Count whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words in a section's heading plus its body text
pub fn section_words(section: &ContentSection) -> usize {
    let heading = section.heading.as_deref().map(count_words).unwrap_or(0);
    heading + count_words(&section.body.as_text())
}

/// Estimate reading time, rounding up to whole minutes.
///
/// Empty content reads in 0 minutes.
pub fn reading_time(sections: &[ContentSection], words_per_minute: usize) -> ReadingTime {
    let words: usize = sections.iter().map(section_words).sum();
    ReadingTime {
        words,
        minutes: words.div_ceil(words_per_minute.max(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::rich_text::{RichText, TextBlock};

    fn section(heading: Option<&str>, body: &str) -> ContentSection {
        ContentSection {
            heading: heading.map(str::to_string),
            body: RichText(vec![TextBlock::paragraph(body)]),
        }
    }

    fn words(n: usize) -> String {
        vec!["lorem"; n].join(" ")
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("one  two\nthree"), 3);
    }

    #[test]
    fn test_no_sections_is_zero_minutes() {
        let time = reading_time(&[], WORDS_PER_MINUTE);
        assert_eq!(time, ReadingTime { words: 0, minutes: 0 });
    }

    #[test]
    fn test_exactly_one_minute() {
        let sections = [section(Some("two words"), &words(198))];
        let time = reading_time(&sections, WORDS_PER_MINUTE);
        assert_eq!(time.words, 200);
        assert_eq!(time.minutes, 1);
    }

    #[test]
    fn test_rounds_up() {
        let sections = [section(None, &words(150)), section(Some("x"), &words(50))];
        let time = reading_time(&sections, WORDS_PER_MINUTE);
        assert_eq!(time.words, 201);
        assert_eq!(time.minutes, 2);
    }

    #[test]
    fn test_multiple_blocks_in_body() {
        let section = ContentSection {
            heading: Some("Heading here".to_string()),
            body: RichText(vec![
                TextBlock::paragraph("first block"),
                TextBlock::paragraph("second block text"),
            ]),
        };
        assert_eq!(section_words(&section), 7);
    }

    #[test]
    fn test_zero_rate_does_not_panic() {
        let sections = [section(None, "a b c")];
        assert_eq!(reading_time(&sections, 0).minutes, 3);
    }
}
