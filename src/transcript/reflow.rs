//! Cue stream to prose.
//!
//! Cues are cleaned one by one, joined, split into sentences and grouped into
//! paragraphs. Reflowing already-reflowed text only ever changes whitespace.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{FormattedTranscript, TranscriptCue};

pub const DEFAULT_SENTENCES_PER_PARAGRAPH: usize = 4;
pub const DEFAULT_PARAGRAPH_CHAR_BUDGET: usize = 500;

// Unpunctuated auto-captions arrive as one endless "sentence"; past this many
// words it is chunked so paragraphs stay readable.
const RUN_ON_WORDS: usize = 60;
const CHUNK_MIN_WORDS: usize = 15;
const CHUNK_MAX_WORDS: usize = 20;

// A sentence opening with one of these starts a new paragraph.
const PARAGRAPH_MARKERS: &[&str] = &[
    "now ",
    "next,",
    "however,",
    "but ",
    "so ",
    "therefore",
    "furthermore",
    "additionally",
    "finally",
    "in conclusion",
    "let me",
    "let's",
    "okay",
    "alright",
    "well,",
];

const TERMINALS: [char; 4] = ['.', '!', '?', '…'];
const CLOSERS: [char; 7] = ['"', '\'', ')', ']', '»', '”', '’'];

static ANNOTATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("annotation pattern must compile"));

/// Paragraph grouping thresholds; whichever is reached first closes a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflowOptions {
    pub sentences_per_paragraph: usize,
    pub paragraph_char_budget: usize,
}

impl Default for ReflowOptions {
    fn default() -> Self {
        Self {
            sentences_per_paragraph: DEFAULT_SENTENCES_PER_PARAGRAPH,
            paragraph_char_budget: DEFAULT_PARAGRAPH_CHAR_BUDGET,
        }
    }
}

/// Reflow an ordered cue sequence into paragraphs, discarding timing
pub fn reflow(cues: &[TranscriptCue], options: &ReflowOptions) -> FormattedTranscript {
    let cleaned = cues
        .iter()
        .map(|cue| strip_annotations(&cue.text))
        .collect::<Vec<_>>()
        .join(" ");

    reflow_cleaned(&cleaned, options)
}

/// Reflow a block of raw caption text, cleaned as a single cue
pub fn reflow_text(text: &str, options: &ReflowOptions) -> FormattedTranscript {
    reflow_cleaned(&strip_annotations(text), options)
}

/// Drop `[...]` annotations, then any bracket left unpaired
///
/// An unclosed `[` never swallows text beyond its own cue.
fn strip_annotations(text: &str) -> String {
    ANNOTATION_REGEX.replace_all(text, " ").replace(|c: char| c == '[' || c == ']', "")
}

fn reflow_cleaned(cleaned: &str, options: &ReflowOptions) -> FormattedTranscript {
    let words: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();

    if words.is_empty() {
        return FormattedTranscript::default();
    }

    let mut sentences = split_sentences(words);

    for sentence in &mut sentences {
        if let Some(first) = sentence.first_mut() {
            capitalize_word(first);
        }
    }

    if let Some(last) = sentences.last_mut().and_then(|s| s.last_mut()) {
        if !ends_sentence(last) {
            last.push('.');
        }
    }

    let units: Vec<String> = sentences
        .iter()
        .flat_map(|sentence| grouping_units(sentence))
        .collect();

    FormattedTranscript::new(group_paragraphs(&units, options).join("\n\n"))
}

fn split_sentences(words: Vec<String>) -> Vec<Vec<String>> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();

    for word in words {
        let terminal = ends_sentence(&word);
        current.push(word);
        if terminal {
            sentences.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        sentences.push(current);
    }

    sentences
}

/// True when the word ends in terminal punctuation, ignoring trailing quotes and brackets
fn ends_sentence(word: &str) -> bool {
    word.trim_end_matches(CLOSERS)
        .chars()
        .last()
        .map_or(false, |c| TERMINALS.contains(&c))
}

/// Uppercase the first letter of a word that has no uppercase letters yet
fn capitalize_word(word: &mut String) {
    if word.chars().any(char::is_uppercase) {
        return;
    }

    let Some((index, first)) = word.char_indices().find(|(_, c)| c.is_alphanumeric()) else {
        return;
    };

    if first.is_lowercase() {
        let upper: String = first.to_uppercase().collect();
        word.replace_range(index..index + first.len_utf8(), &upper);
    }
}

fn starts_uppercase(word: &str) -> bool {
    word.chars()
        .find(|c| c.is_alphanumeric())
        .map_or(false, char::is_uppercase)
}

/// A sentence becomes one grouping unit, unless it is a run-on that needs chunking
fn grouping_units(sentence: &[String]) -> Vec<String> {
    if sentence.len() <= RUN_ON_WORDS {
        return vec![sentence.join(" ")];
    }

    let mut units = Vec::new();
    let mut start = 0;

    for i in 0..sentence.len() {
        let len = i - start + 1;
        let next_upper = sentence.get(i + 1).map_or(false, |w| starts_uppercase(w));

        if (len >= CHUNK_MIN_WORDS && next_upper) || len >= CHUNK_MAX_WORDS {
            units.push(sentence[start..=i].join(" "));
            start = i + 1;
        }
    }

    if start < sentence.len() {
        units.push(sentence[start..].join(" "));
    }

    units
}

fn opens_paragraph(unit: &str) -> bool {
    let lower = unit.to_lowercase();
    PARAGRAPH_MARKERS.iter().any(|marker| lower.starts_with(marker))
}

fn group_paragraphs(units: &[String], options: &ReflowOptions) -> Vec<String> {
    let max_sentences = options.sentences_per_paragraph.max(1);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for unit in units {
        if !current.is_empty() && opens_paragraph(unit) {
            paragraphs.push(std::mem::take(&mut current));
            count = 0;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(unit);
        count += 1;

        if count >= max_sentences || current.chars().count() >= options.paragraph_char_budget {
            paragraphs.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}
