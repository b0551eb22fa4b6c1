//! Built-in lessons and the text heuristics the teacher relies on.

use std::collections::VecDeque;

struct Topic {
    keywords: &'static [&'static str],
    name: &'static str,
    lessons: &'static [&'static str],
}

const TOPICS: &[Topic] = &[
    Topic {
        keywords: &["hund", "dog"],
        name: "Hund",
        lessons: &[
            "Der Hund ist ein Tier.",
            "Der Hund bellt laut.",
            "Ein Hund hat vier Beine.",
            "Der Hund liebt Knochen.",
        ],
    },
    Topic {
        keywords: &["katze", "cat"],
        name: "Katze",
        lessons: &[
            "Die Katze ist ein Tier.",
            "Die Katze miaut leise.",
            "Eine Katze jagt Mäuse.",
        ],
    },
    Topic {
        keywords: &["sonne", "sun"],
        name: "Sonne",
        lessons: &[
            "Die Sonne ist ein Stern.",
            "Die Sonne scheint hell.",
            "Die Sonne wärmt die Erde.",
        ],
    },
    Topic {
        keywords: &["wasser", "water"],
        name: "Wasser",
        lessons: &[
            "Wasser ist flüssig.",
            "Wasser fließt im Fluss.",
            "Ohne Wasser gibt es kein Leben.",
        ],
    },
    Topic {
        keywords: &["baum", "tree"],
        name: "Baum",
        lessons: &[
            "Der Baum ist eine Pflanze.",
            "Ein Baum hat Blätter.",
            "Der Baum wächst langsam.",
        ],
    },
    Topic {
        keywords: &["vogel", "bird"],
        name: "Vogel",
        lessons: &[
            "Der Vogel ist ein Tier.",
            "Der Vogel fliegt hoch.",
            "Ein Vogel hat Federn.",
        ],
    },
];

const CORRECTION_WORDS: &[&str] = &["nein", "falsch", "no", "wrong", "schlecht"];

/// An ordered queue of lesson sentences about one topic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Curriculum {
    pub topic: String,
    pub lessons: VecDeque<String>,
}

impl Curriculum {
    pub fn new<I, S>(topic: impl Into<String>, lessons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topic: topic.into(),
            lessons: lessons.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}

/// Looks the instruction up in the built-in topic table.
#[must_use]
pub fn lookup(instruction: &str) -> Option<Curriculum> {
    let lower = instruction.to_lowercase();
    TOPICS
        .iter()
        .find(|t| t.keywords.iter().any(|k| lower.contains(k)))
        .map(|t| Curriculum::new(t.name, t.lessons.iter().copied()))
}

/// Table lookup, falling back to a one-lesson curriculum of the raw word.
#[must_use]
pub fn curriculum_for(instruction: &str) -> Curriculum {
    lookup(instruction).unwrap_or_else(|| {
        let word = instruction.trim();
        Curriculum::new(word, [word])
    })
}

/// Whether the instruction is a "no, that's wrong" rather than a topic.
#[must_use]
pub fn is_correction(instruction: &str) -> bool {
    instruction
        .split_whitespace()
        .map(|w| strip_punctuation(w).to_lowercase())
        .any(|w| CORRECTION_WORDS.contains(&w.as_str()))
}

fn strip_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

/// The word a lesson is about: its longest whitespace token, punctuation
/// stripped. Ties go to the earliest token.
#[must_use]
pub fn key_concept(sentence: &str) -> Option<String> {
    let mut best: Option<&str> = None;
    for word in sentence.split_whitespace().map(strip_punctuation) {
        if word.is_empty() {
            continue;
        }
        if best.map_or(true, |b| word.chars().count() > b.chars().count()) {
            best = Some(word);
        }
    }
    best.map(str::to_string)
}

/// Splits generated text into at most `max` short lesson sentences.
#[must_use]
pub fn split_sentences(text: &str, max: usize) -> Vec<String> {
    text.split_inclusive(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .take(max)
        .map(str::to_string)
        .collect()
}

/// Prompt sent to an external text generator.
#[must_use]
pub fn delegate_prompt(topic: &str, max: usize) -> String {
    format!(
        "Write at most {max} very short, simple German sentences that teach a child about \"{topic}\". \
         One fact per sentence. No lists, no numbering."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_keyword() {
        let c = lookup("Bring mir etwas über Hunde bei").expect("known topic");
        assert_eq!(c.topic, "Hund");
        assert_eq!(c.len(), 4);
        assert_eq!(lookup("teach me about the sun").map(|c| c.topic), Some("Sonne".into()));
        assert!(lookup("Quantenphysik").is_none());
    }

    #[test]
    fn test_unknown_topic_falls_back_to_word() {
        let c = curriculum_for("  Mond ");
        assert_eq!(c.topic, "Mond");
        assert_eq!(c.lessons, VecDeque::from(vec!["Mond".to_string()]));
    }

    #[test]
    fn test_correction_keywords_match_whole_words() {
        assert!(is_correction("Nein, falsch!"));
        assert!(is_correction("that is wrong"));
        assert!(!is_correction("Sonne"));
        assert!(!is_correction("Nordsee"));
    }

    #[test]
    fn test_key_concept_prefers_first_longest() {
        assert_eq!(key_concept("Der Hund ist ein Tier."), Some("Hund".into()));
        assert_eq!(key_concept("Der Hund bellt laut."), Some("bellt".into()));
        assert_eq!(key_concept(" ... "), None);
    }

    #[test]
    fn test_split_sentences() {
        let s = split_sentences("Der Mond ist rund. Er leuchtet!\n\nNachts", 2);
        assert_eq!(s, vec!["Der Mond ist rund.", "Er leuchtet!"]);
        assert!(split_sentences("  \n ", 4).is_empty());
    }
}
