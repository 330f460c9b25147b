//! Noun phrases for user-facing diagnostics.
//!
//! Different runtimes describe their mapping type differently: a JavaScript
//! sandbox returns an "object", a Python one a "dictionary". Diagnostics
//! build their sentences from the phrases configured here so the wording
//! matches whichever runtime executed the code.

/// Singular/plural phrase pair for one grammatical kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NounPair {
    pub singular: &'static str,
    pub plural: &'static str,
}

/// Grammatical kind a diagnostic asks for.
///
/// Only `Object` is consulted today; keyed so further kinds can be added
/// without touching call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NounKind {
    Object,
}

/// Options for [`TextPhrases::noun`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NounOptions {
    /// Prefix the phrase with an indefinite article.
    pub include_article: bool,
    /// Use the plural form.
    pub plural: bool,
}

/// Noun phrases used by one runtime's diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPhrases {
    pub object: NounPair,
}

impl TextPhrases {
    /// Phrases for a JavaScript-style runtime.
    pub const fn javascript() -> Self {
        Self {
            object: NounPair {
                singular: "object",
                plural: "objects",
            },
        }
    }

    /// Phrases for a Python-style runtime.
    pub const fn python() -> Self {
        Self {
            object: NounPair {
                singular: "dictionary",
                plural: "dictionaries",
            },
        }
    }

    /// Return the configured phrase for `kind`.
    ///
    /// Article selection is a plain string check on lowercase vowels, not
    /// phonetic detection.
    pub fn noun(&self, kind: NounKind, options: NounOptions) -> String {
        let phrase = match kind {
            NounKind::Object => {
                if options.plural {
                    self.object.plural
                } else {
                    self.object.singular
                }
            }
        };
        if !options.include_article {
            return phrase.to_string();
        }
        if phrase.starts_with(['a', 'e', 'i', 'o', 'u']) {
            format!("an {phrase}")
        } else {
            format!("a {phrase}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vowel_leading_phrase_takes_an() {
        let phrases = TextPhrases::javascript();
        let noun = phrases.noun(
            NounKind::Object,
            NounOptions {
                include_article: true,
                plural: false,
            },
        );
        assert_eq!(noun, "an object");
    }

    #[test]
    fn consonant_leading_phrase_takes_a() {
        let phrases = TextPhrases::python();
        let noun = phrases.noun(
            NounKind::Object,
            NounOptions {
                include_article: true,
                plural: false,
            },
        );
        assert_eq!(noun, "a dictionary");
    }

    #[test]
    fn plural_without_article_is_bare() {
        let phrases = TextPhrases::javascript();
        let noun = phrases.noun(
            NounKind::Object,
            NounOptions {
                include_article: false,
                plural: true,
            },
        );
        assert_eq!(noun, "objects");
    }
}
