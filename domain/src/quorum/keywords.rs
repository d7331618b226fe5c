//! Per-language accept/reject keywords used in voting

use serde::Serialize;

/// Language used when none is configured
pub const DEFAULT_LANGUAGE: &str = "English";

/// Accept/reject keyword pair for one discussion language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteKeywords {
    pub language: &'static str,
    pub accept: &'static str,
    pub reject: &'static str,
}

/// Keyword table. The first entry is the fallback for unrecognised languages.
pub const VOTE_KEYWORDS: &[VoteKeywords] = &[
    VoteKeywords {
        language: DEFAULT_LANGUAGE,
        accept: "accept",
        reject: "reject",
    },
    VoteKeywords {
        language: "Russian",
        accept: "принимаю",
        reject: "отклоняю",
    },
    VoteKeywords {
        language: "German",
        accept: "akzeptiere",
        reject: "ablehne",
    },
    VoteKeywords {
        language: "French",
        accept: "accepte",
        reject: "rejette",
    },
    VoteKeywords {
        language: "Ukrainian",
        accept: "приймаю",
        reject: "відхиляю",
    },
];

impl VoteKeywords {
    /// Exact (case-insensitive) lookup by language name
    pub fn lookup(language: &str) -> Option<&'static VoteKeywords> {
        let language = language.trim();
        VOTE_KEYWORDS
            .iter()
            .find(|k| k.language.eq_ignore_ascii_case(language))
    }

    /// Keywords for a language, falling back to the default pair
    pub fn for_language(language: &str) -> &'static VoteKeywords {
        Self::lookup(language).unwrap_or(&VOTE_KEYWORDS[0])
    }
}

/// Languages that have a keyword table, in table order
pub fn supported_languages() -> impl Iterator<Item = &'static str> {
    VOTE_KEYWORDS.iter().map(|k| k.language)
}
