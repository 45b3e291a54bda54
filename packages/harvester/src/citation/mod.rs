//! Citation parsing and formatting.
//!
//! Users cite Chinese legislation in several ways: `《个人信息保护法》第二十一条`,
//! `Article 21, Personal Information Protection Law`, `Art. 21, PIPL 2021`,
//! `PIPL-2021, art. 21` or just `第二十一条`. [`parse`] turns any of these into
//! a [`Citation`] with an arabic article number; [`format`] renders a
//! citation back in one of five styles. Neither looks at stored data.

mod format;
mod parse;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::types::DocumentKind;

pub use format::format;
pub use parse::parse;

/// Which surface syntax a citation was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CitationSyntax {
    /// `PIPL-2021, art. 21, para. 2`
    Identifier,
    /// `第二十一条第二款《个人信息保护法》`
    ChineseArticleFirst,
    /// `《个人信息保护法》第二十一条第二款`
    ChineseTitleFirst,
    /// `Article 21, Paragraph 2, Personal Information Protection Law`
    English,
    /// `Art. 21, Para. 2, PIPL 2021`
    Short,
    /// `第二十一条` or `Art. 21(2)`
    Bare,
}

/// Output convention for [`format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CitationStyle {
    /// `《个人信息保护法》第二十一条第二款`
    Chinese,
    /// `Article 21, Paragraph 2, Personal Information Protection Law`
    English,
    /// Chinese form followed by the English form in parentheses.
    Full,
    /// `Art. 21, Para. 2, PIPL 2021`
    Short,
    /// `第二十一条第二款`
    Pinpoint,
}

/// A parsed reference to an article of a law.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub valid: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<CitationSyntax>,

    /// Statute or regulation, inferred from the title when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DocumentKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,

    /// Arabic article number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,

    /// Arabic paragraph (款) number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Citation {
    /// A valid citation of `article` with no law attached yet.
    #[must_use]
    pub fn article(article: u32) -> Self {
        Self {
            valid: true,
            article: Some(article.to_string()),
            ..Self::default()
        }
    }

    /// An invalid citation carrying the reason parsing failed.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_paragraph(mut self, paragraph: u32) -> Self {
        self.paragraph = Some(paragraph.to_string());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.kind = self.kind.or_else(|| DocumentKind::infer_from_title(&title));
        self.title = Some(title);
        self
    }

    #[must_use]
    pub fn with_title_en(mut self, title_en: impl Into<String>) -> Self {
        let title_en = title_en.into();
        self.kind = self.kind.or_else(|| DocumentKind::infer_from_title(&title_en));
        self.title_en = Some(title_en);
        self
    }

    #[must_use]
    pub fn with_short_name(mut self, short_name: impl Into<String>, year: Option<u32>) -> Self {
        self.short_name = Some(short_name.into());
        self.year = year;
        self
    }

    #[must_use]
    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    /// Best available name of the cited law, Chinese title first.
    #[must_use]
    pub fn law_name(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.title_en.as_deref())
            .or(self.short_name.as_deref())
            .or(self.document_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn pipl_article_21_2() -> Citation {
        Citation::article(21)
            .with_paragraph(2)
            .with_title("中华人民共和国个人信息保护法")
            .with_title_en("Personal Information Protection Law")
            .with_short_name("PIPL", Some(2021))
    }

    #[test]
    fn test_round_trip_every_style() {
        let citation = pipl_article_21_2();
        for style in [
            CitationStyle::Chinese,
            CitationStyle::English,
            CitationStyle::Full,
            CitationStyle::Short,
            CitationStyle::Pinpoint,
        ] {
            let text = format(&citation, style);
            let parsed = parse(&text);
            assert!(parsed.valid, "{style} output did not parse: {text}");
            assert_eq!(parsed.article.as_deref(), Some("21"), "{style}: {text}");
            assert_eq!(parsed.paragraph.as_deref(), Some("2"), "{style}: {text}");
        }
    }

    #[test]
    fn test_round_trip_without_paragraph() {
        let citation = Citation::article(107).with_title("网络安全法");
        for style in [CitationStyle::Chinese, CitationStyle::Full, CitationStyle::Pinpoint] {
            let parsed = parse(&format(&citation, style));
            assert_eq!(parsed.article.as_deref(), Some("107"));
            assert_eq!(parsed.paragraph, None);
        }
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!(CitationStyle::from_str("pinpoint").unwrap(), CitationStyle::Pinpoint);
        assert_eq!(CitationStyle::from_str("Full").unwrap(), CitationStyle::Full);
        assert!(CitationStyle::from_str("bluebook").is_err());
    }

    #[test]
    fn test_law_name_preference() {
        let c = Citation::article(1).with_short_name("PIPL", None);
        assert_eq!(c.law_name(), Some("PIPL"));
        let c = c.with_title("个人信息保护法");
        assert_eq!(c.law_name(), Some("个人信息保护法"));
    }
}
