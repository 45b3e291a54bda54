//! Core data types for the harvester.
//!
//! These types describe Chinese legal documents, their articles and their
//! declared links to foreign instruments. They are shared with the store
//! crate, which persists them unchanged.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::config::SOURCE_LANGUAGE;

/// Classification of a legal document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKind {
    /// Law adopted by the NPC or its Standing Committee (法).
    Statute,

    /// Administrative regulation issued by the State Council (条例, 规定, 办法).
    Regulation,
}

impl DocumentKind {
    /// Infer the kind from a Chinese or English title.
    ///
    /// # Examples
    /// ```
    /// use fagui_harvester::types::DocumentKind;
    ///
    /// assert_eq!(DocumentKind::infer_from_title("中华人民共和国数据安全法"), Some(DocumentKind::Statute));
    /// assert_eq!(DocumentKind::infer_from_title("网络数据安全管理条例"), Some(DocumentKind::Regulation));
    /// assert_eq!(DocumentKind::infer_from_title("PIPL"), None);
    /// ```
    #[must_use]
    pub fn infer_from_title(title: &str) -> Option<Self> {
        let title = title.trim().trim_end_matches('》');
        let lower = title.to_lowercase();
        if ["条例", "规定", "办法", "细则", "决定"]
            .iter()
            .any(|suffix| title.ends_with(suffix))
            || lower.ends_with("regulations")
            || lower.ends_with("measures")
            || lower.ends_with("provisions")
        {
            Some(Self::Regulation)
        } else if title.ends_with('法') || lower.ends_with(" law") || lower == "law" {
            Some(Self::Statute)
        } else {
            None
        }
    }
}

/// Lifecycle status of a document. Set by the operator, never computed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentStatus {
    InForce,
    Amended,
    Repealed,
    NotYetInForce,
}

/// Relationship between a domestic document and a foreign instrument.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RelationKind {
    References,
    Implements,
    Supplements,
    Applies,
    CompliesWith,
    DerogatesFrom,
    AmendedBy,
    RepealedBy,
    CitesArticle,
    SeeAlso,
}

/// How far a document implements the instrument it points at.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImplementationStatus {
    Complete,
    Partial,
    Pending,
    #[default]
    Unknown,
}

/// Type of a foreign instrument.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InstrumentType {
    Directive,
    Regulation,
}

/// Metadata for one piece of legislation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Operator-assigned identifier (e.g., "PIPL-2021").
    pub id: String,

    #[serde(rename = "type")]
    pub kind: DocumentKind,

    /// Title in Chinese.
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    pub status: DocumentStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_force_date: Option<String>,

    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A single article of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provision {
    pub document_id: String,

    /// Arabic article number (e.g., "21").
    pub provision_ref: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,

    pub section: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Verbatim article text.
    pub content: String,

    #[serde(default = "default_language")]
    pub language: String,
}

impl Provision {
    /// Create an article whose section equals its reference.
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        provision_ref: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let provision_ref = provision_ref.into();
        Self {
            document_id: document_id.into(),
            section: provision_ref.clone(),
            provision_ref,
            chapter: None,
            title: None,
            content: content.into(),
            language: default_language(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

fn default_language() -> String {
    SOURCE_LANGUAGE.to_string()
}

/// A term defined inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub term: String,
    pub definition: String,

    /// Article the definition was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_provision: Option<String>,
}

/// A declared link from a document (or one of its articles) to a foreign instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReferenceDecl {
    /// Natural identifier of the instrument (e.g., "gdpr", "32016R0679").
    pub external_id: String,

    #[serde(rename = "type")]
    pub instrument_type: InstrumentType,

    pub year: u32,
    pub number: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub kind: RelationKind,

    #[serde(default)]
    pub is_primary: bool,

    /// Article of the foreign instrument the link is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,

    /// Domestic article the link starts from; absent for document-level links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provision_ref: Option<String>,

    #[serde(default)]
    pub implementation_status: ImplementationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CrossReferenceDecl {
    /// Canonical EUR-Lex URL for the instrument when none is declared.
    #[must_use]
    pub fn instrument_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let letter = match self.instrument_type {
            InstrumentType::Directive => 'L',
            InstrumentType::Regulation => 'R',
        };
        format!(
            "https://eur-lex.europa.eu/eli/{}/{}/{}/oj?celex=3{}{}{:04}",
            match self.instrument_type {
                InstrumentType::Directive => "dir",
                InstrumentType::Regulation => "reg",
            },
            self.year,
            self.number,
            self.year,
            letter,
            self.number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(DocumentStatus::NotYetInForce.as_ref(), "not_yet_in_force");
        assert_eq!(RelationKind::CompliesWith.to_string(), "complies_with");
        assert_eq!(
            RelationKind::from_str("derogates_from").unwrap(),
            RelationKind::DerogatesFrom
        );
        assert!(RelationKind::from_str("contradicts").is_err());
        assert_eq!(ImplementationStatus::default(), ImplementationStatus::Unknown);
    }

    #[test]
    fn test_provision_new_defaults() {
        let p = Provision::new("PIPL-2021", "21", "text");
        assert_eq!(p.section, "21");
        assert_eq!(p.language, "zh");
        assert!(p.chapter.is_none());
        assert!(p.title.is_none());
    }

    #[test]
    fn test_document_yaml_field_names() {
        let doc = Document {
            id: "PIPL-2021".to_string(),
            kind: DocumentKind::Statute,
            title: "中华人民共和国个人信息保护法".to_string(),
            title_en: None,
            short_name: Some("PIPL".to_string()),
            status: DocumentStatus::InForce,
            issued_date: Some("2021-08-20".to_string()),
            in_force_date: Some("2021-11-01".to_string()),
            url: "https://flk.npc.gov.cn/detail2.html?x".to_string(),
            description: None,
        };
        let yaml = serde_yaml_ng::to_string(&doc).unwrap();
        assert!(yaml.contains("type: statute"));
        assert!(yaml.contains("status: in_force"));
        assert!(!yaml.contains("title_en"));

        let back: Document = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_instrument_url_default() {
        let decl = CrossReferenceDecl {
            external_id: "gdpr".to_string(),
            instrument_type: InstrumentType::Regulation,
            year: 2016,
            number: 679,
            title: None,
            short_name: Some("GDPR".to_string()),
            url: None,
            kind: RelationKind::References,
            is_primary: true,
            article: None,
            provision_ref: None,
            implementation_status: ImplementationStatus::Unknown,
            description: None,
        };
        assert_eq!(
            decl.instrument_url(),
            "https://eur-lex.europa.eu/eli/reg/2016/679/oj?celex=32016R0679"
        );
    }
}
