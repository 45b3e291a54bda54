//! Term definitions found in article text.
//!
//! Chinese statutes define terms with a fixed phrasing:
//! `本法所称个人信息，是指……。` The term and the definition body are taken
//! verbatim; the first definition of a term in article order wins.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Definition, Provision};

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DEFINITION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:本法|本条例|本规定|本办法|本细则|本决定)(?:中)?所称(?:的)?(?P<term>[^，,。；;：:]{1,40}?)[，,]?(?:是指|指)(?P<body>[^。]+)。?",
    )
    .expect("valid regex")
});

/// Collect definitions from a document's articles.
pub fn extract_definitions(provisions: &[Provision]) -> Vec<Definition> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut definitions = Vec::new();

    for provision in provisions {
        for caps in DEFINITION_PATTERN.captures_iter(&provision.content) {
            let (Some(term), Some(body)) = (caps.name("term"), caps.name("body")) else {
                continue;
            };
            let term = term.as_str().trim().trim_matches(['“', '”', '"']).to_string();
            let body = body.as_str().trim();
            if term.is_empty() || body.is_empty() || !seen.insert(term.clone()) {
                continue;
            }
            definitions.push(Definition {
                term,
                definition: body.to_string(),
                source_provision: Some(provision.provision_ref.clone()),
            });
        }
    }

    definitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_statute_definition() {
        let provisions = vec![Provision::new(
            "PIPL-2021",
            "4",
            "个人信息是以电子或者其他方式记录的与已识别或者可识别的自然人有关的各种信息。\n本法所称个人信息处理者，是指在个人信息处理活动中自主决定处理目的、处理方式的组织、个人。",
        )];
        let defs = extract_definitions(&provisions);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].term, "个人信息处理者");
        assert_eq!(
            defs[0].definition,
            "在个人信息处理活动中自主决定处理目的、处理方式的组织、个人"
        );
        assert_eq!(defs[0].source_provision.as_deref(), Some("4"));
    }

    #[test]
    fn test_regulation_phrasing_and_first_wins() {
        let provisions = vec![
            Provision::new("R", "2", "本条例所称网络数据，是指通过网络处理和产生的各种电子数据。"),
            Provision::new("R", "9", "本条例中所称网络数据指另一种说法。"),
        ];
        let defs = extract_definitions(&provisions);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].term, "网络数据");
        assert_eq!(defs[0].source_provision.as_deref(), Some("2"));
    }

    #[test]
    fn test_no_definitions() {
        let provisions = vec![Provision::new("R", "1", "为了规范数据处理活动，制定本法。")];
        assert!(extract_definitions(&provisions).is_empty());
    }
}
