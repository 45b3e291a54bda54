use super::{Citation, CitationStyle};
use crate::numerals::from_integer;

/// Render a citation in the requested style.
///
/// Article and paragraph numbers are written with glyph numerals in the
/// Chinese styles and arabic digits in the English ones. A citation without
/// an article renders as the bare law name (or nothing).
///
/// # Examples
/// ```
/// use fagui_harvester::citation::{format, Citation, CitationStyle};
///
/// let c = Citation::article(21).with_paragraph(2).with_title("个人信息保护法");
/// assert_eq!(format(&c, CitationStyle::Chinese), "《个人信息保护法》第二十一条第二款");
/// assert_eq!(format(&c, CitationStyle::Pinpoint), "第二十一条第二款");
/// ```
#[must_use]
pub fn format(citation: &Citation, style: CitationStyle) -> String {
    let Some(article) = citation.article.as_deref() else {
        return citation.law_name().unwrap_or_default().to_string();
    };
    let paragraph = citation.paragraph.as_deref();

    match style {
        CitationStyle::Chinese => chinese(citation, article, paragraph),
        CitationStyle::English => english(citation, article, paragraph),
        CitationStyle::Full => format!(
            "{} ({})",
            chinese(citation, article, paragraph),
            english(citation, article, paragraph)
        ),
        CitationStyle::Short => short(citation, article, paragraph),
        CitationStyle::Pinpoint => pinpoint(article, paragraph),
    }
}

/// Glyph form of an arabic number; non-numeric references pass through.
fn glyphs(number: &str) -> String {
    number
        .parse::<u32>()
        .map(from_integer)
        .unwrap_or_else(|_| number.to_string())
}

fn pinpoint(article: &str, paragraph: Option<&str>) -> String {
    let mut out = format!("第{}条", glyphs(article));
    if let Some(p) = paragraph {
        out.push_str(&format!("第{}款", glyphs(p)));
    }
    out
}

fn chinese(citation: &Citation, article: &str, paragraph: Option<&str>) -> String {
    match citation.law_name() {
        Some(name) => format!("《{name}》{}", pinpoint(article, paragraph)),
        None => pinpoint(article, paragraph),
    }
}

fn english(citation: &Citation, article: &str, paragraph: Option<&str>) -> String {
    let mut out = format!("Article {article}");
    if let Some(p) = paragraph {
        out.push_str(&format!(", Paragraph {p}"));
    }
    let name = citation
        .title_en
        .as_deref()
        .or(citation.title.as_deref())
        .or(citation.short_name.as_deref())
        .or(citation.document_id.as_deref());
    if let Some(name) = name {
        out.push_str(", ");
        out.push_str(name);
    }
    out
}

fn short(citation: &Citation, article: &str, paragraph: Option<&str>) -> String {
    let mut out = format!("Art. {article}");
    if let Some(p) = paragraph {
        out.push_str(&format!(", Para. {p}"));
    }
    let name = citation
        .short_name
        .as_deref()
        .or(citation.document_id.as_deref())
        .or(citation.title_en.as_deref())
        .or(citation.title.as_deref());
    if let Some(name) = name {
        out.push_str(", ");
        out.push_str(name);
        if let (Some(year), Some(_)) = (citation.year, citation.short_name.as_ref()) {
            out.push_str(&format!(" {year}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pipl() -> Citation {
        Citation::article(21)
            .with_paragraph(2)
            .with_title("中华人民共和国个人信息保护法")
            .with_title_en("Personal Information Protection Law")
            .with_short_name("PIPL", Some(2021))
    }

    #[test]
    fn test_each_style() {
        let c = pipl();
        assert_eq!(
            format(&c, CitationStyle::Chinese),
            "《中华人民共和国个人信息保护法》第二十一条第二款"
        );
        assert_eq!(
            format(&c, CitationStyle::English),
            "Article 21, Paragraph 2, Personal Information Protection Law"
        );
        assert_eq!(
            format(&c, CitationStyle::Full),
            "《中华人民共和国个人信息保护法》第二十一条第二款 (Article 21, Paragraph 2, Personal Information Protection Law)"
        );
        assert_eq!(format(&c, CitationStyle::Short), "Art. 21, Para. 2, PIPL 2021");
        assert_eq!(format(&c, CitationStyle::Pinpoint), "第二十一条第二款");
    }

    #[test]
    fn test_missing_names_fall_back() {
        let c = Citation::article(10).with_document_id("DSL-2021");
        assert_eq!(format(&c, CitationStyle::Short), "Art. 10, DSL-2021");
        assert_eq!(format(&c, CitationStyle::English), "Article 10, DSL-2021");
        assert_eq!(format(&c, CitationStyle::Chinese), "《DSL-2021》第十条");

        let bare = Citation::article(10);
        assert_eq!(format(&bare, CitationStyle::Chinese), "第十条");
        assert_eq!(format(&bare, CitationStyle::English), "Article 10");
    }

    #[test]
    fn test_without_article() {
        let c = Citation::invalid("x");
        assert_eq!(format(&c, CitationStyle::Chinese), "");
        let c = Citation {
            title: Some("数据安全法".to_string()),
            ..Citation::default()
        };
        assert_eq!(format(&c, CitationStyle::English), "数据安全法");
    }
}
