//! Shared fixtures for unit tests.

use chrono::{TimeZone, Utc};
use fagui_harvester::artifact::DocumentArtifact;
use fagui_harvester::types::{
    CrossReferenceDecl, Definition, Document, DocumentKind, DocumentStatus, ImplementationStatus,
    InstrumentType, Provision, RelationKind,
};

fn document(id: &str, title: &str, status: DocumentStatus) -> Document {
    Document {
        id: id.to_string(),
        kind: DocumentKind::Statute,
        title: title.to_string(),
        title_en: None,
        short_name: None,
        status,
        issued_date: None,
        in_force_date: None,
        url: format!("https://example.org/{id}"),
        description: None,
    }
}

fn artifact(document: Document, provisions: Vec<Provision>) -> DocumentArtifact {
    let mut artifact = DocumentArtifact::new(document);
    artifact.provisions = provisions;
    artifact.harvested_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    artifact
}

pub(crate) fn gdpr_reference(article: Option<&str>, provision_ref: Option<&str>) -> CrossReferenceDecl {
    CrossReferenceDecl {
        external_id: "gdpr".to_string(),
        instrument_type: InstrumentType::Regulation,
        year: 2016,
        number: 679,
        title: Some("General Data Protection Regulation".to_string()),
        short_name: Some("GDPR".to_string()),
        url: None,
        kind: if provision_ref.is_some() {
            RelationKind::CitesArticle
        } else {
            RelationKind::References
        },
        is_primary: provision_ref.is_none(),
        article: article.map(str::to_string),
        provision_ref: provision_ref.map(str::to_string),
        implementation_status: ImplementationStatus::Unknown,
        description: None,
    }
}

pub(crate) fn pipl_artifact() -> DocumentArtifact {
    let mut doc = document(
        "PIPL-2021",
        "中华人民共和国个人信息保护法",
        DocumentStatus::InForce,
    );
    doc.title_en = Some("Personal Information Protection Law".to_string());
    doc.short_name = Some("PIPL".to_string());

    let mut artifact = artifact(
        doc,
        vec![
            Provision::new(
                "PIPL-2021",
                "1",
                "为了保护个人信息权益，规范个人信息处理活动，制定本法。",
            ),
            Provision::new(
                "PIPL-2021",
                "13",
                "个人信息处理者处理个人信息，应当取得个人同意。\n同意应当由个人在充分知情的前提下自愿、明确作出。",
            ),
            Provision::new(
                "PIPL-2021",
                "73",
                "本法所称个人信息处理者，是指在个人信息处理活动中自主决定处理目的、处理方式的组织、个人。",
            ),
        ],
    );
    artifact.definitions = vec![Definition {
        term: "个人信息处理者".to_string(),
        definition: "在个人信息处理活动中自主决定处理目的、处理方式的组织、个人".to_string(),
        source_provision: Some("73".to_string()),
    }];
    artifact.cross_references = vec![
        gdpr_reference(None, None),
        gdpr_reference(Some("6"), Some("13")),
    ];
    artifact
}

pub(crate) fn dsl_artifact() -> DocumentArtifact {
    let mut doc = document("DSL-2021", "中华人民共和国数据安全法", DocumentStatus::Amended);
    doc.short_name = Some("DSL".to_string());
    artifact(
        doc,
        vec![
            Provision::new("DSL-2021", "1", "为了规范数据处理活动，保障数据安全，制定本法。"),
            Provision::new(
                "DSL-2021",
                "27",
                "开展数据处理活动应当依照法律、法规的规定。\n数据处理者应当建立健全全流程数据安全管理制度。",
            ),
        ],
    )
}

pub(crate) fn long_artifact(articles: usize) -> DocumentArtifact {
    let provisions = (1..=articles)
        .rev()
        .map(|i| Provision::new("LONG-2000", i.to_string(), format!("本条为测试条文{i}。")))
        .collect();
    artifact(
        document("LONG-2000", "测试长篇条例", DocumentStatus::InForce),
        provisions,
    )
}

pub(crate) fn artifact_with_xrefs(cross_references: Vec<CrossReferenceDecl>) -> DocumentArtifact {
    let mut artifact = pipl_artifact();
    artifact.cross_references = cross_references;
    artifact
}
