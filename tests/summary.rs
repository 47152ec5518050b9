mod common;

use std::sync::Arc;

use common::FixedClassifier;
use ppaxe::{
    data::pubmed::ArticleRecord,
    nlp::{AnalyzedArticle, Pipeline, StaticAnnotator},
    summary::{InteractionSummary, ProteinSort, ProteinSummary, ReportSummary},
};

async fn analysed() -> Vec<AnalyzedArticle> {
    let annotator = StaticAnnotator::new()
        .with_sentence(common::MAPK_SENTENCE, common::mapk_tokens())
        .with_sentence(common::PROT12_SENTENCE, common::prot12_tokens())
        .with_sentence(
            "MAPK binds AKT3.",
            common::tokens(&[
                ("MAPK", "MAPK", "NN", true),
                ("binds", "bind", "VBZ", false),
                ("AKT3", "AKT3", "NN", true),
                (".", ".", ".", false),
            ]),
        );
    let pipeline = Pipeline::new(Arc::new(annotator), Arc::new(FixedClassifier(0.9)), 2);
    let records = vec![
        ArticleRecord {
            pmid: "101".to_string(),
            fulltext: Some(format!("{} {}", common::MAPK_SENTENCE, common::PROT12_SENTENCE)),
            ..ArticleRecord::default()
        },
        ArticleRecord {
            pmid: "202".to_string(),
            abstract_text: Some("MAPK binds AKT3.".to_string()),
            ..ArticleRecord::default()
        },
    ];
    pipeline.analyze_batch(&records).await.articles
}

#[tokio::test]
async fn proteins_are_counted_per_normalized_symbol() {
    let articles = analysed().await;
    let summary = ProteinSummary::build(&articles);
    assert_eq!(summary.len(), 5);

    let mapk = &summary.proteins["MAPK"];
    assert_eq!(mapk.total_count, 2);
    assert_eq!(mapk.article_counts["101"], 1);
    assert_eq!(mapk.article_counts["202"], 1);
    assert_eq!(mapk.left_count, 2);
    assert_eq!(mapk.right_count, 0);

    let cryoglobulin = &summary.proteins["CRYOGLOBULIN"];
    assert_eq!(cryoglobulin.right_count, 1);
    assert_eq!(cryoglobulin.interaction_count(), 1);

    let by_total = summary.sorted(ProteinSort::TotalCount);
    assert_eq!(by_total[0].0, "MAPK");
    let by_right = summary.sorted(ProteinSort::Right);
    assert_eq!(by_right[0].1.right_count, 1);
}

#[tokio::test]
async fn interactions_list_positive_candidates() {
    let articles = analysed().await;
    let interactions = InteractionSummary::build(&articles);
    assert_eq!(interactions.total(), 3);
    assert_eq!(interactions.unique_interactions, 3);

    let row = &interactions.interactions[0];
    assert_eq!(row.pmid, "101");
    assert_eq!(row.prot1, "MAPK");
    assert_eq!(row.prot2_normalized, "CRYOGLOBULIN");
    assert_eq!(row.confidence, 0.778);
    assert!(row.sentence_html.contains("<span class=\"prot\"> MAPK </span>"));
}

#[tokio::test]
async fn report_is_written_to_disk() {
    let articles = analysed().await;
    let report = ReportSummary::build(&articles);
    assert_eq!(report.total_articles, 2);
    assert_eq!(report.total_proteins, 5);
    assert_eq!(report.total_interactions, 3);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report");
    let (json_path, csv_path) = report.write(&out).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["total_interactions"], 3);
    assert_eq!(json["proteins"]["proteins"]["MAPK"]["total_count"], 2);

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "confidence");
    assert_eq!(&headers[5], "pmid");
    assert_eq!(reader.records().count(), 3);
}
