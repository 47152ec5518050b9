mod common;

use common::{BrokenAtDistance, FixedClassifier};
use ppaxe::{
    error::ClassifierError,
    nlp::{
        classifier::{normalize, DECISION_THRESHOLD},
        features::columns,
        InteractionClassifier, LogisticClassifier, Sentence, FEATURE_COUNT,
    },
};

fn annotated(text: &str, tokens: Vec<ppaxe::nlp::Token>) -> Sentence {
    let mut sentence = Sentence::new(text);
    sentence.set_tokens(tokens);
    sentence
}

#[test]
fn confidence_is_rescaled_around_threshold() {
    let at_threshold = normalize(DECISION_THRESHOLD).unwrap();
    assert!(at_threshold.label);
    assert_eq!(at_threshold.confidence, 0.0);
    assert!(at_threshold.confidence.is_sign_positive());

    let confident = normalize(0.9).unwrap();
    assert!(confident.label);
    assert_eq!(confident.confidence, 0.778);

    let rejected = normalize(0.0).unwrap();
    assert!(!rejected.label);
    assert_eq!(rejected.confidence, -1.222);
}

#[test]
fn sentence_scores_every_candidate() {
    let mut sentence = annotated(common::MAPK_SENTENCE, common::mapk_tokens());
    let outcomes = sentence.score(&FixedClassifier(0.9)).unwrap();
    assert_eq!(outcomes.len(), 1);

    let candidate = &sentence.cached_candidates()[0];
    assert_eq!(candidate.label(), Some(true));
    assert_eq!(candidate.confidence(), Some(0.778));
    assert_eq!(candidate.to_string(), "[MAPK] may interact with [cryoglobulin]");
    assert_eq!(
        candidate.features().map(|f| f.get(columns::TOKEN_DISTANCE)),
        Some(3)
    );
}

#[test]
fn first_prediction_is_kept() {
    let mut sentence = annotated(common::MAPK_SENTENCE, common::mapk_tokens());
    sentence.score(&FixedClassifier(0.9)).unwrap();
    sentence.score(&FixedClassifier(0.1)).unwrap();
    assert_eq!(sentence.cached_candidates()[0].confidence(), Some(0.778));
}

#[test]
fn out_of_range_probability_fails_only_that_candidate() {
    let tokens = common::tokens(&[
        ("Fos", "Fos", "NN", true),
        ("binds", "bind", "VBZ", false),
        ("Jun", "Jun", "NN", true),
        ("and", "and", "CC", false),
        ("then", "then", "RB", false),
        ("Myc", "Myc", "NN", true),
    ]);
    let mut sentence = annotated("Fos binds Jun and then Myc", tokens);
    let classifier = BrokenAtDistance {
        distance: 1,
        otherwise: 0.2,
    };
    let outcomes = sentence.score(&classifier).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[0], Err(ClassifierError::OutOfRange(_))));
    assert!(outcomes[1].is_ok());
    assert!(outcomes[2].is_ok());

    let candidates = sentence.cached_candidates();
    assert_eq!(candidates[0].prediction(), None);
    assert_eq!(candidates[1].label(), Some(false));
    assert_eq!(candidates[2].label(), Some(false));
}

#[test]
fn unannotated_sentence_cannot_be_scored() {
    let mut sentence = Sentence::new("MAPK binds AKT3.");
    assert!(sentence.score(&FixedClassifier(0.9)).is_err());
    assert!(sentence.cached_candidates().is_empty());
}

#[test]
fn logistic_model_loads_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let mut weights = vec![0.0; FEATURE_COUNT];
    weights[columns::TOKEN_DISTANCE] = 1.0;
    let body = serde_json::json!({ "intercept": -3.0, "weights": weights });
    std::fs::write(&path, body.to_string()).unwrap();

    let model = LogisticClassifier::from_path(&path).unwrap();
    let mut sentence = annotated(common::MAPK_SENTENCE, common::mapk_tokens());
    sentence.compute_features().unwrap();
    let features = sentence.cached_candidates()[0].features().unwrap();
    // logit = 3 - 3
    let probability = model.predict_proba(features).unwrap();
    assert!((probability - 0.5).abs() < 1e-12);

    let prediction = normalize(probability).unwrap();
    assert!(!prediction.label);
    assert_eq!(prediction.confidence, -0.111);
}

#[test]
fn logistic_model_rejects_wrong_width() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, r#"{"intercept": 0.0, "weights": [1.0, 2.0]}"#).unwrap();
    assert!(matches!(
        LogisticClassifier::from_path(&path),
        Err(ClassifierError::Schema { expected: 178, found: 2 })
    ));
    assert!(matches!(
        LogisticClassifier::from_path(&dir.path().join("missing.json")),
        Err(ClassifierError::Load(_))
    ));
}

#[test]
fn candidate_markup_highlights_mentions_and_verbs() {
    let mut sentence = annotated(common::MAPK_SENTENCE, common::mapk_tokens());
    sentence.candidates().unwrap();
    let html = sentence.candidate_html(0).unwrap();
    insta::assert_snapshot!(
        html,
        @r#"The protein <span class="prot"> MAPK </span> <span class="verb">interacts</span> directly with <span class="prot"> cryoglobulin </span> which <span class="verb">is</span> very interesting ."#
    );
}

#[test]
fn candidate_markup_escapes_words() {
    let tokens = common::tokens(&[
        ("Fos", "Fos", "NN", true),
        ("<binds>", "bind", "VBZ", false),
        ("A&B", "A&B", "NN", true),
    ]);
    let mut sentence = annotated("Fos <binds> A&B", tokens);
    sentence.candidates().unwrap();
    assert_eq!(
        sentence.candidate_html(0).unwrap(),
        "<span class=\"prot\"> Fos </span> <span class=\"verb\">&lt;binds&gt;</span> <span class=\"prot\"> A&amp;B </span>"
    );
}
