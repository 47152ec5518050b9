//! Token annotation: the tagged token model and annotation service adapters.

use std::{collections::HashMap, path::Path, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use urlencoding::encode;

use crate::error::AnnotationError;

/// Named-entity tag assigned by the annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NerTag {
    Protein,
    Other,
}

impl From<String> for NerTag {
    fn from(value: String) -> Self {
        if value == "P" {
            Self::Protein
        } else {
            Self::Other
        }
    }
}

impl From<NerTag> for String {
    fn from(value: NerTag) -> Self {
        match value {
            NerTag::Protein => "P".to_string(),
            NerTag::Other => "O".to_string(),
        }
    }
}

/// One annotated token. `index` is 1-based within its sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub word: String,
    pub lemma: String,
    pub pos: String,
    pub ner: NerTag,
}

impl Token {
    pub fn new(
        index: usize,
        word: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<String>,
        ner: NerTag,
    ) -> Self {
        Self {
            index,
            word: word.into(),
            lemma: lemma.into(),
            pos: pos.into(),
            ner,
        }
    }

    pub fn is_protein(&self) -> bool {
        self.ner == NerTag::Protein
    }

    pub fn is_verb(&self) -> bool {
        self.pos.starts_with("VB")
    }
}

/// Capability that turns a sentence into its tagged token sequence.
#[async_trait]
pub trait AnnotationService: Send + Sync {
    async fn annotate(&self, sentence: &str) -> Result<Vec<Token>, AnnotationError>;
}

/// Reject token sequences whose indices are not exactly `1..=n` in order.
pub fn validate_tokens(tokens: &[Token]) -> Result<(), AnnotationError> {
    for (offset, token) in tokens.iter().enumerate() {
        if token.index != offset + 1 {
            return Err(AnnotationError::Malformed(format!(
                "token {:?} has index {} at position {}",
                token.word,
                token.index,
                offset + 1
            )));
        }
    }
    Ok(())
}

/// HTTP client for a Stanford CoreNLP server running the protein NER model.
#[derive(Debug, Clone)]
pub struct CoreNlpClient {
    client: Client,
    base_url: String,
}

impl CoreNlpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AnnotationError> {
        let client = Client::builder()
            .user_agent("ppaxe/0.1")
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn request_url(&self) -> String {
        let properties = serde_json::json!({
            "annotators": "tokenize,ssplit,pos,lemma,ner",
            "outputFormat": "json",
            "ssplit.isOneSentence": "true",
        })
        .to_string();
        format!(
            "{base}/?properties={props}",
            base = self.base_url.trim_end_matches('/'),
            props = encode(&properties)
        )
    }
}

#[async_trait]
impl AnnotationService for CoreNlpClient {
    async fn annotate(&self, sentence: &str) -> Result<Vec<Token>, AnnotationError> {
        let resp = self
            .client
            .post(self.request_url())
            .body(sentence.to_string())
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AnnotationError::Status {
                status: resp.status().as_u16(),
            });
        }
        let body = resp.bytes().await?;
        let tokens = parse_corenlp_response(&body)?;
        debug!(tokens = tokens.len(), "annotated sentence");
        Ok(tokens)
    }
}

/// Decode the JSON document produced by CoreNLP into validated tokens.
pub fn parse_corenlp_response(body: &[u8]) -> Result<Vec<Token>, AnnotationError> {
    let document: CoreNlpDocument = serde_json::from_slice(body)?;
    let sentence = document
        .sentences
        .into_iter()
        .next()
        .ok_or_else(|| AnnotationError::Malformed("response contains no sentence".into()))?;
    validate_tokens(&sentence.tokens)?;
    Ok(sentence.tokens)
}

#[derive(Debug, Deserialize)]
struct CoreNlpDocument {
    #[serde(default)]
    sentences: Vec<CoreNlpSentence>,
}

#[derive(Debug, Deserialize)]
struct CoreNlpSentence {
    tokens: Vec<Token>,
}

/// Annotator backed by a precomputed sentence to tokens table.
#[derive(Debug, Clone, Default)]
pub struct StaticAnnotator {
    table: HashMap<String, Vec<Token>>,
}

impl StaticAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentence(mut self, sentence: &str, tokens: Vec<Token>) -> Self {
        self.insert(sentence, tokens);
        self
    }

    pub fn insert(&mut self, sentence: &str, tokens: Vec<Token>) {
        self.table.insert(sentence.trim().to_string(), tokens);
    }

    /// Load a JSON object mapping sentence text to token arrays.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read annotations {}", path.display()))?;
        let entries: HashMap<String, Vec<Token>> =
            serde_json::from_str(&raw).context("decode annotations table")?;
        let mut annotator = Self::new();
        for (sentence, tokens) in entries {
            annotator.insert(&sentence, tokens);
        }
        Ok(annotator)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait]
impl AnnotationService for StaticAnnotator {
    async fn annotate(&self, sentence: &str) -> Result<Vec<Token>, AnnotationError> {
        let tokens = self
            .table
            .get(sentence.trim())
            .cloned()
            .ok_or_else(|| AnnotationError::Missing(sentence.to_string()))?;
        validate_tokens(&tokens)?;
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corenlp_payload_is_decoded() {
        let body = br#"{"sentences":[{"index":0,"tokens":[
            {"index":1,"word":"MAPK","originalText":"MAPK","lemma":"MAPK","pos":"NN","ner":"P"},
            {"index":2,"word":"binds","originalText":"binds","lemma":"bind","pos":"VBZ","ner":"O"},
            {"index":3,"word":"AKT3","originalText":"AKT3","lemma":"AKT3","pos":"NN","ner":"P"}
        ]}]}"#;
        let tokens = parse_corenlp_response(body).unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(tokens[0].is_protein());
        assert_eq!(tokens[1].lemma, "bind");
        assert_eq!(tokens[1].ner, NerTag::Other);
    }

    #[test]
    fn unknown_ner_labels_are_other() {
        assert_eq!(NerTag::from("PERSON".to_string()), NerTag::Other);
        assert_eq!(NerTag::from("P".to_string()), NerTag::Protein);
    }

    #[test]
    fn gapped_indices_are_rejected() {
        let tokens = vec![
            Token::new(1, "A", "a", "NN", NerTag::Other),
            Token::new(3, "B", "b", "NN", NerTag::Other),
        ];
        assert!(matches!(
            validate_tokens(&tokens),
            Err(AnnotationError::Malformed(_))
        ));
    }

    #[test]
    fn empty_response_is_malformed() {
        let err = parse_corenlp_response(br#"{"sentences":[]}"#).unwrap_err();
        assert!(matches!(err, AnnotationError::Malformed(_)));
    }
}
