//! PubMed and PubMed Central retrieval through NCBI E-utilities.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use quick_xml::{events::Event, Reader};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{config::Settings, error::QueryError};

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const IDCONV_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/";

/// Article text and metadata fed into the segmenter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub pmid: String,
    #[serde(default)]
    pub pmcid: Option<String>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub fulltext: Option<String>,
    #[serde(default)]
    pub abstract_text: Option<String>,
}

impl ArticleRecord {
    /// Full text when present, otherwise the abstract.
    pub fn text(&self) -> Option<&str> {
        [self.fulltext.as_deref(), self.abstract_text.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }
}

/// Which database to pull text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Database {
    /// Full text from PubMed Central.
    Pmc,
    /// Abstracts from PubMed.
    Pubmed,
}

/// Articles retrieved for a query, split by whether each id was found.
#[derive(Debug, Default)]
pub struct QueryOutcome {
    pub articles: Vec<ArticleRecord>,
    pub found: BTreeSet<String>,
    pub not_found: BTreeSet<String>,
}

/// Translate PubMed ids to PMC ids (without the `PMC` prefix). Ids with no
/// PMC counterpart are dropped.
pub async fn pmid_to_pmcid(ids: &[String], settings: &Settings) -> Result<Vec<String>, QueryError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let client = http_client(settings)?;
    let url = format!(
        "{IDCONV_URL}?ids={ids}&format=json&tool={tool}&email={email}",
        ids = ids.join(","),
        tool = settings.pubmed_tool,
        email = settings.pubmed_email
    );
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|source| QueryError::Request {
            service: "idconv",
            source,
        })?;
    if !resp.status().is_success() {
        return Err(QueryError::Status {
            service: "idconv",
            status: resp.status().as_u16(),
        });
    }
    let body = resp.text().await.map_err(|source| QueryError::Request {
        service: "idconv",
        source,
    })?;
    parse_idconv(&body)
}

/// Extract PMC ids from an idconv JSON payload.
pub fn parse_idconv(body: &str) -> Result<Vec<String>, QueryError> {
    let payload: IdConvResponse = serde_json::from_str(body).map_err(|err| QueryError::Decode {
        service: "idconv",
        message: err.to_string(),
    })?;
    let pmcids: BTreeSet<String> = payload
        .records
        .into_iter()
        .filter(|record| record.status.is_none())
        .filter_map(|record| record.pmcid)
        .map(|pmcid| pmcid.trim_start_matches("PMC").to_string())
        .collect();
    Ok(pmcids.into_iter().collect())
}

/// Retrieve articles for a list of PubMed ids.
pub async fn fetch_articles(
    ids: &[String],
    database: Database,
    settings: &Settings,
) -> Result<QueryOutcome, QueryError> {
    let mut outcome = QueryOutcome::default();
    if ids.is_empty() {
        return Ok(outcome);
    }
    let (db, fetch_ids) = match database {
        Database::Pmc => ("pmc", pmid_to_pmcid(ids, settings).await?),
        Database::Pubmed => ("pubmed", ids.to_vec()),
    };
    if !fetch_ids.is_empty() {
        let client = http_client(settings)?;
        let url = format!(
            "{EUTILS_BASE}/efetch.fcgi?db={db}&retmode=xml&id={ids}&tool={tool}&email={email}",
            ids = fetch_ids.join(","),
            tool = settings.pubmed_tool,
            email = settings.pubmed_email
        );
        let resp = client
            .get(&url)
            .send()
            .await
            .map_err(|source| QueryError::Request {
                service: "efetch",
                source,
            })?;
        if !resp.status().is_success() {
            return Err(QueryError::Status {
                service: "efetch",
                status: resp.status().as_u16(),
            });
        }
        let xml = resp.text().await.map_err(|source| QueryError::Request {
            service: "efetch",
            source,
        })?;
        outcome.articles = match database {
            Database::Pmc => parse_pmc_articles(&xml)?,
            Database::Pubmed => parse_pubmed_abstracts(&xml)?,
        };
    }
    outcome.found = outcome.articles.iter().map(|a| a.pmid.clone()).collect();
    outcome.not_found = ids
        .iter()
        .filter(|id| !outcome.found.contains(*id))
        .cloned()
        .collect();
    // records without text are still "found" but carry nothing to analyse
    outcome.articles.retain(|article| article.text().is_some());
    if !outcome.not_found.is_empty() {
        warn!(missing = ?outcome.not_found, "ids not found");
    }
    info!(db, found = outcome.found.len(), "fetched articles");
    Ok(outcome)
}

#[derive(Default)]
struct PmcArticleBuilder {
    record: ArticleRecord,
    paragraphs: Vec<String>,
    has_body: bool,
}

/// Parse a PMC `efetch` JATS document.
///
/// Paragraph text is gathered from every `<p>` inside `<body>`, skipping
/// citation `<xref>` markers; paragraphs are joined by newlines.
pub fn parse_pmc_articles(xml: &str) -> Result<Vec<ArticleRecord>, QueryError> {
    let decode_err = |message: String| QueryError::Decode {
        service: "efetch",
        message,
    };
    let mut reader = Reader::from_str(xml);
    let mut articles = Vec::new();
    let mut current: Option<PmcArticleBuilder> = None;
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut id_type: Option<String> = None;
    let mut paragraph: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                let name = element.name().as_ref().to_vec();
                match name.as_slice() {
                    b"article" if current.is_none() => {
                        current = Some(PmcArticleBuilder::default());
                        stack.clear();
                    }
                    b"article-id" => {
                        id_type = element
                            .try_get_attribute("pub-id-type")
                            .map_err(|e| decode_err(e.to_string()))?
                            .and_then(|attr| attr.unescape_value().ok())
                            .map(|value| value.into_owned());
                    }
                    b"body" => {
                        if let Some(article) = current.as_mut() {
                            article.has_body = true;
                        }
                    }
                    b"p" if stack.iter().any(|n| n == b"body") && paragraph.is_none() => {
                        paragraph = Some(String::new());
                    }
                    _ => {}
                }
                if current.is_some() {
                    stack.push(name);
                }
            }
            Ok(Event::Text(text)) => {
                let Some(article) = current.as_mut() else {
                    continue;
                };
                let value = text.unescape().map_err(|e| decode_err(e.to_string()))?;
                let top = stack.last().map(Vec::as_slice);
                match top {
                    Some(b"article-id") => match id_type.as_deref() {
                        Some("pmid") => article.record.pmid = value.trim().to_string(),
                        Some("pmc") | Some("pmcid") => {
                            article.record.pmcid =
                                Some(value.trim().trim_start_matches("PMC").to_string())
                        }
                        _ => {}
                    },
                    Some(b"journal-title") if article.record.journal.is_none() => {
                        article.record.journal = Some(value.trim().to_string());
                    }
                    Some(b"year")
                        if article.record.year.is_none()
                            && stack.iter().any(|n| n == b"pub-date") =>
                    {
                        article.record.year = value.trim().parse().ok();
                    }
                    _ => {
                        if let Some(buffer) = paragraph.as_mut() {
                            if !stack.iter().any(|n| n == b"xref") {
                                buffer.push_str(&value);
                            }
                        }
                    }
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(buffer) = paragraph.as_mut() {
                    buffer.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::End(element)) => {
                if current.is_none() {
                    continue;
                }
                let name = element.name();
                stack.pop();
                match name.as_ref() {
                    b"p" if !stack.iter().any(|n| n == b"p") => {
                        if let (Some(article), Some(text)) = (current.as_mut(), paragraph.take()) {
                            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                            if !text.is_empty() {
                                article.paragraphs.push(text);
                            }
                        }
                    }
                    b"article-id" => id_type = None,
                    b"article" if stack.is_empty() => {
                        if let Some(article) = current.take() {
                            articles.push(article.finish());
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(decode_err(err.to_string())),
            _ => {}
        }
    }
    Ok(articles)
}

impl PmcArticleBuilder {
    fn finish(self) -> ArticleRecord {
        let mut record = self.record;
        if self.has_body && !self.paragraphs.is_empty() {
            record.fulltext = Some(self.paragraphs.join("\n"));
        }
        record
    }
}

/// Parse a PubMed `efetch` document into abstract-only records.
///
/// `<AbstractText>` is mixed content: text inside inline markup such as
/// `<i>` or `<sup>` belongs to the abstract. Labelled sections are joined by
/// newlines. The article date wins over the journal issue date.
pub fn parse_pubmed_abstracts(xml: &str) -> Result<Vec<ArticleRecord>, QueryError> {
    let decode_err = |message: String| QueryError::Decode {
        service: "efetch",
        message,
    };
    let mut reader = Reader::from_str(xml);
    let mut articles = Vec::new();
    let mut current: Option<PubmedArticleBuilder> = None;
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut section: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                let name = element.name().as_ref().to_vec();
                match name.as_slice() {
                    b"PubmedArticle" if current.is_none() => {
                        current = Some(PubmedArticleBuilder::default());
                        stack.clear();
                    }
                    b"AbstractText" if section.is_none() => section = Some(String::new()),
                    _ => {}
                }
                if current.is_some() {
                    stack.push(name);
                }
            }
            Ok(Event::Text(text)) => {
                let Some(article) = current.as_mut() else {
                    continue;
                };
                let value = text.unescape().map_err(|e| decode_err(e.to_string()))?;
                if let Some(buffer) = section.as_mut() {
                    buffer.push_str(&value);
                    continue;
                }
                let depth = stack.len();
                let parent = depth
                    .checked_sub(2)
                    .map(|at| stack[at].as_slice());
                match (stack.last().map(Vec::as_slice), parent) {
                    (Some(b"PMID"), Some(b"MedlineCitation")) if article.record.pmid.is_empty() => {
                        article.record.pmid = value.trim().to_string();
                    }
                    (Some(b"Title"), Some(b"Journal")) if article.record.journal.is_none() => {
                        article.record.journal = Some(value.trim().to_string());
                    }
                    (Some(b"Year"), Some(b"ArticleDate")) => {
                        article.article_year = value.trim().parse().ok();
                    }
                    (Some(b"Year"), Some(b"PubDate"))
                        if stack.iter().any(|n| n == b"JournalIssue") =>
                    {
                        article.issue_year = value.trim().parse().ok();
                    }
                    _ => {}
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(buffer) = section.as_mut() {
                    buffer.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::End(element)) => {
                if current.is_none() {
                    continue;
                }
                stack.pop();
                match element.name().as_ref() {
                    b"AbstractText" if !stack.iter().any(|n| n == b"AbstractText") => {
                        if let (Some(article), Some(text)) = (current.as_mut(), section.take()) {
                            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                            if !text.is_empty() {
                                article.sections.push(text);
                            }
                        }
                    }
                    b"PubmedArticle" if stack.is_empty() => {
                        if let Some(article) = current.take() {
                            articles.push(article.finish());
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(decode_err(err.to_string())),
            _ => {}
        }
    }
    Ok(articles)
}

#[derive(Default)]
struct PubmedArticleBuilder {
    record: ArticleRecord,
    sections: Vec<String>,
    article_year: Option<i32>,
    issue_year: Option<i32>,
}

impl PubmedArticleBuilder {
    fn finish(self) -> ArticleRecord {
        let mut record = self.record;
        record.year = self.article_year.or(self.issue_year);
        if !self.sections.is_empty() {
            record.abstract_text = Some(self.sections.join("\n"));
        }
        record
    }
}

/// Write records as JSON lines.
pub fn persist_records(path: &Path, records: &[ArticleRecord]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path).with_context(|| format!("create {path:?}"))?;
    for record in records {
        let line = serde_json::to_string(record)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
    }
    info!(path = %path.display(), count = records.len(), "saved article records");
    Ok(path.to_path_buf())
}

/// Read JSON-lines records, skipping blank lines.
pub fn load_records(path: &Path) -> Result<Vec<ArticleRecord>> {
    let file = File::open(path).with_context(|| format!("open {path:?}"))?;
    let mut records = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ArticleRecord = serde_json::from_str(&line)
            .with_context(|| format!("decode {path:?} line {}", lineno + 1))?;
        records.push(record);
    }
    Ok(records)
}

fn http_client(settings: &Settings) -> Result<Client, QueryError> {
    Client::builder()
        .user_agent(format!("ppaxe/0.1 (+{})", settings.pubmed_email))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|source| QueryError::Request {
            service: "http client",
            source,
        })
}

#[derive(Debug, Deserialize)]
struct IdConvResponse {
    #[serde(default)]
    records: Vec<IdConvRecord>,
}

#[derive(Debug, Deserialize)]
struct IdConvRecord {
    pmcid: Option<String>,
    status: Option<String>,
}
