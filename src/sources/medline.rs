//! MEDLINE citation parsing for E-utilities responses.
//!
//! `esearch` replies are small and regular, so they deserialize straight into
//! serde structs. `efetch` replies carry inline markup inside titles and
//! abstracts (`<i>`, `<sup>`, ...), which a derive-based model cannot hold, so
//! they are read into a lightweight element tree and navigated with Option
//! chains. Every element below `PMID` is optional: a missing element maps to
//! a sentinel or an empty value, never to an error.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;

use crate::models::{ArticleRecord, ArticleRecordBuilder, Pmid};
use crate::sources::SourceError;

/// Parse an `esearch` response into its ordered identifier list
pub fn parse_search_ids(xml: &str) -> Result<Vec<String>, SourceError> {
    #[derive(Debug, Deserialize)]
    #[allow(non_snake_case)]
    struct ESearchResult {
        IdList: Option<IdList>,
        #[serde(rename = "ERROR")]
        error: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct IdList {
        #[serde(rename = "Id", default)]
        ids: Vec<String>,
    }

    let result: ESearchResult = quick_xml::de::from_str(xml)
        .map_err(|e| SourceError::Parse(format!("Failed to parse PubMed search XML: {}", e)))?;

    if let Some(error) = result.error {
        return Err(SourceError::Api(format!("PubMed search error: {}", error)));
    }

    Ok(result
        .IdList
        .map(|list| {
            list.ids
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect()
        })
        .unwrap_or_default())
}

/// Parse an `efetch` response and extract its first article.
///
/// Returns `Ok(None)` when the payload is well-formed but holds no usable
/// citation (no `PubmedArticle`, or one without a PMID).
pub fn parse_article(xml: &str) -> Result<Option<ArticleRecord>, SourceError> {
    let document = XmlElement::parse(xml)?;
    Ok(first_article(&document).and_then(extract_article))
}

fn first_article(document: &XmlElement) -> Option<&XmlElement> {
    document
        .child("PubmedArticleSet")
        .and_then(|set| set.child("PubmedArticle"))
        .or_else(|| document.child("PubmedArticle"))
}

/// Build an [`ArticleRecord`] from one `PubmedArticle` element
pub(crate) fn extract_article(article: &XmlElement) -> Option<ArticleRecord> {
    let citation = article.child("MedlineCitation")?;
    let pmid = citation
        .child("PMID")
        .and_then(XmlElement::text_value)
        .and_then(|id| Pmid::parse(&id).ok())?;

    let details = citation.child("Article");
    let journal = details.and_then(|a| a.child("Journal"));
    let (doi, pmcid) = article_ids(article);

    let record = ArticleRecordBuilder::new(pmid)
        .title(
            details
                .and_then(|a| a.child("ArticleTitle"))
                .and_then(XmlElement::text_value),
        )
        .authors(details.map(authors).unwrap_or_default())
        .journal(
            journal
                .and_then(|j| j.child("Title"))
                .and_then(XmlElement::text_value),
        )
        .publication_date(journal.and_then(publication_date))
        .abstract_text(details.map(abstract_text).unwrap_or_default())
        .doi(doi.unwrap_or_default())
        .pmcid(pmcid.unwrap_or_default())
        .keywords(keywords(citation))
        .mesh_terms(mesh_terms(citation))
        .build();

    Some(record)
}

/// "LastName, ForeName" for every author that has a last name
fn authors(details: &XmlElement) -> Vec<String> {
    details
        .child("AuthorList")
        .map(|list| {
            list.children_named("Author")
                .filter_map(|author| {
                    let last = author.child("LastName").and_then(XmlElement::text_value)?;
                    let fore = author
                        .child("ForeName")
                        .and_then(XmlElement::text_value)
                        .unwrap_or_default();
                    Some(format!("{}, {}", last, fore).trim().to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Year, month and day joined by '-', skipping absent parts
fn publication_date(journal: &XmlElement) -> Option<String> {
    let pub_date = journal.child("JournalIssue")?.child("PubDate")?;
    let parts: Vec<String> = ["Year", "Month", "Day"]
        .iter()
        .filter_map(|part| pub_date.child(part).and_then(XmlElement::text_value))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("-"))
    }
}

fn abstract_text(details: &XmlElement) -> String {
    details
        .child("Abstract")
        .map(|a| {
            a.children_named("AbstractText")
                .filter_map(XmlElement::text_value)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// First DOI and first PMC ID, in a single pass over `ArticleIdList`
fn article_ids(article: &XmlElement) -> (Option<String>, Option<String>) {
    let mut doi = None;
    let mut pmcid = None;

    let ids = article
        .child("PubmedData")
        .and_then(|data| data.child("ArticleIdList"));

    for id in ids.into_iter().flat_map(|list| list.children_named("ArticleId")) {
        let slot = match id.attribute("IdType") {
            Some("doi") => &mut doi,
            Some("pmc") => &mut pmcid,
            _ => continue,
        };
        if slot.is_none() {
            *slot = id.text_value();
        }
    }

    (doi, pmcid)
}

fn keywords(citation: &XmlElement) -> Vec<String> {
    citation
        .children_named("KeywordList")
        .flat_map(|list| list.children_named("Keyword"))
        .filter_map(XmlElement::text_value)
        .collect()
}

fn mesh_terms(citation: &XmlElement) -> Vec<String> {
    citation
        .child("MeshHeadingList")
        .map(|list| {
            list.children_named("MeshHeading")
                .filter_map(|heading| heading.child("DescriptorName"))
                .filter_map(XmlElement::text_value)
                .collect()
        })
        .unwrap_or_default()
}

/// A node in a parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its attributes and ordered content
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    content: Vec<XmlNode>,
}

impl XmlElement {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, SourceError> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| SourceError::Parse(format!("XML: {}", e)))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    /// Parse a document into a synthetic root whose children are the
    /// top-level elements
    pub(crate) fn parse(xml: &str) -> Result<Self, SourceError> {
        let mut reader = Reader::from_str(xml);
        let mut stack = vec![Self::new("#document")];

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    stack_top(&mut stack)?.content.push(XmlNode::Element(element));
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| SourceError::Parse("XML: unbalanced end tag".into()))?;
                    stack_top(&mut stack)?.content.push(XmlNode::Element(element));
                }
                Event::Text(text) => {
                    let text = text.unescape()?.into_owned();
                    stack_top(&mut stack)?.content.push(XmlNode::Text(text));
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    stack_top(&mut stack)?.content.push(XmlNode::Text(text));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(root), true) => Ok(root),
            _ => Err(SourceError::Parse("XML: unexpected end of document".into())),
        }
    }

    /// Attribute value by name
    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements, in document order
    pub(crate) fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.content.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Child elements with the given name
    pub(crate) fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children().filter(move |child| child.name == name)
    }

    /// First child element with the given name
    pub(crate) fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children().find(|child| child.name == name)
    }

    /// All descendant text, concatenated in document order
    pub(crate) fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.content {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Trimmed text, or None when blank
    pub(crate) fn text_value(&self) -> Option<String> {
        let text = self.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

fn stack_top(stack: &mut [XmlElement]) -> Result<&mut XmlElement, SourceError> {
    stack
        .last_mut()
        .ok_or_else(|| SourceError::Parse("XML: unbalanced end tag".into()))
}
