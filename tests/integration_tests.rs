//! Integration tests for the `pubmed_articles` tool.
//!
//! The real `PubMedSource` is pointed at a local mockito server standing in
//! for NCBI E-utilities.

use mockito::{Matcher, Mock, Server, ServerGuard};
use pubmed_articles_mcp::mcp::{Dispatcher, ToolRegistry, PUBMED_ARTICLES_TOOL};
use pubmed_articles_mcp::sources::{LiteratureSource, PubMedSource};
use pubmed_articles_mcp::utils::HttpClient;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn esearch_xml(ids: &[&str]) -> String {
    let ids: String = ids.iter().map(|id| format!("<Id>{}</Id>", id)).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<eSearchResult><Count>{count}</Count><RetMax>{count}</RetMax><RetStart>0</RetStart><IdList>{ids}</IdList></eSearchResult>"#,
        count = ids.len(),
        ids = ids
    )
}

fn efetch_xml(pmid: &str, title: &str, pmcid: Option<&str>) -> String {
    let pmc = pmcid
        .map(|id| format!(r#"<ArticleId IdType="pmc">{}</ArticleId>"#, id))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" ?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">{pmid}</PMID>
      <Article>
        <Journal>
          <JournalIssue><PubDate><Year>2023</Year><Month>Mar</Month></PubDate></JournalIssue>
          <Title>Journal of Integration</Title>
        </Journal>
        <ArticleTitle>{title}</ArticleTitle>
        <AuthorList>
          <Author><LastName>Curie</LastName><ForeName>Marie</ForeName></Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
    <PubmedData>
      <ArticleIdList>
        <ArticleId IdType="pubmed">{pmid}</ArticleId>
        <ArticleId IdType="doi">10.1000/{pmid}</ArticleId>
        {pmc}
      </ArticleIdList>
    </PubmedData>
  </PubmedArticle>
</PubmedArticleSet>"#,
        pmid = pmid,
        title = title,
        pmc = pmc
    )
}

fn source_for(server: &ServerGuard) -> Arc<PubMedSource> {
    let client = HttpClient::with_settings("pubmed-articles-mcp-tests", Duration::from_secs(5))
        .expect("client");
    Arc::new(PubMedSource::with_client(client, &server.url()).expect("source"))
}

fn dispatcher_for(server: &ServerGuard) -> Dispatcher {
    Dispatcher::new(source_for(server))
}

async fn mock_esearch(server: &mut ServerGuard, ids: &[&str]) -> Mock {
    server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::UrlEncoded("db".into(), "pubmed".into()))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(esearch_xml(ids))
        .create_async()
        .await
}

async fn mock_efetch(server: &mut ServerGuard, pmid: &str, pmcid: Option<&str>, hits: usize) -> Mock {
    server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("db".into(), "pubmed".into()),
            Matcher::UrlEncoded("id".into(), pmid.into()),
            Matcher::UrlEncoded("retmode".into(), "xml".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(efetch_xml(pmid, &format!("Article {}", pmid), pmcid))
        .expect(hits)
        .create_async()
        .await
}

fn pmids(result: &Value) -> Vec<String> {
    result
        .as_array()
        .expect("array result")
        .iter()
        .map(|article| article["pmid"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_search_keywords_preserves_order_and_bound() {
    let mut server = Server::new_async().await;

    let esearch = server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("term".into(), "prime editing".into()),
            Matcher::UrlEncoded("retmax".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(esearch_xml(&["300", "100", "200"]))
        .expect(1)
        .create_async()
        .await;
    let first = mock_efetch(&mut server, "300", None, 1).await;
    let second = mock_efetch(&mut server, "100", None, 1).await;
    let beyond_bound = mock_efetch(&mut server, "200", None, 0).await;

    let result = dispatcher_for(&server)
        .dispatch(json!({"method": "search_keywords", "keywords": "prime editing", "num_results": 2}))
        .await;

    assert_eq!(pmids(&result), vec!["300", "100"]);
    assert_eq!(result[0]["title"], "Article 300");
    assert_eq!(result[0]["authors"], json!(["Curie, Marie"]));
    assert_eq!(result[0]["journal"], "Journal of Integration");
    assert_eq!(result[0]["publication_date"], "2023-Mar");
    assert_eq!(result[0]["url"], "https://pubmed.ncbi.nlm.nih.gov/300/");

    esearch.assert_async().await;
    first.assert_async().await;
    second.assert_async().await;
    beyond_bound.assert_async().await;
}

#[tokio::test]
async fn test_search_drops_articles_that_fail_to_fetch() {
    let mut server = Server::new_async().await;

    let _esearch = mock_esearch(&mut server, &["1", "2", "3"]).await;
    let _one = mock_efetch(&mut server, "1", None, 1).await;
    let failing = server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "2".into()))
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let _three = mock_efetch(&mut server, "3", None, 1).await;

    let result = dispatcher_for(&server)
        .dispatch(json!({"method": "search_keywords", "keywords": "anything"}))
        .await;

    assert_eq!(pmids(&result), vec!["1", "3"]);
    failing.assert_async().await;
}

#[tokio::test]
async fn test_search_failure_degrades_to_empty_list() {
    let mut server = Server::new_async().await;

    let esearch = server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let efetch = server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let result = dispatcher_for(&server)
        .dispatch(json!({"method": "search_keywords", "keywords": "anything"}))
        .await;

    assert_eq!(result, json!([]));
    esearch.assert_async().await;
    efetch.assert_async().await;
}

#[tokio::test]
async fn test_search_with_malformed_or_empty_results() {
    let mut server = Server::new_async().await;

    let _malformed = server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::UrlEncoded("term".into(), "broken".into()))
        .with_status(200)
        .with_body("<eSearchResult><IdList><Id>1</Id>")
        .create_async()
        .await;
    let _empty = server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::UrlEncoded("term".into(), "nothing".into()))
        .with_status(200)
        .with_body(esearch_xml(&[]))
        .create_async()
        .await;

    let source = source_for(&server);
    let dispatcher = Dispatcher::new(source);

    for keywords in ["broken", "nothing"] {
        let result = dispatcher
            .dispatch(json!({"method": "search_keywords", "keywords": keywords}))
            .await;
        assert_eq!(result, json!([]), "keywords: {}", keywords);
    }
}

#[tokio::test]
async fn test_search_advanced_sends_composed_term() {
    let mut server = Server::new_async().await;

    let esearch = server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::UrlEncoded(
            "term".into(),
            "CRISPR[Title] AND Smith J[Author] AND 2020/01/01:3000[Date - Publication]".into(),
        ))
        .with_status(200)
        .with_body(esearch_xml(&["42"]))
        .expect(1)
        .create_async()
        .await;
    let _fetch = mock_efetch(&mut server, "42", None, 1).await;

    let result = dispatcher_for(&server)
        .dispatch(json!({
            "method": "search_advanced",
            "title": "CRISPR",
            "author": "Smith J",
            "start_date": "2020/01/01"
        }))
        .await;

    assert_eq!(pmids(&result), vec!["42"]);
    esearch.assert_async().await;
}

#[tokio::test]
async fn test_search_advanced_without_filters_makes_no_requests() {
    let mut server = Server::new_async().await;

    let esearch = server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let efetch = server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let result = dispatcher_for(&server)
        .dispatch(json!({"method": "search_advanced", "journal": "", "num_results": 5}))
        .await;

    assert_eq!(
        result,
        json!({"error": "Validation error: at least one search parameter required"})
    );
    esearch.assert_async().await;
    efetch.assert_async().await;
}

#[tokio::test]
async fn test_metadata_pmid_forms_are_equivalent() {
    let mut server = Server::new_async().await;
    let efetch = mock_efetch(&mut server, "31452104", Some("PMC6907074"), 2).await;

    let dispatcher = dispatcher_for(&server);
    let from_int = dispatcher
        .dispatch(json!({"method": "get_article_metadata", "pmid": 31452104}))
        .await;
    let from_str = dispatcher
        .dispatch(json!({"method": "get_article_metadata", "pmid": "31452104"}))
        .await;

    assert_eq!(from_int, from_str);
    assert_eq!(from_int["doi"], "10.1000/31452104");
    assert_eq!(from_int["pmcid"], "PMC6907074");
    efetch.assert_async().await;
}

#[tokio::test]
async fn test_metadata_missing_article_is_null() {
    let mut server = Server::new_async().await;
    let _empty = server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "999".into()))
        .with_status(200)
        .with_body("<PubmedArticleSet></PubmedArticleSet>")
        .create_async()
        .await;
    let _down = server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "998".into()))
        .with_status(502)
        .create_async()
        .await;

    let dispatcher = dispatcher_for(&server);
    for pmid in ["999", "998"] {
        let result = dispatcher
            .dispatch(json!({"method": "get_article_metadata", "pmid": pmid}))
            .await;
        assert_eq!(result, Value::Null, "pmid: {}", pmid);
    }
}

#[tokio::test]
async fn test_pdf_resolution_end_to_end() {
    let mut server = Server::new_async().await;
    let _open = mock_efetch(&mut server, "10", Some("PMC1234567"), 1).await;
    let _closed = mock_efetch(&mut server, "11", None, 1).await;

    let dispatcher = dispatcher_for(&server);

    let open = dispatcher
        .dispatch(json!({"method": "get_article_pdf", "pmid": 10}))
        .await;
    assert_eq!(
        open["pdf_url"],
        "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC1234567/pdf/"
    );
    assert!(open["message"].is_string());

    let closed = dispatcher
        .dispatch(json!({"method": "get_article_pdf", "pmid": 11}))
        .await;
    assert!(closed.get("pdf_url").is_none());
    assert!(closed["message"].is_string());
}

#[tokio::test]
async fn test_tool_registry_end_to_end() {
    let mut server = Server::new_async().await;
    let _fetch = mock_efetch(&mut server, "7", None, 1).await;

    let source = source_for(&server);
    assert_eq!(source.id(), "pubmed");

    let registry = ToolRegistry::new(Dispatcher::new(source));
    let result = registry
        .execute(
            PUBMED_ARTICLES_TOOL,
            json!({"method": "get_article_metadata", "pmid": "7"}),
        )
        .await
        .expect("handler never fails");
    assert_eq!(result["title"], "Article 7");

    let unknown = registry
        .execute(PUBMED_ARTICLES_TOOL, json!({"method": "download"}))
        .await
        .expect("handler never fails");
    assert!(unknown["error"]
        .as_str()
        .is_some_and(|msg| msg.contains("download")));
}
