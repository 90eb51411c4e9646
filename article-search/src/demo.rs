//! Demo run over a live engine: index lifecycle, single-document CRUD, bulk
//! writes and the supported query shapes.

use tracing::{info, instrument, warn};

use article_search_repository::{article_mappings, IndexConfig, SearchIndexClient, WriteOperation};
use article_search_shared::{
    Article, BoolQuery, HighlightOptions, QueryNode, RangeBuilder, SearchPage, SearchRequest,
    SortOrder,
};

use crate::AppError;

fn sample_articles() -> Vec<Article> {
    vec![
        Article::new(2, "学习", "好好学习天天向上"),
        Article::new(3, "工作", "兢兢业业工作"),
        Article::new(4, "job", "work hard every day"),
    ]
}

fn log_page(label: &str, page: &SearchPage<Article>) {
    info!(
        query = %label,
        total = page.total,
        ids = ?page.ids(),
        failures = page.failures.len(),
        "Search results"
    );
    for hit in &page.hits {
        if !hit.highlights.is_empty() {
            info!(query = %label, id = %hit.id, highlights = ?hit.highlights, "Highlighted hit");
        }
    }
}

/// Run every scenario against `index`, then remove the demo documents.
#[instrument(skip(client))]
pub async fn run(client: &SearchIndexClient, index: &str) -> Result<(), AppError> {
    let body = IndexConfig::default().article_index_body();
    if client.ensure_index(index, Some(&body)).await? {
        info!(index = %index, "Created article index");
    } else {
        // An index created elsewhere may lack the keyword sub-fields.
        client.put_mapping(index, &article_mappings()).await?;
        info!(index = %index, "Applied article mappings to existing index");
    }

    single_document(client, index).await?;
    bulk_writes(client, index).await?;
    client.refresh(index).await?;
    queries(client, index).await?;
    cleanup(client, index).await?;

    Ok(())
}

async fn single_document(client: &SearchIndexClient, index: &str) -> Result<(), AppError> {
    let article = Article::new(1, "测试1", "这是一个文档");
    let outcome = client.put(index, &article).await?;
    info!(id = article.id, outcome = ?outcome, "Stored article");

    let fetched = client.get::<Article>(index, "1").await?;
    info!(found = fetched.is_found(), article = ?fetched, "Fetched article");

    let missing = client.delete(index, "999").await?;
    info!(outcome = ?missing, "Deleted missing article");
    Ok(())
}

async fn bulk_writes(client: &SearchIndexClient, index: &str) -> Result<(), AppError> {
    let summary = client.bulk_index(index, &sample_articles()).await?;
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Bulk indexed sample articles"
    );

    let operations = vec![
        WriteOperation::index_document(index, &Article::new(5, "文档", "需要删除"))?,
        WriteOperation::delete(index, "5"),
        WriteOperation::delete(index, "1"),
    ];
    let summary = client.bulk(&operations).await?;
    for operation in summary.failed_operations(&operations) {
        warn!(
            id = %operation.id(),
            kind = operation.kind().as_str(),
            "Bulk operation needs a retry"
        );
    }
    Ok(())
}

async fn queries(client: &SearchIndexClient, index: &str) -> Result<(), AppError> {
    let request = SearchRequest::new(index, QueryNode::match_query("title", "学习"))
        .highlight(HighlightOptions::new(["title"]));
    log_page("match title", &client.search(&request).await?);

    let request = SearchRequest::new(index, QueryNode::term("content.keyword", "兢兢业业工作"));
    log_page("term content.keyword", &client.search(&request).await?);

    let request = SearchRequest::new(index, QueryNode::terms("id", [2, 3]));
    log_page("terms id", &client.search(&request).await?);

    let request = SearchRequest::new(index, QueryNode::query_string("学习"));
    log_page("query string", &client.search(&request).await?);

    let request = SearchRequest::new(index, QueryNode::query_string_in("title", "工作 OR job"));
    log_page("query string on title", &client.search(&request).await?);

    let request = SearchRequest::new(index, QueryNode::ids(["3"]));
    log_page("ids", &client.search(&request).await?);

    let request = SearchRequest::new(index, RangeBuilder::new("id").gt(2).lt(4).build()?);
    log_page("range 2 < id < 4", &client.search(&request).await?);

    let request = SearchRequest::new(index, RangeBuilder::new("id").gte(3).lte(2).build()?);
    log_page("empty range", &client.search(&request).await?);

    let query = BoolQuery::new()
        .should(QueryNode::term("title.keyword", "job"))
        .should(QueryNode::match_query("id", "4").boost(10.0));
    let request = SearchRequest::new(index, query.into());
    log_page("should title or id", &client.search(&request).await?);

    let request = SearchRequest::match_all(index)
        .sort_by("id", SortOrder::Desc)
        .include_fields(["id", "title"]);
    log_page("projected, id desc", &client.search(&request).await?);

    let request = SearchRequest::new(index, QueryNode::match_phrase("content", "work hard"))
        .highlight(HighlightOptions::new(["content"]).with_tags("<b>", "</b>"));
    log_page("match phrase", &client.search(&request).await?);

    let request = SearchRequest::match_all(index)
        .sort_by("id", SortOrder::Asc)
        .from(1)
        .size(2);
    log_page("second page", &client.search(&request).await?);

    Ok(())
}

async fn cleanup(client: &SearchIndexClient, index: &str) -> Result<(), AppError> {
    let operations: Vec<WriteOperation> = sample_articles()
        .iter()
        .map(|article| WriteOperation::delete(index, article.id.to_string()))
        .collect();
    let summary = client.bulk(&operations).await?;
    info!(removed = summary.succeeded, "Removed demo articles");
    Ok(())
}
