use crate::http::shared_client;
use crate::page::BookFields;
use itertools::Itertools;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const VOLUMES_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";
const UNKNOWN_AUTHOR: &str = "著者不明";

#[derive(Debug, Error)]
pub enum CatalogSearchError {
    #[error("{0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("{0}")]
    UrlError(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct VolumeList {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize, Default)]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(rename = "industryIdentifiers", default)]
    industry_identifiers: Vec<IndustryIdentifier>,
    #[serde(rename = "imageLinks")]
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    r#type: String,
    #[serde(default)]
    identifier: String,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    #[serde(default)]
    thumbnail: String,
}

async fn query_volumes(query: &str) -> Result<Vec<Volume>, CatalogSearchError> {
    let url = Url::parse_with_params(
        VOLUMES_ENDPOINT,
        [("q", query), ("maxResults", "40"), ("orderBy", "relevance")],
    )?;
    let list: VolumeList = shared_client().get(url).send().await?.json().await?;
    Ok(list.items)
}

/// A listing needs an ISBN to be filed; volumes without one are dropped.
fn fields_from_volume(volume: Volume) -> Option<BookFields> {
    let info = volume.volume_info;

    let isbn = info
        .industry_identifiers
        .iter()
        .find(|id| id.r#type == "ISBN_13" || id.r#type == "ISBN_10")
        .map(|id| id.identifier.clone())
        .filter(|isbn| !isbn.is_empty())?;

    let author = if info.authors.is_empty() {
        UNKNOWN_AUTHOR.to_owned()
    } else {
        info.authors.iter().join(", ")
    };

    Some(BookFields {
        isbn,
        title: info.title.unwrap_or_else(|| String::from("N/A")),
        author,
        thumbnail_url: info
            .image_links
            .map(|links| links.thumbnail)
            .unwrap_or_default(),
    })
}

/// Searches the public catalog for books matching the query.
///
/// Tries an author search first and falls back to a plain title/keyword
/// search when that turns up nothing.
///
/// # Errors
/// - If the catalog can't be reached
/// - If its reply isn't the expected JSON
pub async fn search(query: &str) -> Result<Vec<BookFields>, CatalogSearchError> {
    let items = query_volumes(&format!("inauthor:{query}")).await?;
    let items = if items.is_empty() {
        query_volumes(query).await?
    } else {
        items
    };

    let books: Vec<_> = items.into_iter().filter_map(fields_from_volume).collect();
    log::info!("catalog search for {query:?} matched {} books", books.len());
    Ok(books)
}
