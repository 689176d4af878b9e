//! Resolve the national index page into an ordered entity list.

use crate::error::ScrapeError;
use scraper::{Html, Selector};
use url::Url;

/// Entity link cards on the national index page.
const ENTITY_LINK_SELECTOR: &str = "div.infocard span.infocard-lg-img a";

/// One entity discovered on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReference {
    /// 1-based position on the index page. Document order is the canonical
    /// national numbering and is never re-sorted.
    pub ordinal: u32,
    /// Display name from the link text (the detail page heading may refine it).
    pub name: String,
    /// Absolute detail-page URL.
    pub url: String,
}

/// Parse the index page markup into the ordered entity list.
///
/// `index_url` is only used for error reporting. Fails with
/// [`ScrapeError::IndexParse`] when no entity links are found, which means
/// the upstream page structure changed; that is fatal to the run.
pub fn resolve_index(
    html: &str,
    base_url: &str,
    index_url: &str,
) -> Result<Vec<EntityReference>, ScrapeError> {
    let document = Html::parse_document(html);
    let mut entities = Vec::new();

    if let Ok(selector) = Selector::parse(ENTITY_LINK_SELECTOR) {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let url = resolve_href(base_url, href);
            let name = element.text().collect::<String>().trim().to_string();
            let name = if name.is_empty() {
                // Fall back to the last path segment, e.g. /pokedex/bulbasaur.
                href.rsplit('/').next().unwrap_or(href).to_string()
            } else {
                name
            };
            entities.push(EntityReference {
                ordinal: entities.len() as u32 + 1,
                name,
                url,
            });
        }
    }

    if entities.is_empty() {
        return Err(ScrapeError::IndexParse {
            url: index_url.to_string(),
        });
    }
    Ok(entities)
}

/// Resolve a possibly-relative href against the site base URL.
fn resolve_href(base_url: &str, href: &str) -> String {
    match Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        ),
    }
}
