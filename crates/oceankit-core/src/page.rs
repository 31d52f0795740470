//! Paginated listing helper
//!
//! List endpoints return a named array plus pagination links
//! (`links.pages.next`). These helpers follow the links until the server
//! stops providing one, either aggregating every element or
//! short-circuiting on a predicate. Element order is whatever the server
//! returns; no further ordering is promised.

use crate::error::Result;
use crate::json;
use crate::transport::ApiClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Largest page size the API accepts
pub const MAX_PER_PAGE: u32 = 200;

/// Collect every element of a paginated listing
pub async fn collect_all<T: DeserializeOwned>(
    client: &ApiClient,
    first_uri: &str,
    field: &str,
) -> Result<Vec<T>> {
    let mut elements = Vec::new();
    let mut uri = with_per_page(first_uri);
    loop {
        let body = client.get(&uri).await?;
        for item in json::array_field(&body, field)? {
            elements.push(serde_json::from_value(item.clone())?);
        }
        match next_link(&body) {
            Some(next) => uri = next,
            None => break,
        }
    }
    debug!(field, count = elements.len(), "collected paginated listing");
    Ok(elements)
}

/// Return the first element matching the predicate, fetching no further
/// pages once a match is found
pub async fn find_first<T, P>(
    client: &ApiClient,
    first_uri: &str,
    field: &str,
    predicate: P,
) -> Result<Option<T>>
where
    T: DeserializeOwned,
    P: Fn(&T) -> bool,
{
    let mut uri = with_per_page(first_uri);
    loop {
        let body = client.get(&uri).await?;
        for item in json::array_field(&body, field)? {
            let element: T = serde_json::from_value(item.clone())?;
            if predicate(&element) {
                return Ok(Some(element));
            }
        }
        match next_link(&body) {
            Some(next) => uri = next,
            None => return Ok(None),
        }
    }
}

/// The server's next-page link, if it sent one. Termination of the listing
/// loops rests on this returning `None` once the last page is reached.
fn next_link(body: &Value) -> Option<String> {
    body.get("links")?
        .get("pages")?
        .get("next")?
        .as_str()
        .map(ToString::to_string)
}

fn with_per_page(uri: &str) -> String {
    if uri.contains("per_page=") {
        uri.to_string()
    } else if uri.contains('?') {
        format!("{uri}&per_page={MAX_PER_PAGE}")
    } else {
        format!("{uri}?per_page={MAX_PER_PAGE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn next_link_follows_server_shape() {
        let body = json!({
            "droplets": [],
            "links": {"pages": {"next": "https://api.digitalocean.com/v2/droplets?page=2"}}
        });
        assert_eq!(
            next_link(&body).as_deref(),
            Some("https://api.digitalocean.com/v2/droplets?page=2")
        );

        assert_eq!(next_link(&json!({"droplets": [], "links": {}})), None);
        assert_eq!(next_link(&json!({"droplets": []})), None);
    }

    #[test]
    fn per_page_is_appended_once() {
        assert_eq!(
            with_per_page("/v2/droplets"),
            "/v2/droplets?per_page=200"
        );
        assert_eq!(
            with_per_page("/v2/droplets?tag_name=web"),
            "/v2/droplets?tag_name=web&per_page=200"
        );
        assert_eq!(
            with_per_page("/v2/droplets?per_page=25"),
            "/v2/droplets?per_page=25"
        );
    }
}
