//! Podcast feed extraction
//!
//! Pulls the per-episode fields out of an RSS document. Dates are returned
//! exactly as written in the feed.

use crate::error::IndexingError;
use crate::query::XmlIndexer;
use crate::strategy::XmlHash;

/// One `rss/channel/item` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastItem {
    pub title: String,
    /// Raw `pubDate` text
    pub pub_date: String,
    pub link: String,
}

impl PodcastItem {
    /// Read an item's fields; a missing field fails with its lookup error
    pub fn from_indexer(item: &XmlIndexer) -> Result<Self, IndexingError> {
        Ok(PodcastItem {
            title: child_text(item, "title")?,
            pub_date: child_text(item, "pubDate")?,
            link: child_text(item, "link")?,
        })
    }
}

/// Text of the first child named `key`; an empty element yields ""
fn child_text(item: &XmlIndexer, key: &str) -> Result<String, IndexingError> {
    let child = item.by_key(key).by_index(0).resolve();
    match (child.element(), child.error()) {
        (Some(elem), _) => Ok(elem.text().unwrap_or_default().to_string()),
        (None, Some(err)) => Err(err.clone()),
        (None, None) => Err(IndexingError::KeyNotFound {
            key: key.to_string(),
        }),
    }
}

/// Extract every item of an already parsed feed
pub fn podcast_items(feed: &XmlIndexer) -> Result<Vec<PodcastItem>, IndexingError> {
    let items = feed.by_key("rss").by_key("channel").by_key("item").resolve();
    if let Some(err) = items.error() {
        return Err(err.clone());
    }
    items.all().iter().map(PodcastItem::from_indexer).collect()
}

/// Parse feed bytes and extract its items
///
/// Unlike a namespace-processing parse, names are kept as written, so
/// `itunes:title` and similar extension elements stay distinct from the
/// plain RSS fields instead of colliding with them by local name.
pub fn parse_podcast_feed(input: &[u8]) -> Result<Vec<PodcastItem>, IndexingError> {
    podcast_items(&XmlHash::default().parse(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Show</title>
    <item>
      <title>Ep1</title>
      <itunes:title>Episode One</itunes:title>
      <pubDate>Tue, 02 Jan 2024 10:00:00 +0000</pubDate>
      <link>https://example.com/1</link>
    </item>
    <item>
      <title>Ep2 &amp; more</title>
      <pubDate>Wed, 03 Jan 2024 10:00:00 +0000</pubDate>
      <link><![CDATA[https://example.com/2?a=1&b=2]]></link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_podcast_feed() {
        let items = parse_podcast_feed(FEED.as_bytes()).unwrap();
        assert_eq!(
            items,
            vec![
                PodcastItem {
                    title: "Ep1".into(),
                    pub_date: "Tue, 02 Jan 2024 10:00:00 +0000".into(),
                    link: "https://example.com/1".into(),
                },
                PodcastItem {
                    title: "Ep2 & more".into(),
                    pub_date: "Wed, 03 Jan 2024 10:00:00 +0000".into(),
                    link: "https://example.com/2?a=1&b=2".into(),
                },
            ]
        );
    }

    #[test]
    fn test_lazy_feed() {
        let feed = XmlHash::lazy(FEED);
        let items = podcast_items(&feed).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Ep1");
    }

    #[test]
    fn test_missing_field() {
        let xml = "<rss><channel><item><title>Ep1</title></item></channel></rss>";
        let err = parse_podcast_feed(xml.as_bytes()).unwrap_err();
        assert_eq!(err, IndexingError::KeyNotFound { key: "pubDate".into() });
    }

    #[test]
    fn test_not_a_feed() {
        let err = parse_podcast_feed(b"<html/>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);

        let err = parse_podcast_feed(b"<rss>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }
}
