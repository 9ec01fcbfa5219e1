//! Utility functions for loading proxy lists.

use crate::error::SourceError;

use reqwest::Client;
use std::collections::HashSet;

/// Fetch and parse a list of proxies from a URL or file path.
pub(crate) async fn fetch_proxies_from_source(source: &str) -> Result<Vec<String>, SourceError> {
    let content = if source.starts_with("http://") || source.starts_with("https://") {
        let client = Client::new();
        let response = client.get(source).send().await?.error_for_status()?;
        response.text().await?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .map_err(|source_err| SourceError::Io {
                path: source.to_string(),
                source: source_err,
            })?
    };
    Ok(parse_proxy_list(&content))
}

/// Parse one proxy address per line.
pub(crate) fn parse_proxy_list(content: &str) -> Vec<String> {
    normalize_addresses(content.lines())
}

/// Trim every address, drop blanks and `#` comments, and keep the first
/// occurrence of each address.
pub(crate) fn normalize_addresses<I, S>(addresses: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    addresses
        .into_iter()
        .filter_map(|address| {
            let address = address.as_ref().trim();
            if address.is_empty() || address.starts_with('#') {
                None
            } else {
                Some(address.to_string())
            }
        })
        .filter(|address| seen.insert(address.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_duplicates_and_comments() {
        let addresses = normalize_addresses(["  proxy1  ", "#comment", "proxy1", ""]);
        assert_eq!(addresses, vec!["proxy1".to_string()]);
    }

    #[test]
    fn test_normalize_keeps_first_seen_order() {
        let addresses = normalize_addresses(["b", "a", "  # a comment", "b", "c", "   "]);
        assert_eq!(addresses, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_parse_proxy_list_lines() {
        let content = "# proxies\nhttp://1.2.3.4:80\r\n\nsocks5://5.6.7.8:1080\nhttp://1.2.3.4:80\n";
        assert_eq!(
            parse_proxy_list(content),
            vec!["http://1.2.3.4:80", "socks5://5.6.7.8:1080"]
        );
    }

    #[tokio::test]
    async fn test_fetch_from_missing_file_fails() {
        let err = fetch_proxies_from_source("/nonexistent/deeplx-proxy-pool/proxies.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[tokio::test]
    async fn test_fetch_from_file() {
        let path = std::env::temp_dir().join(format!("deeplx-proxy-pool-{}.txt", std::process::id()));
        std::fs::write(&path, "http://a:1\n#skip\nhttp://b:2\n").unwrap();

        let proxies = fetch_proxies_from_source(path.to_str().unwrap()).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(proxies, vec!["http://a:1", "http://b:2"]);
    }
}
