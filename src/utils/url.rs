// src/utils/url.rs

//! URL manipulation utilities.

use crate::error::Result;

/// Return the URL with its `start` query parameter set to the given
/// pagination cursor, preserving all other parameters.
pub fn with_start(url_str: &str, start: usize) -> Result<String> {
    let mut url = url::Url::parse(url_str)?;

    let other_pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "start")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &other_pairs {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("start", &start.to_string());
    }

    Ok(url.to_string())
}

/// Extract the stable posting identifier from a URN-style attribute value
/// (the segment after the last colon).
pub fn id_from_urn(urn: &str) -> String {
    urn.rsplit(':').next().unwrap_or_default().trim().to_string()
}
