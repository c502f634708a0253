use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub name: &'static str,
    pub url: String,
}

/// Canonical link to a post.
pub fn post_url(base: &str, post_id: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push("post")
        .push(post_id);
    Ok(url)
}

/// Intent URLs for the supported share targets.
pub fn share_links(base: &str, post_id: &str) -> Result<Vec<ShareLink>, url::ParseError> {
    let target = post_url(base, post_id)?.to_string();

    let with_query = |endpoint: &str, key: &str| -> Result<String, url::ParseError> {
        let mut url = Url::parse(endpoint)?;
        url.query_pairs_mut().append_pair(key, &target);
        Ok(url.to_string())
    };

    Ok(vec![
        ShareLink {
            name: "Facebook",
            url: with_query("https://www.facebook.com/sharer/sharer.php", "u")?,
        },
        ShareLink {
            name: "Twitter",
            url: with_query("https://twitter.com/intent/tweet", "url")?,
        },
        ShareLink {
            name: "WhatsApp",
            url: with_query("https://wa.me/", "text")?,
        },
    ])
}
