//! Light normalization for emails and URLs.

/// Tracking query parameters stripped from URLs.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "msclkid", "mc_eid", "igshid"];

/// Lowercases the domain part of an email, leaving the local part intact.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Removes tracking query parameters (`utm_*` and common click IDs); drops
/// the `?` entirely when nothing survives.
pub fn normalize_url(url: &str) -> String {
    let (base, rest) = match url.split_once('?') {
        Some((base, rest)) => (base, rest),
        None => return url.to_string(),
    };
    let (query, fragment) = match rest.split_once('#') {
        Some((query, fragment)) => (query, Some(fragment)),
        None => (rest, None),
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|param| {
            let key = param.split('=').next().unwrap_or_default().to_lowercase();
            !key.starts_with("utm_") && !TRACKING_PARAMS.contains(&key.as_str())
        })
        .collect();

    let mut out = base.to_string();
    if !kept.is_empty() {
        out.push('?');
        out.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
