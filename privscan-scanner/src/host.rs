// Host name helpers shared by the collector and the engine

/// Lower-case a host and strip a single leading `www.` label.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => host,
    }
}

/// True when `host` is `site` itself or one of its subdomains.
pub fn is_same_site(host: &str, site: &str) -> bool {
    let host = normalize_host(host);
    let site = normalize_host(site);
    if site.is_empty() {
        return false;
    }
    host == site || host.ends_with(&format!(".{}", site))
}
