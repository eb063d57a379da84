use url::{Host, Url};

/// Require an http/https origin with a usable host and no credentials.
#[tracing::instrument(skip_all)]
pub fn validate_base_url(s: &str) -> Result<(), String> {
    let url = Url::parse(s).map_err(|e| e.to_string())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme: {other}")),
    }

    // Compose-style service names (`cms`, `strapi`) are fine here; only the
    // host's presence is required.
    match url.host() {
        Some(Host::Domain(d)) if !d.is_empty() => {}
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
        _ => return Err("missing host".into()),
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err("userinfo not allowed in base URL".into());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("base URL must not carry a query or fragment".into());
    }

    Ok(())
}

#[tracing::instrument(skip_all)]
pub fn validate_site_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("site name empty".into());
    }
    if name.len() > 120 {
        return Err("site name too long".into());
    }
    Ok(())
}
