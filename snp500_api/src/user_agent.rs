/// User agent sent with every page request.
///
/// Wikipedia asks automated clients to identify themselves rather than
/// impersonate a browser.
pub fn get_user_agent() -> &'static str {
    concat!("snp500-history/", env!("CARGO_PKG_VERSION"), " (reqwest)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_names_the_crate_version() {
        let ua = get_user_agent();
        assert!(ua.starts_with("snp500-history/"));
        assert!(ua.contains(env!("CARGO_PKG_VERSION")));
    }
}
