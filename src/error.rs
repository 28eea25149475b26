error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Req(::reqwest::Error) #[cfg(feature = "http-client")];
        Json(::serde_json::Error);
        Toml(::toml::de::Error);
        Regex(::regex::Error);
        Date(::chrono::ParseError);
    }

    errors {
        NonSuccessStatus(code: u16, url: String) {
            description("The status code of a received response was not success.")
            display("The status code of the response from {} was {} and not success.",
                     url, code)
        }

        MissingPrerequisite(path: String, hint: String) {
            description("A file produced by an earlier step could not be found.")
            display("Required file '{}' could not be found; {}", path, hint)
        }

        HeroNotFound(name: String) {
            description("The requested hero is not in the hero mapping.")
            display("Hero '{}' not found in hero mapping", name)
        }

        NoHeroPage(name: String) {
            description("No wiki page could be fetched for a hero.")
            display("Failed to fetch a wiki page for '{}' after trying every URL spelling",
                     name)
        }

        InvalidConfig(msg: String) {
            description("A configuration value was rejected.")
            display("Invalid configuration: {}", msg)
        }
    }
}

/// Statuses that are worth another attempt: rate limiting and server side failures.
pub const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

impl Error {
    /// Whether a failed request is worth repeating.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            ErrorKind::NonSuccessStatus(code, _) => RETRYABLE_STATUSES.contains(code),
            #[cfg(feature = "http-client")]
            ErrorKind::Req(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn retryable_statuses() {
        let limited: Error = ErrorKind::NonSuccessStatus(429, "u".into()).into();
        let missing: Error = ErrorKind::NonSuccessStatus(404, "u".into()).into();
        let down: Error = ErrorKind::NonSuccessStatus(503, "u".into()).into();

        assert!(limited.is_retryable());
        assert!(down.is_retryable());
        assert!(!missing.is_retryable());
    }

    #[test]
    fn prerequisite_message_names_the_fix() {
        let err: Error = ErrorKind::MissingPrerequisite(
            "data/hero_mapping.json".into(),
            "run download_hero_assets first".into(),
        ).into();

        let text = err.to_string();
        assert!(text.contains("data/hero_mapping.json"));
        assert!(text.contains("download_hero_assets"));
    }
}
