use std::fmt;

/// Scheme used to reach the configured host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpScheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    #[default]
    Https,
}

impl HttpScheme {
    /// Port used when the builder is not given one.
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }

    /// The scheme as written in a URL.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for HttpScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(HttpScheme::Http, 80, "http")]
    #[case(HttpScheme::Https, 443, "https")]
    fn should_expose_port_and_name(
        #[case] scheme: HttpScheme,
        #[case] port: u16,
        #[case] name: &str,
    ) {
        assert_eq!(scheme.default_port(), port);
        assert_eq!(scheme.as_str(), name);
        assert_eq!(scheme.to_string(), name);
    }

    #[test]
    fn should_default_to_https() {
        assert_eq!(HttpScheme::default(), HttpScheme::Https);
    }
}
