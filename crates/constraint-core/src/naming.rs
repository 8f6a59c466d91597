//! Resource name syntax checks.
//!
//! Each check returns the list of problems with the candidate name; an empty
//! list means the name is valid. Messages follow the platform's wording so
//! operators recognise them, with the offending characters listed when the
//! character set is the problem.

use std::sync::LazyLock;

use regex::Regex;

const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
const DNS1035_LABEL_MAX_LENGTH: usize = 63;

const DNS1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const DNS1035_LABEL_FMT: &str = "[a-z]([-a-z0-9]*[a-z0-9])?";

// ── Cached regexes ────────────────────────────────────────────────────────────

static DNS1123_SUBDOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{DNS1123_LABEL_FMT}(\.{DNS1123_LABEL_FMT})*$"))
        .expect("DNS-1123 subdomain pattern compiles")
});

static DNS1035_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{DNS1035_LABEL_FMT}$")).expect("DNS-1035 label pattern compiles")
});

/// A lowercase RFC 1123 subdomain: dot-separated DNS-1123 labels, at most
/// 253 characters in total.
pub fn is_dns1123_subdomain(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        errors.push(max_len_error(DNS1123_SUBDOMAIN_MAX_LENGTH));
    }
    if !DNS1123_SUBDOMAIN_RE.is_match(value) {
        errors.push(format!(
            "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, \
             '-' or '.', and must start and end with an alphanumeric character \
             (e.g. 'example.com', regex used for validation is '{DNS1123_LABEL_FMT}(\\.{DNS1123_LABEL_FMT})*')"
        ));
        push_invalid_chars(&mut errors, value, |c| is_lower_alnum(c) || c == '-' || c == '.');
    }
    errors
}

/// An RFC 1035 label: like a DNS-1123 label, but must start with a letter.
pub fn is_dns1035_label(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.len() > DNS1035_LABEL_MAX_LENGTH {
        errors.push(max_len_error(DNS1035_LABEL_MAX_LENGTH));
    }
    if !DNS1035_LABEL_RE.is_match(value) {
        errors.push(format!(
            "a DNS-1035 label must consist of lower case alphanumeric characters or '-', \
             start with an alphabetic character, and end with an alphanumeric character \
             (e.g. 'my-name', regex used for validation is '{DNS1035_LABEL_FMT}')"
        ));
        push_invalid_chars(&mut errors, value, |c| is_lower_alnum(c) || c == '-');
    }
    errors
}

fn is_lower_alnum(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

fn max_len_error(max: usize) -> String {
    format!("must be no more than {max} characters")
}

fn push_invalid_chars(errors: &mut Vec<String>, value: &str, allowed: impl Fn(char) -> bool) {
    let mut offending: Vec<char> = Vec::new();
    for c in value.chars().filter(|c| !allowed(*c)) {
        if !offending.contains(&c) {
            offending.push(c);
        }
    }
    if !offending.is_empty() {
        let rendered: Vec<String> = offending.iter().map(|c| format!("'{c}'")).collect();
        errors.push(format!("invalid characters: {}", rendered.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdomain_accepts_dotted_lowercase_names() {
        assert!(is_dns1123_subdomain("k8srequiredlabels.constraints.gatekeeper.sh").is_empty());
        assert!(is_dns1123_subdomain("ns-must-have-owner").is_empty());
        assert!(is_dns1123_subdomain("a").is_empty());
    }

    #[test]
    fn subdomain_rejects_uppercase_and_underscore() {
        let errors = is_dns1123_subdomain("My_Bad_Name");
        assert_eq!(errors.len(), 2, "errors: {errors:?}");
        assert!(errors[0].contains("RFC 1123 subdomain"));
        assert_eq!(errors[1], "invalid characters: 'M', '_', 'B', 'N'");
    }

    #[test]
    fn subdomain_rejects_empty_labels_and_edges() {
        assert!(!is_dns1123_subdomain("").is_empty());
        assert!(!is_dns1123_subdomain("a..b").is_empty());
        assert!(!is_dns1123_subdomain("-a").is_empty());
        assert!(!is_dns1123_subdomain("a.").is_empty());
    }

    #[test]
    fn subdomain_rejects_overlong_names() {
        let name = "a".repeat(254);
        let errors = is_dns1123_subdomain(&name);
        assert_eq!(errors, vec!["must be no more than 253 characters".to_string()]);
    }

    #[test]
    fn subdomain_message_names_the_pattern() {
        let errors = is_dns1123_subdomain("a_b");
        assert!(errors[0].ends_with(
            "regex used for validation is '[a-z0-9]([-a-z0-9]*[a-z0-9])?(\\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*')"
        ));
        assert!(DNS1123_SUBDOMAIN_RE.is_match("a.b-c.d"));
        assert!(!DNS1123_SUBDOMAIN_RE.is_match("a.b\n"));
    }

    #[test]
    fn dns1035_requires_leading_letter() {
        assert!(is_dns1035_label("v1beta1").is_empty());
        assert!(!is_dns1035_label("1abc").is_empty());
        assert!(!is_dns1035_label(&"a".repeat(64)).is_empty());
    }
}
