use std::borrow::Cow;

/// Scrub token material from text that may end up in logs or error messages.
pub(crate) fn redact_secrets(input: &str) -> Cow<'_, str> {
    let mut redacted = input.to_string();

    for marker in ["\"accessToken\":\"", "\"refreshToken\":\""] {
        redacted = redact_after(redacted, marker, |ch| ch == '"');
    }
    for marker in ["accessToken=", "refreshToken="] {
        redacted = redact_after(redacted, marker, |ch| {
            ch == '&' || ch == ';' || ch.is_whitespace()
        });
    }
    redacted = redact_after(redacted, "Bearer ", |ch| ch == '"' || ch.is_whitespace());

    if redacted == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(redacted)
    }
}

fn redact_after(text: String, marker: &str, is_boundary: impl Fn(char) -> bool) -> String {
    if !text.contains(marker) {
        return text;
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(idx) = rest.find(marker) {
        out.push_str(&rest[..idx + marker.len()]);
        rest = &rest[idx + marker.len()..];

        // Consume the token tail up to the next boundary character.
        let mut consumed = 0;
        for ch in rest.chars() {
            if is_boundary(ch) {
                break;
            }
            consumed += ch.len_utf8();
        }
        out.push_str("REDACTED");
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_secrets_redacts_json_token_fields() {
        let input = r#"unexpected body: {"accessToken":"eyJhbGciOi","refreshToken":"rt-123"}"#;
        let out = redact_secrets(input).to_string();
        assert!(out.contains(r#""accessToken":"REDACTED""#));
        assert!(out.contains(r#""refreshToken":"REDACTED""#));
        assert!(!out.contains("eyJhbGciOi"));
        assert!(!out.contains("rt-123"));
    }

    #[test]
    fn redact_secrets_redacts_bearer_tokens() {
        let input = "Authorization: Bearer tok-abc123\nOther: ok\n";
        let out = redact_secrets(input).to_string();
        assert_eq!(out, "Authorization: Bearer REDACTED\nOther: ok\n");
    }

    #[test]
    fn redact_secrets_leaves_clean_input_borrowed() {
        let input = "connection reset by peer";
        assert!(matches!(redact_secrets(input), Cow::Borrowed(_)));
    }
}
