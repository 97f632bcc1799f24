//! URI template matching for resources.
//!
//! Templates like `design://file/{file_key}/node/{node_id}` are compiled once
//! at registration into a segment list, so `resources/read` matching is a
//! simple walk instead of per-request string surgery.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A compiled URI template.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    raw: String,
    scheme: String,
    segments: Vec<Segment>,
}

impl UriTemplate {
    /// Compile a template. Placeholders use `{name}` syntax and must span a
    /// whole path segment.
    pub fn compile(template: &str) -> Self {
        let (scheme, rest) = match template.split_once("://") {
            Some((s, r)) => (s.to_string(), r),
            None => (String::new(), template),
        };
        let segments = rest
            .split('/')
            .map(|seg| {
                if seg.starts_with('{') && seg.ends_with('}') && seg.len() > 2 {
                    Segment::Variable(seg[1..seg.len() - 1].to_string())
                } else {
                    Segment::Literal(seg.to_string())
                }
            })
            .collect();
        Self {
            raw: template.to_string(),
            scheme,
            segments,
        }
    }

    /// The template string as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a concrete URI, returning captured variables on success.
    pub fn matches(&self, uri: &str) -> Option<HashMap<String, String>> {
        let (scheme, rest) = match uri.split_once("://") {
            Some((s, r)) => (s, r),
            None => ("", uri),
        };
        if scheme != self.scheme {
            return None;
        }

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut vars = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Variable(_) if part.is_empty() => return None,
                Segment::Variable(name) => {
                    vars.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_template_matches_exactly() {
        let t = UriTemplate::compile("design://projects");
        assert!(t.matches("design://projects").is_some());
        assert!(t.matches("design://projects/extra").is_none());
        assert!(t.matches("other://projects").is_none());
    }

    #[test]
    fn variables_capture_segments() {
        let t = UriTemplate::compile("design://file/{file_key}/node/{node_id}");
        let vars = t.matches("design://file/a1B2/node/13:7").unwrap();
        assert_eq!(vars["file_key"], "a1B2");
        assert_eq!(vars["node_id"], "13:7");
    }

    #[test]
    fn empty_segment_does_not_bind() {
        let t = UriTemplate::compile("design://file/{file_key}");
        assert!(t.matches("design://file/").is_none());
    }

    #[test]
    fn segment_count_must_match() {
        let t = UriTemplate::compile("design://file/{file_key}");
        assert!(t.matches("design://file/a/b").is_none());
        assert!(t.matches("design://file").is_none());
    }

    #[test]
    fn braces_inside_literal_are_literal() {
        // `{}` is too short to be a placeholder
        let t = UriTemplate::compile("design://x/{}");
        assert!(t.matches("design://x/{}").is_some());
        assert!(t.matches("design://x/anything").is_none());
    }
}
