use crate::highlight::highlight;
use crate::snippet::build_snippet;
use crate::types::{DocumentStore, Hit, ResultItem};

/// Turn engine hits into display records.
///
/// Keeps the engine's order and takes at most `cap` hits. A hit whose
/// reference is missing from the store, or stored as `null`, still renders:
/// its title falls back to the reference and its snippet is empty.
pub fn render_results(
    hits: &[Hit],
    terms: &[String],
    docs: &DocumentStore,
    cap: usize,
) -> Vec<ResultItem> {
    hits.iter()
        .take(cap)
        .map(|hit| {
            let doc = docs.get(&hit.reference).and_then(Option::as_ref);
            let title = doc
                .and_then(|d| d.title.as_deref())
                .filter(|t| !t.is_empty())
                .unwrap_or(&hit.reference);
            let body = doc.and_then(|d| d.body.as_deref()).unwrap_or("");

            ResultItem {
                reference: hit.reference.clone(),
                title: title.to_string(),
                snippet_html: highlight(&build_snippet(body, terms), terms),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMeta;

    fn doc(title: Option<&str>, body: Option<&str>) -> Option<DocumentMeta> {
        Some(DocumentMeta {
            title: title.map(String::from),
            body: body.map(String::from),
        })
    }

    #[test]
    fn test_render_in_engine_order() {
        let mut docs = DocumentStore::new();
        docs.insert("/a".into(), doc(Some("Alpha"), Some("first letter")));
        docs.insert("/b".into(), doc(Some("Beta"), Some("second letter")));
        let hits = vec![Hit::new("/a", 2.0), Hit::new("/b", 1.0)];

        let items = render_results(&hits, &["letter".to_string()], &docs, 20);
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
        assert_eq!(items[0].href(), "/a");
        assert_eq!(items[0].snippet_html, "first <mark>letter</mark>");
    }

    #[test]
    fn test_cap_limits_rows() {
        let hits: Vec<Hit> = (0..30).map(|i| Hit::new(format!("/p{}", i), 1.0)).collect();
        let items = render_results(&hits, &[], &DocumentStore::new(), 20);
        assert_eq!(items.len(), 20);
        assert_eq!(items[19].reference, "/p19");
    }

    #[test]
    fn test_missing_document_degrades() {
        let mut docs = DocumentStore::new();
        docs.insert("/untitled".into(), doc(Some(""), None));
        let hits = vec![Hit::new("/gone", 1.0), Hit::new("/untitled", 0.5)];

        let items = render_results(&hits, &["x".to_string()], &docs, 20);
        assert_eq!(items[0].title, "/gone");
        assert_eq!(items[0].snippet_html, "");
        assert_eq!(items[1].title, "/untitled");
    }

    #[test]
    fn test_unsaved_document_degrades() {
        let docs: DocumentStore = serde_json::from_str(
            r#"{"/saved": {"title": "Saved", "body": "kept text"}, "/unsaved": null}"#,
        )
        .unwrap();
        let hits = vec![Hit::new("/unsaved", 2.0), Hit::new("/saved", 1.0)];

        let items = render_results(&hits, &["text".to_string()], &docs, 20);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "/unsaved");
        assert_eq!(items[0].snippet_html, "");
        assert_eq!(items[1].title, "Saved");
        assert_eq!(items[1].snippet_html, "kept <mark>text</mark>");
    }

    #[test]
    fn test_title_is_not_html() {
        let mut docs = DocumentStore::new();
        docs.insert("/t".into(), doc(Some("<T> & generics"), Some("body")));
        let items = render_results(&[Hit::new("/t", 1.0)], &[], &docs, 20);
        // Titles are set as text content by the view, never as markup
        assert_eq!(items[0].title, "<T> & generics");
    }
}
