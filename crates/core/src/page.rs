//! Page context — the client-observed snapshot of the current page.
//!
//! Supplied per request by the widget, never persisted. It is descriptive
//! data only: the prompt assembler places it in a labeled data section and
//! never lets it near the policy turn.

use serde::{Deserialize, Serialize};

/// Coarse classification of the page the user is looking at.
///
/// Wire values the gateway does not recognize deserialize to `Unknown`
/// rather than failing the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Faq,
    Admin,
    Profile,
    Registration,
    Intro,
    About,
    Social,
    Settings,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A small descriptive snapshot of the current page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    /// Full page URL as the client observed it
    #[serde(default)]
    pub url: String,

    /// Client-side route (e.g. "/collection/42")
    #[serde(default)]
    pub route: String,

    /// Document title
    #[serde(default)]
    pub title: String,

    /// Text of the page's main heading
    #[serde(default)]
    pub h1: String,

    /// Coarse page classification
    #[serde(default)]
    pub page_type: PageType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_type_wire_names() {
        let json = serde_json::to_string(&PageType::Faq).unwrap();
        assert_eq!(json, "\"faq\"");

        let parsed: PageType = serde_json::from_str("\"registration\"").unwrap();
        assert_eq!(parsed, PageType::Registration);
    }

    #[test]
    fn unrecognized_page_type_is_unknown() {
        let parsed: PageType = serde_json::from_str("\"checkout\"").unwrap();
        assert_eq!(parsed, PageType::Unknown);
    }

    #[test]
    fn page_context_camel_case() {
        let ctx = PageContext {
            url: "https://vitrine.example/faq".into(),
            route: "/faq".into(),
            title: "FAQ".into(),
            h1: "Frequently Asked Questions".into(),
            page_type: PageType::Faq,
        };
        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains("\"pageType\":\"faq\""));
        assert!(json.contains("\"h1\""));
    }

    #[test]
    fn missing_fields_default() {
        let ctx: PageContext = serde_json::from_str(r#"{"url":"https://x"}"#).unwrap();
        assert_eq!(ctx.url, "https://x");
        assert!(ctx.title.is_empty());
        assert_eq!(ctx.page_type, PageType::Unknown);
    }
}
