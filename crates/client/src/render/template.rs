//! Card HTML templates.
//!
//! Every style shares one document skeleton; the root element always carries
//! class `ogp-card` because that is the region the renderer captures.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use html_escape::{encode_double_quoted_attribute, encode_text};
use ogpcache_core::Error;

/// CSS selector of the element that becomes the card image.
pub const CARD_SELECTOR: &str = ".ogp-card";

const BASE_CSS: &str = r#"
body {
    font-family: Arial, sans-serif;
    display: flex;
    justify-content: center;
    align-items: center;
    min-height: 100vh;
    margin: 0;
}
.ogp-card {
    border: 1px solid #ddd;
    border-radius: 8px;
    box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
    background-color: #fff;
    overflow: hidden;
}
.ogp-card a {
    text-decoration: none;
    color: inherit;
    display: block;
}
.ogp-image {
    display: block;
    width: 100%;
    height: auto;
}
.ogp-content {
    padding: 16px;
}
.ogp-title {
    font-size: 1.5em;
    margin: 0 0 8px;
}
.ogp-description {
    color: #555;
    margin: 0 0 16px;
}
.ogp-site-name {
    font-size: 0.9em;
    color: #888;
    margin: 0;
}
"#;

const LANDSCAPE_CSS: &str = r#"
.ogp-card { width: 600px; }
"#;

const PORTRAIT_CSS: &str = r#"
.ogp-card { width: 360px; }
.ogp-image { aspect-ratio: 1 / 1; object-fit: cover; }
.ogp-title { font-size: 1.25em; }
"#;

const COMPACT_CSS: &str = r#"
.ogp-card { width: 560px; }
.ogp-card a { display: flex; align-items: stretch; }
.ogp-image { width: 160px; min-width: 160px; object-fit: cover; }
.ogp-content { padding: 12px; overflow: hidden; }
.ogp-title { font-size: 1.1em; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
.ogp-description { font-size: 0.9em; margin-bottom: 8px; max-height: 3.6em; overflow: hidden; }
"#;

/// Layout used when composing a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CardStyle {
    /// Wide card, image on top.
    #[default]
    Landscape,
    /// Narrow card with a square image.
    Portrait,
    /// Thumbnail beside the text.
    Compact,
    /// Base layout plus a caller-supplied stylesheet.
    Custom,
}

impl CardStyle {
    pub const ALL: [CardStyle; 4] = [CardStyle::Landscape, CardStyle::Portrait, CardStyle::Compact, CardStyle::Custom];

    /// Canonical name; this is what enters the card address.
    pub fn as_str(self) -> &'static str {
        match self {
            CardStyle::Landscape => "Landscape",
            CardStyle::Portrait => "Portrait",
            CardStyle::Compact => "Compact",
            CardStyle::Custom => "Custom",
        }
    }

    fn css(self) -> &'static str {
        match self {
            CardStyle::Landscape | CardStyle::Custom => LANDSCAPE_CSS,
            CardStyle::Portrait => PORTRAIT_CSS,
            CardStyle::Compact => COMPACT_CSS,
        }
    }
}

impl fmt::Display for CardStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        CardStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::InvalidStyle(format!("unknown card style {name:?}")))
    }
}

/// Where the card's `<img>` gets its pixels.
#[derive(Debug, Clone, Copy)]
pub enum CardImage<'a> {
    /// Inlined as a `data:` URI, so the document renders with no network.
    Inline { bytes: &'a [u8], mime: &'a str },
    /// Linked by URL, relative or absolute.
    Link(&'a str),
}

impl CardImage<'_> {
    fn src(&self) -> String {
        match self {
            CardImage::Inline { bytes, mime } => format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
            CardImage::Link(href) => encode_double_quoted_attribute(href).into_owned(),
        }
    }
}

/// Fields shown on a card.
#[derive(Debug, Clone, Copy)]
pub struct CardContent<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub description: Option<&'a str>,
    pub site_name: Option<&'a str>,
    pub image: CardImage<'a>,
}

/// Compose the standalone HTML document for a card.
///
/// `custom_css` is linked only for [`CardStyle::Custom`], which requires it.
pub fn compose_card_html(style: CardStyle, content: &CardContent<'_>, custom_css: Option<&str>) -> Result<String, Error> {
    let stylesheet = match (style, custom_css) {
        (CardStyle::Custom, Some(href)) if !href.trim().is_empty() => {
            format!(r#"<link rel="stylesheet" href="{}">"#, encode_double_quoted_attribute(href))
        }
        (CardStyle::Custom, _) => {
            return Err(Error::InvalidStyle("Custom style requires a stylesheet URL".into()));
        }
        _ => String::new(),
    };

    let image_src = content.image.src();
    let title = encode_text(content.title);
    let description = encode_text(content.description.unwrap_or_default());
    let site_name = encode_text(content.site_name.unwrap_or_default());

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{BASE_CSS}{style_css}</style>
{stylesheet}
</head>
<body>
<div class="ogp-card ogp-card-{style_class}">
    <a href="{href}" target="_blank">
        <img src="{image_src}" alt="" class="ogp-image">
        <div class="ogp-content">
            <h1 class="ogp-title">{title}</h1>
            <p class="ogp-description">{description}</p>
            <p class="ogp-site-name">{site_name}</p>
        </div>
    </a>
</div>
</body>
</html>
"#,
        style_css = style.css(),
        style_class = style.as_str().to_ascii_lowercase(),
        href = encode_double_quoted_attribute(content.url),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content<'a>(title: &'a str, description: Option<&'a str>) -> CardContent<'a> {
        CardContent {
            title,
            url: "https://example.com/a?x=1&y=2",
            description,
            site_name: Some("Example"),
            image: CardImage::Inline { bytes: b"RIFF", mime: "image/webp" },
        }
    }

    #[test]
    fn test_style_parsing_is_case_insensitive() {
        assert_eq!("portrait".parse::<CardStyle>().unwrap(), CardStyle::Portrait);
        assert_eq!(" COMPACT ".parse::<CardStyle>().unwrap(), CardStyle::Compact);
        assert_eq!("Landscape".parse::<CardStyle>().unwrap().as_str(), "Landscape");
    }

    #[test]
    fn test_unknown_style_is_rejected() {
        assert!(matches!("Hexagonal".parse::<CardStyle>(), Err(Error::InvalidStyle(_))));
        assert!(matches!("".parse::<CardStyle>(), Err(Error::InvalidStyle(_))));
    }

    #[test]
    fn test_default_style() {
        assert_eq!(CardStyle::default(), CardStyle::Landscape);
    }

    #[test]
    fn test_compose_escapes_fields() {
        let html = compose_card_html(CardStyle::Landscape, &content("<b>Tom & Jerry</b>", None), None).unwrap();
        assert!(html.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
        assert!(!html.contains("<b>Tom"));
        assert!(html.contains(r#"href="https://example.com/a?x=1&amp;y=2""#));
        assert!(html.contains("data:image/webp;base64,UklGRg=="));
        assert!(html.contains(r#"class="ogp-card ogp-card-landscape""#));
    }

    #[test]
    fn test_linked_image_is_escaped_and_not_inlined() {
        let linked = CardContent { image: CardImage::Link("thumb/ab\"cd"), ..content("t", None) };
        let html = compose_card_html(CardStyle::Portrait, &linked, None).unwrap();
        assert!(html.contains(r#"<img src="thumb/ab&quot;cd""#));
        assert!(!html.contains("data:"));
    }

    #[test]
    fn test_custom_style_links_stylesheet() {
        let html =
            compose_card_html(CardStyle::Custom, &content("t", Some("d")), Some("https://cdn.example.com/c.css?a=\"b\""))
                .unwrap();
        assert!(html.contains(r#"<link rel="stylesheet" href="https://cdn.example.com/c.css?a=&quot;b&quot;">"#));
    }

    #[test]
    fn test_custom_style_requires_stylesheet() {
        assert!(matches!(
            compose_card_html(CardStyle::Custom, &content("t", None), None),
            Err(Error::InvalidStyle(_))
        ));
        assert!(matches!(
            compose_card_html(CardStyle::Custom, &content("t", None), Some("  ")),
            Err(Error::InvalidStyle(_))
        ));
    }

    #[test]
    fn test_stylesheet_ignored_for_builtin_styles() {
        let html = compose_card_html(CardStyle::Compact, &content("t", None), Some("https://cdn.example.com/c.css")).unwrap();
        assert!(!html.contains("<link"));
        assert!(html.contains("ogp-card-compact"));
    }
}
