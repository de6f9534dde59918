/// Wikipedia article intro extraction
use scraper::{ElementRef, Html, Selector};

const FALLBACK_PARAGRAPHS: usize = 3;

fn clean_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Intro paragraphs of a Wikipedia article.
///
/// Paragraphs between the infobox and the table of contents (or the first
/// section heading) are returned. Without an infobox only the first three
/// paragraphs are looked at. `None` means the page has no article body.
pub fn extract_intro(html: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(html);

    let content_selector = Selector::parse("#mw-content-text").ok()?;
    let article_selector = Selector::parse("div.mw-parser-output").ok()?;
    let infobox_selector = Selector::parse("table.infobox").ok()?;
    let toc_selector = Selector::parse(r#"meta[property="mw:PageProp/toc"]"#).ok()?;
    let heading_selector = Selector::parse("h2").ok()?;
    let paragraph_selector = Selector::parse("p").ok()?;

    let content = document.select(&content_selector).next()?;
    let article = content.select(&article_selector).next()?;

    let Some(infobox) = article.select(&infobox_selector).next() else {
        return Some(
            article
                .select(&paragraph_selector)
                .take(FALLBACK_PARAGRAPHS)
                .map(|p| clean_text(&p))
                .filter(|text| !text.is_empty())
                .collect(),
        );
    };

    let end = article
        .select(&toc_selector)
        .next()
        .or_else(|| article.select(&heading_selector).next());

    let mut intro = Vec::new();
    for node in infobox.next_siblings() {
        // Newer skins wrap headings in a div, so stop at any ancestor of the end marker
        if let Some(end) = end {
            if node.id() == end.id() || end.ancestors().any(|a| a.id() == node.id()) {
                break;
            }
        }

        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if element.value().name() == "p" {
            let text = clean_text(&element);
            if !text.is_empty() {
                intro.push(text);
            }
        }
    }

    if intro.is_empty() {
        intro = article
            .select(&paragraph_selector)
            .map(|p| clean_text(&p))
            .filter(|text| !text.is_empty())
            .take(FALLBACK_PARAGRAPHS)
            .collect();
    }

    Some(intro)
}
