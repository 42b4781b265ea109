//! HTML scraping helpers.
//!
//! Server listings are found by breadth-first search over the element tree
//! with small predicates, so a search stops at the outermost match and never
//! depends on the exact nesting depth of the page.

use scraper::node::Node;
pub use scraper::{ElementRef, Html};
use std::collections::VecDeque;

/// Parse a full HTML document.
#[must_use]
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// First element in breadth-first order, `root` included, that matches.
pub fn bfs<'a, F>(root: ElementRef<'a>, matches: F) -> Option<ElementRef<'a>>
where
    F: Fn(&ElementRef<'a>) -> bool,
{
    let mut queue = VecDeque::from([root]);
    while let Some(element) = queue.pop_front() {
        if matches(&element) {
            return Some(element);
        }
        queue.extend(element.children().filter_map(ElementRef::wrap));
    }
    None
}

/// Every matching element in breadth-first order.
///
/// The subtree of a match is not searched further.
pub fn bfs_all<'a, F>(root: ElementRef<'a>, matches: F) -> Vec<ElementRef<'a>>
where
    F: Fn(&ElementRef<'a>) -> bool,
{
    let mut found = Vec::new();
    let mut queue = VecDeque::from([root]);
    while let Some(element) = queue.pop_front() {
        if matches(&element) {
            found.push(element);
            continue;
        }
        queue.extend(element.children().filter_map(ElementRef::wrap));
    }
    found
}

/// Matches elements with the given `id` attribute.
pub fn has_id(id: &str) -> impl Fn(&ElementRef<'_>) -> bool + '_ {
    move |element| element.value().id() == Some(id)
}

/// Matches elements with a class name containing `fragment`.
pub fn has_class_containing(fragment: &str) -> impl Fn(&ElementRef<'_>) -> bool + '_ {
    move |element| element.value().classes().any(|class| class.contains(fragment))
}

/// Matches elements with the given tag name.
pub fn has_tag(name: &str) -> impl Fn(&ElementRef<'_>) -> bool + '_ {
    move |element| element.value().name().eq_ignore_ascii_case(name)
}

/// Whitespace-normalized text content of an element.
#[must_use]
pub fn text_of(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Value printed next to a label such as `City:` inside `item`.
///
/// Two layouts are recognised: the label alone in an element followed by a
/// sibling holding the value, and the label prefixing the text of an
/// element that has no child elements.
#[must_use]
pub fn labeled_value(item: &ElementRef<'_>, label: &str) -> Option<String> {
    let label_element = bfs(*item, |element| text_of(element) == label);
    if let Some(label_element) = label_element {
        if let Some(value) = following_text(&label_element) {
            return Some(value);
        }
    }

    let inline = bfs(*item, |element| {
        element.children().all(|child| child.value().is_text())
            && text_of(element).starts_with(label)
    })?;
    let text = text_of(&inline);
    let value = text[label.len()..].trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn following_text(element: &ElementRef<'_>) -> Option<String> {
    for sibling in element.next_siblings() {
        let text = match sibling.value() {
            Node::Text(text) => text.split_whitespace().collect::<Vec<_>>().join(" "),
            Node::Element(_) => ElementRef::wrap(sibling).map(|e| text_of(&e))?,
            _ => continue,
        };
        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}

/// Short excerpt of an element's markup, for warnings about missing nodes.
#[must_use]
pub fn snippet(element: &ElementRef<'_>) -> String {
    const MAX_CHARS: usize = 120;
    let html = element.html();
    let mut excerpt: String = html.chars().take(MAX_CHARS).collect();
    if html.chars().count() > MAX_CHARS {
        excerpt.push_str("...");
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="main">
            <div class="server-list">
              <div class="server-item">
                <h3>nl1.example.net</h3>
                <div class="row"><span>City:</span> <b>Amsterdam</b></div>
                <p>Region: Noord-Holland</p>
              </div>
              <div class="server-item premium">
                <h3>us1.example.net</h3>
                <div class="row"><span>City:</span> New York</div>
                <div class="nested"><div class="server-item">inner</div></div>
              </div>
            </div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_bfs_finds_outermost_match() {
        let document = parse_document(PAGE);
        let list = bfs(document.root_element(), has_class_containing("server-list"))
            .expect("list present");
        let items = bfs_all(list, has_class_containing("server-item"));

        assert_eq!(items.len(), 2);
        let first = bfs(items[0], has_tag("h3")).expect("heading");
        assert_eq!(text_of(&first), "nl1.example.net");
    }

    #[test]
    fn test_bfs_none() {
        let document = parse_document(PAGE);
        assert!(bfs(document.root_element(), has_id("missing")).is_none());
        assert!(bfs(document.root_element(), has_id("main")).is_some());
    }

    #[test]
    fn test_labeled_value() {
        let document = parse_document(PAGE);
        let items = bfs_all(document.root_element(), has_class_containing("server-item"));

        assert_eq!(labeled_value(&items[0], "City:").as_deref(), Some("Amsterdam"));
        assert_eq!(
            labeled_value(&items[0], "Region:").as_deref(),
            Some("Noord-Holland")
        );
        assert_eq!(labeled_value(&items[1], "City:").as_deref(), Some("New York"));
        assert_eq!(labeled_value(&items[1], "Region:"), None);
    }

    #[test]
    fn test_snippet_truncates() {
        let long = format!("<div id=\"x\">{}</div>", "a".repeat(500));
        let document = parse_document(&long);
        let element = bfs(document.root_element(), has_id("x")).expect("div");
        let excerpt = snippet(&element);
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.len() < 200);
    }
}
