use scraper::{Html, Node};

/// Elements whose text never shows up on the rendered page.
const INVISIBLE: [&str; 4] = ["script", "style", "noscript", "template"];

/// The fetched menu page, parsed once and then only read.
#[derive(Debug)]
pub struct RawDocument {
    html: Html,
}

impl RawDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub const fn html(&self) -> &Html {
        &self.html
    }

    /// Visible text nodes in document order, one per line.
    pub fn text(&self) -> String {
        let root = self.html.root_element();
        let mut parts: Vec<&str> = vec![];
        for node in root.descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let hidden = node.ancestors().any(|x| {
                x.value()
                    .as_element()
                    .is_some_and(|e| INVISIBLE.contains(&e.name()))
            });
            if !hidden {
                parts.push(&**text);
            }
        }
        parts.join("\n")
    }
}
