//! Main-text extraction
//!
//! Renders the readable text of a page: page chrome (`header`, `footer`,
//! `aside`) and non-text elements are dropped, the first `<main>` is used as
//! the content region when there is one, otherwise `<body>`. Text is emitted
//! one block-level run per line with whitespace collapsed inside each run.
//!
//! The HTML5 parser recovers from any input, so extraction never fails; a
//! page without readable text yields an empty string.

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose whole subtree is skipped
const SKIPPED_ELEMENTS: &[&str] = &[
    "header", "footer", "aside", "script", "style", "noscript", "template", "head",
];

/// Elements that start and end a text run
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "blockquote",
    "body",
    "br",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

/// Extracts the main text of an HTML document
///
/// # Example
///
/// ```
/// use trawl::crawler::extract_content;
///
/// let html = "<body><header>Menu</header><main><h1>Title</h1><p>Body <b>text</b></p></main></body>";
/// assert_eq!(extract_content(html), "Title\nBody text");
/// ```
pub fn extract_content(html: &str) -> String {
    let document = Html::parse_document(html);

    let Some(root) = content_root(&document) else {
        return String::new();
    };

    let mut renderer = TextRenderer::default();
    renderer.walk(*root);
    renderer.finish()
}

/// Picks the first `<main>` outside page chrome, falling back to `<body>`
fn content_root(document: &Html) -> Option<ElementRef<'_>> {
    let main = Selector::parse("main").ok().and_then(|selector| {
        document
            .select(&selector)
            .find(|element| !inside_skipped(element))
    });

    main.or_else(|| {
        Selector::parse("body")
            .ok()
            .and_then(|selector| document.select(&selector).next())
    })
}

fn inside_skipped(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| SKIPPED_ELEMENTS.contains(&ancestor.value().name()))
}

#[derive(Default)]
struct TextRenderer {
    runs: Vec<String>,
    current: String,
}

impl TextRenderer {
    fn walk(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => self.current.push_str(text),
            Node::Element(element) => {
                let name = element.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    return;
                }

                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    self.flush();
                }
                for child in node.children() {
                    self.walk(child);
                }
                if block {
                    self.flush();
                }
            }
            _ => {
                for child in node.children() {
                    self.walk(child);
                }
            }
        }
    }

    /// Closes the current run, keeping it only if it has visible text
    fn flush(&mut self) {
        let run = self.current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !run.is_empty() {
            self.runs.push(run);
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.flush();
        self.runs.join("\n")
    }
}
