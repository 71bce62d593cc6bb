//! Comprehensive tests for frameguard-html
//!
//! Parsing complete pages into the arena tree and finding their frames.

use frameguard_dom::{NodeKind, SelectorList, ShadowRootMode};
use frameguard_html::{DomTree, HtmlParser, NodeId};

fn frames() -> SelectorList {
    SelectorList::parse("iframe,frame,object,embed").unwrap()
}

fn frame_names(tree: &DomTree, root: NodeId) -> Vec<String> {
    tree.query_selector_all(root, &frames())
        .iter()
        .filter_map(|&id| tree.local_name(id).map(str::to_string))
        .collect()
}

// ============================================================================
// DOCUMENTS
// ============================================================================

#[test]
fn test_parse_minimal_html() {
    let doc = HtmlParser::new().parse("");
    assert!(doc.tree().len() >= 1, "Even empty HTML should have root");
    assert!(doc.body().is_valid());
    assert!(doc.head().is_valid());
}

#[test]
fn test_parse_page_structure() {
    let html = r#"
        <html>
            <head><title>Test Page</title></head>
            <body>
                <div id="container">
                    <iframe id="ad" src="https://ads.example/"></iframe>
                    <p>Hello</p>
                </div>
            </body>
        </html>
    "#;
    let doc = HtmlParser::new().parse_with_url(html, "https://example.com/");
    assert_eq!(doc.url(), "https://example.com/");

    let tree = doc.tree();
    let container = doc.get_element_by_id("container").unwrap();
    assert_eq!(tree.parent(container), Some(doc.body()));

    let ad = doc.get_element_by_id("ad").unwrap();
    assert_eq!(tree.local_name(ad), Some("iframe"));
    assert_eq!(tree.get_attribute(ad, "src"), Some("https://ads.example/"));
}

#[test]
fn test_uppercase_tags_normalized() {
    let doc = HtmlParser::new().parse("<IFRAME></IFRAME><Embed SRC=x>");
    assert_eq!(frame_names(doc.tree(), doc.tree().root()), vec!["iframe", "embed"]);
}

// ============================================================================
// FRAMES
// ============================================================================

#[test]
fn test_all_frame_kinds_in_order() {
    let html = "<div><iframe></iframe></div><object data=a.svg></object><embed src=b>";
    let doc = HtmlParser::new().parse(html);
    assert_eq!(frame_names(doc.tree(), doc.tree().root()), vec!["iframe", "object", "embed"]);
}

#[test]
fn test_embed_inside_object_fallback() {
    let doc = HtmlParser::new().parse("<object data=a><embed src=b></object>");
    let tree = doc.tree();
    let root = tree.root();
    assert_eq!(frame_names(tree, root), vec!["object", "embed"]);
}

#[test]
fn test_iframe_body_is_text() {
    let doc = HtmlParser::new().parse("<iframe><embed src=x></iframe>");
    assert_eq!(frame_names(doc.tree(), doc.tree().root()), vec!["iframe"]);
}

#[test]
fn test_srcdoc_kept_as_attribute() {
    let doc = HtmlParser::new().parse(r#"<iframe id=f srcdoc="<iframe></iframe>"></iframe>"#);
    let tree = doc.tree();
    let frame = doc.get_element_by_id("f").unwrap();
    assert_eq!(tree.get_attribute(frame, "srcdoc"), Some("<iframe></iframe>"));
    assert_eq!(frame_names(tree, tree.root()), vec!["iframe"]);
}

#[test]
fn test_fragment_frames() {
    let mut tree = DomTree::new();
    let frag = HtmlParser::new()
        .parse_fragment(&mut tree, "<p>a</p><iframe></iframe><embed>")
        .unwrap();
    assert_eq!(tree.kind(frag), Some(NodeKind::DocumentFragment));
    assert_eq!(frame_names(&tree, frag), vec!["iframe", "embed"]);
    assert!(frame_names(&tree, tree.root()).is_empty());
}

// ============================================================================
// SHADOW ROOTS
// ============================================================================

#[test]
fn test_declarative_shadow_in_page() {
    let html = r#"
        <div id="host">
            <template shadowrootmode="closed"><iframe></iframe></template>
            <embed>
        </div>
    "#;
    let doc = HtmlParser::new().parse(html);
    let tree = doc.tree();
    let host = doc.get_element_by_id("host").unwrap();
    let shadow = tree.shadow_root(host).unwrap();

    assert_eq!(tree.shadow_info(shadow), Some((ShadowRootMode::Closed, true)));
    assert_eq!(frame_names(tree, tree.root()), vec!["embed"]);
    assert_eq!(frame_names(tree, shadow), vec!["iframe"]);
    assert_eq!(tree.shadow_roots_within(tree.root()), vec![shadow]);
}

#[test]
fn test_plain_template_frames_inert() {
    let doc = HtmlParser::new().parse("<template id=t><iframe></iframe></template>");
    let tree = doc.tree();
    let template = doc.get_element_by_id("t").unwrap();
    let contents = tree.template_contents(template).unwrap();

    assert!(frame_names(tree, tree.root()).is_empty());
    assert_eq!(frame_names(tree, contents), vec!["iframe"]);
}
