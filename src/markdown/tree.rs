//! Markdown text to source tree.
//!
//! Folds the pulldown-cmark event stream into an owned [`SourceNode`] tree.
//! Tags without a dedicated variant become transparent containers, so the
//! converter sees their content without knowing the wrapper.

use pulldown_cmark::{Event, Options, Parser, Tag};

use super::node::SourceNode;

/// Parse Markdown text into a source tree rooted at a container node.
///
/// Tables, task lists, and strikethrough extensions are enabled to match the
/// dialect produced by common export tools.
pub fn parse_markdown(text: &str) -> SourceNode {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options);

    let mut stack: Vec<Frame> = vec![Frame::new(FrameKind::Root)];

    for event in parser {
        match event {
            Event::Start(tag) => {
                let in_table_head = matches!(
                    stack.last().map(|f| &f.kind),
                    Some(FrameKind::TableHead)
                );
                stack.push(Frame::open(tag, in_table_head));
            }
            Event::End(_) => {
                // Start/End events are balanced, so the popped frame always
                // has a parent on the stack.
                let frame = stack.pop().expect("unbalanced markdown events");
                let node = frame.into_node();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::Text(t) => push_child(&mut stack, SourceNode::Text(t.to_string())),
            Event::Code(t) => push_child(&mut stack, SourceNode::InlineCode(t.to_string())),
            Event::SoftBreak | Event::HardBreak => {
                push_child(&mut stack, SourceNode::Text(" ".to_string()))
            }
            Event::Rule => push_child(&mut stack, SourceNode::HorizontalRule),
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                push_child(&mut stack, SourceNode::Text(marker.to_string()));
            }
            // Raw HTML fragments are not converted.
            _ => {}
        }
    }

    let root = stack.pop().expect("missing root frame");
    SourceNode::Container {
        children: root.children,
    }
}

fn push_child(stack: &mut [Frame], node: SourceNode) {
    if let Some(frame) = stack.last_mut() {
        frame.children.push(node);
    }
}

/// An open element on the fold stack.
struct Frame {
    kind: FrameKind,
    children: Vec<SourceNode>,
}

enum FrameKind {
    Root,
    Heading(u8),
    Paragraph,
    UnorderedList,
    OrderedList,
    ListItem,
    Table,
    TableHead,
    TableRow,
    TableCell { header: bool },
    CodeBlock,
    Blockquote,
    Bold,
    Italic,
    Link(String),
    Image(String),
    Container,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    fn open(tag: Tag<'_>, in_table_head: bool) -> Self {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Heading(level as u8),
            Tag::BlockQuote(_) => FrameKind::Blockquote,
            Tag::CodeBlock(_) => FrameKind::CodeBlock,
            Tag::List(Some(_)) => FrameKind::OrderedList,
            Tag::List(None) => FrameKind::UnorderedList,
            Tag::Item => FrameKind::ListItem,
            Tag::Table(_) => FrameKind::Table,
            Tag::TableHead => FrameKind::TableHead,
            Tag::TableRow => FrameKind::TableRow,
            Tag::TableCell => FrameKind::TableCell {
                header: in_table_head,
            },
            Tag::Strong => FrameKind::Bold,
            Tag::Emphasis => FrameKind::Italic,
            Tag::Link { dest_url, .. } => FrameKind::Link(dest_url.to_string()),
            Tag::Image { dest_url, .. } => FrameKind::Image(dest_url.to_string()),
            _ => FrameKind::Container,
        };
        Self::new(kind)
    }

    fn into_node(self) -> SourceNode {
        let children = self.children;
        match self.kind {
            FrameKind::Root | FrameKind::Container => SourceNode::Container { children },
            FrameKind::Heading(level) => SourceNode::Heading { level, children },
            FrameKind::Paragraph => SourceNode::Paragraph { children },
            FrameKind::UnorderedList => SourceNode::UnorderedList { children },
            FrameKind::OrderedList => SourceNode::OrderedList { children },
            FrameKind::ListItem => SourceNode::ListItem { children },
            FrameKind::Table => SourceNode::Table { children },
            // Header cells arrive without an explicit row wrapper.
            FrameKind::TableHead => SourceNode::TableRow { children },
            FrameKind::TableRow => SourceNode::TableRow { children },
            FrameKind::TableCell { header } => SourceNode::TableCell { header, children },
            FrameKind::CodeBlock => {
                let text = children
                    .iter()
                    .filter_map(|c| match c {
                        SourceNode::Text(t) => Some(t.as_str()),
                        _ => None,
                    })
                    .collect::<String>();
                SourceNode::CodeBlock(text)
            }
            FrameKind::Blockquote => SourceNode::Blockquote { children },
            FrameKind::Bold => SourceNode::Bold { children },
            FrameKind::Italic => SourceNode::Italic { children },
            FrameKind::Link(href) => SourceNode::Link { href, children },
            FrameKind::Image(src) => SourceNode::Image { src },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_level(text: &str) -> Vec<SourceNode> {
        match parse_markdown(text) {
            SourceNode::Container { children } => children,
            other => panic!("root is not a container: {:?}", other),
        }
    }

    #[test]
    fn test_heading_levels() {
        let nodes = top_level("# One\n\n###### Six\n");
        assert_eq!(nodes.len(), 2);
        assert!(matches!(nodes[0], SourceNode::Heading { level: 1, .. }));
        assert!(matches!(nodes[1], SourceNode::Heading { level: 6, .. }));
    }

    #[test]
    fn test_inline_styles() {
        let nodes = top_level("plain **bold** *italic* `code`");
        let SourceNode::Paragraph { children } = &nodes[0] else {
            panic!("expected paragraph");
        };
        assert!(children
            .iter()
            .any(|n| matches!(n, SourceNode::Bold { .. })));
        assert!(children
            .iter()
            .any(|n| matches!(n, SourceNode::Italic { .. })));
        assert!(children
            .iter()
            .any(|n| matches!(n, SourceNode::InlineCode(c) if c == "code")));
    }

    #[test]
    fn test_table_header_row() {
        let nodes = top_level("| A | B |\n|---|---|\n| 1 | 2 |\n");
        let SourceNode::Table { children: rows } = &nodes[0] else {
            panic!("expected table");
        };
        assert_eq!(rows.len(), 2);
        let SourceNode::TableRow { children: cells } = &rows[0] else {
            panic!("expected row");
        };
        assert!(cells
            .iter()
            .all(|c| matches!(c, SourceNode::TableCell { header: true, .. })));
        let SourceNode::TableRow { children: cells } = &rows[1] else {
            panic!("expected row");
        };
        assert!(cells
            .iter()
            .all(|c| matches!(c, SourceNode::TableCell { header: false, .. })));
    }

    #[test]
    fn test_nested_list_structure() {
        let nodes = top_level("- a\n  - b\n");
        let SourceNode::UnorderedList { children: items } = &nodes[0] else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 1);
        let nested: Vec<_> = items[0]
            .children()
            .iter()
            .filter(|c| c.is_list())
            .collect();
        assert_eq!(nested.len(), 1);
    }

    #[test]
    fn test_code_block_verbatim() {
        let nodes = top_level("```\nlet x = 1;\nlet y = 2;\n```\n");
        assert!(
            matches!(&nodes[0], SourceNode::CodeBlock(text) if text == "let x = 1;\nlet y = 2;\n")
        );
    }

    #[test]
    fn test_rule_and_image() {
        let nodes = top_level("---\n\n![alt text](img/pic.png)\n");
        assert!(matches!(nodes[0], SourceNode::HorizontalRule));
        let SourceNode::Paragraph { children } = &nodes[1] else {
            panic!("expected paragraph");
        };
        assert!(children
            .iter()
            .any(|n| matches!(n, SourceNode::Image { src } if src == "img/pic.png")));
    }

    #[test]
    fn test_task_list_marker_becomes_text() {
        let nodes = top_level("- [x] done\n");
        let text = nodes[0].plain_text();
        assert!(text.starts_with("[x] "));
    }
}
