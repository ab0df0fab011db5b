//! Parsed-document model for C# sources.
//!
//! A compilation unit is reduced to the few node shapes the minifier cares
//! about: import-style directives, plain members, and namespace wrappers that
//! nest further members. Everything else keeps its exact source text.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tree_sitter::Node;

/// Literal kinds that may span several lines and must keep their layout.
const MULTILINE_LITERALS: [&str; 3] = [
    "verbatim_string_literal",
    "raw_string_literal",
    "interpolated_string_expression",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Declaration,
    Comment,
    /// Single-line `#region`, `#pragma`, `#if`/`#endif` and friends.
    Preprocessor,
}

/// A top-level node carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberNode {
    pub kind: MemberKind,
    pub text: String,
    /// Indentation width of the line the node starts on.
    pub indent: usize,
    /// Line indices (within `text`) that begin inside a multi-line literal.
    pub verbatim_lines: Vec<usize>,
}

impl MemberNode {
    pub fn new(kind: MemberKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            indent: 0,
            verbatim_lines: Vec::new(),
        }
    }
}

/// `using X;`, `global using X;`, `extern alias X;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceStyle {
    FileScoped,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceWrapper {
    pub name: String,
    pub style: NamespaceStyle,
    pub usings: Vec<Directive>,
    pub members: Vec<TopLevelItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopLevelItem {
    Member(MemberNode),
    Namespace(NamespaceWrapper),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationUnit {
    pub usings: Vec<Directive>,
    pub members: Vec<TopLevelItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxRoot {
    CompilationUnit(CompilationUnit),
    /// The parser produced something other than a compilation unit.
    Other { kind: String },
}

pub fn is_csharp(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cs"))
}

/// Classified child of a compilation unit or namespace body.
enum Item {
    Directive(Directive),
    Member(MemberNode),
    Namespace(NamespaceWrapper),
}

fn push_item(usings: &mut Vec<Directive>, members: &mut Vec<TopLevelItem>, item: Item) {
    match item {
        Item::Directive(directive) => usings.push(directive),
        Item::Member(member) => members.push(TopLevelItem::Member(member)),
        Item::Namespace(wrapper) => members.push(TopLevelItem::Namespace(wrapper)),
    }
}

pub fn parse_csharp(source: &str) -> Result<SyntaxRoot> {
    let language: tree_sitter::Language = tree_sitter_c_sharp::LANGUAGE.into();
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| anyhow!("Failed to load C# grammar: {}", e))?;
    let tree = parser
        .parse(source, None)
        .context("C# parser returned no tree")?;

    let root = tree.root_node();
    if root.kind() != "compilation_unit" {
        return Ok(SyntaxRoot::Other {
            kind: root.kind().to_string(),
        });
    }
    if root.has_error() {
        log::debug!("C# source has syntax errors; unparsed regions are kept verbatim");
    }

    let mut unit = CompilationUnit::default();
    // Everything after `namespace X;` belongs to that namespace.
    let mut file_scoped: Option<NamespaceWrapper> = None;

    let mut cursor = root.walk();
    let mut items = Vec::new();
    for child in root.named_children(&mut cursor) {
        classify(child, source, &mut items);
    }
    for item in items {
        match file_scoped.as_mut() {
            Some(wrapper) => push_item(&mut wrapper.usings, &mut wrapper.members, item),
            None => match item {
                Item::Namespace(wrapper) if wrapper.style == NamespaceStyle::FileScoped => {
                    file_scoped = Some(wrapper)
                }
                other => push_item(&mut unit.usings, &mut unit.members, other),
            },
        }
    }

    if let Some(wrapper) = file_scoped {
        unit.members.push(TopLevelItem::Namespace(wrapper));
    }

    Ok(SyntaxRoot::CompilationUnit(unit))
}

fn classify(node: Node, source: &str, out: &mut Vec<Item>) {
    let item = match node.kind() {
        "using_directive" | "extern_alias_directive" => Item::Directive(Directive {
            text: source[node.byte_range()].to_string(),
        }),
        "namespace_declaration" => {
            let mut wrapper = namespace_header(node, source, NamespaceStyle::Block);
            if let Some(body) = node.child_by_field_name("body") {
                collect_children(body, None, source, &mut wrapper);
            }
            Item::Namespace(wrapper)
        }
        "file_scoped_namespace_declaration" => {
            let mut wrapper = namespace_header(node, source, NamespaceStyle::FileScoped);
            let name_id = node.child_by_field_name("name").map(|n| n.id());
            collect_children(node, name_id, source, &mut wrapper);
            Item::Namespace(wrapper)
        }
        "preproc_if" | "preproc_elif" | "preproc_else" => {
            return splice_conditional(node, source, out);
        }
        "comment" => Item::Member(member(node, source, MemberKind::Comment)),
        kind if kind.starts_with("preproc_") || kind == "shebang_directive" => {
            let text = &source[node.byte_range()];
            let kind = if text.trim_end().contains('\n') {
                MemberKind::Declaration
            } else {
                MemberKind::Preprocessor
            };
            Item::Member(member(node, source, kind))
        }
        _ => Item::Member(member(node, source, MemberKind::Declaration)),
    };
    out.push(item);
}

/// Flattens an `#if` / `#elif` / `#else` group: its directive lines become
/// preprocessor members and the guarded nodes are classified in place, so
/// namespaces and usings under a condition are handled like unguarded ones.
fn splice_conditional(node: Node, source: &str, out: &mut Vec<Item>) {
    let start = node.start_byte();
    let header_end = source[start..node.end_byte()]
        .find('\n')
        .map_or(node.end_byte(), |i| start + i);
    out.push(Item::Member(directive_line(start, header_end, source)));

    let condition = node.child_by_field_name("condition").map(|n| n.id());
    let mut body_end = header_end;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if Some(child.id()) == condition || child.end_byte() <= header_end {
            continue;
        }
        classify(child, source, out);
        body_end = body_end.max(child.end_byte());
    }

    // Only the node that holds `#endif` after its body emits it.
    let rest = &source[body_end..node.end_byte()];
    if let Some(offset) = rest.find("#endif") {
        let footer_start = body_end + offset;
        let footer_end = source[footer_start..node.end_byte()]
            .find('\n')
            .map_or(node.end_byte(), |i| footer_start + i);
        out.push(Item::Member(directive_line(footer_start, footer_end, source)));
    }
}

fn directive_line(start: usize, end: usize, source: &str) -> MemberNode {
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    MemberNode {
        indent: indentation_width(&source[line_start..start]),
        ..MemberNode::new(MemberKind::Preprocessor, source[start..end].trim_end())
    }
}

fn namespace_header(node: Node, source: &str, style: NamespaceStyle) -> NamespaceWrapper {
    let name = node
        .child_by_field_name("name")
        .map(|n| source[n.byte_range()].to_string())
        .unwrap_or_default();
    NamespaceWrapper {
        name,
        style,
        usings: Vec::new(),
        members: Vec::new(),
    }
}

fn collect_children(parent: Node, skip: Option<usize>, source: &str, wrapper: &mut NamespaceWrapper) {
    let mut cursor = parent.walk();
    for child in parent.named_children(&mut cursor) {
        if Some(child.id()) == skip {
            continue;
        }
        let mut items = Vec::new();
        classify(child, source, &mut items);
        for item in items {
            push_item(&mut wrapper.usings, &mut wrapper.members, item);
        }
    }
}

fn member(node: Node, source: &str, kind: MemberKind) -> MemberNode {
    let start = node.start_byte();
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);

    MemberNode {
        kind,
        text: source[node.byte_range()].to_string(),
        indent: indentation_width(&source[line_start..start]),
        verbatim_lines: multiline_literal_lines(node),
    }
}

/// Width of the leading run of spaces and tabs; a tab counts as four columns.
pub fn indentation_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn multiline_literal_lines(node: Node) -> Vec<usize> {
    let base_row = node.start_position().row;
    let mut lines = Vec::new();
    let mut stack = vec![node];

    while let Some(current) = stack.pop() {
        let (first, last) = (current.start_position().row, current.end_position().row);
        if MULTILINE_LITERALS.contains(&current.kind()) {
            if last > first {
                lines.extend((first + 1..=last).map(|row| row - base_row));
            }
            continue;
        }
        if last == first {
            continue;
        }
        let mut cursor = current.walk();
        stack.extend(current.children(&mut cursor));
    }

    lines.sort_unstable();
    lines.dedup();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(source: &str) -> CompilationUnit {
        match parse_csharp(source).unwrap() {
            SyntaxRoot::CompilationUnit(unit) => unit,
            other => panic!("expected a compilation unit, got {:?}", other),
        }
    }

    fn member_texts(items: &[TopLevelItem]) -> Vec<&str> {
        items
            .iter()
            .map(|item| match item {
                TopLevelItem::Member(m) => m.text.as_str(),
                TopLevelItem::Namespace(ns) => ns.name.as_str(),
            })
            .collect()
    }

    #[test]
    fn detects_csharp_by_extension() {
        assert!(is_csharp(Path::new("src/Orders.cs")));
        assert!(is_csharp(Path::new("Legacy/Old.CS")));
        assert!(!is_csharp(Path::new("appsettings.json")));
        assert!(!is_csharp(Path::new("Makefile")));
    }

    #[test]
    fn loads_grammar_and_returns_compilation_unit() {
        let root = parse_csharp("class A { }").expect("C# grammar should load");
        assert!(matches!(root, SyntaxRoot::CompilationUnit(_)));
    }

    #[test]
    fn conditional_blocks_are_spliced_into_their_parent() {
        let unit = unit(
            "using System;\n#if DEBUG\nnamespace A\n{\n    using X;\n    class B { }\n}\n#endif\n",
        );
        assert_eq!(unit.usings.len(), 1);
        assert_eq!(member_texts(&unit.members), ["#if DEBUG", "A", "#endif"]);

        let TopLevelItem::Member(open) = &unit.members[0] else {
            panic!("expected member");
        };
        assert_eq!(open.kind, MemberKind::Preprocessor);
        let TopLevelItem::Namespace(ns) = &unit.members[1] else {
            panic!("expected namespace wrapper");
        };
        assert_eq!(ns.usings.len(), 1);
        assert_eq!(member_texts(&ns.members), ["class B { }"]);
    }

    #[test]
    fn else_branch_keeps_single_endif() {
        let unit = unit(
            "#if NET8_0\nclass Modern { }\n#else\nclass Legacy { }\n#endif\nclass Shared { }\n",
        );
        assert_eq!(
            member_texts(&unit.members),
            [
                "#if NET8_0",
                "class Modern { }",
                "#else",
                "class Legacy { }",
                "#endif",
                "class Shared { }"
            ]
        );
    }

    #[test]
    fn separates_usings_from_block_namespace() {
        let unit = unit("using System;\nusing System.Linq;\nnamespace Foo{\nclass Bar{}\n}\n");
        assert_eq!(unit.usings.len(), 2);
        assert_eq!(unit.usings[0].text, "using System;");
        assert_eq!(unit.members.len(), 1);

        let TopLevelItem::Namespace(ns) = &unit.members[0] else {
            panic!("expected namespace wrapper");
        };
        assert_eq!(ns.name, "Foo");
        assert_eq!(ns.style, NamespaceStyle::Block);
        assert_eq!(member_texts(&ns.members), ["class Bar{}"]);
    }

    #[test]
    fn file_scoped_namespace_owns_following_declarations() {
        let unit = unit(
            "using System;\nnamespace Shop.Orders;\nusing Shop.Data;\npublic class Order { }\npublic enum State { Open }\n",
        );
        assert_eq!(unit.usings.len(), 1);
        assert_eq!(unit.members.len(), 1);

        let TopLevelItem::Namespace(ns) = &unit.members[0] else {
            panic!("expected namespace wrapper");
        };
        assert_eq!(ns.style, NamespaceStyle::FileScoped);
        assert_eq!(ns.name, "Shop.Orders");
        assert_eq!(ns.usings.len(), 1);
        assert_eq!(
            member_texts(&ns.members),
            ["public class Order { }", "public enum State { Open }"]
        );
    }

    #[test]
    fn nested_namespaces_are_kept_as_wrappers() {
        let unit = unit("namespace A {\n  namespace B {\n    class C {}\n  }\n  class D {}\n}\n");
        let TopLevelItem::Namespace(outer) = &unit.members[0] else {
            panic!("expected namespace wrapper");
        };
        assert_eq!(member_texts(&outer.members), ["B", "class D {}"]);
    }

    #[test]
    fn records_member_indentation_and_comment_kind() {
        let unit = unit("namespace A\n{\n    // Orders\n    class C\n    {\n    }\n}\n");
        let TopLevelItem::Namespace(ns) = &unit.members[0] else {
            panic!("expected namespace wrapper");
        };
        let TopLevelItem::Member(comment) = &ns.members[0] else {
            panic!("expected member");
        };
        let TopLevelItem::Member(class) = &ns.members[1] else {
            panic!("expected member");
        };
        assert_eq!(comment.kind, MemberKind::Comment);
        assert_eq!(class.kind, MemberKind::Declaration);
        assert_eq!(class.indent, 4);
    }

    #[test]
    fn marks_lines_inside_verbatim_strings() {
        let source = "class Q\n{\n    const string Sql = @\"\n        SELECT *\n        FROM Orders\";\n}\n";
        let unit = unit(source);
        let TopLevelItem::Member(class) = &unit.members[0] else {
            panic!("expected member");
        };
        assert_eq!(class.verbatim_lines, vec![3, 4]);
    }

    #[test]
    fn indentation_counts_tabs_as_four() {
        assert_eq!(indentation_width("\t  x"), 6);
        assert_eq!(indentation_width("x  "), 0);
        assert_eq!(indentation_width(""), 0);
    }
}
