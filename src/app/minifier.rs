//! Token-lean rendering of a single C# document.
//!
//! With boilerplate stripping on, import-style directives are dropped and
//! namespace wrappers are replaced in place by the members they contain, at
//! any nesting depth. Blank-line stripping runs last, over either the
//! re-rendered tree or the untouched original text. The source document is
//! never modified.

use crate::app::document::DocumentHandle;
use crate::app::formatter::CanonicalFormatter;
use crate::app::syntax::{CompilationUnit, MemberNode, SyntaxRoot, TopLevelItem};

/// Replaces every namespace wrapper by its members, recursively, in one
/// left-to-right pass. Directives nested in wrappers are not members and vanish.
pub fn unwrap_namespaces(items: &[TopLevelItem]) -> Vec<&MemberNode> {
    fn flatten<'a>(items: &'a [TopLevelItem], out: &mut Vec<&'a MemberNode>) {
        for item in items {
            match item {
                TopLevelItem::Member(member) => out.push(member),
                TopLevelItem::Namespace(wrapper) => flatten(&wrapper.members, out),
            }
        }
    }

    let mut members = Vec::with_capacity(items.len());
    flatten(items, &mut members);
    members
}

/// Synchronous core of [`minify_document`] for an already-parsed unit.
pub fn minify_unit(
    unit: &CompilationUnit,
    original: &str,
    strip_boilerplate: bool,
    strip_blank_lines: bool,
) -> String {
    if !strip_boilerplate && !strip_blank_lines {
        return original.to_string();
    }

    let rendered;
    let text = if strip_boilerplate {
        // `unit.usings` are simply not rendered.
        rendered = CanonicalFormatter::render(&unwrap_namespaces(&unit.members));
        rendered.as_str()
    } else {
        original
    };

    if strip_blank_lines {
        CanonicalFormatter::strip_blank_lines(text)
    } else {
        text.to_string()
    }
}

/// Produces the compact rendering of `document`. Never fails: a document
/// without a compilation-unit root comes back as its original text.
pub async fn minify_document(
    document: &dyn DocumentHandle,
    strip_boilerplate: bool,
    strip_blank_lines: bool,
) -> String {
    let root = document.syntax_root().await;
    let unit = match root.as_deref() {
        Some(SyntaxRoot::CompilationUnit(unit)) => unit,
        Some(SyntaxRoot::Other { kind }) => {
            log::debug!(
                "{:?} has a {} root; returning original text",
                document.path(),
                kind
            );
            return document.text().await.to_string();
        }
        None => {
            log::debug!("{:?} has no syntax tree; returning original text", document.path());
            return document.text().await.to_string();
        }
    };

    let original = document.text().await;
    minify_unit(unit, &original, strip_boilerplate, strip_blank_lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::document::SourceDocument;
    use crate::app::syntax::{MemberKind, NamespaceStyle, NamespaceWrapper};
    use pretty_assertions::assert_eq;

    const ORDERS: &str = "using System;
using System.Linq;

namespace Shop.Orders
{
    using Shop.Data;

    /// An order.
    public class Order
    {
        public int Id { get; set; }

        public void Ship()
        {
        }
    }

    public interface IOrderRepository
    {
        Order Find(int id);
    }
}
";

    async fn minify(name: &str, text: &str, boilerplate: bool, blank_lines: bool) -> String {
        let document = SourceDocument::new(name, text);
        minify_document(&document, boilerplate, blank_lines).await
    }

    fn plain(text: &str) -> TopLevelItem {
        TopLevelItem::Member(MemberNode::new(MemberKind::Declaration, text))
    }

    fn wrapper(members: Vec<TopLevelItem>) -> TopLevelItem {
        TopLevelItem::Namespace(NamespaceWrapper {
            name: "N".into(),
            style: NamespaceStyle::Block,
            usings: Vec::new(),
            members,
        })
    }

    #[tokio::test]
    async fn strips_using_and_namespace_wrapper() {
        let output = minify(
            "Bar.cs",
            "using System;\nnamespace Foo{\nclass Bar{}\n}\n",
            true,
            true,
        )
        .await;
        assert_eq!(output, "class Bar{}\n");
    }

    #[tokio::test]
    async fn unwraps_block_namespace_and_reindents() {
        let output = minify("Orders.cs", ORDERS, true, true).await;
        assert_eq!(
            output,
            "/// An order.
public class Order
{
    public int Id { get; set; }
    public void Ship()
    {
    }
}
public interface IOrderRepository
{
    Order Find(int id);
}
"
        );
    }

    #[tokio::test]
    async fn keeps_blank_lines_between_declarations_when_asked() {
        let output = minify("Orders.cs", "namespace A;\nclass B { }\nclass C { }\n", true, false).await;
        assert_eq!(output, "class B { }\n\nclass C { }\n");
    }

    #[tokio::test]
    async fn unwraps_file_scoped_namespace() {
        let source = "using System;\n\nnamespace Shop.Orders;\n\npublic enum Status { Open, Closed }\n\npublic class Order { }\n";
        let output = minify("Order.cs", source, true, true).await;
        assert_eq!(
            output,
            "public enum Status { Open, Closed }\npublic class Order { }\n"
        );
    }

    #[tokio::test]
    async fn unwraps_nested_namespaces_in_order() {
        let source = "class First { }\nnamespace A {\n  namespace B {\n    class Inner { }\n  }\n  class Middle { }\n}\nclass Last { }\n";
        let output = minify("Nested.cs", source, true, true).await;
        assert_eq!(
            output,
            "class First { }\nclass Inner { }\nclass Middle { }\nclass Last { }\n"
        );
    }

    #[tokio::test]
    async fn unwraps_namespace_under_conditional_compilation() {
        let source = "using System;\n#if DEBUG\nnamespace A\n{\n    using X;\n    class B { }\n}\n#endif\n";
        let output = minify("Debug.cs", source, true, true).await;
        assert_eq!(output, "#if DEBUG\nclass B { }\n#endif\n");
    }

    #[tokio::test]
    async fn crlf_sources_minify_to_lf_output() {
        let source = "using System;\r\nnamespace A\r\n{\r\n    class B\r\n    {\r\n        int x;\r\n    }\r\n}\r\n";
        let output = minify("Crlf.cs", source, true, true).await;
        assert_eq!(output, "class B\n{\n    int x;\n}\n");
    }

    #[tokio::test]
    async fn only_usings_render_to_empty_text() {
        let output = minify("Usings.cs", "using System;\nglobal using System.IO;\n", true, true).await;
        assert_eq!(output, "");
    }

    #[tokio::test]
    async fn empty_namespace_renders_to_empty_text() {
        let output = minify("Empty.cs", "using System;\nnamespace Foo { }\n", true, false).await;
        assert_eq!(output, "");
    }

    #[tokio::test]
    async fn document_without_namespace_only_loses_usings() {
        let output = minify("Plain.cs", "using System;\n\nclass A\n{\n    int x;\n}\n", true, true).await;
        assert_eq!(output, "class A\n{\n    int x;\n}\n");
    }

    #[tokio::test]
    async fn toggles_off_return_original_text_exactly() {
        let output = minify("Orders.cs", ORDERS, false, false).await;
        assert_eq!(output, ORDERS);
    }

    #[tokio::test]
    async fn blank_lines_only_strips_the_original_text() {
        let output = minify("Orders.cs", "using System;\n\nclass A { }   \n\n", false, true).await;
        assert_eq!(output, "using System;\nclass A { }\n");
    }

    #[tokio::test]
    async fn non_csharp_document_falls_back_to_original_text() {
        let json = "{\n\n  \"Logging\": {}\n}\n";
        assert_eq!(minify("appsettings.json", json, true, true).await, json);
    }

    #[tokio::test]
    async fn restripping_minified_output_is_stable() {
        let once = minify("Orders.cs", ORDERS, false, true).await;
        let twice = minify("Orders.cs", &once, false, true).await;
        assert_eq!(twice, once);

        let stripped = minify("Orders.cs", ORDERS, true, true).await;
        assert_eq!(minify("Orders.cs", &stripped, false, true).await, stripped);
    }

    #[tokio::test]
    async fn independent_documents_minify_concurrently() {
        let first = SourceDocument::new("A.cs", "namespace A { class A1 { } }");
        let second = SourceDocument::new("B.cs", "namespace B { class B1 { } }");
        let (a, b) = tokio::join!(
            minify_document(&first, true, true),
            minify_document(&second, true, true)
        );
        assert_eq!(a, "class A1 { }\n");
        assert_eq!(b, "class B1 { }\n");
    }

    #[test]
    fn unwrapping_replaces_each_wrapper_in_place() {
        let items = vec![
            plain("p1"),
            wrapper(vec![plain("a")]),
            plain("p2"),
            wrapper(vec![plain("b"), wrapper(vec![plain("c")]), plain("d")]),
            wrapper(Vec::new()),
            plain("p3"),
        ];
        let texts: Vec<&str> = unwrap_namespaces(&items)
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, ["p1", "a", "p2", "b", "c", "d", "p3"]);
    }

    #[test]
    fn unit_without_wrappers_is_unchanged_by_unwrapping() {
        let items = vec![plain("x"), plain("y")];
        let texts: Vec<&str> = unwrap_namespaces(&items)
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, ["x", "y"]);
    }

    #[test]
    fn minify_unit_never_renders_directives() {
        let unit = CompilationUnit {
            usings: vec![crate::app::syntax::Directive {
                text: "using System;".into(),
            }],
            members: Vec::new(),
        };
        assert_eq!(minify_unit(&unit, "using System;\n", true, true), "");
        assert_eq!(minify_unit(&unit, "using System;\n", false, false), "using System;\n");
    }
}
