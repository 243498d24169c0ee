use crate::error::{DiagramError, Result};
use crate::html::embed_html;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认方向 (从左到右)
pub const DEFAULT_DIRECTION: &str = "LR";

/// 取限定名的最后一段: "com.example.Foo" -> "Foo"
pub fn to_name(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map_or(qualified_name, |(_, name)| name)
}

/// Mermaid 图文本
///
/// 每个值对应一条或多条 Mermaid 语句。值构造后不再修改，
/// `append` 返回新的组合值。克隆、比较、析构都不递归，
/// 上万条边折叠出的深链也能安全处理。
pub enum GraphText {
    /// `graph LR`
    Declaration { direction: String },
    /// `A --> B`
    Edge { source: String, target: String },
    /// `A --> |label| B`
    LabeledEdge {
        source: String,
        label: String,
        target: String,
    },
    /// 左右两部分按行拼接
    Composite(Box<GraphText>, Box<GraphText>),
}

impl GraphText {
    pub fn graph() -> Self {
        Self::graph_with(DEFAULT_DIRECTION)
    }

    /// 方向原样输出，不做校验
    pub fn graph_with(direction: impl Into<String>) -> Self {
        Self::Declaration {
            direction: direction.into(),
        }
    }

    pub fn edge(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Edge {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn labeled_edge(
        source: impl Into<String>,
        label: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::LabeledEdge {
            source: source.into(),
            label: label.into(),
            target: target.into(),
        }
    }

    pub fn append(self, other: GraphText) -> Self {
        Self::Composite(Box::new(self), Box::new(other))
    }

    /// 生成 Mermaid 源码
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        // 折叠出的组合是一条很深的左链，用显式栈展开
        let mut stack = vec![self];

        while let Some(node) = stack.pop() {
            match node {
                Self::Declaration { direction } => lines.push(format!("graph {}", direction)),
                Self::Edge { source, target } => {
                    lines.push(format!("{} --> {}", to_name(source), to_name(target)));
                }
                Self::LabeledEdge {
                    source,
                    label,
                    target,
                } => {
                    lines.push(format!(
                        "{} --> |{}| {}",
                        to_name(source),
                        label,
                        to_name(target)
                    ));
                }
                Self::Composite(left, right) => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        lines.join("\n")
    }

    /// 写入 HTML 文件，返回写入的路径
    ///
    /// 父目录不存在时创建；已存在的文件被覆盖。
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let html = embed_html(&format!("{}\n", self.render()));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| DiagramError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, html).map_err(|source| DiagramError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Saved diagram to {}", path.display());
        Ok(path.to_path_buf())
    }
}

impl Default for GraphText {
    fn default() -> Self {
        Self::graph()
    }
}

// 逐层拆开组合，避免深链递归析构
impl Drop for GraphText {
    fn drop(&mut self) {
        let Self::Composite(left, right) = self else {
            return;
        };
        let mut stack = vec![take_node(left), take_node(right)];
        while let Some(mut node) = stack.pop() {
            if let Self::Composite(left, right) = &mut node {
                stack.push(take_node(left));
                stack.push(take_node(right));
            }
        }
    }
}

impl Clone for GraphText {
    fn clone(&self) -> Self {
        enum Step<'a> {
            Visit(&'a GraphText),
            Join,
        }

        let mut steps = vec![Step::Visit(self)];
        let mut built: Vec<GraphText> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(Self::Composite(left, right)) => {
                    steps.push(Step::Join);
                    steps.push(Step::Visit(&**right));
                    steps.push(Step::Visit(&**left));
                }
                Step::Visit(Self::Declaration { direction }) => built.push(Self::Declaration {
                    direction: direction.clone(),
                }),
                Step::Visit(Self::Edge { source, target }) => built.push(Self::Edge {
                    source: source.clone(),
                    target: target.clone(),
                }),
                Step::Visit(Self::LabeledEdge {
                    source,
                    label,
                    target,
                }) => built.push(Self::LabeledEdge {
                    source: source.clone(),
                    label: label.clone(),
                    target: target.clone(),
                }),
                Step::Join => {
                    let right = built.pop();
                    let left = built.pop();
                    if let (Some(left), Some(right)) = (left, right) {
                        built.push(left.append(right));
                    }
                }
            }
        }

        built.pop().unwrap_or_default()
    }
}

impl PartialEq for GraphText {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs = vec![(self, other)];

        while let Some(pair) = pairs.pop() {
            match pair {
                (Self::Composite(l1, r1), Self::Composite(l2, r2)) => {
                    pairs.push((&**r1, &**r2));
                    pairs.push((&**l1, &**l2));
                }
                (Self::Declaration { direction: a }, Self::Declaration { direction: b }) => {
                    if a != b {
                        return false;
                    }
                }
                (
                    Self::Edge { source: s1, target: t1 },
                    Self::Edge { source: s2, target: t2 },
                ) => {
                    if s1 != s2 || t1 != t2 {
                        return false;
                    }
                }
                (
                    Self::LabeledEdge {
                        source: s1,
                        label: l1,
                        target: t1,
                    },
                    Self::LabeledEdge {
                        source: s2,
                        label: l2,
                        target: t2,
                    },
                ) => {
                    if s1 != s2 || l1 != l2 || t1 != t2 {
                        return false;
                    }
                }
                _ => return false,
            }
        }

        true
    }
}

impl Eq for GraphText {}

impl fmt::Debug for GraphText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GraphText").field(&self.render()).finish()
    }
}

fn take_node(node: &mut GraphText) -> GraphText {
    std::mem::replace(
        node,
        GraphText::Declaration {
            direction: String::new(),
        },
    )
}

impl fmt::Display for GraphText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_to_name_extracts_last_segment() {
        assert_eq!(to_name("a.b.c"), "c");
        assert_eq!(to_name("c"), "c");
        assert_eq!(to_name(""), "");
        assert_eq!(to_name("trailing."), "");
    }

    #[test]
    fn test_to_name_idempotent() {
        for name in ["a.b.c", "c", "", "com.example.Foo", ".x", "a..b"] {
            assert_eq!(to_name(to_name(name)), to_name(name));
        }
    }

    #[test]
    fn test_declaration_renders_direction() {
        assert_eq!(GraphText::graph_with("LR").render(), "graph LR");
        assert_eq!(GraphText::graph_with("TD").render(), "graph TD");
        assert_eq!(GraphText::graph().render(), "graph LR");
        assert_eq!(GraphText::default().render(), "graph LR");
    }

    #[test]
    fn test_edge_strips_qualification() {
        assert_eq!(GraphText::edge("pkg.A", "pkg.B").render(), "A --> B");
    }

    #[test]
    fn test_labeled_edge() {
        let edge = GraphText::labeled_edge("pkg.A", "GET", "pkg.B.method");
        assert_eq!(edge.render(), "A --> |GET| method");
    }

    #[test]
    fn test_labeled_edge_keeps_label_verbatim() {
        // 标签不经过 to_name
        let edge = GraphText::labeled_edge("a", "x.y", "b");
        assert_eq!(edge.render(), "a --> |x.y| b");
    }

    #[test]
    fn test_empty_label_keeps_delimiters() {
        assert_eq!(GraphText::labeled_edge("a", "", "b").render(), "a --> || b");
    }

    #[test]
    fn test_append_joins_lines() {
        let graph = GraphText::graph().append(GraphText::edge("a", "b"));
        assert_eq!(graph.render(), "graph LR\na --> b");
    }

    #[test]
    fn test_append_associative() {
        let a = GraphText::graph_with("TD");
        let b = GraphText::edge("x.A", "x.B");
        let c = GraphText::labeled_edge("x.B", "POST", "x.C");

        let left = a.clone().append(b.clone()).append(c.clone());
        let right = a.append(b.append(c));
        assert_eq!(left.render(), right.render());
    }

    #[test]
    fn test_render_repeatable() {
        let graph = GraphText::graph().append(GraphText::edge("a", "b"));
        assert_eq!(graph.render(), graph.render());
        assert_eq!(graph.to_string(), graph.render());
    }

    #[test]
    fn test_render_deep_composition() {
        let graph = (0..10_000)
            .map(|i| GraphText::edge(format!("n{}", i), format!("n{}", i + 1)))
            .fold(GraphText::graph(), GraphText::append);
        let text = graph.render();
        assert_eq!(text.lines().count(), 10_001);
        assert_eq!(text.lines().last(), Some("n9999 --> n10000"));
    }

    fn deep_graph(edges: usize) -> GraphText {
        (0..edges)
            .map(|i| GraphText::edge(format!("n{}", i), format!("n{}", i + 1)))
            .fold(GraphText::graph(), GraphText::append)
    }

    #[test]
    fn test_clone_and_eq_deep_composition() {
        let graph = deep_graph(100_000);
        let copy = graph.clone();
        assert!(copy == graph);
        assert_eq!(copy.render(), graph.render());

        let other = deep_graph(99_999).append(GraphText::edge("n99999", "changed"));
        assert!(other != graph);
    }

    #[test]
    fn test_eq_distinguishes_shape() {
        let a = GraphText::graph().append(GraphText::edge("a", "b"));
        assert_eq!(a, GraphText::graph().append(GraphText::edge("a", "b")));
        assert_ne!(a, GraphText::graph().append(GraphText::labeled_edge("a", "", "b")));
        assert_ne!(a, GraphText::graph_with("TD").append(GraphText::edge("a", "b")));
    }

    #[test]
    fn test_debug_shows_rendered_text() {
        let graph = GraphText::graph().append(GraphText::edge("a", "b"));
        assert_eq!(format!("{:?}", graph), "GraphText(\"graph LR\\na --> b\")");
        assert!(format!("{:?}", deep_graph(100_000)).len() > 100_000);
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docs/nested/diagram.html");
        let graph = GraphText::graph().append(GraphText::edge("a", "b"));

        let saved = graph.save(&path).unwrap();
        assert_eq!(saved, path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, embed_html("graph LR\na --> b\n"));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("diagram.html");

        GraphText::graph().append(GraphText::edge("a", "b")).save(&path).unwrap();
        GraphText::graph_with("TD").save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, embed_html("graph TD\n"));
    }

    #[test]
    fn test_save_fails_when_parent_is_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let err = GraphText::graph().save(blocker.join("diagram.html")).unwrap_err();
        assert!(matches!(err, DiagramError::Io { .. }));
    }
}
