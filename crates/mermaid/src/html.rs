//! HTML 嵌入

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
</head>
<body>
<div class="mermaid">
"#;

const HTML_TAIL: &str = r#"</div>
<script src="https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js"></script>
<script>mermaid.initialize({startOnLoad:true});</script>
</body>
</html>
"#;

/// 将 Mermaid 文本原样嵌入固定的 HTML 页面
///
/// 调用方负责末尾换行 (`render()` + "\n")。
pub fn embed_html(graph_text: &str) -> String {
    let mut html = String::with_capacity(HTML_HEAD.len() + graph_text.len() + HTML_TAIL.len());
    html.push_str(HTML_HEAD);
    html.push_str(graph_text);
    html.push_str(HTML_TAIL);
    html
}
