//! mermaid - Mermaid 架构图
//!
//! 路由图、层级依赖图的构建与 HTML 输出

mod assembler;
mod config;
mod error;
mod graph;
mod html;

pub use assembler::{generate, route_path, DiagramAssembler, Diagrams};
pub use config::DiagramConfig;
pub use error::{DiagramError, Result};
pub use graph::{to_name, GraphText, DEFAULT_DIRECTION};
pub use html::embed_html;
