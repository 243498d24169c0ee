//! inspect - 代码检查事实
//!
//! 路由声明、符号使用关系，以及读取它们的检查器

mod facts;
mod inspector;
mod types;

pub use facts::{in_package, FactsFileInspector, InspectError, MemoryInspector, Result};
pub use inspector::CodeInspector;
pub use types::{FactsDocument, RouteAttributes, RouteDeclaration, RouteFact, UsageMap};
