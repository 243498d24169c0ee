use crate::inspector::CodeInspector;
use crate::types::{FactsDocument, RouteFact, UsageMap};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed fact: {0}")]
    MalformedFact(String),
}

pub type Result<T> = std::result::Result<T, InspectError>;

/// 判断符号是否位于基础包内
///
/// 空基础包匹配所有符号。
pub fn in_package(symbol: &str, base_package: &str) -> bool {
    if base_package.is_empty() {
        return true;
    }
    symbol
        .strip_prefix(base_package)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// 从事实文档中取出基础包内的路由
fn routes_in(doc: &FactsDocument, base_package: &str) -> Result<Vec<RouteFact>> {
    doc.routes
        .iter()
        .filter(|decl| in_package(&decl.method, base_package))
        .map(|decl| decl.merge())
        .collect()
}

/// 从事实文档中取出基础包内的使用关系
fn usages_in(doc: &FactsDocument, base_package: &str) -> UsageMap {
    doc.usages
        .iter()
        .filter(|(user, _)| in_package(user, base_package))
        .filter_map(|(user, used)| {
            let used: std::collections::BTreeSet<String> = used
                .iter()
                .filter(|symbol| in_package(symbol, base_package))
                .cloned()
                .collect();
            (!used.is_empty()).then(|| (user.clone(), used))
        })
        .collect()
}

/// 事实文件检查器 - 从 JSON 文档读取代码检查结果
pub struct FactsFileInspector {
    path: PathBuf,
    document: Option<FactsDocument>,
}

impl FactsFileInspector {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            document: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 首次访问时加载文档
    async fn document(&mut self) -> Result<&FactsDocument> {
        let document = match self.document.take() {
            Some(document) => document,
            None => {
                tracing::info!("Loading facts from {}", self.path.display());
                let content = tokio::fs::read_to_string(&self.path).await?;
                let document: FactsDocument = serde_json::from_str(&content)?;
                tracing::debug!(
                    "Loaded {} route declarations, {} usage entries",
                    document.routes.len(),
                    document.usages.len()
                );
                document
            }
        };
        Ok(&*self.document.insert(document))
    }
}

#[async_trait]
impl CodeInspector for FactsFileInspector {
    async fn scan_routes(&mut self, base_package: &str) -> Result<Vec<RouteFact>> {
        let doc = self.document().await?;
        routes_in(doc, base_package)
    }

    async fn scan_usages(&mut self, base_package: &str) -> Result<UsageMap> {
        let doc = self.document().await?;
        Ok(usages_in(doc, base_package))
    }
}

/// 内存检查器 - 直接持有事实文档
#[derive(Debug, Clone, Default)]
pub struct MemoryInspector {
    document: FactsDocument,
}

impl MemoryInspector {
    pub fn new(document: FactsDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl CodeInspector for MemoryInspector {
    async fn scan_routes(&mut self, base_package: &str) -> Result<Vec<RouteFact>> {
        routes_in(&self.document, base_package)
    }

    async fn scan_usages(&mut self, base_package: &str) -> Result<UsageMap> {
        Ok(usages_in(&self.document, base_package))
    }
}
