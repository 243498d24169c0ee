use crate::facts::Result;
use crate::types::{RouteFact, UsageMap};
use async_trait::async_trait;

/// 代码检查器 trait
///
/// 只返回已提取的事实，图的构建不依赖具体的检查手段
/// (反射、静态分析、手写的测试数据均可)。
#[async_trait]
pub trait CodeInspector: Send + Sync {
    /// 扫描基础包内的路由，注解已合并
    async fn scan_routes(&mut self, base_package: &str) -> Result<Vec<RouteFact>>;

    /// 扫描基础包内的符号使用关系 (使用者 -> 被使用者)
    async fn scan_usages(&mut self, base_package: &str) -> Result<UsageMap>;
}
