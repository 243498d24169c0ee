//! 图生成配置

use std::path::{Path, PathBuf};

/// 图生成配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramConfig {
    /// 基础包，层级按其下第一段包名划分
    pub base_package: String,
    pub output_dir: PathBuf,
    pub route_file: String,
    pub layer_file: String,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            base_package: String::new(),
            output_dir: PathBuf::from("./docs"),
            route_file: "controller-diagram.html".to_string(),
            layer_file: "layer-diagram.html".to_string(),
        }
    }
}

impl DiagramConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[doc(hidden)]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("ARCHGRAPH_BASE_PACKAGE") {
            config.base_package = v;
        }

        if let Some(v) = lookup("ARCHGRAPH_OUTPUT_DIR") {
            if !v.is_empty() {
                config.output_dir = PathBuf::from(v);
            }
        }

        if let Some(v) = lookup("ARCHGRAPH_ROUTE_FILE") {
            if !v.is_empty() {
                config.route_file = v;
            }
        }

        if let Some(v) = lookup("ARCHGRAPH_LAYER_FILE") {
            if !v.is_empty() {
                config.layer_file = v;
            }
        }

        config
    }

    pub fn with_base_package(mut self, base_package: impl Into<String>) -> Self {
        self.base_package = base_package.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl AsRef<Path>) -> Self {
        self.output_dir = output_dir.as_ref().to_path_buf();
        self
    }

    /// 路由图输出路径
    pub fn route_path(&self) -> PathBuf {
        self.output_dir.join(&self.route_file)
    }

    /// 层级图输出路径
    pub fn layer_path(&self) -> PathBuf {
        self.output_dir.join(&self.layer_file)
    }
}
