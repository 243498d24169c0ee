use crate::facts::{InspectError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 符号使用关系: 使用者 -> 被使用的符号集合
pub type UsageMap = BTreeMap<String, BTreeSet<String>>;

/// 路由注解的属性集合
///
/// `None` 表示该层级没有声明这个属性，合并时由另一层级补上。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAttributes {
    /// 路径模板: "/users/{id}"
    #[serde(default, alias = "value")]
    pub paths: Option<Vec<String>>,
    /// HTTP 方法: "GET", "POST"
    #[serde(default, alias = "method")]
    pub methods: Option<Vec<String>>,
}

impl RouteAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }
}

/// 路由声明 - 一个处理方法及其方法级、类级注解
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDeclaration {
    /// 完整限定名: "com.example.web.UserController.getUser"
    pub method: String,
    /// 声明类上的注解
    #[serde(default)]
    pub class_mapping: Option<RouteAttributes>,
    /// 方法上的注解
    #[serde(default)]
    pub method_mapping: RouteAttributes,
}

impl RouteDeclaration {
    /// 合并方法级与类级属性，方法级优先
    pub fn merge(&self) -> Result<RouteFact> {
        if self.method.trim().is_empty() {
            return Err(InspectError::MalformedFact(
                "route declaration without a method name".to_string(),
            ));
        }

        let class = self.class_mapping.as_ref();
        let paths = self
            .method_mapping
            .paths
            .as_ref()
            .or_else(|| class.and_then(|c| c.paths.as_ref()))
            .ok_or_else(|| {
                InspectError::MalformedFact(format!("{}: missing path attribute", self.method))
            })?;
        let methods = self
            .method_mapping
            .methods
            .as_ref()
            .or_else(|| class.and_then(|c| c.methods.as_ref()));

        Ok(RouteFact {
            paths: dedup(paths.iter()),
            http_methods: methods.map(|m| dedup(m.iter())).unwrap_or_default(),
            method_name: self.method.clone(),
        })
    }
}

/// 合并后的路由事实
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteFact {
    pub paths: Vec<String>,
    pub http_methods: Vec<String>,
    pub method_name: String,
}

/// 事实文档 - 代码检查器的输出
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactsDocument {
    #[serde(default)]
    pub routes: Vec<RouteDeclaration>,
    #[serde(default)]
    pub usages: UsageMap,
}

/// 保持首次出现顺序去重
fn dedup<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .filter(|item| seen.insert(item.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(class: Option<RouteAttributes>, method: RouteAttributes) -> RouteDeclaration {
        RouteDeclaration {
            method: "app.web.UserController.getUser".to_string(),
            class_mapping: class,
            method_mapping: method,
        }
    }

    #[test]
    fn test_merge_method_level_wins() {
        let decl = declaration(
            Some(RouteAttributes::new().with_paths(["/api"]).with_methods(["GET"])),
            RouteAttributes::new().with_paths(["/users/{id}"]),
        );
        let fact = decl.merge().unwrap();
        assert_eq!(fact.paths, vec!["/users/{id}"]);
        // 方法级未声明 methods，沿用类级
        assert_eq!(fact.http_methods, vec!["GET"]);
        assert_eq!(fact.method_name, "app.web.UserController.getUser");
    }

    #[test]
    fn test_merge_falls_back_to_class_paths() {
        let decl = declaration(
            Some(RouteAttributes::new().with_paths(["/users"])),
            RouteAttributes::new().with_methods(["POST"]),
        );
        let fact = decl.merge().unwrap();
        assert_eq!(fact.paths, vec!["/users"]);
        assert_eq!(fact.http_methods, vec!["POST"]);
    }

    #[test]
    fn test_merge_missing_paths_is_malformed() {
        let decl = declaration(None, RouteAttributes::new().with_methods(["GET"]));
        let err = decl.merge().unwrap_err();
        assert!(matches!(err, InspectError::MalformedFact(_)));
    }

    #[test]
    fn test_merge_empty_method_name_is_malformed() {
        let mut decl = declaration(None, RouteAttributes::new().with_paths(["/"]));
        decl.method = "  ".to_string();
        assert!(matches!(decl.merge(), Err(InspectError::MalformedFact(_))));
    }

    #[test]
    fn test_merge_without_methods_yields_empty_list() {
        let decl = declaration(None, RouteAttributes::new().with_paths(["/health"]));
        assert!(decl.merge().unwrap().http_methods.is_empty());
    }

    #[test]
    fn test_merge_dedups_keeping_order() {
        let decl = declaration(
            None,
            RouteAttributes::new()
                .with_paths(["/b", "/a", "/b"])
                .with_methods(["POST", "GET", "POST"]),
        );
        let fact = decl.merge().unwrap();
        assert_eq!(fact.paths, vec!["/b", "/a"]);
        assert_eq!(fact.http_methods, vec!["POST", "GET"]);
    }

    #[test]
    fn test_attributes_accept_annotation_names() {
        let attrs: RouteAttributes =
            serde_json::from_str(r#"{"value": ["/x"], "method": ["GET"]}"#).unwrap();
        assert_eq!(attrs.paths, Some(vec!["/x".to_string()]));
        assert_eq!(attrs.methods, Some(vec!["GET".to_string()]));
    }

    #[test]
    fn test_document_defaults_to_empty() {
        let doc: FactsDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.routes.is_empty());
        assert!(doc.usages.is_empty());
    }
}
