use crate::config::DiagramConfig;
use crate::error::Result;
use crate::graph::GraphText;
use inspect::{CodeInspector, RouteFact, UsageMap};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// 一次扫描得到的两张图
#[derive(Debug, Clone)]
pub struct Diagrams {
    pub routes: GraphText,
    pub layers: GraphText,
}

/// 图组装器 - 把检查器给出的事实折叠成 Mermaid 图
pub struct DiagramAssembler {
    base_package: String,
}

impl DiagramAssembler {
    pub fn new(base_package: impl Into<String>) -> Self {
        Self {
            base_package: base_package.into(),
        }
    }

    pub fn base_package(&self) -> &str {
        &self.base_package
    }

    /// 扫描并构建路由图和层级图
    pub async fn assemble<I>(&self, inspector: &mut I) -> Result<Diagrams>
    where
        I: CodeInspector + ?Sized,
    {
        tracing::info!("Scanning routes in '{}'", self.base_package);
        let routes = inspector.scan_routes(&self.base_package).await?;

        tracing::info!("Scanning usages in '{}'", self.base_package);
        let usages = inspector.scan_usages(&self.base_package).await?;

        tracing::info!(
            "Found {} routes, {} symbols with usages",
            routes.len(),
            usages.len()
        );

        Ok(Diagrams {
            routes: Self::route_graph(&routes),
            layers: self.layer_graph(&usages),
        })
    }

    /// 路由图: 路径 --> |方法| 处理函数，按发现顺序
    pub fn route_graph(routes: &[RouteFact]) -> GraphText {
        routes
            .iter()
            .flat_map(|route| {
                let verbs = route.http_methods.join(",");
                route.paths.iter().map(move |path| {
                    GraphText::labeled_edge(route_path(path), verbs.clone(), &route.method_name)
                })
            })
            .fold(GraphText::graph(), GraphText::append)
    }

    /// 层级图: 被使用层 --> 使用层
    ///
    /// 使用者没有层名 (相对基础包只剩一段)，或两端同层时不画边；
    /// 被使用者没有层名时仍画边。重复边只保留一条。
    pub fn layer_graph(&self, usages: &UsageMap) -> GraphText {
        let mut layers: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

        for (user, used_symbols) in usages {
            let user_layer = Self::layer_prefix(user, &self.base_package);
            if user_layer.is_empty() {
                tracing::debug!("Skipping {}: no layer segment below the base package", user);
                continue;
            }

            for used in used_symbols {
                let used_layer = Self::layer_prefix(used, &self.base_package);
                if used_layer != user_layer {
                    layers.entry(used_layer).or_default().insert(user_layer);
                }
            }
        }

        layers
            .into_iter()
            .flat_map(|(used, users)| users.into_iter().map(move |user| GraphText::edge(used, user)))
            .fold(GraphText::graph_with("LR"), GraphText::append)
    }

    /// 符号相对基础包的第一段包名
    ///
    /// 去掉基础包后只剩一段 (如 `app.Main`)，或不在基础包内的符号返回空串；
    /// `app.Main.main` 的层名是 `Main`。
    #[doc(hidden)]
    pub fn layer_prefix<'a>(symbol: &'a str, base_package: &str) -> &'a str {
        let relative = if base_package.is_empty() {
            Some(symbol)
        } else {
            symbol
                .strip_prefix(base_package)
                .and_then(|rest| rest.strip_prefix('.'))
        };

        match relative.and_then(|r| r.split_once('.')) {
            Some((layer, _)) => layer,
            None => "",
        }
    }

    /// 使用树: 从 root 出发沿使用关系展开 depth 层
    ///
    /// 不去重，环由深度截断。边按深度优先顺序输出。
    pub fn usage_tree(root: &str, depth: usize, usages: &UsageMap) -> GraphText {
        let mut graph = GraphText::graph();
        // (使用者, 被使用者, 被使用者剩余深度)
        let mut pending: Vec<(&str, &str, usize)> = Vec::new();
        Self::push_usages(&mut pending, root, depth, usages);

        while let Some((user, used, remaining)) = pending.pop() {
            graph = graph.append(GraphText::edge(user, used));
            Self::push_usages(&mut pending, used, remaining, usages);
        }

        graph
    }

    /// 逆序压栈，弹出顺序与集合顺序一致
    fn push_usages<'a>(
        pending: &mut Vec<(&'a str, &'a str, usize)>,
        name: &'a str,
        depth: usize,
        usages: &'a UsageMap,
    ) {
        if depth == 0 {
            return;
        }
        if let Some(used_symbols) = usages.get(name) {
            pending.extend(
                used_symbols
                    .iter()
                    .rev()
                    .map(|used| (name, used.as_str(), depth - 1)),
            );
        }
    }
}

/// 路径变量 `{id}` 改写为 `:id`
pub fn route_path(template: &str) -> String {
    template.replace('{', ":").replace('}', "")
}

/// 扫描、构建并保存路由图与层级图
///
/// 按顺序写入路由图、层级图，返回写入的路径；任一步失败立即返回。
pub async fn generate<I>(inspector: &mut I, config: &DiagramConfig) -> Result<Vec<PathBuf>>
where
    I: CodeInspector + ?Sized,
{
    let assembler = DiagramAssembler::new(config.base_package.as_str());
    let diagrams = assembler.assemble(inspector).await?;

    let routes = diagrams.routes.save(config.route_path())?;
    let layers = diagrams.layers.save(config.layer_path())?;

    Ok(vec![routes, layers])
}
