//! 依赖解析链
//!
//! 每个需要通过容器解析的依赖对应一个 [`DependencyResolution`] 节点，
//! 节点指向触发它的父节点，用于检测循环依赖和定位失败的依赖。

use crate::container::ContainerId;
use crate::key::ComponentKey;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 依赖解析节点
pub struct DependencyResolution {
    key: ComponentKey,
    parent: Option<Arc<DependencyResolution>>,
    owner: RwLock<Option<ContainerId>>,
    active: AtomicBool,
    depth: usize,
}

impl DependencyResolution {
    /// 创建解析链的根节点
    pub fn root(key: ComponentKey) -> Arc<Self> {
        Arc::new(Self {
            key,
            parent: None,
            owner: RwLock::new(None),
            active: AtomicBool::new(true),
            depth: 0,
        })
    }

    /// 创建子节点
    pub fn child(parent: &Arc<Self>, key: ComponentKey) -> Arc<Self> {
        Arc::new(Self {
            key,
            parent: Some(parent.clone()),
            owner: RwLock::new(None),
            active: AtomicBool::new(true),
            depth: parent.depth + 1,
        })
    }

    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    pub fn parent(&self) -> Option<&Arc<DependencyResolution>> {
        self.parent.as_ref()
    }

    /// 到根节点的距离，根节点为 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 记录负责解析此节点的容器
    pub fn claim(&self, owner: ContainerId) {
        *self.owner.write() = Some(owner);
    }

    pub fn owner(&self) -> Option<ContainerId> {
        *self.owner.read()
    }

    /// 节点对应的工厂调用已结束
    pub fn complete(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// 指定容器是否正在解析指定键
    ///
    /// 从当前节点一直检查到根节点，间接循环（A -> B -> C -> A）同样可以发现。
    /// 已完成的节点会被跳过。
    pub fn is_resolving_key(&self, key: &ComponentKey, requestor: ContainerId) -> bool {
        let mut current = Some(self);
        while let Some(node) = current {
            if node.is_active() && node.key == *key && node.owner() == Some(requestor) {
                return true;
            }
            current = node.parent.as_deref();
        }
        false
    }

    /// 从根节点到当前节点的键
    pub fn path(&self) -> Vec<ComponentKey> {
        let mut path = Vec::with_capacity(self.depth + 1);
        let mut current = Some(self);
        while let Some(node) = current {
            path.push(node.key.clone());
            current = node.parent.as_deref();
        }
        path.reverse();
        path
    }

    /// 解析链的可读描述，例如 `Car -> Engine`
    pub fn describe_chain(&self) -> String {
        self.path()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl fmt::Debug for DependencyResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyResolution")
            .field("key", &self.key)
            .field("depth", &self.depth)
            .field("owner", &self.owner())
            .field("active", &self.is_active())
            .field("chain", &self.describe_chain())
            .finish()
    }
}

/// 解析上下文
///
/// 顶层请求只带有被请求的键，嵌套解析带有当前的解析节点。
#[derive(Debug, Clone)]
pub enum ResolutionContext {
    Root(ComponentKey),
    Dependency(Arc<DependencyResolution>),
}

impl ResolutionContext {
    pub fn key(&self) -> &ComponentKey {
        match self {
            Self::Root(key) => key,
            Self::Dependency(node) => node.key(),
        }
    }

    pub fn as_dependency(&self) -> Option<&Arc<DependencyResolution>> {
        match self {
            Self::Dependency(node) => Some(node),
            Self::Root(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(keys: &[&str], owner: ContainerId) -> Arc<DependencyResolution> {
        let mut node = DependencyResolution::root(ComponentKey::named(keys[0]));
        node.claim(owner);
        for key in &keys[1..] {
            node = DependencyResolution::child(&node, ComponentKey::named(*key));
            node.claim(owner);
        }
        node
    }

    #[test]
    fn test_walks_entire_ancestor_chain() {
        let owner = ContainerId::new();
        let deepest = chain(&["a", "b", "c"], owner);

        assert!(deepest.is_resolving_key(&ComponentKey::named("a"), owner));
        assert!(deepest.is_resolving_key(&ComponentKey::named("c"), owner));
        assert!(!deepest.is_resolving_key(&ComponentKey::named("d"), owner));
        assert_eq!(deepest.depth(), 2);
        assert_eq!(deepest.describe_chain(), "a -> b -> c");
    }

    #[test]
    fn test_requires_matching_owner() {
        let owner = ContainerId::new();
        let deepest = chain(&["a", "b"], owner);
        assert!(!deepest.is_resolving_key(&ComponentKey::named("a"), ContainerId::new()));
    }

    #[test]
    fn test_completed_nodes_are_skipped() {
        let owner = ContainerId::new();
        let deepest = chain(&["a", "b"], owner);
        deepest.parent().unwrap().complete();
        assert!(!deepest.is_resolving_key(&ComponentKey::named("a"), owner));
        assert!(deepest.is_resolving_key(&ComponentKey::named("b"), owner));
    }
}
