//! 提供者注册表
//!
//! 按组件键保存提供者，同一个键可以安装多个提供者，后安装的优先。
//! 所有提供者都无法处理时交给父组合器。

use di_abstractions::{Composer, ComponentKey, Provider, Resolution, ResolutionContext};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

struct ProviderEntry {
    id: u64,
    provider: Provider,
}

/// 提供者注册表
pub struct ProviderRegistry {
    this: Weak<ProviderRegistry>,
    parent: Option<Arc<dyn Composer>>,
    next_id: AtomicU64,
    providers: RwLock<HashMap<ComponentKey, Vec<ProviderEntry>>>,
}

impl ProviderRegistry {
    pub fn new() -> Arc<Self> {
        Self::create(None)
    }

    /// 创建带父组合器的注册表，本地无法处理的键交给父组合器
    pub fn with_parent(parent: Arc<dyn Composer>) -> Arc<Self> {
        Self::create(Some(parent))
    }

    fn create(parent: Option<Arc<dyn Composer>>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            parent,
            next_id: AtomicU64::new(1),
            providers: RwLock::new(HashMap::new()),
        })
    }

    /// 安装提供者
    pub fn install(&self, key: ComponentKey, provider: Provider) -> ProviderHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.providers
            .write()
            .entry(key.clone())
            .or_default()
            .push(ProviderEntry { id, provider });
        debug!("安装提供者: {} (#{})", key, id);
        ProviderHandle {
            key,
            id,
            registry: self.this.clone(),
        }
    }

    /// 卸载提供者，提供者不存在时返回 false
    pub fn uninstall(&self, key: &ComponentKey, id: u64) -> bool {
        let mut providers = self.providers.write();
        let Some(entries) = providers.get_mut(key) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            providers.remove(key);
        }
        if removed {
            debug!("卸载提供者: {} (#{})", key, id);
        }
        removed
    }

    /// 本地是否有此键的提供者
    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.providers.read().contains_key(key)
    }

    /// 本地已安装提供者的键
    pub fn keys(&self) -> Vec<ComponentKey> {
        self.providers.read().keys().cloned().collect()
    }

    pub fn parent(&self) -> Option<&Arc<dyn Composer>> {
        self.parent.as_ref()
    }

    fn providers_for(&self, key: &ComponentKey) -> Vec<Provider> {
        self.providers
            .read()
            .get(key)
            .map(|entries| entries.iter().rev().map(|entry| entry.provider.clone()).collect())
            .unwrap_or_default()
    }
}

impl Composer for ProviderRegistry {
    fn resolve(&self, key: &ComponentKey, context: ResolutionContext) -> Option<Resolution> {
        // 调用提供者前释放锁，提供者会递归解析依赖甚至替换自身
        let providers = self.providers_for(key);
        if !providers.is_empty() {
            if let Some(this) = self.this.upgrade() {
                let composer: Arc<dyn Composer> = this;
                for provider in providers {
                    if let Some(resolution) = provider(&context, &composer) {
                        return Some(resolution);
                    }
                }
            }
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.resolve(key, context))
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("keys", &self.providers.read().len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// 已安装提供者的句柄
#[derive(Clone)]
pub struct ProviderHandle {
    key: ComponentKey,
    id: u64,
    registry: Weak<ProviderRegistry>,
}

impl ProviderHandle {
    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    /// 从注册表中移除此提供者
    pub fn uninstall(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.uninstall(&self.key, self.id))
            .unwrap_or(false)
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}
