//! 生命周期策略实现

use di_abstractions::{ComponentPolicy, Instance, InstanceFuture, Lifestyle, Resolution};
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// 瞬态生命周期，每次解析都调用工厂
#[derive(Debug, Default, Clone, Copy)]
pub struct TransientLifestyle;

impl ComponentPolicy for TransientLifestyle {}

impl Lifestyle for TransientLifestyle {
    fn resolve(&self, factory: &dyn Fn(bool) -> Resolution) -> Resolution {
        factory(false)
    }
}

enum SingletonSlot {
    Empty,
    /// 异步创建中，并发请求共享同一个 future
    Pending(Shared<InstanceFuture>),
    Ready(Instance),
}

/// 单例生命周期
///
/// 第一次解析时调用工厂并缓存结果，之后的解析都返回缓存的实例。
/// 异步创建期间的请求会等待同一个结果，创建失败后状态恢复为空。
#[derive(Clone)]
pub struct SingletonLifestyle {
    slot: Arc<Mutex<SingletonSlot>>,
}

impl SingletonLifestyle {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(SingletonSlot::Empty)),
        }
    }

    /// 使用已有实例的单例
    pub fn with_instance(instance: Instance) -> Self {
        Self {
            slot: Arc::new(Mutex::new(SingletonSlot::Ready(instance))),
        }
    }

    pub fn instance(&self) -> Option<Instance> {
        match &*self.slot.lock() {
            SingletonSlot::Ready(instance) => Some(instance.clone()),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(&*self.slot.lock(), SingletonSlot::Pending(_))
    }

    fn cached(&self) -> Option<Resolution> {
        match &*self.slot.lock() {
            SingletonSlot::Empty => None,
            SingletonSlot::Pending(shared) => Some(Resolution::Pending(shared.clone().boxed())),
            SingletonSlot::Ready(instance) => Some(Resolution::Ready(instance.clone())),
        }
    }
}

impl Default for SingletonLifestyle {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentPolicy for SingletonLifestyle {}

impl Lifestyle for SingletonLifestyle {
    fn resolve(&self, factory: &dyn Fn(bool) -> Resolution) -> Resolution {
        if let Some(cached) = self.cached() {
            return cached;
        }

        // 调用工厂时不能持有锁，工厂可能再次解析同一组件
        match factory(true) {
            Resolution::Ready(instance) => {
                *self.slot.lock() = SingletonSlot::Ready(instance.clone());
                Resolution::Ready(instance)
            }
            Resolution::Pending(pending) => {
                let slot = Arc::downgrade(&self.slot);
                let shared = async move {
                    let result = pending.await;
                    if let Some(slot) = slot.upgrade() {
                        *slot.lock() = match &result {
                            Ok(instance) => SingletonSlot::Ready(instance.clone()),
                            Err(_) => SingletonSlot::Empty,
                        };
                    }
                    result
                }
                .boxed()
                .shared();
                *self.slot.lock() = SingletonSlot::Pending(shared.clone());
                Resolution::Pending(shared.boxed())
            }
            failed => failed,
        }
    }
}

impl fmt::Debug for SingletonLifestyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.slot.lock() {
            SingletonSlot::Empty => "empty",
            SingletonSlot::Pending(_) => "pending",
            SingletonSlot::Ready(_) => "ready",
        };
        f.debug_struct("SingletonLifestyle").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::DependencyError;
    use futures::channel::oneshot;
    use std::future::IntoFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_factory(counter: &AtomicUsize) -> impl Fn(bool) -> Resolution + '_ {
        move |_| {
            let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Resolution::Ready(Arc::new(count))
        }
    }

    #[test]
    fn test_transient_calls_factory_every_time() {
        let counter = AtomicUsize::new(0);
        let lifestyle = TransientLifestyle;
        let first = lifestyle.resolve(&counting_factory(&counter));
        let second = lifestyle.resolve(&counting_factory(&counter));
        assert!(!Arc::ptr_eq(first.ready().unwrap(), second.ready().unwrap()));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_transient_never_requests_replacement() {
        let lifestyle = TransientLifestyle;
        let resolution = lifestyle.resolve(&|replace| {
            assert!(!replace);
            Resolution::Ready(Arc::new(()))
        });
        assert!(resolution.is_ready());
    }

    #[test]
    fn test_singleton_caches_first_instance() {
        let counter = AtomicUsize::new(0);
        let lifestyle = SingletonLifestyle::new();
        let first = lifestyle.resolve(&counting_factory(&counter));
        let second = lifestyle.resolve(&counting_factory(&counter));
        assert!(Arc::ptr_eq(first.ready().unwrap(), second.ready().unwrap()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(lifestyle.instance().is_some());
    }

    #[test]
    fn test_singleton_requests_replacement() {
        let lifestyle = SingletonLifestyle::new();
        let resolution = lifestyle.resolve(&|replace| {
            assert!(replace);
            Resolution::Ready(Arc::new(()))
        });
        assert!(resolution.is_ready());
    }

    #[test]
    fn test_with_instance_skips_factory() {
        let instance: Instance = Arc::new("V12");
        let lifestyle = SingletonLifestyle::with_instance(instance.clone());
        let resolution = lifestyle.resolve(&|_| panic!("不应调用工厂"));
        assert!(Arc::ptr_eq(resolution.ready().unwrap(), &instance));
    }

    #[test]
    fn test_failed_factory_is_not_cached() {
        let lifestyle = SingletonLifestyle::new();
        let failed = lifestyle.resolve(&|_| {
            Resolution::Failed(DependencyError::creation_failed("Engine", "缺少燃料"))
        });
        assert!(failed.is_failed());
        assert!(lifestyle.instance().is_none());

        let counter = AtomicUsize::new(0);
        assert!(lifestyle.resolve(&counting_factory(&counter)).is_ready());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_singleton_shares_pending_creation() {
        let (sender, receiver) = oneshot::channel::<Instance>();
        let receiver = Mutex::new(Some(receiver));
        let counter = AtomicUsize::new(0);
        let factory = |_: bool| {
            counter.fetch_add(1, Ordering::SeqCst);
            let receiver = receiver.lock().take();
            Resolution::Pending(
                async move {
                    match receiver {
                        Some(receiver) => receiver
                            .await
                            .map_err(|_| DependencyError::creation_failed("Engine", "已取消")),
                        None => Err(DependencyError::creation_failed("Engine", "重复创建")),
                    }
                }
                .boxed(),
            )
        };

        let lifestyle = SingletonLifestyle::new();
        let first = lifestyle.resolve(&factory);
        let second = lifestyle.resolve(&factory);
        assert!(first.is_pending() && second.is_pending());
        assert!(lifestyle.is_pending());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let engine: Instance = Arc::new("V12");
        sender.send(engine.clone()).unwrap();
        let (first, second) = futures::join!(first.into_future(), second.into_future());
        assert!(Arc::ptr_eq(&first.unwrap(), &engine));
        assert!(Arc::ptr_eq(&second.unwrap(), &engine));

        let third = lifestyle.resolve(&factory);
        assert!(Arc::ptr_eq(third.ready().unwrap(), &engine));
    }

    #[tokio::test]
    async fn test_failed_pending_creation_resets_slot() {
        let lifestyle = SingletonLifestyle::new();
        let pending = lifestyle.resolve(&|_| {
            Resolution::Pending(
                async { Err(DependencyError::creation_failed("Engine", "启动失败")) }.boxed(),
            )
        });
        assert!(pending.into_future().await.is_err());
        assert!(!lifestyle.is_pending());
        assert!(lifestyle.instance().is_none());
    }
}
