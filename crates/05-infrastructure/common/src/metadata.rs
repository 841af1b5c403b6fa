//! 元数据定义
//!
//! 提供服务协议和具体类型的类型元数据

use std::any::TypeId;
use std::fmt;

/// 类型信息
///
/// 同时用于具体类型和 `dyn Trait` 形式的服务协议，相等性只取决于 [`TypeId`]。
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型路径
    pub path: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径和 `dyn ` 前缀）
    pub fn short_name(&self) -> &'static str {
        let path = self.path.strip_prefix("dyn ").unwrap_or(self.path);
        path.rsplit("::").next().unwrap_or(path)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl std::hash::Hash for TypeInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
