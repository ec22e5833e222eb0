//! 宿主函数注册表
//!
//! 策略脚本可以回调的宿主函数。嵌入式运行时启动时，会把 `HOST_FUNCTIONS`
//! 中的每一项注册到宿主命名空间下。

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{error, info};

use crate::plugin::PLUGIN_TYPE;
use crate::runtime::value::Value;

/// 脚本日志输出目标
pub trait LogSink: Send + Sync {
    fn info(
        &self,
        msg: &str,
    );

    fn error(
        &self,
        msg: &str,
    );
}

/// 将脚本日志转发到 `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(
        &self,
        msg: &str,
    ) {
        info!("{}: {}", PLUGIN_TYPE, msg);
    }

    fn error(
        &self,
        msg: &str,
    ) {
        error!("{}: {}", PLUGIN_TYPE, msg);
    }
}

/// 暂存的用户消息与日志输出，与运行时共享
///
/// 同一时刻最多只有一条待发消息；`user_msg` 以换行追加，`take_staged` 取出并清空。
#[derive(Clone)]
pub struct MessageBridge {
    staged: Arc<Mutex<Option<String>>>,
    sink: Arc<dyn LogSink>,
}

impl MessageBridge {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            staged: Arc::new(Mutex::new(None)),
            sink,
        }
    }

    /// 追加到暂存消息
    pub fn user_msg(
        &self,
        msg: &str,
    ) {
        let mut staged = self.staged.lock();
        match staged.as_mut() {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(msg);
            }
            None => *staged = Some(msg.to_string()),
        }
    }

    pub fn info(
        &self,
        msg: &str,
    ) {
        self.sink.info(msg);
    }

    pub fn error(
        &self,
        msg: &str,
    ) {
        self.sink.error(msg);
    }

    /// 取出暂存消息
    pub fn take_staged(&self) -> Option<String> {
        self.staged.lock().take()
    }

    pub fn has_staged(&self) -> bool {
        self.staged.lock().is_some()
    }

    /// 丢弃暂存内容
    pub fn clear(&self) {
        self.staged.lock().take();
    }
}

impl Default for MessageBridge {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl std::fmt::Debug for MessageBridge {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("MessageBridge")
            .field("staged", &*self.staged.lock())
            .finish_non_exhaustive()
    }
}

/// 宿主函数定义
pub struct HostFunction {
    /// 宿主命名空间内的函数名
    pub name: &'static str,
    /// 处理函数，参数为消息桥与脚本传入的单个值
    pub func: fn(&MessageBridge, &Value),
}

/// 宿主函数注册表
pub static HOST_FUNCTIONS: Lazy<HostFunctionRegistry> = Lazy::new(|| {
    let mut registry = HostFunctionRegistry::new();
    registry.init_bridge();
    registry
});

/// 宿主函数注册表类型
#[derive(Default)]
pub struct HostFunctionRegistry {
    functions: HashMap<&'static str, HostFunction>,
}

impl HostFunctionRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// 注册宿主函数
    pub fn register(
        &mut self,
        func: HostFunction,
    ) {
        self.functions.insert(func.name, func);
    }

    /// 获取宿主函数
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&HostFunction> {
        self.functions.get(name)
    }

    /// 按名称调用宿主函数；不存在时返回 false
    pub fn call(
        &self,
        name: &str,
        bridge: &MessageBridge,
        arg: &Value,
    ) -> bool {
        match self.get(name) {
            Some(host_fn) => {
                (host_fn.func)(bridge, arg);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostFunction> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn init_bridge(&mut self) {
        self.register(HostFunction {
            name: "user_msg",
            func: host_user_msg,
        });
        self.register(HostFunction {
            name: "info",
            func: host_info,
        });
        self.register(HostFunction {
            name: "error",
            func: host_error,
        });
    }
}

fn host_user_msg(
    bridge: &MessageBridge,
    arg: &Value,
) {
    bridge.user_msg(&arg.to_text());
}

fn host_info(
    bridge: &MessageBridge,
    arg: &Value,
) {
    bridge.info(&arg.to_text());
}

fn host_error(
    bridge: &MessageBridge,
    arg: &Value,
) {
    bridge.error(&arg.to_text());
}
