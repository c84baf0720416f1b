//! WGPU 核心上下文封装
//!
//! 提供：
//! - WgpuContext: 只持有 device, queue, surface, config，负责 Resize 和 Present

pub mod context;

pub use context::WgpuContext;
