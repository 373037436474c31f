use crossbeam::atomic::AtomicCell;

/// The configuration of offload worker threads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OffloadCfg {
    /// The name of every offload worker thread.
    pub thread_name: &'static str,
    /// The stack size of every offload worker thread. `0` means the platform default.
    pub stack_size: usize,
}

impl OffloadCfg {
    pub const fn default() -> Self {
        Self {
            thread_name: "cotask-offload",
            stack_size: 0,
        }
    }
}

static OFFLOAD_CFG: AtomicCell<OffloadCfg> = AtomicCell::new(OffloadCfg::default());

pub fn config_thread_name() -> &'static str {
    OFFLOAD_CFG.load().thread_name
}

pub fn config_stack_size() -> usize {
    OFFLOAD_CFG.load().stack_size
}

/// Sets the name of offload worker threads spawned from now on.
pub fn set_thread_name(thread_name: &'static str) {
    update(|cfg| cfg.thread_name = thread_name);
}

/// Sets the stack size of offload worker threads spawned from now on.
pub fn set_stack_size(stack_size: usize) {
    update(|cfg| cfg.stack_size = stack_size);
}

pub fn set_config(config: OffloadCfg) {
    OFFLOAD_CFG.store(config);
}

fn update(change: impl Fn(&mut OffloadCfg)) {
    let _ = OFFLOAD_CFG.fetch_update(|mut cfg| {
        change(&mut cfg);
        Some(cfg)
    });
}
