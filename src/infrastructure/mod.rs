// Infrastructure module - Background tasks and timers
pub mod task_manager;
pub mod timer;

pub use task_manager::TaskManager;
pub use timer::Timer;
