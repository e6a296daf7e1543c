//! Application services: the lifecycle control loop and A/B test analysis.

pub mod ab_test_service;
pub mod format_selector;
pub mod insight_generator;
pub mod lifecycle_controller;
pub mod lifecycle_scheduler;
pub mod metrics;
pub mod post_composer;
pub mod statistics;

pub use ab_test_service::AbTestService;
pub use lifecycle_controller::{Decision, LifecycleController, TickReport};
pub use lifecycle_scheduler::{LifecycleScheduler, SchedulerConfig, SchedulerStatus};
pub use post_composer::PostComposer;
