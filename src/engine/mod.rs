pub mod guard;
pub mod lifecycle;
pub mod notifier;
pub mod tracking;
