pub mod arrow;
pub mod bar_task;
pub mod ordering;
pub mod task;
pub mod timeline;

pub use arrow::Arrow;
pub use bar_task::{BarTask, BarVariant, Hit, HitRegion, Permissions};
pub use task::{StyleOverride, Task, TaskType};
pub use timeline::{DateAxis, ViewMode};
