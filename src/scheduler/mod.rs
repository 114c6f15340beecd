//! Time: the per-table effect queue and the loop that ticks every table.

mod effects;
mod table;
mod tick;

pub use effects::{EffectId, EffectKind, EffectQueue, ScheduledEffect};
pub use table::Table;
pub use tick::{Command, Scheduler, SchedulerHandle, TableHealth};
