pub mod clock;
pub mod datemath;
pub mod event;
pub mod grid;
pub mod hooks;
pub mod interval;
pub mod options;
pub mod snapshot;
pub mod template;
pub mod widget;

pub use event::CalendarEvent;
pub use grid::DayCell;
pub use hooks::{Adjacency, ClickHandlers, ClickTarget, TargetDetails};
pub use interval::{ConstraintFlags, Interval};
pub use options::{Classes, Constraints, LengthOfTime, MultiDayEvents, Options, Targets};
pub use snapshot::Snapshot;
pub use template::{RenderFn, default_template};
pub use widget::Calendar;
