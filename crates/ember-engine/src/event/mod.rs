//! Engine events.
//!
//! Events are immutable messages shared as `Rc<dyn Event>` and dispatched on
//! the main thread to every registered module. Receivers recover the concrete
//! type with [`cast`](trait.Event.html#method.cast), which returns `None` on a
//! type mismatch.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

mod input;
mod window;

pub use input::{
    Key, KeyCharEvent, KeyDownEvent, KeyUpEvent, Modifiers, MouseButton, MouseDownEvent,
    MouseMoveEvent, MouseUpEvent, MouseWheelEvent, WheelDelta,
};
pub use window::{
    WindowClosedEvent, WindowFocusChangedEvent, WindowMovedEvent, WindowResizedEvent,
};

/// Shared handle to a dispatched event.
pub type EventRef = Rc<dyn Event>;

/// Message type understood by the dispatcher.
///
/// Implement with [`impl_event!`](crate::impl_event).
pub trait Event: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    /// Short type name used in logs.
    fn name(&self) -> &'static str;
}

impl dyn Event {
    /// Returns the concrete event if it is a `T`.
    #[inline]
    pub fn cast<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[inline]
    pub fn is<T: Event>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Implements [`Event`] for one or more concrete types.
#[macro_export]
macro_rules! impl_event {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::event::Event for $ty {
                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }

                fn name(&self) -> &'static str {
                    stringify!($ty)
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;

    #[derive(Debug)]
    struct Custom(u32);

    crate::impl_event!(Custom);

    #[test]
    fn cast_returns_concrete_type() {
        let evt: EventRef = Rc::new(Custom(7));
        assert_eq!(evt.cast::<Custom>().map(|c| c.0), Some(7));
        assert!(evt.is::<Custom>());
        assert_eq!(evt.name(), "Custom");
    }

    #[test]
    fn cast_mismatch_is_none() {
        let evt: EventRef = Rc::new(MouseMoveEvent { pos: Vec2::new(1.0, 2.0) });
        assert!(evt.cast::<Custom>().is_none());
        assert!(evt.cast::<WindowResizedEvent>().is_none());
        assert!(evt.cast::<MouseMoveEvent>().is_some());
    }
}
