//! Typed control callbacks
//!
//! Every interactive control notifies its owner through a [`Callback`],
//! invoked with the control's new value as sole argument. Two variants
//! exist: a plain function, and a bound (receiver, method) pair held weakly
//! so a dropped receiver turns notification into a silent no-op. Controls
//! that synchronize *from* an external model suppress the callback via their
//! `notify` flags - a model-driven update must not re-trigger the model.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

enum Inner<T> {
    Function(Box<dyn FnMut(T)>),
    Method(Box<dyn FnMut(T)>),
}

/// A function or bound-method callback taking the control's new value
pub struct Callback<T> {
    inner: Inner<T>,
}

impl<T: 'static> Callback<T> {
    /// Wrap a plain function
    pub fn function(f: impl FnMut(T) + 'static) -> Self {
        Self {
            inner: Inner::Function(Box::new(f)),
        }
    }

    /// Bind a method on a shared receiver
    ///
    /// The receiver is held weakly: once the owner drops it, invocations do
    /// nothing.
    pub fn method<O: 'static>(receiver: &Rc<RefCell<O>>, method: fn(&mut O, T)) -> Self {
        let weak: Weak<RefCell<O>> = Rc::downgrade(receiver);
        Self {
            inner: Inner::Method(Box::new(move |value| {
                if let Some(receiver) = weak.upgrade() {
                    method(&mut receiver.borrow_mut(), value);
                }
            })),
        }
    }

    /// Invoke with the control's new value
    pub fn invoke(&mut self, value: T) {
        match &mut self.inner {
            Inner::Function(f) | Inner::Method(f) => f(value),
        }
    }
}

impl<T> std::fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.inner {
            Inner::Function(_) => "Function",
            Inner::Method(_) => "Method",
        };
        f.debug_struct("Callback").field("kind", &kind).finish()
    }
}
