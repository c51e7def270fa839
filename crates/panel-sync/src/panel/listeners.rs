//! Change listeners
//!
//! Listeners are cloned out before being called, so a listener may read the
//! state it observes or register further listeners without a borrow panic.

use std::cell::RefCell;
use std::rc::Rc;

pub(crate) struct Listeners<T: ?Sized> {
    slots: RefCell<Vec<Rc<dyn Fn(&T)>>>,
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> Listeners<T> {
    pub fn add(&self, listener: impl Fn(&T) + 'static) {
        self.slots.borrow_mut().push(Rc::new(listener));
    }

    pub fn notify(&self, value: &T) {
        let slots: Vec<_> = self.slots.borrow().clone();
        for slot in slots {
            slot(value);
        }
    }
}
