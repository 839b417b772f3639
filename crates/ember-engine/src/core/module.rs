use std::cell::RefCell;
use std::rc::Rc;
use std::slice;

use anyhow::Result;

use super::ctx::{EventCtx, RenderCtx, SetupCtx, UpdateCtx};

/// Lifecycle participant driven by the [`Application`](super::Application).
///
/// Every hook has a no-op default. Per frame, each hook runs at most once per
/// module, in registration order.
pub trait Module {
    /// Called once after the runner is ready, or on registration when the
    /// application is already running.
    fn setup(&mut self, ctx: &mut SetupCtx<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Releases whatever `setup` acquired. Modules are destroyed in reverse
    /// registration order, before the runner.
    fn destroy(&mut self) {}

    /// Advances module state. Skipped while the application is paused.
    fn update(&mut self, ctx: &mut UpdateCtx<'_>) {
        let _ = ctx;
    }

    /// Runs for every module before any module's `render`.
    fn before_render(&mut self, ctx: &mut RenderCtx<'_>) {
        let _ = ctx;
    }

    fn render(&mut self, ctx: &mut RenderCtx<'_>) {
        let _ = ctx;
    }

    /// Runs for every module after all `render` hooks.
    fn after_render(&mut self, ctx: &mut RenderCtx<'_>) {
        let _ = ctx;
    }

    /// Receives each dispatched event once.
    fn handle_event(&mut self, ctx: &mut EventCtx<'_>) {
        let _ = ctx;
    }
}

/// Shared handle to a registered module.
///
/// The caller keeps its own typed clone (e.g. `Rc<RefCell<Renderer>>`) to
/// configure the module while the application drives it.
pub type ModuleRef = Rc<RefCell<dyn Module>>;

/// Modules in registration order.
#[derive(Default)]
pub struct ModuleList {
    modules: Vec<ModuleRef>,
}

impl ModuleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `module` unless that same module is already registered.
    ///
    /// Returns `false` for a duplicate.
    pub fn push(&mut self, module: ModuleRef) -> bool {
        if self.contains(&module) {
            return false;
        }
        self.modules.push(module);
        true
    }

    pub fn contains(&self, module: &ModuleRef) -> bool {
        self.modules.iter().any(|m| Rc::ptr_eq(m, module))
    }

    pub fn iter(&self) -> slice::Iter<'_, ModuleRef> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Unregisters `module`. Returns `false` if it was not registered.
    pub fn remove(&mut self, module: &ModuleRef) -> bool {
        let Some(index) = self.modules.iter().position(|m| Rc::ptr_eq(m, module)) else {
            return false;
        };
        self.modules.remove(index);
        true
    }

    pub fn clear(&mut self) {
        self.modules.clear();
    }
}

impl<'a> IntoIterator for &'a ModuleList {
    type Item = &'a ModuleRef;
    type IntoIter = slice::Iter<'a, ModuleRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank;

    impl Module for Blank {}

    fn module() -> ModuleRef {
        Rc::new(RefCell::new(Blank))
    }

    #[test]
    fn push_keeps_insertion_order() {
        let mut list = ModuleList::new();
        let a = module();
        let b = module();
        assert!(list.push(b.clone()));
        assert!(list.push(a.clone()));

        let order: Vec<bool> = list.iter().map(|m| Rc::ptr_eq(m, &b)).collect();
        assert_eq!(order, vec![true, false]);
    }

    #[test]
    fn same_module_is_registered_once() {
        let mut list = ModuleList::new();
        let a = module();
        assert!(list.push(a.clone()));
        assert!(!list.push(a.clone()));
        assert_eq!(list.len(), 1);

        // Another instance of the same type is a different module.
        assert!(list.push(module()));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn remove_keeps_the_order_of_the_rest() {
        let mut list = ModuleList::new();
        let (a, b, c) = (module(), module(), module());
        for m in [&a, &b, &c] {
            list.push(Rc::clone(m));
        }

        assert!(list.remove(&b));
        assert!(!list.remove(&b));
        assert!(!list.contains(&b));

        let rest: Vec<bool> = list.iter().map(|m| Rc::ptr_eq(m, &a)).collect();
        assert_eq!(rest, vec![true, false]);
        assert!(Rc::ptr_eq(&list.iter().as_slice()[1], &c));
    }
}
