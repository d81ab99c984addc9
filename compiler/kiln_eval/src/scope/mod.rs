//! Compile-time lexical environment.
//!
//! A [`CompileEnv`] is the symbol table the resolution pass consults. It is a
//! chain of scopes, one per runtime frame-to-be:
//!
//! - `block` scopes stand for `let` frames and stay at the enclosing level;
//! - `function` scopes stand for closure frames and open a new level;
//! - a `runtime` scope wraps a live [`Environment`] so that a closure body can
//!   be resolved against the frames that exist when the closure is created.
//!
//! Every frame walked past adds one to the depth of a binding, exactly as the
//! runtime walks parent links.

use std::fmt;
use std::sync::Arc;

use kiln_ir::Name;
use kiln_value::Type;

use crate::environment::{Environment, FrameLayout, Modifiers};

/// Where a name resolved to.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub name: Name,
    /// Slot index within the frame.
    pub address: usize,
    /// Frame hops from the innermost scope.
    pub depth: u32,
    /// Function-nesting level of the declaring scope.
    pub level: u32,
    pub ty: Type,
    pub modifiers: Modifiers,
}

enum ScopeKind {
    Block(Arc<FrameLayout>),
    Function(Arc<FrameLayout>),
    Runtime(Environment),
}

struct Scope {
    kind: ScopeKind,
    level: u32,
    parent: Option<CompileEnv>,
}

/// Handle to the innermost scope of a compile-time chain.
#[derive(Clone)]
pub struct CompileEnv(Arc<Scope>);

impl CompileEnv {
    /// An outermost block scope at level 0.
    pub fn root(layout: Arc<FrameLayout>) -> Self {
        CompileEnv(Arc::new(Scope {
            kind: ScopeKind::Block(layout),
            level: 0,
            parent: None,
        }))
    }

    /// Wrap a live frame chain at level 0.
    pub fn runtime(env: Environment) -> Self {
        CompileEnv(Arc::new(Scope {
            kind: ScopeKind::Runtime(env),
            level: 0,
            parent: None,
        }))
    }

    /// A `let` scope nested in `self`.
    pub fn block(&self, layout: Arc<FrameLayout>) -> Self {
        self.nested(ScopeKind::Block(layout), self.level())
    }

    /// A closure scope nested in `self`, one level deeper.
    pub fn function(&self, layout: Arc<FrameLayout>) -> Self {
        self.nested(ScopeKind::Function(layout), self.level().saturating_add(1))
    }

    fn nested(&self, kind: ScopeKind, level: u32) -> Self {
        CompileEnv(Arc::new(Scope {
            kind,
            level,
            parent: Some(self.clone()),
        }))
    }

    /// Function-nesting level of the innermost scope.
    #[inline]
    pub fn level(&self) -> u32 {
        self.0.level
    }

    /// Find the innermost binding of `name`.
    pub fn lookup(&self, name: Name) -> Option<Binding> {
        self.frames()
            .enumerate()
            .find_map(|(depth, (layout, level))| bind(name, layout, depth, level))
    }

    /// Look `name` up only in the frame `hops` links away.
    pub fn lookup_at(&self, hops: u32, name: Name) -> Option<Binding> {
        let depth = usize::try_from(hops).ok()?;
        let (layout, level) = self.frames().nth(depth)?;
        bind(name, layout, depth, level)
    }

    fn frames(&self) -> Frames<'_> {
        Frames {
            scope: Some(self),
            runtime: None,
        }
    }
}

fn bind(name: Name, layout: &FrameLayout, depth: usize, level: u32) -> Option<Binding> {
    let (address, slot) = layout.lookup(name)?;
    Some(Binding {
        name,
        address,
        depth: u32::try_from(depth).ok()?,
        level,
        ty: slot.ty.clone(),
        modifiers: slot.modifiers,
    })
}

/// Frame layouts of a chain, innermost first, with their level.
struct Frames<'a> {
    scope: Option<&'a CompileEnv>,
    runtime: Option<(&'a Environment, u32)>,
}

impl<'a> Iterator for Frames<'a> {
    type Item = (&'a FrameLayout, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((env, level)) = self.runtime.take() {
            self.runtime = env.parent().map(|parent| (parent, level));
            return Some((&**env.layout(), level));
        }
        let handle: &'a CompileEnv = self.scope.take()?;
        let scope: &'a Scope = &handle.0;
        self.scope = scope.parent.as_ref();
        match &scope.kind {
            ScopeKind::Block(layout) | ScopeKind::Function(layout) => {
                Some((&**layout, scope.level))
            }
            ScopeKind::Runtime(env) => {
                self.runtime = env.parent().map(|parent| (parent, scope.level));
                Some((&**env.layout(), scope.level))
            }
        }
    }
}

impl fmt::Debug for CompileEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for (layout, level) in self.frames() {
            let names: Vec<Name> = layout.slots().iter().map(|slot| slot.name).collect();
            list.entry(&(level, names));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests;
