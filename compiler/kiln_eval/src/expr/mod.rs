//! Expression trees.
//!
//! An [`Expr`] is an immutable node: its kind, its children and the static
//! type inferred when it was built. Trees are shared through [`ExprRef`]
//! (`Arc<Expr>`); the rewrite passes never mutate a node; they return either
//! the same `Arc` (nothing changed) or a freshly built node.
//!
//! Nodes are created through the constructors in `build.rs`
//! (`Expr::binary`, `Expr::let_block`, ...). Constructors whose static
//! type comes from an operator return `Result`, because the operator may
//! reject the operand types.

mod build;
mod children;
mod infer;

use std::sync::Arc;

use kiln_ir::Name;
use kiln_value::{EvalResult, HostClassRef, OperatorRef, Type, Value};

use crate::environment::{Environment, Modifiers};
use crate::lvalue::LValue;
use crate::scope::{Binding, CompileEnv};

pub use build::{IncDecOp, LambdaDef, LetBlock, Param};

use infer::constness;

/// Shared handle to a node.
pub type ExprRef = Arc<Expr>;

/// A node, its inferred static type and whether it is a compile-time
/// constant.
#[derive(Debug)]
pub struct Expr {
    kind: ExprKind,
    ty: Type,
    constant: bool,
}

/// Resolved reference to a frame slot.
#[derive(Clone, Debug, PartialEq)]
pub struct VarRef {
    pub name: Name,
    pub address: usize,
    /// Parent links to walk from the evaluating frame.
    pub depth: u32,
    /// Function-nesting level of the declaring scope.
    pub level: u32,
    pub modifiers: Modifiers,
    pub ty: Type,
}

impl From<Binding> for VarRef {
    fn from(binding: Binding) -> Self {
        VarRef {
            name: binding.name,
            address: binding.address,
            depth: binding.depth,
            level: binding.level,
            modifiers: binding.modifiers,
            ty: binding.ty,
        }
    }
}

/// `base[index]` over strings, char buffers, lists, arrays and maps.
#[derive(Clone, Debug)]
pub struct IndexExpr {
    pub base: ExprRef,
    pub index: ExprRef,
}

/// Reflective field of a host object.
#[derive(Clone, Debug)]
pub struct HostFieldExpr {
    pub object: ExprRef,
    pub field: Name,
}

/// Static field of a host class.
#[derive(Clone, Debug)]
pub struct StaticFieldExpr {
    pub class: HostClassRef,
    pub field: Name,
}

/// `map.key`; reading a missing key yields `null`.
#[derive(Clone, Debug)]
pub struct MapMemberExpr {
    pub map: ExprRef,
    pub key: Name,
}

/// Named member of an interpreted-class instance.
///
/// When `object` is a `ScopeRef` placeholder the resolution pass links the
/// member to a plain variable reference instead.
#[derive(Clone, Debug)]
pub struct ClassMemberExpr {
    pub object: ExprRef,
    pub member: Name,
}

/// Node kinds.
#[derive(Clone, Debug)]
pub enum ExprKind {
    // Leaves
    Literal(Value),
    /// Free variable, not yet resolved.
    Name(Name),
    Var(VarRef),
    /// Placeholder for the scope `length` frames out. Never evaluated.
    ScopeRef {
        length: u32,
    },

    // Operators
    Unary {
        op: OperatorRef,
        operand: ExprRef,
    },
    Binary {
        op: OperatorRef,
        lhs: ExprRef,
        rhs: ExprRef,
    },
    Ternary {
        op: OperatorRef,
        first: ExprRef,
        second: ExprRef,
        third: Option<ExprRef>,
    },
    And {
        lhs: ExprRef,
        rhs: ExprRef,
    },
    Or {
        lhs: ExprRef,
        rhs: ExprRef,
    },
    IfThenElse {
        cond: ExprRef,
        then_branch: ExprRef,
        else_branch: ExprRef,
    },
    /// Evaluates every item; yields the last.
    Sequence(Box<[ExprRef]>),
    /// Evaluates both; yields the first.
    Before {
        first: ExprRef,
        second: ExprRef,
    },
    Cast {
        target: Type,
        operand: ExprRef,
    },
    InstanceOf {
        operand: ExprRef,
        target: Type,
    },

    // Assignment
    Assign {
        target: ExprRef,
        value: ExprRef,
    },
    /// Initialising write; allowed on `FINAL` slots.
    Declare {
        target: ExprRef,
        value: ExprRef,
    },
    CompoundAssign {
        op: OperatorRef,
        target: ExprRef,
        value: ExprRef,
        cast: Option<Type>,
    },
    IncDec {
        op: IncDecOp,
        target: ExprRef,
    },

    // Access
    Index(IndexExpr),
    /// `base[lo..hi]`; `lo > hi` means from `lo` to the end.
    IndexRange {
        base: ExprRef,
        lo: ExprRef,
        hi: ExprRef,
    },
    HostField(HostFieldExpr),
    StaticField(StaticFieldExpr),
    MapMember(MapMemberExpr),
    ClassMember(ClassMemberExpr),
    MethodCall {
        receiver: ExprRef,
        method: Name,
        args: Box<[ExprRef]>,
    },
    StaticCall {
        class: HostClassRef,
        method: Name,
        args: Box<[ExprRef]>,
    },
    New {
        class: HostClassRef,
        args: Box<[ExprRef]>,
    },

    // Functions and blocks
    Apply {
        callee: ExprRef,
        args: Box<[ExprRef]>,
    },
    Lambda(Arc<LambdaDef>),
    Let(Arc<LetBlock>),
    Return(ExprRef),

    // Construction
    ArrayLiteral {
        elem: Type,
        items: Box<[ExprRef]>,
    },
    ArrayAlloc {
        elem: Type,
        len: ExprRef,
    },
    ListLiteral {
        create: Option<ExprRef>,
        elem: Type,
        items: Box<[ExprRef]>,
    },
    MapLiteral {
        create: Option<ExprRef>,
        value_ty: Type,
        entries: Box<[(ExprRef, ExprRef)]>,
    },

    // Control
    While {
        cond: ExprRef,
        body: ExprRef,
    },
    /// On a language error, writes its message to `binding` and runs `handler`.
    TryCatch {
        body: ExprRef,
        binding: ExprRef,
        handler: ExprRef,
    },
    Throw(ExprRef),
}

impl Expr {
    /// Every node is built here, so the constant flag is computed once from
    /// the children's cached flags.
    fn new(kind: ExprKind, ty: Type) -> ExprRef {
        let constant = constness(&kind);
        Arc::new(Expr { kind, ty, constant })
    }

    #[inline]
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Static type, computed once at construction.
    #[inline]
    pub fn inferred_type(&self) -> &Type {
        &self.ty
    }

    /// True if this node and all of its children are compile-time constants.
    ///
    /// Container constructors are never constant: folding them would make
    /// every evaluation share one mutable container.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// The l-value view of this node, if it can be assigned to.
    pub fn as_lvalue(&self) -> Option<&dyn LValue> {
        let lvalue: &dyn LValue = match &self.kind {
            ExprKind::Var(var) => var,
            ExprKind::Index(index) => index,
            ExprKind::HostField(field) => field,
            ExprKind::StaticField(field) => field,
            ExprKind::MapMember(member) => member,
            ExprKind::ClassMember(member) => member,
            _ => return None,
        };
        Some(lvalue)
    }

    /// Evaluate against a runtime environment.
    #[inline]
    pub fn evaluate(&self, env: &Environment) -> EvalResult {
        crate::exec::evaluate(self, env)
    }

    /// Resolve free variables against `env`; see [`crate::link_vars`].
    pub fn resolve(self: &Arc<Self>, env: &CompileEnv, max_level: u32) -> ExprRef {
        crate::resolve::link_vars(self, env, max_level)
    }

    /// Simplify; see [`crate::optimize_tree`].
    pub fn optimize_tree(self: &Arc<Self>, level: u8) -> ExprRef {
        crate::optimize::optimize_tree(self, level)
    }

    /// For a `ScopeRef` placeholder, resolve `name` in the frame it points
    /// at. `None` when this is not a placeholder or the name is not declared
    /// there.
    pub fn link(&self, name: Name, env: &CompileEnv) -> Option<ExprRef> {
        match self.kind {
            ExprKind::ScopeRef { length } => env
                .lookup_at(length, name)
                .map(|binding| Expr::var(binding.into())),
            _ => None,
        }
    }

    /// Literal payload, if this is a literal.
    pub fn as_literal(&self) -> Option<&Value> {
        match &self.kind {
            ExprKind::Literal(value) => Some(value),
            _ => None,
        }
    }
}
