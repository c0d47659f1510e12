//! Expression and statement trees.
//!
//! Trees are built directly by the caller. Analysis fills in the
//! crate-private slots (types, descriptors, recipes, local slots) exactly
//! once; emission only reads them.
//!
//! ```
//! use latebind_compiler::ast::{Expr, Stmt, Script};
//! use latebind_core::Span;
//!
//! let at = Span::new(1, 1, 1);
//! let script = Script::new(vec![
//!     Stmt::local("list", "def", Expr::string("xs", at), at),
//!     Stmt::expr(Expr::def_call(
//!         Expr::var("list", at),
//!         "sort",
//!         vec![Expr::function_ref("string", "compareTo", at)],
//!         at,
//!     )),
//! ]);
//! assert_eq!(script.stmts.len(), 2);
//! ```

use latebind_core::{ArgRecipe, DataType, PrimitiveKind, Span};
use latebind_registry::FunctionRef;

use crate::conversion::Conversion;

// ============================================================================
// Expressions
// ============================================================================

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub span: Span,
    /// Type the enclosing context wants, if any.
    pub expected: Option<DataType>,
    /// Type produced by this node; set by analysis.
    pub actual: Option<DataType>,
    /// Whether this node is an argument of a dynamic call.
    ///
    /// Internal nodes keep their static type: analysis pins `expected` to
    /// `actual`, so no conversion is applied.
    pub internal: bool,
    pub kind: ExprKind,
    /// Conversion from `actual` to `expected`, decided by analysis.
    pub(crate) conversion: Option<Conversion>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Variable(VariableNode),
    FunctionRef(FunctionRefNode),
    DynamicCall(DynamicCallNode),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Literal {
    pub fn data_type(&self) -> DataType {
        match self {
            Literal::Bool(_) => DataType::Primitive(PrimitiveKind::Bool),
            Literal::Int(_) => DataType::Primitive(PrimitiveKind::Int),
            Literal::Long(_) => DataType::Primitive(PrimitiveKind::Long),
            Literal::Float(_) => DataType::Primitive(PrimitiveKind::Float),
            Literal::Double(_) => DataType::Primitive(PrimitiveKind::Double),
            Literal::String(_) => DataType::String,
        }
    }
}

/// A read of a local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableNode {
    pub name: String,
    pub(crate) slot: Option<u32>,
}

/// `Owner::member`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionRefNode {
    pub owner: String,
    pub member: String,
    pub(crate) descriptor: Option<FunctionRef>,
}

impl FunctionRefNode {
    /// The descriptor built by analysis; `None` in an untyped context.
    pub fn descriptor(&self) -> Option<&FunctionRef> {
        self.descriptor.as_ref()
    }

    /// The string form pushed when no interface is expected.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner, self.member)
    }
}

/// `receiver.method(args...)` on an untyped receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicCallNode {
    pub receiver: Box<Expr>,
    pub method: String,
    pub args: Vec<Expr>,
    pub(crate) recipe: ArgRecipe,
    pub(crate) statement: bool,
}

impl DynamicCallNode {
    /// Positions of function-reference arguments, set by analysis.
    pub fn recipe(&self) -> ArgRecipe {
        self.recipe
    }

    /// Whether analysis accepted this call as a statement.
    pub fn is_statement(&self) -> bool {
        self.statement
    }
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            span,
            expected: None,
            actual: None,
            internal: false,
            kind,
            conversion: None,
        }
    }

    pub fn bool(value: bool, span: Span) -> Self {
        Self::new(ExprKind::Literal(Literal::Bool(value)), span)
    }

    pub fn int(value: i32, span: Span) -> Self {
        Self::new(ExprKind::Literal(Literal::Int(value)), span)
    }

    pub fn long(value: i64, span: Span) -> Self {
        Self::new(ExprKind::Literal(Literal::Long(value)), span)
    }

    pub fn float(value: f32, span: Span) -> Self {
        Self::new(ExprKind::Literal(Literal::Float(value)), span)
    }

    pub fn double(value: f64, span: Span) -> Self {
        Self::new(ExprKind::Literal(Literal::Double(value)), span)
    }

    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Literal(Literal::String(value.into())), span)
    }

    pub fn var(name: impl Into<String>, span: Span) -> Self {
        Self::new(
            ExprKind::Variable(VariableNode {
                name: name.into(),
                slot: None,
            }),
            span,
        )
    }

    pub fn function_ref(owner: impl Into<String>, member: impl Into<String>, span: Span) -> Self {
        Self::new(
            ExprKind::FunctionRef(FunctionRefNode {
                owner: owner.into(),
                member: member.into(),
                descriptor: None,
            }),
            span,
        )
    }

    pub fn def_call(receiver: Expr, method: impl Into<String>, args: Vec<Expr>, span: Span) -> Self {
        Self::new(
            ExprKind::DynamicCall(DynamicCallNode {
                receiver: Box::new(receiver),
                method: method.into(),
                args,
                recipe: ArgRecipe::empty(),
                statement: false,
            }),
            span,
        )
    }

    /// Set the type the enclosing context expects.
    pub fn with_expected(mut self, expected: DataType) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Whether this node may stand alone as a statement.
    pub fn is_statement(&self) -> bool {
        matches!(&self.kind, ExprKind::DynamicCall(call) if call.statement)
    }

    pub fn as_function_ref(&self) -> Option<&FunctionRefNode> {
        match &self.kind {
            ExprKind::FunctionRef(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_dynamic_call(&self) -> Option<&DynamicCallNode> {
        match &self.kind {
            ExprKind::DynamicCall(node) => Some(node),
            _ => None,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `ty name = init;`
    Local(LocalStmt),
    /// `target = value;`
    Assign(AssignStmt),
    /// An expression evaluated for its effect.
    Expr(Expr),
    /// `return value;` or `return;`
    Return(ReturnStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalStmt {
    pub name: String,
    /// Declared type name.
    pub ty: String,
    pub init: Expr,
    pub span: Span,
    pub(crate) slot: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

impl Stmt {
    pub fn local(name: impl Into<String>, ty: impl Into<String>, init: Expr, span: Span) -> Self {
        Stmt::Local(LocalStmt {
            name: name.into(),
            ty: ty.into(),
            init,
            span,
            slot: None,
        })
    }

    pub fn assign(target: Expr, value: Expr, span: Span) -> Self {
        Stmt::Assign(AssignStmt {
            target,
            value,
            span,
        })
    }

    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn ret(value: Option<Expr>, span: Span) -> Self {
        Stmt::Return(ReturnStmt { value, span })
    }

    pub fn span(&self) -> Span {
        match self {
            Stmt::Local(local) => local.span,
            Stmt::Assign(assign) => assign.span,
            Stmt::Expr(expr) => expr.span,
            Stmt::Return(ret) => ret.span,
        }
    }
}

/// A whole script: a flat list of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub stmts: Vec<Stmt>,
}

impl Script {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    /// Whether the last statement returns.
    pub fn ends_with_return(&self) -> bool {
        matches!(self.stmts.last(), Some(Stmt::Return(_)))
    }
}
