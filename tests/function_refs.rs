//! Function references compiled to lambda factory sites and linked against
//! native implementations.

mod common;

use common::{at, host, registry, run};
use latebind::{
    Bootstrap, CompilationError, DataType, DescriptorError, Expr, FactoryFlags, HandleKind,
    LinkError, MethodType, OpCode, Script, StaticArg, Stmt, Value, compile,
};

#[test]
fn static_reference_links_without_bridge() {
    let host = host();
    let mut script = Script::new(vec![
        Stmt::local(
            "f",
            "LongUnaryOperator",
            Expr::function_ref("Math", "abs", at(1, 24)),
            at(1, 1),
        ),
        Stmt::ret(Some(Expr::var("f", at(2, 8))), at(2, 1)),
    ]);
    let compiled = compile(host.registry(), &mut script).unwrap();

    compiled.chunk.assert_opcodes(&[
        OpCode::InvokeDynamic,
        OpCode::SetLocal,
        OpCode::GetLocal,
        OpCode::ToDef,
        OpCode::Return,
    ]);
    let site = &compiled.chunk.call_sites()[0];
    assert_eq!(site.name, "applyAsLong");
    assert_eq!(site.signature, "()LLongUnaryOperator;");
    assert_eq!(site.bootstrap, Bootstrap::LambdaFactory);
    assert_eq!(site.factory_flags(), Some(FactoryFlags::empty()));
    assert_eq!(site.static_args.len(), 4);
    assert_eq!(compiled.chunk.position_at(0), Some(at(1, 24)));

    let result = run(&compiled, &host).unwrap();
    let function = result.as_function().unwrap();
    assert_eq!(function.interface, "LongUnaryOperator");
    assert_eq!(function.call(&[Value::Long(-7)]), Ok(Value::Long(7)));
}

#[test]
fn virtual_reference_is_bridged() {
    let host = host();
    let mut script = Script::new(vec![
        Stmt::local(
            "len",
            "ToIntFunction",
            Expr::function_ref("string", "length", at(1, 21)),
            at(1, 1),
        ),
        Stmt::local("d", "def", Expr::var("len", at(2, 9)), at(2, 1)),
        Stmt::ret(
            Some(Expr::def_call(
                Expr::var("d", at(3, 8)),
                "applyAsInt",
                vec![Expr::string("abcd", at(3, 21))],
                at(3, 9),
            )),
            at(3, 1),
        ),
    ]);
    let compiled = compile(host.registry(), &mut script).unwrap();

    let factory = &compiled.chunk.call_sites()[0];
    assert_eq!(factory.factory_flags(), Some(FactoryFlags::BRIDGES));
    assert_eq!(
        &factory.static_args[3..],
        &[
            StaticArg::Int(4),
            StaticArg::Int(1),
            StaticArg::MethodType(MethodType::new(
                vec![DataType::Def],
                DataType::Primitive(latebind::PrimitiveKind::Int)
            )),
        ]
    );
    match &factory.static_args[1] {
        StaticArg::MethodHandle(handle) => {
            assert_eq!(handle.kind, HandleKind::Virtual);
            assert_eq!(handle.to_string(), "string::length()I");
        }
        other => panic!("expected a method handle, found {other}"),
    }

    assert_eq!(run(&compiled, &host), Ok(Value::Int(4)));
}

#[test]
fn constructor_reference_through_supplier() {
    let host = host();
    let mut script = Script::new(vec![
        Stmt::local("make", "Supplier", Expr::function_ref("List", "new", at(1, 17)), at(1, 1)),
        Stmt::local("m", "def", Expr::var("make", at(2, 9)), at(2, 1)),
        Stmt::local(
            "list",
            "def",
            Expr::def_call(Expr::var("m", at(3, 12)), "get", vec![], at(3, 13)),
            at(3, 1),
        ),
        Stmt::expr(Expr::def_call(
            Expr::var("list", at(4, 1)),
            "add",
            vec![Expr::long(5, at(4, 10))],
            at(4, 5),
        )),
        Stmt::expr(Expr::def_call(
            Expr::var("list", at(5, 1)),
            "add",
            vec![Expr::long(6, at(5, 10))],
            at(5, 5),
        )),
        Stmt::ret(
            Some(Expr::def_call(Expr::var("list", at(6, 8)), "size", vec![], at(6, 12))),
            at(6, 1),
        ),
    ]);
    let compiled = compile(host.registry(), &mut script).unwrap();

    // Every occurrence gets its own site, even with identical descriptors.
    assert_eq!(compiled.chunk.call_sites().len(), 5);
    assert_eq!(compiled.chunk.invoked_sites(), vec![0, 1, 2, 3, 4]);
    assert_eq!(compiled.chunk.call_sites()[2], compiled.chunk.call_sites()[3]);

    assert_eq!(run(&compiled, &host), Ok(Value::Int(2)));
}

#[test]
fn unknown_owner_is_located() {
    let mut script = Script::new(vec![Stmt::local(
        "f",
        "Function",
        Expr::function_ref("Bogus", "nope", at(4, 14)),
        at(4, 1),
    )]);
    let errors = compile(&registry(), &mut script).unwrap_err();

    assert_eq!(
        errors.diagnostics(),
        &[CompilationError::InvalidFunctionRef {
            error: DescriptorError::UnknownType {
                name: "Bogus".into()
            },
            span: at(4, 14),
        }]
    );
    assert!(errors.to_string().starts_with("at 4:14:"));
}

#[test]
fn untyped_destination_is_not_functional() {
    let mut script = Script::new(vec![Stmt::local(
        "f",
        "def",
        Expr::function_ref("Math", "abs", at(1, 9)),
        at(1, 1),
    )]);
    let errors = compile(&registry(), &mut script).unwrap_err();
    assert!(matches!(
        errors.diagnostics(),
        [CompilationError::InvalidFunctionRef {
            error: DescriptorError::NotFunctional { .. },
            ..
        }]
    ));
}

#[test]
fn unbound_implementation_fails_at_link_time() {
    let host = host();
    let mut script = Script::new(vec![
        Stmt::local("p", "Predicate", Expr::function_ref("string", "isEmpty", at(1, 15)), at(1, 1)),
        Stmt::ret(None, at(2, 1)),
    ]);
    let compiled = compile(host.registry(), &mut script).unwrap();
    // Bound in the harness, so linking succeeds.
    assert_eq!(run(&compiled, &host), Ok(Value::Void));

    let bare = latebind::NativeHost::new(registry());
    assert!(matches!(
        run(&compiled, &bare),
        Err(common::RunError::Link(LinkError::UnknownHandle { .. }))
    ));
}

#[test]
fn incompatible_reference() {
    let mut script = Script::new(vec![Stmt::local(
        "f",
        "LongUnaryOperator",
        Expr::function_ref("Math", "sqrt", at(1, 24)),
        at(1, 1),
    )]);
    let errors = compile(&registry(), &mut script).unwrap_err();
    assert!(matches!(
        errors.diagnostics(),
        [CompilationError::InvalidFunctionRef {
            error: DescriptorError::IncompatibleSignature { .. },
            ..
        }]
    ));
}
