use throw_trigger::jvm::code::{
    BranchInstruction, CodeElement, Constant, ExceptionHandler, FieldRef, Instruction, InvokeType,
    MethodCode, MethodRef, OrdComparison,
};
use throw_trigger::jvm::{
    ArrayType, BaseType, BinaryName, FieldType, MethodAccessFlags, MethodDescriptor, Name,
    RefType, UnqualifiedName,
};
use throw_trigger::weave::{
    Error, RewriteOutcome, RewriteTarget, RuleRegistry, ThrowTriggerRewriter, TriggerSpec,
    TypeInfoRegistry,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn class(name: &str) -> BinaryName {
    BinaryName::from_string(name.to_owned()).unwrap()
}

fn void_method(class: BinaryName, name: UnqualifiedName) -> MethodRef {
    MethodRef {
        class,
        name,
        descriptor: MethodDescriptor {
            parameters: vec![],
            return_type: None,
        },
        is_interface: false,
    }
}

/// `new <exception>; dup; invokespecial <exception>.<init>()V`
fn push_new_exception(code: &mut MethodCode, exception: &str) {
    code.push_instruction(Instruction::New(class(exception)));
    code.push_instruction(Instruction::Dup);
    code.push_instruction(Instruction::Invoke(
        InvokeType::Special,
        void_method(class(exception), UnqualifiedName::INIT),
    ));
}

fn insn(insn: Instruction) -> CodeElement {
    CodeElement::Instruction(insn)
}

fn athrow() -> CodeElement {
    CodeElement::Branch(BranchInstruction::AThrow)
}

fn rule_execute() -> Instruction {
    Instruction::Invoke(
        InvokeType::Static,
        MethodRef {
            class: BinaryName::RULE,
            name: UnqualifiedName::EXECUTE,
            descriptor: MethodDescriptor {
                parameters: vec![
                    FieldType::object(BinaryName::STRING),
                    FieldType::object(BinaryName::OBJECT),
                    FieldType::Ref(RefType::ObjectArray(ArrayType {
                        additional_dimensions: 0,
                        element_type: BinaryName::OBJECT,
                    })),
                ],
                return_type: None,
            },
            is_interface: false,
        },
    )
}

fn integer_value_of() -> Instruction {
    Instruction::Invoke(
        InvokeType::Static,
        MethodRef {
            class: BinaryName::INTEGER,
            name: UnqualifiedName::VALUEOF,
            descriptor: MethodDescriptor {
                parameters: vec![FieldType::Base(BaseType::Int)],
                return_type: Some(FieldType::object(BinaryName::INTEGER)),
            },
            is_interface: false,
        },
    )
}

/// Positions of every element equal to `needle`
fn positions(code: &MethodCode, needle: &CodeElement) -> Vec<usize> {
    code.elements
        .iter()
        .enumerate()
        .filter(|(_, element)| *element == needle)
        .map(|(idx, _)| idx)
        .collect()
}

fn rewrite(
    target: RewriteTarget,
    count: usize,
    code: &MethodCode,
) -> (RewriteOutcome, TypeInfoRegistry) {
    init_logger();
    let registry = TypeInfoRegistry::new();
    registry.declare("rule-key");
    let rewriter =
        ThrowTriggerRewriter::new(target, TriggerSpec::new("test rule", "rule-key", count))
            .unwrap();
    let outcome = rewriter.rewrite(code, &registry).unwrap();
    (outcome, registry)
}

fn compute_target() -> RewriteTarget {
    RewriteTarget::parse(
        "org/example/Calc",
        "compute",
        "(I)I",
        MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
        &[],
    )
    .unwrap()
}

fn constructor_target() -> RewriteTarget {
    RewriteTarget::parse(
        "org/example/Widget",
        "<init>",
        "(I)V",
        MethodAccessFlags::PUBLIC,
        &[],
    )
    .unwrap()
}

/// ```java
/// static int compute(int x) {
///     throw new IllegalStateException();
/// }
/// ```
fn compute_code() -> MethodCode {
    let mut code = MethodCode::new();
    let start = code.fresh_label();
    code.place_label(start);
    code.push_line_number(3);
    push_new_exception(&mut code, "java/lang/IllegalStateException");
    code.push_branch_instruction(BranchInstruction::AThrow);
    code
}

#[test]
fn static_method_single_throw() {
    let code = compute_code();
    let (outcome, registry) = rewrite(compute_target(), 1, &code);

    let region = outcome.trigger_region.expect("trigger should be woven in");
    let mut expected = code.elements.clone();
    let throw_idx = expected.len() - 1;
    expected.splice(
        throw_idx..throw_idx,
        vec![
            CodeElement::Label(region.start),
            insn(Instruction::Ldc(Constant::String(String::from("rule-key")))),
            insn(Instruction::AConstNull),
            insn(Instruction::IConst1),
            insn(Instruction::ANewArray(RefType::Object(BinaryName::OBJECT))),
            insn(Instruction::Dup),
            insn(Instruction::IConst0),
            insn(Instruction::ILoad(0)),
            insn(integer_value_of()),
            insn(Instruction::AAStore),
            insn(rule_execute()),
            CodeElement::Label(region.end),
        ],
    );
    assert_eq!(outcome.code.elements, expected);
    assert_eq!(outcome.occurrences_seen, 1);

    // Type info got registered, including the access flags
    let registered = registry.type_info("rule-key").unwrap();
    assert_eq!(registered, compute_target());
    assert!(registered.access_flags.contains(MethodAccessFlags::STATIC));

    // Fresh labels don't collide with labels already in the method
    assert!(!code.labels().any(|l| l == region.start || l == region.end));
    assert_ne!(region.start, region.end);
}

#[test]
fn too_few_throws_is_a_no_op() {
    let code = compute_code();
    let (outcome, registry) = rewrite(compute_target(), 2, &code);

    assert_eq!(outcome.code, code);
    assert_eq!(outcome.trigger_region, None);
    assert_eq!(outcome.occurrences_seen, 1);
    assert_eq!(registry.type_info("rule-key"), None);
}

#[test]
fn method_without_throws() {
    let mut code = MethodCode::new();
    code.push_instruction(Instruction::ILoad(0));
    code.push_branch_instruction(BranchInstruction::IReturn);

    let (outcome, _) = rewrite(compute_target(), 1, &code);
    assert_eq!(outcome.code, code);
    assert!(!outcome.is_modified());
}

#[test]
fn only_the_nth_throw_is_instrumented() {
    // if (x == 0) throw A; if (x == 1) throw B; throw C;
    let mut code = MethodCode::new();
    let not_zero = code.fresh_label();
    let not_one = code.fresh_label();
    code.push_instruction(Instruction::ILoad(0));
    code.push_branch_instruction(BranchInstruction::If(OrdComparison::NE, not_zero));
    push_new_exception(&mut code, "org/example/A");
    code.push_branch_instruction(BranchInstruction::AThrow);
    code.place_label(not_zero);
    code.push_instruction(Instruction::ILoad(0));
    code.push_instruction(Instruction::IConst1);
    code.push_branch_instruction(BranchInstruction::IfICmp(OrdComparison::NE, not_one));
    push_new_exception(&mut code, "org/example/B");
    code.push_branch_instruction(BranchInstruction::AThrow);
    code.place_label(not_one);
    push_new_exception(&mut code, "org/example/C");
    code.push_branch_instruction(BranchInstruction::AThrow);

    let (outcome, _) = rewrite(compute_target(), 2, &code);
    let call = insn(rule_execute());
    let calls = positions(&outcome.code, &call);
    assert_eq!(calls.len(), 1);

    // Call is right before the second throw (only the end label in between)
    let throws = positions(&outcome.code, &athrow());
    assert_eq!(throws.len(), 3);
    assert_eq!(calls[0] + 2, throws[1]);
    assert!(calls[0] > throws[0]);

    // Removing the woven region gives back the original
    let region = outcome.trigger_region.unwrap();
    let start = positions(&outcome.code, &CodeElement::Label(region.start))[0];
    let end = positions(&outcome.code, &CodeElement::Label(region.end))[0];
    let mut stripped = outcome.code.elements.clone();
    stripped.drain(start..=end);
    assert_eq!(stripped, code.elements);
}

/// ```java
/// Widget(int x) {
///     super();
///     if (x < 0) throw new IllegalArgumentException();
///     throw new UnsupportedOperationException();
/// }
/// ```
#[test]
fn constructor_throwing_after_super() {
    let mut code = MethodCode::new();
    let non_negative = code.fresh_label();
    code.push_instruction(Instruction::ALoad(0));
    code.push_instruction(Instruction::Invoke(
        InvokeType::Special,
        void_method(BinaryName::OBJECT, UnqualifiedName::INIT),
    ));
    code.push_instruction(Instruction::ILoad(1));
    code.push_branch_instruction(BranchInstruction::If(OrdComparison::GE, non_negative));
    push_new_exception(&mut code, "java/lang/IllegalArgumentException");
    code.push_branch_instruction(BranchInstruction::AThrow);
    code.place_label(non_negative);
    push_new_exception(&mut code, "java/lang/UnsupportedOperationException");
    code.push_branch_instruction(BranchInstruction::AThrow);

    let (outcome, _) = rewrite(constructor_target(), 2, &code);
    assert!(!outcome.latch_left_closed);

    let region = outcome.trigger_region.unwrap();
    let start = positions(&outcome.code, &CodeElement::Label(region.start))[0];
    let throws = positions(&outcome.code, &athrow());
    assert!(start > throws[0]);
    assert!(start < throws[1]);

    // Receiver is passed along
    assert_eq!(
        outcome.code.elements[start + 2],
        insn(Instruction::ALoad(0))
    );
    assert_eq!(
        outcome.code.elements[throws[1] - 1],
        CodeElement::Label(region.end)
    );
}

/// Throw counted before the receiver is initialized gets its trigger right after `super(...)`
#[test]
fn constructor_throwing_before_super() {
    let mut code = MethodCode::new();
    let non_negative = code.fresh_label();
    code.push_instruction(Instruction::ILoad(1));
    code.push_branch_instruction(BranchInstruction::If(OrdComparison::GE, non_negative));
    push_new_exception(&mut code, "java/lang/IllegalArgumentException");
    code.push_branch_instruction(BranchInstruction::AThrow);
    code.place_label(non_negative);
    code.push_instruction(Instruction::ALoad(0));
    code.push_instruction(Instruction::Invoke(
        InvokeType::Special,
        void_method(BinaryName::OBJECT, UnqualifiedName::INIT),
    ));
    code.push_branch_instruction(BranchInstruction::Return);

    let (outcome, _) = rewrite(constructor_target(), 1, &code);
    assert_eq!(outcome.occurrences_seen, 1);

    let region = outcome.trigger_region.unwrap();
    let super_call = insn(Instruction::Invoke(
        InvokeType::Special,
        void_method(BinaryName::OBJECT, UnqualifiedName::INIT),
    ));
    let super_idx = positions(&outcome.code, &super_call)[0];
    assert_eq!(
        outcome.code.elements[super_idx + 1],
        CodeElement::Label(region.start)
    );
    let throw_idx = positions(&outcome.code, &athrow())[0];
    assert!(throw_idx < super_idx);
}

/// `super(new StringBuilder().toString())` must not open the latch at `StringBuilder.<init>`
#[test]
fn constructor_allocating_super_arguments() {
    let string_builder = class("java/lang/StringBuilder");
    let mut code = MethodCode::new();
    code.push_instruction(Instruction::ALoad(0));
    code.push_instruction(Instruction::New(string_builder.clone()));
    code.push_instruction(Instruction::Dup);
    code.push_instruction(Instruction::Invoke(
        InvokeType::Special,
        void_method(string_builder, UnqualifiedName::INIT),
    ));
    push_new_exception(&mut code, "java/lang/IllegalStateException");
    code.push_branch_instruction(BranchInstruction::AThrow);

    let (outcome, _) = rewrite(constructor_target(), 1, &code);
    assert_eq!(outcome.code, code);
    assert_eq!(outcome.occurrences_seen, 1);
    assert!(outcome.latch_left_closed);
}

#[test]
fn constructor_never_initializing_receiver() {
    let mut code = MethodCode::new();
    push_new_exception(&mut code, "java/lang/IllegalStateException");
    code.push_branch_instruction(BranchInstruction::AThrow);

    let (outcome, registry) = rewrite(constructor_target(), 1, &code);
    assert_eq!(outcome.code, code);
    assert!(outcome.latch_left_closed);
    assert_eq!(registry.type_info("rule-key"), None);
}

/// ```java
/// synchronized (lock) {
///     if (x > 0) throw new IllegalStateException();
/// }
/// ```
fn synchronized_code() -> MethodCode {
    let mut code = MethodCode::new();
    let try_start = code.fresh_label();
    let try_end = code.fresh_label();
    let handler = code.fresh_label();
    let done = code.fresh_label();

    code.push_instruction(Instruction::GetStatic(FieldRef {
        class: class("org/example/Calc"),
        name: UnqualifiedName::from_string(String::from("lock")).unwrap(),
        descriptor: FieldType::object(BinaryName::OBJECT),
    }));
    code.push_instruction(Instruction::Dup);
    code.push_instruction(Instruction::AStore(1));
    code.push_instruction(Instruction::MonitorEnter);
    code.place_label(try_start);
    code.push_instruction(Instruction::ILoad(0));
    code.push_branch_instruction(BranchInstruction::If(OrdComparison::LE, done));
    push_new_exception(&mut code, "java/lang/IllegalStateException");
    code.push_branch_instruction(BranchInstruction::AThrow);
    code.place_label(done);
    code.push_instruction(Instruction::ALoad(1));
    code.push_instruction(Instruction::MonitorExit);
    code.place_label(try_end);
    code.push_instruction(Instruction::ILoad(0));
    code.push_branch_instruction(BranchInstruction::IReturn);
    code.place_label(handler);
    code.push_instruction(Instruction::AStore(2));
    code.push_instruction(Instruction::ALoad(1));
    code.push_instruction(Instruction::MonitorExit);
    code.push_instruction(Instruction::ALoad(2));
    code.push_branch_instruction(BranchInstruction::AThrow);

    code.exception_handlers.push(ExceptionHandler {
        start: try_start,
        end: try_end,
        handler,
        catch_type: None,
    });
    code
}

#[test]
fn monitor_re_raise_is_not_counted() {
    let code = synchronized_code();

    let (outcome, _) = rewrite(compute_target(), 1, &code);
    let throws = positions(&outcome.code, &athrow());
    let region = outcome.trigger_region.unwrap();
    assert_eq!(outcome.code.elements[throws[0] - 1], CodeElement::Label(region.end));
    assert_eq!(outcome.code.exception_handlers, code.exception_handlers);

    // Asking for the second throw finds nothing: the other one re-raises
    let (outcome, _) = rewrite(compute_target(), 2, &code);
    assert_eq!(outcome.code, code);
    assert_eq!(outcome.occurrences_seen, 1);
}

#[test]
fn re_raise_before_explicit_throw() {
    // Handler laid out first, then a later explicit throw
    let mut code = MethodCode::new();
    code.push_instruction(Instruction::AStore(2));
    code.push_instruction(Instruction::ALoad(1));
    code.push_instruction(Instruction::MonitorExit);
    code.push_instruction(Instruction::ALoad(2));
    code.push_branch_instruction(BranchInstruction::AThrow);
    code.push_instruction(Instruction::ALoad(1));
    code.push_instruction(Instruction::MonitorExit);
    code.push_branch_instruction(BranchInstruction::AThrow);
    push_new_exception(&mut code, "java/lang/IllegalStateException");
    code.push_branch_instruction(BranchInstruction::AThrow);

    let (outcome, _) = rewrite(compute_target(), 1, &code);
    assert_eq!(outcome.occurrences_seen, 1);
    let throws = positions(&outcome.code, &athrow());
    let region = outcome.trigger_region.unwrap();
    assert_eq!(outcome.code.elements[throws[2] - 1], CodeElement::Label(region.end));
}

#[test]
fn rewriting_unmodified_output_is_stable() {
    let code = compute_code();
    let (first, _) = rewrite(compute_target(), 3, &code);
    let (second, _) = rewrite(compute_target(), 3, &first.code);
    assert_eq!(first.code, second.code);
    assert_eq!(second.code, code);
}

#[test]
fn registration_failure_leaves_no_output() {
    init_logger();
    let registry = TypeInfoRegistry::new();
    registry.declare("rule-key");

    // Rule is already bound to some other method
    let other = RewriteTarget::parse(
        "org/example/Other",
        "run",
        "()V",
        MethodAccessFlags::empty(),
        &[],
    )
    .unwrap();
    registry.register_type_info("rule-key", &other).unwrap();

    let rewriter = ThrowTriggerRewriter::new(
        compute_target(),
        TriggerSpec::new("test rule", "rule-key", 1),
    )
    .unwrap();
    let code = compute_code();
    match rewriter.rewrite(&code, &registry) {
        Err(err @ Error::Registration { .. }) => {
            let message = err.to_string();
            assert!(message.contains("org/example/Calc.compute (I)I"));
            assert!(message.contains("rule-key"));
            assert!(std::error::Error::source(&err).is_some());
        }
        other => panic!("expected a registration error, got {:?}", other),
    }
    assert_eq!(registry.type_info("rule-key"), Some(other));
}

#[test]
fn shared_rewriter_across_threads() {
    init_logger();
    let registry = TypeInfoRegistry::new();
    registry.declare("rule-key");
    let rewriter = ThrowTriggerRewriter::new(
        compute_target(),
        TriggerSpec::new("test rule", "rule-key", 1),
    )
    .unwrap();
    let code = compute_code();

    let outcomes: Vec<MethodCode> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| rewriter.rewrite(&code, &registry).unwrap().code))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for outcome in &outcomes[1..] {
        assert_eq!(*outcome, outcomes[0]);
    }
}
