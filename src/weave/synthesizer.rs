use super::{RegistrationError, RewriteTarget, RuleRegistry, TriggerSpec};
use crate::jvm::code::{
    CodeCursor, CodeElement, Constant, Instruction, InvokeType, MethodRef, SynLabel,
};
use crate::jvm::{BaseType, BinaryName, FieldType, MethodDescriptor, RefType, UnqualifiedName};

/// Labels around a woven trigger call
///
/// The call sits strictly between `start` and `end`, so the pair can be used (for instance) to
/// exclude the call from exception handlers added by later transformations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TriggerRegion {
    pub start: SynLabel,
    pub end: SynLabel,
}

/// Something elements can be appended to
pub trait ElementSink {
    fn push_element(&mut self, element: CodeElement);
}

impl ElementSink for Vec<CodeElement> {
    fn push_element(&mut self, element: CodeElement) {
        self.push(element)
    }
}

/// Helpers for emitting common instruction sequences
pub trait ElementSinkExts: ElementSink {
    fn push_instruction(&mut self, insn: Instruction) {
        self.push_element(CodeElement::Instruction(insn))
    }

    /// Push an integer constant onto the stack
    fn const_int(&mut self, integer: i32) {
        let insn = match integer {
            -1 => Instruction::IConstM1,
            0 => Instruction::IConst0,
            1 => Instruction::IConst1,
            2 => Instruction::IConst2,
            3 => Instruction::IConst3,
            4 => Instruction::IConst4,
            5 => Instruction::IConst5,
            -128..=127 => Instruction::BiPush(integer as i8),
            -32768..=32767 => Instruction::SiPush(integer as i16),
            _ => Instruction::Ldc(Constant::Integer(integer)),
        };
        self.push_instruction(insn)
    }

    /// Push a string constant onto the stack
    fn const_string(&mut self, string: &str) {
        self.push_instruction(Instruction::Ldc(Constant::String(string.to_owned())))
    }

    /// Get a local at a particular offset
    fn get_local(&mut self, offset: u16, field_type: &FieldType<BinaryName>) {
        let insn = match field_type {
            FieldType::Base(
                BaseType::Int | BaseType::Char | BaseType::Short | BaseType::Byte | BaseType::Boolean,
            ) => Instruction::ILoad(offset),
            FieldType::Base(BaseType::Float) => Instruction::FLoad(offset),
            FieldType::Base(BaseType::Long) => Instruction::LLoad(offset),
            FieldType::Base(BaseType::Double) => Instruction::DLoad(offset),
            FieldType::Ref(_) => Instruction::ALoad(offset),
        };
        self.push_instruction(insn)
    }

    /// Box the primitive on top of the stack with `valueOf`
    fn box_value(&mut self, base_type: BaseType) {
        let wrapper = base_type.boxed_class();
        let value_of = MethodRef {
            descriptor: MethodDescriptor {
                parameters: vec![FieldType::Base(base_type)],
                return_type: Some(FieldType::object(wrapper.clone())),
            },
            class: wrapper,
            name: UnqualifiedName::VALUEOF,
            is_interface: false,
        };
        self.invoke(InvokeType::Static, value_of)
    }

    fn invoke(&mut self, invoke_type: InvokeType, method: MethodRef) {
        self.push_instruction(Instruction::Invoke(invoke_type, method))
    }
}

impl<S: ElementSink + ?Sized> ElementSinkExts for S {}

/// Register the target with the rule registry, then build the trigger call
///
/// Nothing is built (and no labels are minted) if the registration fails.
pub fn synthesize_trigger_call(
    target: &RewriteTarget,
    trigger: &TriggerSpec,
    registry: &dyn RuleRegistry,
    cursor: &mut CodeCursor,
) -> Result<(Vec<CodeElement>, TriggerRegion), RegistrationError> {
    registry.register_type_info(&trigger.rule_key, target)?;

    let region = TriggerRegion {
        start: cursor.fresh_label(),
        end: cursor.fresh_label(),
    };

    let mut call: Vec<CodeElement> = vec![CodeElement::Label(region.start)];
    call.const_string(&trigger.rule_key);
    if target.is_static() {
        call.push_instruction(Instruction::AConstNull);
    } else {
        call.push_instruction(Instruction::ALoad(0));
    }
    push_argument_array(&mut call, target);
    call.invoke(InvokeType::Static, trigger.hook.method_ref());
    call.push_element(CodeElement::Label(region.end));

    Ok((call, region))
}

/// Collect the method arguments into a fresh `Object[]`, boxing primitives
fn push_argument_array(sink: &mut impl ElementSink, target: &RewriteTarget) {
    let parameters = &target.descriptor.parameters;

    sink.const_int(parameters.len() as i32);
    sink.push_instruction(Instruction::ANewArray(RefType::Object(BinaryName::OBJECT)));

    let mut offset: u16 = if target.is_static() { 0 } else { 1 };
    for (idx, parameter) in parameters.iter().enumerate() {
        sink.push_instruction(Instruction::Dup);
        sink.const_int(idx as i32);
        sink.get_local(offset, parameter);
        if let FieldType::Base(base_type) = parameter {
            sink.box_value(*base_type);
        }
        sink.push_instruction(Instruction::AAStore);
        offset += parameter.slot_width();
    }
}
