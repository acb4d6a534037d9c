use super::{BinaryName, Name};
use std::io::{Error, ErrorKind, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Converts descriptors to their string representation
pub trait RenderDescriptor {
    fn render(&self) -> String {
        let mut string = String::new();
        self.render_to(&mut string);
        string
    }

    /// Append the descriptor to a string
    fn render_to(&self, write_to: &mut String);
}

/// Reads descriptors from their string representation
pub trait ParseDescriptor: Sized {
    /// Parse a descriptor, requiring the whole string to be consumed
    fn parse(source: &str) -> Result<Self> {
        let mut chars = source.chars().peekable();
        let parsed = Self::parse_from(&mut chars)?;
        match chars.next() {
            None => Ok(parsed),
            Some(c) => Err(invalid(format!("Unexpected trailing '{}' in '{}'", c, source))),
        }
    }

    /// Parse a descriptor from the front of a character stream
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self>;
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidInput, msg.into())
}

fn missing(what: &str) -> Error {
    Error::new(ErrorKind::UnexpectedEof, format!("Missing {}", what))
}

/// Primitive value types
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    const ALL: [BaseType; 8] = [
        BaseType::Byte,
        BaseType::Char,
        BaseType::Double,
        BaseType::Float,
        BaseType::Int,
        BaseType::Long,
        BaseType::Short,
        BaseType::Boolean,
    ];

    /// Descriptor character
    pub const fn descriptor_char(&self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }

    fn from_descriptor_char(c: char) -> Option<BaseType> {
        BaseType::ALL
            .iter()
            .copied()
            .find(|base_type| base_type.descriptor_char() == c)
    }

    /// Number of local variable (or operand stack) slots taken by a value of this type
    pub const fn slot_width(&self) -> u16 {
        match self {
            BaseType::Double | BaseType::Long => 2,
            _ => 1,
        }
    }

    /// Class whose `valueOf` boxes a value of this type
    pub fn boxed_class(&self) -> BinaryName {
        match self {
            BaseType::Byte => BinaryName::BYTE,
            BaseType::Char => BinaryName::CHARACTER,
            BaseType::Double => BinaryName::DOUBLE,
            BaseType::Float => BinaryName::FLOAT,
            BaseType::Int => BinaryName::INTEGER,
            BaseType::Long => BinaryName::LONG,
            BaseType::Short => BinaryName::SHORT,
            BaseType::Boolean => BinaryName::BOOLEAN,
        }
    }
}

impl RenderDescriptor for BaseType {
    fn render_to(&self, write_to: &mut String) {
        write_to.push(self.descriptor_char());
    }
}

impl ParseDescriptor for BaseType {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        let c = source.next().ok_or_else(|| missing("base type"))?;
        BaseType::from_descriptor_char(c)
            .ok_or_else(|| invalid(format!("Invalid base type character '{}'", c)))
    }
}

/// Reference type
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum RefType<Class> {
    Object(Class),
    ObjectArray(ArrayType<Class>),
    PrimitiveArray(ArrayType<BaseType>),
}

/// Array type, stored as its innermost element type plus the number of extra dimensions
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ArrayType<T> {
    /// `A[]` has 0 additional dimensions, `A[][][]` has 2
    pub additional_dimensions: usize,

    /// `A` is the element type of `A[][]`
    pub element_type: T,
}

impl<T: RenderDescriptor> RenderDescriptor for ArrayType<T> {
    fn render_to(&self, write_to: &mut String) {
        write_to.extend(std::iter::repeat('[').take(self.additional_dimensions + 1));
        self.element_type.render_to(write_to);
    }
}

/// Class names render as object types (`Ljava/lang/Object;`)
impl RenderDescriptor for BinaryName {
    fn render_to(&self, write_to: &mut String) {
        write_to.push('L');
        write_to.push_str(self.as_str());
        write_to.push(';');
    }
}

impl ParseDescriptor for BinaryName {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        match source.next() {
            Some('L') => (),
            Some(c) => return Err(invalid(format!("Expected 'L' but found '{}'", c))),
            None => return Err(missing("object type")),
        }
        let mut class_name = String::new();
        loop {
            match source.next() {
                Some(';') => return BinaryName::from_string(class_name).map_err(invalid),
                Some(c) => class_name.push(c),
                None => return Err(missing(&format!("';' after 'L{}'", class_name))),
            }
        }
    }
}

impl<C: RenderDescriptor> RenderDescriptor for RefType<C> {
    fn render_to(&self, write_to: &mut String) {
        match self {
            RefType::Object(class) => class.render_to(write_to),
            RefType::ObjectArray(array) => array.render_to(write_to),
            RefType::PrimitiveArray(array) => array.render_to(write_to),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for RefType<C> {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        let mut dimensions = 0;
        while source.next_if_eq(&'[').is_some() {
            dimensions += 1;
        }
        let is_object = source.peek() == Some(&'L');

        Ok(match (dimensions, is_object) {
            (0, true) => RefType::Object(C::parse_from(source)?),
            (0, false) => {
                return Err(match source.next() {
                    Some(c) => invalid(format!("Invalid reference type character '{}'", c)),
                    None => missing("reference type"),
                })
            }
            (n, true) => RefType::ObjectArray(ArrayType {
                additional_dimensions: n - 1,
                element_type: C::parse_from(source)?,
            }),
            (n, false) => RefType::PrimitiveArray(ArrayType {
                additional_dimensions: n - 1,
                element_type: BaseType::parse_from(source)?,
            }),
        })
    }
}

/// Type of a class, instance, or local variable
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum FieldType<Class> {
    Base(BaseType),
    Ref(RefType<Class>),
}

impl<C> FieldType<C> {
    pub const fn object(class_name: C) -> FieldType<C> {
        FieldType::Ref(RefType::Object(class_name))
    }

    pub const fn int() -> FieldType<C> {
        FieldType::Base(BaseType::Int)
    }

    pub const fn long() -> FieldType<C> {
        FieldType::Base(BaseType::Long)
    }

    /// Number of local variable slots taken by a value of this type
    pub fn slot_width(&self) -> u16 {
        match self {
            FieldType::Base(base_type) => base_type.slot_width(),
            FieldType::Ref(_) => 1,
        }
    }
}

impl<C: RenderDescriptor> RenderDescriptor for FieldType<C> {
    fn render_to(&self, write_to: &mut String) {
        match self {
            FieldType::Base(base_type) => base_type.render_to(write_to),
            FieldType::Ref(ref_type) => ref_type.render_to(write_to),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for FieldType<C> {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        match source.peek().copied() {
            Some('L' | '[') => RefType::parse_from(source).map(FieldType::Ref),
            Some(_) => BaseType::parse_from(source).map(FieldType::Base),
            None => Err(missing("field type")),
        }
    }
}

/// Signature of a method
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct MethodDescriptor<Class> {
    pub parameters: Vec<FieldType<Class>>,

    /// `None` for `void`
    pub return_type: Option<FieldType<Class>>,
}

impl<C> MethodDescriptor<C> {
    /// Local variable slots taken by the parameters (plus the receiver, if there is one)
    pub fn parameter_length(&self, has_this_param: bool) -> usize {
        let receiver = usize::from(has_this_param);
        self.parameters
            .iter()
            .map(|parameter| parameter.slot_width() as usize)
            .sum::<usize>()
            + receiver
    }
}

impl<C: RenderDescriptor> RenderDescriptor for MethodDescriptor<C> {
    fn render_to(&self, write_to: &mut String) {
        write_to.push('(');
        for parameter in &self.parameters {
            parameter.render_to(write_to);
        }
        write_to.push(')');
        match &self.return_type {
            Some(return_type) => return_type.render_to(write_to),
            None => write_to.push('V'),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for MethodDescriptor<C> {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        if source.next_if_eq(&'(').is_none() {
            return Err(invalid("Method descriptor must start with '('"));
        }

        let mut parameters = vec![];
        loop {
            match source.peek() {
                Some(')') => {
                    source.next();
                    break;
                }
                Some(_) => parameters.push(FieldType::parse_from(source)?),
                None => return Err(missing("')' in method descriptor")),
            }
        }

        let return_type = match source.next_if_eq(&'V') {
            Some(_) => None,
            None => Some(FieldType::parse_from(source)?),
        };

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }
}
