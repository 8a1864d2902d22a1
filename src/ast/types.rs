//! The Chespel type algebra.
//!
//! Types form a closed, recursive set. Three members are sentinels that only
//! exist while the program is being analyzed: `Generic` (error recovery, unifies
//! with everything), and `GenericArray` / `EmptyArray` (arrays whose element type
//! is not known yet). The operator checks below return the result type of an
//! operator or a [`TypeError`] describing why the operands are incompatible.

use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    Num,
    String,
    Piece,
    Cell,
    Row,
    Rank,
    File,
    Player,
    Array(Box<Type>),
    GenericArray,
    EmptyArray,
    Generic,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TypeError {
    pub message: String,
}

impl TypeError {
    fn new(message: String) -> Self {
        TypeError { message }
    }
}

impl Type {
    pub fn array_of(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    /// Unification equality: sentinels match anything of their shape.
    pub fn equals(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Generic, _) | (_, Type::Generic) => true,
            (Type::GenericArray | Type::EmptyArray, t) | (t, Type::GenericArray | Type::EmptyArray) => {
                t.is_array()
            }
            (Type::Array(left), Type::Array(right)) => left.equals(right),
            (left, right) => left == right,
        }
    }

    /// Returns the more specific of two types that are already known to be
    /// `equals`. Concrete types win over sentinels regardless of argument order.
    pub fn merge_types(&self, other: &Type) -> Type {
        match (self, other) {
            (Type::Generic, t) | (t, Type::Generic) => t.clone(),
            (Type::GenericArray, t) | (t, Type::GenericArray) => t.clone(),
            (Type::EmptyArray, t) | (t, Type::EmptyArray) => t.clone(),
            (Type::Array(left), Type::Array(right)) => Type::array_of(left.merge_types(right)),
            (left, _) => left.clone(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Type::Array(_) | Type::GenericArray | Type::EmptyArray | Type::Generic
        )
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Bool | Type::Generic)
    }

    pub fn is_num(&self) -> bool {
        matches!(self, Type::Num | Type::Generic)
    }

    pub fn is_coordinate(&self) -> bool {
        matches!(self, Type::Cell | Type::Row | Type::Rank | Type::File)
    }

    pub fn is_convertible_to_num(&self) -> bool {
        self.is_num() || self.is_coordinate()
    }

    /// True when no sentinel remains anywhere inside the type.
    pub fn is_resolved(&self) -> bool {
        match self {
            Type::Generic | Type::GenericArray | Type::EmptyArray => false,
            Type::Array(element) => element.is_resolved(),
            _ => true,
        }
    }

    pub fn contains_void(&self) -> bool {
        match self {
            Type::Void => true,
            Type::Array(element) => element.contains_void(),
            _ => false,
        }
    }

    pub fn element_type(&self) -> Result<Type, TypeError> {
        match self {
            Type::Array(element) => Ok(*element.clone()),
            Type::Generic | Type::GenericArray | Type::EmptyArray => Ok(Type::Generic),
            other => Err(TypeError::new(format!("{} is not an array", other))),
        }
    }

    pub fn check_type_arithmetic(&self, other: &Type) -> Result<Type, TypeError> {
        if !self.is_convertible_to_num() || !other.is_convertible_to_num() {
            return Err(TypeError::new(format!(
                "Arithmetic operator expects NUM or coordinate operands, found {} and {}",
                self, other
            )));
        }

        match (self, other) {
            (Type::Generic, t) | (t, Type::Generic) => Ok(t.clone()),
            (Type::Num, t) | (t, Type::Num) => Ok(t.clone()),
            (left, right) if left == right => Ok(left.clone()),
            (left, right) => Err(TypeError::new(format!(
                "Cannot operate {} with {}",
                left, right
            ))),
        }
    }

    pub fn check_type_bool_op(&self, other: &Type) -> Result<Type, TypeError> {
        if self.is_bool() && other.is_bool() {
            Ok(Type::Bool)
        } else {
            Err(TypeError::new(format!(
                "Boolean operator expects BOOL operands, found {} and {}",
                self, other
            )))
        }
    }

    pub fn check_type_order(&self, other: &Type) -> Result<Type, TypeError> {
        let comparable = self.is_convertible_to_num()
            && other.is_convertible_to_num()
            && (self == other || self.is_num() || other.is_num());

        if comparable {
            Ok(Type::Bool)
        } else {
            Err(TypeError::new(format!("Cannot compare {} with {}", self, other)))
        }
    }

    pub fn check_type_equality(&self, other: &Type) -> Result<Type, TypeError> {
        let comparable = match (self, other) {
            (Type::Void, _) | (_, Type::Void) => false,
            (Type::Row, Type::Rank) | (Type::Rank, Type::Row) => true,
            (left, right) => left.equals(right),
        };

        if comparable {
            Ok(Type::Bool)
        } else {
            Err(TypeError::new(format!(
                "Cannot check equality between {} and {}",
                self, other
            )))
        }
    }

    /// `self in other`
    pub fn check_type_in(&self, other: &Type) -> Result<Type, TypeError> {
        let element = other.element_type().map_err(|_| {
            TypeError::new(format!("Operator 'in' expects an array, found {}", other))
        })?;

        if self.equals(&element) {
            Ok(Type::Bool)
        } else {
            Err(TypeError::new(format!(
                "Cannot look for {} inside {}",
                self, other
            )))
        }
    }

    pub fn check_type_concat(&self, other: &Type) -> Result<Type, TypeError> {
        match (self, other) {
            (Type::Generic, _) | (_, Type::Generic) => Ok(Type::Generic),
            (Type::String, _) | (_, Type::String) => Ok(Type::String),
            (left, right) if left.is_array() && left.equals(right) => Ok(left.merge_types(right)),
            (left, right) => Err(TypeError::new(format!(
                "Cannot concatenate {} with {}",
                left, right
            ))),
        }
    }

    pub fn check_type_unary_bool(&self) -> Result<Type, TypeError> {
        if self.is_bool() {
            Ok(Type::Bool)
        } else {
            Err(TypeError::new(format!("Operator 'not' expects BOOL, found {}", self)))
        }
    }

    pub fn check_type_unary_arithmetic(&self) -> Result<Type, TypeError> {
        if self.is_num() {
            Ok(Type::Num)
        } else {
            Err(TypeError::new(format!("Unary sign expects NUM, found {}", self)))
        }
    }

    /// Parses the type syntax of the predefined function resource:
    /// `num`, `[piece]`, `[[cell]]`, `genericArray`.
    pub fn parse_resource(text: &str) -> Option<Type> {
        let text = text.trim();
        if let Some(inner) = text.strip_prefix('[') {
            let inner = inner.strip_suffix(']')?;
            return Type::parse_resource(inner).map(Type::array_of);
        }

        match text {
            "void" => Some(Type::Void),
            "bool" => Some(Type::Bool),
            "num" => Some(Type::Num),
            "string" => Some(Type::String),
            "piece" => Some(Type::Piece),
            "cell" => Some(Type::Cell),
            "row" => Some(Type::Row),
            "rank" => Some(Type::Rank),
            "file" => Some(Type::File),
            "player" => Some(Type::Player),
            "genericArray" => Some(Type::GenericArray),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => write!(f, "VOID"),
            Type::Bool => write!(f, "BOOL"),
            Type::Num => write!(f, "NUM"),
            Type::String => write!(f, "STRING"),
            Type::Piece => write!(f, "PIECE"),
            Type::Cell => write!(f, "CELL"),
            Type::Row => write!(f, "ROW"),
            Type::Rank => write!(f, "RANK"),
            Type::File => write!(f, "FILE"),
            Type::Player => write!(f, "PLAYER"),
            Type::Array(element) => write!(f, "[{}]", element),
            Type::GenericArray => write!(f, "GENERIC_ARRAY"),
            Type::EmptyArray => write!(f, "EMPTY_ARRAY"),
            Type::Generic => write!(f, "GENERIC"),
        }
    }
}
